//! Locate Event Logger
//!
//! One structured event per request stage, written through `tracing` under the
//! `locate_events` target so the JSON file layer captures them as NDJSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_query;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocateEvent {
    Received {
        query: String,
        intent: String,
        source: String,
        document_bytes: usize,
    },
    Ranked {
        total_candidates: usize,
        best_score: Option<u32>,
        best_css: Option<String>,
        unique: bool,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Serialize)]
pub struct LocateEventEntry {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: LocateEvent,
}

pub struct EventLogger;

impl EventLogger {
    /// Log a request event. When `redact` is set, `value` is masked out of any query text.
    pub fn log_event(request_id: &str, mut event: LocateEvent, value: Option<&str>, redact: bool) {
        if redact {
            if let LocateEvent::Received { query, .. } = &mut event {
                *query = redact_query(query, value);
            }
        }

        let entry = LocateEventEntry {
            request_id: request_id.to_string(),
            timestamp: Utc::now(),
            event,
        };

        match serde_json::to_string(&entry) {
            Ok(json) => info!(target: "locate_events", event = %json, "Locate event"),
            Err(e) => info!(target: "locate_events", error = %e, "Locate event (unserializable)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_event_serializes_tagged() {
        let entry = LocateEventEntry {
            request_id: "r1".into(),
            timestamp: Utc::now(),
            event: LocateEvent::Received {
                query: "click Save".into(),
                intent: "click".into(),
                source: "inline".into(),
                document_bytes: 42,
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["event"]["type"], "received");
        assert_eq!(json["event"]["document_bytes"], 42);
    }
}
