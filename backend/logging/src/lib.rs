//! Telemetry and structured logging for Pinpoint.
//!
//! Handles subscriber setup (console + optional rolling NDJSON file), redaction of
//! typed values in queries, and per-request locate events.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogger, LocateEvent, LocateEventEntry};
pub use logger::{init_logger, LogFormat};
pub use redact::{redact_query, redact_sensitive_data};
