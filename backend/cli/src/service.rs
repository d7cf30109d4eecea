//! Request handling shared by `pinpoint locate` and `POST /api/locate`.

use std::sync::Arc;

use anyhow::anyhow;
use pinpoint_config::PinpointConfig;
use pinpoint_core::{LocateError, RankedResult};
use pinpoint_engine::{Engine, LocateOptions};
use pinpoint_logging::{EventLogger, LocateEvent};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fetch::DocumentSource;

/// How the document should be obtained when a URL is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Served markup only.
    #[default]
    Static,
    /// Script-rendered page; needs a browser and is not supported.
    Live,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocateRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    pub query: String,
    #[serde(default)]
    pub container_hint: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub render: RenderMode,
}

pub struct LocateService {
    engine: Arc<Engine>,
    source: Arc<dyn DocumentSource>,
    allow_fetch: bool,
    redact_values: bool,
}

impl LocateService {
    pub fn new(config: &PinpointConfig, source: Arc<dyn DocumentSource>) -> Self {
        Self {
            engine: Arc::new(Engine::new(config)),
            source,
            allow_fetch: config.allow_fetch(),
            redact_values: config.redact_values(),
        }
    }

    pub fn max_document_bytes(&self) -> usize {
        self.engine.max_document_bytes()
    }

    pub async fn locate(&self, request_id: &str, request: LocateRequest) -> Result<RankedResult, LocateError> {
        let result = self.run(request_id, request).await;
        match &result {
            Ok(ranked) => {
                let best = ranked.best.as_ref();
                EventLogger::log_event(
                    request_id,
                    LocateEvent::Ranked {
                        total_candidates: ranked.total_candidates,
                        best_score: best.map(|b| b.score),
                        best_css: best.and_then(|b| b.css.clone()),
                        unique: best.map(|b| b.unique).unwrap_or(false),
                    },
                    None,
                    self.redact_values,
                );
            }
            Err(e) => {
                warn!(request_id, error = %e, "Locate request failed");
                EventLogger::log_event(
                    request_id,
                    LocateEvent::Failed { error: e.to_string() },
                    None,
                    self.redact_values,
                );
            }
        }
        result
    }

    async fn run(&self, request_id: &str, request: LocateRequest) -> Result<RankedResult, LocateError> {
        if request.render == RenderMode::Live {
            return Err(LocateError::UnsupportedRenderMode("live".into()));
        }

        let (html, source) = match (request.html, request.url) {
            (Some(html), _) => (html, "inline".to_string()),
            (None, Some(url)) => {
                if !self.allow_fetch {
                    return Err(LocateError::Fetch("URL fetching is disabled".into()));
                }
                let html = self
                    .source
                    .fetch(&url)
                    .await
                    .map_err(|e| LocateError::Fetch(format!("{e:#}")))?;
                (html, url)
            }
            (None, None) => {
                return Err(LocateError::MalformedDocument(
                    "request needs either `html` or `url`".into(),
                ))
            }
        };

        let query = self.engine.parse_query(&request.query);
        EventLogger::log_event(
            request_id,
            LocateEvent::Received {
                query: request.query.clone(),
                intent: query.intent.to_string(),
                source,
                document_bytes: html.len(),
            },
            query.value.as_deref(),
            self.redact_values,
        );

        let options = LocateOptions {
            container_hint: request.container_hint,
            limit: request.limit,
        };

        // Parsing and scoring are CPU-bound and the parsed tree is not `Send`.
        let engine = Arc::clone(&self.engine);
        tokio::task::spawn_blocking(move || {
            let doc = engine.load(&html)?;
            Ok::<_, LocateError>(engine.locate_query(&doc, &query, &options))
        })
        .await
        .map_err(|e| LocateError::Other(anyhow!("locate task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticPage(&'static str);

    #[async_trait]
    impl DocumentSource for StaticPage {
        async fn fetch(&self, _url: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn service(config: &PinpointConfig) -> LocateService {
        LocateService::new(config, Arc::new(StaticPage(r#"<a href="/docs" id="docs">Docs</a>"#)))
    }

    fn request(query: &str) -> LocateRequest {
        LocateRequest {
            query: query.into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn locates_inline_html() {
        let req = LocateRequest {
            html: Some(r#"<button id="login">Login</button>"#.into()),
            ..request("click Login button")
        };
        let result = service(&PinpointConfig::default()).locate("t1", req).await.unwrap();
        assert_eq!(result.best.unwrap().css.as_deref(), Some("#login"));
    }

    #[tokio::test]
    async fn fetches_url_documents() {
        let req = LocateRequest {
            url: Some("https://example.com".into()),
            ..request("open Docs link")
        };
        let result = service(&PinpointConfig::default()).locate("t2", req).await.unwrap();
        assert_eq!(result.best.unwrap().css.as_deref(), Some("#docs"));
    }

    #[tokio::test]
    async fn rejects_live_render_and_missing_document() {
        let svc = service(&PinpointConfig::default());
        let live = LocateRequest {
            url: Some("https://example.com".into()),
            render: RenderMode::Live,
            ..request("click Docs")
        };
        assert!(matches!(
            svc.locate("t3", live).await,
            Err(LocateError::UnsupportedRenderMode(_))
        ));
        assert!(matches!(
            svc.locate("t4", request("click Docs")).await,
            Err(LocateError::MalformedDocument(_))
        ));
    }

    #[tokio::test]
    async fn fetch_can_be_disabled() {
        let mut config = PinpointConfig::default();
        config.server = Some(pinpoint_config::ServerSettings {
            allow_fetch: Some(false),
            ..Default::default()
        });
        let req = LocateRequest {
            url: Some("https://example.com".into()),
            ..request("click Docs")
        };
        assert!(matches!(service(&config).locate("t5", req).await, Err(LocateError::Fetch(_))));
    }
}
