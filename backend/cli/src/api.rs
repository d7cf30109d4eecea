use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use pinpoint_core::LocateError;

use crate::service::{LocateRequest, LocateService};

/// Shared application state for API handlers.
pub struct AppState {
    pub service: LocateService,
    pub started_at: DateTime<Utc>,
}

/// Request envelope allowance on top of the escaped document.
const BODY_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the Axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    // JSON escaping can double the size of inline markup.
    let body_limit = state
        .service
        .max_document_bytes()
        .saturating_mul(2)
        .saturating_add(BODY_OVERHEAD_BYTES);
    Router::new()
        .route("/api/health", get(health))
        .route("/api/locate", post(locate))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "pinpoint",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": (Utc::now() - state.started_at).num_seconds(),
    }))
}

/// Rank candidates for a query against inline HTML or a fetched URL.
async fn locate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LocateRequest>,
) -> Result<Response, ApiError> {
    let request_id = Uuid::new_v4().to_string();
    match state.service.locate(&request_id, request).await {
        Ok(result) => Ok(([("x-request-id", request_id)], Json(result)).into_response()),
        Err(error) => Err(ApiError { request_id, error }),
    }
}

/// A failed locate request, rendered as `{ "error", "requestId" }`.
struct ApiError {
    request_id: String,
    error: LocateError,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.error {
            LocateError::MalformedDocument(_) => StatusCode::BAD_REQUEST,
            LocateError::DocumentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            LocateError::Fetch(_) => StatusCode::BAD_GATEWAY,
            LocateError::UnsupportedRenderMode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            LocateError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(request_id = %self.request_id, error = %self.error, "Locate failed");
        }
        let body = Json(json!({
            "error": self.error.to_string(),
            "requestId": self.request_id,
        }));
        (status, [("x-request-id", self.request_id)], body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use pinpoint_config::PinpointConfig;
    use tower::ServiceExt;

    use crate::fetch::DocumentSource;

    struct NoFetch;

    #[async_trait]
    impl DocumentSource for NoFetch {
        async fn fetch(&self, url: &str) -> anyhow::Result<String> {
            anyhow::bail!("offline: {url}")
        }
    }

    fn app() -> Router {
        app_with(&PinpointConfig::default())
    }

    fn app_with(config: &PinpointConfig) -> Router {
        build_router(Arc::new(AppState {
            service: LocateService::new(config, Arc::new(NoFetch)),
            started_at: Utc::now(),
        }))
    }

    async fn post_locate(body: Value) -> (StatusCode, Value) {
        post_locate_to(app(), body).await
    }

    async fn post_locate_to(app: Router, body: Value) -> (StatusCode, Value) {
        let request = Request::post("/api/locate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        assert!(response.headers().contains_key("x-request-id"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let response = app()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn locate_returns_camel_case_result() {
        let (status, body) = post_locate(json!({
            "html": r#"<button id="login">Login</button>"#,
            "query": "click Login button",
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["best"]["css"], "#login");
        assert_eq!(body["totalCandidates"], 1);
        assert_eq!(body["candidates"][0]["unique"], true);
    }

    #[tokio::test]
    async fn error_statuses() {
        let (status, body) = post_locate(json!({
            "url": "https://example.com",
            "query": "click Login",
            "render": "live",
        }))
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("live"));

        let (status, _) = post_locate(json!({ "url": "https://example.com", "query": "click Login" })).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) = post_locate(json!({ "html": "no markup", "query": "click Login" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn body_limit_follows_document_limit() {
        let padding = "x".repeat(3 * 1024 * 1024);
        let (status, body) = post_locate(json!({
            "html": format!("<button id=\"go\">Go</button><!-- {padding} -->"),
            "query": "click Go",
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["best"]["css"], "#go");

        let mut config = PinpointConfig::default();
        config.engine = Some(pinpoint_config::EngineSettings {
            max_document_bytes: Some(1024),
            ..Default::default()
        });
        let html = format!("<button>Go</button><!-- {} -->", "x".repeat(2048));
        let (status, body) = post_locate_to(app_with(&config), json!({ "html": html, "query": "click Go" })).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].as_str().unwrap().contains("too large"));
    }
}
