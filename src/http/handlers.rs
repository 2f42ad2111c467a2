//! Axum routes.

use crate::gateway::{Gateway, ToolRequest};
use crate::http::encoder::encode;
use crate::types::{RequestId, ServerConfig};
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Header a caller may set to correlate its request with gateway logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub gateway: Arc<Gateway>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            started_at: Utc::now(),
        }
    }
}

/// Build the router. Bodies above `server.max_body_bytes` get 413.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/mcp", post(call_tool))
        .route("/tools", get(list_tools))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(state)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// POST /mcp
async fn call_tool(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!("body rejected: {}", rejection);
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    let request: ToolRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("invalid request: {e}"));
        }
    };

    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| RequestId::from_string(v.to_string()).ok())
        .unwrap_or_default();

    let outcome = state.gateway.dispatch_with_id(request_id, request).await;
    let (status, payload) = encode(&outcome);
    (status, Json(payload)).into_response()
}

/// GET /tools
async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    let tools = state.gateway.list_tools();
    let count = tools.len();
    Json(json!({ "tools": tools, "count": count }))
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<Value> {
    let limiters: Map<String, Value> = state
        .gateway
        .limiter_stats()
        .into_iter()
        .map(|(name, stats)| (name, json!(stats)))
        .collect();
    Json(json!({
        "status": "ok",
        "tools": state.gateway.registry().len(),
        "started_at": state.started_at.to_rfc3339(),
        "limiters": limiters,
    }))
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "not_found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Capabilities, ToolRegistry};
    use crate::types::ToolsConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;
    use tracing_test::traced_test;

    fn app(max_body_bytes: usize) -> Router {
        let gateway = Gateway::from_config(&ToolsConfig::default(), &Capabilities::local()).unwrap();
        let config = ServerConfig {
            max_body_bytes,
            ..ServerConfig::default()
        };
        router(AppState::new(Arc::new(gateway)), &config)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_mcp(body: impl Into<Body>) -> Request<Body> {
        Request::post("/mcp")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let (status, body) = send(app(1024), post_mcp(r#"{"tool":"bogus","input":{}}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "tool_unknown"}));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_request_id_header_tags_dispatch_span() {
        let request = Request::post("/mcp")
            .header("content-type", "application/json")
            .header(REQUEST_ID_HEADER, "req-abc-123")
            .body(Body::from(r#"{"tool":"bogus","input":{}}"#))
            .unwrap();
        let (status, _) = send(app(1024), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(logs_contain("request_id=req-abc-123"));
        assert!(logs_contain("tool=bogus"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_missing_request_id_header_gets_generated_id() {
        let (status, _) = send(app(1024), post_mcp(r#"{"tool":"bogus","input":{}}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(logs_contain("request_id="));
        assert!(!logs_contain("req-abc-123"));
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (status, body) = send(app(1024), post_mcp("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid request:"));
    }

    #[tokio::test]
    async fn test_missing_tool_field() {
        let (status, body) = send(app(1024), post_mcp(r#"{"input":{}}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("tool"));
    }

    #[tokio::test]
    async fn test_oversized_body() {
        let big = format!(r#"{{"tool":"readFile","input":{{"path":"{}"}}}}"#, "a".repeat(256));
        let (status, body) = send(app(64), post_mcp(big)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::get("/nope").body(Body::empty()).unwrap();
        let (status, body) = send(app(1024), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "not_found"}));
    }

    #[tokio::test]
    async fn test_health_reports_limiters() {
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(1024), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["tools"], 3);
        assert_eq!(body["limiters"]["writeFile"]["limit"], 1);
        assert_eq!(body["limiters"]["writeFile"]["in_flight"], 0);
    }

    #[tokio::test]
    async fn test_empty_registry_lists_nothing() {
        let gateway = Gateway::new(ToolRegistry::builder().build());
        let app = router(AppState::new(Arc::new(gateway)), &ServerConfig::default());
        let request = Request::get("/tools").body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"tools": [], "count": 0}));
    }
}
