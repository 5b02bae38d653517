//! Tool dispatch endpoints.
//!
//! Extraction failures are taken as `Result`s so that every answer on a tool
//! route, including undecodable slugs, oversized bodies and wrong methods,
//! carries the dispatch envelope and headers.

use super::AppState;
use crate::dispatch::DispatchResponse;
use crate::errors::{Constraint, DispatchError, FieldViolation, ValidationError};
use crate::tools::INPUT_FIELD;
use axum::body::{Body, Bytes};
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::{debug, error};

impl IntoResponse for DispatchResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = match self.body_bytes() {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(error = %err, "Response body could not be serialized");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        let mut builder = Response::builder().status(status);
        for (name, value) in self.headers() {
            builder = builder.header(*name, *value);
        }
        builder.body(Body::from(body)).unwrap_or_else(|err| {
            error!(error = %err, "Response could not be built");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
    }
}

fn body_violation(tool: &str, message: String, constraint: Constraint) -> DispatchError {
    ValidationError::new(tool, vec![FieldViolation::new(INPUT_FIELD, message, constraint)]).into()
}

/// Parses a request body; an empty body is `null`.
pub(super) fn parse_body(tool: &str, body: &[u8]) -> Result<Value, DispatchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|err| {
        body_violation(tool, format!("body is not valid JSON: {err}"), Constraint::MalformedJson)
    })
}

/// Unwraps a buffered body, turning a rejection into a validation error.
pub(super) fn read_body(tool: &str, body: Result<Bytes, BytesRejection>) -> Result<Bytes, DispatchError> {
    body.map_err(|rejection| {
        debug!(tool = %tool, status = %rejection.status(), "Request body rejected");
        body_violation(
            tool,
            format!("body could not be read: {}", rejection.body_text()),
            Constraint::UnreadableBody,
        )
    })
}

pub(super) async fn dispatch_tool(
    State(state): State<AppState>,
    uri: Uri,
    slug: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> DispatchResponse {
    let slug = match slug {
        Ok(Path(slug)) => slug,
        Err(rejection) => {
            debug!(path = %uri.path(), error = %rejection, "Undecodable tool slug");
            uri.path().trim_start_matches('/').to_string()
        }
    };

    // Unknown slugs are 404 whatever the body looks like.
    if !state.dispatcher.registry().contains(&slug) {
        return state.dispatcher.dispatch(&slug, Value::Null).await;
    }
    match read_body(&slug, body).and_then(|body| parse_body(&slug, &body)) {
        Ok(raw) => state.dispatcher.dispatch(&slug, raw).await,
        Err(err) => DispatchResponse::format(Err(err)),
    }
}

pub(super) async fn preflight(State(state): State<AppState>) -> DispatchResponse {
    state.dispatcher.preflight()
}

pub(super) async fn method_not_allowed(method: Method) -> DispatchResponse {
    DispatchResponse::method_not_allowed(method.as_str())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{json_body, send};
    use axum::http::StatusCode;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn test_post_dispatches_tool() {
        let response = send("POST", "/echo", r#"{"hello": "world"}"#).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(json_body(response).await, json!({"result": {"hello": "world"}}));
    }

    #[tokio::test]
    async fn test_validation_error_envelope() {
        let response = send("POST", "/ping", r#"{"count": 25}"#).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["access-control-allow-methods"], "POST, OPTIONS");
        let body = json_body(response).await;
        assert_eq!(body["error"]["kind"], "ValidationError");
        assert_eq!(body["error"]["details"]["violations"][0]["field"], "count");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_404_even_with_bad_json() {
        let response = send("POST", "/ghost", "{not json").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["access-control-allow-headers"], "Content-Type");
        let body = json_body(response).await;
        assert_eq!(body["error"]["kind"], "NotFoundError");
        assert_eq!(body["error"]["message"], "Tool not found: ghost");
    }

    #[tokio::test]
    async fn test_malformed_json_is_validation_error() {
        let response = send("POST", "/echo", "{not json").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["details"]["violations"][0]["rule"], "malformed_json");
    }

    #[tokio::test]
    async fn test_empty_body_uses_defaults() {
        let response = send("POST", "/ping", "").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_tool_failure_is_500() {
        let response = send("POST", "/broken", "{}").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "Tool 'broken' failed: sensor offline");
    }

    #[tokio::test]
    async fn test_undecodable_slug_is_404_envelope() {
        let response = send("POST", "/%FF", "{}").await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(json_body(response).await["error"]["kind"], "NotFoundError");
    }

    #[tokio::test]
    async fn test_oversized_body_for_unknown_tool_is_404() {
        let body = format!(r#"{{"pad": "{}"}}"#, "x".repeat(3 * 1024 * 1024));
        let response = send("POST", "/ghost", &body).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(json_body(response).await["error"]["kind"], "NotFoundError");
    }

    #[tokio::test]
    async fn test_oversized_body_for_known_tool_is_validation_error() {
        let body = format!(r#"{{"pad": "{}"}}"#, "x".repeat(3 * 1024 * 1024));
        let response = send("POST", "/echo", &body).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body = json_body(response).await;
        assert_eq!(body["error"]["kind"], "ValidationError");
        assert_eq!(body["error"]["details"]["violations"][0]["rule"], "unreadable_body");
    }

    #[tokio::test]
    async fn test_wrong_method_gets_envelope() {
        let response = send("GET", "/echo", "").await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["content-type"], "application/json");
        assert_eq!(response.headers()["access-control-allow-methods"], "POST, OPTIONS");
        let body = json_body(response).await;
        assert_eq!(body["error"]["details"]["allowed"], json!(["POST", "OPTIONS"]));
    }

    #[tokio::test]
    async fn test_preflight_headers_without_body() {
        let response = send("OPTIONS", "/anything", "").await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(response.headers()["access-control-allow-methods"], "POST, OPTIONS");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}
