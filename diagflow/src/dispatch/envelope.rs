//! Uniform response envelope and headers.

use crate::errors::{DispatchError, ErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Headers attached to every dispatch response, including errors and
/// pre-flight answers.
pub static RESPONSE_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// Body of an error envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error kind.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Structured details (validation violations, unresolved slug).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<&DispatchError> for ErrorBody {
    fn from(err: &DispatchError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}

/// Either `{ "result": ... }` or `{ "error": { kind, message, details? } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Envelope {
    /// Successful tool output.
    Result(Value),
    /// Formatted dispatch error.
    Error(ErrorBody),
}

impl Envelope {
    /// Returns the tool output for successful envelopes.
    #[must_use]
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Result(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Returns the error body for failed envelopes.
    #[must_use]
    pub fn error(&self) -> Option<&ErrorBody> {
        match self {
            Self::Result(_) => None,
            Self::Error(body) => Some(body),
        }
    }
}

/// A transport-independent dispatch response.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body, absent for pre-flight answers.
    pub body: Option<Envelope>,
}

impl DispatchResponse {
    /// Formats a dispatch outcome. Every exit path of a dispatch goes through
    /// here, so status mapping and headers cannot diverge between paths.
    #[must_use]
    pub fn format(outcome: Result<Value, DispatchError>) -> Self {
        match outcome {
            Ok(value) => Self {
                status: 200,
                body: Some(Envelope::Result(value)),
            },
            Err(err) => Self {
                status: err.status_code(),
                body: Some(Envelope::Error(ErrorBody::from(&err))),
            },
        }
    }

    /// Answer to an `OPTIONS` pre-flight request: headers only, no body.
    #[must_use]
    pub fn preflight() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    /// Answer to a method other than `POST` or `OPTIONS` on a tool route.
    #[must_use]
    pub fn method_not_allowed(method: &str) -> Self {
        Self {
            status: 405,
            body: Some(Envelope::Error(ErrorBody {
                kind: ErrorKind::ValidationError,
                message: format!("Method {method} is not allowed, use POST"),
                details: Some(serde_json::json!({ "allowed": ["POST", "OPTIONS"] })),
            })),
        }
    }

    /// Returns the response headers.
    #[must_use]
    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        &RESPONSE_HEADERS
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&'static str> {
        RESPONSE_HEADERS
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| *value)
    }

    /// Returns true for 2xx responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Serializes the body; empty for pre-flight answers.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool output cannot be serialized.
    pub fn body_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        match &self.body {
            Some(envelope) => serde_json::to_vec(envelope),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{NotFoundError, ToolExecutionError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_method_not_allowed_envelope() {
        let response = DispatchResponse::method_not_allowed("GET");

        assert_eq!(response.status, 405);
        let error = response.body.as_ref().and_then(Envelope::error).unwrap();
        assert_eq!(error.kind, ErrorKind::ValidationError);
        assert_eq!(error.details, Some(json!({"allowed": ["POST", "OPTIONS"]})));
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_success_envelope_shape() {
        let response = DispatchResponse::format(Ok(json!({"verdict": "ok"})));
        assert_eq!(response.status, 200);
        assert!(response.is_success());

        let body: Value = serde_json::from_slice(&response.body_bytes().unwrap()).unwrap();
        assert_eq!(body, json!({"result": {"verdict": "ok"}}));
    }

    #[test]
    fn test_error_envelope_shape() {
        let response = DispatchResponse::format(Err(NotFoundError::tool("nope").into()));
        assert_eq!(response.status, 404);

        let body: Value = serde_json::from_slice(&response.body_bytes().unwrap()).unwrap();
        assert_eq!(body["error"]["kind"], "NotFoundError");
        assert_eq!(body["error"]["message"], "Tool not found: nope");
        assert_eq!(body["error"]["details"]["slug"], "nope");
    }

    #[test]
    fn test_error_without_details_omits_field() {
        let response = DispatchResponse::format(Err(ToolExecutionError::new("calc", "division by zero").into()));
        assert_eq!(response.status, 500);

        let body: Value = serde_json::from_slice(&response.body_bytes().unwrap()).unwrap();
        assert!(body["error"].get("details").is_none());
        assert_eq!(body["error"]["kind"], "ToolExecutionError");
    }

    #[test]
    fn test_preflight_has_headers_and_no_body() {
        let response = DispatchResponse::preflight();
        assert_eq!(response.status, 204);
        assert!(response.body.is_none());
        assert!(response.body_bytes().unwrap().is_empty());
        assert_eq!(response.header("access-control-allow-origin"), Some("*"));
        assert_eq!(response.header("Access-Control-Allow-Methods"), Some("POST, OPTIONS"));
    }

    #[test]
    fn test_all_paths_share_headers() {
        let ok = DispatchResponse::format(Ok(json!(1)));
        let err = DispatchResponse::format(Err(NotFoundError::tool("x").into()));
        let pre = DispatchResponse::preflight();

        assert_eq!(ok.headers(), err.headers());
        assert_eq!(ok.headers(), pre.headers());
        assert_eq!(ok.header("content-type"), Some("application/json"));
        assert_eq!(ok.header("Access-Control-Allow-Headers"), Some("Content-Type"));
    }

    #[test]
    fn test_envelope_accessors() {
        let envelope: Envelope = serde_json::from_value(json!({"result": [1, 2]})).unwrap();
        assert_eq!(envelope.result(), Some(&json!([1, 2])));
        assert!(envelope.error().is_none());
    }
}
