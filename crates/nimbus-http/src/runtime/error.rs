//! Unified error handling for the HTTP runtime
//!
//! Every failure that reaches a client goes through [`RuntimeError`], which
//! maps to a status code and a structured [`ErrorResponse`] body carrying the
//! request ID.

use axum::{
    extract::{FromRequestParts, Request},
    http::{
        StatusCode,
        header::{HeaderName, HeaderValue},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use nimbus_core::PredictError;
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, fmt};
use utoipa::ToSchema;

/// Header carrying the request ID in both directions.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Maximum length for client-provided request IDs
const MAX_REQUEST_ID_LENGTH: usize = 128;

/// Identifier correlating a request with its logs and error body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Random UUID v4 request ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Accept a client-provided ID if it is safe to log and echo.
    ///
    /// Valid IDs are 1 to 128 characters of ASCII alphanumerics, `-` and `_`.
    pub fn parse(id: &str) -> Option<Self> {
        let valid = !id.is_empty()
            && id.len() <= MAX_REQUEST_ID_LENGTH
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handlers take the ID assigned by [`request_id_middleware`], or a fresh one
/// when the middleware is not installed.
impl<S: Send + Sync> FromRequestParts<S> for RequestId {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestId>()
            .cloned()
            .unwrap_or_else(RequestId::generate))
    }
}

/// Middleware that assigns every request an ID
///
/// A valid `X-Request-ID` header from the client is reused; anything else is
/// replaced with a new UUID. The ID is stored in the request extensions and
/// echoed in the response header.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(RequestId::parse)
        .unwrap_or_else(RequestId::generate);

    request.extensions_mut().insert(request_id.clone());

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(request_id.as_str()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
    }

    response
}

/// Machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request was well-formed but unusable
    InvalidRequest,
    /// The body was not valid JSON for the endpoint
    InvalidJson,
    /// A required dependency (the model) is not available
    ServiceUnavailable,
    /// Processing failed
    InternalError,
    /// The request did not finish in time
    Timeout,
    /// The body exceeded the configured size limit
    PayloadTooLarge,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidJson => "invalid_json",
            Self::ServiceUnavailable => "service_unavailable",
            Self::InternalError => "internal_error",
            Self::Timeout => "timeout",
            Self::PayloadTooLarge => "payload_too_large",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error body returned by every endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    #[schema(example = "invalid_request")]
    pub error: ErrorCode,
    /// Human-readable description
    #[schema(example = "No symptoms were selected")]
    pub detail: String,
    /// Request ID for correlating with server logs
    #[schema(value_type = String, example = "6f1c2a7e-4c1b-4e55-9a0a-3d2b8f9f0c11")]
    pub request_id: RequestId,
    /// When the error was produced
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Specific error information for each error category
#[derive(Debug, Clone)]
pub enum RuntimeErrorKind {
    /// Request content is not usable
    InvalidRequest { reason: String },

    /// Body could not be parsed
    InvalidJson { reason: String },

    /// A dependency is missing
    ServiceUnavailable { service: String },

    /// Processing failed
    InternalError { reason: String },

    /// The request exceeded the configured timeout
    Timeout { duration_ms: u64 },

    /// The body exceeded the configured size limit
    PayloadTooLarge,
}

/// Runtime error with the request it belongs to
#[derive(Debug)]
pub struct RuntimeError {
    pub request_id: RequestId,
    pub kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind, request_id: RequestId) -> Self {
        Self { request_id, kind }
    }

    pub fn invalid_request(reason: impl Into<String>, request_id: RequestId) -> Self {
        Self::new(
            RuntimeErrorKind::InvalidRequest {
                reason: reason.into(),
            },
            request_id,
        )
    }

    pub fn invalid_json(reason: impl Into<String>, request_id: RequestId) -> Self {
        Self::new(
            RuntimeErrorKind::InvalidJson {
                reason: reason.into(),
            },
            request_id,
        )
    }

    pub fn service_unavailable(service: impl Into<String>, request_id: RequestId) -> Self {
        Self::new(
            RuntimeErrorKind::ServiceUnavailable {
                service: service.into(),
            },
            request_id,
        )
    }

    pub fn internal_error(reason: impl Into<String>, request_id: RequestId) -> Self {
        Self::new(
            RuntimeErrorKind::InternalError {
                reason: reason.into(),
            },
            request_id,
        )
    }

    pub fn timeout(duration_ms: u64, request_id: RequestId) -> Self {
        Self::new(RuntimeErrorKind::Timeout { duration_ms }, request_id)
    }

    pub fn payload_too_large(request_id: RequestId) -> Self {
        Self::new(RuntimeErrorKind::PayloadTooLarge, request_id)
    }

    /// Map a prediction failure onto its HTTP category.
    pub fn from_predict(err: PredictError, request_id: RequestId) -> Self {
        match err {
            PredictError::NoSymptoms => {
                Self::invalid_request("No symptoms were selected", request_id)
            }
            PredictError::ModelUnavailable => Self::service_unavailable("model", request_id),
            PredictError::Model(_) | PredictError::Rank(_) => {
                Self::internal_error(format!("Error processing prediction: {err}"), request_id)
            }
        }
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn kind(&self) -> &RuntimeErrorKind {
        &self.kind
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.kind {
            RuntimeErrorKind::InvalidRequest { .. } | RuntimeErrorKind::InvalidJson { .. } => {
                StatusCode::BAD_REQUEST
            }
            RuntimeErrorKind::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            RuntimeErrorKind::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            RuntimeErrorKind::Timeout { .. } => StatusCode::REQUEST_TIMEOUT,
            RuntimeErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match &self.kind {
            RuntimeErrorKind::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            RuntimeErrorKind::InvalidJson { .. } => ErrorCode::InvalidJson,
            RuntimeErrorKind::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
            RuntimeErrorKind::InternalError { .. } => ErrorCode::InternalError,
            RuntimeErrorKind::Timeout { .. } => ErrorCode::Timeout,
            RuntimeErrorKind::PayloadTooLarge => ErrorCode::PayloadTooLarge,
        }
    }

    /// Client-facing description.
    ///
    /// Internal errors carry the underlying message so the mobile client can
    /// show why a prediction failed.
    pub fn detail(&self) -> String {
        match &self.kind {
            RuntimeErrorKind::InvalidRequest { reason } => reason.clone(),
            RuntimeErrorKind::InvalidJson { reason } => {
                format!("Invalid JSON in request body: {reason}")
            }
            RuntimeErrorKind::ServiceUnavailable { service } if service == "model" => {
                "Model is not loaded".to_string()
            }
            RuntimeErrorKind::ServiceUnavailable { service } => {
                format!("{service} is temporarily unavailable")
            }
            RuntimeErrorKind::InternalError { reason } => reason.clone(),
            RuntimeErrorKind::Timeout { .. } => "The request timed out".to_string(),
            RuntimeErrorKind::PayloadTooLarge => {
                "Request body exceeds the configured size limit".to_string()
            }
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.error_code(),
            detail: self.detail(),
            request_id: self.request_id.clone(),
            timestamp: chrono::Utc::now(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuntimeErrorKind::InvalidRequest { reason } => write!(f, "Invalid request: {reason}"),
            RuntimeErrorKind::InvalidJson { reason } => write!(f, "Invalid JSON: {reason}"),
            RuntimeErrorKind::ServiceUnavailable { service } => {
                write!(f, "Service unavailable: {service}")
            }
            RuntimeErrorKind::InternalError { reason } => write!(f, "Internal error: {reason}"),
            RuntimeErrorKind::Timeout { duration_ms } => {
                write!(f, "Request timed out after {duration_ms}ms")
            }
            RuntimeErrorKind::PayloadTooLarge => f.write_str("Request body too large"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl IntoResponse for RuntimeError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(
                error_code = %self.error_code(),
                request_id = %self.request_id(),
                status_code = %status_code,
                error_message = %self,
                "HTTP runtime error occurred"
            );
        } else {
            tracing::warn!(
                error_code = %self.error_code(),
                request_id = %self.request_id(),
                status_code = %status_code,
                error_message = %self,
                "Request rejected"
            );
        }

        (status_code, Json(self.to_error_response())).into_response()
    }
}

/// Result type alias for HTTP runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_core::ModelError;

    #[test]
    fn test_request_id_generation() {
        let id1 = RequestId::generate();
        let id2 = RequestId::generate();
        assert_ne!(id1, id2);
        assert_eq!(id1.as_str().len(), 36);
    }

    #[test]
    fn test_request_id_validation() {
        assert!(RequestId::parse("req-123_abc").is_some());
        assert!(RequestId::parse("").is_none());
        assert!(RequestId::parse("key:value").is_none());
        assert!(RequestId::parse("line\nbreak").is_none());
        assert!(RequestId::parse(&"a".repeat(129)).is_none());
        assert!(RequestId::parse(&"a".repeat(128)).is_some());
    }

    #[test]
    fn test_status_code_mapping() {
        let request_id = RequestId::generate();

        let error = RuntimeError::invalid_request("empty", request_id.clone());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let error = RuntimeError::invalid_json("eof", request_id.clone());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);

        let error = RuntimeError::service_unavailable("model", request_id.clone());
        assert_eq!(error.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let error = RuntimeError::internal_error("boom", request_id.clone());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = RuntimeError::timeout(30_000, request_id.clone());
        assert_eq!(error.status_code(), StatusCode::REQUEST_TIMEOUT);

        let error = RuntimeError::payload_too_large(request_id);
        assert_eq!(error.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error.error_code().as_str(), "payload_too_large");
    }

    #[test]
    fn test_predict_error_mapping() {
        let request_id = RequestId::generate();

        let error = RuntimeError::from_predict(PredictError::NoSymptoms, request_id.clone());
        assert_eq!(error.error_code(), ErrorCode::InvalidRequest);
        assert_eq!(error.detail(), "No symptoms were selected");

        let error = RuntimeError::from_predict(PredictError::ModelUnavailable, request_id.clone());
        assert_eq!(error.error_code(), ErrorCode::ServiceUnavailable);
        assert_eq!(error.detail(), "Model is not loaded");

        let error = RuntimeError::from_predict(
            PredictError::Model(ModelError::FeatureMismatch {
                expected: 40,
                actual: 50,
            }),
            request_id,
        );
        assert_eq!(error.error_code(), ErrorCode::InternalError);
        assert!(error.detail().starts_with("Error processing prediction:"));
        assert!(error.detail().contains("model expects 40"));
    }

    #[test]
    fn test_error_response_body() {
        let request_id = RequestId::parse("abc-123").unwrap();
        let error = RuntimeError::invalid_request("No symptoms were selected", request_id);

        let json = serde_json::to_value(error.to_error_response()).unwrap();
        assert_eq!(json["error"], "invalid_request");
        assert_eq!(json["detail"], "No symptoms were selected");
        assert_eq!(json["request_id"], "abc-123");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::ServiceUnavailable.to_string(), "service_unavailable");
        let serialized = serde_json::to_string(&ErrorCode::InvalidJson).unwrap();
        assert_eq!(serialized, r#""invalid_json""#);
    }
}
