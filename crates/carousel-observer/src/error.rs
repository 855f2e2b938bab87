//! Error types for the host API server.
//!
//! Host operations never fail: an unknown cell or item answers `200` with a
//! no-op result. [`ObserverError`] covers the requests that cannot be
//! applied at all and converts into a JSON error response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the host API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The request was well-formed JSON but carries an unusable value.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No tick loop is attached, so operator commands have nothing to act on.
    #[error("operator state not available")]
    OperatorUnavailable,

    /// The engine's tick loop drives the session; host ticks are refused.
    #[error("ticks are driven by the engine's tick loop")]
    TickSourceConflict,
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::OperatorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::TickSourceConflict => StatusCode::CONFLICT,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
