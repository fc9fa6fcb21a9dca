use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors the relay raises on its own, before an upstream outcome exists.
///
/// Upstream rejections are deliberately not represented here: their status
/// and body pass through verbatim and never enter the local error path.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("No token provided")]
    MissingCredential,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Staging failed: {0}")]
    Staging(#[from] std::io::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RelayError::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                json!({ "error": "No token provided" }),
            ),
            RelayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            RelayError::Staging(e) => {
                tracing::error!("Failed to stage upload: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Failed to relay upload to profile service",
                        "detail": e.to_string(),
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
