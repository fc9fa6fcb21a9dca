use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::TryStreamExt;
use serde_json::json;
use tokio_util::io::StreamReader;

use crate::AppState;
use crate::api::error::RelayError;
use crate::services::staging::StagedFile;
use crate::services::upstream::UpstreamOutcome;
use crate::utils::auth::extract_bearer_token;

/// Relay a profile image upload to the upstream profile service.
///
/// The file is staged to scratch storage first, then the bearer token is
/// checked, then exactly one outbound call is made. The staged file is
/// removed on every path out of this function before the reply is emitted.
#[utoipa::path(
    patch,
    path = "/upload-profile-image",
    request_body(content = Multipart, description = "Profile image upload"),
    responses(
        (status = 200, description = "Upload accepted by the profile service"),
        (status = 400, description = "No file field in the request"),
        (status = 401, description = "Missing bearer token"),
        (status = 500, description = "Profile service unreachable")
    ),
    security(
        ("bearer" = [])
    ),
    tag = "profile"
)]
pub async fn upload_profile_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, RelayError> {
    let mut staged: Option<(StagedFile, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| RelayError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let original_filename = field.file_name().unwrap_or("unnamed").to_string();

            let body_with_io_error =
                field.map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err));
            let reader = StreamReader::new(body_with_io_error);

            let file = state.staging.stage(reader).await?;
            staged = Some((file, original_filename));
        }
    }

    let (staged, original_filename) =
        staged.ok_or_else(|| RelayError::BadRequest("No file provided".to_string()))?;

    // The token check runs after staging so every rejection shares the same
    // cleanup point. The token itself is never logged.
    let Some(token) = extract_bearer_token(&headers) else {
        staged.release();
        return Err(RelayError::MissingCredential);
    };

    tracing::debug!(
        bytes = staged.size_bytes(),
        "Relaying {} to the profile service",
        original_filename
    );

    let outcome = state
        .upstream
        .forward(&staged, &original_filename, token)
        .await;
    let response = map_outcome(outcome);
    staged.release();

    Ok(response)
}

/// Turn the upstream outcome into the reply for the original caller.
///
/// Success and rejection pass the upstream status and body through verbatim;
/// a transport failure collapses to a generic 500 so the caller never sees
/// low-level network detail beyond the failure message.
fn map_outcome(outcome: UpstreamOutcome) -> Response {
    match outcome {
        UpstreamOutcome::Success {
            status,
            body,
            content_type,
        } => {
            tracing::info!(status, "Upstream accepted upload");
            passthrough_response(status, body, content_type)
        }
        UpstreamOutcome::Rejected {
            status,
            body,
            content_type,
        } => {
            tracing::info!(status, "Upstream rejected upload");
            passthrough_response(status, body, content_type)
        }
        UpstreamOutcome::Unreachable { message } => {
            tracing::error!("Upstream call failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Failed to relay upload to profile service",
                    "detail": message,
                })),
            )
                .into_response()
        }
    }
}

fn passthrough_response(status: u16, body: Bytes, content_type: Option<String>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = content_type.unwrap_or_else(|| mime::APPLICATION_JSON.as_ref().to_string());
    (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_success_outcome_passes_through() {
        let outcome = UpstreamOutcome::Success {
            status: 200,
            body: Bytes::from_static(br#"{"filePath":"/images/u123.png"}"#),
            content_type: Some("application/json".to_string()),
        };
        let response = map_outcome(outcome);
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["filePath"], "/images/u123.png");
    }

    #[tokio::test]
    async fn test_rejection_preserves_status_and_body() {
        let outcome = UpstreamOutcome::Rejected {
            status: 413,
            body: Bytes::from_static(br#"{"error":"file too large"}"#),
            content_type: Some("application/json".to_string()),
        };
        let response = map_outcome(outcome);
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(response).await;
        assert_eq!(json["error"], "file too large");
    }

    #[tokio::test]
    async fn test_unreachable_collapses_to_500() {
        let outcome = UpstreamOutcome::Unreachable {
            message: "connection refused".to_string(),
        };
        let response = map_outcome(outcome);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Failed to relay upload to profile service");
        assert_eq!(json["detail"], "connection refused");
    }

    #[tokio::test]
    async fn test_missing_content_type_defaults_to_json() {
        let outcome = UpstreamOutcome::Success {
            status: 201,
            body: Bytes::from_static(b"{}"),
            content_type: None,
        };
        let response = map_outcome(outcome);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
