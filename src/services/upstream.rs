use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::config::RelayConfig;
use crate::services::staging::StagedFile;

/// Result of forwarding an upload to the profile service
#[derive(Debug, Clone)]
pub enum UpstreamOutcome {
    /// Upstream answered with a success status; body passed through verbatim
    Success {
        status: u16,
        body: Bytes,
        content_type: Option<String>,
    },
    /// Upstream answered with an error status; body passed through verbatim
    Rejected {
        status: u16,
        body: Bytes,
        content_type: Option<String>,
    },
    /// No response obtained at all (connect, DNS, timeout, reset)
    Unreachable { message: String },
}

/// Trait for upstream delivery implementations
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Send the staged file to the profile service as one multipart request,
    /// passing the caller's bearer credential through unmodified.
    ///
    /// The outcome is always a value, never an error: a failed delivery is
    /// something the caller maps to a response, not a condition to propagate.
    async fn forward(
        &self,
        staged: &StagedFile,
        original_filename: &str,
        credential: &str,
    ) -> UpstreamOutcome;
}

/// Client that forwards uploads to the real profile service
pub struct RealUpstreamClient {
    client: Client,
    url: String,
}

impl RealUpstreamClient {
    /// The timeout caps the whole outbound call so a slow upstream cannot
    /// hold the staged file indefinitely. Redirects are not followed: a 3xx
    /// is an upstream answer to pass through, and following it would issue
    /// a second outbound call.
    pub fn new(url: String, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl UpstreamClient for RealUpstreamClient {
    async fn forward(
        &self,
        staged: &StagedFile,
        original_filename: &str,
        credential: &str,
    ) -> UpstreamOutcome {
        let file = match tokio::fs::File::open(staged.path()).await {
            Ok(f) => f,
            Err(e) => {
                return UpstreamOutcome::Unreachable {
                    message: format!("Failed to open staged file: {}", e),
                };
            }
        };

        // The caller-supplied filename is part metadata only; the bytes come
        // from the staged path, streamed rather than buffered.
        let part = Part::stream_with_length(
            reqwest::Body::wrap_stream(ReaderStream::new(file)),
            staged.size_bytes(),
        )
        .file_name(original_filename.to_string());
        let form = Form::new().part("file", part);

        let response = match self
            .client
            .patch(&self.url)
            .bearer_auth(credential)
            .multipart(form)
            .send()
            .await
        {
            Ok(resp) => resp,
            // The error's display text never contains request headers, so the
            // credential stays out of the logs.
            Err(e) => {
                return UpstreamOutcome::Unreachable {
                    message: e.to_string(),
                };
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                return UpstreamOutcome::Unreachable {
                    message: format!("Failed to read upstream response: {}", e),
                };
            }
        };

        if status.is_success() {
            UpstreamOutcome::Success {
                status: status.as_u16(),
                body,
                content_type,
            }
        } else {
            UpstreamOutcome::Rejected {
                status: status.as_u16(),
                body,
                content_type,
            }
        }
    }
}

/// Canned-response client for development and tests
///
/// Reproduces the contract of the stand-in profile service: a simulated
/// delay, then a fixed success body echoing the uploaded filename.
pub struct MockUpstreamClient {
    delay: Duration,
}

impl MockUpstreamClient {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl UpstreamClient for MockUpstreamClient {
    async fn forward(
        &self,
        _staged: &StagedFile,
        original_filename: &str,
        _credential: &str,
    ) -> UpstreamOutcome {
        tracing::warn!("MockUpstreamClient: returning canned response (development mode)");

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let body = serde_json::json!({
            "message": "Mock upload successful!",
            "filePath": format!("/mock/path/{}", original_filename),
        });

        UpstreamOutcome::Success {
            status: 200,
            body: Bytes::from(body.to_string()),
            content_type: Some(mime::APPLICATION_JSON.as_ref().to_string()),
        }
    }
}

/// Factory function to create the appropriate upstream client based on config
pub fn create_upstream_client(config: &RelayConfig) -> anyhow::Result<Arc<dyn UpstreamClient>> {
    match config.upstream_mode.to_lowercase().as_str() {
        "real" => {
            let client = RealUpstreamClient::new(
                config.upstream_url.clone(),
                Duration::from_secs(config.upstream_timeout_secs),
            )?;
            Ok(Arc::new(client))
        }
        "mock" => Ok(Arc::new(MockUpstreamClient::new(Duration::from_millis(
            config.mock_upstream_delay_ms,
        )))),
        other => {
            tracing::warn!(
                "Unknown upstream mode '{}', using MockUpstreamClient",
                other
            );
            Ok(Arc::new(MockUpstreamClient::new(Duration::from_millis(
                config.mock_upstream_delay_ms,
            ))))
        }
    }
}
