use std::env;
use std::path::PathBuf;

/// Runtime configuration for the upload relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Port the relay listens on (default: 5001)
    pub port: u16,

    /// Upstream client selection: "real" or "mock" (default: "mock")
    pub upstream_mode: String,

    /// Endpoint of the profile service the upload is forwarded to
    pub upstream_url: String,

    /// Upper bound on the outbound call, in seconds (default: 30)
    pub upstream_timeout_secs: u64,

    /// Maximum accepted request body size in bytes (default: 50 MB)
    pub max_upload_size: usize,

    /// Directory staged files are written to (default: OS temp dir)
    pub staging_dir: PathBuf,

    /// Simulated latency of the mock upstream, in milliseconds (default: 500)
    pub mock_upstream_delay_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 5001,
            upstream_mode: "mock".to_string(),
            upstream_url: "http://localhost:4000/profile-image".to_string(),
            upstream_timeout_secs: 30,
            max_upload_size: 50 * 1024 * 1024, // 50 MB
            staging_dir: env::temp_dir(),
            mock_upstream_delay_ms: 500,
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upstream_mode: env::var("UPSTREAM_MODE").unwrap_or(default.upstream_mode),

            upstream_url: env::var("UPSTREAM_URL").unwrap_or(default.upstream_url),

            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.upstream_timeout_secs),

            max_upload_size: env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_upload_size),

            staging_dir: env::var("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.staging_dir),

            mock_upstream_delay_ms: env::var("MOCK_UPSTREAM_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.mock_upstream_delay_ms),
        }
    }

    /// Create config for development (canned upstream, no real forwarding)
    pub fn development() -> Self {
        Self {
            upstream_mode: "mock".to_string(),
            ..Self::default()
        }
    }

    /// Create config for production (forward to the real profile service)
    pub fn production() -> Self {
        Self {
            upstream_mode: "real".to_string(),
            upstream_url: env::var("UPSTREAM_URL")
                .unwrap_or_else(|_| "http://localhost:4000/profile-image".to_string()),
            ..Self::default()
        }
    }
}
