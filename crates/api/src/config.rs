use std::path::PathBuf;

use uas_core::upload::{UploadConfig, DEFAULT_MAX_BYTES, DEFAULT_MAX_DIMENSION};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Image upload limits and storage directory.
    pub upload: UploadConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                       |
    /// |------------------------|-----------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                     |
    /// | `PORT`                 | `8000`                                        |
    /// | `CORS_ORIGINS`         | `http://localhost:3000,http://localhost:3001` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                          |
    /// | `UPLOAD_DIR`           | `static/uploads`                              |
    /// | `UPLOAD_MAX_BYTES`     | `8388608`                                     |
    /// | `UPLOAD_MAX_DIMENSION` | `4096`                                        |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:3001".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static/uploads"));

        let max_bytes: usize = std::env::var("UPLOAD_MAX_BYTES")
            .map(|v| v.parse().expect("UPLOAD_MAX_BYTES must be a valid usize"))
            .unwrap_or(DEFAULT_MAX_BYTES);

        let max_dimension: u32 = std::env::var("UPLOAD_MAX_DIMENSION")
            .map(|v| v.parse().expect("UPLOAD_MAX_DIMENSION must be a valid u32"))
            .unwrap_or(DEFAULT_MAX_DIMENSION);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upload: UploadConfig {
                upload_dir,
                max_bytes,
                max_dimension,
                ..UploadConfig::default()
            },
        }
    }
}
