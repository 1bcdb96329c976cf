//! Application configuration loaded from environment variables.

use crate::error::{AppError, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (host:port)
    pub bind_address: String,

    /// Log level
    pub log_level: String,

    /// Release/artifact store backend: "memory" or "postgres"
    pub store_backend: String,

    /// Database connection URL (required when store_backend = "postgres")
    pub database_url: Option<String>,

    /// Blob storage backend: "filesystem" or "memory"
    pub storage_backend: String,

    /// Filesystem storage path (when storage_backend = "filesystem")
    pub storage_path: String,

    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,

    /// Upload timeout in seconds; uploads must fail rather than hang
    pub upload_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            store_backend: env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".into()),
            database_url: env::var("DATABASE_URL").ok(),
            storage_backend: env::var("STORAGE_BACKEND").unwrap_or_else(|_| "filesystem".into()),
            storage_path: env::var("STORAGE_PATH")
                .unwrap_or_else(|_| "/var/lib/release-server/assets".into()),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| "1073741824".into())
                .parse()
                .unwrap_or(1024 * 1024 * 1024),
            upload_timeout_secs: env::var("UPLOAD_TIMEOUT_SECS")
                .unwrap_or_else(|_| "600".into())
                .parse()
                .unwrap_or(600),
        };

        if config.store_backend == "postgres" && config.database_url.is_none() {
            return Err(AppError::Config(
                "DATABASE_URL not set but STORE_BACKEND is postgres".into(),
            ));
        }

        Ok(config)
    }
}
