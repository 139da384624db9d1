//! Configuration module for the portfolio backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default admin session lifetime (7 days).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default cap for multipart upload bodies (25 MiB).
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 25 * 1024 * 1024;

/// Which content store backend to run with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// JSON documents as files in a local directory.
    Local { content_dir: PathBuf },
    /// JSON documents as objects in a remote HTTP object store.
    Remote(RemoteStorageConfig),
}

/// Settings for the remote object store backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStorageConfig {
    /// Base URL of the object store; objects live at `<base_url>/<key>`
    pub base_url: Option<String>,
    /// Bearer token sent with every request
    pub token: Option<String>,
    /// Key prefix prepended to every logical document name
    pub prefix: String,
    /// Directory holding the bundled default documents
    pub seed_dir: Option<PathBuf>,
    /// Copy bundled defaults into the store when a document is absent
    pub seed_from_bundled: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared admin password (login is refused while unset)
    pub admin_password: Option<String>,
    /// HMAC secret for admin tokens (every admin route answers 401 while unset)
    pub admin_secret: Option<String>,
    /// Lifetime of an issued admin token, in seconds
    pub session_ttl_secs: u64,
    /// Mark the admin cookie `Secure` (production deployments)
    pub secure_cookies: bool,
    /// Content store backend selection
    pub storage: StorageConfig,
    /// Directory served as static files; uploads are written below it
    pub public_dir: PathBuf,
    /// Maximum accepted upload body, in bytes
    pub upload_max_bytes: usize,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_password = non_empty_var("ADMIN_PASSWORD");
        let admin_secret = non_empty_var("ADMIN_COOKIE_SECRET");

        let session_ttl_secs = env::var("ADMIN_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        let secure_cookies = env::var("PORTFOLIO_ENV")
            .map(|v| v.eq_ignore_ascii_case("production"))
            .unwrap_or(false);

        let content_dir: PathBuf = env::var("PORTFOLIO_CONTENT_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();

        let storage = match env::var("PORTFOLIO_STORAGE").as_deref() {
            Ok("remote") => StorageConfig::Remote(RemoteStorageConfig {
                base_url: non_empty_var("BLOB_STORE_URL"),
                token: non_empty_var("BLOB_READ_WRITE_TOKEN"),
                prefix: env::var("BLOB_PREFIX").unwrap_or_else(|_| "data/".to_string()),
                seed_dir: Some(
                    env::var("PORTFOLIO_SEED_DIR")
                        .unwrap_or_else(|_| "./data".to_string())
                        .into(),
                ),
                seed_from_bundled: env::var("BLOB_SEED_FROM_BUNDLED")
                    .map(|v| !matches!(v.as_str(), "false" | "0" | "no"))
                    .unwrap_or(true),
                timeout_secs: env::var("BLOB_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(10),
            }),
            _ => StorageConfig::Local { content_dir },
        };

        let public_dir = env::var("PORTFOLIO_PUBLIC_DIR")
            .unwrap_or_else(|_| "./public".to_string())
            .into();

        let upload_max_bytes = env::var("PORTFOLIO_UPLOAD_MAX_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPLOAD_MAX_BYTES);

        let bind_addr = env::var("PORTFOLIO_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid PORTFOLIO_BIND_ADDR format");

        let log_level = env::var("PORTFOLIO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            admin_password,
            admin_secret,
            session_ttl_secs,
            secure_cookies,
            storage,
            public_dir,
            upload_max_bytes,
            bind_addr,
            log_level,
        }
    }

    /// Whether both admin variables are present.
    pub fn admin_configured(&self) -> bool {
        self.admin_password.is_some() && self.admin_secret.is_some()
    }
}

/// Read an environment variable, treating an empty value as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
