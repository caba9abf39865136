use std::env::var;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dotenvy::dotenv;

/// Application configuration with environment variable overrides
#[derive(Debug, Clone)]
pub struct Config {
    /// Request body size limit in bytes
    /// Env: REQUEST_BODY_LIMIT (default: 1048576 = 1MB)
    pub request_body_limit: usize,

    /// Request timeout in seconds
    /// Env: REQUEST_TIMEOUT_SECS (default: 30)
    pub request_timeout: Duration,

    /// Server port
    /// Env: PORT (default: 4000)
    pub port: u16,

    /// Database file path
    /// Env: DATABASE_PATH (default: "gamelog.db")
    pub database_path: String,

    /// Database name override, stored as `<name>.db` next to `database_path`
    /// Env: DATABASE_NAME (optional, blank is ignored)
    pub database_name: Option<String>,

    /// Origins allowed to make cross-origin requests
    /// Env: CORS_ORIGINS, comma separated (default: "http://localhost:5173")
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let _ = dotenv(); //for local development mostly
        Self {
            request_body_limit: env_or_default("REQUEST_BODY_LIMIT", 1024 * 1024),
            request_timeout: Duration::from_secs(env_or_default("REQUEST_TIMEOUT_SECS", 30)),
            port: env_or_default("PORT", 4000),
            database_path: env_or_default_string("DATABASE_PATH", "gamelog.db"),
            database_name: var("DATABASE_NAME")
                .ok()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            cors_origins: parse_origins(&env_or_default_string(
                "CORS_ORIGINS",
                "http://localhost:5173",
            )),
        }
    }

    /// The database file to open, honoring the name override.
    pub fn database_file(&self) -> PathBuf {
        let path = Path::new(&self.database_path);
        match &self.database_name {
            Some(name) => path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(format!("{name}.db")),
            None => path.to_path_buf(),
        }
    }
}

impl Default for Config {
    /// Create configuration with all default values
    fn default() -> Self {
        Self {
            request_body_limit: 1024 * 1024, // 1 MB
            request_timeout: Duration::from_secs(30),
            port: 4000,
            database_path: "gamelog.db".to_string(),
            database_name: None,
            cors_origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

/// Parse environment variable or return default value
fn env_or_default<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key)
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(default)
}

/// Parse environment variable string or return default value
fn env_or_default_string(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
