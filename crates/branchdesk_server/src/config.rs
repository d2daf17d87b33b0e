//! Server configuration.
//!
//! Values come from explicit arguments first, then `BRANCHDESK_*`
//! environment variables, then built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

pub const ENV_BIND_ADDR: &str = "BRANCHDESK_BIND_ADDR";
pub const ENV_DB_PATH: &str = "BRANCHDESK_DB_PATH";
pub const ENV_BASE_URL: &str = "BRANCHDESK_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "BRANCHDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BRANCHDESK_LOG_DIR";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DB_FILE_NAME: &str = "branchdesk.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub db_path: PathBuf,
    /// Public URL prefix used in links; derived from `bind_addr` when unset.
    pub base_url: Option<String>,
    pub log_level: String,
    /// Rotating log file directory; stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Builds a config from `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = read(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|err| format!("invalid {ENV_BIND_ADDR}: {err}"))?;

        Ok(Self {
            bind_addr,
            db_path: read(ENV_DB_PATH)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            base_url: read(ENV_BASE_URL),
            log_level: read(ENV_LOG_LEVEL)
                .unwrap_or_else(|| branchdesk_core::default_log_level().to_string()),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        })
    }

    /// Link prefix without trailing slash.
    pub fn base_url(&self) -> String {
        match self.base_url.as_deref() {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind_addr),
        }
    }
}

/// `branchdesk.sqlite3` in the system temp directory.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
