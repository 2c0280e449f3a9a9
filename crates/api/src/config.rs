//! Process configuration, read once from the environment at start-up.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATA_ROOT: &str = "./data";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Root directory for `*-from-path` imports.
    pub data_root: PathBuf,
    /// Optional `variant,canonical` CSV with item name synonyms.
    pub synonyms_path: Option<PathBuf>,
    pub max_upload_bytes: usize,
    /// Postgres connection string; only honoured with the `postgres` feature.
    pub database_url: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            synonyms_path: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            database_url: None,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get("MTO_BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: "MTO_BIND_ADDR",
                message: e.to_string(),
            })?;

        let max_upload_bytes = match get("MTO_MAX_UPLOAD_BYTES") {
            None => DEFAULT_MAX_UPLOAD_BYTES,
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: "MTO_MAX_UPLOAD_BYTES",
                        message: "must be greater than zero".to_string(),
                    });
                }
                Ok(v) => v,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "MTO_MAX_UPLOAD_BYTES",
                        message: e.to_string(),
                    });
                }
            },
        };

        Ok(Self {
            bind_addr,
            data_root: PathBuf::from(get("MTO_DATA_ROOT").unwrap_or_else(|| DEFAULT_DATA_ROOT.to_string())),
            synonyms_path: get("MTO_SYNONYMS_PATH").map(PathBuf::from),
            max_upload_bytes,
            database_url: get("DATABASE_URL"),
        })
    }
}
