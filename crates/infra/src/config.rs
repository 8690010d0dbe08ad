//! Configuration loading and representation.
//!
//! Everything comes from environment variables:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `STOCKROOM_BIND_ADDR` | `0.0.0.0:8080` |
//! | `DATABASE_URL` | unset (in-memory store) |
//! | `STOCKROOM_STATIC_DIR` | `frontend` |
//! | `STOCKROOM_SEED_SAMPLE_DATA` | `true` |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const BIND_ADDR_VAR: &str = "STOCKROOM_BIND_ADDR";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const STATIC_DIR_VAR: &str = "STOCKROOM_STATIC_DIR";
pub const SEED_SAMPLE_DATA_VAR: &str = "STOCKROOM_SEED_SAMPLE_DATA";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_STATIC_DIR: &str = "frontend";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} must be true or false, got: {value}")]
    InvalidBool { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// SQLite URL; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub static_dir: PathBuf,
    pub seed_sample_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map instead of the process env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_addr = non_empty(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidAddr {
                var: BIND_ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        let seed_sample_data = match non_empty(SEED_SAMPLE_DATA_VAR) {
            Some(raw) => parse_bool(SEED_SAMPLE_DATA_VAR, &raw)?,
            None => true,
        };

        Ok(Self {
            bind_addr,
            database_url: non_empty(DATABASE_URL_VAR),
            static_dir: non_empty(STATIC_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            seed_sample_data,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            seed_sample_data: true,
        }
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: raw.to_string(),
        }),
    }
}
