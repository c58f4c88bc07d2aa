use std::env;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TABLE_NAME: &str = "imagecollection";
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub table_name: String,
    /// Endpoint override for DynamoDB (e.g. DynamoDB Local). `None` keeps
    /// the regional AWS endpoint.
    pub endpoint_url: Option<String>,
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let table_name = get("TABLE_NAME").unwrap_or_else(|| DEFAULT_TABLE_NAME.to_string());
        let endpoint_url = get("DYNAMODB_ENDPOINT");
        let timeout_secs = match get("STORE_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "STORE_TIMEOUT_SECS",
                        value: raw,
                    })
                }
            },
            None => DEFAULT_STORE_TIMEOUT_SECS,
        };

        Ok(Config {
            table_name,
            endpoint_url,
            store_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
