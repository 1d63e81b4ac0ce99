use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::rootchain::{RootChainConfig, SyncConfig};

/// Default value for `datadir` in [`ClientConfig`].
const DEFAULT_DATADIR: &str = "plasma-data";

/// Default DB retry count.
const DEFAULT_DB_RETRY_COUNT: u16 = 3;

/// Default DB retry delay in ms.
const DEFAULT_DB_RETRY_DELAY: u64 = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The data directory where database contents reside.
    #[serde(default = "default_datadir")]
    pub datadir: PathBuf,

    /// For optimistic transactions, how many times to retry if a write fails.
    #[serde(default = "default_db_retry_count")]
    pub db_retry_count: u16,

    /// Db retry delay in ms.
    #[serde(default = "default_db_retry_delay")]
    pub db_retry_delay_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            datadir: default_datadir(),
            db_retry_count: DEFAULT_DB_RETRY_COUNT,
            db_retry_delay_ms: DEFAULT_DB_RETRY_DELAY,
        }
    }
}

fn default_datadir() -> PathBuf {
    DEFAULT_DATADIR.into()
}

fn default_db_retry_count() -> u16 {
    DEFAULT_DB_RETRY_COUNT
}

fn default_db_retry_delay() -> u64 {
    DEFAULT_DB_RETRY_DELAY
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Service label to append to the service name (e.g., "prod", "dev").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_label: Option<String>,

    /// Directory path for file-based logging.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Prefix for log file names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file_prefix: Option<String>,

    /// Use JSON format for logs instead of compact format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_format: Option<bool>,

    /// Extra filter directives such as `plasma_rootchain=debug`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,

    pub rootchain: RootChainConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration (optional section in TOML).
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file: {0}")]
    Io(#[from] io::Error),

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Parses a TOML document and checks the values are usable.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.rootchain.contract_address.is_zero() {
            return Err(ConfigError::Invalid("contract_address is zero".to_owned()));
        }
        if self.rootchain.commitment_rate_secs == 0 {
            return Err(ConfigError::Invalid(
                "commitment_rate_secs must be positive".to_owned(),
            ));
        }
        if self.sync.poll_interval_ms == 0 || self.sync.rpc_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll and rpc timeout intervals must be positive".to_owned(),
            ));
        }
        if self.sync.reorg_depth == 0 || self.sync.max_log_range == 0 {
            return Err(ConfigError::Invalid(
                "reorg_depth and max_log_range must be positive".to_owned(),
            ));
        }
        if self.sync.max_headers_per_submission == 0 {
            return Err(ConfigError::Invalid(
                "max_headers_per_submission must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}
