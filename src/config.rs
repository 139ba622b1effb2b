//! # Configuration Management
//!
//! Settings for scanning, printing and logging.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment overrides via `from_env()`
//!
//! ## Example
//! ```toml
//! [scan]
//! unknown_keys = "reject"
//! max_input_bytes = 1048576
//!
//! [print]
//! annotate_accounts = true
//!
//! [network]
//! base_fee = 100
//!
//! [accounts]
//! GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ = "treasury"
//!
//! [logging]
//! app_name = "stellar-txrep"
//! log_level = "info"
//! json_format = false
//! ```

use crate::error::{Result, TxrepError};
use crate::types::MuxedAccount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::Level;

/// Largest txrep document accepted by default (1 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Upper limit accepted for `scan.max_input_bytes` (64 MiB)
pub const MAX_INPUT_BYTES_LIMIT: usize = 64 * 1024 * 1024;

/// Network minimum fee per operation, in stroops
pub const DEFAULT_BASE_FEE: u32 = 100;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TxrepConfig {
    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub print: PrintConfig,

    #[serde(default)]
    pub network: NetworkDefaults,

    /// Known accounts (strkey to label), used to annotate printed output
    #[serde(default)]
    pub accounts: BTreeMap<String, String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TxrepConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| TxrepError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| TxrepError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| TxrepError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Defaults, overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(policy) = std::env::var("TXREP_UNKNOWN_KEYS") {
            config.scan.unknown_keys = match policy.to_ascii_lowercase().as_str() {
                "warn" => UnknownKeyPolicy::Warn,
                "reject" => UnknownKeyPolicy::Reject,
                other => {
                    return Err(TxrepError::ConfigError(format!(
                        "TXREP_UNKNOWN_KEYS must be warn or reject, got {other}"
                    )))
                }
            };
        }

        if let Ok(limit) = std::env::var("TXREP_MAX_INPUT_BYTES") {
            if let Ok(val) = limit.parse::<usize>() {
                config.scan.max_input_bytes = val;
            }
        }

        if let Ok(fee) = std::env::var("TXREP_BASE_FEE") {
            if let Ok(val) = fee.parse::<u32>() {
                config.network.base_fee = val;
            }
        }

        if let Ok(level) = std::env::var("TXREP_LOG_LEVEL") {
            config.logging.log_level = level
                .parse::<Level>()
                .map_err(|_| TxrepError::ConfigError(format!("Invalid log level: {level}")))?;
        }

        if let Ok(json) = std::env::var("TXREP_LOG_JSON") {
            config.logging.json_format = matches!(json.as_str(), "1" | "true" | "yes");
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| TxrepError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| TxrepError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.scan.validate());
        errors.extend(self.network.validate());

        for (account, label) in &self.accounts {
            if account.parse::<MuxedAccount>().is_err() {
                errors.push(format!("accounts: {account} is not a valid account id"));
            }
            if label.trim().is_empty() {
                errors.push(format!("accounts: label for {account} cannot be empty"));
            }
        }

        errors.extend(self.logging.validate());

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TxrepError::ConfigError(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// What to do with txrep lines no field consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownKeyPolicy {
    /// Log each key and carry on
    #[default]
    Warn,
    /// Fail the scan
    Reject,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub unknown_keys: UnknownKeyPolicy,

    /// Documents larger than this are rejected before parsing
    pub max_input_bytes: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            unknown_keys: UnknownKeyPolicy::Warn,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.max_input_bytes == 0 {
            errors.push("scan.max_input_bytes must be greater than 0".to_string());
        } else if self.max_input_bytes > MAX_INPUT_BYTES_LIMIT {
            errors.push(format!(
                "scan.max_input_bytes too large: {} (maximum: {MAX_INPUT_BYTES_LIMIT})",
                self.max_input_bytes
            ));
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Append account labels from `[accounts]` to printed keys
    pub annotate_accounts: bool,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            annotate_accounts: true,
        }
    }
}

/// Values used when completing a transaction before signing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkDefaults {
    /// Fee per operation, in stroops
    pub base_fee: u32,
}

impl Default for NetworkDefaults {
    fn default() -> Self {
        Self {
            base_fee: DEFAULT_BASE_FEE,
        }
    }
}

impl NetworkDefaults {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.base_fee < DEFAULT_BASE_FEE {
            errors.push(format!(
                "network.base_fee {} is below the network minimum of {DEFAULT_BASE_FEE}",
                self.base_fee
            ));
        }
        errors
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("stellar-txrep"),
            log_level: Level::INFO,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
