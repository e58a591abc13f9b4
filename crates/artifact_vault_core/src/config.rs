//! Vault runtime configuration.
//!
//! # Responsibility
//! - Resolve storage key, database path and logging settings.
//! - Layer environment overrides over file or built-in defaults.
//!
//! # Invariants
//! - A validated config never carries a blank storage key.
//! - `log_level` is always one of `trace|debug|info|warn|error`.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::snapshot_repo::DEFAULT_STORAGE_KEY;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "ARTIFACT_VAULT_DB_PATH";
pub const ENV_STORAGE_KEY: &str = "ARTIFACT_VAULT_STORAGE_KEY";
pub const ENV_LOG_LEVEL: &str = "ARTIFACT_VAULT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ARTIFACT_VAULT_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "artifact_vault.sqlite3";

/// Errors from loading or validating configuration.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    EmptyStorageKey,
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid vault config: {err}"),
            Self::EmptyStorageKey => write!(f, "storage_key must not be blank"),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultConfig {
    /// Key the snapshot is stored under.
    pub storage_key: String,
    /// SQLite file holding snapshots.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs. `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl VaultConfig {
    /// Parses a JSON config document; absent fields keep defaults.
    pub fn from_json_str(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validated()
    }

    /// Defaults overlaid with `ARTIFACT_VAULT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`. Blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = non_blank(ENV_STORAGE_KEY) {
            self.storage_key = value;
        }
        if let Some(value) = non_blank(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_blank(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = non_blank(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value));
        }
        self.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.storage_key = self.storage_key.trim().to_string();
        if self.storage_key.is_empty() {
            return Err(ConfigError::EmptyStorageKey);
        }
        self.log_level = normalize_level(&self.log_level)
            .map_err(ConfigError::InvalidLogLevel)?
            .to_string();
        Ok(self)
    }
}
