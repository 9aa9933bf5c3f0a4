//! Persistent preferences for a ledger session.

use std::{
    env,
    path::{Path, PathBuf},
};

use dirs::home_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::persistence::{load_json_from_path, save_json_to_path, PersistenceError};

const DEFAULT_DIR_NAME: &str = ".expense_ledger";
const HOME_ENV: &str = "EXPENSE_LEDGER_HOME";
const CONFIG_FILE: &str = "config.json";
const DATA_FILE: &str = "expenses.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<PersistenceError> for ConfigError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::Io(io) => ConfigError::Io(io),
            PersistenceError::Serde(serde) => ConfigError::Serde(serde.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerConfig {
    /// Entries shown in the dashboard's recent-activity card.
    #[serde(default = "LedgerConfig::default_recent_limit")]
    pub recent_limit: usize,
    /// Entries shown in the dashboard's recent expense list.
    #[serde(default = "LedgerConfig::default_dashboard_list_limit")]
    pub dashboard_list_limit: usize,
    #[serde(default = "LedgerConfig::default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            recent_limit: Self::default_recent_limit(),
            dashboard_list_limit: Self::default_dashboard_list_limit(),
            currency: Self::default_currency(),
            data_file: None,
        }
    }
}

impl LedgerConfig {
    pub fn default_recent_limit() -> usize {
        5
    }

    pub fn default_dashboard_list_limit() -> usize {
        8
    }

    pub fn default_currency() -> String {
        "USD".into()
    }

    /// Formats an amount for display, `$12.50` for the default currency.
    pub fn format_amount(&self, amount: f64) -> String {
        match self.currency.as_str() {
            "USD" => format!("${amount:.2}"),
            "EUR" => format!("€{amount:.2}"),
            "GBP" => format!("£{amount:.2}"),
            code => format!("{code} {amount:.2}"),
        }
    }

    /// Location of the JSON expense store, relative paths resolved against `base`.
    pub fn resolve_data_file(&self, base: &Path) -> PathBuf {
        match &self.data_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join(DATA_FILE),
        }
    }
}

/// Loads and saves [`LedgerConfig`] under the application data directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base_dir: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::with_base_dir(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Self {
        let path = base.join(CONFIG_FILE);
        Self {
            base_dir: base,
            path,
        }
    }

    pub fn load(&self) -> Result<LedgerConfig, ConfigError> {
        Ok(load_json_from_path(&self.path)?.unwrap_or_default())
    }

    pub fn save(&self, config: &LedgerConfig) -> Result<(), ConfigError> {
        save_json_to_path(config, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_file(&self, config: &LedgerConfig) -> PathBuf {
        config.resolve_data_file(&self.base_dir)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the application data directory, defaulting to `~/.expense_ledger`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}
