use crate::errors::{AppError, AppResult};
use crate::utils::path::resolve_under;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub mod migrate; // use submodule at src/config/migrate.rs

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_payment_method")]
    pub default_payment_method: String,
    /// Keep only the newest N audit entries (0 = keep all).
    #[serde(default = "default_audit_log_cap")]
    pub audit_log_cap: usize,
    /// How often a conflicting ledger write is recomputed before failing.
    #[serde(default = "default_max_commit_retries")]
    pub max_commit_retries: u32,
    /// Allow the legacy monthly wage type for new or edited workers.
    #[serde(default)]
    pub enable_monthly_wage: bool,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}
fn default_payment_method() -> String {
    "cash".to_string()
}
fn default_audit_log_cap() -> usize {
    100
}
fn default_max_commit_retries() -> u32 {
    5
}

impl Default for Config {
    fn default() -> Self {
        let db_path = Self::database_file();
        Self {
            database: db_path.to_string_lossy().to_string(),
            currency_symbol: default_currency_symbol(),
            default_payment_method: default_payment_method(),
            audit_log_cap: default_audit_log_cap(),
            max_commit_retries: default_max_commit_retries(),
            enable_monthly_wage: false,
        }
    }
}

impl Config {
    /// Return the standard configuration directory (`~/.siteledger`).
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".siteledger")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("siteledger.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("siteledger.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn to_yaml(&self) -> AppResult<String> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    pub fn save(&self) -> AppResult<()> {
        fs::create_dir_all(Self::config_dir())?;
        let yaml = self.to_yaml()?;
        fs::write(Self::config_file(), yaml).map_err(|_| AppError::ConfigSave)
    }

    /// Initialize configuration and database files.
    ///
    /// In test mode the config file is left untouched and only the
    /// database path is resolved.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Self> {
        let dir = Self::config_dir();

        let db_path = match custom_db {
            Some(name) => resolve_under(&dir, &name),
            None => Self::database_file(),
        };
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        if !is_test {
            config.save()?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        Ok(config)
    }
}
