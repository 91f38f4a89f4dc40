use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_FIGHT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read once at start-up
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: String,
    /// In-memory stores are used when unset
    pub database_url: Option<String>,
    /// Only this user may enter results; anyone may when unset
    pub admin_id: Option<String>,
    /// JSON fight card inserted at start-up
    pub fights_file: Option<String>,
    pub fight_timeout: Duration,
    pub confirm_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            admin_id: None,
            fights_file: None,
            fight_timeout: Duration::from_secs(DEFAULT_FIGHT_TIMEOUT_SECS),
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: non_empty("DATABASE_URL"),
            admin_id: non_empty("ADMIN_ID"),
            fights_file: non_empty("FIGHTS_FILE"),
            fight_timeout: seconds(
                "FIGHT_TIMEOUT_SECS",
                non_empty("FIGHT_TIMEOUT_SECS"),
                DEFAULT_FIGHT_TIMEOUT_SECS,
            )?,
            confirm_timeout: seconds(
                "CONFIRM_TIMEOUT_SECS",
                non_empty("CONFIRM_TIMEOUT_SECS"),
                DEFAULT_CONFIRM_TIMEOUT_SECS,
            )?,
        };

        debug!(
            bind_addr = %config.bind_addr,
            persistent = config.database_url.is_some(),
            admin = ?config.admin_id,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Whether `user_id` may enter fight results
    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_id.as_deref().map_or(true, |admin| admin == user_id)
    }
}

fn seconds(key: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    match value {
        None => Ok(Duration::from_secs(default)),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid { key, value }),
        },
    }
}
