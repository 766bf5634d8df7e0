use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::LOCAL_AUTHOR;

#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    ReadError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Where task data and the log file live. `None` uses the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,
    pub status_change_delay_ms: u64,
    pub comment_author: String,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            status_change_delay_ms: 300,
            comment_author: LOCAL_AUTHOR.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub const KEYS: [&'static str; 4] = [
        "data_dir",
        "status_change_delay_ms",
        "comment_author",
        "log_level",
    ];

    /// Update a single setting by its file key.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        match key {
            "data_dir" => {
                self.data_dir = (!value.trim().is_empty()).then(|| PathBuf::from(value));
            }
            "status_change_delay_ms" => {
                self.status_change_delay_ms = value.trim().parse().map_err(|_| {
                    ConfigError::InvalidFormat(format!("{key} must be a number, got {value:?}"))
                })?;
            }
            "comment_author" => {
                if value.trim().is_empty() {
                    return Err(ConfigError::InvalidFormat(
                        "comment_author cannot be empty".to_string(),
                    ));
                }
                self.comment_author = value.trim().to_string();
            }
            "log_level" => {
                value.parse::<tracing::Level>().map_err(|_| {
                    ConfigError::InvalidFormat(format!("unknown log level {value:?}"))
                })?;
                self.log_level = value.to_lowercase();
            }
            _ => {
                return Err(ConfigError::InvalidFormat(format!(
                    "unknown setting {key:?} (expected one of {})",
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_config(&self) -> ConfigResult<AppConfig>;
    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()>;
}
