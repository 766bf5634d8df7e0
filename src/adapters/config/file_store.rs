use crate::ports::{AppConfig, ConfigError, ConfigResult, ConfigStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Environment variable overriding the configured data directory.
pub const DATA_DIR_ENV: &str = "TASKBOARD_DATA_DIR";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    status_change_delay_ms: Option<u64>,
    comment_author: Option<String>,
    log_level: Option<String>,
}

pub struct FileConfigStore {
    config_path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ReadError("Cannot determine config directory".to_string())
        })?;

        Ok(Self::with_path(config_dir.join("taskboard").join("config.json")))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    async fn ensure_config_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Directory holding task data: explicit override, then the environment,
/// then the platform data directory.
pub fn resolve_data_dir(config: &AppConfig) -> ConfigResult<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    if let Some(dir) = &config.data_dir {
        return Ok(dir.clone());
    }
    dirs::data_dir()
        .map(|dir| dir.join("taskboard"))
        .ok_or_else(|| ConfigError::ReadError("Cannot determine data directory".to_string()))
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_config(&self) -> ConfigResult<AppConfig> {
        let content = match fs::read_to_string(&self.config_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.config_path.display(), "no config file, using defaults");
                return Ok(AppConfig::default());
            }
            Err(e) => return Err(ConfigError::ReadError(e.to_string())),
        };

        let config_file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;

        let defaults = AppConfig::default();
        Ok(AppConfig {
            data_dir: config_file.data_dir,
            status_change_delay_ms: config_file
                .status_change_delay_ms
                .unwrap_or(defaults.status_change_delay_ms),
            comment_author: config_file
                .comment_author
                .filter(|author| !author.trim().is_empty())
                .unwrap_or(defaults.comment_author),
            log_level: config_file.log_level.unwrap_or(defaults.log_level),
        })
    }

    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_config_dir().await?;

        let config_file = ConfigFile {
            data_dir: config.data_dir.clone(),
            status_change_delay_ms: Some(config.status_change_delay_ms),
            comment_author: Some(config.comment_author.clone()),
            log_level: Some(config.log_level.clone()),
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }
}
