use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ApiError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            query: default_query(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_results() -> u32 {
    30
}

fn default_query() -> String {
    "is:unread category:primary".to_string()
}

fn default_batch_concurrency() -> usize {
    4
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ApiError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ApiError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ApiError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ApiError::Config(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| ApiError::Config(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            return Err(ApiError::Config("api.base_url cannot be empty".to_string()));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ApiError::Config(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ApiError::Config(
                "api.timeout_secs must be at least 1".to_string(),
            ));
        }

        // max_results is capped server-side at 100 per page; reject obvious misconfig
        if self.scan.max_results == 0 {
            return Err(ApiError::Config(
                "scan.max_results must be at least 1".to_string(),
            ));
        }
        if self.scan.max_results > 100 {
            return Err(ApiError::Config(
                "scan.max_results cannot exceed 100".to_string(),
            ));
        }

        if self.scan.batch_concurrency == 0 {
            return Err(ApiError::Config(
                "scan.batch_concurrency must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.scan.max_results, 30);
        assert_eq!(config.scan.query, "is:unread category:primary");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "https://api.huntdesk.dev"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://api.huntdesk.dev");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.scan.max_results, 30);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.scan.max_results = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.max_results = 500;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.scan.max_results, 30);
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.api.base_url = "https://api.huntdesk.dev".to_string();
        config.scan.max_results = 50;
        config.save(&path).await.unwrap();

        let reloaded = Config::load(&path).await.unwrap();
        assert_eq!(reloaded.api.base_url, "https://api.huntdesk.dev");
        assert_eq!(reloaded.scan.max_results, 50);
    }
}
