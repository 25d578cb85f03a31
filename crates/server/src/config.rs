use std::path::Path;

use orchestrator::LlmConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

const CONFIG_FILE: &str = ".interview-studio/config.json";

pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// Process configuration: stored in `.interview-studio/config.json`, with
/// environment variables taking precedence over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudioConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl StudioConfig {
    /// Read config from a project directory, falling back to defaults when
    /// the file is missing or malformed.
    pub async fn read(project_path: &Path) -> Self {
        let config_path = project_path.join(CONFIG_FILE);

        if !config_path.exists() {
            debug!(path = %config_path.display(), "Config file does not exist, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&config_path).await {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    debug!(path = %config_path.display(), "Config loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %config_path.display(), error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %config_path.display(), error = %e, "Failed to read config file, using defaults");
                Self::default()
            }
        }
    }

    /// Write config to a project directory.
    pub async fn write(&self, project_path: &Path) -> std::io::Result<()> {
        let config_dir = project_path.join(".interview-studio");
        let config_path = config_dir.join("config.json");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).await?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&config_path, content).await?;
        debug!(path = %config_path.display(), "Config saved");
        Ok(())
    }

    /// Environment overrides: `LLM_BASE_URL`, `LLM_API_KEY`, `LLM_MODEL`,
    /// and `PORT`.
    pub fn apply_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("LLM_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Ok(api_key) = std::env::var("LLM_API_KEY") {
            if !api_key.is_empty() {
                self.llm.api_key = Some(api_key);
            }
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_read_nonexistent_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = StudioConfig::read(temp_dir.path()).await;
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.llm.api_key.is_none());
    }

    #[tokio::test]
    async fn test_config_write_and_read() {
        let temp_dir = TempDir::new().unwrap();

        let mut config = StudioConfig::default();
        config.server.port = 4242;
        config.llm.model = "llama-3.3-70b-versatile".to_string();
        config.write(temp_dir.path()).await.unwrap();

        let loaded = StudioConfig::read(temp_dir.path()).await;
        assert_eq!(loaded.server.port, 4242);
        assert_eq!(loaded.llm.model, "llama-3.3-70b-versatile");
    }

    #[tokio::test]
    async fn test_config_read_malformed_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join(".interview-studio");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config.json"), "not json").unwrap();

        let config = StudioConfig::read(temp_dir.path()).await;
        assert_eq!(config.server.port, DEFAULT_PORT);
    }
}
