use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::router::DEFAULT_LOCATION;
use crate::timeout::{TimeoutGuard, TimeoutPolicy, DEFAULT_TIMEOUT};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub default_model: Option<String>,
    pub ollama_url: String,
    pub claude_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub request_timeout_ms: u64,
    /// Abort timed-out provider calls instead of leaving them to finish.
    pub cancel_on_timeout: bool,
    pub default_location: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            provider: Some("ollama".to_string()),
            default_model: None,
            ollama_url: "http://localhost:11434".to_string(),
            claude_api_key: None,
            openai_api_key: None,
            request_timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            cancel_on_timeout: false,
            default_location: DEFAULT_LOCATION.to_string(),
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Environment variables win over keys stored in the file.
    pub fn with_env_keys(mut self) -> Self {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.claude_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        self
    }

    pub fn timeout_guard(&self) -> TimeoutGuard {
        let policy = if self.cancel_on_timeout {
            TimeoutPolicy::Abort
        } else {
            TimeoutPolicy::Abandon
        };
        TimeoutGuard::new(Duration::from_millis(self.request_timeout_ms)).with_policy(policy)
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("ecospotter"))
    }

    fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
