use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::ai::{ClaudeClient, ModelProvider, OllamaClient, OpenAIClient};
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Ollama,
    Claude,
    OpenAI,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Ollama => "ollama",
            Provider::Claude => "claude",
            Provider::OpenAI => "openai",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Some(Provider::Ollama),
            "claude" => Some(Provider::Claude),
            "openai" => Some(Provider::OpenAI),
            _ => None,
        }
    }

    pub fn all() -> Vec<Provider> {
        vec![Provider::Ollama, Provider::Claude, Provider::OpenAI]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Ollama => "Ollama (Local)",
            Provider::Claude => "Claude (Anthropic)",
            Provider::OpenAI => "ChatGPT (OpenAI)",
        }
    }

    /// A vision-capable default, since species identification sends photos.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Ollama => "llava:latest",
            Provider::Claude => "claude-sonnet-4-20250514",
            Provider::OpenAI => "gpt-4o-mini",
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        match config.provider.as_deref() {
            None => Ok(Provider::Ollama),
            Some(name) => Provider::from_str(name).ok_or_else(|| {
                let known: Vec<&str> = Provider::all().iter().map(Provider::as_str).collect();
                anyhow!("Unknown provider '{}', expected one of: {}", name, known.join(", "))
            }),
        }
    }

    /// Build the model client the configuration asks for.
    pub fn build(&self, config: &Config) -> Result<Arc<dyn ModelProvider>> {
        let model = config
            .default_model
            .as_deref()
            .unwrap_or_else(|| self.default_model());

        let client: Arc<dyn ModelProvider> = match self {
            Provider::Ollama => Arc::new(OllamaClient::new(&config.ollama_url, model)),
            Provider::Claude => {
                let key = config.claude_api_key.as_deref().ok_or_else(|| {
                    anyhow!(
                        "Claude API key not configured. Set ANTHROPIC_API_KEY or claude_api_key."
                    )
                })?;
                Arc::new(ClaudeClient::new(key, model))
            }
            Provider::OpenAI => {
                let key = config.openai_api_key.as_deref().ok_or_else(|| {
                    anyhow!("OpenAI API key not configured. Set OPENAI_API_KEY or openai_api_key.")
                })?;
                Arc::new(OpenAIClient::new(key, model))
            }
        };
        Ok(client)
    }
}
