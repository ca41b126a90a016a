use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{parse_json_reply, structured_prompt, ModelProvider};
use crate::capability::Prompt;
use crate::error::ProviderError;
use crate::schema::Shape;

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn request(&self, prompt: &Prompt, output: &Shape) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: structured_prompt(prompt, output),
            stream: false,
            format: Some("json".to_string()),
            images: prompt.media.iter().map(|media| media.data.clone()).collect(),
        }
    }
}

#[async_trait]
impl ModelProvider for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, prompt: &Prompt, output: &Shape) -> Result<Value, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);
        debug!(model = %self.model, shape = output.name, "sending Ollama request");

        let response = self
            .client
            .post(&url)
            .json(&self.request(prompt, output))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                provider: "Ollama",
                status: response.status().as_u16(),
                body: "make sure Ollama is running with: ollama serve".to_string(),
            });
        }

        let ollama_response: OllamaResponse = response.json().await?;
        parse_json_reply(&ollama_response.response)
    }
}
