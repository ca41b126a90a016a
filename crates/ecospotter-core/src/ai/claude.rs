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
struct ClaudeMessage {
    role: String,
    content: Vec<ClaudeBlock>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClaudeBlock {
    Text { text: String },
    Image { source: ClaudeImageSource },
}

#[derive(Serialize)]
struct ClaudeImageSource {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: String,
    data: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn request(&self, prompt: &Prompt, output: &Shape) -> ClaudeRequest {
        let mut content: Vec<ClaudeBlock> = prompt
            .media
            .iter()
            .map(|media| ClaudeBlock::Image {
                source: ClaudeImageSource {
                    kind: "base64",
                    media_type: media.mime_type.clone(),
                    data: media.data.clone(),
                },
            })
            .collect();
        content.push(ClaudeBlock::Text {
            text: structured_prompt(prompt, output),
        });

        ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content,
            }],
        }
    }
}

#[async_trait]
impl ModelProvider for ClaudeClient {
    fn name(&self) -> &str {
        "claude"
    }

    async fn generate(&self, prompt: &Prompt, output: &Shape) -> Result<Value, ProviderError> {
        debug!(model = %self.model, shape = output.name, "sending Claude request");

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&self.request(prompt, output))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: "Claude",
                status,
                body,
            });
        }

        let claude_response: ClaudeResponse = response.json().await?;
        let text = claude_response
            .content
            .first()
            .map(|c| c.text.as_str())
            .unwrap_or_default();
        parse_json_reply(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Media;
    use crate::schema::SUBMISSION_ASSISTANT;

    #[test]
    fn image_blocks_precede_text() {
        let client = ClaudeClient::new("key", "claude-sonnet-4-20250514");
        let prompt = Prompt {
            text: "Zidentyfikuj drzewo".to_string(),
            media: vec![Media {
                mime_type: "image/jpeg".to_string(),
                data: "aGVsbG8=".to_string(),
            }],
        };
        let body =
            serde_json::to_value(client.request(&prompt, &SUBMISSION_ASSISTANT.output)).unwrap();
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["type"], "base64");
        assert_eq!(content[0]["source"]["media_type"], "image/jpeg");
        assert_eq!(content[1]["type"], "text");
    }
}
