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
struct OpenAIMessage {
    role: String,
    content: Vec<OpenAIPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum OpenAIPart {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Serialize)]
struct OpenAIImageUrl {
    url: String,
}

#[derive(Serialize)]
struct OpenAIResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    response_format: OpenAIResponseFormat,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    fn request(&self, prompt: &Prompt, output: &Shape) -> OpenAIRequest {
        let mut content = vec![OpenAIPart::Text {
            text: structured_prompt(prompt, output),
        }];
        content.extend(prompt.media.iter().map(|media| OpenAIPart::ImageUrl {
            image_url: OpenAIImageUrl {
                url: media.to_data_uri(),
            },
        }));

        OpenAIRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content,
            }],
            response_format: OpenAIResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAIClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, prompt: &Prompt, output: &Shape) -> Result<Value, ProviderError> {
        debug!(model = %self.model, shape = output.name, "sending OpenAI request");

        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request(prompt, output))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: "OpenAI",
                status,
                body,
            });
        }

        let openai_response: OpenAIResponse = response.json().await?;
        let text = openai_response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
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
    fn request_asks_for_json_object_and_sends_image_urls() {
        let client = OpenAIClient::new("key", "gpt-4o-mini");
        let prompt = Prompt {
            text: "Zidentyfikuj drzewo".to_string(),
            media: vec![Media {
                mime_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            }],
        };
        let body =
            serde_json::to_value(client.request(&prompt, &SUBMISSION_ASSISTANT.output)).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[1]["type"], "image_url");
        assert_eq!(
            content[1]["image_url"]["url"],
            "data:image/png;base64,aGVsbG8="
        );
    }
}
