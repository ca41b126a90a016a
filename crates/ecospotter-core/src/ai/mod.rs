pub mod claude;
pub mod ollama;
pub mod openai;

pub use claude::ClaudeClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::capability::Prompt;
use crate::error::ProviderError;
use crate::schema::Shape;

/// A generative model that answers a prompt with a JSON object.
///
/// Implementations make no latency promise and may fail at any time; the
/// caller decides whether to put a deadline on the call.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &Prompt, output: &Shape) -> Result<Value, ProviderError>;
}

/// Append the JSON reply contract to the prompt text.
pub fn structured_prompt(prompt: &Prompt, output: &Shape) -> String {
    format!(
        "{}\n\nOdpowiedz wyłącznie jednym obiektem JSON (bez żadnego dodatkowego tekstu) o polach:\n{}",
        prompt.text.trim_end(),
        output.describe()
    )
}

/// Pull the JSON object out of a model reply.
///
/// Models like to wrap JSON in markdown fences or add a sentence around it, so
/// this takes the span from the first `{` to the last `}`.
pub fn parse_json_reply(reply: &str) -> Result<Value, ProviderError> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let body = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply.trim(),
    };
    serde_json::from_str(body).map_err(|err| {
        ProviderError::MalformedReply(format!("{} (reply: {})", err, truncate(reply, 200)))
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ECOLOGICAL_ADVICE;
    use serde_json::json;

    #[test]
    fn parses_fenced_json() {
        let reply = "Oto odpowiedź:\n```json\n{\"advice\": \"Sadź drzewa\"}\n```";
        assert_eq!(
            parse_json_reply(reply).unwrap(),
            json!({ "advice": "Sadź drzewa" })
        );
    }

    #[test]
    fn plain_text_reply_is_malformed() {
        let err = parse_json_reply("Nie wiem").unwrap_err();
        assert!(matches!(err, ProviderError::MalformedReply(_)));
    }

    #[test]
    fn structured_prompt_lists_output_fields() {
        let prompt = Prompt {
            text: "Pytanie".to_string(),
            media: Vec::new(),
        };
        let text = structured_prompt(&prompt, &ECOLOGICAL_ADVICE.output);
        assert!(text.starts_with("Pytanie\n\nOdpowiedz wyłącznie jednym obiektem JSON"));
        assert!(text.contains("\"advice\""));
    }
}
