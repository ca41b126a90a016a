//! UI-agnostic chat state types
//!
//! These are shared by every front-end and don't depend on any UI framework.

use serde::{Deserialize, Serialize};

/// A chat message in the assistant conversation. Never edited once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub text: String,
    pub sender: ChatRole,
}

/// Who sent a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// Timestamp-derived message ids, strictly increasing within one generator.
#[derive(Debug, Default)]
pub struct MessageIds {
    last: i64,
}

impl MessageIds {
    pub fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last + 1);
        self.last.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_increase_even_within_one_millisecond() {
        let mut ids = MessageIds::default();
        let parsed: Vec<i64> = (0..50).map(|_| ids.next_id().parse().unwrap()).collect();
        assert!(parsed.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn sender_serializes_lowercase() {
        let message = ChatMessage {
            id: "1".to_string(),
            text: "Cześć".to_string(),
            sender: ChatRole::Assistant,
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["sender"], "assistant");
    }
}
