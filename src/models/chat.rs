use serde::{ Serialize, Deserialize };

/// One question/answer exchange. `ai_text` starts empty and is filled in
/// once the relay answers; `id` is minted by the session and never reused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: u64,
    pub user_text: String,
    pub ai_text: String,
    pub user_time: String,
    pub ai_time: String,
}

impl ChatTurn {
    pub fn new(id: u64, user_text: String, user_time: String) -> Self {
        Self {
            id,
            user_text,
            ai_text: String::new(),
            user_time,
            ai_time: String::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.ai_text.is_empty()
    }
}

/// Wire-level message sent to the relay. A projection of recent turns,
/// never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: String,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_turn_starts_pending() {
        let turn = ChatTurn::new(1, "hi".to_string(), "2025-01-01 10:00:00".to_string());
        assert!(turn.is_pending());
        assert!(turn.ai_time.is_empty());
    }

    #[test]
    fn roles_serialize_as_plain_strings() {
        let msg = ConversationMessage::assistant("ok");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "ok");
    }
}
