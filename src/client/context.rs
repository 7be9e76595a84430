use crate::models::chat::{ ChatTurn, ConversationMessage };

/// How many prior turns ride along with each new question. A fixed count,
/// not a token budget; older history is silently dropped.
pub const CONTEXT_WINDOW_TURNS: usize = 3;

/// Projects the tail of the transcript into the message list sent to the
/// relay: up to the last 3 prior turns as user/assistant pairs, followed
/// by the new question. A turn whose reply is still pending contributes an
/// empty assistant message.
pub fn build_context(history: &[ChatTurn], question: &str) -> Vec<ConversationMessage> {
    let start = history.len().saturating_sub(CONTEXT_WINDOW_TURNS);
    let recent = &history[start..];

    let mut conversation = Vec::with_capacity(recent.len() * 2 + 1);
    for turn in recent {
        conversation.push(ConversationMessage::user(turn.user_text.clone()));
        conversation.push(ConversationMessage::assistant(turn.ai_text.clone()));
    }

    conversation.push(ConversationMessage::user(question));
    conversation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answered(id: u64, question: &str, reply: &str) -> ChatTurn {
        let mut turn = ChatTurn::new(id, question.to_string(), "2025-01-01 10:00:00".to_string());
        turn.ai_text = reply.to_string();
        turn.ai_time = "2025-01-01 10:00:05".to_string();
        turn
    }

    #[test]
    fn empty_history_sends_only_the_question() {
        let conversation = build_context(&[], "hi");
        assert_eq!(conversation, vec![ConversationMessage::user("hi")]);
    }

    #[test]
    fn short_history_is_fully_included() {
        let history = vec![answered(1, "q1", "a1"), answered(2, "q2", "a2")];
        let conversation = build_context(&history, "q3");

        assert_eq!(conversation, vec![
            ConversationMessage::user("q1"),
            ConversationMessage::assistant("a1"),
            ConversationMessage::user("q2"),
            ConversationMessage::assistant("a2"),
            ConversationMessage::user("q3"),
        ]);
    }

    #[test]
    fn long_history_keeps_only_the_last_three_turns() {
        let history: Vec<ChatTurn> = (1..=5)
            .map(|i| answered(i, &format!("q{}", i), &format!("a{}", i)))
            .collect();
        let conversation = build_context(&history, "q6");

        assert_eq!(conversation.len(), CONTEXT_WINDOW_TURNS * 2 + 1);
        assert_eq!(conversation[0], ConversationMessage::user("q3"));
        assert_eq!(conversation[1], ConversationMessage::assistant("a3"));
        assert_eq!(conversation[4], ConversationMessage::user("q5"));
        assert_eq!(conversation[5], ConversationMessage::assistant("a5"));
        assert_eq!(conversation[6], ConversationMessage::user("q6"));
    }

    #[test]
    fn pending_turn_contributes_an_empty_assistant_message() {
        let history = vec![ChatTurn::new(1, "q1".to_string(), "2025-01-01 10:00:00".to_string())];
        let conversation = build_context(&history, "q2");

        assert_eq!(conversation[1], ConversationMessage::assistant(""));
    }
}
