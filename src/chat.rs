use anyhow::bail;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{ChatMessage, UserProfile};

/// Append one message to the chat log, stamped with the sender's identity
/// and display color. The log is stored oldest first and only bounded by
/// the underlying storage.
pub fn post(
    messages: &mut Vec<ChatMessage>,
    sender: &UserProfile,
    text: &str,
    now: DateTime<Utc>,
) -> anyhow::Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("cannot send an empty message");
    }

    messages.push(ChatMessage {
        id: Uuid::new_v4(),
        user: sender.username.clone(),
        text: text.to_string(),
        timestamp: now,
        color: sender.color.clone(),
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> UserProfile {
        UserProfile {
            username: "ops".to_string(),
            password: None,
            color: "teal".to_string(),
            external: false,
        }
    }

    #[test]
    fn messages_append_in_order() {
        let mut messages = Vec::new();
        let sender = sender();

        post(&mut messages, &sender, "first", Utc::now()).unwrap();
        post(&mut messages, &sender, "second", Utc::now()).unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "first");
        assert_eq!(messages[1].text, "second");
        assert_eq!(messages[0].color, "teal");
    }

    #[test]
    fn empty_message_rejected() {
        let mut messages = Vec::new();
        assert!(post(&mut messages, &sender(), "   ", Utc::now()).is_err());
        assert!(messages.is_empty());
    }
}
