//! Conversation transcript and the chat history derived from it.

use serde::{Deserialize, Serialize};

use super::SENTINEL;
use crate::llm::ChatMessage;

/// Prefix of model notices that only announce a tool call.
const SUGGESTED_CALL_PREFIX: &str = "***** Suggested function call";
/// Speaker used for history entries without a name.
const UNNAMED_SPEAKER: &str = "Sistema";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    System,
    User,
    Assistant,
}

/// One contribution to the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: String,
    pub kind: MessageKind,
    pub content: Option<String>,
}

impl Message {
    pub fn new(speaker: impl Into<String>, kind: MessageKind, content: Option<String>) -> Self {
        Self {
            speaker: speaker.into(),
            kind,
            content,
        }
    }

    pub fn contains_sentinel(&self) -> bool {
        self.content
            .as_deref()
            .is_some_and(|content| content.contains(SENTINEL))
    }

    /// This message as seen by `viewer`: its own words are the assistant's,
    /// everyone else's arrive as named user messages.
    fn as_context_for(&self, viewer: &str) -> Option<ChatMessage> {
        let content = self.content.as_deref().filter(|c| !c.is_empty())?;
        let message = if self.speaker == viewer {
            ChatMessage::assistant(Some(content.to_string()), None)
        } else {
            ChatMessage::user(content).with_name(&self.speaker)
        };
        Some(message)
    }
}

/// Append-only record of a conversation, in speaking order.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Prompt messages for `viewer`, skipping messages without content.
    pub fn context_for(&self, viewer: &str) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter_map(|m| m.as_context_for(viewer))
            .collect()
    }

    /// Messages that carry content, minus tool-call announcements.
    pub fn history(&self) -> Vec<HistoryEntry> {
        let mut history = Vec::new();
        for message in &self.messages {
            let Some(content) = message.content.as_deref().filter(|c| !c.is_empty()) else {
                continue;
            };
            if content.starts_with(SUGGESTED_CALL_PREFIX) {
                continue;
            }

            let name = if message.speaker.is_empty() {
                UNNAMED_SPEAKER.to_string()
            } else {
                message.speaker.clone()
            };

            tracing::debug!(speaker = %name, preview = %preview(content, 100), "Message added to history");

            history.push(HistoryEntry {
                role: message.kind,
                content: content.to_string(),
                name,
            });
        }
        history
    }
}

/// A chat-history entry handed to the strategy classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: MessageKind,
    pub content: String,
    pub name: String,
}

impl HistoryEntry {
    pub fn new(name: &str, content: &str) -> Self {
        Self {
            role: MessageKind::Assistant,
            content: content.to_string(),
            name: name.to_string(),
        }
    }
}

/// First `max_chars` characters of `s`, for log lines.
pub(crate) fn preview(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    fn said(speaker: &str, content: &str) -> Message {
        Message::new(speaker, MessageKind::Assistant, Some(content.to_string()))
    }

    #[test]
    fn sentinel_detection_is_substring_based() {
        assert!(said("a", "Listo. TERMINATE").contains_sentinel());
        assert!(!said("a", "terminate").contains_sentinel());
        assert!(!Message::new("a", MessageKind::User, None).contains_sentinel());
    }

    #[test]
    fn context_distinguishes_own_messages() {
        let mut transcript = Transcript::new();
        transcript.push(Message::new("user_proxy", MessageKind::User, Some("Brief".to_string())));
        transcript.push(said("Agency_Manager", "Plan"));
        transcript.push(Message::new("Agency_Director", MessageKind::Assistant, None));

        let context = transcript.context_for("Agency_Manager");
        assert_eq!(context.len(), 2);
        assert_eq!(context[0].role, Role::User);
        assert_eq!(context[0].name.as_deref(), Some("user_proxy"));
        assert_eq!(context[1].role, Role::Assistant);
        assert_eq!(context[1].name, None);
    }

    #[test]
    fn history_skips_empty_and_suggested_calls() {
        let mut transcript = Transcript::new();
        transcript.push(said("Agency_Manager", "Resumen ejecutivo"));
        transcript.push(said("Agency_Researcher", ""));
        transcript.push(said("Agency_Researcher", "***** Suggested function call: research *****"));
        transcript.push(Message::new("", MessageKind::System, Some("Aviso".to_string())));

        let history = transcript.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].name, "Agency_Manager");
        assert_eq!(history[1].name, "Sistema");
        assert_eq!(history[1].role, MessageKind::System);
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("añadir", 2), "añ...");
        assert_eq!(preview("corto", 10), "corto");
    }
}
