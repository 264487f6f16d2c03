//! Message log entries

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::table::TableView;

/// Unique identifier for one rendered entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generate a fresh id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Who an entry is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Error,
}

/// Entry content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryBody {
    /// Plain text
    Text { text: String },
    /// Placeholder shown while a reply is being polled for
    Loading { label: String },
    /// A tabular query result
    Table { table: TableView },
    /// Follow-up question buttons; selecting one re-enters the input gate
    FollowUps { questions: Vec<String> },
}

/// One rendered unit in the message log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEntry {
    pub id: EntryId,
    pub role: Role,
    pub body: EntryBody,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl MessageEntry {
    fn new(role: Role, body: EntryBody) -> Self {
        Self {
            id: EntryId::new(),
            role,
            body,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// A user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, EntryBody::Text { text: text.into() })
    }

    /// An assistant text reply
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, EntryBody::Text { text: text.into() })
    }

    /// An error surfaced in the log
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Role::Error, EntryBody::Text { text: text.into() })
    }

    /// A transient loading placeholder
    pub fn loading(label: impl Into<String>) -> Self {
        Self::new(
            Role::Assistant,
            EntryBody::Loading {
                label: label.into(),
            },
        )
    }

    /// A tabular result
    pub fn table(table: TableView) -> Self {
        Self::new(Role::Assistant, EntryBody::Table { table })
    }

    /// A follow-up suggestion group
    pub fn follow_ups(questions: Vec<String>) -> Self {
        Self::new(Role::Assistant, EntryBody::FollowUps { questions })
    }

    /// Whether this is a transient loading entry
    pub fn is_loading(&self) -> bool {
        matches!(self.body, EntryBody::Loading { .. })
    }

    /// The entry's text content, if it has any
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            EntryBody::Text { text } => Some(text),
            EntryBody::Loading { label } => Some(label),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_ids_are_unique() {
        let a = MessageEntry::user("hi");
        let b = MessageEntry::user("hi");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_loading_flag() {
        assert!(MessageEntry::loading("Thinking...").is_loading());
        assert!(!MessageEntry::assistant("done").is_loading());
    }

    #[test]
    fn test_text_accessor() {
        assert_eq!(MessageEntry::user("q").text(), Some("q"));
        assert_eq!(MessageEntry::follow_ups(vec!["a".into()]).text(), None);
    }
}
