//! Wire types for the assistant backend envelope protocol

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Response envelope wrapping every backend payload.
///
/// Business-level success is `status == "success"` with `data` present;
/// anything else is a failure, optionally carrying a server-supplied
/// `error` string.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Unwrap the envelope into the payload or a business-level error
    pub fn into_result(self) -> Result<T> {
        if self.status.as_deref() == Some("success") {
            if let Some(data) = self.data {
                return Ok(data);
            }
            return Err(Error::UnexpectedResponse(
                "success envelope without data".to_string(),
            ));
        }
        if let Some(message) = self.error {
            return Err(Error::Api { message });
        }
        Err(Error::UnexpectedResponse(format!(
            "envelope with status {:?} and no error",
            self.status
        )))
    }
}

/// Payload returned when a conversation is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationStarted {
    pub conversation_id: String,
    pub message_id: String,
    /// Fields the backend sends that this client does not depend on
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload returned when a message is posted to an existing conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageSent {
    pub message_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lifecycle status of an assistant reply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplyStatus {
    Completed,
    Failed,
    /// Any non-terminal status the service reports while it is still working
    #[default]
    InProgress,
}

impl ReplyStatus {
    /// Whether polling should stop at this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReplyStatus::Completed | ReplyStatus::Failed)
    }
}

impl<'de> serde::Deserialize<'de> for ReplyStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Only the two terminal statuses matter; every other value the
        // service reports means the reply is still being produced.
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "COMPLETED" => ReplyStatus::Completed,
            "FAILED" => ReplyStatus::Failed,
            _ => ReplyStatus::InProgress,
        })
    }
}

/// An assistant reply as reported by the status endpoint.
///
/// Only the fields this client navigates are typed; the service attaches
/// more (timestamps, follow-up suggestions under several alternate names)
/// which land in `extra` for the interpreter to probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplyPayload {
    #[serde(default)]
    pub status: ReplyStatus,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One attachment on an assistant reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub query: Option<QueryAttachment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    /// Identifier used to fetch this attachment's query result.
    /// The service names it `attachment_id` in newer payloads and `id` in older ones.
    pub fn result_id(&self) -> Option<&str> {
        self.attachment_id.as_deref().or(self.id.as_deref())
    }

    /// Whether this attachment carries an executed query with fetchable results
    pub fn has_query_result(&self) -> bool {
        self.query
            .as_ref()
            .is_some_and(|q| q.statement_id.is_some())
    }
}

/// The query block inside an attachment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryAttachment {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub statement_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
