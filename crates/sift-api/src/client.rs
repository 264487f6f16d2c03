//! Assistant backend client

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::{
    error::Result,
    types::{ConversationStarted, Envelope, MessageSent, ReplyPayload},
};

/// Client for the backend proxy in front of the assistant service.
///
/// The backend wraps every assistant response in the `Envelope` protocol, so
/// each method here unwraps one envelope and surfaces business failures as
/// `Error::Api`.
#[derive(Debug, Clone)]
pub struct AssistantClient {
    client: reqwest::Client,
    base_url: String,
}

impl AssistantClient {
    /// Create a new client against a backend base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// The backend base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start a new conversation with the given first message
    pub async fn start_conversation(&self, content: &str) -> Result<ConversationStarted> {
        let url = format!("{}/api/assistant/conversations/start", self.base_url);
        self.post(&url, json!({ "content": content })).await
    }

    /// Post a follow-up message to an existing conversation
    pub async fn continue_conversation(
        &self,
        conversation_id: &str,
        content: &str,
    ) -> Result<MessageSent> {
        let url = format!(
            "{}/api/assistant/conversations/{}/messages",
            self.base_url, conversation_id
        );
        self.post(&url, json!({ "content": content })).await
    }

    /// Fetch the current state of an assistant reply
    pub async fn message_status(
        &self,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<ReplyPayload> {
        let url = format!(
            "{}/api/assistant/conversations/{}/messages/{}",
            self.base_url, conversation_id, message_id
        );
        self.get(&url).await
    }

    /// Fetch the tabular result behind a reply attachment
    pub async fn query_result(
        &self,
        conversation_id: &str,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<Value> {
        let url = format!(
            "{}/api/assistant/conversations/{}/messages/{}/query-result/{}",
            self.base_url, conversation_id, message_id, attachment_id
        );
        self.get(&url).await
    }

    async fn post<T: DeserializeOwned>(&self, url: &str, body: Value) -> Result<T> {
        tracing::debug!("POST {}", url);
        let envelope: Envelope<T> = self.client.post(url).json(&body).send().await?.json().await?;
        envelope.into_result()
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let envelope: Envelope<T> = self.client.get(url).send().await?.json().await?;
        envelope.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let client = AssistantClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
        let client = AssistantClient::new("http://localhost:8000");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
