//! Error types for sift-api

use thiserror::Error;

/// Result type alias using sift-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the assistant backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend envelope reported a business-level failure
    #[error("{message}")]
    Api { message: String },

    /// Response did not match the envelope contract
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create a business-level error from a server-supplied message
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// The server-supplied error message, if the backend sent one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Error::Api { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_on_api_variant() {
        let e = Error::api("space not found");
        assert_eq!(e.server_message(), Some("space not found"));
        assert_eq!(e.to_string(), "space not found");
    }

    #[test]
    fn test_server_message_absent_on_transport_variants() {
        let e = Error::UnexpectedResponse("not an envelope".into());
        assert_eq!(e.server_message(), None);
    }
}
