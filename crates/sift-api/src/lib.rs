//! sift-api: HTTP client for the assistant backend proxy
//!
//! This crate speaks the backend's envelope protocol: every response carries a
//! top-level `status` discriminator plus a `data` or `error` field. Business
//! success and failure are read from the envelope, never from HTTP status codes.

pub mod client;
pub mod error;
pub mod types;

pub use client::AssistantClient;
pub use error::{Error, Result};
pub use types::*;
