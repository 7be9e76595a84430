pub mod groq;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

use self::groq::GroqClient;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The API answered but carried no usable reply text.
    #[error("No reply from AI model.")]
    NoReply,

    #[error("{0}")]
    Request(String),
}

/// Settings for the upstream completion API.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub url: String,
    pub api_key: String,
    pub model: String,
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends the conversation and returns the reply text. Messages are
    /// forwarded exactly as received; a single attempt, no retry.
    async fn complete(&self, messages: &[JsonValue]) -> Result<String, UpstreamError>;

    fn model(&self) -> String;
}

pub fn new_client(config: &UpstreamConfig) -> Result<Arc<dyn CompletionClient>, UpstreamError> {
    let client = GroqClient::from_config(config)?;
    Ok(Arc::new(client))
}
