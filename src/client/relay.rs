use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use std::error::Error;

use crate::models::chat::ConversationMessage;

/// Client-side seam for the relay's `/ask` endpoint.
#[async_trait]
pub trait RelayApi: Send + Sync {
    async fn ask(
        &self,
        conversation: &[ConversationMessage]
    ) -> Result<String, Box<dyn Error + Send + Sync>>;
}

#[derive(Deserialize)]
struct AskReply {
    reply: String,
}

#[derive(Deserialize)]
struct RelayErrorBody {
    error: String,
    details: Option<String>,
}

pub struct HttpRelayClient {
    http: HttpClient,
    base_url: String,
}

impl HttpRelayClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http: HttpClient::new(),
            base_url,
        }
    }

    fn ask_url(&self) -> String {
        format!("{}/ask", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl RelayApi for HttpRelayClient {
    async fn ask(
        &self,
        conversation: &[ConversationMessage]
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        let resp = self.http
            .post(self.ask_url())
            .json(&json!({ "conversation": conversation }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let message = match resp.json::<RelayErrorBody>().await {
                Ok(body) => match body.details {
                    Some(details) => format!("{} ({})", body.error, details),
                    None => body.error,
                },
                Err(_) => format!("Relay returned {}", status),
            };
            return Err(message.into());
        }

        let reply = resp.json::<AskReply>().await?;
        Ok(reply.reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_url_tolerates_trailing_slash() {
        let client = HttpRelayClient::new("http://localhost:5000/".to_string());
        assert_eq!(client.ask_url(), "http://localhost:5000/ask");
    }

    #[test]
    fn error_body_decodes_with_and_without_details() {
        let full: RelayErrorBody =
            serde_json::from_str(r#"{"error":"boom","details":"why"}"#).unwrap();
        assert_eq!(full.error, "boom");
        assert_eq!(full.details.as_deref(), Some("why"));

        let bare: RelayErrorBody = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert!(bare.details.is_none());
    }
}
