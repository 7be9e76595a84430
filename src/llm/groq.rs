use async_trait::async_trait;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };
use serde_json::Value as JsonValue;

use super::{ CompletionClient, UpstreamConfig, UpstreamError };

pub struct GroqClient {
    http: HttpClient,
    model: String,
    url: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [JsonValue],
    stream: bool,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<JsonValue>,
}

impl GroqClient {
    pub fn new(api_key: String, model: String, url: String) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| UpstreamError::Request(format!("Invalid API key format: {}", e)))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        Ok(Self {
            http,
            model,
            url,
        })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        if config.api_key.is_empty() {
            return Err(UpstreamError::Request("Upstream API key is required".to_string()));
        }

        Self::new(config.api_key.clone(), config.model.clone(), config.url.clone())
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, messages: &[JsonValue]) -> Result<String, UpstreamError> {
        let req = CompletionRequest {
            model: &self.model,
            messages,
            stream: false,
        };

        let resp = self.http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| UpstreamError::Request(e.to_string()))?
            .json::<CompletionResponse>()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        extract_reply(resp)
    }

    fn model(&self) -> String {
        self.model.clone()
    }
}

fn extract_reply(resp: CompletionResponse) -> Result<String, UpstreamError> {
    let content = resp.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(UpstreamError::NoReply)?;

    match content {
        // An empty string counts as no reply, same as a missing field.
        JsonValue::String(s) if s.is_empty() => Err(UpstreamError::NoReply),
        JsonValue::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}
