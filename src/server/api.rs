use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::{ IntoResponse, Response },
    http::StatusCode,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error as ThisError;
use tower_http::cors::{ Any, CorsLayer };
use log::{ info, error };

use crate::llm::{ CompletionClient, UpstreamError };

#[derive(Clone)]
struct AppState {
    upstream: Arc<dyn CompletionClient>,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub reply: String,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, ThisError)]
pub enum RelayError {
    #[error("Invalid conversation format. Expected an array.")]
    InvalidConversation,

    #[error("No reply from AI model.")]
    NoReply,

    #[error("Something went wrong talking to AI!")]
    Upstream(String),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            RelayError::InvalidConversation =>
                (StatusCode::BAD_REQUEST, ErrorBody {
                    error: self.to_string(),
                    details: None,
                }),
            RelayError::NoReply =>
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody {
                    error: self.to_string(),
                    details: None,
                }),
            RelayError::Upstream(ref detail) =>
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody {
                    error: self.to_string(),
                    details: Some(detail.clone()),
                }),
        };

        (status, Json(body)).into_response()
    }
}

pub async fn start_http_server(
    addr: &str,
    upstream: Arc<dyn CompletionClient>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let app = router(upstream);

    info!("Relay listening on: http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

pub fn router(upstream: Arc<dyn CompletionClient>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/ask", post(ask_handler))
        .layer(cors)
        .with_state(AppState { upstream })
}

async fn root_handler() -> &'static str {
    "Server is running"
}

async fn ask_handler(
    State(state): State<AppState>,
    Json(body): Json<JsonValue>,
) -> Result<Json<AskResponse>, RelayError> {
    let conversation = parse_conversation(&body)?;
    info!("Relaying conversation with {} messages", conversation.len());

    let reply = state.upstream
        .complete(conversation)
        .await
        .map_err(|e| match e {
            UpstreamError::NoReply => {
                error!("No reply received from upstream");
                RelayError::NoReply
            }
            UpstreamError::Request(detail) => {
                error!("Error talking to upstream: {}", detail);
                RelayError::Upstream(detail)
            }
        })?;

    Ok(Json(AskResponse { reply }))
}

fn parse_conversation(body: &JsonValue) -> Result<&[JsonValue], RelayError> {
    body.get("conversation")
        .and_then(JsonValue::as_array)
        .map(Vec::as_slice)
        .ok_or(RelayError::InvalidConversation)
}
