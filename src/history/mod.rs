mod file;

pub use file::FileTurnStore;

use async_trait::async_trait;
use log::info;
use std::error::Error;
use std::path::PathBuf;

use crate::models::chat::ChatTurn;

/// Local persisted store for the chat transcript: one ordered array of
/// turns, read once at startup, rewritten whole on every mutation and
/// removed entirely on clear.
#[async_trait]
pub trait TurnStore: Send + Sync {
    async fn load(&self) -> Result<Vec<ChatTurn>, Box<dyn Error + Send + Sync>>;

    async fn save(&self, turns: &[ChatTurn]) -> Result<(), Box<dyn Error + Send + Sync>>;

    async fn clear(&self) -> Result<(), Box<dyn Error + Send + Sync>>;
}

pub fn initialize_turn_store(
    path: &str
) -> Result<Box<dyn TurnStore>, Box<dyn Error + Send + Sync>> {
    info!("Chat history will be stored in: {}", path);
    Ok(Box::new(FileTurnStore::new(PathBuf::from(path))))
}
