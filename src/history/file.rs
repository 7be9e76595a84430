use async_trait::async_trait;
use std::error::Error;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;

use super::TurnStore;
use crate::models::chat::ChatTurn;

/// Stores the transcript as a single JSON array in one file.
pub struct FileTurnStore {
    path: PathBuf,
}

impl FileTurnStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TurnStore for FileTurnStore {
    async fn load(&self) -> Result<Vec<ChatTurn>, Box<dyn Error + Send + Sync>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            // No file yet means an empty history, not an error.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Box::new(e));
            }
        };

        let turns = serde_json::from_slice::<Vec<ChatTurn>>(&bytes)
            .map_err(|e| format!("Corrupt history file {}: {}", self.path.display(), e))?;

        Ok(turns)
    }

    async fn save(&self, turns: &[ChatTurn]) -> Result<(), Box<dyn Error + Send + Sync>> {
        let json = serde_json::to_string(turns)?;
        fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Box::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> FileTurnStore {
        FileTurnStore::new(dir.path().join("ai-chats.json"))
    }

    fn sample_turns() -> Vec<ChatTurn> {
        let mut answered = ChatTurn::new(1, "first".to_string(), "2025-01-01 10:00:00".to_string());
        answered.ai_text = "reply".to_string();
        answered.ai_time = "2025-01-01 10:00:05".to_string();
        let pending = ChatTurn::new(2, "second".to_string(), "2025-01-01 10:01:00".to_string());
        vec![answered, pending]
    }

    #[tokio::test]
    async fn round_trip_preserves_order_and_fields() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        let turns = sample_turns();

        store.save(&turns).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, turns);
    }

    #[tokio::test]
    async fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_the_file() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&sample_turns()).await.unwrap();
        store.clear().await.unwrap();

        assert!(!dir.path().join("ai-chats.json").exists());
        // Clearing an already-clear store is not an error.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn save_rewrites_the_whole_array() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&sample_turns()).await.unwrap();
        let shorter = vec![sample_turns().remove(0)];
        store.save(&shorter).await.unwrap();

        assert_eq!(store.load().await.unwrap(), shorter);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ai-chats.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = FileTurnStore::new(path);
        assert!(store.load().await.is_err());
    }
}
