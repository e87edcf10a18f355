//! JSON-file state store.
//!
//! One pretty-printed file per session under a data directory. Writes go to
//! a temporary file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chronicler_domain::SessionId;

use crate::infrastructure::ports::{SavedGame, StateStorePort, StoreError};

pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, session_id: SessionId) -> PathBuf {
        self.data_dir.join(format!("{}.json", session_id))
    }
}

#[async_trait]
impl StateStorePort for JsonFileStore {
    async fn load(&self, session_id: SessionId) -> Result<Option<SavedGame>, StoreError> {
        let path = self.path_for(session_id);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::Io(e.to_string())),
        };
        let game = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        tracing::debug!(path = %path.display(), "Loaded saved game");
        Ok(Some(game))
    }

    async fn save(&self, game: &SavedGame) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let json = serde_json::to_string_pretty(game)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = self.path_for(game.session.id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Saved game written");
        Ok(())
    }
}
