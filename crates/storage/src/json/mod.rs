use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lessons_core::model::ProgressState;
use tokio::fs;
use tracing::{info, warn};

use crate::repository::{SnapshotStore, StorageError};

mod record;

pub use record::{SnapshotRecord, UserRecord};

/// Snapshot store backed by a single human-readable JSON document.
///
/// Every save rewrites the whole document: the bytes go to a sibling temp
/// file first and are renamed over the target, so a concurrent reader sees
/// either the old snapshot or the new one, never a torn write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("snapshot"), ToOwned::to_owned);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Starts from the empty state and writes it out so the data file exists
    /// from first launch, matching a load that found nothing usable.
    async fn start_fresh(&self) -> ProgressState {
        let state = ProgressState::new();
        if let Err(error) = self.save(&state).await {
            warn!(%error, path = %self.path.display(), "could not write fresh snapshot");
        }
        state
    }
}

#[async_trait]
impl SnapshotStore for JsonFileStore {
    async fn load(&self) -> ProgressState {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no existing data file found, starting fresh");
                return self.start_fresh().await;
            }
            Err(error) => {
                warn!(%error, path = %self.path.display(), "could not read data file, starting fresh");
                return self.start_fresh().await;
            }
        };

        match serde_json::from_slice::<SnapshotRecord>(&bytes) {
            Ok(record) => record.into_state(),
            Err(error) => {
                warn!(%error, path = %self.path.display(), "data file is not a valid snapshot, starting fresh");
                self.start_fresh().await
            }
        }
    }

    async fn save(&self, state: &ProgressState) -> Result<(), StorageError> {
        let record = SnapshotRecord::from_state(state);
        let bytes = serde_json::to_vec_pretty(&record)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }
}
