use async_trait::async_trait;
use lessons_core::model::ProgressState;
use std::sync::Mutex;
use thiserror::Error;

/// Errors surfaced by snapshot backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persistence contract consumed by the progress service.
///
/// The service calls `save` after every mutation and `load` once at startup.
/// Loading never fails: a missing or unreadable snapshot is logged by the
/// backend and reported as the empty default state. A failed `save` is the
/// caller's to log; the in-memory state is already mutated and stays
/// authoritative.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Returns the last saved snapshot, or the default state if none is
    /// readable.
    async fn load(&self) -> ProgressState;

    /// Persists the full snapshot, atomically from a reader's perspective.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    async fn save(&self, state: &ProgressState) -> Result<(), StorageError>;
}

/// Simple in-memory snapshot store for testing and prototyping.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    snapshot: Mutex<Option<ProgressState>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a snapshot has been saved at least once.
    #[must_use]
    pub fn has_snapshot(&self) -> bool {
        self.snapshot.lock().is_ok_and(|guard| guard.is_some())
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn load(&self) -> ProgressState {
        self.snapshot
            .lock()
            .map(|guard| guard.clone().unwrap_or_default())
            .unwrap_or_default()
    }

    async fn save(&self, state: &ProgressState) -> Result<(), StorageError> {
        let mut guard = self
            .snapshot
            .lock()
            .map_err(|e| StorageError::Io(e.to_string()))?;
        *guard = Some(state.clone());
        Ok(())
    }
}
