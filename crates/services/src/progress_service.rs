use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use lessons_core::model::{Completion, ProgressState, User, UserId};
use storage::SnapshotStore;

use crate::Clock;
use crate::error::ProgressServiceError;

/// Orchestrates enrollment and lesson-day completion over shared state.
///
/// All state lives behind one `RwLock`: mutating operations hold the write
/// guard across the full read-check-mutate-persist sequence, so the
/// idempotence check and the tally increment can never interleave. Read-only
/// queries share the read guard and only wait while a mutation (including its
/// save) is in flight.
pub struct ProgressService {
    clock: Clock,
    store: Arc<dyn SnapshotStore>,
    state: RwLock<ProgressState>,
}

impl ProgressService {
    /// Loads the last saved snapshot and builds the service around it.
    pub async fn load(clock: Clock, store: Arc<dyn SnapshotStore>) -> Self {
        let state = store.load().await;
        info!(
            users = state.user_count(),
            "loaded progress snapshot"
        );
        Self {
            clock,
            store,
            state: RwLock::new(state),
        }
    }

    /// Enrolls a new user and persists the updated snapshot.
    ///
    /// The enrollment timestamp starts the day-gating clock.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` if the name is blank after trimming.
    pub async fn enroll_user(&self, name: &str) -> Result<User, ProgressServiceError> {
        let user = User::new(UserId::random(), name, self.clock.now())?;

        let mut state = self.state.write().await;
        state.enroll(user.clone());
        self.persist(&state).await;
        Ok(user)
    }

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownUser` if the id is not enrolled.
    pub async fn get_user(&self, id: UserId) -> Result<User, ProgressServiceError> {
        let state = self.state.read().await;
        state
            .user(id)
            .cloned()
            .ok_or(lessons_core::model::ProgressError::UnknownUser.into())
    }

    /// Records completion of a lesson day, subject to the gating rule.
    ///
    /// Persists only when state actually changed; re-completing a day is a
    /// read-only no-op that reports `already_completed`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownUser`, `DayNotYetAvailable`, or
    /// `InvalidDay` from the state transition.
    pub async fn complete_day(
        &self,
        id: UserId,
        day: u32,
    ) -> Result<Completion, ProgressServiceError> {
        let now = self.clock.now();
        let mut state = self.state.write().await;
        let completion = state.complete_day(id, day, now)?;
        if !completion.already_completed {
            self.persist(&state).await;
        }
        Ok(completion)
    }

    /// Global tally for one lesson day; 0 when nobody has completed it.
    pub async fn day_count(&self, day: u32) -> u64 {
        let state = self.state.read().await;
        state.counts().count_for(day)
    }

    /// Snapshot copy of every per-day tally.
    pub async fn all_counts(&self) -> BTreeMap<u32, u64> {
        let state = self.state.read().await;
        state.counts().snapshot()
    }

    /// Deletes a user and persists. Global tallies are untouched.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownUser` if the id is not enrolled.
    pub async fn delete_user(&self, id: UserId) -> Result<(), ProgressServiceError> {
        let mut state = self.state.write().await;
        state.remove_user(id)?;
        self.persist(&state).await;
        Ok(())
    }

    /// Best-effort save. A failure is logged and swallowed: the in-memory
    /// mutation already happened and stays authoritative, so the snapshot may
    /// lag until the next successful save.
    async fn persist(&self, state: &ProgressState) {
        if let Err(err) = self.store.save(state).await {
            error!(%err, "failed to persist progress snapshot");
        }
    }
}
