use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::model::ids::UserId;
use crate::model::user::User;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("user not found")]
    UnknownUser,

    #[error("lesson day {day} is not yet available")]
    DayNotYetAvailable { day: u32 },

    #[error("lesson days start at 1")]
    InvalidDay,
}

//
// ─── GLOBAL COUNTS ─────────────────────────────────────────────────────────────
//

/// Historical tally of completions per lesson day, across all users ever
/// enrolled.
///
/// Entries are created lazily on first completion and never removed or
/// decremented, so this is a monotonically non-decreasing record, not a live
/// count of currently enrolled users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalCounts {
    counts: BTreeMap<u32, u64>,
}

impl GlobalCounts {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the tally from persisted entries.
    #[must_use]
    pub fn from_entries(counts: BTreeMap<u32, u64>) -> Self {
        Self { counts }
    }

    /// Records one completion of `day` and returns the new tally for it.
    pub fn record(&mut self, day: u32) -> u64 {
        let count = self.counts.entry(day).or_insert(0);
        *count += 1;
        *count
    }

    /// Tally for a single day; 0 if nobody has completed it.
    #[must_use]
    pub fn count_for(&self, day: u32) -> u64 {
        self.counts.get(&day).copied().unwrap_or(0)
    }

    /// A snapshot copy of every per-day tally.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<u32, u64> {
        self.counts.clone()
    }
}

//
// ─── PROGRESS STATE ────────────────────────────────────────────────────────────
//

/// Result of a complete-day request that passed the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// True when the day was already recorded and nothing changed.
    pub already_completed: bool,
    /// The day's global tally after (or unchanged by) this request.
    pub global_count: u64,
}

/// The full in-memory state: enrolled users plus the global per-day tally.
///
/// This is the persisted snapshot shape; services own one instance and route
/// every mutation through the transition methods below.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressState {
    users: HashMap<UserId, User>,
    counts: GlobalCounts,
}

impl ProgressState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds state from persisted parts, re-keying users by their own id.
    #[must_use]
    pub fn from_parts(users: Vec<User>, counts: GlobalCounts) -> Self {
        let users = users.into_iter().map(|user| (user.id(), user)).collect();
        Self { users, counts }
    }

    /// Inserts a freshly enrolled user.
    pub fn enroll(&mut self, user: User) {
        self.users.insert(user.id(), user);
    }

    /// Looks up a user by id.
    #[must_use]
    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    /// Iterates over all enrolled users in no particular order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn counts(&self) -> &GlobalCounts {
        &self.counts
    }

    /// Records completion of `day` for the given user.
    ///
    /// The gate admits day N once N days of wall-clock time have elapsed since
    /// enrollment. Earlier days stay completable forever and days may be
    /// skipped; there is no requirement that prior days were completed first.
    /// Completing an already-recorded day reports `already_completed` and
    /// leaves both the user and the tally untouched.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidDay` for day 0, `UnknownUser` for an
    /// unenrolled id, and `DayNotYetAvailable` when the gate rejects the day.
    pub fn complete_day(
        &mut self,
        id: UserId,
        day: u32,
        now: DateTime<Utc>,
    ) -> Result<Completion, ProgressError> {
        if day == 0 {
            return Err(ProgressError::InvalidDay);
        }
        let user = self.users.get_mut(&id).ok_or(ProgressError::UnknownUser)?;
        if i64::from(day) > user.allowed_day(now) {
            return Err(ProgressError::DayNotYetAvailable { day });
        }

        if !user.record_completion(day) {
            return Ok(Completion {
                already_completed: true,
                global_count: self.counts.count_for(day),
            });
        }

        Ok(Completion {
            already_completed: false,
            global_count: self.counts.record(day),
        })
    }

    /// Removes a user. The global tally keeps every completion they
    /// contributed.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::UnknownUser` if the id is not enrolled.
    pub fn remove_user(&mut self, id: UserId) -> Result<(), ProgressError> {
        self.users
            .remove(&id)
            .map(|_| ())
            .ok_or(ProgressError::UnknownUser)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn state_with_user(name: &str) -> (ProgressState, UserId) {
        let mut state = ProgressState::new();
        let user = User::new(UserId::random(), name, fixed_now()).unwrap();
        let id = user.id();
        state.enroll(user);
        (state, id)
    }

    #[test]
    fn complete_day_one_immediately() {
        let (mut state, id) = state_with_user("Alice");
        let completion = state.complete_day(id, 1, fixed_now()).unwrap();
        assert!(!completion.already_completed);
        assert_eq!(completion.global_count, 1);
        assert_eq!(state.user(id).unwrap().completed_days(), &[1]);
    }

    #[test]
    fn complete_day_two_gated_until_a_day_elapses() {
        let (mut state, id) = state_with_user("Alice");
        let err = state.complete_day(id, 2, fixed_now()).unwrap_err();
        assert_eq!(err, ProgressError::DayNotYetAvailable { day: 2 });

        let later = fixed_now() + Duration::hours(24);
        let completion = state.complete_day(id, 2, later).unwrap();
        assert!(!completion.already_completed);
    }

    #[test]
    fn complete_day_is_idempotent() {
        let (mut state, id) = state_with_user("Alice");
        state.complete_day(id, 1, fixed_now()).unwrap();
        let second = state.complete_day(id, 1, fixed_now()).unwrap();
        assert!(second.already_completed);
        assert_eq!(second.global_count, 1);
        assert_eq!(state.counts().count_for(1), 1);
    }

    #[test]
    fn days_may_be_skipped_once_unlocked() {
        let (mut state, id) = state_with_user("Alice");
        let later = fixed_now() + Duration::days(2);
        state.complete_day(id, 1, later).unwrap();
        // Day 2 was never completed; day 3 is unlocked and goes through.
        let completion = state.complete_day(id, 3, later).unwrap();
        assert!(!completion.already_completed);
        assert_eq!(state.user(id).unwrap().completed_days(), &[1, 3]);
    }

    #[test]
    fn complete_day_rejects_day_zero() {
        let (mut state, id) = state_with_user("Alice");
        let err = state.complete_day(id, 0, fixed_now()).unwrap_err();
        assert_eq!(err, ProgressError::InvalidDay);
    }

    #[test]
    fn complete_day_unknown_user() {
        let mut state = ProgressState::new();
        let err = state
            .complete_day(UserId::random(), 1, fixed_now())
            .unwrap_err();
        assert_eq!(err, ProgressError::UnknownUser);
    }

    #[test]
    fn counts_track_distinct_users() {
        let mut state = ProgressState::new();
        for name in ["Alice", "Bob", "Carol"] {
            let user = User::new(UserId::random(), name, fixed_now()).unwrap();
            let id = user.id();
            state.enroll(user);
            state.complete_day(id, 1, fixed_now()).unwrap();
        }
        assert_eq!(state.counts().count_for(1), 3);
        assert_eq!(state.counts().count_for(2), 0);
    }

    #[test]
    fn remove_user_keeps_global_counts() {
        let (mut state, id) = state_with_user("Alice");
        state.complete_day(id, 1, fixed_now()).unwrap();

        state.remove_user(id).unwrap();
        assert!(state.user(id).is_none());
        assert_eq!(state.counts().count_for(1), 1);
    }

    #[test]
    fn remove_user_twice_is_unknown() {
        let (mut state, id) = state_with_user("Alice");
        state.remove_user(id).unwrap();
        assert_eq!(state.remove_user(id), Err(ProgressError::UnknownUser));
    }

    #[test]
    fn from_parts_keys_users_by_their_id() {
        let user = User::new(UserId::random(), "Alice", fixed_now()).unwrap();
        let id = user.id();
        let state = ProgressState::from_parts(vec![user], GlobalCounts::new());
        assert_eq!(state.user(id).unwrap().name(), "Alice");
    }

    #[test]
    fn snapshot_is_a_copy() {
        let mut counts = GlobalCounts::new();
        counts.record(1);
        let mut snapshot = counts.snapshot();
        snapshot.insert(2, 99);
        assert_eq!(counts.count_for(2), 0);
    }
}
