use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::UserId;

/// Milliseconds in one lesson day. The gate works on elapsed wall-clock time,
/// not calendar-day boundaries.
const MS_PER_DAY: i64 = 86_400_000;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("name must not be empty")]
    EmptyName,
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// An enrolled user and their completed lesson days.
///
/// Completed days keep insertion order so a stored user round-trips byte-for-byte;
/// uniqueness is enforced on mutation, never by reordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    enrolled_at: DateTime<Utc>,
    completed_days: Vec<u32>,
}

impl User {
    /// Creates a newly enrolled user with no completed days.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` if the name is empty or whitespace-only.
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        enrolled_at: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserError::EmptyName);
        }

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            enrolled_at,
            completed_days: Vec::new(),
        })
    }

    /// Rebuilds a user from persisted fields without re-validating.
    #[must_use]
    pub fn from_persisted(
        id: UserId,
        name: String,
        enrolled_at: DateTime<Utc>,
        completed_days: Vec<u32>,
    ) -> Self {
        Self {
            id,
            name,
            enrolled_at,
            completed_days,
        }
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    #[must_use]
    pub fn completed_days(&self) -> &[u32] {
        &self.completed_days
    }

    /// Highest lesson day this user may complete at `now`.
    ///
    /// Day 1 unlocks at enrollment, day 2 after a full 24 h, and so on.
    /// Floor division means a `now` before the enrollment instant pushes the
    /// allowed day below 1, gating every request.
    #[must_use]
    pub fn allowed_day(&self, now: DateTime<Utc>) -> i64 {
        let elapsed_ms = (now - self.enrolled_at).num_milliseconds();
        1 + elapsed_ms.div_euclid(MS_PER_DAY)
    }

    /// Whether the given lesson day is already recorded for this user.
    #[must_use]
    pub fn has_completed(&self, day: u32) -> bool {
        self.completed_days.contains(&day)
    }

    /// Appends `day` to the completion list if it is not already present.
    ///
    /// Returns `true` when the day was newly recorded.
    pub fn record_completion(&mut self, day: u32) -> bool {
        if self.has_completed(day) {
            return false;
        }
        self.completed_days.push(day);
        true
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

    fn enrolled_user() -> User {
        User::new(UserId::random(), "Alice", fixed_now()).unwrap()
    }

    #[test]
    fn new_rejects_empty_name() {
        let err = User::new(UserId::random(), "", fixed_now()).unwrap_err();
        assert_eq!(err, UserError::EmptyName);
    }

    #[test]
    fn new_rejects_whitespace_only_name() {
        let err = User::new(UserId::random(), "   \t", fixed_now()).unwrap_err();
        assert_eq!(err, UserError::EmptyName);
    }

    #[test]
    fn new_trims_name() {
        let user = User::new(UserId::random(), "  Alice  ", fixed_now()).unwrap();
        assert_eq!(user.name(), "Alice");
        assert!(user.completed_days().is_empty());
    }

    #[test]
    fn day_one_unlocks_at_enrollment() {
        let user = enrolled_user();
        assert_eq!(user.allowed_day(fixed_now()), 1);
    }

    #[test]
    fn day_two_stays_locked_under_24h() {
        let user = enrolled_user();
        let almost = fixed_now() + Duration::hours(23) + Duration::minutes(59);
        assert_eq!(user.allowed_day(almost), 1);
    }

    #[test]
    fn day_two_unlocks_at_exactly_24h() {
        let user = enrolled_user();
        assert_eq!(user.allowed_day(fixed_now() + Duration::hours(24)), 2);
    }

    #[test]
    fn allowed_day_grows_one_per_elapsed_day() {
        let user = enrolled_user();
        let later = fixed_now() + Duration::days(6) + Duration::hours(5);
        assert_eq!(user.allowed_day(later), 7);
    }

    #[test]
    fn allowed_day_floors_before_enrollment() {
        // A clock behind the enrollment instant gates everything, including day 1.
        let user = enrolled_user();
        let earlier = fixed_now() - Duration::minutes(1);
        assert_eq!(user.allowed_day(earlier), 0);
    }

    #[test]
    fn record_completion_is_idempotent() {
        let mut user = enrolled_user();
        assert!(user.record_completion(1));
        assert!(!user.record_completion(1));
        assert_eq!(user.completed_days(), &[1]);
    }

    #[test]
    fn completed_days_keep_insertion_order() {
        let mut user = enrolled_user();
        user.record_completion(3);
        user.record_completion(1);
        user.record_completion(2);
        assert_eq!(user.completed_days(), &[3, 1, 2]);
    }
}
