use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use lessons_core::model::{GlobalCounts, ProgressState, User, UserId};

/// Persisted shape for a user.
///
/// Mirrors the domain `User` so the store can serialize without leaking wire
/// concerns into the domain layer. Field names and the ISO-8601 timestamp
/// match the snapshot document format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub enrolled_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_days: Vec<u32>,
}

impl UserRecord {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id().as_uuid(),
            name: user.name().to_owned(),
            enrolled_at: user.enrolled_at(),
            completed_days: user.completed_days().to_vec(),
        }
    }

    #[must_use]
    pub fn into_user(self) -> User {
        User::from_persisted(
            UserId::from_uuid(self.id),
            self.name,
            self.enrolled_at,
            self.completed_days,
        )
    }
}

/// The full snapshot document: `users` keyed by id, plus `globalCounts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotRecord {
    pub users: HashMap<Uuid, UserRecord>,
    pub global_counts: BTreeMap<u32, u64>,
}

impl SnapshotRecord {
    #[must_use]
    pub fn from_state(state: &ProgressState) -> Self {
        Self {
            users: state
                .users()
                .map(|user| (user.id().as_uuid(), UserRecord::from_user(user)))
                .collect(),
            global_counts: state.counts().snapshot(),
        }
    }

    /// Converts the record back into domain state.
    ///
    /// Users are re-keyed by each record's own `id` field, so a hand-edited
    /// document cannot break the key/id invariant.
    #[must_use]
    pub fn into_state(self) -> ProgressState {
        let users = self
            .users
            .into_values()
            .map(UserRecord::into_user)
            .collect();
        ProgressState::from_parts(users, GlobalCounts::from_entries(self.global_counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessons_core::time::fixed_now;

    fn sample_state() -> ProgressState {
        let mut state = ProgressState::new();
        let user = User::new(UserId::random(), "Alice", fixed_now()).unwrap();
        let id = user.id();
        state.enroll(user);
        state.complete_day(id, 1, fixed_now()).unwrap();
        state
    }

    #[test]
    fn state_record_roundtrip() {
        let state = sample_state();
        let record = SnapshotRecord::from_state(&state);
        assert_eq!(record.into_state(), state);
    }

    #[test]
    fn document_uses_camel_case_keys() {
        let json = serde_json::to_value(SnapshotRecord::from_state(&sample_state())).unwrap();
        assert!(json.get("globalCounts").is_some());
        let user = json["users"].as_object().unwrap().values().next().unwrap();
        assert!(user.get("enrolledAt").is_some());
        assert!(user.get("completedDays").is_some());
    }

    #[test]
    fn enrolled_at_is_iso_8601() {
        let record = UserRecord::from_user(
            &User::new(UserId::random(), "Alice", fixed_now()).unwrap(),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["enrolledAt"], "2024-03-01T00:00:00Z");
    }

    #[test]
    fn completed_days_preserve_order() {
        let mut user = User::new(UserId::random(), "Alice", fixed_now()).unwrap();
        user.record_completion(3);
        user.record_completion(1);
        let record = UserRecord::from_user(&user);
        let restored = record.into_user();
        assert_eq!(restored.completed_days(), &[3, 1]);
    }

    #[test]
    fn empty_document_parses_as_default() {
        let record: SnapshotRecord = serde_json::from_str("{}").unwrap();
        let state = record.into_state();
        assert_eq!(state.user_count(), 0);
        assert_eq!(state.counts().count_for(1), 0);
    }

    #[test]
    fn map_key_mismatch_resolves_to_record_id() {
        let user = User::new(UserId::random(), "Alice", fixed_now()).unwrap();
        let id = user.id();
        let mut users = HashMap::new();
        // Key the map under some other uuid, as a hand-edited file might.
        users.insert(Uuid::new_v4(), UserRecord::from_user(&user));
        let record = SnapshotRecord {
            users,
            global_counts: BTreeMap::new(),
        };
        let state = record.into_state();
        assert_eq!(state.user(id).unwrap().name(), "Alice");
    }
}
