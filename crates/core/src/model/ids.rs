use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for an enrolled user.
///
/// Wraps a v4 UUID so identifiers are practically collision-free and can key
/// the persisted snapshot's user map directly.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID, e.g. one read back from storage.
    #[must_use]
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a `UserId` from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseUserIdError;

impl fmt::Display for ParseUserIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse user id from string")
    }
}

impl std::error::Error for ParseUserIdError {}

impl FromStr for UserId {
    type Err = ParseUserIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Uuid>().map(UserId).map_err(|_| ParseUserIdError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_distinct() {
        assert_ne!(UserId::random(), UserId::random());
    }

    #[test]
    fn user_id_display_roundtrip() {
        let id = UserId::random();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn user_id_from_str_invalid() {
        let result = "not-a-uuid".parse::<UserId>();
        assert_eq!(result, Err(ParseUserIdError));
    }

    #[test]
    fn user_id_serializes_as_bare_string() {
        let id: UserId = "0a9f66dc-3f5a-4c7e-9a27-0c8febc1a8d1".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0a9f66dc-3f5a-4c7e-9a27-0c8febc1a8d1\"");
    }
}
