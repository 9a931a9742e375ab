//! Shared error types for the services crate.

use thiserror::Error;

use lessons_core::model::{ProgressError, UserError};

/// Errors emitted by `ProgressService`.
///
/// Persistence failures are deliberately absent: a failed save is logged and
/// the operation still reports success, because the in-memory mutation is
/// authoritative.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
}
