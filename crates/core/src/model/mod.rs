mod ids;
mod progress;
mod user;

pub use ids::{ParseUserIdError, UserId};
pub use progress::{Completion, GlobalCounts, ProgressError, ProgressState};
pub use user::{User, UserError};
