use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lessons_core::model::{Completion, User, UserId};

#[derive(Debug, Deserialize)]
pub struct EnrollRequest {
    /// Absent and blank both fail validation downstream.
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    id: UserId,
    name: String,
    enrolled_at: DateTime<Utc>,
    completed_days: Vec<u32>,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id(),
            name: user.name().to_owned(),
            enrolled_at: user.enrolled_at(),
            completed_days: user.completed_days().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResponse {
    message: &'static str,
    global_count: u64,
}

impl CompletionResponse {
    pub fn from_completion(completion: Completion) -> Self {
        Self {
            message: if completion.already_completed {
                "Already completed"
            } else {
                "Lesson completed"
            },
            global_count: completion.global_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DayCountResponse {
    pub day: u32,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
