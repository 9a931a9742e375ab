use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};

use lessons_core::model::{ProgressError, UserId};
use services::ProgressService;

use crate::error::ApiError;
use crate::responses::{
    CompletionResponse, DayCountResponse, EnrollRequest, MessageResponse, UserResponse,
};

/// An id that does not even parse as a uuid is simply not an enrolled user.
fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse().map_err(|_| ProgressError::UnknownUser.into())
}

pub async fn enroll_user(
    State(service): State<Arc<ProgressService>>,
    Json(body): Json<EnrollRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = service.enroll_user(&body.name).await?;
    Ok(Json(UserResponse::from_user(&user)))
}

pub async fn get_user(
    State(service): State<Arc<ProgressService>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = service.get_user(parse_user_id(&id)?).await?;
    Ok(Json(UserResponse::from_user(&user)))
}

pub async fn complete_day(
    State(service): State<Arc<ProgressService>>,
    Path((id, day)): Path<(String, u32)>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let completion = service.complete_day(parse_user_id(&id)?, day).await?;
    Ok(Json(CompletionResponse::from_completion(completion)))
}

pub async fn day_count(
    State(service): State<Arc<ProgressService>>,
    Path(day): Path<u32>,
) -> Json<DayCountResponse> {
    let count = service.day_count(day).await;
    Json(DayCountResponse { day, count })
}

pub async fn all_counts(
    State(service): State<Arc<ProgressService>>,
) -> Json<BTreeMap<u32, u64>> {
    Json(service.all_counts().await)
}

pub async fn delete_user(
    State(service): State<Arc<ProgressService>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_user(parse_user_id(&id)?).await?;
    Ok(Json(MessageResponse {
        message: "User deleted",
    }))
}
