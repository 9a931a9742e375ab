use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use lessons_core::model::{ProgressError, UserError};
use services::ProgressServiceError;

/// Wire shape for every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Service error carried through handlers and rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(ProgressServiceError);

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ProgressServiceError::User(UserError::EmptyName) => StatusCode::BAD_REQUEST,
            ProgressServiceError::Progress(ProgressError::UnknownUser) => StatusCode::NOT_FOUND,
            ProgressServiceError::Progress(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<ProgressServiceError> for ApiError {
    fn from(err: ProgressServiceError) -> Self {
        Self(err)
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        Self(err.into())
    }
}
