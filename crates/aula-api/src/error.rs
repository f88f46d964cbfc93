use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use aula_engine::error::EngineError;

/// An HTTP-ready error: a status code plus the `{"message": "..."}` body
/// every endpoint answers with.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// Persistence and task-join failures: log the detail server-side,
    /// answer the client opaquely.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        error!("Internal error: {}", err);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::ClassroomNotFound
            | EngineError::SeatNotFound
            | EngineError::UserNotFound => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            EngineError::NoScheduledClass { .. }
            | EngineError::DuplicateReservation { .. }
            | EngineError::SeatTaken { .. }
            | EngineError::NoActiveClass => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
            },
            EngineError::Persistence(e) => Self::internal(e),
        }
    }
}
