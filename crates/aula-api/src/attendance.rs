use axum::{Json, extract::State, response::IntoResponse};

use aula_engine::attendance::check_in;
use aula_types::api::{CheckInRequest, CheckInResponse};

use crate::auth::AppState;
use crate::error::ApiError;

/// Standalone check-in: records presence for a class currently in session
/// at the given seat. Reservation-time attendance is a side effect of the
/// reserve path and never comes through here.
pub async fn record_attendance(
    State(state): State<AppState>,
    Json(req): Json<CheckInRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let clock = state.clock.clone();
    let outcome =
        tokio::task::spawn_blocking(move || check_in(&db, clock.as_ref(), &req.email, req.seat_id))
            .await
            .map_err(ApiError::internal)??;

    Ok(Json(CheckInResponse {
        message: outcome.message,
        course_name: outcome.course_name,
        class_date: outcome.class_date,
        newly_recorded: outcome.newly_recorded,
    }))
}
