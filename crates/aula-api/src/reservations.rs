use axum::{Json, extract::State, response::IntoResponse};
use chrono::{NaiveDate, NaiveTime};

use aula_engine::reserve::{ReserveRequest, reserve};
use aula_types::api::{ReserveSeatRequest, ReserveSeatResponse};

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn reserve_seat(
    State(state): State<AppState>,
    Json(req): Json<ReserveSeatRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::bad_request("Missing fields"));
    }

    let date = parse_date(&req.reservation_date, "reservation_date")?;
    let start_time = parse_time(&req.start_time, "start_time")?;
    let end_time = parse_time(&req.end_time, "end_time")?;
    if start_time >= end_time {
        return Err(ApiError::bad_request("start_time must be before end_time"));
    }

    let engine_req = ReserveRequest {
        classroom_id: req.classroom_id,
        seat_number: req.seat_number,
        name: req.name,
        email: req.email,
        date,
        start_time,
        end_time,
        course_name: req.course_name,
    };

    let db = state.db.clone();
    let clock = state.clock.clone();
    let outcome = tokio::task::spawn_blocking(move || reserve(&db, clock.as_ref(), &engine_req))
        .await
        .map_err(ApiError::internal)??;

    Ok(Json(ReserveSeatResponse {
        message: outcome.message,
        reservation_id: outcome.reservation_id,
        attendance_recorded: outcome.attendance_recorded,
    }))
}

pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid {}, expected YYYY-MM-DD", field)))
}

pub(crate) fn parse_time(value: &str, field: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| {
            ApiError::bad_request(format!("Invalid {}, expected HH:MM or HH:MM:SS", field))
        })
}
