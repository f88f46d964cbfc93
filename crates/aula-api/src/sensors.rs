use axum::{Json, extract::State, response::IntoResponse};

use aula_engine::sensor::{SensorUpdate, apply_sensor_event};
use aula_types::api::{SeatUpdateRequest, SeatUpdateResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::reservations::parse_date;

/// Occupancy-sensor ingest. Trusted device path: no schedule check, the
/// live seat flag simply mirrors what the sensor reported.
pub async fn update_seat(
    State(state): State<AppState>,
    Json(req): Json<SeatUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let class_date = parse_date(&req.date_of_class, "date_of_class")?;

    let update = SensorUpdate {
        classroom_id: req.classroom_id,
        seat_number: req.seat_number,
        course_name: req.course_name,
        class_date,
        sensor_status: req.sensor_status,
    };

    let db = state.db.clone();
    let outcome = tokio::task::spawn_blocking(move || apply_sensor_event(&db, &update))
        .await
        .map_err(ApiError::internal)??;

    Ok(Json(SeatUpdateResponse {
        message: outcome.message,
        availability: outcome.availability,
    }))
}
