use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use tracing::warn;
use uuid::Uuid;

use aula_db::models::{ClassroomRow, ScheduleRow, SeatRow};
use aula_engine::clock::date_to_db;
use aula_types::api::{ClassroomResponse, ScheduleResponse, SeatResponse};
use aula_types::models::Availability;

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn list_classrooms(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let rows = tokio::task::spawn_blocking(move || db.list_classrooms())
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;

    let classrooms: Vec<ClassroomResponse> = rows.into_iter().map(classroom_response).collect();
    Ok(Json(classrooms))
}

/// Live seat map: what the cached availability flags say right now.
pub async fn list_seats(
    State(state): State<AppState>,
    Path(classroom_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let cid = classroom_id.to_string();
    let rows = tokio::task::spawn_blocking(move || {
        if !db.classroom_exists(&cid).map_err(ApiError::internal)? {
            return Err(ApiError::not_found("Classroom not found"));
        }
        db.seats_for_classroom(&cid).map_err(ApiError::internal)
    })
    .await
    .map_err(ApiError::internal)??;

    let seats: Vec<SeatResponse> = rows.into_iter().map(seat_response).collect();
    Ok(Json(seats))
}

/// Date-scoped seat map: availability derived from the reservation ledger
/// for one calendar date, ignoring the live flags.
pub async fn list_seats_for_date(
    State(state): State<AppState>,
    Path((classroom_id, date)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    // chrono accepts unpadded parts ("2025-3-10"); ledger dates are always
    // zero-padded, so the query uses the canonical form, not the raw segment.
    let date = match NaiveDate::parse_from_str(&date, "%Y-%m-%d") {
        Ok(parsed) => date_to_db(parsed),
        Err(_) => {
            return Err(ApiError::bad_request(
                "Invalid date format, expected YYYY-MM-DD",
            ));
        }
    };

    let db = state.db.clone();
    let cid = classroom_id.to_string();
    let rows = tokio::task::spawn_blocking(move || {
        if !db.classroom_exists(&cid).map_err(ApiError::internal)? {
            return Err(ApiError::not_found("Classroom not found"));
        }
        db.seats_for_classroom_on_date(&cid, &date)
            .map_err(ApiError::internal)
    })
    .await
    .map_err(ApiError::internal)??;

    let seats: Vec<SeatResponse> = rows.into_iter().map(seat_response).collect();
    Ok(Json(seats))
}

pub async fn list_schedule(
    State(state): State<AppState>,
    Path(classroom_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.db.clone();
    let cid = classroom_id.to_string();
    let rows = tokio::task::spawn_blocking(move || {
        if !db.classroom_exists(&cid).map_err(ApiError::internal)? {
            return Err(ApiError::not_found("Classroom not found"));
        }
        db.schedules_for_classroom(&cid).map_err(ApiError::internal)
    })
    .await
    .map_err(ApiError::internal)??;

    let schedule: Vec<ScheduleResponse> = rows.into_iter().map(schedule_response).collect();
    Ok(Json(schedule))
}

fn classroom_response(row: ClassroomRow) -> ClassroomResponse {
    ClassroomResponse {
        id: parse_id(&row.id, "classroom id"),
        name: row.name,
        total_seats: row.total_seats,
    }
}

fn seat_response(row: SeatRow) -> SeatResponse {
    SeatResponse {
        id: parse_id(&row.id, "seat id"),
        classroom_id: parse_id(&row.classroom_id, "classroom id"),
        seat_number: row.seat_number,
        availability: Availability::from_db(&row.availability),
        occupant_name: row.occupant_name,
        occupant_email: row.occupant_email,
    }
}

fn schedule_response(row: ScheduleRow) -> ScheduleResponse {
    ScheduleResponse {
        id: parse_id(&row.id, "schedule id"),
        classroom_id: parse_id(&row.classroom_id, "classroom id"),
        course_name: row.course_name,
        instructor: row.instructor,
        day_of_week: row.day_of_week,
        start_time: row.start_time,
        end_time: row.end_time,
    }
}

fn parse_id(value: &str, what: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} '{}': {}", what, value, e);
        Uuid::default()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::to_bytes;
    use axum::http::StatusCode;

    use aula_db::Database;
    use aula_db::models::NewReservation;
    use aula_engine::clock::SystemClock;

    use super::*;
    use crate::auth::AppStateInner;

    fn state_with_db() -> (AppState, Arc<Database>) {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let state: AppState = Arc::new(AppStateInner {
            db: db.clone(),
            clock: Arc::new(SystemClock),
            jwt_secret: "test-secret".to_string(),
        });
        (state, db)
    }

    fn make_room(db: &Database, seats: i64) -> Uuid {
        let room = Uuid::new_v4();
        db.create_classroom(&room.to_string(), "Room A", seats)
            .unwrap();
        for n in 1..=seats {
            db.create_seat(&Uuid::new_v4().to_string(), &room.to_string(), n)
                .unwrap();
        }
        room
    }

    fn reserve_seat(db: &Database, classroom_id: Uuid, seat_number: i64, date: &str) {
        let seat = db
            .get_seat(&classroom_id.to_string(), seat_number)
            .unwrap()
            .unwrap();
        db.commit_reservation(&NewReservation {
            id: Uuid::new_v4().to_string(),
            seat_id: seat.id,
            classroom_id: classroom_id.to_string(),
            occupant_name: "Dana Weiss".to_string(),
            occupant_email: "dana@campus.edu".to_string(),
            reservation_date: date.to_string(),
            start_time: "18:00:00".to_string(),
            end_time: "19:00:00".to_string(),
        })
        .unwrap();
    }

    async fn seats_on(state: &AppState, classroom_id: Uuid, date: &str) -> serde_json::Value {
        let response = list_seats_for_date(
            State(state.clone()),
            Path((classroom_id, date.to_string())),
        )
        .await
        .unwrap()
        .into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn date_scoped_seats_accept_unpadded_dates() {
        let (state, db) = state_with_db();
        let room = make_room(&db, 2);
        reserve_seat(&db, room, 1, "2025-03-10");

        // The ledger only ever holds the padded form; both spellings of the
        // same date must see the reservation.
        for path_date in ["2025-03-10", "2025-3-10"] {
            let seats = seats_on(&state, room, path_date).await;
            assert_eq!(seats[0]["availability"], "taken", "for {path_date}");
            assert_eq!(seats[0]["occupant_email"], "dana@campus.edu");
            assert_eq!(seats[1]["availability"], "available");
        }
    }

    #[tokio::test]
    async fn garbled_date_segment_is_a_bad_request() {
        let (state, db) = state_with_db();
        let room = make_room(&db, 1);

        let result = list_seats_for_date(
            State(state.clone()),
            Path((room, "10-03-2025".to_string())),
        )
        .await;
        let Err(err) = result else {
            panic!("expected a bad request");
        };
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Invalid date format, expected YYYY-MM-DD");
    }
}
