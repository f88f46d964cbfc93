use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Availability;

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub fullname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user_id: Uuid,
    pub fullname: String,
    pub email: String,
    pub token: String,
}

// -- Classrooms / seats --

#[derive(Debug, Serialize)]
pub struct ClassroomResponse {
    pub id: Uuid,
    pub name: String,
    pub total_seats: i64,
}

/// One seat as seen by clients. Served both from the live cache
/// (`GET /classrooms/{id}/seats`) and from the date-scoped reservation join
/// (`GET /classrooms/{id}/seats/{date}`), which may disagree.
#[derive(Debug, Serialize)]
pub struct SeatResponse {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub seat_number: i64,
    pub availability: Availability,
    pub occupant_name: Option<String>,
    pub occupant_email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub id: Uuid,
    pub classroom_id: Uuid,
    pub course_name: String,
    pub instructor: String,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
}

// -- Reservations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReserveSeatRequest {
    pub classroom_id: Uuid,
    pub seat_number: i64,
    pub name: String,
    pub email: String,
    /// `YYYY-MM-DD`
    pub reservation_date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub start_time: String,
    pub end_time: String,
    pub course_name: String,
}

#[derive(Debug, Serialize)]
pub struct ReserveSeatResponse {
    pub message: String,
    pub reservation_id: Uuid,
    /// True when the claim happened during a live class and an attendance
    /// record was written as a side effect.
    pub attendance_recorded: bool,
}

// -- Sensor --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeatUpdateRequest {
    pub classroom_id: Uuid,
    pub seat_number: i64,
    pub course_name: String,
    /// `YYYY-MM-DD`
    pub date_of_class: String,
    /// Raw sensor report; the literal "occupied" marks the seat taken,
    /// anything else frees it.
    pub sensor_status: String,
}

#[derive(Debug, Serialize)]
pub struct SeatUpdateResponse {
    pub message: String,
    pub availability: Availability,
}

// -- Attendance --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckInRequest {
    pub email: String,
    pub seat_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub message: String,
    pub course_name: String,
    pub class_date: String,
    /// False when the (user, seat, date) record already existed; the
    /// duplicate is absorbed, not an error.
    pub newly_recorded: bool,
}
