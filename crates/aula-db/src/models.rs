//! Database row types — these map directly to SQLite rows.
//! Distinct from the aula-types API models to keep this layer independent.

pub struct ClassroomRow {
    pub id: String,
    pub name: String,
    pub total_seats: i64,
}

pub struct SeatRow {
    pub id: String,
    pub classroom_id: String,
    pub seat_number: i64,
    pub availability: String,
    pub occupant_name: Option<String>,
    pub occupant_email: Option<String>,
}

pub struct ScheduleRow {
    pub id: String,
    pub classroom_id: String,
    pub course_name: String,
    pub instructor: String,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
}

pub struct ReservationRow {
    pub id: String,
    pub seat_id: String,
    pub classroom_id: String,
    pub occupant_name: String,
    pub occupant_email: String,
    pub reservation_date: String,
    pub start_time: String,
    pub end_time: String,
    pub created_at: String,
}

pub struct UserRow {
    pub id: String,
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub created_at: String,
}

/// Input for the atomic claim-and-append in `commit_reservation`.
pub struct NewReservation {
    pub id: String,
    pub seat_id: String,
    pub classroom_id: String,
    pub occupant_name: String,
    pub occupant_email: String,
    pub reservation_date: String,
    pub start_time: String,
    pub end_time: String,
}

/// Input for the sensor write path.
pub struct NewSensorEvent {
    pub id: String,
    pub classroom_id: String,
    pub seat_number: i64,
    pub course_name: String,
    pub class_date: String,
    pub sensor_status: String,
}

/// Outcome of `commit_reservation`: either the transaction landed, or it was
/// beaten by a concurrent writer and nothing was mutated.
pub enum ClaimOutcome {
    Committed,
    SeatTaken,
    DuplicateOccupant,
}
