use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use aula_db::Database;
use aula_db::models::NewSensorEvent;
use aula_types::models::Availability;

use crate::clock::date_to_db;
use crate::error::EngineError;

pub struct SensorUpdate {
    pub classroom_id: Uuid,
    pub seat_number: i64,
    pub course_name: String,
    pub class_date: NaiveDate,
    pub sensor_status: String,
}

#[derive(Debug)]
pub struct SensorOutcome {
    pub availability: Availability,
    pub message: String,
}

/// Trusted-device write path: a room sensor reports raw occupancy and the
/// live seat flag mirrors it. Deliberately narrower than the reservation
/// engine — no schedule validation, no occupant identity, and it may leave
/// the cached flag out of step with the ledger until the next sweep.
pub fn apply_sensor_event(
    db: &Database,
    update: &SensorUpdate,
) -> Result<SensorOutcome, EngineError> {
    let classroom_id = update.classroom_id.to_string();
    let seat = db
        .get_seat(&classroom_id, update.seat_number)?
        .ok_or(EngineError::SeatNotFound)?;

    let availability = if update.sensor_status == "occupied" {
        Availability::Taken
    } else {
        Availability::Available
    };

    let event = NewSensorEvent {
        id: Uuid::new_v4().to_string(),
        classroom_id,
        seat_number: update.seat_number,
        course_name: update.course_name.clone(),
        class_date: date_to_db(update.class_date),
        sensor_status: update.sensor_status.clone(),
    };
    db.record_sensor_event(&event, &seat.id, availability)?;

    info!(
        "Sensor: seat {} in classroom {} now {}",
        update.seat_number,
        update.classroom_id,
        availability.as_str()
    );

    Ok(SensorOutcome {
        availability,
        message: format!(
            "Seat {} marked {}.",
            update.seat_number,
            availability.as_str()
        ),
    })
}
