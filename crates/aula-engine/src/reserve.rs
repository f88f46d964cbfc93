use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, info};
use uuid::Uuid;

use aula_db::Database;
use aula_db::models::{ClaimOutcome, NewReservation, SeatRow};
use aula_types::models::Availability;

use crate::clock::{Clock, date_to_db, time_to_db, weekday_name};
use crate::error::EngineError;

/// A validated reservation request. Field parsing (dates, times) happens at
/// the API boundary; by the time a request reaches the engine it is typed.
pub struct ReserveRequest {
    pub classroom_id: Uuid,
    pub seat_number: i64,
    pub name: String,
    pub email: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub course_name: String,
}

#[derive(Debug)]
pub struct ReserveOutcome {
    pub reservation_id: Uuid,
    pub message: String,
    /// True when the claim happened during a live class for this course and
    /// attendance is on file for today (freshly inserted or already there).
    pub attendance_recorded: bool,
}

/// Reserve one seat.
///
/// Check order: schedule coverage, one-reservation-per-user, seat existence
/// and availability — all reads — then a single transactional commit that
/// claims the seat conditionally and appends the ledger row. Concurrent
/// requests for the same seat are decided by the conditional claim, and the
/// per-user rule by the ledger's UNIQUE index, so losing a race here surfaces
/// the same errors as failing the pre-checks.
pub fn reserve(
    db: &Database,
    clock: &dyn Clock,
    req: &ReserveRequest,
) -> Result<ReserveOutcome, EngineError> {
    let classroom_id = req.classroom_id.to_string();
    let day_of_week = weekday_name(req.date);
    let date = date_to_db(req.date);
    let start_time = time_to_db(req.start_time);
    let end_time = time_to_db(req.end_time);

    if !db.classroom_exists(&classroom_id)? {
        return Err(EngineError::ClassroomNotFound);
    }

    // Schedule check: the requested window must sit inside a class block for
    // this course on this weekday.
    if db
        .covering_schedule(&classroom_id, day_of_week, &req.course_name, &start_time, &end_time)?
        .is_none()
    {
        return Err(EngineError::NoScheduledClass {
            course_name: req.course_name.clone(),
            day_of_week: day_of_week.to_string(),
            start_time,
            end_time,
        });
    }

    // One active reservation per user, across all rooms and dates.
    if db.occupant_has_reservation(&req.email)? {
        return Err(EngineError::DuplicateReservation {
            email: req.email.clone(),
        });
    }

    let seat = db
        .get_seat(&classroom_id, req.seat_number)?
        .ok_or(EngineError::SeatNotFound)?;
    if Availability::from_db(&seat.availability).is_taken() {
        return Err(EngineError::SeatTaken {
            seat_number: req.seat_number,
        });
    }

    let reservation_id = Uuid::new_v4();
    let new = NewReservation {
        id: reservation_id.to_string(),
        seat_id: seat.id.clone(),
        classroom_id: classroom_id.clone(),
        occupant_name: req.name.clone(),
        occupant_email: req.email.clone(),
        reservation_date: date.clone(),
        start_time: start_time.clone(),
        end_time: end_time.clone(),
    };
    match db.commit_reservation(&new)? {
        ClaimOutcome::Committed => {}
        ClaimOutcome::SeatTaken => {
            return Err(EngineError::SeatTaken {
                seat_number: req.seat_number,
            });
        }
        ClaimOutcome::DuplicateOccupant => {
            return Err(EngineError::DuplicateReservation {
                email: req.email.clone(),
            });
        }
    }

    let attendance_recorded = record_attendance_if_in_class(db, clock, req, &seat)?;

    info!(
        "Reserved seat {} in classroom {} for {} on {}",
        req.seat_number, classroom_id, req.email, date
    );

    Ok(ReserveOutcome {
        reservation_id,
        message: format!(
            "Seat {} reserved for {} on {} from {} to {}.",
            req.seat_number, req.course_name, date, start_time, end_time
        ),
        attendance_recorded,
    })
}

/// Reservation-time attendance capture: when the reservation is for today and
/// the clock currently sits inside a class block for this course, attendance
/// is recorded as a side effect of the claim. A missing user account skips
/// the capture (the reservation itself stands); a duplicate record is
/// absorbed.
fn record_attendance_if_in_class(
    db: &Database,
    clock: &dyn Clock,
    req: &ReserveRequest,
    seat: &SeatRow,
) -> Result<bool, EngineError> {
    if req.date != clock.today() {
        return Ok(false);
    }

    let now = time_to_db(clock.time_of_day());
    let day_of_week = weekday_name(clock.today());
    let classroom_id = req.classroom_id.to_string();

    let Some(block) =
        db.covering_schedule(&classroom_id, day_of_week, &req.course_name, &now, &now)?
    else {
        return Ok(false);
    };

    let Some(user) = db.get_user_by_email(&req.email)? else {
        debug!(
            "No user account for {}; skipping attendance capture",
            req.email
        );
        return Ok(false);
    };

    let newly = db.insert_attendance(
        &Uuid::new_v4().to_string(),
        &user.id,
        &seat.id,
        &classroom_id,
        &block.course_name,
        &date_to_db(clock.today()),
    )?;
    if !newly {
        debug!("Attendance already on file for {} today", req.email);
    }

    Ok(true)
}
