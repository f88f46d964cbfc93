use tracing::{debug, info};
use uuid::Uuid;

use aula_db::Database;

use crate::clock::{Clock, date_to_db, time_to_db, weekday_name};
use crate::error::EngineError;

#[derive(Debug)]
pub struct CheckInOutcome {
    pub message: String,
    pub course_name: String,
    pub class_date: String,
    /// False when the (user, seat, date) record already existed. The
    /// duplicate is absorbed, not an error.
    pub newly_recorded: bool,
}

/// Standalone check-in: a user at a known seat, e.g. from scanning the seat's
/// code. The course is whatever class block covers "now" in the seat's
/// classroom; with no block in session there is nothing to attend.
pub fn check_in(
    db: &Database,
    clock: &dyn Clock,
    email: &str,
    seat_id: Uuid,
) -> Result<CheckInOutcome, EngineError> {
    let user = db
        .get_user_by_email(email)?
        .ok_or(EngineError::UserNotFound)?;
    let seat = db
        .get_seat_by_id(&seat_id.to_string())?
        .ok_or(EngineError::SeatNotFound)?;

    let today = clock.today();
    let block = db
        .active_schedule_at(
            &seat.classroom_id,
            weekday_name(today),
            &time_to_db(clock.time_of_day()),
        )?
        .ok_or(EngineError::NoActiveClass)?;

    let class_date = date_to_db(today);
    let newly_recorded = db.insert_attendance(
        &Uuid::new_v4().to_string(),
        &user.id,
        &seat.id,
        &seat.classroom_id,
        &block.course_name,
        &class_date,
    )?;

    if newly_recorded {
        info!(
            "Attendance recorded: {} at seat {} for {}",
            email, seat.seat_number, block.course_name
        );
    } else {
        debug!("Attendance already on file for {} today", email);
    }

    let message = if newly_recorded {
        format!(
            "Checked in to {} at seat {}.",
            block.course_name, seat.seat_number
        )
    } else {
        format!("Already checked in to {} today.", block.course_name)
    };

    Ok(CheckInOutcome {
        message,
        course_name: block.course_name,
        class_date,
        newly_recorded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{clock_at, count, make_room, make_schedule, make_user, test_db};

    const MONDAY: &str = "2025-03-10";
    const COURSE: &str = "ECE1528 Mobile Communication Systems";

    fn seat_id(db: &Database, classroom_id: &str, seat_number: i64) -> Uuid {
        db.get_seat(classroom_id, seat_number)
            .unwrap()
            .unwrap()
            .id
            .parse()
            .unwrap()
    }

    #[test]
    fn check_in_during_a_live_class_is_recorded_once() {
        let db = test_db();
        let room = make_room(&db, "Room A", 10);
        make_schedule(&db, &room, COURSE, "Monday", "17:30:00", "20:30:00");
        make_user(&db, "Dana Weiss", "dana@campus.edu");
        let clock = clock_at(MONDAY, "18:00:00");
        let seat = seat_id(&db, &room, 5);

        let first = check_in(&db, &clock, "dana@campus.edu", seat).unwrap();
        assert!(first.newly_recorded);
        assert_eq!(first.course_name, COURSE);
        assert_eq!(first.class_date, MONDAY);

        let second = check_in(&db, &clock, "dana@campus.edu", seat).unwrap();
        assert!(!second.newly_recorded);
        assert_eq!(count(&db, "SELECT COUNT(*) FROM attendance"), 1);
    }

    #[test]
    fn check_in_needs_a_class_in_session() {
        let db = test_db();
        let room = make_room(&db, "Room A", 10);
        make_schedule(&db, &room, COURSE, "Monday", "17:30:00", "20:30:00");
        make_user(&db, "Dana Weiss", "dana@campus.edu");
        let seat = seat_id(&db, &room, 5);

        // Right day, but the block has not started yet.
        let err = check_in(&db, &clock_at(MONDAY, "12:00:00"), "dana@campus.edu", seat)
            .unwrap_err();
        assert!(matches!(err, EngineError::NoActiveClass));

        // Right time of day, wrong weekday (a Tuesday).
        let err = check_in(&db, &clock_at("2025-03-11", "18:00:00"), "dana@campus.edu", seat)
            .unwrap_err();
        assert!(matches!(err, EngineError::NoActiveClass));

        assert_eq!(count(&db, "SELECT COUNT(*) FROM attendance"), 0);
    }

    #[test]
    fn check_in_resolves_user_and_seat_first() {
        let db = test_db();
        let room = make_room(&db, "Room A", 10);
        make_schedule(&db, &room, COURSE, "Monday", "17:30:00", "20:30:00");
        make_user(&db, "Dana Weiss", "dana@campus.edu");
        let clock = clock_at(MONDAY, "18:00:00");

        let err = check_in(&db, &clock, "ghost@campus.edu", seat_id(&db, &room, 5)).unwrap_err();
        assert!(matches!(err, EngineError::UserNotFound));

        let err = check_in(&db, &clock, "dana@campus.edu", Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, EngineError::SeatNotFound));
    }

    #[test]
    fn check_in_takes_the_course_from_the_covering_block() {
        let db = test_db();
        let room = make_room(&db, "Room A", 10);
        make_schedule(&db, &room, COURSE, "Monday", "17:30:00", "20:30:00");
        make_schedule(&db, &room, "CSC343 Introduction to Databases", "Monday", "09:00:00", "12:00:00");
        make_user(&db, "Dana Weiss", "dana@campus.edu");

        let morning = check_in(
            &db,
            &clock_at(MONDAY, "10:00:00"),
            "dana@campus.edu",
            seat_id(&db, &room, 1),
        )
        .unwrap();
        assert_eq!(morning.course_name, "CSC343 Introduction to Databases");

        let evening = check_in(
            &db,
            &clock_at(MONDAY, "18:00:00"),
            "dana@campus.edu",
            seat_id(&db, &room, 2),
        )
        .unwrap();
        assert_eq!(evening.course_name, COURSE);
    }
}
