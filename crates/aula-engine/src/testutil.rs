//! Shared fixtures for the engine test modules.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use aula_db::Database;

use crate::clock::FixedClock;
use crate::reserve::ReserveRequest;

pub fn test_db() -> Database {
    Database::open_in_memory().unwrap()
}

/// Classroom with seats numbered 1..=seats. Returns the classroom id.
pub fn make_room(db: &Database, name: &str, seats: i64) -> String {
    let classroom_id = Uuid::new_v4().to_string();
    db.create_classroom(&classroom_id, name, seats).unwrap();
    for n in 1..=seats {
        db.create_seat(&Uuid::new_v4().to_string(), &classroom_id, n)
            .unwrap();
    }
    classroom_id
}

pub fn make_schedule(
    db: &Database,
    classroom_id: &str,
    course_name: &str,
    day_of_week: &str,
    start_time: &str,
    end_time: &str,
) {
    db.create_schedule(
        &Uuid::new_v4().to_string(),
        classroom_id,
        course_name,
        "A. Laurent",
        day_of_week,
        start_time,
        end_time,
    )
    .unwrap();
}

/// Registered user with an opaque credential blob. Returns the user id.
pub fn make_user(db: &Database, fullname: &str, email: &str) -> String {
    let user_id = Uuid::new_v4().to_string();
    db.create_user(&user_id, fullname, email, "argon2-hash-placeholder")
        .unwrap();
    user_id
}

pub fn clock_at(date: &str, time: &str) -> FixedClock {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let time = NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap();
    FixedClock(NaiveDateTime::new(date, time))
}

#[allow(clippy::too_many_arguments)]
pub fn request(
    classroom_id: &str,
    seat_number: i64,
    email: &str,
    date: &str,
    start_time: &str,
    end_time: &str,
    course_name: &str,
) -> ReserveRequest {
    ReserveRequest {
        classroom_id: Uuid::parse_str(classroom_id).unwrap(),
        seat_number,
        name: email.split('@').next().unwrap().to_string(),
        email: email.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        start_time: NaiveTime::parse_from_str(start_time, "%H:%M:%S").unwrap(),
        end_time: NaiveTime::parse_from_str(end_time, "%H:%M:%S").unwrap(),
        course_name: course_name.to_string(),
    }
}

pub fn count(db: &Database, sql: &str) -> i64 {
    db.with_conn(|conn| Ok(conn.query_row(sql, [], |r| r.get(0))?))
        .unwrap()
}

/// Core invariant: a seat's cached flag says taken exactly when the ledger
/// holds a reservation for it. Sensor writes may break this on purpose; the
/// engine and the sweeper must not.
pub fn cache_matches_ledger(db: &Database) -> bool {
    count(
        db,
        "SELECT COUNT(*) FROM seats s
         WHERE (s.availability = 'taken')
               != EXISTS(SELECT 1 FROM reservations r WHERE r.seat_id = s.id)",
    ) == 0
}
