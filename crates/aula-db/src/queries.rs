use anyhow::Result;
use rusqlite::OptionalExtension;

use aula_types::models::Availability;

use crate::Database;
use crate::models::{
    ClaimOutcome, ClassroomRow, NewReservation, NewSensorEvent, ReservationRow, ScheduleRow,
    SeatRow, UserRow,
};

impl Database {
    // -- Classrooms --

    pub fn create_classroom(&self, id: &str, name: &str, total_seats: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO classrooms (id, name, total_seats) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, name, total_seats],
            )?;
            Ok(())
        })
    }

    pub fn list_classrooms(&self) -> Result<Vec<ClassroomRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, total_seats FROM classrooms ORDER BY name ASC")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ClassroomRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        total_seats: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn classroom_exists(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM classrooms WHERE id = ?1)",
                [id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    // -- Seats --

    pub fn create_seat(&self, id: &str, classroom_id: &str, seat_number: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO seats (id, classroom_id, seat_number) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, classroom_id, seat_number],
            )?;
            Ok(())
        })
    }

    /// Seats with their live (cached) availability.
    pub fn seats_for_classroom(&self, classroom_id: &str) -> Result<Vec<SeatRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, classroom_id, seat_number, availability, occupant_name, occupant_email
                 FROM seats WHERE classroom_id = ?1 ORDER BY seat_number ASC",
            )?;
            let rows = stmt
                .query_map([classroom_id], seat_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Seats with availability derived from the reservation ledger for one
    /// date. This is the authoritative read path; it ignores the cached flag
    /// entirely, so it can disagree with `seats_for_classroom` (a seat held
    /// for a future date is live-taken but free on any other date).
    pub fn seats_for_classroom_on_date(
        &self,
        classroom_id: &str,
        date: &str,
    ) -> Result<Vec<SeatRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.id, s.classroom_id, s.seat_number,
                        CASE WHEN r.id IS NULL THEN 'available' ELSE 'taken' END,
                        r.occupant_name, r.occupant_email
                 FROM seats s
                 LEFT JOIN reservations r
                        ON r.seat_id = s.id AND r.reservation_date = ?2
                 WHERE s.classroom_id = ?1
                 ORDER BY s.seat_number ASC",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![classroom_id, date], seat_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_seat(&self, classroom_id: &str, seat_number: i64) -> Result<Option<SeatRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, classroom_id, seat_number, availability, occupant_name, occupant_email
                     FROM seats WHERE classroom_id = ?1 AND seat_number = ?2",
                    rusqlite::params![classroom_id, seat_number],
                    seat_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_seat_by_id(&self, seat_id: &str) -> Result<Option<SeatRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, classroom_id, seat_number, availability, occupant_name, occupant_email
                     FROM seats WHERE id = ?1",
                    [seat_id],
                    seat_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Class schedules --

    #[allow(clippy::too_many_arguments)]
    pub fn create_schedule(
        &self,
        id: &str,
        classroom_id: &str,
        course_name: &str,
        instructor: &str,
        day_of_week: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO class_schedules (id, classroom_id, course_name, instructor, day_of_week, start_time, end_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id, classroom_id, course_name, instructor, day_of_week, start_time, end_time],
            )?;
            Ok(())
        })
    }

    /// Schedule rows in calendar order (Monday first), then start time.
    pub fn schedules_for_classroom(&self, classroom_id: &str) -> Result<Vec<ScheduleRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, classroom_id, course_name, instructor, day_of_week, start_time, end_time
                 FROM class_schedules
                 WHERE classroom_id = ?1
                 ORDER BY CASE day_of_week
                          WHEN 'Monday' THEN 0 WHEN 'Tuesday' THEN 1
                          WHEN 'Wednesday' THEN 2 WHEN 'Thursday' THEN 3
                          WHEN 'Friday' THEN 4 WHEN 'Saturday' THEN 5
                          WHEN 'Sunday' THEN 6 ELSE 7 END,
                          start_time ASC",
            )?;
            let rows = stmt
                .query_map([classroom_id], schedule_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// The schedule block for (classroom, day, course) whose interval covers
    /// the whole requested window, if any.
    pub fn covering_schedule(
        &self,
        classroom_id: &str,
        day_of_week: &str,
        course_name: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Option<ScheduleRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, classroom_id, course_name, instructor, day_of_week, start_time, end_time
                     FROM class_schedules
                     WHERE classroom_id = ?1 AND day_of_week = ?2 AND course_name = ?3
                       AND start_time <= ?4 AND end_time >= ?5
                     ORDER BY start_time ASC
                     LIMIT 1",
                    rusqlite::params![classroom_id, day_of_week, course_name, start_time, end_time],
                    schedule_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// The schedule block at (classroom, day) containing the given instant,
    /// if any — i.e. whether the room is in session. Earliest-starting block
    /// wins when several overlap.
    pub fn active_schedule_at(
        &self,
        classroom_id: &str,
        day_of_week: &str,
        time: &str,
    ) -> Result<Option<ScheduleRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, classroom_id, course_name, instructor, day_of_week, start_time, end_time
                     FROM class_schedules
                     WHERE classroom_id = ?1 AND day_of_week = ?2
                       AND start_time <= ?3 AND end_time >= ?3
                     ORDER BY start_time ASC
                     LIMIT 1",
                    rusqlite::params![classroom_id, day_of_week, time],
                    schedule_from_row,
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Reservations --

    /// Atomic claim-and-append: flips the seat to taken *only if it is still
    /// available* and inserts the ledger row, in one transaction. A zero-row
    /// claim or a UNIQUE violation on the insert means a concurrent writer
    /// won; the transaction rolls back and nothing is mutated.
    pub fn commit_reservation(&self, new: &NewReservation) -> Result<ClaimOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let claimed = tx.execute(
                "UPDATE seats
                 SET availability = 'taken', occupant_name = ?1, occupant_email = ?2
                 WHERE id = ?3 AND availability = 'available'",
                rusqlite::params![new.occupant_name, new.occupant_email, new.seat_id],
            )?;
            if claimed == 0 {
                return Ok(ClaimOutcome::SeatTaken);
            }

            let inserted = tx.execute(
                "INSERT INTO reservations (id, seat_id, classroom_id, occupant_name, occupant_email, reservation_date, start_time, end_time)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    new.id,
                    new.seat_id,
                    new.classroom_id,
                    new.occupant_name,
                    new.occupant_email,
                    new.reservation_date,
                    new.start_time,
                    new.end_time,
                ],
            );

            match inserted {
                Ok(_) => {
                    tx.commit()?;
                    Ok(ClaimOutcome::Committed)
                }
                Err(e) => match unique_violation_message(&e) {
                    Some(msg) if msg.contains("occupant_email") => {
                        Ok(ClaimOutcome::DuplicateOccupant)
                    }
                    Some(msg) if msg.contains("seat_id") => Ok(ClaimOutcome::SeatTaken),
                    _ => Err(e.into()),
                },
            }
        })
    }

    /// Whether the email already holds an active reservation, on any seat in
    /// any classroom. Pre-check only — the UNIQUE index is the enforcement.
    pub fn occupant_has_reservation(&self, email: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let held: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM reservations WHERE occupant_email = ?1)",
                [email],
                |row| row.get(0),
            )?;
            Ok(held)
        })
    }

    pub fn reservations_for_seat(&self, seat_id: &str) -> Result<Vec<ReservationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, seat_id, classroom_id, occupant_name, occupant_email,
                        reservation_date, start_time, end_time, created_at
                 FROM reservations
                 WHERE seat_id = ?1
                 ORDER BY reservation_date ASC, start_time ASC",
            )?;
            let rows = stmt
                .query_map([seat_id], |row| {
                    Ok(ReservationRow {
                        id: row.get(0)?,
                        seat_id: row.get(1)?,
                        classroom_id: row.get(2)?,
                        occupant_name: row.get(3)?,
                        occupant_email: row.get(4)?,
                        reservation_date: row.get(5)?,
                        start_time: row.get(6)?,
                        end_time: row.get(7)?,
                        created_at: row.get(8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Full reset of one classroom: every seat back to available with the
    /// occupant cache cleared, every reservation (any date) deleted. One
    /// transaction, so the cache and the ledger cannot diverge mid-sweep.
    /// Returns (seats_reset, reservations_deleted); both are zero on an
    /// already-clean room, which keeps repeated sweeps quiet in the logs.
    pub fn sweep_classroom(&self, classroom_id: &str) -> Result<(usize, usize)> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let seats = tx.execute(
                "UPDATE seats
                 SET availability = 'available', occupant_name = NULL, occupant_email = NULL
                 WHERE classroom_id = ?1
                   AND (availability != 'available'
                        OR occupant_name IS NOT NULL
                        OR occupant_email IS NOT NULL)",
                [classroom_id],
            )?;
            let reservations =
                tx.execute("DELETE FROM reservations WHERE classroom_id = ?1", [classroom_id])?;
            tx.commit()?;
            Ok((seats, reservations))
        })
    }

    // -- Attendance --

    /// Idempotent attendance insert, deduplicated by (user, seat, date).
    /// Returns false when the record already existed.
    pub fn insert_attendance(
        &self,
        id: &str,
        user_id: &str,
        seat_id: &str,
        classroom_id: &str,
        course_name: &str,
        class_date: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO attendance (id, user_id, seat_id, classroom_id, course_name, class_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, seat_id, classroom_id, course_name, class_date],
            )?;
            Ok(inserted == 1)
        })
    }

    // -- Users --

    /// Returns false when the email is already registered.
    pub fn create_user(
        &self,
        id: &str,
        fullname: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO users (id, fullname, email, password) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, fullname, email, password_hash],
            )?;
            Ok(inserted == 1)
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, fullname, email, password, created_at FROM users WHERE email = ?1",
                    [email],
                    |row| {
                        Ok(UserRow {
                            id: row.get(0)?,
                            fullname: row.get(1)?,
                            email: row.get(2)?,
                            password: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    // -- Sensor events --

    /// Append the raw sensor event and mirror it into the live seat flag.
    /// Freeing a seat clears the occupant cache; occupying leaves it alone
    /// (the sensor carries no identity).
    pub fn record_sensor_event(
        &self,
        event: &NewSensorEvent,
        seat_id: &str,
        availability: Availability,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO sensor_events (id, classroom_id, seat_number, course_name, class_date, sensor_status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    event.id,
                    event.classroom_id,
                    event.seat_number,
                    event.course_name,
                    event.class_date,
                    event.sensor_status,
                ],
            )?;
            match availability {
                Availability::Taken => {
                    tx.execute(
                        "UPDATE seats SET availability = 'taken' WHERE id = ?1",
                        [seat_id],
                    )?;
                }
                Availability::Available => {
                    tx.execute(
                        "UPDATE seats
                         SET availability = 'available', occupant_name = NULL, occupant_email = NULL
                         WHERE id = ?1",
                        [seat_id],
                    )?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }
}

fn seat_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SeatRow> {
    Ok(SeatRow {
        id: row.get(0)?,
        classroom_id: row.get(1)?,
        seat_number: row.get(2)?,
        availability: row.get(3)?,
        occupant_name: row.get(4)?,
        occupant_email: row.get(5)?,
    })
}

fn schedule_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduleRow> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        classroom_id: row.get(1)?,
        course_name: row.get(2)?,
        instructor: row.get(3)?,
        day_of_week: row.get(4)?,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
    })
}

fn unique_violation_message(err: &rusqlite::Error) -> Option<&str> {
    match err {
        rusqlite::Error::SqliteFailure(e, Some(msg))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Some(msg.as_str())
        }
        _ => None,
    }
}
