use anyhow::Result;
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);",
    )?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE classrooms (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                total_seats INTEGER NOT NULL
            );

            CREATE TABLE seats (
                id             TEXT PRIMARY KEY,
                classroom_id   TEXT NOT NULL REFERENCES classrooms(id) ON DELETE CASCADE,
                seat_number    INTEGER NOT NULL,
                availability   TEXT NOT NULL DEFAULT 'available',
                occupant_name  TEXT,
                occupant_email TEXT,
                UNIQUE (classroom_id, seat_number)
            );

            CREATE TABLE class_schedules (
                id           TEXT PRIMARY KEY,
                classroom_id TEXT NOT NULL REFERENCES classrooms(id) ON DELETE CASCADE,
                course_name  TEXT NOT NULL,
                instructor   TEXT NOT NULL,
                day_of_week  TEXT NOT NULL,
                start_time   TEXT NOT NULL,
                end_time     TEXT NOT NULL
            );

            CREATE INDEX idx_schedules_classroom_day
                ON class_schedules(classroom_id, day_of_week);

            CREATE TABLE users (
                id         TEXT PRIMARY KEY,
                fullname   TEXT NOT NULL,
                email      TEXT NOT NULL UNIQUE,
                password   TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            -- The sweeper hard-deletes rows, so every stored reservation is
            -- active. The UNIQUE indexes are the one-claim-per-seat-per-date
            -- and one-seat-per-user rules; the engine maps violations back
            -- to its own error taxonomy.
            CREATE TABLE reservations (
                id               TEXT PRIMARY KEY,
                seat_id          TEXT NOT NULL REFERENCES seats(id) ON DELETE CASCADE,
                classroom_id     TEXT NOT NULL REFERENCES classrooms(id) ON DELETE CASCADE,
                occupant_name    TEXT NOT NULL,
                occupant_email   TEXT NOT NULL,
                reservation_date TEXT NOT NULL,
                start_time       TEXT NOT NULL,
                end_time         TEXT NOT NULL,
                created_at       TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (seat_id, reservation_date)
            );

            CREATE UNIQUE INDEX idx_reservations_occupant_email
                ON reservations(occupant_email);
            CREATE INDEX idx_reservations_classroom
                ON reservations(classroom_id);

            CREATE TABLE attendance (
                id           TEXT PRIMARY KEY,
                user_id      TEXT NOT NULL REFERENCES users(id),
                seat_id      TEXT NOT NULL REFERENCES seats(id),
                classroom_id TEXT NOT NULL REFERENCES classrooms(id),
                course_name  TEXT NOT NULL,
                class_date   TEXT NOT NULL,
                created_at   TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE (user_id, seat_id, class_date)
            );

            CREATE TABLE sensor_events (
                id            TEXT PRIMARY KEY,
                classroom_id  TEXT NOT NULL REFERENCES classrooms(id) ON DELETE CASCADE,
                seat_number   INTEGER NOT NULL,
                course_name   TEXT NOT NULL,
                class_date    TEXT NOT NULL,
                sensor_status TEXT NOT NULL,
                received_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    Ok(())
}

/// First-run bootstrap: reference classrooms, their seat rows, and the course
/// blocks that make a fresh install reservable. Skipped entirely once any
/// classroom exists.
pub fn seed(conn: &Connection) -> Result<()> {
    let classrooms: i64 = conn.query_row("SELECT COUNT(*) FROM classrooms", [], |r| r.get(0))?;
    if classrooms > 0 {
        return Ok(());
    }

    info!("Seeding classrooms, seats and schedules");

    let room_a = create_room(conn, "Room A", 10)?;
    let room_b = create_room(conn, "Room B", 8)?;

    let schedules = [
        (&room_a, "ECE1528 Mobile Communication Systems", "A. Laurent", "Monday", "17:30:00", "20:30:00"),
        (&room_a, "ECE1657 Game Theory and Evolutionary Games", "M. Okafor", "Wednesday", "10:00:00", "13:00:00"),
        (&room_b, "CSC343 Introduction to Databases", "R. Nakamura", "Tuesday", "09:00:00", "12:00:00"),
        (&room_b, "CSC343 Introduction to Databases", "R. Nakamura", "Friday", "14:00:00", "17:00:00"),
    ];

    for (classroom_id, course, instructor, day, start, end) in schedules {
        conn.execute(
            "INSERT INTO class_schedules (id, classroom_id, course_name, instructor, day_of_week, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                Uuid::new_v4().to_string(),
                classroom_id,
                course,
                instructor,
                day,
                start,
                end,
            ],
        )?;
    }

    Ok(())
}

fn create_room(conn: &Connection, name: &str, total_seats: i64) -> Result<String> {
    let classroom_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO classrooms (id, name, total_seats) VALUES (?1, ?2, ?3)",
        rusqlite::params![classroom_id, name, total_seats],
    )?;

    for seat_number in 1..=total_seats {
        conn.execute(
            "INSERT INTO seats (id, classroom_id, seat_number) VALUES (?1, ?2, ?3)",
            rusqlite::params![Uuid::new_v4().to_string(), classroom_id, seat_number],
        )?;
    }

    Ok(classroom_id)
}
