use thiserror::Error;

/// Business-rule failures surfaced by the engine. All variants except
/// `Persistence` are detected before anything is mutated (the raced
/// `SeatTaken`/`DuplicateReservation` cases at commit roll the transaction
/// back first). The HTTP mapping lives in aula-api.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Classroom not found")]
    ClassroomNotFound,

    #[error("Seat not found")]
    SeatNotFound,

    #[error("No {course_name} class is scheduled on {day_of_week} covering {start_time}-{end_time} in this classroom")]
    NoScheduledClass {
        course_name: String,
        day_of_week: String,
        start_time: String,
        end_time: String,
    },

    #[error("{email} already holds an active reservation")]
    DuplicateReservation { email: String },

    #[error("Seat {seat_number} is already taken")]
    SeatTaken { seat_number: i64 },

    #[error("No class is currently in session in this classroom")]
    NoActiveClass,

    #[error("User not found")]
    UserNotFound,

    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}
