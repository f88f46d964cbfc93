use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use aula_db::Database;
use aula_db::models::ClassroomRow;

use crate::clock::{Clock, time_to_db, weekday_name};

/// What a single sweep pass did across all classrooms.
#[derive(Debug, Default)]
pub struct SweepOutcome {
    pub rooms_swept: usize,
    pub seats_reset: usize,
    pub reservations_deleted: usize,
}

impl SweepOutcome {
    pub fn changed_anything(&self) -> bool {
        self.seats_reset > 0 || self.reservations_deleted > 0
    }
}

/// Background task that resets classrooms between classes.
///
/// Runs on an interval. A classroom with a class in session right now is
/// left alone; every other classroom has its seats flipped back to
/// available and its reservation ledger emptied, so the room starts the
/// next class clean.
pub async fn run_sweep_loop(db: Arc<Database>, clock: Arc<dyn Clock>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    // Skip missed ticks instead of bursting; passes never overlap.
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        let db = db.clone();
        let clock = clock.clone();
        let swept = tokio::task::spawn_blocking(move || sweep_once(&db, clock.as_ref())).await;

        match swept {
            Ok(Ok(outcome)) => {
                if outcome.changed_anything() {
                    info!(
                        "Sweep: reset {} seats, removed {} reservations across {} classrooms",
                        outcome.seats_reset, outcome.reservations_deleted, outcome.rooms_swept
                    );
                }
            }
            Ok(Err(e)) => {
                warn!("Sweep error: {}", e);
            }
            Err(e) => {
                warn!("Sweep task failed: {}", e);
            }
        }
    }
}

/// One full pass over every classroom. A classroom that fails is logged
/// and skipped so the rest still get cleaned.
pub fn sweep_once(db: &Database, clock: &dyn Clock) -> anyhow::Result<SweepOutcome> {
    let day = weekday_name(clock.today());
    let time = time_to_db(clock.time_of_day());

    let mut outcome = SweepOutcome::default();
    for room in db.list_classrooms()? {
        match sweep_room(db, &room, day, &time) {
            Ok(Some((seats, reservations))) => {
                outcome.rooms_swept += 1;
                outcome.seats_reset += seats;
                outcome.reservations_deleted += reservations;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Sweep: classroom {} failed: {}", room.name, e);
            }
        }
    }
    Ok(outcome)
}

fn sweep_room(
    db: &Database,
    room: &ClassroomRow,
    day: &str,
    time: &str,
) -> anyhow::Result<Option<(usize, usize)>> {
    if db.active_schedule_at(&room.id, day, time)?.is_some() {
        return Ok(None);
    }
    let (seats, reservations) = db.sweep_classroom(&room.id)?;
    Ok(Some((seats, reservations)))
}
