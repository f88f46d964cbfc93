use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Source of "now" for the engine, the attendance recorder and the sweeper.
/// Injected everywhere the ambient clock matters so tests can pin it to an
/// arbitrary instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }
}

/// Local wall time — the schedules describe a single campus, so the server's
/// own timezone is the campus timezone.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at one instant, for tests.
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Capitalized English day name as stored on schedule rows. An explicit
/// match rather than `format("%A")` so the mapping cannot drift with locale
/// handling.
pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// `YYYY-MM-DD`, the format dates take in the database and on the wire.
pub fn date_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `HH:MM:SS`, zero-padded so lexicographic comparison in SQL matches
/// chronological order.
pub fn time_to_db(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_names_match_seeded_schedule_rows() {
        // 2025-03-10 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert_eq!(weekday_name(monday), "Monday");
        assert_eq!(weekday_name(monday.succ_opt().unwrap()), "Tuesday");
        assert_eq!(
            weekday_name(NaiveDate::from_ymd_opt(2025, 3, 16).unwrap()),
            "Sunday"
        );
    }

    #[test]
    fn db_formats_are_zero_padded_and_sortable() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        assert_eq!(date_to_db(date), "2025-03-02");

        let early = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        let late = NaiveTime::from_hms_opt(17, 30, 0).unwrap();
        assert_eq!(time_to_db(early), "09:05:00");
        assert_eq!(time_to_db(late), "17:30:00");
        assert!(time_to_db(early) < time_to_db(late));
    }
}
