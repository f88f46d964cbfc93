use serde::{Deserialize, Serialize};

/// Live availability flag cached on a seat row.
///
/// This is a cache of the reservation ledger (plus the sensor path, which may
/// move it independently). Date-scoped queries against the ledger are the
/// authoritative read; see `aula-db`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    Taken,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Taken => "taken",
        }
    }

    /// Seats default to 'available'; anything but the literal 'taken' is
    /// treated as free, matching the column default.
    pub fn from_db(s: &str) -> Self {
        if s == "taken" { Self::Taken } else { Self::Available }
    }

    pub fn is_taken(&self) -> bool {
        matches!(self, Self::Taken)
    }
}
