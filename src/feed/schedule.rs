use chrono::{DateTime, Utc};

use crate::podcast::{to_utc, Episode};

/// Wall-clock source for publication scheduling.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Whether an episode is published as of `now`: strictly earlier only.
///
/// Dates without an offset were already read as UTC, so the comparison is
/// always between absolute instants.
pub fn is_eligible(episode: &Episode, now: DateTime<Utc>) -> bool {
    to_utc(&episode.publication_date) < now
}
