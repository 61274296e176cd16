//! Time source for connection timestamps

use chrono::{DateTime, Utc};

/// Supplies the current instant
///
/// Reconciliation never reads the system time directly so tests can pin it.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always returns the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Parse an RFC 3339 timestamp such as `2018-11-28T01:15:27Z`
    pub fn parse(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        let instant = DateTime::parse_from_rfc3339(rfc3339)?.with_timezone(&Utc);
        Ok(Self { instant })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
