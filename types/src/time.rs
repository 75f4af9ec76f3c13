//! Timestamp type used throughout the engine.
//!
//! Timestamps are Unix epoch seconds (UTC). Bond maturities are compared
//! against the chain clock, never the host's wall clock.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds remaining until `self` as seen from `now`; zero once reached.
    pub fn seconds_until(&self, now: Timestamp) -> u64 {
        self.0.saturating_sub(now.0)
    }

    /// Whether `now` is at or past this timestamp.
    pub fn has_passed(&self, now: Timestamp) -> bool {
        now.0 >= self.0
    }

    pub fn saturating_add_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_until_saturates_after_maturity() {
        let maturity = Timestamp::new(1_000);
        assert_eq!(maturity.seconds_until(Timestamp::new(400)), 600);
        assert_eq!(maturity.seconds_until(Timestamp::new(1_000)), 0);
        assert_eq!(maturity.seconds_until(Timestamp::new(5_000)), 0);
    }

    #[test]
    fn has_passed_is_inclusive() {
        let t = Timestamp::new(10);
        assert!(!t.has_passed(Timestamp::new(9)));
        assert!(t.has_passed(Timestamp::new(10)));
        assert!(t.has_passed(Timestamp::new(11)));
    }
}
