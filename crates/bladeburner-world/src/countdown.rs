//! A seconds countdown that re-rolls itself after firing.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// Counts simulated seconds down to the next firing.
///
/// When the remaining time reaches zero the countdown fires once and is
/// reset to a fresh roll in `[min, max]`. The reset replaces the remainder
/// rather than adding to it, so a large time step fires at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: i64,
    min_seconds: u32,
    max_seconds: u32,
}

impl Countdown {
    /// Create a countdown with a freshly rolled remainder.
    pub fn new(min_seconds: u32, max_seconds: u32, rng: &mut impl Rng) -> Result<Self, WorldError> {
        validate(min_seconds, max_seconds)?;
        Ok(Self {
            remaining: i64::from(rng.random_range(min_seconds..=max_seconds)),
            min_seconds,
            max_seconds,
        })
    }

    /// Restore a countdown. A negative remainder is treated as due.
    pub fn from_parts(remaining: i64, min_seconds: u32, max_seconds: u32) -> Result<Self, WorldError> {
        validate(min_seconds, max_seconds)?;
        Ok(Self {
            remaining: remaining.max(0),
            min_seconds,
            max_seconds,
        })
    }

    /// Seconds left before the next firing.
    pub const fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Advance by `seconds`. Returns `true` if the countdown fired.
    pub fn advance(&mut self, seconds: u32, rng: &mut impl Rng) -> bool {
        self.remaining = self.remaining.saturating_sub(i64::from(seconds));
        if self.remaining > 0 {
            return false;
        }
        self.remaining = i64::from(rng.random_range(self.min_seconds..=self.max_seconds));
        true
    }
}

const fn validate(min_seconds: u32, max_seconds: u32) -> Result<(), WorldError> {
    if min_seconds > max_seconds || max_seconds == 0 {
        return Err(WorldError::InvalidInterval {
            min: min_seconds,
            max: max_seconds,
        });
    }
    Ok(())
}
