use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ProgressError;

/// Highest score a single item can earn.
pub const MAX_STARS: u8 = 3;

//
// ─── STARS ─────────────────────────────────────────────────────────────────────
//

/// Score for one item, always in `0..=3`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const ZERO: Stars = Stars(0);
    pub const ONE: Stars = Stars(1);
    pub const TWO: Stars = Stars(2);
    pub const THREE: Stars = Stars(3);

    /// # Errors
    ///
    /// Returns `ProgressError::InvalidStars` if `value > 3`.
    pub fn new(value: u8) -> Result<Self, ProgressError> {
        if value <= MAX_STARS {
            Ok(Self(value))
        } else {
            Err(ProgressError::InvalidStars(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Stars {
    type Error = ProgressError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//
// ─── DERIVATION ────────────────────────────────────────────────────────────────
//

/// Stars earned for an item, given whether the final answer was correct and
/// on which attempt (1-based) it was given.
///
/// A correct first try earns three stars, a correct second try two, any later
/// correct answer one. An incorrect final answer earns none.
#[must_use]
pub fn stars_for_attempts(correct: bool, attempt_number: u32) -> Stars {
    if !correct {
        return Stars::ZERO;
    }
    match attempt_number {
        1 => Stars::THREE,
        2 => Stars::TWO,
        _ => Stars::ONE,
    }
}

/// Self-assessment shown after a read-aloud attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingFeedback {
    Perfect,
    Okay,
    TryAgain,
}

impl ReadingFeedback {
    #[must_use]
    pub fn stars(self) -> Stars {
        match self {
            ReadingFeedback::Perfect => Stars::THREE,
            ReadingFeedback::Okay => Stars::TWO,
            ReadingFeedback::TryAgain => Stars::ONE,
        }
    }
}
