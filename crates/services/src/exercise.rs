//! Per-item helpers shared by the game screens.

use bula_core::content::{ReadAloudItem, WordBuilderItem};
use bula_core::model::{Stars, stars_for_attempts};
use rand::Rng;
use rand::seq::SliceRandom;

/// Copy of `items` in random order.
pub fn shuffled<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    out.shuffle(rng);
    out
}

/// Word-builder tiles in presentation order.
pub fn shuffled_tiles<R: Rng + ?Sized>(item: &WordBuilderItem, rng: &mut R) -> Vec<String> {
    shuffled(&item.tiles, rng)
}

/// Read-aloud word cards in presentation order.
pub fn shuffled_words<R: Rng + ?Sized>(item: &ReadAloudItem, rng: &mut R) -> Vec<String> {
    let words: Vec<String> = item.words().into_iter().map(str::to_owned).collect();
    shuffled(&words, rng)
}

/// Counts checks made on the current item.
///
/// A screen creates one per item, calls [`AttemptTracker::check`] every time
/// the player submits, and reads [`AttemptTracker::stars`] when moving on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttemptTracker {
    attempts: u32,
    last_correct: Option<bool>,
}

impl AttemptTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one submission and return whether it was correct.
    pub fn check(&mut self, correct: bool) -> bool {
        self.attempts = self.attempts.saturating_add(1);
        self.last_correct = Some(correct);
        correct
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether the player has submitted at least once.
    #[must_use]
    pub fn has_feedback(&self) -> bool {
        self.last_correct.is_some()
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.last_correct == Some(true)
    }

    /// Stars for the item if the player moves on now.
    #[must_use]
    pub fn stars(&self) -> Stars {
        stars_for_attempts(self.is_correct(), self.attempts)
    }
}
