use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ProgressError;

/// Number of levels in every game.
pub const LEVELS_PER_GAME: usize = 3;

/// Number of exercise slots in every level.
pub const ITEMS_PER_LEVEL: usize = 5;

/// Number of exercise slots in every game.
pub const ITEMS_PER_GAME: usize = LEVELS_PER_GAME * ITEMS_PER_LEVEL;

//
// ─── GAME KEY ──────────────────────────────────────────────────────────────────
//

/// One of the four fixed exercise types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameKey {
    /// Tap the word in a passage that matches a meaning.
    WordHunt,
    /// Rebuild a sentence word by word, then read it aloud.
    ReadAloud,
    /// Pick the word that completes a sentence.
    FillBlank,
    /// Assemble a word from syllable tiles.
    WordBuilder,
}

impl GameKey {
    /// All games, in dashboard order.
    pub const ALL: [GameKey; 4] = [
        GameKey::WordHunt,
        GameKey::ReadAloud,
        GameKey::FillBlank,
        GameKey::WordBuilder,
    ];

    /// Key used in the persisted state and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameKey::WordHunt => "wordHunt",
            GameKey::ReadAloud => "readAloud",
            GameKey::FillBlank => "fillBlank",
            GameKey::WordBuilder => "wordBuilder",
        }
    }
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKey {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameKey::ALL
            .into_iter()
            .find(|game| game.as_str() == s)
            .ok_or_else(|| ProgressError::UnknownGame(s.to_owned()))
    }
}

//
// ─── LEVEL KEY ─────────────────────────────────────────────────────────────────
//

/// One of the three difficulty tiers inside a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LevelKey {
    One,
    Two,
    Three,
}

impl LevelKey {
    /// All levels, in scan order.
    pub const ALL: [LevelKey; LEVELS_PER_GAME] = [LevelKey::One, LevelKey::Two, LevelKey::Three];

    /// Converts a 1-based level number.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidLevel` if the value is not in 1-3.
    pub fn from_u8(value: u8) -> Result<Self, ProgressError> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(ProgressError::InvalidLevel(value)),
        }
    }

    /// 1-based level number.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            LevelKey::One => 1,
            LevelKey::Two => 2,
            LevelKey::Three => 3,
        }
    }

    /// 0-based position of the level inside a game.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl FromStr for LevelKey {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u8>()
            .map_err(|_| ProgressError::InvalidLevel(0))?;
        Self::from_u8(value)
    }
}

/// Validates a 0-based item index against the fixed level size.
///
/// # Errors
///
/// Returns `ProgressError::InvalidItemIndex` if `index >= ITEMS_PER_LEVEL`.
pub fn check_item_index(index: usize) -> Result<usize, ProgressError> {
    if index < ITEMS_PER_LEVEL {
        Ok(index)
    } else {
        Err(ProgressError::InvalidItemIndex(index))
    }
}
