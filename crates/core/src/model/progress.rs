use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProgressError;
use crate::model::game::{GameKey, ITEMS_PER_LEVEL, LevelKey, check_item_index};
use crate::model::stars::Stars;

//
// ─── ITEM ──────────────────────────────────────────────────────────────────────
//

/// Outcome stored for one exercise slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProgress {
    answered: bool,
    stars: Stars,
    attempts: u32,
}

impl ItemProgress {
    #[must_use]
    pub fn answered(&self) -> bool {
        self.answered
    }

    #[must_use]
    pub fn stars(&self) -> Stars {
        self.stars
    }

    /// How many times this slot has been recorded.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a level. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelState {
    NotStarted,
    InProgress,
    Completed,
}

/// Progress through the five items of one level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    items: [ItemProgress; ITEMS_PER_LEVEL],
    completed: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    completed_at: Option<DateTime<Utc>>,
}

impl LevelProgress {
    #[must_use]
    pub fn items(&self) -> &[ItemProgress; ITEMS_PER_LEVEL] {
        &self.items
    }

    /// Returns the item at `index`.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidItemIndex` if `index >= 5`.
    pub fn item(&self, index: usize) -> Result<&ItemProgress, ProgressError> {
        Ok(&self.items[check_item_index(index)?])
    }

    /// Completion marker written once by the recorder.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Number of answered items, re-derived on every call.
    #[must_use]
    pub fn completed_items(&self) -> usize {
        self.items.iter().filter(|item| item.answered).count()
    }

    /// True when every item has been answered.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_items() == ITEMS_PER_LEVEL
    }

    /// Sum of stars over answered items.
    #[must_use]
    pub fn total_stars(&self) -> u32 {
        self.items
            .iter()
            .filter(|item| item.answered)
            .map(|item| u32::from(item.stars.value()))
            .sum()
    }

    #[must_use]
    pub fn state(&self) -> LevelState {
        if self.completed {
            LevelState::Completed
        } else if self.started_at.is_some() || self.completed_items() > 0 {
            LevelState::InProgress
        } else {
            LevelState::NotStarted
        }
    }

    /// Index of the first unanswered item, or the last index when all are answered.
    #[must_use]
    pub fn current_item(&self) -> usize {
        self.items
            .iter()
            .position(|item| !item.answered)
            .unwrap_or(ITEMS_PER_LEVEL - 1)
    }

    /// Overwrite one slot and advance the level lifecycle.
    ///
    /// Returns the written item and whether this call completed the level.
    fn record(
        &mut self,
        index: usize,
        stars: Stars,
        now: DateTime<Utc>,
    ) -> Result<(ItemProgress, bool), ProgressError> {
        let index = check_item_index(index)?;
        // persisted as epoch milliseconds
        let now = now.trunc_subsecs(3);

        let previous = self.items[index];
        let item = ItemProgress {
            answered: true,
            stars,
            attempts: previous.attempts.saturating_add(1),
        };
        self.items[index] = item;

        if self.started_at.is_none() {
            self.started_at = Some(now);
        }

        let mut completed_now = false;
        if !self.completed && self.is_complete() {
            self.completed = true;
            self.completed_at = Some(now);
            completed_now = true;
        }

        Ok((item, completed_now))
    }
}

//
// ─── GAME ──────────────────────────────────────────────────────────────────────
//

/// The three levels of one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameProgress {
    #[serde(rename = "1")]
    one: LevelProgress,
    #[serde(rename = "2")]
    two: LevelProgress,
    #[serde(rename = "3")]
    three: LevelProgress,
}

impl GameProgress {
    #[must_use]
    pub fn level(&self, level: LevelKey) -> &LevelProgress {
        match level {
            LevelKey::One => &self.one,
            LevelKey::Two => &self.two,
            LevelKey::Three => &self.three,
        }
    }

    fn level_mut(&mut self, level: LevelKey) -> &mut LevelProgress {
        match level {
            LevelKey::One => &mut self.one,
            LevelKey::Two => &mut self.two,
            LevelKey::Three => &mut self.three,
        }
    }

    /// Levels in scan order.
    pub fn levels(&self) -> impl Iterator<Item = (LevelKey, &LevelProgress)> {
        LevelKey::ALL.into_iter().map(|key| (key, self.level(key)))
    }

    /// First level not yet marked completed; stays on the last level once all are done.
    #[must_use]
    pub fn current_level(&self) -> LevelKey {
        self.levels()
            .find(|(_, level)| !level.completed)
            .map_or(LevelKey::Three, |(key, _)| key)
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where a player should continue a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePosition {
    pub level: LevelKey,
    pub item: usize,
}

/// Result of recording one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerRecord {
    pub game: GameKey,
    pub level: LevelKey,
    pub item_index: usize,
    pub item: ItemProgress,
    /// Caller bookkeeping; a skip is recorded as answered with zero stars.
    pub answered_successfully: bool,
    pub level_state: LevelState,
    /// True only on the call that moved the level to `Completed`.
    pub level_completed: bool,
}

/// Root persisted object: every game's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    word_hunt: GameProgress,
    read_aloud: GameProgress,
    fill_blank: GameProgress,
    word_builder: GameProgress,
}

impl ProgressState {
    #[must_use]
    pub fn game(&self, game: GameKey) -> &GameProgress {
        match game {
            GameKey::WordHunt => &self.word_hunt,
            GameKey::ReadAloud => &self.read_aloud,
            GameKey::FillBlank => &self.fill_blank,
            GameKey::WordBuilder => &self.word_builder,
        }
    }

    fn game_mut(&mut self, game: GameKey) -> &mut GameProgress {
        match game {
            GameKey::WordHunt => &mut self.word_hunt,
            GameKey::ReadAloud => &mut self.read_aloud,
            GameKey::FillBlank => &mut self.fill_blank,
            GameKey::WordBuilder => &mut self.word_builder,
        }
    }

    #[must_use]
    pub fn level(&self, game: GameKey, level: LevelKey) -> &LevelProgress {
        self.game(game).level(level)
    }

    /// Record one answer for `[game][level][item_index]`.
    ///
    /// The slot is overwritten (stars are not accumulated) while its attempt
    /// counter keeps increasing. The level's `started_at` is set on its first
    /// answer and `completed_at` exactly once, when the fifth item is answered.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::InvalidItemIndex` if `item_index >= 5`; the
    /// state is left untouched.
    pub fn record_answer(
        &mut self,
        game: GameKey,
        level: LevelKey,
        item_index: usize,
        stars: Stars,
        answered_successfully: bool,
        now: DateTime<Utc>,
    ) -> Result<AnswerRecord, ProgressError> {
        let level_progress = self.game_mut(game).level_mut(level);
        let (item, level_completed) = level_progress.record(item_index, stars, now)?;

        Ok(AnswerRecord {
            game,
            level,
            item_index,
            item,
            answered_successfully,
            level_state: level_progress.state(),
            level_completed,
        })
    }

    #[must_use]
    pub fn current_level(&self, game: GameKey) -> LevelKey {
        self.game(game).current_level()
    }

    #[must_use]
    pub fn current_item(&self, game: GameKey, level: LevelKey) -> usize {
        self.level(game, level).current_item()
    }

    #[must_use]
    pub fn resume_position(&self, game: GameKey) -> ResumePosition {
        let level = self.current_level(game);
        ResumePosition {
            level,
            item: self.current_item(game, level),
        }
    }

    #[must_use]
    pub fn level_state(&self, game: GameKey, level: LevelKey) -> LevelState {
        self.level(game, level).state()
    }
}
