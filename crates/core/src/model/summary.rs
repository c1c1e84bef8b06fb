use chrono::Duration;

use crate::model::game::{GameKey, ITEMS_PER_LEVEL, LevelKey};
use crate::model::progress::{GameProgress, ProgressState};
use crate::model::stars::MAX_STARS;

/// Rounded percentage, half up. Zero when `total` is zero.
#[must_use]
pub fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (part * 100 + total / 2) / total
}

/// Dashboard totals for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSummary {
    pub completed_items: u32,
    pub total_items: u32,
    pub total_stars: u32,
    pub percentage: u32,
}

/// Totals across all games, as shown on the classroom dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverview {
    pub games: Vec<(GameKey, GameSummary)>,
    pub total_stars: u32,
    pub average_percentage: u32,
}

/// End-of-level recap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSummary {
    pub level: LevelKey,
    pub stars: u32,
    pub max_stars: u32,
    pub percentage: u32,
    /// Time between the first answer and completion, once the level is completed.
    pub time_spent: Option<Duration>,
}

impl GameProgress {
    #[must_use]
    pub fn summary(&self) -> GameSummary {
        let mut completed_items = 0_u32;
        let mut total_items = 0_u32;
        let mut total_stars = 0_u32;

        for (_, level) in self.levels() {
            for item in level.items() {
                total_items += 1;
                if item.answered() {
                    completed_items += 1;
                    total_stars += u32::from(item.stars().value());
                }
            }
        }

        GameSummary {
            completed_items,
            total_items,
            total_stars,
            percentage: percentage(completed_items, total_items),
        }
    }
}

impl ProgressState {
    /// Completion and star totals for one game. Pure; repeated calls agree.
    #[must_use]
    pub fn game_summary(&self, game: GameKey) -> GameSummary {
        self.game(game).summary()
    }

    #[must_use]
    pub fn overview(&self) -> ProgressOverview {
        let games: Vec<_> = GameKey::ALL
            .into_iter()
            .map(|game| (game, self.game_summary(game)))
            .collect();

        let total_stars = games.iter().map(|(_, s)| s.total_stars).sum();
        let pct_sum: u32 = games.iter().map(|(_, s)| s.percentage).sum();
        let count = u32::try_from(games.len()).unwrap_or(u32::MAX);

        ProgressOverview {
            average_percentage: if count == 0 {
                0
            } else {
                (pct_sum + count / 2) / count
            },
            total_stars,
            games,
        }
    }

    #[must_use]
    pub fn level_summary(&self, game: GameKey, level: LevelKey) -> LevelSummary {
        let progress = self.level(game, level);
        let stars = progress.total_stars();
        #[allow(clippy::cast_possible_truncation)]
        let max_stars = (ITEMS_PER_LEVEL as u32) * u32::from(MAX_STARS);

        let time_spent = match (progress.started_at(), progress.completed_at()) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        };

        LevelSummary {
            level,
            stars,
            max_stars,
            percentage: percentage(stars, max_stars),
            time_spent,
        }
    }
}
