mod game;
mod progress;
mod stars;
mod summary;

pub use game::{
    GameKey, ITEMS_PER_GAME, ITEMS_PER_LEVEL, LEVELS_PER_GAME, LevelKey, check_item_index,
};
pub use progress::{
    AnswerRecord, GameProgress, ItemProgress, LevelProgress, LevelState, ProgressState,
    ResumePosition,
};
pub use stars::{MAX_STARS, ReadingFeedback, Stars, stars_for_attempts};
pub use summary::{GameSummary, LevelSummary, ProgressOverview, percentage};

pub use crate::error::ProgressError;
