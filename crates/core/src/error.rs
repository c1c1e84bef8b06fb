use thiserror::Error;

/// Invariant violations raised while addressing or mutating progress.
///
/// These are programming errors on the caller's side (a slot outside the
/// fixed 4 × 3 × 5 shape, or a star count above three). They are surfaced
/// instead of silently extending or corrupting state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("unknown game key: {0}")]
    UnknownGame(String),

    #[error("level must be between 1 and 3, got {0}")]
    InvalidLevel(u8),

    #[error("item index must be between 0 and 4, got {0}")]
    InvalidItemIndex(usize),

    #[error("stars must be between 0 and 3, got {0}")]
    InvalidStars(u8),
}
