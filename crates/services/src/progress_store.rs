use std::fmt;
use std::sync::Arc;

use bula_core::model::{
    AnswerRecord, GameKey, GameSummary, LevelKey, LevelState, LevelSummary, ProgressOverview,
    ProgressState, ResumePosition, Stars, stars_for_attempts,
};
use bula_core::time::Clock;
use storage::repository::KeyValueStore;
use tracing::{debug, info, warn};

use crate::error::{DecodeError, ProgressStoreError};

/// Key of the single slot holding the serialized progress tree.
pub const PROGRESS_KEY: &str = "bulabooks.progress";

/// Parse a persisted progress blob.
///
/// # Errors
///
/// Returns `DecodeError` if the blob is not valid JSON or does not have the
/// exact 4 games × 3 levels × 5 items shape.
pub fn decode_state(raw: &str) -> Result<ProgressState, DecodeError> {
    Ok(serde_json::from_str(raw)?)
}

/// Serialize the full progress tree for persistence.
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails.
pub fn encode_state(state: &ProgressState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Read the progress slot, substituting a fresh tree for anything unusable.
async fn load_state(kv: &dyn KeyValueStore) -> ProgressState {
    match kv.get(PROGRESS_KEY).await {
        Ok(Some(raw)) => decode_state(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "discarding unreadable progress");
            ProgressState::default()
        }),
        Ok(None) => {
            debug!("no saved progress");
            ProgressState::default()
        }
        Err(err) => {
            warn!(error = %err, "could not read saved progress");
            ProgressState::default()
        }
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Owns the session's `ProgressState` and keeps the persisted slot in sync.
///
/// Every mutation is written through to the key-value store before the call
/// returns. Persistence failures are logged and never surfaced: the in-memory
/// state stays authoritative for the session and the next successful write
/// carries the full latest state.
pub struct ProgressStore {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    state: ProgressState,
}

impl ProgressStore {
    /// Open the store, rehydrating any saved progress.
    pub async fn open(clock: Clock, kv: Arc<dyn KeyValueStore>) -> Self {
        let state = load_state(kv.as_ref()).await;
        Self { clock, kv, state }
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Replace the in-memory state with what is persisted.
    ///
    /// Missing or corrupt data yields the default tree; this never fails.
    pub async fn load(&mut self) -> &ProgressState {
        self.state = load_state(self.kv.as_ref()).await;
        &self.state
    }

    /// Write the full state to the persisted slot.
    pub async fn save(&self) {
        let raw = match encode_state(&self.state) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "could not serialize progress");
                return;
            }
        };
        if let Err(err) = self.kv.set(PROGRESS_KEY, &raw).await {
            warn!(error = %err, "failed to save progress");
        }
    }

    /// Discard all progress and overwrite the persisted slot with a fresh tree.
    pub async fn reset(&mut self) {
        self.state = ProgressState::default();
        info!("progress reset");
        self.save().await;
    }

    /// Record one answer and persist.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Progress` if `item_index` is outside the
    /// level; nothing is changed or written in that case.
    pub async fn record_answer(
        &mut self,
        game: GameKey,
        level: LevelKey,
        item_index: usize,
        stars: Stars,
        answered_successfully: bool,
    ) -> Result<AnswerRecord, ProgressStoreError> {
        let now = self.clock.now();
        let record =
            self.state
                .record_answer(game, level, item_index, stars, answered_successfully, now)?;

        debug!(
            %game,
            %level,
            item = item_index,
            %stars,
            attempts = record.item.attempts(),
            success = answered_successfully,
            "answer recorded"
        );
        if record.level_completed {
            info!(%game, %level, "level completed");
        }

        self.save().await;
        Ok(record)
    }

    /// Record an item finished on `attempt_number`, deriving its stars.
    ///
    /// # Errors
    ///
    /// See [`ProgressStore::record_answer`].
    pub async fn record_attempt(
        &mut self,
        game: GameKey,
        level: LevelKey,
        item_index: usize,
        correct: bool,
        attempt_number: u32,
    ) -> Result<AnswerRecord, ProgressStoreError> {
        let stars = stars_for_attempts(correct, attempt_number);
        self.record_answer(game, level, item_index, stars, correct)
            .await
    }

    /// Skip an item: it counts as answered with zero stars.
    ///
    /// # Errors
    ///
    /// See [`ProgressStore::record_answer`].
    pub async fn skip_item(
        &mut self,
        game: GameKey,
        level: LevelKey,
        item_index: usize,
    ) -> Result<AnswerRecord, ProgressStoreError> {
        self.record_answer(game, level, item_index, Stars::ZERO, false)
            .await
    }

    #[must_use]
    pub fn current_level(&self, game: GameKey) -> LevelKey {
        self.state.current_level(game)
    }

    #[must_use]
    pub fn current_item(&self, game: GameKey, level: LevelKey) -> usize {
        self.state.current_item(game, level)
    }

    #[must_use]
    pub fn resume_position(&self, game: GameKey) -> ResumePosition {
        self.state.resume_position(game)
    }

    #[must_use]
    pub fn level_state(&self, game: GameKey, level: LevelKey) -> LevelState {
        self.state.level_state(game, level)
    }

    #[must_use]
    pub fn game_summary(&self, game: GameKey) -> GameSummary {
        self.state.game_summary(game)
    }

    #[must_use]
    pub fn level_summary(&self, game: GameKey, level: LevelKey) -> LevelSummary {
        self.state.level_summary(game, level)
    }

    #[must_use]
    pub fn overview(&self) -> ProgressOverview {
        self.state.overview()
    }
}

impl fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressStore")
            .field("clock", &self.clock)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bula_core::ProgressError;
    use bula_core::time::{fixed_clock, fixed_now};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use storage::repository::{InMemoryStore, StorageError};

    /// Store whose writes always fail; reads see nothing.
    #[derive(Default)]
    struct FailingWrites {
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl KeyValueStore for FailingWrites {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(StorageError::Connection("quota exceeded".into()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("quota exceeded".into()))
        }
    }

    async fn open_in_memory() -> (ProgressStore, Arc<InMemoryStore>) {
        let kv = Arc::new(InMemoryStore::new());
        let store = ProgressStore::open(fixed_clock(), kv.clone()).await;
        (store, kv)
    }

    #[tokio::test]
    async fn opens_with_defaults_when_nothing_saved() {
        let (store, _) = open_in_memory().await;
        assert_eq!(store.state(), &ProgressState::default());
        assert_eq!(store.current_level(GameKey::ReadAloud), LevelKey::One);
    }

    #[tokio::test]
    async fn corrupt_blob_falls_back_to_defaults() {
        let kv = Arc::new(InMemoryStore::new());
        kv.set(PROGRESS_KEY, "{not json").await.unwrap();
        let store = ProgressStore::open(fixed_clock(), kv.clone()).await;
        assert_eq!(store.state(), &ProgressState::default());

        kv.set(PROGRESS_KEY, r#"{"wordHunt":{}}"#).await.unwrap();
        let store = ProgressStore::open(fixed_clock(), kv).await;
        assert_eq!(store.state(), &ProgressState::default());
    }

    #[tokio::test]
    async fn every_record_is_written_through() {
        let (mut store, kv) = open_in_memory().await;
        store
            .record_answer(GameKey::WordHunt, LevelKey::One, 0, Stars::THREE, true)
            .await
            .unwrap();

        let raw = kv.get(PROGRESS_KEY).await.unwrap().expect("saved");
        let saved = decode_state(&raw).unwrap();
        assert_eq!(&saved, store.state());
        assert_eq!(saved.game_summary(GameKey::WordHunt).total_stars, 3);
    }

    #[tokio::test]
    async fn invalid_slot_is_rejected_without_writing() {
        let (mut store, kv) = open_in_memory().await;
        let err = store
            .record_answer(GameKey::FillBlank, LevelKey::Two, 7, Stars::ONE, true)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProgressStoreError::Progress(ProgressError::InvalidItemIndex(7))
        ));
        assert_eq!(kv.get(PROGRESS_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn record_attempt_derives_stars() {
        let (mut store, _) = open_in_memory().await;
        let second_try = store
            .record_attempt(GameKey::WordBuilder, LevelKey::One, 0, true, 2)
            .await
            .unwrap();
        assert_eq!(second_try.item.stars(), Stars::TWO);
        assert!(second_try.answered_successfully);

        let failed = store
            .record_attempt(GameKey::WordBuilder, LevelKey::One, 1, false, 3)
            .await
            .unwrap();
        assert_eq!(failed.item.stars(), Stars::ZERO);
        assert!(failed.item.answered());
    }

    #[tokio::test]
    async fn write_failures_keep_in_memory_state() {
        let kv = Arc::new(FailingWrites::default());
        let mut store = ProgressStore::open(fixed_clock(), kv.clone()).await;

        let record = store
            .record_answer(GameKey::ReadAloud, LevelKey::One, 0, Stars::TWO, true)
            .await
            .expect("write failure is not surfaced");
        assert_eq!(record.item.stars(), Stars::TWO);
        assert_eq!(store.game_summary(GameKey::ReadAloud).completed_items, 1);
        assert_eq!(kv.attempts.load(Ordering::SeqCst), 1);

        store.reset().await;
        assert_eq!(store.game_summary(GameKey::ReadAloud).completed_items, 0);
        assert_eq!(kv.attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn load_rehydrates_from_storage() {
        let kv = Arc::new(InMemoryStore::new());
        let mut writer = ProgressStore::open(fixed_clock(), kv.clone()).await;
        let mut reader = ProgressStore::open(fixed_clock(), kv.clone()).await;

        writer.skip_item(GameKey::FillBlank, LevelKey::One, 0).await.unwrap();
        assert_eq!(reader.game_summary(GameKey::FillBlank).completed_items, 0);

        let state = reader.load().await;
        assert_eq!(state.game_summary(GameKey::FillBlank).completed_items, 1);
        assert_eq!(
            reader
                .state()
                .level(GameKey::FillBlank, LevelKey::One)
                .started_at(),
            Some(fixed_now())
        );
    }
}
