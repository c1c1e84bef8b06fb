use std::sync::Arc;

use bula_core::model::{
    GameKey, ITEMS_PER_LEVEL, LevelKey, LevelState, ProgressState, ResumePosition, Stars,
};
use bula_core::time::{Clock, fixed_now};
use chrono::Duration;
use services::{PROGRESS_KEY, ProgressStore, decode_state};
use storage::repository::{InMemoryStore, KeyValueStore, Storage};

async fn fresh_store() -> (ProgressStore, Arc<InMemoryStore>) {
    let kv = Arc::new(InMemoryStore::new());
    let store = ProgressStore::open(Clock::fixed(fixed_now()), kv.clone()).await;
    (store, kv)
}

async fn finish_level(store: &mut ProgressStore, game: GameKey, level: LevelKey, stars: Stars) {
    for idx in 0..ITEMS_PER_LEVEL {
        store
            .record_answer(game, level, idx, stars, true)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn level_completes_on_fifth_answer() {
    let (mut store, _) = fresh_store().await;

    for idx in 0..ITEMS_PER_LEVEL - 1 {
        let record = store
            .record_answer(GameKey::FillBlank, LevelKey::One, idx, Stars::TWO, true)
            .await
            .unwrap();
        assert!(!record.level_completed);
        assert_eq!(record.level_state, LevelState::InProgress);
    }
    assert_eq!(store.current_item(GameKey::FillBlank, LevelKey::One), 4);

    let last = store
        .record_answer(GameKey::FillBlank, LevelKey::One, 4, Stars::TWO, true)
        .await
        .unwrap();
    assert!(last.level_completed);
    assert_eq!(last.level_state, LevelState::Completed);
    assert_eq!(store.current_item(GameKey::FillBlank, LevelKey::One), 4);
    assert!(
        store
            .state()
            .level(GameKey::FillBlank, LevelKey::One)
            .completed_at()
            .is_some()
    );
}

#[tokio::test]
async fn current_level_advances_through_the_game() {
    let (mut store, _) = fresh_store().await;
    assert_eq!(store.current_level(GameKey::WordBuilder), LevelKey::One);

    finish_level(&mut store, GameKey::WordBuilder, LevelKey::One, Stars::THREE).await;
    assert_eq!(store.current_level(GameKey::WordBuilder), LevelKey::Two);

    finish_level(&mut store, GameKey::WordBuilder, LevelKey::Two, Stars::THREE).await;
    assert_eq!(store.current_level(GameKey::WordBuilder), LevelKey::Three);

    finish_level(&mut store, GameKey::WordBuilder, LevelKey::Three, Stars::ONE).await;
    assert_eq!(store.current_level(GameKey::WordBuilder), LevelKey::Three);
    assert_eq!(
        store.resume_position(GameKey::WordBuilder),
        ResumePosition {
            level: LevelKey::Three,
            item: 4
        }
    );

    let summary = store.game_summary(GameKey::WordBuilder);
    assert_eq!(summary.completed_items, 15);
    assert_eq!(summary.total_stars, 35);
    assert_eq!(summary.percentage, 100);
}

#[tokio::test]
async fn other_games_are_untouched() {
    let (mut store, _) = fresh_store().await;
    finish_level(&mut store, GameKey::ReadAloud, LevelKey::One, Stars::THREE).await;

    for game in [GameKey::WordHunt, GameKey::FillBlank, GameKey::WordBuilder] {
        assert_eq!(store.game_summary(game).completed_items, 0);
        assert_eq!(store.current_level(game), LevelKey::One);
    }
}

#[tokio::test]
async fn single_word_hunt_answer_scenario() {
    let (mut store, _) = fresh_store().await;
    store
        .record_answer(GameKey::WordHunt, LevelKey::One, 0, Stars::THREE, true)
        .await
        .unwrap();

    let summary = store.game_summary(GameKey::WordHunt);
    assert_eq!(summary.completed_items, 1);
    assert_eq!(summary.total_items, 15);
    assert_eq!(summary.total_stars, 3);
    assert_eq!(summary.percentage, 7);

    let overview = store.overview();
    assert_eq!(overview.total_stars, 3);
    assert_eq!(overview.average_percentage, 2);
    assert_eq!(
        store.level_state(GameKey::WordHunt, LevelKey::One),
        LevelState::InProgress
    );
    assert_eq!(store.current_item(GameKey::WordHunt, LevelKey::One), 1);
}

#[tokio::test]
async fn summaries_do_not_mutate() {
    let (mut store, _) = fresh_store().await;
    store
        .record_answer(GameKey::ReadAloud, LevelKey::Two, 3, Stars::ONE, false)
        .await
        .unwrap();

    let before = store.state().clone();
    let first = store.overview();
    let second = store.overview();
    assert_eq!(first, second);
    assert_eq!(
        store.game_summary(GameKey::ReadAloud),
        store.game_summary(GameKey::ReadAloud)
    );
    assert_eq!(store.state(), &before);
}

#[tokio::test]
async fn overwriting_an_answer_replaces_stars() {
    let (mut store, _) = fresh_store().await;
    store
        .record_answer(GameKey::FillBlank, LevelKey::One, 2, Stars::ONE, true)
        .await
        .unwrap();
    let record = store
        .record_answer(GameKey::FillBlank, LevelKey::One, 2, Stars::THREE, true)
        .await
        .unwrap();

    assert_eq!(record.item.stars(), Stars::THREE);
    assert_eq!(record.item.attempts(), 2);
    assert_eq!(store.game_summary(GameKey::FillBlank).total_stars, 3);
    assert_eq!(store.game_summary(GameKey::FillBlank).completed_items, 1);
}

#[tokio::test]
async fn skipping_a_whole_level_moves_on() {
    let (mut store, _) = fresh_store().await;
    for idx in 0..ITEMS_PER_LEVEL {
        store
            .skip_item(GameKey::WordHunt, LevelKey::One, idx)
            .await
            .unwrap();
    }

    assert_eq!(store.current_level(GameKey::WordHunt), LevelKey::Two);
    let summary = store.game_summary(GameKey::WordHunt);
    assert_eq!(summary.completed_items, 5);
    assert_eq!(summary.total_stars, 0);
    assert_eq!(summary.percentage, 33);
}

#[tokio::test]
async fn level_summary_reports_time_spent() {
    let kv = Arc::new(InMemoryStore::new());
    let mut clock = Clock::fixed(fixed_now());
    let mut store = ProgressStore::open(clock, kv.clone()).await;
    store
        .record_answer(GameKey::ReadAloud, LevelKey::One, 0, Stars::THREE, true)
        .await
        .unwrap();

    // Finish the rest of the level ninety seconds later on a reopened store.
    clock.advance(Duration::seconds(90));
    let mut store = ProgressStore::open(clock, kv).await;
    for idx in 1..ITEMS_PER_LEVEL {
        store
            .record_answer(GameKey::ReadAloud, LevelKey::One, idx, Stars::TWO, true)
            .await
            .unwrap();
    }

    let summary = store.level_summary(GameKey::ReadAloud, LevelKey::One);
    assert_eq!(summary.stars, 11);
    assert_eq!(summary.max_stars, 15);
    assert_eq!(summary.percentage, 73);
    assert_eq!(summary.time_spent, Some(Duration::seconds(90)));
}

#[tokio::test]
async fn reset_restores_defaults_and_persists() {
    let (mut store, kv) = fresh_store().await;
    finish_level(&mut store, GameKey::FillBlank, LevelKey::One, Stars::TWO).await;

    store.reset().await;
    assert_eq!(store.state(), &ProgressState::default());

    let raw = kv.get(PROGRESS_KEY).await.unwrap().expect("reset writes");
    assert_eq!(decode_state(&raw).unwrap(), ProgressState::default());

    let reopened = ProgressStore::open(Clock::fixed(fixed_now()), kv).await;
    assert_eq!(reopened.state(), &ProgressState::default());
}

async fn round_trip(storage: Storage) {
    let clock = Clock::fixed(fixed_now());
    let mut store = ProgressStore::open(clock, storage.kv.clone()).await;
    finish_level(&mut store, GameKey::WordHunt, LevelKey::One, Stars::THREE).await;
    store
        .record_answer(GameKey::WordBuilder, LevelKey::Two, 1, Stars::TWO, true)
        .await
        .unwrap();
    store
        .skip_item(GameKey::ReadAloud, LevelKey::Three, 4)
        .await
        .unwrap();

    let reopened = ProgressStore::open(clock, storage.kv).await;
    assert_eq!(reopened.state(), store.state());
    assert_eq!(reopened.overview(), store.overview());
}

#[tokio::test]
async fn progress_round_trips_through_memory() {
    round_trip(Storage::in_memory()).await;
}

#[tokio::test]
async fn progress_round_trips_through_sqlite() {
    let storage = Storage::sqlite("sqlite:file:memdb_progress_flow?mode=memory&cache=shared")
        .await
        .expect("open sqlite");
    round_trip(storage).await;
}
