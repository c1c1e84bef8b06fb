use std::fmt;
use std::sync::Arc;

use bula_core::content::Language;
use storage::repository::{KeyValueStore, StorageError};
use tracing::warn;

pub const LANGUAGE_KEY: &str = "bulabooks.lang";
pub const TUTORIAL_KEY: &str = "bulabooks.tutorial.completed";

/// Small per-device settings stored beside the progress slot.
///
/// Reads never fail (unknown or unreadable values mean "not set") and write
/// failures are logged, matching the progress store's fail-soft policy.
#[derive(Clone)]
pub struct PreferencesService {
    kv: Arc<dyn KeyValueStore>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key).await {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "could not read preference");
                None
            }
        }
    }

    fn log_write(key: &str, result: Result<(), StorageError>) {
        if let Err(err) = result {
            warn!(key, error = %err, "failed to save preference");
        }
    }

    /// Selected content language; English when unset or unrecognized.
    pub async fn language(&self) -> Language {
        self.read(LANGUAGE_KEY)
            .await
            .and_then(|code| Language::from_code(&code))
            .unwrap_or_default()
    }

    pub async fn set_language(&self, language: Language) {
        Self::log_write(LANGUAGE_KEY, self.kv.set(LANGUAGE_KEY, language.code()).await);
    }

    pub async fn tutorial_completed(&self) -> bool {
        self.read(TUTORIAL_KEY).await.as_deref() == Some("true")
    }

    /// Mark the tutorial as done. Skipping the tutorial completes it too.
    pub async fn complete_tutorial(&self) {
        Self::log_write(TUTORIAL_KEY, self.kv.set(TUTORIAL_KEY, "true").await);
    }

    /// Forget tutorial completion so it is offered again.
    pub async fn reset_tutorial(&self) {
        Self::log_write(TUTORIAL_KEY, self.kv.remove(TUTORIAL_KEY).await);
    }
}

impl fmt::Debug for PreferencesService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferencesService").finish_non_exhaustive()
    }
}
