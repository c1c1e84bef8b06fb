use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::preferences::PreferencesService;
use crate::progress_store::ProgressStore;

/// Assembles app-facing services over one storage backend.
#[derive(Debug)]
pub struct AppServices {
    progress: ProgressStore,
    preferences: PreferencesService,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the database cannot be opened or migrated.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock).await)
    }

    /// Build services over an existing storage aggregate.
    pub async fn from_storage(storage: Storage, clock: Clock) -> Self {
        let progress = ProgressStore::open(clock, storage.kv.clone()).await;
        let preferences = PreferencesService::new(storage.kv);
        Self {
            progress,
            preferences,
        }
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressStore {
        &mut self.progress
    }

    #[must_use]
    pub fn preferences(&self) -> &PreferencesService {
        &self.preferences
    }
}
