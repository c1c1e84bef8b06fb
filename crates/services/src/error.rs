//! Shared error types for the services crate.

use thiserror::Error;

use bula_core::ProgressError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressStore` mutations.
///
/// Persistence failures never appear here; they are logged and swallowed so
/// gameplay is not interrupted.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
}

/// A persisted progress blob could not be decoded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("stored progress is not valid: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
