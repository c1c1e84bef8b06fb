#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod exercise;
pub mod preferences;
pub mod progress_store;

pub use bula_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, DecodeError, ProgressStoreError};
pub use exercise::AttemptTracker;
pub use preferences::PreferencesService;
pub use progress_store::{PROGRESS_KEY, ProgressStore, decode_state, encode_state};
