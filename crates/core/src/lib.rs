#![forbid(unsafe_code)]

pub mod content;
pub mod error;
pub mod model;
pub mod time;

pub use error::ProgressError;
pub use time::Clock;
