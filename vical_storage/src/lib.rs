//! # Calendar Storage
//!
//! JSON persistence for vical calendars and settings.
//!
//! ## Philosophy
//!
//! - **Opaque boundary**: The editor core never touches files; hosts load and
//!   save through [`CalendarStore`]
//! - **No partial writes**: A save either replaces the whole file or leaves the
//!   previous one in place
//! - **Stable format**: Dates are 8-digit `YYYYMMDD` strings, items carry a
//!   `type` tag
//!
//! ## Design
//!
//! - **schema**: Serde records for the on-disk format and their conversion
//!   to and from the core model
//! - **JsonFileStore**: File-backed store used by the host
//! - **MemoryStore**: In-memory store for tests and scripted runs
//! - **settings_file**: Settings loading with defaults for missing keys

pub mod json_store;
pub mod memory_store;
pub mod schema;
pub mod settings_file;

pub use json_store::{default_data_path, JsonFileStore};
pub use memory_store::MemoryStore;
pub use settings_file::load_settings;

use thiserror::Error;
use vical_core::{Calendar, ModelError};

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while loading or saving
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid vical data format: {0}")]
    InvalidFormat(String),

    #[error("Inconsistent calendar data: {0}")]
    Model(#[from] ModelError),
}

/// Load/store boundary between the editor and its backing storage
pub trait CalendarStore {
    /// Loads the whole calendar
    fn load(&self) -> StorageResult<Calendar>;

    /// Replaces the stored calendar
    fn save(&mut self, calendar: &Calendar) -> StorageResult<()>;
}
