//! In-memory calendar store
//!
//! Keeps the encoded JSON rather than the live model so loads exercise the
//! same schema path as the file store. Saves can be made to fail to test
//! how hosts report persistence errors.

use crate::schema;
use crate::{CalendarStore, StorageError, StorageResult};
use log::{info, warn};
use std::io;
use vical_core::{Calendar, Subcalendar};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Option<Vec<u8>>,
    fail_saves: bool,
    save_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with `calendar`
    pub fn with_calendar(calendar: &Calendar) -> StorageResult<Self> {
        Ok(Self {
            contents: Some(schema::encode(calendar)?),
            ..Self::default()
        })
    }

    /// Makes every following save fail with an I/O error
    pub fn fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    /// Raw JSON of the last successful save
    pub fn contents(&self) -> Option<&[u8]> {
        self.contents.as_deref()
    }
}

impl CalendarStore for MemoryStore {
    fn load(&self) -> StorageResult<Calendar> {
        match &self.contents {
            Some(bytes) => schema::decode(bytes),
            None => Ok(Calendar::from_subcalendars(vec![Subcalendar::new(
                crate::json_store::DEFAULT_SUBCAL_NAME,
                schema::DEFAULT_COLOR,
            )])?),
        }
    }

    fn save(&mut self, calendar: &Calendar) -> StorageResult<()> {
        if self.fail_saves {
            warn!("event=save_failed module=memory_store reason=injected");
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "injected save failure",
            )));
        }
        self.contents = Some(schema::encode(calendar)?);
        self.save_count += 1;
        info!(
            "event=calendar_saved module=memory_store saves={}",
            self.save_count
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_loads_default() {
        let store = MemoryStore::new();
        let cal = store.load().unwrap();
        assert_eq!(cal.subcalendars()[0].name(), "Default");
    }

    #[test]
    fn test_injected_failure_keeps_previous_contents() {
        let cal = Calendar::from_subcalendars(vec![Subcalendar::new("Home", "green")]).unwrap();
        let mut store = MemoryStore::new();
        store.save(&cal).unwrap();
        let before = store.contents().unwrap().to_vec();

        store.fail_saves(true);
        let other = Calendar::from_subcalendars(vec![Subcalendar::new("Work", "red")]).unwrap();
        assert!(matches!(store.save(&other), Err(StorageError::Io(_))));
        assert_eq!(store.contents().unwrap(), before.as_slice());
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.load().unwrap(), cal);
    }
}
