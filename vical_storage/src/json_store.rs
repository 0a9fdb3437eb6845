//! File-backed calendar store

use crate::schema::{self, DEFAULT_COLOR};
use crate::{CalendarStore, StorageResult};
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use vical_core::{Calendar, Subcalendar};

/// Name of the subcalendar created when no data file exists yet
pub const DEFAULT_SUBCAL_NAME: &str = "Default";

/// `$HOME/.local/share/vical/subcalendars.json`, or a relative path when
/// `HOME` is unset
pub fn default_data_path() -> PathBuf {
    let base = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(".local/share/vical/subcalendars.json")
}

/// Stores the calendar as one JSON file
///
/// Saves write a sibling temp file and rename it over the target, so a
/// failed save keeps the previous contents.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    default_color: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_color: DEFAULT_COLOR.to_string(),
        }
    }

    /// Color of the subcalendar created for a missing file
    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CalendarStore for JsonFileStore {
    fn load(&self) -> StorageResult<Calendar> {
        if !self.path.exists() {
            info!(
                "event=calendar_default module=json_store path={}",
                self.path.display()
            );
            let default = Subcalendar::new(DEFAULT_SUBCAL_NAME, self.default_color.clone());
            return Ok(Calendar::from_subcalendars(vec![default])?);
        }

        let bytes = fs::read(&self.path)?;
        let calendar = schema::decode(&bytes)?;
        info!(
            "event=calendar_loaded module=json_store path={} subcals={} items={}",
            self.path.display(),
            calendar.subcal_count(),
            calendar.item_count()
        );
        Ok(calendar)
    }

    fn save(&mut self, calendar: &Calendar) -> StorageResult<()> {
        let bytes = schema::encode(calendar)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;

        info!(
            "event=calendar_saved module=json_store path={} subcals={} items={} bytes={}",
            self.path.display(),
            calendar.subcal_count(),
            calendar.item_count(),
            bytes.len()
        );
        Ok(())
    }
}
