//! User settings
//!
//! Plain serde data; the storage crate reads it from a JSON file and any
//! missing key falls back to its default.

use crate::history::MAX_HISTORY;
use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Field order for 8- and 4-digit goto dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// month, day, year
    #[default]
    Mdy,
    /// day, month, year
    Dmy,
}

impl DateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateFormat::Mdy => "mdy",
            DateFormat::Dmy => "dmy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub date_format: DateFormat,
    pub week_start: Weekday,
    pub max_history: usize,
    pub default_task_name: String,
    pub default_event_name: String,
    pub default_subcal_color: String,
    /// `p` pastes back into the subcalendar an item was yanked from
    pub paste_to_original_subcal: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            date_format: DateFormat::Mdy,
            week_start: Weekday::Sun,
            max_history: MAX_HISTORY,
            default_task_name: "New Task".to_string(),
            default_event_name: "New Event".to_string(),
            default_subcal_color: "green".to_string(),
            paste_to_original_subcal: true,
        }
    }
}
