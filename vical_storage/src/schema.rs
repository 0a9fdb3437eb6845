//! On-disk schema
//!
//! The file holds a JSON list of subcalendars:
//!
//! ```json
//! [{"uid": "…", "name": "Home", "color": "green", "hidden": false,
//!   "items": [{"type": "task", "uid": "…", "name": "dentist",
//!              "desc": "bring card", "date": "20260704", "completed": false}]}]
//! ```
//!
//! Uids are opaque non-empty strings and are written back exactly as read.
//! `desc` is omitted when empty.

use crate::{StorageError, StorageResult};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use vical_core::model::ItemKind;
use vical_core::{Calendar, CalendarItem, ItemId, SubcalId, Subcalendar};

/// `chrono` format of every stored date
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Color of subcalendars stored without one
pub const DEFAULT_COLOR: &str = "green";

mod compact_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(de::Error::custom)
    }
}

mod compact_date_opt {
    use super::DATE_FORMAT;
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format(DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                .map(Some)
                .map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// Stored task or event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoredItem {
    Task {
        uid: String,
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        desc: String,
        #[serde(with = "compact_date")]
        date: NaiveDate,
        #[serde(default)]
        completed: bool,
        #[serde(
            default,
            with = "compact_date_opt",
            skip_serializing_if = "Option::is_none"
        )]
        deadline: Option<NaiveDate>,
    },
    Event {
        uid: String,
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        desc: String,
        #[serde(with = "compact_date")]
        start_date: NaiveDate,
        #[serde(with = "compact_date")]
        end_date: NaiveDate,
    },
}

impl StoredItem {
    pub fn from_item(item: &CalendarItem) -> Self {
        let uid = item.uid().to_string();
        let name = item.name().to_string();
        let desc = item.desc().to_string();
        match *item.kind() {
            ItemKind::Task {
                date,
                deadline,
                completed,
            } => StoredItem::Task {
                uid,
                name,
                desc,
                date,
                completed,
                deadline,
            },
            ItemKind::Event {
                start_date,
                end_date,
            } => StoredItem::Event {
                uid,
                name,
                desc,
                start_date,
                end_date,
            },
        }
    }

    pub fn into_item(self) -> StorageResult<CalendarItem> {
        let (uid, name, desc, kind) = match self {
            StoredItem::Task {
                uid,
                name,
                desc,
                date,
                completed,
                deadline,
            } => (
                uid,
                name,
                desc,
                ItemKind::Task {
                    date,
                    deadline,
                    completed,
                },
            ),
            StoredItem::Event {
                uid,
                name,
                desc,
                start_date,
                end_date,
            } => (
                uid,
                name,
                desc,
                ItemKind::Event {
                    start_date,
                    end_date,
                },
            ),
        };
        let uid: ItemId = uid
            .parse()
            .map_err(|err| StorageError::InvalidFormat(format!("item uid: {}", err)))?;
        Ok(CalendarItem::with_id(uid, name, kind)?.with_desc(desc))
    }
}

/// Stored subcalendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSubcal {
    pub uid: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub items: Vec<StoredItem>,
}

impl StoredSubcal {
    pub fn from_subcal(subcal: &Subcalendar) -> Self {
        Self {
            uid: subcal.uid().to_string(),
            name: subcal.name().to_string(),
            color: subcal.color().to_string(),
            hidden: subcal.hidden(),
            items: subcal.items().iter().map(StoredItem::from_item).collect(),
        }
    }

    /// Rebuilds the subcalendar; items are re-sorted on insert
    pub fn into_subcal(self) -> StorageResult<Subcalendar> {
        let uid: SubcalId = self
            .uid
            .parse()
            .map_err(|err| StorageError::InvalidFormat(format!("subcalendar uid: {}", err)))?;
        let mut subcal = Subcalendar::with_id(uid, self.name, self.color, self.hidden);
        for item in self.items {
            subcal.insert_item(item.into_item()?)?;
        }
        Ok(subcal)
    }
}

/// Serializes a calendar to pretty-printed JSON
pub fn encode(calendar: &Calendar) -> StorageResult<Vec<u8>> {
    let stored: Vec<StoredSubcal> = calendar
        .subcalendars()
        .iter()
        .map(StoredSubcal::from_subcal)
        .collect();
    Ok(serde_json::to_vec_pretty(&stored)?)
}

/// Parses a calendar file
pub fn decode(bytes: &[u8]) -> StorageResult<Calendar> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if !value.is_array() {
        return Err(StorageError::InvalidFormat(
            "expected a list of subcalendars".to_string(),
        ));
    }
    let stored: Vec<StoredSubcal> = serde_json::from_value(value)?;
    debug!(
        "event=decode module=schema subcals={}",
        stored.len()
    );
    let subcals = stored
        .into_iter()
        .map(StoredSubcal::into_subcal)
        .collect::<StorageResult<Vec<_>>>()?;
    Ok(Calendar::from_subcalendars(subcals)?)
}
