//! Entity model: subcalendars and the tasks/events they own
//!
//! ## Invariants
//!
//! - A subcalendar exclusively owns its items and keeps them sorted by
//!   `(effective_date, type_rank, name_lowercased)`
//! - `Calendar` keeps an item -> owning subcalendar lookup table in step with
//!   the subcalendars, instead of items pointing back at their owner
//! - Once a subcalendar is inside a `Calendar`, it can only be changed through
//!   the op layer in `crate::history`

pub mod calendar;
pub mod item;
pub mod subcalendar;

pub use calendar::Calendar;
pub use item::{CalendarItem, ItemAttr, ItemField, ItemKind, SortKey};
pub use subcalendar::{SubcalAttr, SubcalField, Subcalendar};

use crate::ids::{ItemId, SubcalId};
use chrono::NaiveDate;
use thiserror::Error;

/// Model consistency error
///
/// Every variant except `DateOutOfRange` signals that an operation
/// referenced state which does not exist or would break a model invariant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Subcalendar not found: {0}")]
    SubcalNotFound(SubcalId),

    #[error("Item already present: {0}")]
    DuplicateItem(ItemId),

    #[error("Subcalendar already present: {0}")]
    DuplicateSubcal(SubcalId),

    #[error("Event end {end} is before start {start}")]
    InvalidEventRange { start: NaiveDate, end: NaiveDate },

    #[error("Attribute {attr} does not apply to item {item}")]
    AttrKindMismatch { item: ItemId, attr: &'static str },

    #[error("Subcalendar index out of range: {0}")]
    SubcalIndexOutOfRange(usize),

    #[error("Item is already in subcalendar {0}")]
    SameSubcalendar(SubcalId),

    #[error("Date out of range")]
    DateOutOfRange,
}

/// Model result
pub type ModelResult<T> = Result<T, ModelError>;
