//! Calendar items: tasks and events

use super::{ModelError, ModelResult};
use crate::ids::ItemId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind-specific fields of a calendar item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemKind {
    /// A to-do on a single day, optionally with a deadline
    Task {
        date: NaiveDate,
        deadline: Option<NaiveDate>,
        completed: bool,
    },
    /// A span of one or more days, `end_date >= start_date`
    Event {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// Ordering key for items inside a subcalendar
///
/// Events sort before tasks on the same date (`type_rank` 0 vs 1). The uid
/// only breaks ties between otherwise equal keys so that a removed item
/// re-inserted by undo lands in exactly the same slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub date: NaiveDate,
    pub type_rank: u8,
    pub name: String,
    pub uid: ItemId,
}

/// Item attribute names, for logging and error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemField {
    Name,
    Desc,
    Completed,
    Date,
    Deadline,
    StartDate,
    EndDate,
}

impl ItemField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemField::Name => "name",
            ItemField::Desc => "desc",
            ItemField::Completed => "completed",
            ItemField::Date => "date",
            ItemField::Deadline => "deadline",
            ItemField::StartDate => "start_date",
            ItemField::EndDate => "end_date",
        }
    }
}

/// A single attribute value, as captured by `SetAttr` ops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemAttr {
    Name(String),
    Desc(String),
    Completed(bool),
    Date(NaiveDate),
    Deadline(Option<NaiveDate>),
    StartDate(NaiveDate),
    EndDate(NaiveDate),
}

impl ItemAttr {
    pub fn field(&self) -> ItemField {
        match self {
            ItemAttr::Name(_) => ItemField::Name,
            ItemAttr::Desc(_) => ItemField::Desc,
            ItemAttr::Completed(_) => ItemField::Completed,
            ItemAttr::Date(_) => ItemField::Date,
            ItemAttr::Deadline(_) => ItemField::Deadline,
            ItemAttr::StartDate(_) => ItemField::StartDate,
            ItemAttr::EndDate(_) => ItemField::EndDate,
        }
    }
}

/// A task or event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    uid: ItemId,
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    desc: String,
    #[serde(flatten)]
    kind: ItemKind,
}

impl CalendarItem {
    /// Creates an incomplete task with a fresh uid
    pub fn task(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            uid: ItemId::new(),
            name: name.into(),
            desc: String::new(),
            kind: ItemKind::Task {
                date,
                deadline: None,
                completed: false,
            },
        }
    }

    /// Creates an event with a fresh uid
    pub fn event(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ModelResult<Self> {
        Self::with_id(
            ItemId::new(),
            name,
            ItemKind::Event {
                start_date,
                end_date,
            },
        )
    }

    /// Creates an item with a caller-provided uid
    ///
    /// Used by the load path where identity already exists on disk.
    pub fn with_id(uid: ItemId, name: impl Into<String>, kind: ItemKind) -> ModelResult<Self> {
        if let ItemKind::Event {
            start_date,
            end_date,
        } = kind
        {
            if end_date < start_date {
                return Err(ModelError::InvalidEventRange {
                    start: start_date,
                    end: end_date,
                });
            }
        }
        Ok(Self {
            uid,
            name: name.into(),
            desc: String::new(),
            kind,
        })
    }

    /// Sets the free-text description
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    /// Sets the deadline of a freshly built task
    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        if let ItemKind::Task { deadline: d, .. } = &mut self.kind {
            *d = deadline;
        }
        self
    }

    /// Sets the completion flag of a freshly built task
    pub fn with_completed(mut self, completed: bool) -> Self {
        if let ItemKind::Task { completed: c, .. } = &mut self.kind {
            *c = completed;
        }
        self
    }

    pub fn uid(&self) -> &ItemId {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn desc(&self) -> &str {
        &self.desc
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn is_task(&self) -> bool {
        matches!(self.kind, ItemKind::Task { .. })
    }

    pub fn is_event(&self) -> bool {
        matches!(self.kind, ItemKind::Event { .. })
    }

    /// Completion flag, `None` for events
    pub fn completed(&self) -> Option<bool> {
        match self.kind {
            ItemKind::Task { completed, .. } => Some(completed),
            ItemKind::Event { .. } => None,
        }
    }

    /// Task date or event start date
    pub fn effective_date(&self) -> NaiveDate {
        match self.kind {
            ItemKind::Task { date, .. } => date,
            ItemKind::Event { start_date, .. } => start_date,
        }
    }

    /// Tasks occur on their date and on their deadline; events on every day
    /// of their span.
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        match self.kind {
            ItemKind::Task { date, deadline, .. } => date == day || deadline == Some(day),
            ItemKind::Event {
                start_date,
                end_date,
            } => start_date <= day && day <= end_date,
        }
    }

    /// Earliest day inside `start..=end` on which the item occurs
    pub fn first_day_within(&self, start: NaiveDate, end: NaiveDate) -> Option<NaiveDate> {
        let inside = |day: NaiveDate| start <= day && day <= end;
        match self.kind {
            ItemKind::Task { date, deadline, .. } => [Some(date), deadline]
                .into_iter()
                .flatten()
                .filter(|day| inside(*day))
                .min(),
            ItemKind::Event {
                start_date,
                end_date,
            } => (start_date <= end && start <= end_date).then(|| start_date.max(start)),
        }
    }

    /// Number of days spanned, inclusive. Tasks span one day.
    pub fn duration_days(&self) -> i64 {
        match self.kind {
            ItemKind::Task { .. } => 1,
            ItemKind::Event {
                start_date,
                end_date,
            } => (end_date - start_date).num_days() + 1,
        }
    }

    pub fn type_rank(&self) -> u8 {
        match self.kind {
            ItemKind::Event { .. } => 0,
            ItemKind::Task { .. } => 1,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        SortKey {
            date: self.effective_date(),
            type_rank: self.type_rank(),
            name: self.name.to_lowercase(),
            uid: self.uid.clone(),
        }
    }

    /// Reads the current value of an attribute
    pub fn get_attr(&self, field: ItemField) -> ModelResult<ItemAttr> {
        let value = match (field, &self.kind) {
            (ItemField::Name, _) => ItemAttr::Name(self.name.clone()),
            (ItemField::Desc, _) => ItemAttr::Desc(self.desc.clone()),
            (ItemField::Completed, ItemKind::Task { completed, .. }) => {
                ItemAttr::Completed(*completed)
            }
            (ItemField::Date, ItemKind::Task { date, .. }) => ItemAttr::Date(*date),
            (ItemField::Deadline, ItemKind::Task { deadline, .. }) => ItemAttr::Deadline(*deadline),
            (ItemField::StartDate, ItemKind::Event { start_date, .. }) => {
                ItemAttr::StartDate(*start_date)
            }
            (ItemField::EndDate, ItemKind::Event { end_date, .. }) => ItemAttr::EndDate(*end_date),
            _ => return Err(self.mismatch(field)),
        };
        Ok(value)
    }

    /// Replaces an attribute, returning the previous value
    ///
    /// Only the op layer calls this; the owning subcalendar must re-sort
    /// afterwards because names and dates are part of the sort key.
    pub(crate) fn set_attr(&mut self, attr: ItemAttr) -> ModelResult<ItemAttr> {
        let field = attr.field();
        let old = self.get_attr(field)?;
        match (attr, &mut self.kind) {
            (ItemAttr::Name(name), _) => self.name = name,
            (ItemAttr::Desc(desc), _) => self.desc = desc,
            (ItemAttr::Completed(value), ItemKind::Task { completed, .. }) => *completed = value,
            (ItemAttr::Date(value), ItemKind::Task { date, .. }) => *date = value,
            (ItemAttr::Deadline(value), ItemKind::Task { deadline, .. }) => *deadline = value,
            (
                ItemAttr::StartDate(value),
                ItemKind::Event {
                    start_date,
                    end_date,
                },
            ) => {
                if *end_date < value {
                    return Err(ModelError::InvalidEventRange {
                        start: value,
                        end: *end_date,
                    });
                }
                *start_date = value;
            }
            (
                ItemAttr::EndDate(value),
                ItemKind::Event {
                    start_date,
                    end_date,
                },
            ) => {
                if value < *start_date {
                    return Err(ModelError::InvalidEventRange {
                        start: *start_date,
                        end: value,
                    });
                }
                *end_date = value;
            }
            _ => return Err(self.mismatch(field)),
        }
        Ok(old)
    }

    fn mismatch(&self, field: ItemField) -> ModelError {
        ModelError::AttrKindMismatch {
            item: self.uid.clone(),
            attr: field.as_str(),
        }
    }
}
