//! Register store: immutable item snapshots for yank, delete and paste
//!
//! Registers never hold live items. A payload captures what is needed to
//! rebuild an item later, and paste always mints a fresh uid.

use crate::ids::SubcalId;
use crate::model::{CalendarItem, ItemKind, ModelError, ModelResult};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// Number of numbered delete-history registers (`1`-`9`)
const DELETE_HISTORY: usize = 9;

/// A parsed register name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RegisterName {
    /// `"`
    #[default]
    Unnamed,
    /// `0`-`9`
    Numbered(u8),
    /// `a`-`z`; `append` is set when the name was given in uppercase
    Named { letter: char, append: bool },
    /// `_`
    BlackHole,
}

impl RegisterName {
    /// Parses a register key, `None` for characters that name no register
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '"' => Some(RegisterName::Unnamed),
            '_' => Some(RegisterName::BlackHole),
            '0'..='9' => Some(RegisterName::Numbered(ch as u8 - b'0')),
            'a'..='z' => Some(RegisterName::Named {
                letter: ch,
                append: false,
            }),
            'A'..='Z' => Some(RegisterName::Named {
                letter: ch.to_ascii_lowercase(),
                append: true,
            }),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            RegisterName::Unnamed => '"',
            RegisterName::BlackHole => '_',
            RegisterName::Numbered(n) => (b'0' + n) as char,
            RegisterName::Named { letter, append } => {
                if *append {
                    letter.to_ascii_uppercase()
                } else {
                    *letter
                }
            }
        }
    }

    fn slot(&self) -> Option<Slot> {
        match self {
            RegisterName::Unnamed => Some(Slot::Unnamed),
            RegisterName::Numbered(n) => Some(Slot::Numbered(*n)),
            RegisterName::Named { letter, .. } => Some(Slot::Named(*letter)),
            RegisterName::BlackHole => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Slot {
    Unnamed,
    Numbered(u8),
    Named(char),
}

/// Reconstructable item fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadData {
    Task {
        name: String,
        desc: String,
        date: NaiveDate,
        completed: bool,
        deadline: Option<NaiveDate>,
    },
    Event {
        name: String,
        desc: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// Immutable snapshot of one item plus the subcalendar it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterPayload {
    origin: SubcalId,
    data: PayloadData,
}

impl RegisterPayload {
    pub fn from_item(item: &CalendarItem, origin: &SubcalId) -> Self {
        let data = match *item.kind() {
            ItemKind::Task {
                date,
                deadline,
                completed,
            } => PayloadData::Task {
                name: item.name().to_string(),
                desc: item.desc().to_string(),
                date,
                completed,
                deadline,
            },
            ItemKind::Event {
                start_date,
                end_date,
            } => PayloadData::Event {
                name: item.name().to_string(),
                desc: item.desc().to_string(),
                start_date,
                end_date,
            },
        };
        Self {
            origin: origin.clone(),
            data,
        }
    }

    pub fn origin(&self) -> &SubcalId {
        &self.origin
    }

    pub fn data(&self) -> &PayloadData {
        &self.data
    }

    pub fn kind(&self) -> &'static str {
        match self.data {
            PayloadData::Task { .. } => "task",
            PayloadData::Event { .. } => "event",
        }
    }

    pub fn name(&self) -> &str {
        match &self.data {
            PayloadData::Task { name, .. } | PayloadData::Event { name, .. } => name,
        }
    }

    /// Builds a new item on `date` with a fresh uid
    ///
    /// Tasks move to `date`; events start on `date` and keep their length.
    /// Fails with [`ModelError::DateOutOfRange`] when the span would run
    /// past the last representable date.
    pub fn instantiate(&self, date: NaiveDate) -> ModelResult<CalendarItem> {
        match &self.data {
            PayloadData::Task {
                name,
                desc,
                completed,
                deadline,
                ..
            } => Ok(CalendarItem::task(name.clone(), date)
                .with_desc(desc.clone())
                .with_completed(*completed)
                .with_deadline(*deadline)),
            PayloadData::Event {
                name,
                desc,
                start_date,
                end_date,
            } => {
                let span = *end_date - *start_date;
                let end = date
                    .checked_add_signed(span)
                    .ok_or(ModelError::DateOutOfRange)?;
                Ok(CalendarItem::event(name.clone(), date, end)?.with_desc(desc.clone()))
            }
        }
    }

    /// Inclusive day count of the rebuilt item
    pub fn span_days(&self) -> i64 {
        match &self.data {
            PayloadData::Task { .. } => 1,
            PayloadData::Event {
                start_date,
                end_date,
                ..
            } => (*end_date - *start_date + Duration::days(1)).num_days(),
        }
    }
}

/// Unnamed, numbered and named registers
#[derive(Debug, Clone, Default)]
pub struct RegisterStore {
    slots: HashMap<Slot, Vec<RegisterPayload>>,
}

impl RegisterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores payloads
    ///
    /// The unnamed register always receives them. A yank (`rotate == false`)
    /// also fills `0`; a delete shifts `1`..`8` into `2`..`9` and fills `1`.
    /// A named target is overwritten, or appended to for uppercase names.
    /// The black hole discards everything and touches no register.
    pub fn write(&mut self, name: RegisterName, payloads: Vec<RegisterPayload>, rotate: bool) {
        if name == RegisterName::BlackHole {
            return;
        }

        self.slots.insert(Slot::Unnamed, payloads.clone());

        if rotate {
            for n in (2..=DELETE_HISTORY as u8).rev() {
                match self.slots.remove(&Slot::Numbered(n - 1)) {
                    Some(prev) => {
                        self.slots.insert(Slot::Numbered(n), prev);
                    }
                    None => {
                        self.slots.remove(&Slot::Numbered(n));
                    }
                }
            }
            self.slots.insert(Slot::Numbered(1), payloads.clone());
        } else {
            self.slots.insert(Slot::Numbered(0), payloads.clone());
        }

        match name {
            RegisterName::Named {
                letter,
                append: true,
            } => self
                .slots
                .entry(Slot::Named(letter))
                .or_default()
                .extend(payloads),
            RegisterName::Named { letter, .. } => {
                self.slots.insert(Slot::Named(letter), payloads);
            }
            RegisterName::Numbered(n) => {
                self.slots.insert(Slot::Numbered(n), payloads);
            }
            RegisterName::Unnamed | RegisterName::BlackHole => {}
        }
    }

    /// Copies out a register's payloads; empty when unset
    pub fn get(&self, name: RegisterName) -> Vec<RegisterPayload> {
        name.slot()
            .and_then(|slot| self.slots.get(&slot))
            .cloned()
            .unwrap_or_default()
    }

    pub fn clear(&mut self, name: RegisterName) {
        if let Some(slot) = name.slot() {
            self.slots.remove(&slot);
        }
    }
}
