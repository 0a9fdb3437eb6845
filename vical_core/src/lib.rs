//! # Vical Core
//!
//! Modal calendar editing logic shared by every host.
//!
//! ## Philosophy
//!
//! - **Deterministic**: Same key trace and start date => same calendar state
//! - **Modal editing**: Normal, Visual, Operator-pending, Command, Prompt modes
//! - **Everything undoable**: Model changes only happen inside transactions
//! - **Mechanism over policy**: Core provides editing primitives, hosts decide rendering
//! - **No ambient authority**: IO requests are explicit, never automatic
//!
//! ## Design
//!
//! The core provides:
//! - Calendar: Subcalendars of tasks and events with sorted item lists
//! - TransactionLog: Bounded undo/redo over self-inverting ops
//! - RegisterStore: Vim-style yank/delete registers
//! - Dispatcher: Key grammar (counts, operators, motions, prefixes)
//! - CalendarSnapshot: Deterministic state for parity testing

pub mod actions;
pub mod cmdargs;
pub mod command;
pub mod dateparse;
pub mod dispatcher;
pub mod editor;
pub mod history;
pub mod ids;
pub mod key;
pub mod keymap;
pub mod mode;
pub mod model;
pub mod motion;
pub mod operator;
pub mod register;
pub mod selection;
pub mod settings;
pub mod snapshot;

pub use command::{CommandError, CommandTable, ExCommand};
pub use dateparse::{parse_date_string, DateParseError};
pub use dispatcher::{CoreIoRequest, CoreOutcome, Dispatcher, Prompt, PromptAction};
pub use editor::{Editor, StatusLine};
pub use history::{HistoryError, HistoryResult, Op, Transaction, TransactionLog, TxId};
pub use ids::{EmptyIdError, ItemId, SubcalId};
pub use key::Key;
pub use mode::Mode;
pub use model::{Calendar, CalendarItem, ItemKind, ModelError, ModelResult, Subcalendar};
pub use motion::Motion;
pub use operator::Operator;
pub use register::{RegisterName, RegisterPayload, RegisterStore};
pub use settings::{DateFormat, Settings};
pub use snapshot::CalendarSnapshot;
