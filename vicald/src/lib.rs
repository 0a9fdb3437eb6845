//! # Vical Host Runtime
//!
//! The process around the editor core.
//!
//! ## Philosophy
//!
//! - **Host owns I/O**: the core never reads files or prints
//! - **Output is snapshot rendering**: each frame is plain text, not terminal state
//! - **Input is explicit keys**: scripts and stdin lines share one format
//! - **Deterministic mode is first-class**: `--today` and `--script` for tests
//!
//! ## Responsibilities
//!
//! The host:
//! - Loads settings and the calendar, starts file logging
//! - Runs the event loop (key → dispatcher → I/O request → render)
//! - Saves through a [`vical_storage::CalendarStore`] and reports failures
//!   on the status line
//!
//! ## Non-Responsibilities
//!
//! The host does NOT:
//! - Interpret keys; the dispatcher owns the grammar
//! - Provide terminal emulation (ANSI/VT codes, colors, raw mode)
//! - Decide whether quitting is allowed; it only acts on exit requests

pub mod input_script;
pub mod logging;
pub mod render;
pub mod runtime;

pub use input_script::{InputScript, InputScriptError};
pub use logging::{default_log_dir, default_log_level, init_logging, LoggingError};
pub use render::CalendarView;
pub use runtime::{parse_today, HostError, HostRuntime, HostRuntimeConfig};
