//! Transient parse state for one grammar unit

use crate::key::Key;
use crate::mode::Mode;
use crate::operator::Operator;
use crate::register::RegisterName;

/// A creation command waiting for a motion to space out its copies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCommand {
    NewTask { repeats: u32 },
    NewEvent { repeats: u32 },
}

/// Keys, counts and pending state accumulated while a unit is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdArgs {
    /// Prefix key waiting for its continuation (`g`, `z`, `"`)
    pub key: Option<Key>,
    pub next_key: Option<Key>,
    pub op_pending: Option<Operator>,
    pub motion_pending: Option<PendingCommand>,
    pub count_buffer: String,
    /// Count snapshotted when the pending operator was entered
    pub op_count: u32,
    /// Register for the next operator or paste
    pub regname: RegisterName,
    pub mode: Mode,
}

impl Default for CmdArgs {
    fn default() -> Self {
        Self::new()
    }
}

impl CmdArgs {
    pub fn new() -> Self {
        Self {
            key: None,
            next_key: None,
            op_pending: None,
            motion_pending: None,
            count_buffer: String::new(),
            op_count: 1,
            regname: RegisterName::Unnamed,
            mode: Mode::Normal,
        }
    }

    /// Ends a grammar unit: clears keys, counts and pending commands
    ///
    /// The register name survives; callers reset it once it was used.
    pub fn clear(&mut self) {
        self.clear_keys();
        self.op_pending = None;
        self.motion_pending = None;
        self.count_buffer.clear();
        self.op_count = 1;
        if self.mode == Mode::OperatorPending {
            self.mode = Mode::Normal;
        }
    }

    pub fn clear_keys(&mut self) {
        self.key = None;
        self.next_key = None;
    }

    /// Takes the count buffer as a number, `None` when empty
    pub fn take_count(&mut self) -> Option<u32> {
        if self.count_buffer.is_empty() {
            return None;
        }
        let count = self.count_buffer.parse().unwrap_or(u32::MAX);
        self.count_buffer.clear();
        Some(count)
    }

    /// Takes the count buffer verbatim
    pub fn take_count_str(&mut self) -> String {
        std::mem::take(&mut self.count_buffer)
    }

    /// Status-line rendering of the pending unit, e.g. `"a3d`
    pub fn pending_keys(&self) -> String {
        let mut out = String::new();
        if self.regname != RegisterName::Unnamed {
            out.push('"');
            out.push(self.regname.as_char());
        }
        if self.op_count > 1 {
            out.push_str(&self.op_count.to_string());
        }
        if let Some(op) = self.op_pending {
            out.push(op.as_char());
        }
        out.push_str(&self.count_buffer);
        if let Some(key) = self.key {
            out.push_str(&key.label());
        }
        out
    }
}
