//! Input modes

use serde::{Deserialize, Serialize};

/// Dispatcher mode; exactly one is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Navigation, operators and actions
    #[default]
    Normal,
    /// Date-range selection anchored where `v` was pressed
    Visual,
    /// An operator is waiting for its motion
    OperatorPending,
    /// Ex command line after `:`
    ExCommand,
    /// Free-text prompt (names, colors, confirmations)
    Prompt,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Visual => "VISUAL",
            Mode::OperatorPending => "OP-PENDING",
            Mode::ExCommand => "COMMAND",
            Mode::Prompt => "PROMPT",
        }
    }

    /// Modes that read text instead of grammar keys
    pub fn is_line_input(&self) -> bool {
        matches!(self, Mode::ExCommand | Mode::Prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_strings() {
        assert_eq!(Mode::Normal.as_str(), "NORMAL");
        assert_eq!(Mode::Visual.as_str(), "VISUAL");
        assert_eq!(Mode::ExCommand.as_str(), "COMMAND");
        assert!(Mode::Prompt.is_line_input());
        assert!(!Mode::OperatorPending.is_line_input());
    }
}
