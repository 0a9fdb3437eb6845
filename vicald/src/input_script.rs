//! # Input Script Parser
//!
//! Line-based key scripts for deterministic runs and tests. The interactive
//! host reads the same format from stdin, one line at a time.
//!
//! ## Format
//!
//! - Key names: `Enter`, `Escape`, `Backspace`, `Delete`, `Tab`, `Space`
//! - Arrow keys: `Up`, `Down`, `Left`, `Right`
//! - Redo: `Ctrl+r`
//! - Single characters: `j`, `G`, `:`
//! - Text strings: `"3T5l"` (expanded to individual key presses)
//! - Comments: `# This is a comment`
//!
//! ## Example
//!
//! ```text
//! # New task on the 4th of July
//! "07042026gg"
//! T
//! "dentist"
//! Enter
//! ":wq"
//! Enter
//! ```

use std::collections::VecDeque;
use thiserror::Error;
use vical_core::Key;

/// Input script error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputScriptError {
    #[error("Invalid key name: {0}")]
    InvalidKeyName(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Empty script")]
    EmptyScript,
}

/// Queue of keys parsed from a script
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    keys: VecDeque<Key>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a script from text
    pub fn from_text(text: &str) -> Result<Self, InputScriptError> {
        let keys = Self::parse_keys(text)?;
        if keys.is_empty() {
            return Err(InputScriptError::EmptyScript);
        }
        Ok(Self { keys })
    }

    /// Parses text that may contain only comments or blank lines
    pub fn parse_keys(text: &str) -> Result<VecDeque<Key>, InputScriptError> {
        let mut keys = VecDeque::new();
        for (line_num, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            keys.extend(Self::parse_line(line, line_num + 1)?);
        }
        Ok(keys)
    }

    fn parse_line(line: &str, line_num: usize) -> Result<Vec<Key>, InputScriptError> {
        if line.len() >= 2 && line.starts_with('"') && line.ends_with('"') {
            let text = &line[1..line.len() - 1];
            return Ok(text.chars().map(Key::Char).collect());
        }

        if let Some((modifier, key_name)) = line.split_once('+').filter(|(m, _)| !m.is_empty()) {
            return match modifier.trim().to_ascii_lowercase().as_str() {
                "ctrl" | "control" if key_name.trim().eq_ignore_ascii_case("r") => {
                    Ok(vec![Key::CtrlR])
                }
                "ctrl" | "control" => Err(InputScriptError::ParseError {
                    line: line_num,
                    message: InputScriptError::InvalidKeyName(line.to_string()).to_string(),
                }),
                other => Err(InputScriptError::InvalidModifier(other.to_string())),
            };
        }

        Self::parse_key(line)
            .map(|key| vec![key])
            .map_err(|e| InputScriptError::ParseError {
                line: line_num,
                message: e.to_string(),
            })
    }

    fn parse_key(name: &str) -> Result<Key, InputScriptError> {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(Key::Char(ch));
        }
        match name.to_ascii_lowercase().as_str() {
            "enter" | "return" => Ok(Key::Enter),
            "escape" | "esc" => Ok(Key::Escape),
            "backspace" | "back" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "tab" => Ok(Key::Tab),
            "space" => Ok(Key::Char(' ')),
            "up" | "arrowup" => Ok(Key::Up),
            "down" | "arrowdown" => Ok(Key::Down),
            "left" | "arrowleft" => Ok(Key::Left),
            "right" | "arrowright" => Ok(Key::Right),
            _ => Err(InputScriptError::InvalidKeyName(name.to_string())),
        }
    }

    /// Appends more keys to the end of the queue
    pub fn extend(&mut self, keys: impl IntoIterator<Item = Key>) {
        self.keys.extend(keys);
    }

    pub fn next_key(&mut self) -> Option<Key> {
        self.keys.pop_front()
    }

    pub fn has_more(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_key() {
        let mut script = InputScript::from_text("j").unwrap();
        assert_eq!(script.remaining(), 1);
        assert_eq!(script.next_key(), Some(Key::Char('j')));
        assert!(!script.has_more());
    }

    #[test]
    fn test_parse_special_keys() {
        let mut script = InputScript::from_text("Enter\nEscape\nBackspace\nSpace\nLeft").unwrap();
        assert_eq!(script.next_key(), Some(Key::Enter));
        assert_eq!(script.next_key(), Some(Key::Escape));
        assert_eq!(script.next_key(), Some(Key::Backspace));
        assert_eq!(script.next_key(), Some(Key::Char(' ')));
        assert_eq!(script.next_key(), Some(Key::Left));
    }

    #[test]
    fn test_parse_ctrl_r() {
        let mut script = InputScript::from_text("Ctrl+r").unwrap();
        assert_eq!(script.next_key(), Some(Key::CtrlR));
    }

    #[test]
    fn test_plus_is_a_key() {
        let mut script = InputScript::from_text("+").unwrap();
        assert_eq!(script.next_key(), Some(Key::Char('+')));
    }

    #[test]
    fn test_parse_quoted_string() {
        let mut script = InputScript::from_text(r#""3T5l""#).unwrap();
        assert_eq!(script.remaining(), 4);
        assert_eq!(script.next_key(), Some(Key::Char('3')));
        assert_eq!(script.next_key(), Some(Key::Char('T')));
    }

    #[test]
    fn test_parse_comments_and_blank_lines() {
        let script = InputScript::from_text("# Comment\nj\n\n# Another\nk").unwrap();
        assert_eq!(script.remaining(), 2);
    }

    #[test]
    fn test_empty_script_error() {
        assert!(matches!(
            InputScript::from_text("# Just comments"),
            Err(InputScriptError::EmptyScript)
        ));
    }

    #[test]
    fn test_invalid_key_name() {
        assert!(matches!(
            InputScript::from_text("Bogus"),
            Err(InputScriptError::ParseError { line: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_modifier() {
        assert!(matches!(
            InputScript::from_text("Hyper+a"),
            Err(InputScriptError::InvalidModifier(_))
        ));
    }

    #[test]
    fn test_complex_script() {
        let script = InputScript::from_text(
            r#"
            # Add a task and save
            T
            Enter
            ":wq"
            Enter
        "#,
        )
        .unwrap();
        // T + Enter + 3 chars (:wq) + Enter = 6
        assert_eq!(script.remaining(), 6);
    }
}
