//! Platform-independent key representation

use serde::{Deserialize, Serialize};

/// Platform-independent key event
///
/// Printable input (including space) arrives as `Char`; everything the
/// grammar treats specially has its own variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    // Printable characters
    Char(char),

    // Navigation
    Left,
    Right,
    Up,
    Down,

    // Special keys
    Enter,
    Backspace,
    Delete,
    Escape,
    Tab,

    // Modifiers (for Ctrl+R etc)
    CtrlR,
}

impl Key {
    /// Convert ASCII byte to Key (for raw terminal or script translation)
    pub fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            0x1B => Some(Key::Escape),
            0x12 => Some(Key::CtrlR),
            0x08 | 0x7F => Some(Key::Backspace),
            b'\r' | b'\n' => Some(Key::Enter),
            b'\t' => Some(Key::Tab),
            ch if (0x20..0x7F).contains(&ch) => Some(Key::Char(ch as char)),
            _ => None,
        }
    }

    /// Returns the printable character, if any
    pub fn as_char(&self) -> Option<char> {
        match self {
            Key::Char(ch) => Some(*ch),
            _ => None,
        }
    }

    /// Returns the digit value for `0`-`9`
    pub fn digit(&self) -> Option<u32> {
        self.as_char().and_then(|ch| ch.to_digit(10))
    }

    pub fn is_uppercase(&self) -> bool {
        matches!(self, Key::Char(ch) if ch.is_ascii_uppercase())
    }

    /// Short label used by the status line for pending keys
    pub fn label(&self) -> String {
        match self {
            Key::Char(' ') => "<Space>".into(),
            Key::Char(ch) => ch.to_string(),
            Key::Left => "<Left>".into(),
            Key::Right => "<Right>".into(),
            Key::Up => "<Up>".into(),
            Key::Down => "<Down>".into(),
            Key::Enter => "<CR>".into(),
            Key::Backspace => "<BS>".into(),
            Key::Delete => "<Del>".into(),
            Key::Escape => "<Esc>".into(),
            Key::Tab => "<Tab>".into(),
            Key::CtrlR => "^R".into(),
        }
    }
}

impl From<char> for Key {
    fn from(ch: char) -> Self {
        Key::Char(ch)
    }
}
