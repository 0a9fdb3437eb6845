//! Normal/visual key bindings

use crate::key::Key;
use crate::operator::Operator;
use std::collections::HashMap;

/// Keys that produce a motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKey {
    /// Relative day move, scaled by the count
    DateDelta(i64),
    /// Relative move within the selected day's items, scaled by the count
    ItemDelta(i64),
    /// Count buffer read as a date
    Goto,
    MonthEnd,
    WeekStart,
    WeekEnd,
    /// Back to the date selected before the last goto
    UnGoto,
}

impl MotionKey {
    /// Absolute motions ignore counts
    pub fn is_relative(&self) -> bool {
        matches!(self, MotionKey::DateDelta(_) | MotionKey::ItemDelta(_))
    }
}

/// Keys that wait for a second key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    G,
    Z,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Undo,
    Redo,
    Paste { to_original: bool },
    NewTask,
    NewEvent,
    ToggleVisual,
    PrevSubcal,
    NextSubcal,
    EnterExMode,
    ToggleHidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalCommand {
    Motion(MotionKey),
    Operator(Operator),
    /// Space: pending operator on the selected item, or toggle-complete
    SingleUnit,
    Prefix(Prefix),
    Action(Action),
}

/// Key tables for NORMAL and VISUAL mode
#[derive(Debug, Clone)]
pub struct Keymap {
    normal: HashMap<Key, NormalCommand>,
    g_prefix: HashMap<char, MotionKey>,
    z_prefix: HashMap<char, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::default_bindings()
    }
}

impl Keymap {
    pub fn default_bindings() -> Self {
        use NormalCommand as N;

        let mut normal = HashMap::new();
        for (key, delta) in [
            (Key::Char('h'), -1),
            (Key::Left, -1),
            (Key::Char('l'), 1),
            (Key::Right, 1),
            (Key::Char('k'), -7),
            (Key::Up, -7),
            (Key::Char('j'), 7),
            (Key::Down, 7),
        ] {
            normal.insert(key, N::Motion(MotionKey::DateDelta(delta)));
        }
        normal.insert(Key::Char('G'), N::Motion(MotionKey::MonthEnd));
        normal.insert(Key::Char('`'), N::Motion(MotionKey::UnGoto));

        for ch in ['d', 'y', 'c', 'x', 'D', 'Y', 'C', 'X'] {
            if let Some(op) = Operator::from_char(ch) {
                normal.insert(Key::Char(ch), N::Operator(op));
            }
        }
        normal.insert(Key::Char(' '), N::SingleUnit);

        normal.insert(Key::Char('g'), N::Prefix(Prefix::G));
        normal.insert(Key::Char('z'), N::Prefix(Prefix::Z));
        normal.insert(Key::Char('"'), N::Prefix(Prefix::Register));

        let actions = [
            (Key::Char('u'), Action::Undo),
            (Key::Char('U'), Action::Redo),
            (Key::CtrlR, Action::Redo),
            (Key::Char('p'), Action::Paste { to_original: true }),
            (Key::Char('P'), Action::Paste { to_original: false }),
            (Key::Char('T'), Action::NewTask),
            (Key::Char('E'), Action::NewEvent),
            (Key::Char('v'), Action::ToggleVisual),
            (Key::Char('['), Action::PrevSubcal),
            (Key::Char(']'), Action::NextSubcal),
            (Key::Char(':'), Action::EnterExMode),
        ];
        for (key, action) in actions {
            normal.insert(key, N::Action(action));
        }

        let g_prefix = HashMap::from([
            ('g', MotionKey::Goto),
            ('0', MotionKey::WeekStart),
            ('$', MotionKey::WeekEnd),
            ('j', MotionKey::ItemDelta(1)),
            ('k', MotionKey::ItemDelta(-1)),
        ]);
        let z_prefix = HashMap::from([('c', Action::ToggleHidden)]);

        Self {
            normal,
            g_prefix,
            z_prefix,
        }
    }

    pub fn lookup(&self, key: Key) -> Option<NormalCommand> {
        self.normal.get(&key).copied()
    }

    /// Resolves a prefix continuation; `None` means the pair is unbound
    pub fn lookup_prefixed(&self, prefix: Prefix, next: Key) -> Option<NormalCommand> {
        let ch = next.as_char()?;
        match prefix {
            Prefix::G => self.g_prefix.get(&ch).map(|m| NormalCommand::Motion(*m)),
            Prefix::Z => self.z_prefix.get(&ch).map(|a| NormalCommand::Action(*a)),
            Prefix::Register => None,
        }
    }

    /// Rebinds a key, returning the previous binding
    pub fn bind(&mut self, key: Key, command: NormalCommand) -> Option<NormalCommand> {
        self.normal.insert(key, command)
    }
}
