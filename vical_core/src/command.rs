//! Ex command parsing

use std::collections::HashMap;
use thiserror::Error;

/// Command parsing error
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Empty command")]
    EmptyCommand,
}

/// Ex command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExCommand {
    Write,
    Quit,
    ForceQuit,
    WriteQuit,
    Undo,
    Redo,
    NewTask,
    NewEvent,
    Rename,
    Delete,
    Complete,
    NewCal,
    RenameCal,
    DelCal,
    Hide,
    Color,
    Help,
}

impl ExCommand {
    /// Commands that take the rest of the line as a name or color
    pub fn takes_argument(&self) -> bool {
        matches!(
            self,
            ExCommand::NewTask
                | ExCommand::NewEvent
                | ExCommand::Rename
                | ExCommand::NewCal
                | ExCommand::RenameCal
                | ExCommand::Color
        )
    }
}

/// A command name resolved to its command plus the trailing argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: ExCommand,
    /// Trimmed argument text, `None` when absent
    pub arg: Option<String>,
}

/// Command name and alias registry
pub struct CommandTable {
    names: HashMap<&'static str, ExCommand>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    pub fn new() -> Self {
        let entries: &[(&'static str, ExCommand)] = &[
            ("w", ExCommand::Write),
            ("write", ExCommand::Write),
            ("q", ExCommand::Quit),
            ("quit", ExCommand::Quit),
            ("q!", ExCommand::ForceQuit),
            ("quit!", ExCommand::ForceQuit),
            ("wq", ExCommand::WriteQuit),
            ("x", ExCommand::WriteQuit),
            ("writequit", ExCommand::WriteQuit),
            ("undo", ExCommand::Undo),
            ("redo", ExCommand::Redo),
            ("newtask", ExCommand::NewTask),
            ("newevent", ExCommand::NewEvent),
            ("rename", ExCommand::Rename),
            ("delete", ExCommand::Delete),
            ("complete", ExCommand::Complete),
            ("newcal", ExCommand::NewCal),
            ("renamecal", ExCommand::RenameCal),
            ("delcal", ExCommand::DelCal),
            ("hide", ExCommand::Hide),
            ("color", ExCommand::Color),
            ("help", ExCommand::Help),
        ];
        Self {
            names: entries.iter().copied().collect(),
        }
    }

    /// Parses a command line without the leading `:`
    pub fn parse(&self, line: &str) -> Result<ParsedCommand, CommandError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(CommandError::EmptyCommand);
        }
        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };
        let command = self
            .names
            .get(name)
            .copied()
            .ok_or_else(|| CommandError::UnknownCommand(trimmed.to_string()))?;

        let arg = if rest.is_empty() {
            None
        } else if command.takes_argument() {
            Some(rest.to_string())
        } else {
            return Err(CommandError::UnknownCommand(trimmed.to_string()));
        };
        Ok(ParsedCommand { command, arg })
    }

    /// Sorted primary names, for `:help`
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.names.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
