//! # Host Runtime
//!
//! The event loop: next key, dispatcher, I/O requests, render.

use crate::input_script::{InputScript, InputScriptError};
use crate::logging::LoggingError;
use crate::render::CalendarView;
use chrono::NaiveDate;
use log::{debug, error, info, warn};
use std::io::{BufRead, Write};
use thiserror::Error;
use vical_core::{CoreIoRequest, CoreOutcome, Dispatcher, Editor, Key, Settings};
use vical_storage::{CalendarStore, StorageError};

/// Host error types
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Script error: {0}")]
    Script(#[from] InputScriptError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid date: {0} (expected YYYYMMDD)")]
    InvalidDate(String),
}

/// Parses the `--today` override
pub fn parse_today(raw: &str) -> Result<NaiveDate, HostError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y%m%d")
        .map_err(|_| HostError::InvalidDate(raw.to_string()))
}

/// Host runtime configuration
#[derive(Debug, Clone)]
pub struct HostRuntimeConfig {
    /// Optional input script; without one the host reads stdin
    pub script: Option<String>,
    /// Maximum keys to process (0 = unlimited)
    pub max_steps: usize,
    /// Date the cursor starts on
    pub today: NaiveDate,
    pub settings: Settings,
}

impl HostRuntimeConfig {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            script: None,
            max_steps: 0,
            today,
            settings: Settings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostState {
    Running,
    Shutdown,
}

/// Host runtime
pub struct HostRuntime<S: CalendarStore> {
    config: HostRuntimeConfig,
    store: S,
    editor: Editor,
    dispatcher: Dispatcher,
    view: CalendarView,
    script: InputScript,
    state: HostState,
    steps: usize,
}

impl<S: CalendarStore> HostRuntime<S> {
    /// Loads the calendar from `store` and parses the script, if any
    pub fn new(config: HostRuntimeConfig, store: S) -> Result<Self, HostError> {
        let script = match &config.script {
            Some(text) => InputScript::from_text(text)?,
            None => InputScript::new(),
        };
        let calendar = store.load()?;
        info!(
            "event=host_start module=runtime subcals={} items={} scripted={}",
            calendar.subcal_count(),
            calendar.item_count(),
            config.script.is_some()
        );
        let editor = Editor::new(calendar, config.settings.clone(), config.today);

        Ok(Self {
            config,
            store,
            editor,
            dispatcher: Dispatcher::default(),
            view: CalendarView::default(),
            script,
            state: HostState::Running,
            steps: 0,
        })
    }

    /// Runs until the script is exhausted, the editor quits or the step
    /// limit is reached
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<(), HostError> {
        self.render_to(out)?;
        self.drain(out)
    }

    // Renders whenever the editor asks for it, and once more at the end if
    // the last keys only changed dispatcher state.
    fn drain<W: Write>(&mut self, out: &mut W) -> Result<(), HostError> {
        let mut stale = false;
        while self.state == HostState::Running {
            if self.config.max_steps > 0 && self.steps >= self.config.max_steps {
                info!(
                    "event=host_stop module=runtime reason=max_steps steps={}",
                    self.steps
                );
                break;
            }
            let Some(key) = self.script.next_key() else {
                break;
            };
            self.step(key);
            stale = !self.editor.take_redraw();
            if !stale {
                self.render_to(out)?;
            }
        }
        if stale {
            self.render_to(out)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Reads script lines from `input` until EOF or quit
    ///
    /// A line that does not parse is reported and skipped.
    pub fn run_interactive<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
    ) -> Result<(), HostError> {
        self.render_to(out)?;
        for line in input.lines() {
            let line = line?;
            match InputScript::parse_keys(&line) {
                Ok(keys) => self.script.extend(keys),
                Err(err) => {
                    warn!("event=script_line_rejected module=runtime error={}", err);
                    writeln!(out, "{}", err)?;
                    continue;
                }
            }
            self.drain(out)?;
            if self.is_shutdown() {
                break;
            }
        }
        Ok(())
    }

    /// Feeds one key and services the outcome
    pub fn step(&mut self, key: Key) -> CoreOutcome {
        self.steps += 1;
        let outcome = self.dispatcher.feed(&mut self.editor, key);
        debug!(
            "event=host_step module=runtime step={} mode={}",
            self.steps,
            self.dispatcher.mode().as_str()
        );

        match &outcome {
            CoreOutcome::RequestIo(CoreIoRequest::Save) => {
                self.save();
            }
            CoreOutcome::RequestIo(CoreIoRequest::SaveAndQuit) => {
                if self.save() {
                    self.shutdown("write_quit");
                }
            }
            CoreOutcome::RequestExit { forced } => {
                self.shutdown(if *forced { "force_quit" } else { "quit" });
            }
            _ => {}
        }
        outcome
    }

    fn save(&mut self) -> bool {
        match self.store.save(self.editor.calendar()) {
            Ok(()) => {
                self.editor.mark_saved();
                let count = self.editor.calendar().subcal_count();
                self.editor
                    .notify(format!("{} subcalendar(s) written", count));
                true
            }
            Err(err) => {
                error!("event=save_failed module=runtime error={}", err);
                self.editor.notify_error(format!("Save failed: {}", err));
                false
            }
        }
    }

    fn shutdown(&mut self, reason: &str) {
        info!(
            "event=host_stop module=runtime reason={} steps={}",
            reason, self.steps
        );
        self.state = HostState::Shutdown;
    }

    fn render_to<W: Write>(&self, out: &mut W) -> Result<(), HostError> {
        out.write_all(self.render().as_bytes())?;
        Ok(())
    }

    /// Current screen as text
    pub fn render(&self) -> String {
        self.view.render(&self.editor, &self.dispatcher)
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_shutdown(&self) -> bool {
        self.state == HostState::Shutdown
    }
}
