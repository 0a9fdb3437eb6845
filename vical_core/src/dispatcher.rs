//! Grammar dispatcher: turns the key stream into motions, operators and
//! actions
//!
//! One [`Dispatcher::feed`] call per key. Keys accumulate in [`CmdArgs`]
//! until a unit is complete (a motion, an operator with its motion or
//! single-unit trigger, an action); the unit then runs against the
//! [`Editor`] and the parse state is cleared.

use crate::actions;
use crate::cmdargs::{CmdArgs, PendingCommand};
use crate::command::{CommandError, CommandTable, ExCommand};
use crate::dateparse::parse_date_string;
use crate::editor::Editor;
use crate::history::{HistoryError, HistoryResult};
use crate::ids::{ItemId, SubcalId};
use crate::key::Key;
use crate::keymap::{Action, Keymap, MotionKey, NormalCommand, Prefix};
use crate::mode::Mode;
use crate::motion::{self, Motion};
use crate::operator::{self, OpArgs, Operator};
use crate::register::RegisterName;
use chrono::{Duration, NaiveDate};
use log::{debug, error, info};

/// IO request from the dispatcher to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreIoRequest {
    /// Save the calendar
    Save,
    /// Save, then exit if the save succeeded
    SaveAndQuit,
}

/// Outcome of feeding one key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreOutcome {
    /// Key consumed, nothing visible changed
    Continue,
    /// State changed (model, selection or mode)
    Changed,
    /// Display a status message
    StatusMessage(String),
    /// `:q` refused because of unsaved changes
    QuitBlocked,
    /// Request to exit the editor
    RequestExit { forced: bool },
    /// Request IO operation from host
    RequestIo(CoreIoRequest),
}

/// What a prompt does with its text on Enter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAction {
    NewTasks {
        dates: Vec<NaiveDate>,
        subcal: SubcalId,
    },
    NewEvents {
        spans: Vec<(NaiveDate, NaiveDate)>,
        subcal: SubcalId,
    },
    Change {
        targets: Vec<ItemId>,
        regname: RegisterName,
    },
    NewSubcal,
    RenameSubcal,
    SubcalColor,
    ConfirmDeleteSubcal,
}

/// An open text prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    label: String,
    text: String,
    action: PromptAction,
}

impl Prompt {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn action(&self) -> &PromptAction {
        &self.action
    }
}

pub struct Dispatcher {
    keymap: Keymap,
    commands: CommandTable,
    args: CmdArgs,
    ex_buffer: String,
    prompt: Option<Prompt>,
    /// Parse state to restore when an ex line or prompt is aborted
    suspended: Option<CmdArgs>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Keymap::default_bindings(), CommandTable::new())
    }
}

impl Dispatcher {
    pub fn new(keymap: Keymap, commands: CommandTable) -> Self {
        Self {
            keymap,
            commands,
            args: CmdArgs::new(),
            ex_buffer: String::new(),
            prompt: None,
            suspended: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.args.mode
    }

    pub fn args(&self) -> &CmdArgs {
        &self.args
    }

    /// Count, register, operator and prefix typed so far
    pub fn pending_keys(&self) -> String {
        self.args.pending_keys()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// Ex line being typed, only in EX_CMD mode
    pub fn ex_buffer(&self) -> Option<&str> {
        (self.args.mode == Mode::ExCommand).then_some(self.ex_buffer.as_str())
    }

    /// Processes one key
    pub fn feed(&mut self, editor: &mut Editor, key: Key) -> CoreOutcome {
        editor.clear_status();
        debug!(
            "event=key module=dispatcher key={} mode={}",
            key.label(),
            self.args.mode.as_str()
        );
        let outcome = match self.args.mode {
            Mode::ExCommand => self.feed_ex(editor, key),
            Mode::Prompt => self.feed_prompt(editor, key),
            Mode::Normal | Mode::Visual | Mode::OperatorPending => self.feed_normal(editor, key),
        };
        match outcome {
            CoreOutcome::Continue | CoreOutcome::Changed => match editor.status() {
                Some(status) => CoreOutcome::StatusMessage(status.text.clone()),
                None => outcome,
            },
            other => other,
        }
    }

    // ---- NORMAL / VISUAL / OPERATOR-PENDING ----

    fn feed_normal(&mut self, editor: &mut Editor, key: Key) -> CoreOutcome {
        if key == Key::Escape {
            return self.reset(editor);
        }

        if let Some(prefix_key) = self.args.key {
            self.args.next_key = Some(key);
            return self.resolve_prefix(editor, prefix_key, key);
        }

        if let Some(ch) = key.as_char().filter(char::is_ascii_digit) {
            self.args.count_buffer.push(ch);
            return CoreOutcome::Continue;
        }

        match self.keymap.lookup(key) {
            Some(command) => self.dispatch(editor, key, command),
            None => {
                debug!("event=unbound_key module=dispatcher key={}", key.label());
                self.abort_unit(editor);
                CoreOutcome::Continue
            }
        }
    }

    fn dispatch(&mut self, editor: &mut Editor, key: Key, command: NormalCommand) -> CoreOutcome {
        match command {
            NormalCommand::Motion(motion_key) => self.handle_motion(editor, motion_key),
            NormalCommand::Operator(op) => self.handle_operator(editor, key, op),
            NormalCommand::SingleUnit => match self.args.op_pending {
                Some(op) => self.single_unit(editor, op),
                None if self.args.mode == Mode::Visual => {
                    let targets = editor.visual_targets();
                    self.run_operator(editor, Operator::ToggleComplete, targets)
                }
                None => self.single_unit(editor, Operator::ToggleComplete),
            },
            NormalCommand::Prefix(_) => {
                self.args.key = Some(key);
                CoreOutcome::Continue
            }
            NormalCommand::Action(action) => self.handle_action(editor, action),
        }
    }

    fn resolve_prefix(&mut self, editor: &mut Editor, prefix_key: Key, next: Key) -> CoreOutcome {
        self.args.clear_keys();
        let prefix = match self.keymap.lookup(prefix_key) {
            Some(NormalCommand::Prefix(prefix)) => prefix,
            _ => return CoreOutcome::Continue,
        };

        if prefix == Prefix::Register {
            return match next.as_char().and_then(RegisterName::from_char) {
                Some(name) => {
                    self.args.regname = name;
                    CoreOutcome::Continue
                }
                None => {
                    editor.notify_error(format!("Invalid register: {}", next.label()));
                    self.abort_unit(editor);
                    CoreOutcome::Continue
                }
            };
        }

        match self.keymap.lookup_prefixed(prefix, next) {
            Some(command) => self.dispatch(editor, next, command),
            None => {
                debug!(
                    "event=unbound_prefix module=dispatcher prefix={} key={}",
                    prefix_key.label(),
                    next.label()
                );
                self.abort_unit(editor);
                CoreOutcome::Continue
            }
        }
    }

    /// Count times pending operator count; never zero
    fn motion_multiplier(&mut self) -> u32 {
        let count = self.args.take_count().unwrap_or(1).max(1);
        count.saturating_mul(self.args.op_count.max(1))
    }

    fn handle_motion(&mut self, editor: &mut Editor, motion_key: MotionKey) -> CoreOutcome {
        let date = editor.selected_date();
        let week_start = editor.settings().week_start;

        let motion = match motion_key {
            MotionKey::DateDelta(delta) => {
                let n = self.motion_multiplier();
                Motion::date_move(date, delta).scale(n)
            }
            MotionKey::ItemDelta(delta) => {
                let n = i64::from(self.motion_multiplier());
                let len = editor.items_on_selected().len();
                Motion::item_move(editor.selection().item_index, delta.saturating_mul(n), len)
            }
            MotionKey::Goto => {
                let buffer = self.args.take_count_str();
                let target = if buffer == "0" {
                    Ok(motion::month_start(date))
                } else {
                    parse_date_string(
                        &buffer,
                        editor.settings().date_format,
                        date,
                        editor.today(),
                    )
                };
                match target {
                    Ok(target) => {
                        editor.remember_goto();
                        Motion::date_set(date, target)
                    }
                    Err(err) => {
                        editor.notify_error(format!("Invalid date: {}", err));
                        self.abort_unit(editor);
                        return CoreOutcome::Continue;
                    }
                }
            }
            MotionKey::UnGoto => match editor.last_goto() {
                Some(target) => {
                    self.args.take_count();
                    editor.remember_goto();
                    Motion::date_set(date, target)
                }
                None => {
                    editor.notify_error("No previous goto");
                    self.abort_unit(editor);
                    return CoreOutcome::Continue;
                }
            },
            MotionKey::MonthEnd => {
                self.args.take_count();
                Motion::date_set(date, motion::month_end(date))
            }
            MotionKey::WeekStart => {
                self.args.take_count();
                Motion::date_set(date, motion::week_start(date, week_start))
            }
            MotionKey::WeekEnd => {
                self.args.take_count();
                Motion::date_set(date, motion::week_end(date, week_start))
            }
        };

        editor.apply_motion(&motion);

        if let Some(pending) = self.args.motion_pending.take() {
            return self.finish_pending_command(editor, pending, motion);
        }
        if let Some(op) = self.args.op_pending {
            let targets = editor.targets_for_motion(&motion);
            return self.run_operator(editor, op, targets);
        }
        self.args.clear();
        CoreOutcome::Changed
    }

    fn handle_operator(&mut self, editor: &mut Editor, key: Key, op: Operator) -> CoreOutcome {
        if self.args.motion_pending.is_some() {
            self.abort_unit(editor);
            return CoreOutcome::Continue;
        }
        if self.args.mode == Mode::Visual {
            let targets = editor.visual_targets();
            return self.run_operator(editor, op, targets);
        }
        match self.args.op_pending {
            Some(pending) if pending != op => {
                self.abort_unit(editor);
                return CoreOutcome::Continue;
            }
            Some(_) => return self.single_unit(editor, op),
            None if key.is_uppercase() => return self.single_unit(editor, op),
            None => {}
        }

        self.args.op_pending = Some(op);
        self.args.op_count = self.args.take_count().unwrap_or(1).max(1);
        self.args.mode = Mode::OperatorPending;
        editor.request_redraw();
        CoreOutcome::Continue
    }

    /// Runs `op` on the selected item and the items after it, one per count
    fn single_unit(&mut self, editor: &mut Editor, op: Operator) -> CoreOutcome {
        let count = self.args.take_count().unwrap_or(1).max(1);
        let n = count.saturating_mul(self.args.op_count.max(1));
        let targets = editor.selected_items(n as usize);
        if targets.is_empty() {
            editor.notify_error("No item selected");
            self.finish_unit(editor);
            return CoreOutcome::Continue;
        }
        self.run_operator(editor, op, targets)
    }

    fn run_operator(&mut self, editor: &mut Editor, op: Operator, targets: Vec<ItemId>) -> CoreOutcome {
        let regname = self.args.regname;
        if op.needs_text() {
            if targets.is_empty() {
                self.finish_unit(editor);
                return CoreOutcome::Continue;
            }
            let initial = match targets.as_slice() {
                [single] => editor
                    .calendar()
                    .item(single)
                    .map(|item| item.name().to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            };
            self.args.clear();
            return self.open_prompt(
                editor,
                "Rename: ",
                initial,
                PromptAction::Change { targets, regname },
            );
        }

        let result = operator::do_operator(editor, OpArgs::new(op, targets, regname));
        self.finish_unit(editor);
        self.settle(editor, result)
    }

    fn handle_action(&mut self, editor: &mut Editor, action: Action) -> CoreOutcome {
        if (self.args.op_pending.is_some() || self.args.motion_pending.is_some())
            && action != Action::EnterExMode
        {
            self.abort_unit(editor);
            return CoreOutcome::Continue;
        }

        match action {
            Action::Undo | Action::Redo => {
                let times = self.args.take_count().unwrap_or(1).max(1);
                self.args.clear();
                for _ in 0..times {
                    let step = if action == Action::Undo {
                        editor.undo()
                    } else {
                        editor.redo()
                    };
                    match step {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(err) => return self.internal_error(editor, err),
                    }
                }
                CoreOutcome::Changed
            }
            Action::Paste { to_original } => {
                let dates = if self.args.mode == Mode::Visual {
                    editor.selected_dates()
                } else {
                    let n = i64::from(self.args.take_count().unwrap_or(1).max(1));
                    let start = editor.selected_date();
                    (0..n)
                        .filter_map(|i| start.checked_add_signed(Duration::try_days(i)?))
                        .collect()
                };
                let result = operator::put(editor, self.args.regname, &dates, to_original);
                self.finish_unit(editor);
                self.settle(editor, result)
            }
            Action::NewTask | Action::NewEvent => self.new_item(editor, action == Action::NewTask),
            Action::ToggleVisual => {
                let entering = self.args.mode != Mode::Visual;
                self.args.clear();
                editor.set_visual(entering);
                self.args.mode = if entering { Mode::Visual } else { Mode::Normal };
                CoreOutcome::Changed
            }
            Action::PrevSubcal | Action::NextSubcal => {
                let n = i64::from(self.args.take_count().unwrap_or(1).max(1));
                let delta = if action == Action::PrevSubcal { -n } else { n };
                editor.select_subcal_offset(delta);
                self.args.clear();
                CoreOutcome::Changed
            }
            Action::EnterExMode => {
                let mut resume = self.args.clone();
                resume.clear_keys();
                self.suspended = Some(resume);
                self.ex_buffer.clear();
                self.args.mode = Mode::ExCommand;
                editor.request_redraw();
                CoreOutcome::Changed
            }
            Action::ToggleHidden => {
                let result = actions::toggle_subcal_hidden(editor);
                self.args.clear();
                self.settle(editor, result)
            }
        }
    }

    /// `T` / `E`: prompt for a name, or wait for a motion when counted
    fn new_item(&mut self, editor: &mut Editor, task: bool) -> CoreOutcome {
        let Some(subcal) = actions::selected_subcal_id(editor) else {
            self.abort_unit(editor);
            return CoreOutcome::Continue;
        };

        if self.args.mode == Mode::Visual {
            self.args.clear();
            return if task {
                let dates = editor.selected_dates();
                self.prompt_new_tasks(editor, dates, subcal)
            } else {
                let span = editor
                    .selection_range()
                    .unwrap_or((editor.selected_date(), editor.selected_date()));
                self.prompt_new_events(editor, vec![span], subcal)
            };
        }

        match self.args.take_count().filter(|n| *n > 0) {
            Some(repeats) => {
                self.args.motion_pending = Some(if task {
                    PendingCommand::NewTask { repeats }
                } else {
                    PendingCommand::NewEvent { repeats }
                });
                CoreOutcome::Continue
            }
            None => {
                self.args.clear();
                let date = editor.selected_date();
                if task {
                    self.prompt_new_tasks(editor, vec![date], subcal)
                } else {
                    self.prompt_new_events(editor, vec![(date, date)], subcal)
                }
            }
        }
    }

    /// `NT<motion>` / `NE<motion>`: N copies spaced by the motion's span
    fn finish_pending_command(
        &mut self,
        editor: &mut Editor,
        pending: PendingCommand,
        motion: Motion,
    ) -> CoreOutcome {
        let Motion::Date { start, end } = motion else {
            self.abort_unit(editor);
            return CoreOutcome::Changed;
        };
        let Some(subcal) = actions::selected_subcal_id(editor) else {
            self.abort_unit(editor);
            return CoreOutcome::Continue;
        };
        let step = match (end - start).num_days() {
            0 => 1,
            days => days,
        };
        let repeats = match pending {
            PendingCommand::NewTask { repeats } | PendingCommand::NewEvent { repeats } => repeats,
        };
        let dates: Vec<NaiveDate> = (0..i64::from(repeats))
            .filter_map(|i| start.checked_add_signed(Duration::try_days(step.checked_mul(i)?)?))
            .collect();

        self.args.clear();
        match pending {
            PendingCommand::NewTask { .. } => self.prompt_new_tasks(editor, dates, subcal),
            PendingCommand::NewEvent { .. } => {
                let spans = dates.into_iter().map(|d| (d, d)).collect();
                self.prompt_new_events(editor, spans, subcal)
            }
        }
    }

    fn prompt_new_tasks(&mut self, editor: &mut Editor, dates: Vec<NaiveDate>, subcal: SubcalId) -> CoreOutcome {
        let initial = editor.settings().default_task_name.clone();
        self.open_prompt(editor, "New task: ", initial, PromptAction::NewTasks { dates, subcal })
    }

    fn prompt_new_events(
        &mut self,
        editor: &mut Editor,
        spans: Vec<(NaiveDate, NaiveDate)>,
        subcal: SubcalId,
    ) -> CoreOutcome {
        let initial = editor.settings().default_event_name.clone();
        self.open_prompt(editor, "New event: ", initial, PromptAction::NewEvents { spans, subcal })
    }

    // ---- PROMPT ----

    fn open_prompt(
        &mut self,
        editor: &mut Editor,
        label: impl Into<String>,
        initial: String,
        action: PromptAction,
    ) -> CoreOutcome {
        let mut resume = self.args.clone();
        resume.clear_keys();
        self.suspended = Some(resume);
        self.args.mode = Mode::Prompt;
        self.prompt = Some(Prompt {
            label: label.into(),
            text: initial,
            action,
        });
        editor.request_redraw();
        CoreOutcome::Changed
    }

    fn feed_prompt(&mut self, editor: &mut Editor, key: Key) -> CoreOutcome {
        match key {
            Key::Escape => {
                self.prompt = None;
                self.args = self.suspended.take().unwrap_or_default();
                editor.request_redraw();
                debug!("event=prompt_abort module=dispatcher");
                CoreOutcome::Changed
            }
            Key::Enter => {
                let Some(prompt) = self.prompt.take() else {
                    self.args = CmdArgs::new();
                    return CoreOutcome::Continue;
                };
                self.args = self.suspended.take().unwrap_or_default();
                self.args.clear();
                let result = self.submit_prompt(editor, prompt);
                self.finish_unit(editor);
                self.settle(editor, result)
            }
            Key::Backspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.text.pop();
                }
                CoreOutcome::Changed
            }
            Key::Char(ch) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.text.push(ch);
                }
                CoreOutcome::Changed
            }
            _ => CoreOutcome::Continue,
        }
    }

    fn submit_prompt(&mut self, editor: &mut Editor, prompt: Prompt) -> HistoryResult<bool> {
        let text = prompt.text;
        match prompt.action {
            PromptAction::NewTasks { dates, subcal } => {
                actions::create_tasks(editor, &dates, &text, &subcal)
            }
            PromptAction::NewEvents { spans, subcal } => {
                actions::create_events(editor, &spans, &text, &subcal)
            }
            PromptAction::Change { targets, regname } => operator::do_operator(
                editor,
                OpArgs::new(Operator::Change, targets, regname).with_text(text),
            ),
            PromptAction::NewSubcal => actions::new_subcal(editor, &text),
            PromptAction::RenameSubcal => actions::rename_subcal(editor, &text),
            PromptAction::SubcalColor => actions::set_subcal_color(editor, &text),
            PromptAction::ConfirmDeleteSubcal => actions::delete_subcal(editor, &text),
        }
    }

    // ---- EX_CMD ----

    fn feed_ex(&mut self, editor: &mut Editor, key: Key) -> CoreOutcome {
        match key {
            Key::Escape => self.leave_ex(editor),
            Key::Backspace if self.ex_buffer.is_empty() => self.leave_ex(editor),
            Key::Backspace => {
                self.ex_buffer.pop();
                CoreOutcome::Changed
            }
            Key::Enter => {
                let line = std::mem::take(&mut self.ex_buffer);
                self.args = self.suspended.take().unwrap_or_default();
                self.args.clear();
                let outcome = self.execute_ex(editor, &line);
                if self.args.mode != Mode::Prompt {
                    self.finish_unit(editor);
                }
                outcome
            }
            Key::Char(ch) => {
                self.ex_buffer.push(ch);
                CoreOutcome::Changed
            }
            _ => CoreOutcome::Continue,
        }
    }

    /// Abandons the ex line and restores the state from before `:`
    fn leave_ex(&mut self, editor: &mut Editor) -> CoreOutcome {
        self.ex_buffer.clear();
        self.args = self.suspended.take().unwrap_or_default();
        editor.request_redraw();
        CoreOutcome::Changed
    }

    fn execute_ex(&mut self, editor: &mut Editor, line: &str) -> CoreOutcome {
        let parsed = match self.commands.parse(line) {
            Ok(parsed) => parsed,
            Err(CommandError::EmptyCommand) => return CoreOutcome::Continue,
            Err(err) => {
                editor.notify_error(err.to_string());
                return CoreOutcome::Continue;
            }
        };
        info!(
            "event=ex_command module=dispatcher command={:?} has_arg={}",
            parsed.command,
            parsed.arg.is_some()
        );
        let arg = parsed.arg.as_deref();

        match parsed.command {
            ExCommand::Write => CoreOutcome::RequestIo(CoreIoRequest::Save),
            ExCommand::WriteQuit => CoreOutcome::RequestIo(CoreIoRequest::SaveAndQuit),
            ExCommand::ForceQuit => CoreOutcome::RequestExit { forced: true },
            ExCommand::Quit => {
                if editor.is_dirty() {
                    editor.notify_error("No write since last change (use :q! to override)");
                    CoreOutcome::QuitBlocked
                } else {
                    CoreOutcome::RequestExit { forced: false }
                }
            }
            ExCommand::Undo => self.history_step(editor, true),
            ExCommand::Redo => self.history_step(editor, false),
            ExCommand::NewTask => {
                let Some(subcal) = actions::selected_subcal_id(editor) else {
                    return CoreOutcome::Continue;
                };
                let dates = editor.selected_dates();
                match arg {
                    Some(name) => {
                        let result = actions::create_tasks(editor, &dates, name, &subcal);
                        self.settle(editor, result)
                    }
                    None => self.prompt_new_tasks(editor, dates, subcal),
                }
            }
            ExCommand::NewEvent => {
                let Some(subcal) = actions::selected_subcal_id(editor) else {
                    return CoreOutcome::Continue;
                };
                let span = editor
                    .selection_range()
                    .unwrap_or((editor.selected_date(), editor.selected_date()));
                match arg {
                    Some(name) => {
                        let result = actions::create_events(editor, &[span], name, &subcal);
                        self.settle(editor, result)
                    }
                    None => self.prompt_new_events(editor, vec![span], subcal),
                }
            }
            ExCommand::Rename => {
                let targets = selection_targets(editor);
                if targets.is_empty() {
                    editor.notify_error("No item selected");
                    return CoreOutcome::Continue;
                }
                match arg {
                    Some(name) => {
                        let args = OpArgs::new(Operator::Change, targets, self.args.regname)
                            .with_text(name);
                        let result = operator::do_operator(editor, args);
                        self.settle(editor, result)
                    }
                    None => self.run_operator(editor, Operator::Change, targets),
                }
            }
            ExCommand::Delete | ExCommand::Complete => {
                let targets = selection_targets(editor);
                if targets.is_empty() {
                    editor.notify_error("No item selected");
                    return CoreOutcome::Continue;
                }
                let op = if parsed.command == ExCommand::Delete {
                    Operator::Delete
                } else {
                    Operator::ToggleComplete
                };
                let result = operator::do_operator(editor, OpArgs::new(op, targets, self.args.regname));
                self.settle(editor, result)
            }
            ExCommand::NewCal => match arg {
                Some(name) => {
                    let result = actions::new_subcal(editor, name);
                    self.settle(editor, result)
                }
                None => self.open_prompt(editor, "New subcalendar: ", String::new(), PromptAction::NewSubcal),
            },
            ExCommand::RenameCal => match arg {
                Some(name) => {
                    let result = actions::rename_subcal(editor, name);
                    self.settle(editor, result)
                }
                None => {
                    let Some(current) = editor.selected_subcal().map(|sc| sc.name().to_string()) else {
                        editor.notify_error("No subcalendar selected");
                        return CoreOutcome::Continue;
                    };
                    self.open_prompt(editor, "Rename subcalendar: ", current, PromptAction::RenameSubcal)
                }
            },
            ExCommand::Color => match arg {
                Some(color) => {
                    let result = actions::set_subcal_color(editor, color);
                    self.settle(editor, result)
                }
                None => {
                    let Some(current) = editor.selected_subcal().map(|sc| sc.color().to_string()) else {
                        editor.notify_error("No subcalendar selected");
                        return CoreOutcome::Continue;
                    };
                    self.open_prompt(editor, "Subcalendar color: ", current, PromptAction::SubcalColor)
                }
            },
            ExCommand::DelCal => {
                let Some(name) = editor.selected_subcal().map(|sc| sc.name().to_string()) else {
                    editor.notify_error("No subcalendar selected");
                    return CoreOutcome::Continue;
                };
                if editor.calendar().subcal_count() <= 1 {
                    editor.notify_error("Cannot delete the last subcalendar");
                    return CoreOutcome::Continue;
                }
                self.open_prompt(
                    editor,
                    format!("Delete subcalendar '{}'? (y/N): ", name),
                    String::new(),
                    PromptAction::ConfirmDeleteSubcal,
                )
            }
            ExCommand::Hide => {
                let result = actions::toggle_subcal_hidden(editor);
                self.settle(editor, result)
            }
            ExCommand::Help => {
                editor.notify(format!("Commands: {}", self.commands.names().join(" ")));
                CoreOutcome::Continue
            }
        }
    }

    fn history_step(&mut self, editor: &mut Editor, undo: bool) -> CoreOutcome {
        let result = if undo { editor.undo() } else { editor.redo() };
        self.settle(editor, result)
    }

    // ---- shared ----

    /// ESC: drop everything and return to NORMAL
    fn reset(&mut self, editor: &mut Editor) -> CoreOutcome {
        self.args = CmdArgs::new();
        if editor.is_visual() {
            editor.set_visual(false);
        }
        editor.request_redraw();
        CoreOutcome::Changed
    }

    /// Drops the current unit, keeping VISUAL mode
    fn abort_unit(&mut self, editor: &mut Editor) {
        self.args.clear();
        self.args.regname = RegisterName::Unnamed;
        editor.request_redraw();
    }

    /// Ends an executed unit: the register is consumed and VISUAL ends
    fn finish_unit(&mut self, editor: &mut Editor) {
        self.args.clear();
        self.args.regname = RegisterName::Unnamed;
        if self.args.mode == Mode::Visual || editor.is_visual() {
            editor.set_visual(false);
            self.args.mode = Mode::Normal;
        }
    }

    fn settle(&mut self, editor: &mut Editor, result: HistoryResult<bool>) -> CoreOutcome {
        match result {
            Ok(true) => CoreOutcome::Changed,
            Ok(false) => CoreOutcome::Continue,
            Err(err) => self.internal_error(editor, err),
        }
    }

    fn internal_error(&mut self, editor: &mut Editor, err: HistoryError) -> CoreOutcome {
        error!(
            "event=internal_error module=dispatcher invariant={} error={}",
            err.is_invariant_violation(),
            err
        );
        editor.notify_error(format!("Internal error: {}", err));
        self.abort_unit(editor);
        CoreOutcome::Continue
    }
}

/// VISUAL range items, or the selected item
fn selection_targets(editor: &Editor) -> Vec<ItemId> {
    if editor.is_visual() {
        editor.visual_targets()
    } else {
        editor.selected_items(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Calendar, CalendarItem, Subcalendar};
    use crate::settings::Settings;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).unwrap()
    }

    fn setup() -> (Dispatcher, Editor) {
        let cal = Calendar::from_subcalendars(vec![Subcalendar::new("Home", "green")]).unwrap();
        (Dispatcher::default(), Editor::new(cal, Settings::default(), d(10, 16)))
    }

    fn feed(dp: &mut Dispatcher, ed: &mut Editor, keys: &str) -> CoreOutcome {
        let mut last = CoreOutcome::Continue;
        for ch in keys.chars() {
            last = dp.feed(ed, Key::Char(ch));
        }
        last
    }

    #[test]
    fn test_count_scales_motion() {
        let (mut dp, mut ed) = setup();
        feed(&mut dp, &mut ed, "3j");
        assert_eq!(ed.selected_date(), d(11, 6));
        assert!(dp.args().count_buffer.is_empty());
    }

    #[test]
    fn test_operator_enters_pending_mode() {
        let (mut dp, mut ed) = setup();
        feed(&mut dp, &mut ed, "2d");
        assert_eq!(dp.mode(), Mode::OperatorPending);
        assert_eq!(dp.args().op_count, 2);
        assert_eq!(dp.pending_keys(), "2d");
        dp.feed(&mut ed, Key::Escape);
        assert_eq!(dp.mode(), Mode::Normal);
        assert_eq!(dp.pending_keys(), "");
    }

    #[test]
    fn test_unbound_prefix_continuation_is_noop() {
        let (mut dp, mut ed) = setup();
        let before = ed.selected_date();
        feed(&mut dp, &mut ed, "gq");
        assert_eq!(ed.selected_date(), before);
        assert_eq!(dp.args().key, None);
        assert_eq!(dp.mode(), Mode::Normal);
    }

    #[test]
    fn test_new_task_prompt_round_trip() {
        let (mut dp, mut ed) = setup();
        dp.feed(&mut ed, Key::Char('T'));
        assert_eq!(dp.mode(), Mode::Prompt);
        assert_eq!(dp.prompt().unwrap().text(), "New Task");
        for _ in 0.."New Task".len() {
            dp.feed(&mut ed, Key::Backspace);
        }
        feed(&mut dp, &mut ed, "dentist");
        dp.feed(&mut ed, Key::Enter);
        assert_eq!(dp.mode(), Mode::Normal);
        assert_eq!(ed.selected_item().unwrap().name(), "dentist");
    }

    #[test]
    fn test_space_toggles_selected_task() {
        let (mut dp, mut ed) = setup();
        let sc = ed.selected_subcal().unwrap().uid().clone();
        ed.transact("seed", |rec| rec.insert_item(&sc, CalendarItem::task("a", d(10, 16))))
            .unwrap();
        dp.feed(&mut ed, Key::Char(' '));
        assert_eq!(ed.selected_item().unwrap().completed(), Some(true));
    }

    #[test]
    fn test_ex_help_and_unknown() {
        let (mut dp, mut ed) = setup();
        feed(&mut dp, &mut ed, ":bogus");
        let outcome = dp.feed(&mut ed, Key::Enter);
        assert_eq!(
            outcome,
            CoreOutcome::StatusMessage("Unknown command: bogus".to_string())
        );
        assert_eq!(dp.mode(), Mode::Normal);
    }

    #[test]
    fn test_mismatched_operator_aborts_unit() {
        let (mut dp, mut ed) = setup();
        let sc = ed.selected_subcal().unwrap().uid().clone();
        ed.transact("seed", |rec| rec.insert_item(&sc, CalendarItem::task("a", d(10, 16))))
            .unwrap();

        feed(&mut dp, &mut ed, "dy");
        assert_eq!(dp.mode(), Mode::Normal);
        assert_eq!(dp.pending_keys(), "");
        assert_eq!(ed.calendar().item_count(), 1);
        assert!(ed.registers().get(crate::register::RegisterName::Unnamed).is_empty());

        feed(&mut dp, &mut ed, "dX");
        assert_eq!(dp.mode(), Mode::Normal);
        assert_eq!(ed.selected_item().unwrap().completed(), Some(false));
    }
}
