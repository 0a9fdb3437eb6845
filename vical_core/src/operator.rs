//! Operators: delete, yank, change and toggle-complete over a target set,
//! plus paste

use crate::editor::Editor;
use crate::history::HistoryResult;
use crate::ids::ItemId;
use crate::model::{ItemAttr, ModelError};
use crate::register::{RegisterName, RegisterPayload};
use chrono::NaiveDate;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Delete,
    Yank,
    Change,
    ToggleComplete,
}

impl Operator {
    /// Maps an operator key, either case
    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'd' => Some(Operator::Delete),
            'y' => Some(Operator::Yank),
            'c' => Some(Operator::Change),
            'x' => Some(Operator::ToggleComplete),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Operator::Delete => 'd',
            Operator::Yank => 'y',
            Operator::Change => 'c',
            Operator::ToggleComplete => 'x',
        }
    }

    /// Change needs a name from a prompt before it can run
    pub fn needs_text(&self) -> bool {
        matches!(self, Operator::Change)
    }
}

/// Everything an operator needs to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpArgs {
    pub op: Operator,
    pub targets: Vec<ItemId>,
    pub regname: RegisterName,
    /// New name for `Change`
    pub text: String,
}

impl OpArgs {
    pub fn new(op: Operator, targets: Vec<ItemId>, regname: RegisterName) -> Self {
        Self {
            op,
            targets,
            regname,
            text: String::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }
}

/// Runs an operator
///
/// Returns whether the model changed. An empty target set does nothing and
/// opens no transaction.
pub fn do_operator(editor: &mut Editor, args: OpArgs) -> HistoryResult<bool> {
    debug!(
        "event=operator module=operator op={} targets={} register={}",
        args.op.as_char(),
        args.targets.len(),
        args.regname.as_char()
    );
    if args.targets.is_empty() {
        return Ok(false);
    }
    match args.op {
        Operator::Delete => op_delete(editor, &args),
        Operator::Yank => {
            op_yank(editor, &args);
            Ok(false)
        }
        Operator::Change => op_change(editor, &args),
        Operator::ToggleComplete => op_toggle_complete(editor, &args),
    }
}

fn snapshot_targets(editor: &Editor, targets: &[ItemId]) -> Vec<RegisterPayload> {
    let calendar = editor.calendar();
    targets
        .iter()
        .filter_map(|uid| {
            let item = calendar.item(uid)?;
            let owner = calendar.owner_of(uid)?;
            Some(RegisterPayload::from_item(item, owner))
        })
        .collect()
}

/// Registers rotate only once the removal has committed
fn op_delete(editor: &mut Editor, args: &OpArgs) -> HistoryResult<bool> {
    let payloads = snapshot_targets(editor, &args.targets);

    let label = plural_label("Delete", args.targets.len());
    let committed = editor.transact(&label, |rec| {
        for uid in &args.targets {
            rec.remove_item(uid)?;
        }
        Ok(())
    })?;
    if committed.is_none() {
        return Ok(false);
    }
    editor.registers_mut().write(args.regname, payloads, true);
    Ok(true)
}

fn op_yank(editor: &mut Editor, args: &OpArgs) {
    let payloads = snapshot_targets(editor, &args.targets);
    let count = payloads.len();
    editor.registers_mut().write(args.regname, payloads, false);
    editor.notify(format!("{} yanked", plural_label("", count).trim_start()));
}

fn op_change(editor: &mut Editor, args: &OpArgs) -> HistoryResult<bool> {
    let name = args.text.trim();
    if name.is_empty() {
        editor.notify_error("Name cannot be blank");
        return Ok(false);
    }
    let label = plural_label("Rename", args.targets.len());
    let committed = editor.transact(&label, |rec| {
        for uid in &args.targets {
            rec.set_item_attr(uid, ItemAttr::Name(name.to_string()))?;
        }
        Ok(())
    })?;
    Ok(committed.is_some())
}

/// Completes every task in the set unless all of them already are, in
/// which case all are un-completed. Events are ignored.
fn op_toggle_complete(editor: &mut Editor, args: &OpArgs) -> HistoryResult<bool> {
    let calendar = editor.calendar();
    let tasks: Vec<(ItemId, bool)> = args
        .targets
        .iter()
        .filter_map(|uid| {
            let done = calendar.item(uid)?.completed()?;
            Some((uid.clone(), done))
        })
        .collect();
    if tasks.is_empty() {
        return Ok(false);
    }
    let value = !tasks.iter().all(|(_, done)| *done);

    let label = if value { "Complete" } else { "Uncomplete" };
    let committed = editor.transact(&plural_label(label, tasks.len()), |rec| {
        for (uid, _) in &tasks {
            rec.set_item_attr(uid, ItemAttr::Completed(value))?;
        }
        Ok(())
    })?;
    Ok(committed.is_some())
}

/// Rebuilds register contents on each of `dates`
///
/// With `to_original`, payloads go back to the subcalendar they came from
/// when it still exists; otherwise to the selected subcalendar.
pub fn put(
    editor: &mut Editor,
    regname: RegisterName,
    dates: &[NaiveDate],
    to_original: bool,
) -> HistoryResult<bool> {
    let payloads = editor.registers().get(regname);
    if payloads.is_empty() {
        editor.notify_error(format!("Register {} is empty", regname.as_char()));
        return Ok(false);
    }
    let Some(selected) = editor.selected_subcal().map(|sc| sc.uid().clone()) else {
        editor.notify_error("No subcalendar selected");
        return Ok(false);
    };
    let use_origin = to_original && editor.settings().paste_to_original_subcal;

    let mut placed = Vec::with_capacity(payloads.len() * dates.len());
    for date in dates {
        for payload in &payloads {
            let target = if use_origin && editor.calendar().subcal(payload.origin()).is_some() {
                payload.origin().clone()
            } else {
                selected.clone()
            };
            match payload.instantiate(*date) {
                Ok(item) => placed.push((target, item)),
                Err(ModelError::DateOutOfRange) => {
                    editor.notify_error(ModelError::DateOutOfRange.to_string());
                    return Ok(false);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    let label = plural_label("Paste", placed.len());
    let committed = editor.transact(&label, |rec| {
        for (target, item) in placed {
            rec.insert_item(&target, item)?;
        }
        Ok(())
    })?;
    Ok(committed.is_some())
}

fn plural_label(verb: &str, count: usize) -> String {
    if count == 1 {
        format!("{} 1 item", verb)
    } else {
        format!("{} {} items", verb, count)
    }
}
