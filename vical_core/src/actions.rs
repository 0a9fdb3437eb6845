//! Item creation and subcalendar actions
//!
//! Each action validates its input, reports user errors on the status line
//! and runs any mutation as a single transaction. The return value says
//! whether the model changed.

use crate::editor::Editor;
use crate::history::HistoryResult;
use crate::ids::SubcalId;
use crate::model::{CalendarItem, SubcalAttr, Subcalendar};
use chrono::NaiveDate;

/// Creates one task per date in `subcal`
pub fn create_tasks(
    editor: &mut Editor,
    dates: &[NaiveDate],
    name: &str,
    subcal: &SubcalId,
) -> HistoryResult<bool> {
    let name = name.trim();
    if name.is_empty() {
        editor.notify_error("Task name cannot be blank");
        return Ok(false);
    }
    let label = if dates.len() == 1 {
        format!("New task '{}'", name)
    } else {
        format!("New task '{}' x{}", name, dates.len())
    };
    let committed = editor.transact(&label, |rec| {
        for date in dates {
            rec.insert_item(subcal, CalendarItem::task(name, *date))?;
        }
        Ok(())
    })?;
    Ok(committed.is_some())
}

/// Creates one event per `(start, end)` span in `subcal`
pub fn create_events(
    editor: &mut Editor,
    spans: &[(NaiveDate, NaiveDate)],
    name: &str,
    subcal: &SubcalId,
) -> HistoryResult<bool> {
    let name = name.trim();
    if name.is_empty() {
        editor.notify_error("Event name cannot be blank");
        return Ok(false);
    }
    let mut events = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        events.push(CalendarItem::event(name, *start.min(end), *start.max(end))?);
    }
    let label = if events.len() == 1 {
        format!("New event '{}'", name)
    } else {
        format!("New event '{}' x{}", name, events.len())
    };
    let committed = editor.transact(&label, |rec| {
        for event in events {
            rec.insert_item(subcal, event)?;
        }
        Ok(())
    })?;
    Ok(committed.is_some())
}

/// Appends a subcalendar and selects it
pub fn new_subcal(editor: &mut Editor, name: &str) -> HistoryResult<bool> {
    let name = name.trim();
    if name.is_empty() {
        editor.notify_error("Subcalendar name cannot be blank");
        return Ok(false);
    }
    let subcal = Subcalendar::new(name, editor.settings().default_subcal_color.clone());
    let id = subcal.uid().clone();
    let index = editor.calendar().subcal_count();
    editor.transact(&format!("New subcalendar '{}'", name), |rec| {
        rec.insert_subcal(index, subcal)
    })?;
    editor.select_subcal(&id);
    editor.notify(format!("Created new subcalendar: '{}'", name));
    Ok(true)
}

pub fn rename_subcal(editor: &mut Editor, name: &str) -> HistoryResult<bool> {
    let name = name.trim();
    if name.is_empty() {
        editor.notify_error("Subcalendar name cannot be blank");
        return Ok(false);
    }
    let Some(id) = selected_subcal_id(editor) else {
        return Ok(false);
    };
    let committed = editor.transact("Rename subcalendar", |rec| {
        rec.set_subcal_attr(&id, SubcalAttr::Name(name.to_string()))
    })?;
    editor.notify(format!("Renamed subcalendar to '{}'", name));
    Ok(committed.is_some())
}

pub fn set_subcal_color(editor: &mut Editor, color: &str) -> HistoryResult<bool> {
    let color = color.trim();
    if color.is_empty() {
        editor.notify_error("No color");
        return Ok(false);
    }
    let Some(id) = selected_subcal_id(editor) else {
        return Ok(false);
    };
    let committed = editor.transact("Change subcalendar color", |rec| {
        rec.set_subcal_attr(&id, SubcalAttr::Color(color.to_string()))
    })?;
    editor.notify(format!("Subcalendar color set to '{}'", color));
    Ok(committed.is_some())
}

pub fn toggle_subcal_hidden(editor: &mut Editor) -> HistoryResult<bool> {
    let Some(subcal) = editor.selected_subcal() else {
        editor.notify_error("No subcalendar selected");
        return Ok(false);
    };
    let (id, name, hidden) = (subcal.uid().clone(), subcal.name().to_string(), !subcal.hidden());
    let label = if hidden { "Hide subcalendar" } else { "Show subcalendar" };
    editor.transact(label, |rec| rec.set_subcal_attr(&id, SubcalAttr::Hidden(hidden)))?;
    editor.notify(format!("{} {}", name, if hidden { "hidden" } else { "unhidden" }));
    Ok(true)
}

/// Removes the selected subcalendar once the user answered `y`
///
/// The last remaining subcalendar is never removed.
pub fn delete_subcal(editor: &mut Editor, answer: &str) -> HistoryResult<bool> {
    if !answer.trim().eq_ignore_ascii_case("y") {
        editor.notify("Delete canceled");
        return Ok(false);
    }
    if editor.calendar().subcal_count() <= 1 {
        editor.notify_error("Cannot delete the last subcalendar");
        return Ok(false);
    }
    let Some(subcal) = editor.selected_subcal() else {
        editor.notify_error("No subcalendar selected");
        return Ok(false);
    };
    let (id, name) = (subcal.uid().clone(), subcal.name().to_string());
    editor.transact(&format!("Delete subcalendar '{}'", name), |rec| {
        rec.remove_subcal(&id)
    })?;
    editor.select_subcal_offset(-1);
    editor.notify(format!("Deleted subcalendar '{}'", name));
    Ok(true)
}

pub(crate) fn selected_subcal_id(editor: &mut Editor) -> Option<SubcalId> {
    let id = editor.selected_subcal().map(|sc| sc.uid().clone());
    if id.is_none() {
        editor.notify_error("No subcalendar selected");
    }
    id
}
