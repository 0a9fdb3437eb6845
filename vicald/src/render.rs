//! Plain-text rendering
//!
//! A month grid around the selected date, the items of the selected day and
//! a status line. The output is plain text so scripted runs can be compared
//! line by line.

use chrono::{Datelike, Duration, NaiveDate};
use vical_core::{CalendarItem, Dispatcher, Editor, ItemKind, Mode};

/// Text view of the editor state
pub struct CalendarView {
    /// Maximum number of items listed for the selected day
    max_items: usize,
}

impl CalendarView {
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }

    /// Renders the month grid, day list and status line
    pub fn render(&self, editor: &Editor, dispatcher: &Dispatcher) -> String {
        let mut output = String::new();
        output.push_str(&self.render_month(editor));
        output.push('\n');
        output.push_str(&self.render_day(editor));
        output.push_str(&self.render_status_line(editor, dispatcher));
        output.push('\n');
        output
    }

    fn render_month(&self, editor: &Editor) -> String {
        let selected = editor.selected_date();
        let week_start = editor.settings().week_start;
        let first = selected.with_day(1).unwrap_or(selected);

        let mut output = format!("{}\n", first.format("%B %Y"));
        let mut day = week_start;
        for _ in 0..7 {
            output.push_str(&format!(" {:<3}", &format!("{:?}", day)[..2]));
            day = day.succ();
        }
        output.truncate(output.trim_end().len());
        output.push('\n');

        let lead = i64::from(
            (first.weekday().num_days_from_sunday() + 7 - week_start.num_days_from_sunday()) % 7,
        );
        // Counted rather than stepped so the last month of the calendar
        // never asks for a date past the end.
        let month_days = first
            .iter_days()
            .take_while(|date| date.month() == first.month())
            .count() as i64;
        let rows = (lead + month_days + 6) / 7;
        for row in 0..rows {
            for col in 0..7 {
                let offset = row * 7 + col - lead;
                let date = (0..month_days)
                    .contains(&offset)
                    .then(|| first.checked_add_signed(Duration::days(offset)))
                    .flatten();
                match date {
                    Some(date) => output.push_str(&self.render_cell(editor, date)),
                    None => output.push_str("    "),
                }
            }
            output.truncate(output.trim_end().len());
            output.push('\n');
        }
        output
    }

    fn render_cell(&self, editor: &Editor, date: NaiveDate) -> String {
        let in_range = editor
            .selection_range()
            .is_some_and(|(start, end)| start <= date && date <= end);
        let marker = if editor.calendar().items_on(date).is_empty() {
            ' '
        } else {
            '*'
        };
        if date == editor.selected_date() {
            format!("[{:>2}]", date.day())
        } else if in_range {
            format!("<{:>2}>", date.day())
        } else {
            format!(" {:>2}{}", date.day(), marker)
        }
    }

    fn render_day(&self, editor: &Editor) -> String {
        let selected = editor.selected_date();
        let mut output = format!("{}\n", selected.format("%a %Y-%m-%d"));
        let items = editor.items_on_selected();
        if items.is_empty() {
            output.push_str("  (no items)\n");
            return output;
        }

        let current = editor.selected_item().map(|item| item.uid());
        for item in items.iter().take(self.max_items) {
            let cursor = if Some(item.uid()) == current { '>' } else { ' ' };
            let owner = editor
                .calendar()
                .owner_of(item.uid())
                .and_then(|id| editor.calendar().subcal(id))
                .map(|sc| sc.name())
                .unwrap_or("?");
            output.push_str(&format!(
                "{} {} @{}\n",
                cursor,
                render_item(item, selected),
                owner
            ));
        }
        if items.len() > self.max_items {
            output.push_str(&format!("  ... {} more\n", items.len() - self.max_items));
        }
        output
    }

    fn render_status_line(&self, editor: &Editor, dispatcher: &Dispatcher) -> String {
        let mut status = String::new();

        status.push_str(dispatcher.mode().as_str());
        status.push(' ');

        match editor.selected_subcal() {
            Some(subcal) => {
                status.push_str(subcal.name());
                if subcal.hidden() {
                    status.push_str(" (hidden)");
                }
            }
            None => status.push_str("[No Subcalendar]"),
        }
        if editor.is_dirty() {
            status.push('*');
        }

        match dispatcher.mode() {
            Mode::ExCommand => {
                status.push_str(" :");
                status.push_str(dispatcher.ex_buffer().unwrap_or(""));
            }
            Mode::Prompt => {
                if let Some(prompt) = dispatcher.prompt() {
                    status.push(' ');
                    status.push_str(prompt.label());
                    status.push_str(prompt.text());
                }
            }
            _ => {
                let pending = dispatcher.pending_keys();
                if !pending.is_empty() {
                    status.push(' ');
                    status.push_str(&pending);
                }
            }
        }

        if let Some(line) = editor.status() {
            status.push_str(if line.is_error { " | E: " } else { " | " });
            status.push_str(&line.text);
        }

        status
    }

    /// Render just the status line
    pub fn render_status(&self, editor: &Editor, dispatcher: &Dispatcher) -> String {
        self.render_status_line(editor, dispatcher)
    }
}

impl Default for CalendarView {
    fn default() -> Self {
        Self::new(10)
    }
}

fn render_item(item: &CalendarItem, day: NaiveDate) -> String {
    match item.kind() {
        ItemKind::Task {
            deadline,
            completed,
            date,
        } => {
            let check = if *completed { 'x' } else { ' ' };
            let mut line = format!("[{}] {}", check, item.name());
            if let Some(deadline) = deadline {
                if *deadline == day && *date != day {
                    line.push_str(" (due today)");
                } else {
                    line.push_str(&format!(" (due {})", deadline.format("%m/%d")));
                }
            }
            line
        }
        ItemKind::Event {
            start_date,
            end_date,
        } if start_date == end_date => format!("=== {}", item.name()),
        ItemKind::Event {
            start_date,
            end_date,
        } => format!(
            "=== {} ({}-{})",
            item.name(),
            start_date.format("%m/%d"),
            end_date.format("%m/%d")
        ),
    }
}
