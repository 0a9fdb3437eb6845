//! Editor context: the model plus everything that acts on it
//!
//! One `Editor` owns the calendar, the transaction log, the registers and
//! the cursor. The dispatcher borrows it mutably for each key.

use crate::history::{self, HistoryResult, Recorder, TransactionLog, TxId};
use crate::ids::{ItemId, SubcalId};
use crate::model::{Calendar, CalendarItem, Subcalendar};
use crate::motion::{Motion, MotionTargets};
use crate::register::RegisterStore;
use crate::selection::Selection;
use crate::settings::Settings;
use crate::snapshot::CalendarSnapshot;
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};

/// Transient message shown on the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

pub struct Editor {
    calendar: Calendar,
    history: TransactionLog,
    registers: RegisterStore,
    selection: Selection,
    settings: Settings,
    today: NaiveDate,
    status: Option<StatusLine>,
    redraw: bool,
}

impl Editor {
    /// Creates an editor with the cursor on `today`
    pub fn new(calendar: Calendar, settings: Settings, today: NaiveDate) -> Self {
        Self {
            calendar,
            history: TransactionLog::new(settings.max_history),
            registers: RegisterStore::new(),
            selection: Selection::new(today),
            settings,
            today,
            status: None,
            redraw: true,
        }
    }

    pub fn calendar(&self) -> &Calendar {
        &self.calendar
    }

    pub fn history(&self) -> &TransactionLog {
        &self.history
    }

    pub fn registers(&self) -> &RegisterStore {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterStore {
        &mut self.registers
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selection.date
    }

    /// Items on the selected date, in display order
    pub fn items_on_selected(&self) -> Vec<&CalendarItem> {
        self.calendar.items_on(self.selection.date)
    }

    pub fn selected_item(&self) -> Option<&CalendarItem> {
        self.items_on_selected()
            .get(self.selection.item_index)
            .copied()
    }

    /// The selected item and the `count - 1` items after it on the same day
    pub fn selected_items(&self, count: usize) -> Vec<ItemId> {
        self.items_on_selected()
            .iter()
            .skip(self.selection.item_index)
            .take(count.max(1))
            .map(|item| item.uid().clone())
            .collect()
    }

    pub fn selected_subcal(&self) -> Option<&Subcalendar> {
        self.calendar.subcal_at(self.selection.subcal_index)
    }

    /// Inclusive VISUAL range, `None` outside VISUAL mode
    pub fn selection_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.selection.visual_range()
    }

    pub fn is_visual(&self) -> bool {
        self.selection.visual_anchor.is_some()
    }

    pub fn set_visual(&mut self, active: bool) {
        self.selection.visual_anchor = active.then_some(self.selection.date);
        self.redraw = true;
    }

    /// Runs `f` as one undoable transaction
    pub fn transact<F>(&mut self, label: &str, f: F) -> HistoryResult<Option<TxId>>
    where
        F: FnOnce(&mut Recorder<'_>) -> HistoryResult<()>,
    {
        let committed = history::transact(&mut self.history, &mut self.calendar, label, f)?;
        if committed.is_some() {
            self.clamp_indices();
            self.redraw = true;
        }
        Ok(committed)
    }

    /// Reverts the last transaction, reporting on the status line
    pub fn undo(&mut self) -> HistoryResult<bool> {
        let label = match self.history.undo(&mut self.calendar)? {
            Some(tx) => tx.label().to_string(),
            None => {
                self.notify("Already at oldest change");
                return Ok(false);
            }
        };
        self.clamp_indices();
        self.redraw = true;
        self.notify(format!("Undo: {}", label));
        Ok(true)
    }

    pub fn redo(&mut self) -> HistoryResult<bool> {
        let label = match self.history.redo(&mut self.calendar)? {
            Some(tx) => tx.label().to_string(),
            None => {
                self.notify("Already at newest change");
                return Ok(false);
            }
        };
        self.clamp_indices();
        self.redraw = true;
        self.notify(format!("Redo: {}", label));
        Ok(true)
    }

    /// Moves the cursor along a motion
    ///
    /// A date change resets the item index; crossing into another month
    /// requests a redraw.
    pub fn apply_motion(&mut self, motion: &Motion) {
        let before = self.selection.date;
        motion.apply(&mut self.selection);
        if motion.is_date() {
            if self.selection.date != before {
                self.selection.item_index = 0;
            }
            if (before.year(), before.month())
                != (self.selection.date.year(), self.selection.date.month())
            {
                self.redraw = true;
            }
        }
        self.clamp_indices();
        debug!(
            "event=motion module=editor date={} item_index={}",
            self.selection.date, self.selection.item_index
        );
    }

    /// Records the jump origin for the back-jump motion
    pub fn remember_goto(&mut self) {
        self.selection.last_goto = Some(self.selection.date);
    }

    pub fn last_goto(&self) -> Option<NaiveDate> {
        self.selection.last_goto
    }

    /// Items covered by a motion
    ///
    /// Date motions collect every item occurring in the span; item motions
    /// index into the selected day, dropping out-of-range indices.
    pub fn targets_for_motion(&self, motion: &Motion) -> Vec<ItemId> {
        if let Some((first, last)) = motion.normalized_dates() {
            return self
                .calendar
                .items_in_range(first, last)
                .iter()
                .map(|item| item.uid().clone())
                .collect();
        }
        match motion.expand() {
            MotionTargets::Indices(indices) => {
                let items = self.items_on_selected();
                indices
                    .into_iter()
                    .filter_map(|idx| items.get(idx).map(|item| item.uid().clone()))
                    .collect()
            }
            MotionTargets::Dates(_) => Vec::new(),
        }
    }

    /// Items occurring in the VISUAL range
    pub fn visual_targets(&self) -> Vec<ItemId> {
        match self.selection_range() {
            Some((start, end)) => self
                .calendar
                .items_in_range(start, end)
                .iter()
                .map(|item| item.uid().clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Dates of the VISUAL range, or the selected date alone
    pub fn selected_dates(&self) -> Vec<NaiveDate> {
        let (start, end) = self
            .selection_range()
            .unwrap_or((self.selection.date, self.selection.date));
        start.iter_days().take_while(|d| *d <= end).collect()
    }

    /// Cycles the selected subcalendar by `delta`, wrapping
    pub fn select_subcal_offset(&mut self, delta: i64) {
        let count = self.calendar.subcal_count() as i64;
        if count == 0 {
            return;
        }
        let next = (self.selection.subcal_index as i64 + delta).rem_euclid(count);
        self.selection.subcal_index = next as usize;
        self.redraw = true;
    }

    pub fn select_subcal(&mut self, id: &SubcalId) {
        if let Some(index) = self.calendar.subcal_index(id) {
            self.selection.subcal_index = index;
            self.redraw = true;
        }
    }

    /// Swaps in a freshly loaded calendar and forgets all history
    pub fn replace_calendar(&mut self, calendar: Calendar) {
        info!(
            "event=calendar_replaced module=editor subcals={} items={}",
            calendar.subcal_count(),
            calendar.item_count()
        );
        self.calendar = calendar;
        self.history.clear();
        self.clamp_indices();
        self.redraw = true;
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
        self.redraw = true;
    }

    pub fn notify_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        warn!("event=user_error module=editor message={}", text);
        self.status = Some(StatusLine {
            text,
            is_error: true,
        });
        self.redraw = true;
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Records the current state as saved; call only after a successful save
    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
        info!("event=mark_saved module=editor");
    }

    pub fn is_dirty(&self) -> bool {
        self.history.is_dirty()
    }

    pub fn request_redraw(&mut self) {
        self.redraw = true;
    }

    /// Returns and clears the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    pub fn snapshot(&self) -> CalendarSnapshot {
        CalendarSnapshot {
            subcalendars: self.calendar.subcalendars().to_vec(),
            selected_date: self.selection.date,
            item_index: self.selection.item_index,
            subcal_index: self.selection.subcal_index,
            dirty: self.is_dirty(),
            undo_depth: self.history.undo_len(),
            redo_depth: self.history.redo_len(),
        }
    }

    fn clamp_indices(&mut self) {
        let items = self.items_on_selected().len();
        self.selection.item_index = self.selection.item_index.min(items.saturating_sub(1));
        let subcals = self.calendar.subcal_count();
        self.selection.subcal_index = self.selection.subcal_index.min(subcals.saturating_sub(1));
    }
}
