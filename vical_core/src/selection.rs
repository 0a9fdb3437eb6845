//! Cursor state: selected date, item and subcalendar

use chrono::NaiveDate;

/// What the cursor points at
///
/// `item_index` indexes [`Calendar::items_on`](crate::model::Calendar::items_on)
/// for `date` and is clamped by the editor whenever that list changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub date: NaiveDate,
    pub item_index: usize,
    pub subcal_index: usize,
    /// Set while VISUAL mode is active
    pub visual_anchor: Option<NaiveDate>,
    /// Date selected before the last goto, for the back-jump motion
    pub last_goto: Option<NaiveDate>,
}

impl Selection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            item_index: 0,
            subcal_index: 0,
            visual_anchor: None,
            last_goto: None,
        }
    }

    /// Inclusive, ordered VISUAL range
    pub fn visual_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.visual_anchor.map(|anchor| {
            if anchor <= self.date {
                (anchor, self.date)
            } else {
                (self.date, anchor)
            }
        })
    }
}
