//! Motions: date and item-index spans produced by movement keys

use crate::selection::Selection;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// A span from the current selection to a target
///
/// `end` is where the cursor lands; `start` is where it was. Operators act
/// on the whole inclusive span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Date { start: NaiveDate, end: NaiveDate },
    Item { start: i64, end: i64 },
}

/// Expanded motion targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MotionTargets {
    Dates(Vec<NaiveDate>),
    /// Item indices; callers drop those past the end of the item list
    Indices(Vec<usize>),
}

impl Motion {
    /// Moves the date by `delta` days from `from`
    pub fn date_move(from: NaiveDate, delta: i64) -> Self {
        Motion::Date {
            start: from,
            end: shift(from, delta),
        }
    }

    /// Jumps from `from` to `target`
    pub fn date_set(from: NaiveDate, target: NaiveDate) -> Self {
        Motion::Date {
            start: from,
            end: target,
        }
    }

    /// Moves the item index by `delta` within a list of `len` items
    ///
    /// The end is clamped to the list. An empty list yields `Item(0, 0)`.
    pub fn item_move(current: usize, delta: i64, len: usize) -> Self {
        if len == 0 {
            return Motion::Item { start: 0, end: 0 };
        }
        let start = current.min(len - 1) as i64;
        let end = (start + delta).clamp(0, len as i64 - 1);
        Motion::Item { start, end }
    }

    /// `(min, max)` of the span, as dates
    pub fn normalized_dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            Motion::Date { start, end } => Some((start.min(end), start.max(end))),
            Motion::Item { .. } => None,
        }
    }

    /// `(min, max)` of the span, as item indices
    pub fn normalized_indices(&self) -> Option<(i64, i64)> {
        match *self {
            Motion::Item { start, end } => Some((start.min(end), start.max(end))),
            Motion::Date { .. } => None,
        }
    }

    /// Multiplies the signed span by `n`, keeping `start`
    pub fn scale(&self, n: u32) -> Self {
        let n = i64::from(n);
        match *self {
            Motion::Date { start, end } => Motion::Date {
                start,
                end: shift(start, (end - start).num_days().saturating_mul(n)),
            },
            Motion::Item { start, end } => Motion::Item {
                start,
                end: start.saturating_add((end - start).saturating_mul(n)),
            },
        }
    }

    /// Inclusive sequence of dates or indices covered by the motion
    pub fn expand(&self) -> MotionTargets {
        match *self {
            Motion::Date { start, end } => {
                let (lo, hi) = (start.min(end), start.max(end));
                MotionTargets::Dates(lo.iter_days().take_while(|d| *d <= hi).collect())
            }
            Motion::Item { start, end } => {
                let (lo, hi) = (start.min(end).max(0), start.max(end));
                MotionTargets::Indices((lo..=hi).filter_map(|i| usize::try_from(i).ok()).collect())
            }
        }
    }

    /// Moves the cursor to `end`
    pub fn apply(&self, selection: &mut Selection) {
        match *self {
            Motion::Date { end, .. } => selection.date = end,
            Motion::Item { end, .. } => selection.item_index = usize::try_from(end).unwrap_or(0),
        }
    }

    /// Inclusive day count, 0 for item motions
    pub fn days(&self) -> i64 {
        self.normalized_dates()
            .map(|(lo, hi)| (hi - lo).num_days() + 1)
            .unwrap_or(0)
    }

    /// Signed day distance from `start` to `end`
    pub fn signed_days(&self) -> Option<i64> {
        match *self {
            Motion::Date { start, end } => Some((end - start).num_days()),
            Motion::Item { .. } => None,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Motion::Date { .. })
    }
}

/// Adds days, saturating at the calendar limits
fn shift(date: NaiveDate, delta: i64) -> NaiveDate {
    Duration::try_days(delta)
        .and_then(|d| date.checked_add_signed(d))
        .unwrap_or(if delta < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() - first_day.num_days_from_monday()) % 7;
    shift(date, -i64::from(back))
}

pub fn week_end(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    shift(week_start(date, first_day), 6)
}
