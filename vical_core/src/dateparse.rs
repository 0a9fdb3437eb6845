//! Goto date parsing: the count buffer read as a date

use crate::settings::DateFormat;
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("Invalid date length: {0}")]
    InvalidLength(usize),

    #[error("Not a number: {0}")]
    NonDigit(String),

    #[error("No such date: {year:04}-{month:02}-{day:02}")]
    OutOfRange { year: i32, month: u32, day: u32 },
}

/// Resolves a digit string to a date
///
/// | length | layout                              |
/// |--------|-------------------------------------|
/// | 0      | `today`                             |
/// | 1-2    | day of `current`'s month and year    |
/// | 4      | day and month (per `format`), `current`'s year |
/// | 6      | `MMYYYY`, day 1                     |
/// | 8      | day, month (per `format`), `YYYY`    |
pub fn parse_date_string(
    input: &str,
    format: DateFormat,
    current: NaiveDate,
    today: NaiveDate,
) -> Result<NaiveDate, DateParseError> {
    if input.is_empty() {
        return Ok(today);
    }
    if !input.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateParseError::NonDigit(input.to_string()));
    }

    let field = |range: std::ops::Range<usize>| -> u32 {
        input[range].parse().unwrap_or(0)
    };
    let day_month = |a: u32, b: u32| match format {
        DateFormat::Mdy => (b, a),
        DateFormat::Dmy => (a, b),
    };

    let (year, month, day) = match input.len() {
        1 | 2 => (current.year(), current.month(), field(0..input.len())),
        4 => {
            let (day, month) = day_month(field(0..2), field(2..4));
            (current.year(), month, day)
        }
        6 => (field(2..6) as i32, field(0..2), 1),
        8 => {
            let (day, month) = day_month(field(0..2), field(2..4));
            (field(4..8) as i32, month, day)
        }
        len => return Err(DateParseError::InvalidLength(len)),
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateParseError::OutOfRange { year, month, day })
}
