//! Date windows and the calendar-month window planner.
//!
//! The external search API degrades badly on broad queries, so a long date
//! range is partitioned into bounded windows queried one at a time. Windows
//! are contiguous, non-overlapping and ascending; together they cover the
//! requested range exactly.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An inclusive calendar-date range, at most one month wide when produced by
/// [`plan_windows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncWindow {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl SyncWindow {
  /// Build a window, rejecting ranges that end before they start.
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::EmptyRange { from: start, to: end });
    }
    Ok(Self { start, end })
  }
}

impl std::fmt::Display for SyncWindow {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}..{}", self.start, self.end)
  }
}

/// Partition `[from, to]` into calendar-month windows.
///
/// The first window starts exactly at `from` and runs to the end of that
/// month; every later window is a whole month, except the last, whose end is
/// clamped to `to`. Returns an empty vec when `from > to`.
pub fn plan_windows(from: NaiveDate, to: NaiveDate) -> Vec<SyncWindow> {
  let mut windows = Vec::new();
  let mut start = from;

  while start <= to {
    let end = last_day_of_month(start).min(to);
    windows.push(SyncWindow { start, end });
    // First day of the next month (or past `to`, ending the loop).
    start = end
      .checked_add_days(Days::new(1))
      .expect("date overflow far beyond any patent filing date");
  }

  windows
}

fn last_day_of_month(d: NaiveDate) -> NaiveDate {
  use chrono::Datelike;
  let (year, month) = (d.year(), d.month());
  let first_of_next = if month == 12 {
    NaiveDate::from_ymd_opt(year + 1, 1, 1)
  } else {
    NaiveDate::from_ymd_opt(year, month + 1, 1)
  };
  first_of_next
    .and_then(|d| d.checked_sub_days(Days::new(1)))
    .expect("valid month boundary")
}
