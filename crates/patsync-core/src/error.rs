//! Error types for `patsync-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A caller-supplied date range ends before it starts.
  #[error("empty date range: {from} > {to}")]
  EmptyRange { from: NaiveDate, to: NaiveDate },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
