//! Error type for `patsync-sync`.
//!
//! Only store-side failures escape the orchestrator; source failures are
//! absorbed window-by-window inside the collector.

use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  /// The store could not be read at run start. Nothing was committed.
  #[error("store unavailable: {0}")]
  Store(#[source] Source),

  /// The final audit record could not be written. Upserts already committed
  /// stay committed.
  #[error("audit write failed: {0}")]
  Audit(#[source] Source),
}

impl Error {
  pub(crate) fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn audit(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Audit(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
