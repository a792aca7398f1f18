//! Pipeline configuration. Passed explicitly into the orchestrator at
//! construction — there is no process-wide state.

use std::time::Duration;

use chrono::NaiveDate;

/// Pagination limits and pacing for one window's collection.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
  /// Results requested per page. 25 is the ODP API's reliable maximum.
  pub page_size:            usize,
  /// Hard stop per window; bounds pagination on a misbehaving source.
  pub max_pages_per_window: usize,
  /// Pause between successive page requests. Never applied before the
  /// first request of a window.
  pub page_delay:           Duration,
}

impl Default for CollectorConfig {
  fn default() -> Self {
    Self {
      page_size:            25,
      max_pages_per_window: 20,
      page_delay:           Duration::from_millis(500),
    }
  }
}

/// Orchestrator settings.
#[derive(Debug, Clone)]
pub struct SyncConfig {
  pub collector:     CollectorConfig,
  /// `range_from` for the first-ever sync, when no completed run exists.
  pub default_epoch: NaiveDate,
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      collector:     CollectorConfig::default(),
      default_epoch: NaiveDate::from_ymd_opt(2022, 11, 30)
        .expect("valid epoch date"),
    }
  }
}
