//! Sync-run audit records and the per-run summary.
//!
//! One [`SyncRunRecord`] is appended per orchestration pass and never
//! mutated; the next run reads the most recent *completed* record to decide
//! where its own range starts.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Audit log ───────────────────────────────────────────────────────────────

/// Outcome of one orchestration pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
  /// The pass finished; individual record failures may still have occurred.
  Completed,
  /// The pass made no progress. A failed run never advances the watermark.
  Failed,
}

/// Input for appending one row to the sync audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSyncRun {
  pub range_from:     NaiveDate,
  pub range_to:       NaiveDate,
  pub records_loaded: u64,
  /// Provenance strings of the query terms used, in execution order.
  pub query_terms:    Vec<String>,
  pub status:         SyncStatus,
}

/// A persisted sync-run record. `run_id` and `created_at` are assigned by
/// the store on append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRunRecord {
  pub run_id:         Uuid,
  pub range_from:     NaiveDate,
  pub range_to:       NaiveDate,
  pub records_loaded: u64,
  pub query_terms:    Vec<String>,
  pub status:         SyncStatus,
  pub created_at:     DateTime<Utc>,
}

// ─── Run summary ─────────────────────────────────────────────────────────────

/// What one orchestrator run accomplished. Returned to the caller and logged;
/// the store's upsert remains the actual dedup authority.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSummary {
  pub range_from:         Option<NaiveDate>,
  pub range_to:           Option<NaiveDate>,
  /// `(term provenance, records upserted)` per query term, in order.
  pub per_term:           Vec<(String, u64)>,
  pub total_loaded:       u64,
  /// Individual upserts that failed and were skipped.
  pub upsert_errors:      u64,
  /// Windows whose collection was cut short by a source failure.
  pub windows_incomplete: u64,
  /// Distinct ids seen across the whole run. Reporting only.
  pub seen_ids:           HashSet<String>,
}

impl SyncSummary {
  pub fn new(range_from: NaiveDate, range_to: NaiveDate) -> Self {
    Self {
      range_from: Some(range_from),
      range_to: Some(range_to),
      ..Self::default()
    }
  }

  pub fn distinct_seen(&self) -> usize {
    self.seen_ids.len()
  }
}
