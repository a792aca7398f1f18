//! The `PatentStore` trait and supporting read-model types.
//!
//! The trait is implemented by storage backends (e.g. `patsync-store-sqlite`).
//! Higher layers (`patsync-sync`, `patsync-cli`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  patent::{Patent, StoredPatent},
  sync::{NewSyncRun, SyncRunRecord},
};

// ─── Analytics read models ───────────────────────────────────────────────────

/// Headline numbers for the whole store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreOverview {
  pub total_patents:    u64,
  pub earliest_filing:  Option<NaiveDate>,
  pub latest_filing:    Option<NaiveDate>,
  pub unique_assignees: u64,
}

/// Patents filed per calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
  pub filing_year:  i32,
  pub patent_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorCount {
  pub inventor:     String,
  pub patent_count: u64,
}

/// Count per 4-character CPC group (e.g. `G06N`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpcGroupCount {
  pub cpc_group:    String,
  pub patent_count: u64,
}

/// Per-assignee filing activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssigneeActivity {
  pub assignee:        String,
  pub total_patents:   u64,
  pub earliest_filing: Option<NaiveDate>,
  pub latest_filing:   Option<NaiveDate>,
  pub active_years:    u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a patsync storage backend.
///
/// `upsert_patent` is keyed on the patent id and fully idempotent: calling it
/// repeatedly with identical input leaves one row with a refreshed
/// `updated_at`. The sync audit log is append-only.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait PatentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Patents ───────────────────────────────────────────────────────────

  /// Insert or update a patent record, keyed on `patent.id`. Never
  /// duplicates a row; `created_at` is preserved across updates.
  fn upsert_patent<'a>(
    &'a self,
    patent: &'a Patent,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve a patent by publication number. Returns `None` if not found.
  fn get_patent<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<StoredPatent>, Self::Error>> + Send + 'a;

  fn patent_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Sync audit log ────────────────────────────────────────────────────

  /// Append one run record and return it with store-assigned `run_id` and
  /// `created_at`.
  fn append_sync_run(
    &self,
    input: NewSyncRun,
  ) -> impl Future<Output = Result<SyncRunRecord, Self::Error>> + Send + '_;

  /// The `range_to` of the most recent run with status `completed`, or
  /// `None` when no run has ever completed. Failed runs are ignored so a
  /// broken pass never advances the incremental-sync watermark.
  fn last_completed_sync(
    &self,
  ) -> impl Future<Output = Result<Option<NaiveDate>, Self::Error>> + Send + '_;

  /// Most recent run records, newest first.
  fn recent_sync_runs(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SyncRunRecord>, Self::Error>> + Send + '_;

  // ── Analytics reads ───────────────────────────────────────────────────

  fn overview(
    &self,
  ) -> impl Future<Output = Result<StoreOverview, Self::Error>> + Send + '_;

  /// Filing counts per year, ascending, for records with a filing date.
  fn filing_trends(
    &self,
  ) -> impl Future<Output = Result<Vec<TrendPoint>, Self::Error>> + Send + '_;

  /// Most prolific inventors, descending by patent count.
  fn top_inventors(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<InventorCount>, Self::Error>> + Send + '_;

  /// Counts per 4-character CPC group, descending.
  fn cpc_breakdown(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CpcGroupCount>, Self::Error>> + Send + '_;

  /// Per-assignee activity, descending by total patents.
  fn assignee_comparison(
    &self,
  ) -> impl Future<Output = Result<Vec<AssigneeActivity>, Self::Error>> + Send + '_;
}
