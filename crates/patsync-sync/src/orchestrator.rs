//! The sync orchestrator: plans windows, drives the collector, upserts each
//! record, and appends one audit row per run.
//!
//! Strictly sequential: one term and one window at a time, matching the
//! external source's rate limits. Upserts are commutative and idempotent per
//! id, so ordering affects only log readability.

use chrono::{NaiveDate, Utc};
use patsync_core::{
  patent::QueryTerm,
  source::PatentSource,
  store::PatentStore,
  sync::{NewSyncRun, SyncStatus, SyncSummary},
  window::plan_windows,
};
use tracing::{info, warn};

use crate::{
  Error, Result,
  collector::collect_window,
  config::SyncConfig,
};

/// One-pass sync pipeline over a source/store pair.
///
/// The store handle is held for the whole run and every upsert plus the
/// final audit insert goes through it.
pub struct SyncService<S, St> {
  source: S,
  store:  St,
  config: SyncConfig,
}

impl<S, St> SyncService<S, St>
where
  S: PatentSource,
  St: PatentStore,
{
  pub fn new(source: S, store: St, config: SyncConfig) -> Self {
    Self { source, store, config }
  }

  /// Incremental sync: from the last completed run's `range_to` (or the
  /// configured epoch when none exists) up to today.
  ///
  /// An unreadable watermark is fatal: nothing has been collected yet, so
  /// the pass aborts. A `failed` audit row is appended on a best-effort
  /// basis first, so the abort shows up in the sync log when the connection
  /// still accepts writes. This is the only path that records a failed run;
  /// later errors either degrade the pass (incomplete windows, skipped
  /// upserts) and still finalise as `completed`, or happen inside the audit
  /// write itself where no record can be left behind.
  pub async fn run(
    &self,
    terms: &[QueryTerm],
    category: &str,
  ) -> Result<SyncSummary> {
    let to = Utc::now().date_naive();
    let from = match self.store.last_completed_sync().await {
      Ok(watermark) => watermark.unwrap_or(self.config.default_epoch),
      Err(error) => {
        warn!(%error, "watermark read failed, aborting the pass");
        let _ = self
          .store
          .append_sync_run(NewSyncRun {
            range_from:     self.config.default_epoch,
            range_to:       to,
            records_loaded: 0,
            query_terms:    terms.iter().map(QueryTerm::provenance).collect(),
            status:         SyncStatus::Failed,
          })
          .await;
        return Err(Error::store(error));
      }
    };

    self.run_range(terms, from, to, category).await
  }

  /// Run the collect-and-load pass over an explicit inclusive date range.
  /// Used directly by backfills.
  pub async fn run_range(
    &self,
    terms: &[QueryTerm],
    from: NaiveDate,
    to: NaiveDate,
    category: &str,
  ) -> Result<SyncSummary> {
    let windows = plan_windows(from, to);
    info!(
      %from,
      %to,
      windows = windows.len(),
      terms = terms.len(),
      "sync pass starting",
    );

    let mut summary = SyncSummary::new(from, to);

    for term in terms {
      let mut term_loaded: u64 = 0;

      for window in &windows {
        let harvest =
          collect_window(&self.source, term, *window, &self.config.collector)
            .await;
        if !harvest.complete {
          summary.windows_incomplete += 1;
        }

        for mut patent in harvest.patents {
          summary.seen_ids.insert(patent.id.clone());
          patent.source_query = term.provenance();
          patent.category = category.to_owned();

          match self.store.upsert_patent(&patent).await {
            Ok(()) => term_loaded += 1,
            Err(error) => {
              warn!(id = %patent.id, %error, "upsert failed, skipping record");
              summary.upsert_errors += 1;
            }
          }
        }
      }

      info!(term = %term, loaded = term_loaded, "term synced");
      summary.per_term.push((term.provenance(), term_loaded));
      summary.total_loaded += term_loaded;
    }

    let record = self
      .store
      .append_sync_run(NewSyncRun {
        range_from:     from,
        range_to:       to,
        records_loaded: summary.total_loaded,
        query_terms:    terms.iter().map(QueryTerm::provenance).collect(),
        status:         SyncStatus::Completed,
      })
      .await
      .map_err(Error::audit)?;

    info!(
      run_id = %record.run_id,
      loaded = summary.total_loaded,
      distinct = summary.distinct_seen(),
      upsert_errors = summary.upsert_errors,
      incomplete_windows = summary.windows_incomplete,
      "sync pass complete",
    );

    Ok(summary)
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::Mutex,
  };

  use chrono::Days;
  use patsync_core::{
    patent::{Patent, StoredPatent},
    source::SearchRequest,
    store::{
      AssigneeActivity, CpcGroupCount, InventorCount, StoreOverview,
      TrendPoint,
    },
    sync::SyncRunRecord,
  };
  use patsync_store_sqlite::SqliteStore;

  use super::*;
  use crate::config::CollectorConfig;

  #[derive(Debug, thiserror::Error)]
  #[error("mock failure: {0}")]
  struct MockError(String);

  fn patent(id: &str) -> Patent {
    Patent { id: id.into(), title: format!("patent {id}"), ..Patent::default() }
  }

  fn test_config(epoch: NaiveDate) -> SyncConfig {
    SyncConfig {
      collector:     CollectorConfig {
        page_size:            3,
        max_pages_per_window: 5,
        page_delay:           std::time::Duration::ZERO,
      },
      default_epoch: epoch,
    }
  }

  fn d(s: &str) -> NaiveDate {
    s.parse().unwrap()
  }

  // ── Mock source ───────────────────────────────────────────────────────────

  /// One short page of ids derived from the window's month, per request.
  struct MonthlySource;

  impl PatentSource for MonthlySource {
    type Error = MockError;

    async fn search(
      &self,
      request: &SearchRequest,
    ) -> Result<Vec<Patent>, MockError> {
      let window = request.window.expect("orchestrator always sets a window");
      Ok(vec![patent(&format!("US-{}", window.start))])
    }
  }

  /// Errors for windows starting in `failing_month`, one short page elsewhere.
  struct FlakyMonthSource {
    failing_month: u32,
  }

  impl PatentSource for FlakyMonthSource {
    type Error = MockError;

    async fn search(
      &self,
      request: &SearchRequest,
    ) -> Result<Vec<Patent>, MockError> {
      use chrono::Datelike;
      let window = request.window.expect("window set");
      if window.start.month() == self.failing_month {
        return Err(MockError("source down".into()));
      }
      Ok(vec![patent(&format!("US-{}", window.start))])
    }
  }

  /// Never returns anything.
  struct EmptySource;

  impl PatentSource for EmptySource {
    type Error = MockError;

    async fn search(
      &self,
      _request: &SearchRequest,
    ) -> Result<Vec<Patent>, MockError> {
      Ok(Vec::new())
    }
  }

  // ── Mock store with switchable faults ─────────────────────────────────────

  /// In-memory store with three configurable faults: rejecting one upsert id,
  /// failing the watermark read, or failing the audit append. Everything the
  /// orchestrator touches is implemented; analytics reads stay empty.
  struct FaultyStore {
    poison_id:      Option<String>,
    fail_watermark: bool,
    fail_audit:     bool,
    patents:        Mutex<HashMap<String, Patent>>,
    runs:           Mutex<Vec<SyncRunRecord>>,
  }

  impl FaultyStore {
    fn healthy() -> Self {
      Self {
        poison_id:      None,
        fail_watermark: false,
        fail_audit:     false,
        patents:        Mutex::new(HashMap::new()),
        runs:           Mutex::new(Vec::new()),
      }
    }

    fn rejecting(poison_id: &str) -> Self {
      Self { poison_id: Some(poison_id.into()), ..Self::healthy() }
    }

    fn failing_watermark() -> Self {
      Self { fail_watermark: true, ..Self::healthy() }
    }

    fn failing_audit() -> Self {
      Self { fail_audit: true, ..Self::healthy() }
    }
  }

  impl PatentStore for FaultyStore {
    type Error = MockError;

    async fn upsert_patent(&self, patent: &Patent) -> Result<(), MockError> {
      if self.poison_id.as_deref() == Some(patent.id.as_str()) {
        return Err(MockError(format!("constraint violation on {}", patent.id)));
      }
      self
        .patents
        .lock()
        .unwrap()
        .insert(patent.id.clone(), patent.clone());
      Ok(())
    }

    async fn get_patent(
      &self,
      id: &str,
    ) -> Result<Option<StoredPatent>, MockError> {
      Ok(self.patents.lock().unwrap().get(id).map(|p| StoredPatent {
        patent:     p.clone(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
      }))
    }

    async fn patent_count(&self) -> Result<u64, MockError> {
      Ok(self.patents.lock().unwrap().len() as u64)
    }

    async fn append_sync_run(
      &self,
      input: NewSyncRun,
    ) -> Result<SyncRunRecord, MockError> {
      if self.fail_audit {
        return Err(MockError("sync_log insert rejected".into()));
      }
      let record = SyncRunRecord {
        run_id:         uuid::Uuid::new_v4(),
        range_from:     input.range_from,
        range_to:       input.range_to,
        records_loaded: input.records_loaded,
        query_terms:    input.query_terms,
        status:         input.status,
        created_at:     Utc::now(),
      };
      self.runs.lock().unwrap().push(record.clone());
      Ok(record)
    }

    async fn last_completed_sync(&self) -> Result<Option<NaiveDate>, MockError> {
      if self.fail_watermark {
        return Err(MockError("connection lost".into()));
      }
      Ok(
        self
          .runs
          .lock()
          .unwrap()
          .iter()
          .filter(|r| r.status == SyncStatus::Completed)
          .map(|r| r.range_to)
          .max(),
      )
    }

    async fn recent_sync_runs(
      &self,
      limit: usize,
    ) -> Result<Vec<SyncRunRecord>, MockError> {
      let mut runs = self.runs.lock().unwrap().clone();
      runs.reverse();
      runs.truncate(limit);
      Ok(runs)
    }

    async fn overview(&self) -> Result<StoreOverview, MockError> {
      Ok(StoreOverview {
        total_patents:    self.patents.lock().unwrap().len() as u64,
        earliest_filing:  None,
        latest_filing:    None,
        unique_assignees: 0,
      })
    }

    async fn filing_trends(&self) -> Result<Vec<TrendPoint>, MockError> {
      Ok(Vec::new())
    }

    async fn top_inventors(
      &self,
      _limit: usize,
    ) -> Result<Vec<InventorCount>, MockError> {
      Ok(Vec::new())
    }

    async fn cpc_breakdown(
      &self,
      _limit: usize,
    ) -> Result<Vec<CpcGroupCount>, MockError> {
      Ok(Vec::new())
    }

    async fn assignee_comparison(
      &self,
    ) -> Result<Vec<AssigneeActivity>, MockError> {
      Ok(Vec::new())
    }
  }

  // ── Tests ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn run_range_loads_and_stamps_provenance() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let service = SyncService::new(MonthlySource, store, test_config(d("2022-11-30")));

    let terms = [QueryTerm::Topic("predictive analytics".into())];
    let summary = service
      .run_range(&terms, d("2025-01-15"), d("2025-03-10"), "daily_sync")
      .await
      .unwrap();

    // One record per monthly window.
    assert_eq!(summary.total_loaded, 3);
    assert_eq!(summary.per_term, vec![("predictive analytics".to_owned(), 3)]);
    assert_eq!(summary.upsert_errors, 0);
    assert_eq!(summary.distinct_seen(), 3);

    let stored = service
      .store
      .get_patent("US-2025-02-01")
      .await
      .unwrap()
      .expect("february window record");
    assert_eq!(stored.patent.source_query, "predictive analytics");
    assert_eq!(stored.patent.category, "daily_sync");
  }

  #[tokio::test]
  async fn run_range_appends_completed_audit_record() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let service = SyncService::new(MonthlySource, store, test_config(d("2022-11-30")));

    let terms = [
      QueryTerm::Topic("business intelligence".into()),
      QueryTerm::Cpc("G06N".into()),
    ];
    service
      .run_range(&terms, d("2025-02-01"), d("2025-02-28"), "daily_sync")
      .await
      .unwrap();

    let runs = service.store.recent_sync_runs(5).await.unwrap();
    assert_eq!(runs.len(), 1);
    let run = &runs[0];
    assert_eq!(run.status, SyncStatus::Completed);
    assert_eq!(run.range_from, d("2025-02-01"));
    assert_eq!(run.range_to, d("2025-02-28"));
    assert_eq!(run.records_loaded, 2);
    assert_eq!(
      run.query_terms,
      vec!["business intelligence".to_owned(), "CPC:G06N".to_owned()],
    );
  }

  #[tokio::test]
  async fn source_failure_in_one_window_does_not_abort_the_run() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let service = SyncService::new(
      FlakyMonthSource { failing_month: 1 },
      store,
      test_config(d("2022-11-30")),
    );

    let terms = [QueryTerm::Topic("ai".into())];
    let summary = service
      .run_range(&terms, d("2025-01-01"), d("2025-02-28"), "daily_sync")
      .await
      .unwrap();

    assert_eq!(summary.windows_incomplete, 1);
    assert_eq!(summary.total_loaded, 1);
    assert!(
      service
        .store
        .get_patent("US-2025-02-01")
        .await
        .unwrap()
        .is_some()
    );
  }

  #[tokio::test]
  async fn poison_upsert_is_counted_and_skipped() {
    let service = SyncService::new(
      MonthlySource,
      FaultyStore::rejecting("US-2025-02-01"),
      test_config(d("2022-11-30")),
    );

    let terms = [QueryTerm::Topic("ai".into())];
    let summary = service
      .run_range(&terms, d("2025-01-01"), d("2025-03-31"), "daily_sync")
      .await
      .unwrap();

    assert_eq!(summary.upsert_errors, 1);
    assert_eq!(summary.total_loaded, 2);
    // The run still finalises as completed.
    let runs = service.store.recent_sync_runs(1).await.unwrap();
    assert_eq!(runs[0].status, SyncStatus::Completed);
  }

  #[tokio::test]
  async fn first_ever_run_starts_at_the_epoch() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let epoch = Utc::now()
      .date_naive()
      .checked_sub_days(Days::new(10))
      .unwrap();
    let service = SyncService::new(EmptySource, store, test_config(epoch));

    let summary = service
      .run(&[QueryTerm::Topic("ai".into())], "daily_sync")
      .await
      .unwrap();

    assert_eq!(summary.range_from, Some(epoch));
    assert_eq!(summary.range_to, Some(Utc::now().date_naive()));
  }

  #[tokio::test]
  async fn next_run_continues_from_last_completed_range_to() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let today = Utc::now().date_naive();
    let completed_to = today.checked_sub_days(Days::new(7)).unwrap();
    let failed_to = today.checked_sub_days(Days::new(2)).unwrap();

    store
      .append_sync_run(NewSyncRun {
        range_from:     today.checked_sub_days(Days::new(30)).unwrap(),
        range_to:       completed_to,
        records_loaded: 12,
        query_terms:    vec!["ai".into()],
        status:         SyncStatus::Completed,
      })
      .await
      .unwrap();

    // A later failed run must not advance the watermark.
    store
      .append_sync_run(NewSyncRun {
        range_from:     completed_to,
        range_to:       failed_to,
        records_loaded: 0,
        query_terms:    vec!["ai".into()],
        status:         SyncStatus::Failed,
      })
      .await
      .unwrap();

    let epoch = d("2022-11-30");
    let service = SyncService::new(EmptySource, store, test_config(epoch));
    let summary = service
      .run(&[QueryTerm::Topic("ai".into())], "daily_sync")
      .await
      .unwrap();

    assert_eq!(summary.range_from, Some(completed_to));
  }

  #[tokio::test]
  async fn unreadable_watermark_aborts_and_leaves_a_failed_run() {
    let service = SyncService::new(
      MonthlySource,
      FaultyStore::failing_watermark(),
      test_config(d("2022-11-30")),
    );

    let error = service
      .run(&[QueryTerm::Topic("ai".into())], "daily_sync")
      .await
      .unwrap_err();

    assert!(matches!(error, Error::Store(_)));
    // Nothing was collected, but the abort is visible in the sync log.
    assert_eq!(service.store.patent_count().await.unwrap(), 0);
    let runs = service.store.recent_sync_runs(5).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, SyncStatus::Failed);
    assert_eq!(runs[0].records_loaded, 0);
  }

  #[tokio::test]
  async fn audit_write_failure_is_fatal_but_keeps_committed_upserts() {
    let service = SyncService::new(
      MonthlySource,
      FaultyStore::failing_audit(),
      test_config(d("2022-11-30")),
    );

    let error = service
      .run_range(
        &[QueryTerm::Topic("ai".into())],
        d("2025-01-01"),
        d("2025-02-28"),
        "daily_sync",
      )
      .await
      .unwrap_err();

    assert!(matches!(error, Error::Audit(_)));
    // One record per monthly window was already upserted; no rollback.
    assert_eq!(service.store.patent_count().await.unwrap(), 2);
  }

  #[tokio::test]
  async fn empty_range_yields_empty_completed_run() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let service = SyncService::new(MonthlySource, store, test_config(d("2022-11-30")));

    let summary = service
      .run_range(
        &[QueryTerm::Topic("ai".into())],
        d("2025-03-02"),
        d("2025-03-01"),
        "daily_sync",
      )
      .await
      .unwrap();

    assert_eq!(summary.total_loaded, 0);
    assert_eq!(service.store.patent_count().await.unwrap(), 0);
  }
}
