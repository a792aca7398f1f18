//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use patsync_core::{
  patent::Patent,
  store::PatentStore,
  sync::{NewSyncRun, SyncStatus},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn d(s: &str) -> NaiveDate {
  s.parse().unwrap()
}

fn sample_patent(id: &str) -> Patent {
  Patent {
    id:            id.into(),
    title:         "Adaptive data pipeline".into(),
    abstract_text: "A method for processing data.".into(),
    assignee:      "Initech LLC".into(),
    inventors:     vec!["Ada Lovelace".into(), "Charles Babbage".into()],
    filing_date:   Some(d("2024-03-01")),
    grant_date:    None,
    cpc_codes:     vec!["G06N 20/00".into(), "G06Q 10/06".into()],
    source_query:  "predictive analytics".into(),
    category:      "daily_sync".into(),
  }
}

fn run_input(from: &str, to: &str, status: SyncStatus) -> NewSyncRun {
  NewSyncRun {
    range_from:     d(from),
    range_to:       d(to),
    records_loaded: 42,
    query_terms:    vec!["ai".into(), "CPC:G06N".into()],
    status,
  }
}

// ─── Upserts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_and_get_roundtrip() {
  let s = store().await;
  let patent = sample_patent("US20250012345A1");

  s.upsert_patent(&patent).await.unwrap();

  let stored = s.get_patent("US20250012345A1").await.unwrap().unwrap();
  assert_eq!(stored.patent, patent);
  assert!(stored.updated_at >= stored.created_at);
}

#[tokio::test]
async fn get_missing_patent_returns_none() {
  let s = store().await;
  assert!(s.get_patent("US0").await.unwrap().is_none());
}

#[tokio::test]
async fn upsert_twice_is_idempotent() {
  let s = store().await;
  let patent = sample_patent("US1");

  s.upsert_patent(&patent).await.unwrap();
  s.upsert_patent(&patent).await.unwrap();

  assert_eq!(s.patent_count().await.unwrap(), 1);
  let stored = s.get_patent("US1").await.unwrap().unwrap();
  assert_eq!(stored.patent, patent);
  assert!(stored.updated_at >= stored.created_at);
}

#[tokio::test]
async fn upsert_overwrites_fields_in_place() {
  let s = store().await;
  let mut patent = sample_patent("US1");
  s.upsert_patent(&patent).await.unwrap();

  patent.title = "Corrected title".into();
  patent.assignee = "Globex".into();
  s.upsert_patent(&patent).await.unwrap();

  assert_eq!(s.patent_count().await.unwrap(), 1);
  let stored = s.get_patent("US1").await.unwrap().unwrap();
  assert_eq!(stored.patent.title, "Corrected title");
  assert_eq!(stored.patent.assignee, "Globex");
}

#[tokio::test]
async fn upsert_preserves_created_at() {
  let s = store().await;
  let patent = sample_patent("US1");

  s.upsert_patent(&patent).await.unwrap();
  let first = s.get_patent("US1").await.unwrap().unwrap();

  s.upsert_patent(&patent).await.unwrap();
  let second = s.get_patent("US1").await.unwrap().unwrap();

  assert_eq!(second.created_at, first.created_at);
  assert!(second.updated_at >= first.updated_at);
}

#[tokio::test]
async fn upsert_accepts_sparse_record() {
  let s = store().await;
  let patent = Patent { id: "US2".into(), ..Patent::default() };

  s.upsert_patent(&patent).await.unwrap();

  let stored = s.get_patent("US2").await.unwrap().unwrap();
  assert!(stored.patent.title.is_empty());
  assert!(stored.patent.inventors.is_empty());
  assert_eq!(stored.patent.filing_date, None);
}

// ─── Sync audit log ──────────────────────────────────────────────────────────

#[tokio::test]
async fn append_sync_run_assigns_id_and_timestamp() {
  let s = store().await;
  let record = s
    .append_sync_run(run_input("2025-01-01", "2025-02-01", SyncStatus::Completed))
    .await
    .unwrap();

  assert_eq!(record.range_from, d("2025-01-01"));
  assert_eq!(record.status, SyncStatus::Completed);

  let runs = s.recent_sync_runs(10).await.unwrap();
  assert_eq!(runs.len(), 1);
  assert_eq!(runs[0].run_id, record.run_id);
  assert_eq!(runs[0].query_terms, vec!["ai", "CPC:G06N"]);
  assert_eq!(runs[0].records_loaded, 42);
}

#[tokio::test]
async fn last_completed_sync_empty_store() {
  let s = store().await;
  assert_eq!(s.last_completed_sync().await.unwrap(), None);
}

#[tokio::test]
async fn last_completed_sync_takes_latest_completed() {
  let s = store().await;
  s.append_sync_run(run_input("2025-01-01", "2025-02-01", SyncStatus::Completed))
    .await
    .unwrap();
  s.append_sync_run(run_input("2025-02-01", "2025-03-01", SyncStatus::Completed))
    .await
    .unwrap();

  assert_eq!(s.last_completed_sync().await.unwrap(), Some(d("2025-03-01")));
}

#[tokio::test]
async fn failed_runs_never_advance_the_watermark() {
  let s = store().await;
  s.append_sync_run(run_input("2025-01-01", "2025-02-01", SyncStatus::Completed))
    .await
    .unwrap();
  s.append_sync_run(run_input("2025-02-01", "2025-03-15", SyncStatus::Failed))
    .await
    .unwrap();

  assert_eq!(s.last_completed_sync().await.unwrap(), Some(d("2025-02-01")));
}

#[tokio::test]
async fn only_failed_runs_means_no_watermark() {
  let s = store().await;
  s.append_sync_run(run_input("2025-01-01", "2025-02-01", SyncStatus::Failed))
    .await
    .unwrap();

  assert_eq!(s.last_completed_sync().await.unwrap(), None);
}

// ─── Analytics ───────────────────────────────────────────────────────────────

async fn seed_analytics(s: &SqliteStore) {
  let mut a = sample_patent("US1");
  a.filing_date = Some(d("2023-05-10"));
  a.assignee = "Initech LLC".into();
  a.inventors = vec!["Ada Lovelace".into()];
  a.cpc_codes = vec!["G06N 20/00".into()];

  let mut b = sample_patent("US2");
  b.filing_date = Some(d("2023-11-02"));
  b.assignee = "Initech LLC".into();
  b.inventors = vec!["Ada Lovelace".into(), "Grace Hopper".into()];
  b.cpc_codes = vec!["G06N 3/08".into(), "G06V 10/70".into()];

  let mut c = sample_patent("US3");
  c.filing_date = Some(d("2024-01-20"));
  c.assignee = "Globex".into();
  c.inventors = vec!["Grace Hopper".into()];
  c.cpc_codes = vec!["G06V 10/70".into()];

  let mut d_ = sample_patent("US4");
  d_.filing_date = None;
  d_.assignee = String::new();
  d_.inventors = Vec::new();
  d_.cpc_codes = Vec::new();

  for p in [&a, &b, &c, &d_] {
    s.upsert_patent(p).await.unwrap();
  }
}

#[tokio::test]
async fn overview_counts_and_spans() {
  let s = store().await;
  seed_analytics(&s).await;

  let overview = s.overview().await.unwrap();
  assert_eq!(overview.total_patents, 4);
  assert_eq!(overview.earliest_filing, Some(d("2023-05-10")));
  assert_eq!(overview.latest_filing, Some(d("2024-01-20")));
  // The empty assignee is not counted.
  assert_eq!(overview.unique_assignees, 2);
}

#[tokio::test]
async fn overview_of_empty_store() {
  let s = store().await;
  let overview = s.overview().await.unwrap();
  assert_eq!(overview.total_patents, 0);
  assert_eq!(overview.earliest_filing, None);
  assert_eq!(overview.latest_filing, None);
}

#[tokio::test]
async fn filing_trends_by_year() {
  let s = store().await;
  seed_analytics(&s).await;

  let trends = s.filing_trends().await.unwrap();
  let pairs: Vec<(i32, u64)> = trends
    .iter()
    .map(|t| (t.filing_year, t.patent_count))
    .collect();
  assert_eq!(pairs, vec![(2023, 2), (2024, 1)]);
}

#[tokio::test]
async fn top_inventors_unnests_json_arrays() {
  let s = store().await;
  seed_analytics(&s).await;

  let inventors = s.top_inventors(10).await.unwrap();
  assert_eq!(inventors[0].inventor, "Ada Lovelace");
  assert_eq!(inventors[0].patent_count, 2);
  assert_eq!(inventors[1].inventor, "Grace Hopper");
  assert_eq!(inventors[1].patent_count, 2);
  assert_eq!(inventors.len(), 2);
}

#[tokio::test]
async fn cpc_breakdown_groups_by_prefix() {
  let s = store().await;
  seed_analytics(&s).await;

  let groups = s.cpc_breakdown(10).await.unwrap();
  let pairs: Vec<(&str, u64)> = groups
    .iter()
    .map(|g| (g.cpc_group.as_str(), g.patent_count))
    .collect();
  assert_eq!(pairs, vec![("G06N", 2), ("G06V", 2)]);
}

#[tokio::test]
async fn assignee_comparison_orders_by_volume() {
  let s = store().await;
  seed_analytics(&s).await;

  let activity = s.assignee_comparison().await.unwrap();
  assert_eq!(activity.len(), 2);
  assert_eq!(activity[0].assignee, "Initech LLC");
  assert_eq!(activity[0].total_patents, 2);
  assert_eq!(activity[0].earliest_filing, Some(d("2023-05-10")));
  assert_eq!(activity[0].latest_filing, Some(d("2023-11-02")));
  assert_eq!(activity[0].active_years, 1);
  assert_eq!(activity[1].assignee, "Globex");
  assert_eq!(activity[1].active_years, 1);
}
