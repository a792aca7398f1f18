//! `patsync` — scheduled patent collection into a local SQLite store.
//!
//! Reads `patsync.toml` (or the path given with `--config`), overlaid with
//! `PATSYNC_*` environment variables. The scheduler (cron, systemd timer)
//! invokes `patsync sync` once per period; `backfill` and `load` are manual
//! entry points over the same pipeline.
//!
//! # Usage
//!
//! ```
//! patsync sync
//! patsync backfill --from 2025-01-01
//! patsync load --assignee "Intel"
//! patsync stats
//! ```

mod stats;

use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use patsync_core::{
  patent::QueryTerm,
  source::{PatentSource, SearchRequest},
  store::PatentStore,
  sync::SyncSummary,
};
use patsync_store_sqlite::SqliteStore;
use patsync_sync::{CollectorConfig, SyncConfig, SyncService};
use patsync_uspto::{FallbackSource, GooglePatentsClient, UsptoClient, UsptoConfig};
use serde::Deserialize;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "Incremental USPTO patent sync")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "patsync.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Incremental sync over the configured topics, from the last completed
  /// run's watermark up to today.
  Sync,

  /// Exhaustive windowed collection by CPC code over an explicit range.
  Backfill {
    #[arg(long)]
    from: NaiveDate,
    /// Defaults to today.
    #[arg(long)]
    to:   Option<NaiveDate>,
  },

  /// One-shot load of a company's patents by assignee name.
  Load {
    #[arg(long)]
    assignee: String,
    /// Maximum records to fetch.
    #[arg(long, default_value_t = 50)]
    limit:    usize,
  },

  /// Print store analytics: totals, trends, inventors, CPC groups.
  Stats,
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `patsync.toml` and `PATSYNC_*`
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
struct AppConfig {
  /// USPTO ODP API key. Required for everything except `stats`.
  #[serde(default)]
  api_key:              String,
  #[serde(default = "default_store_path")]
  store_path:           PathBuf,
  /// Topic keywords synced by `patsync sync`.
  #[serde(default = "default_topics")]
  topics:               Vec<String>,
  /// CPC codes collected by `patsync backfill`.
  #[serde(default = "default_cpc_codes")]
  cpc_codes:            Vec<String>,
  #[serde(default = "default_page_size")]
  page_size:            usize,
  #[serde(default = "default_max_pages")]
  max_pages_per_window: usize,
  #[serde(default = "default_page_delay_ms")]
  page_delay_ms:        u64,
  /// `range_from` for the first-ever sync.
  #[serde(default = "default_epoch")]
  default_epoch:        NaiveDate,
  /// Substitute Google Patents when the primary source fails.
  #[serde(default = "default_enable_fallback")]
  enable_fallback:      bool,
}

fn default_store_path() -> PathBuf {
  PathBuf::from("patsync.db")
}

fn default_topics() -> Vec<String> {
  [
    "AI data processing",
    "predictive analytics",
    "business intelligence",
  ]
  .map(String::from)
  .to_vec()
}

fn default_cpc_codes() -> Vec<String> {
  // Ordered by AI-specificity; G06F is captured through cross-classification.
  ["G06N", "G06Q", "G06V", "G10L", "G16H"]
    .map(String::from)
    .to_vec()
}

fn default_page_size() -> usize {
  25
}

fn default_max_pages() -> usize {
  20
}

fn default_page_delay_ms() -> u64 {
  500
}

fn default_epoch() -> NaiveDate {
  NaiveDate::from_ymd_opt(2022, 11, 30).expect("valid epoch date")
}

fn default_enable_fallback() -> bool {
  true
}

impl AppConfig {
  fn sync_config(&self) -> SyncConfig {
    SyncConfig {
      collector:     CollectorConfig {
        page_size:            self.page_size,
        max_pages_per_window: self.max_pages_per_window,
        page_delay:           Duration::from_millis(self.page_delay_ms),
      },
      default_epoch: self.default_epoch,
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PATSYNC"))
    .build()
    .context("failed to read configuration")?;
  let app_cfg: AppConfig = settings
    .try_deserialize()
    .context("failed to deserialise configuration")?;

  let store = SqliteStore::open(&app_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", app_cfg.store_path))?;

  // Stats needs no search source (and no API key).
  if matches!(cli.command, Command::Stats) {
    return stats::print_stats(&store).await;
  }

  let uspto = UsptoClient::new(UsptoConfig::new(app_cfg.api_key.clone()))
    .context("failed to build USPTO client")?;

  if app_cfg.enable_fallback {
    let google = GooglePatentsClient::new(Duration::from_secs(30))
      .context("failed to build fallback client")?;
    let source = FallbackSource::new(uspto, google);
    dispatch(cli.command, source, store, app_cfg).await
  } else {
    dispatch(cli.command, uspto, store, app_cfg).await
  }
}

async fn dispatch<S>(
  command: Command,
  source: S,
  store: SqliteStore,
  app_cfg: AppConfig,
) -> anyhow::Result<()>
where
  S: PatentSource,
{
  match command {
    Command::Sync => {
      let terms: Vec<QueryTerm> = app_cfg
        .topics
        .iter()
        .cloned()
        .map(QueryTerm::Topic)
        .collect();
      let service = SyncService::new(source, store, app_cfg.sync_config());
      let summary = service
        .run(&terms, "daily_sync")
        .await
        .context("sync run failed")?;
      report(&summary);
    }

    Command::Backfill { from, to } => {
      let to = to.unwrap_or_else(|| Utc::now().date_naive());
      anyhow::ensure!(from <= to, "--from {from} is after --to {to}");

      let terms: Vec<QueryTerm> = app_cfg
        .cpc_codes
        .iter()
        .cloned()
        .map(QueryTerm::Cpc)
        .collect();
      let service = SyncService::new(source, store, app_cfg.sync_config());
      let summary = service
        .run_range(&terms, from, to, "cpc_collection")
        .await
        .context("backfill failed")?;
      report(&summary);
    }

    Command::Load { assignee, limit } => {
      load_assignee(&source, &store, &assignee, limit).await?;
    }

    Command::Stats => unreachable!("handled before source construction"),
  }

  Ok(())
}

/// One-shot, window-less assignee load. Mirrors the sync pipeline's
/// per-record error handling but skips window planning entirely.
async fn load_assignee<S: PatentSource>(
  source: &S,
  store: &SqliteStore,
  assignee: &str,
  limit: usize,
) -> anyhow::Result<()> {
  let term = QueryTerm::Assignee(assignee.to_owned());
  let request = SearchRequest {
    term:   term.clone(),
    window: None,
    offset: 0,
    limit,
  };

  let patents = source
    .search(&request)
    .await
    .map_err(|e| anyhow::anyhow!("search failed: {e}"))?;
  info!(assignee, found = patents.len(), "loading assignee patents");

  let mut loaded = 0usize;
  for mut patent in patents {
    if patent.id.is_empty() {
      continue;
    }
    patent.source_query = term.provenance();
    patent.category = "assignee_load".to_owned();
    match store.upsert_patent(&patent).await {
      Ok(()) => loaded += 1,
      Err(error) => warn!(id = %patent.id, %error, "upsert failed"),
    }
  }

  println!("Loaded {loaded} patents for assignee {assignee:?}.");
  Ok(())
}

fn report(summary: &SyncSummary) {
  for (term, count) in &summary.per_term {
    println!("  {term}: {count} patents");
  }
  println!(
    "Loaded {} patents ({} distinct) over {} to {}.",
    summary.total_loaded,
    summary.distinct_seen(),
    summary
      .range_from
      .map(|d| d.to_string())
      .unwrap_or_else(|| "-".into()),
    summary
      .range_to
      .map(|d| d.to_string())
      .unwrap_or_else(|| "-".into()),
  );
  if summary.upsert_errors > 0 || summary.windows_incomplete > 0 {
    println!(
      "Warnings: {} upsert errors, {} incomplete windows (next run re-covers them).",
      summary.upsert_errors, summary.windows_incomplete,
    );
  }
}
