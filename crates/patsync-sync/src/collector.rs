//! Exhaustive, deduplicated collection of one query term over one window.
//!
//! Drives the source page by page until a short page, the page ceiling, or a
//! source failure. A failure ends only this window: the records already
//! collected are returned and the next scheduled run re-attempts the window,
//! which is safe because the store upsert is idempotent.

use std::collections::HashSet;

use patsync_core::{
  patent::{Patent, QueryTerm},
  source::{PatentSource, SearchRequest},
  window::SyncWindow,
};
use tracing::warn;

use crate::config::CollectorConfig;

/// The output of one window's collection.
#[derive(Debug, Clone)]
pub struct WindowHarvest {
  /// Deduplicated records, in first-seen order.
  pub patents:  Vec<Patent>,
  /// `false` when a source failure cut pagination short; the records
  /// gathered before the failure are still present.
  pub complete: bool,
}

/// Collect every result for `term` within `window`, deduplicating by patent
/// id across pages.
///
/// Restartable: calling again with the same arguments regenerates the same
/// sequence, modulo source-side changes. No retries — eventual completeness
/// comes from the next scheduled run.
pub async fn collect_window<S: PatentSource>(
  source: &S,
  term: &QueryTerm,
  window: SyncWindow,
  config: &CollectorConfig,
) -> WindowHarvest {
  let mut seen: HashSet<String> = HashSet::new();
  let mut patents = Vec::new();

  for page in 0..config.max_pages_per_window {
    if page > 0 {
      tokio::time::sleep(config.page_delay).await;
    }

    let request = SearchRequest {
      term:   term.clone(),
      window: Some(window),
      offset: page * config.page_size,
      limit:  config.page_size,
    };

    let results = match source.search(&request).await {
      Ok(results) => results,
      Err(error) => {
        warn!(%term, %window, page, %error, "window collection aborted");
        return WindowHarvest { patents, complete: false };
      }
    };

    let short_page = results.len() < config.page_size;

    for patent in results {
      if patent.id.is_empty() {
        continue;
      }
      if seen.insert(patent.id.clone()) {
        patents.push(patent);
      }
    }

    if short_page {
      break;
    }
  }

  WindowHarvest { patents, complete: true }
}
