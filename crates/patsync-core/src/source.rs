//! The `PatentSource` trait — the seam between the pipeline and any external
//! search backend.
//!
//! Implemented by the USPTO ODP adapter and its Google Patents fallback in
//! `patsync-uspto`. The collector and orchestrator depend on this
//! abstraction, not on any concrete HTTP client.

use std::future::Future;

use crate::{
  patent::{Patent, QueryTerm},
  window::SyncWindow,
};

/// Parameters for one page request against a search source.
#[derive(Debug, Clone)]
pub struct SearchRequest {
  pub term:   QueryTerm,
  /// Filing-date filter; `None` means unbounded.
  pub window: Option<SyncWindow>,
  /// Results to skip — `page * limit` for page-by-page traversal.
  pub offset: usize,
  /// Page size. Sources may return fewer results on the last page.
  pub limit:  usize,
}

/// A paginated, rate-limited external patent search backend.
///
/// `search` returns *normalised* records: each adapter owns the mapping from
/// its raw payload shape to [`Patent`] and silently drops results that lack
/// the minimum required structure. Returned records carry empty
/// `source_query`/`category`; the orchestrator stamps provenance before
/// upserting.
pub trait PatentSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch one page of results. An empty vec is a valid answer (no matches,
  /// or pagination exhausted) and is not an error.
  fn search<'a>(
    &'a self,
    request: &'a SearchRequest,
  ) -> impl Future<Output = Result<Vec<Patent>, Self::Error>> + Send + 'a;
}
