//! The canonical patent record and the query-term vocabulary.
//!
//! A [`Patent`] is produced exclusively by a source adapter's normaliser;
//! raw external payload shapes never leak past that boundary. Identity is
//! the publication number — the store upserts on it, so re-ingesting the
//! same patent can never duplicate a row.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ─── Patent ──────────────────────────────────────────────────────────────────

/// A normalised patent record, keyed by publication number.
///
/// String fields may be empty when the backing source omitted them; the
/// record is still worth storing as long as the id is present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patent {
  /// Publication number, e.g. `US11934567B2`. Primary key in the store.
  pub id:            String,
  pub title:         String,
  #[serde(rename = "abstract")]
  pub abstract_text: String,
  /// First listed applicant/assignee when the source names several.
  pub assignee:      String,
  /// Inventor names, in source order.
  pub inventors:     Vec<String>,
  pub filing_date:   Option<NaiveDate>,
  pub grant_date:    Option<NaiveDate>,
  /// CPC classification codes, flattened to plain strings.
  pub cpc_codes:     Vec<String>,
  /// Which query term produced this record. Provenance, not identity.
  pub source_query:  String,
  /// Collection bucket, e.g. `daily_sync` or `cpc_collection`.
  pub category:      String,
}

/// A patent as read back from the store, with the store-assigned timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPatent {
  pub patent:     Patent,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

// ─── Query terms ─────────────────────────────────────────────────────────────

/// One dimension along which the external search source is queried.
///
/// CPC codes are the high-precision alternative to free-text topic search;
/// an assignee term drives one-shot company loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QueryTerm {
  /// Free-text keyword search over invention titles.
  Topic(String),
  /// Applicant/assignee name search.
  Assignee(String),
  /// Cooperative Patent Classification code, e.g. `G06N`.
  Cpc(String),
}

impl QueryTerm {
  /// The string recorded in `source_query` and the sync audit log.
  pub fn provenance(&self) -> String {
    match self {
      QueryTerm::Topic(t) => t.clone(),
      QueryTerm::Assignee(a) => a.clone(),
      QueryTerm::Cpc(code) => format!("CPC:{code}"),
    }
  }
}

impl std::fmt::Display for QueryTerm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.provenance())
  }
}
