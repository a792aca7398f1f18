//! Raw wire shapes for both search backends.
//!
//! Everything here is deliberately loose: every field is defaulted or
//! optional, because both APIs omit fields freely depending on the record.
//! These types exist only as deserialisation targets for the normaliser;
//! they never cross the crate boundary.

use serde::Deserialize;

// ─── USPTO ODP ───────────────────────────────────────────────────────────────

/// Top-level response of `GET /api/v1/patent/applications/search`.
#[derive(Debug, Deserialize)]
pub struct OdpSearchResponse {
  /// Total hits for the query, across all pages.
  #[serde(default)]
  pub count: u64,
  #[serde(default, rename = "patentFileWrapperDataBag")]
  pub results: Vec<OdpFileWrapper>,
}

/// One application file wrapper. Results without the metadata block carry no
/// usable identity and are skipped by the normaliser.
#[derive(Debug, Deserialize)]
pub struct OdpFileWrapper {
  #[serde(rename = "applicationMetaData")]
  pub metadata: Option<OdpApplicationMetaData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OdpApplicationMetaData {
  #[serde(default)]
  pub earliest_publication_number: String,
  #[serde(default)]
  pub invention_title:             String,
  /// May carry a time-of-day suffix (`2024-03-01T00:00:00`).
  #[serde(default)]
  pub filing_date:                 String,
  #[serde(default)]
  pub applicant_bag:               Vec<OdpApplicant>,
  #[serde(default)]
  pub inventor_bag:                Vec<OdpInventor>,
  #[serde(default)]
  pub cpc_classification_bag:      Vec<OdpCpcEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OdpApplicant {
  #[serde(default)]
  pub applicant_name_text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OdpInventor {
  #[serde(default)]
  pub inventor_name_text: String,
}

/// The CPC bag nests codes as objects on some records and plain strings on
/// others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OdpCpcEntry {
  Plain(String),
  Coded {
    #[serde(default, rename = "cpcClassificationText")]
    cpc_classification_text: String,
  },
}

// ─── Google Patents XHR ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GoogleSearchResponse {
  #[serde(default)]
  pub results: GoogleResults,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleResults {
  #[serde(default)]
  pub cluster: Vec<GoogleCluster>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleCluster {
  #[serde(default)]
  pub result: Vec<GoogleClusterItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleClusterItem {
  pub patent: Option<GooglePatent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GooglePatent {
  #[serde(default)]
  pub publication_number: String,
  #[serde(default)]
  pub title:              String,
  /// Abstract excerpt; HTML-ish (`&hellip;`, `<b>` markup).
  #[serde(default)]
  pub snippet:            String,
  #[serde(default)]
  pub assignee:           String,
  #[serde(default)]
  pub inventor:           String,
  #[serde(default)]
  pub filing_date:        String,
  #[serde(default)]
  pub grant_date:         String,
}
