//! Async HTTP client for the USPTO Open Data Portal search API.
//!
//! # Query behaviour
//!
//! The ODP API uses Lucene-style field queries and OR-matches multi-word
//! terms by default; topic terms are therefore wrapped in a field scope
//! (`applicationMetaData.inventionTitle:(..)`) and assignee/CPC terms in
//! quoted field matches, which is what keeps result sets relevant.

use std::time::Duration;

use patsync_core::{
  patent::{Patent, QueryTerm},
  source::{PatentSource, SearchRequest},
};
use reqwest::{Client, StatusCode, header};

use crate::{
  Error, Result,
  normalize::normalize_odp,
  raw::OdpSearchResponse,
};

/// Default ODP search endpoint.
pub const USPTO_ODP_API: &str =
  "https://api.uspto.gov/api/v1/patent/applications/search";

/// The API caps a single page at 100 rows.
const MAX_ROWS_PER_REQUEST: usize = 100;

/// Connection settings for the USPTO ODP API.
#[derive(Debug, Clone)]
pub struct UsptoConfig {
  pub api_key:  String,
  pub base_url: String,
  pub timeout:  Duration,
}

impl UsptoConfig {
  pub fn new(api_key: impl Into<String>) -> Self {
    Self {
      api_key:  api_key.into(),
      base_url: USPTO_ODP_API.to_owned(),
      timeout:  Duration::from_secs(30),
    }
  }
}

/// Async client for the USPTO ODP search API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct UsptoClient {
  client: Client,
  config: UsptoConfig,
}

impl UsptoClient {
  pub fn new(config: UsptoConfig) -> Result<Self> {
    if config.api_key.is_empty() {
      return Err(Error::MissingApiKey);
    }
    let client = Client::builder().timeout(config.timeout).build()?;
    Ok(Self { client, config })
  }

  /// Render the Lucene field query for one page request.
  fn build_query(request: &SearchRequest) -> String {
    let mut query = match &request.term {
      QueryTerm::Topic(keywords) => {
        format!("applicationMetaData.inventionTitle:({keywords})")
      }
      QueryTerm::Assignee(company) => format!(
        "applicationMetaData.applicantBag.applicantNameText:\"{company}\""
      ),
      QueryTerm::Cpc(code) => {
        format!("applicationMetaData.cpcClassificationBag:(\"{code}\")")
      }
    };

    if let Some(window) = request.window {
      query.push_str(&format!(
        " AND applicationMetaData.filingDate:[{} TO {}]",
        window.start, window.end,
      ));
    }

    query
  }
}

impl PatentSource for UsptoClient {
  type Error = Error;

  async fn search(&self, request: &SearchRequest) -> Result<Vec<Patent>> {
    let query = Self::build_query(request);
    let rows = request.limit.min(MAX_ROWS_PER_REQUEST);

    let response = self
      .client
      .get(&self.config.base_url)
      .header("X-API-KEY", &self.config.api_key)
      .header(header::ACCEPT, "application/json")
      .query(&[
        ("q", query.as_str()),
        ("rows", &rows.to_string()),
        ("start", &request.offset.to_string()),
      ])
      .send()
      .await?;

    let status = response.status();
    match status {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
        return Err(Error::Auth(status.as_u16()));
      }
      StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
        return Err(Error::RateLimited(status.as_u16()));
      }
      s if !s.is_success() => return Err(Error::Status(status.as_u16())),
      _ => {}
    }

    let body = response.text().await?;
    let payload: OdpSearchResponse = serde_json::from_str(&body)?;

    let patents: Vec<Patent> = payload
      .results
      .into_iter()
      .filter_map(normalize_odp)
      .take(rows)
      .collect();

    tracing::debug!(
      term = %request.term,
      offset = request.offset,
      total_hits = payload.count,
      returned = patents.len(),
      "uspto odp page",
    );

    Ok(patents)
  }
}

#[cfg(test)]
mod tests {
  use patsync_core::window::SyncWindow;

  use super::*;

  fn request(term: QueryTerm, window: Option<SyncWindow>) -> SearchRequest {
    SearchRequest { term, window, offset: 0, limit: 25 }
  }

  #[test]
  fn topic_query_is_field_scoped() {
    let q = UsptoClient::build_query(&request(
      QueryTerm::Topic("predictive analytics".into()),
      None,
    ));
    assert_eq!(q, "applicationMetaData.inventionTitle:(predictive analytics)");
  }

  #[test]
  fn assignee_query_is_quoted() {
    let q = UsptoClient::build_query(&request(
      QueryTerm::Assignee("Intel".into()),
      None,
    ));
    assert_eq!(
      q,
      "applicationMetaData.applicantBag.applicantNameText:\"Intel\"",
    );
  }

  #[test]
  fn date_window_appends_filing_date_range() {
    let window = SyncWindow::new(
      "2025-01-01".parse().unwrap(),
      "2025-01-31".parse().unwrap(),
    )
    .unwrap();
    let q = UsptoClient::build_query(&request(
      QueryTerm::Cpc("G06N".into()),
      Some(window),
    ));
    assert_eq!(
      q,
      "applicationMetaData.cpcClassificationBag:(\"G06N\") \
       AND applicationMetaData.filingDate:[2025-01-01 TO 2025-01-31]",
    );
  }

  #[test]
  fn empty_api_key_is_rejected() {
    assert!(matches!(
      UsptoClient::new(UsptoConfig::new("")),
      Err(Error::MissingApiKey),
    ));
  }
}
