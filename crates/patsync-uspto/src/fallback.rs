//! Degraded-mode source: the public Google Patents XHR endpoint, and the
//! fallback chain that substitutes it when the primary source fails.

use std::time::Duration;

use patsync_core::{
  patent::{Patent, QueryTerm},
  source::{PatentSource, SearchRequest},
};
use reqwest::{Client, StatusCode, header};

use crate::{
  Error, Result,
  normalize::normalize_google,
  raw::GoogleSearchResponse,
};

/// Default Google Patents XHR endpoint.
pub const GOOGLE_PATENTS_API: &str = "https://patents.google.com/xhr/query";

// The endpoint serves browsers; a bare client UA gets 403s.
const BROWSER_UA: &str =
  "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Keyless fallback client for Google Patents.
///
/// No pagination guarantees: `offset` is ignored by the endpoint, so repeated
/// pages may return the same results. The collector's per-window dedup and
/// page ceiling keep that harmless.
#[derive(Clone)]
pub struct GooglePatentsClient {
  client:   Client,
  base_url: String,
}

impl GooglePatentsClient {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, base_url: GOOGLE_PATENTS_API.to_owned() })
  }

  fn build_query(term: &QueryTerm) -> String {
    match term {
      QueryTerm::Topic(keywords) => format!("({keywords})"),
      QueryTerm::Assignee(company) => format!("assignee={company}"),
      QueryTerm::Cpc(code) => format!("cpc={code}"),
    }
  }
}

impl PatentSource for GooglePatentsClient {
  type Error = Error;

  async fn search(&self, request: &SearchRequest) -> Result<Vec<Patent>> {
    let query = Self::build_query(&request.term);

    let response = self
      .client
      .get(&self.base_url)
      .header(header::USER_AGENT, BROWSER_UA)
      .header(header::ACCEPT, "application/json, text/plain, */*")
      .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
      .header(header::REFERER, "https://patents.google.com/")
      .query(&[
        ("url", query.as_str()),
        ("num", &request.limit.min(100).to_string()),
        ("exp", ""),
        ("output", "json"),
      ])
      .send()
      .await?;

    let status = response.status();
    match status {
      StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE => {
        return Err(Error::RateLimited(status.as_u16()));
      }
      s if !s.is_success() => return Err(Error::Status(status.as_u16())),
      _ => {}
    }

    let payload: GoogleSearchResponse = response.json().await?;

    let patents: Vec<Patent> = payload
      .results
      .cluster
      .into_iter()
      .flat_map(|cluster| cluster.result)
      .filter_map(|item| item.patent)
      .map(normalize_google)
      .take(request.limit)
      .collect();

    tracing::debug!(
      term = %request.term,
      returned = patents.len(),
      "google patents fallback page",
    );

    Ok(patents)
  }
}

// ─── Fallback chain ──────────────────────────────────────────────────────────

/// An ordered pair of sources tried in sequence until one yields a non-empty
/// page.
///
/// The secondary is consulted when the primary errors or answers empty; a
/// secondary failure after a *successful* empty primary page is downgraded
/// to that empty page, since "no results" is the primary's authoritative
/// answer for the window.
#[derive(Clone)]
pub struct FallbackSource<P, F> {
  primary:   P,
  secondary: F,
}

impl<P, F> FallbackSource<P, F>
where
  P: PatentSource<Error = Error>,
  F: PatentSource<Error = Error>,
{
  pub fn new(primary: P, secondary: F) -> Self {
    Self { primary, secondary }
  }
}

impl<P, F> PatentSource for FallbackSource<P, F>
where
  P: PatentSource<Error = Error>,
  F: PatentSource<Error = Error>,
{
  type Error = Error;

  async fn search(&self, request: &SearchRequest) -> Result<Vec<Patent>> {
    match self.primary.search(request).await {
      Ok(patents) if !patents.is_empty() => Ok(patents),
      Ok(empty) => match self.secondary.search(request).await {
        Ok(patents) => Ok(patents),
        Err(error) => {
          tracing::warn!(term = %request.term, %error, "fallback source failed");
          Ok(empty)
        }
      },
      Err(error) => {
        tracing::warn!(
          term = %request.term,
          %error,
          "primary source failed, trying fallback",
        );
        self.secondary.search(request).await
      }
    }
  }
}
