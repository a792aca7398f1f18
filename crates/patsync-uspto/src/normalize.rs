//! Mapping from raw source payloads to the canonical [`Patent`] record.
//!
//! This is the single place where external shapes are interpreted. Both
//! normalisers are total over well-typed input and tolerant of missing
//! fields; a result is rejected (`None`) only when it lacks the metadata
//! needed to identify it at all.

use chrono::NaiveDate;
use patsync_core::patent::Patent;

use crate::raw::{GooglePatent, OdpCpcEntry, OdpFileWrapper};

/// Normalise one USPTO ODP result. Returns `None` when the result has no
/// `applicationMetaData` block.
pub fn normalize_odp(wrapper: OdpFileWrapper) -> Option<Patent> {
  let meta = wrapper.metadata?;

  let assignee = meta
    .applicant_bag
    .first()
    .map(|a| a.applicant_name_text.clone())
    .unwrap_or_default();

  let inventors: Vec<String> = meta
    .inventor_bag
    .into_iter()
    .map(|i| i.inventor_name_text)
    .filter(|name| !name.is_empty())
    .collect();

  let mut cpc_codes = Vec::new();
  for entry in meta.cpc_classification_bag {
    let code = match entry {
      OdpCpcEntry::Plain(code) => code,
      OdpCpcEntry::Coded { cpc_classification_text } => cpc_classification_text,
    };
    if !code.is_empty() && !cpc_codes.contains(&code) {
      cpc_codes.push(code);
    }
  }

  Some(Patent {
    id: meta.earliest_publication_number,
    title: meta.invention_title,
    // ODP search payloads don't include the abstract.
    abstract_text: String::new(),
    assignee,
    inventors,
    filing_date: parse_date(&meta.filing_date),
    // Grant date would need a separate lookup.
    grant_date: None,
    cpc_codes,
    source_query: String::new(),
    category: String::new(),
  })
}

/// Normalise one Google Patents fallback result.
pub fn normalize_google(patent: GooglePatent) -> Patent {
  let assignee = patent.assignee.replace("<b>", "").replace("</b>", "");
  let inventors = if patent.inventor.is_empty() {
    Vec::new()
  } else {
    vec![patent.inventor]
  };

  Patent {
    id: patent.publication_number,
    title: patent.title.trim().to_owned(),
    abstract_text: patent.snippet.replace("&hellip;", "..."),
    assignee,
    inventors,
    filing_date: parse_date(&patent.filing_date),
    grant_date: parse_date(&patent.grant_date),
    cpc_codes: Vec::new(),
    source_query: String::new(),
    category: String::new(),
  }
}

/// Parse a source date, truncating any time-of-day component. Malformed or
/// empty input becomes `None` rather than an error.
fn parse_date(raw: &str) -> Option<NaiveDate> {
  let date_part = raw.split('T').next().unwrap_or(raw);
  date_part.parse().ok()
}
