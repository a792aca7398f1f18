//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as ISO 8601
//! dates, list fields as compact JSON arrays (so `json_each` can unnest them
//! in analytics queries), and UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use patsync_core::{
  patent::{Patent, StoredPatent},
  sync::{SyncRunRecord, SyncStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── Timestamps and dates ────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String {
  d.to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse().map_err(|_| Error::DateParse(s.to_owned()))
}

// ─── Sync status ─────────────────────────────────────────────────────────────

pub fn encode_status(s: SyncStatus) -> &'static str {
  match s {
    SyncStatus::Completed => "completed",
    SyncStatus::Failed => "failed",
  }
}

pub fn decode_status(s: &str) -> Result<SyncStatus> {
  match s {
    "completed" => Ok(SyncStatus::Completed),
    "failed" => Ok(SyncStatus::Failed),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── String lists ────────────────────────────────────────────────────────────

pub fn encode_list(items: &[String]) -> Result<String> {
  Ok(serde_json::to_string(items)?)
}

pub fn decode_list(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `patents` row.
pub struct RawPatentRow {
  pub patent_number: String,
  pub title:         String,
  pub abstract_text: String,
  pub assignee:      String,
  pub inventors:     String,
  pub filing_date:   Option<String>,
  pub grant_date:    Option<String>,
  pub cpc_codes:     String,
  pub search_query:  String,
  pub category:      String,
  pub created_at:    String,
  pub updated_at:    String,
}

impl RawPatentRow {
  pub fn into_stored(self) -> Result<StoredPatent> {
    let patent = Patent {
      id:            self.patent_number,
      title:         self.title,
      abstract_text: self.abstract_text,
      assignee:      self.assignee,
      inventors:     decode_list(&self.inventors)?,
      filing_date:   self.filing_date.as_deref().map(decode_date).transpose()?,
      grant_date:    self.grant_date.as_deref().map(decode_date).transpose()?,
      cpc_codes:     decode_list(&self.cpc_codes)?,
      source_query:  self.search_query,
      category:      self.category,
    };

    Ok(StoredPatent {
      patent,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `sync_log` row.
pub struct RawSyncRun {
  pub run_id:         String,
  pub range_from:     String,
  pub range_to:       String,
  pub records_loaded: i64,
  pub query_terms:    String,
  pub sync_status:    String,
  pub created_at:     String,
}

impl RawSyncRun {
  pub fn into_record(self) -> Result<SyncRunRecord> {
    Ok(SyncRunRecord {
      run_id:         decode_uuid(&self.run_id)?,
      range_from:     decode_date(&self.range_from)?,
      range_to:       decode_date(&self.range_to)?,
      records_loaded: self.records_loaded.max(0) as u64,
      query_terms:    decode_list(&self.query_terms)?,
      status:         decode_status(&self.sync_status)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}
