//! [`SqliteStore`] — the SQLite implementation of [`PatentStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use patsync_core::{
  patent::{Patent, StoredPatent},
  store::{
    AssigneeActivity, CpcGroupCount, InventorCount, PatentStore,
    StoreOverview, TrendPoint,
  },
  sync::{NewSyncRun, SyncRunRecord},
};

use crate::{
  Error, Result,
  encode::{
    RawPatentRow, RawSyncRun, decode_date, encode_date, encode_dt,
    encode_list, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

const PATENT_COLUMNS: &str = "patent_number, title, abstract, assignee, \
   inventors, filing_date, grant_date, cpc_codes, search_query, category, \
   created_at, updated_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A patsync store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── PatentStore impl ────────────────────────────────────────────────────────

impl PatentStore for SqliteStore {
  type Error = Error;

  // ── Patents ───────────────────────────────────────────────────────────────

  async fn upsert_patent(&self, patent: &Patent) -> Result<()> {
    let id            = patent.id.clone();
    let title         = patent.title.clone();
    let abstract_text = patent.abstract_text.clone();
    let assignee      = patent.assignee.clone();
    let inventors     = encode_list(&patent.inventors)?;
    let filing_date   = patent.filing_date.map(encode_date);
    let grant_date    = patent.grant_date.map(encode_date);
    let cpc_codes     = encode_list(&patent.cpc_codes)?;
    let search_query  = patent.source_query.clone();
    let category      = patent.category.clone();
    let now           = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO patents ({PATENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
             ON CONFLICT(patent_number) DO UPDATE SET
               title        = excluded.title,
               abstract     = excluded.abstract,
               assignee     = excluded.assignee,
               inventors    = excluded.inventors,
               filing_date  = excluded.filing_date,
               grant_date   = excluded.grant_date,
               cpc_codes    = excluded.cpc_codes,
               search_query = excluded.search_query,
               category     = excluded.category,
               updated_at   = excluded.updated_at"
          ),
          rusqlite::params![
            id,
            title,
            abstract_text,
            assignee,
            inventors,
            filing_date,
            grant_date,
            cpc_codes,
            search_query,
            category,
            now,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_patent(&self, id: &str) -> Result<Option<StoredPatent>> {
    let id = id.to_owned();

    let raw: Option<RawPatentRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PATENT_COLUMNS} FROM patents WHERE patent_number = ?1"
              ),
              rusqlite::params![id],
              |row| {
                Ok(RawPatentRow {
                  patent_number: row.get(0)?,
                  title:         row.get(1)?,
                  abstract_text: row.get(2)?,
                  assignee:      row.get(3)?,
                  inventors:     row.get(4)?,
                  filing_date:   row.get(5)?,
                  grant_date:    row.get(6)?,
                  cpc_codes:     row.get(7)?,
                  search_query:  row.get(8)?,
                  category:      row.get(9)?,
                  created_at:    row.get(10)?,
                  updated_at:    row.get(11)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPatentRow::into_stored).transpose()
  }

  async fn patent_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM patents", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }

  // ── Sync audit log ────────────────────────────────────────────────────────

  async fn append_sync_run(&self, input: NewSyncRun) -> Result<SyncRunRecord> {
    let record = SyncRunRecord {
      run_id:         Uuid::new_v4(),
      range_from:     input.range_from,
      range_to:       input.range_to,
      records_loaded: input.records_loaded,
      query_terms:    input.query_terms,
      status:         input.status,
      created_at:     Utc::now(),
    };

    let run_id      = encode_uuid(record.run_id);
    let range_from  = encode_date(record.range_from);
    let range_to    = encode_date(record.range_to);
    let loaded      = record.records_loaded as i64;
    let query_terms = encode_list(&record.query_terms)?;
    let status      = encode_status(record.status).to_owned();
    let created_at  = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sync_log (run_id, range_from, range_to,
             records_loaded, query_terms, sync_status, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            run_id, range_from, range_to, loaded, query_terms, status,
            created_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn last_completed_sync(&self) -> Result<Option<NaiveDate>> {
    let raw: Option<String> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT MAX(range_to) FROM sync_log
               WHERE sync_status = 'completed'",
              [],
              |r| r.get(0),
            )
            .optional()?
            .flatten(),
        )
      })
      .await?;

    raw.as_deref().map(decode_date).transpose()
  }

  async fn recent_sync_runs(&self, limit: usize) -> Result<Vec<SyncRunRecord>> {
    let limit = limit as i64;

    let raws: Vec<RawSyncRun> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT run_id, range_from, range_to, records_loaded,
                  query_terms, sync_status, created_at
           FROM sync_log
           ORDER BY created_at DESC, run_id
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawSyncRun {
              run_id:         row.get(0)?,
              range_from:     row.get(1)?,
              range_to:       row.get(2)?,
              records_loaded: row.get(3)?,
              query_terms:    row.get(4)?,
              sync_status:    row.get(5)?,
              created_at:     row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSyncRun::into_record).collect()
  }

  // ── Analytics reads ───────────────────────────────────────────────────────

  async fn overview(&self) -> Result<StoreOverview> {
    let (count, earliest, latest, assignees): (
      i64,
      Option<String>,
      Option<String>,
      i64,
    ) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*),
                  MIN(filing_date),
                  MAX(filing_date),
                  COUNT(DISTINCT CASE WHEN assignee != '' THEN assignee END)
           FROM patents",
          [],
          |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )?)
      })
      .await?;

    Ok(StoreOverview {
      total_patents:    count.max(0) as u64,
      earliest_filing:  earliest.as_deref().map(decode_date).transpose()?,
      latest_filing:    latest.as_deref().map(decode_date).transpose()?,
      unique_assignees: assignees.max(0) as u64,
    })
  }

  async fn filing_trends(&self) -> Result<Vec<TrendPoint>> {
    let rows: Vec<(i64, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT CAST(strftime('%Y', filing_date) AS INTEGER) AS filing_year,
                  COUNT(*)
           FROM patents
           WHERE filing_date IS NOT NULL
           GROUP BY filing_year
           ORDER BY filing_year",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(year, count)| TrendPoint {
          filing_year:  year as i32,
          patent_count: count.max(0) as u64,
        })
        .collect(),
    )
  }

  async fn top_inventors(&self, limit: usize) -> Result<Vec<InventorCount>> {
    let limit = limit as i64;

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT je.value, COUNT(*) AS patent_count
           FROM patents, json_each(patents.inventors) AS je
           GROUP BY je.value
           ORDER BY patent_count DESC, je.value
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(inventor, count)| InventorCount {
          inventor,
          patent_count: count.max(0) as u64,
        })
        .collect(),
    )
  }

  async fn cpc_breakdown(&self, limit: usize) -> Result<Vec<CpcGroupCount>> {
    let limit = limit as i64;

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT substr(je.value, 1, 4) AS cpc_group, COUNT(*) AS patent_count
           FROM patents, json_each(patents.cpc_codes) AS je
           GROUP BY cpc_group
           ORDER BY patent_count DESC, cpc_group
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(cpc_group, count)| CpcGroupCount {
          cpc_group,
          patent_count: count.max(0) as u64,
        })
        .collect(),
    )
  }

  async fn assignee_comparison(&self) -> Result<Vec<AssigneeActivity>> {
    type Row = (String, i64, Option<String>, Option<String>, i64);

    let rows: Vec<Row> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT assignee,
                  COUNT(*) AS total_patents,
                  MIN(filing_date),
                  MAX(filing_date),
                  COUNT(DISTINCT strftime('%Y', filing_date))
           FROM patents
           WHERE assignee != ''
           GROUP BY assignee
           ORDER BY total_patents DESC, assignee",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              row.get(0)?,
              row.get(1)?,
              row.get(2)?,
              row.get(3)?,
              row.get(4)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(assignee, total, earliest, latest, years)| {
        Ok(AssigneeActivity {
          assignee,
          total_patents:   total.max(0) as u64,
          earliest_filing: earliest.as_deref().map(decode_date).transpose()?,
          latest_filing:   latest.as_deref().map(decode_date).transpose()?,
          active_years:    years.max(0) as u64,
        })
      })
      .collect()
  }
}
