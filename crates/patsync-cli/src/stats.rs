//! Plain-text analytics printout for `patsync stats`.

use patsync_core::store::PatentStore;
use patsync_store_sqlite::SqliteStore;

const TOP_N: usize = 10;

pub async fn print_stats(store: &SqliteStore) -> anyhow::Result<()> {
  let overview = store.overview().await?;

  println!("Patent store overview");
  println!("  total patents:    {}", overview.total_patents);
  println!("  filing range:     {} to {}", fmt_date(overview.earliest_filing), fmt_date(overview.latest_filing));
  println!("  unique assignees: {}", overview.unique_assignees);

  let trends = store.filing_trends().await?;
  if !trends.is_empty() {
    println!("\nFilings per year");
    for point in &trends {
      println!("  {}: {}", point.filing_year, point.patent_count);
    }
  }

  let inventors = store.top_inventors(TOP_N).await?;
  if !inventors.is_empty() {
    println!("\nTop inventors");
    for entry in &inventors {
      println!("  {:<40} {}", entry.inventor, entry.patent_count);
    }
  }

  let groups = store.cpc_breakdown(TOP_N).await?;
  if !groups.is_empty() {
    println!("\nCPC groups");
    for group in &groups {
      println!("  {:<6} {}", group.cpc_group, group.patent_count);
    }
  }

  let assignees = store.assignee_comparison().await?;
  if !assignees.is_empty() {
    println!("\nAssignee activity");
    for entry in assignees.iter().take(TOP_N) {
      println!(
        "  {:<40} {:>5} patents, {} to {}, {} active years",
        entry.assignee,
        entry.total_patents,
        fmt_date(entry.earliest_filing),
        fmt_date(entry.latest_filing),
        entry.active_years,
      );
    }
  }

  let runs = store.recent_sync_runs(5).await?;
  if !runs.is_empty() {
    println!("\nRecent sync runs");
    for run in &runs {
      println!(
        "  {} {:?} {} to {}: {} loaded ({})",
        run.created_at.format("%Y-%m-%d %H:%M"),
        run.status,
        run.range_from,
        run.range_to,
        run.records_loaded,
        run.query_terms.join(", "),
      );
    }
  }

  Ok(())
}

fn fmt_date(d: Option<chrono::NaiveDate>) -> String {
  d.map(|d| d.to_string()).unwrap_or_else(|| "-".into())
}
