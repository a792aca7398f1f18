//! Incremental collection pipeline: the paginated window collector and the
//! sync orchestrator.
//!
//! Both are generic over the [`patsync_core::source::PatentSource`] and
//! [`patsync_core::store::PatentStore`] seams, so the whole pipeline runs
//! unchanged against mock sources in tests and real HTTP/SQLite backends in
//! production.

mod collector;
mod config;
mod orchestrator;

pub mod error;

pub use collector::{WindowHarvest, collect_window};
pub use config::{CollectorConfig, SyncConfig};
pub use error::{Error, Result};
pub use orchestrator::SyncService;
