//! Core types and trait definitions for the patsync patent pipeline.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod error;
pub mod patent;
pub mod source;
pub mod store;
pub mod sync;
pub mod window;

pub use error::{Error, Result};
