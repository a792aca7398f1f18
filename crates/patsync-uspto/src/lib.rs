//! External search source adapters for the patsync pipeline.
//!
//! Primary source: the USPTO Open Data Portal search API (requires an API
//! key). Fallback: the public Google Patents XHR endpoint, which needs no
//! key but offers no pagination guarantees. Both adapters normalise their
//! raw payloads into [`patsync_core::patent::Patent`] before anything else
//! sees them.

mod client;
mod fallback;
mod normalize;
mod raw;

pub mod error;

pub use client::{UsptoClient, UsptoConfig};
pub use error::{Error, Result};
pub use fallback::{FallbackSource, GooglePatentsClient};
