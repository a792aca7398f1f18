//! Error type for `patsync-uspto`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The API rejected the key (HTTP 401/403).
  #[error("authentication failed (HTTP {0}) - check API key")]
  Auth(u16),

  /// The source asked us to back off (HTTP 429/503).
  #[error("rate limited (HTTP {0})")]
  RateLimited(u16),

  #[error("unexpected status: HTTP {0}")]
  Status(u16),

  #[error("decode error: {0}")]
  Decode(#[from] serde_json::Error),

  /// Constructing a client without the required API key.
  #[error("no USPTO API key configured")]
  MissingApiKey,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
