//! Error types for the cache layer.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors that can occur in cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The persistence layer could not be opened or written.
    #[error("cache storage unavailable: {0}")]
    Storage(String),

    /// An HTTP request failed while no fallback applied.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A request key carried a method the HTTP layer does not know.
    #[error("invalid request method: {0}")]
    InvalidMethod(String),

    /// Network-first exhausted both sources: the network send failed and
    /// the dynamic generation has no entry for the key.
    #[error("unreachable: no network and no cached response for {method} {url}")]
    Unreachable { method: String, url: String },

    /// A static install fetch failed; the whole install is abandoned so
    /// no partial static set is ever activated.
    #[error("static install failed at {url}: {reason}")]
    Install { url: String, reason: String },
}
