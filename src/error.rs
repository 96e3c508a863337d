//! Cache Error Types
//!
//! Every failure a lookup can produce. Errors are `Clone` because a single
//! deduplicated load hands the same outcome to every waiting caller.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The request itself is unusable (e.g. an empty key). Never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No group is registered under the requested name.
    #[error("no such group: {0}")]
    GroupNotFound(String),

    /// The miss-handler failed to produce a value.
    #[error("{0}")]
    Upstream(String),

    /// A remote peer could not serve the value.
    #[error("peer error: {0}")]
    Peer(String),

    /// Setup-time misuse: duplicate registrations, invalid node settings.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<tokio::task::JoinError> for CacheError {
    fn from(e: tokio::task::JoinError) -> Self {
        CacheError::Upstream(format!("load task failed: {}", e))
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
