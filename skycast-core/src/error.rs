use thiserror::Error;

/// Failure of a single gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("network error: {0}")]
    Network(String),

    #[error("location not found: {0}")]
    NotFound(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        QueryError::Network(err.to_string())
    }
}

/// Failure reading or writing the persisted history slot.
///
/// These never escape [`crate::history::HistoryCache::restore`] or
/// [`crate::history::HistoryCache::persist`]; they are logged and dropped there.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("history storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("history serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
