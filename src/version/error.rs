use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Chart not found: {0}")]
    NotFound(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),

    #[error("Lookup timed out after {0} ms")]
    Timeout(u64),

    #[error("Failed to run lookup command: {0}")]
    Io(#[from] std::io::Error),
}

impl SourceError {
    /// Whether a retry has a reasonable chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            SourceError::RateLimited { .. } | SourceError::Timeout(_) => true,
            SourceError::NotFound(_) | SourceError::Unavailable(_) | SourceError::Io(_) => false,
        }
    }
}
