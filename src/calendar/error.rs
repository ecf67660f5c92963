// src/calendar/error.rs
use thiserror::Error;

/// The only failure a caller of `CourtSearch::search` has to handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl SearchError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SearchError::InvalidRequest(msg.into())
    }
}

/// Failure of a single fetch unit. Absorbed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote returned HTTP {0}")]
    Status(u16),
}

impl FetchError {
    /// Worth one immediate retry.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Transport(_) => true,
            FetchError::Status(code) => *code >= 500 || *code == 429,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return FetchError::Timeout;
        }
        if let Some(status) = e.status() {
            return FetchError::Status(status.as_u16());
        }
        FetchError::Transport(e.to_string())
    }
}
