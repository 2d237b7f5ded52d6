//! Error types for Murmur Core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API returned status {status}")]
    Api { status: u16 },

    #[error("API reported failure for {0}")]
    Rejected(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("No current user")]
    NoCurrentUser,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True for failures of the remote collaborator (transport or non-2xx).
    ///
    /// These are caught at the call site, logged and degraded to a safe UI
    /// state; nothing else in the client is validated locally beyond
    /// presence checks.
    pub fn is_network_failure(&self) -> bool {
        matches!(
            self,
            Error::Network(_)
                | Error::Http(_)
                | Error::Api { .. }
                | Error::Rejected(_)
                | Error::WebSocket(_)
        )
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Error::Api {
                status: status.as_u16(),
            },
            None => Error::Http(e.to_string()),
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for Error {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        Error::WebSocket(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_failure_taxonomy() {
        assert!(Error::Api { status: 503 }.is_network_failure());
        assert!(Error::Http("connection refused".into()).is_network_failure());
        assert!(Error::Rejected("followUser".into()).is_network_failure());
        assert!(!Error::NoCurrentUser.is_network_failure());
        assert!(!Error::InvalidTimestamp("yesterday".into()).is_network_failure());
    }
}
