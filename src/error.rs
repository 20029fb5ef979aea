//! Error types

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or opening a connection
///
/// The connection helper collapses every variant into a single reported
/// failure; these variants exist so the tagged-result API
/// ([`Connection::connect`](crate::Connection::connect)) can say what went wrong.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration (endpoint, timeout, ...)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The driver could not establish a session
    #[error("connection failed: {0}")]
    ConnectionFailure(String),

    /// Invalid handle state transition
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Actual state
        actual: String,
    },
}

impl Error {
    /// Short label for metrics and logs
    pub fn category(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::ConnectionFailure(_) => "connection",
            Error::InvalidState { .. } => "state",
        }
    }
}

impl From<tokio_postgres::Error> for Error {
    fn from(err: tokio_postgres::Error) -> Self {
        // Keep the server message for database errors (e.g. auth rejected)
        match err.as_db_error() {
            Some(db) => Error::ConnectionFailure(db.to_string()),
            None => Error::ConnectionFailure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("endpoint is empty".into());
        assert_eq!(err.to_string(), "invalid configuration: endpoint is empty");

        let err = Error::ConnectionFailure("connection refused".into());
        assert_eq!(err.to_string(), "connection failed: connection refused");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(Error::Config(String::new()).category(), "config");
        assert_eq!(
            Error::ConnectionFailure(String::new()).category(),
            "connection"
        );
        assert_eq!(
            Error::InvalidState {
                expected: "open".into(),
                actual: "closed".into()
            }
            .category(),
            "state"
        );
    }
}
