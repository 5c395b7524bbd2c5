//! # Persistence Errors
//!
//! Error types for the persistence layer, wrapping tokio-postgres, IO and
//! config parsing errors.

use thiserror::Error;

/// Persistence layer errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    // === Connection errors ===
    #[error("Failed to connect to database: {0}")]
    Connect(#[source] tokio_postgres::Error),

    #[error("Database did not answer ping: {0}")]
    Ping(#[source] tokio_postgres::Error),

    #[error("Failed to select schema '{schema}': {source}")]
    Namespace {
        schema: String,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Database connection closed")]
    ConnectionClosed,

    // === Procedure errors ===
    #[error("{name} failed: {message}")]
    Procedure { name: &'static str, message: String },

    // === Listener errors ===
    #[error("Notification listener error: {0}")]
    Listener(#[source] tokio_postgres::Error),

    #[error("Notification listener connection closed")]
    ListenerClosed,

    #[error("Notification listener keep-alive failed: {0}")]
    KeepAlive(#[source] tokio_postgres::Error),

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Config file IO error: {0}")]
    ConfigFile(#[from] std::io::Error),

    #[error("Config file parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result type alias for PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;

impl PersistenceError {
    /// Create a procedure error, keeping the server's message when there is one.
    /// A dead connection is reported as `ConnectionClosed` instead.
    pub fn procedure(name: &'static str, source: &tokio_postgres::Error) -> Self {
        if source.is_closed() {
            return Self::ConnectionClosed;
        }
        let message = match source.as_db_error() {
            Some(db) => db.message().to_string(),
            None => source.to_string(),
        };
        Self::Procedure { name, message }
    }

    /// Everything except a failed procedure call ends the process
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Procedure { .. })
    }
}
