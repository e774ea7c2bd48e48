//! Error types for the core library.

use thiserror::Error;

use crate::config::StoreError;
use crate::session::ConnectionFailure;
use crate::transport::TransportError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An operation needing a connection ran before `configure`.
    #[error("Mail provider is not configured")]
    NotConfigured,

    /// Connecting or logging in failed.
    ///
    /// The message is the transport's own, unchanged; `kind` is diagnostic only.
    #[error("{source}")]
    Connection {
        /// Best-effort classification of the failure.
        kind: ConnectionFailure,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },

    /// The server returned no raw source for a message.
    #[error("Message source unavailable for message {id}")]
    SourceUnavailable {
        /// Mailbox-scoped message identifier.
        id: String,
    },

    /// Search, fetch, or flag mutation failed at the protocol layer.
    #[error("{operation} failed: {source}")]
    Protocol {
        /// Name of the failed operation.
        operation: &'static str,
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },

    /// Raw message source could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] mailparse::MailParseError),

    /// Message identifier is not a valid UID.
    #[error("Invalid message id: {0:?}")]
    InvalidId(String),

    /// Credential storage error.
    #[error("Credential store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    /// Returns the connection failure classification, if this is a connection error.
    #[must_use]
    pub const fn connection_failure(&self) -> Option<ConnectionFailure> {
        match self {
            Self::Connection { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
