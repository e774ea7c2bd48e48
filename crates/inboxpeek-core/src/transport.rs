//! Transport seam.
//!
//! The session engine never talks to a wire protocol directly. It drives a
//! [`MailTransport`], a narrow interface exposing exactly the calls it needs:
//! connect, logout, mailbox selection, UID search, single-message fetch and
//! flag addition. `inboxpeek-imap` provides the IMAP implementation; tests use
//! scripted doubles.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::ServerConfig;

/// Errors reported by a transport implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Network I/O failed.
    #[error("network error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS setup or handshake failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The server rejected a command or sent something unexpected.
    #[error("{0}")]
    Protocol(String),

    /// A command was issued without an open session.
    #[error("not connected to the mail server")]
    NotConnected,
}

/// Server-side search predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchQuery {
    /// Every message in the mailbox.
    All,
    /// Messages without the `\Seen` flag.
    Unseen,
}

/// What to retrieve for a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRequest {
    /// UID, flags, envelope and internal date.
    Headers,
    /// Everything in `Headers` plus the raw source, fetched without setting `\Seen`.
    Source,
}

/// A message flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageFlag {
    /// `\Seen`.
    Seen,
    /// `\Answered`.
    Answered,
    /// `\Flagged`.
    Flagged,
    /// `\Deleted`.
    Deleted,
    /// `\Draft`.
    Draft,
    /// Any server or user keyword.
    Keyword(String),
}

/// Envelope metadata as reported by the server. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Globally unique `Message-ID`.
    pub message_id: Option<String>,
    /// Decoded subject.
    pub subject: Option<String>,
    /// Sender addresses (`mailbox@host`), in header order.
    pub from: Vec<String>,
    /// Raw `Date` header value.
    pub date: Option<String>,
}

/// Result of fetching one message.
#[derive(Debug, Clone, Default)]
pub struct FetchedMessage {
    /// Message UID.
    pub uid: u32,
    /// Envelope, if the server returned one.
    pub envelope: Option<Envelope>,
    /// Server arrival time.
    pub internal_date: Option<DateTime<Utc>>,
    /// Current flags; `None` if the response carried no FLAGS item.
    pub flags: Option<Vec<MessageFlag>>,
    /// Raw RFC 5322 source; only present for [`FetchRequest::Source`].
    pub source: Option<Vec<u8>>,
}

impl FetchedMessage {
    /// Whether the message carries the `\Seen` flag.
    #[must_use]
    pub fn is_seen(&self) -> bool {
        self.flags
            .as_ref()
            .is_some_and(|flags| flags.contains(&MessageFlag::Seen))
    }
}

/// A connection to one mail store.
///
/// Implementations own their network state. None of these calls may change
/// message flags except [`MailTransport::add_flags`].
#[async_trait]
pub trait MailTransport: Send {
    /// Opens the connection and authenticates.
    async fn connect(&mut self, config: &ServerConfig) -> Result<(), TransportError>;

    /// Logs out and closes the connection.
    async fn logout(&mut self) -> Result<(), TransportError>;

    /// Opens a mailbox for subsequent search, fetch and store calls.
    async fn select(&mut self, mailbox: &str) -> Result<(), TransportError>;

    /// Returns the UIDs matching `query`.
    async fn search(&mut self, query: SearchQuery) -> Result<Vec<u32>, TransportError>;

    /// Fetches one message by UID. `Ok(None)` when the server returned nothing.
    async fn fetch_one(
        &mut self,
        uid: u32,
        request: FetchRequest,
    ) -> Result<Option<FetchedMessage>, TransportError>;

    /// Adds flags to one message.
    async fn add_flags(&mut self, uid: u32, flags: &[MessageFlag]) -> Result<(), TransportError>;

    /// Whether an authenticated session is currently open.
    fn is_authenticated(&self) -> bool;
}
