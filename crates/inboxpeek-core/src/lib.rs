//! # inboxpeek-core
//!
//! Mailbox session and message retrieval engine for the `inboxpeek` mail
//! client.
//!
//! This crate provides:
//! - Connection lifecycle with failure classification ([`session`])
//! - Per-mailbox exclusive access ([`lock`])
//! - Unread and filtered listings, content fetch, mark-as-read ([`service`])
//! - The [`EmailProvider`] facade and the use cases built on it
//! - Server configuration and credential storage ([`config`])
//!
//! Listing and content fetch never change a message's read state; only
//! [`EmailProvider::mark_as_read`] does.
//!
//! The wire protocol sits behind [`MailTransport`]; see `inboxpeek-imap`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod lock;
pub mod message;
pub mod provider;
pub mod service;
pub mod session;
pub mod transport;
pub mod usecase;

pub use config::{
    CredentialStore, FileCredentialStore, SecretBackend, Security, ServerConfig, StoreError,
    StoreResult, ValidationError, ValidationResult, validate_config,
};
pub use error::{Error, Result};
pub use lock::{LockStats, MailboxGuard, MailboxLocks};
pub use message::{
    DEFAULT_LIMIT, MessageBody, MessageContent, MessageSummary, NO_SUBJECT, SearchFilter,
    UNKNOWN_SENDER,
};
pub use provider::{EmailProvider, INBOX, MailProvider, parse_id};
pub use session::{ConnectionFailure, SessionManager, SessionState, classify_connect_failure};
pub use transport::{
    Envelope, FetchRequest, FetchedMessage, MailTransport, MessageFlag, SearchQuery,
    TransportError,
};
pub use usecase::{
    AuthenticateUser, GetEmailContent, ListEmails, ListUnreadEmails, MarkEmailAsRead,
    UseCaseError,
};
