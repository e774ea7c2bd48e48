//! # inboxpeek-imap
//!
//! IMAP implementation of [`inboxpeek_core::MailTransport`], built on
//! `async-imap` over TCP or rustls TLS.
//!
//! Raw sources are always fetched with `BODY.PEEK[]`, so reading a message
//! never sets `\Seen` on the server.
//!
//! ```ignore
//! use inboxpeek_core::{EmailProvider, MailProvider, ServerConfig};
//! use inboxpeek_imap::ImapTransport;
//!
//! let provider = MailProvider::new(ImapTransport::new());
//! provider.configure(ServerConfig::from_env()).await;
//! let unread = provider.list_unread_emails().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod convert;
pub mod stream;
mod transport;

pub use stream::{ImapStream, connect_plain, connect_tls, create_tls_connector};
pub use transport::ImapTransport;

use inboxpeek_core::MailProvider;

/// A provider talking IMAP.
pub type ImapProvider = MailProvider<ImapTransport>;

/// Creates an unconfigured IMAP provider for `INBOX`.
#[must_use]
pub fn provider() -> ImapProvider {
    MailProvider::new(ImapTransport::new())
}
