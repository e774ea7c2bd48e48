//! The mail provider facade.
//!
//! [`EmailProvider`] is what application code talks to. [`MailProvider`]
//! implements it over any [`MailTransport`]: every mailbox operation first
//! ensures an authenticated session, then runs under the mailbox lock.

use async_trait::async_trait;

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::lock::MailboxLocks;
use crate::message::{MessageContent, MessageSummary, SearchFilter};
use crate::service;
use crate::session::SessionManager;
use crate::transport::MailTransport;

/// Default mailbox.
pub const INBOX: &str = "INBOX";

/// Operations offered to application code.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Stores connection parameters without connecting.
    async fn configure(&self, config: ServerConfig);

    /// Opens and authenticates a session.
    async fn connect(&self) -> Result<()>;

    /// Closes the session. Never fails.
    async fn disconnect(&self);

    /// Newest unread messages, at most ten, newest first.
    async fn list_unread_emails(&self) -> Result<Vec<MessageSummary>>;

    /// Messages matching `filter` (default filter when `None`), newest first.
    async fn list_emails(&self, filter: Option<SearchFilter>) -> Result<Vec<MessageSummary>>;

    /// Full content of one message. Does not mark it read.
    async fn get_email_content(&self, id: &str) -> Result<MessageContent>;

    /// Marks one message read.
    async fn mark_as_read(&self, id: &str) -> Result<()>;
}

/// Parses a mailbox-scoped identifier into a UID.
///
/// # Errors
///
/// Returns [`Error::InvalidId`] unless `id` is a positive integer.
pub fn parse_id(id: &str) -> Result<u32> {
    match id.trim().parse::<u32>() {
        Ok(uid) if uid > 0 => Ok(uid),
        _ => Err(Error::InvalidId(id.to_string())),
    }
}

/// [`EmailProvider`] over a [`MailTransport`].
#[derive(Debug)]
pub struct MailProvider<T> {
    session: SessionManager<T>,
    locks: MailboxLocks,
    mailbox: String,
}

impl<T: MailTransport> MailProvider<T> {
    /// Creates an unconfigured provider operating on `INBOX`.
    pub fn new(transport: T) -> Self {
        Self::with_mailbox(transport, INBOX)
    }

    /// Creates an unconfigured provider operating on `mailbox`.
    pub fn with_mailbox(transport: T, mailbox: impl Into<String>) -> Self {
        Self {
            session: SessionManager::new(transport),
            locks: MailboxLocks::new(),
            mailbox: mailbox.into(),
        }
    }

    /// The session manager.
    pub const fn session(&self) -> &SessionManager<T> {
        &self.session
    }

    /// The mailbox lock registry.
    pub const fn locks(&self) -> &MailboxLocks {
        &self.locks
    }

    /// The mailbox operations run against.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        &self.mailbox
    }

    async fn locked_list_unread(&self) -> Result<Vec<MessageSummary>> {
        self.session.ensure_authenticated().await?;
        let (session, mailbox) = (&self.session, self.mailbox.as_str());
        self.locks
            .with_lock(mailbox, move || async move {
                let mut transport = session.transport().await;
                service::select_mailbox(&mut *transport, mailbox).await?;
                service::list_unread(&mut *transport).await
            })
            .await
    }

    async fn locked_list_filtered(&self, filter: &SearchFilter) -> Result<Vec<MessageSummary>> {
        self.session.ensure_authenticated().await?;
        let (session, mailbox) = (&self.session, self.mailbox.as_str());
        self.locks
            .with_lock(mailbox, move || async move {
                let mut transport = session.transport().await;
                service::select_mailbox(&mut *transport, mailbox).await?;
                service::list_filtered(&mut *transport, filter).await
            })
            .await
    }

    async fn locked_fetch_content(&self, uid: u32) -> Result<MessageContent> {
        self.session.ensure_authenticated().await?;
        let (session, mailbox) = (&self.session, self.mailbox.as_str());
        self.locks
            .with_lock(mailbox, move || async move {
                let mut transport = session.transport().await;
                service::select_mailbox(&mut *transport, mailbox).await?;
                service::fetch_full_content(&mut *transport, uid).await
            })
            .await
    }

    async fn locked_mark_as_read(&self, uid: u32) -> Result<()> {
        self.session.ensure_authenticated().await?;
        let (session, mailbox) = (&self.session, self.mailbox.as_str());
        self.locks
            .with_lock(mailbox, move || async move {
                let mut transport = session.transport().await;
                service::select_mailbox(&mut *transport, mailbox).await?;
                service::mark_as_read(&mut *transport, uid).await
            })
            .await
    }
}

#[async_trait]
impl<T: MailTransport + 'static> EmailProvider for MailProvider<T> {
    async fn configure(&self, config: ServerConfig) {
        self.session.configure(config).await;
    }

    async fn connect(&self) -> Result<()> {
        self.session.connect().await
    }

    async fn disconnect(&self) {
        self.session.disconnect().await;
    }

    async fn list_unread_emails(&self) -> Result<Vec<MessageSummary>> {
        self.locked_list_unread().await
    }

    async fn list_emails(&self, filter: Option<SearchFilter>) -> Result<Vec<MessageSummary>> {
        let filter = filter.unwrap_or_default();
        self.locked_list_filtered(&filter).await
    }

    async fn get_email_content(&self, id: &str) -> Result<MessageContent> {
        let uid = parse_id(id)?;
        self.locked_fetch_content(uid).await
    }

    async fn mark_as_read(&self, id: &str) -> Result<()> {
        let uid = parse_id(id)?;
        self.locked_mark_as_read(uid).await
    }
}
