//! Application use cases.
//!
//! Thin services over a shared [`EmailProvider`]. Each one logs provider
//! failures and re-wraps them under a stable message, keeping the provider
//! error as the source.

use std::sync::Arc;

use tracing::error;

use crate::config::ServerConfig;
use crate::error::Error;
use crate::message::{MessageContent, MessageSummary, SearchFilter};
use crate::provider::EmailProvider;

/// A failed use case.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct UseCaseError {
    message: &'static str,
    #[source]
    source: Error,
}

impl UseCaseError {
    fn wrap(message: &'static str) -> impl FnOnce(Error) -> Self {
        move |source| {
            error!(error = %source, "{message}");
            Self { message, source }
        }
    }

    /// The stable failure message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        self.message
    }

    /// The provider error.
    #[must_use]
    pub const fn provider_error(&self) -> &Error {
        &self.source
    }
}

/// Configures the provider and checks the credentials by connecting.
#[derive(Clone)]
pub struct AuthenticateUser {
    provider: Arc<dyn EmailProvider>,
}

impl AuthenticateUser {
    /// Creates the use case.
    pub fn new(provider: Arc<dyn EmailProvider>) -> Self {
        Self { provider }
    }

    /// Returns whether the server accepted the credentials.
    pub async fn execute(&self, config: ServerConfig) -> bool {
        self.provider.configure(config).await;
        match self.provider.connect().await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Authentication failed");
                false
            }
        }
    }
}

/// Lists the newest unread messages.
#[derive(Clone)]
pub struct ListUnreadEmails {
    provider: Arc<dyn EmailProvider>,
}

impl ListUnreadEmails {
    /// Creates the use case.
    pub fn new(provider: Arc<dyn EmailProvider>) -> Self {
        Self { provider }
    }

    /// Runs the listing.
    ///
    /// # Errors
    ///
    /// Fails with "failed to list unread emails".
    pub async fn execute(&self) -> Result<Vec<MessageSummary>, UseCaseError> {
        self.provider
            .list_unread_emails()
            .await
            .map_err(UseCaseError::wrap("failed to list unread emails"))
    }
}

/// Lists messages matching a filter.
#[derive(Clone)]
pub struct ListEmails {
    provider: Arc<dyn EmailProvider>,
}

impl ListEmails {
    /// Creates the use case.
    pub fn new(provider: Arc<dyn EmailProvider>) -> Self {
        Self { provider }
    }

    /// Runs the listing.
    ///
    /// # Errors
    ///
    /// Fails with "failed to list emails".
    pub async fn execute(
        &self,
        filter: Option<SearchFilter>,
    ) -> Result<Vec<MessageSummary>, UseCaseError> {
        self.provider
            .list_emails(filter)
            .await
            .map_err(UseCaseError::wrap("failed to list emails"))
    }
}

/// Retrieves the full content of one message without marking it read.
#[derive(Clone)]
pub struct GetEmailContent {
    provider: Arc<dyn EmailProvider>,
}

impl GetEmailContent {
    /// Creates the use case.
    pub fn new(provider: Arc<dyn EmailProvider>) -> Self {
        Self { provider }
    }

    /// Fetches the message.
    ///
    /// # Errors
    ///
    /// Fails with "failed to get email content".
    pub async fn execute(&self, id: &str) -> Result<MessageContent, UseCaseError> {
        self.provider
            .get_email_content(id)
            .await
            .map_err(UseCaseError::wrap("failed to get email content"))
    }
}

/// Marks one message read.
#[derive(Clone)]
pub struct MarkEmailAsRead {
    provider: Arc<dyn EmailProvider>,
}

impl MarkEmailAsRead {
    /// Creates the use case.
    pub fn new(provider: Arc<dyn EmailProvider>) -> Self {
        Self { provider }
    }

    /// Sets the `\Seen` flag.
    ///
    /// # Errors
    ///
    /// Fails with "failed to mark email as read".
    pub async fn execute(&self, id: &str) -> Result<(), UseCaseError> {
        self.provider
            .mark_as_read(id)
            .await
            .map_err(UseCaseError::wrap("failed to mark email as read"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::error::Error as _;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::DateTime;

    use super::*;
    use crate::message::MessageBody;
    use crate::transport::TransportError;

    /// Provider double that records calls and fails on demand.
    #[derive(Default)]
    struct FakeProvider {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeProvider {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn outcome<T>(&self, value: T) -> crate::Result<T> {
            if self.fail {
                Err(Error::Protocol {
                    operation: "search",
                    source: TransportError::Protocol("server said no".to_string()),
                })
            } else {
                Ok(value)
            }
        }
    }

    fn summary(id: &str) -> MessageSummary {
        MessageSummary {
            id: id.to_string(),
            message_id: None,
            subject: "Hello".to_string(),
            from: "a@x.com".to_string(),
            date: DateTime::from_timestamp(0, 0).unwrap(),
            seen: Some(false),
        }
    }

    #[async_trait]
    impl EmailProvider for FakeProvider {
        async fn configure(&self, config: ServerConfig) {
            self.record(format!("configure {}", config.host));
        }

        async fn connect(&self) -> crate::Result<()> {
            self.record("connect");
            if self.fail {
                return Err(Error::Connection {
                    kind: crate::session::classify_connect_failure("auth failed"),
                    source: TransportError::Protocol("auth failed".to_string()),
                });
            }
            Ok(())
        }

        async fn disconnect(&self) {
            self.record("disconnect");
        }

        async fn list_unread_emails(&self) -> crate::Result<Vec<MessageSummary>> {
            self.record("list_unread_emails");
            self.outcome(vec![summary("1")])
        }

        async fn list_emails(
            &self,
            filter: Option<SearchFilter>,
        ) -> crate::Result<Vec<MessageSummary>> {
            let limit = filter.map_or(0, |f| f.limit);
            self.record(format!("list_emails {limit}"));
            self.outcome(vec![summary("2")])
        }

        async fn get_email_content(&self, id: &str) -> crate::Result<MessageContent> {
            self.record(format!("get_email_content {id}"));
            self.outcome(MessageContent {
                summary: summary(id),
                body: MessageBody::default(),
            })
        }

        async fn mark_as_read(&self, id: &str) -> crate::Result<()> {
            self.record(format!("mark_as_read {id}"));
            self.outcome(())
        }
    }

    fn config() -> ServerConfig {
        ServerConfig::new("imap.test.com", 993, "test@test.com", "test123")
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let provider = Arc::new(FakeProvider::default());
        let ok = AuthenticateUser::new(provider.clone()).execute(config()).await;

        assert!(ok);
        assert_eq!(provider.calls(), vec!["configure imap.test.com", "connect"]);
    }

    #[tokio::test]
    async fn test_authenticate_failure_is_false() {
        let provider = Arc::new(FakeProvider::failing());
        let ok = AuthenticateUser::new(provider.clone()).execute(config()).await;

        assert!(!ok);
        assert_eq!(provider.calls(), vec!["configure imap.test.com", "connect"]);
    }

    #[tokio::test]
    async fn test_listings_pass_through() {
        let provider = Arc::new(FakeProvider::default());

        let unread = ListUnreadEmails::new(provider.clone()).execute().await.unwrap();
        let listed = ListEmails::new(provider.clone())
            .execute(Some(SearchFilter::new().limit(5)))
            .await
            .unwrap();

        assert_eq!(unread[0].id, "1");
        assert_eq!(listed[0].id, "2");
        assert_eq!(provider.calls(), vec!["list_unread_emails", "list_emails 5"]);
    }

    #[tokio::test]
    async fn test_content_does_not_mark_read() {
        let provider = Arc::new(FakeProvider::default());

        let content = GetEmailContent::new(provider.clone()).execute("9").await.unwrap();

        assert_eq!(content.id, "9");
        assert_eq!(provider.calls(), vec!["get_email_content 9"]);
    }

    #[tokio::test]
    async fn test_failures_are_rewrapped() {
        let provider: Arc<dyn EmailProvider> = Arc::new(FakeProvider::failing());

        let unread = ListUnreadEmails::new(provider.clone()).execute().await.unwrap_err();
        let listed = ListEmails::new(provider.clone()).execute(None).await.unwrap_err();
        let content = GetEmailContent::new(provider.clone()).execute("1").await.unwrap_err();
        let marked = MarkEmailAsRead::new(provider).execute("1").await.unwrap_err();

        assert_eq!(unread.to_string(), "failed to list unread emails");
        assert_eq!(listed.to_string(), "failed to list emails");
        assert_eq!(content.to_string(), "failed to get email content");
        assert_eq!(marked.to_string(), "failed to mark email as read");

        assert!(matches!(marked.provider_error(), Error::Protocol { .. }));
        assert_eq!(
            marked.source().unwrap().to_string(),
            "search failed: server said no"
        );
    }
}
