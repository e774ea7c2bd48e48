//! [`MailTransport`] over `async-imap`.

use async_imap::Session;
use async_imap::error::Error as ImapError;
use async_imap::types::Fetch;
use async_trait::async_trait;
use futures::TryStreamExt;
use inboxpeek_core::{
    FetchRequest, FetchedMessage, MailTransport, MessageFlag, SearchQuery, Security,
    ServerConfig, TransportError,
};
use tracing::{debug, warn};

use crate::convert::{add_flags_query, convert_fetch};
use crate::stream::{ImapStream, connect_plain, connect_tls};

const HEADER_ITEMS: &str = "(UID FLAGS ENVELOPE INTERNALDATE)";
const SOURCE_ITEMS: &str = "(UID FLAGS ENVELOPE INTERNALDATE BODY.PEEK[])";

/// Maps an `async-imap` error to a transport error.
fn map_error(error: ImapError) -> TransportError {
    match error {
        ImapError::Io(e) => TransportError::Io(e),
        other => TransportError::Protocol(other.to_string()),
    }
}

const fn is_fatal(error: &ImapError) -> bool {
    matches!(error, ImapError::Io(_) | ImapError::ConnectionLost)
}

const fn search_command(query: SearchQuery) -> &'static str {
    match query {
        SearchQuery::All => "ALL",
        SearchQuery::Unseen => "UNSEEN",
    }
}

const fn fetch_items(request: FetchRequest) -> &'static str {
    match request {
        FetchRequest::Headers => HEADER_ITEMS,
        FetchRequest::Source => SOURCE_ITEMS,
    }
}

/// IMAP connection for one account.
///
/// Holds at most one authenticated session. A session that fails with an
/// I/O error or a lost connection is discarded, so the next call reports
/// [`TransportError::NotConnected`] and the caller can reconnect.
#[derive(Debug, Default)]
pub struct ImapTransport {
    session: Option<Session<ImapStream>>,
}

impl ImapTransport {
    /// Creates a disconnected transport.
    #[must_use]
    pub const fn new() -> Self {
        Self { session: None }
    }

    fn session(&mut self) -> Result<&mut Session<ImapStream>, TransportError> {
        self.session.as_mut().ok_or(TransportError::NotConnected)
    }

    fn fail(&mut self, operation: &str, error: ImapError) -> TransportError {
        if is_fatal(&error) {
            warn!(operation, error = %error, "IMAP connection lost; dropping session");
            self.session = None;
        }
        map_error(error)
    }
}

#[async_trait]
impl MailTransport for ImapTransport {
    async fn connect(&mut self, config: &ServerConfig) -> Result<(), TransportError> {
        if let Some(mut previous) = self.session.take() {
            debug!("Replacing existing IMAP session");
            if let Err(e) = previous.logout().await {
                debug!(error = %e, "Logout of previous session failed");
            }
        }

        let port = config.effective_port();
        let stream = match config.security {
            Security::Tls => connect_tls(&config.host, port).await?,
            Security::None => connect_plain(&config.host, port).await?,
        };
        debug!(
            host = %config.host,
            port,
            security = config.security.display_name(),
            "TCP connection established"
        );

        let client = async_imap::Client::new(stream);
        let session = client
            .login(&config.user, &config.secret)
            .await
            .map_err(|(e, _client)| map_error(e))?;

        self.session = Some(session);
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), TransportError> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        session.logout().await.map_err(map_error)
    }

    async fn select(&mut self, mailbox: &str) -> Result<(), TransportError> {
        let result = self.session()?.select(mailbox).await;
        match result {
            Ok(selected) => {
                debug!(mailbox, exists = selected.exists, "Mailbox selected");
                Ok(())
            }
            Err(e) => Err(self.fail("select", e)),
        }
    }

    async fn search(&mut self, query: SearchQuery) -> Result<Vec<u32>, TransportError> {
        let result = self.session()?.uid_search(search_command(query)).await;
        match result {
            Ok(uids) => Ok(uids.into_iter().collect()),
            Err(e) => Err(self.fail("search", e)),
        }
    }

    async fn fetch_one(
        &mut self,
        uid: u32,
        request: FetchRequest,
    ) -> Result<Option<FetchedMessage>, TransportError> {
        let uid_set = uid.to_string();
        let result: Result<Vec<Fetch>, ImapError> =
            match self.session()?.uid_fetch(&uid_set, fetch_items(request)).await {
                Ok(stream) => stream.try_collect().await,
                Err(e) => Err(e),
            };
        let fetches = result.map_err(|e| self.fail("fetch", e))?;

        // Unsolicited FETCH responses for other messages may be interleaved.
        let fetched = fetches
            .iter()
            .find(|f| f.uid == Some(uid))
            .or_else(|| fetches.iter().find(|f| f.uid.is_none()))
            .map(|f| convert_fetch(f, uid));
        Ok(fetched)
    }

    async fn add_flags(&mut self, uid: u32, flags: &[MessageFlag]) -> Result<(), TransportError> {
        let uid_set = uid.to_string();
        let query = add_flags_query(flags);
        let result: Result<Vec<Fetch>, ImapError> =
            match self.session()?.uid_store(&uid_set, &query).await {
                Ok(stream) => stream.try_collect().await,
                Err(e) => Err(e),
            };
        result.map(drop).map_err(|e| self.fail("store", e))
    }

    fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}
