//! Connection lifecycle for one mail store.
//!
//! ```text
//! Unconfigured --configure--> Configured --connect--> Connected
//!                                                      |    ^
//!                                           disconnect |    | connect
//!                                                      v    |
//!                                                   Disconnected
//! ```
//!
//! `configure` is valid from every state and always lands in `Configured`.

use std::ops::{Deref, DerefMut};

use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::transport::{MailTransport, TransportError};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection parameters yet.
    Unconfigured,
    /// Parameters stored, never connected with them.
    Configured,
    /// Authenticated session open.
    Connected,
    /// Logged out.
    Disconnected,
}

/// Diagnostic classification of a failed connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionFailure {
    /// The server most likely rejected the credentials.
    AuthenticationLikely,
    /// The server most likely could not be reached.
    NetworkLikely,
    /// Anything else.
    Unclassified,
}

impl ConnectionFailure {
    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AuthenticationLikely => "authentication",
            Self::NetworkLikely => "network",
            Self::Unclassified => "unclassified",
        }
    }

    /// What the user should check.
    #[must_use]
    pub const fn guidance(&self) -> &'static str {
        match self {
            Self::AuthenticationLikely => {
                "This looks like an authentication problem. Check your username and password; \
                 providers such as Gmail require an app-specific password."
            }
            Self::NetworkLikely => {
                "This looks like a connection problem. Check your internet connection and the \
                 server host and port."
            }
            Self::Unclassified => "The mail server rejected the connection.",
        }
    }
}

/// Classifies a connect failure from its message text.
///
/// Substring matching on the lowercased message: "auth" wins over
/// "connect"/"network".
#[must_use]
pub fn classify_connect_failure(message: &str) -> ConnectionFailure {
    let message = message.to_lowercase();
    if message.contains("auth") {
        ConnectionFailure::AuthenticationLikely
    } else if message.contains("connect") || message.contains("network") {
        ConnectionFailure::NetworkLikely
    } else {
        ConnectionFailure::Unclassified
    }
}

struct SessionInner<T> {
    transport: T,
    config: Option<ServerConfig>,
    state: SessionState,
}

impl<T: MailTransport> SessionInner<T> {
    fn is_authenticated(&self) -> bool {
        self.state == SessionState::Connected && self.transport.is_authenticated()
    }

    async fn connect(&mut self) -> Result<()> {
        let config = self.config.as_ref().ok_or(Error::NotConfigured)?;
        info!(
            host = %config.host,
            port = config.effective_port(),
            user = %config.user,
            "Connecting to mail server"
        );

        match self.transport.connect(config).await {
            Ok(()) => {
                self.state = SessionState::Connected;
                info!(host = %config.host, "Connected to mail server");
                Ok(())
            }
            Err(source) => {
                let kind = classify_connect_failure(&source.to_string());
                error!(
                    host = %config.host,
                    kind = kind.label(),
                    error = %source,
                    "Failed to connect to mail server"
                );
                warn!("{}", kind.guidance());
                Err(Error::Connection { kind, source })
            }
        }
    }

    async fn logout(&mut self) -> std::result::Result<(), TransportError> {
        let result = self.transport.logout().await;
        self.state = SessionState::Disconnected;
        result
    }
}

/// Owns the transport and its authenticated state.
///
/// Not meant to be shared across providers; one per mail store.
pub struct SessionManager<T> {
    inner: Mutex<SessionInner<T>>,
}

impl<T: MailTransport> SessionManager<T> {
    /// Creates an unconfigured session over `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                transport,
                config: None,
                state: SessionState::Unconfigured,
            }),
        }
    }

    /// Stores connection parameters without connecting.
    ///
    /// A live session opened with earlier parameters is logged out first.
    pub async fn configure(&self, config: ServerConfig) {
        let mut inner = self.inner.lock().await;

        if inner.is_authenticated() {
            debug!("Reconfiguring; closing existing session");
            if let Err(e) = inner.logout().await {
                warn!(error = %e, "Error while closing previous session");
            }
        }

        debug!(host = %config.host, user = %config.user, "Configured mail server");
        inner.config = Some(config);
        inner.state = SessionState::Configured;
    }

    /// Opens and authenticates the session.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConfigured`] before `configure`, or
    /// [`Error::Connection`] carrying the transport's error.
    pub async fn connect(&self) -> Result<()> {
        self.inner.lock().await.connect().await
    }

    /// Logs out. Failures are logged and suppressed.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;

        if inner.state != SessionState::Connected && !inner.transport.is_authenticated() {
            debug!("Not connected; nothing to disconnect");
            return;
        }

        match inner.logout().await {
            Ok(()) => info!("Disconnected from mail server"),
            Err(e) => warn!(error = %e, "Error while disconnecting from mail server"),
        }
    }

    /// Connects first if there is no authenticated session.
    ///
    /// # Errors
    ///
    /// Same as [`Self::connect`].
    pub async fn ensure_authenticated(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.is_authenticated() {
            return Ok(());
        }

        debug!("Session not authenticated; connecting");
        inner.connect().await
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Whether an authenticated session is open.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.lock().await.is_authenticated()
    }

    /// Exclusive access to the transport.
    pub async fn transport(&self) -> TransportGuard<'_, T> {
        TransportGuard(self.inner.lock().await)
    }
}

impl<T> std::fmt::Debug for SessionManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

/// Exclusive borrow of a session's transport.
pub struct TransportGuard<'a, T>(MutexGuard<'a, SessionInner<T>>);

impl<T> Deref for TransportGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0.transport
    }
}

impl<T> DerefMut for TransportGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0.transport
    }
}
