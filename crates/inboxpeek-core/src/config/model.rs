//! Connection configuration types.

use serde::{Deserialize, Serialize};

/// Port used when `EMAIL_PORT` is missing or unparsable.
const DEFAULT_ENV_PORT: u16 = 993;

/// Security/encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Security {
    /// No encryption (local bridges only).
    None,
    /// Implicit TLS (connect directly with TLS).
    #[default]
    Tls,
}

impl Security {
    /// Get display name for the security mode.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::None => "None (insecure)",
            Self::Tls => "SSL/TLS",
        }
    }

    /// Get default port for the security mode.
    #[must_use]
    pub const fn default_port(&self) -> u16 {
        match self {
            Self::None => 143,
            Self::Tls => 993,
        }
    }
}

/// Connection parameters for one mail store.
///
/// Immutable once built; hand a new value to `configure` to change it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server hostname.
    pub host: String,
    /// Server port. Zero selects the security mode's default.
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Password or app-specific password.
    pub secret: String,
    /// Security mode.
    #[serde(default)]
    pub security: Security,
}

impl ServerConfig {
    /// Creates a TLS configuration.
    #[must_use]
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            user: user.into(),
            secret: secret.into(),
            security: Security::Tls,
        }
    }

    /// Returns a copy using `security`.
    #[must_use]
    pub fn with_security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Reads `EMAIL_HOST`, `EMAIL_PORT`, `EMAIL_USER` and `EMAIL_PASS`.
    ///
    /// Missing values become empty strings; check with [`Self::is_complete`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("EMAIL_PORT")
            .and_then(|p| p.trim().parse::<u16>().ok())
            .filter(|p| *p != 0)
            .unwrap_or(DEFAULT_ENV_PORT);

        Self::new(
            lookup("EMAIL_HOST").unwrap_or_default(),
            port,
            lookup("EMAIL_USER").unwrap_or_default(),
            lookup("EMAIL_PASS").unwrap_or_default(),
        )
    }

    /// Port to connect to.
    #[must_use]
    pub const fn effective_port(&self) -> u16 {
        if self.port == 0 {
            self.security.default_port()
        } else {
            self.port
        }
    }

    /// Whether host, user and secret are all present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        super::validate_config(self).is_ok()
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .field("security", &self.security)
            .finish()
    }
}
