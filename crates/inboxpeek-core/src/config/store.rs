//! Durable storage for the active account's connection parameters.
//!
//! Connection details are written as JSON under the user's config directory.
//! The secret goes to the platform keyring by default:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::model::{Security, ServerConfig};

/// Service name used for keyring entries and the config directory.
const SERVICE_NAME: &str = "inboxpeek";

/// File name of the stored account.
const ACCOUNT_FILE: &str = "account.json";

/// Error type for credential store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the account file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The account file is not valid JSON.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// The platform has no config directory.
    #[error("No configuration directory available")]
    NoConfigDir,
}

/// Result type for credential store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Load/save/clear hook for connection parameters.
pub trait CredentialStore: Send + Sync {
    /// Loads the stored configuration, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read.
    fn load(&self) -> StoreResult<Option<ServerConfig>>;

    /// Durably stores `config`, replacing anything stored before.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, config: &ServerConfig) -> StoreResult<()>;

    /// Removes any stored configuration. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be modified.
    fn clear(&self) -> StoreResult<()>;
}

/// Where [`FileCredentialStore`] keeps the secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecretBackend {
    /// Platform keyring.
    #[default]
    Keyring,
    /// Inside the account file, for hosts without a keyring.
    Inline,
}

/// On-disk layout of the account file.
#[derive(Debug, Serialize, Deserialize)]
struct StoredAccount {
    host: String,
    port: u16,
    user: String,
    #[serde(default)]
    security: Security,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret: Option<String>,
}

/// JSON-file credential store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    backend: SecretBackend,
}

impl FileCredentialStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, backend: SecretBackend) -> Self {
        Self {
            path: path.into(),
            backend,
        }
    }

    /// Creates a store at `<config_dir>/inboxpeek/account.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoConfigDir`] if the platform has no config directory.
    pub fn default_location(backend: SecretBackend) -> StoreResult<Self> {
        let dir = dirs::config_dir().ok_or(StoreError::NoConfigDir)?;
        Ok(Self::new(dir.join(SERVICE_NAME).join(ACCOUNT_FILE), backend))
    }

    /// Path of the account file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_account(&self) -> StoreResult<Option<StoredAccount>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Generates the keyring entry key for an account.
fn credential_key(user: &str, host: &str) -> String {
    format!("{SERVICE_NAME}_imap_{user}@{host}")
}

fn keyring_entry(user: &str, host: &str) -> StoreResult<Entry> {
    Ok(Entry::new(SERVICE_NAME, &credential_key(user, host))?)
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> StoreResult<Option<ServerConfig>> {
        let Some(account) = self.read_account()? else {
            debug!(path = %self.path.display(), "No stored account");
            return Ok(None);
        };

        let secret = match (account.secret, self.backend) {
            (Some(secret), _) => secret,
            (None, SecretBackend::Keyring) => {
                match keyring_entry(&account.user, &account.host)?.get_password() {
                    Ok(secret) => secret,
                    Err(keyring::Error::NoEntry) => {
                        warn!(user = %account.user, "No password in keyring for stored account");
                        String::new()
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            (None, SecretBackend::Inline) => String::new(),
        };

        Ok(Some(ServerConfig {
            host: account.host,
            port: account.port,
            user: account.user,
            secret,
            security: account.security,
        }))
    }

    fn save(&self, config: &ServerConfig) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let secret = match self.backend {
            SecretBackend::Keyring => {
                keyring_entry(&config.user, &config.host)?.set_password(&config.secret)?;
                debug!(user = %config.user, "Stored password in keyring");
                None
            }
            SecretBackend::Inline => Some(config.secret.clone()),
        };

        let account = StoredAccount {
            host: config.host.clone(),
            port: config.port,
            user: config.user.clone(),
            security: config.security,
            secret,
        };
        fs::write(&self.path, serde_json::to_string_pretty(&account)?)?;
        debug!(path = %self.path.display(), "Saved account");
        Ok(())
    }

    fn clear(&self) -> StoreResult<()> {
        let Some(account) = self.read_account()? else {
            return Ok(());
        };

        if self.backend == SecretBackend::Keyring {
            match keyring_entry(&account.user, &account.host)?.delete_credential() {
                Ok(()) => debug!(user = %account.user, "Deleted password from keyring"),
                Err(keyring::Error::NoEntry) => {
                    debug!(user = %account.user, "No password to delete from keyring");
                }
                Err(e) => {
                    warn!("Failed to delete password from keyring: {e}");
                    return Err(e.into());
                }
            }
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "Cleared stored account");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
