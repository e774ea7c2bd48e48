//! Connection configuration.
//!
//! Provides the immutable server configuration, its validation, and the
//! credential store used to persist it between runs.

mod model;
mod store;
mod validation;

pub use model::{Security, ServerConfig};
pub use store::{CredentialStore, FileCredentialStore, SecretBackend, StoreError, StoreResult};
pub use validation::{ValidationError, ValidationResult, validate_config};
