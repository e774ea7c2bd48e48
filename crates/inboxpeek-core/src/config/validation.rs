//! Connection configuration validation.

use super::model::ServerConfig;

/// Validation error for a server configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Host is empty.
    EmptyHost,
    /// Username is empty.
    EmptyUser,
    /// Secret is empty.
    EmptySecret,
}

impl ValidationError {
    /// Get human-readable error message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::EmptyHost => "Mail server host is required",
            Self::EmptyUser => "Username is required",
            Self::EmptySecret => "Password is required",
        }
    }

    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyHost => "host",
            Self::EmptyUser => "user",
            Self::EmptySecret => "secret",
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Result of validating a configuration.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a server configuration.
///
/// Returns `Ok(())` if valid, or every violation found.
///
/// # Errors
///
/// Returns a vector of `ValidationError` if any required field is empty.
pub fn validate_config(config: &ServerConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.user.trim().is_empty() {
        errors.push(ValidationError::EmptyUser);
    }
    // Secrets may legitimately contain only whitespace.
    if config.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn complete() -> ServerConfig {
        ServerConfig::new("imap.test.com", 993, "test@test.com", "test123")
    }

    #[test]
    fn test_complete_config_is_valid() {
        assert!(validate_config(&complete()).is_ok());
    }

    #[test]
    fn test_missing_host_only() {
        let config = ServerConfig {
            host: String::new(),
            ..complete()
        };
        assert_eq!(validate_config(&config), Err(vec![ValidationError::EmptyHost]));
    }

    #[test]
    fn test_missing_user_only() {
        let config = ServerConfig {
            user: "   ".to_string(),
            ..complete()
        };
        assert_eq!(validate_config(&config), Err(vec![ValidationError::EmptyUser]));
    }

    #[test]
    fn test_missing_secret_only() {
        let config = ServerConfig {
            secret: String::new(),
            ..complete()
        };
        assert_eq!(validate_config(&config), Err(vec![ValidationError::EmptySecret]));
    }

    #[test]
    fn test_reports_every_violation() {
        let config = ServerConfig::new("", 993, "", "");
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.iter().map(ValidationError::field).collect::<Vec<_>>(),
            vec!["host", "user", "secret"]
        );
    }

    #[test]
    fn test_display_uses_message() {
        assert_eq!(ValidationError::EmptyHost.to_string(), "Mail server host is required");
    }
}
