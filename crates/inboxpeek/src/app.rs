//! Command execution.

use std::sync::Arc;

use anyhow::{Context, bail};
use inboxpeek_core::{
    AuthenticateUser, CredentialStore, EmailProvider, FileCredentialStore, GetEmailContent,
    ListEmails, ListUnreadEmails, MarkEmailAsRead, SecretBackend, ServerConfig, validate_config,
};
use tracing::{debug, info, warn};

use crate::cli::{Cli, Command, LoginArgs};
use crate::output::{self, Format};

/// Environment variables holding the login secret, in lookup order.
const SECRET_VARS: [&str; 2] = ["INBOXPEEK_SECRET", "EMAIL_PASS"];

/// Runs one command and returns what to print.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let format = Format::from_flag(cli.json);
    match cli.command {
        Command::Login(args) => login(&args, format).await,
        Command::Logout => logout(format),
        command => {
            let provider: Arc<dyn EmailProvider> = Arc::new(inboxpeek_imap::provider());
            provider.configure(resolve_config()?).await;

            let result = execute(&provider, command, format).await;
            provider.disconnect().await;
            result
        }
    }
}

async fn execute(
    provider: &Arc<dyn EmailProvider>,
    command: Command,
    format: Format,
) -> anyhow::Result<String> {
    match command {
        Command::Unread => {
            let messages = ListUnreadEmails::new(Arc::clone(provider)).execute().await?;
            output::summaries(&messages, format)
        }
        Command::List(args) => {
            let messages = ListEmails::new(Arc::clone(provider))
                .execute(Some(args.filter()))
                .await?;
            output::summaries(&messages, format)
        }
        Command::Show { id } => {
            let message = GetEmailContent::new(Arc::clone(provider)).execute(&id).await?;
            output::content(&message, format)
        }
        Command::Read { id } => {
            MarkEmailAsRead::new(Arc::clone(provider)).execute(&id).await?;
            output::done("marked read", &id, format)
        }
        command @ (Command::Login(_) | Command::Logout) => {
            bail!("{command:?} does not use a mail session")
        }
    }
}

fn secret_from_env(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    SECRET_VARS
        .iter()
        .find_map(|key| lookup(key).filter(|value| !value.is_empty()))
}

fn backend(inline: bool) -> SecretBackend {
    if inline {
        SecretBackend::Inline
    } else {
        SecretBackend::Keyring
    }
}

async fn login(args: &LoginArgs, format: Format) -> anyhow::Result<String> {
    let secret = secret_from_env(|key| std::env::var(key).ok())
        .context("set INBOXPEEK_SECRET (or EMAIL_PASS) to the account password")?;

    let security = args.security();
    let config = ServerConfig::new(
        &args.host,
        args.port.unwrap_or_else(|| security.default_port()),
        &args.user,
        secret,
    )
    .with_security(security);
    check(&config)?;

    let provider: Arc<dyn EmailProvider> = Arc::new(inboxpeek_imap::provider());
    let authenticated = AuthenticateUser::new(Arc::clone(&provider))
        .execute(config.clone())
        .await;
    provider.disconnect().await;
    if !authenticated {
        bail!("login to {} as {} failed", config.host, config.user);
    }

    let store = FileCredentialStore::default_location(backend(args.inline_secret))?;
    store.save(&config)?;
    info!(path = %store.path().display(), "Saved credentials");

    output::done("logged in", &config.user, format)
}

fn logout(format: Format) -> anyhow::Result<String> {
    let store = FileCredentialStore::default_location(SecretBackend::Keyring)?;
    store.clear()?;
    output::done("logged out", &store.path().display().to_string(), format)
}

/// Stored credentials first, then `EMAIL_*` variables.
fn resolve_config() -> anyhow::Result<ServerConfig> {
    match FileCredentialStore::default_location(SecretBackend::Keyring).map(|s| s.load()) {
        Ok(Ok(Some(config))) => {
            debug!(host = %config.host, "Using stored credentials");
            check(&config)?;
            return Ok(config);
        }
        Ok(Ok(None)) => debug!("No stored credentials"),
        Ok(Err(e)) | Err(e) => warn!(error = %e, "Could not read stored credentials"),
    }

    let config = ServerConfig::from_env();
    check(&config).context("run `inboxpeek login` or set EMAIL_HOST, EMAIL_USER and EMAIL_PASS")?;
    Ok(config)
}

fn check(config: &ServerConfig) -> anyhow::Result<()> {
    if let Err(errors) = validate_config(config) {
        let reasons: Vec<_> = errors.iter().map(|e| e.message()).collect();
        bail!("incomplete account settings: {}", reasons.join("; "));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_lookup_order() {
        let both = |key: &str| match key {
            "INBOXPEEK_SECRET" => Some("primary".to_string()),
            "EMAIL_PASS" => Some("fallback".to_string()),
            _ => None,
        };
        let fallback = |key: &str| (key == "EMAIL_PASS").then(|| "fallback".to_string());
        let empty = |key: &str| (key == "INBOXPEEK_SECRET").then(String::new);

        assert_eq!(secret_from_env(both).as_deref(), Some("primary"));
        assert_eq!(secret_from_env(fallback).as_deref(), Some("fallback"));
        assert_eq!(secret_from_env(empty), None);
    }

    #[test]
    fn test_check_reports_every_missing_field() {
        let err = check(&ServerConfig::new(" ", 993, "", "")).unwrap_err();
        let message = err.to_string();

        assert!(message.starts_with("incomplete account settings"));
        assert_eq!(message.matches(';').count(), 2);
    }

    #[test]
    fn test_backend_choice() {
        assert_eq!(backend(true), SecretBackend::Inline);
        assert_eq!(backend(false), SecretBackend::Keyring);
    }
}
