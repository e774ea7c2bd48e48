//! `inboxpeek` - read an IMAP inbox from the command line.
//!
//! Listing and showing messages never marks them read; `inboxpeek read <ID>`
//! is the only command that changes anything on the server.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod app;
mod cli;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "inboxpeek=info,inboxpeek_core=info,inboxpeek_imap=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// What to check when the failure came from connecting.
fn connection_hint(error: &anyhow::Error) -> Option<&'static str> {
    error
        .chain()
        .find_map(|cause| cause.downcast_ref::<inboxpeek_core::Error>())
        .and_then(inboxpeek_core::Error::connection_failure)
        .map(|kind| kind.guidance())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    debug!(?cli, "Starting inboxpeek");

    match app::run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            if let Some(hint) = connection_hint(&error) {
                eprintln!("hint: {hint}");
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use inboxpeek_core::{ConnectionFailure, Error, TransportError};

    use super::*;

    #[test]
    fn test_connection_hint_found_through_chain() {
        let error = anyhow::Error::new(Error::Connection {
            kind: ConnectionFailure::NetworkLikely,
            source: TransportError::Protocol("connection refused".to_string()),
        })
        .context("failed to list unread emails");

        assert_eq!(
            connection_hint(&error),
            Some(ConnectionFailure::NetworkLikely.guidance())
        );
    }

    #[test]
    fn test_no_hint_for_other_errors() {
        let error = anyhow::anyhow!("incomplete account settings");
        assert_eq!(connection_hint(&error), None);
    }
}
