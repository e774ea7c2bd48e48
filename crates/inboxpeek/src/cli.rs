//! Command-line definitions.

use clap::{Args, Parser, Subcommand};
use inboxpeek_core::{SearchFilter, Security};

/// Read an IMAP inbox without marking anything read.
#[derive(Debug, Parser)]
#[command(name = "inboxpeek", version, about)]
pub struct Cli {
    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check credentials and remember them.
    ///
    /// The password is read from `INBOXPEEK_SECRET`, or `EMAIL_PASS`.
    Login(LoginArgs),

    /// Forget the stored credentials.
    Logout,

    /// Show the ten most recent unread messages.
    Unread,

    /// List messages, newest first.
    List(ListArgs),

    /// Show one message without marking it read.
    Show {
        /// Message id as printed by `list`.
        id: String,
    },

    /// Mark one message read.
    Read {
        /// Message id as printed by `list`.
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// IMAP server host name.
    #[arg(long, env = "EMAIL_HOST")]
    pub host: String,

    /// IMAP server port [default: 993, or 143 with --plaintext].
    #[arg(long, env = "EMAIL_PORT")]
    pub port: Option<u16>,

    /// Account user name.
    #[arg(long, env = "EMAIL_USER")]
    pub user: String,

    /// Connect without TLS (local bridges only).
    #[arg(long)]
    pub plaintext: bool,

    /// Store the password in the account file instead of the system keyring.
    #[arg(long)]
    pub inline_secret: bool,
}

impl LoginArgs {
    pub const fn security(&self) -> Security {
        if self.plaintext {
            Security::None
        } else {
            Security::Tls
        }
    }
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only unread messages.
    #[arg(long)]
    pub unread: bool,

    /// Sender substring; repeat to match any of several.
    #[arg(long = "from", value_name = "SUBSTR")]
    pub from: Vec<String>,

    /// Maximum number of messages.
    #[arg(long, default_value_t = inboxpeek_core::DEFAULT_LIMIT)]
    pub limit: usize,
}

impl ListArgs {
    pub fn filter(&self) -> SearchFilter {
        SearchFilter {
            unread_only: self.unread,
            from_addresses: self.from.clone(),
            limit: self.limit,
        }
    }
}
