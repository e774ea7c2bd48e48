//! Mailbox operations.
//!
//! Each function here drives an already-authenticated transport whose
//! mailbox is selected and locked by the caller. Protocol failures are
//! logged where they happen, with the operation name, and returned.

pub mod fetch;
pub mod flag;
pub mod parse;
pub mod search;
pub mod shape;

use tracing::error;

use crate::error::Error;
use crate::transport::{MailTransport, TransportError};

pub use fetch::{fetch_full_content, fetch_header_only};
pub use flag::mark_as_read;
pub use search::{UNREAD_LIMIT, list_filtered, list_unread};

/// Logs a transport failure and wraps it.
pub(crate) fn protocol_error(operation: &'static str, source: TransportError) -> Error {
    error!(operation, error = %source, "Mail operation failed");
    Error::Protocol { operation, source }
}

/// Opens `mailbox` on the transport.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the server refuses the mailbox.
pub async fn select_mailbox<T: MailTransport + ?Sized>(
    transport: &mut T,
    mailbox: &str,
) -> Result<(), Error> {
    transport
        .select(mailbox)
        .await
        .map_err(|e| protocol_error("select mailbox", e))
}
