//! Flag mutation. The only code path that changes message state.

use tracing::info;

use super::protocol_error;
use crate::error::Result;
use crate::transport::{MailTransport, MessageFlag};

/// Sets `\Seen` on one message.
///
/// # Errors
///
/// Returns [`crate::Error::Protocol`] if the server rejects the store.
pub async fn mark_as_read<T: MailTransport + ?Sized>(transport: &mut T, uid: u32) -> Result<()> {
    transport
        .add_flags(uid, &[MessageFlag::Seen])
        .await
        .map_err(|e| protocol_error("mark as read", e))?;

    info!(uid, "Marked message as read");
    Ok(())
}
