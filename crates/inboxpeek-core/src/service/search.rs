//! Listing operations.

use tracing::{debug, info};

use super::fetch::fetch_header_only;
use super::protocol_error;
use super::shape::{matches_sender, most_recent, sort_newest_first, truncate};
use crate::error::Result;
use crate::message::{MessageSummary, SearchFilter};
use crate::transport::{MailTransport, SearchQuery};

/// Maximum number of unread messages returned by [`list_unread`].
pub const UNREAD_LIMIT: usize = 10;

/// Over-fetch factor applied when a sender filter is present.
const SENDER_FILTER_WINDOW: usize = 3;

async fn search_sorted<T: MailTransport + ?Sized>(
    transport: &mut T,
    query: SearchQuery,
) -> Result<Vec<u32>> {
    let mut uids = transport
        .search(query)
        .await
        .map_err(|e| protocol_error("search", e))?;
    uids.sort_unstable();
    uids.dedup();
    Ok(uids)
}

/// The newest unread messages, at most [`UNREAD_LIMIT`], newest first.
///
/// Never changes any flag.
///
/// # Errors
///
/// Returns [`crate::Error::Protocol`] if the search or a fetch fails.
pub async fn list_unread<T: MailTransport + ?Sized>(
    transport: &mut T,
) -> Result<Vec<MessageSummary>> {
    let uids = search_sorted(transport, SearchQuery::Unseen).await?;
    if uids.is_empty() {
        info!("No unread messages");
        return Ok(Vec::new());
    }

    let window = most_recent(&uids, UNREAD_LIMIT);
    info!(
        found = uids.len(),
        shown = window.len(),
        "{} unread found, showing {} most recent",
        uids.len(),
        window.len()
    );

    let mut messages = Vec::with_capacity(window.len());
    for &uid in window {
        if let Some(summary) = fetch_header_only(transport, uid).await? {
            messages.push(summary);
        }
    }

    info!(count = messages.len(), "Listed unread messages");
    Ok(sort_newest_first(messages))
}

/// Messages matching `filter`, newest first.
///
/// With a sender filter the newest `3 * limit` candidates are examined, so
/// fewer than `limit` results may come back even when older matches exist.
///
/// # Errors
///
/// Returns [`crate::Error::Protocol`] if the search or a fetch fails.
pub async fn list_filtered<T: MailTransport + ?Sized>(
    transport: &mut T,
    filter: &SearchFilter,
) -> Result<Vec<MessageSummary>> {
    let limit = filter.effective_limit();
    let query = if filter.unread_only {
        SearchQuery::Unseen
    } else {
        SearchQuery::All
    };

    let uids = search_sorted(transport, query).await?;
    if uids.is_empty() {
        info!(?query, "No messages match the search");
        return Ok(Vec::new());
    }

    let window_size = if filter.has_sender_filter() {
        limit.saturating_mul(SENDER_FILTER_WINDOW)
    } else {
        limit
    };
    let window = most_recent(&uids, window_size);
    debug!(
        found = uids.len(),
        window = window.len(),
        limit,
        "Examining most recent candidates"
    );

    let mut messages = Vec::with_capacity(limit.min(window.len()));
    for &uid in window.iter().rev() {
        let Some(summary) = fetch_header_only(transport, uid).await? else {
            continue;
        };
        if !matches_sender(&summary, &filter.from_addresses) {
            continue;
        }
        messages.push(summary);
        if messages.len() >= limit {
            break;
        }
    }

    let messages = truncate(sort_newest_first(messages), limit);
    info!(
        count = messages.len(),
        unread_only = filter.unread_only,
        senders = filter.from_addresses.len(),
        "Listed messages"
    );
    Ok(messages)
}
