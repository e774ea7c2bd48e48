//! Ordering, sender filtering and truncation of listings.
//!
//! Ordering is always computed from `date`, never from fetch order, and
//! truncation always happens last.

use crate::message::MessageSummary;

/// Sorts newest first by date. Equal dates keep their relative order.
#[must_use]
pub fn sort_newest_first(mut messages: Vec<MessageSummary>) -> Vec<MessageSummary> {
    messages.sort_by(|a, b| b.date.cmp(&a.date));
    messages
}

/// Whether `message` was sent from an address containing any of `substrings`.
///
/// Case-insensitive. An empty list matches everything.
#[must_use]
pub fn matches_sender(message: &MessageSummary, substrings: &[String]) -> bool {
    if substrings.is_empty() {
        return true;
    }

    let from = message.from.to_lowercase();
    substrings
        .iter()
        .any(|needle| from.contains(&needle.to_lowercase()))
}

/// Keeps the messages whose sender matches any of `substrings`.
#[must_use]
pub fn filter_by_sender(messages: Vec<MessageSummary>, substrings: &[String]) -> Vec<MessageSummary> {
    messages
        .into_iter()
        .filter(|m| matches_sender(m, substrings))
        .collect()
}

/// Keeps the first `limit` messages.
#[must_use]
pub fn truncate(mut messages: Vec<MessageSummary>, limit: usize) -> Vec<MessageSummary> {
    messages.truncate(limit);
    messages
}

/// The last `count` identifiers of an ascending list.
pub(crate) fn most_recent(ids: &[u32], count: usize) -> &[u32] {
    &ids[ids.len().saturating_sub(count)..]
}
