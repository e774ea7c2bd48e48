//! Message records and search filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subject used when a message has none.
pub const NO_SUBJECT: &str = "(no subject)";

/// Sender used when a message has none.
pub const UNKNOWN_SENDER: &str = "(unknown sender)";

/// Default number of messages returned by a filtered listing.
pub const DEFAULT_LIMIT: usize = 10;

/// Lightweight listing record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    /// Mailbox-scoped identifier (the UID), stable only within a session.
    pub id: String,
    /// Globally unique `Message-ID`, if known.
    pub message_id: Option<String>,
    /// Subject, or [`NO_SUBJECT`].
    pub subject: String,
    /// Sender address, or [`UNKNOWN_SENDER`].
    pub from: String,
    /// Message date; the fetch time when the server reported none.
    pub date: DateTime<Utc>,
    /// Whether `\Seen` was set; `None` if the server sent no FLAGS item.
    pub seen: Option<bool>,
}

/// Text and HTML bodies. Missing parts are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    /// Plain-text body.
    pub text: String,
    /// HTML body.
    pub html: String,
}

/// Full message record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageContent {
    /// Listing fields.
    #[serde(flatten)]
    pub summary: MessageSummary,
    /// Bodies; always present once content has been fetched.
    pub body: MessageBody,
}

impl std::ops::Deref for MessageContent {
    type Target = MessageSummary;

    fn deref(&self) -> &Self::Target {
        &self.summary
    }
}

/// Options for a filtered listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilter {
    /// Only messages without `\Seen`.
    pub unread_only: bool,
    /// Case-insensitive sender substrings; a message matches if any one does.
    pub from_addresses: Vec<String>,
    /// Maximum number of results. Zero selects [`DEFAULT_LIMIT`].
    pub limit: usize,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            unread_only: false,
            from_addresses: Vec::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl SearchFilter {
    /// Creates the default filter: all messages, no sender filter, limit 10.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to unread messages.
    #[must_use]
    pub const fn unread_only(mut self) -> Self {
        self.unread_only = true;
        self
    }

    /// Adds a sender substring.
    #[must_use]
    pub fn from_address(mut self, substring: impl Into<String>) -> Self {
        self.from_addresses.push(substring.into());
        self
    }

    /// Sets the result limit.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The limit actually applied.
    #[must_use]
    pub const fn effective_limit(&self) -> usize {
        if self.limit == 0 { DEFAULT_LIMIT } else { self.limit }
    }

    /// Whether a sender filter is present.
    #[must_use]
    pub fn has_sender_filter(&self) -> bool {
        !self.from_addresses.is_empty()
    }
}
