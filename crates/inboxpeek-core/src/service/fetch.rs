//! Resolving UIDs into message records.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::parse::{parse_date, parse_source};
use super::protocol_error;
use crate::error::{Error, Result};
use crate::message::{MessageBody, MessageContent, MessageSummary, NO_SUBJECT, UNKNOWN_SENDER};
use crate::transport::{Envelope, FetchRequest, FetchedMessage, MailTransport};

fn envelope_date(envelope: &Envelope) -> Option<DateTime<Utc>> {
    envelope.date.as_deref().and_then(parse_date)
}

/// An empty flag list is a definite "unread"; only a missing FLAGS item is unknown.
fn seen_flag(fetched: &FetchedMessage) -> Option<bool> {
    fetched.flags.as_ref().map(|_| fetched.is_seen())
}

/// Fetches envelope, date and flags for one message.
///
/// Returns `Ok(None)` when the server returned nothing or no envelope; the
/// caller skips such messages.
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the fetch fails.
pub async fn fetch_header_only<T: MailTransport + ?Sized>(
    transport: &mut T,
    uid: u32,
) -> Result<Option<MessageSummary>> {
    let fetched = transport
        .fetch_one(uid, FetchRequest::Headers)
        .await
        .map_err(|e| protocol_error("fetch headers", e))?;

    let Some(fetched) = fetched else {
        debug!(uid, "Server returned nothing; skipping");
        return Ok(None);
    };
    let Some(envelope) = fetched.envelope.as_ref() else {
        debug!(uid, "No envelope; skipping");
        return Ok(None);
    };

    let date = fetched
        .internal_date
        .or_else(|| envelope_date(envelope))
        .unwrap_or_else(Utc::now);

    Ok(Some(MessageSummary {
        id: uid.to_string(),
        message_id: envelope.message_id.clone(),
        subject: envelope
            .subject
            .clone()
            .unwrap_or_else(|| NO_SUBJECT.to_string()),
        from: envelope
            .from
            .first()
            .cloned()
            .unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
        date,
        seen: seen_flag(&fetched),
    }))
}

/// Fetches and parses the full source of one message.
///
/// The source is fetched with a peek, so `\Seen` is left untouched.
///
/// # Errors
///
/// Returns [`Error::SourceUnavailable`] if the server returned no source,
/// [`Error::Parse`] if it could not be parsed, or [`Error::Protocol`] if the
/// fetch itself fails.
pub async fn fetch_full_content<T: MailTransport + ?Sized>(
    transport: &mut T,
    uid: u32,
) -> Result<MessageContent> {
    let fetched = transport
        .fetch_one(uid, FetchRequest::Source)
        .await
        .map_err(|e| protocol_error("fetch content", e))?;

    let Some((fetched, source)) =
        fetched.and_then(|mut m| m.source.take().map(|source| (m, source)))
    else {
        error!(uid, "Message source unavailable");
        return Err(Error::SourceUnavailable {
            id: uid.to_string(),
        });
    };

    let parsed = parse_source(&source).map_err(|e| {
        error!(uid, error = %e, "Failed to parse message source");
        Error::Parse(e)
    })?;

    let envelope = fetched.envelope.clone().unwrap_or_default();
    let subject = parsed
        .subject
        .or(envelope.subject)
        .unwrap_or_else(|| NO_SUBJECT.to_string());
    let from = parsed
        .from
        .or_else(|| envelope.from.first().cloned())
        .unwrap_or_else(|| UNKNOWN_SENDER.to_string());
    let date = parsed
        .date
        .or(fetched.internal_date)
        .unwrap_or_else(Utc::now);

    Ok(MessageContent {
        summary: MessageSummary {
            id: uid.to_string(),
            message_id: parsed.message_id.or(envelope.message_id),
            subject,
            from,
            date,
            seen: seen_flag(&fetched),
        },
        body: MessageBody {
            text: parsed.text,
            html: parsed.html,
        },
    })
}
