//! Conversion from `async-imap` fetch responses to transport records.

use async_imap::imap_proto::types::{Address, Envelope as ImapEnvelope};
use async_imap::types::{Fetch, Flag};
use chrono::Utc;
use inboxpeek_core::{Envelope, FetchedMessage, MessageFlag};

/// Decodes an envelope string: raw bytes, possibly RFC 2047 encoded.
pub fn decode_text(raw: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if !text.contains("=?") {
        return Some(text.to_string());
    }

    let header = format!("X-Decode: {text}");
    let decoded = mailparse::parse_header(header.as_bytes())
        .map(|(header, _)| header.get_value())
        .unwrap_or_else(|_| text.to_string());
    Some(decoded.trim().to_string())
}

/// Formats an envelope address as `mailbox@host`.
///
/// Group markers (no host) and empty mailboxes yield `None`.
pub fn address(mailbox: Option<&[u8]>, host: Option<&[u8]>) -> Option<String> {
    let mailbox = String::from_utf8_lossy(mailbox?);
    let host = String::from_utf8_lossy(host?);
    if mailbox.is_empty() {
        return None;
    }
    if host.is_empty() {
        return Some(mailbox.into_owned());
    }
    Some(format!("{mailbox}@{host}"))
}

fn convert_address(addr: &Address<'_>) -> Option<String> {
    address(addr.mailbox.as_deref(), addr.host.as_deref())
}

/// Converts an IMAP envelope.
pub fn convert_envelope(envelope: &ImapEnvelope<'_>) -> Envelope {
    Envelope {
        message_id: envelope
            .message_id
            .as_deref()
            .and_then(decode_text),
        subject: envelope.subject.as_deref().and_then(decode_text),
        from: envelope
            .from
            .iter()
            .flatten()
            .filter_map(convert_address)
            .collect(),
        date: envelope.date.as_deref().and_then(decode_text),
    }
}

/// Converts a system flag or keyword. `\Recent` and `\*` are dropped.
pub fn convert_flag(flag: &Flag<'_>) -> Option<MessageFlag> {
    match flag {
        Flag::Seen => Some(MessageFlag::Seen),
        Flag::Answered => Some(MessageFlag::Answered),
        Flag::Flagged => Some(MessageFlag::Flagged),
        Flag::Deleted => Some(MessageFlag::Deleted),
        Flag::Draft => Some(MessageFlag::Draft),
        Flag::Recent | Flag::MayCreate => None,
        Flag::Custom(name) => Some(MessageFlag::Keyword(name.to_string())),
    }
}

/// Converts a flag for `UID STORE`.
pub fn flag_token(flag: &MessageFlag) -> &str {
    match flag {
        MessageFlag::Seen => "\\Seen",
        MessageFlag::Answered => "\\Answered",
        MessageFlag::Flagged => "\\Flagged",
        MessageFlag::Deleted => "\\Deleted",
        MessageFlag::Draft => "\\Draft",
        MessageFlag::Keyword(name) => name,
    }
}

/// Builds the `+FLAGS` argument for `UID STORE`.
pub fn add_flags_query(flags: &[MessageFlag]) -> String {
    let tokens: Vec<_> = flags.iter().map(flag_token).collect();
    format!("+FLAGS ({})", tokens.join(" "))
}

/// Converts one fetch response. `uid` is used when the server omitted it.
pub fn convert_fetch(fetch: &Fetch, uid: u32) -> FetchedMessage {
    FetchedMessage {
        uid: fetch.uid.unwrap_or(uid),
        envelope: fetch.envelope().map(convert_envelope),
        internal_date: fetch.internal_date().map(|date| date.with_timezone(&Utc)),
        // Every request asks for FLAGS, so an empty list means no flags are set.
        flags: Some(fetch.flags().filter_map(|flag| convert_flag(&flag)).collect()),
        source: fetch.body().map(<[u8]>::to_vec),
    }
}
