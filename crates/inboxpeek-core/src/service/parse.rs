//! Raw message source parsing.
//!
//! Extracts the handful of headers a listing needs plus the plain-text and
//! HTML bodies. Multipart trees are walked depth-first; attachments are
//! skipped. Missing pieces come back as `None` or empty strings.

use chrono::{DateTime, Utc};
use mailparse::{DispositionType, MailAddr, MailHeaderMap, MailParseError, ParsedMail};

/// Headers and bodies extracted from a raw source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    /// `Message-ID` header.
    pub message_id: Option<String>,
    /// Decoded `Subject` header.
    pub subject: Option<String>,
    /// First address of the `From` header.
    pub from: Option<String>,
    /// Parsed `Date` header.
    pub date: Option<DateTime<Utc>>,
    /// Plain-text body; parts joined by a blank line.
    pub text: String,
    /// First HTML body.
    pub html: String,
}

/// Parses a raw RFC 5322 message.
///
/// # Errors
///
/// Returns an error if the MIME structure or a part's transfer encoding is
/// malformed.
pub fn parse_source(raw: &[u8]) -> Result<ParsedMessage, MailParseError> {
    let mail = mailparse::parse_mail(raw)?;
    let headers = &mail.headers;

    let mut text_parts = Vec::new();
    let mut html = None;
    collect_bodies(&mail, &mut text_parts, &mut html)?;

    Ok(ParsedMessage {
        message_id: headers.get_first_value("Message-ID").and_then(non_empty),
        subject: headers.get_first_value("Subject").and_then(non_empty),
        from: headers
            .get_first_value("From")
            .and_then(|value| first_address(&value)),
        date: headers
            .get_first_value("Date")
            .and_then(|value| parse_date(&value)),
        text: text_parts.join("\n\n"),
        html: html.unwrap_or_default(),
    })
}

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parses an RFC 5322 date.
///
/// Values chrono rejects are retried leniently, but only when they carry a
/// day of month, a month name and a four-digit year. Anything else is `None`.
#[must_use]
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }
    if !has_date_parts(value) {
        return None;
    }
    let timestamp = mailparse::dateparse(value).ok()?;
    DateTime::<Utc>::from_timestamp(timestamp, 0)
}

fn has_date_parts(value: &str) -> bool {
    let tokens: Vec<String> = value
        .split(|c: char| c.is_whitespace() || c == ',' || c == '-')
        .filter(|token| !token.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    let numeric = |token: &str, lengths: &[usize]| {
        lengths.contains(&token.len()) && token.bytes().all(|b| b.is_ascii_digit())
    };

    let day = tokens.iter().any(|t| numeric(t, &[1, 2]));
    let year = tokens.iter().any(|t| numeric(t, &[4]));
    let month = tokens
        .iter()
        .any(|t| t.len() >= 3 && MONTHS.iter().any(|m| m.starts_with(t.as_str())));
    day && month && year
}

fn collect_bodies(
    part: &ParsedMail<'_>,
    text_parts: &mut Vec<String>,
    html: &mut Option<String>,
) -> Result<(), MailParseError> {
    if !part.subparts.is_empty() {
        for subpart in &part.subparts {
            collect_bodies(subpart, text_parts, html)?;
        }
        return Ok(());
    }

    if part.get_content_disposition().disposition == DispositionType::Attachment {
        return Ok(());
    }

    match part.ctype.mimetype.to_ascii_lowercase().as_str() {
        "text/plain" => {
            let body = part.get_body()?;
            if !body.trim().is_empty() {
                text_parts.push(body);
            }
        }
        "text/html" if html.is_none() => {
            *html = Some(part.get_body()?);
        }
        _ => {}
    }

    Ok(())
}

fn first_address(value: &str) -> Option<String> {
    let parsed = mailparse::addrparse(value).ok().and_then(|list| {
        list.iter().find_map(|addr| match addr {
            MailAddr::Single(info) => Some(info.addr.clone()),
            MailAddr::Group(group) => group.addrs.first().map(|info| info.addr.clone()),
        })
    });

    parsed.and_then(non_empty).or_else(|| non_empty(value.to_string()))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}
