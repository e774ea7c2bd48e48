//! Rendering results for the terminal.

use std::fmt::Write as _;

use inboxpeek_core::{MessageContent, MessageSummary};
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Output style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Plain,
    Json,
}

impl Format {
    pub const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Plain }
    }
}

fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn marker(message: &MessageSummary) -> char {
    match message.seen {
        Some(false) => '*',
        _ => ' ',
    }
}

/// One line per message: unread marker, id, date, sender, subject.
pub fn summaries(messages: &[MessageSummary], format: Format) -> anyhow::Result<String> {
    if format == Format::Json {
        return json(messages);
    }
    if messages.is_empty() {
        return Ok("No messages.".to_string());
    }

    let width = messages.iter().map(|m| m.id.len()).max().unwrap_or(1);
    let mut out = String::new();
    for message in messages {
        writeln!(
            out,
            "{} {:>width$}  {}  {:<32}  {}",
            marker(message),
            message.id,
            message.date.format(DATE_FORMAT),
            truncate_chars(&message.from, 32),
            message.subject,
        )?;
    }
    Ok(out.trim_end().to_string())
}

/// Headers, a blank line, then the text body (HTML when there is no text).
pub fn content(message: &MessageContent, format: Format) -> anyhow::Result<String> {
    if format == Format::Json {
        return json(message);
    }

    let mut out = String::new();
    writeln!(out, "From:    {}", message.from)?;
    writeln!(out, "Subject: {}", message.subject)?;
    writeln!(out, "Date:    {}", message.date.to_rfc2822())?;
    if let Some(id) = &message.message_id {
        writeln!(out, "Id:      {id}")?;
    }
    out.push('\n');

    let body = if message.body.text.trim().is_empty() {
        &message.body.html
    } else {
        &message.body.text
    };
    out.push_str(body.trim_end());
    Ok(out)
}

/// Confirmation line for a completed action.
pub fn done(action: &str, id: &str, format: Format) -> anyhow::Result<String> {
    if format == Format::Json {
        return json(&serde_json::json!({ "action": action, "id": id, "ok": true }));
    }
    Ok(format!("{action}: {id}"))
}

fn truncate_chars(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(max.saturating_sub(1)).collect();
    shortened.push('\u{2026}');
    shortened
}
