//! Shared test doubles.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing_subscriber::fmt::MakeWriter;

use inboxpeek_core::{
    Envelope, FetchRequest, FetchedMessage, MailTransport, MessageFlag, SearchQuery, ServerConfig,
    TransportError,
};

/// One call received by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    Logout,
    Select(String),
    Search(SearchQuery),
    Fetch(u32, FetchRequest),
    AddFlags(u32, Vec<MessageFlag>),
}

#[derive(Debug, Default)]
struct State {
    messages: BTreeMap<u32, FetchedMessage>,
    calls: Vec<Call>,
    authenticated: bool,
    connect_error: Option<String>,
    search_error: Option<String>,
    flag_error: Option<String>,
}

/// In-memory mailbox that records every call.
///
/// Clones share state, so a test can keep a handle after moving one into a
/// provider.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<State>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message to the mailbox.
    pub fn with_message(self, message: FetchedMessage) -> Self {
        self.state
            .lock()
            .unwrap()
            .messages
            .insert(message.uid, message);
        self
    }

    /// Makes `connect` fail with `message`.
    pub fn fail_connect(self, message: &str) -> Self {
        self.state.lock().unwrap().connect_error = Some(message.to_string());
        self
    }

    /// Makes `search` fail with `message`.
    pub fn fail_search(self, message: &str) -> Self {
        self.state.lock().unwrap().search_error = Some(message.to_string());
        self
    }

    /// Makes `add_flags` fail with `message`.
    pub fn fail_flags(self, message: &str) -> Self {
        self.state.lock().unwrap().flag_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Fetch(..)))
            .count()
    }

    pub fn flag_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::AddFlags(..)))
            .collect()
    }

    pub fn connect_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Connect(_)))
            .count()
    }

    pub fn flags_of(&self, uid: u32) -> Vec<MessageFlag> {
        self.state
            .lock()
            .unwrap()
            .messages
            .get(&uid)
            .and_then(|m| m.flags.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl MailTransport for ScriptedTransport {
    async fn connect(&mut self, config: &ServerConfig) -> Result<(), TransportError> {
        self.record(Call::Connect(config.host.clone()));
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.connect_error {
            return Err(TransportError::Protocol(message.clone()));
        }
        state.authenticated = true;
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), TransportError> {
        self.record(Call::Logout);
        self.state.lock().unwrap().authenticated = false;
        Ok(())
    }

    async fn select(&mut self, mailbox: &str) -> Result<(), TransportError> {
        self.record(Call::Select(mailbox.to_string()));
        Ok(())
    }

    async fn search(&mut self, query: SearchQuery) -> Result<Vec<u32>, TransportError> {
        self.record(Call::Search(query));
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.search_error {
            return Err(TransportError::Protocol(message.clone()));
        }
        Ok(state
            .messages
            .values()
            .filter(|m| query == SearchQuery::All || !m.is_seen())
            .map(|m| m.uid)
            .collect())
    }

    async fn fetch_one(
        &mut self,
        uid: u32,
        request: FetchRequest,
    ) -> Result<Option<FetchedMessage>, TransportError> {
        self.record(Call::Fetch(uid, request));
        let state = self.state.lock().unwrap();
        Ok(state.messages.get(&uid).cloned().map(|mut m| {
            if request == FetchRequest::Headers {
                m.source = None;
            }
            m
        }))
    }

    async fn add_flags(&mut self, uid: u32, flags: &[MessageFlag]) -> Result<(), TransportError> {
        self.record(Call::AddFlags(uid, flags.to_vec()));
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.flag_error {
            return Err(TransportError::Protocol(message.clone()));
        }
        if let Some(message) = state.messages.get_mut(&uid) {
            let current = message.flags.get_or_insert_with(Vec::new);
            for flag in flags {
                if !current.contains(flag) {
                    current.push(flag.clone());
                }
            }
        }
        Ok(())
    }

    fn is_authenticated(&self) -> bool {
        self.state.lock().unwrap().authenticated
    }
}

pub fn at(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap()
}

/// An unseen message from `from`, dated `timestamp`.
pub fn message(uid: u32, from: &str, timestamp: i64) -> FetchedMessage {
    FetchedMessage {
        uid,
        envelope: Some(Envelope {
            message_id: Some(format!("<{uid}@test>")),
            subject: Some(format!("Message {uid}")),
            from: vec![from.to_string()],
            date: None,
        }),
        internal_date: Some(at(timestamp)),
        flags: Some(Vec::new()),
        source: Some(
            format!(
                "From: {from}\r\nSubject: Message {uid}\r\nContent-Type: text/plain\r\n\r\nBody {uid}\r\n"
            )
            .into_bytes(),
        ),
    }
}

pub fn seen(mut message: FetchedMessage) -> FetchedMessage {
    message
        .flags
        .get_or_insert_with(Vec::new)
        .push(MessageFlag::Seen);
    message
}

pub fn config() -> ServerConfig {
    ServerConfig::new("imap.test.com", 993, "test@test.com", "test123")
}

/// In-memory log sink for `tracing_subscriber::fmt`.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// A subscriber writing every event at `DEBUG` and above into this buffer.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + use<> {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
