//! One-shot classification session against the service.
//!
//! A session walks `Idle → Connecting → Sending → AwaitingResult →
//! (Complete | Failed) → Idle`. The whole signal goes out in a single
//! message; progress messages surface as events without changing state;
//! malformed messages are reported and skipped so a later `complete` can
//! still land. There is no automatic retry and no cancellation beyond
//! dropping the session.

use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::config::Config;
use crate::error::{MozzieError, Result};
use crate::session::protocol::{self, ClassifyResult, Mode, ServerMessage};

/// Lifecycle of a classification session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Sending,
    AwaitingResult,
    Complete,
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Connecting => "connecting",
            SessionState::Sending => "sending",
            SessionState::AwaitingResult => "awaiting result",
            SessionState::Complete => "complete",
            SessionState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Events a session reports while running.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session moved to a new lifecycle state.
    State(SessionState),
    /// Transient status text from the service.
    Progress {
        message: String,
        percent: Option<String>,
    },
    /// A message the client could not parse; the raw payload is kept for
    /// diagnostics and the session keeps listening.
    Malformed { raw: String, error: String },
}

/// A single classification request over one WebSocket.
pub struct ClassifySession {
    endpoint: String,
    mode: Mode,
    connect_timeout: Duration,
    state: SessionState,
    events: Option<UnboundedSender<SessionEvent>>,
}

impl ClassifySession {
    pub fn new(service_url: &str, mode: Mode) -> Self {
        Self {
            endpoint: mode.endpoint(service_url),
            mode,
            connect_timeout: Duration::from_secs(crate::defaults::CONNECT_TIMEOUT_SECS),
            state: SessionState::Idle,
            events: None,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Deliver state changes and progress text to the given channel.
    pub fn with_events(mut self, events: UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(events) = &self.events {
            // A dropped receiver just means nobody is listening anymore.
            let _ = events.send(event);
        }
    }

    fn set_state(&mut self, state: SessionState) {
        self.state = state;
        self.emit(SessionEvent::State(state));
    }

    /// Send the signal and wait for the terminal result.
    ///
    /// The signal must already be normalized and batched; it is serialized
    /// as one flat JSON array.
    pub async fn run(&mut self, signal: &[f32]) -> Result<ClassifyResult> {
        let outcome = self.run_inner(signal).await;
        match outcome {
            Ok(_) => self.set_state(SessionState::Complete),
            Err(_) => self.set_state(SessionState::Failed),
        }
        self.set_state(SessionState::Idle);
        outcome
    }

    async fn run_inner(&mut self, signal: &[f32]) -> Result<ClassifyResult> {
        if signal.is_empty() {
            return Err(MozzieError::invalid_input("cannot classify an empty signal"));
        }

        self.set_state(SessionState::Connecting);
        let (socket, _response) =
            tokio::time::timeout(self.connect_timeout, connect_async(self.endpoint.as_str()))
                .await
                .map_err(|_| {
                    MozzieError::transport(format!(
                        "Timed out connecting to {} after {:?}",
                        self.endpoint, self.connect_timeout
                    ))
                })?
                .map_err(|e| {
                    MozzieError::transport(format!(
                        "Failed to connect to {}: {}",
                        self.endpoint, e
                    ))
                })?;

        let (mut sink, mut stream) = socket.split();

        self.set_state(SessionState::Sending);
        let payload = protocol::encode_signal(signal)?;
        sink.send(Message::Text(payload.into()))
            .await
            .map_err(|e| MozzieError::transport(format!("Failed to send signal: {}", e)))?;

        self.set_state(SessionState::AwaitingResult);
        while let Some(message) = stream.next().await {
            let message = message
                .map_err(|e| MozzieError::transport(format!("Connection error: {}", e)))?;

            match message {
                Message::Text(text) => match ServerMessage::from_json(text.as_str()) {
                    Ok(ServerMessage::Progress { data }) => {
                        self.emit(SessionEvent::Progress {
                            message: data.message,
                            percent: data.progress,
                        });
                    }
                    Ok(ServerMessage::Complete { data }) => {
                        return ClassifyResult::parse(self.mode, data);
                    }
                    Ok(ServerMessage::Error { data }) => {
                        return Err(MozzieError::transport(format!(
                            "Service reported {}: {}",
                            data.error, data.message
                        )));
                    }
                    Err(e) => {
                        self.emit(SessionEvent::Malformed {
                            raw: text.to_string(),
                            error: e.to_string(),
                        });
                    }
                },
                Message::Close(_) => break,
                // Binary frames are not part of the protocol; pings are
                // answered by the transport.
                _ => {}
            }
        }

        Err(MozzieError::transport(
            "Connection closed before a result was delivered",
        ))
    }
}

/// Issues classification requests, holding the one-in-flight-per-mode
/// invariant.
///
/// Two concurrent requests for the same mode would race for the result
/// view, so the second is rejected with `SessionBusy` instead of queued.
pub struct Classifier {
    service_url: String,
    connect_timeout: Duration,
    in_flight: [AtomicBool; 2],
}

impl Classifier {
    pub fn new(config: &Config) -> Self {
        Self {
            service_url: config.service.url.clone(),
            connect_timeout: Duration::from_secs(config.service.connect_timeout_secs),
            in_flight: [AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    /// Run one classification session for `mode`.
    ///
    /// Fails immediately with `SessionBusy` when a session for the same
    /// mode has not finished yet.
    pub async fn classify(
        &self,
        mode: Mode,
        signal: &[f32],
        events: Option<UnboundedSender<SessionEvent>>,
    ) -> Result<ClassifyResult> {
        let slot = &self.in_flight[mode.index()];
        if slot
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(MozzieError::SessionBusy {
                mode: mode.to_string(),
            });
        }
        let _guard = InFlightGuard(slot);

        let mut session =
            ClassifySession::new(&self.service_url, mode).with_connect_timeout(self.connect_timeout);
        if let Some(events) = events {
            session = session.with_events(events);
        }
        session.run(signal).await
    }
}

/// Clears the in-flight flag when the session finishes, even on early
/// return.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
