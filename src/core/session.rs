//! Session management
//!
//! A session ties the line editor to one transport: it owns the line buffer,
//! the prompt state and the input mode, queues output until the transport is
//! open, and reports domain events to subscribers.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::config::{InputMode, SessionConfig};

use super::actions;
use super::line_buffer::LineBuffer;
use super::platform::Platform;
use super::prompt::{PromptController, DEFAULT_DEBOUNCE};
use super::registry::{RegistryEntries, SessionRegistry};
use super::timer::{Clock, SystemClock};
use super::transport::Transport;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot rename session '{current}' to '{requested}'")]
    NameChange { current: String, requested: String },

    #[error("Failed to write to transport: {0}")]
    Write(#[source] io::Error),

    #[error("Failed to close transport: {0}")]
    Close(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// Shared handle to a live session
pub type SessionHandle = Rc<RefCell<Session>>;

/// Events delivered to the application
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A submitted line (cooked) or a raw input chunk
    Data(String),
    /// Session was closed
    Close,
    /// Interrupt (Ctrl+C in cooked mode)
    Break,
    /// End of input (Ctrl+D, or Ctrl+Z on Windows)
    Eof,
}

/// Transport lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Initializing,
    Ready,
    Closed,
}

/// Lifecycle combined with prompt display
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Initializing,
    ReadyNoPrompt,
    ReadyPromptPending,
    ReadyPromptShown,
    Closed,
}

/// Host facilities a session depends on
#[derive(Clone)]
pub struct SessionEnv {
    pub platform: Platform,
    pub clock: Rc<dyn Clock>,
    pub debounce: Duration,
}

impl Default for SessionEnv {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            clock: Rc::new(SystemClock),
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// A line-editing session
pub struct Session {
    id: u64,
    pub(super) config: SessionConfig,
    pub(super) line: LineBuffer,
    pub(super) prompt: PromptController,
    pub(super) state: SessionState,
    pub(super) paused: bool,
    pub(super) platform: Platform,
    clock: Rc<dyn Clock>,
    transport: Option<Box<dyn Transport>>,
    pending: VecDeque<String>,
    listeners: Vec<Sender<SessionEvent>>,
    registry: Weak<RefCell<RegistryEntries>>,
    /// Last write left the output cursor mid-line
    line_open: bool,
}

impl Session {
    /// Create a session and register it under its name
    pub fn create(
        config: SessionConfig,
        transport: Box<dyn Transport>,
        registry: &SessionRegistry,
        env: SessionEnv,
    ) -> SessionHandle {
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        let session = Session {
            id,
            prompt: PromptController::new(config.prompt.clone(), env.debounce),
            line: LineBuffer::new(),
            state: SessionState::Initializing,
            paused: false,
            platform: env.platform,
            clock: env.clock,
            transport: Some(transport),
            pending: VecDeque::new(),
            listeners: Vec::new(),
            registry: registry.downgrade(),
            line_open: false,
            config,
        };
        debug!("Session '{}' created (id {})", session.config.name, id);

        let name = session.config.name.clone();
        let handle = Rc::new(RefCell::new(session));
        registry.insert(name, id, handle.clone());
        handle
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn line_text(&self) -> String {
        self.line.text()
    }

    /// 1-based cursor offset within the line
    pub fn cursor(&self) -> usize {
        self.line.cursor()
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn prompt_displayed(&self) -> bool {
        self.prompt.is_displayed()
    }

    pub fn phase(&self) -> SessionPhase {
        match self.state {
            SessionState::Initializing => SessionPhase::Initializing,
            SessionState::Closed => SessionPhase::Closed,
            SessionState::Ready if self.prompt.is_displayed() => SessionPhase::ReadyPromptShown,
            SessionState::Ready if self.prompt.is_pending() => SessionPhase::ReadyPromptPending,
            SessionState::Ready => SessionPhase::ReadyNoPrompt,
        }
    }

    /// Receive events from this session
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.listeners.push(tx);
        rx
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// The transport is open: flush queued output, or schedule the first prompt.
    ///
    /// If a queued write fails the session stays initializing with the unsent
    /// writes still queued, and `open` can be called again.
    pub fn open(&mut self) -> Result<()> {
        if self.state != SessionState::Initializing {
            return Ok(());
        }
        debug!(
            "Session '{}' opening, flushing {} queued writes",
            self.config.name,
            self.pending.len()
        );
        if self.pending.is_empty() {
            self.state = SessionState::Ready;
            self.show_prompt();
            return Ok(());
        }
        while let Some(payload) = self.pending.pop_front() {
            if let Err(e) = self.write_now(&payload) {
                warn!(
                    "Session '{}' flush failed, {} writes kept",
                    self.config.name,
                    self.pending.len() + 1
                );
                self.pending.push_front(payload);
                return Err(e);
            }
        }
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Write application output around the prompt
    pub fn write(&mut self, payload: &str) -> Result<()> {
        match self.state {
            SessionState::Closed => {
                trace!("Ignoring write to closed session '{}'", self.config.name);
                Ok(())
            }
            SessionState::Initializing => {
                self.track_line_end(payload);
                self.pending.push_back(payload.to_string());
                Ok(())
            }
            SessionState::Ready => {
                self.track_line_end(payload);
                self.write_now(payload)
            }
        }
    }

    /// Write output with every line prefixed by the session header
    pub fn write_with_header(&mut self, payload: &str) -> Result<()> {
        let header = self.header();
        let segments: Vec<&str> = payload.split('\n').collect();
        let last = segments.len() - 1;
        let mut prefixed = String::with_capacity(payload.len() + header.len());
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                prefixed.push('\n');
            }
            if i == last && segment.is_empty() {
                break;
            }
            if i > 0 || !self.line_open {
                prefixed.push_str(&header);
            }
            prefixed.push_str(segment);
        }
        self.write(&prefixed)
    }

    fn header(&self) -> String {
        format!("{} ", actions::magenta(&format!("[{}]", self.config.name)))
    }

    fn track_line_end(&mut self, payload: &str) {
        if !payload.is_empty() {
            self.line_open = !payload.ends_with('\n');
        }
    }

    fn write_now(&mut self, payload: &str) -> Result<()> {
        self.hide_prompt()?;
        self.put(&normalize_newlines(payload))?;
        if payload.ends_with('\n') {
            self.show_prompt();
        } else if self.prompt.is_pending() {
            self.prompt.cancel();
        }
        Ok(())
    }

    /// Fire the prompt redraw if its deadline has passed
    pub fn poll_timers(&mut self) -> Result<bool> {
        if self.state != SessionState::Ready {
            return Ok(false);
        }
        let now = self.clock.now();
        match self.prompt.fire(now, &mut self.line) {
            Some(rendered) => {
                self.put(&rendered)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// When the host should next call `poll_timers`
    pub fn next_deadline(&self) -> Option<Instant> {
        self.prompt.deadline()
    }

    /// Clear the screen and redraw an empty prompt
    pub fn clear(&mut self) -> Result<()> {
        if self.state != SessionState::Ready {
            return Ok(());
        }
        self.line.reset();
        self.prompt.set_displayed(false);
        self.line_open = false;
        self.put(actions::CLEAR_BUFFER)?;
        self.show_prompt();
        Ok(())
    }

    /// Replace prompt and input mode. The name must stay the same.
    pub fn reconfigure(&mut self, config: SessionConfig) -> Result<()> {
        if config.name != self.config.name {
            return Err(SessionError::NameChange {
                current: self.config.name.clone(),
                requested: config.name,
            });
        }
        debug!(
            "Session '{}' reconfigured: mode {:?}",
            config.name, config.input_mode
        );
        self.prompt.cancel();
        let hidden = self.hide_prompt();
        self.line.reset();
        self.prompt.set_text(config.prompt.clone());
        self.config = config;
        if self.state == SessionState::Ready {
            self.show_prompt();
        }
        hidden
    }

    /// Host reports that the terminal has closed
    pub fn handle_close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        debug!("Session '{}' closed", self.config.name);
        self.emit(SessionEvent::Close);
        self.teardown();
    }

    /// Close the session and ask the host to close the terminal
    pub fn close(&mut self) -> Result<()> {
        let transport = self.transport.take();
        self.handle_close();
        match transport {
            Some(mut transport) => transport.close().map_err(SessionError::Close),
            None => Ok(()),
        }
    }

    /// Make the session inert without emitting `Close`
    pub fn dispose(&mut self) {
        debug!("Session '{}' disposed", self.config.name);
        self.teardown();
    }

    fn teardown(&mut self) {
        self.prompt.cancel();
        self.listeners.clear();
        self.transport = None;
        self.state = SessionState::Closed;
        if let Some(entries) = self.registry.upgrade() {
            SessionRegistry::remove_entry(&entries, &self.config.name, self.id);
        }
    }

    /// Submit the current line (Enter)
    pub(super) fn submit_line(&mut self) -> Result<()> {
        match self.config.input_mode {
            InputMode::Raw => {
                self.emit(SessionEvent::Data("\r".to_string()));
                return Ok(());
            }
            InputMode::Cooked => {
                let line = format!("{}{}", self.line.text(), self.platform.line_ending());
                self.emit(SessionEvent::Data(line));
            }
            InputMode::RawEcho => self.emit(SessionEvent::Data("\r".to_string())),
            InputMode::Disabled => return Ok(()),
        }
        self.line.reset();
        self.prompt.set_displayed(false);
        self.line_open = false;
        self.put("\r\n")?;
        self.show_prompt();
        Ok(())
    }

    pub(super) fn show_prompt(&mut self) {
        let now = self.clock.now();
        self.prompt.show(now);
    }

    fn hide_prompt(&mut self) -> Result<()> {
        match self.prompt.hide(&self.line) {
            Some(erase) => self.put(&erase),
            None => Ok(()),
        }
    }

    /// Draw a pending prompt now so that echoed input lands after it
    pub(super) fn settle_prompt(&mut self) -> Result<()> {
        match self.prompt.flush(&mut self.line) {
            Some(rendered) => self.put(&rendered),
            None => Ok(()),
        }
    }

    /// Write straight to the transport
    pub(super) fn put(&mut self, data: &str) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        match self.transport.as_mut() {
            Some(transport) => transport.write(data).map_err(SessionError::Write),
            None => Ok(()),
        }
    }

    pub(super) fn emit(&mut self, event: SessionEvent) {
        trace!("Session '{}' event: {:?}", self.config.name, event);
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Turn bare `\n` into `\r\n`
fn normalize_newlines(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len() + 8);
    let mut prev = '\0';
    for ch in payload.chars() {
        if ch == '\n' && prev != '\r' {
            out.push('\r');
        }
        out.push(ch);
        prev = ch;
    }
    out
}
