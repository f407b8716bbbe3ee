//! Test fixtures: a recording transport, a manual clock and a session harness

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::Rc;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use crate::config::{InputMode, SessionConfig};

use super::platform::Platform;
use super::prompt::DEFAULT_DEBOUNCE;
use super::registry::SessionRegistry;
use super::session::{Session, SessionEnv, SessionEvent, SessionHandle, SessionPhase};
use super::timer::Clock;
use super::transport::Transport;

pub(crate) struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub(crate) fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingTransport {
    output: Rc<RefCell<String>>,
    closed: Rc<Cell<bool>>,
    failing: Rc<Cell<bool>>,
}

impl RecordingTransport {
    pub(crate) fn take(&self) -> String {
        std::mem::take(&mut *self.output.borrow_mut())
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub(crate) fn fail_writes(&self, failing: bool) {
        self.failing.set(failing);
    }
}

impl Transport for RecordingTransport {
    fn write(&mut self, data: &str) -> io::Result<()> {
        if self.failing.get() {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "transport gone"));
        }
        self.output.borrow_mut().push_str(data);
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed.set(true);
        Ok(())
    }
}

pub(crate) struct Harness {
    pub(crate) session: SessionHandle,
    pub(crate) registry: SessionRegistry,
    pub(crate) transport: RecordingTransport,
    pub(crate) clock: Rc<ManualClock>,
    pub(crate) events: Receiver<SessionEvent>,
}

impl Harness {
    /// Session named "test" with prompt "> ", not yet open
    pub(crate) fn new(mode: InputMode) -> Self {
        Self::build(&SessionRegistry::new(), mode, Platform::Unix)
    }

    /// Open session with its first prompt drawn and output cleared
    pub(crate) fn ready(mode: InputMode) -> Self {
        Self::with_platform(mode, Platform::Unix)
    }

    pub(crate) fn with_platform(mode: InputMode, platform: Platform) -> Self {
        Self::open(Self::build(&SessionRegistry::new(), mode, platform))
    }

    pub(crate) fn in_registry(registry: &SessionRegistry, mode: InputMode) -> Self {
        Self::open(Self::build(registry, mode, Platform::Unix))
    }

    fn build(registry: &SessionRegistry, mode: InputMode, platform: Platform) -> Self {
        let transport = RecordingTransport::default();
        let clock = Rc::new(ManualClock::new());
        let config = SessionConfig {
            name: "test".to_string(),
            prompt: "> ".to_string(),
            input_mode: mode,
        };
        let env = SessionEnv {
            platform,
            clock: clock.clone(),
            debounce: DEFAULT_DEBOUNCE,
        };
        let session = Session::create(config, Box::new(transport.clone()), registry, env);
        let events = session.borrow_mut().subscribe();
        Self {
            session,
            registry: registry.clone(),
            transport,
            clock,
            events,
        }
    }

    fn open(mut self) -> Self {
        self.session.borrow_mut().open().unwrap();
        assert!(self.tick());
        self.take_output();
        self
    }

    pub(crate) fn input(&mut self, chunk: &str) {
        self.session.borrow_mut().handle_input(chunk);
    }

    pub(crate) fn write(&mut self, payload: &str) {
        self.session.borrow_mut().write(payload).unwrap();
    }

    pub(crate) fn drain(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    pub(crate) fn take_output(&mut self) -> String {
        self.transport.take()
    }

    pub(crate) fn line(&self) -> (String, usize) {
        let session = self.session.borrow();
        (session.line_text(), session.cursor())
    }

    pub(crate) fn phase(&self) -> SessionPhase {
        self.session.borrow().phase()
    }

    pub(crate) fn advance(&mut self, ms: u64) {
        self.clock.advance(Duration::from_millis(ms));
    }

    pub(crate) fn poll(&mut self) -> bool {
        self.session.borrow_mut().poll_timers().unwrap()
    }

    /// Let the debounce window pass and poll once
    pub(crate) fn tick(&mut self) -> bool {
        self.clock.advance(DEFAULT_DEBOUNCE);
        self.poll()
    }
}
