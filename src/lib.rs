//! lineterm - line editing for pseudo-terminals
//!
//! lineterm sits between a raw, char-oriented terminal transport and an
//! application. In cooked mode it edits the line locally and hands the
//! application whole lines; in raw modes it forwards every chunk.
//!
//! # Features
//!
//! - **Cooked editing**: cursor motion, deletion, kill line, clear screen
//! - **Signals**: Ctrl+C break and Ctrl+D / Ctrl+Z end-of-input events
//! - **Paste reflow**: multi-line pastes become one submit per line
//! - **Prompt debouncing**: the prompt is hidden around output and redrawn once
//!   output goes quiet
//!
//! # Example
//!
//! ```no_run
//! use lineterm::{Session, SessionConfig, SessionEnv, SessionEvent, SessionRegistry, WriterTransport};
//!
//! let registry = SessionRegistry::new();
//! let transport = Box::new(WriterTransport::new(std::io::stdout()));
//! let session = Session::create(SessionConfig::default(), transport, &registry, SessionEnv::default());
//! let events = session.borrow_mut().subscribe();
//!
//! session.borrow_mut().open().unwrap();
//! session.borrow_mut().handle_input("ls\r");
//! if let Ok(SessionEvent::Data(line)) = events.try_recv() {
//!     session.borrow_mut().write(&format!("ran {}", line)).unwrap();
//! }
//! ```

pub mod config;
pub mod core;
pub mod ui;

pub use crate::config::{Config, ConfigError, InputMode, SessionConfig};
pub use crate::core::input::LineAction;
pub use crate::core::platform::Platform;
pub use crate::core::registry::SessionRegistry;
pub use crate::core::session::{
    Session, SessionEnv, SessionError, SessionEvent, SessionHandle, SessionPhase,
};
pub use crate::core::timer::{Clock, SystemClock};
pub use crate::core::transport::{Transport, WriterTransport};
