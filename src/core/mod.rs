//! Line-editing core.
//!
//! This module contains the input state machine that sits between a raw
//! pseudo-terminal and the application:
//!
//! - **actions**: CSI sequences for cursor motion, erasing and clearing
//! - **line_buffer**: Line text and cursor with editing operations
//! - **timer**: Single-slot debounce timer and clock
//! - **prompt**: Debounced prompt show/hide
//! - **input**: Chunk classification and key dispatch
//! - **paste**: Multi-line paste reflow
//! - **session**: Session combining the above with a transport
//! - **registry**: Name-keyed session lookup
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── Transport (display writes)
//! ├── LineBuffer (text + cursor)
//! ├── PromptController
//! │   └── DebounceTimer
//! └── listeners (SessionEvent)
//! ```

pub mod actions;
pub mod input;
pub mod line_buffer;
pub mod paste;
pub mod platform;
pub mod prompt;
pub mod registry;
pub mod session;
pub mod timer;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;
