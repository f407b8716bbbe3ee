//! Host-side input handling.
//!
//! - **keymapper**: Keyboard events to the input chunks a session expects

pub mod keymapper;

pub use keymapper::*;
