//! Input classification
//!
//! Each chunk delivered by the host is either Enter, DEL, a recognized
//! escape/control sequence, or text. Text (including anything unrecognized)
//! falls through to paste reflow so nothing typed is silently lost.

use tracing::{error, trace};

use crate::config::InputMode;

use super::platform::Platform;
use super::session::{Result, Session, SessionEvent, SessionState};

/// Byte sent by the Enter key
pub const ENTER: &str = "\r";

/// Byte sent by the Backspace key
pub const DEL: &str = "\x7f";

const ESC: char = '\x1b';

/// An editing or signalling action bound to a key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineAction {
    MoveLeft,
    MoveRight,
    MoveToStart,
    MoveToEnd,
    /// Reserved for history navigation
    HistoryPrevious,
    /// Reserved for history navigation
    HistoryNext,
    DeleteCharBeforeCursor,
    DeleteCharAtCursor,
    KillToEnd,
    KillLine,
    ClearScreen,
    Break,
    Eof,
}

/// First-level classification of a chunk
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind<'a> {
    Enter,
    Delete,
    Other(&'a str),
}

pub fn classify(chunk: &str) -> InputKind<'_> {
    match chunk {
        ENTER => InputKind::Enter,
        DEL => InputKind::Delete,
        other => InputKind::Other(other),
    }
}

/// Outcome of escape/control handling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Escape<'a> {
    /// Consumed, with the action to run (if any)
    Handled(Option<LineAction>),
    /// Not a key sequence; to be inserted as text
    Unhandled(&'a str),
}

/// Decode a chunk in cooked mode
pub fn decode_cooked(chunk: &str, platform: Platform) -> Escape<'_> {
    let mut chars = chunk.chars();
    let Some(first) = chars.next() else {
        return Escape::Unhandled(chunk);
    };

    if first == ESC {
        // Only ESC [ X is understood; longer sequences degrade to text
        let rest: Vec<char> = chars.collect();
        return match rest.as_slice() {
            ['[', key] => Escape::Handled(csi_action(*key)),
            _ => Escape::Unhandled(chunk),
        };
    }

    if chars.next().is_none() && (first as u32) < 0x20 {
        let letter = char::from(first as u8 + 0x40);
        return Escape::Handled(control_action(letter, platform));
    }

    Escape::Unhandled(chunk)
}

fn csi_action(key: char) -> Option<LineAction> {
    match key {
        'C' => Some(LineAction::MoveRight),
        'D' => Some(LineAction::MoveLeft),
        'H' => Some(LineAction::MoveToStart),
        'E' => Some(LineAction::MoveToEnd),
        'A' => Some(LineAction::HistoryPrevious),
        'B' => Some(LineAction::HistoryNext),
        _ => None,
    }
}

fn control_action(letter: char, platform: Platform) -> Option<LineAction> {
    match letter {
        'C' => Some(LineAction::Break),
        // Ctrl+D is end-of-input only; it never deletes at the cursor
        'D' | 'Z' if letter == platform.eof_letter() => Some(LineAction::Eof),
        'A' => Some(LineAction::MoveToStart),
        'E' => Some(LineAction::MoveToEnd),
        'F' => Some(LineAction::MoveRight),
        'B' => Some(LineAction::MoveLeft),
        'H' => Some(LineAction::DeleteCharBeforeCursor),
        'K' => Some(LineAction::KillToEnd),
        'U' => Some(LineAction::KillLine),
        'L' => Some(LineAction::ClearScreen),
        _ => None,
    }
}

impl Session {
    /// Process one chunk of input from the host.
    ///
    /// Failures are logged and dropped; the session stays usable.
    pub fn handle_input(&mut self, chunk: &str) {
        if let Err(e) = self.dispatch_input(chunk) {
            error!("Session '{}' failed to process input: {}", self.config.name, e);
        }
    }

    /// Run a single editing action as if its key had been pressed.
    /// Only cooked sessions edit locally; other modes ignore it.
    pub fn apply_action(&mut self, action: LineAction) -> Result<()> {
        if self.state != SessionState::Ready
            || self.paused
            || self.config.input_mode != InputMode::Cooked
        {
            trace!("Ignoring {:?}", action);
            return Ok(());
        }
        self.settle_prompt()?;
        self.run_action(action)
    }

    fn dispatch_input(&mut self, chunk: &str) -> Result<()> {
        let mode = self.config.input_mode;
        if chunk.is_empty() || self.paused || mode == InputMode::Disabled {
            return Ok(());
        }
        if self.state != SessionState::Ready {
            trace!("Dropping input before the transport is ready");
            return Ok(());
        }
        if mode != InputMode::Raw {
            self.settle_prompt()?;
        }

        match classify(chunk) {
            InputKind::Enter => self.submit_line(),
            InputKind::Delete if mode == InputMode::Cooked => {
                self.run_action(LineAction::DeleteCharBeforeCursor)
            }
            InputKind::Delete => {
                self.emit(SessionEvent::Data(chunk.to_string()));
                Ok(())
            }
            InputKind::Other(text) => match self.dispatch_escape(text)? {
                Escape::Handled(Some(action)) => self.run_action(action),
                Escape::Handled(None) => Ok(()),
                Escape::Unhandled(text) => self.reflow_paste(text),
            },
        }
    }

    fn dispatch_escape<'a>(&mut self, chunk: &'a str) -> Result<Escape<'a>> {
        match self.config.input_mode {
            InputMode::Cooked => Ok(decode_cooked(chunk, self.platform)),
            InputMode::RawEcho => {
                self.put(chunk)?;
                self.emit(SessionEvent::Data(chunk.to_string()));
                Ok(Escape::Handled(None))
            }
            InputMode::Raw | InputMode::Disabled => {
                self.emit(SessionEvent::Data(chunk.to_string()));
                Ok(Escape::Handled(None))
            }
        }
    }

    pub(super) fn run_action(&mut self, action: LineAction) -> Result<()> {
        trace!("Line action: {:?}", action);
        let echo = match action {
            LineAction::MoveLeft => self.line.move_left(),
            LineAction::MoveRight => self.line.move_right(),
            LineAction::MoveToStart => self.line.move_to_start(),
            LineAction::MoveToEnd => self.line.move_to_end(),
            LineAction::HistoryPrevious | LineAction::HistoryNext => None,
            LineAction::DeleteCharBeforeCursor => self.line.delete_char_before_cursor(),
            LineAction::DeleteCharAtCursor => self.line.delete_char_at_cursor(),
            LineAction::KillToEnd => self.line.kill_to_end(),
            LineAction::KillLine => self.line.kill_line(),
            LineAction::ClearScreen => return self.clear(),
            LineAction::Break => {
                self.emit(SessionEvent::Break);
                None
            }
            LineAction::Eof => {
                self.emit(SessionEvent::Eof);
                None
            }
        };
        match echo {
            Some(sequence) => self.put(&sequence),
            None => Ok(()),
        }
    }
}
