//! Key mapping for session input
//!
//! Converts crossterm key events into the character chunks a session reads,
//! as a terminal would deliver them over a pty.

use bitflags::bitflags;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

bitflags! {
    /// Modifier keys
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        let mut result = Modifiers::empty();
        if mods.contains(KeyModifiers::SHIFT) {
            result |= Modifiers::SHIFT;
        }
        if mods.contains(KeyModifiers::CONTROL) {
            result |= Modifiers::CTRL;
        }
        if mods.contains(KeyModifiers::ALT) {
            result |= Modifiers::ALT;
        }
        result
    }
}

/// Key mapper for converting key events to input chunks
pub struct KeyMapper;

impl KeyMapper {
    /// Map a crossterm KeyEvent to an input chunk
    pub fn map(event: &KeyEvent) -> Option<String> {
        let mods = Modifiers::from(event.modifiers);

        match event.code {
            KeyCode::Char(ch) => Some(Self::map_char(ch, mods)),
            KeyCode::Enter => Some("\r".to_string()),
            KeyCode::Backspace => {
                if mods.contains(Modifiers::ALT) {
                    Some("\x1b\x7f".to_string())
                } else {
                    Some("\x7f".to_string())
                }
            }
            KeyCode::Tab => Some("\t".to_string()),
            KeyCode::BackTab => Some("\x1b[Z".to_string()),
            KeyCode::Esc => Some("\x1b".to_string()),

            KeyCode::Up => Some(Self::csi_key('A', mods)),
            KeyCode::Down => Some(Self::csi_key('B', mods)),
            KeyCode::Right => Some(Self::csi_key('C', mods)),
            KeyCode::Left => Some(Self::csi_key('D', mods)),

            // The line editor binds CSI H / CSI E to start / end of line
            KeyCode::Home => Some(Self::csi_key('H', mods)),
            KeyCode::End => Some(Self::csi_key('E', mods)),

            KeyCode::Delete => Some("\x1b[3~".to_string()),

            _ => None,
        }
    }

    /// Like `map`, but cursor keys drop their modifiers since the line
    /// editor only understands the bare `ESC [ X` forms
    pub fn map_cooked(event: &KeyEvent) -> Option<String> {
        let key = match event.code {
            KeyCode::Up => 'A',
            KeyCode::Down => 'B',
            KeyCode::Right => 'C',
            KeyCode::Left => 'D',
            KeyCode::Home => 'H',
            KeyCode::End => 'E',
            _ => return Self::map(event),
        };
        Some(Self::csi_key(key, Modifiers::empty()))
    }

    /// Map a character with modifiers
    fn map_char(ch: char, mods: Modifiers) -> String {
        // Ctrl + letter = control character
        if mods.contains(Modifiers::CTRL) && !mods.contains(Modifiers::ALT) {
            if ch.is_ascii_alphabetic() {
                let ctrl_code = (ch.to_ascii_lowercase() as u8) - b'a' + 1;
                return char::from(ctrl_code).to_string();
            }
            match ch {
                '@' | '`' | ' ' => return "\x00".to_string(),
                '[' => return "\x1b".to_string(),
                '\\' => return "\x1c".to_string(),
                ']' => return "\x1d".to_string(),
                '^' | '~' => return "\x1e".to_string(),
                '_' | '?' => return "\x1f".to_string(),
                _ => {}
            }
        }

        // Alt + key = ESC + key
        if mods.contains(Modifiers::ALT) && !mods.contains(Modifiers::CTRL) {
            return format!("\x1b{}", ch);
        }

        ch.to_string()
    }

    /// ESC [ X, or ESC [ 1 ; mod X with modifiers
    fn csi_key(key: char, mods: Modifiers) -> String {
        if mods.is_empty() || mods == Modifiers::SHIFT {
            format!("\x1b[{}", key)
        } else {
            format!("\x1b[1;{}{}", Self::modifier_code(mods), key)
        }
    }

    /// Calculate xterm modifier code
    fn modifier_code(mods: Modifiers) -> u8 {
        1 + if mods.contains(Modifiers::SHIFT) { 1 } else { 0 }
            + if mods.contains(Modifiers::ALT) { 2 } else { 0 }
            + if mods.contains(Modifiers::CTRL) { 4 } else { 0 }
    }
}
