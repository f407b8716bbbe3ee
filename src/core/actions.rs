//! Output escape sequences
//!
//! Builds the CSI strings the line editor writes to the transport for cursor
//! motion, erasing and screen clearing.

/// Control Sequence Introducer
pub const CSI: &str = "\x1b[";

/// Erase from the cursor to the end of the line: ESC [ K
pub const KILL_TO_EOL: &str = "\x1b[K";

/// Erase the entire current line: ESC [ 2 K
pub const KILL_LINE: &str = "\x1b[2K";

/// Delete the character under the cursor: ESC [ P
pub const DELETE_CHAR: &str = "\x1b[P";

/// Clear screen and scrollback, home the cursor
pub const CLEAR_BUFFER: &str = "\x1b[2J\x1b[3J\x1b[;H";

/// Clear the visible screen, home the cursor
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[;H";

const MAGENTA: &str = "\x1b[95m";
const DEFAULT_FG: &str = "\x1b[39m";

/// Cursor up n rows
pub fn cursor_up(n: usize) -> String {
    motion(n, 'A')
}

/// Cursor down n rows
pub fn cursor_down(n: usize) -> String {
    motion(n, 'B')
}

/// Cursor forward n columns
pub fn cursor_forward(n: usize) -> String {
    motion(n, 'C')
}

/// Cursor back n columns
pub fn cursor_back(n: usize) -> String {
    motion(n, 'D')
}

// Terminals treat a zero count as one, so a zero-distance move writes nothing.
fn motion(n: usize, final_byte: char) -> String {
    if n == 0 {
        String::new()
    } else {
        format!("{}{}{}", CSI, n, final_byte)
    }
}

/// Wrap text in bright magenta foreground, resetting to the default after
pub fn magenta(text: &str) -> String {
    format!("{}{}{}", MAGENTA, text, DEFAULT_FG)
}
