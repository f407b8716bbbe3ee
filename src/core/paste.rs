//! Paste reflow
//!
//! Text chunks are inserted at the cursor. A chunk spanning several lines is
//! replayed as one submit per line break, carrying any text that was after
//! the cursor over to the last line.

use super::actions;
use super::session::{Result, Session};

/// Split on `\r\n`, `\r` or `\n`. A trailing terminator yields a final empty line.
pub fn split_lines(chunk: &str) -> Vec<&str> {
    let bytes = chunk.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                lines.push(&chunk[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            b'\n' => {
                lines.push(&chunk[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&chunk[start..]);
    lines
}

impl Session {
    pub(super) fn reflow_paste(&mut self, chunk: &str) -> Result<()> {
        let lines = split_lines(chunk);
        if lines.len() > 1 {
            // Embedded submits must not schedule their own redraws
            self.prompt.cancel();
            self.prompt.set_displayed(false);
            self.prompt.suspend();
        }
        let result = self.reflow_lines(&lines);
        self.prompt.resume();
        result
    }

    fn reflow_lines(&mut self, lines: &[&str]) -> Result<()> {
        let last = lines.len() - 1;
        for (i, line) in lines.iter().enumerate() {
            let is_last = i == last;
            if is_last && line.is_empty() {
                self.prompt.resume();
                self.show_prompt();
                return Ok(());
            }

            let inserted: Vec<char> = line.chars().collect();
            let tail = self.line.tail();
            self.line.insert_at_cursor(&inserted);
            self.put(actions::KILL_TO_EOL)?;

            if is_last {
                let tail: String = self.line.tail().into_iter().collect();
                self.put(&tail)?;
                let back = tail.chars().count() - inserted.len();
                self.put(&actions::cursor_back(back))?;
                self.line.advance(inserted.len());
                continue;
            }

            self.put(line)?;
            self.line.advance(inserted.len());
            self.line.truncate_at_cursor();
            self.submit_line()?;

            let next_is_final_break = i + 1 == last && lines[last].is_empty();
            if !tail.is_empty() || !next_is_final_break {
                self.render_fresh_prompt()?;
            }
            if !tail.is_empty() {
                let rendered: String = tail.iter().collect();
                self.put(&rendered)?;
                self.put(&actions::cursor_back(tail.len()))?;
                self.line.replace(tail);
            }
        }
        Ok(())
    }

    /// Write the bare prompt mid-paste so the next line lands after it
    fn render_fresh_prompt(&mut self) -> Result<()> {
        let prompt = self.prompt.text().to_string();
        self.put(&prompt)?;
        self.prompt.set_displayed(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputMode;
    use crate::core::session::{SessionEvent, SessionPhase};
    use crate::core::testing::Harness;

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("abc"), vec!["abc"]);
        assert_eq!(split_lines("abc\ndef\n"), vec!["abc", "def", ""]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
        assert_eq!(split_lines("\n"), vec!["", ""]);
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut h = Harness::ready(InputMode::Cooked);
        h.input("a");
        h.input("c");
        h.input("\x1b[D");
        h.take_output();
        h.input("b");
        assert_eq!(h.line(), ("abc".to_string(), 3));
        assert_eq!(h.take_output(), "\x1b[Kbc\x1b[1D");
    }

    #[test]
    fn test_paste_lines_submit_in_order() {
        let mut h = Harness::ready(InputMode::Cooked);
        h.input("abc\ndef\n");
        assert_eq!(
            h.drain(),
            vec![
                SessionEvent::Data("abc\n".to_string()),
                SessionEvent::Data("def\n".to_string()),
            ]
        );
        assert_eq!(h.line(), (String::new(), 1));

        // One redraw is pending, not one per embedded submit
        assert_eq!(h.phase(), SessionPhase::ReadyPromptPending);
        h.take_output();
        assert!(h.tick());
        assert_eq!(h.take_output(), "> ");
        assert!(!h.tick());
        assert_eq!(h.phase(), SessionPhase::ReadyPromptShown);
    }

    #[test]
    fn test_paste_into_middle_keeps_tail() {
        let mut h = Harness::ready(InputMode::Cooked);
        h.input("12XYZ");
        h.input("\x1b[D");
        h.input("\x1b[D");
        h.input("\x1b[D");
        h.input("abcdef");
        assert_eq!(h.line(), ("12abcdefXYZ".to_string(), 9));
        assert!(h.drain().is_empty());
    }

    #[test]
    fn test_multiline_paste_carries_tail() {
        let mut h = Harness::ready(InputMode::Cooked);
        h.input("abXYZ");
        for _ in 0..3 {
            h.input("\x1b[D");
        }
        h.take_output();
        h.input("1\n2");
        assert_eq!(h.drain(), vec![SessionEvent::Data("ab1\n".to_string())]);
        assert_eq!(h.line(), ("2XYZ".to_string(), 2));
        assert_eq!(
            h.take_output(),
            "\x1b[K1\r\n> XYZ\x1b[3D\x1b[K2XYZ\x1b[3D"
        );
        assert_eq!(h.phase(), SessionPhase::ReadyPromptShown);
    }

    #[test]
    fn test_paste_ending_in_newline_keeps_tail_shown() {
        let mut h = Harness::ready(InputMode::Cooked);
        h.input("abXYZ");
        for _ in 0..3 {
            h.input("\x1b[D");
        }
        h.input("1\n");
        assert_eq!(h.drain(), vec![SessionEvent::Data("ab1\n".to_string())]);
        assert_eq!(h.line(), ("XYZ".to_string(), 1));
        assert_eq!(h.phase(), SessionPhase::ReadyPromptShown);
    }

    #[test]
    fn test_crlf_paste() {
        let mut h = Harness::ready(InputMode::Cooked);
        h.input("one\r\ntwo\r\nthree");
        assert_eq!(
            h.drain(),
            vec![
                SessionEvent::Data("one\n".to_string()),
                SessionEvent::Data("two\n".to_string()),
            ]
        );
        assert_eq!(h.line(), ("three".to_string(), 6));
        assert!(!h.session.borrow().prompt.is_suspended());
    }
}
