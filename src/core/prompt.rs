//! Prompt display
//!
//! Tracks whether `prompt + line` is currently on screen and debounces
//! redraws so that a burst of output produces a single prompt.

use std::time::{Duration, Instant};

use tracing::trace;

use super::actions;
use super::line_buffer::LineBuffer;
use super::timer::DebounceTimer;

/// Default quiescence window before the prompt is redrawn
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Prompt display state
#[derive(Clone, Debug)]
pub struct PromptController {
    text: String,
    displayed: bool,
    /// Set while a multi-line paste is replayed
    suspended: bool,
    timer: DebounceTimer,
}

impl PromptController {
    pub fn new(text: impl Into<String>, window: Duration) -> Self {
        Self {
            text: text.into(),
            displayed: false,
            suspended: false,
            timer: DebounceTimer::new(window),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_displayed(&self) -> bool {
        self.displayed
    }

    pub fn set_displayed(&mut self, displayed: bool) {
        self.displayed = displayed;
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn resume(&mut self) {
        self.suspended = false;
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    /// Schedule a redraw, or push back the one already scheduled
    pub fn show(&mut self, now: Instant) {
        if self.displayed || self.suspended {
            return;
        }
        if self.timer.is_pending() {
            trace!("Prompt redraw rescheduled");
        } else {
            trace!("Prompt redraw scheduled");
        }
        self.timer.arm(now);
    }

    /// Render the prompt if its deadline has passed
    pub fn fire(&mut self, now: Instant, line: &mut LineBuffer) -> Option<String> {
        if !self.timer.take_due(now) {
            return None;
        }
        Some(self.render(line))
    }

    /// Render a pending prompt right away instead of waiting for the deadline
    pub fn flush(&mut self, line: &mut LineBuffer) -> Option<String> {
        if !self.timer.is_pending() {
            return None;
        }
        self.timer.cancel();
        Some(self.render(line))
    }

    fn render(&mut self, line: &mut LineBuffer) -> String {
        line.park_at_end();
        self.displayed = true;
        format!("{}{}", self.text, line.text())
    }

    /// Erase the visible prompt and line, then re-render the buffer text.
    /// The buffer itself is untouched.
    pub fn hide(&mut self, line: &LineBuffer) -> Option<String> {
        if !self.displayed {
            return None;
        }
        self.displayed = false;
        let back = self.text.chars().count() + line.cursor() - 1;
        Some(format!(
            "{}{}{}",
            actions::KILL_LINE,
            actions::cursor_back(back),
            line.text()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_show_coalesces() {
        let start = Instant::now();
        let mut prompt = PromptController::new("> ", DEFAULT_DEBOUNCE);
        let mut line = LineBuffer::new();

        prompt.show(start);
        prompt.show(start + ms(50));
        assert_eq!(prompt.fire(start + ms(100), &mut line), None);
        assert_eq!(prompt.fire(start + ms(150), &mut line), Some("> ".to_string()));
        assert!(prompt.is_displayed());
        assert_eq!(prompt.fire(start + ms(300), &mut line), None);
    }

    #[test]
    fn test_show_is_noop_when_displayed_or_suspended() {
        let start = Instant::now();
        let mut prompt = PromptController::new("> ", DEFAULT_DEBOUNCE);

        prompt.set_displayed(true);
        prompt.show(start);
        assert!(!prompt.is_pending());

        prompt.set_displayed(false);
        prompt.suspend();
        prompt.show(start);
        assert!(!prompt.is_pending());

        prompt.resume();
        prompt.show(start);
        assert!(prompt.is_pending());
    }

    #[test]
    fn test_fire_renders_line_and_parks_cursor() {
        let start = Instant::now();
        let mut prompt = PromptController::new("$ ", DEFAULT_DEBOUNCE);
        let mut line = LineBuffer::with_text("ls -l", 2);

        prompt.show(start);
        assert_eq!(
            prompt.fire(start + DEFAULT_DEBOUNCE, &mut line),
            Some("$ ls -l".to_string())
        );
        assert_eq!(line.cursor(), 6);
    }

    #[test]
    fn test_hide() {
        let mut prompt = PromptController::new("> ", DEFAULT_DEBOUNCE);
        let line = LineBuffer::with_text("abc", 3);

        assert_eq!(prompt.hide(&line), None);

        prompt.set_displayed(true);
        assert_eq!(prompt.hide(&line), Some("\x1b[2K\x1b[4Dabc".to_string()));
        assert!(!prompt.is_displayed());
        assert_eq!(line.text(), "abc");
        assert_eq!(line.cursor(), 3);
    }

    #[test]
    fn test_hide_empty_line_erases_prompt_only() {
        let mut prompt = PromptController::new("$ ", DEFAULT_DEBOUNCE);
        let line = LineBuffer::new();
        prompt.set_displayed(true);
        assert_eq!(prompt.hide(&line), Some("\x1b[2K\x1b[2D".to_string()));
    }

    #[test]
    fn test_flush_renders_pending_prompt() {
        let mut prompt = PromptController::new("> ", DEFAULT_DEBOUNCE);
        let mut line = LineBuffer::with_text("x", 1);

        assert_eq!(prompt.flush(&mut line), None);
        prompt.show(Instant::now());
        assert_eq!(prompt.flush(&mut line), Some("> x".to_string()));
        assert!(!prompt.is_pending());
        assert!(prompt.is_displayed());
    }
}
