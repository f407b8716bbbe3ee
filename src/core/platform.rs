//! Host platform differences that affect line submission and end-of-input

/// Host operating system family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Terminator appended to a submitted line
    pub fn line_ending(self) -> &'static str {
        match self {
            Platform::Windows => "\r\n",
            Platform::Unix => "\n",
        }
    }

    /// Control letter that signals end of input (Ctrl+Z or Ctrl+D)
    pub fn eof_letter(self) -> char {
        match self {
            Platform::Windows => 'Z',
            Platform::Unix => 'D',
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
