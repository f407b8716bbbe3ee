//! Display transport
//!
//! The line editor only ever writes text to the transport and asks it to
//! close. Open/close notifications and input chunks flow the other way, via
//! `Session::open`, `Session::handle_close` and `Session::handle_input`.

use std::io::{self, Write};

/// Write side of a pseudo-terminal
pub trait Transport {
    /// Write display text
    fn write(&mut self, data: &str) -> io::Result<()>;

    /// Ask the host to close the terminal
    fn close(&mut self) -> io::Result<()>;
}

/// Transport over any `io::Write`, flushing after every write
pub struct WriterTransport<W: Write> {
    writer: W,
}

impl<W: Write> WriterTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }
}

impl<W: Write> Transport for WriterTransport<W> {
    fn write(&mut self, data: &str) -> io::Result<()> {
        self.writer.write_all(data.as_bytes())?;
        self.writer.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
