//! # Output sinks.
//!
//! Where the output facility writes: the process stdout, or an in-memory
//! [`Capture`] that tests (and embedding programs) can inspect afterwards.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination of unit output.
#[derive(Debug, Default)]
pub enum Sink {
    /// Process stdout, flushed after every write.
    #[default]
    Stdout,
    /// In-memory buffer.
    Capture(Capture),
}

impl Sink {
    /// Creates a capture sink and returns it with a handle to read it back.
    pub fn capture() -> (Self, Capture) {
        let capture = Capture::default();
        (Sink::Capture(capture.clone()), capture)
    }

    pub(crate) fn write_str(&mut self, text: &str) -> io::Result<()> {
        match self {
            Sink::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(text.as_bytes())?;
                out.flush()
            }
            Sink::Capture(capture) => {
                capture.push(text);
                Ok(())
            }
        }
    }
}

/// Shared in-memory text buffer.
#[derive(Clone, Debug, Default)]
pub struct Capture {
    buf: Arc<Mutex<String>>,
}

impl Capture {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Everything written so far, split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    fn push(&self, text: &str) {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(text);
    }
}
