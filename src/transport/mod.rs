//! Line sources. The ingestion loop only ever polls; reads never block.

mod line_reader;

pub use line_reader::LineReaderTransport;

use crate::error::{MonitorError, Result};
use std::collections::VecDeque;

pub trait Transport {
    /// Make the source ready. Fails with `TransportUnavailable` if it cannot be opened.
    fn open(&mut self) -> Result<()>;

    /// Whether a line can be read without waiting.
    fn bytes_available(&mut self) -> bool;

    /// Next buffered line, or None if nothing is waiting.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// True once no further lines can ever arrive.
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn bytes_available(&mut self) -> bool {
        (**self).bytes_available()
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        (**self).read_line()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

/// In-memory transport fed programmatically (replay, tests, benches).
#[derive(Debug)]
pub struct MemoryTransport {
    lines: VecDeque<String>,
    available: bool,
    opened: bool,
    closed: bool,
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self {
            lines: VecDeque::new(),
            available: true,
            opened: false,
            closed: false,
        }
    }

    /// A transport whose `open` always fails.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
        if !available {
            self.opened = false;
        }
    }

    /// Mark end of input; the transport reports exhausted once drained.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn pending(&self) -> usize {
        self.lines.len()
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }
}

impl<S: Into<String>> FromIterator<S> for MemoryTransport {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut t = Self::new();
        for line in iter {
            t.push_line(line);
        }
        t
    }
}

impl Transport for MemoryTransport {
    fn open(&mut self) -> Result<()> {
        if !self.available {
            return Err(MonitorError::TransportUnavailable("memory transport disabled".into()));
        }
        self.opened = true;
        Ok(())
    }

    fn bytes_available(&mut self) -> bool {
        self.opened && !self.lines.is_empty()
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        if !self.opened {
            return Err(MonitorError::TransportUnavailable("memory transport not open".into()));
        }
        Ok(self.lines.pop_front())
    }

    fn is_exhausted(&self) -> bool {
        self.closed && self.lines.is_empty()
    }
}
