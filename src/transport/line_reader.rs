//! Device or stdin line source. A background thread does the blocking reads and hands
//! decoded lines over a bounded channel; the tick side only ever calls `try_recv`.
//!
//! The channel holds at most `buffer_lines` lines. When the tick falls behind, the reader
//! thread blocks in `blocking_send` and the device itself buffers (or the writer stalls).

use super::Transport;
use crate::config::DEFAULT_TRANSPORT_BUFFER_LINES;
use crate::error::{MonitorError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use tokio::sync::mpsc::{self, error::TryRecvError, Receiver, Sender};
use tracing::{debug, warn};

/// Device path meaning standard input.
pub const STDIN_DEVICE: &str = "-";

pub struct LineReaderTransport {
    device: String,
    buffer_lines: usize,
    rx: Option<Receiver<String>>,
    pending: Option<String>,
    closed: bool,
}

impl LineReaderTransport {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            buffer_lines: DEFAULT_TRANSPORT_BUFFER_LINES,
            rx: None,
            pending: None,
            closed: false,
        }
    }

    /// Bound on lines read ahead of the tick (at least 1).
    pub fn with_buffer_lines(mut self, lines: usize) -> Self {
        self.buffer_lines = lines.max(1);
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn buffer_lines(&self) -> usize {
        self.buffer_lines
    }

    /// Lines read from the device but not yet handed to a tick.
    pub fn buffered(&self) -> usize {
        let queued = self.rx.as_ref().map_or(0, |rx| rx.len());
        queued + usize::from(self.pending.is_some())
    }

    /// True once the source hit end of input and every line was consumed.
    pub fn is_closed(&self) -> bool {
        self.closed && self.pending.is_none()
    }

    fn spawn_reader<R: Read + Send + 'static>(source: R, label: String, tx: Sender<String>) -> Result<()> {
        std::thread::Builder::new()
            .name("line-reader".into())
            .spawn(move || read_lines(BufReader::new(source), &label, tx))?;
        Ok(())
    }

    fn poll(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let Some(rx) = self.rx.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(line) => self.pending = Some(line),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                if !self.closed {
                    warn!(device = %self.device, "transport reached end of input");
                    self.closed = true;
                }
            }
        }
    }
}

fn read_lines<R: BufRead>(mut reader: R, label: &str, tx: Sender<String>) {
    let mut buf = Vec::new();
    let mut sent = 0u64;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim().to_string();
                // blocks while the channel is full; errs once the transport drops the receiver
                if tx.blocking_send(line).is_err() {
                    break;
                }
                sent += 1;
            }
            Err(e) => {
                warn!(device = %label, error = %e, "transport read failed");
                break;
            }
        }
    }
    debug!(device = %label, lines = sent, "line reader finished");
}

impl Transport for LineReaderTransport {
    fn open(&mut self) -> Result<()> {
        if self.rx.is_some() && !self.closed {
            return Ok(());
        }
        let (tx, rx) = mpsc::channel(self.buffer_lines);
        if self.device == STDIN_DEVICE {
            Self::spawn_reader(std::io::stdin(), self.device.clone(), tx)?;
        } else {
            let path = PathBuf::from(&self.device);
            let file = File::open(&path).map_err(|e| {
                MonitorError::TransportUnavailable(format!("{}: {e}", path.display()))
            })?;
            Self::spawn_reader(file, self.device.clone(), tx)?;
        }
        self.rx = Some(rx);
        self.pending = None;
        self.closed = false;
        Ok(())
    }

    fn bytes_available(&mut self) -> bool {
        self.poll();
        self.pending.is_some()
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        if self.rx.is_none() {
            return Err(MonitorError::TransportUnavailable(format!("{} not open", self.device)));
        }
        self.poll();
        Ok(self.pending.take())
    }

    fn is_exhausted(&self) -> bool {
        self.is_closed()
    }
}
