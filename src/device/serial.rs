//! Device serial log reader
//!
//! The pedal prints diagnostics on its USB CDC serial port. A background
//! thread reads newline-delimited text and queues it; the event loop is the
//! only consumer and drains the queue with [`SerialReader::poll_line`], which
//! never blocks.
//!
//! The port is opened in raw mode (no echo, no line discipline) with a read
//! timeout, so the reader thread notices a stop request within one timeout.

use crate::core::config::SerialConfig;
use crate::core::error::{PedalError, Result};
use std::io::{self, BufRead, BufReader, ErrorKind, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Background line reader for the device log
pub struct SerialReader {
    name: String,
    rx: mpsc::UnboundedReceiver<String>,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl SerialReader {
    /// Open the configured serial port and start reading
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(config.port.as_str(), config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms.max(1)))
            .open()
            .map_err(|e| PedalError::io(&config.port, io::Error::from(e)))?;
        info!("Reading device log from {} at {} baud", config.port, config.baud_rate);
        Ok(Self::from_reader(config.port.clone(), port))
    }

    /// Start reading lines from any byte stream.
    ///
    /// Reads must be bounded (return `TimedOut`/`WouldBlock` when idle) for
    /// [`stop`](Self::stop) to return promptly.
    pub fn from_reader<R>(name: impl Into<String>, reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        let name = name.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));

        let thread_running = Arc::clone(&running);
        let thread = thread::spawn(move || read_loop(reader, tx, thread_running));

        Self {
            name,
            rx,
            running,
            thread: Some(thread),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Next queued line, or `None` when nothing has arrived
    pub fn poll_line(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Whether the reader thread is still reading
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the reader thread and wait for it. Lines already queued stay
    /// readable.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("Serial reader thread for {} panicked", self.name);
            }
        }
        debug!("Serial reader for {} stopped", self.name);
    }
}

impl Drop for SerialReader {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_loop<R: Read>(reader: R, tx: mpsc::UnboundedSender<String>, running: Arc<AtomicBool>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    while running.load(Ordering::Acquire) {
        // A timed-out read keeps the partial line in `buf` for the next pass
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                let tail = String::from_utf8_lossy(&buf).trim().to_string();
                if !tail.is_empty() {
                    let _ = tx.send(tail);
                }
                debug!("Serial stream closed");
                break;
            }
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf).trim().to_string();
                buf.clear();
                if !line.is_empty() && tx.send(line).is_err() {
                    break;
                }
            }
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::Interrupted | ErrorKind::TimedOut | ErrorKind::WouldBlock
                ) =>
            {
                continue
            }
            Err(e) => {
                warn!("Serial read failed: {}", e);
                let _ = tx.send(format!("[Serial error: {}]", e));
                break;
            }
        }
    }

    running.store(false, Ordering::Release);
}
