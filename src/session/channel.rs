//! Line-oriented channels to interactive processes
//!
//! A [`Channel`] is the primitive the session is built on: send a line, block
//! until the output matches a pattern, and report end-of-stream. Output is
//! accumulated in an [`ExpectBuffer`]; a successful match consumes everything
//! up to the end of the match and hands back the text before it and the
//! matched text itself.
//!
//! [`PtyChannel`] runs the process behind a pseudo-terminal so that jdb
//! behaves as it does for an interactive user (prompts, line buffering).
//! A background thread only forwards raw bytes; matching happens on the
//! caller's thread.

use super::errors::{SessionError, SessionResult};
use super::launch::LaunchCommand;
use portable_pty::{native_pty_system, Child, CommandBuilder, MasterPty, PtySize};
use regex::Regex;
use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Text around a successful match
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Expectation {
    /// Output received before the match
    pub before: String,
    /// The matched text
    pub after: String,
}

/// A bidirectional, prompt-driven text channel
pub trait Channel {
    /// Write `line` followed by a newline
    fn send_line(&mut self, line: &str) -> SessionResult<()>;

    /// Block until `pattern` matches buffered output.
    ///
    /// Fails with [`SessionError::HostExited`] when the stream ends first and
    /// with [`SessionError::ProtocolTimeout`] when `timeout` elapses.
    fn expect(&mut self, pattern: &Regex, timeout: Duration) -> SessionResult<Expectation>;

    /// The process closed its end of the stream
    fn is_eof(&self) -> bool;

    fn is_closed(&self) -> bool;

    /// Drop pending output and everything the process writes from now on
    fn discard_output(&mut self);

    /// Terminate the process and release the channel
    fn close(&mut self) -> SessionResult<()>;
}

/// Starts processes and connects channels to them
pub trait Launcher: Send + Sync {
    fn launch(&self, command: &LaunchCommand) -> SessionResult<Box<dyn Channel>>;
}

/// Output received but not yet consumed by a match
#[derive(Debug, Default)]
pub struct ExpectBuffer {
    pending: String,
    // Trailing bytes of an incomplete UTF-8 sequence
    partial: Vec<u8>,
}

impl ExpectBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, text: &str) {
        self.pending.push_str(text);
    }

    /// Append raw bytes, holding back a multi-byte character split across reads
    pub fn feed_bytes(&mut self, bytes: &[u8]) {
        self.partial.extend_from_slice(bytes);
        match std::str::from_utf8(&self.partial) {
            Ok(text) => {
                self.pending.push_str(text);
                self.partial.clear();
            }
            Err(e) if e.error_len().is_none() => {
                let valid = e.valid_up_to();
                let tail = self.partial.split_off(valid);
                self.pending
                    .push_str(&String::from_utf8_lossy(&self.partial));
                self.partial = tail;
            }
            Err(_) => {
                self.pending
                    .push_str(&String::from_utf8_lossy(&self.partial));
                self.partial.clear();
            }
        }
    }

    /// Consume through the first match of `pattern`, if any
    pub fn try_match(&mut self, pattern: &Regex) -> Option<Expectation> {
        let (start, end) = {
            let m = pattern.find(&self.pending)?;
            (m.start(), m.end())
        };
        let after = self.pending[start..end].to_string();
        let before = self.pending[..start].to_string();
        self.pending.drain(..end);
        Some(Expectation { before, after })
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.partial.clear();
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.partial.is_empty()
    }
}

/// A process running behind a pseudo-terminal
pub struct PtyChannel {
    command: String,
    child: Box<dyn Child + Send + Sync>,
    writer: Option<Box<dyn Write + Send>>,
    output: Receiver<Vec<u8>>,
    // Set once nobody will read the output; the reader thread keeps the pty drained
    discard: Arc<AtomicBool>,
    buffer: ExpectBuffer,
    eof: bool,
    closed: bool,
    // Keeps the pty open for the lifetime of the channel
    _master: Box<dyn MasterPty + Send>,
}

impl PtyChannel {
    pub fn spawn(command: &LaunchCommand) -> SessionResult<Self> {
        let launch_error = |message: String| SessionError::Launch {
            command: command.to_string(),
            message,
        };

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows: 24,
                cols: 200,
                pixel_width: 0,
                pixel_height: 0,
            })
            .map_err(|e| launch_error(e.to_string()))?;

        let mut builder = CommandBuilder::new(&command.program);
        builder.args(&command.args);
        let cwd = match &command.cwd {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        builder.cwd(cwd);

        let child = pair
            .slave
            .spawn_command(builder)
            .map_err(|e| launch_error(e.to_string()))?;
        // Only the child may hold the slave side, otherwise EOF never arrives
        drop(pair.slave);

        let mut reader = pair
            .master
            .try_clone_reader()
            .map_err(|e| launch_error(e.to_string()))?;
        let writer = pair
            .master
            .take_writer()
            .map_err(|e| launch_error(e.to_string()))?;

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let discard = Arc::new(AtomicBool::new(false));
        let discarding = Arc::clone(&discard);
        thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) if discarding.load(Ordering::Relaxed) => {
                        trace!(bytes = n, "discarded output");
                    }
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                    // EIO on Linux once the child side is gone
                    Err(_) => break,
                }
            }
        });

        debug!(command = %command, "spawned process on pty");

        Ok(PtyChannel {
            command: command.to_string(),
            child,
            writer: Some(writer),
            output: rx,
            discard,
            buffer: ExpectBuffer::new(),
            eof: false,
            closed: false,
            _master: pair.master,
        })
    }

    fn timeout_error(pattern: &Regex, timeout: Duration) -> SessionError {
        SessionError::ProtocolTimeout {
            pattern: pattern.as_str().to_string(),
            timeout,
        }
    }
}

impl Channel for PtyChannel {
    fn send_line(&mut self, line: &str) -> SessionResult<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            std::io::Error::new(ErrorKind::NotConnected, "channel is closed")
        })?;
        trace!(command = %self.command, line, "send");
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn expect(&mut self, pattern: &Regex, timeout: Duration) -> SessionResult<Expectation> {
        let deadline = Instant::now() + timeout;
        loop {
            // Pick up everything already delivered before matching
            while let Ok(bytes) = self.output.try_recv() {
                self.buffer.feed_bytes(&bytes);
            }
            if let Some(found) = self.buffer.try_match(pattern) {
                trace!(pattern = pattern.as_str(), matched = %found.after, "expect");
                return Ok(found);
            }
            if self.eof {
                return Err(SessionError::HostExited);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(Self::timeout_error(pattern, timeout));
            }
            match self.output.recv_timeout(remaining) {
                Ok(bytes) => self.buffer.feed_bytes(&bytes),
                Err(RecvTimeoutError::Timeout) => {
                    return Err(Self::timeout_error(pattern, timeout));
                }
                Err(RecvTimeoutError::Disconnected) => self.eof = true,
            }
        }
    }

    fn is_eof(&self) -> bool {
        self.eof
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn discard_output(&mut self) {
        self.discard.store(true, Ordering::Relaxed);
        while self.output.try_recv().is_ok() {}
        self.buffer.clear();
    }

    fn close(&mut self) -> SessionResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.writer = None;

        if self.child.try_wait()?.is_none() {
            self.child.kill()?;
        }
        self.child.wait()?;
        debug!(command = %self.command, "closed pty process");
        Ok(())
    }
}

impl Drop for PtyChannel {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Launches every command on its own pseudo-terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct PtyLauncher;

impl Launcher for PtyLauncher {
    fn launch(&self, command: &LaunchCommand) -> SessionResult<Box<dyn Channel>> {
        Ok(Box::new(PtyChannel::spawn(command)?))
    }
}
