//! Scripted channels for driving a session without a JVM
//!
//! A [`ScriptedChannel`] replays a canned jdb transcript: each command the
//! session sends must be the next one in the script, and the canned reply is
//! then appended to the output. Matching uses the same [`ExpectBuffer`] as
//! the pty channel, so the session sees exactly the consumption semantics it
//! gets from a live jdb. An expect that cannot be satisfied from the
//! transcript fails immediately with a timeout instead of blocking.
//!
//! Only built for tests and with the `testing` feature.

use super::channel::{Channel, ExpectBuffer, Expectation, Launcher};
use super::errors::{SessionError, SessionResult};
use super::launch::LaunchCommand;
use regex::Regex;
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Commands written to a scripted channel, shared with the test that built it
pub type SentLog = Arc<Mutex<Vec<String>>>;

#[derive(Debug)]
struct Reply {
    command: String,
    output: String,
    exit: bool,
}

#[derive(Debug, Default)]
pub struct ScriptedChannel {
    buffer: ExpectBuffer,
    script: VecDeque<Reply>,
    sent: SentLog,
    eof: bool,
    closed: bool,
    discarding: bool,
    close_error: Option<String>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output available before any command is sent
    pub fn output(mut self, text: &str) -> Self {
        self.buffer.feed(text);
        self
    }

    /// Reply with `output` when `command` is sent
    pub fn on(mut self, command: &str, output: &str) -> Self {
        self.script.push_back(Reply {
            command: command.to_string(),
            output: output.to_string(),
            exit: false,
        });
        self
    }

    /// Reply with `output` and then end the stream
    pub fn on_exit(mut self, command: &str, output: &str) -> Self {
        self.script.push_back(Reply {
            command: command.to_string(),
            output: output.to_string(),
            exit: true,
        });
        self
    }

    /// Make `close` fail with `message`, as a process that cannot be killed would
    pub fn failing_close(mut self, message: &str) -> Self {
        self.close_error = Some(message.to_string());
        self
    }

    /// Log of every line sent, in order
    pub fn sent_log(&self) -> SentLog {
        Arc::clone(&self.sent)
    }

    /// Commands still expected
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Channel for ScriptedChannel {
    fn send_line(&mut self, line: &str) -> SessionResult<()> {
        if self.closed || self.eof {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "scripted process has exited").into());
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());

        let Some(reply) = self.script.pop_front() else {
            return Ok(());
        };
        if reply.command != line {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("script expected {:?}, got {:?}", reply.command, line),
            )
            .into());
        }
        if !self.discarding {
            self.buffer.feed(&reply.output);
        }
        self.eof = reply.exit;
        Ok(())
    }

    fn expect(&mut self, pattern: &Regex, timeout: Duration) -> SessionResult<Expectation> {
        if let Some(found) = self.buffer.try_match(pattern) {
            return Ok(found);
        }
        if self.eof {
            return Err(SessionError::HostExited);
        }
        Err(SessionError::ProtocolTimeout {
            pattern: pattern.as_str().to_string(),
            timeout,
        })
    }

    fn is_eof(&self) -> bool {
        self.eof
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    fn discard_output(&mut self) {
        self.discarding = true;
        self.buffer.clear();
    }

    fn close(&mut self) -> SessionResult<()> {
        self.closed = true;
        match &self.close_error {
            Some(message) => Err(io::Error::new(io::ErrorKind::Other, message.clone()).into()),
            None => Ok(()),
        }
    }
}

/// Hands out scripted channels in order and records what was launched
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    channels: Mutex<VecDeque<ScriptedChannel>>,
    launched: Mutex<Vec<LaunchCommand>>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the channel returned by the next launch
    pub fn channel(self, channel: ScriptedChannel) -> Self {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(channel);
        self
    }

    /// Every command launched so far
    pub fn launched(&self) -> Vec<LaunchCommand> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Launcher for ScriptedLauncher {
    fn launch(&self, command: &LaunchCommand) -> SessionResult<Box<dyn Channel>> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.clone());
        let channel = self
            .channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| SessionError::Launch {
                command: command.to_string(),
                message: "no scripted process left".to_string(),
            })?;
        Ok(Box::new(channel))
    }
}
