//! Session error types
//!
//! [`SessionError`] separates the three ways the jdb protocol can end a
//! command (host exit, unrecognized output, timeout) from plain launch and
//! I/O failures. Callers match on the variant; the tracer treats
//! [`SessionError::HostExited`] as the normal end of a run.

use std::time::Duration;
use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised while driving jdb
#[derive(Debug, Error)]
pub enum SessionError {
    /// End of stream: the debugger or the debuggee terminated
    #[error("debugger host exited")]
    HostExited,

    /// Output that does not fit any known protocol response
    #[error("unexpected debugger output: {output:?}")]
    HostError { output: String },

    /// Nothing matching arrived in time
    #[error("timed out after {timeout:?} waiting for {pattern:?}")]
    ProtocolTimeout { pattern: String, timeout: Duration },

    /// A process could not be started
    #[error("failed to launch `{command}`: {message}")]
    Launch { command: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SessionError {
    /// True when the error only means the program finished
    pub fn is_host_exit(&self) -> bool {
        matches!(self, SessionError::HostExited)
    }

    /// True for output the parser could not make sense of, which includes
    /// uncaught exceptions in the debuggee
    pub fn is_host_error(&self) -> bool {
        matches!(self, SessionError::HostError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = SessionError::ProtocolTimeout {
            pattern: "Breakpoint hit:".to_string(),
            timeout: Duration::from_secs(2),
        };
        assert_eq!(
            err.to_string(),
            "timed out after 2s waiting for \"Breakpoint hit:\""
        );
        assert!(SessionError::HostExited.is_host_exit());
        assert!(!SessionError::HostExited.is_host_error());
    }
}
