//! Session controller for the jdb REPL
//!
//! ```text
//!   JdbSession ──send_line──► Channel (pty) ──► jdb ──► JVM
//!        ▲                       │
//!        └── parser ◄── expect ◄─┘
//! ```
//!
//! Every protocol operation is a blocking send/expect sequence bounded by
//! the configured timeout. The [`Channel`] and [`Launcher`] traits separate
//! the protocol from process handling: [`PtyLauncher`] runs real processes,
//! `ScriptedLauncher` replays transcripts (`testing` feature).

pub mod channel;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod launch;
#[cfg(any(test, feature = "testing"))]
pub mod script;

pub use channel::{Channel, Expectation, Launcher, PtyChannel, PtyLauncher};
pub use engine::{JdbSession, StepModifier};
pub use errors::{SessionError, SessionResult};
pub use launch::{jdb_version, ClassPath, LaunchCommand};
#[cfg(any(test, feature = "testing"))]
pub use script::{ScriptedChannel, ScriptedLauncher};
