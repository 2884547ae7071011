//! # Introduction
//!
//! jdbtrace drives `jdb`, the command-line Java debugger, through its
//! interactive REPL and turns what it prints into structured execution
//! traces: the location of every step, the arguments of every call, return
//! values, and snapshots of local variables.
//!
//! ## Pipeline
//!
//! ```text
//! Tracer → JdbSession → pty → jdb → Output parser → Value parser → TraceHistory
//! ```
//!
//! 1. [`tracer`]: compiles the program, spawns a session inside a scoped
//!    working directory, steps until the program ends and collects either a
//!    full [`tracer::ProgramTrace`] or a per-variable
//!    [`tracer::VariableHistory`].
//! 2. [`session`]: the [`session::JdbSession`] state machine that sends jdb
//!    commands and waits for the matching output, over a
//!    [`session::Channel`] backed by a pseudo-terminal.
//! 3. [`parser`]: all patterns jdb output is matched against, step event
//!    extraction, and typing of printed values.
//! 4. [`trace`]: the data model: [`trace::TypedValue`],
//!    [`trace::StepRecord`] and the bounded [`trace::TraceHistory`].
//! 5. [`config`]: [`config::TraceConfig`], defaults overridable from the
//!    environment.
//! 6. [`ui`]: ratatui-based trace viewer; not part of the stable library API.
//!
//! ## Example
//!
//! ```no_run
//! use jdbtrace::config::TraceConfig;
//! use jdbtrace::tracer::{TraceRequest, Tracer};
//!
//! let tracer = Tracer::new(TraceConfig::from_env());
//! let history = tracer.variable_history(&TraceRequest::new("IterPower").path("demos"), false)?;
//! for (name, values) in &history.variables {
//!     println!("{name}: {values:?}");
//! }
//! # Ok::<(), jdbtrace::session::SessionError>(())
//! ```

pub mod config;
pub mod parser;
pub mod session;
pub mod trace;
pub mod tracer;
pub mod ui;
