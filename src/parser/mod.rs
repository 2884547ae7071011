//! jdb output parser
//!
//! This module turns raw REPL text into structured data:
//! - [`patterns`]: every regular expression matched against jdb output
//! - [`value`]: tokens (`42`, `'c'`, `{1, 2}`, `instance of ...`) → [`TypedValue`]
//! - [`step`]: step/method-entry/method-exit events → [`StepEvent`]
//!
//! # Robustness
//!
//! jdb's output is meant for humans, so parsing here is lenient: unknown
//! values degrade to strings and unparseable numbers are left out instead of
//! failing. Only the session decides when output is a protocol error.
//!
//! [`TypedValue`]: crate::trace::TypedValue
//! [`StepEvent`]: crate::trace::StepEvent

pub mod patterns;
pub mod step;
pub mod value;

pub use step::{parse_step_event, parse_step_output};
pub use value::{parse_value, parse_values};
