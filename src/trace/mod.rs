//! Trace data model
//!
//! - [`value`]: [`TypedValue`], the typed form of a token printed by jdb
//! - [`record`]: [`StepRecord`], the parsed [`StepEvent`] header it wraps,
//!   and the [`Frame`] returned by `locals`
//! - [`history`]: [`TraceHistory`], the capacity-bounded step buffer
//!
//! Records are immutable once appended to a history.

pub mod history;
pub mod record;
pub mod value;

pub use history::TraceHistory;
pub use record::{Frame, StepEvent, StepKind, StepRecord};
pub use value::{TypedValue, Variables};
