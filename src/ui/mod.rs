//! Terminal trace viewer built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! - **[`app`]**: viewer state, keyboard event loop, pane focus, source lookup
//! - **[`panes`]**: stateless render functions for the source, frame and status panes
//! - **[`theme`]**: color palette shared by all panes
//!
//! Construct an [`App`] from a [`ProgramTrace`](crate::tracer::ProgramTrace)
//! and call [`App::run`](app::App::run).

pub mod app;
pub mod panes;
pub mod theme;

pub use app::{App, SourceCache};
