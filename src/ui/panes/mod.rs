//! TUI pane rendering modules
//!
//! - [`source`]: Java source with the current line highlighted
//! - [`frame`]: location, call arguments, locals and return value of a step
//! - [`status`]: position in the trace and keybindings
//!
//! Each module exports a stateless `render_*` function; scroll state is owned
//! by the [`App`](crate::ui::App).

pub mod frame;
pub mod source;
pub mod status;

pub use frame::render_frame_pane;
pub use source::{render_source_pane, SourceRenderData, SourceScrollState};
pub use status::{render_status_bar, StatusRenderData};
