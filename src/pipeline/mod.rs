//! Frame Pipeline
//!
//! Connects declaration to presentation for one frame.
//!
//! ```text
//! InputSnapshot → begin_frame → declare (Frame) → end → RenderOutput → Presenter
//! ```
//!
//! ## Data Flow
//!
//! 1. **begin_frame** - Resets the arenas, derives pointer state, applies wheel scroll
//! 2. **declare** - Elements open and close on the [`Frame`], configs and text are copied in
//! 3. **end** - Layout is solved, bounds are cached for the next frame's
//!    hover queries, callbacks fire and render commands are built

mod commands;
mod context;

pub use commands::{RenderCommand, RenderOutput};
pub use context::{Context, ElementDecl, Frame};
