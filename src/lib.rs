//! # spark-frame
//!
//! Immediate-mode UI declaration for Rust terminals.
//!
//! ## Architecture
//!
//! Every frame the application re-declares its whole UI tree. Declarations
//! go into per-frame arenas that are reset when the next frame begins, so
//! nothing is retained except the state that must be: cached element
//! bounds (for hover and press queries) and scroll offsets.
//!
//! ```text
//! InputSnapshot → Frame (open/configure/close) → LayoutEngine → RenderOutput → Presenter
//! ```
//!
//! Element identity is a hash of a string label and an optional index,
//! scoped under a parent id. Interaction queries made while declaring are
//! answered from the previous frame's geometry.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Rgba, BoundingBox, Vec2, ...)
//! - [`engine`] - Element arena, config arena, text arena, ids
//! - [`layout`] - Layout engine boundary, Taffy bridge, text measurement
//! - [`state`] - Input snapshot, interaction registry, scroll state
//! - [`pipeline`] - Context and Frame, render commands
//! - [`renderer`] - Frame buffer and differential terminal presenter

pub mod config;
pub mod engine;
pub mod error;
pub mod layout;
pub mod pipeline;
pub mod renderer;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::ContextConfig;
pub use error::{Diagnostic, Error, ErrorHandler, Result, log_diagnostic};

pub use engine::{
    AlignX, AlignY, AttachPoint, AttachPoints, ChildAlignment, ConfigHandle, ConfigKind,
    ConfigRecord, ElementId, FillConfig, FloatingConfig, LayoutConfig, LayoutDirection,
    PointerCapture, ScrollConfig, Sizing, SizingAxis, TextRef, TextSource, TextStyle, TextWrap,
};

pub use layout::{CellMeasure, LayoutEngine, LayoutInput, MeasureError, MeasureText, NodeLayout, TaffyLayout};

pub use pipeline::{Context, ElementDecl, Frame, RenderCommand, RenderOutput};

pub use renderer::{FrameBuffer, Presenter, TerminalPresenter};

pub use state::{
    InputSnapshot, InputTracker, Interaction, PointerData, PointerState, ScrollRegistry, Trigger,
};
