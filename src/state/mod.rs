//! State Module - Interaction state that outlives a single frame
//!
//! - **Input** - Per-frame pointer/scroll snapshot, crossterm bridge
//! - **Interaction** - Identifier-bounds cache, hover/press queries
//! - **Scroll** - Scroll offsets, clamping, wheel chaining

pub mod input;
pub mod interaction;
pub mod scroll;

pub use input::{InputSnapshot, InputTracker, PointerData, PointerState, poll_event};
pub use interaction::{CachedBounds, CaptureLayer, Interaction, InteractionRegistry, Trigger};
pub use scroll::{ScrollContainer, ScrollRegistry};
