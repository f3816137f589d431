//! Engine - Per-frame storage behind the declaration protocol.
//!
//! - `element`: element arena and the open/close stack
//! - `config_arena` + `records`: typed configuration records by handle
//! - `text_arena`: frame-scoped copies of runtime text
//! - `id`: path-scoped identifier hashing
//!
//! # Architecture
//!
//! Nothing here survives a frame except generation counters. Elements are
//! indices into a flat arena, configuration lives in per-category vectors,
//! and both are cleared (capacity kept) when the next frame begins:
//!
//! ```text
//! Index 0: Root  (parent=-,  layout=#0 fixed window)
//! Index 1: Row   (parent=0,  layout=#1, fill=#0)
//! Index 2: Text  (parent=1,  text=#0, "Hello")
//! ```

mod config_arena;
mod element;
mod id;
mod records;
mod text_arena;

pub use config_arena::*;
pub use element::*;
pub use id::*;
pub use records::*;
pub use text_arena::*;
