//! Layout Module
//!
//! Turns a declared element tree into screen-space geometry.
//!
//! # Architecture
//!
//! Solving is delegated to a [`LayoutEngine`]. The bundled engine uses
//! [Taffy](https://github.com/DioxusLabs/taffy) for flexbox computation:
//!
//! 1. Converts layout records → Taffy styles
//! 2. Builds a Taffy tree from the element tree's child lists
//! 3. Measures text through the [`MeasureText`] callback
//! 4. Reports parent-relative boxes per element
//!
//! The engine result is then made absolute by [`resolve`]: scroll offsets
//! are applied, floating panels are anchored and clip rectangles assigned.

mod resolve;
mod taffy_bridge;
mod text_measure;

pub use resolve::{ResolvedLayout, resolve};
pub use taffy_bridge::TaffyLayout;
pub use text_measure::{
    CellMeasure, MeasureError, MeasureText, TextLine, lines_size, string_width, wrap_lines,
};

use crate::engine::{ConfigArena, ElementTree, TextArena};
use crate::error::{Error, Result};
use crate::types::Dimensions;

/// Solved box of one element, relative to its parent's origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NodeLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Size of the laid-out children, for scroll limits.
    pub content: Dimensions,
}

/// Everything a layout engine may read for one frame.
pub struct LayoutInput<'a> {
    pub tree: &'a ElementTree,
    pub configs: &'a ConfigArena,
    pub text: &'a TextArena,
    pub measure: &'a dyn MeasureText,
    pub viewport: Dimensions,
}

/// External solver from declared tree to element boxes.
pub trait LayoutEngine {
    /// One [`NodeLayout`] per element, indexed like the tree.
    ///
    /// Measurement failures go to `diagnostics` and the text is laid out
    /// as empty; an `Err` means no geometry could be produced at all.
    fn compute(&mut self, input: &LayoutInput<'_>, diagnostics: &mut Vec<Error>) -> Result<Vec<NodeLayout>>;
}
