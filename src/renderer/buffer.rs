//! FrameBuffer and rasterization of render commands.
//!
//! The FrameBuffer is a 2D grid of Cells that represents what should be displayed
//! on the terminal. [`FrameBuffer::rasterize`] paints a frame's command list
//! into it, honoring scissor nesting.
//!
//! # Design Decisions
//!
//! - **Flat storage**: Uses `Vec<Cell>` with row-major indexing for cache efficiency.
//! - **Clipping**: Drawing functions accept an optional `ClipRect`.
//! - **Alpha blending**: Transparent backgrounds blend with existing cells.
//! - **Wide characters**: The cell after a double-width glyph holds `'\0'`.

use unicode_width::UnicodeWidthChar;

use crate::pipeline::{RenderCommand, RenderOutput};
use crate::types::{Cell, ClipRect, Rgba};

/// Marks the second cell of a double-width glyph.
pub const CONTINUATION: char = '\0';

/// A 2D buffer of terminal cells.
///
/// Uses flat storage with row-major indexing: `index = y * width + x`
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    /// Create a new buffer filled with default cells.
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_background(width, height, Rgba::TERMINAL_DEFAULT)
    }

    /// Create a new buffer with a specific background color.
    pub fn with_background(width: u16, height: u16, bg: Rgba) -> Self {
        let size = width as usize * height as usize;
        let cell = Cell {
            bg,
            ..Cell::default()
        };
        Self {
            width,
            height,
            cells: vec![cell; size],
        }
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The full buffer as a ClipRect.
    #[inline]
    pub fn bounds(&self) -> ClipRect {
        ClipRect::new(0, 0, self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            self.cells.get(self.index(x, y))
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.cells.get_mut(idx)
        } else {
            None
        }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row `y` as a string, continuation cells skipped.
    pub fn row_text(&self, y: u16) -> String {
        (0..self.width)
            .filter_map(|x| self.get(x, y))
            .map(|cell| cell.ch)
            .filter(|&ch| ch != CONTINUATION)
            .collect()
    }

    // =========================================================================
    // Drawing Primitives
    // =========================================================================

    /// Set a single cell with optional clipping.
    ///
    /// Returns true if the cell was set.
    pub fn set_cell(&mut self, x: u16, y: u16, ch: char, fg: Rgba, bg: Rgba, clip: Option<&ClipRect>) -> bool {
        if clip.is_some_and(|clip| !clip.contains(x, y)) {
            return false;
        }
        let Some(cell) = self.get_mut(x, y) else {
            return false;
        };
        cell.ch = ch;
        cell.fg = fg;
        cell.bg = Rgba::blend(bg, cell.bg);
        true
    }

    /// Fill a rectangle with a background color.
    pub fn fill_rect(&mut self, rect: ClipRect, bg: Rgba, clip: Option<&ClipRect>) {
        let area = match clip {
            Some(clip) => rect.intersect(clip),
            None => Some(rect),
        };
        let Some(area) = area.and_then(|area| area.intersect(&self.bounds())) else {
            return;
        };

        for row in area.y..area.y + area.height {
            let start = self.index(area.x, row);
            let end = start + area.width as usize;
            for cell in &mut self.cells[start..end] {
                cell.bg = Rgba::blend(bg, cell.bg);
                cell.ch = ' ';
            }
        }
    }

    /// Draw text starting at column `x` (which may be left of the buffer).
    ///
    /// Returns the number of columns advanced.
    pub fn draw_text(&mut self, x: i32, y: u16, text: &str, fg: Rgba, clip: Option<&ClipRect>) -> u16 {
        let mut col = x;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as i32;
            if width == 0 {
                continue;
            }
            if col >= self.width as i32 {
                break;
            }
            if col >= 0 && self.set_cell(col as u16, y, ch, fg, Rgba::TRANSPARENT, clip) && width == 2 {
                let next = col as u16 + 1;
                if clip.is_none_or(|c| c.contains(next, y)) {
                    if let Some(cell) = self.get_mut(next, y) {
                        cell.ch = CONTINUATION;
                        cell.fg = fg;
                    }
                }
            }
            col += width;
        }
        (col - x).max(0) as u16
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Paint a frame's commands in order.
    ///
    /// Scissor regions nest: each one is intersected with the enclosing
    /// region, and an unmatched end is ignored.
    pub fn rasterize(&mut self, output: &RenderOutput<'_>) {
        let mut scissors: Vec<ClipRect> = Vec::new();
        for command in output.iter() {
            let clip = scissors.last().copied();
            match command {
                RenderCommand::Rectangle { bounds, color, .. } => {
                    self.fill_rect(bounds.to_clip_rect(), *color, clip.as_ref());
                }
                RenderCommand::Text {
                    bounds, text, style, ..
                } => {
                    let y = bounds.y.round();
                    if y < 0.0 || y >= self.height as f32 {
                        continue;
                    }
                    self.draw_text(bounds.x.round() as i32, y as u16, text, style.color, clip.as_ref());
                }
                RenderCommand::ScissorStart { bounds, .. } => {
                    let rect = bounds.to_clip_rect();
                    let next = match clip {
                        Some(outer) => outer.intersect(&rect).unwrap_or_default(),
                        None => rect,
                    };
                    scissors.push(next);
                }
                RenderCommand::ScissorEnd { .. } => {
                    scissors.pop();
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
