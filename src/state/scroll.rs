//! Scroll State Module
//!
//! Manages scrolling behavior:
//! - Per-id scroll offset, persisted across frames
//! - Scroll limits from the frame's layout (viewport vs content size)
//! - Scroll operations with clamping
//! - Parent chaining for the mouse wheel
//!
//! Offsets are positive: `y = 3` means the content moved three rows up.
//! A container that is not declared in a frame loses its offset.

use std::collections::HashMap;

use crate::engine::{ElementId, ScrollConfig};
use crate::types::{BoundingBox, Dimensions, Vec2};

// =============================================================================
// SCROLL CONSTANTS
// =============================================================================

/// Rows per line step.
pub const LINE_SCROLL: f32 = 1.0;

/// Fraction of the viewport moved per page step.
pub const PAGE_SCROLL_FACTOR: f32 = 0.9;

// =============================================================================
// SCROLL CONTAINERS
// =============================================================================

/// A scroll container as resolved in the last frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollContainer {
    pub id: ElementId,
    pub config: ScrollConfig,
    /// Visible area on screen.
    pub viewport: BoundingBox,
    pub content: Dimensions,
    /// Nearest enclosing scroll container.
    pub parent: Option<ElementId>,
}

impl ScrollContainer {
    /// Maximum offsets; zero on axes that do not scroll.
    pub fn max_scroll(&self) -> Vec2 {
        max_scroll(&self.config, self.viewport_size(), self.content)
    }

    fn viewport_size(&self) -> Dimensions {
        Dimensions::new(self.viewport.width, self.viewport.height)
    }
}

fn max_scroll(config: &ScrollConfig, viewport: Dimensions, content: Dimensions) -> Vec2 {
    Vec2::new(
        if config.horizontal {
            (content.width - viewport.width).max(0.0)
        } else {
            0.0
        },
        if config.vertical {
            (content.height - viewport.height).max(0.0)
        } else {
            0.0
        },
    )
}

fn clamp(offset: Vec2, max: Vec2) -> Vec2 {
    Vec2::new(offset.x.clamp(0.0, max.x), offset.y.clamp(0.0, max.y))
}

// =============================================================================
// SCROLL REGISTRY
// =============================================================================

#[derive(Debug, Default)]
pub struct ScrollRegistry {
    /// Last frame's containers in declaration order (ancestors first).
    containers: Vec<ScrollContainer>,
    offsets: HashMap<ElementId, Vec2>,
}

impl ScrollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scroll offset for a container.
    pub fn offset(&self, id: ElementId) -> Vec2 {
        self.offsets.get(&id).copied().unwrap_or(Vec2::ZERO)
    }

    pub fn container(&self, id: ElementId) -> Option<&ScrollContainer> {
        self.containers.iter().find(|c| c.id == id)
    }

    pub fn containers(&self) -> &[ScrollContainer] {
        &self.containers
    }

    // -------------------------------------------------------------------------
    // Scroll operations
    // -------------------------------------------------------------------------

    /// Set scroll offset (clamped to valid range).
    ///
    /// Does nothing for ids that were not a scroll container last frame.
    pub fn set_scroll_offset(&mut self, id: ElementId, x: f32, y: f32) {
        let Some(container) = self.container(id) else {
            return;
        };
        let clamped = clamp(Vec2::new(x, y), container.max_scroll());
        self.offsets.insert(id, clamped);
    }

    /// Scroll by a delta amount.
    ///
    /// Returns `true` if scrolling occurred, `false` if already at boundary.
    pub fn scroll_by(&mut self, id: ElementId, delta_x: f32, delta_y: f32) -> bool {
        let Some(container) = self.container(id) else {
            return false;
        };
        let current = self.offset(id);
        let next = clamp(
            Vec2::new(current.x + delta_x, current.y + delta_y),
            container.max_scroll(),
        );
        if next == current {
            return false;
        }
        self.offsets.insert(id, next);
        true
    }

    /// Scroll, handing the delta to enclosing containers while the target
    /// is at its boundary. Returns `true` if any container moved.
    pub fn scroll_by_with_chaining(&mut self, id: ElementId, delta_x: f32, delta_y: f32) -> bool {
        let mut target = Some(id);
        while let Some(current) = target {
            if self.scroll_by(current, delta_x, delta_y) {
                return true;
            }
            target = self.container(current).and_then(|c| c.parent);
        }
        false
    }

    /// Scroll vertically by `lines` rows.
    pub fn scroll_lines(&mut self, id: ElementId, lines: f32) -> bool {
        self.scroll_by(id, 0.0, lines * LINE_SCROLL)
    }

    /// Scroll vertically by `pages` viewports, keeping a little overlap.
    pub fn scroll_pages(&mut self, id: ElementId, pages: f32) -> bool {
        let Some(container) = self.container(id) else {
            return false;
        };
        let step = (container.viewport.height * PAGE_SCROLL_FACTOR).max(LINE_SCROLL);
        self.scroll_by(id, 0.0, step * pages)
    }

    pub fn scroll_to_top(&mut self, id: ElementId) {
        let current = self.offset(id);
        self.set_scroll_offset(id, current.x, 0.0);
    }

    pub fn scroll_to_bottom(&mut self, id: ElementId) {
        let current = self.offset(id);
        let max = self.container(id).map(|c| c.max_scroll()).unwrap_or(Vec2::ZERO);
        self.set_scroll_offset(id, current.x, max.y);
    }

    // -------------------------------------------------------------------------
    // Wheel
    // -------------------------------------------------------------------------

    /// Deepest container under the pointer, by last frame's geometry.
    pub fn container_at(&self, point: Vec2) -> Option<ElementId> {
        self.containers
            .iter()
            .rev()
            .find(|c| c.viewport.contains(point))
            .map(|c| c.id)
    }

    /// Apply a wheel delta (notches, positive = up/left) at the pointer.
    ///
    /// Returns the container that received the delta, if any moved.
    pub fn apply_wheel(&mut self, pointer: Vec2, delta: Vec2, lines: f32) -> Option<ElementId> {
        if delta == Vec2::ZERO {
            return None;
        }
        let target = self.container_at(pointer)?;
        if self.scroll_by_with_chaining(target, -delta.x * lines, -delta.y * lines) {
            Some(target)
        } else {
            None
        }
    }

    // -------------------------------------------------------------------------
    // Frame bookkeeping
    // -------------------------------------------------------------------------

    /// Clamp a container's offset to this frame's sizes and return the
    /// offset to lay its children out with.
    pub fn sync(
        &mut self,
        id: ElementId,
        config: &ScrollConfig,
        viewport: Dimensions,
        content: Dimensions,
    ) -> Vec2 {
        let Some(offset) = self.offsets.get_mut(&id) else {
            return Vec2::ZERO;
        };
        *offset = clamp(*offset, max_scroll(config, viewport, content));
        *offset
    }

    /// Replace last frame's containers. Offsets of containers missing from
    /// `containers` are dropped.
    pub fn commit(&mut self, containers: Vec<ScrollContainer>) {
        self.offsets
            .retain(|id, _| containers.iter().any(|c| c.id == *id));
        self.containers = containers;
    }
}

// =============================================================================
// TESTS
// =============================================================================
