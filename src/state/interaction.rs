//! Interaction Registry - Hover and press queries against cached bounds
//!
//! Geometry of frame N is only known after frame N is declared, so queries
//! made while declaring frame N+1 answer against frame N's bounds and frame
//! N+1's pointer. The cache is keyed by [`ElementId`] and overwritten every
//! time an id is resolved again.
//!
//! Floating panels that capture the pointer form layers: an entry is not
//! hovered while a higher capturing layer covers the pointer.

use std::collections::HashMap;

use crate::engine::ElementId;
use crate::types::{BoundingBox, Vec2};

use super::input::{InputSnapshot, PointerData, PointerState};

// =============================================================================
// TYPES
// =============================================================================

/// When an interaction callback fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every frame the pointer is over the element.
    Hover,
    /// The button went down this frame while over the element.
    Press,
    /// The button went up this frame while over the element.
    Release,
}

impl Trigger {
    pub fn matches(self, state: PointerState) -> bool {
        match self {
            Trigger::Hover => true,
            Trigger::Press => state == PointerState::PressedThisFrame,
            Trigger::Release => state == PointerState::ReleasedThisFrame,
        }
    }
}

/// Passed to interaction callbacks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interaction {
    pub id: ElementId,
    pub pointer: PointerData,
    /// Visible bounds the pointer hit.
    pub bounds: BoundingBox,
}

/// Resolved bounds of one identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedBounds {
    /// Bounds after clipping by scroll containers.
    pub bounds: BoundingBox,
    /// Pointer layer: 0 for the main tree, higher for floating panels.
    pub layer: u32,
    /// Frame the bounds were resolved in.
    pub frame: u64,
}

/// Area of a pointer-capturing floating panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureLayer {
    pub layer: u32,
    pub bounds: BoundingBox,
}

// =============================================================================
// REGISTRY
// =============================================================================

#[derive(Debug)]
pub struct InteractionRegistry {
    bounds: HashMap<ElementId, CachedBounds>,
    layers: Vec<CaptureLayer>,
    pointer: PointerData,
    was_down: bool,
    frame: u64,
    retention: u64,
}

impl InteractionRegistry {
    pub fn new(retention: u64) -> Self {
        Self {
            bounds: HashMap::new(),
            layers: Vec::new(),
            pointer: PointerData::default(),
            was_down: false,
            frame: 0,
            retention,
        }
    }

    /// Adopt the frame's snapshot and derive the pointer transition.
    pub fn begin_frame(&mut self, snapshot: &InputSnapshot, frame: u64) -> PointerData {
        self.frame = frame;
        self.pointer = PointerData {
            position: snapshot.pointer(),
            state: PointerState::from_transition(self.was_down, snapshot.pointer_down()),
        };
        self.was_down = snapshot.pointer_down();
        self.pointer
    }

    pub fn pointer(&self) -> PointerData {
        self.pointer
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    // -------------------------------------------------------------------------
    // Queries (previous frame's geometry)
    // -------------------------------------------------------------------------

    /// Pointer is inside the bounds `id` had last frame.
    pub fn is_hovered(&self, id: ElementId) -> bool {
        self.hit(id, self.frame.wrapping_sub(1)).is_some()
    }

    /// Hovered, and the button went down this frame.
    pub fn is_pressed(&self, id: ElementId) -> bool {
        self.pointer.state == PointerState::PressedThisFrame && self.is_hovered(id)
    }

    /// Hovered, and the button went up this frame.
    pub fn is_released(&self, id: ElementId) -> bool {
        self.pointer.state == PointerState::ReleasedThisFrame && self.is_hovered(id)
    }

    /// Hovered while the button is held.
    pub fn is_down(&self, id: ElementId) -> bool {
        self.pointer.state.is_down() && self.is_hovered(id)
    }

    /// Every id hovered against last frame's geometry, unordered.
    pub fn pointer_over_ids(&self) -> Vec<ElementId> {
        let last = self.frame.wrapping_sub(1);
        self.bounds
            .keys()
            .copied()
            .filter(|id| self.hit(*id, last).is_some())
            .collect()
    }

    /// Bounds cached for `id`, whichever frame they came from.
    pub fn cached(&self, id: ElementId) -> Option<&CachedBounds> {
        self.bounds.get(&id)
    }

    /// Hit test against bounds resolved in the current frame. Used when
    /// dispatching callbacks after the frame's layout.
    pub fn hit_current(&self, id: ElementId) -> Option<BoundingBox> {
        self.hit(id, self.frame)
    }

    fn hit(&self, id: ElementId, frame: u64) -> Option<BoundingBox> {
        let entry = self.bounds.get(&id)?;
        let point = self.pointer.position;
        if entry.frame != frame || !entry.bounds.contains(point) || self.occluded(entry.layer, point) {
            return None;
        }
        Some(entry.bounds)
    }

    fn occluded(&self, layer: u32, point: Vec2) -> bool {
        self.layers
            .iter()
            .any(|l| l.layer > layer && l.bounds.contains(point))
    }

    // -------------------------------------------------------------------------
    // Updates (after layout)
    // -------------------------------------------------------------------------

    /// Store resolved bounds for `id` in the current frame.
    pub fn record(&mut self, id: ElementId, bounds: BoundingBox, layer: u32) {
        self.bounds.insert(
            id,
            CachedBounds {
                bounds,
                layer,
                frame: self.frame,
            },
        );
    }

    /// Replace the capturing layers with the current frame's.
    pub fn set_capture_layers(&mut self, layers: Vec<CaptureLayer>) {
        self.layers = layers;
    }

    /// Drop ids not resolved within the retention window.
    pub fn evict(&mut self) -> usize {
        let before = self.bounds.len();
        let frame = self.frame;
        let retention = self.retention;
        self.bounds
            .retain(|_, entry| frame.saturating_sub(entry.frame) <= retention);
        before - self.bounds.len()
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dimensions;

    fn snapshot(x: f32, y: f32, down: bool) -> InputSnapshot {
        InputSnapshot::capture(Dimensions::new(80.0, 24.0), Vec2::new(x, y), down, Vec2::ZERO, 0.0)
    }

    /// Registry that resolved `id` at `bounds` in frame 1 and is now in frame 2.
    fn setup(id: ElementId, bounds: BoundingBox, pointer: InputSnapshot) -> InteractionRegistry {
        let mut registry = InteractionRegistry::new(60);
        registry.begin_frame(&snapshot(0.0, 0.0, false), 1);
        registry.record(id, bounds, 0);
        registry.begin_frame(&pointer, 2);
        registry
    }

    #[test]
    fn test_hover_uses_previous_frame_bounds() {
        let id = ElementId::new("Button");
        let registry = setup(id, BoundingBox::new(10.0, 2.0, 6.0, 1.0), snapshot(12.0, 2.0, false));
        assert!(registry.is_hovered(id));
        assert!(!registry.is_pressed(id));
    }

    #[test]
    fn test_pointer_outside_is_not_hovered() {
        let id = ElementId::new("Button");
        let registry = setup(id, BoundingBox::new(10.0, 2.0, 6.0, 1.0), snapshot(30.0, 2.0, false));
        assert!(!registry.is_hovered(id));
    }

    #[test]
    fn test_unknown_id_is_not_hovered() {
        let registry = setup(
            ElementId::new("Known"),
            BoundingBox::new(0.0, 0.0, 80.0, 24.0),
            snapshot(1.0, 1.0, false),
        );
        assert!(!registry.is_hovered(ElementId::new("Unknown")));
    }

    #[test]
    fn test_press_only_on_transition_frame() {
        let id = ElementId::new("Button");
        let bounds = BoundingBox::new(0.0, 0.0, 10.0, 1.0);
        let mut registry = setup(id, bounds, snapshot(1.0, 0.0, true));
        assert!(registry.is_pressed(id));
        assert!(registry.is_down(id));

        registry.record(id, bounds, 0);
        registry.begin_frame(&snapshot(1.0, 0.0, true), 3);
        assert!(!registry.is_pressed(id));
        assert!(registry.is_down(id));

        registry.record(id, bounds, 0);
        registry.begin_frame(&snapshot(1.0, 0.0, false), 4);
        assert!(registry.is_released(id));
    }

    #[test]
    fn test_bounds_older_than_one_frame_do_not_match() {
        let id = ElementId::new("Gone");
        let mut registry = setup(id, BoundingBox::new(0.0, 0.0, 10.0, 10.0), snapshot(1.0, 1.0, false));
        // Not redeclared in frame 2.
        registry.begin_frame(&snapshot(1.0, 1.0, false), 3);
        assert!(!registry.is_hovered(id));
        assert!(registry.cached(id).is_some());
    }

    #[test]
    fn test_redeclare_overwrites_bounds() {
        let id = ElementId::new("Moving");
        let mut registry = setup(id, BoundingBox::new(0.0, 0.0, 5.0, 1.0), snapshot(20.0, 0.0, false));
        registry.record(id, BoundingBox::new(18.0, 0.0, 5.0, 1.0), 0);
        registry.begin_frame(&snapshot(20.0, 0.0, false), 3);
        assert!(registry.is_hovered(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_capture_layer_occludes_lower_layers() {
        let below = ElementId::new("Below");
        let menu = ElementId::new("Menu");
        let mut registry = InteractionRegistry::new(60);
        registry.begin_frame(&snapshot(0.0, 0.0, false), 1);
        registry.record(below, BoundingBox::new(0.0, 0.0, 20.0, 10.0), 0);
        registry.record(menu, BoundingBox::new(5.0, 2.0, 10.0, 4.0), 1);
        registry.set_capture_layers(vec![CaptureLayer {
            layer: 1,
            bounds: BoundingBox::new(5.0, 2.0, 10.0, 4.0),
        }]);

        registry.begin_frame(&snapshot(6.0, 3.0, false), 2);
        assert!(registry.is_hovered(menu));
        assert!(!registry.is_hovered(below));
        assert_eq!(registry.pointer_over_ids(), vec![menu]);

        registry.begin_frame(&snapshot(1.0, 1.0, false), 2);
        assert!(registry.is_hovered(below));
    }

    #[test]
    fn test_eviction_after_retention() {
        let id = ElementId::new("Old");
        let mut registry = InteractionRegistry::new(2);
        registry.begin_frame(&snapshot(0.0, 0.0, false), 1);
        registry.record(id, BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0);

        registry.begin_frame(&snapshot(0.0, 0.0, false), 3);
        assert_eq!(registry.evict(), 0);
        registry.begin_frame(&snapshot(0.0, 0.0, false), 4);
        assert_eq!(registry.evict(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_trigger_matching() {
        assert!(Trigger::Hover.matches(PointerState::Released));
        assert!(Trigger::Press.matches(PointerState::PressedThisFrame));
        assert!(!Trigger::Press.matches(PointerState::Pressed));
        assert!(Trigger::Release.matches(PointerState::ReleasedThisFrame));
    }
}
