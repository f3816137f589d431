//! Absolute geometry for one frame.
//!
//! Walks the element arena in declaration order (parents before children)
//! turning parent-relative boxes into screen space:
//! - children of a scroll container move by its offset and are clipped to it
//! - floating panels are anchored to their parent and escape ancestor clips
//! - floating panels get pointer layers in `z_index` order

use crate::engine::{ConfigArena, ConfigKind, ElementId, ElementTree, FloatingConfig, PointerCapture, ScrollConfig};
use crate::state::{CaptureLayer, ScrollContainer, ScrollRegistry};
use crate::types::{BoundingBox, Dimensions, Vec2};

use super::NodeLayout;

/// Screen-space geometry, indexed like the element tree.
#[derive(Debug, Default, Clone)]
pub struct ResolvedLayout {
    pub bounds: Vec<BoundingBox>,
    /// Clip inherited from enclosing scroll containers.
    pub clip: Vec<Option<BoundingBox>>,
    /// Pointer layer: 0 for the main tree, `n` for the n-th floating panel.
    pub layer: Vec<u32>,
    /// Floating panel roots in paint order.
    pub floating: Vec<usize>,
    /// Scroll containers in declaration order.
    pub scroll_containers: Vec<ScrollContainer>,
    pub capture_layers: Vec<CaptureLayer>,
}

impl ResolvedLayout {
    /// Part of the element left after clipping, `None` when fully hidden.
    pub fn visible(&self, index: usize) -> Option<BoundingBox> {
        let bounds = *self.bounds.get(index)?;
        match self.clip.get(index).copied().flatten() {
            Some(clip) => bounds.intersect(&clip),
            None => Some(bounds),
        }
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

fn narrow(clip: Option<BoundingBox>, to: BoundingBox) -> Option<BoundingBox> {
    match clip {
        None => Some(to),
        Some(clip) => Some(
            clip.intersect(&to)
                .unwrap_or(BoundingBox::new(to.x, to.y, 0.0, 0.0)),
        ),
    }
}

fn anchor(parent: BoundingBox, size: Dimensions, floating: &FloatingConfig) -> Vec2 {
    let (px, py) = floating.attach.parent.factors();
    let (ex, ey) = floating.attach.element.factors();
    Vec2::new(
        parent.x + parent.width * px - size.width * ex + floating.offset.x,
        parent.y + parent.height * py - size.height * ey + floating.offset.y,
    )
}

/// Resolve absolute bounds. Scroll offsets are clamped to this frame's
/// content sizes on the way.
pub fn resolve(
    tree: &ElementTree,
    configs: &ConfigArena,
    nodes: &[NodeLayout],
    scroll: &mut ScrollRegistry,
) -> ResolvedLayout {
    let elements = tree.elements();
    let count = elements.len().min(nodes.len());

    let mut out = ResolvedLayout {
        bounds: Vec::with_capacity(count),
        clip: Vec::with_capacity(count),
        layer: vec![0; count],
        ..ResolvedLayout::default()
    };
    // Per element: offset, clip and scroll container its children inherit.
    let mut child_offset: Vec<Vec2> = Vec::with_capacity(count);
    let mut child_clip: Vec<Option<BoundingBox>> = Vec::with_capacity(count);
    let mut enclosing: Vec<Option<ElementId>> = Vec::with_capacity(count);
    let mut floating: Vec<(i16, usize)> = Vec::new();

    for (index, element) in elements.iter().enumerate().take(count) {
        let node = nodes[index];
        let size = Dimensions::new(node.width, node.height);
        let floating_config = element
            .config_slot(ConfigKind::FLOATING)
            .and_then(|slot| configs.slot::<FloatingConfig>(slot));

        let (origin, clip, parent_scroll) = match element.parent {
            None => (Vec2::new(node.x, node.y), None, None),
            Some(parent) => match floating_config {
                Some(config) => {
                    floating.push((config.z_index, index));
                    (anchor(out.bounds[parent], size, config), None, enclosing[parent])
                }
                None => {
                    let base = out.bounds[parent];
                    let offset = child_offset[parent];
                    (
                        Vec2::new(base.x + node.x - offset.x, base.y + node.y - offset.y),
                        child_clip[parent],
                        enclosing[parent],
                    )
                }
            },
        };

        let bounds = BoundingBox::new(origin.x, origin.y, size.width, size.height);
        out.bounds.push(bounds);
        out.clip.push(clip);

        let scroll_config = element
            .config_slot(ConfigKind::SCROLL)
            .and_then(|slot| configs.slot::<ScrollConfig>(slot));
        match scroll_config {
            Some(config) => {
                let offset = scroll.sync(element.id, config, size, node.content);
                let inner = narrow(clip, bounds);
                child_offset.push(offset);
                child_clip.push(inner);
                enclosing.push(Some(element.id));
                out.scroll_containers.push(ScrollContainer {
                    id: element.id,
                    config: *config,
                    viewport: inner.unwrap_or(bounds),
                    content: node.content,
                    parent: parent_scroll,
                });
            }
            None => {
                child_offset.push(Vec2::ZERO);
                child_clip.push(clip);
                enclosing.push(parent_scroll);
            }
        }
    }

    // Paint and pointer order of floating panels: z_index, then declaration.
    floating.sort_by_key(|&(z, index)| (z, index));
    for (rank, &(_, index)) in floating.iter().enumerate() {
        let layer = rank as u32 + 1;
        out.layer[index] = layer;
        let captures = elements[index]
            .config_slot(ConfigKind::FLOATING)
            .and_then(|slot| configs.slot::<FloatingConfig>(slot))
            .is_some_and(|c| c.pointer_capture == PointerCapture::Capture);
        if captures {
            out.capture_layers.push(CaptureLayer {
                layer,
                bounds: out.bounds[index],
            });
        }
    }
    out.floating = floating.into_iter().map(|(_, index)| index).collect();

    // Descendants inherit their panel's layer.
    for (index, element) in elements.iter().enumerate().take(count) {
        if element.has(ConfigKind::FLOATING) {
            continue;
        }
        if let Some(parent) = element.parent {
            out.layer[index] = out.layer[parent];
        }
    }

    out
}
