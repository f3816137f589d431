//! Taffy Bridge - Integration with Taffy layout engine
//!
//! Converts layout records to Taffy styles, runs layout computation with
//! text measurement, and extracts parent-relative boxes.
//!
//! Sizing maps onto flexbox as follows:
//! - `Fixed` → definite size, no shrinking
//! - `Percent` → percentage of the parent
//! - `Fit` → auto size bounded by min/max
//! - `Grow` → `flex_grow` on the parent's main axis, `align_self: stretch`
//!   on its cross axis
//!
//! Floating elements are absolutely positioned and anchored afterwards by
//! the resolve pass. Scroll containers get `overflow: scroll` on their
//! scrolling axes so Taffy reports their content size.

use std::collections::HashSet;

use taffy::{
    AlignItems as TaffyAlignItems, AlignSelf as TaffyAlignSelf, AvailableSpace,
    Dimension as TaffyDimension, Display, FlexDirection as TaffyFlexDirection,
    JustifyContent as TaffyJustifyContent, LengthPercentage, NodeId, Overflow as TaffyOverflow,
    Point, Position as TaffyPosition, Rect, Size, Style, TaffyTree,
};

use crate::engine::{
    AlignX, AlignY, ConfigKind, Element, LayoutConfig, LayoutDirection,
    ScrollConfig, SizingAxis, TextStyle,
};
use crate::error::{Error, Result};
use crate::types::{Dimensions, Padding};

use super::text_measure::{lines_size, wrap_lines};
use super::{LayoutEngine, LayoutInput, NodeLayout};

// =============================================================================
// CONVERSIONS
// =============================================================================

fn to_taffy_flex_direction(direction: LayoutDirection) -> TaffyFlexDirection {
    match direction {
        LayoutDirection::LeftToRight => TaffyFlexDirection::Row,
        LayoutDirection::TopToBottom => TaffyFlexDirection::Column,
    }
}

fn align_x(align: AlignX) -> (TaffyJustifyContent, TaffyAlignItems) {
    match align {
        AlignX::Left => (TaffyJustifyContent::FlexStart, TaffyAlignItems::FlexStart),
        AlignX::Center => (TaffyJustifyContent::Center, TaffyAlignItems::Center),
        AlignX::Right => (TaffyJustifyContent::FlexEnd, TaffyAlignItems::FlexEnd),
    }
}

fn align_y(align: AlignY) -> (TaffyJustifyContent, TaffyAlignItems) {
    match align {
        AlignY::Top => (TaffyJustifyContent::FlexStart, TaffyAlignItems::FlexStart),
        AlignY::Center => (TaffyJustifyContent::Center, TaffyAlignItems::Center),
        AlignY::Bottom => (TaffyJustifyContent::FlexEnd, TaffyAlignItems::FlexEnd),
    }
}

fn to_taffy_padding(padding: Padding) -> Rect<LengthPercentage> {
    Rect {
        left: LengthPercentage::Length(padding.left as f32),
        right: LengthPercentage::Length(padding.right as f32),
        top: LengthPercentage::Length(padding.top as f32),
        bottom: LengthPercentage::Length(padding.bottom as f32),
    }
}

fn to_taffy_overflow(scrolls: bool) -> TaffyOverflow {
    if scrolls {
        TaffyOverflow::Scroll
    } else {
        TaffyOverflow::Visible
    }
}

/// Zero means "no explicit minimum": keep flexbox's content-based minimum.
fn min_dimension(min: f32) -> TaffyDimension {
    if min > 0.0 {
        TaffyDimension::Length(min)
    } else {
        TaffyDimension::Auto
    }
}

fn max_dimension(max: f32) -> TaffyDimension {
    if max.is_finite() && max < f32::MAX {
        TaffyDimension::Length(max)
    } else {
        TaffyDimension::Auto
    }
}

// =============================================================================
// STYLE BUILDING
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum Axis {
    Width,
    Height,
}

/// How the element sits in its parent.
#[derive(Clone, Copy)]
enum Placement {
    Root,
    Flow(LayoutDirection),
    Floating,
}

struct AxisStyle {
    size: TaffyDimension,
    min: TaffyDimension,
    max: TaffyDimension,
}

fn axis_style(sizing: SizingAxis, placement: Placement) -> AxisStyle {
    match sizing {
        SizingAxis::Fixed(v) => AxisStyle {
            size: TaffyDimension::Length(v),
            min: TaffyDimension::Length(v),
            max: TaffyDimension::Length(v),
        },
        SizingAxis::Percent(p) => AxisStyle {
            size: TaffyDimension::Percent(p),
            min: TaffyDimension::Auto,
            max: TaffyDimension::Auto,
        },
        SizingAxis::Fit { min, max } => AxisStyle {
            size: TaffyDimension::Auto,
            min: min_dimension(min),
            max: max_dimension(max),
        },
        // Out of flow there is no free space to grow into; fill the parent.
        SizingAxis::Grow { min, max } if matches!(placement, Placement::Floating) => AxisStyle {
            size: TaffyDimension::Percent(1.0),
            min: min_dimension(min),
            max: max_dimension(max),
        },
        SizingAxis::Grow { min, max } => AxisStyle {
            size: TaffyDimension::Auto,
            min: min_dimension(min),
            max: max_dimension(max),
        },
    }
}

fn apply_axis(style: &mut Style, axis: Axis, sizing: SizingAxis, placement: Placement) {
    let resolved = axis_style(sizing, placement);
    match axis {
        Axis::Width => {
            style.size.width = resolved.size;
            style.min_size.width = resolved.min;
            style.max_size.width = resolved.max;
        }
        Axis::Height => {
            style.size.height = resolved.size;
            style.min_size.height = resolved.min;
            style.max_size.height = resolved.max;
        }
    }

    let Placement::Flow(parent_direction) = placement else {
        return;
    };
    let main_axis = match parent_direction {
        LayoutDirection::LeftToRight => Axis::Width,
        LayoutDirection::TopToBottom => Axis::Height,
    };
    match sizing {
        SizingAxis::Grow { .. } if axis == main_axis => style.flex_grow = 1.0,
        SizingAxis::Grow { .. } => style.align_self = Some(TaffyAlignSelf::Stretch),
        SizingAxis::Fixed(_) if axis == main_axis => style.flex_shrink = 0.0,
        _ => {}
    }
}

/// Build a Taffy Style from an element's layout, floating and scroll records.
fn build_style(
    layout: &LayoutConfig,
    placement: Placement,
    scroll: Option<&ScrollConfig>,
) -> Style {
    let (justify_content, align_items) = match layout.direction {
        LayoutDirection::LeftToRight => {
            let (justify, _) = align_x(layout.child_alignment.x);
            let (_, align) = align_y(layout.child_alignment.y);
            (justify, align)
        }
        LayoutDirection::TopToBottom => {
            let (justify, _) = align_y(layout.child_alignment.y);
            let (_, align) = align_x(layout.child_alignment.x);
            (justify, align)
        }
    };
    let scroll = scroll.copied().unwrap_or_default();
    let gap = LengthPercentage::Length(layout.child_gap as f32);

    let mut style = Style {
        display: Display::Flex,
        position: match placement {
            Placement::Floating => TaffyPosition::Absolute,
            _ => TaffyPosition::Relative,
        },
        flex_direction: to_taffy_flex_direction(layout.direction),
        justify_content: Some(justify_content),
        align_items: Some(align_items),
        flex_grow: 0.0,
        flex_shrink: 1.0,
        padding: to_taffy_padding(layout.padding),
        gap: Size {
            width: gap,
            height: gap,
        },
        overflow: Point {
            x: to_taffy_overflow(scroll.horizontal),
            y: to_taffy_overflow(scroll.vertical),
        },
        ..Default::default()
    };

    apply_axis(&mut style, Axis::Width, layout.sizing.width, placement);
    apply_axis(&mut style, Axis::Height, layout.sizing.height, placement);
    style
}

// =============================================================================
// TEXT MEASUREMENT
// =============================================================================

/// Measure one text element for Taffy.
fn measure_node(
    input: &LayoutInput<'_>,
    element: &Element,
    known_dimensions: Size<Option<f32>>,
    available_space: Size<AvailableSpace>,
) -> std::result::Result<Size<f32>, Error> {
    let (Some(source), Some(slot)) = (element.text(), element.config_slot(ConfigKind::TEXT)) else {
        return Ok(Size::ZERO);
    };
    let style = input
        .configs
        .slot::<TextStyle>(slot)
        .copied()
        .unwrap_or_default();
    let text = input.text.source(source)?;
    if text.is_empty() {
        return Ok(Size::ZERO);
    }

    let max_width = match known_dimensions.width {
        Some(w) => Some(w),
        None => match available_space.width {
            AvailableSpace::Definite(w) => Some(w),
            AvailableSpace::MinContent => Some(0.0),
            AvailableSpace::MaxContent => None,
        },
    };
    let lines = wrap_lines(text, &style, max_width, input.measure)?;
    let size = lines_size(&lines);
    Ok(Size {
        width: known_dimensions.width.unwrap_or(size.width),
        height: known_dimensions.height.unwrap_or(size.height),
    })
}

// =============================================================================
// ENGINE
// =============================================================================

/// Flexbox layout through Taffy. A fresh Taffy tree is built every frame.
#[derive(Debug, Default)]
pub struct TaffyLayout;

impl TaffyLayout {
    pub fn new() -> Self {
        Self
    }
}

fn taffy_err(err: taffy::TaffyError) -> Error {
    Error::Layout(err.to_string())
}

impl LayoutEngine for TaffyLayout {
    fn compute(&mut self, input: &LayoutInput<'_>, diagnostics: &mut Vec<Error>) -> Result<Vec<NodeLayout>> {
        let elements = input.tree.elements();
        if elements.is_empty() {
            return Ok(Vec::new());
        }

        let mut tree: TaffyTree<usize> = TaffyTree::new();
        let mut nodes: Vec<NodeId> = Vec::with_capacity(elements.len());

        // First pass: one node per element (parents precede children).
        for (index, element) in elements.iter().enumerate() {
            let layout = element
                .config_slot(ConfigKind::LAYOUT)
                .and_then(|slot| input.configs.slot::<LayoutConfig>(slot))
                .copied()
                .unwrap_or_default();
            let scroll = element
                .config_slot(ConfigKind::SCROLL)
                .and_then(|slot| input.configs.slot::<ScrollConfig>(slot));
            let placement = if element.has(ConfigKind::FLOATING) {
                Placement::Floating
            } else {
                match element.parent.and_then(|p| elements.get(p)) {
                    Some(parent) => Placement::Flow(
                        parent
                            .config_slot(ConfigKind::LAYOUT)
                            .and_then(|slot| input.configs.slot::<LayoutConfig>(slot))
                            .map(|l| l.direction)
                            .unwrap_or_default(),
                    ),
                    None => Placement::Root,
                }
            };

            let style = build_style(&layout, placement, scroll);
            let node = if element.has(ConfigKind::TEXT) {
                tree.new_leaf_with_context(style, index).map_err(taffy_err)?
            } else {
                tree.new_leaf(style).map_err(taffy_err)?
            };
            nodes.push(node);
        }

        // Second pass: child lists.
        let mut roots = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let children: Vec<NodeId> = input
                .tree
                .children(index)
                .iter()
                .map(|&child| nodes[child])
                .collect();
            if !children.is_empty() {
                tree.set_children(nodes[index], &children).map_err(taffy_err)?;
            }
            if element.parent.is_none() {
                roots.push(index);
            }
        }

        let available = Size {
            width: AvailableSpace::Definite(input.viewport.width),
            height: AvailableSpace::Definite(input.viewport.height),
        };

        let mut failed: HashSet<usize> = HashSet::new();
        let mut measure_fn = |known_dimensions: Size<Option<f32>>,
                              available_space: Size<AvailableSpace>,
                              _node_id: NodeId,
                              context: Option<&mut usize>,
                              _style: &Style| {
            let Some(&mut index) = context else {
                return Size::ZERO;
            };
            let Some(element) = elements.get(index) else {
                return Size::ZERO;
            };
            match measure_node(input, element, known_dimensions, available_space) {
                Ok(size) => size,
                Err(err) => {
                    if failed.insert(index) {
                        diagnostics.push(err);
                    }
                    Size::ZERO
                }
            }
        };

        for &root in &roots {
            tree.compute_layout_with_measure(nodes[root], available, &mut measure_fn)
                .map_err(taffy_err)?;
        }

        // Extract results
        let mut result = Vec::with_capacity(nodes.len());
        for &node in &nodes {
            let layout = tree.layout(node).map_err(taffy_err)?;
            result.push(NodeLayout {
                x: layout.location.x,
                y: layout.location.y,
                width: layout.size.width,
                height: layout.size.height,
                content: Dimensions::new(layout.content_size.width, layout.content_size.height),
            });
        }
        Ok(result)
    }
}

// =============================================================================
// TESTS
// =============================================================================
