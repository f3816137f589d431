//! Render commands.
//!
//! The resolved tree is flattened into an ordered command list: the main
//! tree depth-first in declaration order, then floating panels in `z_index`
//! order. Scroll containers bracket their children with scissor commands.
//! Text is emitted one command per wrapped line and borrows the frame's
//! text arena, so the list cannot outlive the frame that produced it.

use crate::engine::{ConfigArena, ConfigKind, ElementId, ElementTree, FillConfig, TextArena, TextStyle, TextWrap};
use crate::error::Error;
use crate::layout::{MeasureText, ResolvedLayout, wrap_lines};
use crate::types::{BoundingBox, Dimensions, Rgba};

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand<'f> {
    Rectangle {
        id: ElementId,
        bounds: BoundingBox,
        color: Rgba,
        corner_radius: f32,
    },
    Text {
        id: ElementId,
        bounds: BoundingBox,
        text: &'f str,
        style: TextStyle,
    },
    /// Clip following commands to `bounds` until the matching end.
    ScissorStart { id: ElementId, bounds: BoundingBox },
    ScissorEnd { id: ElementId },
}

impl RenderCommand<'_> {
    pub fn id(&self) -> ElementId {
        match self {
            RenderCommand::Rectangle { id, .. }
            | RenderCommand::Text { id, .. }
            | RenderCommand::ScissorStart { id, .. }
            | RenderCommand::ScissorEnd { id } => *id,
        }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        match self {
            RenderCommand::Rectangle { bounds, .. }
            | RenderCommand::Text { bounds, .. }
            | RenderCommand::ScissorStart { bounds, .. } => Some(*bounds),
            RenderCommand::ScissorEnd { .. } => None,
        }
    }
}

/// Result of a frame: commands for the presentation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutput<'f> {
    pub frame: u64,
    pub viewport: Dimensions,
    pub commands: Vec<RenderCommand<'f>>,
}

impl<'f> RenderOutput<'f> {
    pub fn iter(&self) -> std::slice::Iter<'_, RenderCommand<'f>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Text of every text command, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &'f str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            RenderCommand::Text { text, .. } => Some(*text),
            _ => None,
        })
    }
}

/// Commands borrow the frame's storage (`'f`); the resolved layout only
/// has to live while they are built.
pub(crate) struct CommandBuilder<'f, 'r> {
    pub tree: &'f ElementTree,
    pub configs: &'f ConfigArena,
    pub text: &'f TextArena,
    pub resolved: &'r ResolvedLayout,
    pub measure: &'r dyn MeasureText,
    pub viewport: Dimensions,
    pub culling: bool,
}

impl<'f> CommandBuilder<'f, '_> {
    /// Flatten the tree. Errors not already in `reported` are appended.
    pub fn build(&self, reported: &mut Vec<Error>) -> Vec<RenderCommand<'f>> {
        let mut out = Vec::new();
        if self.tree.is_empty() {
            return out;
        }
        self.emit(0, &mut out, reported);
        for &panel in &self.resolved.floating {
            self.emit(panel, &mut out, reported);
        }
        out
    }

    fn drawable(&self, index: usize) -> bool {
        if !self.culling {
            return true;
        }
        let screen = BoundingBox::new(0.0, 0.0, self.viewport.width, self.viewport.height);
        self.resolved
            .visible(index)
            .is_some_and(|visible| visible.overlaps(&screen))
    }

    fn emit(&self, index: usize, out: &mut Vec<RenderCommand<'f>>, reported: &mut Vec<Error>) {
        let Some(element) = self.tree.get(index) else {
            return;
        };
        let Some(bounds) = self.resolved.bounds.get(index).copied() else {
            return;
        };
        let drawable = self.drawable(index);

        let fill = element
            .config_slot(ConfigKind::FILL)
            .and_then(|slot| self.configs.slot::<FillConfig>(slot))
            .filter(|_| drawable);
        if let Some(fill) = fill {
            out.push(RenderCommand::Rectangle {
                id: element.id,
                bounds,
                color: fill.color,
                corner_radius: fill.corner_radius,
            });
        }

        let scrolls = element.has(ConfigKind::SCROLL);
        if scrolls {
            out.push(RenderCommand::ScissorStart {
                id: element.id,
                bounds: self
                    .resolved
                    .visible(index)
                    .unwrap_or(BoundingBox::new(bounds.x, bounds.y, 0.0, 0.0)),
            });
        }

        if drawable {
            self.emit_text(index, bounds, out, reported);
        }

        for &child in self.tree.children(index) {
            let floating = self.tree.get(child).is_some_and(|c| c.has(ConfigKind::FLOATING));
            if !floating {
                self.emit(child, out, reported);
            }
        }

        if scrolls {
            out.push(RenderCommand::ScissorEnd { id: element.id });
        }
    }

    fn emit_text(
        &self,
        index: usize,
        bounds: BoundingBox,
        out: &mut Vec<RenderCommand<'f>>,
        reported: &mut Vec<Error>,
    ) {
        let Some(element) = self.tree.get(index) else {
            return;
        };
        let (Some(source), Some(style)) = (
            element.text(),
            element
                .config_slot(ConfigKind::TEXT)
                .and_then(|slot| self.configs.slot::<TextStyle>(slot)),
        ) else {
            return;
        };

        let text = match self.text.source(source) {
            Ok(text) => text,
            Err(err) => return note(reported, err),
        };
        let max_width = (style.wrap == TextWrap::Words).then_some(bounds.width);
        let lines = match wrap_lines(text, style, max_width, self.measure) {
            Ok(lines) => lines,
            Err(err) => return note(reported, err.into()),
        };

        let mut y = bounds.y;
        for line in lines {
            let slice = line.slice(text);
            if !slice.is_empty() {
                out.push(RenderCommand::Text {
                    id: element.id,
                    bounds: BoundingBox::new(bounds.x, y, line.width, line.height),
                    text: slice,
                    style: *style,
                });
            }
            y += line.height;
        }
    }
}

fn note(reported: &mut Vec<Error>, err: Error) {
    if !reported.contains(&err) {
        reported.push(err);
    }
}
