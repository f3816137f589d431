//! Configuration records.
//!
//! Plain `Copy` values copied into the per-frame [`ConfigArena`]. One record
//! per category may be attached to an element.
//!
//! [`ConfigArena`]: super::ConfigArena

use bitflags::bitflags;

use crate::types::{Padding, Rgba, Vec2};

bitflags! {
    /// Configuration categories attached to an element.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConfigKind: u8 {
        const LAYOUT   = 1 << 0;
        const FILL     = 1 << 1;
        const TEXT     = 1 << 2;
        const FLOATING = 1 << 3;
        const SCROLL   = 1 << 4;
    }
}

impl ConfigKind {
    /// Number of categories.
    pub const COUNT: usize = 5;

    /// Slot index of a single category.
    pub(crate) fn slot(self) -> usize {
        self.bits().trailing_zeros() as usize
    }

    /// Human-readable category name.
    pub fn name(self) -> &'static str {
        match self {
            ConfigKind::LAYOUT => "layout",
            ConfigKind::FILL => "fill",
            ConfigKind::TEXT => "text",
            ConfigKind::FLOATING => "floating",
            ConfigKind::SCROLL => "scroll",
            _ => "mixed",
        }
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

/// How an element sizes itself along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingAxis {
    /// Wrap the content, within `min..=max`.
    Fit { min: f32, max: f32 },
    /// Take the remaining space in the parent, within `min..=max`.
    Grow { min: f32, max: f32 },
    Fixed(f32),
    /// Fraction of the parent, `0.0..=1.0`.
    Percent(f32),
}

impl SizingAxis {
    pub const fn fit() -> Self {
        SizingAxis::Fit {
            min: 0.0,
            max: f32::MAX,
        }
    }

    pub const fn grow() -> Self {
        SizingAxis::Grow {
            min: 0.0,
            max: f32::MAX,
        }
    }
}

impl Default for SizingAxis {
    fn default() -> Self {
        SizingAxis::fit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sizing {
    pub width: SizingAxis,
    pub height: SizingAxis,
}

impl Sizing {
    pub const fn new(width: SizingAxis, height: SizingAxis) -> Self {
        Self { width, height }
    }

    pub const fn grow() -> Self {
        Self::new(SizingAxis::grow(), SizingAxis::grow())
    }

    pub const fn fixed(width: f32, height: f32) -> Self {
        Self::new(SizingAxis::Fixed(width), SizingAxis::Fixed(height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    #[default]
    LeftToRight,
    TopToBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignX {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignY {
    #[default]
    Top,
    Center,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChildAlignment {
    pub x: AlignX,
    pub y: AlignY,
}

impl ChildAlignment {
    pub const fn new(x: AlignX, y: AlignY) -> Self {
        Self { x, y }
    }
}

/// Box model of a container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutConfig {
    pub sizing: Sizing,
    pub padding: Padding,
    pub child_gap: u16,
    pub child_alignment: ChildAlignment,
    pub direction: LayoutDirection,
}

impl LayoutConfig {
    pub fn sizing(mut self, sizing: Sizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    pub fn child_gap(mut self, gap: u16) -> Self {
        self.child_gap = gap;
        self
    }

    pub fn align(mut self, x: AlignX, y: AlignY) -> Self {
        self.child_alignment = ChildAlignment::new(x, y);
        self
    }

    pub fn direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }
}

// =============================================================================
// FILL
// =============================================================================

/// Solid background rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FillConfig {
    pub color: Rgba,
    pub corner_radius: f32,
}

impl FillConfig {
    pub const fn new(color: Rgba) -> Self {
        Self {
            color,
            corner_radius: 0.0,
        }
    }

    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius;
        self
    }
}

// =============================================================================
// TEXT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextWrap {
    /// Break between words when a line would overflow.
    #[default]
    Words,
    /// Break only at explicit newlines.
    Newlines,
    /// Never break.
    None,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Rgba,
    pub font_id: u16,
    pub font_size: u16,
    pub letter_spacing: u16,
    /// Fixed line height; 0 uses the measured height.
    pub line_height: u16,
    pub wrap: TextWrap,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            font_id: 0,
            font_size: 16,
            letter_spacing: 0,
            line_height: 0,
            wrap: TextWrap::Words,
        }
    }
}

impl TextStyle {
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn font(mut self, font_id: u16, font_size: u16) -> Self {
        self.font_id = font_id;
        self.font_size = font_size;
        self
    }

    pub fn line_height(mut self, line_height: u16) -> Self {
        self.line_height = line_height;
        self
    }

    pub fn wrap(mut self, wrap: TextWrap) -> Self {
        self.wrap = wrap;
        self
    }
}

// =============================================================================
// FLOATING
// =============================================================================

/// One of nine anchor points on a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachPoint {
    #[default]
    LeftTop,
    LeftCenter,
    LeftBottom,
    CenterTop,
    CenterCenter,
    CenterBottom,
    RightTop,
    RightCenter,
    RightBottom,
}

impl AttachPoint {
    /// Fractional position of the anchor within a box, `(0..=1, 0..=1)`.
    pub fn factors(self) -> (f32, f32) {
        match self {
            AttachPoint::LeftTop => (0.0, 0.0),
            AttachPoint::LeftCenter => (0.0, 0.5),
            AttachPoint::LeftBottom => (0.0, 1.0),
            AttachPoint::CenterTop => (0.5, 0.0),
            AttachPoint::CenterCenter => (0.5, 0.5),
            AttachPoint::CenterBottom => (0.5, 1.0),
            AttachPoint::RightTop => (1.0, 0.0),
            AttachPoint::RightCenter => (1.0, 0.5),
            AttachPoint::RightBottom => (1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttachPoints {
    /// Anchor on the floating element.
    pub element: AttachPoint,
    /// Anchor on its parent.
    pub parent: AttachPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerCapture {
    /// Elements beneath the panel stop receiving hover while the pointer is over it.
    #[default]
    Capture,
    Passthrough,
}

/// Out-of-flow panel positioned against its parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FloatingConfig {
    pub offset: Vec2,
    pub z_index: i16,
    pub attach: AttachPoints,
    pub pointer_capture: PointerCapture,
}

impl FloatingConfig {
    pub fn attach(mut self, element: AttachPoint, parent: AttachPoint) -> Self {
        self.attach = AttachPoints { element, parent };
        self
    }

    pub fn offset(mut self, x: f32, y: f32) -> Self {
        self.offset = Vec2::new(x, y);
        self
    }

    pub fn z_index(mut self, z_index: i16) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn pointer_capture(mut self, mode: PointerCapture) -> Self {
        self.pointer_capture = mode;
        self
    }
}

// =============================================================================
// SCROLL
// =============================================================================

/// Clipping scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollConfig {
    pub horizontal: bool,
    pub vertical: bool,
}

impl ScrollConfig {
    pub const fn vertical() -> Self {
        Self {
            horizontal: false,
            vertical: true,
        }
    }

    pub const fn horizontal() -> Self {
        Self {
            horizontal: true,
            vertical: false,
        }
    }

    pub const fn both() -> Self {
        Self {
            horizontal: true,
            vertical: true,
        }
    }
}
