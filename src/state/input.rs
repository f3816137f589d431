//! Input Module - Per-frame pointer/scroll snapshot
//!
//! The snapshot is captured once per frame, before any element is declared,
//! and handed to [`Context::begin_frame`] by value. The frame only hands out
//! shared references to it, so it cannot change while the tree is declared.
//!
//! [`InputTracker`] bridges crossterm's event stream: events are folded in
//! as they arrive and [`InputTracker::snapshot`] cuts one snapshot per frame.
//!
//! [`Context::begin_frame`]: crate::pipeline::Context::begin_frame

use std::time::{Duration, Instant};

use crossterm::event::{Event, MouseButton, MouseEvent, MouseEventKind, poll, read};

use crate::types::{Dimensions, Vec2};

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Immutable input state for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputSnapshot {
    window: Dimensions,
    pointer: Vec2,
    pointer_down: bool,
    scroll_delta: Vec2,
    frame_time: f32,
}

impl InputSnapshot {
    /// Capture the state for the next frame.
    ///
    /// `scroll_delta` is in wheel notches, positive `y` scrolls up.
    /// `frame_time` is in seconds.
    pub fn capture(
        window: Dimensions,
        pointer: Vec2,
        pointer_down: bool,
        scroll_delta: Vec2,
        frame_time: f32,
    ) -> Self {
        Self {
            window,
            pointer,
            pointer_down,
            scroll_delta,
            frame_time,
        }
    }

    /// Window of the given size with the pointer parked at the origin.
    pub fn idle(window: Dimensions) -> Self {
        Self::capture(window, Vec2::ZERO, false, Vec2::ZERO, 0.0)
    }

    pub fn window(&self) -> Dimensions {
        self.window
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn pointer_down(&self) -> bool {
        self.pointer_down
    }

    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    pub fn frame_time(&self) -> f32 {
        self.frame_time
    }
}

// =============================================================================
// POINTER STATE
// =============================================================================

/// Primary button state relative to the previous frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerState {
    PressedThisFrame,
    Pressed,
    ReleasedThisFrame,
    #[default]
    Released,
}

impl PointerState {
    /// Transition from last frame's button flag to this frame's.
    pub fn from_transition(was_down: bool, is_down: bool) -> Self {
        match (was_down, is_down) {
            (false, true) => PointerState::PressedThisFrame,
            (true, true) => PointerState::Pressed,
            (true, false) => PointerState::ReleasedThisFrame,
            (false, false) => PointerState::Released,
        }
    }

    pub fn is_down(self) -> bool {
        matches!(self, PointerState::PressedThisFrame | PointerState::Pressed)
    }
}

/// Pointer position plus transition state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerData {
    pub position: Vec2,
    pub state: PointerState,
}

// =============================================================================
// CROSSTERM TRACKER
// =============================================================================

/// Folds crossterm events into per-frame snapshots.
#[derive(Debug)]
pub struct InputTracker {
    window: Dimensions,
    pointer: Vec2,
    pointer_down: bool,
    // A press seen since the last snapshot, kept even if released since.
    press_latched: bool,
    scroll: Vec2,
    last_frame: Instant,
}

impl InputTracker {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            window: Dimensions::new(width as f32, height as f32),
            pointer: Vec2::ZERO,
            pointer_down: false,
            press_latched: false,
            scroll: Vec2::ZERO,
            last_frame: Instant::now(),
        }
    }

    /// Fold one event. Returns true if it touched pointer or window state.
    pub fn handle(&mut self, event: &Event) -> bool {
        match event {
            Event::Mouse(mouse) => {
                self.handle_mouse(mouse);
                true
            }
            Event::Resize(width, height) => {
                self.window = Dimensions::new(*width as f32, *height as f32);
                true
            }
            _ => false,
        }
    }

    fn handle_mouse(&mut self, event: &MouseEvent) {
        self.pointer = Vec2::new(event.column as f32, event.row as f32);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer_down = true;
                self.press_latched = true;
            }
            MouseEventKind::Drag(MouseButton::Left) => self.pointer_down = true,
            MouseEventKind::Up(MouseButton::Left) => self.pointer_down = false,
            MouseEventKind::ScrollUp => self.scroll.y += 1.0,
            MouseEventKind::ScrollDown => self.scroll.y -= 1.0,
            MouseEventKind::ScrollLeft => self.scroll.x += 1.0,
            MouseEventKind::ScrollRight => self.scroll.x -= 1.0,
            _ => {}
        }
    }

    /// Cut the snapshot for the next frame. Accumulated scroll is consumed.
    ///
    /// A click that went down and up between two snapshots reports the
    /// button as down in this one; the release shows up in the next.
    pub fn snapshot(&mut self) -> InputSnapshot {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        let scroll = std::mem::take(&mut self.scroll);
        let down = self.pointer_down || std::mem::take(&mut self.press_latched);
        InputSnapshot::capture(self.window, self.pointer, down, scroll, frame_time)
    }

    pub fn window(&self) -> Dimensions {
        self.window
    }
}

/// Poll for an event with timeout.
/// Returns None if no event within timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<Event>> {
    if poll(timeout)? {
        Ok(Some(read()?))
    } else {
        Ok(None)
    }
}

// =============================================================================
// TESTS
// =============================================================================
