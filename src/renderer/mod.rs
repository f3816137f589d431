//! Presentation - the "blind" output layer.
//!
//! A presenter knows only about render commands. It doesn't understand
//! elements, layout or interaction. It takes a frame's [`RenderOutput`]
//! and puts it on a surface.
//!
//! The bundled [`TerminalPresenter`] rasterizes into a [`FrameBuffer`] and
//! writes the cells that changed since the previous frame.

pub mod buffer;
pub mod terminal;

pub use buffer::{CONTINUATION, FrameBuffer};
pub use terminal::TerminalPresenter;

use std::io;

use crate::pipeline::RenderOutput;

/// Consumes one frame's render commands.
pub trait Presenter {
    fn present(&mut self, output: &RenderOutput<'_>) -> io::Result<()>;
}
