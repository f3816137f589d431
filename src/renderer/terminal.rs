//! Differential terminal presenter.
//!
//! Rasterizes each frame into a [`FrameBuffer`], compares it to the previous
//! one and writes only the cells that changed, inside a synchronized update
//! so the terminal never shows a half-drawn frame.
//!
//! # Algorithm
//!
//! 1. Rasterize commands into a fresh buffer of the viewport size
//! 2. Begin synchronized update
//! 3. For each cell that differs from the previous frame: move, set colors, print
//! 4. End synchronized update and flush (single write)
//! 5. Keep the buffer for the next comparison

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};

use super::Presenter;
use super::buffer::{CONTINUATION, FrameBuffer};
use crate::pipeline::RenderOutput;
use crate::types::{Cell, Rgba};

fn to_color(color: Rgba) -> Color {
    if color.is_terminal_default() || color.is_transparent() {
        Color::Reset
    } else {
        Color::Rgb {
            r: color.r.clamp(0, 255) as u8,
            g: color.g.clamp(0, 255) as u8,
            b: color.b.clamp(0, 255) as u8,
        }
    }
}

/// Writes frames to a terminal (or any writer) as escape sequences.
pub struct TerminalPresenter<W: Write> {
    out: W,
    previous: Option<FrameBuffer>,
    background: Rgba,
    // Pen state while writing one frame.
    fg: Option<Rgba>,
    bg: Option<Rgba>,
    cursor: Option<(u16, u16)>,
}

impl TerminalPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            previous: None,
            background: Rgba::TERMINAL_DEFAULT,
            fg: None,
            bg: None,
            cursor: None,
        }
    }

    /// Background for cells no command paints.
    pub fn with_background(mut self, background: Rgba) -> Self {
        self.background = background;
        self
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Raw mode, alternate screen, mouse capture, hidden cursor.
    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.out,
            EnterAlternateScreen,
            EnableMouseCapture,
            Hide,
            Clear(ClearType::All)
        )?;
        self.invalidate();
        Ok(())
    }

    /// Undo [`enter`](Self::enter).
    pub fn leave(&mut self) -> io::Result<()> {
        execute!(
            self.out,
            ResetColor,
            Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Force a full redraw on the next frame.
    pub fn invalidate(&mut self) {
        self.previous = None;
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Write the changed cells of `buffer`. Returns the number written.
    pub fn render(&mut self, buffer: FrameBuffer) -> io::Result<usize> {
        self.fg = None;
        self.bg = None;
        self.cursor = None;

        let previous = self
            .previous
            .take()
            .filter(|p| p.width() == buffer.width() && p.height() == buffer.height());

        queue!(self.out, BeginSynchronizedUpdate)?;
        let mut written = 0;
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                let Some(cell) = buffer.get(x, y) else {
                    continue;
                };
                if cell.ch == CONTINUATION {
                    continue;
                }
                if previous.as_ref().and_then(|p| p.get(x, y)) == Some(cell) {
                    continue;
                }
                self.write_cell(x, y, cell)?;
                written += 1;
            }
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;

        self.previous = Some(buffer);
        Ok(written)
    }

    fn write_cell(&mut self, x: u16, y: u16, cell: &Cell) -> io::Result<()> {
        if self.cursor != Some((x, y)) {
            queue!(self.out, MoveTo(x, y))?;
        }
        if self.fg != Some(cell.fg) {
            queue!(self.out, SetForegroundColor(to_color(cell.fg)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            queue!(self.out, SetBackgroundColor(to_color(cell.bg)))?;
            self.bg = Some(cell.bg);
        }
        queue!(self.out, Print(cell.ch))?;
        let advance = unicode_width::UnicodeWidthChar::width(cell.ch).unwrap_or(1) as u16;
        self.cursor = Some((x.saturating_add(advance), y));
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn present(&mut self, output: &RenderOutput<'_>) -> io::Result<()> {
        let width = output.viewport.width.max(0.0).round() as u16;
        let height = output.viewport.height.max(0.0).round() as u16;
        let mut buffer = FrameBuffer::with_background(width, height, self.background);
        buffer.rasterize(output);
        let written = self.render(buffer)?;
        tracing::trace!(frame = output.frame, cells = written, "presented");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_render_writes_every_cell() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        assert!(!presenter.has_previous());
        let written = presenter.render(FrameBuffer::new(4, 2)).unwrap();
        assert_eq!(written, 8);
        assert!(presenter.has_previous());
    }

    #[test]
    fn test_unchanged_frame_writes_nothing() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.render(FrameBuffer::new(4, 2)).unwrap();
        assert_eq!(presenter.render(FrameBuffer::new(4, 2)).unwrap(), 0);
    }

    #[test]
    fn test_only_changed_cells_are_written() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.render(FrameBuffer::new(6, 1)).unwrap();

        let mut next = FrameBuffer::new(6, 1);
        next.draw_text(1, 0, "ab", Rgba::WHITE, None);
        assert_eq!(presenter.render(next).unwrap(), 2);
        let written = String::from_utf8_lossy(presenter.writer());
        assert!(written.contains('a'));
        assert!(written.contains('b'));
    }

    #[test]
    fn test_resize_forces_full_redraw() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.render(FrameBuffer::new(4, 2)).unwrap();
        assert_eq!(presenter.render(FrameBuffer::new(5, 2)).unwrap(), 10);
    }

    #[test]
    fn test_invalidate() {
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.render(FrameBuffer::new(2, 2)).unwrap();
        presenter.invalidate();
        assert!(!presenter.has_previous());
        assert_eq!(presenter.render(FrameBuffer::new(2, 2)).unwrap(), 4);
    }

    #[test]
    fn test_color_mapping() {
        assert_eq!(to_color(Rgba::TERMINAL_DEFAULT), Color::Reset);
        assert_eq!(to_color(Rgba::rgb(1, 2, 3)), Color::Rgb { r: 1, g: 2, b: 3 });
    }
}
