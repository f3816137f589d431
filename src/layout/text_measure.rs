//! Text Measurement
//!
//! Text is measured through [`MeasureText`], supplied once when the context
//! is created. The layout bridge never looks at glyphs itself: it measures
//! words and spaces through the callback and wraps greedily.
//!
//! [`CellMeasure`] is the terminal implementation. Widths come from
//! `unicode-width`:
//! - ASCII characters: 1 cell
//! - CJK characters: 2 cells (fullwidth)
//! - Emoji: 2 cells (most)
//! - Zero-width characters: 0 cells

use thiserror::Error;
use unicode_width::UnicodeWidthStr;

use crate::engine::{TextStyle, TextWrap};
use crate::types::Dimensions;

/// Failure reported by a text measurement backend.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct MeasureError(pub String);

impl From<MeasureError> for crate::Error {
    fn from(err: MeasureError) -> Self {
        crate::Error::Measure(err.0)
    }
}

/// Measures a run of text without line breaks.
pub trait MeasureText {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<Dimensions, MeasureError>;
}

impl<F> MeasureText for F
where
    F: Fn(&str, &TextStyle) -> Result<Dimensions, MeasureError>,
{
    fn measure(&self, text: &str, style: &TextStyle) -> Result<Dimensions, MeasureError> {
        self(text, style)
    }
}

/// Terminal cell measurement: one row per line, unicode display width.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellMeasure;

impl MeasureText for CellMeasure {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<Dimensions, MeasureError> {
        let width = string_width(text) as f32;
        let gaps = text.chars().count().saturating_sub(1) as f32;
        Ok(Dimensions::new(
            width + gaps * style.letter_spacing as f32,
            1.0,
        ))
    }
}

/// Display width of a string in terminal cells.
pub fn string_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

// =============================================================================
// Wrapping
// =============================================================================

/// One wrapped line: a byte range of the source text plus its size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextLine {
    pub start: usize,
    pub end: usize,
    pub width: f32,
    pub height: f32,
}

impl TextLine {
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or("")
    }
}

const WRAP_EPSILON: f32 = 0.01;

/// Break `text` into lines no wider than `max_width` (where the style
/// allows breaking). Words wider than the limit get a line of their own.
pub fn wrap_lines(
    text: &str,
    style: &TextStyle,
    max_width: Option<f32>,
    measure: &dyn MeasureText,
) -> Result<Vec<TextLine>, MeasureError> {
    let fixed_height = (style.line_height > 0).then_some(style.line_height as f32);
    let space = measure.measure(" ", style)?;
    let height_of = |measured: f32| fixed_height.unwrap_or(measured);

    if style.wrap == TextWrap::None {
        let size = measure.measure(text, style)?;
        return Ok(vec![TextLine {
            start: 0,
            end: text.len(),
            width: size.width,
            height: height_of(size.height.max(space.height)),
        }]);
    }

    let mut lines = Vec::new();
    let mut offset = 0;
    for paragraph in text.split('\n') {
        let para_start = offset;
        offset += paragraph.len() + 1;

        if style.wrap == TextWrap::Newlines || max_width.is_none() {
            let size = measure.measure(paragraph, style)?;
            lines.push(TextLine {
                start: para_start,
                end: para_start + paragraph.len(),
                width: size.width,
                height: height_of(size.height.max(space.height)),
            });
            continue;
        }

        let limit = max_width.unwrap_or(f32::MAX);
        let mut line = TextLine {
            start: para_start,
            end: para_start,
            width: 0.0,
            height: height_of(space.height),
        };
        let mut has_word = false;
        let mut word_start = para_start;

        for word in paragraph.split(' ') {
            let start = word_start;
            let end = start + word.len();
            word_start = end + 1;

            let size = measure.measure(word, style)?;
            if !has_word {
                line.end = end;
                line.width = size.width;
                line.height = height_of(size.height.max(space.height));
                has_word = true;
            } else if line.width + space.width + size.width > limit + WRAP_EPSILON {
                lines.push(line);
                line = TextLine {
                    start,
                    end,
                    width: size.width,
                    height: height_of(size.height.max(space.height)),
                };
            } else {
                line.end = end;
                line.width += space.width + size.width;
                line.height = height_of(line.height.max(size.height));
            }
        }
        lines.push(line);
    }
    Ok(lines)
}

/// Bounding size of wrapped lines.
pub fn lines_size(lines: &[TextLine]) -> Dimensions {
    lines.iter().fold(Dimensions::ZERO, |acc, line| {
        Dimensions::new(acc.width.max(line.width), acc.height + line.height)
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn words() -> TextStyle {
        TextStyle::default()
    }

    fn texts<'a>(text: &'a str, lines: &[TextLine]) -> Vec<&'a str> {
        lines.iter().map(|l| l.slice(text)).collect()
    }

    #[test]
    fn test_string_width_ascii_and_wide() {
        assert_eq!(string_width("hello"), 5);
        assert_eq!(string_width("日本"), 4);
        assert_eq!(string_width(""), 0);
    }

    #[test]
    fn test_cell_measure_letter_spacing() {
        let style = TextStyle {
            letter_spacing: 1,
            ..TextStyle::default()
        };
        let size = CellMeasure.measure("abc", &style).unwrap();
        assert_eq!(size, Dimensions::new(5.0, 1.0));
    }

    #[test]
    fn test_wrap_words() {
        let text = "the quick brown fox";
        let lines = wrap_lines(text, &words(), Some(10.0), &CellMeasure).unwrap();
        assert_eq!(texts(text, &lines), vec!["the quick", "brown fox"]);
        assert_eq!(lines[0].width, 9.0);
        assert_eq!(lines_size(&lines), Dimensions::new(9.0, 2.0));
    }

    #[test]
    fn test_wrap_unbounded_keeps_paragraphs() {
        let text = "one two\nthree";
        let lines = wrap_lines(text, &words(), None, &CellMeasure).unwrap();
        assert_eq!(texts(text, &lines), vec!["one two", "three"]);
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let text = "a incomprehensibilities b";
        let lines = wrap_lines(text, &words(), Some(5.0), &CellMeasure).unwrap();
        assert_eq!(texts(text, &lines), vec!["a", "incomprehensibilities", "b"]);
    }

    #[test]
    fn test_newlines_mode_ignores_width() {
        let text = "a long line here\nnext";
        let style = words().wrap(TextWrap::Newlines);
        let lines = wrap_lines(text, &style, Some(3.0), &CellMeasure).unwrap();
        assert_eq!(texts(text, &lines), vec!["a long line here", "next"]);
    }

    #[test]
    fn test_no_wrap_is_single_line() {
        let text = "never breaks";
        let style = words().wrap(TextWrap::None);
        let lines = wrap_lines(text, &style, Some(3.0), &CellMeasure).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].width, 12.0);
    }

    #[test]
    fn test_fixed_line_height() {
        let text = "a b";
        let style = words().line_height(2);
        let lines = wrap_lines(text, &style, Some(1.0), &CellMeasure).unwrap();
        assert_eq!(lines_size(&lines).height, 4.0);
    }

    #[test]
    fn test_closure_measure_and_errors() {
        let failing = |_: &str, _: &TextStyle| -> Result<Dimensions, MeasureError> {
            Err(MeasureError("font 3 not loaded".into()))
        };
        let err = wrap_lines("x", &words(), None, &failing).unwrap_err();
        assert_eq!(crate::Error::from(err), crate::Error::Measure("font 3 not loaded".into()));
    }
}
