//! Dynamic text arena.
//!
//! Runtime strings are copied into one frame-owned buffer and referred to
//! by [`TextRef`]. Clearing bumps the generation, so a reference held past
//! the frame boundary resolves to [`Error::StaleText`] instead of reading
//! another frame's bytes. Lengths are explicit; no terminator is stored.

use crate::error::{Error, Result};

/// Non-owning reference to interned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRef {
    generation: u32,
    start: u32,
    len: u32,
}

impl TextRef {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Where an element's text lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Compile-time literal, never copied.
    Static(&'static str),
    /// Copied into the frame's text arena.
    Interned(TextRef),
}

impl From<&'static str> for TextSource {
    fn from(text: &'static str) -> Self {
        TextSource::Static(text)
    }
}

impl From<TextRef> for TextSource {
    fn from(text: TextRef) -> Self {
        TextSource::Interned(text)
    }
}

/// Frame-scoped byte buffer for runtime text.
#[derive(Debug)]
pub struct TextArena {
    buf: String,
    generation: u32,
    capacity: usize,
}

impl TextArena {
    /// `capacity` is in bytes, capped at `u32::MAX` because references
    /// store 32-bit offsets.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: String::new(),
            generation: 0,
            capacity: capacity.min(u32::MAX as usize),
        }
    }

    /// Copy `text` into the arena.
    pub fn intern(&mut self, text: &str) -> Result<TextRef> {
        let available = self.capacity.saturating_sub(self.buf.len());
        if text.len() > available {
            return Err(Error::TextCapacityExceeded {
                requested: text.len(),
                available,
            });
        }
        let start = self.buf.len() as u32;
        self.buf.push_str(text);
        Ok(TextRef {
            generation: self.generation,
            start,
            len: text.len() as u32,
        })
    }

    /// Borrow interned text. Fails for references from an earlier frame.
    pub fn resolve(&self, text: TextRef) -> Result<&str> {
        if text.generation != self.generation {
            return Err(Error::StaleText {
                handle: text.generation,
                current: self.generation,
            });
        }
        let start = text.start as usize;
        self.buf
            .get(start..start + text.len as usize)
            .ok_or(Error::StaleText {
                handle: text.generation,
                current: self.generation,
            })
    }

    /// Borrow the text behind a source.
    pub fn source<'a>(&'a self, source: &TextSource) -> Result<&'a str> {
        match *source {
            TextSource::Static(text) => Ok(text),
            TextSource::Interned(text) => self.resolve(text),
        }
    }

    /// Release everything interned since the last clear.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Bytes in use this frame.
    pub fn used(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let mut arena = TextArena::new(64);
        let a = arena.intern("hello").unwrap();
        let b = arena.intern("world").unwrap();
        assert_eq!(arena.resolve(a).unwrap(), "hello");
        assert_eq!(arena.resolve(b).unwrap(), "world");
        assert_eq!(arena.used(), 10);
    }

    #[test]
    fn test_capacity_fits_reference_offsets() {
        assert_eq!(TextArena::new(usize::MAX).capacity(), u32::MAX as usize);
        assert_eq!(TextArena::new(64).capacity(), 64);
    }

    #[test]
    fn test_clear_makes_old_refs_stale() {
        let mut arena = TextArena::new(64);
        let before = arena.intern("abc").unwrap();
        arena.clear();
        let after = arena.intern("xyz").unwrap();

        assert_eq!(
            arena.resolve(before).unwrap_err(),
            Error::StaleText { handle: 0, current: 1 }
        );
        assert_eq!(arena.resolve(after).unwrap(), "xyz");
    }

    #[test]
    fn test_capacity_exceeded_keeps_existing_text() {
        let mut arena = TextArena::new(4);
        let ok = arena.intern("abc").unwrap();
        assert_eq!(
            arena.intern("de").unwrap_err(),
            Error::TextCapacityExceeded { requested: 2, available: 1 }
        );
        assert_eq!(arena.resolve(ok).unwrap(), "abc");
    }

    #[test]
    fn test_multibyte_text() {
        let mut arena = TextArena::new(64);
        let r = arena.intern("größe 日本").unwrap();
        assert_eq!(arena.resolve(r).unwrap(), "größe 日本");
    }

    #[test]
    fn test_static_source_bypasses_arena() {
        let arena = TextArena::new(0);
        assert_eq!(arena.source(&TextSource::from("literal")).unwrap(), "literal");
    }

    #[test]
    fn test_empty_text() {
        let mut arena = TextArena::new(0);
        let r = arena.intern("").unwrap();
        assert!(r.is_empty());
        assert_eq!(arena.resolve(r).unwrap(), "");
    }
}
