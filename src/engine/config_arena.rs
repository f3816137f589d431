//! Per-frame configuration arena.
//!
//! One `Vec` per category, cleared (capacity kept) at every frame boundary.
//! Handles carry the arena generation so a handle kept across a reset is
//! detected instead of silently reading another frame's record.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Error, Result};

use super::records::{ConfigKind, FillConfig, FloatingConfig, LayoutConfig, ScrollConfig, TextStyle};

/// A configuration category storable in the arena.
pub trait ConfigRecord: Copy + fmt::Debug + 'static {
    const KIND: ConfigKind;

    #[doc(hidden)]
    fn slots(arena: &ConfigArena) -> &Vec<Self>;

    #[doc(hidden)]
    fn slots_mut(arena: &mut ConfigArena) -> &mut Vec<Self>;
}

macro_rules! config_record {
    ($ty:ty, $kind:ident, $field:ident) => {
        impl ConfigRecord for $ty {
            const KIND: ConfigKind = ConfigKind::$kind;

            fn slots(arena: &ConfigArena) -> &Vec<Self> {
                &arena.$field
            }

            fn slots_mut(arena: &mut ConfigArena) -> &mut Vec<Self> {
                &mut arena.$field
            }
        }
    };
}

config_record!(LayoutConfig, LAYOUT, layouts);
config_record!(FillConfig, FILL, fills);
config_record!(TextStyle, TEXT, text_styles);
config_record!(FloatingConfig, FLOATING, floatings);
config_record!(ScrollConfig, SCROLL, scrolls);

// =============================================================================
// Handle
// =============================================================================

/// Reference to a record stored this frame.
pub struct ConfigHandle<T> {
    generation: u32,
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ConfigHandle<T> {
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl<T> Clone for ConfigHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ConfigHandle<T> {}

impl<T> PartialEq for ConfigHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation && self.index == other.index
    }
}

impl<T> Eq for ConfigHandle<T> {}

impl<T> fmt::Debug for ConfigHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigHandle")
            .field("generation", &self.generation)
            .field("index", &self.index)
            .finish()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Frame-local storage for configuration records.
#[derive(Debug)]
pub struct ConfigArena {
    generation: u32,
    capacity: usize,
    used: usize,
    layouts: Vec<LayoutConfig>,
    fills: Vec<FillConfig>,
    text_styles: Vec<TextStyle>,
    floatings: Vec<FloatingConfig>,
    scrolls: Vec<ScrollConfig>,
}

impl ConfigArena {
    /// Arena holding at most `capacity` records per frame, all categories.
    pub fn new(capacity: usize) -> Self {
        Self {
            generation: 0,
            capacity,
            used: 0,
            layouts: Vec::new(),
            fills: Vec::new(),
            text_styles: Vec::new(),
            floatings: Vec::new(),
            scrolls: Vec::new(),
        }
    }

    /// Copy a record into the arena.
    pub fn store<T: ConfigRecord>(&mut self, record: T) -> Result<ConfigHandle<T>> {
        if self.used >= self.capacity {
            return Err(Error::ConfigCapacityExceeded {
                kind: T::KIND.name(),
                capacity: self.capacity,
            });
        }
        let generation = self.generation;
        let slots = T::slots_mut(self);
        let index = slots.len() as u32;
        slots.push(record);
        self.used += 1;
        Ok(ConfigHandle {
            generation,
            index,
            _marker: PhantomData,
        })
    }

    /// Read a record stored this frame.
    pub fn get<T: ConfigRecord>(&self, handle: ConfigHandle<T>) -> Result<&T> {
        self.check(handle)?;
        self.slot::<T>(handle.index).ok_or(Error::StaleConfig {
            handle: handle.generation,
            current: self.generation,
        })
    }

    /// Fail if `handle` belongs to an earlier frame.
    pub fn check<T>(&self, handle: ConfigHandle<T>) -> Result<()> {
        if handle.generation != self.generation {
            return Err(Error::StaleConfig {
                handle: handle.generation,
                current: self.generation,
            });
        }
        Ok(())
    }

    /// Record by raw slot index, as stored on elements.
    pub fn slot<T: ConfigRecord>(&self, index: u32) -> Option<&T> {
        T::slots(self).get(index as usize)
    }

    /// Drop every record. Storage is kept for the next frame.
    pub fn reset(&mut self) {
        self.layouts.clear();
        self.fills.clear();
        self.text_styles.clear();
        self.floatings.clear();
        self.scrolls.clear();
        self.used = 0;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::records::Sizing;
    use crate::types::Rgba;

    #[test]
    fn test_store_and_get() {
        let mut arena = ConfigArena::new(8);
        let fill = arena.store(FillConfig::new(Rgba::rgb(1, 2, 3))).unwrap();
        let layout = arena
            .store(LayoutConfig::default().sizing(Sizing::fixed(4.0, 5.0)))
            .unwrap();

        assert_eq!(arena.get(fill).unwrap().color, Rgba::rgb(1, 2, 3));
        assert_eq!(arena.get(layout).unwrap().sizing, Sizing::fixed(4.0, 5.0));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_categories_are_independent() {
        let mut arena = ConfigArena::new(8);
        let fill = arena.store(FillConfig::new(Rgba::WHITE)).unwrap();
        let scroll = arena.store(ScrollConfig::vertical()).unwrap();
        // Each category indexes its own storage.
        assert_eq!(fill.index(), 0);
        assert_eq!(scroll.index(), 0);
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut arena = ConfigArena::new(1);
        arena.store(FillConfig::default()).unwrap();
        let err = arena.store(ScrollConfig::both()).unwrap_err();
        assert_eq!(
            err,
            Error::ConfigCapacityExceeded {
                kind: "scroll",
                capacity: 1
            }
        );
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut arena = ConfigArena::new(4);
        let old = arena.store(FillConfig::default()).unwrap();
        arena.reset();

        assert!(arena.is_empty());
        assert_eq!(
            arena.get(old).unwrap_err(),
            Error::StaleConfig {
                handle: 0,
                current: 1
            }
        );

        // A fresh record reuses slot 0 under the new generation.
        let fresh = arena.store(FillConfig::new(Rgba::BLACK)).unwrap();
        assert_eq!(fresh.index(), old.index());
        assert_ne!(fresh, old);
        assert_eq!(arena.get(fresh).unwrap().color, Rgba::BLACK);
    }
}
