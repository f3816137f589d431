//! Element identifiers.
//!
//! Ids are Jenkins one-at-a-time hashes of a name, an optional positional
//! index and a parent seed. Every mixing step is a bijection on `u32`, so
//! two indices under the same name and seed never collide.

/// Stable identifier of an element across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ElementId {
    /// Final hash, the value interaction state is keyed on.
    pub id: u32,
    /// Positional index mixed into `id`.
    pub offset: u32,
    /// Hash of the name and seed before the index was mixed in.
    pub base: u32,
}

impl ElementId {
    /// Global id for a unique name.
    pub fn new(name: &str) -> Self {
        hash_id(name, 0, 0)
    }

    /// Global id for the `index`-th item sharing `name`.
    pub fn indexed(name: &str, index: u32) -> Self {
        hash_id(name, index, 0)
    }

    /// Id scoped under another element, for names reused in several subtrees.
    pub fn scoped(name: &str, index: u32, parent: ElementId) -> Self {
        hash_id(name, index, parent.id)
    }
}

#[inline]
fn mix(mut hash: u32, value: u32) -> u32 {
    hash = hash.wrapping_add(value);
    hash = hash.wrapping_add(hash << 10);
    hash ^ (hash >> 6)
}

#[inline]
fn finish(mut hash: u32) -> u32 {
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash = hash.wrapping_add(hash << 15);
    hash.wrapping_add(1)
}

/// Hash a name, a positional index and a parent seed into an id.
///
/// Pure: identical arguments give identical ids in any frame.
pub fn hash_id(name: &str, index: u32, seed: u32) -> ElementId {
    let base = name.bytes().fold(seed, |hash, b| mix(hash, b as u32));
    ElementId {
        id: finish(mix(base, index)),
        offset: index,
        base: finish(base),
    }
}

/// Id of an element declared without a name: its sibling ordinal hashed
/// under the parent id.
pub fn hash_ordinal(ordinal: u32, parent: u32) -> ElementId {
    ElementId {
        id: finish(mix(parent, ordinal.wrapping_add(48))),
        offset: ordinal,
        base: parent,
    }
}
