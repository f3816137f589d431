//! Element stack builder.
//!
//! Elements are appended to a flat arena in declaration (pre-)order. While
//! an element is open its children collect in a pending buffer; on close
//! they move into the permanent child list, so a closed element's children
//! are a contiguous slice. The open stack decides parent/child edges.

use crate::error::{Error, Result};

use super::id::{ElementId, hash_id, hash_ordinal};
use super::records::ConfigKind;
use super::text_arena::TextSource;

/// Sentinel for an unused config slot.
const NO_SLOT: u32 = u32::MAX;

/// One declared element.
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub parent: Option<usize>,
    /// Position among siblings, in declaration order.
    pub ordinal: u32,
    pub depth: u32,
    explicit_id: bool,
    child_start: usize,
    child_count: u32,
    kinds: ConfigKind,
    slots: [u32; ConfigKind::COUNT],
    text: Option<TextSource>,
}

impl Element {
    fn new(id: ElementId, parent: Option<usize>, ordinal: u32, depth: u32) -> Self {
        Self {
            id,
            parent,
            ordinal,
            depth,
            explicit_id: false,
            child_start: 0,
            child_count: 0,
            kinds: ConfigKind::empty(),
            slots: [NO_SLOT; ConfigKind::COUNT],
            text: None,
        }
    }

    /// Categories attached so far.
    pub fn kinds(&self) -> ConfigKind {
        self.kinds
    }

    pub fn has(&self, kind: ConfigKind) -> bool {
        self.kinds.contains(kind)
    }

    /// Arena slot of the attached record of `kind`.
    pub fn config_slot(&self, kind: ConfigKind) -> Option<u32> {
        if !self.kinds.contains(kind) {
            return None;
        }
        Some(self.slots[kind.slot()])
    }

    pub fn child_count(&self) -> u32 {
        self.child_count
    }

    pub fn text(&self) -> Option<&TextSource> {
        self.text.as_ref()
    }

    /// Whether the id was attached by name rather than derived from position.
    pub fn has_explicit_id(&self) -> bool {
        self.explicit_id
    }
}

/// The element tree of one frame.
#[derive(Debug, Default)]
pub struct ElementTree {
    elements: Vec<Element>,
    children: Vec<usize>,
    pending: Vec<usize>,
    open: Vec<usize>,
    /// Depth of open elements dropped after the capacity was hit.
    skipped: usize,
    capacity: usize,
}

impl ElementTree {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Forget the previous frame's tree. Storage is kept.
    pub fn reset(&mut self) {
        self.elements.clear();
        self.children.clear();
        self.pending.clear();
        self.open.clear();
        self.skipped = 0;
    }

    /// Open a new element under the current top of the stack, or as the
    /// root when nothing is open.
    ///
    /// Once the capacity is reached the element is recorded as skipped:
    /// `Ok(None)` is returned for descendants of a skipped element and the
    /// capacity error for the first one. Either way a matching
    /// [`close`](Self::close) is expected.
    pub fn open(&mut self) -> Result<Option<usize>> {
        if self.skipped > 0 {
            self.skipped += 1;
            return Ok(None);
        }
        if self.elements.len() >= self.capacity {
            self.skipped = 1;
            return Err(Error::ElementCapacityExceeded {
                capacity: self.capacity,
            });
        }

        let index = self.elements.len();
        let element = match self.open.last().copied() {
            Some(parent_index) => {
                let parent = &mut self.elements[parent_index];
                let ordinal = parent.child_count;
                parent.child_count += 1;
                let id = hash_ordinal(ordinal, parent.id.id);
                Element::new(id, Some(parent_index), ordinal, parent.depth + 1)
            }
            None => Element::new(hash_id("Root", 0, 0), None, 0, 0),
        };

        if element.parent.is_some() {
            self.pending.push(index);
        }
        self.elements.push(element);
        self.open.push(index);
        Ok(Some(index))
    }

    /// Close the top of the stack and finalize its child list.
    pub fn close(&mut self) -> Result<Option<usize>> {
        if self.skipped > 0 {
            self.skipped -= 1;
            return Ok(None);
        }
        let index = self.open.pop().ok_or(Error::UnbalancedClose)?;

        let count = self.elements[index].child_count as usize;
        let split = self.pending.len() - count;
        let start = self.children.len();
        self.children.extend(self.pending.drain(split..));
        self.elements[index].child_start = start;
        Ok(Some(index))
    }

    /// Replace the positional id of the open element.
    pub fn set_id(&mut self, id: ElementId) -> Result<()> {
        let Some(element) = self.current_mut()? else {
            return Ok(());
        };
        element.id = id;
        element.explicit_id = true;
        Ok(())
    }

    /// Record that a config of `kind` in arena slot `slot` belongs to the
    /// open element. One record per category.
    pub fn attach(&mut self, kind: ConfigKind, slot: u32) -> Result<()> {
        let index = match self.current() {
            Some(index) => index,
            None if self.skipped > 0 => return Ok(()),
            None => return Err(Error::NoOpenElement),
        };
        let element = &mut self.elements[index];
        if element.kinds.contains(kind) {
            return Err(Error::DuplicateConfig {
                kind: kind.name(),
                element: index,
            });
        }
        element.kinds |= kind;
        element.slots[kind.slot()] = slot;
        Ok(())
    }

    /// Set the text content of the open element.
    pub fn set_text(&mut self, text: TextSource) -> Result<()> {
        if let Some(element) = self.current_mut()? {
            element.text = Some(text);
        }
        Ok(())
    }

    fn current_mut(&mut self) -> Result<Option<&mut Element>> {
        if self.skipped > 0 {
            return Ok(None);
        }
        let index = *self.open.last().ok_or(Error::NoOpenElement)?;
        Ok(Some(&mut self.elements[index]))
    }

    /// Index of the open element, `None` while nothing is open or the
    /// open element was skipped.
    pub fn current(&self) -> Option<usize> {
        if self.skipped > 0 {
            return None;
        }
        self.open.last().copied()
    }

    /// Open elements, skipped ones included.
    pub fn depth(&self) -> usize {
        self.open.len() + self.skipped
    }

    pub fn is_skipping(&self) -> bool {
        self.skipped > 0
    }

    /// Verify every open was closed.
    pub fn finish(&self) -> Result<()> {
        match self.depth() {
            0 => Ok(()),
            open => Err(Error::UnclosedElements { open }),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.elements.get(index)
    }

    /// Children of a closed element, in declaration order.
    pub fn children(&self, index: usize) -> &[usize] {
        match self.elements.get(index) {
            Some(e) => {
                let end = e.child_start + e.child_count as usize;
                self.children.get(e.child_start..end).unwrap_or(&[])
            }
            None => &[],
        }
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
