//! Selection range (`{ index, length }`) as reported by the surface.

use std::ops::Range;

/// A selection as a start offset and a length, both in chars.
/// A zero-length selection is a caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    pub index: usize,
    pub length: usize,
}

impl SelectionRange {
    pub const fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }

    /// Collapsed selection (caret)
    pub const fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }

    pub fn is_caret(&self) -> bool {
        self.length == 0
    }

    pub fn end(&self) -> usize {
        self.index + self.length
    }

    pub fn range(&self) -> Range<usize> {
        self.index..self.end()
    }

    /// Clamp to a document of `len` chars
    pub fn clamp(self, len: usize) -> Self {
        let index = self.index.min(len);
        let end = self.end().min(len);
        Self::new(index, end - index)
    }
}
