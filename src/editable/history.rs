//! Edit history (undo/redo) for the rich-text surface.
//!
//! Every applied [`EditOperation`] is one entry, so a programmatic edit made
//! of several steps (a mention commit) is undone in a single step.

use super::operation::EditOperation;
use super::selection::SelectionRange;

/// A single applied operation that can be undone/redone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// The operation as applied
    pub operation: EditOperation,
    /// Operation that reverts `operation`
    pub inverse: EditOperation,
    /// Selection before the edit
    pub selection_before: Option<SelectionRange>,
    /// Selection after the edit
    pub selection_after: Option<SelectionRange>,
}

impl HistoryEntry {
    pub fn new(
        operation: EditOperation,
        inverse: EditOperation,
        selection_before: Option<SelectionRange>,
        selection_after: Option<SelectionRange>,
    ) -> Self {
        Self {
            operation,
            inverse,
            selection_before,
            selection_after,
        }
    }

    /// Get the inverse entry for undo
    pub fn inverse(&self) -> Self {
        Self {
            operation: self.inverse.clone(),
            inverse: self.operation.clone(),
            selection_before: self.selection_after,
            selection_after: self.selection_before,
        }
    }
}

/// Edit history with undo/redo stacks.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
    max_size: usize,
}

impl EditHistory {
    /// Create a new edit history with default max size
    pub fn new() -> Self {
        Self::with_max_size(1000)
    }

    /// Create a new edit history with specified max size
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size,
        }
    }

    /// Push an entry onto the undo stack (clears redo stack)
    pub fn push(&mut self, entry: HistoryEntry) {
        self.redo_stack.clear();
        self.undo_stack.push(entry);

        while self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
    }

    /// Pop an entry from the undo stack (moves its inverse to the redo stack)
    pub fn pop_undo(&mut self) -> Option<HistoryEntry> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(entry.inverse());
        Some(entry)
    }

    /// Pop an entry from the redo stack (moves its inverse to the undo stack)
    pub fn pop_redo(&mut self) -> Option<HistoryEntry> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(entry.inverse());
        Some(entry)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
