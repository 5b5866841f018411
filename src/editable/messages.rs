//! Keystroke-level message types for the comment surface.

use super::document::LineFormat;

/// Target for caret movement operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveTarget {
    /// Move one character left (a mention token counts as one character)
    Left,
    /// Move one character right (a mention token counts as one character)
    Right,
    /// Move one line up
    Up,
    /// Move one line down
    Down,
    /// Move to start of line
    LineStart,
    /// Move to end of line
    LineEnd,
    /// Move to start of document
    DocumentStart,
    /// Move to end of document
    DocumentEnd,
}

/// Text editing messages delivered to the composer.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEditMsg {
    // === Movement ===
    /// Move caret (collapses any selection)
    Move(MoveTarget),
    /// Place the caret (mouse click)
    SetCaret(usize),
    /// Select a range (mouse drag)
    Select { index: usize, length: usize },

    // === Insertion ===
    /// Insert a single character
    InsertChar(char),
    /// Insert a string (paste)
    InsertText(String),
    /// Insert a newline, or accept the highlighted suggestion
    InsertNewline,

    // === Deletion ===
    /// Delete character (or whole mention token) before caret
    DeleteBackward,
    /// Delete character (or whole mention token) after caret
    DeleteForward,

    // === Line formats ===
    /// Set or clear the block format of the caret line
    SetLineFormat(Option<LineFormat>),
    /// Flip the checked state of the checklist item on the caret line
    ToggleChecklist,

    // === Undo/Redo ===
    Undo,
    Redo,
}

impl TextEditMsg {
    /// Check if this message modifies the buffer
    pub fn is_editing(&self) -> bool {
        matches!(
            self,
            TextEditMsg::InsertChar(_)
                | TextEditMsg::InsertText(_)
                | TextEditMsg::InsertNewline
                | TextEditMsg::DeleteBackward
                | TextEditMsg::DeleteForward
                | TextEditMsg::SetLineFormat(_)
                | TextEditMsg::ToggleChecklist
                | TextEditMsg::Undo
                | TextEditMsg::Redo
        )
    }
}
