//! The host rich-text editing surface.
//!
//! [`EditorSurface`] is the narrow interface the mention core consumes:
//! read-only text/format/selection queries plus programmatic edit
//! primitives. Every mutating call returns exactly one [`ChangeEvent`].
//!
//! [`RichTextBuffer`] is the in-process implementation used by the composer,
//! the CLI and the tests.

use super::document::{Document, MentionSpan, RunAttributes};
use super::history::{EditHistory, HistoryEntry};
use super::operation::EditOperation;
use super::selection::SelectionRange;

/// Who caused a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// Keystrokes, paste, undo/redo
    User,
    /// Programmatic edits (token commit, deletion guard, load)
    Api,
}

/// Change notification payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub operation: EditOperation,
    pub source: ChangeSource,
    /// Selection after the change
    pub selection: Option<SelectionRange>,
}

/// Read and edit primitives of the host editor.
pub trait EditorSurface {
    /// Total length in chars
    fn get_length(&self) -> usize;

    /// Text slice (clamped)
    fn get_text(&self, offset: usize, length: usize) -> String;

    /// Char at `offset`, None if out of bounds
    fn char_at(&self, offset: usize) -> Option<char> {
        self.get_text(offset, 1).chars().next()
    }

    /// Current selection, `None` when the surface has no focus
    fn get_selection(&self) -> Option<SelectionRange>;

    /// Collapse the selection to a caret at `offset`
    fn set_selection(&mut self, offset: usize);

    /// Select a range; surfaces without range selection place the caret
    /// at its end
    fn select_range(&mut self, selection: SelectionRange) {
        self.set_selection(selection.end());
    }

    /// Attributes common to `[offset, offset + length)`
    fn get_format(&self, offset: usize, length: usize) -> RunAttributes;

    /// The mention run containing the char at `offset`
    fn mention_span_at(&self, offset: usize) -> Option<MentionSpan>;

    /// The whole document (for encoding)
    fn document(&self) -> &Document;

    /// Apply one operation atomically
    fn apply(&mut self, operation: EditOperation, source: ChangeSource) -> ChangeEvent;

    /// Replace the whole content
    fn set_contents(&mut self, document: Document, source: ChangeSource) -> ChangeEvent;

    fn insert_text(
        &mut self,
        offset: usize,
        text: &str,
        attributes: RunAttributes,
        source: ChangeSource,
    ) -> ChangeEvent {
        self.apply(EditOperation::insert_at(offset, text, attributes), source)
    }

    fn delete_text(&mut self, offset: usize, length: usize, source: ChangeSource) -> ChangeEvent {
        self.apply(EditOperation::delete_at(offset, length), source)
    }

    /// Undo the last change, if the host keeps history
    fn undo(&mut self) -> Option<ChangeEvent> {
        None
    }

    /// Redo the last undone change, if the host keeps history
    fn redo(&mut self) -> Option<ChangeEvent> {
        None
    }
}

/// In-process rich-text surface: a [`Document`], a selection and history.
#[derive(Debug, Clone)]
pub struct RichTextBuffer {
    document: Document,
    selection: Option<SelectionRange>,
    history: EditHistory,
}

impl RichTextBuffer {
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Create a focused buffer with the caret at the end of `document`
    pub fn with_document(document: Document) -> Self {
        let end = document.len_chars();
        Self {
            document,
            selection: Some(SelectionRange::caret(end)),
            history: EditHistory::new(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::with_document(Document::from_text(text))
    }

    pub fn text(&self) -> String {
        self.document.text()
    }

    /// Select a range (`None` drops focus)
    pub fn set_selection_range(&mut self, selection: Option<SelectionRange>) {
        let len = self.document.len_chars();
        self.selection = selection.map(|sel| sel.clamp(len));
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn replay(&mut self, entry: HistoryEntry) -> ChangeEvent {
        let operation = entry.inverse.apply(&mut self.document);
        self.set_selection_range(entry.selection_before);
        ChangeEvent {
            operation,
            source: ChangeSource::User,
            selection: self.selection,
        }
    }
}

impl Default for RichTextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSurface for RichTextBuffer {
    fn get_length(&self) -> usize {
        self.document.len_chars()
    }

    fn get_text(&self, offset: usize, length: usize) -> String {
        self.document.slice(offset..offset.saturating_add(length))
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.document.char_at(offset)
    }

    fn get_selection(&self) -> Option<SelectionRange> {
        self.selection
    }

    fn set_selection(&mut self, offset: usize) {
        self.selection = Some(SelectionRange::caret(offset.min(self.get_length())));
    }

    fn select_range(&mut self, selection: SelectionRange) {
        self.set_selection_range(Some(selection));
    }

    fn get_format(&self, offset: usize, length: usize) -> RunAttributes {
        self.document.format(offset..offset.saturating_add(length))
    }

    fn mention_span_at(&self, offset: usize) -> Option<MentionSpan> {
        self.document.mention_span_at(offset)
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn apply(&mut self, operation: EditOperation, source: ChangeSource) -> ChangeEvent {
        let selection_before = self.selection;
        let before = self.document.clone();
        let operation = operation.apply(&mut self.document);
        let inverse = operation.invert(&before);

        let len = self.document.len_chars();
        self.selection = selection_before.map(|sel| {
            let head = operation.transform_offset(sel.end());
            SelectionRange::caret(head.min(len))
        });

        if !operation.is_noop() {
            self.history.push(HistoryEntry::new(
                operation.clone(),
                inverse,
                selection_before,
                self.selection,
            ));
        }

        tracing::trace!(?source, ?operation, "surface change");
        ChangeEvent {
            operation,
            source,
            selection: self.selection,
        }
    }

    fn set_contents(&mut self, document: Document, source: ChangeSource) -> ChangeEvent {
        let old_len = self.document.len_chars();
        let mut operation = EditOperation::new().delete(old_len);
        for run in document.runs() {
            operation = operation.insert_with(run.text, run.attributes);
        }
        self.document = document;
        self.history.clear();
        let end = self.document.len_chars();
        self.selection = Some(SelectionRange::caret(end));
        ChangeEvent {
            operation,
            source,
            selection: self.selection,
        }
    }

    fn undo(&mut self) -> Option<ChangeEvent> {
        let entry = self.history.pop_undo()?;
        Some(self.replay(entry))
    }

    fn redo(&mut self) -> Option<ChangeEvent> {
        let entry = self.history.pop_redo()?;
        Some(self.replay(entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editable::TextRun;
    use crate::mention::{MentionKind, MentionRef};

    #[test]
    fn test_insert_moves_caret_past_text() {
        let mut buf = RichTextBuffer::from_text("hello");
        let event = buf.insert_text(5, " world", RunAttributes::plain(), ChangeSource::User);
        assert_eq!(buf.text(), "hello world");
        assert_eq!(event.selection, Some(SelectionRange::caret(11)));
        assert_eq!(event.source, ChangeSource::User);
    }

    #[test]
    fn test_delete_moves_caret_back() {
        let mut buf = RichTextBuffer::from_text("hello");
        let event = buf.delete_text(4, 1, ChangeSource::User);
        assert_eq!(buf.text(), "hell");
        assert_eq!(event.selection, Some(SelectionRange::caret(4)));
    }

    #[test]
    fn test_get_text_and_format() {
        let buf = RichTextBuffer::with_document(Document::from_runs([
            TextRun::plain("Hi "),
            TextRun::mention("Tim", MentionRef::new(MentionKind::User, "u1")),
        ]));
        assert_eq!(buf.get_text(3, 3), "Tim");
        assert_eq!(buf.get_text(4, 100), "im");
        assert!(buf.get_format(6, 0).is_mention());
        assert_eq!(buf.char_at(0), Some('H'));
        assert_eq!(buf.char_at(6), None);
    }

    #[test]
    fn test_multi_step_operation_is_one_undo_step() {
        let mut buf = RichTextBuffer::from_text("Hi @ti");
        let op = EditOperation::new()
            .retain(3)
            .delete(3)
            .insert_with(
                "Tim",
                RunAttributes::mention(MentionRef::new(MentionKind::User, "u1")),
            )
            .insert(" ");
        buf.apply(op, ChangeSource::Api);
        assert_eq!(buf.text(), "Hi Tim ");

        let event = buf.undo().unwrap();
        assert_eq!(buf.text(), "Hi @ti");
        assert_eq!(event.selection, Some(SelectionRange::caret(6)));
        assert!(!buf.can_undo());

        buf.redo().unwrap();
        assert_eq!(buf.text(), "Hi Tim ");
        assert!(buf.document().mention_span_at(3).is_some());
    }

    #[test]
    fn test_delete_inside_token_reports_whole_token() {
        let runs = [
            TextRun::plain("Hi "),
            TextRun::mention("Tim", MentionRef::new(MentionKind::User, "u1")),
            TextRun::plain(" x"),
        ];
        let mut buf = RichTextBuffer::with_document(Document::from_runs(runs.clone()));
        buf.set_selection(5);

        let event = buf.delete_text(4, 1, ChangeSource::User);
        assert_eq!(buf.text(), "Hi  x");
        assert_eq!(event.operation, EditOperation::delete_at(3, 3));
        assert_eq!(event.selection, Some(SelectionRange::caret(3)));

        buf.undo().unwrap();
        assert_eq!(buf.document().runs(), runs.to_vec());
        assert_eq!(buf.document().mention_span_at(4).unwrap().range, 3..6);
    }

    #[test]
    fn test_set_contents_resets_history_and_caret() {
        let mut buf = RichTextBuffer::from_text("abc");
        buf.insert_text(3, "d", RunAttributes::plain(), ChangeSource::User);
        buf.set_contents(Document::from_text("xyz!"), ChangeSource::Api);
        assert_eq!(buf.text(), "xyz!");
        assert_eq!(buf.get_selection(), Some(SelectionRange::caret(4)));
        assert!(!buf.can_undo());
    }
}
