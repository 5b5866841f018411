//! Atomic deletion guard.
//!
//! Deletion requests are expanded so a committed mention token is always
//! removed whole: a backspace right after a token, a forward delete right
//! before one, or a selection that clips one.

use std::ops::Range;

use crate::editable::{EditorSurface, SelectionRange};

/// Grow `range` to cover every mention run it touches
pub fn expand_deletion<S: EditorSurface + ?Sized>(surface: &S, range: Range<usize>) -> Range<usize> {
    if range.is_empty() {
        return range;
    }
    let mut start = range.start;
    let mut end = range.end.min(surface.get_length());
    if start >= end {
        return start..start;
    }

    if let Some(span) = surface.mention_span_at(start) {
        start = start.min(span.range.start);
    }
    if let Some(span) = surface.mention_span_at(end - 1) {
        end = end.max(span.range.end);
    }

    if (start..end) != range {
        tracing::debug!(requested = ?range, expanded = ?(start..end), "deletion expanded to whole token");
    }
    start..end
}

/// Range removed by a backspace with `selection`, `None` at document start
pub fn backspace_range<S: EditorSurface + ?Sized>(
    surface: &S,
    selection: SelectionRange,
) -> Option<Range<usize>> {
    if !selection.is_caret() {
        return Some(expand_deletion(surface, selection.range()));
    }
    let caret = selection.index.min(surface.get_length());
    if caret == 0 {
        return None;
    }
    Some(expand_deletion(surface, caret - 1..caret))
}

/// Range removed by a forward delete with `selection`, `None` at document end
pub fn forward_delete_range<S: EditorSurface + ?Sized>(
    surface: &S,
    selection: SelectionRange,
) -> Option<Range<usize>> {
    if !selection.is_caret() {
        return Some(expand_deletion(surface, selection.range()));
    }
    let caret = selection.index;
    if caret >= surface.get_length() {
        return None;
    }
    Some(expand_deletion(surface, caret..caret + 1))
}
