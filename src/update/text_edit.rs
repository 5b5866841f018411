//! Text editing update handler.
//!
//! Applies keystroke-level messages to the surface, keeps mention tokens
//! atomic for caret movement and deletion, and feeds every resulting change
//! notification to the mention session.

use crate::commands::Cmd;
use crate::editable::{
    ChangeEvent, ChangeSource, Document, EditOperation, EditorSurface, LineFormat, MoveTarget,
    RunAttributes, SelectionRange, TextEditMsg,
};
use crate::mention::guard;
use crate::model::ComposerModel;

use super::suggestion::{accept, apply_session_event};

/// Handle a TextEditMsg against the composer surface
pub fn update_text_edit<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    msg: TextEditMsg,
) -> Option<Cmd> {
    match msg {
        // === Movement ===
        TextEditMsg::Move(target) => move_caret(model, target),
        TextEditMsg::SetCaret(offset) => {
            let offset = snap_out_of_token(&model.surface, offset.min(model.surface.get_length()));
            model.surface.set_selection(offset);
            let selection = model.surface.get_selection();
            update_selection(model, selection)
        }
        TextEditMsg::Select { index, length } => {
            let clamped = SelectionRange::new(index, length).clamp(model.surface.get_length());
            let range = model.document().atomic_range(clamped.range());
            model
                .surface
                .select_range(SelectionRange::new(range.start, range.len()));
            let selection = model.surface.get_selection();
            update_selection(model, selection)
        }

        // === Insertion ===
        TextEditMsg::InsertChar('\t') if model.suggestions_visible() => accept(model),
        TextEditMsg::InsertChar(ch) => insert(model, &ch.to_string(), RunAttributes::plain()),
        TextEditMsg::InsertText(text) => insert(model, &text, RunAttributes::plain()),
        TextEditMsg::InsertNewline => {
            if model.suggestions_visible() {
                return accept(model);
            }
            // The new line continues the block format of the caret line
            let caret = model.surface.get_selection()?.index;
            let attributes = match model.line_format_at(caret) {
                Some(format) => RunAttributes::line(format),
                None => RunAttributes::plain(),
            };
            insert(model, "\n", attributes)
        }

        // === Deletion ===
        TextEditMsg::DeleteBackward => {
            let selection = model.surface.get_selection()?;
            let range = guard::backspace_range(&model.surface, selection)?;
            delete(model, range)
        }
        TextEditMsg::DeleteForward => {
            let selection = model.surface.get_selection()?;
            let range = guard::forward_delete_range(&model.surface, selection)?;
            delete(model, range)
        }

        // === Line formats ===
        TextEditMsg::SetLineFormat(format) => set_line_format(model, format),
        TextEditMsg::ToggleChecklist => {
            let caret = model.caret()?;
            match model.line_format_at(caret) {
                Some(LineFormat::Checklist { checked }) => {
                    set_line_format(model, Some(LineFormat::Checklist { checked: !checked }))
                }
                _ => None,
            }
        }

        // === Undo/Redo ===
        TextEditMsg::Undo => {
            let event = model.surface.undo()?;
            after_change(model, &event)
        }
        TextEditMsg::Redo => {
            let event = model.surface.redo()?;
            after_change(model, &event)
        }
    }
}

/// Handle a change the host surface applied itself.
///
/// A newline typed right after the session span while the list is up is
/// an accept: the commit consumes that newline.
pub fn update_host_change<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    event: ChangeEvent,
) -> Option<Cmd> {
    if event.source == ChangeSource::User && model.suggestions_visible() {
        let accepts = match (event.operation.change_point(), model.mention.session()) {
            (Some(point), Some(session)) => {
                point.deleted == 0 && point.inserted == "\n" && point.offset == session.span_end()
            }
            _ => false,
        };
        if accepts {
            return accept(model);
        }
    }
    after_change(model, &event)
}

/// Re-evaluate the session after a caret move
pub fn update_selection<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    selection: Option<SelectionRange>,
) -> Option<Cmd> {
    let event = model.mention.on_selection_change(&model.surface, selection);
    Some(apply_session_event(model, event))
}

/// Surface lost focus: the session and its list go away
pub fn update_blur<S: EditorSurface>(model: &mut ComposerModel<S>) -> Option<Cmd> {
    let event = model.mention.on_blur();
    Some(apply_session_event(model, event))
}

fn after_change<S: EditorSurface>(model: &mut ComposerModel<S>, event: &ChangeEvent) -> Option<Cmd> {
    let session_event = model.mention.on_change(&model.surface, event);
    Some(apply_session_event(model, session_event))
}

fn insert<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    text: &str,
    attributes: RunAttributes,
) -> Option<Cmd> {
    let selection = model.surface.get_selection()?;
    let event = if selection.is_caret() {
        model
            .surface
            .insert_text(selection.index, text, attributes, ChangeSource::User)
    } else {
        // Typing over a selection replaces it in one change
        let range = model.document().atomic_range(selection.range());
        let operation = EditOperation::replace_at(range.start, range.len(), text, attributes);
        model.surface.apply(operation, ChangeSource::User)
    };
    after_change(model, &event)
}

fn delete<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    range: std::ops::Range<usize>,
) -> Option<Cmd> {
    if range.is_empty() {
        return None;
    }
    let event = model
        .surface
        .delete_text(range.start, range.len(), ChangeSource::User);
    after_change(model, &event)
}

/// Rewrite the terminator of the caret line with `format`
fn set_line_format<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    format: Option<LineFormat>,
) -> Option<Cmd> {
    let caret = model.caret()?;
    let bounds = model.document().line_bounds(caret);
    let attributes = RunAttributes {
        line: format,
        ..RunAttributes::default()
    };

    let operation = if model.surface.char_at(bounds.end) == Some('\n') {
        if model.line_format_at(caret) == format {
            return None;
        }
        EditOperation::replace_at(bounds.end, 1, "\n", attributes)
    } else if format.is_some() {
        EditOperation::insert_at(bounds.end, "\n", attributes)
    } else {
        return None;
    };

    model.surface.apply(operation, ChangeSource::Api);
    // Formatting never moves the caret
    model.surface.set_selection(caret);
    let selection = model.surface.get_selection();
    update_selection(model, selection)
}

fn move_caret<S: EditorSurface>(model: &mut ComposerModel<S>, target: MoveTarget) -> Option<Cmd> {
    // Up/Down drive the list while it is shown
    if model.suggestions_visible() {
        match target {
            MoveTarget::Up => {
                model.suggestions.select_prev();
                return Some(Cmd::Redraw);
            }
            MoveTarget::Down => {
                model.suggestions.select_next();
                return Some(Cmd::Redraw);
            }
            _ => {}
        }
    }

    let selection = model.surface.get_selection()?;
    let len = model.surface.get_length();
    let caret = selection.end().min(len);

    let offset = match target {
        MoveTarget::Left if !selection.is_caret() => selection.index,
        MoveTarget::Right if !selection.is_caret() => caret,
        MoveTarget::Left => {
            if caret == 0 {
                0
            } else {
                // A token counts as one character
                match model.surface.mention_span_at(caret - 1) {
                    Some(span) => span.range.start,
                    None => caret - 1,
                }
            }
        }
        MoveTarget::Right => {
            if caret >= len {
                len
            } else {
                match model.surface.mention_span_at(caret) {
                    Some(span) => span.range.end,
                    None => caret + 1,
                }
            }
        }
        MoveTarget::Up => vertical_target(model.document(), caret, false),
        MoveTarget::Down => vertical_target(model.document(), caret, true),
        MoveTarget::LineStart => model.document().line_bounds(caret).start,
        MoveTarget::LineEnd => model.document().line_bounds(caret).end,
        MoveTarget::DocumentStart => 0,
        MoveTarget::DocumentEnd => len,
    };

    let offset = snap_out_of_token(&model.surface, offset);
    model.surface.set_selection(offset);
    let selection = model.surface.get_selection();
    update_selection(model, selection)
}

/// Same column on the previous/next line, clamped to that line's length
fn vertical_target(doc: &Document, caret: usize, down: bool) -> usize {
    let line = doc.line_bounds(caret);
    let column = caret - line.start;
    if down {
        if line.end >= doc.len_chars() {
            return doc.len_chars();
        }
        let next = doc.line_bounds(line.end + 1);
        next.start + column.min(next.len())
    } else {
        if line.start == 0 {
            return 0;
        }
        let prev = doc.line_bounds(line.start - 1);
        prev.start + column.min(prev.len())
    }
}

/// An offset strictly inside a token moves to the token's end
fn snap_out_of_token<S: EditorSurface + ?Sized>(surface: &S, offset: usize) -> usize {
    match surface.mention_span_at(offset) {
        Some(span) if span.range.start < offset => span.range.end,
        _ => offset,
    }
}
