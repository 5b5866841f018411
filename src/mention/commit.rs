//! Token committer: replaces the trigger and search text with an atomic
//! mention run in one programmatic edit.

use crate::editable::{ChangeEvent, ChangeSource, EditOperation, EditorSurface, RunAttributes};
use crate::util::char_len;

use super::kind::MentionRef;
use super::session::{MentionSession, MentionState};
use super::suggestions::{Candidate, SuggestionState};

/// What a commit did to the surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub event: ChangeEvent,
    pub mention: MentionRef,
    /// Caret after the separator, or after the token when an existing
    /// newline separates it
    pub caret: usize,
    /// A just-typed newline after the token was consumed
    pub collapsed_newline: bool,
}

/// Label text for the mention run (never empty, single line)
fn run_label(candidate: &Candidate) -> String {
    let label = if candidate.label.trim().is_empty() {
        &candidate.id
    } else {
        &candidate.label
    };
    label.replace(['\n', '\r'], " ")
}

/// The edit a commit will make
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    pub operation: EditOperation,
    pub mention: MentionRef,
    /// Caret once the operation is applied
    pub caret: usize,
    pub collapsed_newline: bool,
}

/// Build the single operation that turns the session's span into a token.
///
/// The operation deletes trigger and search and inserts the label as one
/// mention run. A space follows the run unless a newline already does:
/// a newline the user just typed (caret sits after it) is replaced by the
/// space, an older one is left as the separator.
pub fn commit_operation<S: EditorSurface + ?Sized>(
    surface: &S,
    session: &MentionSession,
    candidate: &Candidate,
) -> CommitPlan {
    let mention = MentionRef::new(session.trigger.kind(), candidate.id.clone());
    let start = session.span_start();
    let span_end = session.span_end();
    let label = run_label(candidate);
    let token_end = start + char_len(&label);

    let newline_follows = surface.char_at(span_end) == Some('\n');
    let caret = surface.get_selection().map(|s| s.end());
    let collapse = newline_follows && caret == Some(span_end + 1);

    let mut operation = EditOperation::new()
        .retain(start)
        .delete(span_end - start)
        .insert_with(label, RunAttributes::mention(mention.clone()));
    let caret = if collapse {
        operation = operation.insert(" ").delete(1);
        token_end + 1
    } else if newline_follows {
        token_end
    } else {
        operation = operation.insert(" ");
        token_end + 1
    };

    CommitPlan {
        operation,
        mention,
        caret,
        collapsed_newline: collapse,
    }
}

/// Commit `candidate` for the open session.
///
/// Clears the session and resets the highlighted index. Returns `None`
/// when no session is open.
pub fn commit_candidate<S: EditorSurface + ?Sized>(
    surface: &mut S,
    state: &mut MentionState,
    suggestions: &mut SuggestionState,
    candidate: &Candidate,
) -> Option<CommitOutcome> {
    let session = state.session()?.clone();
    let CommitPlan {
        operation,
        mention,
        caret,
        collapsed_newline,
    } = commit_operation(&*surface, &session, candidate);

    let mut event = surface.apply(operation, ChangeSource::Api);
    surface.set_selection(caret);
    event.selection = surface.get_selection();

    state.reset();
    suggestions.clear();

    tracing::debug!(
        reference = %mention.to_reference(),
        caret,
        collapsed_newline,
        "mention committed"
    );
    Some(CommitOutcome {
        event,
        mention,
        caret,
        collapsed_newline,
    })
}
