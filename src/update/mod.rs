//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions.

mod composer;
mod suggestion;
mod text_edit;

use crate::commands::Cmd;
use crate::editable::EditorSurface;
use crate::messages::Msg;
use crate::model::ComposerModel;

#[cfg(debug_assertions)]
use crate::tracing::SessionSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use composer::{attach, clear_submit_failure, detach, load, submit, submit_finished};
pub use suggestion::{accept, apply_resolved, apply_session_event, update_suggestion};
pub use text_edit::{update_blur, update_host_change, update_selection, update_text_edit};

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update<S: EditorSurface>(model: &mut ComposerModel<S>, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner<S: EditorSurface>(model: &mut ComposerModel<S>, msg: Msg) -> Option<Cmd> {
    match msg {
        Msg::Edit(m) => {
            if m.is_editing() {
                composer::clear_submit_failure(model);
            }
            text_edit::update_text_edit(model, m)
        }
        Msg::Suggestion(m) => suggestion::update_suggestion(model, m),
        Msg::SuggestionsResolved { ticket, candidates } => {
            suggestion::apply_resolved(model, &ticket, candidates)
        }
        Msg::HostChange(event) => text_edit::update_host_change(model, event),
        Msg::SelectionChanged(selection) => text_edit::update_selection(model, selection),
        Msg::Blur => text_edit::update_blur(model),
        Msg::Load(markdown) => composer::load(model, &markdown),
        Msg::Attach(attachment) => composer::attach(model, attachment),
        Msg::Detach(index) => composer::detach(model, index),
        Msg::Submit => composer::submit(model),
        Msg::SubmitFinished(result) => composer::submit_finished(model, result),
    }
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after session state and logs diffs for debugging.
#[cfg(debug_assertions)]
fn update_traced<S: EditorSurface>(model: &mut ComposerModel<S>, msg: Msg) -> Option<Cmd> {
    let msg_name = msg.name();
    let _span = span!(Level::DEBUG, "update", msg = %msg_name).entered();

    let before = SessionSnapshot::capture(&model.mention, &model.suggestions);
    debug!(target: "message", msg = %msg_name, "processing");

    let result = update_inner(model, msg);

    let after = SessionSnapshot::capture(&model.mention, &model.suggestions);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "session", %diff, "state changed");
    }

    model.assert_invariants_with_context(&msg_name);
    result
}
