//! Suggestion list handlers: navigation, commit and resolver results

use crate::commands::Cmd;
use crate::editable::EditorSurface;
use crate::messages::SuggestionMsg;
use crate::mention::{commit_candidate, Candidate, ResolveTicket, SessionEvent};
use crate::model::ComposerModel;

/// Handle suggestion list messages
pub fn update_suggestion<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    msg: SuggestionMsg,
) -> Option<Cmd> {
    match msg {
        SuggestionMsg::Next => {
            if !model.suggestions_visible() {
                return None;
            }
            model.suggestions.select_next();
            Some(Cmd::Redraw)
        }
        SuggestionMsg::Prev => {
            if !model.suggestions_visible() {
                return None;
            }
            model.suggestions.select_prev();
            Some(Cmd::Redraw)
        }
        SuggestionMsg::Accept => accept(model),
        SuggestionMsg::AcceptIndex(index) => {
            if !model.suggestions_visible() || !model.suggestions.select(index) {
                return None;
            }
            accept(model)
        }
        SuggestionMsg::Dismiss => {
            model.mention.reset()?;
            model.suggestions.clear();
            Some(Cmd::Redraw)
        }
    }
}

/// Commit the highlighted candidate for the open session
pub fn accept<S: EditorSurface>(model: &mut ComposerModel<S>) -> Option<Cmd> {
    let candidate = model.suggestions.selected()?.clone();
    commit_candidate(
        &mut model.surface,
        &mut model.mention,
        &mut model.suggestions,
        &candidate,
    )?;
    Some(Cmd::Redraw)
}

/// Apply a resolver result; stale results are dropped without a redraw
pub fn apply_resolved<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    ticket: &ResolveTicket,
    candidates: Vec<Candidate>,
) -> Option<Cmd> {
    if model
        .suggestions
        .apply(ticket, candidates, model.mention.session())
    {
        Some(Cmd::Redraw)
    } else {
        None
    }
}

/// Turn a session transition into the commands it needs.
///
/// Every new search issues a fresh ticket; a closed session drops the list.
pub fn apply_session_event<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    event: SessionEvent,
) -> Cmd {
    match event {
        SessionEvent::Opened | SessionEvent::SearchChanged => {
            if event == SessionEvent::Opened {
                // Rows from an earlier session must not flash under the new one
                model.suggestions.clear();
            }
            match model.mention.session() {
                Some(session) => {
                    let request = model.suggestions.request(session);
                    Cmd::batch(vec![Cmd::Redraw, Cmd::ResolveSuggestions(request)])
                }
                None => Cmd::Redraw,
            }
        }
        SessionEvent::Cancelled(_) => {
            model.suggestions.clear();
            Cmd::Redraw
        }
        SessionEvent::Unchanged => Cmd::Redraw,
    }
}
