//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use crate::commands::Attachment;
use crate::editable::{ChangeEvent, SelectionRange, TextEditMsg};
use crate::mention::{Candidate, ResolveTicket};

/// Suggestion list interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionMsg {
    /// Highlight the next displayed candidate (wraps)
    Next,
    /// Highlight the previous displayed candidate (wraps)
    Prev,
    /// Commit the highlighted candidate
    Accept,
    /// Commit a displayed candidate by row (mouse click)
    AcceptIndex(usize),
    /// Close the session without committing
    Dismiss,
}

/// Top-level message type
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Keystroke-level editing
    Edit(TextEditMsg),
    /// Suggestion list navigation and selection
    Suggestion(SuggestionMsg),
    /// Resolver result for an earlier `Cmd::ResolveSuggestions`
    SuggestionsResolved {
        ticket: ResolveTicket,
        candidates: Vec<Candidate>,
    },
    /// A change the host surface already applied on its own
    HostChange(ChangeEvent),
    /// Caret moved without a text change (host surfaces)
    SelectionChanged(Option<SelectionRange>),
    /// Surface lost focus or closed
    Blur,
    /// Replace the content with a stored comment
    Load(String),
    /// Add a file to the pending submission
    Attach(Attachment),
    /// Drop a pending attachment by index
    Detach(usize),
    /// Encode and hand the comment to the host
    Submit,
    /// Host finished the submission
    SubmitFinished(Result<(), String>),
}

impl Msg {
    /// Short name used for tracing spans
    pub fn name(&self) -> String {
        match self {
            Msg::Edit(m) => format!("Edit::{:?}", m),
            Msg::Suggestion(m) => format!("Suggestion::{:?}", m),
            Msg::SuggestionsResolved { ticket, candidates } => format!(
                "SuggestionsResolved(seq={}, {:?}, {} candidates)",
                ticket.seq,
                ticket.query,
                candidates.len()
            ),
            Msg::HostChange(event) => format!("HostChange({:?})", event.source),
            Msg::SelectionChanged(sel) => format!("SelectionChanged({:?})", sel),
            Msg::Blur => "Blur".to_string(),
            Msg::Load(_) => "Load".to_string(),
            Msg::Attach(a) => format!("Attach({})", a.name),
            Msg::Detach(i) => format!("Detach({})", i),
            Msg::Submit => "Submit".to_string(),
            Msg::SubmitFinished(r) => format!("SubmitFinished(ok={})", r.is_ok()),
        }
    }
}

impl From<TextEditMsg> for Msg {
    fn from(msg: TextEditMsg) -> Self {
        Msg::Edit(msg)
    }
}

impl From<SuggestionMsg> for Msg {
    fn from(msg: SuggestionMsg) -> Self {
        Msg::Suggestion(msg)
    }
}
