//! Mention-aware composition core
//!
//! Detects `@`/`@@`/`@@@` mention contexts while the user edits, tracks the
//! evolving search, and commits chosen candidates as atomic tokens.
//!
//! ## Architecture
//!
//! ```text
//! ChangeEvent → MentionState::on_change (TriggerSet::match_before first)
//!             → SessionEvent::{Opened, SearchChanged}
//!             → SuggestionState::request → Cmd::ResolveSuggestions
//!             → (SuggestionWorker) → Msg::SuggestionsResolved
//!             → SuggestionState::apply (identity checked)
//! accept      → commit_candidate → one programmatic EditOperation
//! backspace   → guard::backspace_range → whole-token delete
//! ```

mod commit;
pub mod guard;
mod kind;
mod resolver;
mod session;
mod suggestions;
mod trigger;

pub use commit::{commit_candidate, commit_operation, CommitOutcome, CommitPlan};
pub use kind::{MentionKind, MentionRef, UnknownKind};
pub use resolver::{
    CachedResolver, DirectoryResolver, ResolveError, ResolverRegistry, SuggestionResolver,
    SuggestionWorker,
};
pub use session::{CancelReason, MentionSession, MentionState, SessionEvent, SessionKey};
pub use suggestions::{Candidate, ResolveRequest, ResolveTicket, SuggestionState};
pub use trigger::{Trigger, TriggerMatch, TriggerSet};
