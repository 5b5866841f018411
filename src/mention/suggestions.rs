//! Candidate list and selection index owned alongside the session.

use serde::{Deserialize, Serialize};

use super::kind::MentionKind;
use super::session::{MentionSession, SessionKey};

/// A suggested entity returned by a resolver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            detail: None,
            avatar_url: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Identifies the session and search a resolution was requested for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolveTicket {
    pub session: SessionKey,
    /// Monotonic request number
    pub seq: u64,
    pub query: String,
}

/// Work item for a resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub ticket: ResolveTicket,
    pub kind: MentionKind,
}

/// Latest applied candidate list plus the highlighted index
#[derive(Debug, Clone)]
pub struct SuggestionState {
    candidates: Vec<Candidate>,
    selected: usize,
    max_displayed: usize,
    next_seq: u64,
    applied_seq: u64,
    pending: Option<ResolveTicket>,
}

impl SuggestionState {
    pub fn new(max_displayed: usize) -> Self {
        Self {
            candidates: Vec::new(),
            selected: 0,
            max_displayed: max_displayed.max(1),
            next_seq: 1,
            applied_seq: 0,
            pending: None,
        }
    }

    /// Issue a ticket for the session's current search.
    ///
    /// A new search resets the highlight to the first row.
    pub fn request(&mut self, session: &MentionSession) -> ResolveRequest {
        let ticket = ResolveTicket {
            session: session.key(),
            seq: self.next_seq,
            query: session.search_text.clone(),
        };
        self.next_seq += 1;
        self.selected = 0;
        self.pending = Some(ticket.clone());
        ResolveRequest {
            ticket,
            kind: session.trigger.kind(),
        }
    }

    /// Apply a resolver result if it still belongs to `current`.
    ///
    /// Returns false for stale results: another session (even one with the
    /// same trigger and anchor), another search, or an older request than
    /// the last one applied.
    pub fn apply(
        &mut self,
        ticket: &ResolveTicket,
        candidates: Vec<Candidate>,
        current: Option<&MentionSession>,
    ) -> bool {
        let Some(session) = current else {
            tracing::trace!(seq = ticket.seq, "dropping result: no session");
            return false;
        };
        if ticket.session != session.key()
            || ticket.query != session.search_text
            || ticket.seq <= self.applied_seq
        {
            tracing::trace!(seq = ticket.seq, query = %ticket.query, "dropping stale result");
            return false;
        }

        self.applied_seq = ticket.seq;
        if self.pending.as_ref().is_some_and(|p| p.seq <= ticket.seq) {
            self.pending = None;
        }
        self.candidates = candidates;
        if self.selected >= self.displayed().len() {
            self.selected = 0;
        }
        true
    }

    /// Candidates capped to the display count
    pub fn displayed(&self) -> &[Candidate] {
        let n = self.candidates.len().min(self.max_displayed);
        &self.candidates[..n]
    }

    /// Every candidate of the last applied result
    pub fn all(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// A request is outstanding and nothing newer has been applied
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&Candidate> {
        self.displayed().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.displayed().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn select_prev(&mut self) {
        let len = self.displayed().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Highlight a displayed row; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.displayed().len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    /// Drop the list (session closed). Sequence numbers keep counting.
    pub fn clear(&mut self) {
        self.candidates.clear();
        self.selected = 0;
        self.pending = None;
    }
}

impl Default for SuggestionState {
    fn default() -> Self {
        Self::new(5)
    }
}
