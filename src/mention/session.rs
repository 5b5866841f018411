//! Mention session state machine.
//!
//! `MentionState` owns the single nullable [`MentionSession`]. It is a pure
//! function of (current state, change event, surface text): every user edit
//! is run through the trigger matcher first, and only when no competing
//! trigger matches does the open session continue.
//!
//! ```text
//! Idle ──trigger typed on boundary──▶ Active{search}
//! Active ──edit inside span──▶ Active{search'}
//! Active ──whitespace / caret left / trigger broken──▶ Idle
//! Active ──commit──▶ Idle
//! ```

use crate::editable::{ChangeEvent, ChangeSource, EditorSurface, SelectionRange};
use crate::util::is_mention_boundary;

use super::trigger::{Trigger, TriggerMatch, TriggerSet};

/// Identity of a session instance.
///
/// Two sessions with the same trigger and anchor still differ by
/// generation, so results requested by a cancelled session never apply to
/// a later one that happens to look the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub trigger: String,
    pub anchor: usize,
    pub generation: u64,
}

/// An in-progress, uncommitted mention composition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSession {
    pub trigger: Trigger,
    /// Offset immediately after the trigger, fixed at creation
    pub anchor: usize,
    /// Lower-cased text between the anchor and the caret
    pub search_text: String,
    /// Chars typed after the anchor that belong to this token
    pub span_len: usize,
    pub generation: u64,
}

impl MentionSession {
    /// Offset of the first trigger char
    pub fn span_start(&self) -> usize {
        self.anchor - self.trigger.char_len()
    }

    /// Offset just after the last char of the token
    pub fn span_end(&self) -> usize {
        self.anchor + self.span_len
    }

    pub fn key(&self) -> SessionKey {
        SessionKey {
            trigger: self.trigger.text().to_string(),
            anchor: self.anchor,
            generation: self.generation,
        }
    }

    fn contains(&self, offset: usize) -> bool {
        (self.anchor..=self.span_end()).contains(&offset)
    }
}

/// Why a session was closed without a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// Whitespace typed, or the search would span words
    Whitespace,
    /// Caret left `[anchor, anchor + span_len]`
    CaretLeft,
    /// Edit landed outside the token
    EditOutsideSpan,
    /// Trigger chars edited away, or no longer on a word boundary
    TriggerBroken,
    /// Surface blurred or closed
    Blur,
}

/// Result of feeding one event to the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Opened,
    SearchChanged,
    Cancelled(CancelReason),
    Unchanged,
}

impl SessionEvent {
    /// True when the composer needs fresh suggestions
    pub fn needs_resolve(&self) -> bool {
        matches!(self, SessionEvent::Opened | SessionEvent::SearchChanged)
    }
}

#[derive(Debug, Clone)]
pub struct MentionState {
    triggers: TriggerSet,
    session: Option<MentionSession>,
    next_generation: u64,
}

impl MentionState {
    pub fn new(triggers: TriggerSet) -> Self {
        Self {
            triggers,
            session: None,
            next_generation: 1,
        }
    }

    pub fn triggers(&self) -> &TriggerSet {
        &self.triggers
    }

    pub fn session(&self) -> Option<&MentionSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Clear the session (commit, blur, load); returns what was open
    pub fn reset(&mut self) -> Option<MentionSession> {
        let closed = self.session.take();
        if let Some(session) = &closed {
            tracing::debug!(trigger = session.trigger.text(), anchor = session.anchor, "session reset");
        }
        closed
    }

    /// Feed one change notification.
    ///
    /// Programmatic edits never open or advance a session.
    pub fn on_change<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &S,
        event: &ChangeEvent,
    ) -> SessionEvent {
        if event.source == ChangeSource::Api {
            return SessionEvent::Unchanged;
        }
        let Some(point) = event.operation.change_point() else {
            return SessionEvent::Unchanged;
        };
        let caret = event.selection.filter(SelectionRange::is_caret).map(|s| s.index);

        // Always re-run the matcher first: a longer trigger, or a fresh
        // trigger elsewhere, supersedes the open session.
        let end = if point.inserted.is_empty() {
            point.offset
        } else {
            point.end()
        };
        if let Some(found) = caret
            .filter(|&c| c == end)
            .and_then(|_| self.triggers.match_before(surface, end))
        {
            let same = self.session.as_ref().is_some_and(|s| {
                s.anchor == found.anchor && s.trigger.text() == found.trigger.text()
            });
            if !same {
                self.open(found);
                return SessionEvent::Opened;
            }
        }

        let Some(session) = self.session.as_mut() else {
            return SessionEvent::Unchanged;
        };

        if point.inserted.chars().any(char::is_whitespace) {
            return self.cancel(CancelReason::Whitespace);
        }

        // Track how the token's span grows and shrinks
        if point.deleted > 0 {
            if point.offset < session.anchor {
                return self.cancel(CancelReason::TriggerBroken);
            }
            let span_end = session.span_end();
            if point.offset < span_end {
                session.span_len -= point.deleted.min(span_end - point.offset);
            }
        }
        if !point.inserted.is_empty() {
            if !session.contains(point.offset) {
                return self.cancel(CancelReason::EditOutsideSpan);
            }
            session.span_len += point.inserted_len();
        }

        self.refresh(surface, caret)
    }

    /// Feed a caret move that did not change the text
    pub fn on_selection_change<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &S,
        selection: Option<SelectionRange>,
    ) -> SessionEvent {
        if self.session.is_none() {
            return SessionEvent::Unchanged;
        }
        let caret = selection.filter(SelectionRange::is_caret).map(|s| s.index);
        self.refresh(surface, caret)
    }

    /// Surface lost focus or closed
    pub fn on_blur(&mut self) -> SessionEvent {
        if self.session.is_some() {
            return self.cancel(CancelReason::Blur);
        }
        SessionEvent::Unchanged
    }

    /// Re-evaluate the open session from scratch against the current text
    fn refresh<S: EditorSurface + ?Sized>(
        &mut self,
        surface: &S,
        caret: Option<usize>,
    ) -> SessionEvent {
        let Some(session) = self.session.as_ref() else {
            return SessionEvent::Unchanged;
        };

        let Some(caret) = caret.filter(|&c| session.contains(c)) else {
            return self.cancel(CancelReason::CaretLeft);
        };

        let start = session.span_start();
        let n = session.trigger.char_len();
        let prev = start.checked_sub(1).and_then(|p| surface.char_at(p));
        if surface.get_text(start, n) != session.trigger.text() || !is_mention_boundary(prev) {
            return self.cancel(CancelReason::TriggerBroken);
        }

        let raw = surface.get_text(session.anchor, caret - session.anchor);
        if raw.chars().any(char::is_whitespace) {
            return self.cancel(CancelReason::Whitespace);
        }

        let search = raw.to_lowercase();
        let Some(session) = self.session.as_mut() else {
            return SessionEvent::Unchanged;
        };
        if session.search_text == search {
            return SessionEvent::Unchanged;
        }
        tracing::trace!(trigger = session.trigger.text(), from = %session.search_text, to = %search, "search changed");
        session.search_text = search;
        SessionEvent::SearchChanged
    }

    fn open(&mut self, found: TriggerMatch) {
        let generation = self.next_generation;
        self.next_generation += 1;
        tracing::debug!(
            trigger = found.trigger.text(),
            anchor = found.anchor,
            generation,
            "session opened"
        );
        self.session = Some(MentionSession {
            trigger: found.trigger,
            anchor: found.anchor,
            search_text: String::new(),
            span_len: 0,
            generation,
        });
    }

    fn cancel(&mut self, reason: CancelReason) -> SessionEvent {
        if let Some(session) = self.session.take() {
            tracing::debug!(
                trigger = session.trigger.text(),
                anchor = session.anchor,
                ?reason,
                "session cancelled"
            );
        }
        SessionEvent::Cancelled(reason)
    }
}

impl Default for MentionState {
    fn default() -> Self {
        Self::new(TriggerSet::default())
    }
}
