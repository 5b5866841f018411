//! Composer model - the complete state of the comment editor
//!
//! This module contains all the state types following the Elm Architecture pattern.

mod submit;

pub use submit::SubmitStatus;

use crate::commands::Attachment;
use crate::config::{ConfigError, MentionConfig};
use crate::editable::{Document, EditorSurface, LineFormat, RichTextBuffer};
use crate::markdown::MarkdownCodec;
use crate::mention::{MentionState, SuggestionState};

/// The complete composer model
///
/// Generic over the editing surface so a host editor can stand in for the
/// in-process [`RichTextBuffer`].
#[derive(Debug)]
pub struct ComposerModel<S: EditorSurface = RichTextBuffer> {
    /// The host editing surface (owns the document)
    pub surface: S,
    /// Open mention session, if any
    pub mention: MentionState,
    /// Latest applied candidate list and highlighted row
    pub suggestions: SuggestionState,
    /// Markdown codec bound to the configured trigger chars
    pub codec: MarkdownCodec,
    /// Files pending submission
    pub attachments: Vec<Attachment>,
    pub submit: SubmitStatus,
}

impl ComposerModel<RichTextBuffer> {
    /// Empty composer over an in-process buffer
    pub fn new(config: &MentionConfig) -> Result<Self, ConfigError> {
        Self::with_surface(RichTextBuffer::new(), config)
    }
}

impl<S: EditorSurface> ComposerModel<S> {
    /// Composer over an existing surface
    pub fn with_surface(surface: S, config: &MentionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let triggers = config.trigger_set()?;
        let codec = MarkdownCodec::from_triggers(&triggers)?;
        Ok(Self {
            surface,
            mention: MentionState::new(triggers),
            suggestions: SuggestionState::new(config.max_suggestions),
            codec,
            attachments: Vec::new(),
            submit: SubmitStatus::Idle,
        })
    }

    pub fn document(&self) -> &Document {
        self.surface.document()
    }

    /// Flattened text of the document
    pub fn text(&self) -> String {
        self.surface.get_text(0, self.surface.get_length())
    }

    /// Caret offset (end of the selection), `None` without focus
    pub fn caret(&self) -> Option<usize> {
        self.surface.get_selection().map(|s| s.end())
    }

    /// Block format of the line containing `offset`
    pub fn line_format_at(&self, offset: usize) -> Option<LineFormat> {
        let bounds = self.document().line_bounds(offset);
        if self.surface.char_at(bounds.end) != Some('\n') {
            return None;
        }
        self.surface.get_format(bounds.end, 1).line
    }

    /// The dropdown is up: a session is open and the list has rows
    pub fn suggestions_visible(&self) -> bool {
        self.mention.is_active() && !self.suggestions.displayed().is_empty()
    }

    /// Nothing worth sending (whitespace only, no files)
    pub fn is_blank(&self) -> bool {
        self.text().trim().is_empty() && self.attachments.is_empty()
    }

    /// Panic with context if the model is inconsistent
    ///
    /// Called after every update in debug builds.
    #[cfg(debug_assertions)]
    pub fn assert_invariants_with_context(&self, context: &str) {
        let len = self.surface.get_length();
        if let Some(selection) = self.surface.get_selection() {
            assert!(
                selection.end() <= len,
                "[{}] selection {:?} past end {}",
                context,
                selection,
                len
            );
        }
        if let Some(session) = self.mention.session() {
            assert!(
                session.span_end() <= len,
                "[{}] session span {}..{} past end {}",
                context,
                session.span_start(),
                session.span_end(),
                len
            );
            assert!(
                self.surface.mention_span_at(session.span_start()).is_none(),
                "[{}] session opened on a mention token",
                context
            );
        } else {
            assert!(
                self.suggestions.is_empty(),
                "[{}] candidates shown without a session",
                context
            );
        }
        let shown = self.suggestions.displayed().len();
        assert!(
            shown == 0 || self.suggestions.selected_index() < shown,
            "[{}] selected index {} out of {}",
            context,
            self.suggestions.selected_index(),
            shown
        );
    }
}

impl Default for ComposerModel<RichTextBuffer> {
    fn default() -> Self {
        Self {
            surface: RichTextBuffer::new(),
            mention: MentionState::default(),
            suggestions: SuggestionState::default(),
            codec: MarkdownCodec::default(),
            attachments: Vec::new(),
            submit: SubmitStatus::Idle,
        }
    }
}
