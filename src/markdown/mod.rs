//! Markdown codec for comment documents
//!
//! Persisted form of a comment is a single markdown string:
//!
//! | Document                     | Markdown              |
//! |------------------------------|-----------------------|
//! | mention run                  | `[label](kind:id)`    |
//! | link run                     | `[text](url)`         |
//! | checklist line               | `* [x] ` / `* [ ] `   |
//! | code lines                   | fenced block          |
//! | quote line                   | `> ` per line         |
//! | `\\` in text                 | `\\\\`                |
//! | leading blank of a line      | `&#32;` / `&#9;`      |
//!
//! `decode(encode(doc)) == doc` holds for documents built from these
//! constructs in canonical form (no trailing plain newline, single blank
//! lines between paragraphs).

mod decode;
mod encode;
mod sanitize;

pub use encode::EncodeError;
pub use sanitize::Sanitizer;

use crate::config::ConfigError;
use crate::editable::Document;
use crate::mention::TriggerSet;

/// Encoder/decoder bound to a trigger set
#[derive(Debug, Clone)]
pub struct MarkdownCodec {
    trigger_chars: Vec<char>,
    sanitizer: Sanitizer,
}

impl MarkdownCodec {
    pub fn from_triggers(triggers: &TriggerSet) -> Result<Self, ConfigError> {
        Self::with_trigger_chars(triggers.trigger_chars())
    }

    fn with_trigger_chars(trigger_chars: Vec<char>) -> Result<Self, ConfigError> {
        let sanitizer =
            Sanitizer::new(&trigger_chars).map_err(|e| ConfigError::InvalidPattern(e.to_string()))?;
        Ok(Self {
            trigger_chars,
            sanitizer,
        })
    }

    pub fn trigger_chars(&self) -> &[char] {
        &self.trigger_chars
    }

    /// Document → markdown, without the submit-time sanitize pass
    pub fn encode(&self, doc: &Document) -> Result<String, EncodeError> {
        encode::encode(doc)
    }

    /// Document → markdown ready for `onSubmit`
    pub fn encode_for_submit(&self, doc: &Document) -> Result<String, EncodeError> {
        let markdown = self.encode(doc)?;
        Ok(self.sanitizer.sanitize(&markdown))
    }

    /// Markdown → document (never fails)
    pub fn decode(&self, markdown: &str) -> Document {
        decode::decode(markdown, &self.trigger_chars)
    }

    pub fn sanitize(&self, markdown: &str) -> String {
        self.sanitizer.sanitize(markdown)
    }
}

impl Default for MarkdownCodec {
    fn default() -> Self {
        Self {
            trigger_chars: vec!['@'],
            sanitizer: Sanitizer::default(),
        }
    }
}

/// Encode with the default codec
pub fn encode(doc: &Document) -> Result<String, EncodeError> {
    encode::encode(doc)
}

/// Decode with the default `@` trigger
pub fn decode(markdown: &str) -> Document {
    decode::decode(markdown, &['@'])
}
