//! Trigger set and the longest-first trigger matcher.

use std::sync::Arc;

use crate::config::{ConfigError, TriggerConfig};
use crate::editable::EditorSurface;
use crate::util::{char_len, is_mention_boundary};

use super::kind::MentionKind;

/// A validated trigger string and the kind of entity it mentions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trigger {
    text: String,
    kind: MentionKind,
    renders_as_circle_avatar: bool,
}

impl Trigger {
    pub fn new(text: &str, kind: MentionKind, renders_as_circle_avatar: bool) -> Self {
        Self {
            text: text.to_string(),
            kind,
            renders_as_circle_avatar,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> MentionKind {
        self.kind
    }

    pub fn renders_as_circle_avatar(&self) -> bool {
        self.renders_as_circle_avatar
    }

    pub fn char_len(&self) -> usize {
        char_len(&self.text)
    }

    /// Triggers are validated non-empty, so there is always a last char
    pub fn last_char(&self) -> Option<char> {
        self.text.chars().last()
    }
}

/// A trigger recognized in the text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerMatch {
    pub trigger: Trigger,
    /// Offset of the first trigger char
    pub start: usize,
    /// Offset immediately after the trigger
    pub anchor: usize,
}

/// Immutable trigger ordering, longest first, computed once at construction.
///
/// Cloning is cheap; every clone shares the same ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerSet {
    triggers: Arc<[Trigger]>,
}

impl TriggerSet {
    /// Validate and order a trigger list
    pub fn new(triggers: Vec<Trigger>) -> Result<Self, ConfigError> {
        if triggers.is_empty() {
            return Err(ConfigError::EmptyTriggerSet);
        }
        for (i, trigger) in triggers.iter().enumerate() {
            if trigger.text.is_empty() || trigger.text.chars().any(char::is_whitespace) {
                return Err(ConfigError::InvalidTrigger(trigger.text.clone()));
            }
            if triggers[..i].iter().any(|t| t.text == trigger.text) {
                return Err(ConfigError::DuplicateTrigger(trigger.text.clone()));
            }
        }

        let mut triggers = triggers;
        // Stable: equal-length triggers keep their configured order
        triggers.sort_by(|a, b| b.char_len().cmp(&a.char_len()));
        Ok(Self {
            triggers: triggers.into(),
        })
    }

    /// Build from configuration, failing fast on unknown kinds
    pub fn from_config(configs: &[TriggerConfig]) -> Result<Self, ConfigError> {
        let triggers = configs
            .iter()
            .map(|c| {
                let kind = c
                    .kind
                    .parse::<MentionKind>()
                    .map_err(|_| ConfigError::UnknownKind {
                        trigger: c.trigger.clone(),
                        kind: c.kind.clone(),
                    })?;
                Ok(Trigger::new(&c.trigger, kind, c.renders_as_circle_avatar))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Self::new(triggers)
    }

    /// Triggers in matching order (longest first)
    pub fn iter(&self) -> impl Iterator<Item = &Trigger> {
        self.triggers.iter()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    pub fn get(&self, text: &str) -> Option<&Trigger> {
        self.triggers.iter().find(|t| t.text == text)
    }

    /// Distinct characters used by any trigger
    pub fn trigger_chars(&self) -> Vec<char> {
        let mut chars: Vec<char> = self.triggers.iter().flat_map(|t| t.text.chars()).collect();
        chars.sort_unstable();
        chars.dedup();
        chars
    }

    /// Find the trigger that ends exactly at `end`.
    ///
    /// Candidates are the triggers ending with the char before `end`, tried
    /// longest first. A candidate matches when the text before `end` spells
    /// it out, none of it belongs to a mention token, and it sits on a word
    /// boundary (line start or whitespace before it).
    pub fn match_before<S: EditorSurface + ?Sized>(
        &self,
        surface: &S,
        end: usize,
    ) -> Option<TriggerMatch> {
        if end == 0 || end > surface.get_length() {
            return None;
        }
        let typed = surface.char_at(end - 1)?;

        for trigger in self.iter().filter(|t| t.last_char() == Some(typed)) {
            let n = trigger.char_len();
            if n > end {
                continue;
            }
            let start = end - n;
            if surface.get_text(start, n) != trigger.text {
                continue;
            }
            if (start..end).any(|offset| surface.mention_span_at(offset).is_some()) {
                continue;
            }
            let prev = start.checked_sub(1).and_then(|p| surface.char_at(p));
            if !is_mention_boundary(prev) {
                tracing::trace!(trigger = %trigger.text, start, ?prev, "trigger not on word boundary");
                continue;
            }
            return Some(TriggerMatch {
                trigger: trigger.clone(),
                start,
                anchor: end,
            });
        }
        None
    }
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self {
            triggers: vec![
                Trigger::new("@@@", MentionKind::Task, false),
                Trigger::new("@@", MentionKind::Version, false),
                Trigger::new("@", MentionKind::User, true),
            ]
            .into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editable::{Document, RichTextBuffer, TextRun};
    use crate::mention::MentionRef;

    fn matched(text: &str) -> Option<(String, usize)> {
        let buf = RichTextBuffer::from_text(text);
        TriggerSet::default()
            .match_before(&buf, char_len(text))
            .map(|m| (m.trigger.text().to_string(), m.anchor))
    }

    #[test]
    fn test_default_is_longest_first() {
        let set = TriggerSet::default();
        let order: Vec<&str> = set.iter().map(Trigger::text).collect();
        assert_eq!(order, vec!["@@@", "@@", "@"]);
        assert_eq!(set, TriggerSet::from_config(&crate::config::MentionConfig::default().triggers).unwrap());
    }

    #[test]
    fn test_longest_match_wins() {
        assert_eq!(matched("Hi @@@"), Some(("@@@".to_string(), 6)));
        assert_eq!(matched("Hi @@"), Some(("@@".to_string(), 5)));
        assert_eq!(matched("Hi @"), Some(("@".to_string(), 4)));
    }

    #[test]
    fn test_line_start_and_newline_are_boundaries() {
        assert_eq!(matched("@"), Some(("@".to_string(), 1)));
        assert_eq!(matched("first\n@@"), Some(("@@".to_string(), 8)));
    }

    #[test]
    fn test_word_boundary_gating() {
        assert_eq!(matched("foo@"), None);
        assert_eq!(matched("user@@"), None);
        assert_eq!(matched("Hi @@@@"), None);
    }

    #[test]
    fn test_non_trigger_char_never_matches() {
        assert_eq!(matched("Hi @t"), None);
        assert_eq!(matched(""), None);
    }

    #[test]
    fn test_trigger_chars_inside_mention_token_ignored() {
        let buf = RichTextBuffer::with_document(Document::from_runs([
            TextRun::plain(" "),
            TextRun::mention("@", MentionRef::new(MentionKind::User, "u1")),
        ]));
        assert_eq!(TriggerSet::default().match_before(&buf, 2), None);
    }

    #[test]
    fn test_custom_trigger_set_is_data_driven() {
        let set = TriggerSet::from_config(&[
            TriggerConfig::new("#", "task", false),
            TriggerConfig::new("@", "user", true),
        ])
        .unwrap();
        let buf = RichTextBuffer::from_text("see #");
        let m = set.match_before(&buf, 5).unwrap();
        assert_eq!(m.trigger.kind(), MentionKind::Task);
        assert_eq!(m.start, 4);
        assert_eq!(set.trigger_chars(), vec!['#', '@']);
    }

    #[test]
    fn test_validation() {
        assert_eq!(TriggerSet::new(vec![]), Err(ConfigError::EmptyTriggerSet));
        assert_eq!(
            TriggerSet::from_config(&[TriggerConfig::new("", "user", false)]),
            Err(ConfigError::InvalidTrigger(String::new()))
        );
        assert_eq!(
            TriggerSet::from_config(&[TriggerConfig::new("@ ", "user", false)]),
            Err(ConfigError::InvalidTrigger("@ ".to_string()))
        );
        assert_eq!(
            TriggerSet::from_config(&[
                TriggerConfig::new("@", "user", false),
                TriggerConfig::new("@", "task", false)
            ]),
            Err(ConfigError::DuplicateTrigger("@".to_string()))
        );
    }
}
