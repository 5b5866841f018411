//! Scripted input
//!
//! Maps replay steps (typed text and named keys) to composer messages the
//! same way a key handler maps key events:
//!
//! ```yaml
//! steps:
//!   - type: "Please check @@ver"
//!   - key: down
//!   - key: enter
//!   - submit
//! ```

use serde::Deserialize;

use crate::commands::Attachment;
use crate::editable::{MoveTarget, TextEditMsg};
use crate::messages::{Msg, SuggestionMsg};

/// Named keys understood by the replay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Undo,
    Redo,
}

/// Bare-word steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Blur,
    Submit,
}

/// One scripted step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ReplayStep {
    /// Type text one char at a time (`\n` presses Enter)
    Type {
        #[serde(rename = "type")]
        text: String,
    },
    /// Press a named key
    Key { key: Key },
    /// Paste text in one change
    Paste { paste: String },
    /// Click a caret position
    Caret { caret: usize },
    /// Click a displayed suggestion row
    Pick { pick: usize },
    /// Replace the content with stored markdown
    Load { load: String },
    /// Attach a file by path
    Attach { attach: String },
    Action(Action),
}

/// A replay script as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub steps: Vec<ReplayStep>,
}

impl ReplayScript {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}

/// Map a named key to its message
pub fn key_to_msg(key: Key) -> Msg {
    match key {
        Key::Backspace => Msg::Edit(TextEditMsg::DeleteBackward),
        Key::Delete => Msg::Edit(TextEditMsg::DeleteForward),
        Key::Enter => Msg::Edit(TextEditMsg::InsertNewline),
        Key::Tab => Msg::Edit(TextEditMsg::InsertChar('\t')),
        Key::Escape => Msg::Suggestion(SuggestionMsg::Dismiss),
        Key::Left => Msg::Edit(TextEditMsg::Move(MoveTarget::Left)),
        Key::Right => Msg::Edit(TextEditMsg::Move(MoveTarget::Right)),
        Key::Up => Msg::Edit(TextEditMsg::Move(MoveTarget::Up)),
        Key::Down => Msg::Edit(TextEditMsg::Move(MoveTarget::Down)),
        Key::Home => Msg::Edit(TextEditMsg::Move(MoveTarget::LineStart)),
        Key::End => Msg::Edit(TextEditMsg::Move(MoveTarget::LineEnd)),
        Key::Undo => Msg::Edit(TextEditMsg::Undo),
        Key::Redo => Msg::Edit(TextEditMsg::Redo),
    }
}

/// Expand a step into the messages it produces, in order
pub fn step_to_msgs(step: &ReplayStep) -> Vec<Msg> {
    match step {
        ReplayStep::Type { text } => text
            .chars()
            .map(|ch| match ch {
                '\n' => Msg::Edit(TextEditMsg::InsertNewline),
                ch => Msg::Edit(TextEditMsg::InsertChar(ch)),
            })
            .collect(),
        ReplayStep::Key { key } => vec![key_to_msg(*key)],
        ReplayStep::Paste { paste } => vec![Msg::Edit(TextEditMsg::InsertText(paste.clone()))],
        ReplayStep::Caret { caret } => vec![Msg::Edit(TextEditMsg::SetCaret(*caret))],
        ReplayStep::Pick { pick } => vec![Msg::Suggestion(SuggestionMsg::AcceptIndex(*pick))],
        ReplayStep::Load { load } => vec![Msg::Load(load.clone())],
        ReplayStep::Attach { attach } => {
            let name = std::path::Path::new(attach)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| attach.clone());
            vec![Msg::Attach(Attachment::new(name, attach))]
        }
        ReplayStep::Action(Action::Blur) => vec![Msg::Blur],
        ReplayStep::Action(Action::Submit) => vec![Msg::Submit],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let script = ReplayScript::from_yaml_str(
            "steps:\n  - type: \"hi @t\"\n  - key: down\n  - pick: 1\n  - submit\n",
        )
        .unwrap();
        assert_eq!(
            script.steps,
            vec![
                ReplayStep::Type {
                    text: "hi @t".to_string()
                },
                ReplayStep::Key { key: Key::Down },
                ReplayStep::Pick { pick: 1 },
                ReplayStep::Action(Action::Submit),
            ]
        );
    }

    #[test]
    fn test_type_expands_per_char() {
        let msgs = step_to_msgs(&ReplayStep::Type {
            text: "a\nb".to_string(),
        });
        assert_eq!(
            msgs,
            vec![
                Msg::Edit(TextEditMsg::InsertChar('a')),
                Msg::Edit(TextEditMsg::InsertNewline),
                Msg::Edit(TextEditMsg::InsertChar('b')),
            ]
        );
    }

    #[test]
    fn test_attach_uses_file_name() {
        let msgs = step_to_msgs(&ReplayStep::Attach {
            attach: "/tmp/shots/a.png".to_string(),
        });
        assert_eq!(
            msgs,
            vec![Msg::Attach(Attachment::new("a.png", "/tmp/shots/a.png"))]
        );
    }

    #[test]
    fn test_escape_dismisses() {
        assert_eq!(
            key_to_msg(Key::Escape),
            Msg::Suggestion(SuggestionMsg::Dismiss)
        );
    }
}
