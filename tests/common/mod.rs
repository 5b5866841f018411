//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use mention_editor::commands::Cmd;
use mention_editor::config::MentionConfig;
use mention_editor::editable::{Document, EditorSurface, RichTextBuffer, TextEditMsg, TextRun};
use mention_editor::mention::{
    Candidate, DirectoryResolver, MentionKind, MentionRef, ResolveRequest, ResolverRegistry,
};
use mention_editor::messages::Msg;
use mention_editor::model::ComposerModel;
use mention_editor::runtime::ComposerApp;
use mention_editor::update::update;

/// Empty composer with the default `@`/`@@`/`@@@` triggers
pub fn test_model() -> ComposerModel {
    ComposerModel::new(&MentionConfig::default()).unwrap()
}

/// Composer over `runs` with the caret at `caret`
pub fn model_with_runs(runs: Vec<TextRun>, caret: usize) -> ComposerModel {
    let mut buffer = RichTextBuffer::with_document(Document::from_runs(runs));
    buffer.set_selection(caret);
    ComposerModel::with_surface(buffer, &MentionConfig::default()).unwrap()
}

/// Type `text` one char at a time, collecting every command produced
pub fn type_text(model: &mut ComposerModel, text: &str) -> Vec<Cmd> {
    text.chars()
        .filter_map(|ch| update(model, Msg::Edit(TextEditMsg::InsertChar(ch))))
        .flat_map(Cmd::flatten)
        .collect()
}

/// The last resolve request among `cmds`
pub fn last_request(cmds: &[Cmd]) -> Option<ResolveRequest> {
    cmds.iter().rev().find_map(|cmd| match cmd {
        Cmd::ResolveSuggestions(request) => Some(request.clone()),
        _ => None,
    })
}

/// Deliver a resolver result for `request`
pub fn resolve(
    model: &mut ComposerModel,
    request: &ResolveRequest,
    candidates: Vec<Candidate>,
) -> Option<Cmd> {
    update(
        model,
        Msg::SuggestionsResolved {
            ticket: request.ticket.clone(),
            candidates,
        },
    )
}

pub fn tim() -> Candidate {
    Candidate::new("u1", "Tim")
}

pub fn tim_run() -> TextRun {
    TextRun::mention("Tim", MentionRef::new(MentionKind::User, "u1"))
}

/// Directory with a few users, versions and tasks
pub fn test_registry() -> ResolverRegistry {
    ResolverRegistry::new()
        .with(
            MentionKind::User,
            DirectoryResolver::new(vec![
                Candidate::new("u1", "Tim"),
                Candidate::new("u2", "Tina"),
                Candidate::new("u3", "Bob"),
            ]),
        )
        .with(
            MentionKind::Version,
            DirectoryResolver::new(vec![
                Candidate::new("v1", "v003").with_detail("shot010"),
                Candidate::new("v2", "v004").with_detail("shot010"),
            ]),
        )
        .with(
            MentionKind::Task,
            DirectoryResolver::new(vec![Candidate::new("t1", "compositing")]),
        )
}

/// Headless app with inline resolution over [`test_registry`]
pub fn test_app() -> ComposerApp {
    ComposerApp::new(test_model(), test_registry())
}

/// Type `text` through the app, one message per char
pub fn app_type(app: &mut ComposerApp, text: &str) {
    for ch in text.chars() {
        app.dispatch(Msg::Edit(TextEditMsg::InsertChar(ch)));
    }
}

pub fn caret(model: &ComposerModel) -> usize {
    model.surface.get_selection().map(|s| s.index).unwrap_or(0)
}
