//! Composer-level handlers: load, attachments and submit

use crate::commands::{Attachment, Cmd, Notification};
use crate::editable::{ChangeSource, Document, EditorSurface};
use crate::model::{ComposerModel, SubmitStatus};

/// Generic failure shown to the user; details go to the log
const SUBMIT_FAILED: &str = "Could not send comment. Your text was kept.";

/// Replace the content with a stored comment
pub fn load<S: EditorSurface>(model: &mut ComposerModel<S>, markdown: &str) -> Option<Cmd> {
    let document = model.codec.decode(markdown);
    model.surface.set_contents(document, ChangeSource::Api);
    reset_composition(model);
    model.attachments.clear();
    model.submit = SubmitStatus::Idle;
    tracing::debug!(chars = model.surface.get_length(), "comment loaded");
    Some(Cmd::Redraw)
}

pub fn attach<S: EditorSurface>(model: &mut ComposerModel<S>, attachment: Attachment) -> Option<Cmd> {
    tracing::debug!(name = %attachment.name, "attachment added");
    model.attachments.push(attachment);
    Some(Cmd::Redraw)
}

pub fn detach<S: EditorSurface>(model: &mut ComposerModel<S>, index: usize) -> Option<Cmd> {
    if index >= model.attachments.len() {
        return None;
    }
    model.attachments.remove(index);
    Some(Cmd::Redraw)
}

/// Encode, sanitize and hand the comment to the host.
///
/// Encode failures keep the content and notify the user.
pub fn submit<S: EditorSurface>(model: &mut ComposerModel<S>) -> Option<Cmd> {
    if model.submit.is_pending() {
        tracing::debug!("submit already in flight");
        return None;
    }
    if model.is_blank() {
        tracing::debug!("nothing to submit");
        return None;
    }

    match model.codec.encode_for_submit(model.document()) {
        Ok(markdown) => {
            tracing::info!(
                chars = markdown.chars().count(),
                attachments = model.attachments.len(),
                "submitting comment"
            );
            model.submit = SubmitStatus::Pending {
                markdown: markdown.clone(),
            };
            Some(Cmd::Submit {
                markdown,
                attachments: model.attachments.clone(),
            })
        }
        Err(e) => {
            tracing::warn!("Failed to encode comment: {}", e);
            Some(Cmd::Notify(Notification::error(SUBMIT_FAILED)))
        }
    }
}

/// The host finished a submission; only success clears the composer
pub fn submit_finished<S: EditorSurface>(
    model: &mut ComposerModel<S>,
    result: Result<(), String>,
) -> Option<Cmd> {
    if !model.submit.is_pending() {
        tracing::debug!("submit result without a pending submit");
        return None;
    }
    match result {
        Ok(()) => {
            model.surface.set_contents(Document::new(), ChangeSource::Api);
            reset_composition(model);
            model.attachments.clear();
            model.submit = SubmitStatus::Idle;
            Some(Cmd::Redraw)
        }
        Err(e) => {
            tracing::warn!("Submit rejected: {}", e);
            model.submit = SubmitStatus::Failed(e);
            Some(Cmd::Notify(Notification::error(SUBMIT_FAILED)))
        }
    }
}

/// Editing after a rejected submit drops the failure state
pub fn clear_submit_failure<S: EditorSurface>(model: &mut ComposerModel<S>) {
    if model.submit.error().is_some() {
        model.submit = SubmitStatus::Idle;
    }
}

fn reset_composition<S: EditorSurface>(model: &mut ComposerModel<S>) {
    model.mention.reset();
    model.suggestions.clear();
}
