//! Runtime module - drives the composer outside a host editor
//!
//! This module contains the code that runs the update loop:
//! - `app` - message loop and command execution
//! - `input` - scripted key/text input to message mapping

pub mod app;
pub mod input;

pub use app::{ComposerApp, SubmitHandler, Submission};
pub use input::{key_to_msg, step_to_msgs, Key, ReplayScript, ReplayStep};

use crate::editable::EditorSurface;

/// Feed every step of `script` through `app`, in order
pub fn replay<S: EditorSurface>(app: &mut ComposerApp<S>, script: &ReplayScript) {
    for (index, step) in script.steps.iter().enumerate() {
        tracing::trace!(index, ?step, "replay step");
        for msg in step_to_msgs(step) {
            app.dispatch(msg);
        }
    }
}
