//! Headless composer runtime
//!
//! Drives [`update`] and performs the commands it returns: suggestion
//! lookups (inline or on the background worker), submission through the
//! host's `on_submit` handler, and notifications.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::commands::{Attachment, Cmd, Notification};
use crate::editable::{EditorSurface, RichTextBuffer};
use crate::messages::Msg;
use crate::mention::{ResolverRegistry, SuggestionWorker};
use crate::model::ComposerModel;
use crate::update::update;

/// Host callback receiving the encoded comment
pub type SubmitHandler = Box<dyn FnMut(&str, &[Attachment]) -> Result<(), String>>;

/// Where suggestion lookups run
enum Resolution {
    /// Resolve on the calling thread before the next message
    Inline(ResolverRegistry),
    /// Resolve on the background worker; results arrive as messages
    Worker(SuggestionWorker),
}

/// A comment handed to the submit handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub markdown: String,
    pub attachments: Vec<Attachment>,
}

pub struct ComposerApp<S: EditorSurface = RichTextBuffer> {
    model: ComposerModel<S>,
    resolution: Resolution,
    on_submit: SubmitHandler,
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
    submissions: Vec<Submission>,
    notifications: Vec<Notification>,
    redraws: usize,
}

impl<S: EditorSurface> ComposerApp<S> {
    /// Runtime resolving suggestions inline (deterministic, used by replay)
    pub fn new(model: ComposerModel<S>, registry: ResolverRegistry) -> Self {
        Self::with_resolution(model, |_| Resolution::Inline(registry))
    }

    /// Runtime resolving suggestions on a background thread
    pub fn with_worker(model: ComposerModel<S>, registry: ResolverRegistry) -> Self {
        Self::with_resolution(model, |tx| {
            Resolution::Worker(SuggestionWorker::spawn(registry, tx))
        })
    }

    fn with_resolution(
        model: ComposerModel<S>,
        resolution: impl FnOnce(Sender<Msg>) -> Resolution,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            model,
            resolution: resolution(msg_tx.clone()),
            on_submit: Box::new(|_, _| Ok(())),
            msg_tx,
            msg_rx,
            submissions: Vec::new(),
            notifications: Vec::new(),
            redraws: 0,
        }
    }

    /// Install the host's submit callback (default accepts everything)
    pub fn on_submit(
        mut self,
        handler: impl FnMut(&str, &[Attachment]) -> Result<(), String> + 'static,
    ) -> Self {
        self.on_submit = Box::new(handler);
        self
    }

    pub fn model(&self) -> &ComposerModel<S> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ComposerModel<S> {
        &mut self.model
    }

    /// Every comment handed to the submit handler, oldest first
    pub fn submissions(&self) -> &[Submission] {
        &self.submissions
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Number of redraw requests seen
    pub fn redraws(&self) -> usize {
        self.redraws
    }

    /// Run one message and everything it causes that is already available
    pub fn dispatch(&mut self, msg: Msg) {
        if let Some(cmd) = update(&mut self.model, msg) {
            self.process_cmd(cmd);
        }
        self.process_async_messages();
    }

    /// Run every message queued by commands or the worker; returns true if
    /// any of them asked for a redraw
    pub fn process_async_messages(&mut self) -> bool {
        let mut needs_redraw = false;
        while let Ok(msg) = self.msg_rx.try_recv() {
            if let Some(cmd) = update(&mut self.model, msg) {
                if cmd.needs_redraw() {
                    needs_redraw = true;
                }
                self.process_cmd(cmd);
            }
        }
        needs_redraw
    }

    /// Block until the outstanding suggestion lookup has been applied or
    /// `timeout` elapses. Returns false on timeout.
    pub fn wait_for_suggestions(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.process_async_messages();
            if !self.model.suggestions.is_loading() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.msg_rx.recv_timeout(remaining) {
                Ok(msg) => {
                    if let Some(cmd) = update(&mut self.model, msg) {
                        self.process_cmd(cmd);
                    }
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::Redraw => self.redraws += 1,
            Cmd::ResolveSuggestions(request) => match &self.resolution {
                Resolution::Inline(registry) => {
                    let candidates = registry.resolve(request.kind, &request.ticket.query);
                    let _ = self.msg_tx.send(Msg::SuggestionsResolved {
                        ticket: request.ticket,
                        candidates,
                    });
                }
                Resolution::Worker(worker) => worker.submit(request),
            },
            Cmd::Submit {
                markdown,
                attachments,
            } => {
                let result = (self.on_submit)(&markdown, &attachments);
                self.submissions.push(Submission {
                    markdown,
                    attachments,
                });
                let _ = self.msg_tx.send(Msg::SubmitFinished(result));
            }
            Cmd::Notify(notification) => {
                tracing::info!(level = ?notification.level, "{}", notification.message);
                self.notifications.push(notification);
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
        }
    }
}
