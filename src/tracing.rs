//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging
//! mention session transitions and suggestion resolution.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=mention_editor::mention=trace` - per-keystroke session detail
//! - `RUST_LOG=mention_editor::update=debug` - module-level filtering
//!
//! # Log Files
//!
//! Logs are written to `~/.config/mention-editor/logs/mention-editor.log`
//! with daily rotation. File logging uses debug level by default.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::mention::{MentionState, SuggestionState};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG (default `warn`).
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console goes to stderr so CLI output stays clean
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    // try_init: tests and embedders may have installed a subscriber already
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Lightweight snapshot of session/suggestion state for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// `(trigger, anchor, generation)` of the open session
    pub session: Option<(String, usize, u64)>,
    pub search: Option<String>,
    pub displayed: usize,
    pub selected: usize,
}

impl SessionSnapshot {
    pub fn capture(mention: &MentionState, suggestions: &SuggestionState) -> Self {
        let session = mention.session();
        Self {
            session: session.map(|s| (s.trigger.text().to_string(), s.anchor, s.generation)),
            search: session.map(|s| s.search_text.clone()),
            displayed: suggestions.displayed().len(),
            selected: suggestions.selected_index(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &SessionSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        match (&self.session, &other.session) {
            (None, Some((trigger, anchor, _))) => {
                changes.push(format!("opened {} at {}", trigger, anchor))
            }
            (Some((trigger, _, _)), None) => changes.push(format!("closed {}", trigger)),
            (Some(before), Some(after)) if before != after => changes.push(format!(
                "session {}@{} → {}@{}",
                before.0, before.1, after.0, after.1
            )),
            _ => {}
        }

        if let (Some(before), Some(after)) = (&self.search, &other.search) {
            if before != after {
                changes.push(format!("search {:?} → {:?}", before, after));
            }
        }
        if self.displayed != other.displayed {
            changes.push(format!(
                "candidates {} → {}",
                self.displayed, other.displayed
            ));
        }
        if self.selected != other.selected {
            changes.push(format!("selected {} → {}", self.selected, other.selected));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(session: Option<(&str, usize)>, search: Option<&str>) -> SessionSnapshot {
        SessionSnapshot {
            session: session.map(|(t, a)| (t.to_string(), a, 1)),
            search: search.map(str::to_string),
            displayed: 0,
            selected: 0,
        }
    }

    #[test]
    fn test_diff_reports_open_and_close() {
        let closed = snapshot(None, None);
        let open = snapshot(Some(("@", 4)), Some(""));
        assert_eq!(closed.diff(&open), Some("opened @ at 4".to_string()));
        assert_eq!(open.diff(&closed), Some("closed @".to_string()));
    }

    #[test]
    fn test_diff_reports_search_change() {
        let before = snapshot(Some(("@", 4)), Some("ti"));
        let after = snapshot(Some(("@", 4)), Some("tim"));
        assert_eq!(
            before.diff(&after),
            Some("search \"ti\" → \"tim\"".to_string())
        );
        assert_eq!(after.diff(&after), None);
    }
}
