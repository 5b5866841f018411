//! Submit lifecycle state

/// Where the last submission stands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmitStatus {
    /// Nothing in flight
    #[default]
    Idle,
    /// `Cmd::Submit` emitted, waiting for `Msg::SubmitFinished`
    Pending { markdown: String },
    /// The host rejected the last submission; content was kept
    Failed(String),
}

impl SubmitStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, SubmitStatus::Pending { .. })
    }

    /// Error from the last attempt, if it failed
    pub fn error(&self) -> Option<&str> {
        match self {
            SubmitStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}
