//! Mention kinds and the `kind:id` references stored in mention runs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Entity kinds a mention token can point at.
///
/// Only user/version/task are reachable through triggers; the others can
/// only arrive by decoding a stored comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MentionKind {
    User,
    Version,
    Task,
    Folder,
    Representation,
    Workfile,
    Product,
}

impl MentionKind {
    pub const ALL: [MentionKind; 7] = [
        MentionKind::User,
        MentionKind::Version,
        MentionKind::Task,
        MentionKind::Folder,
        MentionKind::Representation,
        MentionKind::Workfile,
        MentionKind::Product,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MentionKind::User => "user",
            MentionKind::Version => "version",
            MentionKind::Task => "task",
            MentionKind::Folder => "folder",
            MentionKind::Representation => "representation",
            MentionKind::Workfile => "workfile",
            MentionKind::Product => "product",
        }
    }
}

impl fmt::Display for MentionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a kind name outside [`MentionKind::ALL`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown mention kind: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for MentionKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MentionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Reference carried by a mention run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MentionRef {
    pub kind: MentionKind,
    pub id: String,
}

impl MentionRef {
    pub fn new(kind: MentionKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    /// Parse a `kind:id` link target.
    ///
    /// Returns `None` for anything else, including absolute URLs
    /// (`https://...`) and site-relative paths.
    pub fn parse_reference(target: &str) -> Option<Self> {
        let (kind, id) = target.split_once(':')?;
        let kind = kind.parse::<MentionKind>().ok()?;
        if id.is_empty() || id.starts_with('/') || id.chars().any(char::is_whitespace) {
            return None;
        }
        Some(Self::new(kind, id))
    }

    /// The `kind:id` form used as a markdown link target
    pub fn to_reference(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in MentionKind::ALL {
            assert_eq!(kind.as_str().parse::<MentionKind>(), Ok(kind));
        }
        assert!("https".parse::<MentionKind>().is_err());
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(
            MentionRef::parse_reference("user:u1"),
            Some(MentionRef::new(MentionKind::User, "u1"))
        );
        assert_eq!(
            MentionRef::parse_reference("representation:r-7"),
            Some(MentionRef::new(MentionKind::Representation, "r-7"))
        );
    }

    #[test]
    fn test_parse_reference_rejects_urls_and_paths() {
        assert_eq!(MentionRef::parse_reference("https://example.com"), None);
        assert_eq!(MentionRef::parse_reference("/projects/demo"), None);
        assert_eq!(MentionRef::parse_reference("user:"), None);
        assert_eq!(MentionRef::parse_reference("user://evil"), None);
        assert_eq!(MentionRef::parse_reference("team:t1"), None);
    }

    #[test]
    fn test_to_reference() {
        let mention = MentionRef::new(MentionKind::Version, "v1");
        assert_eq!(mention.to_reference(), "version:v1");
    }
}
