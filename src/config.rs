//! Mention configuration persistence
//!
//! Stores the trigger set in `~/.config/mention-editor/config.yaml`

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mention::TriggerSet;

/// One configured trigger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Character sequence that opens a session (e.g. "@@")
    pub trigger: String,
    /// Mention kind name (e.g. "version")
    pub kind: String,
    #[serde(default)]
    pub renders_as_circle_avatar: bool,
}

impl TriggerConfig {
    pub fn new(trigger: &str, kind: &str, renders_as_circle_avatar: bool) -> Self {
        Self {
            trigger: trigger.to_string(),
            kind: kind.to_string(),
            renders_as_circle_avatar,
        }
    }
}

/// Composer configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionConfig {
    #[serde(default = "default_triggers")]
    pub triggers: Vec<TriggerConfig>,

    /// Number of candidates shown in the suggestion list
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_triggers() -> Vec<TriggerConfig> {
    vec![
        TriggerConfig::new("@", "user", true),
        TriggerConfig::new("@@", "version", false),
        TriggerConfig::new("@@@", "task", false),
    ]
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for MentionConfig {
    fn default() -> Self {
        Self {
            triggers: default_triggers(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

impl MentionConfig {
    /// Load config from disk, or return defaults if not found or invalid
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Rejected config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load and validate config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate config from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: MentionConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config without building anything from it
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_suggestions == 0 {
            return Err(ConfigError::InvalidMaxSuggestions);
        }
        self.trigger_set().map(|_| ())
    }

    /// Build the immutable, longest-first trigger set
    pub fn trigger_set(&self) -> Result<TriggerSet, ConfigError> {
        TriggerSet::from_config(&self.triggers)
    }

    /// Save config to `path`
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}

/// Error type for configuration loading and validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    EmptyTriggerSet,
    /// Empty trigger, or one containing whitespace
    InvalidTrigger(String),
    DuplicateTrigger(String),
    UnknownKind { trigger: String, kind: String },
    InvalidMaxSuggestions,
    /// Trigger chars could not be compiled into the sanitize pattern
    InvalidPattern(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::EmptyTriggerSet => write!(f, "No triggers configured"),
            ConfigError::InvalidTrigger(t) => write!(f, "Invalid trigger: {:?}", t),
            ConfigError::DuplicateTrigger(t) => write!(f, "Duplicate trigger: {}", t),
            ConfigError::UnknownKind { trigger, kind } => {
                write!(f, "Unknown kind {:?} for trigger {}", kind, trigger)
            }
            ConfigError::InvalidMaxSuggestions => {
                write!(f, "max_suggestions must be at least 1")
            }
            ConfigError::InvalidPattern(e) => write!(f, "Invalid pattern: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MentionConfig::default();
        assert_eq!(config.max_suggestions, 5);
        assert_eq!(config.triggers.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = MentionConfig::from_yaml_str("max_suggestions: 8\n").unwrap();
        assert_eq!(config.max_suggestions, 8);
        assert_eq!(config.triggers, default_triggers());
    }

    #[test]
    fn test_avatar_flag_defaults_to_false() {
        let yaml = "triggers:\n  - trigger: \"#\"\n    kind: task\n";
        let config = MentionConfig::from_yaml_str(yaml).unwrap();
        assert!(!config.triggers[0].renders_as_circle_avatar);
    }

    #[test]
    fn test_unknown_kind_fails_fast() {
        let yaml = "triggers:\n  - trigger: \"@\"\n    kind: usr\n";
        assert_eq!(
            MentionConfig::from_yaml_str(yaml),
            Err(ConfigError::UnknownKind {
                trigger: "@".to_string(),
                kind: "usr".to_string()
            })
        );
    }

    #[test]
    fn test_zero_max_suggestions_rejected() {
        assert_eq!(
            MentionConfig::from_yaml_str("max_suggestions: 0\n"),
            Err(ConfigError::InvalidMaxSuggestions)
        );
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        assert!(matches!(
            MentionConfig::from_yaml_str("triggers: [[["),
            Err(ConfigError::Parse(_))
        ));
    }
}
