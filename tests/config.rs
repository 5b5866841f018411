//! Configuration system tests
//!
//! Tests for config paths, config loading/saving and trigger validation.

use mention_editor::config::{ConfigError, MentionConfig, TriggerConfig};
use mention_editor::config_paths;
use mention_editor::mention::MentionKind;
use mention_editor::model::ComposerModel;
use tempfile::TempDir;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_file_ends_with_yaml() {
    if let Some(path) = config_paths::config_file() {
        assert!(path.to_string_lossy().ends_with("config.yaml"));
    }
}

#[test]
fn test_logs_dir_is_subdir_of_config() {
    if let (Some(config), Some(logs)) = (config_paths::config_dir(), config_paths::logs_dir()) {
        assert!(logs.starts_with(&config));
        assert!(config.to_string_lossy().contains("mention-editor"));
    }
}

// ========================================================================
// Load / Save Tests
// ========================================================================

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let config = MentionConfig {
        triggers: vec![
            TriggerConfig::new("@", "user", true),
            TriggerConfig::new("#", "task", false),
        ],
        max_suggestions: 8,
    };
    config.save_to(&path).unwrap();

    assert_eq!(MentionConfig::load_from(&path).unwrap(), config);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = MentionConfig::load_from(&dir.path().join("absent.yaml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "triggers:\n  - trigger: \"@\"\n    kind: user\n  - trigger: \"@\"\n    kind: task\n").unwrap();

    assert_eq!(
        MentionConfig::load_from(&path),
        Err(ConfigError::DuplicateTrigger("@".to_string()))
    );
}

#[test]
fn test_whitespace_trigger_is_rejected() {
    let yaml = "triggers:\n  - trigger: \"@ \"\n    kind: user\n";
    assert!(matches!(
        MentionConfig::from_yaml_str(yaml),
        Err(ConfigError::InvalidTrigger(_))
    ));
}

#[test]
fn test_empty_trigger_list_is_rejected() {
    assert_eq!(
        MentionConfig::from_yaml_str("triggers: []\n"),
        Err(ConfigError::EmptyTriggerSet)
    );
}

// ========================================================================
// Config → Model Tests
// ========================================================================

#[test]
fn test_trigger_set_is_longest_first() {
    let triggers = MentionConfig::default().trigger_set().unwrap();
    let texts: Vec<&str> = triggers.iter().map(|t| t.text()).collect();
    assert_eq!(texts, vec!["@@@", "@@", "@"]);
    assert_eq!(triggers.get("@@").map(|t| t.kind()), Some(MentionKind::Version));
    assert_eq!(triggers.get("@").map(|t| t.renders_as_circle_avatar()), Some(true));
}

#[test]
fn test_custom_triggers_drive_the_model() {
    let config = MentionConfig::from_yaml_str(
        "triggers:\n  - trigger: \"#\"\n    kind: task\nmax_suggestions: 2\n",
    )
    .unwrap();
    let mut model = ComposerModel::new(&config).unwrap();

    for ch in "fix #co".chars() {
        mention_editor::update(
            &mut model,
            mention_editor::Msg::Edit(mention_editor::editable::TextEditMsg::InsertChar(ch)),
        );
    }
    let session = model.mention.session().unwrap();
    assert_eq!(session.trigger.kind(), MentionKind::Task);
    assert_eq!(session.search_text, "co");
}

#[test]
fn test_model_rejects_invalid_config() {
    let config = MentionConfig {
        max_suggestions: 0,
        ..MentionConfig::default()
    };
    assert!(matches!(
        ComposerModel::new(&config),
        Err(ConfigError::InvalidMaxSuggestions)
    ));
}
