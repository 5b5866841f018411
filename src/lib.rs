//! Mention Editor - Elm-style comment composer core
//!
//! This crate provides the mention state machine, atomic mention tokens and
//! the markdown codec behind a rich-text comment composer, driven through
//! the Elm Architecture pattern.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod editable;
pub mod markdown;
pub mod mention;
pub mod messages;
pub mod model;
pub mod runtime;
pub mod tracing;
pub mod update;
pub mod util;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::MentionConfig;
pub use markdown::MarkdownCodec;
pub use messages::Msg;
pub use model::ComposerModel;
pub use update::update;
