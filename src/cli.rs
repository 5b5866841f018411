//! Command-line argument parsing
//!
//! Supports:
//! - Encoding a JSON document (list of runs) to markdown
//! - Decoding stored markdown back to a JSON document
//! - Replaying a scripted keystroke list against a candidate directory
//! - Overriding the config file location

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ConfigError, MentionConfig};

/// Mention-aware comment composer
#[derive(Parser, Debug)]
#[command(
    name = "mention-editor",
    version,
    about = "Mention-aware comment composer core"
)]
pub struct CliArgs {
    /// Config file to use instead of ~/.config/mention-editor/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Encode a JSON document to markdown
    Encode {
        /// JSON file holding a list of runs
        #[arg(value_name = "DOC")]
        path: PathBuf,

        /// Apply the submit-time cleanup (image query strings, leaked triggers)
        #[arg(long)]
        submit: bool,
    },
    /// Decode markdown into a JSON document
    Decode {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
    /// Drive the composer with a scripted keystroke list and print what it
    /// submits
    Replay {
        #[arg(value_name = "SCRIPT")]
        script: PathBuf,

        /// Candidate directory (YAML map of kind to candidates)
        #[arg(short, long, value_name = "PATH")]
        directory: Option<PathBuf>,

        /// Resolve suggestions on the background worker
        #[arg(long)]
        threaded: bool,
    },
}

impl CliArgs {
    /// Load the config named on the command line, or the user config.
    ///
    /// An explicit path must load and validate; the user config falls back
    /// to defaults.
    pub fn load_config(&self) -> Result<MentionConfig, ConfigError> {
        match &self.config {
            Some(path) => MentionConfig::load_from(path),
            None => Ok(MentionConfig::load()),
        }
    }
}
