use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

use mention_editor::cli::{CliArgs, CliCommand};
use mention_editor::config::MentionConfig;
use mention_editor::editable::Document;
use mention_editor::markdown::MarkdownCodec;
use mention_editor::mention::ResolverRegistry;
use mention_editor::model::ComposerModel;
use mention_editor::runtime::{replay, ComposerApp, ReplayScript};

/// Upper bound for a threaded replay to settle its last lookup
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> Result<()> {
    mention_editor::tracing::init();

    let args = CliArgs::parse();
    let config = args.load_config().context("Failed to load config")?;
    let triggers = config.trigger_set()?;
    let codec = MarkdownCodec::from_triggers(&triggers)?;

    match &args.command {
        CliCommand::Encode { path, submit } => {
            let content = read(path)?;
            let document: Document = serde_json::from_str(&content)
                .with_context(|| format!("Invalid document JSON in {}", path.display()))?;
            let markdown = if *submit {
                codec.encode_for_submit(&document)?
            } else {
                codec.encode(&document)?
            };
            println!("{}", markdown);
        }
        CliCommand::Decode { path } => {
            let markdown = read(path)?;
            let document = codec.decode(&markdown);
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        CliCommand::Replay {
            script,
            directory,
            threaded,
        } => run_replay(&config, script, directory.as_deref(), *threaded)?,
    }

    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn run_replay(
    config: &MentionConfig,
    script: &Path,
    directory: Option<&Path>,
    threaded: bool,
) -> Result<()> {
    let script = ReplayScript::from_yaml_str(&read(script)?)
        .with_context(|| format!("Invalid replay script {}", script.display()))?;
    let registry = match directory {
        Some(path) => ResolverRegistry::load_directory(path)?,
        None => ResolverRegistry::new(),
    };

    let model = ComposerModel::new(config)?;
    let mut app = if threaded {
        ComposerApp::with_worker(model, registry)
    } else {
        ComposerApp::new(model, registry)
    };

    replay(&mut app, &script);
    if threaded && !app.wait_for_suggestions(SETTLE_TIMEOUT) {
        bail!("Suggestion lookups did not settle");
    }

    for notification in app.notifications() {
        eprintln!("{:?}: {}", notification.level, notification.message);
    }
    if app.submissions().is_empty() {
        // Nothing submitted: show where the composer ended up
        println!("{}", app.model().codec.encode(app.model().document())?);
    }
    for submission in app.submissions() {
        println!("{}", submission.markdown);
    }
    Ok(())
}
