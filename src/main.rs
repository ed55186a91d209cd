//! Launchpad - Entry Point
//!
//! Resolves one query per invocation and prints host-UI JSON to stdout.
//! Logs go to stderr.

use clap::Parser;
use launchpad::command::ShellRunner;
use launchpad::core::error::{LaunchError, Result};
use launchpad::model::load_config_file;
use launchpad::ui::Launcher;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Launchpad - directory-scoped command launcher
#[derive(Parser, Debug)]
#[command(name = "launchpad")]
#[command(about = "Resolve a query into a location-qualified command")]
struct Args {
    /// Launcher configuration file (TOML)
    #[arg(long, env = "LAUNCHPAD_CONFIG")]
    config: PathBuf,

    /// Override the maximum command chain depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print the resolution instead of result items
    #[arg(long)]
    resolve_only: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// The query, e.g. `timer checkout main`
    #[arg(trailing_var_arg = true)]
    query: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("launchpad=warn")),
        )
        .init();

    let args = Args::parse();
    let query = args.query.join(" ");

    let mut config = load_config_file(&args.config)?;
    if let Some(depth) = args.max_depth {
        config.settings.max_depth = depth;
        config
            .settings
            .validate()
            .map_err(LaunchError::InvalidConfig)?;
    }

    tracing::info!(
        locations = config.locations.len(),
        commands = config.commands.len(),
        "Loaded configuration"
    );

    let runner = ShellRunner::new(&config.settings)?;
    let launcher = Launcher::new(&config, &runner);

    let json = if args.resolve_only {
        let summary = launcher.summarize(&query);
        to_json(&summary, args.pretty)?
    } else {
        let items = launcher.items(&query);
        to_json(&items, args.pretty)?
    };

    println!("{}", json);
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
