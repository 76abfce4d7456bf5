//! CLI command definitions and dispatch.

pub mod clone;
pub mod resolve;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use specwright_common::config::DaemonConfig;
use specwright_common::constants;
use specwright_image::catalog::ImageCatalog;
use specwright_runtime::Runtime;
use specwright_runtime::state::LocalState;

/// Specwright: container spec resolution.
#[derive(Parser, Debug)]
#[command(name = "specwright", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Path to the daemon configuration file.
    #[arg(long, global = true, env = "SPECWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the container, pod and network state file.
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Directory holding the image catalog.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Complete a draft spec with image, daemon and pod defaults.
    Resolve(resolve::ResolveArgs),
    /// Build a draft spec that reproduces an existing container.
    Clone(clone::CloneArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the stores cannot be opened or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let runtime = open_runtime(&cli)?;
    match cli.command {
        Command::Resolve(args) => resolve::execute(&runtime, args),
        Command::Clone(args) => clone::execute(&runtime, args),
    }
}

fn open_runtime(cli: &Cli) -> anyhow::Result<Runtime> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(constants::default_config_file);
    let config = if config_path.exists() {
        DaemonConfig::load(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?
    } else {
        tracing::debug!(path = %config_path.display(), "no daemon configuration, using defaults");
        DaemonConfig::default()
    };

    let state_path = cli
        .state_file
        .clone()
        .unwrap_or_else(constants::default_state_file);
    let state = LocalState::load(&state_path)
        .with_context(|| format!("failed to load state from {}", state_path.display()))?;

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| constants::data_dir().clone());
    let catalog = ImageCatalog::open(&data_dir)
        .with_context(|| format!("failed to open image catalog in {}", data_dir.display()))?;

    Runtime::builder(config)
        .images(Arc::new(catalog))
        .state(state)
        .build()
        .context("failed to assemble runtime")
}
