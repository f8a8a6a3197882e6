mod app;
mod audio;
mod emitter;
mod report;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use rtlab_experiment::ExperimentConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Visual and auditory reaction time lab
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for exported session files (overrides the config)
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Run in a regular window instead of borderless fullscreen
    #[arg(long)]
    windowed: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut config = match &args.config {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    if let Some(dir) = args.export_dir {
        config.export_dir = dir;
    }

    let app = App::new(config, !args.windowed)?;
    app.run()?;

    Ok(())
}
