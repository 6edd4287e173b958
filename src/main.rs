mod anim;
mod app;
mod art;
mod config;
mod display;
mod input;
mod lifecycle;
mod model;
mod needs;
mod render;
mod scheduler;
mod sim;
mod sprites;

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::OpenOptions, path::Path, sync::Mutex};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = config::Cli::parse();
    let paths = config::project_paths()?;
    init_tracing(&paths.log_path)?;
    app::run(cli, paths)
}

/// The terminal is in raw mode while running, so logs go to a file.
fn init_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("could not open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
