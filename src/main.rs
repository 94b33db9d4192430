//! svgpng - convert SVG markup to transparent PNG/WebP images.

mod cli;
mod config;
mod error;
mod image;
mod logger;
mod session;
mod status;
mod theme;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::AppConfig;
use theme::ThemeStore;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = AppConfig::load(&cli)?;
    let store = ThemeStore::new(config.state_path());
    logger::set_theme(store.load());

    match &cli.command {
        Commands::Convert { args } => cli::convert::convert(args, &config),
        Commands::Inspect { input } => cli::inspect::inspect(input),
        Commands::Session { input } => {
            cli::session::run_session(input.as_deref(), &config, &store)
        }
        Commands::Theme { choice } => cli::theme::run_theme(*choice, &store),
    }
}
