//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::ExportFormat;

/// svgpng - convert SVG markup to transparent raster images
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: svgpng.toml)
    #[arg(short = 'C', long, default_value = "svgpng.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Convert one SVG file to a raster image
    #[command(visible_alias = "c")]
    Convert {
        #[command(flatten)]
        args: ConvertArgs,
    },

    /// Print the resolved size and aspect ratio of an SVG
    #[command(visible_alias = "i")]
    Inspect {
        /// SVG file, or `-` for stdin
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Start the interactive converter
    #[command(visible_alias = "s")]
    Session {
        /// SVG file to load on startup
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: Option<PathBuf>,
    },

    /// Show or change the color theme
    Theme {
        /// New theme; omit to print the current one
        #[arg(value_enum)]
        choice: Option<ThemeChoice>,
    },
}

/// Convert command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// SVG file, or `-` for stdin
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Target width in pixels (applied before height)
    #[arg(short = 'W', long, allow_negative_numbers = true)]
    pub width: Option<i64>,

    /// Target height in pixels
    #[arg(short = 'H', long, allow_negative_numbers = true)]
    pub height: Option<i64>,

    /// Lock the aspect ratio while applying width/height
    #[arg(short, long)]
    pub lock: bool,

    /// Scale factor (1..=max_scale)
    #[arg(short, long, allow_negative_numbers = true)]
    pub scale: Option<i64>,

    /// Output directory (relative to current directory)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// File name prefix
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<ExportFormat>,
}

/// Argument of the `theme` command.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeChoice {
    Light,
    Dark,
    Toggle,
}
