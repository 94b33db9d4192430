//! Configuration management for `svgpng.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `[export]` | File prefix, output dir, format, scale bounds  |
//! | `[state]`  | Location of the persisted key-value state file |
//!
//! # Example
//!
//! ```toml
//! [export]
//! prefix = "svg-converted"
//! output = "exports"
//! format = "png"        # png | webp
//! scale = 2
//! max_scale = 10
//!
//! [state]
//! file = ".svgpng/state.toml"
//! ```

mod error;
mod util;

pub use error::ConfigError;

use util::find_config_file;

use crate::{
    cli::{Cli, Commands, ConvertArgs},
    log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// export section
// ============================================================================

/// Raster output format. Both are lossless and keep alpha.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Webp,
}

impl ExportFormat {
    /// Get file extension for this format.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// Human-readable name for status messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Webp => "WebP",
        }
    }

    pub const fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

/// `[export]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name prefix: `<prefix>-<W>x<H>-<epoch-ms>.<ext>`.
    pub prefix: String,
    /// Output directory (relative to the config root).
    pub output: PathBuf,
    pub format: ExportFormat,
    /// Scale factor used until the user picks another.
    pub scale: u32,
    /// Largest scale factor accepted from the user.
    pub max_scale: u32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            prefix: "svg-converted".to_string(),
            output: PathBuf::from("."),
            format: ExportFormat::Png,
            scale: 1,
            max_scale: 10,
        }
    }
}

/// `[state]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Key-value state file (relative to the config root).
    pub file: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(".svgpng/state.toml"),
        }
    }
}

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing svgpng.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file, empty when none was found
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub state: StateConfig,
}

impl AppConfig {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file; a missing file means
    /// defaults rooted at cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or(cwd);
                config.config_path = path;
                config
            }
            None => Self {
                root: cwd,
                ..Self::default()
            },
        };

        config.normalize_paths();
        config.apply_command_options(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Path of the persisted state file.
    pub fn state_path(&self) -> PathBuf {
        self.root.join(&self.state.file)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        match &cli.command {
            Commands::Convert { args } => self.apply_convert_args(args),
            Commands::Inspect { .. } | Commands::Session { .. } | Commands::Theme { .. } => {}
        }
    }

    /// Apply convert arguments from CLI. Scale is validated by the session.
    fn apply_convert_args(&mut self, args: &ConvertArgs) {
        if let Some(output) = &args.output {
            // CLI paths are relative to cwd, not the config root
            self.export.output = std::env::current_dir()
                .map(|cwd| cwd.join(output))
                .unwrap_or_else(|_| output.clone());
        }
        Self::update_option(&mut self.export.prefix, args.prefix.as_ref());
        Self::update_option(&mut self.export.format, args.format.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve relative paths against the root directory.
    fn normalize_paths(&mut self) {
        self.export.output = self.root.join(&self.export.output);
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting every problem at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        let export = &self.export;

        if export.max_scale == 0 {
            problems.push("export.max_scale must be at least 1".to_string());
        }
        if export.scale == 0 || export.scale > export.max_scale {
            problems.push(format!(
                "export.scale = {} is outside 1..={}",
                export.scale, export.max_scale
            ));
        }
        if export.prefix.trim().is_empty() {
            problems.push("export.prefix must not be empty".to_string());
        } else if export.prefix.contains(['/', '\\']) {
            problems.push(format!(
                "export.prefix `{}` must not contain path separators",
                export.prefix
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems.join("\n")))
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_invalid_toml() {
        let result = AppConfig::from_str("[export\nprefix = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.export.prefix, "svg-converted");
        assert_eq!(config.export.format, ExportFormat::Png);
        assert_eq!(config.export.scale, 1);
        assert_eq!(config.export.max_scale, 10);
        assert_eq!(config.state.file, PathBuf::from(".svgpng/state.toml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let config = AppConfig::from_str(
            "[export]\nprefix = \"icon\"\nformat = \"webp\"\nscale = 3\nmax_scale = 4\n",
        )
        .unwrap();
        assert_eq!(config.export.prefix, "icon");
        assert_eq!(config.export.format, ExportFormat::Webp);
        assert_eq!(config.export.scale, 3);
        // Unspecified fields keep their defaults
        assert_eq!(config.export.output, PathBuf::from("."));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[export]\nprefix = \"a\"\ncolour = \"red\"\n[unknown_section]\nfield = 1";
        let (config, ignored) = AppConfig::parse_with_ignored(content).unwrap();
        assert_eq!(config.export.prefix, "a");
        assert!(ignored.iter().any(|f| f.contains("colour")));
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_validation_collects_all_problems() {
        let mut config = AppConfig::default();
        config.export.scale = 12;
        config.export.prefix = "a/b".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("export.scale = 12 is outside 1..=10"));
        assert!(err.contains("path separators"));
    }

    #[test]
    fn test_state_path_is_rooted() {
        let config = AppConfig {
            root: PathBuf::from("/work"),
            ..AppConfig::default()
        };
        assert_eq!(config.state_path(), PathBuf::from("/work/.svgpng/state.toml"));
    }

    #[test]
    fn test_export_format_helpers() {
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::Webp.extension(), "webp");
        assert_eq!(ExportFormat::Webp.image_format(), image::ImageFormat::WebP);
    }
}
