//! Command-line interface module.

mod args;
pub mod convert;
pub mod inspect;
pub mod session;
pub mod theme;

pub use args::{Cli, Commands, ConvertArgs, ThemeChoice};

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

use crate::error::ConvertError;

/// Tokio runtime for commands that export.
pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

/// Read SVG text from a file, or from stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String, ConvertError> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| ConvertError::Io(path.to_path_buf(), e))?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|e| ConvertError::Io(path.to_path_buf(), e))
}
