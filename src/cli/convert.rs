//! One-shot `convert` command.

use anyhow::{Result, bail};

use super::{ConvertArgs, build_runtime, read_input};
use crate::config::AppConfig;
use crate::image::export::ExportEmitter;
use crate::log;
use crate::session::{Axis, Session, SessionOptions};
use crate::status::LogReporter;

/// Load, resize, rasterize and write a single file.
///
/// Edits are applied width first, so with `--lock` a given height wins.
pub fn convert(args: &ConvertArgs, config: &AppConfig) -> Result<()> {
    let text = read_input(&args.input)?;
    let mut session = Session::new(LogReporter, SessionOptions::from(&config.export));

    session.load(text)?;
    if args.lock {
        session.toggle_constraint();
    }
    if let Some(width) = args.width {
        session.edit_dimension(Axis::Width, width)?;
    }
    if let Some(height) = args.height {
        session.edit_dimension(Axis::Height, height)?;
    }
    if let Some(scale) = args.scale {
        session.set_scale(scale)?;
    }

    let emitter = ExportEmitter::from_config(&config.export);
    let rt = build_runtime()?;
    match rt.block_on(session.export(&emitter))? {
        Some(file) => {
            log!("export"; "{} ({} bytes)", file.file_name, file.len);
            Ok(())
        }
        None => bail!("export was superseded"),
    }
}
