//! Raster file emission.
//!
//! Files are named `<prefix>-<width>x<height>-<epoch-ms>.<ext>`. Bytes go to a
//! hidden `.part` staging file first and are renamed into place, so a failed
//! export never leaves a truncated image behind. Existing files are never
//! replaced.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::svg::RasterAsset;
use crate::config::ExportConfig;
use crate::debug;
use crate::error::{ConvertError, ConvertResult};

/// Writes raster assets into an output directory.
#[derive(Debug, Clone)]
pub struct ExportEmitter {
    output_dir: PathBuf,
    prefix: String,
}

/// A written export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub len: usize,
}

impl ExportEmitter {
    pub fn new(output_dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(&config.output, &config.prefix)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Deterministic file name for an asset exported at `timestamp_ms`.
    pub fn file_name(&self, asset: &RasterAsset, timestamp_ms: u128) -> String {
        format!(
            "{}-{}-{}.{}",
            self.prefix,
            asset.size,
            timestamp_ms,
            asset.format.extension()
        )
    }

    /// Write an asset, named after the current time.
    pub fn emit(&self, asset: &RasterAsset) -> ConvertResult<ExportedFile> {
        self.emit_at(asset, epoch_millis())
    }

    /// Write an asset with an explicit timestamp.
    pub fn emit_at(&self, asset: &RasterAsset, timestamp_ms: u128) -> ConvertResult<ExportedFile> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| ConvertError::Io(self.output_dir.clone(), e))?;

        let file_name = self.file_name(asset, timestamp_ms);
        let path = self.output_dir.join(&file_name);

        let staged = StagedFile::write(&self.output_dir, &file_name, &asset.bytes)?;
        staged.commit(&path)?;
        debug!("export"; "wrote {} ({} bytes)", path.display(), asset.bytes.len());

        Ok(ExportedFile {
            path,
            file_name,
            len: asset.bytes.len(),
        })
    }
}

/// Milliseconds since the Unix epoch.
fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

// ============================================================================
// Staging
// ============================================================================

/// Temporary file removed on drop unless committed.
struct StagedFile {
    path: PathBuf,
    committed: bool,
}

impl StagedFile {
    fn write(dir: &Path, file_name: &str, bytes: &[u8]) -> ConvertResult<Self> {
        let staged = Self {
            path: dir.join(format!(".{file_name}.part")),
            committed: false,
        };
        fs::write(&staged.path, bytes).map_err(|e| ConvertError::Io(staged.path.clone(), e))?;
        Ok(staged)
    }

    /// Move into place. An existing `dest` is never replaced.
    fn commit(mut self, dest: &Path) -> ConvertResult<()> {
        if dest.exists() {
            return Err(ConvertError::Io(
                dest.to_path_buf(),
                io::Error::from(io::ErrorKind::AlreadyExists),
            ));
        }
        fs::rename(&self.path, dest).map_err(|e| ConvertError::Io(dest.to_path_buf(), e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.path);
        }
    }
}
