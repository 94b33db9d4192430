//! Conversion session.
//!
//! A [`Session`] owns everything the user can change between two exports:
//! the markup buffer, the loaded document, the displayed width/height fields,
//! the aspect constraint, the scale factor and the request sequence. It is
//! driven through `&mut self` from a single event loop.
//!
//! # Export flow
//!
//! ```text
//! begin_export()  ──► ExportJob { ticket, markup, request }
//!                         │
//!                         ▼  (async, decode on a blocking worker)
//!                    ExportJob::run() ──► JobOutcome
//!                         │
//!                         ▼
//! finish_export() ──► stale ticket? drop : write file
//! ```
//!
//! Every failure is reported through the session's [`StatusReporter`] before
//! it is returned, so callers may ignore the `Err` value.

mod constraint;
mod request;

pub use constraint::{AspectConstraint, Axis, ConstraintMode, DimensionFields};
pub use request::{ExportJob, JobOutcome, RequestSequence};

use crate::config::{ExportConfig, ExportFormat};
use crate::debug;
use crate::error::{ConvertError, ConvertResult};
use crate::image::export::{ExportEmitter, ExportedFile};
use crate::image::svg::{
    Dimensions, RasterRequest, ScaleFactor, SizeSource, VectorDocument, resolve_dimensions,
};
use crate::status::{StatusKind, StatusReporter};

/// Startup values taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub scale: u32,
    pub max_scale: u32,
    pub format: ExportFormat,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for SessionOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            scale: config.scale,
            max_scale: config.max_scale,
            format: config.format,
        }
    }
}

/// Loaded document plus where its size came from.
#[derive(Debug, Clone)]
struct Loaded {
    document: VectorDocument,
    source: SizeSource,
}

pub struct Session<R: StatusReporter> {
    reporter: R,
    input: String,
    loaded: Option<Loaded>,
    fields: DimensionFields,
    constraint: AspectConstraint,
    scale: ScaleFactor,
    max_scale: u32,
    format: ExportFormat,
    requests: RequestSequence,
}

impl<R: StatusReporter> Session<R> {
    pub fn new(reporter: R, options: SessionOptions) -> Self {
        let scale = ScaleFactor::new(i64::from(options.scale), options.max_scale)
            .unwrap_or(ScaleFactor::ONE);
        Self {
            reporter,
            input: String::new(),
            loaded: None,
            fields: DimensionFields::default(),
            constraint: AspectConstraint::default(),
            scale,
            max_scale: options.max_scale.max(1),
            format: options.format,
            requests: RequestSequence::default(),
        }
    }

    // ========================================================================
    // accessors
    // ========================================================================

    #[cfg(test)]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[cfg(test)]
    pub fn document(&self) -> Option<&VectorDocument> {
        self.loaded.as_ref().map(|l| &l.document)
    }

    pub const fn fields(&self) -> DimensionFields {
        self.fields
    }

    #[cfg(test)]
    pub const fn constraint(&self) -> &AspectConstraint {
        &self.constraint
    }

    #[cfg(test)]
    pub const fn scale(&self) -> ScaleFactor {
        self.scale
    }

    pub const fn max_scale(&self) -> u32 {
        self.max_scale
    }

    /// Download is enabled only while a document is loaded.
    pub const fn can_export(&self) -> bool {
        self.loaded.is_some()
    }

    #[cfg(test)]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    /// One-line summary for the `status` command.
    pub fn summary(&self) -> String {
        let lock = if self.constraint.mode().is_locked() {
            "on"
        } else {
            "off"
        };
        let ratio = self
            .constraint
            .ratio()
            .map_or_else(|| "-".to_string(), |r| format!("{r:.4}"));
        let document = match &self.loaded {
            Some(loaded) => format!("SVG loaded ({})", loaded.source.as_str()),
            None => "No SVG loaded".to_string(),
        };
        format!(
            "{document} | size {}x{} | ratio {ratio} | lock {lock} | scale {}x | {}",
            self.fields.width,
            self.fields.height,
            self.scale.get(),
            self.format.label()
        )
    }

    // ========================================================================
    // loading
    // ========================================================================

    /// Replace the markup buffer without rendering it.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Replace the markup buffer and render it.
    pub fn load(&mut self, text: impl Into<String>) -> ConvertResult<Dimensions> {
        self.set_input(text);
        self.render()
    }

    /// Parse the markup buffer, resolve its size and show it.
    ///
    /// Empty input is rejected without touching the current state. Any other
    /// failure drops the loaded document.
    pub fn render(&mut self) -> ConvertResult<Dimensions> {
        if self.input.trim().is_empty() {
            self.reporter
                .report(StatusKind::Error, "Please enter SVG code");
            return Err(ConvertError::MalformedInput);
        }

        self.requests.advance();
        match Self::load_document(self.input.trim()) {
            Ok((loaded, size, ratio)) => {
                debug!("svg"; "resolved {} from {} (ratio {})", size, loaded.source.as_str(), ratio);
                self.loaded = Some(loaded);
                self.fields = DimensionFields::from(size);
                self.constraint.set_ratio(ratio);
                self.reporter
                    .report(StatusKind::Success, "SVG rendered successfully");
                Ok(size)
            }
            Err(err) => {
                self.loaded = None;
                self.reporter
                    .report(StatusKind::Error, &format!("Invalid SVG code: {err}"));
                Err(err)
            }
        }
    }

    fn load_document(text: &str) -> ConvertResult<(Loaded, Dimensions, f64)> {
        let mut document = VectorDocument::parse(text)?;
        let (resolved, size) = resolve_dimensions(&document)?;
        document.set_size(size);
        let loaded = Loaded {
            document,
            source: resolved.source,
        };
        Ok((loaded, size, resolved.aspect_ratio()))
    }

    // ========================================================================
    // editing
    // ========================================================================

    /// Flip the aspect lock.
    pub fn toggle_constraint(&mut self) -> ConstraintMode {
        let mode = self.constraint.toggle(&self.fields);
        let message = if mode.is_locked() {
            "Aspect ratio locked"
        } else {
            "Aspect ratio unlocked"
        };
        self.reporter.report(StatusKind::Info, message);
        mode
    }

    /// Apply a typed value to one field and resize the document.
    ///
    /// Returns the new document size, or `None` when no document is loaded
    /// (the field still changes).
    pub fn edit_dimension(&mut self, axis: Axis, value: i64) -> ConvertResult<Option<Dimensions>> {
        self.constraint.apply(&mut self.fields, axis, value);

        if self.loaded.is_none() {
            debug!("session"; "{} set to {} with no document loaded", axis.as_str(), value);
            return Ok(None);
        }

        let size = match self.fields.to_dimensions() {
            Ok(size) => size,
            Err(err) => return self.fail(err),
        };
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.document.set_size(size);
        }
        debug!("session"; "resized to {}", size);
        Ok(Some(size))
    }

    /// Set the export multiplier; out-of-range values are rejected.
    pub fn set_scale(&mut self, value: i64) -> ConvertResult<ScaleFactor> {
        match ScaleFactor::new(value, self.max_scale) {
            Ok(scale) => {
                self.scale = scale;
                self.reporter
                    .report(StatusKind::Info, &format!("Scale set to {}x", scale.get()));
                Ok(scale)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Empty the buffer, drop the document and release the lock.
    pub fn clear(&mut self) {
        self.requests.advance();
        self.input.clear();
        self.loaded = None;
        if self.constraint.mode().is_locked() {
            self.toggle_constraint();
        }
        self.reporter.report(StatusKind::Info, "Cleared successfully");
    }

    // ========================================================================
    // export
    // ========================================================================

    /// Snapshot the current document into a job and issue its ticket.
    pub fn begin_export(&mut self) -> ConvertResult<ExportJob> {
        let Some(loaded) = &self.loaded else {
            return self.fail(ConvertError::NothingToExport);
        };

        let (scale, format) = (self.scale, self.format);
        let prepared = self.fields.to_dimensions().and_then(|size| {
            let request = RasterRequest::new(size, scale, format);
            request.output_size()?;
            Ok((request, loaded.document.to_markup()?))
        });
        let (request, markup) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => return self.fail(err),
        };

        let ticket = self.requests.advance();
        debug!("export"; "request {} for {} at {}x", ticket, request.size, scale.get());
        Ok(ExportJob {
            ticket,
            markup,
            request,
        })
    }

    /// Write a finished job's asset unless a newer request superseded it.
    pub fn finish_export(
        &mut self,
        outcome: JobOutcome,
        emitter: &ExportEmitter,
    ) -> ConvertResult<Option<ExportedFile>> {
        if !self.requests.is_current(outcome.ticket) {
            debug!("export"; "dropping stale result {}", outcome.ticket);
            return Ok(None);
        }

        let label = self.format.label();
        let written = outcome
            .result
            .and_then(|asset| Ok((emitter.emit(&asset)?, asset.pixel_size)));
        match written {
            Ok((file, pixels)) => {
                self.reporter.report(
                    StatusKind::Success,
                    &format!("Transparent {label} ({pixels}) saved to {}", file.path.display()),
                );
                Ok(Some(file))
            }
            Err(err) => {
                self.reporter.report(
                    StatusKind::Error,
                    &format!("Error converting SVG to {label}: {err}"),
                );
                Err(err)
            }
        }
    }

    /// Full export on the current task.
    pub async fn export(&mut self, emitter: &ExportEmitter) -> ConvertResult<Option<ExportedFile>> {
        let job = self.begin_export()?;
        let outcome = job.run().await;
        self.finish_export(outcome, emitter)
    }

    fn fail<T>(&mut self, err: ConvertError) -> ConvertResult<T> {
        self.reporter.report(StatusKind::Error, &err.to_string());
        Err(err)
    }
}
