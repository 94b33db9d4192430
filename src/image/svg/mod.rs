//! SVG document handling and rasterization.
//!
//! # Modules
//!
//! - [`document`]: root `<svg>` extraction and serialization (quick-xml)
//! - [`dimension`]: size inference from `viewBox` / `width` / `height`
//! - [`raster`]: decode (usvg + resvg), scale, encode (image)
//!
//! # Architecture
//!
//! ```text
//! pasted text
//!         │
//!         ▼
//!    ┌──────────┐
//!    │ document │ ──► first <svg> element, attributes + verbatim body
//!    └────┬─────┘
//!         │
//!         ▼
//!   ┌───────────┐
//!   │ dimension │ ──► viewBox → width/height → 300×300
//!   └─────┬─────┘
//!         │
//!         ▼
//!    ┌────────┐
//!    │ raster │ ──► decode at W×H, stretch to (W·S)×(H·S), PNG/WebP
//!    └────────┘
//! ```

mod dimension;
mod document;
mod raster;

pub use dimension::{DEFAULT_EDGE, Dimensions, SizeSource, resolve_dimensions};
pub use document::VectorDocument;
pub use raster::{RasterAsset, RasterRequest, ScaleFactor, decode_async, finish};
