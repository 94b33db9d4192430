//! Image processing: SVG handling and raster export.

pub mod export;
pub mod svg;
