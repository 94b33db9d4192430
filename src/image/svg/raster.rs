//! SVG rasterization.
//!
//! Decode once at the display size, then stretch onto an output surface
//! `scale` times larger. The scale factor never re-decodes the vector data,
//! so a 3x export is the 1x preview drawn three times bigger.

use std::io::Cursor;
use std::sync::{Arc, LazyLock};

use resvg::tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use super::Dimensions;
use crate::config::ExportFormat;
use crate::error::{ConvertError, ConvertResult};

/// System fonts, loaded once and shared by every decode.
static FONT_DB: LazyLock<Arc<usvg::fontdb::Database>> = LazyLock::new(|| {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    Arc::new(db)
});

/// Largest surface the rasterizer allocates, in pixels (4 bytes each).
pub const MAX_SURFACE_PIXELS: u64 = 1 << 28;

/// Reject sizes whose surface would exceed [`MAX_SURFACE_PIXELS`].
fn within_budget(size: Dimensions) -> ConvertResult<Dimensions> {
    let pixels = u64::from(size.width) * u64::from(size.height);
    if pixels > MAX_SURFACE_PIXELS {
        return Err(ConvertError::invalid_dimensions(size.width, size.height));
    }
    Ok(size)
}

// ============================================================================
// Request types
// ============================================================================

/// Integer export multiplier within `1..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFactor(u32);

impl ScaleFactor {
    pub const ONE: Self = Self(1);

    /// Validate a user-supplied scale. Out-of-range values are rejected, not clamped.
    pub fn new(value: i64, max: u32) -> ConvertResult<Self> {
        u32::try_from(value)
            .ok()
            .filter(|v| (1..=max).contains(v))
            .map(Self)
            .ok_or(ConvertError::ScaleOutOfRange { scale: value, max })
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// One-shot rasterization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterRequest {
    /// Unscaled target size (the displayed dimensions).
    pub size: Dimensions,
    pub scale: ScaleFactor,
    pub format: ExportFormat,
}

impl RasterRequest {
    pub const fn new(size: Dimensions, scale: ScaleFactor, format: ExportFormat) -> Self {
        Self {
            size,
            scale,
            format,
        }
    }

    /// Pixel size of the produced bitmap, within the surface budget.
    pub fn output_size(&self) -> ConvertResult<Dimensions> {
        let factor = self.scale.get();
        let scaled = self.size.scaled(factor).ok_or_else(|| {
            ConvertError::invalid_dimensions(
                f64::from(self.size.width) * f64::from(factor),
                f64::from(self.size.height) * f64::from(factor),
            )
        })?;
        within_budget(scaled)
    }
}

/// Encoded raster image ready to be written out.
#[derive(Debug, Clone)]
pub struct RasterAsset {
    pub bytes: Vec<u8>,
    /// Displayed (unscaled) size, used for naming.
    pub size: Dimensions,
    /// Actual bitmap size.
    pub pixel_size: Dimensions,
    pub format: ExportFormat,
}

// ============================================================================
// Pipeline stages
// ============================================================================

/// Decode markup into a surface of exactly `size` pixels.
///
/// The tree is stretched onto the surface, so markup whose own
/// `width`/`height` already equal `size` renders 1:1.
pub fn decode(markup: &str, size: Dimensions) -> ConvertResult<Pixmap> {
    within_budget(size)?;
    let options = usvg::Options {
        fontdb: Arc::clone(&FONT_DB),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(markup, &options)
        .map_err(|e| ConvertError::DecodeFailure(e.to_string()))?;

    let mut surface = Pixmap::new(size.width, size.height).ok_or_else(|| {
        ConvertError::DecodeFailure(format!("cannot allocate {size} decode surface"))
    })?;

    #[allow(clippy::cast_precision_loss)]
    let transform = Transform::from_scale(
        size.width as f32 / tree.size().width(),
        size.height as f32 / tree.size().height(),
    );
    resvg::render(&tree, transform, &mut surface.as_mut());

    Ok(surface)
}

/// [`decode`] on a blocking worker; the pipeline's only suspension point.
pub async fn decode_async(markup: String, size: Dimensions) -> ConvertResult<Pixmap> {
    tokio::task::spawn_blocking(move || decode(&markup, size))
        .await
        .map_err(|e| ConvertError::DecodeFailure(format!("decode task failed: {e}")))?
}

/// Stretch a decoded surface onto a fresh transparent output surface.
pub fn draw_scaled(decoded: &Pixmap, request: &RasterRequest) -> ConvertResult<Pixmap> {
    let out = request.output_size()?;
    let mut surface = Pixmap::new(out.width, out.height).ok_or_else(|| {
        ConvertError::invalid_dimensions(f64::from(out.width), f64::from(out.height))
    })?;
    surface.fill(Color::TRANSPARENT);

    #[allow(clippy::cast_precision_loss)]
    let transform = Transform::from_scale(
        out.width as f32 / decoded.width() as f32,
        out.height as f32 / decoded.height() as f32,
    );
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    surface.draw_pixmap(0, 0, decoded.as_ref(), &paint, transform, None);

    Ok(surface)
}

/// Encode a surface losslessly, keeping the alpha channel.
pub fn encode(surface: &Pixmap, format: ExportFormat) -> ConvertResult<Vec<u8>> {
    // tiny-skia stores premultiplied RGBA; encoders expect straight alpha.
    let mut rgba = Vec::with_capacity(surface.data().len());
    for pixel in surface.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let image = image::RgbaImage::from_raw(surface.width(), surface.height(), rgba)
        .ok_or_else(|| ConvertError::EncodeFailure("pixel buffer size mismatch".into()))?;

    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, format.image_format())
        .map_err(|e| ConvertError::EncodeFailure(e.to_string()))?;

    Ok(bytes.into_inner())
}

/// Draw and encode an already decoded surface.
pub fn finish(decoded: &Pixmap, request: &RasterRequest) -> ConvertResult<RasterAsset> {
    let surface = draw_scaled(decoded, request)?;
    let bytes = encode(&surface, request.format)?;
    Ok(RasterAsset {
        bytes,
        size: request.size,
        pixel_size: Dimensions::new(surface.width(), surface.height()),
        format: request.format,
    })
}

/// Full synchronous pipeline: decode → draw → encode.
#[cfg(test)]
pub fn rasterize(markup: &str, request: &RasterRequest) -> ConvertResult<RasterAsset> {
    let decoded = decode(markup, request.size)?;
    finish(&decoded, request)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF_FILLED: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"><rect x="0" y="0" width="100" height="100" fill="#ff0000"/></svg>"##;

    fn request(width: u32, height: u32, scale: u32) -> RasterRequest {
        RasterRequest::new(
            Dimensions::new(width, height),
            ScaleFactor::new(i64::from(scale), 16).unwrap(),
            ExportFormat::Png,
        )
    }

    #[test]
    fn test_scale_factor_bounds() {
        assert_eq!(ScaleFactor::new(1, 10).unwrap().get(), 1);
        assert_eq!(ScaleFactor::new(10, 10).unwrap().get(), 10);
        assert!(matches!(
            ScaleFactor::new(0, 10),
            Err(ConvertError::ScaleOutOfRange { scale: 0, max: 10 })
        ));
        assert!(ScaleFactor::new(11, 10).is_err());
        assert!(ScaleFactor::new(-2, 10).is_err());
    }

    #[test]
    fn test_output_size_overflow() {
        let req = RasterRequest::new(
            Dimensions::new(u32::MAX / 2 + 1, 1),
            ScaleFactor::new(2, 2).unwrap(),
            ExportFormat::Png,
        );
        assert!(matches!(
            req.output_size(),
            Err(ConvertError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_oversized_surfaces_are_rejected_before_allocation() {
        let huge = Dimensions::new(100_000, 100_000);
        assert!(matches!(
            decode(HALF_FILLED, huge),
            Err(ConvertError::InvalidDimensions { .. })
        ));

        // Fits unscaled, too large once multiplied.
        let req = RasterRequest::new(
            Dimensions::new(10_000, 10_000),
            ScaleFactor::new(3, 10).unwrap(),
            ExportFormat::Png,
        );
        assert!(matches!(
            req.output_size(),
            Err(ConvertError::InvalidDimensions { .. })
        ));

        let edge = Dimensions::new(1 << 14, 1 << 14);
        assert_eq!(within_budget(edge).unwrap(), edge);
    }

    #[test]
    fn test_scaled_output_keeps_transparency() {
        let asset = rasterize(HALF_FILLED, &request(200, 100, 3)).unwrap();
        assert_eq!(asset.pixel_size, Dimensions::new(600, 300));
        assert_eq!(asset.size, Dimensions::new(200, 100));

        let decoded = image::load_from_memory(&asset.bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (600, 300));

        // Filled half is opaque red, unfilled half fully transparent.
        assert_eq!(decoded.get_pixel(60, 150).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(540, 150).0[3], 0);
        assert_eq!(decoded.get_pixel(599, 299).0[3], 0);
    }

    #[test]
    fn test_scale_one_round_trip() {
        let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 5" width="37" height="19"/>"#;
        let asset = rasterize(markup, &request(37, 19, 1)).unwrap();
        let decoded = image::load_from_memory(&asset.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (37, 19));
    }

    #[test]
    fn test_webp_output() {
        let req = RasterRequest::new(
            Dimensions::new(20, 10),
            ScaleFactor::new(2, 4).unwrap(),
            ExportFormat::Webp,
        );
        let asset = rasterize(HALF_FILLED, &req).unwrap();
        let format = image::guess_format(&asset.bytes).unwrap();
        assert_eq!(format, image::ImageFormat::WebP);
        let decoded = image::load_from_memory(&asset.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 20));
    }

    #[test]
    fn test_decode_failure() {
        let result = rasterize(r#"<svg xmlns="http://www.w3.org/2000/svg"><g></svg>"#, &request(10, 10, 1));
        assert!(matches!(result, Err(ConvertError::DecodeFailure(_))));
    }

    #[test]
    fn test_encode_straight_alpha() {
        let mut surface = Pixmap::new(1, 1).unwrap();
        surface.fill(Color::from_rgba8(0, 0, 255, 128));
        let bytes = encode(&surface, ExportFormat::Png).unwrap();
        let pixel = image::load_from_memory(&bytes).unwrap().to_rgba8().get_pixel(0, 0).0;
        assert_eq!(pixel[3], 128);
        assert!(pixel[2] >= 254, "blue should be demultiplied, got {pixel:?}");
    }

    #[tokio::test]
    async fn test_decode_async_matches_sync() {
        let size = Dimensions::new(200, 100);
        let decoded = decode_async(HALF_FILLED.to_string(), size).await.unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
        assert_eq!(decoded.data(), decode(HALF_FILLED, size).unwrap().data());
    }
}
