//! Dimension inference from root element attributes.
//!
//! Priority: `viewBox` (four numbers) → `width`/`height` → 300×300.

use std::fmt;

use super::VectorDocument;
use crate::error::{ConvertError, ConvertResult};

/// Fallback edge length when the markup does not say.
pub const DEFAULT_EDGE: f64 = 300.0;

// ============================================================================
// Dimensions
// ============================================================================

/// Width and height in whole pixels, both positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round and validate a pair of real values.
    pub fn from_f64(width: f64, height: f64) -> ConvertResult<Self> {
        match (to_pixels(width), to_pixels(height)) {
            (Some(w), Some(h)) => Ok(Self::new(w, h)),
            _ => Err(ConvertError::invalid_dimensions(width, height)),
        }
    }

    /// Multiply both edges, `None` on overflow.
    pub fn scaled(&self, factor: u32) -> Option<Self> {
        Some(Self::new(
            self.width.checked_mul(factor)?,
            self.height.checked_mul(factor)?,
        ))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_pixels(value: f64) -> Option<u32> {
    let rounded = value.round();
    (rounded.is_finite() && rounded >= 1.0 && rounded <= f64::from(u32::MAX))
        .then_some(rounded as u32)
}

// ============================================================================
// Resolution
// ============================================================================

/// Where a resolved size came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSource {
    ViewBox,
    Attributes,
    Default,
}

impl SizeSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ViewBox => "viewBox",
            Self::Attributes => "width/height",
            Self::Default => "default",
        }
    }
}

/// Unrounded size inferred from a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedSize {
    pub width: f64,
    pub height: f64,
    pub source: SizeSource,
}

impl ResolvedSize {
    /// Ratio of the unrounded edges.
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Display size, rounded to whole pixels.
    pub fn rounded(&self) -> ConvertResult<Dimensions> {
        Dimensions::from_f64(self.width, self.height)
    }
}

/// Infer the size of a document.
///
/// Pure: the caller decides whether to write the result back.
pub fn resolve_size(doc: &VectorDocument) -> ResolvedSize {
    if let Some([_, _, width, height]) = doc.attribute("viewBox").and_then(parse_view_box) {
        return ResolvedSize {
            width,
            height,
            source: SizeSource::ViewBox,
        };
    }

    let width = doc.attribute("width").and_then(parse_length);
    let height = doc.attribute("height").and_then(parse_length);
    let source = if width.is_some() || height.is_some() {
        SizeSource::Attributes
    } else {
        SizeSource::Default
    };

    ResolvedSize {
        width: width.unwrap_or(DEFAULT_EDGE),
        height: height.unwrap_or(DEFAULT_EDGE),
        source,
    }
}

/// Infer and round the size of a document.
pub fn resolve_dimensions(doc: &VectorDocument) -> ConvertResult<(ResolvedSize, Dimensions)> {
    let resolved = resolve_size(doc);
    let size = resolved.rounded()?;
    Ok((resolved, size))
}

/// Parse `min-x min-y width height`, separated by whitespace and/or commas.
fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let mut parts = value
        .split(|c: char| c.is_ascii_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().ok().filter(|v| v.is_finite()));

    let view_box = [parts.next()??, parts.next()??, parts.next()??, parts.next()??];
    parts.next().is_none().then_some(view_box)
}

/// Leading-number parse of a length attribute (`"120px"` → 120).
///
/// Zero counts as absent, like the browser's `parseFloat(..) || 300`.
fn parse_length(value: &str) -> Option<f64> {
    leading_number(value).filter(|v| *v != 0.0)
}

/// Parse the longest numeric prefix after leading whitespace.
fn leading_number(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if frac_digits > 0 || int_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().ok()
}

#[inline]
fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
