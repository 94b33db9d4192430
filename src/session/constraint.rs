//! Aspect ratio lock for the displayed width/height fields.
//!
//! ```text
//!            toggle (captures w/h from the fields)
//!   Unlocked ─────────────────────────────────────▶ Locked
//!      ▲                                              │
//!      └──────────────────────────────────────────────┘
//!            toggle (no recomputation)
//! ```

use crate::error::{ConvertError, ConvertResult};
use crate::image::svg::{DEFAULT_EDGE, Dimensions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConstraintMode {
    #[default]
    Unlocked,
    Locked,
}

impl ConstraintMode {
    pub const fn is_locked(self) -> bool {
        matches!(self, Self::Locked)
    }
}

/// Which displayed field the user edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

// ============================================================================
// DimensionFields
// ============================================================================

/// The two integer inputs shown to the user.
///
/// They hold whatever was typed, including zero or negative values; only a
/// pair that is positive on both axes ever reaches the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionFields {
    pub width: i64,
    pub height: i64,
}

impl Default for DimensionFields {
    #[allow(clippy::cast_possible_truncation)]
    fn default() -> Self {
        let edge = DEFAULT_EDGE as i64;
        Self {
            width: edge,
            height: edge,
        }
    }
}

impl DimensionFields {
    pub fn set(&mut self, axis: Axis, value: i64) {
        match axis {
            Axis::Width => self.width = value,
            Axis::Height => self.height = value,
        }
    }

    /// Validated pixel size, `InvalidDimensions` unless both fields are positive.
    #[allow(clippy::cast_precision_loss)]
    pub fn to_dimensions(&self) -> ConvertResult<Dimensions> {
        match (u32::try_from(self.width), u32::try_from(self.height)) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(Dimensions::new(w, h)),
            _ => Err(ConvertError::invalid_dimensions(
                self.width as f64,
                self.height as f64,
            )),
        }
    }
}

impl From<Dimensions> for DimensionFields {
    fn from(size: Dimensions) -> Self {
        Self {
            width: i64::from(size.width),
            height: i64::from(size.height),
        }
    }
}

// ============================================================================
// AspectConstraint
// ============================================================================

/// Lock state plus the ratio it holds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AspectConstraint {
    mode: ConstraintMode,
    ratio: Option<f64>,
}

impl AspectConstraint {
    pub const fn mode(&self) -> ConstraintMode {
        self.mode
    }

    pub const fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    /// Store a ratio computed elsewhere (on document load). Non-finite or
    /// non-positive values clear it.
    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = usable(ratio);
    }

    /// Flip the mode. Locking captures the ratio of the displayed fields;
    /// a pair without a usable ratio locks with no ratio, so edits stand alone.
    pub fn toggle(&mut self, fields: &DimensionFields) -> ConstraintMode {
        self.mode = match self.mode {
            ConstraintMode::Unlocked => {
                #[allow(clippy::cast_precision_loss)]
                let captured = fields.width as f64 / fields.height as f64;
                self.ratio = usable(captured);
                ConstraintMode::Locked
            }
            ConstraintMode::Locked => ConstraintMode::Unlocked,
        };
        self.mode
    }

    /// Set `axis` to `value`, recomputing the other field when locked.
    ///
    /// Returns `true` if the other field was recomputed.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn apply(&self, fields: &mut DimensionFields, axis: Axis, value: i64) -> bool {
        fields.set(axis, value);

        let ratio = match (self.mode, self.ratio) {
            (ConstraintMode::Locked, Some(ratio)) => ratio,
            _ => return false,
        };

        match axis {
            Axis::Width => fields.height = (value as f64 / ratio).round() as i64,
            Axis::Height => fields.width = (value as f64 * ratio).round() as i64,
        }
        true
    }
}

fn usable(ratio: f64) -> Option<f64> {
    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locked_at(ratio: f64) -> AspectConstraint {
        AspectConstraint {
            mode: ConstraintMode::Locked,
            ratio: Some(ratio),
        }
    }

    #[test]
    fn test_locked_width_edit_recomputes_height() {
        let constraint = locked_at(2.0);
        let mut fields = DimensionFields {
            width: 100,
            height: 50,
        };
        assert!(constraint.apply(&mut fields, Axis::Width, 150));
        assert_eq!(fields, DimensionFields { width: 150, height: 75 });
    }

    #[test]
    fn test_locked_height_edit_recomputes_width() {
        let constraint = locked_at(2.0);
        let mut fields = DimensionFields::default();
        constraint.apply(&mut fields, Axis::Height, 33);
        assert_eq!(fields, DimensionFields { width: 66, height: 33 });
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let constraint = locked_at(4.0);
        let mut fields = DimensionFields::default();
        constraint.apply(&mut fields, Axis::Width, 10);
        assert_eq!(fields.height, 3); // 2.5 -> 3

        let constraint = locked_at(0.5);
        constraint.apply(&mut fields, Axis::Height, 5);
        assert_eq!(fields.width, 3); // 2.5 -> 3
    }

    #[test]
    fn test_unlocked_edits_stand_alone() {
        let constraint = AspectConstraint {
            mode: ConstraintMode::Unlocked,
            ratio: Some(2.0),
        };
        let mut fields = DimensionFields {
            width: 100,
            height: 50,
        };
        assert!(!constraint.apply(&mut fields, Axis::Width, 150));
        assert_eq!(fields, DimensionFields { width: 150, height: 50 });
        constraint.apply(&mut fields, Axis::Height, 7);
        assert_eq!(fields, DimensionFields { width: 150, height: 7 });
    }

    #[test]
    fn test_toggle_off_then_edit_leaves_height() {
        let mut constraint = AspectConstraint::default();
        let mut fields = DimensionFields {
            width: 100,
            height: 50,
        };
        assert_eq!(constraint.toggle(&fields), ConstraintMode::Locked);
        assert_eq!(constraint.toggle(&fields), ConstraintMode::Unlocked);

        constraint.apply(&mut fields, Axis::Width, 400);
        assert_eq!(fields, DimensionFields { width: 400, height: 50 });
    }

    #[test]
    fn test_lock_captures_displayed_fields() {
        let mut constraint = AspectConstraint::default();
        constraint.set_ratio(2.0);

        // User changed the fields while unlocked; the lock uses these.
        let mut fields = DimensionFields {
            width: 90,
            height: 30,
        };
        constraint.toggle(&fields);
        assert_eq!(constraint.ratio(), Some(3.0));

        constraint.apply(&mut fields, Axis::Width, 60);
        assert_eq!(fields.height, 20);
    }

    #[test]
    fn test_lock_with_degenerate_fields_clears_ratio() {
        let mut constraint = AspectConstraint::default();
        constraint.set_ratio(2.0);
        let mut fields = DimensionFields {
            width: 10,
            height: 0,
        };
        constraint.toggle(&fields);
        assert_eq!(constraint.mode(), ConstraintMode::Locked);
        assert_eq!(constraint.ratio(), None);

        assert!(!constraint.apply(&mut fields, Axis::Height, 80));
        assert_eq!(fields, DimensionFields { width: 10, height: 80 });
    }

    #[test]
    fn test_set_ratio_rejects_unusable() {
        let mut constraint = AspectConstraint::default();
        constraint.set_ratio(f64::INFINITY);
        assert_eq!(constraint.ratio(), None);
        constraint.set_ratio(0.0);
        assert_eq!(constraint.ratio(), None);

        // Locked without a ratio behaves like unlocked.
        let mut locked = constraint;
        locked.mode = ConstraintMode::Locked;
        let mut fields = DimensionFields::default();
        assert!(!locked.apply(&mut fields, Axis::Width, 10));
        assert_eq!(fields.height, 300);
    }

    #[test]
    fn test_fields_to_dimensions() {
        let fields = DimensionFields {
            width: 120,
            height: 40,
        };
        assert_eq!(fields.to_dimensions().unwrap(), Dimensions::new(120, 40));

        let fields = DimensionFields {
            width: 0,
            height: 40,
        };
        assert!(matches!(
            fields.to_dimensions(),
            Err(ConvertError::InvalidDimensions { .. })
        ));

        let fields = DimensionFields {
            width: -5,
            height: 40,
        };
        assert!(fields.to_dimensions().is_err());
    }
}
