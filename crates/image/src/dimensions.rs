//! Dimension math: aspect-locked field synchronization and output size resolution.

use crate::{ImageError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Dimensions {
    /// Create dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either edge is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Scale `changed_value` from one edge onto the other.
///
/// Computes `round(other_natural * changed_value / changed_natural)` exactly,
/// rounding halves up. Returns `None` when `changed_natural` is zero.
///
/// # Example
/// ```
/// use imgconv_image::dimensions::scale_edge;
///
/// // 1000x500 source, width set to 500
/// assert_eq!(scale_edge(500, 500, 1000), Some(250));
/// ```
pub fn scale_edge(other_natural: u32, changed_value: i64, changed_natural: u32) -> Option<i64> {
    if changed_natural == 0 {
        return None;
    }
    let numerator = 2 * i128::from(other_natural) * i128::from(changed_value) + i128::from(changed_natural);
    let denominator = 2 * i128::from(changed_natural);
    let rounded = numerator.div_euclid(denominator);
    Some(i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX }))
}

/// The width/height inputs and the aspect-ratio toggle.
///
/// Values are kept signed and optional: an empty field is `None`, and
/// non-positive values survive until conversion rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFields {
    width: Option<i64>,
    height: Option<i64>,
    maintain_aspect: bool,
    natural: Dimensions,
}

impl Default for DimensionFields {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DimensionFields {
    /// Empty fields with the given aspect-lock setting.
    pub fn new(maintain_aspect: bool) -> Self {
        Self {
            width: None,
            height: None,
            maintain_aspect,
            natural: Dimensions::default(),
        }
    }

    /// Record the natural size of a freshly loaded image and fill both fields with it.
    pub fn populate(&mut self, natural: Dimensions) {
        self.natural = natural;
        self.restore();
    }

    /// Put both fields back to the last recorded natural size.
    ///
    /// With no natural size recorded the fields are cleared.
    pub fn restore(&mut self) {
        if self.natural.is_empty() {
            self.width = None;
            self.height = None;
        } else {
            self.width = Some(i64::from(self.natural.width));
            self.height = Some(i64::from(self.natural.height));
        }
    }

    /// Edit the width field.
    pub fn set_width(&mut self, value: Option<i64>) {
        self.width = value;
        if self.maintain_aspect {
            if let Some(height) = self.follow(value, self.natural.height, self.natural.width) {
                self.height = height;
            }
        }
    }

    /// Edit the height field.
    pub fn set_height(&mut self, value: Option<i64>) {
        self.height = value;
        if self.maintain_aspect {
            if let Some(width) = self.follow(value, self.natural.width, self.natural.height) {
                self.width = width;
            }
        }
    }

    // Outer None: leave the partner alone. Inner None: clear it.
    fn follow(&self, changed: Option<i64>, other_natural: u32, changed_natural: u32) -> Option<Option<i64>> {
        if changed_natural == 0 {
            return None;
        }
        match changed {
            Some(value) => scale_edge(other_natural, value, changed_natural).map(Some),
            None => Some(None),
        }
    }

    /// Toggle aspect locking. Existing values are not recomputed.
    pub fn set_maintain_aspect(&mut self, on: bool) {
        self.maintain_aspect = on;
    }

    /// Current width field.
    pub fn width(&self) -> Option<i64> {
        self.width
    }

    /// Current height field.
    pub fn height(&self) -> Option<i64> {
        self.height
    }

    /// Whether edits keep the natural aspect ratio.
    pub fn maintain_aspect(&self) -> bool {
        self.maintain_aspect
    }

    /// Natural size recorded at the last successful intake.
    pub fn natural(&self) -> Dimensions {
        self.natural
    }
}

/// Resolve the output size of a conversion.
///
/// - both edges given: used as-is (distortion allowed), each must be positive
/// - one edge given: the other follows the natural aspect ratio
/// - neither: the natural size
///
/// The result must be strictly positive. A size other than the natural one
/// may not exceed `max_edge` on either edge; the natural size always passes,
/// since the source was already decoded at that size.
pub fn resolve_dimensions(
    natural: Dimensions,
    width: Option<i64>,
    height: Option<i64>,
    max_edge: u32,
) -> Result<Dimensions> {
    let (w, h) = match (width, height) {
        (Some(w), Some(h)) => {
            if w <= 0 || h <= 0 {
                return Err(ImageError::Dimension(
                    "Width and height must be positive numbers".into(),
                ));
            }
            (w, h)
        }
        (Some(w), None) => {
            if w <= 0 {
                return Err(ImageError::Dimension("Width must be a positive number".into()));
            }
            let h = scale_edge(natural.height, w, natural.width)
                .ok_or_else(|| ImageError::Dimension("Source width is zero".into()))?;
            (w, h)
        }
        (None, Some(h)) => {
            if h <= 0 {
                return Err(ImageError::Dimension("Height must be a positive number".into()));
            }
            let w = scale_edge(natural.width, h, natural.height)
                .ok_or_else(|| ImageError::Dimension("Source height is zero".into()))?;
            (w, h)
        }
        (None, None) => (i64::from(natural.width), i64::from(natural.height)),
    };

    if w <= 0 || h <= 0 {
        return Err(ImageError::Dimension(format!(
            "Resolved size {}x{} is not positive",
            w, h
        )));
    }

    let limit = i64::from(max_edge);
    let is_natural = w == i64::from(natural.width) && h == i64::from(natural.height);
    if !is_natural && (w > limit || h > limit) {
        return Err(ImageError::Dimension(format!(
            "Resolved size {}x{} exceeds the {} pixel limit",
            w, h, max_edge
        )));
    }

    // Both values are within 1..=u32::MAX here.
    Ok(Dimensions::new(w as u32, h as u32))
}
