//! Viewport Sizes
//!
//! Real-world canvas dimensions in inches. The preset list is a convenience
//! for front ends; any positive width/height with an arbitrary label is
//! accepted everywhere else.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed pixel density used to size surfaces
pub const PIXELS_PER_INCH: f64 = 96.0;

/// Canvas dimensions in inches plus a display label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Width in inches
    pub width: f64,
    /// Height in inches
    pub height: f64,
    /// Display label (e.g. "8.5x11")
    pub label: String,
}

impl ViewportSize {
    /// Create a viewport (not validated, see [`ViewportSize::validate`])
    #[must_use]
    pub fn new(width: f64, height: f64, label: impl Into<String>) -> Self {
        Self {
            width,
            height,
            label: label.into(),
        }
    }

    /// Letter paper, the default canvas
    #[must_use]
    pub fn letter() -> Self {
        Self::new(8.5, 11.0, "8.5x11")
    }

    /// Check the viewport invariants: both dimensions positive and finite
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Return an error describing why the viewport is invalid
    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::invalid_viewport(format!(
                "width and height must be positive, got {}x{}",
                self.width, self.height
            )))
        }
    }

    /// Surface width in pixels
    #[must_use]
    pub fn pixel_width(&self) -> f64 {
        self.width * PIXELS_PER_INCH
    }

    /// Surface height in pixels
    #[must_use]
    pub fn pixel_height(&self) -> f64 {
        self.height * PIXELS_PER_INCH
    }

    /// Parse a `WIDTHxHEIGHT` string (inches). The label is the input itself.
    pub fn parse(size: &str) -> Result<Self> {
        let trimmed = size.trim();
        let (w, h) = trimmed
            .split_once(['x', 'X'])
            .ok_or_else(|| Error::InvalidSize(size.to_string()))?;

        let width: f64 = w
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSize(size.to_string()))?;
        let height: f64 = h
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSize(size.to_string()))?;

        let viewport = Self::new(width, height, trimmed);
        viewport.validate()?;
        Ok(viewport)
    }

    /// Look up a preset by label, falling back to parsing `WxH`
    pub fn from_label(label: &str) -> Result<Self> {
        if let Some(preset) = Self::presets()
            .into_iter()
            .find(|p| p.label.eq_ignore_ascii_case(label.trim()))
        {
            return Ok(preset);
        }
        Self::parse(label)
    }

    /// Common canvas sizes offered by front ends
    #[must_use]
    pub fn presets() -> Vec<Self> {
        vec![
            Self::letter(),
            Self::new(11.0, 17.0, "11x17"),
            Self::new(8.27, 11.69, "A4"),
            Self::new(11.69, 16.54, "A3"),
            Self::new(5.0, 7.0, "5x7"),
            Self::new(8.0, 10.0, "8x10"),
            Self::new(6.0, 6.0, "6x6"),
            Self::new(12.0, 12.0, "12x12"),
        ]
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::letter()
    }
}

impl std::fmt::Display for ViewportSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}in x {}in)", self.label, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_dimensions() {
        let viewport = ViewportSize::letter();
        assert_eq!(viewport.pixel_width(), 816.0);
        assert_eq!(viewport.pixel_height(), 1056.0);
    }

    #[test]
    fn test_validity() {
        assert!(ViewportSize::new(6.0, 6.0, "6x6").is_valid());
        assert!(!ViewportSize::new(0.0, 6.0, "0x6").is_valid());
        assert!(!ViewportSize::new(6.0, -1.0, "bad").is_valid());
        assert!(!ViewportSize::new(f64::NAN, 6.0, "nan").is_valid());
        assert!(ViewportSize::new(0.0, 1.0, "x").validate().is_err());
    }

    #[test]
    fn test_parse_size() {
        let viewport = ViewportSize::parse("8.5x11").unwrap();
        assert_eq!(viewport.width, 8.5);
        assert_eq!(viewport.height, 11.0);
        assert_eq!(viewport.label, "8.5x11");

        assert!(ViewportSize::parse("8.5 by 11").is_err());
        assert!(ViewportSize::parse("0x11").is_err());
    }

    #[test]
    fn test_arbitrary_label_accepted() {
        let viewport = ViewportSize::new(3.25, 9.0, "bookmark");
        assert!(viewport.validate().is_ok());
        assert!(!ViewportSize::presets().contains(&viewport));
    }

    #[test]
    fn test_from_label() {
        assert_eq!(ViewportSize::from_label("a4").unwrap().width, 8.27);
        assert_eq!(ViewportSize::from_label("7x3").unwrap().height, 3.0);
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(ViewportSize::new(6.0, 6.0, "6x6")).unwrap();
        assert_eq!(json["width"], 6.0);
        assert_eq!(json["height"], 6.0);
        assert_eq!(json["label"], "6x6");
    }
}
