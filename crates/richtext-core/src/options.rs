//! Configuration options for rich text conversion

use crate::{ConvertError, Result};

/// Relative font sizes for heading levels 0 (`<h1>`) to 5 (`<h6>`)
const HEADER_SIZES: [f32; 6] = [1.5, 1.4, 1.3, 1.2, 1.1, 1.0];

/// Options shared by both conversion directions
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// Scale between device-independent font units and pixels.
    /// `sp = round(px * font_density)`.
    pub font_density: f32,

    /// Relative font size per heading level (0 = `<h1>`)
    pub header_sizes: [f32; 6],
}

impl Default for Options {
    fn default() -> Self {
        Self {
            font_density: 1.0,
            header_sizes: HEADER_SIZES,
        }
    }
}

impl Options {
    pub fn with_font_density(mut self, density: f32) -> Self {
        self.font_density = density;
        self
    }

    pub fn with_header_sizes(mut self, sizes: [f32; 6]) -> Self {
        self.header_sizes = sizes;
        self
    }

    /// Check that the options can drive a conversion
    pub fn validate(&self) -> Result<()> {
        if !self.font_density.is_finite() || self.font_density <= 0.0 {
            return Err(ConvertError::InvalidOptions(format!(
                "font density must be a positive number, got {}",
                self.font_density
            )));
        }
        if let Some(size) = self
            .header_sizes
            .iter()
            .find(|s| !s.is_finite() || **s <= 0.0)
        {
            return Err(ConvertError::InvalidOptions(format!(
                "header sizes must be positive numbers, got {}",
                size
            )));
        }
        Ok(())
    }

    /// Convert absolute pixels to scale dependent font units
    pub fn px_to_sp(&self, px: u32) -> u32 {
        (px as f32 * self.font_density).round() as u32
    }

    /// Convert scale dependent font units to absolute pixels
    pub fn sp_to_px(&self, sp: u32) -> u32 {
        (sp as f32 / self.font_density).round() as u32
    }

    /// Relative font size for a heading level, clamped to the last level
    pub fn header_size(&self, level: usize) -> f32 {
        self.header_sizes[level.min(self.header_sizes.len() - 1)]
    }

    /// Heading level whose relative size is `scale`, if any
    pub fn heading_level(&self, scale: f32) -> Option<usize> {
        self.header_sizes
            .iter()
            .position(|size| (size - scale).abs() < f32::EPSILON)
    }
}
