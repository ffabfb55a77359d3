//! Genomic-to-pixel coordinate mapping for a single viewport.

use crate::types::{GenomicRange, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum rendered width of a feature box, in pixels.
pub const MIN_BOX_WIDTH_PX: f64 = 3.0;

/// Errors raised for invalid viewport parameters. These indicate an
/// integration bug in the caller, not data variance, so they fail fast.
#[derive(Debug, Error)]
pub enum CoordError {
    #[error("Empty viewport range: start {0} >= end {1}")]
    EmptyRange(Position, Position),
    #[error("Viewport has zero pixel dimension: {0}x{1}")]
    ZeroDimension(u32, u32),
}

/// Per-pass viewport parameters: visible genomic range plus pixel surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub start: Position,
    pub end: Position,
    pub width_px: u32,
    pub height_px: u32,
    bases_per_pixel: f64,
}

impl Viewport {
    pub fn new(start: Position, end: Position, width_px: u32, height_px: u32) -> Result<Self, CoordError> {
        if start >= end {
            return Err(CoordError::EmptyRange(start, end));
        }
        if width_px == 0 || height_px == 0 {
            return Err(CoordError::ZeroDimension(width_px, height_px));
        }
        let bases_per_pixel = (end - start) as f64 / width_px as f64;
        Ok(Self {
            start,
            end,
            width_px,
            height_px,
            bases_per_pixel,
        })
    }

    pub fn bases_per_pixel(&self) -> f64 {
        self.bases_per_pixel
    }

    pub fn range(&self) -> GenomicRange {
        GenomicRange::new(self.start, self.end)
    }
}

/// Horizontal pixel extent of a drawn box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelSpan {
    pub left: f64,
    pub width: f64,
}

impl PixelSpan {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Converts genomic base positions to pixel positions for one viewport.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    viewport: Viewport,
}

impl CoordinateMapper {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn bases_per_pixel(&self) -> f64 {
        self.viewport.bases_per_pixel
    }

    /// Pixel x of a genomic position. Positions left of the viewport map to
    /// negative pixels; callers cull as needed.
    pub fn to_pixel(&self, bp: Position) -> f64 {
        (bp as f64 - self.viewport.start as f64) / self.viewport.bases_per_pixel
    }

    /// Pixel x of a fractional genomic coordinate (used for between-base
    /// insertion placement).
    pub fn to_pixel_f(&self, bp: f64) -> f64 {
        (bp - self.viewport.start as f64) / self.viewport.bases_per_pixel
    }

    /// Pixel box for a genomic range. Boxes narrower than
    /// `MIN_BOX_WIDTH_PX` are widened to the minimum and shifted left by
    /// half the widening, keeping the box centered on the feature's true
    /// midpoint so it stays visible at any zoom.
    pub fn box_px(&self, range: GenomicRange) -> PixelSpan {
        let left = self.to_pixel(range.start);
        let width = range.len() as f64 / self.viewport.bases_per_pixel;
        if width < MIN_BOX_WIDTH_PX {
            PixelSpan {
                left: left - (MIN_BOX_WIDTH_PX - width) / 2.0,
                width: MIN_BOX_WIDTH_PX,
            }
        } else {
            PixelSpan { left, width }
        }
    }

    /// True when a pixel x coordinate falls on the drawing surface.
    pub fn is_visible_px(&self, x: f64) -> bool {
        x >= 0.0 && x <= self.viewport.width_px as f64
    }
}
