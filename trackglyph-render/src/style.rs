//! Rendering style threaded explicitly through draw calls.
//!
//! One `RenderStyle` value travels through a pass by reference; there is no
//! ambient save/restore stack to keep balanced.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    /// Vertical pitch of one display row.
    pub row_height_px: f64,
    /// Height of a filled feature block within its row.
    pub block_height_px: f64,
    /// Horizontal spacing between directional chevrons.
    pub chevron_spacing_px: f64,
    /// Approximate width of one glyph character, used for label sizing and
    /// deciding when base/codon letters are legible.
    pub char_width_px: f64,
    pub show_mismatches: bool,
    pub show_codons: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            row_height_px: 14.0,
            block_height_px: 10.0,
            chevron_spacing_px: 12.0,
            char_width_px: 7.0,
            show_mismatches: true,
            show_codons: true,
        }
    }
}

impl RenderStyle {
    pub fn row_top(&self, row: usize) -> f64 {
        row as f64 * self.row_height_px
    }

    pub fn row_center(&self, row: usize) -> f64 {
        self.row_top(row) + self.row_height_px / 2.0
    }

    /// Top edge of the filled block, centered within the row.
    pub fn block_top(&self, row: usize) -> f64 {
        self.row_top(row) + (self.row_height_px - self.block_height_px) / 2.0
    }
}
