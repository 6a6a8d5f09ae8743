// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Passfoto sheet generator.

use serde::{Deserialize, Serialize};

/// Millimetres per inch, used for all physical ↔ pixel conversions.
pub const MM_PER_INCH: f64 = 25.4;

/// Print resolution in pixels per inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution(pub u32);

impl Resolution {
    /// Convert a physical length in millimetres to pixels at this resolution,
    /// rounded to the nearest pixel.
    pub fn mm_to_px(self, mm: f64) -> u32 {
        ((mm / MM_PER_INCH) * f64::from(self.0)).round().max(0.0) as u32
    }

    /// Convert a physical length in inches to pixels at this resolution.
    pub fn inches_to_px(self, inches: f64) -> u32 {
        (inches * f64::from(self.0)).round().max(0.0) as u32
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} dpi", self.0)
    }
}

/// A physical width/height pair, stored in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PhysicalSize {
    pub fn from_mm(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    pub fn from_inches(width_in: f64, height_in: f64) -> Self {
        Self {
            width_mm: width_in * MM_PER_INCH,
            height_mm: height_in * MM_PER_INCH,
        }
    }

    /// Pixel dimensions of this size at the given resolution.
    pub fn to_pixels(&self, resolution: Resolution) -> (u32, u32) {
        (
            resolution.mm_to_px(self.width_mm),
            resolution.mm_to_px(self.height_mm),
        )
    }
}

/// An opaque RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Color = Color([255, 255, 255]);
    pub const BLACK: Color = Color([0, 0, 0]);
    /// Subtle grey used for cut guides so they survive printing but do not
    /// dominate the sheet.
    pub const GUIDE_GREY: Color = Color([80, 80, 80]);
}

/// Final pixel dimensions of one grid cell, after any shrink-to-fit.
///
/// Invariant: both dimensions are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpec {
    pub width_px: u32,
    pub height_px: u32,
}

/// The solved placement grid for a sheet.
///
/// Invariant: `cols*slot_w + (cols+1)*sep_x_px <= canvas_w_px` (and the
/// analogous row constraint) whenever a non-degenerate solution exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    pub cols: u32,
    pub rows: u32,
    pub sep_x_px: u32,
    pub sep_y_px: u32,
    pub canvas_w_px: u32,
    pub canvas_h_px: u32,
}

impl GridSpec {
    /// Top-left pixel of the slot at `(col, row)`.
    pub fn slot_origin(&self, slot: SlotSpec, col: u32, row: u32) -> (u32, u32) {
        (
            self.sep_x_px + col * (slot.width_px + self.sep_x_px),
            self.sep_y_px + row * (slot.height_px + self.sep_y_px),
        )
    }

    /// Whether the grid of `slot`-sized cells plus separators fits the canvas.
    pub fn fits(&self, slot: SlotSpec) -> bool {
        let needed_w = u64::from(self.cols) * u64::from(slot.width_px)
            + (u64::from(self.cols) + 1) * u64::from(self.sep_x_px);
        let needed_h = u64::from(self.rows) * u64::from(slot.height_px)
            + (u64::from(self.rows) + 1) * u64::from(self.sep_y_px);
        needed_w <= u64::from(self.canvas_w_px) && needed_h <= u64::from(self.canvas_h_px)
    }
}

/// Raster interchange formats the output encoder supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    /// MIME type string for transport headers.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Conventional file extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Infer the format from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

/// How an optional pipeline stage concluded.
///
/// Every catch-and-fall-back step reports one of these instead of silently
/// swallowing its failure, so callers and tests can observe which path ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageOutcome {
    /// The stage ran and its result was used.
    Applied,
    /// The stage was not attempted (capability absent).
    Skipped,
    /// The stage was attempted, failed, and the pipeline continued with a
    /// degraded best-effort result.
    Fallback,
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mm_to_px_matches_passport_slot_at_300dpi() {
        let dpi = Resolution(300);
        // 35 x 45 mm is the common passport photo size.
        assert_eq!(dpi.mm_to_px(35.0), 413);
        assert_eq!(dpi.mm_to_px(45.0), 531);
    }

    #[test]
    fn six_by_four_inch_paper_is_1800_by_1200_at_300dpi() {
        let paper = PhysicalSize::from_inches(6.0, 4.0);
        assert_eq!(paper.to_pixels(Resolution(300)), (1800, 1200));
    }

    #[test]
    fn slot_origin_steps_by_slot_plus_separator() {
        let grid = GridSpec {
            cols: 4,
            rows: 2,
            sep_x_px: 29,
            sep_y_px: 46,
            canvas_w_px: 1800,
            canvas_h_px: 1200,
        };
        let slot = SlotSpec {
            width_px: 413,
            height_px: 531,
        };
        assert_eq!(grid.slot_origin(slot, 0, 0), (29, 46));
        assert_eq!(grid.slot_origin(slot, 1, 0), (29 + 413 + 29, 46));
        assert_eq!(grid.slot_origin(slot, 0, 1), (29, 46 + 531 + 46));
        assert!(grid.fits(slot));
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("JPG"), Some(OutputFormat::Jpeg));
        assert_eq!(OutputFormat::from_extension("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::from_extension("tiff"), None);
    }
}
