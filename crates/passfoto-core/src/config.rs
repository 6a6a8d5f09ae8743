// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet configuration — every knob of the layout, composition, and output
// stages in one immutable bundle. Built once per render request.

use serde::{Deserialize, Serialize};

use crate::error::PassfotoError;
use crate::types::{Color, OutputFormat, PhysicalSize};

/// Complete configuration for rendering one passport-photo sheet.
///
/// Defaults describe the stock layout: a 6×4 in sheet at 300 dpi holding a
/// 4×2 grid of 35×45 mm photos with dashed cut guides in the gutters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Print resolution in pixels per inch.
    pub dpi: u32,
    /// Physical paper size.
    pub paper: PhysicalSize,
    /// Number of photo columns on the sheet.
    pub cols: u32,
    /// Number of photo rows on the sheet.
    pub rows: u32,
    /// Desired physical size of one photo slot.
    pub slot: PhysicalSize,
    /// Minimum separator between slots and at the sheet edges, in pixels.
    pub min_sep_px: u32,
    /// Border thickness drawn around each photo, in pixels.
    pub border_px: u32,
    /// Sheet and gutter fill colour (also the isolation backdrop).
    pub backdrop: Color,
    /// Photo border colour.
    pub border_color: Color,
    /// Cut-guide colour.
    pub guide_color: Color,
    /// Length of one guide dash segment, in pixels.
    pub guide_dash_px: u32,
    /// Gap between guide dash segments, in pixels.
    pub guide_gap_px: u32,
    /// Guide line width, in pixels.
    pub guide_width_px: u32,
    /// Fraction of the edge separator left blank at each end of a guide line.
    pub guide_margin: f64,
    /// Output encoding for the finished sheet.
    pub format: OutputFormat,
    /// JPEG quality (1-100); ignored for PNG output.
    pub jpeg_quality: u8,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            paper: PhysicalSize::from_inches(6.0, 4.0),
            cols: 4,
            rows: 2,
            slot: PhysicalSize::from_mm(35.0, 45.0),
            min_sep_px: 8,
            border_px: 2,
            backdrop: Color::WHITE,
            border_color: Color::BLACK,
            guide_color: Color::GUIDE_GREY,
            guide_dash_px: 6,
            guide_gap_px: 6,
            guide_width_px: 1,
            guide_margin: 0.25,
            format: OutputFormat::Jpeg,
            jpeg_quality: 95,
        }
    }
}

impl SheetConfig {
    /// Reject configurations the solver must never see.
    ///
    /// The layout solver itself is total; degenerate grids and scales are a
    /// caller mistake and are reported here as configuration errors.
    pub fn validate(&self) -> Result<(), PassfotoError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(PassfotoError::Config(format!(
                "grid must have at least one column and one row (got {}x{})",
                self.cols, self.rows
            )));
        }
        if self.dpi == 0 {
            return Err(PassfotoError::Config("resolution must be non-zero".into()));
        }
        if self.paper.width_mm <= 0.0 || self.paper.height_mm <= 0.0 {
            return Err(PassfotoError::Config(format!(
                "paper size must be positive (got {:.1}x{:.1} mm)",
                self.paper.width_mm, self.paper.height_mm
            )));
        }
        if self.slot.width_mm <= 0.0 || self.slot.height_mm <= 0.0 {
            return Err(PassfotoError::Config(format!(
                "slot size must be positive (got {:.1}x{:.1} mm)",
                self.slot.width_mm, self.slot.height_mm
            )));
        }
        if !(0.0..=0.5).contains(&self.guide_margin) {
            return Err(PassfotoError::Config(format!(
                "guide margin must be within 0.0..=0.5 (got {})",
                self.guide_margin
            )));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(PassfotoError::Config(format!(
                "JPEG quality must be within 1..=100 (got {})",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SheetConfig::default().validate().expect("default config");
    }

    #[test]
    fn zero_grid_axis_is_rejected() {
        let cfg = SheetConfig {
            cols: 0,
            ..SheetConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PassfotoError::Config(_))));

        let cfg = SheetConfig {
            rows: 0,
            ..SheetConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PassfotoError::Config(_))));
    }

    #[test]
    fn out_of_range_quality_and_margin_are_rejected() {
        let cfg = SheetConfig {
            jpeg_quality: 0,
            ..SheetConfig::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SheetConfig {
            guide_margin: 0.75,
            ..SheetConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = SheetConfig::default();
        let json = serde_json::to_string(&cfg).expect("serialize");
        let back: SheetConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, cfg);
    }
}
