// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grid layout solver — pure geometry.
//
// Given paper size, resolution, desired slot physical size, grid shape, and
// minimum gutter, derives the final slot pixel dimensions and gutter sizes.
// If the desired slots do not fit, both slot axes are shrunk uniformly while
// the gutters are held at the configured minimum.

use serde::{Deserialize, Serialize};
use tracing::debug;

use passfoto_core::config::SheetConfig;
use passfoto_core::types::{GridSpec, Resolution, SlotSpec};

/// The solved geometry for one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub slot: SlotSpec,
    pub grid: GridSpec,
    /// Uniform shrink factor applied to the desired slot size, in `(0, 1]`.
    /// 1.0 means the desired size fitted without shrinking.
    pub shrink: f64,
}

/// Solve the sheet geometry for `config`.
///
/// Total for every validated configuration: always returns a geometry, never
/// fails. Rounding never produces a separator below the configured minimum or
/// a zero-pixel slot dimension. Degenerate inputs (paper too small to hold
/// even the minimum gutters) still yield a clamped geometry; the fit
/// guarantee only holds when a non-degenerate solution exists.
pub fn solve(config: &SheetConfig) -> Layout {
    let dpi = Resolution(config.dpi);
    let (canvas_w, canvas_h) = config.paper.to_pixels(dpi);
    let (cols, rows) = (config.cols, config.rows);
    let min_sep = config.min_sep_px;

    let desired_w = dpi.mm_to_px(config.slot.width_mm).max(1);
    let desired_h = dpi.mm_to_px(config.slot.height_mm).max(1);

    let mut slot_w = desired_w;
    let mut slot_h = desired_h;
    let mut sep_x = separator(canvas_w, cols, slot_w, min_sep);
    let mut sep_y = separator(canvas_h, rows, slot_h, min_sep);

    let mut shrink = 1.0_f64;
    if !fits(canvas_w, cols, slot_w, sep_x) || !fits(canvas_h, rows, slot_h, sep_y) {
        let scale_x = axis_scale(canvas_w, cols, slot_w, min_sep);
        let scale_y = axis_scale(canvas_h, rows, slot_h, min_sep);
        let mut scale = scale_x.min(scale_y).min(1.0);
        if scale <= 0.0 {
            scale = 1.0;
        }

        // Floor rather than round: rounding up can overshoot the canvas by a
        // pixel when the scale lands exactly on the available width.
        slot_w = ((f64::from(slot_w) * scale).floor() as u32).max(1);
        slot_h = ((f64::from(slot_h) * scale).floor() as u32).max(1);
        sep_x = separator(canvas_w, cols, slot_w, min_sep);
        sep_y = separator(canvas_h, rows, slot_h, min_sep);
        shrink = scale;

        debug!(
            scale,
            slot_w,
            slot_h,
            "desired slots exceeded the canvas; shrunk uniformly"
        );
    }

    Layout {
        slot: SlotSpec {
            width_px: slot_w,
            height_px: slot_h,
        },
        grid: GridSpec {
            cols,
            rows,
            sep_x_px: sep_x,
            sep_y_px: sep_y,
            canvas_w_px: canvas_w,
            canvas_h_px: canvas_h,
        },
        shrink,
    }
}

/// `max(min_sep, floor((canvas - n*slot) / (n+1)))`, clamped so rounding can
/// never yield a negative separator.
fn separator(canvas: u32, n: u32, slot: u32, min_sep: u32) -> u32 {
    let free = i64::from(canvas) - i64::from(n) * i64::from(slot);
    let sep = free.div_euclid(i64::from(n) + 1);
    sep.max(i64::from(min_sep)) as u32
}

fn fits(canvas: u32, n: u32, slot: u32, sep: u32) -> bool {
    let needed = u64::from(n) * u64::from(slot) + (u64::from(n) + 1) * u64::from(sep);
    needed <= u64::from(canvas)
}

/// Shrink factor for one axis assuming the gutters on that axis collapse to
/// the minimum. An axis whose canvas cannot even hold the minimum gutters is
/// treated as unconstrained.
fn axis_scale(canvas: u32, n: u32, slot: u32, min_sep: u32) -> f64 {
    let free = f64::from(canvas) - (f64::from(n) + 1.0) * f64::from(min_sep);
    if free > 0.0 {
        free / (f64::from(n) * f64::from(slot))
    } else {
        1.0
    }
}

// -- Tests --------------------------------------------------------------------
