// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet rendering — replicate the composed slot across the grid and draw
// dashed cut guides centred in each gutter.

use image::imageops;
use image::RgbImage;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument};

use passfoto_core::config::SheetConfig;

use crate::layout::Layout;

/// Render the full sheet: a backdrop-filled canvas with every grid cell
/// stamped from `slot_image`, then dashed cut guides in the gutters.
///
/// Guides are clamped to the gutter span, so they never touch slot pixels.
#[instrument(skip(slot_image, layout), fields(cols = layout.grid.cols, rows = layout.grid.rows))]
pub fn render_sheet(slot_image: &RgbImage, layout: &Layout, config: &SheetConfig) -> RgbImage {
    let grid = layout.grid;
    let slot = layout.slot;

    let mut canvas = RgbImage::from_pixel(
        grid.canvas_w_px,
        grid.canvas_h_px,
        image::Rgb(config.backdrop.0),
    );

    for row in 0..grid.rows {
        for col in 0..grid.cols {
            let (x, y) = grid.slot_origin(slot, col, row);
            imageops::replace(&mut canvas, slot_image, i64::from(x), i64::from(y));
        }
    }

    draw_cut_guides(&mut canvas, layout, config);
    debug!(
        width = canvas.width(),
        height = canvas.height(),
        "sheet canvas rendered"
    );
    canvas
}

/// Dashed lines centred in every internal gutter, with a configurable blank
/// margin at each end.
fn draw_cut_guides(canvas: &mut RgbImage, layout: &Layout, config: &SheetConfig) {
    let grid = layout.grid;
    let slot = layout.slot;
    let pixel = image::Rgb(config.guide_color.0);
    let dash = config.guide_dash_px.max(1);
    let gap = config.guide_gap_px;

    // Vertical guides between columns.
    let width = config.guide_width_px.min(grid.sep_x_px);
    if width > 0 {
        let y_start = (f64::from(grid.sep_y_px) * config.guide_margin) as i64;
        let y_end = f64::from(grid.canvas_h_px) as i64
            - (f64::from(grid.sep_y_px) * config.guide_margin) as i64;
        for k in 1..grid.cols {
            // Gutter k spans [k*(slot+sep), k*(slot+sep) + sep).
            let gutter_start = i64::from(k) * i64::from(slot.width_px + grid.sep_x_px);
            let centre = gutter_start + i64::from(grid.sep_x_px) / 2;
            let x = (centre - i64::from(width) / 2)
                .clamp(gutter_start, gutter_start + i64::from(grid.sep_x_px - width));

            let mut y = y_start;
            while y < y_end {
                let len = (dash as i64).min(y_end - y);
                draw_filled_rect_mut(
                    canvas,
                    Rect::at(x as i32, y as i32).of_size(width, len as u32),
                    pixel,
                );
                y += i64::from(dash + gap);
            }
        }
    }

    // Horizontal guides between rows.
    let width = config.guide_width_px.min(grid.sep_y_px);
    if width > 0 {
        let x_start = (f64::from(grid.sep_x_px) * config.guide_margin) as i64;
        let x_end = f64::from(grid.canvas_w_px) as i64
            - (f64::from(grid.sep_x_px) * config.guide_margin) as i64;
        for k in 1..grid.rows {
            let gutter_start = i64::from(k) * i64::from(slot.height_px + grid.sep_y_px);
            let centre = gutter_start + i64::from(grid.sep_y_px) / 2;
            let y = (centre - i64::from(width) / 2)
                .clamp(gutter_start, gutter_start + i64::from(grid.sep_y_px - width));

            let mut x = x_start;
            while x < x_end {
                let len = (dash as i64).min(x_end - x);
                draw_filled_rect_mut(
                    canvas,
                    Rect::at(x as i32, y as i32).of_size(len as u32, width),
                    pixel,
                );
                x += i64::from(dash + gap);
            }
        }
    }
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::solve;
    use image::Rgb;

    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn black_slot(layout: &Layout) -> RgbImage {
        RgbImage::from_pixel(layout.slot.width_px, layout.slot.height_px, BLACK)
    }

    #[test]
    fn canvas_matches_solved_dimensions() {
        let cfg = SheetConfig::default();
        let layout = solve(&cfg);
        let sheet = render_sheet(&black_slot(&layout), &layout, &cfg);
        assert_eq!(
            sheet.dimensions(),
            (layout.grid.canvas_w_px, layout.grid.canvas_h_px)
        );
    }

    #[test]
    fn every_slot_is_stamped_at_its_origin() {
        let cfg = SheetConfig::default();
        let layout = solve(&cfg);
        let sheet = render_sheet(&black_slot(&layout), &layout, &cfg);

        for row in 0..layout.grid.rows {
            for col in 0..layout.grid.cols {
                let (x, y) = layout.grid.slot_origin(layout.slot, col, row);
                assert_eq!(sheet.get_pixel(x, y), &BLACK, "slot ({col},{row})");
                // One pixel up-left is gutter.
                assert_eq!(sheet.get_pixel(x - 1, y - 1), &WHITE);
            }
        }
    }

    /// Red guides on a white sheet holding black slots: no red pixel may
    /// appear inside any slot rectangle, and at least one must appear in a
    /// gutter.
    #[test]
    fn guides_stay_inside_gutters() {
        let cfg = SheetConfig {
            guide_color: passfoto_core::types::Color([255, 0, 0]),
            guide_width_px: 3,
            ..SheetConfig::default()
        };
        let layout = solve(&cfg);
        let sheet = render_sheet(&black_slot(&layout), &layout, &cfg);

        for row in 0..layout.grid.rows {
            for col in 0..layout.grid.cols {
                let (x0, y0) = layout.grid.slot_origin(layout.slot, col, row);
                for y in y0..y0 + layout.slot.height_px {
                    for x in x0..x0 + layout.slot.width_px {
                        assert_eq!(
                            sheet.get_pixel(x, y),
                            &BLACK,
                            "guide bled into slot ({col},{row}) at ({x},{y})"
                        );
                    }
                }
            }
        }

        let guide_pixels = sheet
            .pixels()
            .filter(|px| **px == Rgb([255, 0, 0]))
            .count();
        assert!(guide_pixels > 0, "no guide pixels drawn at all");
    }

    #[test]
    fn rendering_is_deterministic() {
        let cfg = SheetConfig::default();
        let layout = solve(&cfg);
        let slot = black_slot(&layout);

        let a = render_sheet(&slot, &layout, &cfg);
        let b = render_sheet(&slot, &layout, &cfg);
        assert_eq!(a.as_raw(), b.as_raw());
    }

    /// A single-column grid has no internal boundaries, so no guides.
    #[test]
    fn single_cell_grid_draws_no_guides() {
        let cfg = SheetConfig {
            cols: 1,
            rows: 1,
            guide_color: passfoto_core::types::Color([255, 0, 0]),
            ..SheetConfig::default()
        };
        let layout = solve(&cfg);
        let sheet = render_sheet(&black_slot(&layout), &layout, &cfg);

        assert!(sheet.pixels().all(|px| *px != Rgb([255, 0, 0])));
    }
}
