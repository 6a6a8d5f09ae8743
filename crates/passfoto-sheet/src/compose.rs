// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Slot composition — cover-fit the photo into one grid cell and draw a
// border snug around the pasted image content.

use image::imageops::{self, FilterType};
use image::RgbImage;
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{instrument, warn};

use passfoto_core::config::SheetConfig;
use passfoto_core::error::PassfotoError;
use passfoto_core::types::{Color, SlotSpec, StageOutcome};

/// Build one slot image: backdrop-filled cell of exactly `slot` pixels, the
/// photo cover-fitted into the inner area, and a border drawn around the
/// photo's actual bounds.
///
/// The inner area is the slot minus `border_px` on every side, floored at
/// 1 px per axis. Cover-fit preserves aspect ratio and crops overflow; when
/// it cannot run (an empty source), the slot falls back to an uncropped
/// scale-to-fit centred in the inner area and reports
/// `StageOutcome::Fallback`.
#[instrument(skip(photo), fields(photo_w = photo.width(), photo_h = photo.height(), slot_w = slot.width_px, slot_h = slot.height_px))]
pub fn compose_slot(
    photo: &RgbImage,
    slot: SlotSpec,
    config: &SheetConfig,
) -> Result<(RgbImage, StageOutcome), PassfotoError> {
    if slot.width_px == 0 || slot.height_px == 0 {
        return Err(PassfotoError::Composition(format!(
            "slot has no area ({}x{})",
            slot.width_px, slot.height_px
        )));
    }

    let border = config.border_px;
    let inner_w = slot.width_px.saturating_sub(2 * border).max(1);
    let inner_h = slot.height_px.saturating_sub(2 * border).max(1);

    let mut cell = RgbImage::from_pixel(
        slot.width_px,
        slot.height_px,
        image::Rgb(config.backdrop.0),
    );

    let (fitted, outcome) = match cover_fit(photo, inner_w, inner_h) {
        Some(fitted) => (Some(fitted), StageOutcome::Applied),
        None => {
            warn!("cover-fit not possible; falling back to scale-to-fit with backdrop margin");
            (fit_within(photo, inner_w, inner_h), StageOutcome::Fallback)
        }
    };

    if let Some(fitted) = fitted {
        // Centre within the inner area; the cover-fit path fills it exactly,
        // so this lands flush at the border offset.
        let paste_x = border + (inner_w - fitted.width()) / 2;
        let paste_y = border + (inner_h - fitted.height()) / 2;
        imageops::replace(&mut cell, &fitted, i64::from(paste_x), i64::from(paste_y));
        draw_frame(
            &mut cell,
            paste_x,
            paste_y,
            fitted.width(),
            fitted.height(),
            border,
            config.border_color,
        );
    }

    Ok((cell, outcome))
}

/// Scale so `(target_w, target_h)` is completely covered, then centre-crop
/// the overflow. Preserves aspect ratio; no letterboxing, no distortion.
///
/// Returns `None` when the source has no pixels to sample.
fn cover_fit(photo: &RgbImage, target_w: u32, target_h: u32) -> Option<RgbImage> {
    let (src_w, src_h) = photo.dimensions();
    if src_w == 0 || src_h == 0 {
        return None;
    }

    let scale = (f64::from(target_w) / f64::from(src_w))
        .max(f64::from(target_h) / f64::from(src_h));
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }

    // Crop in source space first so the expensive resample only touches the
    // pixels that survive.
    let crop_w = ((f64::from(target_w) / scale).round() as u32).clamp(1, src_w);
    let crop_h = ((f64::from(target_h) / scale).round() as u32).clamp(1, src_h);
    let crop_x = (src_w - crop_w) / 2;
    let crop_y = (src_h - crop_h) / 2;

    let cropped = imageops::crop_imm(photo, crop_x, crop_y, crop_w, crop_h).to_image();
    Some(imageops::resize(
        &cropped,
        target_w,
        target_h,
        FilterType::Lanczos3,
    ))
}

/// Shrink-only scale-to-fit inside `(max_w, max_h)`, preserving aspect
/// ratio. The degraded path: the result may leave backdrop visible.
fn fit_within(photo: &RgbImage, max_w: u32, max_h: u32) -> Option<RgbImage> {
    let (src_w, src_h) = photo.dimensions();
    if src_w == 0 || src_h == 0 {
        return None;
    }

    let scale = (f64::from(max_w) / f64::from(src_w))
        .min(f64::from(max_h) / f64::from(src_h))
        .min(1.0);
    let out_w = ((f64::from(src_w) * scale).round() as u32).clamp(1, max_w);
    let out_h = ((f64::from(src_h) * scale).round() as u32).clamp(1, max_h);
    Some(imageops::resize(photo, out_w, out_h, FilterType::Lanczos3))
}

/// Draw a `thickness`-wide rectangular frame just inside the pasted image's
/// bounds, clipped to the cell. One implementation: four filled rectangles.
fn draw_frame(
    cell: &mut RgbImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    thickness: u32,
    color: Color,
) {
    if thickness == 0 || width == 0 || height == 0 {
        return;
    }

    let left = x.min(cell.width().saturating_sub(1));
    let top = y.min(cell.height().saturating_sub(1));
    let right = (x + width - 1).min(cell.width() - 1);
    let bottom = (y + height - 1).min(cell.height() - 1);

    let span_w = right - left + 1;
    let span_h = bottom - top + 1;
    let t = thickness.min(span_w).min(span_h);
    let pixel = image::Rgb(color.0);

    let edges = [
        Rect::at(left as i32, top as i32).of_size(span_w, t),
        Rect::at(left as i32, (bottom + 1 - t) as i32).of_size(span_w, t),
        Rect::at(left as i32, top as i32).of_size(t, span_h),
        Rect::at((right + 1 - t) as i32, top as i32).of_size(t, span_h),
    ];
    for edge in edges {
        draw_filled_rect_mut(cell, edge, pixel);
    }
}

// -- Tests --------------------------------------------------------------------
