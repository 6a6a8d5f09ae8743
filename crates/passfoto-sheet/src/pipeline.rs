// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The sheet pipeline — decode, normalize, solve, compose, render, encode.
//
// Stage order matters: an undecodable source must fail before any geometry
// or compositing work happens, and the solver consumes only configuration.

use tracing::{info, instrument};

use passfoto_core::config::SheetConfig;
use passfoto_core::error::PassfotoError;
use passfoto_core::types::{OutputFormat, StageOutcome};

use crate::layout::{self, Layout};
use crate::segment::Segmenter;
use crate::{compose, encode, normalize, render};

/// The finished sheet plus everything a caller needs to observe how it was
/// produced: final geometry and the outcome of each fallible stage.
#[derive(Debug)]
pub struct RenderedSheet {
    /// Encoded sheet in the configured interchange format.
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width_px: u32,
    pub height_px: u32,
    /// The solved geometry, including any shrink that was applied.
    pub layout: Layout,
    /// Orientation correction outcome.
    pub orientation: StageOutcome,
    /// Subject isolation outcome.
    pub isolation: StageOutcome,
    /// Cover-fit outcome for the slot composition.
    pub slot_fit: StageOutcome,
}

/// Generate a passport-photo sheet from encoded source bytes.
///
/// Recoverable stage failures (orientation metadata, subject isolation,
/// cover-fit) degrade the result and are reported in the returned
/// `RenderedSheet`; only decoding, composition, and encoding failures — and
/// an invalid configuration — abort with an error.
#[instrument(skip(bytes, segmenter), fields(data_len = bytes.len(), segmenter = segmenter.name()))]
pub fn generate_sheet(
    bytes: &[u8],
    config: &SheetConfig,
    segmenter: &dyn Segmenter,
) -> Result<RenderedSheet, PassfotoError> {
    config.validate()?;

    let (photo, orientation) = normalize::decode_oriented(bytes)?;
    let (photo, isolation) = normalize::isolate_subject(photo, segmenter, config.backdrop);

    let layout = layout::solve(config);
    info!(
        slot_w = layout.slot.width_px,
        slot_h = layout.slot.height_px,
        sep_x = layout.grid.sep_x_px,
        sep_y = layout.grid.sep_y_px,
        shrink = layout.shrink,
        "sheet geometry solved"
    );

    let (slot_image, slot_fit) = compose::compose_slot(&photo, layout.slot, config)?;
    let canvas = render::render_sheet(&slot_image, &layout, config);
    let encoded = encode::encode(&canvas, config.format, config.jpeg_quality)?;

    info!(
        bytes = encoded.len(),
        width = canvas.width(),
        height = canvas.height(),
        "sheet generated"
    );

    Ok(RenderedSheet {
        bytes: encoded,
        format: config.format,
        width_px: canvas.width(),
        height_px: canvas.height(),
        layout,
        orientation,
        isolation,
        slot_fit,
    })
}

// -- Tests --------------------------------------------------------------------
