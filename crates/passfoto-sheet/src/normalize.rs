// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background normalization — decode with orientation correction, and the
// optional subject-isolation step that composites a segmenter's alpha mask
// over a solid backdrop.
//
// Only an undecodable source is fatal here. Missing orientation metadata or
// a failed isolation call degrade the result and report a `StageOutcome`,
// but never abort the pipeline.

use std::io::Cursor;

use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, Rgba, RgbaImage, RgbImage};
use tracing::{debug, instrument, warn};

use passfoto_core::error::PassfotoError;
use passfoto_core::types::{Color, StageOutcome};

use crate::segment::{SegmentError, Segmenter};

/// Decode source bytes and apply stored orientation metadata so the visual
/// orientation matches intended viewing, then convert to 3-channel RGB.
///
/// Returns `StageOutcome::Fallback` (with the image as stored) when the
/// orientation metadata cannot be read; decoding failure itself is fatal.
#[instrument(skip(bytes), fields(data_len = bytes.len()))]
pub fn decode_oriented(bytes: &[u8]) -> Result<(RgbImage, StageOutcome), PassfotoError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| PassfotoError::Decode(format!("unrecognised image data: {err}")))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|err| PassfotoError::Decode(err.to_string()))?;

    // Read the orientation before the decoder is consumed by decoding.
    let orientation = decoder.orientation();
    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|err| PassfotoError::Decode(err.to_string()))?;

    let outcome = match orientation {
        Ok(orientation) => {
            image.apply_orientation(orientation);
            StageOutcome::Applied
        }
        Err(err) => {
            warn!(%err, "could not read orientation metadata; keeping stored orientation");
            StageOutcome::Fallback
        }
    };

    debug!(
        width = image.width(),
        height = image.height(),
        "source photo decoded"
    );
    Ok((image.to_rgb8(), outcome))
}

/// Isolate the subject against a solid backdrop using the configured
/// segmentation capability.
///
/// The photo is encoded as PNG, handed to the segmenter, and the returned
/// alpha-masked image is composited over an opaque `backdrop`. An absent
/// capability skips the step; any failure falls back to the input photo
/// unchanged. Neither aborts the pipeline.
#[instrument(skip(photo, segmenter), fields(segmenter = segmenter.name()))]
pub fn isolate_subject(
    photo: RgbImage,
    segmenter: &dyn Segmenter,
    backdrop: Color,
) -> (RgbImage, StageOutcome) {
    let mut encoded = Vec::new();
    if let Err(err) = photo.write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png) {
        warn!(%err, "could not encode photo for segmentation; keeping original background");
        return (photo, StageOutcome::Fallback);
    }

    let masked = match segmenter.segment(&encoded) {
        Ok(masked) => masked,
        Err(SegmentError::Unavailable) => {
            debug!("no segmentation capability configured; skipping subject isolation");
            return (photo, StageOutcome::Skipped);
        }
        Err(err) => {
            warn!(%err, "subject isolation failed; continuing with original background");
            return (photo, StageOutcome::Fallback);
        }
    };

    let cutout = match image::load_from_memory(&masked) {
        Ok(cutout) => cutout.to_rgba8(),
        Err(err) => {
            warn!(%err, "segmenter output was not a decodable image; continuing with original background");
            return (photo, StageOutcome::Fallback);
        }
    };

    let Color([r, g, b]) = backdrop;
    let mut flat = RgbaImage::from_pixel(cutout.width(), cutout.height(), Rgba([r, g, b, 255]));
    image::imageops::overlay(&mut flat, &cutout, 0, 0);

    debug!(
        width = flat.width(),
        height = flat.height(),
        "subject composited over backdrop"
    );
    (DynamicImage::ImageRgba8(flat).to_rgb8(), StageOutcome::Applied)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode fixture");
        buf
    }

    /// Segmenter stub that returns a fixed RGBA PNG.
    struct StubSegmenter(Vec<u8>);

    impl Segmenter for StubSegmenter {
        fn name(&self) -> &str {
            "stub"
        }
        fn segment(&self, _png: &[u8]) -> Result<Vec<u8>, SegmentError> {
            Ok(self.0.clone())
        }
    }

    /// Segmenter stub that always fails.
    struct BrokenSegmenter;

    impl Segmenter for BrokenSegmenter {
        fn name(&self) -> &str {
            "broken"
        }
        fn segment(&self, _png: &[u8]) -> Result<Vec<u8>, SegmentError> {
            Err(SegmentError::Failed("model missing".into()))
        }
    }

    #[test]
    fn decodes_png_and_reports_orientation_applied() {
        let src = RgbImage::from_pixel(10, 8, Rgb([200, 40, 40]));
        let (decoded, outcome) = decode_oriented(&png_bytes(&src)).expect("decode");

        assert_eq!(decoded.dimensions(), (10, 8));
        assert_eq!(outcome, StageOutcome::Applied);
        assert_eq!(decoded.get_pixel(5, 4), &Rgb([200, 40, 40]));
    }

    #[test]
    fn garbage_bytes_are_a_fatal_decode_error() {
        let result = decode_oriented(b"this is not an image at all");
        assert!(matches!(result, Err(PassfotoError::Decode(_))));
    }

    #[test]
    fn absent_capability_skips_isolation_and_keeps_photo() {
        let photo = RgbImage::from_pixel(6, 6, Rgb([10, 20, 30]));
        let (out, outcome) =
            isolate_subject(photo.clone(), &crate::segment::NoSegmenter, Color::WHITE);

        assert_eq!(outcome, StageOutcome::Skipped);
        assert_eq!(out, photo);
    }

    #[test]
    fn failed_capability_falls_back_to_original_photo() {
        let photo = RgbImage::from_pixel(6, 6, Rgb([10, 20, 30]));
        let (out, outcome) = isolate_subject(photo.clone(), &BrokenSegmenter, Color::WHITE);

        assert_eq!(outcome, StageOutcome::Fallback);
        assert_eq!(out, photo);
    }

    #[test]
    fn undecodable_segmenter_output_falls_back() {
        let photo = RgbImage::from_pixel(6, 6, Rgb([10, 20, 30]));
        let stub = StubSegmenter(b"garbage mask".to_vec());
        let (out, outcome) = isolate_subject(photo.clone(), &stub, Color::WHITE);

        assert_eq!(outcome, StageOutcome::Fallback);
        assert_eq!(out, photo);
    }

    #[test]
    fn alpha_mask_is_composited_over_backdrop() {
        // Mask: left half fully transparent, right half opaque blue.
        let mut mask = RgbaImage::new(8, 4);
        for y in 0..4 {
            for x in 0..8 {
                let px = if x < 4 {
                    Rgba([0, 0, 0, 0])
                } else {
                    Rgba([0, 0, 255, 255])
                };
                mask.put_pixel(x, y, px);
            }
        }
        let mut mask_png = Vec::new();
        mask.write_to(&mut Cursor::new(&mut mask_png), ImageFormat::Png)
            .expect("encode mask");

        let photo = RgbImage::from_pixel(8, 4, Rgb([99, 99, 99]));
        let (out, outcome) =
            isolate_subject(photo, &StubSegmenter(mask_png), Color::WHITE);

        assert_eq!(outcome, StageOutcome::Applied);
        // Transparent half shows the backdrop, opaque half the subject.
        assert_eq!(out.get_pixel(1, 1), &Rgb([255, 255, 255]));
        assert_eq!(out.get_pixel(6, 1), &Rgb([0, 0, 255]));
    }
}
