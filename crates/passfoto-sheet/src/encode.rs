// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output encoding — serialize the finished canvas to an interchange raster
// format. Pixel dimensions are preserved exactly.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use tracing::debug;

use passfoto_core::error::PassfotoError;
use passfoto_core::types::OutputFormat;

/// Encode the canvas into `format` bytes. `quality` applies to JPEG only.
pub fn encode(
    canvas: &RgbImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, PassfotoError> {
    let mut buffer = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            canvas.write_with_encoder(encoder).map_err(|err| {
                PassfotoError::Encoding(format!("JPEG encoding failed: {err}"))
            })?;
        }
        OutputFormat::Png => {
            let mut cursor = Cursor::new(&mut buffer);
            canvas.write_to(&mut cursor, ImageFormat::Png).map_err(|err| {
                PassfotoError::Encoding(format!("PNG encoding failed: {err}"))
            })?;
        }
    }
    debug!(
        format = format.mime_type(),
        bytes = buffer.len(),
        "sheet encoded"
    );
    Ok(buffer)
}

// -- Tests --------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn png_round_trip_preserves_dimensions_and_pixels() {
        let canvas = RgbImage::from_pixel(37, 23, Rgb([120, 10, 200]));
        let bytes = encode(&canvas, OutputFormat::Png, 95).expect("encode");

        let back = image::load_from_memory(&bytes).expect("decode").to_rgb8();
        assert_eq!(back.dimensions(), (37, 23));
        assert_eq!(back.get_pixel(18, 11), &Rgb([120, 10, 200]));
    }

    #[test]
    fn jpeg_output_carries_jpeg_magic_and_dimensions() {
        let canvas = RgbImage::from_pixel(64, 48, Rgb([200, 200, 200]));
        let bytes = encode(&canvas, OutputFormat::Jpeg, 95).expect("encode");

        assert_eq!(&bytes[..3], &[0xFF, 0xD8, 0xFF]);
        let back = image::load_from_memory(&bytes).expect("decode");
        assert_eq!(back.width(), 64);
        assert_eq!(back.height(), 48);
    }

    #[test]
    fn encoding_is_deterministic_for_identical_canvases() {
        let canvas = RgbImage::from_pixel(32, 32, Rgb([5, 6, 7]));
        let a = encode(&canvas, OutputFormat::Png, 95).expect("encode");
        let b = encode(&canvas, OutputFormat::Png, 95).expect("encode");
        assert_eq!(a, b);
    }
}
