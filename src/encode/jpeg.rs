// JPEG encoding: RGB bitmap -> JPEG bytes

use std::io::Cursor;

use image::RgbImage;

use crate::error::EncodeError;

/// Encode an RGB image to JPEG bytes.
///
/// # Arguments
/// * `rgb`     - Image to encode; alpha has already been flattened
/// * `quality` - JPEG quality (1 = worst, 100 = best)
pub fn encode_rgb_to_jpeg(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    if !(1..=100).contains(&quality) {
        return Err(EncodeError::Encode(format!(
            "JPEG quality must be 1-100, got {}",
            quality
        )));
    }
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(EncodeError::Encode(format!(
            "cannot encode empty {}x{} image",
            rgb.width(),
            rgb.height()
        )));
    }

    let mut buf = Cursor::new(Vec::new());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| EncodeError::Encode(e.to_string()))?;

    Ok(buf.into_inner())
}
