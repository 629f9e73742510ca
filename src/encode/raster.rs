// Shared raster helpers: decode with EXIF orientation, fit, flatten onto white

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, Rgba, RgbaImage, RgbImage};

use crate::capture::CapturedImage;
use crate::encode::{EncodedPage, PageFormat, jpeg};
use crate::error::EncodeError;
use crate::plan::EncodingPlan;

/// How the bitmap is shrunk to the plan's bounding box.
#[derive(Debug, Clone, Copy)]
pub enum ResizeMode {
    /// Convolution resize with the given filter.
    Filtered(FilterType),
    /// Fast integer sampling (`DynamicImage::thumbnail_exact`).
    Sampled,
}

/// Decode capture bytes and apply the camera's EXIF orientation.
pub fn decode_oriented(bytes: &[u8]) -> Result<DynamicImage, EncodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EncodeError::Decode(e.to_string()))?;
    let mut decoder = reader.into_decoder()?;
    // 向き情報が読めない場合は無変換
    let orientation = decoder
        .orientation()
        .unwrap_or(Orientation::NoTransforms);
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Largest size that fits inside `max_width × max_height` keeping the aspect
/// ratio. Never upscales; each side is at least 1.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));
    (w, h)
}

/// Resize into a `width × height` canvas pre-filled with white, centering
/// the drawn bitmap. Transparent pixels end up white.
pub fn draw_on_white(img: &DynamicImage, width: u32, height: u32, mode: ResizeMode) -> RgbImage {
    let resized: RgbaImage = match mode {
        ResizeMode::Filtered(filter) => imageops::resize(&img.to_rgba8(), width, height, filter),
        ResizeMode::Sampled => img.thumbnail_exact(width, height).to_rgba8(),
    };
    if !img.color().has_alpha() && resized.dimensions() == (width, height) {
        return DynamicImage::ImageRgba8(resized).to_rgb8();
    }
    composite_on_white(&resized, width, height)
}

/// Same size, alpha composited over white.
pub fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    composite_on_white(&img.to_rgba8(), img.width(), img.height())
}

fn composite_on_white(top: &RgbaImage, width: u32, height: u32) -> RgbImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let x = (width as i64 - top.width() as i64) / 2;
    let y = (height as i64 - top.height() as i64) / 2;
    imageops::overlay(&mut canvas, top, x, y);
    DynamicImage::ImageRgba8(canvas).to_rgb8()
}

/// Decode, fit, flatten and JPEG-encode one capture according to `plan`.
pub fn encode_fitted(
    image: &CapturedImage,
    plan: &EncodingPlan,
    mode: ResizeMode,
    encoder: &'static str,
) -> Result<EncodedPage, EncodeError> {
    if !plan.is_valid() {
        return Err(EncodeError::InvalidPlan(format!("{plan:?}")));
    }
    let decoded = decode_oriented(&image.bytes)?;
    let (width, height) =
        fit_dimensions(decoded.width(), decoded.height(), plan.max_width, plan.max_height);
    if width == 0 || height == 0 {
        return Err(EncodeError::Decode(format!(
            "image {} decoded to an empty bitmap",
            image.sequence_index
        )));
    }

    let rgb = draw_on_white(&decoded, width, height, mode);
    let bytes = jpeg::encode_rgb_to_jpeg(&rgb, plan.jpeg_quality())?;

    Ok(EncodedPage {
        sequence_index: image.sequence_index,
        size_bytes: bytes.len(),
        bytes,
        width,
        height,
        format: PageFormat::Jpeg,
        encoder,
        degraded: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};

    #[test]
    fn fit_keeps_aspect_and_never_upscales() {
        assert_eq!(fit_dimensions(2000, 1500, 1100, 1571), (1100, 825));
        assert_eq!(fit_dimensions(1500, 4000, 1100, 1571), (589, 1571));
        assert_eq!(fit_dimensions(300, 200, 1100, 1571), (300, 200));
        assert_eq!(fit_dimensions(0, 200, 1100, 1571), (0, 0));
        assert_eq!(fit_dimensions(10_000, 1, 800, 1143), (800, 1));
    }

    #[test]
    fn transparent_pixels_become_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0])));
        let rgb = draw_on_white(&img, 2, 2, ResizeMode::Filtered(FilterType::Triangle));
        assert_eq!(rgb.dimensions(), (2, 2));
        assert!(rgb.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn flatten_keeps_size_and_opaque_pixels() {
        let mut rgba = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(0, 0, Rgba([10, 20, 30, 255]));
        let rgb = flatten_on_white(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(*rgb.get_pixel(0, 0), Rgb([10, 20, 30]));
        assert_eq!(*rgb.get_pixel(2, 1), Rgb([255, 255, 255]));
    }

    #[test]
    fn encode_fitted_shrinks_to_plan() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 300, Rgb([30, 60, 90])));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).expect("png");
        let capture = CapturedImage::probe(3, buf.into_inner());

        let plan = EncodingPlan::new(0.7, 100, crate::plan::ResampleQuality::High);
        let page = encode_fitted(&capture, &plan, ResizeMode::Sampled, "test").expect("encode");
        assert_eq!(page.sequence_index, 3);
        assert_eq!((page.width, page.height), (100, 75));
        assert_eq!(page.size_bytes, page.bytes.len());
        assert_eq!(page.format, PageFormat::Jpeg);
    }

    #[test]
    fn undecodable_bytes_report_decode_error() {
        let capture = CapturedImage::new(0, b"garbage".to_vec(), 10, 10);
        let plan = crate::plan::plan_for(1);
        let err = encode_fitted(&capture, &plan, ResizeMode::Sampled, "test").unwrap_err();
        assert!(matches!(err, EncodeError::Decode(_)), "got {err:?}");
    }
}
