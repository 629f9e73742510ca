// Capture buffer: ordered, append-only page images from the camera

use std::io::Cursor;
use std::path::Path;

use image::ImageReader;

/// One camera shot.
///
/// `sequence_index` is the capture position and the only thing that decides
/// where the page ends up in the assembled document.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub sequence_index: u32,
    pub bytes: Vec<u8>,
    pub native_width: u32,
    pub native_height: u32,
}

impl CapturedImage {
    pub fn new(sequence_index: u32, bytes: Vec<u8>, native_width: u32, native_height: u32) -> Self {
        Self {
            sequence_index,
            bytes,
            native_width,
            native_height,
        }
    }

    /// Build a capture whose native dimensions are read from the image header.
    ///
    /// Bytes that cannot be probed are still accepted with zero dimensions;
    /// the encode tiers report the real problem later.
    pub fn probe(sequence_index: u32, bytes: Vec<u8>) -> Self {
        let (native_width, native_height) = probe_dimensions(&bytes).unwrap_or((0, 0));
        Self::new(sequence_index, bytes, native_width, native_height)
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Read width/height from the image header without decoding pixels.
pub fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Append-only sequence of captures. Sequence numbers are assigned here.
#[derive(Debug, Default, Clone)]
pub struct CaptureBuffer {
    images: Vec<CapturedImage>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a capture and return its sequence index.
    pub fn push(&mut self, bytes: Vec<u8>) -> u32 {
        let index = self.images.len() as u32;
        self.images.push(CapturedImage::probe(index, bytes));
        index
    }

    /// Append a capture whose dimensions the camera already reported.
    pub fn push_with_dimensions(&mut self, bytes: Vec<u8>, width: u32, height: u32) -> u32 {
        let index = self.images.len() as u32;
        self.images.push(CapturedImage::new(index, bytes, width, height));
        index
    }

    /// Read an image file and append it.
    pub fn push_file(&mut self, path: &Path) -> crate::error::Result<u32> {
        let bytes = std::fs::read(path)?;
        Ok(self.push(bytes))
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Captures in capture order.
    pub fn images(&self) -> &[CapturedImage] {
        &self.images
    }

    pub fn into_images(self) -> Vec<CapturedImage> {
        self.images
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).expect("encode png");
        buf.into_inner()
    }

    #[test]
    fn push_assigns_sequential_indices() {
        let mut buffer = CaptureBuffer::new();
        assert_eq!(buffer.push(png_bytes(4, 3)), 0);
        assert_eq!(buffer.push(png_bytes(5, 2)), 1);
        assert_eq!(buffer.push_with_dimensions(vec![1, 2, 3], 10, 20), 2);

        let images = buffer.images();
        assert_eq!(images.len(), 3);
        assert_eq!((images[0].native_width, images[0].native_height), (4, 3));
        assert_eq!((images[1].native_width, images[1].native_height), (5, 2));
        assert_eq!((images[2].native_width, images[2].native_height), (10, 20));
    }

    #[test]
    fn probe_accepts_garbage_with_zero_dimensions() {
        let image = CapturedImage::probe(7, b"not an image".to_vec());
        assert_eq!(image.sequence_index, 7);
        assert_eq!((image.native_width, image.native_height), (0, 0));
        assert_eq!(image.size_bytes(), 12);
    }
}
