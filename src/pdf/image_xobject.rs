// 画像XObject構築: JPEGはDCTDecodeでそのまま埋め込み、それ以外はFlateDecode

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::{Object, Stream, dictionary};

use crate::encode::raster::flatten_on_white;
use crate::encode::{EncodedPage, PageFormat};
use crate::error::ScanPdfError;

/// JPEGフレームヘッダ(SOFn)から読み取った情報
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegFrame {
    pub width: u32,
    pub height: u32,
    pub components: u8,
}

/// JPEGのマーカー列を走査し、最初のSOFセグメントを返す。
///
/// SOS/EOIに先に到達した場合や、データが途切れている場合は `None`。
pub fn jpeg_frame_info(bytes: &[u8]) -> Option<JpegFrame> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }

    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        match marker {
            // fill byte
            0xFF => {
                i += 1;
                continue;
            }
            // standalone markers without a length field
            0x01 | 0xD0..=0xD8 => {
                i += 2;
                continue;
            }
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let seg_len = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        if seg_len < 2 {
            return None;
        }

        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let body = bytes.get(i + 4..i + 10)?;
            let height = u16::from_be_bytes([body[1], body[2]]) as u32;
            let width = u16::from_be_bytes([body[3], body[4]]) as u32;
            return Some(JpegFrame {
                width,
                height,
                components: body[5],
            });
        }

        i += 2 + seg_len;
    }
    None
}

/// 埋め込み済みの画像。配置には宣言値ではなくこの寸法を使う。
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub stream: Stream,
    pub width: u32,
    pub height: u32,
}

/// ページ画像からImage XObjectストリームを作成する。
pub fn build_image_xobject(page: &EncodedPage) -> crate::error::Result<ImageXObject> {
    match page.format {
        PageFormat::Jpeg => jpeg_xobject(page),
        PageFormat::Png | PageFormat::Other => flate_xobject(page),
    }
}

fn jpeg_xobject(page: &EncodedPage) -> crate::error::Result<ImageXObject> {
    let frame = jpeg_frame_info(&page.bytes).ok_or_else(|| {
        ScanPdfError::assembly(format!(
            "page {}: JPEG frame header not found",
            page.sequence_index
        ))
    })?;
    if frame.width == 0 || frame.height == 0 {
        return Err(ScanPdfError::assembly(format!(
            "page {}: JPEG frame is {}x{}",
            page.sequence_index, frame.width, frame.height
        )));
    }

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => frame.width as i64,
        "Height" => frame.height as i64,
        "BitsPerComponent" => 8,
        "Filter" => "DCTDecode",
    };
    match frame.components {
        1 => dict.set("ColorSpace", "DeviceGray"),
        3 => dict.set("ColorSpace", "DeviceRGB"),
        4 => {
            // カメラ/Adobe系のCMYK JPEGは反転して格納されている
            dict.set("ColorSpace", "DeviceCMYK");
            dict.set(
                "Decode",
                [1, 0, 1, 0, 1, 0, 1, 0]
                    .into_iter()
                    .map(Object::Integer)
                    .collect::<Vec<_>>(),
            );
        }
        n => {
            return Err(ScanPdfError::assembly(format!(
                "page {}: unsupported JPEG component count {n}",
                page.sequence_index
            )));
        }
    }

    Ok(ImageXObject {
        stream: Stream::new(dict, page.bytes.clone()).with_compression(false),
        width: frame.width,
        height: frame.height,
    })
}

fn flate_xobject(page: &EncodedPage) -> crate::error::Result<ImageXObject> {
    let decoded = image::load_from_memory(&page.bytes).map_err(|e| {
        ScanPdfError::assembly(format!(
            "page {}: original bytes are neither JPEG nor decodable: {e}",
            page.sequence_index
        ))
    })?;
    // 透過部分は符号化ティアと同じく白に合成
    let rgb = flatten_on_white(&decoded);
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(ScanPdfError::assembly(format!(
            "page {}: decoded to an empty bitmap",
            page.sequence_index
        )));
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(rgb.as_raw())?;
    let compressed = encoder.finish()?;

    let dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => rgb.width() as i64,
        "Height" => rgb.height() as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };
    Ok(ImageXObject {
        stream: Stream::new(dict, compressed).with_compression(false),
        width: rgb.width(),
        height: rgb.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CapturedImage;
    use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::{Cursor, Read};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).expect("encode");
        buf.into_inner()
    }

    #[test]
    fn frame_info_reads_dimensions_and_components() {
        let rgb = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(37, 21, Rgb([1, 2, 3]))),
            ImageFormat::Jpeg,
        );
        assert_eq!(
            jpeg_frame_info(&rgb),
            Some(JpegFrame {
                width: 37,
                height: 21,
                components: 3
            })
        );

        let gray = encode(
            DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 9, Luma([128]))),
            ImageFormat::Jpeg,
        );
        assert_eq!(jpeg_frame_info(&gray).map(|f| f.components), Some(1));
    }

    #[test]
    fn frame_info_rejects_non_jpeg_and_truncated_data() {
        assert_eq!(jpeg_frame_info(b"\x89PNG\r\n\x1a\n"), None);
        assert_eq!(jpeg_frame_info(&[0xFF, 0xD8, 0xFF]), None);
        assert_eq!(jpeg_frame_info(&[0xFF, 0xD8, 0xFF, 0xD9]), None);
    }

    #[test]
    fn png_passthrough_is_flate_encoded() {
        let png = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 4, Rgb([9, 9, 9]))),
            ImageFormat::Png,
        );
        let page = EncodedPage::passthrough(&CapturedImage::probe(0, png));
        let xobject = build_image_xobject(&page).expect("xobject");
        assert_eq!((xobject.width, xobject.height), (5, 4));
        let stream = xobject.stream;
        assert_eq!(stream.dict.get(b"Filter").unwrap().as_name().unwrap(), b"FlateDecode");
        assert_eq!(stream.dict.get(b"Width").and_then(|o| o.as_i64()).unwrap(), 5);
    }

    #[test]
    fn cmyk_frame_gets_inverted_decode() {
        // SOI, SOF0 with 4 components, EOI
        let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00, 0x02, 0x00, 0x03, 0x04];
        bytes.extend_from_slice(&[0u8; 12]);
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        let page = EncodedPage {
            sequence_index: 0,
            size_bytes: bytes.len(),
            bytes,
            width: 3,
            height: 2,
            format: PageFormat::Jpeg,
            encoder: "test",
            degraded: true,
        };
        let xobject = build_image_xobject(&page).expect("xobject");
        assert_eq!((xobject.width, xobject.height), (3, 2));
        let stream = xobject.stream;
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceCMYK"
        );
        let decode = stream.dict.get(b"Decode").unwrap().as_array().unwrap();
        let values: Vec<_> = decode.iter().filter_map(|o| o.as_i64().ok()).collect();
        assert_eq!(values, vec![1, 0, 1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn transparent_png_passthrough_is_flattened_onto_white() {
        let png = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([0, 0, 0, 0]))),
            ImageFormat::Png,
        );
        let page = EncodedPage::passthrough(&CapturedImage::probe(0, png));
        let xobject = build_image_xobject(&page).expect("xobject");

        let mut raw = Vec::new();
        flate2::read::ZlibDecoder::new(xobject.stream.content.as_slice())
            .read_to_end(&mut raw)
            .expect("inflate");
        assert_eq!(raw.len(), 4 * 3 * 3);
        assert!(raw.iter().all(|&b| b == 255));
    }

    #[test]
    fn frame_size_wins_over_declared_page_size() {
        let jpeg = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([5, 5, 5]))),
            ImageFormat::Jpeg,
        );
        let mut page = EncodedPage::passthrough(&CapturedImage::new(0, jpeg, 10, 20));
        page.width = 10;
        page.height = 20;
        let xobject = build_image_xobject(&page).expect("xobject");
        assert_eq!((xobject.width, xobject.height), (20, 10));
    }

    #[test]
    fn garbage_bytes_fail_assembly() {
        let page = EncodedPage::passthrough(&CapturedImage::new(3, b"junk".to_vec(), 10, 10));
        let err = build_image_xobject(&page).unwrap_err();
        assert!(matches!(err, ScanPdfError::AssemblyFailure(_)));
    }
}
