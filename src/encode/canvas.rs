// Tier 3: basic raster canvas path

use image::imageops::FilterType;

use crate::capture::CapturedImage;
use crate::encode::raster::{ResizeMode, encode_fitted};
use crate::encode::{EncodedPage, PageEncoder};
use crate::error::EncodeError;
use crate::plan::EncodingPlan;

/// Bilinear resize drawn onto a white canvas, whatever the plan's resample
/// setting.
pub struct CanvasEncoder;

impl PageEncoder for CanvasEncoder {
    fn name(&self) -> &'static str {
        "canvas"
    }

    fn encode(&self, image: &CapturedImage, plan: &EncodingPlan) -> Result<EncodedPage, EncodeError> {
        encode_fitted(
            image,
            plan,
            ResizeMode::Filtered(FilterType::Triangle),
            self.name(),
        )
    }
}
