// Quality planner: image count -> per-page encoding budget

/// Portrait height factor applied to `max_width`.
pub const PORTRAIT_HEIGHT_FACTOR: f64 = 1.4286;

/// Step table, checked top to bottom: `(more_than, quality, max_width)`.
const QUALITY_STEPS: &[(u32, f32, u32)] = &[
    (30, 0.60, 900),
    (20, 0.70, 1100),
    (12, 0.75, 1300),
    (6, 0.82, 1500),
];

const BASE_QUALITY: f32 = 0.88;
const BASE_MAX_WIDTH: u32 = 1700;

/// Resampling effort used when shrinking a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleQuality {
    /// Catmull-Rom; used on the optimistic pass.
    High,
    /// Bilinear; used on the emergency pass.
    Medium,
}

impl ResampleQuality {
    pub fn filter(self) -> image::imageops::FilterType {
        match self {
            ResampleQuality::High => image::imageops::FilterType::CatmullRom,
            ResampleQuality::Medium => image::imageops::FilterType::Triangle,
        }
    }
}

/// Per-run encoding parameters. One plan per pass, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodingPlan {
    /// JPEG quality in `(0, 1]`.
    pub quality: f32,
    pub max_width: u32,
    pub max_height: u32,
    pub resample: ResampleQuality,
}

impl EncodingPlan {
    pub fn new(quality: f32, max_width: u32, resample: ResampleQuality) -> Self {
        Self {
            quality,
            max_width,
            max_height: portrait_height(max_width),
            resample,
        }
    }

    /// Quality on the 1-100 scale used by the JPEG encoder.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    pub fn is_valid(&self) -> bool {
        self.quality > 0.0 && self.quality <= 1.0 && self.max_width > 0 && self.max_height > 0
    }
}

pub fn portrait_height(max_width: u32) -> u32 {
    (max_width as f64 * PORTRAIT_HEIGHT_FACTOR).round() as u32
}

/// Pick quality and size limits for a document of `image_count` pages.
///
/// More pages means a tighter per-page budget, so the whole document lands
/// under the size ceiling without an iterative search.
pub fn plan_for(image_count: u32) -> EncodingPlan {
    let (quality, max_width) = QUALITY_STEPS
        .iter()
        .find(|(more_than, _, _)| image_count > *more_than)
        .map(|&(_, q, w)| (q, w))
        .unwrap_or((BASE_QUALITY, BASE_MAX_WIDTH));

    EncodingPlan::new(quality, max_width, ResampleQuality::High)
}

/// Fixed aggressive settings for the single emergency pass.
pub fn emergency_plan(max_width: u32, quality: f32) -> EncodingPlan {
    EncodingPlan::new(quality, max_width, ResampleQuality::Medium)
}
