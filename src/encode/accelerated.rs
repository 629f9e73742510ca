// Tier 2: in-process decode using the fast sampling path

use crate::capture::CapturedImage;
use crate::encode::raster::{ResizeMode, encode_fitted};
use crate::encode::{EncodedPage, PageEncoder};
use crate::error::EncodeError;
use crate::plan::EncodingPlan;

/// Same-process encoder that shrinks with integer sampling instead of a
/// convolution filter.
pub struct AcceleratedEncoder;

impl PageEncoder for AcceleratedEncoder {
    fn name(&self) -> &'static str {
        "accelerated"
    }

    fn encode(&self, image: &CapturedImage, plan: &EncodingPlan) -> Result<EncodedPage, EncodeError> {
        encode_fitted(image, plan, ResizeMode::Sampled, self.name())
    }
}
