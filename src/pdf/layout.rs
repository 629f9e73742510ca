// A4 page geometry: scale-to-fit and centering inside the content box

/// A4 portrait width in mm.
pub const PAGE_WIDTH_MM: f64 = 210.0;
/// A4 portrait height in mm.
pub const PAGE_HEIGHT_MM: f64 = 297.0;
/// Margin on every side in mm.
pub const MARGIN_MM: f64 = 10.0;
/// Content box width in mm (190).
pub const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
/// Content box height in mm (277).
pub const CONTENT_HEIGHT_MM: f64 = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM;

const POINTS_PER_MM: f64 = 72.0 / 25.4;

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Where an image lands on the page, in mm measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// Compute the aspect-preserving fit of a `width × height` bitmap.
    ///
    /// Images wider than the content box fill its width and are centered
    /// vertically; all others fill its height and are centered horizontally.
    /// Returns `None` for a zero dimension.
    pub fn fit(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let img_ratio = width as f64 / height as f64;
        let content_ratio = CONTENT_WIDTH_MM / CONTENT_HEIGHT_MM;

        let placement = if img_ratio > content_ratio {
            let w = CONTENT_WIDTH_MM;
            let h = w / img_ratio;
            Placement {
                x: MARGIN_MM,
                y: (PAGE_HEIGHT_MM - h) / 2.0,
                width: w,
                height: h,
            }
        } else {
            let h = CONTENT_HEIGHT_MM;
            let w = h * img_ratio;
            Placement {
                x: (PAGE_WIDTH_MM - w) / 2.0,
                y: MARGIN_MM,
                width: w,
                height: h,
            }
        };
        Some(placement)
    }

    /// PDF `cm` operands `[w 0 0 h x y]` in points, origin bottom-left.
    pub fn to_pdf_matrix(&self) -> [f64; 6] {
        let bottom = PAGE_HEIGHT_MM - self.y - self.height;
        [
            mm_to_pt(self.width),
            0.0,
            0.0,
            mm_to_pt(self.height),
            mm_to_pt(self.x),
            mm_to_pt(bottom),
        ]
    }
}

/// A4 MediaBox size in points.
pub fn page_size_pt() -> (f64, f64) {
    (mm_to_pt(PAGE_WIDTH_MM), mm_to_pt(PAGE_HEIGHT_MM))
}
