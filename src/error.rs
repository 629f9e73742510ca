use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanPdfError {
    #[error("No captured images supplied")]
    CaptureUnavailable,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Assembly failure: {0}")]
    AssemblyFailure(String),

    #[error("PDF write error: {0}")]
    PdfWriteError(String),

    #[error("Submit error: {0}")]
    SubmitError(String),

    #[error("Pipeline run aborted: {0}")]
    RunAborted(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Generates factory methods for [`ScanPdfError`] variants that wrap a `String`.
macro_rules! error_constructors {
    ($(
        $(#[doc = $doc:expr])*
        $method:ident => $variant:ident
    ),* $(,)?) => {
        impl ScanPdfError {
            $(
                $(#[doc = $doc])*
                pub fn $method(msg: impl Into<String>) -> Self {
                    Self::$variant(msg.into())
                }
            )*
        }
    };
}

error_constructors! {
    /// Create a configuration error.
    config => ConfigError,
    /// Create an assembly failure.
    assembly => AssemblyFailure,
    /// Create a PDF write error.
    pdf_write => PdfWriteError,
    /// Create a submit error.
    submit => SubmitError,
    /// Create a run-aborted error.
    aborted => RunAborted,
}

impl From<lopdf::Error> for ScanPdfError {
    fn from(e: lopdf::Error) -> Self {
        Self::PdfWriteError(e.to_string())
    }
}

impl From<serde_json::Error> for ScanPdfError {
    fn from(e: serde_json::Error) -> Self {
        Self::SubmitError(e.to_string())
    }
}

impl From<serde_yml::Error> for ScanPdfError {
    fn from(e: serde_yml::Error) -> Self {
        Self::ConfigError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScanPdfError>;

/// Failure of a single encode tier for a single image.
///
/// These never leave the encode dispatcher: an image whose every tier fails
/// is passed through with its original bytes instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EncodeError {
    #[error("encoder unavailable: {0}")]
    Unavailable(String),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("JPEG encode failed: {0}")]
    Encode(String),

    #[error("offload worker failed: {0}")]
    Offload(String),

    #[error("offload worker timed out after {0} ms")]
    Timeout(u64),

    #[error("invalid encoding plan: {0}")]
    InvalidPlan(String),
}

impl From<image::ImageError> for EncodeError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::Encoding(_) => Self::Encode(e.to_string()),
            _ => Self::Decode(e.to_string()),
        }
    }
}
