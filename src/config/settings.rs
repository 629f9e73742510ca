use std::path::Path;

use serde::Deserialize;

use crate::error::ScanPdfError;

/// 15 MiB, the upload ceiling of the document service.
pub const DEFAULT_SIZE_BUDGET_BYTES: u64 = 15 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub size_budget_bytes: u64,
    pub batch_size: usize,
    pub offload_workers: usize,
    pub offload_timeout_ms: u64,
    pub emergency_max_width: u32,
    pub emergency_quality: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            size_budget_bytes: DEFAULT_SIZE_BUDGET_BYTES,
            batch_size: 3,
            offload_workers: 2,
            offload_timeout_ms: 30_000,
            emergency_max_width: 800,
            emergency_quality: 0.5,
        }
    }
}

impl Settings {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let settings: Settings = serde_yml::from_str(yaml).map_err(|e| {
            ScanPdfError::config(format!("Failed to parse settings YAML: {e}"))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// 値の範囲を検証する。
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.batch_size == 0 {
            return Err(ScanPdfError::config("batch_size must be at least 1"));
        }
        if self.size_budget_bytes == 0 {
            return Err(ScanPdfError::config("size_budget_bytes must be positive"));
        }
        if self.offload_timeout_ms == 0 {
            return Err(ScanPdfError::config(
                "offload_timeout_ms must be positive; set offload_workers: 0 to disable offload",
            ));
        }
        if self.emergency_max_width == 0 {
            return Err(ScanPdfError::config(
                "emergency_max_width must be at least 1",
            ));
        }
        if !(self.emergency_quality > 0.0 && self.emergency_quality <= 1.0) {
            return Err(ScanPdfError::config(format!(
                "emergency_quality must be in (0, 1], got {}",
                self.emergency_quality
            )));
        }
        Ok(())
    }
}
