use super::job::Job;
use super::settings::Settings;

#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub size_budget_bytes: u64,
    pub batch_size: usize,
    pub offload_workers: usize,
    pub offload_timeout_ms: u64,
    pub emergency_max_width: u32,
    pub emergency_quality: f32,
}

impl MergedConfig {
    /// JobのOption値がSomeならJobの値を、NoneならSettingsの値を使用する。
    pub fn new(settings: &Settings, job: &Job) -> Self {
        MergedConfig {
            size_budget_bytes: job.size_budget_bytes.unwrap_or(settings.size_budget_bytes),
            batch_size: settings.batch_size,
            offload_workers: settings.offload_workers,
            offload_timeout_ms: settings.offload_timeout_ms,
            emergency_max_width: settings.emergency_max_width,
            emergency_quality: settings.emergency_quality,
        }
    }
}

impl From<&Settings> for MergedConfig {
    fn from(settings: &Settings) -> Self {
        MergedConfig {
            size_budget_bytes: settings.size_budget_bytes,
            batch_size: settings.batch_size,
            offload_workers: settings.offload_workers,
            offload_timeout_ms: settings.offload_timeout_ms,
            emergency_max_width: settings.emergency_max_width,
            emergency_quality: settings.emergency_quality,
        }
    }
}

impl Default for MergedConfig {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}
