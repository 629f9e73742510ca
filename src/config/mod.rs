//! Run configuration: `settings.yaml` defaults, per-job YAML, and the merged
//! view a single capture job runs with.

pub mod job;
pub mod merged;
pub mod settings;

use settings::Settings;
use std::path::Path;

/// Settings for the jobs in `job_file_path`.
///
/// A `settings.yaml` beside the job file is read and validated; without one
/// the built-in budget, batch and offload defaults apply.
pub fn load_settings_for_job(job_file_path: &Path) -> crate::error::Result<Settings> {
    let dir = job_file_path
        .parent()
        .ok_or_else(|| crate::error::ScanPdfError::config("Cannot determine job file directory"))?;

    let settings_path = dir.join("settings.yaml");

    if settings_path.exists() {
        Settings::from_file(&settings_path)
    } else {
        Ok(Settings::default())
    }
}
