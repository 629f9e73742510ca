use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JobFile {
    pub jobs: Vec<Job>,
}

/// One capture session: the page images in capture order plus the
/// metadata the upload collaborator needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    #[serde(deserialize_with = "deserialize_images")]
    pub images: Vec<String>,
    pub output: String,
    pub patient_identifier: String,
    #[serde(default)]
    pub display_file_name: Option<String>,
    pub size_budget_bytes: Option<u64>,
}

impl JobFile {
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        let job_file: JobFile = serde_yml::from_str(yaml)?;
        if job_file.jobs.is_empty() {
            return Err(crate::error::ScanPdfError::config(
                "Job file contains no jobs",
            ));
        }
        Ok(job_file)
    }
}

/// serdeのdeserialize_withで使用する画像リストデシリアライザ
///
/// The order of the list is the capture order, so it is kept as written.
fn deserialize_images<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let images = Vec::<String>::deserialize(deserializer)?;
    if images.is_empty() {
        return Err(serde::de::Error::custom(
            "images must list at least one captured page",
        ));
    }
    if let Some(blank) = images.iter().position(|p| p.trim().is_empty()) {
        return Err(serde::de::Error::custom(format!(
            "images[{blank}] is an empty path"
        )));
    }
    Ok(images)
}
