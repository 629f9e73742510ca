// 設定ファイル解析テスト

use std::io::Write;

use scan_pdf::config::job::JobFile;
use scan_pdf::config::load_settings_for_job;
use scan_pdf::config::merged::MergedConfig;
use scan_pdf::config::settings::{DEFAULT_SIZE_BUDGET_BYTES, Settings};

// ============================================================
// 1. Settings 構造体のデシリアライズ
// ============================================================

#[test]
fn test_settings_full_yaml() {
    let yaml = r#"
size_budget_bytes: 5000000
batch_size: 4
offload_workers: 0
offload_timeout_ms: 1500
emergency_max_width: 640
emergency_quality: 0.4
"#;
    let settings = Settings::from_yaml(yaml).expect("should parse full YAML");
    assert_eq!(settings.size_budget_bytes, 5_000_000);
    assert_eq!(settings.batch_size, 4);
    assert_eq!(settings.offload_workers, 0);
    assert_eq!(settings.offload_timeout_ms, 1500);
    assert_eq!(settings.emergency_max_width, 640);
    assert_eq!(settings.emergency_quality, 0.4);
}

#[test]
fn test_settings_partial_yaml_uses_defaults() {
    let settings = Settings::from_yaml("batch_size: 2\n").expect("should parse partial YAML");
    assert_eq!(settings.batch_size, 2);
    assert_eq!(settings.size_budget_bytes, DEFAULT_SIZE_BUDGET_BYTES);
    assert_eq!(settings.size_budget_bytes, 15_728_640);
    assert_eq!(settings.emergency_max_width, 800);
    assert_eq!(settings.emergency_quality, 0.5);
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.batch_size, 3);
    assert_eq!(settings.offload_workers, 2);
    assert_eq!(settings.offload_timeout_ms, 30_000);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_settings_validation_errors() {
    for yaml in [
        "batch_size: 0\n",
        "size_budget_bytes: 0\n",
        "emergency_max_width: 0\n",
        "offload_timeout_ms: 0\n",
        "emergency_quality: 0.0\n",
        "emergency_quality: 1.5\n",
    ] {
        assert!(Settings::from_yaml(yaml).is_err(), "should reject {yaml:?}");
    }
}

#[test]
fn test_settings_invalid_yaml() {
    assert!(Settings::from_yaml("batch_size: [oops").is_err());
}

// ============================================================
// 2. ジョブファイル
// ============================================================

#[test]
fn test_job_file_parse() {
    let yaml = r#"
jobs:
  - images: [p3.jpg, p1.jpg, p2.jpg]
    output: out
    patient_identifier: GAN200001
    display_file_name: discharge-summary
    size_budget_bytes: 2000000
  - images: [only.png]
    output: out2
    patient_identifier: GAN200002
"#;
    let job_file = JobFile::from_yaml(yaml).expect("should parse job file");
    assert_eq!(job_file.jobs.len(), 2);

    let first = &job_file.jobs[0];
    // 記載順がキャプチャ順
    assert_eq!(first.images, vec!["p3.jpg", "p1.jpg", "p2.jpg"]);
    assert_eq!(first.display_file_name.as_deref(), Some("discharge-summary"));
    assert_eq!(first.size_budget_bytes, Some(2_000_000));

    let second = &job_file.jobs[1];
    assert!(second.display_file_name.is_none());
    assert!(second.size_budget_bytes.is_none());
}

#[test]
fn test_job_file_rejects_empty_images() {
    let yaml = r#"
jobs:
  - images: []
    output: out
    patient_identifier: X
"#;
    assert!(JobFile::from_yaml(yaml).is_err());
}

#[test]
fn test_job_file_rejects_blank_image_path() {
    let yaml = r#"
jobs:
  - images: ["a.jpg", "  "]
    output: out
    patient_identifier: X
"#;
    assert!(JobFile::from_yaml(yaml).is_err());
}

#[test]
fn test_job_file_rejects_no_jobs() {
    assert!(JobFile::from_yaml("jobs: []\n").is_err());
}

// ============================================================
// 3. マージ
// ============================================================

#[test]
fn test_merged_config_job_overrides_budget() {
    let settings = Settings {
        size_budget_bytes: 9_000_000,
        batch_size: 5,
        ..Settings::default()
    };
    let job_file = JobFile::from_yaml(
        r#"
jobs:
  - images: [a.jpg]
    output: out
    patient_identifier: X
    size_budget_bytes: 1000
  - images: [b.jpg]
    output: out
    patient_identifier: Y
"#,
    )
    .expect("parse");

    let merged = MergedConfig::new(&settings, &job_file.jobs[0]);
    assert_eq!(merged.size_budget_bytes, 1000);
    assert_eq!(merged.batch_size, 5);

    let merged = MergedConfig::new(&settings, &job_file.jobs[1]);
    assert_eq!(merged.size_budget_bytes, 9_000_000);
}

// ============================================================
// 4. settings.yaml 自動検出
// ============================================================

#[test]
fn test_load_settings_for_job_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut file = std::fs::File::create(dir.path().join("settings.yaml")).expect("create");
    writeln!(file, "size_budget_bytes: 1234").expect("write");

    let settings = load_settings_for_job(&dir.path().join("jobs.yaml")).expect("load");
    assert_eq!(settings.size_budget_bytes, 1234);
}

#[test]
fn test_load_settings_for_job_missing_uses_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_settings_for_job(&dir.path().join("jobs.yaml")).expect("load");
    assert_eq!(settings.size_budget_bytes, DEFAULT_SIZE_BUDGET_BYTES);
}
