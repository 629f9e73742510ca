use std::path::{Path, PathBuf};
use std::process::ExitCode;

use scan_pdf::config::job::JobFile;
use scan_pdf::config::merged::MergedConfig;
use scan_pdf::config::{self};
use scan_pdf::handoff::DocumentMetadata;
use scan_pdf::pipeline::job_runner::JobConfig;
use scan_pdf::pipeline::orchestrator::run_all_jobs;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: scan_pdf <jobs.yaml>...");
        eprintln!("  Compress captured page images into size-limited PDFs.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("scan_pdf {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut job_configs: Vec<JobConfig> = Vec::new();

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);

        // Load settings from the same directory as the job file.
        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let yaml_content = match std::fs::read_to_string(job_file_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to read job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file = match JobFile::from_yaml(&yaml_content) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to parse job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Resolve job file directory for relative paths.
        let job_dir = job_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        for job in &job_file.jobs {
            job_configs.push(JobConfig {
                images: job
                    .images
                    .iter()
                    .map(|p| resolve_path(&job_dir, p))
                    .collect(),
                output_dir: resolve_path(&job_dir, &job.output),
                metadata: DocumentMetadata::new(
                    job.patient_identifier.clone(),
                    job.display_file_name.as_deref(),
                ),
                config: MergedConfig::new(&settings, job),
            });
        }
    }

    let results = run_all_jobs(&job_configs);

    let mut has_error = false;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(job_result) => {
                let report = &job_result.report;
                eprintln!(
                    "OK: {} ({} pages, {} bytes{}{})",
                    job_result.output_path.display(),
                    report.page_count,
                    job_result.size_bytes,
                    if report.emergency_pass {
                        ", emergency pass"
                    } else {
                        ""
                    },
                    if report.over_budget {
                        ", OVER BUDGET"
                    } else {
                        ""
                    },
                );
                if !report.degraded_pages.is_empty() {
                    eprintln!(
                        "WARN: {} page(s) kept original bytes: {:?}",
                        report.degraded_pages.len(),
                        report.degraded_pages
                    );
                }
            }
            Err(e) => {
                eprintln!(
                    "ERROR: {} -> {}: {e}",
                    job_configs[i].metadata.display_file_name,
                    job_configs[i].output_dir.display()
                );
                has_error = true;
            }
        }
    }

    if has_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
