//! Report file output.

use crate::config::ReportConfig;
use crate::models::{Reports, RunSummary};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the machine-readable run summary.
pub const STATISTICS_FILE: &str = "statistics.json";

/// Where the two reports were written.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenReports {
    pub tone: PathBuf,
    pub vocabulary: PathBuf,
}

/// Write both reports into `output_dir`, creating it if needed.
pub fn write_reports(
    reports: &Reports,
    output_dir: &Path,
    config: &ReportConfig,
) -> Result<WrittenReports> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let tone = output_dir.join(&config.tone_file);
    let vocabulary = output_dir.join(&config.vocabulary_file);

    write_file(&tone, &reports.tone)?;
    write_file(&vocabulary, &reports.vocabulary)?;

    Ok(WrittenReports { tone, vocabulary })
}

/// Generate the JSON run summary.
pub fn generate_summary_json(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write `statistics.json` into `output_dir`.
pub fn write_summary(summary: &RunSummary, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("Failed to create output directory {}", output_dir.display())
    })?;

    let path = output_dir.join(STATISTICS_FILE);
    write_file(&path, &generate_summary_json(summary)?)?;
    Ok(path)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}
