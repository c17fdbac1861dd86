//! Per-document processing loop.
//!
//! Each document is loaded as an upload, staged and read, cleaned, then
//! analyzed, strictly one at a time. A failing document leaves an empty
//! slot in the batch and an entry in the failure ledger; the loop always
//! runs to the end.

use crate::analysis::DocumentAnalyzer;
use crate::cleaner;
use crate::error::{AnalysisError, ReadError};
use crate::models::{AnalysisBatch, DocumentAnalysis, FailureRecord, Upload};
use crate::reader;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Why a document produced no analysis.
#[derive(Debug, thiserror::Error)]
pub enum FailureKind {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// One failed document.
#[derive(Debug)]
pub struct DocumentFailure {
    pub document: PathBuf,
    pub error: FailureKind,
}

impl fmt::Display for DocumentFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.document.display(), self.error)
    }
}

impl From<&DocumentFailure> for FailureRecord {
    fn from(failure: &DocumentFailure) -> Self {
        FailureRecord {
            document: failure.document.display().to_string(),
            reason: failure.error.to_string(),
        }
    }
}

/// The batch plus the ledger of documents that failed.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub analyses: AnalysisBatch,
    pub failures: Vec<DocumentFailure>,
}

impl BatchOutcome {
    pub fn failure_records(&self) -> Vec<FailureRecord> {
        self.failures.iter().map(FailureRecord::from).collect()
    }
}

/// Load a document from disk as a named upload.
pub fn load_upload(path: &Path) -> Result<Upload, ReadError> {
    let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Upload::new(name, bytes))
}

/// Load, stage, read and clean one document.
///
/// Files on disk take the same route as uploaded bytes: they are loaded
/// into an `Upload` and staged in a temporary file that is removed after
/// reading. The extra copy keeps one read path for both sources.
pub fn clean_document(path: &Path) -> Result<String, ReadError> {
    let upload = load_upload(path)?;
    let raw = reader::read_upload(&upload)?;
    let cleaned = cleaner::clean(&raw);
    debug!(
        "Cleaned {}: {} -> {} chars",
        path.display(),
        raw.chars().count(),
        cleaned.chars().count()
    );
    Ok(cleaned)
}

/// Runs documents through reading, cleaning and analysis.
pub struct BatchProcessor<'a> {
    analyzer: DocumentAnalyzer<'a>,
    show_progress: bool,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(analyzer: DocumentAnalyzer<'a>, show_progress: bool) -> Self {
        Self {
            analyzer,
            show_progress,
        }
    }

    /// Process every document in order, one batch slot each.
    pub async fn run(&self, documents: &[PathBuf]) -> BatchOutcome {
        let progress = self.progress_bar(documents.len());
        let mut outcome = BatchOutcome::default();

        for path in documents {
            progress.set_message(display_name(path));

            match self.process(path).await {
                Ok(analysis) => {
                    debug!("Analyzed {}", path.display());
                    outcome.analyses.push(Some(analysis));
                }
                Err(error) => {
                    let failure = DocumentFailure {
                        document: path.clone(),
                        error,
                    };
                    progress.suspend(|| warn!("{}", failure));
                    outcome.analyses.push(None);
                    outcome.failures.push(failure);
                }
            }

            progress.inc(1);
        }

        progress.finish_and_clear();
        info!(
            "Analyzed {} of {} documents",
            outcome.analyses.total() - outcome.analyses.failed_count(),
            outcome.analyses.total()
        );

        outcome
    }

    async fn process(&self, path: &Path) -> Result<DocumentAnalysis, FailureKind> {
        let cleaned = clean_document(path)?;
        Ok(self.analyzer.try_analyze(&cleaned).await?)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
