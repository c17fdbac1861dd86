//! Data models for document analysis.
//!
//! This module contains the core data structures passed between the
//! reader, analyzer, aggregator and report stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Supported input document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Plain UTF-8 text (`.txt`)
    Text,
    /// Word document (`.docx`)
    Word,
    /// PDF document (`.pdf`)
    Pdf,
}

impl DocumentFormat {
    /// Detect the format from a file extension (case-insensitive, no dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(DocumentFormat::Text),
            "docx" => Some(DocumentFormat::Word),
            "pdf" => Some(DocumentFormat::Pdf),
            _ => None,
        }
    }

    /// Detect the format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical file extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Text => "txt",
            DocumentFormat::Word => "docx",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Text => write!(f, "text"),
            DocumentFormat::Word => write!(f, "word"),
            DocumentFormat::Pdf => write!(f, "pdf"),
        }
    }
}

/// A named byte payload as handed over by the orchestrator.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original file name, used for format detection and reporting.
    pub name: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Format derived from the file name, if supported.
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_path(Path::new(&self.name))
    }
}

/// Tone of voice findings for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToneAnalysis {
    /// Formality rating, nominally 1-10.
    pub formality_score: f64,
    pub primary_tone: String,
    pub secondary_tones: Vec<String>,
    pub characteristic_patterns: Vec<String>,
    pub notable_expressions: Vec<String>,
    pub rhetorical_devices: Vec<String>,
}

/// Vocabulary findings for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyAnalysis {
    /// Vocabulary sophistication rating, nominally 1-10.
    pub complexity_score: f64,
    pub domain_specific_terms: Vec<String>,
    pub recurring_phrases: Vec<String>,
    pub register_level: String,
    pub distinctive_word_choices: Vec<String>,
    pub semantic_fields: Vec<String>,
}

/// The structured analysis of a single document.
///
/// Deserialization is strict: every field must be present with the right
/// type, otherwise the whole record is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub tone: ToneAnalysis,
    pub vocabulary: VocabularyAnalysis,
}

/// Per-document analyses in input order, one slot per document.
///
/// Failed documents leave an empty slot rather than being removed.
#[derive(Debug, Clone, Default)]
pub struct AnalysisBatch {
    slots: Vec<Option<DocumentAnalysis>>,
}

impl AnalysisBatch {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the outcome for the next document.
    pub fn push(&mut self, analysis: Option<DocumentAnalysis>) {
        self.slots.push(analysis);
    }

    /// Number of documents in the batch.
    pub fn total(&self) -> usize {
        self.slots.len()
    }

    /// Number of empty slots.
    pub fn failed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_none()).count()
    }

    /// Iterate over the successful analyses, in input order.
    pub fn successful(&self) -> impl Iterator<Item = &DocumentAnalysis> {
        self.slots.iter().flatten()
    }

    #[allow(dead_code)]
    pub fn slots(&self) -> &[Option<DocumentAnalysis>] {
        &self.slots
    }
}

impl From<Vec<Option<DocumentAnalysis>>> for AnalysisBatch {
    fn from(slots: Vec<Option<DocumentAnalysis>>) -> Self {
        Self { slots }
    }
}

/// Descriptive statistics over one score.
///
/// Field order matches the JSON block embedded in report prompts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub median: f64,
    pub mean: f64,
    pub std: f64,
    pub q1: f64,
    pub q3: f64,
}

/// Value/count pairs sorted by descending count.
pub type FrequencyTable = Vec<(String, usize)>;

/// Frequency tables over the tone fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TonePatterns {
    pub primary: FrequencyTable,
    pub secondary: FrequencyTable,
    pub characteristic: FrequencyTable,
    pub rhetorical: FrequencyTable,
    pub expressions: FrequencyTable,
}

/// Frequency tables over the vocabulary fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabularyPatterns {
    pub terms: FrequencyTable,
    pub phrases: FrequencyTable,
    pub register: FrequencyTable,
    pub word_choices: FrequencyTable,
    pub fields: FrequencyTable,
}

/// Aggregate statistics across the successful analyses of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStatistics {
    /// Number of analyses the statistics were computed from.
    pub analyzed: usize,
    pub tone: ScoreSummary,
    pub vocabulary: ScoreSummary,
    pub tone_patterns: TonePatterns,
    pub vocabulary_patterns: VocabularyPatterns,
}

/// The two generated narrative reports.
#[derive(Debug, Clone, PartialEq)]
pub struct Reports {
    pub tone: String,
    pub vocabulary: String,
}

/// A failed document as recorded in the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub document: String,
    pub reason: String,
}

/// Machine-readable summary of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub model_used: String,
    pub documents_total: usize,
    pub documents_analyzed: usize,
    pub documents_failed: usize,
    pub failures: Vec<FailureRecord>,
    pub statistics: AggregateStatistics,
    pub duration_seconds: f64,
}
