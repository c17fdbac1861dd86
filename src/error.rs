//! Error types for the analysis pipeline.
//!
//! Per-document errors (`ReadError`, `AnalysisError`) are contained by the
//! pipeline loop and turned into failure ledger entries. `PipelineError`
//! covers the batch-level failures that reach `main`.

use std::path::PathBuf;

/// Errors from language model requests.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Errors from reading a single document.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse Word document {path}: {message}")]
    Docx { path: PathBuf, message: String },

    #[error("failed to extract PDF text from {path}: {message}")]
    Pdf { path: PathBuf, message: String },

    #[error("failed to stage upload {name}: {source}")]
    Staging {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from analyzing a single document.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Request(#[from] LlmError),

    #[error("model response is not a valid analysis record: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Batch-level failures surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("no API key found: pass --api-key or set {env_var}")]
    MissingCredential { env_var: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("all {failed} of {total} documents failed analysis; no reports generated")]
    EmptyBatch { failed: usize, total: usize },

    #[error("report generation failed: {0}")]
    Synthesis(#[source] LlmError),
}
