//! Report generation.
//!
//! The synthesizer asks the model for the narrative reports; the writer
//! puts them and the optional run summary on disk.

pub mod synthesizer;
pub mod writer;

pub use synthesizer::{is_long_enough, word_count, ReportSynthesizer};
pub use writer::{write_reports, write_summary};
