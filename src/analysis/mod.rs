//! Document analysis and batch aggregation.

pub mod aggregator;
pub mod analyzer;

pub use aggregator::{aggregate, prompt_blocks, PromptBlocks};
pub use analyzer::DocumentAnalyzer;
