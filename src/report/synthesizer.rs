//! Narrative report synthesis.
//!
//! Builds the tone and vocabulary prompts from the aggregate statistics and
//! asks the model for one long-form Markdown report each.

use crate::analysis::{prompt_blocks, PromptBlocks};
use crate::config::{ModelConfig, ReportConfig};
use crate::error::LlmError;
use crate::llm::{ChatRequest, LanguageModel};
use crate::models::{AggregateStatistics, Reports};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

const TONE_PERSONA: &str = "You are a linguistic analysis expert specializing in tone of voice.";

const VOCABULARY_PERSONA: &str =
    "You are an expert in lexical analysis and computational linguistics.";

const TONE_SECTIONS: [&str; 9] = [
    "Executive Summary",
    "Detailed Statistical Analysis",
    "Identified Stylistic Patterns",
    "Analysis of Rhetorical Devices",
    "Variations and Special Cases",
    "Implications and Best Practices",
    "Recommendations for Consistency",
    "Concrete Examples and Analysis",
    "Conclusions and Next Steps",
];

const VOCABULARY_SECTIONS: [&str; 10] = [
    "Executive Summary",
    "Detailed Statistical Analysis",
    "Dominant Semantic Fields",
    "Lexical Patterns",
    "Analysis of the Linguistic Register",
    "Specialist Terms and Their Use",
    "Variations and Trends",
    "Best Practices and Guidelines",
    "Examples and Case Studies",
    "Conclusions and Recommendations",
];

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Counts of the batch the statistics were computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchCounts {
    pub failed: usize,
    pub total: usize,
    pub analyzed: usize,
}

impl BatchCounts {
    fn failure_note(&self) -> String {
        format!(
            "NOTE: {} of {} documents could not be analyzed due to errors.",
            self.failed, self.total
        )
    }
}

/// Generates the two narrative reports through a language model.
pub struct ReportSynthesizer<'a> {
    model: &'a dyn LanguageModel,
    temperature: f32,
    min_words: usize,
}

impl<'a> ReportSynthesizer<'a> {
    pub fn new(model: &'a dyn LanguageModel, model_config: &ModelConfig, report: &ReportConfig) -> Self {
        Self {
            model,
            temperature: model_config.report_temperature,
            min_words: report.min_words,
        }
    }

    /// Request the tone report, then the vocabulary report.
    ///
    /// The first failing request aborts synthesis; nothing is retried.
    pub async fn synthesize(
        &self,
        stats: &AggregateStatistics,
        failed: usize,
        total: usize,
    ) -> Result<Reports, LlmError> {
        let counts = BatchCounts {
            failed,
            total,
            analyzed: stats.analyzed,
        };
        let blocks = prompt_blocks(stats);

        info!("Requesting tone report");
        let tone = self
            .model
            .complete(&ChatRequest::new(
                TONE_PERSONA,
                tone_prompt(&blocks, counts, self.min_words),
                self.temperature,
            ))
            .await?;

        info!("Requesting vocabulary report");
        let vocabulary = self
            .model
            .complete(&ChatRequest::new(
                VOCABULARY_PERSONA,
                vocabulary_prompt(&blocks, counts, self.min_words),
                self.temperature,
            ))
            .await?;

        Ok(Reports { tone, vocabulary })
    }
}

/// User prompt for the tone of voice report.
pub fn tone_prompt(blocks: &PromptBlocks, counts: BatchCounts, min_words: usize) -> String {
    build_prompt(
        "tone of voice",
        "Formality statistics",
        &blocks.tone_statistics,
        &blocks.tone_patterns,
        &TONE_SECTIONS,
        counts,
        min_words,
    )
}

/// User prompt for the vocabulary report.
pub fn vocabulary_prompt(blocks: &PromptBlocks, counts: BatchCounts, min_words: usize) -> String {
    build_prompt(
        "vocabulary",
        "Complexity statistics",
        &blocks.vocabulary_statistics,
        &blocks.vocabulary_patterns,
        &VOCABULARY_SECTIONS,
        counts,
        min_words,
    )
}

fn build_prompt(
    subject: &str,
    statistics_label: &str,
    statistics: &str,
    patterns: &str,
    sections: &[&str],
    counts: BatchCounts,
    min_words: usize,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Write a detailed report (at least {} words) on the {}.\n",
        min_words, subject
    ));
    prompt.push_str(&counts.failure_note());
    prompt.push('\n');
    prompt.push_str(&format!(
        "This analysis is based on the {} successfully analyzed documents.\n\n",
        counts.analyzed
    ));

    prompt.push_str(&format!("{}:\n{}\n\n", statistics_label, statistics));
    prompt.push_str(&format!("Identified patterns:\n{}\n\n", patterns));

    prompt.push_str("The report must include:\n");
    for (i, section) in sections.iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, section));
    }
    prompt.push_str("\nEach section must be thorough and supported by specific examples.\n");

    prompt
}

/// Number of word tokens in `text`.
pub fn word_count(text: &str) -> usize {
    WORD.find_iter(text).count()
}

/// Whether `text` reaches `min_words` word tokens.
pub fn is_long_enough(text: &str, min_words: usize) -> bool {
    word_count(text) >= min_words
}
