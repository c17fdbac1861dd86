//! Batch aggregation and statistics.
//!
//! This module turns the successful analyses of a batch into descriptive
//! statistics over the two scores and frequency tables over the
//! categorical fields.

use crate::models::{
    AggregateStatistics, AnalysisBatch, DocumentAnalysis, FrequencyTable, ScoreSummary,
    TonePatterns, VocabularyPatterns,
};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::debug;

/// Aggregate the successful analyses of a batch.
///
/// Returns `None` when no document was analyzed successfully; the caller
/// reports the failed count from the batch.
pub fn aggregate(batch: &AnalysisBatch) -> Option<AggregateStatistics> {
    let analyses: Vec<&DocumentAnalysis> = batch.successful().collect();
    if analyses.is_empty() {
        return None;
    }

    debug!(
        "Aggregating {} of {} analyses",
        analyses.len(),
        batch.total()
    );

    let formality: Vec<f64> = analyses.iter().map(|a| a.tone.formality_score).collect();
    let complexity: Vec<f64> = analyses
        .iter()
        .map(|a| a.vocabulary.complexity_score)
        .collect();

    let tone_patterns = TonePatterns {
        primary: frequency_table(analyses.iter().map(|a| &a.tone.primary_tone)),
        secondary: frequency_table(analyses.iter().flat_map(|a| &a.tone.secondary_tones)),
        characteristic: frequency_table(
            analyses
                .iter()
                .flat_map(|a| &a.tone.characteristic_patterns),
        ),
        rhetorical: frequency_table(analyses.iter().flat_map(|a| &a.tone.rhetorical_devices)),
        expressions: frequency_table(analyses.iter().flat_map(|a| &a.tone.notable_expressions)),
    };

    let vocabulary_patterns = VocabularyPatterns {
        terms: frequency_table(
            analyses
                .iter()
                .flat_map(|a| &a.vocabulary.domain_specific_terms),
        ),
        phrases: frequency_table(analyses.iter().flat_map(|a| &a.vocabulary.recurring_phrases)),
        register: frequency_table(analyses.iter().map(|a| &a.vocabulary.register_level)),
        word_choices: frequency_table(
            analyses
                .iter()
                .flat_map(|a| &a.vocabulary.distinctive_word_choices),
        ),
        fields: frequency_table(analyses.iter().flat_map(|a| &a.vocabulary.semantic_fields)),
    };

    Some(AggregateStatistics {
        analyzed: analyses.len(),
        tone: summarize(&formality)?,
        vocabulary: summarize(&complexity)?,
        tone_patterns,
        vocabulary_patterns,
    })
}

/// Median, mean, population standard deviation and quartiles.
///
/// Returns `None` for an empty slice.
pub fn summarize(scores: &[f64]) -> Option<ScoreSummary> {
    if scores.is_empty() {
        return None;
    }

    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;

    Some(ScoreSummary {
        median: percentile(&sorted, 50.0),
        mean,
        std: variance.sqrt(),
        q1: percentile(&sorted, 25.0),
        q3: percentile(&sorted, 75.0),
    })
}

/// Percentile with linear interpolation between the closest ranks.
///
/// `sorted` must be non-empty and ascending.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Count distinct values, most frequent first; ties keep first-seen order.
pub fn frequency_table<'a, I>(values: I) -> FrequencyTable
where
    I: IntoIterator<Item = &'a String>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut table: FrequencyTable = Vec::new();

    for value in values {
        match positions.get(value.as_str()) {
            Some(&idx) => table[idx].1 += 1,
            None => {
                positions.insert(value.as_str(), table.len());
                table.push((value.clone(), 1));
            }
        }
    }

    // sort_by_key is stable
    table.sort_by_key(|(_, count)| Reverse(*count));
    table
}

/// Pretty-printed JSON blocks embedded verbatim in the report prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptBlocks {
    pub tone_statistics: String,
    pub tone_patterns: String,
    pub vocabulary_statistics: String,
    pub vocabulary_patterns: String,
}

/// Serialize statistics and frequency tables for the report prompts.
///
/// Frequency tables come out as `[[value, count], ...]`.
pub fn prompt_blocks(stats: &AggregateStatistics) -> PromptBlocks {
    PromptBlocks {
        tone_statistics: pretty_json(&stats.tone),
        tone_patterns: pretty_json(&stats.tone_patterns),
        vocabulary_statistics: pretty_json(&stats.vocabulary),
        vocabulary_patterns: pretty_json(&stats.vocabulary_patterns),
    }
}

// Plain structs with string keys always serialize.
fn pretty_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
