//! Per-document tone and vocabulary analysis.
//!
//! Sends cleaned text to the language model with an instruction to answer
//! with a fixed JSON record, and validates the answer into a
//! `DocumentAnalysis`. Each document gets exactly one attempt.

use crate::config::ModelConfig;
use crate::error::AnalysisError;
use crate::llm::{ChatRequest, LanguageModel};
use crate::models::DocumentAnalysis;
use tracing::{debug, warn};

/// Analyzes single documents through a language model.
pub struct DocumentAnalyzer<'a> {
    model: &'a dyn LanguageModel,
    temperature: f32,
    max_input_chars: usize,
}

impl<'a> DocumentAnalyzer<'a> {
    pub fn new(model: &'a dyn LanguageModel, config: &ModelConfig) -> Self {
        Self {
            model,
            temperature: config.analysis_temperature,
            max_input_chars: config.max_input_chars,
        }
    }

    /// Analyze cleaned text, returning `None` on any failure.
    ///
    /// Failures are logged, never raised, so one bad document cannot stop
    /// a batch.
    #[allow(dead_code)] // The pipeline uses try_analyze to keep the reason
    pub async fn analyze(&self, text: &str) -> Option<DocumentAnalysis> {
        match self.try_analyze(text).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!("Document analysis failed: {}", e);
                None
            }
        }
    }

    /// Analyze cleaned text, reporting why it failed.
    ///
    /// Text beyond `max_input_chars` is cut off before sending, so only the
    /// beginning of long documents is analyzed.
    pub async fn try_analyze(&self, text: &str) -> Result<DocumentAnalysis, AnalysisError> {
        let input = truncate_chars(text, self.max_input_chars);
        if input.len() < text.len() {
            debug!(
                "Truncated document from {} to {} chars",
                text.chars().count(),
                self.max_input_chars
            );
        }

        let request = ChatRequest::new(ANALYSIS_SYSTEM_PROMPT, input, self.temperature);
        let response = self.model.complete(&request).await?;

        parse_analysis(&response).map_err(|e| {
            debug!("Unparseable analysis response: {}", response);
            AnalysisError::MalformedResponse(e)
        })
    }
}

/// First `max_chars` characters of `text`, cut on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Remove markdown code fence markers the model may wrap its JSON in.
pub fn strip_code_fences(response: &str) -> String {
    response
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a model response into an analysis record.
pub fn parse_analysis(response: &str) -> Result<DocumentAnalysis, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(response))
}

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are an expert in linguistic analysis.
You MUST RESPOND WITH VALID JSON ONLY, without markdown or any other text.
Analyze the provided text focusing only on its main editorial content.

IGNORE:
- Code and technical snippets
- Navigation menus
- Headers and footers
- UI elements (buttons, forms, etc.)
- Cookie or privacy notices
- Social sharing elements
- Meta information (dates, authors, tags)

ANALYZE:
- The main content of the text
- The writing style
- The linguistic register
- The lexical choices
- The rhetorical patterns

Return exactly this JSON structure:
{
    "tone": {
        "formality_score": float (1-10),
        "primary_tone": string,
        "secondary_tones": [string],
        "characteristic_patterns": [string],
        "notable_expressions": [string],
        "rhetorical_devices": [string]
    },
    "vocabulary": {
        "complexity_score": float (1-10),
        "domain_specific_terms": [string],
        "recurring_phrases": [string],
        "register_level": string,
        "distinctive_word_choices": [string],
        "semantic_fields": [string]
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::testing::{sample_analysis_json, ScriptedModel};

    fn config() -> ModelConfig {
        ModelConfig {
            max_input_chars: 10,
            ..ModelConfig::default()
        }
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 5), "");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn test_parse_fenced_analysis() {
        let response = format!("```json\n{}\n```", sample_analysis_json());
        let analysis = parse_analysis(&response).unwrap();
        assert_eq!(analysis.tone.formality_score, 7.5);
        assert_eq!(analysis.vocabulary.register_level, "professional");
    }

    #[tokio::test]
    async fn test_analyze_sends_truncated_text() {
        let model = ScriptedModel::new(vec![Ok(sample_analysis_json().to_string())]);
        let analyzer = DocumentAnalyzer::new(&model, &config());

        let analysis = analyzer.analyze("0123456789ABCDEF").await;
        assert!(analysis.is_some());

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].user, "0123456789");
        assert_eq!(requests[0].temperature, 0.3);
        assert!(requests[0].system.contains("\"formality_score\""));
    }

    #[tokio::test]
    async fn test_analyze_request_failure_is_absent() {
        let model = ScriptedModel::new(vec![Err(LlmError::Api {
            status: 401,
            body: "invalid key".to_string(),
        })]);
        let analyzer = DocumentAnalyzer::new(&model, &config());

        assert!(analyzer.analyze("text").await.is_none());
        assert_eq!(model.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_try_analyze_malformed_json() {
        let model = ScriptedModel::new(vec![Ok("Sure! Here is the analysis: {".to_string())]);
        let analyzer = DocumentAnalyzer::new(&model, &config());

        let err = analyzer.try_analyze("text").await.unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedResponse(_)));
    }

    #[test]
    fn test_partial_record_is_absent() {
        let mut value = sample_analysis_json();
        value.as_object_mut().unwrap().remove("vocabulary");
        let model = ScriptedModel::new(vec![Ok(value.to_string())]);
        let analyzer = DocumentAnalyzer::new(&model, &config());

        assert!(tokio_test::block_on(analyzer.analyze("text")).is_none());
    }
}
