//! Shared test fixtures.

use crate::error::LlmError;
use crate::llm::{ChatRequest, LanguageModel};
use crate::models::DocumentAnalysis;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A complete, well-formed analysis record as the model would return it.
pub fn sample_analysis_json() -> Value {
    json!({
        "tone": {
            "formality_score": 7.5,
            "primary_tone": "authoritative",
            "secondary_tones": ["warm", "direct"],
            "characteristic_patterns": ["short imperative sentences"],
            "notable_expressions": ["in a nutshell"],
            "rhetorical_devices": ["anaphora", "rhetorical question"]
        },
        "vocabulary": {
            "complexity_score": 6.0,
            "domain_specific_terms": ["latency", "throughput"],
            "recurring_phrases": ["at scale"],
            "register_level": "professional",
            "distinctive_word_choices": ["crisp"],
            "semantic_fields": ["engineering", "performance"]
        }
    })
}

/// The sample record with the two scores replaced.
pub fn analysis_with_scores(formality: f64, complexity: f64) -> DocumentAnalysis {
    let mut value = sample_analysis_json();
    value["tone"]["formality_score"] = json!(formality);
    value["vocabulary"]["complexity_score"] = json!(complexity);
    serde_json::from_value(value).expect("sample analysis is valid")
}

/// Language model double that replays scripted answers in order and
/// records every request it receives.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyResponse))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
