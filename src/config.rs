//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.toneprobe.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE_NAME: &str = ".toneprobe.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory the reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbose: false,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name sent with every request.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of the OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Temperature for per-document analysis.
    #[serde(default = "default_analysis_temperature")]
    pub analysis_temperature: f32,

    /// Temperature for the narrative reports.
    #[serde(default = "default_report_temperature")]
    pub report_temperature: f32,

    /// Characters of cleaned text sent per document. Longer text is cut.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Request timeout in seconds. None keeps the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            analysis_temperature: default_analysis_temperature(),
            report_temperature: default_report_temperature(),
            max_input_chars: default_max_input_chars(),
            timeout_seconds: None,
        }
    }
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_analysis_temperature() -> f32 {
    0.3
}

fn default_report_temperature() -> f32 {
    0.7
}

fn default_max_input_chars() -> usize {
    4000
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Minimum words each narrative report should reach.
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Also write `statistics.json` next to the reports.
    #[serde(default)]
    pub write_statistics: bool,

    /// File name of the tone report.
    #[serde(default = "default_tone_file")]
    pub tone_file: String,

    /// File name of the vocabulary report.
    #[serde(default = "default_vocabulary_file")]
    pub vocabulary_file: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            write_statistics: false,
            tone_file: default_tone_file(),
            vocabulary_file: default_vocabulary_file(),
        }
    }
}

fn default_min_words() -> usize {
    1000
}

fn default_tone_file() -> String {
    "tone_analysis.md".to_string()
}

fn default_vocabulary_file() -> String {
    "vocabulary_analysis.md".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only explicitly provided CLI values override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref base_url) = args.base_url {
            self.model.base_url = base_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = Some(timeout);
        }
        if let Some(max_chars) = args.max_chars {
            self.model.max_input_chars = max_chars;
        }

        if let Some(ref output_dir) = args.output_dir {
            self.general.output_dir = output_dir.clone();
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(min_words) = args.min_words {
            self.report.min_words = min_words;
        }
        if args.stats {
            self.report.write_statistics = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.model.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.model.analysis_temperature, 0.3);
        assert_eq!(config.model.report_temperature, 0.7);
        assert_eq!(config.model.max_input_chars, 4000);
        assert_eq!(config.model.timeout_seconds, None);
        assert_eq!(config.report.min_words, 1000);
        assert_eq!(config.report.tone_file, "tone_analysis.md");
        assert_eq!(config.report.vocabulary_file, "vocabulary_analysis.md");
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "reports"
verbose = true

[model]
name = "gpt-4o-mini"
analysis_temperature = 0.2
timeout_seconds = 120

[report]
min_words = 1500
write_statistics = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, PathBuf::from("reports"));
        assert!(config.general.verbose);
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.model.analysis_temperature, 0.2);
        assert_eq!(config.model.report_temperature, 0.7);
        assert_eq!(config.model.timeout_seconds, Some(120));
        assert_eq!(config.report.min_words, 1500);
        assert!(config.report.write_statistics);
        assert_eq!(config.report.tone_file, "tone_analysis.md");
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        let args = Args::parse_from([
            "toneprobe",
            "--model",
            "local-model",
            "--min-words",
            "800",
            "--stats",
            "-o",
            "out",
            "doc.txt",
        ]);
        config.merge_with_args(&args);

        assert_eq!(config.model.name, "local-model");
        assert_eq!(config.model.base_url, "https://api.openai.com/v1");
        assert_eq!(config.report.min_words, 800);
        assert!(config.report.write_statistics);
        assert_eq!(config.general.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[report]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.model.name, "gpt-4o");
    }
}
