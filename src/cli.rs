//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ToneProbe - tone of voice and vocabulary analysis for document batches
///
/// Cleans a batch of .txt, .docx and .pdf documents, asks a language model
/// to analyze each one, and writes two narrative reports built from the
/// aggregated results.
///
/// Examples:
///   toneprobe articles/
///   toneprobe post1.txt post2.docx whitepaper.pdf -o reports
///   toneprobe articles/ --model gpt-4o-mini --stats
///   toneprobe articles/ --dry-run
///   toneprobe --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Documents or directories to analyze
    ///
    /// Directories are searched recursively for .txt, .docx and .pdf files.
    #[arg(value_name = "INPUTS", required_unless_present = "init_config")]
    pub inputs: Vec<PathBuf>,

    /// API key for the language model service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model to use for analysis and reports
    #[arg(short, long, env = "TONEPROBE_MODEL")]
    pub model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory the reports are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .toneprobe.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum word count expected from each report
    #[arg(long, value_name = "WORDS")]
    pub min_words: Option<usize>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Characters of cleaned text sent to the model per document
    #[arg(long, value_name = "CHARS")]
    pub max_chars: Option<usize>,

    /// Also write statistics.json with the aggregate statistics
    #[arg(long)]
    pub stats: bool,

    /// Read and clean documents without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .toneprobe.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.inputs.is_empty() {
            return Err("At least one input file or directory is required".to_string());
        }

        for input in &self.inputs {
            if !input.exists() {
                return Err(format!("Input does not exist: {}", input.display()));
            }
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.max_chars == Some(0) {
            return Err("Max chars must be at least 1".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            inputs: vec![PathBuf::from(".")],
            api_key: None,
            model: None,
            base_url: None,
            output_dir: None,
            config: None,
            min_words: None,
            timeout: None,
            max_chars: None,
            stats: false,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let mut args = make_args();
        args.inputs = vec![PathBuf::from("definitely/not/here.txt")];
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let mut args = make_args();
        args.base_url = Some("api.openai.com".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_limits() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.max_chars = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.inputs.clear();
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_inputs() {
        let args = Args::parse_from(["toneprobe", "a.txt", "docs/", "--dry-run"]);
        assert_eq!(args.inputs, vec![PathBuf::from("a.txt"), PathBuf::from("docs/")]);
        assert!(args.dry_run);
    }
}
