//! ToneProbe - tone of voice and vocabulary analysis for document batches
//!
//! A CLI tool that cleans .txt, .docx and .pdf documents, has a language
//! model analyze each one, aggregates the results and asks the model for
//! two narrative reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Error (missing API key, no document analyzed, report request failed, ...)

mod analysis;
mod cleaner;
mod cli;
mod config;
mod error;
mod llm;
mod models;
mod pipeline;
mod reader;
mod report;

#[cfg(test)]
mod testing;

use analysis::DocumentAnalyzer;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, CONFIG_FILE_NAME};
use error::PipelineError;
use llm::{LanguageModel, OpenAiClient};
use models::RunSummary;
use pipeline::BatchProcessor;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so `general.verbose` applies
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(log_level(&args, &config));

    info!("ToneProbe v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    match run(args, config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .toneprobe.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to customize the model, limits and report files.");
    Ok(())
}

fn log_level(args: &Args, config: &Config) -> tracing::Level {
    if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    }
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete workflow: discover, analyze, aggregate, synthesize, write.
async fn run(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Find the documents
    let (documents, skipped) = reader::discover_documents(&args.inputs);
    for path in &skipped {
        warn!("Skipping unsupported file: {}", path.display());
    }
    if documents.is_empty() {
        anyhow::bail!("No supported documents found (expected .txt, .docx or .pdf)");
    }
    println!("📄 Found {} documents", documents.len());

    // Handle --dry-run: read and clean only
    if args.dry_run {
        return handle_dry_run(&documents);
    }

    // Step 2: Build the model client (fails fast without a credential)
    let client = match OpenAiClient::new(&config.model, args.api_key.clone()) {
        Ok(client) => client,
        Err(e) => {
            warn!("{}", e);
            return Err(e.into());
        }
    };

    println!("🤖 Model: {}", client.model_name());
    println!("   Endpoint: {}", config.model.base_url);
    if let Some(secs) = config.model.timeout_seconds {
        println!("   Timeout: {}s", secs);
    }

    // Step 3: Analyze each document
    println!("\n🔬 Analyzing documents...");
    let analyzer = DocumentAnalyzer::new(&client, &config.model);
    let processor = BatchProcessor::new(analyzer, !args.quiet);
    let outcome = processor.run(&documents).await;

    let total = outcome.analyses.total();
    let failed = outcome.analyses.failed_count();

    // Step 4: Aggregate
    let statistics = analysis::aggregate(&outcome.analyses)
        .ok_or(PipelineError::EmptyBatch { failed, total })?;
    if failed > 0 {
        warn!("{} of {} documents could not be analyzed", failed, total);
    }

    // Step 5: Synthesize the reports
    println!("\n📝 Generating reports...");
    let synthesizer = report::ReportSynthesizer::new(&client, &config.model, &config.report);
    let reports = synthesizer
        .synthesize(&statistics, failed, total)
        .await
        .map_err(PipelineError::Synthesis)?;

    let min_words = config.report.min_words;
    for (name, text) in [("Tone", &reports.tone), ("Vocabulary", &reports.vocabulary)] {
        if !report::is_long_enough(text, min_words) {
            warn!(
                "{} report is shorter than requested: {} of {} words",
                name,
                report::word_count(text),
                min_words
            );
        }
    }

    // Step 6: Write the output files
    let output_dir = &config.general.output_dir;
    let written = report::write_reports(&reports, output_dir, &config.report)?;

    let duration = start_time.elapsed().as_secs_f64();

    let statistics_path = if config.report.write_statistics {
        let summary = RunSummary {
            generated_at: Utc::now(),
            model_used: client.model_name().to_string(),
            documents_total: total,
            documents_analyzed: statistics.analyzed,
            documents_failed: failed,
            failures: outcome.failure_records(),
            statistics: statistics.clone(),
            duration_seconds: duration,
        };
        Some(report::write_summary(&summary, output_dir)?)
    } else {
        None
    };

    // Print summary
    println!("\n📊 Analysis Summary:");
    println!("   Documents analyzed: {} of {}", statistics.analyzed, total);
    if failed > 0 {
        println!("   Documents failed: {}", failed);
        for failure in &outcome.failures {
            println!("     - {}", failure);
        }
    }
    println!(
        "   Formality: median {:.1}, mean {:.1}",
        statistics.tone.median, statistics.tone.mean
    );
    println!(
        "   Complexity: median {:.1}, mean {:.1}",
        statistics.vocabulary.median, statistics.vocabulary.mean
    );
    println!("   Duration: {:.1}s", duration);

    println!("\n✅ Reports saved:");
    println!("   {}", written.tone.display());
    println!("   {}", written.vocabulary.display());
    if let Some(path) = statistics_path {
        println!("   {}", path.display());
    }

    Ok(())
}

/// Handle --dry-run: read and clean every document, no model calls.
fn handle_dry_run(documents: &[PathBuf]) -> Result<()> {
    println!("\n🔍 Dry run: reading and cleaning documents (no model calls)...\n");

    let mut readable = 0;
    for path in documents {
        match pipeline::clean_document(path) {
            Ok(text) => {
                readable += 1;
                println!(
                    "     📄 {} ({} chars after cleaning)",
                    path.display(),
                    text.chars().count()
                );
            }
            Err(e) => println!("     ⚠️  {}: {}", path.display(), e),
        }
    }

    println!("\n   Readable: {} of {} documents", readable, documents.len());
    println!("\n✅ Dry run complete. No model calls were made.");
    Ok(())
}

/// Where the configuration came from; logged once logging is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Fallback(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => info!("Loaded default config from {}", CONFIG_FILE_NAME),
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Fallback(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Fallback(e))),
    }
}
