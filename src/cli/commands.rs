//! CLI command definitions for synthkit.
//!
//! Two commands: `create` runs the generation pipeline over an input file,
//! `ingest` validates and normalizes a Parquet dataset for later runs.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use crate::config::SynthConfig;
use crate::export;
use crate::generator::{ContentType, GenerationPipeline};
use crate::llm::{CompletionClient, DEFAULT_MODEL};
use crate::loader;
use crate::progress::ProgressMonitor;

/// Default output directory for generated content.
const DEFAULT_OUTPUT_DIR: &str = "./generated";

/// Default output directory for normalized datasets.
const DEFAULT_DATA_DIR: &str = "./data";

/// Synthetic training data generator.
#[derive(Parser)]
#[command(name = "synthkit")]
#[command(about = "Generate synthetic training data from source documents with an LLM")]
#[command(version)]
#[command(
    long_about = "synthkit turns source documents into synthetic training data: QA pairs,\n\
distilled passages, knowledge lists, knowledge rewrites, and Wikipedia-style rephrasings.\n\n\
Example usage:\n  synthkit create report.parquet --type qa --output-dir ./generated"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate content from an input file.
    #[command(alias = "gen")]
    Create(CreateArgs),

    /// Validate a Parquet dataset and rewrite it normalized (text + id columns).
    Ingest(IngestArgs),
}

/// Arguments for `synthkit create`.
#[derive(Parser, Debug)]
pub struct CreateArgs {
    /// Input file: a UTF-8 .txt file or a .parquet dataset with a 'text' column.
    pub input: String,

    /// Content type to generate.
    #[arg(short = 't', long = "type", value_enum, default_value = "qa")]
    pub content_type: ContentType,

    /// Directory for the generated JSON file.
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: String,

    /// Optional YAML config file (generation knobs + prompt overrides).
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Base URL of the completion API (e.g. http://localhost:8000/v1).
    #[arg(long, env = "SYNTHKIT_API_BASE")]
    pub api_base: Option<String>,

    /// API key for the completion API.
    #[arg(long, env = "SYNTHKIT_API_KEY")]
    pub api_key: Option<String>,

    /// Model identifier sent with every request.
    #[arg(short = 'm', long, env = "SYNTHKIT_MODEL")]
    pub model: Option<String>,

    /// Override chunk size in characters (QA generation).
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Override chunk overlap in characters.
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Override prompts per batch.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Override sampling temperature.
    #[arg(long)]
    pub temperature: Option<f64>,

    /// For QA: output a mapping from document id to its original text and pairs.
    #[arg(long)]
    pub per_document: bool,

    /// Print the run summary as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Arguments for `synthkit ingest`.
#[derive(Parser, Debug)]
pub struct IngestArgs {
    /// Input Parquet file.
    pub input: String,

    /// Directory for the normalized dataset.
    #[arg(short = 'o', long, default_value = DEFAULT_DATA_DIR)]
    pub output_dir: String,

    /// Custom output filename stem (defaults to the input stem).
    #[arg(short = 'n', long)]
    pub name: Option<String>,

    /// Print the run summary as JSON.
    #[arg(short = 'j', long)]
    pub json: bool,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Create(args) => run_create_command(args).await,
        Commands::Ingest(args) => run_ingest_command(args).await,
    }
}

#[derive(Debug, Clone, Serialize)]
struct CreateSummary {
    status: String,
    run_id: String,
    content_type: String,
    documents: usize,
    prompts: usize,
    failed_prompts: usize,
    records: usize,
    output_path: String,
}

async fn run_create_command(args: CreateArgs) -> anyhow::Result<()> {
    let input = Path::new(&args.input);

    let mut config = SynthConfig::load(args.config.as_deref())?;
    if let Some(v) = args.chunk_size {
        config.generation.chunk_size = v;
    }
    if let Some(v) = args.chunk_overlap {
        config.generation.overlap = v;
    }
    if let Some(v) = args.batch_size {
        config.generation.batch_size = v;
    }
    if let Some(v) = args.temperature {
        config.generation.temperature = v;
    }
    config.validate()?;

    // Load documents before touching the backend so bad inputs fail fast.
    let documents = loader::load_documents(input)?;

    let client = build_client(
        args.api_base.clone(),
        args.api_key.clone(),
        args.model.clone(),
        &config,
    )?;
    let run_id = uuid::Uuid::new_v4();
    info!(
        run_id = %run_id,
        content_type = args.content_type.label(),
        documents = documents.len(),
        model = client.default_model(),
        "Starting generation run"
    );

    let pipeline = GenerationPipeline::new(Arc::new(client), config)?;
    let monitor = ProgressMonitor::start(pipeline.counters(), 0, Duration::from_secs(10));
    let result = pipeline
        .run(&documents, args.content_type, args.per_document)
        .await;
    monitor.stop().await;
    let report = result?;

    if let Some(counts) = &report.qa_counts {
        for (id, count) in counts {
            tracing::debug!(id = %id, pairs = count, "QA pairs per document");
        }
    }

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let output_path = export::output_path(Path::new(&args.output_dir), stem, args.content_type);
    export::write_json(&report.output, &output_path)?;

    let summary = CreateSummary {
        status: if report.failed_prompts == 0 {
            "success".to_string()
        } else {
            "partial".to_string()
        },
        run_id: run_id.to_string(),
        content_type: args.content_type.label().to_string(),
        documents: report.documents,
        prompts: report.prompts,
        failed_prompts: report.failed_prompts,
        records: report.output.record_count(),
        output_path: output_path.display().to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Generated {} {} records from {} documents ({} prompts, {} failed)",
            summary.records,
            summary.content_type,
            summary.documents,
            summary.prompts,
            summary.failed_prompts
        );
        println!("Saved output to {}", summary.output_path);
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize)]
struct IngestSummary {
    status: String,
    rows: usize,
    output_path: String,
}

async fn run_ingest_command(args: IngestArgs) -> anyhow::Result<()> {
    let input = Path::new(&args.input);
    let output_dir = Path::new(&args.output_dir);

    let output_path = loader::parquet::normalize_file(input, output_dir, args.name.as_deref())?;
    let rows = loader::parquet::read_documents(&output_path)?.len();

    let summary = IngestSummary {
        status: "success".to_string(),
        rows,
        output_path: output_path.display().to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Normalized {} rows into {}",
            summary.rows, summary.output_path
        );
    }

    Ok(())
}

fn build_client(
    api_base: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    config: &SynthConfig,
) -> anyhow::Result<CompletionClient> {
    let api_base = api_base
        .or_else(|| config.llm.api_base.clone())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No completion API configured. Pass --api-base, set SYNTHKIT_API_BASE, \
                 or add llm.api_base to the config file."
            )
        })?;
    let api_key = api_key.or_else(|| config.llm.api_key.clone());
    let model = model
        .or_else(|| config.llm.model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    Ok(CompletionClient::new(api_base, api_key, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_create_with_type() {
        let cli = Cli::try_parse_from([
            "synthkit",
            "create",
            "input.parquet",
            "--type",
            "knowledge-list",
            "--batch-size",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Create(args) => {
                assert_eq!(args.input, "input.parquet");
                assert_eq!(args.content_type, ContentType::KnowledgeList);
                assert_eq!(args.batch_size, Some(4));
                assert!(!args.per_document);
            }
            _ => panic!("expected create command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_content_type() {
        let result = Cli::try_parse_from([
            "synthkit",
            "create",
            "input.parquet",
            "--type",
            "haiku",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_gen_alias() {
        let cli = Cli::try_parse_from(["synthkit", "gen", "input.txt"]).unwrap();
        assert!(matches!(cli.command, Commands::Create(_)));
    }

    #[test]
    fn test_build_client_prefers_flags_over_config() {
        let mut config = SynthConfig::default();
        config.llm.api_base = Some("http://config:1234/v1".to_string());
        config.llm.model = Some("config-model".to_string());

        let client = build_client(
            Some("http://flag:8000/v1".to_string()),
            None,
            None,
            &config,
        )
        .unwrap();

        assert_eq!(client.api_base(), "http://flag:8000/v1");
        assert_eq!(client.default_model(), "config-model");
    }

    #[test]
    fn test_build_client_requires_api_base() {
        let config = SynthConfig::default();
        assert!(build_client(None, None, None, &config).is_err());
    }
}
