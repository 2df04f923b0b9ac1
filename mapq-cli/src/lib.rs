use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use mapq_ai::config::{Backend, LlmSettings};
use mapq_ai::ollama::OllamaClient;
use mapq_ai::pipeline::QueryPipeline;
use mapq_core::demo::{demo_pipeline_outputs, demo_queries};
use mapq_core::domain::{Entities, PipelineOutput, ValidationReport};
use mapq_core::error::AppError;
use mapq_core::infer::infer_maptype;
use mapq_core::report::render_validation_markdown;
use mapq_core::validate::validate_and_correct;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(
    name = "mapq",
    version,
    about = "Refine, extract and validate analyst map queries",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a pipeline output JSON document (file or stdin)
    Validate {
        /// Input file; reads stdin when omitted or "-"
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Infer a map type from an entities JSON object
    Infer {
        /// Entities as JSON, e.g. '{"theme": ["禁毒"]}'
        #[arg(short, long)]
        entities: String,
    },

    /// Run refine + extract + validate for one query using the configured model backend
    Query {
        /// Query text
        #[arg(required = true)]
        text: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Run the built-in demo queries
    Demo {
        /// Validate bundled sample payloads instead of calling a model
        #[arg(long)]
        offline: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },

    /// Check that the configured model backend is usable
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthStatus {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, serde::Serialize)]
struct PipelineRun<'a> {
    output: &'a PipelineOutput,
    report: &'a ValidationReport,
}

/// Read a pipeline output document from a file, or stdin for `None` / `-`.
pub fn load_pipeline_output(input: Option<&Path>) -> Result<PipelineOutput, AppError> {
    let text = match input {
        Some(path) if path != Path::new("-") => fs::read_to_string(path).map_err(|e| {
            AppError::new("IO_READ_FAILED", "Failed to read input file")
                .with_details(format!("path={}; err={e}", path.display()))
        })?,
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).map_err(|e| {
                AppError::new("IO_READ_FAILED", "Failed to read stdin").with_details(e.to_string())
            })?;
            buf
        }
    };
    PipelineOutput::from_json_str(&text)
}

pub fn parse_entities(text: &str) -> Result<Entities, AppError> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::new(
            "PAYLOAD_INVALID_SHAPE",
            "Entities must be a JSON object",
        )),
        Err(e) => Err(AppError::invalid_payload(&e)),
    }
}

pub fn render_run(
    input: &PipelineOutput,
    report: &ValidationReport,
    format: OutputFormat,
) -> Result<String, AppError> {
    match format {
        OutputFormat::Markdown => Ok(render_validation_markdown(input, report)),
        OutputFormat::Json => serde_json::to_string_pretty(&PipelineRun {
            output: input,
            report,
        })
        .map_err(|e| {
            AppError::new("REPORT_ENCODE_FAILED", "Failed to encode report")
                .with_details(e.to_string())
        }),
    }
}

fn cmd_validate(input: Option<&Path>, format: OutputFormat) -> Result<bool, AppError> {
    let payload = load_pipeline_output(input)?;
    let report = validate_and_correct(&payload);
    println!("{}", render_run(&payload, &report, format)?);
    Ok(report.is_valid)
}

fn cmd_infer(entities: &str) -> Result<bool, AppError> {
    let entities = parse_entities(entities)?;
    let inferred = infer_maptype(&entities);
    println!("{}", serde_json::json!(inferred));
    Ok(inferred.is_some())
}

fn run_queries<'q>(
    queries: impl IntoIterator<Item = &'q str>,
    format: OutputFormat,
) -> Result<bool, AppError> {
    let settings = LlmSettings::from_env()?;
    tracing::info!(?settings, "using model backend");
    let llm = settings.build_llm()?;
    let pipeline = QueryPipeline::new(llm.as_ref(), settings.model.clone());

    let mut all_valid = true;
    for (i, query) in queries.into_iter().enumerate() {
        tracing::info!(index = i + 1, "processing query");
        let (out, report) = pipeline.run_and_validate(query);
        all_valid &= report.is_valid;
        println!("{}", render_run(&out, &report, format)?);
    }
    Ok(all_valid)
}

fn cmd_demo(offline: bool, format: OutputFormat) -> Result<bool, AppError> {
    if !offline {
        return run_queries(demo_queries(), format);
    }
    let mut all_valid = true;
    for payload in demo_pipeline_outputs() {
        let report = validate_and_correct(&payload);
        all_valid &= report.is_valid;
        println!("{}", render_run(&payload, &report, format)?);
    }
    Ok(all_valid)
}

pub fn health_check(settings: &LlmSettings) -> Result<HealthStatus, AppError> {
    match settings.backend {
        Backend::Ollama => {
            OllamaClient::new(&settings.base_url)?.health_check()?;
            Ok(HealthStatus {
                ok: true,
                message: "Ollama reachable on 127.0.0.1".to_string(),
            })
        }
        Backend::OpenAi => {
            settings.build_llm()?;
            Ok(HealthStatus {
                ok: true,
                message: format!("Remote backend configured at {}", settings.base_url),
            })
        }
    }
}

fn cmd_health() -> Result<bool, AppError> {
    let status = health_check(&LlmSettings::from_env()?)?;
    println!("{}", serde_json::json!(status));
    Ok(status.ok)
}

fn setup_tracing(format: LogFormat, verbose: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("mapq_core=debug,mapq_ai=debug,mapq_cli_lib=debug,info")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    // stderr keeps stdout machine-readable.
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Dispatch a parsed command. `Ok(false)` means the command ran but the result needs review.
pub fn execute(command: &Command) -> Result<bool, AppError> {
    match command {
        Command::Validate { input, format } => cmd_validate(input.as_deref(), *format),
        Command::Infer { entities } => cmd_infer(entities),
        Command::Query { text, format } => run_queries([text.join(" ").as_str()], *format),
        Command::Demo { offline, format } => cmd_demo(*offline, *format),
        Command::Health => cmd_health(),
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.log_format, cli.verbose);

    match execute(&cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            tracing::error!(code = %e.code, details = ?e.details, "command failed");
            eprintln!("{e}");
            if let Some(d) = &e.details {
                eprintln!("  {d}");
            }
            ExitCode::FAILURE
        }
    }
}
