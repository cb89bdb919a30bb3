//! deplag - Lateness inspector CLI for pip requirements files
//!
//! Parses a requirements document, resolves each declared requirement
//! against PyPI and reports how many releases behind the resolved
//! versions are.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use deplag::cli::{AnalyzeArgs, Cli, Command, FormatArgs, PipelineArgs, ReportArgs};
use deplag::domain::{Environment, RequirementRecord};
use deplag::inspector::Inspector;
use deplag::output::{create_formatter, ReportFormat, ReportOptions};
use deplag::registry::{FileCache, HttpClient, PypiRegistry};
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "deplag=debug"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let quiet = cli.quiet;
    match cli.command {
        Command::Analyze(args) => run_analyze(args, quiet).await,
        Command::Report(args) => run_report(args, quiet).await,
        Command::Format(args) => run_format(args),
    }
}

async fn run_analyze(args: AnalyzeArgs, quiet: bool) -> anyhow::Result<()> {
    let records = run_pipeline(&args.pipeline, quiet).await?;
    let payload = to_json(&records, args.indent)?;
    write_output(args.destination.as_deref(), &payload)
}

async fn run_report(args: ReportArgs, quiet: bool) -> anyhow::Result<()> {
    let records = run_pipeline(&args.pipeline, quiet).await?;
    render_report(
        &records,
        args.format,
        args.failures,
        args.destination.as_deref(),
    )
}

fn run_format(args: FormatArgs) -> anyhow::Result<()> {
    let document = if args.source == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read standard input")?;
        content
    } else {
        fs::read_to_string(&args.source)
            .with_context(|| format!("unable to read analyze from {}", args.source))?
    };

    let records: Vec<RequirementRecord> = serde_json::from_str(&document)
        .context("analyze content is not a valid record collection")?;

    render_report(
        &records,
        args.format,
        args.with_failures(),
        args.destination.as_deref(),
    )
}

/// Run the inspection pipeline over the requirements source
async fn run_pipeline(
    args: &PipelineArgs,
    quiet: bool,
) -> anyhow::Result<Vec<RequirementRecord>> {
    let (document, base_dir) = read_source(&args.source)?;
    let environment = load_environment(args.env.as_deref())?;
    let inspector = build_inspector(args, quiet)?;

    let records = inspector
        .inspect(&document, environment.as_ref(), args.strict, Some(&base_dir))
        .await?;
    Ok(records)
}

/// Read the requirements content and resolve the inclusion base directory.
///
/// Standard input has no own directory, so inclusions resolve against the
/// current working directory in that case.
fn read_source(source: &str) -> anyhow::Result<(String, PathBuf)> {
    if source == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("failed to read standard input")?;
        let base_dir = std::env::current_dir().context("unable to resolve current directory")?;
        return Ok((content, base_dir));
    }

    let path = PathBuf::from(source);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("unable to read requirements from {}", path.display()))?;
    let resolved = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
    let base_dir = match resolved.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().context("unable to resolve current directory")?,
    };
    Ok((content, base_dir))
}

/// Load the marker environment mapping; an empty mapping counts as absent
fn load_environment(path: Option<&Path>) -> anyhow::Result<Option<Environment>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("unable to read environment from {}", path.display()))?;
    let environment: Environment = serde_json::from_str(&raw)
        .with_context(|| format!("invalid environment JSON in {}", path.display()))?;

    Ok((!environment.is_empty()).then_some(environment))
}

fn build_inspector(args: &PipelineArgs, quiet: bool) -> anyhow::Result<Inspector> {
    let timeout = (args.timeout > 0).then(|| Duration::from_secs(args.timeout));
    let user_agent = format!("deplag/{}", env!("CARGO_PKG_VERSION"));
    let client = HttpClient::with_config(timeout, &user_agent)?;

    let mut registry = PypiRegistry::new(client);
    if let Some(cachedir) = &args.cachedir {
        fs::create_dir_all(cachedir)
            .with_context(|| format!("unable to create cache directory {}", cachedir.display()))?;
        registry = registry.with_cache(Box::new(FileCache::new(cachedir)));
    }

    let chunk = (args.chunk > 0).then_some(args.chunk);
    let pause = (args.pause > 0).then(|| Duration::from_secs(args.pause));

    Ok(Inspector::new(Box::new(registry))
        .with_batching(chunk, pause)
        .with_progress(!quiet))
}

fn render_report(
    records: &[RequirementRecord],
    format: ReportFormat,
    with_failures: bool,
    destination: Option<&Path>,
) -> anyhow::Result<()> {
    let options = ReportOptions {
        with_failures,
        now: Utc::now(),
        color: destination.is_none(),
    };
    let formatter = create_formatter(format, options);

    let mut buffer = Vec::new();
    formatter.format(records, &mut buffer)?;
    write_output(destination, &String::from_utf8(buffer)?)
}

fn to_json(records: &[RequirementRecord], indent: usize) -> anyhow::Result<String> {
    if indent == 0 {
        return Ok(serde_json::to_string(records)?);
    }

    let indent_unit = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent_unit.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(Vec::new(), formatter);
    records.serialize(&mut serializer)?;
    Ok(String::from_utf8(serializer.into_inner())?)
}

fn write_output(destination: Option<&Path>, payload: &str) -> anyhow::Result<()> {
    match destination {
        Some(path) => {
            fs::write(path, payload)
                .with_context(|| format!("unable to write {}", path.display()))?;
            tracing::info!("output written to: {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(payload.as_bytes())?;
            if !payload.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}
