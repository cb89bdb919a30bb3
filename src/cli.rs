//! CLI argument parsing module for deplag

use crate::output::ReportFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Lateness inspector for pip requirements files
#[derive(Parser, Debug, Clone)]
#[command(
    name = "deplag",
    version,
    about = "Lateness inspector for pip requirements files"
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Silence progress display and most logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze a requirements file and output the records as JSON
    Analyze(AnalyzeArgs),
    /// Analyze a requirements file and render a report
    Report(ReportArgs),
    /// Render a report from an existing analyze JSON document
    Format(FormatArgs),
}

/// Options shared by the commands that run the inspection pipeline
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Requirements file to parse, or '-' for standard input
    #[arg(default_value = "requirements.txt")]
    pub source: String,

    /// Directory for the registry response cache, created when missing.
    /// Entries never expire; delete files to refresh them.
    #[arg(long, value_name = "DIRPATH")]
    pub cachedir: Option<PathBuf>,

    /// JSON file of environment variables used for marker evaluation.
    /// Without it every marker is treated as satisfied.
    #[arg(long, value_name = "FILEPATH")]
    pub env: Option<PathBuf>,

    /// Requirements to process per chunk, zero disables chunking
    #[arg(long, default_value_t = 20)]
    pub chunk: usize,

    /// Seconds to pause between chunks, zero disables the pause
    #[arg(long, default_value_t = 1)]
    pub pause: u64,

    /// Timeout in seconds for registry requests, zero disables it
    #[arg(long, default_value_t = 15)]
    pub timeout: u64,

    /// Only keep requirements that are at least syntactically valid
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// File path destination for the JSON output, stdout when absent
    #[arg(long, value_name = "FILEPATH")]
    pub destination: Option<PathBuf>,

    /// Indentation level for the JSON output, zero for compact
    #[arg(long, default_value_t = 4)]
    pub indent: usize,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// File path destination for the report, stdout when absent
    #[arg(long, value_name = "FILEPATH")]
    pub destination: Option<PathBuf>,

    /// Include requirement failures in a second table
    #[arg(long)]
    pub failures: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FormatArgs {
    /// Analyze JSON file to format, or '-' for standard input
    #[arg(default_value = "-")]
    pub source: String,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// File path destination for the report, stdout when absent
    #[arg(long, value_name = "FILEPATH")]
    pub destination: Option<PathBuf>,

    /// Include requirement failures in a second table (the default)
    #[arg(long, overrides_with = "no_failures")]
    pub failures: bool,

    /// Leave the failures table out
    #[arg(long)]
    pub no_failures: bool,
}

impl FormatArgs {
    /// The failures table is rendered unless `--no-failures` won
    pub fn with_failures(&self) -> bool {
        self.failures || !self.no_failures
    }
}
