//! CLI argument parsing via `clap`.

use crate::config::{CliOverrides, OutputMode};
use crate::models::options::{AnalysisKind, GroupBy};
use crate::models::Severity;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tde",
    version,
    about = "Technical debt extractor for .NET projects",
    long_about = "tde runs `dotnet format` in verify mode and prints its diagnostics in a compact, grouped notation.\n\nConfiguration precedence: CLI > tde.toml > defaults.\nLogs go to stderr and are appended to {tempdir}/tde.log (rotated at 5 MB, 3 backups).\nSet TDE_LOG_LEVEL (DEBUG, INFO, WARNING, ERROR or a filter like tde=debug) to control verbosity.",
    after_help = "Examples:\n  tde style ./src/MyApp\n  tde style ./src/MyApp --summary\n  tde analyzers . --group-by file --diagnostics CA1031 --diagnostics CA2007\n  tde style . --severity error --include 'src/**/*.cs'",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands.
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current tde version.")]
    Version,
    /// Run code style analyzers
    #[command(
        about = "Run code style analyzers and report diagnostics",
        after_help = "Examples:\n  tde style ./src/MyApp\n  tde style . --diagnostics IDE0055 --diagnostics IDE1006"
    )]
    Style(RunArgs),
    /// Run third-party analyzers
    #[command(
        about = "Run 3rd party analyzers and report diagnostics",
        after_help = "Examples:\n  tde analyzers ./src/MyApp --summary\n  tde analyzers . --group-by file"
    )]
    Analyzers(RunArgs),
}

impl Commands {
    /// Analysis kind and arguments for the run subcommands.
    pub fn run_args(&self) -> Option<(AnalysisKind, &RunArgs)> {
        match self {
            Commands::Version => None,
            Commands::Style(a) => Some((AnalysisKind::Style, a)),
            Commands::Analyzers(a) => Some((AnalysisKind::Analyzers, a)),
        }
    }
}

#[derive(Args, Debug)]
/// Options shared by `style` and `analyzers`.
pub struct RunArgs {
    #[arg(help = "Directory containing the solution or project")]
    pub path: PathBuf,
    #[arg(long, help = "File glob to include (repeatable)")]
    pub include: Vec<String>,
    #[arg(long, value_enum, help = "Group diagnostics by rule id (error) or by file [default: error]")]
    pub group_by: Option<GroupBy>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Show only per-group counts")]
    pub summary: bool,
    #[arg(long, help = "Diagnostic id to include, e.g. IDE0055 (repeatable)")]
    pub diagnostics: Vec<String>,
    #[arg(long, value_enum, ignore_case = true, help = "Severity to include (repeatable)")]
    pub severity: Vec<Severity>,
    #[arg(long, value_enum, help = "Output mode [default: toon]")]
    pub output: Option<OutputMode>,
}

impl RunArgs {
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            group_by: self.group_by,
            summary: self.summary,
            output: self.output,
            include: self.include.clone(),
            diagnostics: self.diagnostics.clone(),
            severity: self.severity.clone(),
        }
    }
}
