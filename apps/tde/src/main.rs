//! tde CLI binary entry point.
//! Resolves configuration, runs the pipeline, and prints the result.

use clap::Parser;
use std::process::ExitCode;
use tde::cli::{Cli, Commands};
use tde::pipeline::{extract, Request};
use tde::{config, logging, output, utils};

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(path) = logging::init() {
        tracing::debug!("logging to {}", path.display());
    }

    let Some((kind, args)) = cli.cmd.run_args() else {
        if let Commands::Version = cli.cmd {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        return ExitCode::SUCCESS;
    };

    let eff = config::resolve_effective(&args.path, &args.overrides());

    let req = Request {
        target: &args.path,
        kind,
        filters: eff.filters,
        encoding: eff.encoding,
        tool: eff.tool,
        default_severity: eff.default_severity,
    };
    match extract(&req) {
        Ok(ex) => {
            output::print_extraction(&ex, eff.output);
            exit_code(ex.outcome.exit_code())
        }
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            if let tde::TdeError::ToolLaunch { .. } = e {
                eprintln!(
                    "{} is the .NET SDK installed and on PATH? Set [tool] program in tde.toml to override.",
                    utils::note_prefix()
                );
            }
            exit_code(e.exit_code())
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
