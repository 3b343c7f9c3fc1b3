//! End-to-end extraction: run the tool, normalize, filter, encode.
//!
//! This is the in-process entry point; the binary is a thin wrapper.

use crate::encode::encode;
use crate::error::Result;
use crate::filter::{compile_patterns, filter};
use crate::models::options::{AnalysisKind, EncodeOptions, FilterOptions};
use crate::models::{DiagnosticCollection, Severity, DEFAULT_SEVERITY};
use crate::parser::{parse_report, NormalizeOptions};
use crate::runner::{self, ToolCommand};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Non-failing results of a run.
pub enum Outcome {
    Clean,
    DiagnosticsPresent,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Clean => 0,
            Outcome::DiagnosticsPresent => runner::VIOLATIONS_EXIT_CODE,
        }
    }
}

#[derive(Debug, Clone)]
/// Everything one invocation produces.
pub struct Extraction {
    pub diagnostics: DiagnosticCollection,
    pub text: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
/// Full request for one invocation.
pub struct Request<'a> {
    pub target: &'a Path,
    pub kind: AnalysisKind,
    pub filters: FilterOptions,
    pub encoding: EncodeOptions,
    pub tool: ToolCommand,
    pub default_severity: Severity,
}

impl<'a> Request<'a> {
    pub fn new(target: &'a Path, kind: AnalysisKind) -> Self {
        Request {
            target,
            kind,
            filters: FilterOptions::default(),
            encoding: EncodeOptions::default(),
            tool: ToolCommand::default(),
            default_severity: DEFAULT_SEVERITY,
        }
    }
}

/// Run one extraction. Whole-run failures propagate; entries without a
/// rule id are dropped by the parser.
pub fn extract(req: &Request<'_>) -> Result<Extraction> {
    // Reject bad globs before paying for a tool run.
    compile_patterns(&req.filters.include_patterns)?;
    let base = runner::validate_target(req.target)?;
    let run = runner::run(&base, req.kind, &req.filters, &req.tool)?;
    let normalize = NormalizeOptions {
        base_path: Some(base),
        default_severity: req.default_severity,
    };
    let all = parse_report(&run.report, &normalize)?;
    if run.violations_found() && all.is_empty() {
        warn!(
            "{} reported violations but its report held no usable diagnostics",
            req.tool.program
        );
    }
    finish(all, &req.filters, &req.encoding)
}

/// The in-memory half of the pipeline: filter then encode.
pub fn finish(
    all: DiagnosticCollection,
    filters: &FilterOptions,
    encoding: &EncodeOptions,
) -> Result<Extraction> {
    let total = all.len();
    let diagnostics = if filters.is_empty() {
        all
    } else {
        filter(&all, filters)?
    };
    info!(total, kept = diagnostics.len(), "filtered diagnostics");
    let text = encode(&diagnostics, encoding);
    let outcome = if diagnostics.is_empty() {
        Outcome::Clean
    } else {
        Outcome::DiagnosticsPresent
    };
    Ok(Extraction {
        diagnostics,
        text,
        outcome,
    })
}
