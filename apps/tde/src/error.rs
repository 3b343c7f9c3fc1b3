//! Error taxonomy for whole-run failures.
//!
//! Per-entry problems in a report (e.g. a missing rule id) are not errors:
//! the parser drops those entries and keeps going.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TdeError {
    #[error("target is not a directory: {}", .0.display())]
    InvalidTarget(PathBuf),

    #[error("failed to launch `{program}`: {source}")]
    ToolLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", status_text(.code))]
    ExternalTool {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("report is not valid JSON: {0}")]
    MalformedReport(String),

    #[error("invalid include pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn status_text(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl TdeError {
    /// Process exit code the binary uses for this failure kind. 0 and 2 are
    /// reserved for the clean / diagnostics-present outcomes.
    pub fn exit_code(&self) -> i32 {
        match self {
            TdeError::InvalidTarget(_) => 3,
            TdeError::ToolLaunch { .. } | TdeError::ExternalTool { .. } => 4,
            TdeError::MalformedReport(_) => 5,
            TdeError::InvalidPattern { .. } => 6,
            TdeError::Io(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, TdeError>;
