//! Canonical diagnostic record and the option types shared by the pipeline.

pub mod options;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity assigned when the report omits one or spells it in a way we do
/// not recognise.
pub const DEFAULT_SEVERITY: Severity = Severity::Warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase", try_from = "String")]
/// Closed severity set reported by the analyzers. Deserializes through
/// [`Severity::parse`], so config values are case-insensitive too.
pub enum Severity {
    Error,
    #[value(alias = "warn")]
    Warning,
    Info,
    Hidden,
}

impl Severity {
    /// Parse a tool-provided severity, ignoring case. Returns `None` for
    /// spellings outside the closed set and its aliases.
    pub fn parse(raw: &str) -> Option<Severity> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "error" => Some(Severity::Error),
            "warning" | "warn" => Some(Severity::Warning),
            "info" | "information" | "suggestion" => Some(Severity::Info),
            "hidden" | "none" | "silent" => Some(Severity::Hidden),
            _ => None,
        }
    }

    /// Like [`Severity::parse`], falling back to `default` for absent or
    /// unknown values.
    pub fn parse_or(raw: Option<&str>, default: Severity) -> Severity {
        raw.and_then(Severity::parse).unwrap_or(default)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hidden => "hidden",
        }
    }

    /// Ordering from least to most severe: hidden < info < warning < error.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Hidden => 0,
            Severity::Info => 1,
            Severity::Warning => 2,
            Severity::Error => 3,
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, String> {
        Severity::parse(&raw).ok_or_else(|| {
            format!("unknown severity `{}` (expected error, warning, info or hidden)", raw)
        })
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// A single normalized finding. Immutable once built.
pub struct Diagnostic {
    rule_id: String,
    message: String,
    file_path: String,
    line: u32,
    column: u32,
    severity: Severity,
}

impl Diagnostic {
    /// Build a diagnostic. Returns `None` when `rule_id` is blank: such
    /// entries are dropped rather than given a made-up identifier.
    pub fn new(
        rule_id: impl Into<String>,
        message: impl Into<String>,
        file_path: impl Into<String>,
        line: u32,
        column: u32,
        severity: Severity,
    ) -> Option<Diagnostic> {
        let rule_id: String = rule_id.into();
        let rule_id = rule_id.trim().to_string();
        if rule_id.is_empty() {
            return None;
        }
        Some(Diagnostic {
            rule_id,
            message: message.into(),
            file_path: file_path.into(),
            line,
            column,
            severity,
        })
    }

    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// `path:line,column`, the compact location used by the encoder.
    pub fn location(&self) -> String {
        format!("{}:{},{}", self.file_path, self.line, self.column)
    }
}

/// Diagnostics in the order the tool reported them.
pub type DiagnosticCollection = Vec<Diagnostic>;
