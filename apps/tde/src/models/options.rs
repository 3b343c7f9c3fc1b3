//! Option types consumed by the runner, filter, and encoder.

use super::Severity;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which `dotnet format` sub-command to run.
pub enum AnalysisKind {
    Style,
    Analyzers,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::Style => "style",
            AnalysisKind::Analyzers => "analyzers",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
/// Grouping key used by the encoder.
pub enum GroupBy {
    /// Group by rule identifier
    #[default]
    Error,
    /// Group by source file
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Allow-lists applied to a collection. An empty list disables that filter.
pub struct FilterOptions {
    pub include_patterns: Vec<String>,
    pub diagnostic_ids: Vec<String>,
    pub severities: Vec<Severity>,
}

impl FilterOptions {
    pub fn is_empty(&self) -> bool {
        self.include_patterns.is_empty()
            && self.diagnostic_ids.is_empty()
            && self.severities.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Encoder configuration: grouping key plus summary (counts only) mode.
pub struct EncodeOptions {
    pub group_by: GroupBy,
    pub summary: bool,
}
