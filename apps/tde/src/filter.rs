//! Allow-list filtering over a diagnostic collection.

use crate::error::{Result, TdeError};
use crate::models::options::FilterOptions;
use crate::models::{Diagnostic, DiagnosticCollection};
use glob::{MatchOptions, Pattern};

/// Glob semantics for include patterns: case-sensitive, `*` and `?` stay
/// within one path segment, `**` spans segments.
pub const GLOB_MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Keep the diagnostics that pass every non-empty allow-list, preserving
/// input order. An empty result is valid.
pub fn filter(diagnostics: &[Diagnostic], opts: &FilterOptions) -> Result<DiagnosticCollection> {
    let patterns = compile_patterns(&opts.include_patterns)?;
    Ok(diagnostics
        .iter()
        .filter(|d| {
            opts.diagnostic_ids.is_empty() || opts.diagnostic_ids.iter().any(|id| id == d.rule_id())
        })
        .filter(|d| opts.severities.is_empty() || opts.severities.contains(&d.severity()))
        .filter(|d| patterns.is_empty() || matches_any(&patterns, d.file_path()))
        .cloned()
        .collect())
}

/// Compile include globs, rejecting malformed ones up front.
pub fn compile_patterns(raw: &[String]) -> Result<Vec<Pattern>> {
    raw.iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| TdeError::InvalidPattern {
                pattern: p.clone(),
                reason: e.msg.to_string(),
            })
        })
        .collect()
}

fn matches_any(patterns: &[Pattern], path: &str) -> bool {
    let normalized = path.replace('\\', "/");
    patterns
        .iter()
        .any(|p| p.matches_with(&normalized, GLOB_MATCH_OPTIONS))
}
