//! Normalize `dotnet format` JSON reports into [`Diagnostic`] records.
//!
//! The report root is either a list of entries or an object whose values are
//! lists of entries. Entries are either documents (the tool's native shape,
//! `{ FilePath, FileChanges: [...] }`) or flat records. Both are projected
//! into one canonical record; entries without a rule id are dropped.

use crate::error::{Result, TdeError};
use crate::models::{Diagnostic, DiagnosticCollection, Severity, DEFAULT_SEVERITY};
use regex::Regex;
use serde_json::{Map, Value as Json};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

const RULE_KEYS: &[&str] = &["DiagnosticId", "ruleId", "rule", "id"];
const MESSAGE_KEYS: &[&str] = &["message", "Message"];
const FILE_KEYS: &[&str] = &["FilePath", "filePath", "file", "FileName"];
const LINE_KEYS: &[&str] = &["LineNumber", "line"];
const COLUMN_KEYS: &[&str] = &["CharNumber", "column", "col"];
const SEVERITY_KEYS: &[&str] = &["severity", "Severity"];

#[derive(Debug, Clone)]
/// Knobs for projecting raw entries.
pub struct NormalizeOptions {
    /// Strip this prefix from file paths that live under it.
    pub base_path: Option<PathBuf>,
    pub default_severity: Severity,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            base_path: None,
            default_severity: DEFAULT_SEVERITY,
        }
    }
}

/// Parse raw report bytes into a collection in report order.
pub fn parse_report(bytes: &[u8], opts: &NormalizeOptions) -> Result<DiagnosticCollection> {
    let root: Json =
        serde_json::from_slice(bytes).map_err(|e| TdeError::MalformedReport(e.to_string()))?;
    let entries = top_level_entries(&root)?;

    let mut out = DiagnosticCollection::new();
    let mut skipped = 0usize;
    for entry in entries {
        let Json::Object(obj) = entry else {
            skipped += 1;
            continue;
        };
        match obj.get("FileChanges") {
            Some(Json::Array(changes)) => {
                let doc_path = first_str(obj, FILE_KEYS);
                for change in changes {
                    match change {
                        Json::Object(c) => match project(c, doc_path, opts) {
                            Some(d) => out.push(d),
                            None => skipped += 1,
                        },
                        _ => skipped += 1,
                    }
                }
            }
            _ => match project(obj, None, opts) {
                Some(d) => out.push(d),
                None => skipped += 1,
            },
        }
    }
    if skipped > 0 {
        debug!("skipped {} entries without a rule id", skipped);
    }
    debug!("normalized {} diagnostics", out.len());
    Ok(out)
}

/// Flatten the root into one ordered list of raw entries, dispatching on
/// whether the root is a list or a keyed object.
fn top_level_entries(root: &Json) -> Result<Vec<&Json>> {
    match root {
        Json::Array(items) => Ok(items.iter().collect()),
        Json::Object(groups) => Ok(groups
            .values()
            .filter_map(|v| v.as_array())
            .flat_map(|items| items.iter())
            .collect()),
        other => Err(TdeError::MalformedReport(format!(
            "expected a list or an object at the top level, found {}",
            json_kind(other)
        ))),
    }
}

fn project(
    entry: &Map<String, Json>,
    doc_path: Option<&str>,
    opts: &NormalizeOptions,
) -> Option<Diagnostic> {
    let rule = first_str(entry, RULE_KEYS)?;
    let described = entry
        .get("FormatDescription")
        .and_then(Json::as_str)
        .map(split_format_description);

    let message = first_str(entry, MESSAGE_KEYS)
        .map(str::to_string)
        .or_else(|| described.as_ref().map(|(_, m)| m.clone()))
        .unwrap_or_default();
    let severity_raw = first_str(entry, SEVERITY_KEYS)
        .map(str::to_string)
        .or_else(|| described.and_then(|(s, _)| s));
    let severity = Severity::parse_or(severity_raw.as_deref(), opts.default_severity);

    let file = doc_path
        .or_else(|| first_str(entry, FILE_KEYS))
        .unwrap_or_default();
    let file = relativize(file, opts.base_path.as_deref());

    Diagnostic::new(
        rule,
        message,
        file,
        first_u32(entry, LINE_KEYS),
        first_u32(entry, COLUMN_KEYS),
        severity,
    )
}

/// Split `"warning IDE0055: Fix formatting"` into its severity word and the
/// message. Unrecognised shapes keep the whole text as the message.
fn split_format_description(desc: &str) -> (Option<String>, String) {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^(\w+)\s+\w+:\s*(.+)$").ok());
    match re.as_ref().and_then(|re| re.captures(desc)) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
        ),
        None => (None, desc.to_string()),
    }
}

fn relativize(file: &str, base: Option<&Path>) -> String {
    match base {
        Some(base) if !file.is_empty() => match Path::new(file).strip_prefix(base) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => file.to_string(),
        },
        _ => file.to_string(),
    }
}

fn first_str<'a>(entry: &'a Map<String, Json>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| entry.get(*k).and_then(Json::as_str))
        .find(|s| !s.trim().is_empty())
}

fn first_u32(entry: &Map<String, Json>, keys: &[&str]) -> u32 {
    keys.iter()
        .find_map(|k| entry.get(*k).and_then(Json::as_u64))
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

fn json_kind(v: &Json) -> &'static str {
    match v {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "a list",
        Json::Object(_) => "an object",
    }
}
