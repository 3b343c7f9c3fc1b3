//! Encode a diagnostic collection into the compact notation.
//!
//! Shapes, by `(group_by, summary)`:
//! - error/detail: per rule, a key line, an inline `{key,message,count}`
//!   record and a `{location,severity}` block.
//! - file/detail: per file, a key line, an inline `{key,count}` record and a
//!   `{line,column,rule,message,severity}` block.
//! - error/summary: one `{key,message,count}` block, a row per rule.
//! - file/summary: one `{key,count}` block, a row per file.
//!
//! Group blocks are separated by a blank line. Output is deterministic.

pub mod group;
pub mod toon;

use crate::models::options::{EncodeOptions, GroupBy};
use crate::models::Diagnostic;
use group::{group_by, Group};

pub const RULE_SUMMARY_FIELDS: &[&str] = &["key", "message", "count"];
pub const FILE_SUMMARY_FIELDS: &[&str] = &["key", "count"];
pub const RULE_MEMBER_FIELDS: &[&str] = &["location", "severity"];
pub const FILE_MEMBER_FIELDS: &[&str] = &["line", "column", "rule", "message", "severity"];

/// Encode `diagnostics` with the given grouping and summary mode.
pub fn encode(diagnostics: &[Diagnostic], opts: &EncodeOptions) -> String {
    let groups = group_by(diagnostics, opts.group_by);
    let lines = match (opts.group_by, opts.summary) {
        (GroupBy::Error, true) => rule_summary(&groups),
        (GroupBy::File, true) => file_summary(&groups),
        (GroupBy::Error, false) => detail(
            &groups,
            RULE_SUMMARY_FIELDS,
            RULE_MEMBER_FIELDS,
            rule_meta,
            rule_member,
        ),
        (GroupBy::File, false) => detail(
            &groups,
            FILE_SUMMARY_FIELDS,
            FILE_MEMBER_FIELDS,
            file_meta,
            file_member,
        ),
    };
    lines.join("\n")
}

fn rule_summary(groups: &[Group<'_>]) -> Vec<String> {
    let rows: Vec<Vec<String>> = groups.iter().map(rule_meta).collect();
    toon::block(RULE_SUMMARY_FIELDS, &rows)
}

fn file_summary(groups: &[Group<'_>]) -> Vec<String> {
    let rows: Vec<Vec<String>> = groups.iter().map(file_meta).collect();
    toon::block(FILE_SUMMARY_FIELDS, &rows)
}

fn detail(
    groups: &[Group<'_>],
    meta_fields: &[&str],
    member_fields: &[&str],
    meta: fn(&Group<'_>) -> Vec<String>,
    member: fn(&Diagnostic) -> Vec<String>,
) -> Vec<String> {
    if groups.is_empty() {
        return vec![toon::header(0, member_fields)];
    }
    let mut lines = Vec::new();
    for (i, g) in groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("{}:", toon::encode_value(g.key)));
        lines.push(toon::inline_record(meta_fields, &meta(g)));
        let rows: Vec<Vec<String>> = g.members.iter().map(|d| member(d)).collect();
        lines.extend(toon::block(member_fields, &rows));
    }
    lines
}

fn rule_meta(g: &Group<'_>) -> Vec<String> {
    vec![g.key.to_string(), g.message.to_string(), g.count().to_string()]
}

fn file_meta(g: &Group<'_>) -> Vec<String> {
    vec![g.key.to_string(), g.count().to_string()]
}

fn rule_member(d: &Diagnostic) -> Vec<String> {
    vec![d.location(), d.severity().as_str().to_string()]
}

fn file_member(d: &Diagnostic) -> Vec<String> {
    vec![
        d.line().to_string(),
        d.column().to_string(),
        d.rule_id().to_string(),
        d.message().to_string(),
        d.severity().as_str().to_string(),
    ]
}
