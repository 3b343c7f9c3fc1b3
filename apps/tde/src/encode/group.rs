//! Insertion-ordered grouping of diagnostics by rule id or file path.

use crate::models::options::GroupBy;
use crate::models::Diagnostic;
use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Diagnostics sharing a key. `message` is the first member's message.
pub struct Group<'a> {
    pub key: &'a str,
    pub message: &'a str,
    pub members: Vec<&'a Diagnostic>,
}

impl Group<'_> {
    pub fn count(&self) -> usize {
        self.members.len()
    }
}

fn key_of(d: &Diagnostic, by: GroupBy) -> &str {
    match by {
        GroupBy::Error => d.rule_id(),
        GroupBy::File => d.file_path(),
    }
}

/// Partition `diagnostics` by `by`. Groups appear in first-encounter order
/// and members keep input order.
pub fn group_by<'a>(diagnostics: &'a [Diagnostic], by: GroupBy) -> Vec<Group<'a>> {
    let mut groups: IndexMap<&'a str, Group<'a>> = IndexMap::new();
    for d in diagnostics {
        let key = key_of(d, by);
        groups
            .entry(key)
            .or_insert_with(|| Group {
                key,
                message: d.message(),
                members: Vec::new(),
            })
            .members
            .push(d);
    }
    groups.into_values().collect()
}
