//! Output rendering for extraction results.
//!
//! Supports `toon` (default) and `json` outputs. The JSON form includes the
//! filtered records and a top-level summary.

use crate::config::OutputMode;
use crate::models::Diagnostic;
use crate::pipeline::Extraction;
use serde_json::json;
use serde_json::Map;
use serde_json::Value as JsonVal;

/// Render an extraction in the requested mode.
pub fn render(ex: &Extraction, output: OutputMode) -> String {
    match output {
        OutputMode::Toon => ex.text.clone(),
        OutputMode::Json => serde_json::to_string_pretty(&compose_json(&ex.diagnostics))
            .unwrap_or_else(|_| "{}".to_string()),
    }
}

/// Print an extraction to stdout.
pub fn print_extraction(ex: &Extraction, output: OutputMode) {
    println!("{}", render(ex, output));
}

/// Compose the JSON document (pure) for testing/snapshot purposes.
/// `byRule` keeps first-encounter order.
pub fn compose_json(diagnostics: &[Diagnostic]) -> JsonVal {
    let mut by_rule: Map<String, JsonVal> = Map::new();
    for d in diagnostics {
        let n = by_rule
            .get(d.rule_id())
            .and_then(JsonVal::as_u64)
            .unwrap_or(0);
        by_rule.insert(d.rule_id().to_string(), json!(n + 1));
    }
    json!({
        "diagnostics": diagnostics,
        "summary": {
            "total": diagnostics.len(),
            "byRule": by_rule,
        }
    })
}
