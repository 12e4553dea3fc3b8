//! JSON output for comparison results.
//!
//! Serializes DiffResult to JSON for scripting and piping.

use crate::store::diff::DiffResult;

pub fn render(result: &DiffResult) -> String {
    serde_json::to_string_pretty(result).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}
