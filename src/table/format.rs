//! Header and cell text for the record table

use crate::record::Record;
use serde_json::Value;

/// Keys never shown as columns
pub const HIDDEN_COLUMNS: [&str; 3] = ["id", "userId", "createdAt"];

/// Columns for a table whose first row is `first`, in that row's key order
pub fn header_columns(first: &Record) -> Vec<String> {
    first
        .keys()
        .filter(|key| !HIDDEN_COLUMNS.contains(&key.as_str()))
        .cloned()
        .collect()
}

/// `street_address` → `Street Address`
pub fn format_header_name(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Display text for one cell
///
/// Missing, null and empty values show `placeholder`. Scalars longer than
/// `max_len` characters are cut and get a trailing `...`.
pub fn format_cell(value: Option<&Value>, max_len: usize, placeholder: &str) -> String {
    match value {
        None | Some(Value::Null) => placeholder.to_string(),
        Some(Value::String(s)) if s.is_empty() => placeholder.to_string(),
        Some(Value::Array(items)) => {
            let joined = items.iter().map(scalar_text).collect::<Vec<_>>().join(", ");
            if joined.is_empty() {
                placeholder.to_string()
            } else {
                joined
            }
        }
        Some(obj @ Value::Object(_)) => obj.to_string(),
        Some(other) => truncate(&scalar_text(other), max_len),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
