//! Terminal output for CLI commands.

use serde::Serialize;
use serde_json::Value;
use tabled::{Table, Tabled};

/// How command results are written to stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("\"<unserializable: {e}>\""))
}

/// Print catalog rows; `empty` is shown instead of an empty table.
pub fn rows<T: Serialize + Tabled>(items: &[T], empty: &str, format: OutputFormat) {
    match format {
        OutputFormat::Table if items.is_empty() => println!("{empty}"),
        OutputFormat::Table => println!("{}", Table::new(items)),
        OutputFormat::Json => println!("{}", to_json(items)),
    }
}

/// Print a nested document as `section.key  value` lines, or as JSON.
pub fn document<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", to_json(item)),
        OutputFormat::Table => {
            let mut lines = Vec::new();
            flatten("", &serde_json::to_value(item).unwrap_or(Value::Null), &mut lines);
            let width = lines.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
            for (key, value) in lines {
                println!("{key:<width$}  {value}");
            }
        }
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

/// Report a completed change
pub fn success(msg: &str) {
    println!("✓ {msg}");
}

/// Report something that was skipped
pub fn warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Report a failure on stderr
pub fn error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print one labelled detail line under a status message
pub fn field(label: &str, value: &str) {
    println!("  {:<10} {value}", format!("{label}:"));
}
