//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_qm_diagnostics::QmError;
use serde_json::Value;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    Table,
}

impl OutputFormat {
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "table" => Self::Table,
            _ => Self::JsonPretty,
        }
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display. Quality-measure errors render as diagnostics
/// with their code and help text.
pub fn format_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<QmError>() {
        Some(qm) => {
            let rendered = qm.to_diagnostic().render_colored();
            let context: Vec<String> = error
                .chain()
                .take_while(|cause| cause.downcast_ref::<QmError>().is_none())
                .map(ToString::to_string)
                .collect();
            if context.is_empty() {
                rendered
            } else {
                format!("{} {}\n{}", "Error:".red().bold(), context.join(": "), rendered)
            }
        }
        None => format!("{} {:#}", "Error:".red().bold(), error),
    }
}

pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}

pub fn format_json(value: &Value, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

#[derive(Tabled)]
struct KeyValue {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Format a value as a table when it has a tabular shape
pub fn format_as_table(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) if items.is_empty() => Some("(empty list)".to_string()),
        Value::Array(items) => {
            let lines: Vec<String> = items
                .iter()
                .enumerate()
                .map(|(i, v)| format!("  {}. {}", i + 1, format_value(v)))
                .collect();
            Some(lines.join("\n"))
        }
        Value::Object(obj) => {
            let rows: Vec<KeyValue> = obj
                .iter()
                .map(|(k, v)| KeyValue {
                    key: k.clone(),
                    value: format_value(v),
                })
                .collect();
            Some(Table::new(rows).with(Style::modern()).to_string())
        }
        _ => None,
    }
}

/// One line per value; resources show as `Type/id`
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => match (
            obj.get("resourceType").and_then(Value::as_str),
            obj.get("id").and_then(Value::as_str),
        ) {
            (Some(kind), Some(id)) => format!("{}/{}", kind, id),
            (Some(kind), None) => kind.to_string(),
            _ => format!("{{}} with {} fields", obj.len()),
        },
    }
}

/// Render `value` in `format`; `table` uses `table` when given, otherwise
/// the generic key/value layout
pub fn render(value: &Value, format: OutputFormat, table: Option<String>) -> Result<String> {
    match format {
        OutputFormat::Json => format_json(value, false),
        OutputFormat::JsonPretty => format_json(value, true),
        OutputFormat::Table => match table.or_else(|| format_as_table(value)) {
            Some(table) => Ok(table),
            None => format_json(value, true),
        },
    }
}

/// Print output in the specified format
pub fn print_output(
    value: &Value,
    format: OutputFormat,
    table: Option<String>,
    output_file: Option<&Path>,
) -> Result<()> {
    let content = render(value, format, table)?;
    write_output(&content, output_file)
}
