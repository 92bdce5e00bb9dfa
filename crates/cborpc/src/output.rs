use std::io::IsTerminal;

use cborpc_rpc::Value;
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_reply(method: &str, reply: &Value, format: OutputFormat) {
    let json = to_json(reply);
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&json).unwrap_or_else(|_| "null".to_string())
            );
        }
        OutputFormat::Pretty => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json).unwrap_or_else(|_| "null".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);
            match json {
                serde_json::Value::Object(fields) => {
                    table.set_header(vec!["FIELD", "VALUE"]);
                    for (key, value) in fields {
                        table.add_row(vec![key, cell(&value)]);
                    }
                }
                other => {
                    table
                        .set_header(vec!["METHOD", "REPLY"])
                        .add_row(vec![method.to_string(), cell(&other)]);
                }
            }
            println!("{table}");
        }
    }
}

fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Lossy CBOR to JSON conversion for display.
///
/// Byte strings become lowercase hex, tags are dropped, and non-text map
/// keys are rendered with their JSON text.
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(int) => {
            let int = i128::from(*int);
            if let Ok(n) = i64::try_from(int) {
                serde_json::Value::from(n)
            } else if let Ok(n) = u64::try_from(int) {
                serde_json::Value::from(n)
            } else {
                serde_json::Value::String(int.to_string())
            }
        }
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(text) => serde_json::Value::String(text.clone()),
        Value::Bytes(bytes) => {
            serde_json::Value::String(bytes.iter().map(|b| format!("{b:02x}")).collect())
        }
        Value::Array(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::Text(text) => text.clone(),
                        other => to_json(other).to_string(),
                    };
                    (key, to_json(value))
                })
                .collect(),
        ),
        Value::Tag(_, inner) => to_json(inner),
        _ => serde_json::Value::Null,
    }
}
