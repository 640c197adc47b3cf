//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};

use crate::error::CliError;

/// Parse repeated `KEY=VALUE` flags into a JSON object.
///
/// Values that parse as JSON scalars (`5`, `true`, `null`) keep that type;
/// everything else is a string.
pub fn parse_fields(fields: &[String]) -> Result<Map<String, Value>, CliError> {
    let mut map = Map::new();
    for field in fields {
        let Some((key, raw)) = field.split_once('=') else {
            return Err(CliError::Validation {
                field: "field".into(),
                reason: format!("expected KEY=VALUE, got '{field}'"),
            });
        };
        if key.is_empty() {
            return Err(CliError::Validation {
                field: "field".into(),
                reason: format!("empty key in '{field}'"),
            });
        }
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(v @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => v,
            _ => Value::String(raw.to_owned()),
        };
        map.insert(key.to_owned(), value);
    }
    Ok(map)
}

/// A stderr spinner, hidden when stderr is not a terminal or in quiet mode.
pub fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
