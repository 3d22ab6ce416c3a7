pub mod csv_out;
pub mod json;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => println!("{}", minimal_answer(value)),
    }
}

/// Split a result object into scalar fields and nested row sets
/// (`lines`, `rows`, `borrowers`).
pub(crate) fn split_rows(result: &Map<String, Value>) -> (Vec<(&str, &Value)>, Vec<(&str, &[Value])>) {
    let mut scalars = Vec::new();
    let mut row_sets = Vec::new();
    for (key, val) in result {
        match val {
            Value::Array(items) if items.iter().all(Value::is_object) && !items.is_empty() => {
                row_sets.push((key.as_str(), items.as_slice()))
            }
            _ => scalars.push((key.as_str(), val)),
        }
    }
    (scalars, row_sets)
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Fields that answer a command, most specific first.
const ANSWER_KEYS: [&str; 7] = [
    "qualifying_payment",
    "payment",
    "monthly_payment",
    "total_payment",
    "principal",
    "combined_payments",
    "total_payments",
];

/// The single value `--output minimal` prints: the first answer field
/// present in `result`, else the first scalar labelled with its key.
fn minimal_answer(value: &Value) -> String {
    let result = value.get("result").unwrap_or(value);
    let Value::Object(map) = result else {
        return format_value(result);
    };

    if let Some(answer) = ANSWER_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
    {
        return format_value(answer);
    }

    let (scalars, _) = split_rows(map);
    scalars
        .first()
        .map(|(key, val)| format!("{key}: {}", format_value(val)))
        .unwrap_or_default()
}
