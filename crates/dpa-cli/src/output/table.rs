use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{format_value, split_rows};

/// Format output as tables: one Field/Value table for the scalar results,
/// then one table per nested row set (program lines, schedule rows, borrowers).
pub fn print_table(value: &Value) {
    let Some(envelope) = value.as_object() else {
        println!("{}", value);
        return;
    };

    match envelope.get("result") {
        Some(Value::Object(result)) => {
            let (scalars, row_sets) = split_rows(result);
            print_fields(&scalars);
            for (name, rows) in row_sets {
                println!("\n{}:", name);
                print_rows(rows);
            }
        }
        _ => {
            let fields: Vec<(&str, &Value)> =
                envelope.iter().map(|(k, v)| (k.as_str(), v)).collect();
            print_fields(&fields);
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields(fields: &[(&str, &Value)]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.to_string(), format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for row in rows.iter().filter_map(Value::as_object) {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(format_value).unwrap_or_default())
            .collect();
        builder.push_record(cells);
    }

    println!("{}", Table::from(builder));
}
