use serde_json::Value;
use std::io;

use super::{format_value, split_rows};

/// Write output as CSV to stdout.
///
/// Results with a nested row set (schedule rows, program lines, borrowers)
/// are written as that table; anything else as two-column field/value.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value.as_object().and_then(|m| m.get("result")) {
        Some(Value::Object(result)) => {
            let (scalars, row_sets) = split_rows(result);
            if let Some((_, rows)) = row_sets.first() {
                write_rows(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in scalars {
                    let _ = wtr.write_record([key, &format_value(val)]);
                }
            }
        }
        Some(other) => {
            let _ = wtr.write_record([&format_value(other)]);
        }
        None => {
            if let Value::Object(map) = value {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_value(val)]);
                }
            } else {
                let _ = wtr.write_record([&format_value(value)]);
            }
        }
    }

    let _ = wtr.flush();
}

fn write_rows(wtr: &mut csv::Writer<io::StdoutLock<'_>>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    let _ = wtr.write_record(&headers);

    for row in rows.iter().filter_map(Value::as_object) {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(*h).map(format_value).unwrap_or_default())
            .collect();
        let _ = wtr.write_record(&cells);
    }
}
