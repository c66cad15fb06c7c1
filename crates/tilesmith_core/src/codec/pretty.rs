//! Line-oriented JSON printer
//!
//! Objects put each member on its own line and arrays holding objects or
//! arrays put each element on its own line. Arrays of scalars are written
//! compactly on a single line, so a tile grid is one line per layer and
//! a diff of two saves shows which layers changed.

use std::fmt::Write;

use serde_json::Value;

const INDENT: &str = "  ";

pub fn to_pretty_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out.push('\n');
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Object(members) if !members.is_empty() => {
            out.push_str("{\n");
            for (i, (key, member)) in members.iter().enumerate() {
                indent(out, depth + 1);
                // Display on a string value quotes and escapes it
                let _ = write!(out, "{}: ", Value::from(key.as_str()));
                write_value(out, member, depth + 1);
                if i + 1 < members.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, depth);
            out.push('}');
        }
        Value::Array(items) if items.iter().any(is_container) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                indent(out, depth + 1);
                write_value(out, item, depth + 1);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, depth);
            out.push(']');
        }
        // scalars, scalar arrays, empty containers
        other => {
            let _ = write!(out, "{other}");
        }
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
