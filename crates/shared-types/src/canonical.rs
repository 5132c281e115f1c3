//! # Canonical Payload Serialization
//!
//! Produces the byte form the MAC is computed over. Devices in the field
//! serialize with sorted keys, compact separators and ASCII-only output, so
//! this writer reproduces exactly that form:
//!
//! - object keys sorted by code point, at every nesting level
//! - `,` and `:` separators, no whitespace
//! - strings escape `"` and `\`, use `\b \f \n \r \t` short forms, and emit
//!   every other character outside `U+0020..=U+007E` as lowercase `\uXXXX`
//!   (UTF-16 surrogate pairs above the BMP)
//! - numbers are written in the textual form they were parsed from

use serde_json::Value;
use std::fmt::Write;

/// Serializes `value` into its canonical JSON text.
///
/// Structurally equal values always produce identical output, regardless
/// of the order keys were inserted in.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            // Byte order of UTF-8 equals code point order.
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_string(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            ' '..='~' => out.push(ch),
            _ => {
                let mut units = [0u16; 2];
                for unit in ch.encode_utf16(&mut units) {
                    // Writing to a String cannot fail.
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
        }
    }
    out.push('"');
}
