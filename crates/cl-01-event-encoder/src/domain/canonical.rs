//! Canonical JSON serialization.
//!
//! Output matches a sorted-keys, compact-separator, ASCII-only JSON dump:
//! object keys are ordered lexicographically at every depth regardless of
//! how the `serde_json::Map` was built, and every non-ASCII character is
//! written as a lowercase `\uXXXX` escape (surrogate pairs above the BMP).

use serde_json::Value;
use sha3::{Digest, Keccak256};
use shared_types::Hash;
use std::fmt::Write as _;

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(bytes: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Canonical byte encoding of a JSON value.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    let mut out = String::new();
    write_value(&mut out, value);
    out.into_bytes()
}

/// Keccak-256 of the canonical encoding of a JSON value.
pub fn canonical_hash(value: &Value) -> Hash {
    keccak256(&canonical_bytes(value))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
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
            c if (c as u32) < 0x20 || (c as u32) > 0x7e => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // Writing to a String cannot fail.
                    let _ = write!(out, "\\u{:04x}", unit);
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keccak_empty_input() {
        assert_eq!(
            hex::encode(keccak256(b"")),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_keys_sorted_at_every_depth() {
        let value = json!({"b": 1, "a": {"z": true, "m": null}, "c": [{"y": 1, "x": 2}]});
        assert_eq!(
            String::from_utf8(canonical_bytes(&value)).unwrap(),
            r#"{"a":{"m":null,"z":true},"b":1,"c":[{"x":2,"y":1}]}"#
        );
    }

    #[test]
    fn test_string_escaping_is_ascii_only() {
        let value = json!({"k": "line\n\"q\" café 🚀\u{7f}"});
        assert_eq!(
            String::from_utf8(canonical_bytes(&value)).unwrap(),
            r#"{"k":"line\n\"q\" caf\u00e9 \ud83d\ude80\u007f"}"#
        );
    }

    #[test]
    fn test_numbers() {
        let value = json!([0, -12, 1717171717u64, 0.95]);
        assert_eq!(
            String::from_utf8(canonical_bytes(&value)).unwrap(),
            "[0,-12,1717171717,0.95]"
        );
    }
}
