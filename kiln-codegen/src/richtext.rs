//! Extraction of rich-text (`ops`/`insert`) description payloads.
//!
//! Some upstream descriptions arrive as an undecoded editor payload,
//! a JSON structure of `{"ops": [{"insert": ...}]}` blocks. This module
//! detects and flattens them into plain docstring text.

use serde_json::Value;

/// Quick check whether text looks like an undecoded rich-text payload.
pub fn looks_like_rich_text(text: &str) -> bool {
    let t = text.trim_start();
    (t.starts_with('{') || t.starts_with('[')) && t.contains("\"ops\"") && t.contains("\"insert\"")
}

/// Flatten a rich-text payload into plain text.
///
/// Returns `None` when the input is not JSON or contains no fragments.
pub fn extract_rich_text(text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    let mut fragments = Vec::new();
    collect_fragments(&value, &mut fragments);
    if fragments.is_empty() {
        return None;
    }
    Some(join_fragments(&fragments))
}

/// Walk the payload depth-first. Map keys are traversed in sorted order so
/// extraction does not depend on input key order.
fn collect_fragments(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::Array(ops)) = map.get("ops") {
                for op in ops {
                    if let Some(Value::String(s)) = op.get("insert") {
                        out.push(s.clone());
                    }
                }
                return;
            }
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                collect_fragments(&map[key.as_str()], out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_fragments(item, out);
            }
        }
        _ => {}
    }
}

/// Join fragments: a bare `*` becomes a line break; a synthetic space is
/// inserted between adjacent Latin/digit fragments, never around CJK text.
fn join_fragments(fragments: &[String]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        if fragment.trim() == "*" {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            continue;
        }
        if fragment.is_empty() {
            continue;
        }
        if let (Some(prev), Some(next)) = (out.chars().last(), fragment.chars().next()) {
            if prev != '\n' && is_latin(prev) && is_latin(next) {
                out.push(' ');
            }
        }
        out.push_str(fragment);
    }
    out.trim_end().to_string()
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphanumeric()
}
