//! Recursive flattening of a JSON value into path/cell pairs.

use crate::table::types::{ColumnRegistry, RollConfig};
use serde_json::Value;
use std::collections::HashMap;

/// Canonical cell text for a scalar: strings verbatim, numbers by
/// their preserved source text, booleans as `true`/`false`.
pub fn scalar_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Flatten one value into a mapping from dotted/indexed path to cell
/// text, registering every produced path in first-seen order.
///
/// Object keys extend the path with `.key`, array indices with `[i]`.
/// Null leaves produce no entry, and a bare scalar with no base path
/// has nowhere to land so it is dropped as well.
pub fn flatten_value(
    value: &Value,
    base: Option<&str>,
    config: &RollConfig,
    registry: &mut ColumnRegistry,
) -> HashMap<String, String> {
    let mut out = HashMap::new();
    flatten_into(value, base, 0, config, registry, &mut out);
    out
}

fn flatten_into(
    value: &Value,
    base: Option<&str>,
    depth: usize,
    config: &RollConfig,
    registry: &mut ColumnRegistry,
    out: &mut HashMap<String, String>,
) {
    if depth > config.max_depth {
        if config.verbose {
            eprintln!(
                "rollmill: flatten stopped at depth {depth} under `{}`",
                base.unwrap_or("")
            );
        }
        return;
    }
    match value {
        Value::Object(object) => {
            for (key, child) in object {
                let path = match base {
                    Some(prefix) => format!("{prefix}.{key}"),
                    None => key.clone(),
                };
                flatten_into(child, Some(&path), depth + 1, config, registry, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let path = match base {
                    Some(prefix) => format!("{prefix}[{index}]"),
                    None => format!("[{index}]"),
                };
                flatten_into(child, Some(&path), depth + 1, config, registry, out);
            }
        }
        Value::Null => {}
        scalar => {
            let Some(base) = base else { return };
            let text = scalar_cell(scalar);
            if text.starts_with('?') && text.contains('=') {
                explode_query_string(base, &text, registry, out);
            } else {
                registry.register(base);
                out.insert(base.to_string(), text);
            }
        }
    }
}

/// Explode a query-string-shaped cell (`?a=1&b=2`) into one column per
/// URL-decoded pair. Pairs without `=` are skipped.
fn explode_query_string(
    base: &str,
    text: &str,
    registry: &mut ColumnRegistry,
    out: &mut HashMap<String, String>,
) {
    for pair in text[1..].split('&') {
        let Some((raw_key, raw_value)) = pair.split_once('=') else {
            continue;
        };
        let key = decode_component(raw_key);
        if key.is_empty() {
            continue;
        }
        let path = format!("{base}.{key}");
        registry.register(&path);
        out.insert(path, decode_component(raw_value));
    }
}

fn decode_component(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
