//! Leaf dissection: break a value into minimal single-leaf fragments
//! that merge back into the original.
//!
//! `{"x": {"y": 3, "z": 4}}` dissects into `{"x": {"y": 3}}` and
//! `{"x": {"z": 4}}`; `[1, 2]` into `[1]` and `[null, 2]`.

use crate::error::RollError;
use crate::table::flatten::scalar_cell;
use serde_json::{Map, Value};

/// One fragment per leaf path, each re-nested under its original keys.
pub fn dissect_object(object: &Map<String, Value>) -> Vec<Value> {
    let mut fragments = Vec::new();
    for (key, value) in object {
        match value {
            Value::Object(inner) => {
                for fragment in dissect_object(inner) {
                    fragments.push(build_path(&[key], fragment));
                }
            }
            Value::Array(items) => {
                for fragment in dissect_array(items) {
                    fragments.push(build_path(&[key], fragment));
                }
            }
            _ => {
                let mut leaf = Map::new();
                leaf.insert(key.clone(), value.clone());
                fragments.push(Value::Object(leaf));
            }
        }
    }
    fragments
}

/// One fragment per leaf, each left-padded with nulls so the leaf sits
/// at its original index.
pub fn dissect_array(items: &[Value]) -> Vec<Value> {
    let mut fragments = Vec::new();
    for (index, value) in items.iter().enumerate() {
        match value {
            Value::Object(inner) => {
                for fragment in dissect_object(inner) {
                    fragments.push(indexed_array_for(fragment, index));
                }
            }
            Value::Array(inner) => {
                for fragment in dissect_array(inner) {
                    fragments.push(indexed_array_for(fragment, index));
                }
            }
            _ => fragments.push(indexed_array_for(value.clone(), index)),
        }
    }
    fragments
}

/// Nest `value` under the key list, outermost key first:
/// `["a", "b"]` with `1` becomes `{"a": {"b": 1}}`.
pub fn build_path<S: AsRef<str>>(keys: &[S], value: Value) -> Value {
    let mut out = value;
    for key in keys.iter().rev() {
        let mut wrapper = Map::new();
        wrapper.insert(key.as_ref().to_string(), out);
        out = Value::Object(wrapper);
    }
    out
}

/// `[null, null, value]` for index 2: padding preserves the position
/// through a positional merge.
pub fn indexed_array_for(value: Value, index: usize) -> Value {
    let mut items = vec![Value::Null; index];
    items.push(value);
    Value::Array(items)
}

/// Leaf paths and stringified leaf values in traversal order, using
/// the same `.key` / `[i]` path grammar as the flattener. Null leaves
/// are dropped. Feeds the properties renderer.
pub fn dissect_properties(value: &Value) -> Result<Vec<(String, String)>, RollError> {
    match value {
        Value::Object(object) => Ok(properties_of_object(object)),
        Value::Array(items) => Ok(properties_of_array(items)),
        other => Err(RollError::StructuralType {
            operation: "properties dissection",
            expected: "an object or array",
            found: kind_name(other),
        }),
    }
}

fn properties_of_object(object: &Map<String, Value>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (key, value) in object {
        match value {
            Value::Object(inner) => {
                for (path, text) in properties_of_object(inner) {
                    out.push((format!("{key}.{path}"), text));
                }
            }
            Value::Array(items) => {
                for (path, text) in properties_of_array(items) {
                    out.push((format!("{key}{path}"), text));
                }
            }
            Value::Null => {}
            scalar => out.push((key.clone(), scalar_cell(scalar))),
        }
    }
    out
}

fn properties_of_array(items: &[Value]) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (index, value) in items.iter().enumerate() {
        match value {
            Value::Object(inner) => {
                for (path, text) in properties_of_object(inner) {
                    out.push((format!("[{index}].{path}"), text));
                }
            }
            Value::Array(inner) => {
                for (path, text) in properties_of_array(inner) {
                    out.push((format!("[{index}]{path}"), text));
                }
            }
            Value::Null => {}
            scalar => out.push((format!("[{index}]"), scalar_cell(scalar))),
        }
    }
    out
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::merge::merge;
    use serde_json::json;

    fn rebuild(fragments: &[Value]) -> Value {
        fragments
            .iter()
            .fold(json!({}), |acc, fragment| merge(&acc, fragment))
    }

    #[test]
    fn object_dissects_into_one_fragment_per_leaf() {
        let value = json!({"x": {"y": 3, "z": 4}});
        let fragments = dissect_object(value.as_object().unwrap());

        assert_eq!(fragments, vec![json!({"x": {"y": 3}}), json!({"x": {"z": 4}})]);
    }

    #[test]
    fn array_fragments_preserve_their_index_with_null_padding() {
        let fragments = dissect_array(json!([1, 2, 3]).as_array().unwrap());

        assert_eq!(
            fragments,
            vec![json!([1]), json!([null, 2]), json!([null, null, 3])]
        );
    }

    #[test]
    fn dissect_then_merge_reconstructs_the_original() {
        let original = json!({
            "name": "bob",
            "addr": {"city": "ny", "geo": [40, -74]},
            "tags": ["a", "b"]
        });
        let fragments = dissect_object(original.as_object().unwrap());

        assert_eq!(fragments.len(), 6);
        assert_eq!(rebuild(&fragments), original);
    }

    #[test]
    fn deeply_nested_arrays_round_trip() {
        let original = json!({"grid": [[1, 2], [3]]});
        let fragments = dissect_object(original.as_object().unwrap());

        assert_eq!(fragments.len(), 3);
        assert_eq!(rebuild(&fragments), original);
    }

    #[test]
    fn build_path_nests_outermost_first() {
        assert_eq!(
            build_path(&["a", "b", "c"], json!(100)),
            json!({"a": {"b": {"c": 100}}})
        );
    }

    #[test]
    fn properties_follow_the_flattener_path_grammar() {
        let value = json!({"a": {"b": 1, "c": [2, 3]}});
        let entries = dissect_properties(&value).unwrap();

        assert_eq!(
            entries,
            vec![
                ("a.b".to_string(), "1".to_string()),
                ("a.c[0]".to_string(), "2".to_string()),
                ("a.c[1]".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn properties_of_an_array_root_use_index_paths() {
        let value = json!([{"a": 1}, "x", [true]]);
        let entries = dissect_properties(&value).unwrap();

        assert_eq!(
            entries,
            vec![
                ("[0].a".to_string(), "1".to_string()),
                ("[1]".to_string(), "x".to_string()),
                ("[2][0]".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn properties_of_a_scalar_root_is_a_structural_error() {
        let err = dissect_properties(&json!(42)).unwrap_err();
        assert!(matches!(err, RollError::StructuralType { .. }));
    }
}
