//! Structural merge, diff, projection and matching over JSON values.

use serde_json::{Map, Value};

/// Structural union of two values. Matching Object or Array pairs
/// merge recursively; for anything else `b` wins, except that an
/// explicit null loses to a non-null value from the other side.
pub fn merge(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => Value::Object(merge_objects(a, b)),
        (Value::Array(a), Value::Array(b)) => Value::Array(merge_arrays(a, b)),
        (kept, Value::Null) if !kept.is_null() => kept.clone(),
        (_, winner) => winner.clone(),
    }
}

/// Merge `b`'s fields over `a`'s. Keys present on only one side carry
/// through unchanged; `a`'s key positions are kept, `b`'s new keys
/// append in their own order.
pub fn merge_objects(a: &Map<String, Value>, b: &Map<String, Value>) -> Map<String, Value> {
    let mut out = a.clone();
    for (key, b_value) in b {
        let merged = match out.get(key) {
            Some(a_value) => merge(a_value, b_value),
            None => b_value.clone(),
        };
        out.insert(key.clone(), merged);
    }
    out
}

/// Positional merge over `max(len)` slots: container pairs at the same
/// index merge recursively, otherwise `b`'s element wins with `a`'s as
/// the fallback for absent or null slots.
pub fn merge_arrays(a: &[Value], b: &[Value]) -> Vec<Value> {
    let len = a.len().max(b.len());
    let mut out = Vec::with_capacity(len);
    for index in 0..len {
        let merged = match (a.get(index), b.get(index)) {
            (Some(a_value), Some(b_value)) => merge(a_value, b_value),
            (Some(a_value), None) => a_value.clone(),
            (None, Some(b_value)) => b_value.clone(),
            (None, None) => break,
        };
        out.push(merged);
    }
    out
}

/// What `b` changes or adds relative to `a`.
///
/// Keys dropped by `b` are not represented: with no removal marker in
/// the value domain, dropping a key is indistinguishable from leaving
/// it untouched.
pub fn diff(a: &Value, b: &Value) -> Value {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => Value::Object(diff_objects(a, b)),
        _ if a == b => Value::Object(Map::new()),
        _ => b.clone(),
    }
}

pub fn diff_objects(a: &Map<String, Value>, b: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, a_value) in a {
        let Some(b_value) = b.get(key) else { continue };
        match (a_value, b_value) {
            (Value::Object(a_inner), Value::Object(b_inner)) => {
                let nested = diff_objects(a_inner, b_inner);
                if !nested.is_empty() {
                    out.insert(key.clone(), Value::Object(nested));
                }
            }
            _ => {
                if a_value != b_value {
                    out.insert(key.clone(), b_value.clone());
                }
            }
        }
    }
    for (key, b_value) in b {
        if !a.contains_key(key) {
            out.insert(key.clone(), b_value.clone());
        }
    }
    out
}

/// Project `a` restricted to `b`'s key set, keeping only values that
/// structurally differ from `b`'s. Keys `b` has but `a` lacks are
/// skipped.
pub fn filter_objects(a: &Map<String, Value>, b: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, b_value) in b {
        let Some(a_value) = a.get(key) else { continue };
        match (a_value, b_value) {
            (Value::Object(a_inner), Value::Object(b_inner)) => {
                let nested = filter_objects(a_inner, b_inner);
                if !nested.is_empty() {
                    out.insert(key.clone(), Value::Object(nested));
                }
            }
            _ => {
                if a_value != b_value {
                    out.insert(key.clone(), a_value.clone());
                }
            }
        }
    }
    out
}

/// True when `candidate` satisfies `filter`.
///
/// An object filter requires every one of its keys to exist in the
/// candidate with an equal or recursively matching value. An array
/// filter requires each of its elements to have at least one matching
/// member anywhere in the candidate array - membership, not position.
/// Scalar filters compare structurally.
pub fn matches(candidate: &Value, filter: &Value) -> bool {
    match filter {
        Value::Object(filter_fields) => {
            let Value::Object(candidate_fields) = candidate else {
                return false;
            };
            filter_fields.iter().all(|(key, filter_value)| {
                candidate_fields
                    .get(key)
                    .map_or(false, |candidate_value| matches(candidate_value, filter_value))
            })
        }
        Value::Array(filter_items) => {
            let Value::Array(candidate_items) = candidate else {
                return false;
            };
            filter_items.iter().all(|filter_item| {
                candidate_items
                    .iter()
                    .any(|candidate_item| matches(candidate_item, filter_item))
            })
        }
        scalar => candidate == scalar,
    }
}

/// Left fold of [`merge`] over every object in a batch; non-object
/// values are skipped.
pub fn merge_batch(values: &[Value]) -> Map<String, Value> {
    let mut out = Map::new();
    for value in values {
        if let Value::Object(object) = value {
            out = merge_objects(&out, object);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_is_a_recursive_union_where_b_wins() {
        let a = json!({"name": "bob", "addr": {"city": "ny", "zip": "10001"}});
        let b = json!({"addr": {"city": "la"}, "age": 30});

        assert_eq!(
            merge(&a, &b),
            json!({"name": "bob", "addr": {"city": "la", "zip": "10001"}, "age": 30})
        );
    }

    #[test]
    fn merge_keeps_a_key_positions() {
        let a = json!({"x": 1, "y": 2});
        let b = json!({"y": 20, "z": 3});
        let merged = merge(&a, &b);

        let keys: Vec<&String> = merged.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
    }

    #[test]
    fn null_loses_to_non_null_in_either_direction() {
        assert_eq!(merge(&json!({"a": 1}), &json!({"a": null})), json!({"a": 1}));
        assert_eq!(merge(&json!({"a": null}), &json!({"a": 2})), json!({"a": 2}));
        assert_eq!(
            merge(&json!({"a": null}), &json!({"a": null})),
            json!({"a": null})
        );
    }

    #[test]
    fn arrays_merge_positionally_to_the_longer_length() {
        let a = json!([{"x": 1}, "keep", "tail"]);
        let b = json!([{"y": 2}, null]);

        assert_eq!(
            merge(&a, &b),
            json!([{"x": 1, "y": 2}, "keep", "tail"])
        );
    }

    #[test]
    fn mismatched_shapes_take_b() {
        assert_eq!(merge(&json!({"a": 1}), &json!([1])), json!([1]));
        assert_eq!(merge(&json!(1), &json!("x")), json!("x"));
    }

    #[test]
    fn diff_of_identical_values_is_empty() {
        let value = json!({"a": 1, "b": {"c": [1, 2]}});
        assert_eq!(diff(&value, &value), json!({}));
        assert_eq!(diff(&json!(7), &json!(7)), json!({}));
    }

    #[test]
    fn diff_reports_changes_and_additions() {
        let a = json!({"name": "bob", "age": 21, "addr": {"city": "ny", "zip": "10001"}});
        let b = json!({"name": "bob", "age": 22, "addr": {"city": "ny", "zip": "90210"}, "new": true});

        assert_eq!(
            diff(&a, &b),
            json!({"age": 22, "addr": {"zip": "90210"}, "new": true})
        );
    }

    #[test]
    fn diff_cannot_see_removed_keys() {
        let a = json!({"keep": 1, "gone": 2});
        let b = json!({"keep": 1});

        assert_eq!(diff(&a, &b), json!({}));
    }

    #[test]
    fn diff_keeps_explicit_nulls_that_differ() {
        assert_eq!(
            diff(&json!({"a": 1}), &json!({"a": null})),
            json!({"a": null})
        );
    }

    #[test]
    fn filter_projects_a_through_b_keeping_differences() {
        let a = json!({"name": "bob", "age": 21, "extra": true});
        let b = json!({"name": "alice", "age": 21});

        assert_eq!(
            filter_objects(a.as_object().unwrap(), b.as_object().unwrap()),
            *json!({"name": "bob"}).as_object().unwrap()
        );
    }

    #[test]
    fn filter_recurses_into_common_objects() {
        let a = json!({"addr": {"city": "ny", "zip": "10001"}});
        let b = json!({"addr": {"city": "la", "zip": "10001"}});

        assert_eq!(
            filter_objects(a.as_object().unwrap(), b.as_object().unwrap()),
            *json!({"addr": {"city": "ny"}}).as_object().unwrap()
        );
    }

    #[test]
    fn matches_requires_every_filter_key() {
        let candidate = json!({"name": "bob", "age": 21, "tags": ["a", "b"]});

        assert!(matches(&candidate, &json!({"name": "bob"})));
        assert!(matches(&candidate, &json!({"name": "bob", "age": 21})));
        assert!(!matches(&candidate, &json!({"name": "bob", "age": 22})));
        assert!(!matches(&candidate, &json!({"missing": 1})));
    }

    #[test]
    fn array_filters_are_membership_tests() {
        let candidate = json!(["b", "a", "c"]);

        assert!(matches(&candidate, &json!(["a", "c"])));
        assert!(matches(&candidate, &json!(["c", "a"])));
        assert!(!matches(&candidate, &json!(["a", "z"])));
    }

    #[test]
    fn nested_filters_match_recursively() {
        let candidate = json!({"users": [{"name": "bob", "age": 21}, {"name": "tom"}]});

        assert!(matches(&candidate, &json!({"users": [{"name": "tom"}]})));
        assert!(!matches(&candidate, &json!({"users": [{"name": "eve"}]})));
    }

    #[test]
    fn merge_batch_folds_left_over_objects_only() {
        let batch = vec![
            json!({"a": 1}),
            json!([1, 2]),
            json!({"a": 2, "b": {"c": 3}}),
            json!({"b": {"d": 4}}),
        ];

        assert_eq!(
            Value::Object(merge_batch(&batch)),
            json!({"a": 2, "b": {"c": 3, "d": 4}})
        );
    }

    #[test]
    fn merge_batch_with_empty_left_side_is_identity() {
        let object = json!({"a": {"b": 1}});
        assert_eq!(Value::Object(merge_batch(&[object.clone()])), object);
    }
}
