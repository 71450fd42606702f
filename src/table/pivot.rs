//! Key-layer pivot: unrolls one singly-keyed nested object into flat
//! row objects, one per terminal leaf record.
//!
//! `{"abc": {"age": 21}, "abd": {"age": 41}}` becomes two rows, each
//! carrying a synthetic `layer0key` column holding the key (`abc`,
//! `abd`) that produced it.

use crate::ops::merge::merge_objects;
use crate::table::types::{ColumnRegistry, RollConfig};
use serde_json::{Map, Value};

/// Unroll `object` into row objects, carrying `prefix` (the ancestor
/// layer-key columns) into every row produced beneath it.
///
/// Object- and array-valued fields descend; scalar fields at a pivot
/// layer have no leaf record to attach to and are discarded.
pub fn pivot_object(
    prefix: &Map<String, Value>,
    depth: usize,
    object: &Map<String, Value>,
    config: &RollConfig,
    registry: &mut ColumnRegistry,
) -> Vec<Map<String, Value>> {
    let mut rows = Vec::new();
    for (field, value) in object {
        match value {
            Value::Object(inner) => {
                pivot_field(prefix, depth, field, inner, config, registry, &mut rows);
            }
            Value::Array(items) => {
                // Reindex the array into a synthetic object keyed by
                // position, then pivot it like any nested object.
                let reindexed: Map<String, Value> = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (format!("[{index}]"), item.clone()))
                    .collect();
                pivot_field(prefix, depth, field, &reindexed, config, registry, &mut rows);
            }
            _ => {
                if config.verbose {
                    eprintln!("rollmill: discarded `{field}` at pivot layer {depth}");
                }
            }
        }
    }
    rows
}

fn pivot_field(
    prefix: &Map<String, Value>,
    depth: usize,
    field: &str,
    inner: &Map<String, Value>,
    config: &RollConfig,
    registry: &mut ColumnRegistry,
    rows: &mut Vec<Map<String, Value>>,
) {
    let layer_column = config.layer_key_name(depth);
    registry.register(&layer_column);

    let mut branch = prefix.clone();
    branch.insert(layer_column, Value::String(field.to_string()));

    if is_pure_nesting(inner) && depth < config.max_depth {
        rows.extend(pivot_object(&branch, depth + 1, inner, config, registry));
    } else {
        for key in inner.keys() {
            registry.register(key);
        }
        rows.push(merge_objects(&branch, inner));
    }
}

/// True when every value of the object is itself an object, i.e. the
/// object is another key layer rather than a leaf record. Vacuously
/// true for an empty object, which then pivots into zero rows.
fn is_pure_nesting(object: &Map<String, Value>) -> bool {
    object.values().all(|value| matches!(value, Value::Object(_)))
}
