//! The tabular pipeline: pivot when eligible, flatten, filter,
//! materialize.

use crate::error::Result;
use crate::table::filter::RowFilter;
use crate::table::flatten::flatten_value;
use crate::table::pivot::pivot_object;
use crate::table::types::{ColumnRegistry, RollConfig, Table};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// One pipeline run. Owns the column registry, so every document in a
/// batch lands on the same column layout and the header order is
/// reproducible.
pub struct TableRoller {
    config: RollConfig,
    registry: ColumnRegistry,
}

impl TableRoller {
    pub fn new(config: RollConfig) -> Self {
        TableRoller {
            config,
            registry: ColumnRegistry::new(),
        }
    }

    pub fn config(&self) -> &RollConfig {
        &self.config
    }

    pub fn registry(&self) -> &ColumnRegistry {
        &self.registry
    }

    /// Pre-register column names (e.g. a CSV header row) so they keep
    /// the leading positions in the output order.
    pub fn register_columns<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.register_all(names);
    }

    /// Turn an acquired value sequence into an ordered table.
    ///
    /// A batch of exactly one root object is pivoted first; anything
    /// else passes through unchanged. Rows are then flattened, reduced
    /// by the configured filter, and padded so every row covers every
    /// column observed in the batch.
    pub fn roll(&mut self, values: &[Value]) -> Result<Table> {
        let filter = match &self.config.filter {
            Some(expression) => {
                let compiled = RowFilter::compile(expression)?;
                if compiled.is_empty() && self.config.verbose {
                    eprintln!("rollmill: empty filter expression, keeping every row");
                }
                compiled
            }
            None => RowFilter::default(),
        };

        let pivoted = self.maybe_pivot(values);
        let sequence: &[Value] = pivoted.as_deref().unwrap_or(values);

        let mut row_maps = Vec::with_capacity(sequence.len());
        let mut observed: HashSet<String> = HashSet::new();
        for (index, value) in sequence.iter().enumerate() {
            let row = self.flatten_element(index, value);
            observed.extend(row.keys().cloned());
            row_maps.push(row);
        }

        // Column order comes from the registry, restricted to paths
        // this batch actually produced. Registration happened before
        // filtering, so the header does not depend on which rows
        // survive.
        let columns = self.registry.ordered_subset(&observed);
        let rows = row_maps
            .into_iter()
            .filter(|row| filter.matches(row))
            .map(|row| materialize_row(&columns, &row))
            .collect();

        Ok(Table { columns, rows })
    }

    fn flatten_element(&mut self, index: usize, value: &Value) -> HashMap<String, String> {
        match value {
            Value::Object(_) | Value::Array(_) => {
                flatten_value(value, None, &self.config, &mut self.registry)
            }
            _ => {
                let base = format!("[{index}]");
                flatten_value(value, Some(&base), &self.config, &mut self.registry)
            }
        }
    }

    fn maybe_pivot(&mut self, values: &[Value]) -> Option<Vec<Value>> {
        let [value] = values else { return None };
        let Value::Object(object) = value else { return None };
        if self.config.verbose {
            eprintln!("rollmill: single root object, performing table pivot");
        }
        let rows = pivot_object(&Map::new(), 0, object, &self.config, &mut self.registry);
        Some(rows.into_iter().map(Value::Object).collect())
    }
}

fn materialize_row(columns: &[String], row: &HashMap<String, String>) -> Vec<String> {
    columns
        .iter()
        .map(|column| row.get(column).cloned().unwrap_or_default())
        .collect()
}
