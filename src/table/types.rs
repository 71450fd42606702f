use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration for one tabular pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollConfig {
    /// Replacement names for the synthetic pivot key columns,
    /// outermost layer first. Depths past the end of the list fall
    /// back to the default `layer<N>key`.
    pub layer_key_names: Vec<String>,

    /// Optional row filter expression (see [`crate::table::filter`])
    pub filter: Option<String>,

    /// Recursion bound for flattening and pivoting
    pub max_depth: usize,

    /// Emit skip/drop diagnostics on stderr
    pub verbose: bool,
}

impl Default for RollConfig {
    fn default() -> Self {
        RollConfig {
            layer_key_names: Vec::new(),
            filter: None,
            max_depth: 64,
            verbose: false,
        }
    }
}

impl RollConfig {
    /// Column name recording the pivot key at `depth`
    pub fn layer_key_name(&self, depth: usize) -> String {
        match self.layer_key_names.get(depth) {
            Some(name) => name.clone(),
            None => format!("layer{depth}key"),
        }
    }
}

/// Ordered, duplicate-free record of every column name encountered.
///
/// The first registration fixes a column's position for the rest of
/// the run; registering the same name again is a no-op. The registry's
/// final order, not any single row's key order, decides output column
/// order.
#[derive(Debug, Default, Clone)]
pub struct ColumnRegistry {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str) {
        if self.seen.insert(name.to_string()) {
            self.order.push(name.to_string());
        }
    }

    pub fn register_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            self.register(name.as_ref());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Registry order restricted to the given names
    pub fn ordered_subset(&self, present: &HashSet<String>) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| present.contains(name.as_str()))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// Ordered tabular output: column names plus same-length string rows.
/// Cells a row had no value for hold the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
