//! Tabular pipeline - turn a batch of JSON values into an ordered
//! (columns, rows) table.
//!
//! The pipeline pivots a lone root object into per-key rows, flattens
//! every row value into dotted/indexed path columns, applies the
//! optional row filter, and pads rows against the column registry so
//! heterogeneous batches share one layout.

pub mod filter;
pub mod flatten;
pub mod pivot;
pub mod roller;
pub mod types;

pub use filter::{FilterClause, FilterOp, RowFilter};
pub use flatten::{flatten_value, scalar_cell};
pub use pivot::pivot_object;
pub use roller::TableRoller;
pub use types::{ColumnRegistry, RollConfig, Table};
