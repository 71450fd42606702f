//! # rollmill - JSON flattening toolkit
//!
//! Rolls nested JSON out into flat tables, and provides structural
//! operations on JSON values: recursive merge, diff, projection, and
//! single-leaf dissection.
//!
//! ## Modules
//!
//! - **table**: the pivot/flatten/filter pipeline producing an ordered
//!   (columns, rows) table
//! - **ops**: merge, diff, filter, matches and dissection
//! - **input**: root-shape detection and JSON/NDJSON/CSV acquisition
//! - **render**: CSV, TSV, Markdown, HTML, JSON and properties writers
//!
//! ## Quick start
//!
//! ### Pivoting a nested object into rows
//!
//! ```rust
//! use rollmill::table::{RollConfig, TableRoller};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = json!({
//!     "abc": {"age": 21, "name": "bob"},
//!     "abd": {"age": 41, "name": "tom"}
//! });
//!
//! let mut roller = TableRoller::new(RollConfig::default());
//! let table = roller.roll(&[data])?;
//!
//! assert_eq!(table.columns, vec!["layer0key", "age", "name"]);
//! assert_eq!(table.rows[0], vec!["abc", "21", "bob"]);
//! assert_eq!(table.rows[1], vec!["abd", "41", "tom"]);
//! # Ok(())
//! # }
//! ```
//!
//! ### Dissection round-trips through merge
//!
//! ```rust
//! use rollmill::ops::{dissect_object, merge};
//! use serde_json::json;
//!
//! let original = json!({"x": {"y": 3, "z": 4}});
//! let fragments = dissect_object(original.as_object().unwrap());
//!
//! assert_eq!(fragments.len(), 2);
//! let rebuilt = fragments
//!     .iter()
//!     .fold(json!({}), |acc, fragment| merge(&acc, fragment));
//! assert_eq!(rebuilt, original);
//! ```

use serde_json::Value;

pub mod error;
pub mod input;
pub mod ops;
pub mod render;
pub mod table;

pub use error::RollError;
pub use ops::{diff, dissect_array, dissect_object, matches, merge, merge_batch};
pub use table::{ColumnRegistry, RollConfig, Table, TableRoller};

/// Convenience entry point: roll a batch of acquired values into a
/// table and render it as CSV.
pub fn roll_to_csv<W: std::io::Write>(
    values: &[Value],
    config: RollConfig,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut roller = TableRoller::new(config);
    let table = roller.roll(values)?;
    render::write_csv(out, &table)
}
