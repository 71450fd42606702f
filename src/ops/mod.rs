//! Structural operations on JSON values: recursive merge, diff,
//! projection, predicate matching, and single-leaf dissection.

pub mod dissect;
pub mod merge;

pub use dissect::{
    build_path, dissect_array, dissect_object, dissect_properties, indexed_array_for,
};
pub use merge::{
    diff, diff_objects, filter_objects, matches, merge, merge_arrays, merge_batch, merge_objects,
};
