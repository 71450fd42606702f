//! Input acquisition: root-shape detection and JSON/NDJSON/CSV
//! reading.
//!
//! Acquisition never aborts a batch: an unreadable document or line is
//! skipped with a diagnostic and the rest of the input is kept.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;

/// How the raw document text was shaped at its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootShape {
    /// One root object (the pivot-eligible shape)
    SingleObject,
    /// A root array, one batch element per item
    RootArray,
    /// Newline-delimited objects concatenated into one batch
    ObjectPerLine,
    /// Nothing parseable
    Empty,
}

/// Parsed values plus the root shape that produced them.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub shape: RootShape,
    pub values: Vec<Value>,
}

/// Sniff the root shape of a raw JSON document and parse it into a
/// batch of values.
///
/// A leading `[` means a root array. A leading `{` is a single object
/// unless the text contains an object boundary on a line break
/// (`}\n{`), in which case each line parses separately and bad lines
/// are dropped.
pub fn read_json_data(data: &str, verbose: bool) -> Acquired {
    let trimmed = data.trim_start();

    if trimmed.starts_with('[') {
        return match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Array(items)) => {
                if verbose {
                    eprintln!("rollmill: format detected: root array");
                }
                Acquired {
                    shape: RootShape::RootArray,
                    values: items,
                }
            }
            Ok(_) | Err(_) => {
                if verbose {
                    eprintln!("rollmill: unreadable root array, skipping document");
                }
                Acquired {
                    shape: RootShape::Empty,
                    values: Vec::new(),
                }
            }
        };
    }

    if trimmed.starts_with('{') {
        if trimmed.contains("}\n{") || trimmed.contains("}\r\n{") {
            if verbose {
                eprintln!("rollmill: format detected: one object per line");
            }
            let mut values = Vec::new();
            for line in trimmed.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<Value>(line) {
                    Ok(value) => values.push(value),
                    Err(err) => {
                        if verbose {
                            eprintln!("rollmill: skipped line: {err}");
                        }
                    }
                }
            }
            return Acquired {
                shape: RootShape::ObjectPerLine,
                values,
            };
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => {
                if verbose {
                    eprintln!("rollmill: format detected: single root object");
                }
                return Acquired {
                    shape: RootShape::SingleObject,
                    values: vec![value],
                };
            }
            Err(err) => {
                if verbose {
                    eprintln!("rollmill: unreadable document, skipping: {err}");
                }
            }
        }
    }

    Acquired {
        shape: RootShape::Empty,
        values: Vec::new(),
    }
}

/// Read CSV input: the header row names the columns (returned in
/// header order for registration) and every data row becomes a flat
/// object of string cells.
pub fn read_csv_data<R: Read>(reader: R) -> Result<(Vec<String>, Vec<Value>)> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let headers: Vec<String> = csv_reader
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut values = Vec::new();
    for record in csv_reader.records() {
        let record = record.context("reading CSV row")?;
        let mut object = serde_json::Map::new();
        for (column, cell) in headers.iter().zip(record.iter()) {
            object.insert(column.clone(), Value::String(cell.to_string()));
        }
        values.push(Value::Object(object));
    }
    Ok((headers, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_array_yields_one_value_per_element() {
        let acquired = read_json_data(r#"[{"a": 1}, {"a": 2}]"#, false);

        assert_eq!(acquired.shape, RootShape::RootArray);
        assert_eq!(acquired.values, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn single_object_is_a_one_element_batch() {
        let acquired = read_json_data(r#"{"a": {"b": 1}}"#, false);

        assert_eq!(acquired.shape, RootShape::SingleObject);
        assert_eq!(acquired.values, vec![json!({"a": {"b": 1}})]);
    }

    #[test]
    fn object_per_line_splits_and_skips_bad_lines() {
        let data = "{\"a\": 1}\n{\"broken\n{\"a\": 2}\n";
        let acquired = read_json_data(data, false);

        assert_eq!(acquired.shape, RootShape::ObjectPerLine);
        assert_eq!(acquired.values, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn leading_whitespace_does_not_hide_the_root_shape() {
        let acquired = read_json_data("  \n[1, 2]", false);
        assert_eq!(acquired.shape, RootShape::RootArray);
    }

    #[test]
    fn garbage_input_yields_an_empty_batch() {
        let acquired = read_json_data("hello world", false);
        assert_eq!(acquired.shape, RootShape::Empty);
        assert!(acquired.values.is_empty());
    }

    #[test]
    fn csv_rows_become_header_keyed_objects() {
        let data = "name,age\nbob,21\ntom,41\n";
        let (headers, values) = read_csv_data(data.as_bytes()).unwrap();

        assert_eq!(headers, vec!["name", "age"]);
        assert_eq!(
            values,
            vec![
                json!({"name": "bob", "age": "21"}),
                json!({"name": "tom", "age": "41"}),
            ]
        );
    }
}
