//! Row filter expressions: comma-separated `column OP value` clauses
//! combined with AND semantics.
//!
//! `=` and `!=` compare cell text; `>`, `<`, `>=` and `<=` compare
//! both sides as floating point. A row missing the named column reads
//! as `""` for text comparisons and `0` for numeric ones, and a cell
//! that fails numeric parsing fails the row.

use crate::error::RollError;
use std::collections::HashMap;

/// Comparison operator of one clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Ne,
    Ge,
    Le,
    Eq,
    Gt,
    Lt,
}

impl FilterOp {
    fn is_numeric(self) -> bool {
        matches!(self, FilterOp::Ge | FilterOp::Le | FilterOp::Gt | FilterOp::Lt)
    }
}

/// Compound operators listed before their single-character prefixes so
/// `>=` never tokenizes as `>` followed by `=...`.
const OPERATORS: [(&str, FilterOp); 6] = [
    ("!=", FilterOp::Ne),
    (">=", FilterOp::Ge),
    ("<=", FilterOp::Le),
    ("=", FilterOp::Eq),
    (">", FilterOp::Gt),
    ("<", FilterOp::Lt),
];

#[derive(Debug, Clone)]
pub struct FilterClause {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

/// A compiled filter expression. The default value has no clauses and
/// keeps every row.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    clauses: Vec<FilterClause>,
}

impl RowFilter {
    /// Compile a comma-separated clause list. Empty clauses are
    /// skipped; a clause with no recognized operator is an error.
    pub fn compile(expression: &str) -> Result<Self, RollError> {
        let mut clauses = Vec::new();
        for clause in expression.split(',') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }
            clauses.push(parse_clause(clause)?);
        }
        Ok(RowFilter { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[FilterClause] {
        &self.clauses
    }

    /// A row is kept only when every clause passes.
    pub fn matches(&self, row: &HashMap<String, String>) -> bool {
        self.clauses.iter().all(|clause| clause_matches(clause, row))
    }
}

/// Scan for the earliest operator occurrence, preferring the longer
/// operator when two start at the same position.
fn parse_clause(clause: &str) -> Result<FilterClause, RollError> {
    for (index, _) in clause.char_indices() {
        for (symbol, op) in OPERATORS {
            if clause[index..].starts_with(symbol) {
                let column = clause[..index].trim();
                if column.is_empty() {
                    return Err(RollError::FilterSyntax {
                        clause: clause.to_string(),
                        reason: "missing column name".to_string(),
                    });
                }
                return Ok(FilterClause {
                    column: column.to_string(),
                    op,
                    value: clause[index + symbol.len()..].to_string(),
                });
            }
        }
    }
    Err(RollError::FilterSyntax {
        clause: clause.to_string(),
        reason: "no comparison operator".to_string(),
    })
}

fn clause_matches(clause: &FilterClause, row: &HashMap<String, String>) -> bool {
    let cell = row.get(&clause.column).map(String::as_str);
    if clause.op.is_numeric() {
        let lhs = match cell.unwrap_or("0").parse::<f64>() {
            Ok(number) => number,
            Err(_) => return false,
        };
        let rhs = match clause.value.parse::<f64>() {
            Ok(number) => number,
            Err(_) => return false,
        };
        match clause.op {
            FilterOp::Gt => lhs > rhs,
            FilterOp::Lt => lhs < rhs,
            FilterOp::Ge => lhs >= rhs,
            FilterOp::Le => lhs <= rhs,
            FilterOp::Eq | FilterOp::Ne => false,
        }
    } else {
        let equal = cell.unwrap_or("") == clause.value;
        match clause.op {
            FilterOp::Eq => equal,
            _ => !equal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn compound_operators_win_over_their_prefixes() {
        let filter = RowFilter::compile("age>=30,name!=tom,city=ny").unwrap();
        let ops: Vec<FilterOp> = filter.clauses().iter().map(|c| c.op).collect();

        assert_eq!(ops, vec![FilterOp::Ge, FilterOp::Ne, FilterOp::Eq]);
        assert_eq!(filter.clauses()[0].column, "age");
        assert_eq!(filter.clauses()[0].value, "30");
    }

    #[test]
    fn unknown_operator_is_a_syntax_error() {
        let err = RowFilter::compile("age~21").unwrap_err();
        assert!(matches!(err, RollError::FilterSyntax { .. }));
    }

    #[test]
    fn missing_column_name_is_a_syntax_error() {
        let err = RowFilter::compile("=21").unwrap_err();
        assert!(matches!(err, RollError::FilterSyntax { .. }));
    }

    #[test]
    fn clauses_combine_with_and_semantics() {
        let filter = RowFilter::compile("age>=30,name!=tom").unwrap();

        assert!(!filter.matches(&row(&[("age", "21"), ("name", "bob")])));
        assert!(!filter.matches(&row(&[("age", "41"), ("name", "tom")])));
        assert!(filter.matches(&row(&[("age", "41"), ("name", "bob")])));
    }

    #[test]
    fn missing_column_reads_as_empty_text() {
        let filter = RowFilter::compile("name!=tom").unwrap();
        assert!(filter.matches(&row(&[("age", "1")])));

        let filter = RowFilter::compile("name=").unwrap();
        assert!(filter.matches(&row(&[])));
    }

    #[test]
    fn missing_column_reads_as_zero_for_numeric_ops() {
        let filter = RowFilter::compile("age<5").unwrap();
        assert!(filter.matches(&row(&[])));

        let filter = RowFilter::compile("age>5").unwrap();
        assert!(!filter.matches(&row(&[])));
    }

    #[test]
    fn unparseable_numeric_cell_fails_the_row() {
        let filter = RowFilter::compile("age>1").unwrap();
        assert!(!filter.matches(&row(&[("age", "old")])));
    }

    #[test]
    fn numeric_comparisons_are_floating_point() {
        let filter = RowFilter::compile("score>=2.5").unwrap();
        assert!(filter.matches(&row(&[("score", "2.50")])));
        assert!(!filter.matches(&row(&[("score", "2.49")])));
    }

    #[test]
    fn empty_expression_keeps_everything() {
        let filter = RowFilter::compile("").unwrap();
        assert!(filter.is_empty());
        assert!(filter.matches(&row(&[("anything", "goes")])));
    }
}
