use std::collections::HashSet;

use itertools::Itertools;

use crate::error::OptimizerError;
use crate::memo::{GroupId, MemoExprFormatter};
use crate::meta::Symbol;
use crate::operators::scalar::ScalarExpr;

/// Logical values operator. Values operator produces a specified collection of rows.
///
/// Every row has exactly one expression per output column.
#[derive(Debug, Clone)]
pub struct LogicalValues {
    columns: Vec<Symbol>,
    rows: Vec<Vec<ScalarExpr>>,
}

impl LogicalValues {
    /// Creates a new values operator.
    ///
    /// Returns an error if a column appears more than once or a row does not have exactly one expression per column.
    pub fn new(columns: Vec<Symbol>, rows: Vec<Vec<ScalarExpr>>) -> Result<Self, OptimizerError> {
        let mut unique = HashSet::with_capacity(columns.len());
        if let Some(duplicate) = columns.iter().find(|c| !unique.insert(**c)) {
            let message = format!("LogicalValues: Duplicate output column: {}", duplicate);
            return Err(OptimizerError::argument(message));
        }

        if let Some((i, row)) = rows.iter().find_position(|row| row.len() != columns.len()) {
            let message = format!(
                "LogicalValues: Row #{} has {} expressions but the number of columns is {}",
                i,
                row.len(),
                columns.len()
            );
            return Err(OptimizerError::argument(message));
        }

        Ok(LogicalValues { columns, rows })
    }

    /// The columns produced by this operator.
    pub fn columns(&self) -> &[Symbol] {
        &self.columns
    }

    /// Rows of this operator. The i-th expression of a row is the value of the i-th column.
    pub fn rows(&self) -> &[Vec<ScalarExpr>] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns an iterator over expressions of the given column.
    pub fn column_values(&self, column_index: usize) -> impl Iterator<Item = &ScalarExpr> + '_ {
        self.rows.iter().map(move |row| &row[column_index])
    }

    pub(super) fn num_children(&self) -> usize {
        0
    }

    pub(super) fn get_child(&self, _i: usize) -> Option<GroupId> {
        None
    }

    pub(super) fn format_expr<F>(&self, f: &mut F)
    where
        F: MemoExprFormatter,
    {
        // Literals of different types can have the same textual representation.
        let rows: Vec<String> =
            self.rows.iter().map(|row| format!("({})", row.iter().map(|e| format!("{:#}", e)).join(", "))).collect();

        f.write_name("LogicalValues");
        f.write_values("cols", &self.columns);
        f.write_values("values", &rows);
    }
}
