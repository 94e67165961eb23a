use crate::memo::{GroupId, MemoExprFormatter};
use crate::meta::Symbol;

/// Logical operator that returns data from a source table.
#[derive(Debug, Clone)]
pub struct LogicalGet {
    /// The identifier of the source table.
    pub source: String,
    /// Output columns.
    pub columns: Vec<Symbol>,
}

impl LogicalGet {
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
        f.write_name("LogicalGet");
        f.write_source(&self.source);
        f.write_values("cols", &self.columns);
    }
}
