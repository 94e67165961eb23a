use crate::memo::{GroupId, MemoExprFormatter};
use crate::meta::Symbol;

/// The root of a plan. Assigns names to the columns returned to a client.
#[derive(Debug, Clone)]
pub struct LogicalOutput {
    /// The input operator.
    pub input: GroupId,
    /// Names of the output columns.
    pub names: Vec<String>,
    /// Output columns. Must have the same length as `names`.
    pub columns: Vec<Symbol>,
}

impl LogicalOutput {
    pub(super) fn num_children(&self) -> usize {
        1
    }

    pub(super) fn get_child(&self, i: usize) -> Option<GroupId> {
        match i {
            0 => Some(self.input),
            _ => None,
        }
    }

    pub(super) fn format_expr<F>(&self, f: &mut F)
    where
        F: MemoExprFormatter,
    {
        f.write_name("LogicalOutput");
        f.write_input("input", &self.input);
        f.write_values("names", &self.names);
        f.write_values("cols", &self.columns);
    }
}
