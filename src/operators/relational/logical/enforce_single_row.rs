use crate::memo::{GroupId, MemoExprFormatter};

/// Returns the only row produced by its input operator.
/// Fails at runtime when the input produces more than one row and produces `NULL`s when the input is empty.
#[derive(Debug, Clone)]
pub struct LogicalEnforceSingleRow {
    /// The input operator.
    pub input: GroupId,
}

impl LogicalEnforceSingleRow {
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
        f.write_name("LogicalEnforceSingleRow");
        f.write_input("input", &self.input);
    }
}
