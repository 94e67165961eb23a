use crate::memo::{GroupId, MemoExprFormatter};

/// Logical limit operator. Limit operator reduces the number of rows produced
/// by its input operator to the number that is no greater than the specified constant value.
#[derive(Debug, Clone)]
pub struct LogicalLimit {
    /// The input operator.
    pub input: GroupId,
    /// The maximum number of rows to return.
    pub rows: usize,
}

impl LogicalLimit {
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
        f.write_name("LogicalLimit");
        f.write_input("input", &self.input);
        f.write_value("rows", self.rows);
    }
}
