//! Logical expressions supported by the optimizer.

use crate::memo::{GroupId, MemoExpr, MemoExprFormatter};

pub use enforce_single_row::LogicalEnforceSingleRow;
pub use get::LogicalGet;
pub use limit::LogicalLimit;
pub use output::LogicalOutput;
pub use values::LogicalValues;

mod enforce_single_row;
mod get;
mod limit;
mod output;
mod values;

/// A logical expression describes a high-level operator without specifying an implementation algorithm to be used.
#[derive(Debug, Clone)]
pub enum LogicalExpr {
    /// Logical get/scan operator.
    Get(LogicalGet),
    /// Logical limit operator.
    Limit(LogicalLimit),
    /// Logical values operator.
    Values(LogicalValues),
    /// Enforce single row operator.
    EnforceSingleRow(LogicalEnforceSingleRow),
    /// The root of a plan.
    Output(LogicalOutput),
}

impl LogicalExpr {
    /// Returns the name of this operator.
    pub fn name(&self) -> &'static str {
        match self {
            LogicalExpr::Get(_) => "LogicalGet",
            LogicalExpr::Limit(_) => "LogicalLimit",
            LogicalExpr::Values(_) => "LogicalValues",
            LogicalExpr::EnforceSingleRow(_) => "LogicalEnforceSingleRow",
            LogicalExpr::Output(_) => "LogicalOutput",
        }
    }
}

impl MemoExpr for LogicalExpr {
    fn num_children(&self) -> usize {
        match self {
            LogicalExpr::Get(expr) => expr.num_children(),
            LogicalExpr::Limit(expr) => expr.num_children(),
            LogicalExpr::Values(expr) => expr.num_children(),
            LogicalExpr::EnforceSingleRow(expr) => expr.num_children(),
            LogicalExpr::Output(expr) => expr.num_children(),
        }
    }

    fn get_child(&self, i: usize) -> Option<GroupId> {
        match self {
            LogicalExpr::Get(expr) => expr.get_child(i),
            LogicalExpr::Limit(expr) => expr.get_child(i),
            LogicalExpr::Values(expr) => expr.get_child(i),
            LogicalExpr::EnforceSingleRow(expr) => expr.get_child(i),
            LogicalExpr::Output(expr) => expr.get_child(i),
        }
    }

    fn format_expr<F>(&self, f: &mut F)
    where
        F: MemoExprFormatter,
    {
        match self {
            LogicalExpr::Get(expr) => expr.format_expr(f),
            LogicalExpr::Limit(expr) => expr.format_expr(f),
            LogicalExpr::Values(expr) => expr.format_expr(f),
            LogicalExpr::EnforceSingleRow(expr) => expr.format_expr(f),
            LogicalExpr::Output(expr) => expr.format_expr(f),
        }
    }
}
