//! Plan nodes and scalar expressions.

use crate::memo::Memo;
use crate::operators::relational::logical::LogicalExpr;

pub mod relational;
pub mod scalar;

/// A memo that stores logical plans.
pub type ExprMemo = Memo<LogicalExpr>;
