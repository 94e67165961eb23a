//! Scalar expressions and values.

pub mod eval;
pub mod expr;
pub mod value;

pub use expr::{BinaryOp, ScalarExpr};
pub use value::ScalarValue;
