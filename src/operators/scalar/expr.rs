use std::convert::Infallible;
use std::fmt::{Display, Formatter};

use crate::datatypes::DataType;
use crate::meta::Symbol;
use crate::operators::scalar::value::ScalarValue;

/// Scalar expressions that appear in plan nodes.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ScalarExpr {
    /// A literal value.
    Literal(ScalarValue),
    /// A reference to an output column of another plan node.
    Column(Symbol),
    /// `CAST(expr AS data_type)`.
    Cast { expr: Box<ScalarExpr>, data_type: DataType },
    /// `-expr`.
    Negation(Box<ScalarExpr>),
    /// Binary arithmetic expression.
    BinaryExpr {
        lhs: Box<ScalarExpr>,
        op: BinaryOp,
        rhs: Box<ScalarExpr>,
    },
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl ScalarExpr {
    /// Creates a literal expression.
    pub fn literal(value: impl Into<ScalarValue>) -> Self {
        ScalarExpr::Literal(value.into())
    }

    /// Creates a `NULL` literal.
    pub fn null() -> Self {
        ScalarExpr::Literal(ScalarValue::Null)
    }

    /// Wraps this expression into a cast to the given type.
    pub fn cast(self, data_type: DataType) -> Self {
        ScalarExpr::Cast {
            expr: Box::new(self),
            data_type,
        }
    }

    /// Creates a binary expression `self op rhs`.
    pub fn binary(self, op: BinaryOp, rhs: ScalarExpr) -> Self {
        ScalarExpr::BinaryExpr {
            lhs: Box::new(self),
            op,
            rhs: Box::new(rhs),
        }
    }

    /// Performs a depth-first traversal of this expression tree calling methods of the given `visitor`.
    ///
    /// If [ExprVisitor::pre_visit] returns `Ok(false)` then child expressions of the expression are not visited.
    ///
    /// If an error is returned then traversal terminates.
    pub fn accept<V>(&self, visitor: &mut V) -> Result<(), V::Error>
    where
        V: ExprVisitor,
    {
        if !visitor.pre_visit(self)? {
            return Ok(());
        }
        match self {
            ScalarExpr::Literal(_) => {}
            ScalarExpr::Column(_) => {}
            ScalarExpr::Cast { expr, .. } => expr.accept(visitor)?,
            ScalarExpr::Negation(expr) => expr.accept(visitor)?,
            ScalarExpr::BinaryExpr { lhs, rhs, .. } => {
                lhs.accept(visitor)?;
                rhs.accept(visitor)?;
            }
        }
        visitor.post_visit(self)
    }

    /// Returns `true` if this expression does not reference any columns.
    pub fn is_constant(&self) -> bool {
        struct FindColumns {
            found: bool,
        }

        impl ExprVisitor for FindColumns {
            type Error = Infallible;

            fn pre_visit(&mut self, expr: &ScalarExpr) -> Result<bool, Self::Error> {
                if let ScalarExpr::Column(_) = expr {
                    self.found = true;
                }
                Ok(!self.found)
            }

            fn post_visit(&mut self, _expr: &ScalarExpr) -> Result<(), Self::Error> {
                Ok(())
            }
        }

        let mut visitor = FindColumns { found: false };
        // Never returns an error
        self.accept(&mut visitor).unwrap();
        !visitor.found
    }
}

impl From<ScalarValue> for ScalarExpr {
    fn from(value: ScalarValue) -> Self {
        ScalarExpr::Literal(value)
    }
}

/// Called by [ScalarExpr::accept] during a traversal of an expression tree.
pub trait ExprVisitor {
    /// The type of an error returned by this visitor.
    type Error;

    /// Called before all child expressions of `expr` are visited.
    /// Returns `Ok(true)` if children should be visited.
    fn pre_visit(&mut self, _expr: &ScalarExpr) -> Result<bool, Self::Error> {
        Ok(true)
    }

    /// Called after all child expressions of `expr` are visited.
    fn post_visit(&mut self, expr: &ScalarExpr) -> Result<(), Self::Error>;
}

/// The alternate form (`{:#}`) writes the kind of every non-`NULL` literal: `int64:1`.
impl Display for ScalarExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            match self {
                ScalarExpr::Literal(ScalarValue::Null) => write!(f, "NULL"),
                ScalarExpr::Literal(value) => write!(f, "{}:{}", value.kind(), value),
                ScalarExpr::Column(symbol) => write!(f, "{}", symbol),
                ScalarExpr::Cast { expr, data_type } => write!(f, "CAST({:#} AS {})", expr, data_type),
                ScalarExpr::Negation(expr) => write!(f, "-{:#}", expr),
                ScalarExpr::BinaryExpr { lhs, op, rhs } => write!(f, "({:#} {} {:#})", lhs, op, rhs),
            }
        } else {
            match self {
                ScalarExpr::Literal(value) => write!(f, "{}", value),
                ScalarExpr::Column(symbol) => write!(f, "{}", symbol),
                ScalarExpr::Cast { expr, data_type } => write!(f, "CAST({} AS {})", expr, data_type),
                ScalarExpr::Negation(expr) => write!(f, "-{}", expr),
                ScalarExpr::BinaryExpr { lhs, op, rhs } => write!(f, "({} {} {})", lhs, op, rhs),
            }
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Plus => write!(f, "+"),
            BinaryOp::Minus => write!(f, "-"),
            BinaryOp::Multiply => write!(f, "*"),
            BinaryOp::Divide => write!(f, "/"),
            BinaryOp::Modulo => write!(f, "%"),
        }
    }
}
