//! Memo stores alternative plans of a query as groups of logically equivalent expressions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};

use itertools::Itertools;

use crate::error::OptimizerError;

#[cfg(test)]
mod tests;

/// `Memo` is an arena that stores each expression in a group of logically equivalent expressions:
///  * Child expressions are referenced by the [identifiers](self::GroupId) of their groups.
///  * Identical expressions are stored only once, so a sub-plan reachable from multiple parents is shared.
///
/// The first expression of a group is its representative expression.
pub struct Memo<E>
where
    E: MemoExpr,
{
    groups: Vec<MemoGroupData>,
    exprs: Vec<MemoExprData<E>>,
    expr_cache: HashMap<String, ExprId>,
}

impl<E> Memo<E>
where
    E: MemoExpr,
{
    /// Creates a new empty memo.
    pub fn new() -> Self {
        Memo {
            groups: Vec::new(),
            exprs: Vec::new(),
            expr_cache: HashMap::new(),
        }
    }

    /// Copies the given expression `expr` into this memo. If this memo does not contain the given expression
    /// a new memo group is created and this method returns its identifier. Otherwise returns the identifier
    /// of the group of the already existing expression.
    ///
    /// Returns an error if the expression references a group that does not exist.
    pub fn insert_group(&mut self, expr: E) -> Result<GroupId, OptimizerError> {
        self.check_children(&expr)?;

        let digest = make_digest(&expr);
        match self.expr_cache.entry(digest) {
            Entry::Occupied(o) => {
                let expr_id = *o.get();
                Ok(self.exprs[expr_id.index()].group_id)
            }
            Entry::Vacant(v) => {
                let group_id = GroupId(self.groups.len());
                let expr_id = ExprId(self.exprs.len());
                v.insert(expr_id);

                self.groups.push(MemoGroupData {
                    group_id,
                    exprs: vec![expr_id],
                });
                self.exprs.push(MemoExprData { expr_id, group_id, expr });
                Ok(group_id)
            }
        }
    }

    /// Copies the expression `expr` into this memo and adds it to the given group.
    /// If an identical expression already exists in that group this method returns the identifier of that expression.
    ///
    /// Returns an error if the group does not exist, the expression references a group that does not exist or
    /// an identical expression belongs to another group.
    pub fn insert_group_member(&mut self, group_id: GroupId, expr: E) -> Result<ExprId, OptimizerError> {
        if group_id.index() >= self.groups.len() {
            return Err(OptimizerError::argument(format!("Group does not exist: {}", group_id)));
        }
        self.check_children(&expr)?;

        let digest = make_digest(&expr);
        match self.expr_cache.entry(digest) {
            Entry::Occupied(o) => {
                let existing = &self.exprs[o.get().index()];
                if existing.group_id == group_id {
                    Ok(existing.expr_id)
                } else {
                    let message = format!(
                        "Expression {} already belongs to group {}. Group: {}",
                        o.key(),
                        existing.group_id,
                        group_id
                    );
                    Err(OptimizerError::argument(message))
                }
            }
            Entry::Vacant(v) => {
                let expr_id = ExprId(self.exprs.len());
                v.insert(expr_id);

                self.groups[group_id.index()].exprs.push(expr_id);
                self.exprs.push(MemoExprData { expr_id, group_id, expr });
                Ok(expr_id)
            }
        }
    }

    /// Returns a reference to the memo group with the given identifier.
    pub fn get_group(&self, group_id: &GroupId) -> Result<MemoGroupRef<E>, OptimizerError> {
        match self.groups.get(group_id.index()) {
            Some(data) => Ok(MemoGroupRef { memo: self, data }),
            None => Err(OptimizerError::argument(format!("Group does not exist: {}", group_id))),
        }
    }

    /// Returns the number of groups in this memo.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Returns the number of expressions in this memo.
    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }

    fn check_children(&self, expr: &E) -> Result<(), OptimizerError> {
        for i in 0..expr.num_children() {
            match expr.get_child(i) {
                Some(child) if child.index() < self.groups.len() => {}
                Some(child) => {
                    return Err(OptimizerError::argument(format!(
                        "Child expression #{} references a group that does not exist: {}",
                        i, child
                    )))
                }
                None => {
                    return Err(OptimizerError::internal(format!(
                        "Expression has {} child expressions but child #{} is missing",
                        expr.num_children(),
                        i
                    )))
                }
            }
        }
        Ok(())
    }
}

impl<E> Default for Memo<E>
where
    E: MemoExpr,
{
    fn default() -> Self {
        Memo::new()
    }
}

impl<E> Debug for Memo<E>
where
    E: MemoExpr + Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo")
            .field("groups", &self.groups)
            .field("exprs", &self.exprs)
            .finish()
    }
}

/// A trait that must be implemented by an expression that can be copied into a [`memo`](self::Memo).
pub trait MemoExpr {
    /// Returns the number of child expressions of this expression.
    fn num_children(&self) -> usize;

    /// Returns the group of the i-th child expression of this expression.
    fn get_child(&self, i: usize) -> Option<GroupId>;

    /// Builds a textual representation of this expression.
    /// The textual representation is also used to find identical expressions.
    fn format_expr<F>(&self, f: &mut F)
    where
        F: MemoExprFormatter;
}

/// Uniquely identifies a memo group in a memo.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GroupId(usize);

impl GroupId {
    fn index(&self) -> usize {
        self.0
    }
}

impl Display for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl Debug for GroupId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("GroupId").field(&self.0).finish()
    }
}

/// Uniquely identifies a memo expression in a memo.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct ExprId(usize);

impl ExprId {
    fn index(&self) -> usize {
        self.0
    }
}

impl Display for ExprId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl Debug for ExprId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ExprId").field(&self.0).finish()
    }
}

#[derive(Debug)]
struct MemoGroupData {
    group_id: GroupId,
    exprs: Vec<ExprId>,
}

#[derive(Debug)]
struct MemoExprData<E> {
    expr_id: ExprId,
    group_id: GroupId,
    expr: E,
}

/// A borrowed memo group. A memo group is a group of logically equivalent expressions.
pub struct MemoGroupRef<'a, E>
where
    E: MemoExpr,
{
    memo: &'a Memo<E>,
    data: &'a MemoGroupData,
}

impl<'a, E> MemoGroupRef<'a, E>
where
    E: MemoExpr,
{
    /// Returns an opaque identifier of this memo group.
    pub fn id(&self) -> GroupId {
        self.data.group_id
    }

    /// Returns a reference to the first expression of this memo group.
    pub fn expr(&self) -> &'a E {
        // A group is created with its first expression.
        let first = self.data.exprs[0];
        &self.memo.exprs[first.index()].expr
    }

    /// Returns an iterator over the expressions of this memo group.
    pub fn mexprs(&self) -> impl Iterator<Item = MemoExprRef<'a, E>> + 'a {
        let memo = self.memo;
        self.data.exprs.iter().map(move |id| {
            let data = &memo.exprs[id.index()];
            MemoExprRef {
                id: data.expr_id,
                group_id: data.group_id,
                expr: &data.expr,
            }
        })
    }
}

/// A reference to an expression stored in a memo.
#[derive(Debug)]
pub struct MemoExprRef<'a, E> {
    id: ExprId,
    group_id: GroupId,
    expr: &'a E,
}

impl<'a, E> MemoExprRef<'a, E> {
    /// Returns an opaque identifier of this memo expression.
    pub fn id(&self) -> ExprId {
        self.id
    }

    /// Returns the identifier of the group this expression belongs to.
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Returns a reference to the expression.
    pub fn expr(&self) -> &'a E {
        self.expr
    }
}

/// Provides methods to build a textual representation of an expression.
pub trait MemoExprFormatter {
    /// Writes a name of an expression.
    fn write_name(&mut self, name: &str);

    /// Writes a value of `source` attribute of an expression.
    fn write_source(&mut self, source: &str);

    /// Writes a reference to a child expression.
    fn write_input(&mut self, name: &str, input: &GroupId);

    /// Writes a value of some attribute of an expression.
    fn write_value<D>(&mut self, name: &str, value: D)
    where
        D: Display;

    /// Writes values of some attribute of an expression.
    fn write_values<D>(&mut self, name: &str, values: &[D])
    where
        D: Display;
}

/// [MemoExprFormatter] that writes a textual representation of an expression to a string.
pub struct StringMemoFormatter<'b> {
    buf: &'b mut String,
}

impl<'b> StringMemoFormatter<'b> {
    pub fn new(buf: &'b mut String) -> Self {
        StringMemoFormatter { buf }
    }

    pub fn push(&mut self, c: char) {
        self.buf.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.buf.push_str(s);
    }
}

impl MemoExprFormatter for StringMemoFormatter<'_> {
    fn write_name(&mut self, name: &str) {
        self.buf.push_str(name);
    }

    fn write_source(&mut self, source: &str) {
        self.buf.push(' ');
        self.buf.push_str(source);
    }

    fn write_input(&mut self, name: &str, input: &GroupId) {
        self.write_value(name, input);
    }

    fn write_value<D>(&mut self, name: &str, value: D)
    where
        D: Display,
    {
        self.buf.push(' ');
        if !name.is_empty() {
            self.buf.push_str(name);
            self.buf.push('=');
        }
        self.buf.push_str(value.to_string().as_str());
    }

    fn write_values<D>(&mut self, name: &str, values: &[D])
    where
        D: Display,
    {
        self.buf.push(' ');
        self.buf.push_str(name);
        self.buf.push_str("=[");
        self.push_str(values.iter().join(", ").as_str());
        self.buf.push(']');
    }
}

/// Builds a textual representation of the given memo.
pub fn format_memo<E>(memo: &Memo<E>) -> String
where
    E: MemoExpr,
{
    let mut buf = String::new();
    let mut f = StringMemoFormatter::new(&mut buf);

    for group in memo.groups.iter().rev() {
        f.push_str(format!("{} ", group.group_id).as_str());
        for (i, expr_id) in group.exprs.iter().enumerate() {
            if i > 0 {
                // newline + 3 spaces
                f.push_str("\n   ");
            }
            memo.exprs[expr_id.index()].expr.format_expr(&mut f);
        }
        f.push('\n');
    }

    buf
}

fn make_digest<E>(expr: &E) -> String
where
    E: MemoExpr,
{
    let mut buf = String::new();
    let mut fmt = StringMemoFormatter::new(&mut buf);
    expr.format_expr(&mut fmt);
    buf
}
