use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use log::trace;

use crate::error::OptimizerError;
use crate::memo::GroupId;
use crate::meta::TypeProvider;
use crate::operators::relational::logical::LogicalExpr;
use crate::operators::ExprMemo;
use crate::session::Session;
use crate::statistics::{PlanNodeStatsEstimate, StatsCalculator};

/// Provides access to plan nodes referenced by other plan nodes and to their statistics.
pub trait Lookup {
    /// Returns the representative plan node of the given group.
    fn resolve(&self, group_id: &GroupId) -> Result<&LogicalExpr, OptimizerError>;

    /// Returns statistics of the given group.
    /// When no statistics are available returns [unknown](PlanNodeStatsEstimate::unknown) statistics.
    fn stats(&self, group_id: &GroupId) -> Result<PlanNodeStatsEstimate, OptimizerError>;
}

/// [Lookup] that can not resolve anything. Can be used to compute statistics of leaf nodes.
#[derive(Debug)]
pub struct NoLookup;

impl Lookup for NoLookup {
    fn resolve(&self, group_id: &GroupId) -> Result<&LogicalExpr, OptimizerError> {
        Err(OptimizerError::unsupported(format!("NoLookup: Unable to resolve group {}", group_id)))
    }

    fn stats(&self, group_id: &GroupId) -> Result<PlanNodeStatsEstimate, OptimizerError> {
        Err(OptimizerError::unsupported(format!("NoLookup: No statistics for group {}", group_id)))
    }
}

/// [Lookup] that computes statistics of memo groups using a [StatsCalculator].
///
/// Statistics of a group are computed from its first expression at most once and then
/// cached for the lifetime of the lookup. A lookup must not outlive a single optimization pass.
#[derive(Debug)]
pub struct MemoLookup<'a> {
    memo: &'a ExprMemo,
    calculator: &'a dyn StatsCalculator,
    session: &'a Session,
    types: &'a TypeProvider,
    cache: RefCell<HashMap<GroupId, PlanNodeStatsEstimate>>,
    in_progress: RefCell<HashSet<GroupId>>,
}

impl<'a> MemoLookup<'a> {
    /// Creates a new lookup with an empty cache.
    pub fn new(
        memo: &'a ExprMemo,
        calculator: &'a dyn StatsCalculator,
        session: &'a Session,
        types: &'a TypeProvider,
    ) -> Self {
        MemoLookup {
            memo,
            calculator,
            session,
            types,
            cache: RefCell::new(HashMap::new()),
            in_progress: RefCell::new(HashSet::new()),
        }
    }

    /// Returns the number of groups which statistics have been computed.
    pub fn num_cached(&self) -> usize {
        self.cache.borrow().len()
    }

    fn compute_stats(&self, group_id: &GroupId) -> Result<PlanNodeStatsEstimate, OptimizerError> {
        let group = self.memo.get_group(group_id)?;
        let expr = group.expr();
        let stats = self.calculator.calculate(expr, self, self.session, self.types)?;

        Ok(stats.unwrap_or_else(PlanNodeStatsEstimate::unknown))
    }
}

impl Lookup for MemoLookup<'_> {
    fn resolve(&self, group_id: &GroupId) -> Result<&LogicalExpr, OptimizerError> {
        let group = self.memo.get_group(group_id)?;
        Ok(group.expr())
    }

    fn stats(&self, group_id: &GroupId) -> Result<PlanNodeStatsEstimate, OptimizerError> {
        let cached = self.cache.borrow().get(group_id).cloned();
        if let Some(stats) = cached {
            trace!("Group {}: cached statistics", group_id);
            return Ok(stats);
        }

        if !self.in_progress.borrow_mut().insert(*group_id) {
            let message = format!("Group {}: cycle detected while computing statistics", group_id);
            return Err(OptimizerError::internal(message));
        }

        trace!("Group {}: computing statistics", group_id);
        let result = self.compute_stats(group_id);
        self.in_progress.borrow_mut().remove(group_id);

        let stats = result?;
        self.cache.borrow_mut().insert(*group_id, stats.clone());
        Ok(stats)
    }
}
