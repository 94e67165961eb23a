//! Estimation of statistics of plan nodes.

use std::fmt::Debug;
use std::sync::Arc;

use log::trace;

use crate::error::OptimizerError;
use crate::meta::TypeProvider;
use crate::operators::relational::logical::LogicalExpr;
use crate::operators::scalar::eval::ConstantExpressionEvaluator;
use crate::session::Session;

pub use domain::{ConversionRegistry, ConversionRegistryBuilder, DomainConverter, ToDoubleFn};
pub use estimate::{PlanNodeStatsEstimate, SymbolStatsEstimate};
pub use lookup::{Lookup, MemoLookup, NoLookup};

pub mod domain;
pub mod estimate;
pub mod lookup;
pub mod rules;

#[cfg(test)]
pub mod testing;

/// Computes statistics of plan nodes of some kind.
pub trait StatsRule: Debug + Send + Sync {
    /// The name of this rule.
    fn name(&self) -> &str;

    /// Computes statistics of the given plan node. Statistics of child nodes are provided by the `lookup`.
    /// `types` must contain types of all output columns of the node.
    ///
    /// Returns `Ok(None)` if this rule does not accept nodes of the given kind.
    fn calculate(
        &self,
        expr: &LogicalExpr,
        lookup: &dyn Lookup,
        session: &Session,
        types: &TypeProvider,
    ) -> Result<Option<PlanNodeStatsEstimate>, OptimizerError>;
}

/// Provides statistics of plan nodes.
pub trait StatsCalculator: Debug + Send + Sync {
    /// Computes statistics of the given plan node.
    ///
    /// Returns `Ok(None)` if there is no information about that node.
    /// Callers must treat it as unknown statistics.
    fn calculate(
        &self,
        expr: &LogicalExpr,
        lookup: &dyn Lookup,
        session: &Session,
        types: &TypeProvider,
    ) -> Result<Option<PlanNodeStatsEstimate>, OptimizerError>;
}

/// [StatsCalculator] that provides no statistics.
#[derive(Debug)]
pub struct NoStatsCalculator;

impl StatsCalculator for NoStatsCalculator {
    fn calculate(
        &self,
        _expr: &LogicalExpr,
        _lookup: &dyn Lookup,
        _session: &Session,
        _types: &TypeProvider,
    ) -> Result<Option<PlanNodeStatsEstimate>, OptimizerError> {
        Ok(None)
    }
}

/// [StatsCalculator] that delegates to a list of [rules](StatsRule).
/// Rules are tried in the order of their registration and the first result is returned.
#[derive(Debug)]
pub struct ComposableStatsCalculator {
    rules: Vec<Box<dyn StatsRule>>,
}

impl ComposableStatsCalculator {
    /// Creates a builder of a calculator without rules.
    pub fn builder() -> ComposableStatsCalculatorBuilder {
        ComposableStatsCalculatorBuilder { rules: Vec::new() }
    }

    /// Returns an iterator over names of the registered rules.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|r| r.name())
    }
}

impl StatsCalculator for ComposableStatsCalculator {
    fn calculate(
        &self,
        expr: &LogicalExpr,
        lookup: &dyn Lookup,
        session: &Session,
        types: &TypeProvider,
    ) -> Result<Option<PlanNodeStatsEstimate>, OptimizerError> {
        for rule in self.rules.iter() {
            if let Some(stats) = rule.calculate(expr, lookup, session, types)? {
                trace!("{}: computed by rule {}", expr.name(), rule.name());
                return Ok(Some(stats));
            }
        }
        trace!("{}: no rule matches", expr.name());
        Ok(None)
    }
}

/// A builder of a [ComposableStatsCalculator].
#[derive(Debug)]
pub struct ComposableStatsCalculatorBuilder {
    rules: Vec<Box<dyn StatsRule>>,
}

impl ComposableStatsCalculatorBuilder {
    /// Adds the given rule.
    pub fn add_rule<R>(mut self, rule: R) -> Self
    where
        R: StatsRule + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds the built-in rules: [values](rules::ValuesStatsRule), [output](rules::OutputStatsRule),
    /// [limit](rules::LimitStatsRule) and [enforce single row](rules::EnforceSingleRowStatsRule).
    pub fn default_rules(
        self,
        evaluator: Arc<dyn ConstantExpressionEvaluator>,
        conversions: Arc<ConversionRegistry>,
    ) -> Self {
        self.add_rule(rules::ValuesStatsRule::new(evaluator, conversions))
            .add_rule(rules::OutputStatsRule)
            .add_rule(rules::LimitStatsRule)
            .add_rule(rules::EnforceSingleRowStatsRule)
    }

    /// Creates a calculator.
    pub fn build(self) -> ComposableStatsCalculator {
        ComposableStatsCalculator { rules: self.rules }
    }
}
