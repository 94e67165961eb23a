use std::sync::Arc;

use crate::datatypes::DataType;
use crate::error::OptimizerError;
use crate::memo::{ExprId, GroupId};
use crate::meta::{MutableMetadata, Symbol, TypeProvider};
use crate::operators::relational::logical::{LogicalExpr, LogicalValues};
use crate::operators::scalar::eval::SimpleConstantEvaluator;
use crate::operators::scalar::ScalarExpr;
use crate::operators::ExprMemo;
use crate::session::Session;
use crate::statistics::{
    ComposableStatsCalculator, ConversionRegistry, Lookup, MemoLookup, PlanNodeStatsEstimate, StatsCalculator,
};
use crate::testing::init_logging;

/// Provides a test setup for statistics rules: a memo to build plans in,
/// metadata to allocate columns from and a calculator.
pub struct StatsTester {
    metadata: MutableMetadata,
    memo: ExprMemo,
    session: Session,
    calculator: Box<dyn StatsCalculator>,
}

impl StatsTester {
    /// Creates a tester that uses the built-in rules.
    pub fn new() -> Self {
        let calculator = ComposableStatsCalculator::builder()
            .default_rules(Arc::new(SimpleConstantEvaluator), Arc::new(ConversionRegistry::default()))
            .build();
        StatsTester::with_calculator(calculator)
    }

    pub fn with_calculator<T>(calculator: T) -> Self
    where
        T: StatsCalculator + 'static,
    {
        init_logging();

        StatsTester {
            metadata: MutableMetadata::new(),
            memo: ExprMemo::new(),
            session: Session::default(),
            calculator: Box::new(calculator),
        }
    }

    pub fn with_session(mut self, session: Session) -> Self {
        self.session = session;
        self
    }

    pub fn column(&self, name: &str, data_type: DataType) -> Symbol {
        self.metadata.add_symbol(name, data_type).expect("Failed to add a column")
    }

    pub fn insert(&mut self, expr: LogicalExpr) -> GroupId {
        self.memo.insert_group(expr).expect("Failed to insert an expression")
    }

    pub fn insert_member(&mut self, group_id: GroupId, expr: LogicalExpr) -> ExprId {
        self.memo.insert_group_member(group_id, expr).expect("Failed to add an expression to a group")
    }

    pub fn values(&mut self, columns: Vec<Symbol>, rows: Vec<Vec<ScalarExpr>>) -> GroupId {
        let values = LogicalValues::new(columns, rows).expect("Invalid values");
        self.insert(LogicalExpr::Values(values))
    }

    pub fn memo(&self) -> &ExprMemo {
        &self.memo
    }

    pub fn calculator(&self) -> &dyn StatsCalculator {
        self.calculator.as_ref()
    }

    pub fn types(&self) -> TypeProvider {
        self.metadata.build_metadata().type_provider()
    }

    /// Computes statistics of the given group using a new lookup.
    pub fn stats(&self, group_id: &GroupId) -> Result<PlanNodeStatsEstimate, OptimizerError> {
        let types = self.types();
        let lookup = MemoLookup::new(&self.memo, self.calculator(), &self.session, &types);
        lookup.stats(group_id)
    }

    pub fn expect_stats(&self, group_id: &GroupId, expected: &str) {
        let stats = self.stats(group_id).expect("Failed to compute statistics");
        assert_eq!(format!("{}", stats), expected.trim(), "group: {}", group_id);
    }
}
