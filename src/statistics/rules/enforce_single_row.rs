use crate::error::OptimizerError;
use crate::meta::TypeProvider;
use crate::operators::relational::logical::LogicalExpr;
use crate::session::Session;
use crate::statistics::{Lookup, PlanNodeStatsEstimate, StatsRule};

/// An enforce single row node returns exactly one row. Column statistics are taken from its input.
#[derive(Debug)]
pub struct EnforceSingleRowStatsRule;

impl StatsRule for EnforceSingleRowStatsRule {
    fn name(&self) -> &str {
        "EnforceSingleRowStatsRule"
    }

    fn calculate(
        &self,
        expr: &LogicalExpr,
        lookup: &dyn Lookup,
        _session: &Session,
        _types: &TypeProvider,
    ) -> Result<Option<PlanNodeStatsEstimate>, OptimizerError> {
        match expr {
            LogicalExpr::EnforceSingleRow(enforce) => {
                let input = lookup.stats(&enforce.input)?;
                Ok(Some(input.with_output_row_count(1.0)))
            }
            _ => Ok(None),
        }
    }
}
