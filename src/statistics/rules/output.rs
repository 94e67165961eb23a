use crate::error::OptimizerError;
use crate::meta::TypeProvider;
use crate::operators::relational::logical::LogicalExpr;
use crate::session::Session;
use crate::statistics::{Lookup, PlanNodeStatsEstimate, StatsRule};

/// Statistics of an output node are the statistics of its input restricted to the columns
/// the output node produces, in the order it produces them.
#[derive(Debug)]
pub struct OutputStatsRule;

impl StatsRule for OutputStatsRule {
    fn name(&self) -> &str {
        "OutputStatsRule"
    }

    fn calculate(
        &self,
        expr: &LogicalExpr,
        lookup: &dyn Lookup,
        _session: &Session,
        _types: &TypeProvider,
    ) -> Result<Option<PlanNodeStatsEstimate>, OptimizerError> {
        let output = match expr {
            LogicalExpr::Output(output) => output,
            _ => return Ok(None),
        };
        let input = lookup.stats(&output.input)?;
        // Columns without an estimate in the input have no estimate in the output.
        let symbol_stats = output
            .columns
            .iter()
            .filter_map(|symbol| input.symbol_statistics(symbol).map(|stats| (*symbol, *stats)));

        Ok(Some(PlanNodeStatsEstimate::new(input.output_row_count(), symbol_stats)))
    }
}
