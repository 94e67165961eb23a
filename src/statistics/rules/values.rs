use std::sync::Arc;

use itertools::{Itertools, MinMaxResult};

use crate::datatypes::DataType;
use crate::error::{InternalError, OptimizerError};
use crate::meta::TypeProvider;
use crate::operators::relational::logical::{LogicalExpr, LogicalValues};
use crate::operators::scalar::eval::ConstantExpressionEvaluator;
use crate::operators::scalar::ScalarValue;
use crate::session::Session;
use crate::statistics::{
    ConversionRegistry, DomainConverter, Lookup, PlanNodeStatsEstimate, StatsRule, SymbolStatsEstimate,
};

/// Computes statistics of a values node. Values of all rows are known so the row count is exact.
///
/// For every column:
/// * a column without non-`NULL` values has `NaN` bounds and no distinct values.
/// Its nulls fraction is `0.0` when there are no rows and `1.0` otherwise.
/// * otherwise bounds are the smallest and the largest values projected to the numeric domain
/// (`-inf` and `+inf` when no value has a projection, `NaN` when some value is projected to `NaN`)
/// and the number of distinct values is the number of distinct non-`NULL` values.
///
/// Values of columns of the unknown type are `NULL`s.
#[derive(Debug)]
pub struct ValuesStatsRule {
    evaluator: Arc<dyn ConstantExpressionEvaluator>,
    conversions: Arc<ConversionRegistry>,
}

impl ValuesStatsRule {
    /// Creates a rule that evaluates values with the given `evaluator` and projects them to the numeric domain
    /// using the given `conversions`.
    pub fn new(evaluator: Arc<dyn ConstantExpressionEvaluator>, conversions: Arc<ConversionRegistry>) -> Self {
        ValuesStatsRule {
            evaluator,
            conversions,
        }
    }

    fn column_values(
        &self,
        values: &LogicalValues,
        column_index: usize,
        data_type: &DataType,
        session: &Session,
    ) -> Result<Vec<ScalarValue>, OptimizerError> {
        if let DataType::Unknown = data_type {
            return Ok(vec![ScalarValue::Null; values.num_rows()]);
        }

        values
            .column_values(column_index)
            .enumerate()
            .map(|(row, expr)| {
                self.evaluator.evaluate(expr, data_type, session).map_err(|err| {
                    let message = format!("ValuesStatsRule: Unable to evaluate row #{} column #{}", row, column_index);
                    OptimizerError::Internal(InternalError::with_cause(message, err))
                })
            })
            .collect()
    }
}

impl StatsRule for ValuesStatsRule {
    fn name(&self) -> &str {
        "ValuesStatsRule"
    }

    fn calculate(
        &self,
        expr: &LogicalExpr,
        _lookup: &dyn Lookup,
        session: &Session,
        types: &TypeProvider,
    ) -> Result<Option<PlanNodeStatsEstimate>, OptimizerError> {
        let values = match expr {
            LogicalExpr::Values(values) => values,
            _ => return Ok(None),
        };

        let mut symbol_stats = Vec::with_capacity(values.columns().len());
        for (i, symbol) in values.columns().iter().enumerate() {
            let data_type = types.get(symbol)?;
            let column_values = self.column_values(values, i, data_type, session)?;
            let converter = DomainConverter::new(*data_type, &self.conversions, session);

            symbol_stats.push((*symbol, build_symbol_stats(&column_values, &converter)));
        }

        Ok(Some(PlanNodeStatsEstimate::new(values.num_rows() as f64, symbol_stats)))
    }
}

fn build_symbol_stats(values: &[ScalarValue], converter: &DomainConverter) -> SymbolStatsEstimate {
    let non_null: Vec<&ScalarValue> = values.iter().filter(|v| !v.is_null()).collect();

    if non_null.is_empty() {
        let nulls_fraction = if values.is_empty() { 0f64 } else { 1f64 };
        return SymbolStatsEstimate::new(nulls_fraction, f64::NAN, f64::NAN, 0f64);
    }

    let total = values.len() as f64;
    let nulls_fraction = (total - non_null.len() as f64) / total;

    let doubles: Vec<f64> = non_null.iter().filter_map(|v| converter.translate_to_double(v)).collect();
    let (low_value, high_value) = if doubles.iter().any(|v| v.is_nan()) {
        // A NaN projection makes both bounds unknown.
        (f64::NAN, f64::NAN)
    } else {
        match doubles.into_iter().minmax_by(|l, r| l.total_cmp(r)) {
            MinMaxResult::NoElements => (f64::NEG_INFINITY, f64::INFINITY),
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(low, high) => (low, high),
        }
    };

    // Compare values not their projections: different values can have the same projection.
    let distinct_values_count = non_null.iter().unique().count() as f64;

    SymbolStatsEstimate::new(nulls_fraction, low_value, high_value, distinct_values_count)
}
