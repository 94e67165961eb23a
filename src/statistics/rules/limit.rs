use crate::error::OptimizerError;
use crate::meta::TypeProvider;
use crate::operators::relational::logical::LogicalExpr;
use crate::session::Session;
use crate::statistics::{Lookup, PlanNodeStatsEstimate, StatsRule};

/// A limit node returns at most `rows` rows of its input. Column statistics are taken from the input.
#[derive(Debug)]
pub struct LimitStatsRule;

impl StatsRule for LimitStatsRule {
    fn name(&self) -> &str {
        "LimitStatsRule"
    }

    fn calculate(
        &self,
        expr: &LogicalExpr,
        lookup: &dyn Lookup,
        _session: &Session,
        _types: &TypeProvider,
    ) -> Result<Option<PlanNodeStatsEstimate>, OptimizerError> {
        let limit = match expr {
            LogicalExpr::Limit(limit) => limit,
            _ => return Ok(None),
        };
        let input = lookup.stats(&limit.input)?;
        let rows = limit.rows as f64;

        // NaN fails the comparison
        if input.output_row_count() <= rows {
            Ok(Some(input))
        } else {
            Ok(Some(input.with_output_row_count(rows)))
        }
    }
}

#[cfg(test)]
mod test {
    use crate::datatypes::DataType;
    use crate::memo::GroupId;
    use crate::operators::relational::logical::{LogicalExpr, LogicalGet, LogicalLimit};
    use crate::operators::scalar::{ScalarExpr, ScalarValue};
    use crate::statistics::testing::StatsTester;

    fn limit(tester: &mut StatsTester, input: GroupId, rows: usize) -> GroupId {
        tester.insert(LogicalExpr::Limit(LogicalLimit { input, rows }))
    }

    fn values_with_three_rows(tester: &mut StatsTester) -> GroupId {
        let a = tester.column("a", DataType::Int32);
        let rows = (1..=3).map(|i| vec![ScalarExpr::literal(ScalarValue::Int32(i))]).collect();
        tester.values(vec![a], rows)
    }

    #[test]
    fn test_limit_greater_than_input() {
        let mut tester = StatsTester::new();
        let values = values_with_three_rows(&mut tester);
        let limit = limit(&mut tester, values, 10);

        assert_eq!(tester.stats(&limit).unwrap(), tester.stats(&values).unwrap());
    }

    #[test]
    fn test_limit_equal_to_input() {
        let mut tester = StatsTester::new();
        let values = values_with_three_rows(&mut tester);
        let limit = limit(&mut tester, values, 3);

        assert_eq!(tester.stats(&limit).unwrap(), tester.stats(&values).unwrap());
    }

    #[test]
    fn test_limit_less_than_input() {
        let mut tester = StatsTester::new();
        let values = values_with_three_rows(&mut tester);
        let limit = limit(&mut tester, values, 1);

        tester.expect_stats(
            &limit,
            r#"
rows=1.0
  col:1 nulls=0.0 low=1.0 high=3.0 ndv=3.0
"#,
        );
    }

    #[test]
    fn test_limit_over_unknown_input() {
        let mut tester = StatsTester::new();
        let a = tester.column("a", DataType::Int32);
        let get = tester.insert(LogicalExpr::Get(LogicalGet {
            source: "A".into(),
            columns: vec![a],
        }));
        let limit = limit(&mut tester, get, 5);

        tester.expect_stats(&limit, "rows=5.0");
    }
}
