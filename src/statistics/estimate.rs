use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use triomphe::Arc;

use crate::meta::Symbol;

/// Statistical summary of a single output column of a plan node.
///
/// `NaN` in any field means that the value is not known. Two estimates are equal
/// when every field is equal or both fields are `NaN`.
#[derive(Debug, Clone, Copy)]
pub struct SymbolStatsEstimate {
    nulls_fraction: f64,
    low_value: f64,
    high_value: f64,
    distinct_values_count: f64,
    average_row_size: Option<f64>,
}

impl SymbolStatsEstimate {
    /// Creates a new estimate.
    ///
    /// # Panics
    ///
    /// This method panics if `nulls_fraction` lies outside of `[0.0, 1.0]` bounds, `distinct_values_count` is
    /// negative or `low_value` is greater than `high_value`. `NaN` is accepted everywhere.
    pub fn new(nulls_fraction: f64, low_value: f64, high_value: f64, distinct_values_count: f64) -> Self {
        assert!(
            nulls_fraction.is_nan() || (0f64..=1f64).contains(&nulls_fraction),
            "nulls_fraction must be within [0.0, 1.0] range but got: {}",
            nulls_fraction
        );
        assert!(
            distinct_values_count.is_nan() || distinct_values_count >= 0f64,
            "distinct_values_count must be non negative but got: {}",
            distinct_values_count
        );
        assert!(
            low_value.is_nan() || high_value.is_nan() || low_value <= high_value,
            "low_value must not be greater than high_value. low: {} high: {}",
            low_value,
            high_value
        );
        SymbolStatsEstimate {
            nulls_fraction,
            low_value,
            high_value,
            distinct_values_count,
            average_row_size: None,
        }
    }

    /// An estimate where nothing is known.
    pub fn unknown() -> Self {
        SymbolStatsEstimate::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    }

    /// Returns a copy of this estimate with the average size of a value set to the given value.
    ///
    /// # Panics
    ///
    /// This method panics if `average_row_size` is negative.
    pub fn with_average_row_size(self, average_row_size: f64) -> Self {
        assert!(
            average_row_size.is_nan() || average_row_size >= 0f64,
            "average_row_size must be non negative but got: {}",
            average_row_size
        );
        SymbolStatsEstimate {
            average_row_size: Some(average_row_size),
            ..self
        }
    }

    /// The fraction of `NULL` values.
    pub fn nulls_fraction(&self) -> f64 {
        self.nulls_fraction
    }

    /// The fraction of non-`NULL` values.
    pub fn values_fraction(&self) -> f64 {
        1f64 - self.nulls_fraction
    }

    /// The lower bound of values projected to the numeric domain. `-inf` when no value has a numeric projection.
    pub fn low_value(&self) -> f64 {
        self.low_value
    }

    /// The upper bound of values projected to the numeric domain. `+inf` when no value has a numeric projection.
    pub fn high_value(&self) -> f64 {
        self.high_value
    }

    /// The number of distinct non-`NULL` values.
    pub fn distinct_values_count(&self) -> f64 {
        self.distinct_values_count
    }

    /// The average size of a value in bytes, if known.
    pub fn average_row_size(&self) -> Option<f64> {
        self.average_row_size
    }

    /// Returns `true` if nothing is known about the column.
    pub fn is_unknown(&self) -> bool {
        self.nulls_fraction.is_nan()
            && self.low_value.is_nan()
            && self.high_value.is_nan()
            && self.distinct_values_count.is_nan()
            && self.average_row_size.map(f64::is_nan).unwrap_or(true)
    }

    /// Returns `true` if the column contains exactly one distinct non-`NULL` value.
    pub fn is_single_value(&self) -> bool {
        self.distinct_values_count == 1f64 && self.low_value == self.high_value
    }
}

impl PartialEq for SymbolStatsEstimate {
    fn eq(&self, other: &Self) -> bool {
        let size_eq = match (self.average_row_size, other.average_row_size) {
            (Some(l), Some(r)) => same_value(l, r),
            (None, None) => true,
            _ => false,
        };
        size_eq
            && same_value(self.nulls_fraction, other.nulls_fraction)
            && same_value(self.low_value, other.low_value)
            && same_value(self.high_value, other.high_value)
            && same_value(self.distinct_values_count, other.distinct_values_count)
    }
}

impl Display for SymbolStatsEstimate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "nulls={:?} low={:?} high={:?} ndv={:?}",
            self.nulls_fraction, self.low_value, self.high_value, self.distinct_values_count
        )?;
        if let Some(size) = self.average_row_size {
            write!(f, " avg_size={:?}", size)?;
        }
        Ok(())
    }
}

/// Statistics of a plan node: the number of output rows and an estimate for every output column.
///
/// Cloning is cheap: column estimates are shared between the copies.
#[derive(Debug, Clone)]
pub struct PlanNodeStatsEstimate {
    output_row_count: f64,
    symbols: Arc<SymbolStats>,
}

#[derive(Debug)]
struct SymbolStats {
    order: Vec<Symbol>,
    estimates: HashMap<Symbol, SymbolStatsEstimate>,
}

impl PlanNodeStatsEstimate {
    /// Creates a new estimate. Column estimates are kept in the given order.
    ///
    /// # Panics
    ///
    /// This method panics if `output_row_count` is negative or if a symbol appears more than once.
    pub fn new<I>(output_row_count: f64, symbol_stats: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, SymbolStatsEstimate)>,
    {
        assert!(
            output_row_count.is_nan() || output_row_count >= 0f64,
            "output_row_count must be non negative but got: {}",
            output_row_count
        );

        let iter = symbol_stats.into_iter();
        let (lower, _) = iter.size_hint();
        let mut order = Vec::with_capacity(lower);
        let mut estimates = HashMap::with_capacity(lower);

        for (symbol, estimate) in iter {
            let existing = estimates.insert(symbol, estimate);
            assert!(existing.is_none(), "Duplicate symbol: {}", symbol);
            order.push(symbol);
        }

        PlanNodeStatsEstimate {
            output_row_count,
            symbols: Arc::new(SymbolStats { order, estimates }),
        }
    }

    /// An estimate where nothing is known: unknown row count and no column estimates.
    pub fn unknown() -> Self {
        PlanNodeStatsEstimate::new(f64::NAN, Vec::new())
    }

    /// The number of output rows. `NaN` if not known.
    pub fn output_row_count(&self) -> f64 {
        self.output_row_count
    }

    /// Returns `true` if the number of output rows is not known.
    pub fn is_output_row_count_unknown(&self) -> bool {
        self.output_row_count.is_nan()
    }

    /// Returns a copy of this estimate with the number of output rows set to the given value.
    /// Column estimates are kept as is.
    ///
    /// # Panics
    ///
    /// This method panics if `output_row_count` is negative.
    pub fn with_output_row_count(&self, output_row_count: f64) -> Self {
        assert!(
            output_row_count.is_nan() || output_row_count >= 0f64,
            "output_row_count must be non negative but got: {}",
            output_row_count
        );
        PlanNodeStatsEstimate {
            output_row_count,
            symbols: self.symbols.clone(),
        }
    }

    /// Returns the estimate of the given column.
    pub fn symbol_statistics(&self, symbol: &Symbol) -> Option<&SymbolStatsEstimate> {
        self.symbols.estimates.get(symbol)
    }

    /// Returns an iterator over the columns that have estimates, in order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.order.iter()
    }

    /// Returns an iterator over the column estimates, in order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &SymbolStatsEstimate)> {
        let estimates = &self.symbols.estimates;
        // Every symbol from `order` has an estimate.
        self.symbols.order.iter().filter_map(move |s| estimates.get(s).map(|e| (s, e)))
    }

    /// Returns the number of column estimates.
    pub fn num_symbols(&self) -> usize {
        self.symbols.order.len()
    }
}

impl PartialEq for PlanNodeStatsEstimate {
    fn eq(&self, other: &Self) -> bool {
        same_value(self.output_row_count, other.output_row_count) && self.iter().eq(other.iter())
    }
}

impl Display for PlanNodeStatsEstimate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "rows={:?}", self.output_row_count)?;
        for (symbol, estimate) in self.iter() {
            write!(f, "\n  {} {}", symbol, estimate)?;
        }
        Ok(())
    }
}

fn same_value(l: f64, r: f64) -> bool {
    l == r || (l.is_nan() && r.is_nan())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_symbol_stats() {
        let stats = SymbolStatsEstimate::new(0.25, 1.0, 5.0, 3.0);
        assert_eq!(stats.nulls_fraction(), 0.25);
        assert_eq!(stats.values_fraction(), 0.75);
        assert_eq!(stats.average_row_size(), None);
        assert!(!stats.is_unknown());
        assert!(!stats.is_single_value());

        let stats = stats.with_average_row_size(8.0);
        assert_eq!(stats.average_row_size(), Some(8.0));
        assert_eq!(format!("{}", stats), "nulls=0.25 low=1.0 high=5.0 ndv=3.0 avg_size=8.0");
    }

    #[test]
    fn test_single_value() {
        assert!(SymbolStatsEstimate::new(0.5, 2.0, 2.0, 1.0).is_single_value());
        assert!(!SymbolStatsEstimate::new(0.5, f64::NEG_INFINITY, f64::INFINITY, 1.0).is_single_value());
    }

    #[test]
    fn test_unknown_symbol_stats() {
        let stats = SymbolStatsEstimate::unknown();
        assert!(stats.is_unknown());
        assert_eq!(stats, SymbolStatsEstimate::unknown(), "NaN fields are equal");
        assert_eq!(format!("{}", stats), "nulls=NaN low=NaN high=NaN ndv=NaN");
    }

    #[test]
    fn test_infinite_bounds() {
        let stats = SymbolStatsEstimate::new(0.0, f64::NEG_INFINITY, f64::INFINITY, 2.0);
        assert_eq!(format!("{}", stats), "nulls=0.0 low=-inf high=inf ndv=2.0");
    }

    #[test]
    #[should_panic(expected = "nulls_fraction must be within [0.0, 1.0] range")]
    fn test_reject_invalid_nulls_fraction() {
        SymbolStatsEstimate::new(1.5, 0.0, 1.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "low_value must not be greater than high_value")]
    fn test_reject_invalid_range() {
        SymbolStatsEstimate::new(0.0, 2.0, 1.0, 1.0);
    }

    #[test]
    #[should_panic(expected = "distinct_values_count must be non negative")]
    fn test_reject_negative_distinct_values_count() {
        SymbolStatsEstimate::new(0.0, 1.0, 1.0, -1.0);
    }

    #[test]
    fn test_plan_node_stats() {
        let a = Symbol::new(2);
        let b = Symbol::new(1);
        let a_stats = SymbolStatsEstimate::new(0.0, 1.0, 2.0, 2.0);
        let b_stats = SymbolStatsEstimate::new(1.0, f64::NAN, f64::NAN, 0.0);

        let stats = PlanNodeStatsEstimate::new(3.0, vec![(a, a_stats), (b, b_stats)]);
        assert_eq!(stats.output_row_count(), 3.0);
        assert_eq!(stats.num_symbols(), 2);
        assert_eq!(stats.symbols().copied().collect::<Vec<_>>(), vec![a, b], "insertion order");
        assert_eq!(stats.symbol_statistics(&a), Some(&a_stats));
        assert_eq!(stats.symbol_statistics(&Symbol::new(3)), None);

        let expected = r#"
rows=3.0
  col:2 nulls=0.0 low=1.0 high=2.0 ndv=2.0
  col:1 nulls=1.0 low=NaN high=NaN ndv=0.0"#;
        assert_eq!(format!("{}", stats), expected.trim());
    }

    #[test]
    fn test_with_output_row_count() {
        let a = Symbol::new(1);
        let stats = PlanNodeStatsEstimate::new(10.0, vec![(a, SymbolStatsEstimate::new(0.0, 1.0, 2.0, 2.0))]);
        let limited = stats.with_output_row_count(1.0);

        assert_eq!(limited.output_row_count(), 1.0);
        assert_eq!(limited.symbol_statistics(&a), stats.symbol_statistics(&a));
        assert_ne!(limited, stats);
        assert_eq!(limited.with_output_row_count(10.0), stats);
    }

    #[test]
    fn test_unknown_plan_node_stats() {
        let stats = PlanNodeStatsEstimate::unknown();
        assert!(stats.is_output_row_count_unknown());
        assert_eq!(stats.num_symbols(), 0);
        assert_eq!(stats, PlanNodeStatsEstimate::unknown());
        assert_eq!(format!("{}", stats), "rows=NaN");
    }

    #[test]
    #[should_panic(expected = "Duplicate symbol: col:1")]
    fn test_reject_duplicate_symbols() {
        let a = Symbol::new(1);
        let stats = SymbolStatsEstimate::unknown();
        PlanNodeStatsEstimate::new(1.0, vec![(a, stats), (a, stats)]);
    }
}
