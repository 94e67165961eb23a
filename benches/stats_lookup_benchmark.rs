use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keenwa_stats::datatypes::DataType;
use keenwa_stats::memo::GroupId;
use keenwa_stats::meta::{MutableMetadata, Symbol};
use keenwa_stats::operators::relational::logical::{LogicalEnforceSingleRow, LogicalExpr, LogicalLimit, LogicalValues};
use keenwa_stats::operators::scalar::eval::SimpleConstantEvaluator;
use keenwa_stats::operators::scalar::{ScalarExpr, ScalarValue};
use keenwa_stats::operators::ExprMemo;
use keenwa_stats::session::Session;
use keenwa_stats::statistics::{ComposableStatsCalculator, ConversionRegistry, Lookup, MemoLookup};

fn values(columns: &[Symbol], num_rows: i64) -> LogicalExpr {
    let rows = (0..num_rows)
        .map(|r| {
            columns
                .iter()
                .enumerate()
                .map(|(c, _)| match c {
                    0 => ScalarExpr::literal(ScalarValue::Int64(r % 17)),
                    1 => ScalarExpr::literal(ScalarValue::from(r as f64 / 3.0)),
                    _ => ScalarExpr::literal(ScalarValue::String(format!("s{}", r % 5))),
                })
                .collect()
        })
        .collect();
    LogicalExpr::Values(LogicalValues::new(columns.to_vec(), rows).unwrap())
}

/// Builds a chain of limits where every limit has an alternative. All alternatives reference the same input.
fn shared_plan(memo: &mut ExprMemo, input: GroupId, depth: usize) -> GroupId {
    let mut top = input;
    for i in 0..depth {
        let limit = memo.insert_group(LogicalExpr::Limit(LogicalLimit { input: top, rows: 1000 - i })).unwrap();
        memo.insert_group_member(limit, LogicalExpr::EnforceSingleRow(LogicalEnforceSingleRow { input: top }))
            .unwrap();
        top = limit;
    }
    top
}

fn stats_lookup_bench(c: &mut Criterion) {
    let metadata = MutableMetadata::new();
    let columns = vec![
        metadata.add_symbol("a", DataType::Int64).unwrap(),
        metadata.add_symbol("b", DataType::Float64).unwrap(),
        metadata.add_symbol("c", DataType::String).unwrap(),
    ];
    let types = metadata.build_metadata().type_provider();
    let session = Session::default();
    let calculator = ComposableStatsCalculator::builder()
        .default_rules(Arc::new(SimpleConstantEvaluator), Arc::new(ConversionRegistry::default()))
        .build();

    let mut memo = ExprMemo::new();
    let input = memo.insert_group(values(&columns, 100)).unwrap();
    let top = shared_plan(&mut memo, input, 50);

    c.bench_function("stats_values_100_rows", |b| {
        b.iter(|| {
            let lookup = MemoLookup::new(&memo, &calculator, &session, &types);
            black_box(lookup.stats(&input).unwrap());
        });
    });

    c.bench_function("stats_shared_plan_depth_50", |b| {
        b.iter(|| {
            let lookup = MemoLookup::new(&memo, &calculator, &session, &types);
            black_box(lookup.stats(&top).unwrap());
        });
    });
}

criterion_group!(benches, stats_lookup_bench,);

criterion_main!(benches);
