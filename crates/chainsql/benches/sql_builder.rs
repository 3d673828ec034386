use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use chainsql::{PlaceholderFormat, SelectBuilder, eq, expr, qb};

/// Build a select with `n` columns and `n` predicates:
/// SELECT col0, col1, ... FROM t WHERE col0 = ? AND col1 = ? ...
fn build_select(n: usize) -> SelectBuilder {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let columns: Vec<&str> = columns.iter().map(String::as_str).collect();
    let mut sb = qb::select(&columns).from("t");
    for i in 0..n {
        sb = sb.where_(eq().add(format!("col{i}"), i as i64));
    }
    sb.placeholder_format(PlaceholderFormat::Dollar)
}

fn bench_to_sql(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/to_sql");

    for n in [1, 5, 10, 50, 100] {
        let sb = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &sb, |b, sb| {
            b.iter(|| black_box(sb.to_sql()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/build_and_render");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).to_sql()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/in_list");

    for n in [5, 20, 100, 500] {
        let values: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let sb = qb::select(&["*"])
                    .from("t")
                    .where_(eq().add("id", values.clone()))
                    .placeholder_format(PlaceholderFormat::Dollar);
                black_box(sb.to_sql())
            });
        });
    }

    group.finish();
}

fn bench_nested_subqueries(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/nested_subqueries");

    for depth in [1, 4, 16] {
        let mut inner = qb::select(&["id"]).from("t").where_(expr("a = ?", [0]));
        for level in 1..depth {
            inner = qb::select(&["id"])
                .from_select(inner, &format!("s{level}"))
                .where_(expr("a = ?", [level]));
        }
        let sb = inner.placeholder_format(PlaceholderFormat::AtP);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &sb, |b, sb| {
            b.iter(|| black_box(sb.to_sql()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_to_sql,
    bench_build_and_render,
    bench_in_list,
    bench_nested_subqueries
);
criterion_main!(benches);
