use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use recordq::adapter::placeholder;
use recordq::{Query, Value};

/// SELECT with `n` AND-ed conditions spread over `n / 5 + 1` OR groups.
fn build_select(n: usize) -> Query {
    let mut query = Query::table("wp_posts").select(["ID", "post_title"]);
    for i in 0..n {
        let condition = (format!("col{i}"), i as i64);
        query = if i % 5 == 0 && i > 0 {
            query.or_where(condition)
        } else {
            query.filter(condition)
        };
    }
    query.order_by("post_date", "desc").limit(10)
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/prepare");

    for n in [1, 5, 10, 50, 100] {
        let query = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &query, |b, query| {
            b.iter(|| black_box(query.prepare()));
        });
    }

    group.finish();
}

fn bench_build_and_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/build_and_prepare");

    for n in [1, 5, 10, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).prepare()));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/in_list");

    for n in [5, 20, 100, 500] {
        let ids: Vec<i64> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &ids, |b, ids| {
            b.iter(|| {
                let query = Query::table("wp_posts").filter(("ID", "in", ids.clone()));
                black_box(query.prepare())
            });
        });
    }

    group.finish();
}

fn bench_bind(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_builder/bind");

    for n in [1, 10, 100] {
        let prep = build_select(n)
            .prepare()
            .unwrap_or_else(|e| panic!("benchmark query failed to prepare: {e}"));
        group.bench_with_input(BenchmarkId::from_parameter(n), &prep, |b, prep| {
            b.iter(|| black_box(placeholder::bind(&prep.sql, &prep.args)));
        });
    }

    let text: Vec<Value> = (0..20).map(|i| Value::from(format!("it's #{i}"))).collect();
    let template = vec!["%s"; text.len()].join(", ");
    group.bench_function("escaped_text", |b| {
        b.iter(|| black_box(placeholder::bind(&template, &text)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_prepare,
    bench_build_and_prepare,
    bench_in_list,
    bench_bind
);
criterion_main!(benches);
