use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use storefront_catalog::{
    AttributeGroup, DeletedCombinationSet, VariantEditingSession, generate_combinations,
    reconcile_variants,
};

fn groups(shape: &[usize]) -> Vec<AttributeGroup> {
    shape
        .iter()
        .enumerate()
        .map(|(i, n)| AttributeGroup::new(format!("attr{i}"), (0..*n).map(|v| format!("v{v}"))))
        .collect()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_combinations");

    for shape in [vec![4, 4], vec![5, 5, 4], vec![5, 5, 5, 4]] {
        let input = groups(&shape);
        let total: usize = shape.iter().product();
        group.throughput(Throughput::Elements(total as u64));
        group.bench_with_input(BenchmarkId::from_parameter(total), &input, |b, input| {
            b.iter(|| generate_combinations(black_box(input)))
        });
    }

    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile_after_added_value");

    for shape in [vec![5, 5, 4], vec![5, 5, 5, 4]] {
        let before = groups(&shape);
        let deleted = DeletedCombinationSet::new();
        let current = reconcile_variants(&generate_combinations(&before), &[], &deleted);

        let mut after = before.clone();
        after[0] = AttributeGroup::new(
            before[0].name(),
            before[0].values().iter().cloned().chain(["extra".to_string()]),
        );
        let generated = generate_combinations(&after);

        group.bench_with_input(
            BenchmarkId::from_parameter(generated.len()),
            &(generated, current),
            |b, (generated, current)| {
                b.iter(|| reconcile_variants(black_box(generated), black_box(current), &deleted))
            },
        );
    }

    group.finish();
}

fn bench_session_edit(c: &mut Criterion) {
    c.bench_function("session_add_value", |b| {
        b.iter_batched(
            || {
                let mut session = VariantEditingSession::new(600);
                for g in groups(&[5, 5, 4]) {
                    let _ = session.add_group(g);
                }
                let _ = session.add_group(AttributeGroup::named("Finish"));
                session
            },
            |mut session| {
                let _ = session.add_value(3, "Matte");
                session
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_generate, bench_reconcile, bench_session_edit);
criterion_main!(benches);
