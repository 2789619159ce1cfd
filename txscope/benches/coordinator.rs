//! Benchmarks for scope begin/end overhead.

use criterion::{criterion_group, criterion_main, Criterion};

use txscope::{MemoryDriver, Outcome, Propagation, TransactionCoordinator, TransactionDefinition};

fn bench_empty_transaction(c: &mut Criterion) {
    let mut coordinator = TransactionCoordinator::new(MemoryDriver::new());
    let definition = TransactionDefinition::required();

    c.bench_function("begin_commit_empty", |b| {
        b.iter(|| {
            let mut ctx = coordinator.begin(&definition).expect("failed to begin");
            coordinator.end(&mut ctx, Outcome::Success).expect("failed to end");
        });
    });
}

fn bench_joined_scopes(c: &mut Criterion) {
    let mut coordinator = TransactionCoordinator::new(MemoryDriver::new());
    let definition = TransactionDefinition::required();

    c.bench_function("begin_commit_three_joined", |b| {
        b.iter(|| {
            let mut outer = coordinator.begin(&definition).expect("failed to begin");
            let mut mid = coordinator.begin(&definition).expect("failed to join");
            let mut inner = coordinator.begin(&definition).expect("failed to join");
            coordinator.end(&mut inner, Outcome::Success).expect("failed to end");
            coordinator.end(&mut mid, Outcome::Success).expect("failed to end");
            coordinator.end(&mut outer, Outcome::Success).expect("failed to end");
        });
    });
}

fn bench_savepoint_scope(c: &mut Criterion) {
    let mut coordinator = TransactionCoordinator::new(MemoryDriver::new());
    let required = TransactionDefinition::required();
    let nested = TransactionDefinition::new(Propagation::Nested);

    c.bench_function("begin_commit_nested_savepoint", |b| {
        b.iter(|| {
            let mut outer = coordinator.begin(&required).expect("failed to begin");
            let mut inner = coordinator.begin(&nested).expect("failed to begin nested");
            coordinator.end(&mut inner, Outcome::Success).expect("failed to end");
            coordinator.end(&mut outer, Outcome::Success).expect("failed to end");
        });
    });
}

criterion_group!(benches, bench_empty_transaction, bench_joined_scopes, bench_savepoint_scope);
criterion_main!(benches);
