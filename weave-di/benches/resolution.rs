//! Service resolution benchmarks per scope

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use weave_di::prelude::*;
use weave_di::AtomicContainer;

/// A chain `svc-0 -> svc-1 -> ... -> svc-{depth-1}` where every entry has `scope`
fn chain(scope: Scope, depth: usize) -> Container {
    let container = Container::new();
    for i in 0..depth {
        let next = (i + 1 < depth).then(|| format!("svc-{}", i + 1));
        container.override_service(
            &format!("svc-{}", i),
            ServiceDefinition::new(scope, move |c| match &next {
                Some(next) => Ok(instance(vec![c.get(next)?])),
                None => Ok(instance(i)),
            }),
        );
    }
    container
}

fn bench_scopes(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_chain");

    for scope in [Scope::Shared, Scope::NestedShared, Scope::NonShared] {
        for depth in [1, 8, 32] {
            let container = chain(scope, depth);
            group.bench_with_input(
                BenchmarkId::new(scope.to_string(), depth),
                &container,
                |b, container| b.iter(|| black_box(container.get("svc-0").unwrap())),
            );
        }
    }

    group.finish();
}

fn bench_decorated(c: &mut Criterion) {
    let container = chain(Scope::NonShared, 8);
    for _ in 0..4 {
        container.register_decorator(|_, _, service| Ok(service));
    }

    c.bench_function("resolve_decorated_non_shared", |b| {
        b.iter(|| black_box(container.get("svc-0").unwrap()))
    });
}

fn bench_atomic(c: &mut Criterion) {
    let container = AtomicContainer::new(chain(Scope::Shared, 8));

    c.bench_function("resolve_atomic_shared", |b| {
        b.iter(|| black_box(container.get("svc-0").unwrap()))
    });
}

criterion_group!(benches, bench_scopes, bench_decorated, bench_atomic);
criterion_main!(benches);
