use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;

use tincache::store::{KeyValueStore, MemoryStore};
use tincache::{CacheConfig, Cached, Component, Hook};

fn store_set_benchmark(c: &mut Criterion) {
    let store = MemoryStore::isolated();

    c.bench_function("memory_store_set", |b| {
        let mut i = 0;
        b.iter(|| {
            store.set("bench", json!(black_box(i)), Some(5.0));
            i += 1;
        });
    });
}

fn store_get_benchmark(c: &mut Criterion) {
    let store = MemoryStore::isolated();
    store.set("bench", json!({ "count": 42 }), None);

    c.bench_function("memory_store_get", |b| {
        b.iter(|| {
            black_box(store.get("bench"));
        });
    });
}

fn cached_render_benchmark(c: &mut Criterion) {
    let store = Arc::new(MemoryStore::isolated());
    let hook = Cached::configure(store, CacheConfig::new("render"))
        .unwrap()
        .wrap(Hook::State);
    let component = Component::new();

    c.bench_function("cached_render_unchanged", |b| {
        b.iter(|| {
            let (value, _, _) = component.render(|| hook.use_state(black_box(0u64))).unwrap();
            black_box(value);
        });
    });
}

fn cached_update_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_update");

    for hooks in [1usize, 10, 100].iter() {
        let store = Arc::new(MemoryStore::isolated());
        let wrapped: Vec<_> = (0..*hooks)
            .map(|i| {
                Cached::configure(store.clone(), CacheConfig::new(format!("slot-{i}")))
                    .unwrap()
                    .wrap(Hook::State)
            })
            .collect();
        let component = Component::new();
        let setters: Vec<_> = component.render(|| {
            wrapped
                .iter()
                .map(|hook| hook.use_state(0u64).unwrap().1)
                .collect()
        });

        group.bench_with_input(BenchmarkId::from_parameter(hooks), hooks, |b, _| {
            let mut i = 0;
            b.iter(|| {
                for set in &setters {
                    set.set(black_box(i));
                }
                component.render(|| {
                    for hook in &wrapped {
                        hook.use_state(0u64).unwrap();
                    }
                });
                i += 1;
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    store_set_benchmark,
    store_get_benchmark,
    cached_render_benchmark,
    cached_update_benchmark,
);
criterion_main!(benches);
