use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::runtime::Runtime;

use menu_rs::models::{sample_menu, MenuItem, MenuItemRequest};
use menu_rs::repositories::{InMemoryMenuRepository, MenuRepository};

fn valid_payload() -> Value {
    json!({
        "name": "  Veggie Wrap ",
        "description": "Grilled veggies in a wrap",
        "price": "8.50",
        "category": "entree",
        "ingredients": ["lettuce", "pepper", "tortilla"],
        "available": "true"
    })
}

fn invalid_payload() -> Value {
    json!({
        "name": "Hi",
        "description": "short",
        "price": -1,
        "category": "snack",
        "ingredients": []
    })
}

/// Store holding `size` items with ids 1..=size
fn repository_with(size: usize) -> InMemoryMenuRepository {
    let template = sample_menu().remove(0);
    let items: Vec<MenuItem> = (1..=size as u64)
        .map(|id| MenuItem {
            id,
            name: format!("Dish {}", id),
            ..template.clone()
        })
        .collect();

    InMemoryMenuRepository::with_items(items).unwrap()
}

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validation");

    let valid = valid_payload();
    group.bench_function("valid_payload", |b| {
        b.iter(|| MenuItemRequest::try_from(black_box(&valid)))
    });

    let invalid = invalid_payload();
    group.bench_function("invalid_payload", |b| {
        b.iter(|| MenuItemRequest::try_from(black_box(&invalid)))
    });

    group.finish();
}

fn bench_store_operations(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let request = MenuItemRequest::try_from(&valid_payload()).unwrap();

    let mut group = c.benchmark_group("store");
    group.measurement_time(Duration::from_secs(5));

    for size in [10usize, 100, 1000] {
        let repository = repository_with(size);

        group.bench_with_input(BenchmarkId::new("find_by_id", size), &size, |b, &size| {
            b.iter(|| rt.block_on(async { repository.find_by_id(black_box(size as u64)).await }))
        });

        group.bench_with_input(BenchmarkId::new("find_all", size), &size, |b, _| {
            b.iter(|| rt.block_on(async { black_box(repository.find_all().await) }))
        });

        group.bench_with_input(BenchmarkId::new("update", size), &size, |b, &size| {
            b.iter(|| {
                rt.block_on(async {
                    repository
                        .update(black_box(size as u64 / 2 + 1), request.clone())
                        .await
                })
            })
        });

        group.bench_with_input(
            BenchmarkId::new("create_then_delete", size),
            &size,
            |b, _| {
                b.iter(|| {
                    rt.block_on(async {
                        let item = repository.create(request.clone()).await.unwrap();
                        repository.delete(item.id).await
                    })
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_validation, bench_store_operations);
criterion_main!(benches);
