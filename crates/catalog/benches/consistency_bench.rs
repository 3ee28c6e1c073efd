use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use uuid::Uuid;

use catalog::access::resolve_zone;
use catalog::consistency::{ConsistencyValidator, ServiceCandidate};
use catalog::domain::{Provider, Service, ServiceType, Zone};
use catalog::repo::{CatalogRepository, InMemoryCatalog};
use models::geometry::rectangle;

/// A provider with `n` zones laid out on a grid, every other zone hosting a
/// service of the benchmarked type.
async fn grid(n: usize) -> (InMemoryCatalog, Uuid, Uuid) {
    let repo = InMemoryCatalog::new();
    let provider = repo
        .insert_provider(Provider {
            id: Uuid::new_v4(),
            name: "Bench".into(),
            email: "bench@example.com".into(),
            phone: "5550100".into(),
            address: "1 Main St".into(),
            manager_id: Uuid::new_v4(),
        })
        .await
        .expect("provider");
    let st = repo
        .insert_service_type(ServiceType { id: Uuid::new_v4(), name: "Repair".into() })
        .await
        .expect("service type");

    let mut target_zone = Uuid::nil();
    for i in 0..n {
        let (col, row) = ((i % 32) as f64, (i / 32) as f64);
        let zone = repo
            .insert_zone(Zone {
                id: Uuid::new_v4(),
                name: format!("z{i}"),
                mpoly: rectangle(col * 2.0, row * 2.0, col * 2.0 + 1.5, row * 2.0 + 1.5),
                provider_id: provider.id,
            })
            .await
            .expect("zone");
        if i % 2 == 0 {
            repo.insert_service(Service {
                id: Uuid::new_v4(),
                name: format!("s{i}"),
                zone_id: zone.id,
                service_type_id: st.id,
                cost: Decimal::ONE,
            })
            .await
            .expect("service");
        } else {
            target_zone = zone.id;
        }
    }
    (repo, target_zone, st.id)
}

fn bench_check_service(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("check_service");
    for n in [16usize, 256, 1024] {
        let (repo, target_zone, st) = rt.block_on(grid(n));
        let zone = rt.block_on(resolve_zone(&repo, target_zone)).expect("resolve").expect("zone");
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.to_async(&rt).iter(|| async {
                let candidate = ServiceCandidate { zone: &zone, service_type_id: st, existing_id: None };
                let verdict = ConsistencyValidator::new(&repo).check_service(&candidate).await.expect("check");
                black_box(verdict)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_check_service);
criterion_main!(benches);
