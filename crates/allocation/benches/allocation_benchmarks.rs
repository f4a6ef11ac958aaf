use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use andamio_allocation::AllocationCoordinator;
use andamio_core::{CategoryId, StructureId};
use andamio_dispatch::CarrierInfo;
use andamio_structures::NewStructure;

fn carrier() -> CarrierInfo {
    CarrierInfo {
        first_name: "Juan".to_string(),
        last_name: "Pérez".to_string(),
        tax_id: "20-12345678-9".to_string(),
        license_plate: "AB123CD".to_string(),
        notes: None,
    }
}

fn seed_structure(coordinator: &AllocationCoordinator, stock: u32) -> StructureId {
    coordinator
        .create_structure(NewStructure {
            name: "Marco 1.50m".to_string(),
            category_id: CategoryId::new(),
            stock,
            measure: None,
            description: None,
        })
        .expect("seed structure")
}

/// Full reserve/dispatch/release cycle: the hot path of the coordinator.
fn bench_allocation_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation_cycle");
    group.throughput(Throughput::Elements(1));

    group.bench_function("reserve_dispatch_release", |b| {
        let coordinator = AllocationCoordinator::new();
        let structure_id = seed_structure(&coordinator, u32::MAX / 2);

        b.iter(|| {
            let project_id = coordinator.create_project().unwrap();
            let line_id = coordinator
                .add_line(project_id, structure_id, black_box(10))
                .unwrap();
            coordinator.activate_project(project_id).unwrap();
            let dispatch_id = coordinator
                .create_dispatch(project_id, carrier(), vec![(line_id, 5)])
                .unwrap();
            coordinator.delete_dispatch(dispatch_id).unwrap();
            coordinator.delete_project(project_id).unwrap();
        });
    });

    group.finish();
}

/// Derived stock-level reads as the number of reserving projects grows.
/// Availability is recomputed from first principles on every read, so this
/// measures the cost of that choice.
fn bench_stock_level_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("stock_level_reads");

    for projects in [10u32, 100, 1_000] {
        let coordinator = AllocationCoordinator::new();
        let structure_id = seed_structure(&coordinator, projects * 2);
        for _ in 0..projects {
            let project_id = coordinator.create_project().unwrap();
            coordinator.add_line(project_id, structure_id, 1).unwrap();
            coordinator.activate_project(project_id).unwrap();
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(projects),
            &projects,
            |b, _| {
                b.iter(|| black_box(coordinator.stock_level(structure_id).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_allocation_cycle, bench_stock_level_reads);
criterion_main!(benches);
