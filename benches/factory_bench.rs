use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coordop::common::{Extent, ObjectProps};
use coordop::crs::{presets, CrsRef};
use coordop::operation::{transformation, PositionalAccuracy};
use coordop::{CoordinateOperationContext, CoordinateOperationFactory, MemoryRegistry};

fn make_registry() -> MemoryRegistry {
    let mut registry = MemoryRegistry::new();
    registry
        .add_crs(presets::wgs84_3d())
        .add_operation(transformation::geocentric_translations(
            ObjectProps::named("NAD27 to WGS 84 (1)")
                .with_epsg(1173)
                .with_extent(Extent::from_bbox(-172.54, 7.15, -47.74, 83.17)),
            presets::nad27(),
            presets::wgs84(),
            -8.0,
            160.0,
            176.0,
            vec![PositionalAccuracy::Known(10.0)],
        ))
        .add_operation(transformation::ntv2(
            ObjectProps::named("NAD27 to NAD83 (6)")
                .with_epsg(1313)
                .with_extent(Extent::from_bbox(-141.01, 40.04, -47.74, 83.17)),
            presets::nad27(),
            presets::nad83(),
            "ntv2_0.gsb",
            vec![PositionalAccuracy::Known(1.5)],
        ))
        .add_operation(transformation::geocentric_translations(
            ObjectProps::named("NAD83 to WGS 84 (1)")
                .with_epsg(1188)
                .with_extent(Extent::from_bbox(167.65, 14.92, -40.73, 86.45)),
            presets::nad83(),
            presets::wgs84(),
            0.0,
            0.0,
            0.0,
            vec![PositionalAccuracy::Known(4.0)],
        ));
    registry
}

fn bench_registry_pair(c: &mut Criterion) {
    let factory = CoordinateOperationFactory::new();
    let ctx = CoordinateOperationContext::new(Some(Arc::new(make_registry())));
    let source = presets::nad27();
    let target = presets::wgs84();

    c.bench_function("create_operations_nad27_wgs84_registry", |b| {
        b.iter(|| black_box(factory.create_operations(&source, &target, &ctx).unwrap()));
    });

    let target_3d = presets::wgs84_3d();
    c.bench_function("create_operations_nad27_wgs84_3d_pivot", |b| {
        b.iter(|| black_box(factory.create_operations(&source, &target_3d, &ctx).unwrap()));
    });
}

fn bench_ballpark_pair(c: &mut Criterion) {
    let factory = CoordinateOperationFactory::new();
    let ctx = CoordinateOperationContext::default();
    let source = presets::ed50();
    let target = presets::utm_wgs84(31, true);

    c.bench_function("create_operations_ed50_utm31_ballpark", |b| {
        b.iter(|| black_box(factory.create_operations(&source, &target, &ctx).unwrap()));
    });

    let compound = presets::wgs84_egm96();
    let geographic_3d = presets::wgs84_3d();
    c.bench_function("create_operations_compound_ballpark", |b| {
        b.iter(|| black_box(factory.create_operations(&compound, &geographic_3d, &ctx).unwrap()));
    });
}

fn bench_batch_thread_scaling(c: &mut Criterion) {
    let factory = CoordinateOperationFactory::new();
    let ctx = CoordinateOperationContext::new(Some(Arc::new(make_registry())));
    let all = presets::all();
    let pairs: Vec<(CrsRef, CrsRef)> = all
        .iter()
        .flat_map(|s| all.iter().map(move |t| (Arc::clone(s), Arc::clone(t))))
        .collect();

    for &threads in &[1, 2, 4, 8] {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();

        c.bench_function(&format!("batch_threads_{threads}_{}_pairs", pairs.len()), |b| {
            b.iter(|| black_box(pool.install(|| factory.create_operations_batch(&pairs, &ctx))));
        });
    }
}

criterion_group!(
    benches,
    bench_registry_pair,
    bench_ballpark_pair,
    bench_batch_thread_scaling
);
criterion_main!(benches);
