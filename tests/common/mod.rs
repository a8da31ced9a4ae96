#![allow(dead_code)]

use std::sync::Arc;

use coordop::common::{Extent, ObjectProps};
use coordop::crs::{presets, CoordinateSystem, Crs, CrsRef};
use coordop::common::units;
use coordop::operation::{transformation, OperationRef, PositionalAccuracy};
use coordop::registry::GridAlternative;
use coordop::{CoordinateOperationContext, MemoryRegistry};

pub const NTV2_GRID: &str = "ntv2_0.gsb";
pub const GEOID_GRID: &str = "us_nga_egm96_15.tif";

pub fn nad27_extent() -> Extent {
    Extent::from_bbox(-172.54, 7.15, -47.74, 83.17)
}

pub fn nad83_extent() -> Extent {
    Extent::from_bbox(167.65, 14.92, -40.73, 86.45)
}

/// EGM96 height tagged with its geoid model, so that the registry geoid
/// transformations are found for it.
pub fn egm96_with_geoid() -> CrsRef {
    let preset = presets::egm96_height();
    Crs::vertical_with_geoid(
        ObjectProps::named("EGM96 height"),
        preset.vertical_datum().unwrap().clone(),
        CoordinateSystem::gravity_related_height(units::METRE),
        "EGM96",
    )
}

pub fn wgs84_egm96_with_geoid() -> CrsRef {
    Crs::compound(
        ObjectProps::named("WGS 84 + EGM96 height"),
        vec![presets::wgs84(), egm96_with_geoid()],
    )
}

pub fn geoid_transformation() -> OperationRef {
    transformation::geographic3d_to_gravity_related_height(
        ObjectProps::named("WGS 84 to EGM96 height (1)")
            .with_epsg(10084)
            .with_extent(Extent::world()),
        presets::wgs84_3d(),
        presets::egm96_height(),
        GEOID_GRID,
        None,
        vec![PositionalAccuracy::Known(1.0)],
    )
}

/// NAD27, NAD83, WGS 84 and ETRS89 with an NTv2 grid between NAD27 and
/// NAD83, geocentric translations to WGS 84 and the EGM96 geoid model.
pub fn registry() -> MemoryRegistry {
    let mut registry = MemoryRegistry::new();
    registry
        .add_crs(presets::wgs84())
        .add_crs(presets::wgs84_3d())
        .add_crs(presets::etrs89())
        .add_operation(transformation::ntv2(
            ObjectProps::named("NAD27 to NAD83 (6)")
                .with_epsg(1313)
                .with_extent(nad27_extent()),
            presets::nad27(),
            presets::nad83(),
            NTV2_GRID,
            vec![PositionalAccuracy::Known(1.0)],
        ))
        .add_operation(transformation::geocentric_translations(
            ObjectProps::named("NAD27 to NAD83 (1)")
                .with_epsg(1241)
                .with_extent(nad27_extent()),
            presets::nad27(),
            presets::nad83(),
            -8.0,
            160.0,
            176.0,
            vec![PositionalAccuracy::Known(10.0)],
        ))
        .add_operation(transformation::geocentric_translations(
            ObjectProps::named("NAD27 to WGS 84 (1)")
                .with_epsg(1173)
                .with_extent(nad27_extent()),
            presets::nad27(),
            presets::wgs84(),
            -8.0,
            160.0,
            176.0,
            vec![PositionalAccuracy::Known(10.0)],
        ))
        .add_operation(transformation::geocentric_translations(
            ObjectProps::named("NAD83 to WGS 84 (1)")
                .with_epsg(1188)
                .with_extent(nad83_extent()),
            presets::nad83(),
            presets::wgs84(),
            0.0,
            0.0,
            0.0,
            vec![PositionalAccuracy::Known(4.0)],
        ))
        .add_grid_alternative(GridAlternative {
            original_name: NTV2_GRID.to_string(),
            proj_filename: NTV2_GRID.to_string(),
            format: "NTv2".to_string(),
            package_name: "proj-datumgrid".to_string(),
            available: true,
            ..Default::default()
        })
        .add_geoid_model("EGM96", geoid_transformation());
    registry
}

/// Routes library logs to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn context() -> CoordinateOperationContext {
    init_tracing();
    CoordinateOperationContext::new(Some(Arc::new(registry())))
}

pub fn names(ops: &[OperationRef]) -> Vec<String> {
    ops.iter().map(|op| op.name().into_owned()).collect()
}
