mod common;

use coordop::common::ObjectProps;
use coordop::crs::{presets, Crs};
use coordop::operation::ballpark::is_ballpark_vertical_name;
use coordop::operation::transformation;
use coordop::io::to_proj_string;
use coordop::operation::metadata::grid_names;
use coordop::{CoordinateOperationContext, CoordinateOperationFactory, CrsRef, OperationRef};

use common::{context, egm96_with_geoid, wgs84_egm96_with_geoid, GEOID_GRID};

fn resolve(source: &CrsRef, target: &CrsRef, ctx: &CoordinateOperationContext) -> Vec<OperationRef> {
    CoordinateOperationFactory::new()
        .create_operations(source, target, ctx)
        .unwrap()
}

#[test]
fn test_compound_to_geographic_3d_uses_geoid_model() {
    let ops = resolve(&wgs84_egm96_with_geoid(), &presets::wgs84_3d(), &context());
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].name(), "Inverse of WGS 84 to EGM96 height (1)");
    assert!(!ops[0].has_ballpark_transformation());
    assert_eq!(grid_names(&ops[0]), vec![GEOID_GRID.to_string()]);
    assert_eq!(ops[0].source_crs().unwrap().name(), "WGS 84 + EGM96 height");
}

#[test]
fn test_geographic_3d_to_vertical_with_geoid() {
    let ops = resolve(&presets::wgs84_3d(), &egm96_with_geoid(), &context());
    assert!(!ops.is_empty());
    assert!(!ops[0].has_ballpark_transformation());
    assert!(grid_names(&ops[0]).contains(&GEOID_GRID.to_string()));
    let proj = to_proj_string(&ops[0]).unwrap();
    assert!(proj.contains("+proj=vgridshift +grids=us_nga_egm96_15.tif"), "{proj}");
}

#[test]
fn test_unknown_vertical_is_ballpark() {
    let ops = resolve(&presets::wgs84_3d(), &presets::navd88_height(), &context());
    assert_eq!(ops.len(), 1);
    assert!(ops[0].has_ballpark_transformation());
    assert!(ops[0].name().starts_with("Transformation from WGS 84 to NAVD88 height"));

    let ctx = context().with_allow_ballpark(false);
    assert!(resolve(&presets::wgs84_3d(), &presets::navd88_height(), &ctx).is_empty());
}

#[test]
fn test_same_vertical_datum_unit_change_is_exact() {
    let ops = resolve(&presets::egm96_height(), &presets::egm96_height_ft(), &context());
    assert_eq!(ops.len(), 1);
    assert!(!ops[0].has_ballpark_transformation());
    assert!(ops[0].name().starts_with("Change of vertical unit"));
}

#[test]
fn test_compound_with_same_vertical_keeps_horizontal_leg() {
    let etrs89_egm96 = Crs::compound(
        ObjectProps::named("ETRS89 + EGM96 height"),
        vec![presets::etrs89(), presets::egm96_height()],
    );
    let ops = resolve(&etrs89_egm96, &presets::wgs84_egm96(), &context());
    assert_eq!(ops.len(), 1);
    assert!(ops[0].has_ballpark_transformation());
    assert_eq!(ops[0].source_crs().unwrap().name(), "ETRS89 + EGM96 height");
    assert_eq!(ops[0].target_crs().unwrap().name(), "WGS 84 + EGM96 height");
}

#[test]
fn test_bound_compound_keeps_vertical_under_default_context() {
    let towgs84 = transformation::geocentric_translations(
        ObjectProps::named("ED50 to WGS 84"),
        presets::ed50(),
        presets::wgs84(),
        -87.0,
        -98.0,
        -121.0,
        vec![],
    );
    let compound = Crs::compound(
        ObjectProps::named("ED50 + EGM96 height"),
        vec![presets::ed50(), presets::egm96_height()],
    );
    let bound = Crs::bound(compound, presets::wgs84(), towgs84);
    let ops = resolve(&bound, &presets::wgs84_3d(), &CoordinateOperationContext::default());
    assert_eq!(ops.len(), 1);
    assert!(is_ballpark_vertical_name(&ops[0].name()));
    assert!(ops[0].name().contains("ED50 to WGS 84"));
}
