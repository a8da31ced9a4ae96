mod common;

use approx::assert_relative_eq;

use coordop::common::{Criterion, Extent, ObjectProps};
use coordop::crs::presets;
use coordop::factory::{IntermediateCrsUse, SourceTargetExtentUse};
use coordop::io::to_proj_string;
use coordop::operation::constants::*;
use coordop::operation::metadata::{accuracy_of, grids_needed};
use coordop::operation::{concatenated, conversion, transformation, PositionalAccuracy};
use coordop::{ContextConfig, CoordinateOperationContext, CoordinateOperationFactory, CrsRef};

use common::{context, names, NTV2_GRID};

fn resolve(source: &CrsRef, target: &CrsRef, ctx: &CoordinateOperationContext) -> Vec<coordop::OperationRef> {
    CoordinateOperationFactory::new()
        .create_operations(source, target, ctx)
        .unwrap()
}

#[test]
fn test_ntv2_grid_ranked_first() {
    let ops = resolve(&presets::nad27(), &presets::nad83(), &context());
    assert_eq!(names(&ops), vec!["NAD27 to NAD83 (6)", "NAD27 to NAD83 (1)"]);
    assert_relative_eq!(accuracy_of(&ops[0]), 1.0);
    let grids = grids_needed(&ops[0], None, false);
    assert_eq!(grids.len(), 1);
    assert_eq!(grids[0].short_name, NTV2_GRID);

    let ctx = context().with_area_of_interest(Extent::from_bbox(-100.0, 40.0, -90.0, 50.0));
    let ops = resolve(&presets::nad27(), &presets::nad83(), &ctx);
    assert_eq!(ops[0].name(), "NAD27 to NAD83 (6)");
}

#[test]
fn test_reverse_direction_uses_inverse() {
    let ops = resolve(&presets::nad83(), &presets::nad27(), &context());
    assert_eq!(ops[0].name(), "Inverse of NAD27 to NAD83 (6)");
    assert!(ops[0].source_crs().unwrap().is_equivalent_to(&presets::nad83(), Criterion::Equivalent));
    let proj = to_proj_string(&ops[0]).unwrap();
    assert!(proj.contains("+inv +proj=hgridshift +grids=ntv2_0.gsb"), "{proj}");
}

#[test]
fn test_registry_result_excludes_ballpark() {
    let ops = resolve(&presets::nad27(), &presets::wgs84(), &context());
    assert!(!ops.is_empty());
    assert!(ops.iter().all(|op| !op.has_ballpark_transformation()));
    assert_eq!(ops[0].name(), "NAD27 to WGS 84 (1)");
}

#[test]
fn test_ballpark_only_when_allowed() {
    let ops = resolve(&presets::etrs89(), &presets::wgs84(), &context());
    assert_eq!(names(&ops), vec!["Ballpark geographic offset from ETRS89 to WGS 84"]);
    assert!(ops[0].has_ballpark_transformation());

    let ctx = context().with_allow_ballpark(false);
    assert!(resolve(&presets::etrs89(), &presets::wgs84(), &ctx).is_empty());
}

#[test]
fn test_intermediate_crs_policy() {
    let aoi = Extent::from_bbox(-100.0, 40.0, -90.0, 50.0);
    let ctx = context()
        .with_area_of_interest(aoi.clone())
        .with_intermediate_crs_use(IntermediateCrsUse::Always);
    let ops = resolve(&presets::nad27(), &presets::wgs84(), &ctx);
    assert_eq!(ops[0].name(), "NAD27 to NAD83 (6) + NAD83 to WGS 84 (1)");
    assert_relative_eq!(accuracy_of(&ops[0]), 5.0);
    assert!(names(&ops).contains(&"NAD27 to WGS 84 (1)".to_string()));

    let ctx = context()
        .with_area_of_interest(aoi)
        .with_intermediate_crs_use(IntermediateCrsUse::Never);
    let ops = resolve(&presets::nad27(), &presets::wgs84(), &ctx);
    assert_eq!(names(&ops), vec!["NAD27 to WGS 84 (1)"]);
}

#[test]
fn test_axis_order_reversal_is_exact() {
    let ops = resolve(&presets::wgs84(), &presets::ogc_crs84(), &context());
    assert_eq!(ops.len(), 1);
    assert!(conversion::is_axis_order_reversal(ops[0].method_epsg_code()));
    assert_eq!(accuracy_of(&ops[0]), 0.0);

    let ops = resolve(&presets::wgs84_3d(), &presets::wgs84_geocentric(), &context());
    assert_eq!(ops[0].method_epsg_code(), Some(EPSG_CODE_METHOD_GEOGRAPHIC_GEOCENTRIC));
    assert_eq!(accuracy_of(&ops[0]), 0.0);
}

#[test]
fn test_geographic_2d_to_3d_single_exact_operation() {
    for ctx in [CoordinateOperationContext::default(), context()] {
        let ops = resolve(&presets::wgs84(), &presets::wgs84_3d(), &ctx);
        assert_eq!(ops.len(), 1);
        assert_eq!(accuracy_of(&ops[0]), 0.0);
        assert!(!ops[0].has_ballpark_transformation());
    }
}

#[test]
fn test_same_datum_without_ballpark_is_exact() {
    let ctx = CoordinateOperationContext::default().with_allow_ballpark(false);
    for source in [presets::wgs84(), presets::wgs84_egm96()] {
        let ops = resolve(&source, &presets::wgs84(), &ctx);
        assert_eq!(ops.len(), 1, "{}", source.name());
        assert!(!ops[0].has_ballpark_transformation());
        assert_eq!(accuracy_of(&ops[0]), 0.0);
    }
}

#[test]
fn test_inverse_swaps_crs() {
    let ctx = context();
    let pairs = [
        (presets::nad27(), presets::nad83()),
        (presets::nad27(), presets::wgs84()),
        (presets::etrs89(), presets::wgs84()),
        (presets::utm_wgs84(31, true), presets::ed50()),
        (presets::wgs84_egm96(), presets::wgs84_3d()),
        (presets::ntf_paris(), presets::ntf()),
    ];
    for (source, target) in &pairs {
        for op in resolve(source, target, &ctx) {
            let inverse = op.inverse();
            let (Some(s), Some(t)) = (op.source_crs(), op.target_crs()) else {
                panic!("{} has no CRS", op.name());
            };
            assert!(inverse.source_crs().unwrap().is_equivalent_to(t, Criterion::Equivalent));
            assert!(inverse.target_crs().unwrap().is_equivalent_to(s, Criterion::Equivalent));
        }
    }
}

#[test]
fn test_known_accuracy_sorted_before_unknown() {
    let ctx = context().with_extent_use(SourceTargetExtentUse::None);
    for (source, target) in [
        (presets::nad27(), presets::nad83()),
        (presets::nad83(), presets::wgs84()),
        (presets::ed50(), presets::wgs84()),
    ] {
        let ops = resolve(&source, &target, &ctx);
        let accuracies: Vec<f64> = ops.iter().map(|op| accuracy_of(op)).collect();
        let first_unknown = accuracies.iter().position(|a| *a < 0.0).unwrap_or(accuracies.len());
        assert!(accuracies[first_unknown..].iter().all(|a| *a < 0.0));
        let known = &accuracies[..first_unknown];
        assert!(known.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn test_accuracy_aggregation() {
    let first = transformation::geocentric_translations(
        ObjectProps::named("a"),
        presets::ed50(),
        presets::wgs84(),
        1.0,
        2.0,
        3.0,
        vec![PositionalAccuracy::Known(1.0)],
    );
    let second = transformation::geocentric_translations(
        ObjectProps::named("b"),
        presets::wgs84(),
        presets::nad83(),
        1.0,
        2.0,
        3.0,
        vec![PositionalAccuracy::Known(2.0)],
    );
    let unknown = transformation::geocentric_translations(
        ObjectProps::named("c"),
        presets::wgs84(),
        presets::nad83(),
        1.0,
        2.0,
        3.0,
        vec![],
    );
    let chained = concatenated::create_compute_metadata(vec![first.clone(), second], false).unwrap();
    assert_relative_eq!(accuracy_of(&chained), 3.0);
    let chained = concatenated::create_compute_metadata(vec![first, unknown], false).unwrap();
    assert_eq!(accuracy_of(&chained), -1.0);
    assert_eq!(accuracy_of(&conversion::utm(31, true)), 0.0);
}

#[test]
fn test_geocentric_translation_inverse_is_exact() {
    let forward = transformation::geocentric_translations(
        ObjectProps::named("ED50 to WGS 84"),
        presets::ed50(),
        presets::wgs84(),
        -87.1,
        -98.25,
        -121.3,
        vec![PositionalAccuracy::Known(5.0)],
    );
    let expected = transformation::geocentric_translations(
        ObjectProps::named("WGS 84 to ED50"),
        presets::wgs84(),
        presets::ed50(),
        87.1,
        98.25,
        121.3,
        vec![PositionalAccuracy::Known(5.0)],
    );
    let inverse = forward.inverse();
    assert_eq!(inverse.source_crs().unwrap().name(), "WGS 84");
    assert_eq!(inverse.target_crs().unwrap().name(), "ED50");
    let (a, b) = (inverse.single().unwrap(), expected.single().unwrap());
    assert_eq!(a.method_epsg_code(), b.method_epsg_code());
    for code in [
        EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION,
        EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION,
        EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION,
    ] {
        assert_eq!(a.parameter_si(code).unwrap().to_bits(), b.parameter_si(code).unwrap().to_bits());
    }
}

#[test]
fn test_utm_parameters() {
    let north = conversion::utm(31, true);
    let single = north.single().unwrap();
    assert_relative_eq!(
        single.parameter_degrees(EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN).unwrap(),
        3.0
    );
    assert_relative_eq!(
        single.parameter_si(EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN).unwrap(),
        0.9996
    );
    assert_relative_eq!(single.parameter_si(EPSG_CODE_PARAMETER_FALSE_EASTING).unwrap(), 500_000.0);
    assert_relative_eq!(single.parameter_si(EPSG_CODE_PARAMETER_FALSE_NORTHING).unwrap(), 0.0);

    let south = conversion::utm(31, false);
    assert_relative_eq!(
        south.single().unwrap().parameter_si(EPSG_CODE_PARAMETER_FALSE_NORTHING).unwrap(),
        10_000_000.0
    );
}

#[test]
fn test_config_drives_context() {
    let config = ContextConfig::from_toml_str(
        r#"
[operations]
allow-ballpark = false
intermediate-crs-use = "never"
"#,
    )
    .unwrap();
    let ctx = config.into_context(Some(std::sync::Arc::new(common::registry())));
    assert!(resolve(&presets::etrs89(), &presets::wgs84(), &ctx).is_empty());
    assert_eq!(resolve(&presets::nad27(), &presets::nad83(), &ctx)[0].name(), "NAD27 to NAD83 (6)");
}

#[test]
fn test_batch_with_registry() {
    let factory = CoordinateOperationFactory::new();
    let ctx = context();
    let pairs = vec![
        (presets::nad27(), presets::nad83()),
        (presets::etrs89(), presets::wgs84()),
        (presets::wgs84(), presets::wgs84_3d()),
    ];
    let batch = factory.create_operations_batch(&pairs, &ctx);
    for ((source, target), result) in pairs.iter().zip(batch) {
        let expected = names(&resolve(source, target, &ctx));
        assert_eq!(names(&result.unwrap()), expected);
    }
}
