//! Structural comparison of operations under a [`Criterion`].
//!
//! Under [`Criterion::Strict`] parameter lists must match in order and
//! exactly. Otherwise parameters are matched by EPSG code or aliased name in
//! any order, values are compared with a relative tolerance, parameters
//! missing on one side are accepted when they hold their neutral value, and
//! methods that are reparametrizations of each other compare equal.

use crate::common::units;
use crate::common::{is_equivalent_name, Criterion, Measure};
use crate::crs::Ellipsoid;

use super::constants::*;
use super::mappings::are_equivalent_parameters;
use super::method::{is_neutral_value, OperationMethod, OperationParameterValue, ParameterValue, SingleOperation};
use super::reparam;
use super::{CoordinateOperation, OperationKind};

const MAX_RELATIVE_ERROR: f64 = 1e-10;
/// Looser tolerance for values that went through a reparametrization.
const REPARAM_RELATIVE_ERROR: f64 = 1e-8;

/// Whether `a` and `b` describe the same operation. The ellipsoid needed to
/// relate reparametrized methods is taken from the source CRS.
pub fn is_equivalent(a: &CoordinateOperation, b: &CoordinateOperation, criterion: Criterion) -> bool {
    let ellipsoid = a
        .source_crs()
        .or_else(|| b.source_crs())
        .and_then(|c| c.ellipsoid())
        .cloned();
    is_equivalent_with_ellipsoid(a, b, criterion, ellipsoid.as_ref())
}

/// As [`is_equivalent`], with an explicit ellipsoid for operations detached
/// from their CRS.
pub fn is_equivalent_with_ellipsoid(
    a: &CoordinateOperation,
    b: &CoordinateOperation,
    criterion: Criterion,
    ellipsoid: Option<&Ellipsoid>,
) -> bool {
    if std::ptr::eq(a, b) {
        return true;
    }
    if a.op_type() != b.op_type() {
        return false;
    }
    if criterion.is_strict() && *a.props() != *b.props() {
        return false;
    }
    if !crs_pairs_equivalent(a, b, criterion) {
        return false;
    }
    match (a.kind(), b.kind()) {
        (OperationKind::InverseOf(fa), OperationKind::InverseOf(fb)) => {
            is_equivalent_with_ellipsoid(fa, fb, criterion, ellipsoid)
        }
        (OperationKind::InverseOf(_), _) | (_, OperationKind::InverseOf(_)) => false,
        (OperationKind::Concatenated(ca), OperationKind::Concatenated(cb)) => {
            ca.steps.len() == cb.steps.len()
                && ca
                    .steps
                    .iter()
                    .zip(&cb.steps)
                    .all(|(x, y)| is_equivalent_with_ellipsoid(x, y, criterion, ellipsoid))
        }
        (OperationKind::ProjBased(pa), OperationKind::ProjBased(pb)) => pa.is_equivalent_to(pb, criterion),
        (OperationKind::Conversion(sa), OperationKind::Conversion(sb))
        | (OperationKind::Transformation(sa), OperationKind::Transformation(sb)) => {
            if criterion.is_strict() && a.accuracies() != b.accuracies() {
                return false;
            }
            single_equivalent(sa, sb, criterion, ellipsoid)
        }
        _ => false,
    }
}

fn crs_pairs_equivalent(a: &CoordinateOperation, b: &CoordinateOperation, criterion: Criterion) -> bool {
    let same = |x: Option<&crate::crs::CrsRef>, y: Option<&crate::crs::CrsRef>| match (x, y) {
        (Some(x), Some(y)) => x.is_equivalent_to(y, criterion),
        (None, None) => true,
        _ => !criterion.is_strict(),
    };
    same(a.source_crs(), b.source_crs()) && same(a.target_crs(), b.target_crs())
}

/// Method and parameter comparison.
pub fn single_equivalent(
    a: &SingleOperation,
    b: &SingleOperation,
    criterion: Criterion,
    ellipsoid: Option<&Ellipsoid>,
) -> bool {
    if criterion.is_strict() {
        return a.method == b.method && a.values == b.values;
    }
    if methods_equivalent(&a.method, &b.method, ellipsoid) {
        if values_equivalent(&a.values, &b.values, MAX_RELATIVE_ERROR) {
            return true;
        }
        if a.method_epsg_code() == Some(EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP) {
            return values_equivalent(&a.values, &swap_standard_parallels(&b.values), MAX_RELATIVE_ERROR);
        }
        return false;
    }
    let Some(ellipsoid) = ellipsoid else {
        return false;
    };
    let (Some(code_a), Some(code_b)) = (a.method_epsg_code(), b.method_epsg_code()) else {
        return false;
    };
    if !is_reparametrization_pair(code_a, code_b) {
        return false;
    }
    match reparam::reparametrize(a, ellipsoid, code_b) {
        Some(converted) => {
            values_equivalent(&converted.values, &b.values, REPARAM_RELATIVE_ERROR)
                || (code_b == EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP
                    && values_equivalent(
                        &converted.values,
                        &swap_standard_parallels(&b.values),
                        REPARAM_RELATIVE_ERROR,
                    ))
        }
        None => false,
    }
}

fn is_reparametrization_pair(a: u32, b: u32) -> bool {
    matches!(
        (a, b),
        (
            EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP,
            EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP
        ) | (
            EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP,
            EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP
        ) | (EPSG_CODE_METHOD_MERCATOR_VARIANT_A, EPSG_CODE_METHOD_MERCATOR_VARIANT_B)
            | (EPSG_CODE_METHOD_MERCATOR_VARIANT_B, EPSG_CODE_METHOD_MERCATOR_VARIANT_A)
    )
}

/// Ellipsoidal method code of a spherical variant.
fn ellipsoidal_variant(code: u32) -> u32 {
    match code {
        EPSG_CODE_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA_SPHERICAL => {
            EPSG_CODE_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA
        }
        EPSG_CODE_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA_SPHERICAL => {
            EPSG_CODE_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA
        }
        EPSG_CODE_METHOD_EQUIDISTANT_CYLINDRICAL_SPHERICAL => EPSG_CODE_METHOD_EQUIDISTANT_CYLINDRICAL,
        other => other,
    }
}

pub fn methods_equivalent(a: &OperationMethod, b: &OperationMethod, ellipsoid: Option<&Ellipsoid>) -> bool {
    match (a.epsg_code(), b.epsg_code()) {
        (Some(ca), Some(cb)) if ca == cb => true,
        (Some(ca), Some(cb)) => {
            ellipsoid.is_some_and(Ellipsoid::is_sphere) && ellipsoidal_variant(ca) == ellipsoidal_variant(cb)
        }
        _ => is_equivalent_name(a.name(), b.name()),
    }
}

fn swap_standard_parallels(values: &[OperationParameterValue]) -> Vec<OperationParameterValue> {
    let mut out = values.to_vec();
    let i1 = out
        .iter()
        .position(|v| v.parameter.epsg_code() == Some(EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL));
    let i2 = out
        .iter()
        .position(|v| v.parameter.epsg_code() == Some(EPSG_CODE_PARAMETER_LATITUDE_2ND_STD_PARALLEL));
    if let (Some(i1), Some(i2)) = (i1, i2) {
        let v1 = out[i1].value.clone();
        out[i1].value = out[i2].value.clone();
        out[i2].value = v1;
    }
    out
}

fn same_parameter(a: &OperationParameterValue, b: &OperationParameterValue) -> bool {
    match (a.parameter.epsg_code(), b.parameter.epsg_code()) {
        (Some(ca), Some(cb)) => ca == cb,
        _ => are_equivalent_parameters(a.parameter.name(), b.parameter.name()),
    }
}

fn is_azimuth_like(p: &OperationParameterValue) -> bool {
    matches!(
        p.parameter.epsg_code(),
        Some(EPSG_CODE_PARAMETER_AZIMUTH_INITIAL_LINE | EPSG_CODE_PARAMETER_ANGLE_RECTIFIED_TO_SKEW_GRID)
    )
}

fn measures_equivalent(a: &Measure, b: &Measure, max_rel: f64, modulo_360: bool) -> bool {
    if modulo_360 {
        let da = a.convert_to(&units::DEGREE).rem_euclid(360.0);
        let db = b.convert_to(&units::DEGREE).rem_euclid(360.0);
        let diff = (da - db).abs();
        return diff.min(360.0 - diff) <= max_rel * da.abs().max(db.abs()).max(1.0);
    }
    let x = a.si_value();
    let y = b.si_value();
    if x == y {
        return true;
    }
    let scale = x.abs().max(y.abs());
    // Values near zero are compared against a one-unit scale.
    (x - y).abs() <= max_rel * scale.max(if max_rel > MAX_RELATIVE_ERROR { 1.0 } else { 0.0 })
}

fn value_equivalent(a: &OperationParameterValue, b: &OperationParameterValue, max_rel: f64) -> bool {
    match (&a.value, &b.value) {
        (ParameterValue::Measure(ma), ParameterValue::Measure(mb)) => {
            measures_equivalent(ma, mb, max_rel, is_azimuth_like(a))
        }
        (va, vb) => va == vb,
    }
}

/// Order-independent comparison of parameter values.
fn values_equivalent(a: &[OperationParameterValue], b: &[OperationParameterValue], max_rel: f64) -> bool {
    let mut used = vec![false; b.len()];
    for va in a {
        match b.iter().position(|vb| same_parameter(va, vb)) {
            Some(j) => {
                if !value_equivalent(va, &b[j], max_rel) {
                    return false;
                }
                used[j] = true;
            }
            None if is_neutral_value(&va.value) => {}
            None => return false,
        }
    }
    b.iter()
        .zip(&used)
        .all(|(vb, used)| *used || is_neutral_value(&vb.value) || a.iter().any(|va| same_parameter(va, vb)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ObjectProps;
    use crate::crs::datum::GRS80;
    use crate::crs::presets;
    use crate::operation::{conversion, reparam, transformation, CrsPair, PositionalAccuracy};

    #[test]
    fn test_strict_vs_equivalent_names() {
        let a = conversion::utm(31, true);
        let b = conversion::transverse_mercator(
            ObjectProps::named("my tmerc"),
            Measure::degrees(0.0),
            Measure::degrees(3.0),
            Measure::unity(0.9996),
            Measure::metres(500_000.0),
            Measure::metres(0.0),
        );
        assert!(is_equivalent(&a, &b, Criterion::Equivalent));
        assert!(!is_equivalent(&a, &b, Criterion::Strict));
    }

    #[test]
    fn test_parameter_order_and_units_ignored() {
        let a = conversion::utm(31, true);
        let mut single = a.single().unwrap().clone();
        single.values.reverse();
        single.values[0].value =
            ParameterValue::Measure(Measure::new(0.0, units::FOOT));
        let b = conversion::from_single(ObjectProps::named("x"), single);
        assert!(is_equivalent(&a, &b, Criterion::Equivalent));
    }

    #[test]
    fn test_missing_neutral_parameter_tolerated() {
        let a = conversion::utm(31, true);
        let mut single = a.single().unwrap().clone();
        single
            .values
            .retain(|v| v.parameter.epsg_code() != Some(EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN));
        let b = conversion::from_single(ObjectProps::named("x"), single);
        assert!(is_equivalent(&a, &b, Criterion::Equivalent));
    }

    #[test]
    fn test_lcc_1sp_equivalent_to_its_2sp_form() {
        let one = conversion::lambert_conic_conformal_1sp_values(
            Measure::degrees(46.5),
            Measure::degrees(3.0),
            Measure::unity(0.999_877_42),
            Measure::metres(700_000.0),
            Measure::metres(6_600_000.0),
        );
        let two = reparam::reparametrize(&one, &GRS80, EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP).unwrap();
        assert!(single_equivalent(&one, &two, Criterion::Equivalent, Some(&GRS80)));
        assert!(!single_equivalent(&one, &two, Criterion::Equivalent, None));
    }

    #[test]
    fn test_lcc_2sp_parallels_may_be_swapped() {
        let one = conversion::lambert_conic_conformal_1sp_values(
            Measure::degrees(46.5),
            Measure::degrees(3.0),
            Measure::unity(0.999_877_42),
            Measure::metres(700_000.0),
            Measure::metres(6_600_000.0),
        );
        let two = reparam::reparametrize(&one, &GRS80, EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP).unwrap();
        let swapped = SingleOperation {
            method: two.method.clone(),
            values: swap_standard_parallels(&two.values),
        };
        assert!(single_equivalent(&two, &swapped, Criterion::Equivalent, None));
    }

    #[test]
    fn test_azimuth_modulo_360() {
        let a = Measure::degrees(-90.0);
        let b = Measure::degrees(270.0);
        assert!(measures_equivalent(&a, &b, MAX_RELATIVE_ERROR, true));
        assert!(!measures_equivalent(&a, &b, MAX_RELATIVE_ERROR, false));
    }

    #[test]
    fn test_inverse_pair_equivalence() {
        let fwd = transformation::geocentric_translations(
            ObjectProps::named("t"),
            presets::ed50(),
            presets::wgs84(),
            1.0,
            2.0,
            3.0,
            vec![PositionalAccuracy::Known(1.0)],
        );
        assert!(is_equivalent(&fwd, &fwd.inverse().inverse(), Criterion::Equivalent));
        assert!(!is_equivalent(&fwd, &fwd.inverse(), Criterion::Equivalent));
        let conv = conversion::utm(31, true)
            .with_crs_pair(CrsPair::new(presets::wgs84(), presets::utm_wgs84(31, true)));
        assert!(is_equivalent(&conv.inverse(), &conv.inverse(), Criterion::Equivalent));
    }
}
