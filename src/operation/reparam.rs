//! Closed-form conversion between equivalent parametrizations of the same
//! projection: Mercator variant A and B, Lambert Conic Conformal 1SP and 2SP.

use std::f64::consts::FRAC_PI_4;
use std::sync::Arc;

use crate::common::units::{self, UnitOfMeasure};
use crate::common::{Measure, ObjectProps};
use crate::crs::Ellipsoid;

use super::constants::*;
use super::method::{OperationParameterValue, SingleOperation};
use super::{CoordinateOperation, OperationKind, OperationRef};

const BISECTION_ITERATIONS: usize = 100;

/// Isometric scale factor m(φ) = cos φ / sqrt(1 - e² sin² φ).
pub fn msfn(phi: f64, e2: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - e2 * s * s).sqrt()
}

/// Conformal latitude function t(φ) used by Lambert Conic Conformal.
pub fn tsfn(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() / ((1.0 - es) / (1.0 + es)).powf(e / 2.0)
}

/// `convert_to_other_method` for an operation: the reparametrized conversion
/// keeps the name, identifiers and CRS pair. The ellipsoid is taken from
/// the source CRS. Returns `None` when the pair of methods is not supported
/// or the parameters have no equivalent in the target method.
pub fn convert_to_other_method(op: &OperationRef, target_code: u32) -> Option<OperationRef> {
    let OperationKind::Conversion(single) = op.kind() else {
        return None;
    };
    if single.method_epsg_code() == Some(target_code) {
        return Some(Arc::clone(op));
    }
    let ellipsoid = op.source_crs().and_then(|crs| crs.ellipsoid())?;
    let converted = reparametrize(single, ellipsoid, target_code)?;
    let mut common = op.common().clone();
    common.accuracies.clear();
    Some(CoordinateOperation::new(common, OperationKind::Conversion(converted)))
}

/// Reparametrize `single` into the method `target_code`.
pub fn reparametrize(
    single: &SingleOperation,
    ellipsoid: &Ellipsoid,
    target_code: u32,
) -> Option<SingleOperation> {
    let source_code = single.method_epsg_code()?;
    match (source_code, target_code) {
        (EPSG_CODE_METHOD_MERCATOR_VARIANT_A, EPSG_CODE_METHOD_MERCATOR_VARIANT_B) => {
            mercator_a_to_b(single, ellipsoid)
        }
        (EPSG_CODE_METHOD_MERCATOR_VARIANT_B, EPSG_CODE_METHOD_MERCATOR_VARIANT_A) => {
            mercator_b_to_a(single, ellipsoid)
        }
        (
            EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP,
            EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP,
        ) => lcc_1sp_to_2sp(single, ellipsoid),
        (
            EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP,
            EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP,
        ) => lcc_2sp_to_1sp(single, ellipsoid),
        _ => None,
    }
}

fn angle(name: &str, code: u32, degrees: f64) -> OperationParameterValue {
    OperationParameterValue::measure(name, code, Measure::degrees(degrees))
}

/// Linear value expressed in `unit`, from metres.
fn linear(name: &str, code: u32, metres: f64, unit: &UnitOfMeasure) -> OperationParameterValue {
    OperationParameterValue::measure(
        name,
        code,
        Measure::new(metres / unit.conversion_to_si(), unit.clone()),
    )
}

fn copied(single: &SingleOperation, from: u32, name: &str, code: u32) -> Option<OperationParameterValue> {
    let m = single.parameter_measure(from)?;
    Some(OperationParameterValue::measure(name, code, m.clone()))
}

fn build(name: &str, code: u32, values: Vec<OperationParameterValue>) -> SingleOperation {
    SingleOperation::from_pairs(ObjectProps::named(name).with_epsg(code), values)
}

/// Snap to the closest thousandth of a degree when closer than 1e-8 degree.
fn snap_degrees(deg: f64) -> f64 {
    let rounded = (deg * 1000.0).round() / 1000.0;
    if (deg - rounded).abs() < 1e-8 {
        rounded
    } else {
        deg
    }
}

fn mercator_a_to_b(single: &SingleOperation, ellps: &Ellipsoid) -> Option<SingleOperation> {
    let lat0 = single.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN)?;
    if lat0 != 0.0 {
        return None;
    }
    let k0 = single.parameter_si(EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN)?;
    if k0 > 1.0 + 1e-10 {
        return None;
    }
    let e2 = ellps.e2;
    let phi1 = if k0 >= 1.0 {
        0.0
    } else {
        ((1.0 - e2) / (1.0 / (k0 * k0) - e2)).sqrt().acos()
    };
    Some(build(
        EPSG_NAME_METHOD_MERCATOR_VARIANT_B,
        EPSG_CODE_METHOD_MERCATOR_VARIANT_B,
        vec![
            angle(
                EPSG_NAME_PARAMETER_LATITUDE_1ST_STD_PARALLEL,
                EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL,
                phi1.to_degrees(),
            ),
            copied(
                single,
                EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
                EPSG_NAME_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
                EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
            )?,
            copied(
                single,
                EPSG_CODE_PARAMETER_FALSE_EASTING,
                EPSG_NAME_PARAMETER_FALSE_EASTING,
                EPSG_CODE_PARAMETER_FALSE_EASTING,
            )?,
            copied(
                single,
                EPSG_CODE_PARAMETER_FALSE_NORTHING,
                EPSG_NAME_PARAMETER_FALSE_NORTHING,
                EPSG_CODE_PARAMETER_FALSE_NORTHING,
            )?,
        ],
    ))
}

fn mercator_b_to_a(single: &SingleOperation, ellps: &Ellipsoid) -> Option<SingleOperation> {
    let phi1 = single.parameter_si(EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL)?;
    let k0 = msfn(phi1, ellps.e2);
    Some(build(
        EPSG_NAME_METHOD_MERCATOR_VARIANT_A,
        EPSG_CODE_METHOD_MERCATOR_VARIANT_A,
        vec![
            angle(
                EPSG_NAME_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN,
                EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN,
                0.0,
            ),
            copied(
                single,
                EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
                EPSG_NAME_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
                EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
            )?,
            OperationParameterValue::measure(
                EPSG_NAME_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN,
                EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN,
                Measure::unity(k0),
            ),
            copied(
                single,
                EPSG_CODE_PARAMETER_FALSE_EASTING,
                EPSG_NAME_PARAMETER_FALSE_EASTING,
                EPSG_CODE_PARAMETER_FALSE_EASTING,
            )?,
            copied(
                single,
                EPSG_CODE_PARAMETER_FALSE_NORTHING,
                EPSG_NAME_PARAMETER_FALSE_NORTHING,
                EPSG_CODE_PARAMETER_FALSE_NORTHING,
            )?,
        ],
    ))
}

/// Root of `f` between `positive` (where f > 0) and `negative` (where f < 0),
/// evaluating midpoints only.
fn bisect(f: impl Fn(f64) -> f64, mut positive: f64, mut negative: f64) -> f64 {
    for _ in 0..BISECTION_ITERATIONS {
        let mid = 0.5 * (positive + negative);
        if f(mid) > 0.0 {
            positive = mid;
        } else {
            negative = mid;
        }
    }
    0.5 * (positive + negative)
}

fn round_to_half_degree(deg: f64) -> f64 {
    (deg * 2.0).round() / 2.0
}

fn lcc_1sp_to_2sp(single: &SingleOperation, ellps: &Ellipsoid) -> Option<SingleOperation> {
    let phi0_deg = single.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN)?;
    let k0 = single.parameter_si(EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN)?;
    let fe = single.parameter_measure(EPSG_CODE_PARAMETER_FALSE_EASTING)?;
    let fn_ = single.parameter_measure(EPSG_CODE_PARAMETER_FALSE_NORTHING)?;
    let phi0 = phi0_deg.to_radians();
    if phi0 == 0.0 || k0 > 1.0 + 1e-10 {
        return None;
    }

    let e = ellps.eccentricity();
    let e2 = ellps.e2;
    let (phi1_deg, phi2_deg) = if (k0 - 1.0).abs() <= 1e-10 {
        (phi0_deg, phi0_deg)
    } else {
        let n = phi0.sin();
        let m0 = msfn(phi0, e2);
        let t0 = tsfn(phi0, e);
        let big_k = k0 * m0 / t0.powf(n);
        let f = |x: f64| {
            let m2 = (1.0 - x * x) / (1.0 - e2 * x * x);
            let t2 = (1.0 - x) / (1.0 + x) * ((1.0 + e * x) / (1.0 - e * x)).powf(e);
            m2 - big_k * big_k * t2.powf(n)
        };
        let x1 = bisect(f, n, 1.0);
        let x2 = bisect(f, n, -1.0);
        (snap_degrees(x1.asin().to_degrees()), snap_degrees(x2.asin().to_degrees()))
    };

    // False origin at the half degree closest to the natural origin, with the
    // northing shifted by the radius difference between both latitudes.
    let phi_f_deg = round_to_half_degree(phi0_deg);
    let fn_m = fn_.si_value();
    let northing_m = if phi_f_deg == phi0_deg {
        fn_m
    } else {
        let n = phi0.sin();
        let big_f = msfn(phi0, e2) * k0 / (n * tsfn(phi0, e).powf(n));
        let rho0 = ellps.a * big_f * tsfn(phi0, e).powf(n);
        let rho_f = ellps.a * big_f * tsfn(phi_f_deg.to_radians(), e).powf(n);
        fn_m + rho0 - rho_f
    };

    Some(build(
        EPSG_NAME_METHOD_LAMBERT_CONIC_CONFORMAL_2SP,
        EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP,
        vec![
            angle(
                EPSG_NAME_PARAMETER_LATITUDE_FALSE_ORIGIN,
                EPSG_CODE_PARAMETER_LATITUDE_FALSE_ORIGIN,
                phi_f_deg,
            ),
            copied(
                single,
                EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
                EPSG_NAME_PARAMETER_LONGITUDE_FALSE_ORIGIN,
                EPSG_CODE_PARAMETER_LONGITUDE_FALSE_ORIGIN,
            )?,
            angle(
                EPSG_NAME_PARAMETER_LATITUDE_1ST_STD_PARALLEL,
                EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL,
                phi1_deg,
            ),
            angle(
                EPSG_NAME_PARAMETER_LATITUDE_2ND_STD_PARALLEL,
                EPSG_CODE_PARAMETER_LATITUDE_2ND_STD_PARALLEL,
                phi2_deg,
            ),
            OperationParameterValue::measure(
                EPSG_NAME_PARAMETER_EASTING_FALSE_ORIGIN,
                EPSG_CODE_PARAMETER_EASTING_FALSE_ORIGIN,
                fe.clone(),
            ),
            linear(
                EPSG_NAME_PARAMETER_NORTHING_FALSE_ORIGIN,
                EPSG_CODE_PARAMETER_NORTHING_FALSE_ORIGIN,
                northing_m,
                fn_.unit(),
            ),
        ],
    ))
}

fn lcc_2sp_to_1sp(single: &SingleOperation, ellps: &Ellipsoid) -> Option<SingleOperation> {
    let phi_f = single.parameter_si(EPSG_CODE_PARAMETER_LATITUDE_FALSE_ORIGIN)?;
    let phi1 = single.parameter_si(EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL)?;
    let phi2 = single.parameter_si(EPSG_CODE_PARAMETER_LATITUDE_2ND_STD_PARALLEL)?;
    let ef = single.parameter_measure(EPSG_CODE_PARAMETER_EASTING_FALSE_ORIGIN)?;
    let nf = single.parameter_measure(EPSG_CODE_PARAMETER_NORTHING_FALSE_ORIGIN)?;

    let e = ellps.eccentricity();
    let e2 = ellps.e2;
    let m1 = msfn(phi1, e2);
    let m2 = msfn(phi2, e2);
    let t1 = tsfn(phi1, e);
    let t2 = tsfn(phi2, e);
    let n = if (phi1 - phi2).abs() > 1e-10 {
        (m1.ln() - m2.ln()) / (t1.ln() - t2.ln())
    } else {
        phi1.sin()
    };
    if n == 0.0 || !n.is_finite() {
        return None;
    }
    let phi0 = n.asin();
    let m0 = msfn(phi0, e2);
    let t0 = tsfn(phi0, e);
    let tf = tsfn(phi_f, e);
    let k0 = m1 * t0.powf(n) / (m0 * t1.powf(n));
    let big_f = m1 / (n * t1.powf(n));
    let rho_f = ellps.a * big_f * tf.powf(n);
    let rho0 = ellps.a * big_f * t0.powf(n);
    let northing_m = nf.si_value() + rho_f - rho0;

    Some(build(
        EPSG_NAME_METHOD_LAMBERT_CONIC_CONFORMAL_1SP,
        EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP,
        vec![
            angle(
                EPSG_NAME_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN,
                EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN,
                snap_degrees(phi0.to_degrees()),
            ),
            copied(
                single,
                EPSG_CODE_PARAMETER_LONGITUDE_FALSE_ORIGIN,
                EPSG_NAME_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
                EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
            )?,
            OperationParameterValue::measure(
                EPSG_NAME_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN,
                EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN,
                Measure::new(k0, units::SCALE_UNITY),
            ),
            OperationParameterValue::measure(
                EPSG_NAME_PARAMETER_FALSE_EASTING,
                EPSG_CODE_PARAMETER_FALSE_EASTING,
                ef.clone(),
            ),
            linear(
                EPSG_NAME_PARAMETER_FALSE_NORTHING,
                EPSG_CODE_PARAMETER_FALSE_NORTHING,
                northing_m,
                nf.unit(),
            ),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::datum::{CLARKE_1880_IGN, GRS80, WGS84};
    use crate::operation::conversion;
    use approx::assert_relative_eq;

    fn lcc1(lat0: f64, k0: f64) -> SingleOperation {
        conversion::lambert_conic_conformal_1sp_values(
            Measure::degrees(lat0),
            Measure::degrees(3.0),
            Measure::unity(k0),
            Measure::metres(700_000.0),
            Measure::metres(6_600_000.0),
        )
    }

    #[test]
    fn test_msfn_equator_is_one() {
        assert_relative_eq!(msfn(0.0, WGS84.e2), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_lcc_1sp_2sp_roundtrip() {
        let src = lcc1(46.5, 0.999_877_42);
        let two = reparametrize(&src, &GRS80, EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP).unwrap();
        let phi1 = two.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL).unwrap();
        let phi2 = two.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_2ND_STD_PARALLEL).unwrap();
        assert!(phi1 > 46.5 && phi2 < 46.5);

        let back = reparametrize(&two, &GRS80, EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP).unwrap();
        assert_relative_eq!(
            back.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN).unwrap(),
            46.5,
            epsilon = 1e-8
        );
        assert_relative_eq!(
            back.parameter_degrees(EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN).unwrap(),
            3.0,
            epsilon = 1e-8
        );
        assert_relative_eq!(
            back.parameter_si(EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN).unwrap(),
            0.999_877_42,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            back.parameter_si(EPSG_CODE_PARAMETER_FALSE_EASTING).unwrap(),
            700_000.0,
            epsilon = 1e-6
        );
        assert_relative_eq!(
            back.parameter_si(EPSG_CODE_PARAMETER_FALSE_NORTHING).unwrap(),
            6_600_000.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_lcc_false_origin_moved_to_half_degree() {
        let (lat0, k0) = (46.8, 0.999_877_42);
        let src = lcc1(lat0, k0);
        let two = reparametrize(&src, &GRS80, EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP).unwrap();
        assert_eq!(two.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_FALSE_ORIGIN), Some(47.0));

        let e = GRS80.eccentricity();
        let (phi0, phi_f) = (lat0.to_radians(), 47.0_f64.to_radians());
        let n = phi0.sin();
        let big_f = msfn(phi0, GRS80.e2) * k0 / (n * tsfn(phi0, e).powf(n));
        let rho0 = GRS80.a * big_f * tsfn(phi0, e).powf(n);
        let rho_f = GRS80.a * big_f * tsfn(phi_f, e).powf(n);
        assert!(rho0 > rho_f);
        assert_relative_eq!(
            two.parameter_si(EPSG_CODE_PARAMETER_NORTHING_FALSE_ORIGIN).unwrap(),
            6_600_000.0 + rho0 - rho_f,
            epsilon = 1e-6
        );

        let back = reparametrize(&two, &GRS80, EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP).unwrap();
        assert_relative_eq!(
            back.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN).unwrap(),
            lat0,
            epsilon = 1e-8
        );
        assert_relative_eq!(
            back.parameter_si(EPSG_CODE_PARAMETER_FALSE_NORTHING).unwrap(),
            6_600_000.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_lcc_unit_scale_gives_tangent_cone() {
        let src = lcc1(49.5, 1.0);
        let two = reparametrize(&src, &CLARKE_1880_IGN, EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP)
            .unwrap();
        assert_eq!(
            two.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL),
            Some(49.5)
        );
        assert_eq!(
            two.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_2ND_STD_PARALLEL),
            Some(49.5)
        );
    }

    #[test]
    fn test_mercator_a_b_roundtrip() {
        let a = conversion::mercator_variant_a_values(
            Measure::degrees(0.0),
            Measure::degrees(110.0),
            Measure::unity(0.997),
            Measure::metres(3_900_000.0),
            Measure::metres(900_000.0),
        );
        let b = reparametrize(&a, &WGS84, EPSG_CODE_METHOD_MERCATOR_VARIANT_B).unwrap();
        let back = reparametrize(&b, &WGS84, EPSG_CODE_METHOD_MERCATOR_VARIANT_A).unwrap();
        assert_relative_eq!(
            back.parameter_si(EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN).unwrap(),
            0.997,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_mercator_a_requires_equatorial_origin() {
        let a = conversion::mercator_variant_a_values(
            Measure::degrees(1.0),
            Measure::degrees(0.0),
            Measure::unity(1.0),
            Measure::metres(0.0),
            Measure::metres(0.0),
        );
        assert!(reparametrize(&a, &WGS84, EPSG_CODE_METHOD_MERCATOR_VARIANT_B).is_none());
    }
}
