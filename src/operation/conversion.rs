//! Conversion builders and inverses.
//!
//! Map projections are built from their entry in the method mapping table so
//! that parameter names, codes and order always follow the table.

use std::sync::Arc;

use crate::common::units::{self, UnitOfMeasure};
use crate::common::{Measure, ObjectProps};
use crate::error::OperationError;

use super::constants::*;
use super::mappings::{self, MethodMapping};
use super::method::{OperationMethod, OperationParameterValue, SingleOperation};
use super::{inverse_common, inverse_props, CoordinateOperation, OperationCommon, OperationKind, OperationRef};

/// Conversion from a method and its values, checking they agree in count.
pub fn create(
    props: ObjectProps,
    method: OperationMethod,
    values: Vec<OperationParameterValue>,
) -> Result<OperationRef, OperationError> {
    let single = SingleOperation::new(method, values)?;
    Ok(from_single(props, single))
}

pub fn from_single(props: ObjectProps, single: SingleOperation) -> OperationRef {
    CoordinateOperation::new(OperationCommon::new(props), OperationKind::Conversion(single))
}

fn values_from_mapping(mapping: &MethodMapping, measures: Vec<Measure>) -> SingleOperation {
    let values = mapping
        .params
        .iter()
        .zip(measures)
        .map(|(p, m)| OperationParameterValue::measure(p.wkt2_name, p.epsg_code, m))
        .collect();
    SingleOperation::from_pairs(
        ObjectProps::named(mapping.wkt2_name).with_epsg(mapping.epsg_code),
        values,
    )
}

/// Values of a mapped projection method, in table order.
fn mapped_values(code: u32, measures: Vec<Measure>) -> SingleOperation {
    match mappings::method_by_code(code) {
        Some(mapping) => values_from_mapping(mapping, measures),
        None => SingleOperation::from_pairs(ObjectProps::named("unknown").with_epsg(code), Vec::new()),
    }
}

fn mapped(props: ObjectProps, code: u32, measures: Vec<Measure>) -> OperationRef {
    from_single(props, mapped_values(code, measures))
}

/// Universal Transverse Mercator zone. Identified as EPSG:16000+zone (north)
/// or EPSG:17000+zone (south).
pub fn utm(zone: u32, north: bool) -> OperationRef {
    let hemisphere = if north { 'N' } else { 'S' };
    let code = if north { 16000 + zone } else { 17000 + zone };
    transverse_mercator(
        ObjectProps::named(format!("UTM zone {zone}{hemisphere}")).with_epsg(code),
        Measure::degrees(0.0),
        Measure::degrees(f64::from(zone) * 6.0 - 183.0),
        Measure::unity(0.9996),
        Measure::metres(500_000.0),
        Measure::metres(if north { 0.0 } else { 10_000_000.0 }),
    )
}

/// Zone and hemisphere when `single` is exactly a UTM projection.
pub fn utm_zone(single: &SingleOperation) -> Option<(u32, bool)> {
    if single.method_epsg_code() != Some(EPSG_CODE_METHOD_TRANSVERSE_MERCATOR) {
        return None;
    }
    let lat0 = single.parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN)?;
    let lon0 = single.parameter_degrees(EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN)?;
    let k0 = single.parameter_si(EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN)?;
    let fe = single.parameter_si(EPSG_CODE_PARAMETER_FALSE_EASTING)?;
    let fn_ = single.parameter_si(EPSG_CODE_PARAMETER_FALSE_NORTHING)?;
    if lat0 != 0.0 || (k0 - 0.9996).abs() > 1e-10 || (fe - 500_000.0).abs() > 1e-8 {
        return None;
    }
    let zone = (lon0 + 183.0) / 6.0;
    if zone.fract().abs() > 1e-10 || !(1.0..=60.0).contains(&zone) {
        return None;
    }
    let north = if fn_ == 0.0 {
        true
    } else if (fn_ - 10_000_000.0).abs() < 1e-8 {
        false
    } else {
        return None;
    };
    Some((zone as u32, north))
}

pub fn transverse_mercator(
    props: ObjectProps,
    lat0: Measure,
    lon0: Measure,
    k0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    mapped(props, EPSG_CODE_METHOD_TRANSVERSE_MERCATOR, vec![lat0, lon0, k0, fe, fn_])
}

pub fn lambert_conic_conformal_1sp_values(
    lat0: Measure,
    lon0: Measure,
    k0: Measure,
    fe: Measure,
    fn_: Measure,
) -> SingleOperation {
    mapped_values(EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP, vec![lat0, lon0, k0, fe, fn_])
}

pub fn lambert_conic_conformal_1sp(
    props: ObjectProps,
    lat0: Measure,
    lon0: Measure,
    k0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    from_single(props, lambert_conic_conformal_1sp_values(lat0, lon0, k0, fe, fn_))
}

#[allow(clippy::too_many_arguments)]
pub fn lambert_conic_conformal_2sp(
    props: ObjectProps,
    lat_false_origin: Measure,
    lon_false_origin: Measure,
    lat1: Measure,
    lat2: Measure,
    easting_false_origin: Measure,
    northing_false_origin: Measure,
) -> OperationRef {
    mapped(
        props,
        EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP,
        vec![
            lat_false_origin,
            lon_false_origin,
            lat1,
            lat2,
            easting_false_origin,
            northing_false_origin,
        ],
    )
}

pub fn mercator_variant_a_values(
    lat0: Measure,
    lon0: Measure,
    k0: Measure,
    fe: Measure,
    fn_: Measure,
) -> SingleOperation {
    mapped_values(EPSG_CODE_METHOD_MERCATOR_VARIANT_A, vec![lat0, lon0, k0, fe, fn_])
}

pub fn mercator_variant_a(
    props: ObjectProps,
    lat0: Measure,
    lon0: Measure,
    k0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    from_single(props, mercator_variant_a_values(lat0, lon0, k0, fe, fn_))
}

pub fn mercator_variant_b(
    props: ObjectProps,
    lat1: Measure,
    lon0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    mapped(props, EPSG_CODE_METHOD_MERCATOR_VARIANT_B, vec![lat1, lon0, fe, fn_])
}

pub fn popular_visualisation_pseudo_mercator(
    props: ObjectProps,
    lat0: Measure,
    lon0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    mapped(
        props,
        EPSG_CODE_METHOD_POPULAR_VISUALISATION_PSEUDO_MERCATOR,
        vec![lat0, lon0, fe, fn_],
    )
}

pub fn lambert_azimuthal_equal_area(
    props: ObjectProps,
    lat0: Measure,
    lon0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    mapped(props, EPSG_CODE_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA, vec![lat0, lon0, fe, fn_])
}

pub fn equidistant_cylindrical(
    props: ObjectProps,
    lat1: Measure,
    lon0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    mapped(
        props,
        EPSG_CODE_METHOD_EQUIDISTANT_CYLINDRICAL,
        vec![lat1, Measure::degrees(0.0), lon0, fe, fn_],
    )
}

pub fn lambert_cylindrical_equal_area(
    props: ObjectProps,
    lat1: Measure,
    lon0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    mapped(props, EPSG_CODE_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA, vec![lat1, lon0, fe, fn_])
}

#[allow(clippy::too_many_arguments)]
pub fn albers_equal_area(
    props: ObjectProps,
    lat_false_origin: Measure,
    lon_false_origin: Measure,
    lat1: Measure,
    lat2: Measure,
    easting_false_origin: Measure,
    northing_false_origin: Measure,
) -> OperationRef {
    mapped(
        props,
        EPSG_CODE_METHOD_ALBERS_EQUAL_AREA,
        vec![
            lat_false_origin,
            lon_false_origin,
            lat1,
            lat2,
            easting_false_origin,
            northing_false_origin,
        ],
    )
}

pub fn polar_stereographic_variant_a(
    props: ObjectProps,
    lat0: Measure,
    lon0: Measure,
    k0: Measure,
    fe: Measure,
    fn_: Measure,
) -> OperationRef {
    mapped(
        props,
        EPSG_CODE_METHOD_POLAR_STEREOGRAPHIC_VARIANT_A,
        vec![lat0, lon0, k0, fe, fn_],
    )
}

fn parameterless(name: &str, method_name: &str, code: u32) -> OperationRef {
    from_single(
        ObjectProps::named(name),
        SingleOperation::from_pairs(ObjectProps::named(method_name).with_epsg(code), Vec::new()),
    )
}

/// Swap of the first two axes.
pub fn create_axis_order_reversal(is_3d: bool) -> OperationRef {
    if is_3d {
        parameterless(
            "axis order change (geographic3D horizontal)",
            EPSG_NAME_METHOD_AXIS_ORDER_REVERSAL_3D,
            EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_3D,
        )
    } else {
        parameterless(
            "axis order change (2D)",
            EPSG_NAME_METHOD_AXIS_ORDER_REVERSAL_2D,
            EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_2D,
        )
    }
}

pub fn is_axis_order_reversal(code: Option<u32>) -> bool {
    matches!(
        code,
        Some(EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_2D | EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_3D)
    )
}

pub fn create_geographic_geocentric() -> OperationRef {
    parameterless(
        "Conversion from geographic to geocentric",
        EPSG_NAME_METHOD_GEOGRAPHIC_GEOCENTRIC,
        EPSG_CODE_METHOD_GEOGRAPHIC_GEOCENTRIC,
    )
}

pub fn create_height_depth_reversal() -> OperationRef {
    parameterless(
        "Height Depth Reversal",
        EPSG_NAME_METHOD_HEIGHT_DEPTH_REVERSAL,
        EPSG_CODE_METHOD_HEIGHT_DEPTH_REVERSAL,
    )
}

pub fn create_geographic_3d_to_2d() -> OperationRef {
    parameterless(
        "Conversion from geographic 3D to 2D",
        EPSG_NAME_METHOD_GEOGRAPHIC3D_TO_2D,
        EPSG_CODE_METHOD_GEOGRAPHIC3D_TO_2D,
    )
}

/// Change of vertical unit by `factor` (source unit to target unit).
pub fn create_change_vertical_unit(props: ObjectProps, factor: f64) -> OperationRef {
    from_single(props, change_vertical_unit_values(factor))
}

pub(crate) fn change_vertical_unit_values(factor: f64) -> SingleOperation {
    SingleOperation::from_pairs(
        ObjectProps::named(EPSG_NAME_METHOD_CHANGE_VERTICAL_UNIT)
            .with_epsg(EPSG_CODE_METHOD_CHANGE_VERTICAL_UNIT),
        vec![OperationParameterValue::measure(
            EPSG_NAME_PARAMETER_UNIT_CONVERSION_SCALAR,
            EPSG_CODE_PARAMETER_UNIT_CONVERSION_SCALAR,
            Measure::new(factor, units::SCALE_UNITY),
        )],
    )
}

/// Factor converting values in `from` to values in `to`.
pub fn unit_ratio(from: &UnitOfMeasure, to: &UnitOfMeasure) -> f64 {
    from.conversion_to_si() / to.conversion_to_si()
}

pub(crate) fn reciprocal(factor: f64) -> f64 {
    if factor == 0.0 {
        0.0
    } else {
        1.0 / factor
    }
}

pub(crate) fn inverse(op: &OperationRef) -> OperationRef {
    let Some(single) = op.single() else {
        return CoordinateOperation::lazy_inverse(Arc::clone(op));
    };
    match single.method_epsg_code() {
        Some(EPSG_CODE_METHOD_CHANGE_VERTICAL_UNIT) => {
            let factor = single
                .parameter_si(EPSG_CODE_PARAMETER_UNIT_CONVERSION_SCALAR)
                .unwrap_or(1.0);
            let common = inverse_common(op, inverse_props(op, false));
            CoordinateOperation::new(
                common,
                OperationKind::Conversion(change_vertical_unit_values(reciprocal(factor))),
            )
        }
        Some(
            EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_2D
            | EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_3D
            | EPSG_CODE_METHOD_HEIGHT_DEPTH_REVERSAL,
        ) => {
            let common = inverse_common(op, op.props().into_owned());
            CoordinateOperation::new(common, OperationKind::Conversion(single.clone()))
        }
        Some(EPSG_CODE_METHOD_GEOGRAPHIC_GEOCENTRIC) => {
            let mut props = op.props().into_owned();
            props.name = if props.name.contains("geographic to geocentric") {
                props.name.replace("geographic to geocentric", "geocentric to geographic")
            } else {
                props.name.replace("geocentric to geographic", "geographic to geocentric")
            };
            let common = inverse_common(op, props);
            CoordinateOperation::new(common, OperationKind::Conversion(single.clone()))
        }
        _ => CoordinateOperation::lazy_inverse(Arc::clone(op)),
    }
}
