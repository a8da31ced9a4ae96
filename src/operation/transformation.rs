//! Transformation builders, inverses and grid-name substitution.

use std::sync::Arc;

use crate::common::units;
use crate::common::{Measure, ObjectProps};
use crate::crs::{CrsRef, CrsType};
use crate::error::{FormattingError, OperationError};
use crate::registry::AuthorityFactory;

use super::constants::*;
use super::conversion::{change_vertical_unit_values, reciprocal};
use super::method::{OperationMethod, OperationParameterValue, SingleOperation};
use super::{
    inverse_common, inverse_props, CoordinateOperation, OperationCommon, OperationKind,
    OperationRef, PositionalAccuracy,
};

/// Transformation from a method and its values, checking they agree in count.
pub fn create(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    interpolation: Option<CrsRef>,
    method: OperationMethod,
    values: Vec<OperationParameterValue>,
    accuracies: Vec<PositionalAccuracy>,
) -> Result<OperationRef, OperationError> {
    let single = SingleOperation::new(method, values)?;
    Ok(from_single(props, source, target, interpolation, single, accuracies))
}

pub fn from_single(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    interpolation: Option<CrsRef>,
    single: SingleOperation,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let common = OperationCommon::new(props)
        .with_crs_pair(source, target)
        .with_interpolation_crs(interpolation)
        .with_accuracies(accuracies);
    CoordinateOperation::new(common, OperationKind::Transformation(single))
}

fn method_values(name: &str, code: u32, values: Vec<OperationParameterValue>) -> SingleOperation {
    SingleOperation::from_pairs(ObjectProps::named(name).with_epsg(code), values)
}

fn metres(name: &str, code: u32, v: f64) -> OperationParameterValue {
    OperationParameterValue::measure(name, code, Measure::metres(v))
}

fn arc_seconds(name: &str, code: u32, v: f64) -> OperationParameterValue {
    OperationParameterValue::measure(name, code, Measure::new(v, units::ARC_SECOND))
}

fn translation_values(x: f64, y: f64, z: f64) -> Vec<OperationParameterValue> {
    vec![
        metres(EPSG_NAME_PARAMETER_X_AXIS_TRANSLATION, EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION, x),
        metres(EPSG_NAME_PARAMETER_Y_AXIS_TRANSLATION, EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION, y),
        metres(EPSG_NAME_PARAMETER_Z_AXIS_TRANSLATION, EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION, z),
    ]
}

/// Domain a geocentric-family method is expressed in, from the source CRS.
fn domain_of(source: &CrsRef) -> CrsType {
    match source.crs_type() {
        CrsType::Geocentric => CrsType::Geocentric,
        CrsType::Geographic3D => CrsType::Geographic3D,
        _ => CrsType::Geographic2D,
    }
}

pub fn geocentric_translations(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    x: f64,
    y: f64,
    z: f64,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let (name, code) = match domain_of(&source) {
        CrsType::Geocentric => (
            EPSG_NAME_METHOD_GEOCENTRIC_TRANSLATION_GEOCENTRIC,
            EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOCENTRIC,
        ),
        CrsType::Geographic3D => (
            EPSG_NAME_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_3D,
            EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_3D,
        ),
        _ => (
            EPSG_NAME_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_2D,
            EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_2D,
        ),
    };
    let single = method_values(name, code, translation_values(x, y, z));
    from_single(props, source, target, None, single, accuracies)
}

/// Rotation convention of a 7 or 15 parameter Helmert transformation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HelmertConvention {
    PositionVector,
    CoordinateFrame,
}

/// Translations (m), rotations (arc-second) and scale difference (ppm).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HelmertParams {
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub ds: f64,
}

impl HelmertParams {
    pub fn new(tx: f64, ty: f64, tz: f64, rx: f64, ry: f64, rz: f64, ds: f64) -> Self {
        Self { tx, ty, tz, rx, ry, rz, ds }
    }

    fn values(&self) -> Vec<OperationParameterValue> {
        let mut values = translation_values(self.tx, self.ty, self.tz);
        values.extend([
            arc_seconds(EPSG_NAME_PARAMETER_X_AXIS_ROTATION, EPSG_CODE_PARAMETER_X_AXIS_ROTATION, self.rx),
            arc_seconds(EPSG_NAME_PARAMETER_Y_AXIS_ROTATION, EPSG_CODE_PARAMETER_Y_AXIS_ROTATION, self.ry),
            arc_seconds(EPSG_NAME_PARAMETER_Z_AXIS_ROTATION, EPSG_CODE_PARAMETER_Z_AXIS_ROTATION, self.rz),
            OperationParameterValue::measure(
                EPSG_NAME_PARAMETER_SCALE_DIFFERENCE,
                EPSG_CODE_PARAMETER_SCALE_DIFFERENCE,
                Measure::new(self.ds, units::PARTS_PER_MILLION),
            ),
        ]);
        values
    }

    fn rate_values(&self) -> Vec<OperationParameterValue> {
        let rate = |name: &str, code: u32, v: f64, unit: units::UnitOfMeasure| {
            OperationParameterValue::measure(name, code, Measure::new(v, unit))
        };
        vec![
            rate(EPSG_NAME_PARAMETER_RATE_X_AXIS_TRANSLATION, EPSG_CODE_PARAMETER_RATE_X_AXIS_TRANSLATION, self.tx, units::METRE_PER_YEAR),
            rate(EPSG_NAME_PARAMETER_RATE_Y_AXIS_TRANSLATION, EPSG_CODE_PARAMETER_RATE_Y_AXIS_TRANSLATION, self.ty, units::METRE_PER_YEAR),
            rate(EPSG_NAME_PARAMETER_RATE_Z_AXIS_TRANSLATION, EPSG_CODE_PARAMETER_RATE_Z_AXIS_TRANSLATION, self.tz, units::METRE_PER_YEAR),
            rate(EPSG_NAME_PARAMETER_RATE_X_AXIS_ROTATION, EPSG_CODE_PARAMETER_RATE_X_AXIS_ROTATION, self.rx, units::ARC_SECOND_PER_YEAR),
            rate(EPSG_NAME_PARAMETER_RATE_Y_AXIS_ROTATION, EPSG_CODE_PARAMETER_RATE_Y_AXIS_ROTATION, self.ry, units::ARC_SECOND_PER_YEAR),
            rate(EPSG_NAME_PARAMETER_RATE_Z_AXIS_ROTATION, EPSG_CODE_PARAMETER_RATE_Z_AXIS_ROTATION, self.rz, units::ARC_SECOND_PER_YEAR),
            rate(EPSG_NAME_PARAMETER_RATE_SCALE_DIFFERENCE, EPSG_CODE_PARAMETER_RATE_SCALE_DIFFERENCE, self.ds, units::PPM_PER_YEAR),
        ]
    }
}

/// 7-parameter Helmert transformation.
pub fn helmert(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    convention: HelmertConvention,
    params: HelmertParams,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let domain = domain_of(&source);
    let (name, code) = match (convention, domain) {
        (HelmertConvention::PositionVector, CrsType::Geocentric) => (
            EPSG_NAME_METHOD_POSITION_VECTOR_GEOCENTRIC,
            EPSG_CODE_METHOD_POSITION_VECTOR_GEOCENTRIC,
        ),
        (HelmertConvention::PositionVector, CrsType::Geographic3D) => (
            EPSG_NAME_METHOD_POSITION_VECTOR_GEOGRAPHIC_3D,
            EPSG_CODE_METHOD_POSITION_VECTOR_GEOGRAPHIC_3D,
        ),
        (HelmertConvention::PositionVector, _) => (
            EPSG_NAME_METHOD_POSITION_VECTOR_GEOGRAPHIC_2D,
            EPSG_CODE_METHOD_POSITION_VECTOR_GEOGRAPHIC_2D,
        ),
        (HelmertConvention::CoordinateFrame, CrsType::Geocentric) => (
            EPSG_NAME_METHOD_COORDINATE_FRAME_GEOCENTRIC,
            EPSG_CODE_METHOD_COORDINATE_FRAME_GEOCENTRIC,
        ),
        (HelmertConvention::CoordinateFrame, CrsType::Geographic3D) => (
            EPSG_NAME_METHOD_COORDINATE_FRAME_GEOGRAPHIC_3D,
            EPSG_CODE_METHOD_COORDINATE_FRAME_GEOGRAPHIC_3D,
        ),
        (HelmertConvention::CoordinateFrame, _) => (
            EPSG_NAME_METHOD_COORDINATE_FRAME_GEOGRAPHIC_2D,
            EPSG_CODE_METHOD_COORDINATE_FRAME_GEOGRAPHIC_2D,
        ),
    };
    let single = method_values(name, code, params.values());
    from_single(props, source, target, None, single, accuracies)
}

/// 15-parameter time-dependent Helmert transformation. `rates` use per-year units.
#[allow(clippy::too_many_arguments)]
pub fn time_dependent_helmert(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    convention: HelmertConvention,
    params: HelmertParams,
    rates: HelmertParams,
    reference_epoch: f64,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let geocentric = domain_of(&source) == CrsType::Geocentric;
    let (name, code) = match (convention, geocentric) {
        (HelmertConvention::PositionVector, true) => (
            EPSG_NAME_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC,
            EPSG_CODE_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC,
        ),
        (HelmertConvention::PositionVector, false) => (
            EPSG_NAME_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOGRAPHIC_3D,
            EPSG_CODE_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOGRAPHIC_3D,
        ),
        (HelmertConvention::CoordinateFrame, true) => (
            EPSG_NAME_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC,
            EPSG_CODE_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC,
        ),
        (HelmertConvention::CoordinateFrame, false) => (
            EPSG_NAME_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOGRAPHIC_3D,
            EPSG_CODE_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOGRAPHIC_3D,
        ),
    };
    let mut values = params.values();
    values.extend(rates.rate_values());
    values.push(OperationParameterValue::measure(
        EPSG_NAME_PARAMETER_REFERENCE_EPOCH,
        EPSG_CODE_PARAMETER_REFERENCE_EPOCH,
        Measure::new(reference_epoch, units::YEAR),
    ));
    let single = method_values(name, code, values);
    from_single(props, source, target, None, single, accuracies)
}

#[allow(clippy::too_many_arguments)]
fn molodensky_family(
    name: &str,
    code: u32,
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    x: f64,
    y: f64,
    z: f64,
    da: f64,
    df: f64,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let mut values = translation_values(x, y, z);
    values.push(metres(
        EPSG_NAME_PARAMETER_SEMI_MAJOR_AXIS_DIFFERENCE,
        EPSG_CODE_PARAMETER_SEMI_MAJOR_AXIS_DIFFERENCE,
        da,
    ));
    values.push(OperationParameterValue::measure(
        EPSG_NAME_PARAMETER_FLATTENING_DIFFERENCE,
        EPSG_CODE_PARAMETER_FLATTENING_DIFFERENCE,
        Measure::unity(df),
    ));
    from_single(props, source, target, None, method_values(name, code, values), accuracies)
}

#[allow(clippy::too_many_arguments)]
pub fn molodensky(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    x: f64,
    y: f64,
    z: f64,
    da: f64,
    df: f64,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    molodensky_family(
        EPSG_NAME_METHOD_MOLODENSKY,
        EPSG_CODE_METHOD_MOLODENSKY,
        props,
        source,
        target,
        x,
        y,
        z,
        da,
        df,
        accuracies,
    )
}

#[allow(clippy::too_many_arguments)]
pub fn abridged_molodensky(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    x: f64,
    y: f64,
    z: f64,
    da: f64,
    df: f64,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    molodensky_family(
        EPSG_NAME_METHOD_ABRIDGED_MOLODENSKY,
        EPSG_CODE_METHOD_ABRIDGED_MOLODENSKY,
        props,
        source,
        target,
        x,
        y,
        z,
        da,
        df,
        accuracies,
    )
}

/// Longitude rotation. Exact, so its accuracy is 0.
pub fn longitude_rotation(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    offset: Measure,
) -> OperationRef {
    let single = method_values(
        EPSG_NAME_METHOD_LONGITUDE_ROTATION,
        EPSG_CODE_METHOD_LONGITUDE_ROTATION,
        vec![OperationParameterValue::measure(
            EPSG_NAME_PARAMETER_LONGITUDE_OFFSET,
            EPSG_CODE_PARAMETER_LONGITUDE_OFFSET,
            offset,
        )],
    );
    from_single(props, source, target, None, single, vec![PositionalAccuracy::Known(0.0)])
}

fn lat_lon_offsets(lat: Measure, lon: Measure) -> Vec<OperationParameterValue> {
    vec![
        OperationParameterValue::measure(
            EPSG_NAME_PARAMETER_LATITUDE_OFFSET,
            EPSG_CODE_PARAMETER_LATITUDE_OFFSET,
            lat,
        ),
        OperationParameterValue::measure(
            EPSG_NAME_PARAMETER_LONGITUDE_OFFSET,
            EPSG_CODE_PARAMETER_LONGITUDE_OFFSET,
            lon,
        ),
    ]
}

pub fn geographic2d_offsets(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    lat: Measure,
    lon: Measure,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let single = method_values(
        EPSG_NAME_METHOD_GEOGRAPHIC2D_OFFSETS,
        EPSG_CODE_METHOD_GEOGRAPHIC2D_OFFSETS,
        lat_lon_offsets(lat, lon),
    );
    from_single(props, source, target, None, single, accuracies)
}

#[allow(clippy::too_many_arguments)]
pub fn geographic3d_offsets(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    lat: Measure,
    lon: Measure,
    height: Measure,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let mut values = lat_lon_offsets(lat, lon);
    values.push(OperationParameterValue::measure(
        EPSG_NAME_PARAMETER_VERTICAL_OFFSET,
        EPSG_CODE_PARAMETER_VERTICAL_OFFSET,
        height,
    ));
    let single = method_values(
        EPSG_NAME_METHOD_GEOGRAPHIC3D_OFFSETS,
        EPSG_CODE_METHOD_GEOGRAPHIC3D_OFFSETS,
        values,
    );
    from_single(props, source, target, None, single, accuracies)
}

#[allow(clippy::too_many_arguments)]
pub fn geographic2d_with_height_offsets(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    lat: Measure,
    lon: Measure,
    height: Measure,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let mut values = lat_lon_offsets(lat, lon);
    values.push(OperationParameterValue::measure(
        EPSG_NAME_PARAMETER_GEOID_UNDULATION,
        EPSG_CODE_PARAMETER_GEOID_UNDULATION,
        height,
    ));
    let single = method_values(
        EPSG_NAME_METHOD_GEOGRAPHIC2D_WITH_HEIGHT_OFFSETS,
        EPSG_CODE_METHOD_GEOGRAPHIC2D_WITH_HEIGHT_OFFSETS,
        values,
    );
    from_single(props, source, target, None, single, accuracies)
}

pub fn vertical_offset(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    offset: Measure,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let single = method_values(
        EPSG_NAME_METHOD_VERTICAL_OFFSET,
        EPSG_CODE_METHOD_VERTICAL_OFFSET,
        vec![OperationParameterValue::measure(
            EPSG_NAME_PARAMETER_VERTICAL_OFFSET,
            EPSG_CODE_PARAMETER_VERTICAL_OFFSET,
            offset,
        )],
    );
    from_single(props, source, target, None, single, accuracies)
}

pub fn change_vertical_unit(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    factor: f64,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    from_single(props, source, target, None, change_vertical_unit_values(factor), accuracies)
}

pub fn ntv2(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    filename: &str,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let single = method_values(
        EPSG_NAME_METHOD_NTV2,
        EPSG_CODE_METHOD_NTV2,
        vec![OperationParameterValue::filename(
            EPSG_NAME_PARAMETER_LATITUDE_LONGITUDE_DIFFERENCE_FILE,
            EPSG_CODE_PARAMETER_LATITUDE_LONGITUDE_DIFFERENCE_FILE,
            filename,
        )],
    );
    from_single(props, source, target, None, single, accuracies)
}

/// Geographic 3D to gravity-related height through a geoid grid.
pub fn geographic3d_to_gravity_related_height(
    props: ObjectProps,
    source: CrsRef,
    target: CrsRef,
    filename: &str,
    interpolation: Option<CrsRef>,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let single = method_values(
        EPSG_NAME_METHOD_GEOGRAPHIC3D_TO_GRAVITYRELATEDHEIGHT_GTX,
        EPSG_CODE_METHOD_GEOGRAPHIC3D_TO_GRAVITYRELATEDHEIGHT_GTX,
        vec![OperationParameterValue::filename(
            EPSG_NAME_PARAMETER_GEOID_CORRECTION_FILENAME,
            EPSG_CODE_PARAMETER_GEOID_CORRECTION_FILENAME,
            filename,
        )],
    );
    from_single(props, source, target, interpolation, single, accuracies)
}

pub fn is_geographic3d_to_gravity_related_height(code: Option<u32>) -> bool {
    code == Some(EPSG_CODE_METHOD_GEOGRAPHIC3D_TO_GRAVITYRELATEDHEIGHT_GTX)
}

/// Seven TOWGS84 values (m, arc-second, ppm) in the Position Vector
/// convention, for WKT1 export.
pub fn towgs84_parameters(single: &SingleOperation) -> Result<[f64; 7], FormattingError> {
    let code = single.method_epsg_code().unwrap_or(0);
    let method_name = single.method.name();
    let count = single.values.len();
    let three = is_geocentric_translation(code)
        || (count == 3 && method_name.contains("Geocentric translations"));
    let coordinate_frame = HELMERT_7_PARAMS_METHODS.contains(&code) && !is_position_vector(code)
        || (count == 7 && method_name.contains("Coordinate Frame"));
    let seven = HELMERT_7_PARAMS_METHODS.contains(&code)
        || (count == 7 && (method_name.contains("Position Vector") || coordinate_frame));
    if !three && !seven {
        return Err(FormattingError::Unsupported(
            "Transformation cannot be formatted as WKT1 TOWGS84 parameters".to_string(),
        ));
    }
    let rot_sign = if coordinate_frame { -1.0 } else { 1.0 };
    // -0.0 is written as 0
    let fix_zero = |v: f64| if v == 0.0 { 0.0 } else { v };
    let missing = || {
        FormattingError::InvalidParameter(
            "Missing required parameter values in transformation".to_string(),
        )
    };
    let mut out = [0.0; 7];
    out[0] = single.parameter_si(EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION).ok_or_else(missing)?;
    out[1] = single.parameter_si(EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION).ok_or_else(missing)?;
    out[2] = single.parameter_si(EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION).ok_or_else(missing)?;
    if seven {
        for (i, c) in [
            EPSG_CODE_PARAMETER_X_AXIS_ROTATION,
            EPSG_CODE_PARAMETER_Y_AXIS_ROTATION,
            EPSG_CODE_PARAMETER_Z_AXIS_ROTATION,
        ]
        .into_iter()
        .enumerate()
        {
            let v = single.parameter_in(c, &units::ARC_SECOND).ok_or_else(missing)?;
            out[3 + i] = fix_zero(rot_sign * v);
        }
        out[6] = single
            .parameter_in(EPSG_CODE_PARAMETER_SCALE_DIFFERENCE, &units::PARTS_PER_MILLION)
            .ok_or_else(missing)?;
    }
    Ok(out)
}

/// Parameters whose negation gives the exact inverse, per method.
fn exactly_negatable(code: u32) -> Option<&'static [u32]> {
    const TRANSLATIONS: &[u32] = &[
        EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION,
        EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION,
        EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION,
    ];
    const MOLODENSKY: &[u32] = &[
        EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION,
        EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION,
        EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION,
        EPSG_CODE_PARAMETER_SEMI_MAJOR_AXIS_DIFFERENCE,
        EPSG_CODE_PARAMETER_FLATTENING_DIFFERENCE,
    ];
    match code {
        c if is_geocentric_translation(c) => Some(TRANSLATIONS),
        EPSG_CODE_METHOD_MOLODENSKY | EPSG_CODE_METHOD_ABRIDGED_MOLODENSKY => Some(MOLODENSKY),
        EPSG_CODE_METHOD_LONGITUDE_ROTATION => Some(&[EPSG_CODE_PARAMETER_LONGITUDE_OFFSET]),
        EPSG_CODE_METHOD_GEOGRAPHIC2D_OFFSETS => Some(&[
            EPSG_CODE_PARAMETER_LATITUDE_OFFSET,
            EPSG_CODE_PARAMETER_LONGITUDE_OFFSET,
        ]),
        EPSG_CODE_METHOD_GEOGRAPHIC3D_OFFSETS => Some(&[
            EPSG_CODE_PARAMETER_LATITUDE_OFFSET,
            EPSG_CODE_PARAMETER_LONGITUDE_OFFSET,
            EPSG_CODE_PARAMETER_VERTICAL_OFFSET,
        ]),
        EPSG_CODE_METHOD_GEOGRAPHIC2D_WITH_HEIGHT_OFFSETS => Some(&[
            EPSG_CODE_PARAMETER_LATITUDE_OFFSET,
            EPSG_CODE_PARAMETER_LONGITUDE_OFFSET,
            EPSG_CODE_PARAMETER_GEOID_UNDULATION,
        ]),
        EPSG_CODE_METHOD_VERTICAL_OFFSET => Some(&[EPSG_CODE_PARAMETER_VERTICAL_OFFSET]),
        _ => None,
    }
}

/// Method code, falling back to a name match for the geocentric translation family.
fn effective_code(single: &SingleOperation) -> Option<u32> {
    single.method_epsg_code().or_else(|| {
        (single.values.len() == 3 && single.method.name().contains("Geocentric translations"))
            .then_some(EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOCENTRIC)
    })
}

pub(crate) fn inverse(op: &OperationRef) -> OperationRef {
    let Some(single) = op.single() else {
        return CoordinateOperation::lazy_inverse(Arc::clone(op));
    };
    let Some(code) = effective_code(single) else {
        return CoordinateOperation::lazy_inverse(Arc::clone(op));
    };
    if code == EPSG_CODE_METHOD_CHANGE_VERTICAL_UNIT {
        let factor = single
            .parameter_si(EPSG_CODE_PARAMETER_UNIT_CONVERSION_SCALAR)
            .unwrap_or(1.0);
        let common = inverse_common(op, inverse_props(op, false));
        return CoordinateOperation::new(
            common,
            OperationKind::Transformation(change_vertical_unit_values(reciprocal(factor))),
        );
    }
    match exactly_negatable(code) {
        Some(codes) => {
            let common = inverse_common(op, inverse_props(op, false));
            CoordinateOperation::new(common, OperationKind::Transformation(single.negated(codes)))
        }
        None => CoordinateOperation::lazy_inverse(Arc::clone(op)),
    }
}

const HELMERT_NEGATED: &[u32] = &[
    EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION,
    EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION,
    EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION,
    EPSG_CODE_PARAMETER_X_AXIS_ROTATION,
    EPSG_CODE_PARAMETER_Y_AXIS_ROTATION,
    EPSG_CODE_PARAMETER_Z_AXIS_ROTATION,
    EPSG_CODE_PARAMETER_SCALE_DIFFERENCE,
    EPSG_CODE_PARAMETER_RATE_X_AXIS_TRANSLATION,
    EPSG_CODE_PARAMETER_RATE_Y_AXIS_TRANSLATION,
    EPSG_CODE_PARAMETER_RATE_Z_AXIS_TRANSLATION,
    EPSG_CODE_PARAMETER_RATE_X_AXIS_ROTATION,
    EPSG_CODE_PARAMETER_RATE_Y_AXIS_ROTATION,
    EPSG_CODE_PARAMETER_RATE_Z_AXIS_ROTATION,
    EPSG_CODE_PARAMETER_RATE_SCALE_DIFFERENCE,
];

/// Inverse of a 7 or 15 parameter Helmert transformation obtained by negating
/// every parameter but the reference epoch. Named with the
/// " (approx. inversion)" suffix unless rotations, scale and rates are all 0.
pub fn approximate_inverse(forward: &CoordinateOperation) -> Option<OperationRef> {
    let single = forward.single()?;
    let code = single.method_epsg_code()?;
    if !is_helmert(code) {
        return None;
    }
    let exact = HELMERT_NEGATED[3..]
        .iter()
        .all(|c| single.parameter_si(*c).map_or(true, |v| v == 0.0));
    let negated = single.negated(HELMERT_NEGATED);
    let common = inverse_common(forward, inverse_props(forward, !exact));
    Some(CoordinateOperation::new(common, OperationKind::Transformation(negated)))
}

/// Swaps grid filenames for their PROJ alternatives known to the registry.
/// NTv2 grids stored in the opposite direction yield the lazy inverse of a
/// transformation built in that direction.
pub fn substitute_alt_grid_names(
    op: &OperationRef,
    registry: &dyn AuthorityFactory,
) -> Result<OperationRef, OperationError> {
    let Some(single) = op.single() else {
        return Ok(Arc::clone(op));
    };
    if op.inverse_of().is_some() {
        let forward = substitute_alt_grid_names(&op.inverse(), registry)?;
        return Ok(forward.inverse());
    }
    match single.method_epsg_code() {
        Some(EPSG_CODE_METHOD_NTV2) => {
            let Some(grid) = single.parameter_filename(EPSG_CODE_PARAMETER_LATITUDE_LONGITUDE_DIFFERENCE_FILE)
            else {
                return Ok(Arc::clone(op));
            };
            let Some(alt) = registry.grid_alternative(grid) else {
                return Ok(Arc::clone(op));
            };
            if alt.proj_filename == grid {
                if alt.inverse_direction {
                    return Err(OperationError::Unsupported(format!(
                        "Inverse direction for {} not supported",
                        alt.proj_filename
                    )));
                }
                return Ok(Arc::clone(op));
            }
            let pair = op.crs_pair().ok_or_else(|| {
                OperationError::Unsupported(
                    if op.source_crs().is_none() { "Missing sourceCRS" } else { "Missing targetCRS" }
                        .to_string(),
                )
            })?;
            let accuracies = op.accuracies().to_vec();
            if alt.format != "NTv2" {
                return Ok(Arc::clone(op));
            }
            if alt.inverse_direction {
                let reversed = ntv2(
                    inverse_props(op, false),
                    Arc::clone(&pair.target),
                    Arc::clone(&pair.source),
                    &alt.proj_filename,
                    accuracies,
                );
                Ok(CoordinateOperation::lazy_inverse(reversed))
            } else {
                Ok(ntv2(
                    op.props().into_owned(),
                    pair.source,
                    pair.target,
                    &alt.proj_filename,
                    accuracies,
                ))
            }
        }
        Some(EPSG_CODE_METHOD_GEOGRAPHIC3D_TO_GRAVITYRELATEDHEIGHT_GTX) => {
            let Some(grid) = single.parameter_filename(EPSG_CODE_PARAMETER_GEOID_CORRECTION_FILENAME)
            else {
                return Ok(Arc::clone(op));
            };
            let Some(alt) = registry.grid_alternative(grid) else {
                return Ok(Arc::clone(op));
            };
            if alt.inverse_direction {
                return Err(OperationError::Unsupported(format!(
                    "Inverse direction for {} not supported",
                    alt.proj_filename
                )));
            }
            if alt.proj_filename == grid {
                return Ok(Arc::clone(op));
            }
            let mut replaced = single.clone();
            for v in &mut replaced.values {
                if v.parameter.epsg_code() == Some(EPSG_CODE_PARAMETER_GEOID_CORRECTION_FILENAME) {
                    v.value = super::ParameterValue::Filename(alt.proj_filename.clone());
                }
            }
            let mut common = op.common().clone();
            common.crs_pair = op.crs_pair();
            Ok(CoordinateOperation::new(common, OperationKind::Transformation(replaced)))
        }
        _ => Ok(Arc::clone(op)),
    }
}
