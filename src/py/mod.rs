//! Python bindings over the preset CRS and a registry-less factory.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::common::Measure;
use crate::crs::{datum::Ellipsoid, presets, CrsRef};
use crate::factory::{CoordinateOperationContext, CoordinateOperationFactory};
use crate::io::{crs_to_wkt, to_proj_string, WktVersion};
use crate::operation::constants::*;
use crate::operation::metadata::accuracy_of;
use crate::operation::{conversion, reparam};

/// Register all Python-visible functions.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(create_utm, m)?)?;
    m.add_function(wrap_pyfunction!(lcc_1sp_to_2sp, m)?)?;
    m.add_function(wrap_pyfunction!(create_operations, m)?)?;
    Ok(())
}

fn preset(key: &str) -> PyResult<CrsRef> {
    presets::lookup(key).ok_or_else(|| PyValueError::new_err(format!("Unknown CRS: '{key}'")))
}

/// WKT2:2019 of the WGS 84 / UTM projected CRS for `zone`.
#[pyfunction]
#[pyo3(signature = (zone, north=true))]
pub fn create_utm(zone: u32, north: bool) -> PyResult<String> {
    if !(1..=60).contains(&zone) {
        return Err(PyValueError::new_err(format!("Invalid UTM zone: {zone}")));
    }
    crs_to_wkt(&presets::utm_wgs84(zone, north), WktVersion::Wkt2_2019)
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

/// Converts Lambert Conic Conformal (1SP) parameters to their 2SP equivalent.
///
/// Args:
///     lat0, lon0: Natural origin in degrees.
///     k0: Scale factor at the natural origin.
///     fe, fn_: False easting and northing in metres.
///     a: Semi-major axis of the ellipsoid in metres.
///     rf: Inverse flattening of the ellipsoid.
///
/// Returns:
///     Dict with lat_false_origin, lon_false_origin, lat_1, lat_2 (degrees)
///     and easting_false_origin, northing_false_origin (metres).
#[pyfunction]
#[allow(clippy::too_many_arguments)]
pub fn lcc_1sp_to_2sp(
    py: Python<'_>,
    lat0: f64,
    lon0: f64,
    k0: f64,
    fe: f64,
    fn_: f64,
    a: f64,
    rf: f64,
) -> PyResult<PyObject> {
    let single = conversion::lambert_conic_conformal_1sp_values(
        Measure::degrees(lat0),
        Measure::degrees(lon0),
        Measure::unity(k0),
        Measure::metres(fe),
        Measure::metres(fn_),
    );
    let ellipsoid = Ellipsoid::from_inverse_flattening("user", a, rf);
    let two = reparam::reparametrize(&single, &ellipsoid, EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP)
        .ok_or_else(|| PyValueError::new_err("LCC 1SP parameters cannot be converted to 2SP"))?;

    let dict = PyDict::new_bound(py);
    for (key, code) in [
        ("lat_false_origin", EPSG_CODE_PARAMETER_LATITUDE_FALSE_ORIGIN),
        ("lon_false_origin", EPSG_CODE_PARAMETER_LONGITUDE_FALSE_ORIGIN),
        ("lat_1", EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL),
        ("lat_2", EPSG_CODE_PARAMETER_LATITUDE_2ND_STD_PARALLEL),
    ] {
        dict.set_item(key, two.parameter_degrees(code))?;
    }
    for (key, code) in [
        ("easting_false_origin", EPSG_CODE_PARAMETER_EASTING_FALSE_ORIGIN),
        ("northing_false_origin", EPSG_CODE_PARAMETER_NORTHING_FALSE_ORIGIN),
    ] {
        dict.set_item(key, two.parameter_si(code))?;
    }
    Ok(dict.into_any().unbind())
}

/// Ranked operations between two preset CRS, without registry.
///
/// Args:
///     source: Preset key, "AUTH:CODE" or exact name (e.g. "EPSG:4326").
///     target: Preset key of the target CRS.
///     allow_ballpark: Whether ballpark operations may be returned.
///
/// Returns:
///     List of dicts with keys name, proj (PROJ string or None) and
///     accuracy (metres, -1 when unknown), best first.
#[pyfunction]
#[pyo3(signature = (source, target, allow_ballpark=true))]
pub fn create_operations(
    py: Python<'_>,
    source: &str,
    target: &str,
    allow_ballpark: bool,
) -> PyResult<Vec<PyObject>> {
    let source = preset(source)?;
    let target = preset(target)?;
    let ops = py
        .allow_threads(move || {
            let ctx = CoordinateOperationContext::default().with_allow_ballpark(allow_ballpark);
            CoordinateOperationFactory::new().create_operations(&source, &target, &ctx)
        })
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;

    let mut out = Vec::with_capacity(ops.len());
    for op in &ops {
        let dict = PyDict::new_bound(py);
        dict.set_item("name", op.name().as_ref())?;
        dict.set_item("proj", to_proj_string(op).ok())?;
        dict.set_item("accuracy", accuracy_of(op))?;
        out.push(dict.into_any().unbind());
    }
    Ok(out)
}
