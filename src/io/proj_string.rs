//! PROJ string export.
//!
//! Operations are flattened into an ordered list of [`ProjStep`]s. Inverse
//! operations are written by exporting the forward operation inside an
//! inversion scope, which reverses and inverts the steps it produced.
//! Consecutive steps undoing each other are removed before rendering, so an
//! operation that does nothing renders as `+proj=noop`.

use crate::common::units::{self, UnitOfMeasure};
use crate::common::UnitType;
use crate::crs::{Crs, CrsRef, Ellipsoid};
use crate::error::FormattingError;
use crate::operation::constants::*;
use crate::operation::mappings::lookup_method;
use crate::operation::method::ParameterValue;
use crate::operation::{conversion, CoordinateOperation, OperationKind, ProjSource, SingleOperation};

use super::format_number;

/// One `+proj=...` step with its parameters, in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjStep {
    pub name: String,
    pub inverted: bool,
    pub params: Vec<(String, Option<String>)>,
}

impl ProjStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inverted: false,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), Some(value.into())));
        self
    }

    pub fn num(self, key: &str, value: f64) -> Self {
        self.param(key, format_number(value))
    }

    pub fn flag(mut self, key: &str) -> Self {
        self.params.push((key.to_string(), None));
        self
    }

    pub fn inverse(mut self) -> Self {
        self.inverted = !self.inverted;
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }

    fn render(&self, out: &mut String) {
        if self.inverted {
            out.push_str("+inv ");
        }
        out.push_str("+proj=");
        out.push_str(&self.name);
        for (key, value) in &self.params {
            out.push_str(" +");
            out.push_str(key);
            if let Some(value) = value {
                out.push('=');
                out.push_str(value);
            }
        }
    }
}

const UNIT_PAIRS: &[(&str, &str)] = &[("xy_in", "xy_out"), ("z_in", "z_out"), ("t_in", "t_out")];

/// Whether an `axisswap` order applied twice is the identity.
fn is_involution(order: &str) -> bool {
    let perm: Vec<i32> = order.split(',').filter_map(|s| s.trim().parse().ok()).collect();
    if perm.is_empty() {
        return false;
    }
    perm.iter().enumerate().all(|(i, &p)| {
        let j = p.unsigned_abs() as usize;
        match perm.get(j.wrapping_sub(1)) {
            Some(&q) => q.unsigned_abs() as usize == i + 1 && p.signum() * q.signum() == 1,
            None => false,
        }
    })
}

fn is_self_inverse(step: &ProjStep) -> bool {
    match step.name.as_str() {
        "noop" => true,
        "axisswap" => step.get("order").is_some_and(is_involution),
        _ => false,
    }
}

/// Parameters of a `unitconvert` step with input and output units exchanged.
fn swap_units(params: &mut [(String, Option<String>)]) {
    for (input, output) in UNIT_PAIRS {
        let i = params.iter().position(|(k, _)| k == input);
        let o = params.iter().position(|(k, _)| k == output);
        if let (Some(i), Some(o)) = (i, o) {
            let tmp = params[i].1.take();
            params[i].1 = params[o].1.take();
            params[o].1 = tmp;
        }
    }
}

fn invert_step(step: &mut ProjStep) {
    match step.name.as_str() {
        "unitconvert" if !step.inverted => swap_units(&mut step.params),
        "push" => step.name = "pop".to_string(),
        "pop" => step.name = "push".to_string(),
        _ if is_self_inverse(step) => {}
        _ => step.inverted = !step.inverted,
    }
}

fn sorted(params: &[(String, Option<String>)]) -> Vec<(String, Option<String>)> {
    let mut out = params.to_vec();
    out.sort();
    out
}

/// Whether `b` undoes `a`.
fn cancels(a: &ProjStep, b: &ProjStep) -> bool {
    if a.name != b.name {
        return matches!(
            (a.name.as_str(), b.name.as_str()),
            ("push", "pop") | ("pop", "push")
        ) && a.params == b.params;
    }
    if a.inverted != b.inverted {
        return sorted(&a.params) == sorted(&b.params);
    }
    if a.inverted {
        return false;
    }
    match a.name.as_str() {
        "unitconvert" => {
            let mut swapped = a.params.clone();
            swap_units(&mut swapped);
            sorted(&swapped) == sorted(&b.params)
        }
        _ => is_self_inverse(a) && a.params == b.params,
    }
}

fn is_identity(step: &ProjStep) -> bool {
    match step.name.as_str() {
        "noop" => true,
        "unitconvert" => UNIT_PAIRS
            .iter()
            .all(|(i, o)| step.get(i) == step.get(o)),
        _ => false,
    }
}

/// Accumulates PROJ steps.
#[derive(Debug, Default)]
pub struct ProjStringFormatter {
    steps: Vec<ProjStep>,
    inversion_marks: Vec<usize>,
}

impl ProjStringFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step(&mut self, step: ProjStep) {
        self.steps.push(step);
    }

    pub fn steps(&self) -> &[ProjStep] {
        &self.steps
    }

    /// Steps added until the matching [`stop_inversion`](Self::stop_inversion)
    /// are reversed and inverted.
    pub fn start_inversion(&mut self) {
        self.inversion_marks.push(self.steps.len());
    }

    pub fn stop_inversion(&mut self) {
        let Some(mark) = self.inversion_marks.pop() else {
            return;
        };
        let tail = &mut self.steps[mark..];
        tail.reverse();
        tail.iter_mut().for_each(invert_step);
    }

    /// Saves the third coordinate so that a 2D step leaves it untouched.
    pub fn push_v3(&mut self) {
        self.add_step(ProjStep::new("push").flag("v_3"));
    }

    pub fn pop_v3(&mut self) {
        self.add_step(ProjStep::new("pop").flag("v_3"));
    }

    /// Appends the steps of a PROJ string, either a single operation or a
    /// `+proj=pipeline`.
    pub fn ingest(&mut self, text: &str) -> Result<(), FormattingError> {
        let tokens: Vec<&str> = text.split_whitespace().map(|t| t.trim_start_matches('+')).collect();
        let is_pipeline = tokens.first() == Some(&"proj=pipeline");
        let groups: Vec<&[&str]> = if is_pipeline {
            let body = &tokens[1..];
            let mut parts = body.split(|t| *t == "step");
            if parts.next().is_some_and(|global| !global.is_empty()) {
                return Err(FormattingError::Unsupported(
                    "Global pipeline parameters are not supported".to_string(),
                ));
            }
            parts.collect()
        } else {
            vec![&tokens[..]]
        };
        for group in groups {
            let mut step: Option<ProjStep> = None;
            let mut inverted = false;
            let mut params = Vec::new();
            for token in group {
                match token.split_once('=') {
                    _ if *token == "inv" => inverted = true,
                    Some(("proj", name)) => step = Some(ProjStep::new(name)),
                    Some((k, v)) => params.push((k.to_string(), Some(v.to_string()))),
                    None => params.push((token.to_string(), None)),
                }
            }
            let mut step = step.ok_or_else(|| {
                FormattingError::Unsupported(format!("Missing proj= in PROJ string step: {text}"))
            })?;
            step.inverted = inverted;
            step.params = params;
            self.add_step(step);
        }
        Ok(())
    }

    fn optimize(&mut self) {
        self.steps.retain(|s| !is_identity(s));
        'restart: loop {
            for i in 0..self.steps.len().saturating_sub(1) {
                if cancels(&self.steps[i], &self.steps[i + 1]) {
                    self.steps.drain(i..i + 2);
                    continue 'restart;
                }
            }
            break;
        }
    }

    /// Renders the optimized steps.
    pub fn finish(mut self) -> String {
        self.optimize();
        let mut out = String::new();
        match self.steps.as_slice() {
            [] => out.push_str("+proj=noop"),
            [single] if !single.inverted => single.render(&mut out),
            steps => {
                out.push_str("+proj=pipeline");
                for step in steps {
                    out.push_str(" +step ");
                    step.render(&mut out);
                }
            }
        }
        out
    }
}

/// PROJ string of `op`.
pub fn to_proj_string(op: &CoordinateOperation) -> Result<String, FormattingError> {
    let mut formatter = ProjStringFormatter::new();
    export_operation(op, &mut formatter)?;
    Ok(formatter.finish())
}

/// Appends the steps of `op` to `f`.
pub fn export_operation(op: &CoordinateOperation, f: &mut ProjStringFormatter) -> Result<(), FormattingError> {
    match op.kind() {
        OperationKind::Concatenated(c) => {
            for step in &c.steps {
                export_operation(step, f)?;
            }
            Ok(())
        }
        OperationKind::InverseOf(forward) => {
            f.start_inversion();
            export_operation(forward, f)?;
            f.stop_inversion();
            Ok(())
        }
        OperationKind::ProjBased(p) => {
            if p.is_inverted() {
                f.start_inversion();
            }
            match p.source() {
                ProjSource::Pipeline(text) => f.ingest(text)?,
                ProjSource::HorizVertical {
                    horizontal,
                    vertical,
                } => {
                    f.push_v3();
                    export_operation(horizontal, f)?;
                    f.pop_v3();
                    export_operation(vertical, f)?;
                }
                ProjSource::Interpolated {
                    to_interpolation,
                    vertical,
                    from_interpolation,
                } => {
                    f.push_v3();
                    export_operation(to_interpolation, f)?;
                    f.pop_v3();
                    export_operation(vertical, f)?;
                    f.push_v3();
                    export_operation(from_interpolation, f)?;
                    f.pop_v3();
                }
            }
            if p.is_inverted() {
                f.stop_inversion();
            }
            Ok(())
        }
        OperationKind::Conversion(single) => export_conversion(op, single, f),
        OperationKind::Transformation(single) => export_transformation(op, single, f),
    }
}

fn unit_name(unit: &UnitOfMeasure) -> Result<&'static str, FormattingError> {
    unit.proj_name()
        .ok_or_else(|| FormattingError::Unsupported(format!("Unsupported unit: {unit}")))
}

fn with_ellipsoid(step: ProjStep, ellipsoid: Option<&Ellipsoid>) -> ProjStep {
    let Some(ellps) = ellipsoid else {
        return step;
    };
    match ellps.proj_ellps_name() {
        Some(name) => step.param("ellps", name),
        None if ellps.is_sphere() => step.num("R", ellps.a),
        None => step.num("a", ellps.a).num("rf", ellps.inverse_flattening()),
    }
}

/// Steps taking coordinates expressed in `crs` to the working space of
/// PROJ operations: longitude, latitude in radians for geographic CRS,
/// easting, northing in metres for projected CRS.
fn enter(f: &mut ProjStringFormatter, crs: &Crs) -> Result<(), FormattingError> {
    let Some(cs) = crs.coordinate_system() else {
        return Ok(());
    };
    if crs.is_geographic() {
        if cs.is_north_first() {
            f.add_step(ProjStep::new("axisswap").param("order", "2,1"));
        }
        let angular = cs.angular_unit().unwrap_or(units::DEGREE);
        let mut step = ProjStep::new("unitconvert")
            .param("xy_in", unit_name(&angular)?)
            .param("xy_out", "rad");
        if let Some(height) = cs.vertical_unit().filter(|u| *u != units::METRE) {
            step = step.param("z_in", unit_name(&height)?).param("z_out", "m");
        }
        f.add_step(step);
    } else if crs.is_projected() {
        let unit = cs.primary_unit();
        if unit.unit_type() == UnitType::Linear && unit != units::METRE {
            f.add_step(
                ProjStep::new("unitconvert")
                    .param("xy_in", unit_name(&unit)?)
                    .param("xy_out", "m"),
            );
        }
        if cs.is_north_first() {
            f.add_step(ProjStep::new("axisswap").param("order", "2,1"));
        }
    }
    Ok(())
}

fn leave(f: &mut ProjStringFormatter, crs: &Crs) -> Result<(), FormattingError> {
    f.start_inversion();
    enter(f, crs)?;
    f.stop_inversion();
    Ok(())
}

fn crs_pair(op: &CoordinateOperation) -> Result<(&CrsRef, &CrsRef), FormattingError> {
    match (op.source_crs(), op.target_crs()) {
        (Some(s), Some(t)) => Ok((s, t)),
        (None, _) => Err(FormattingError::Unsupported("Missing sourceCRS".to_string())),
        (_, None) => Err(FormattingError::Unsupported("Missing targetCRS".to_string())),
    }
}

/// Runs `core` between the normalisation steps of the CRS pair, when set.
fn framed(
    op: &CoordinateOperation,
    f: &mut ProjStringFormatter,
    core: impl FnOnce(&mut ProjStringFormatter) -> Result<(), FormattingError>,
) -> Result<(), FormattingError> {
    match (op.source_crs(), op.target_crs()) {
        (Some(src), Some(dst)) => {
            enter(f, src)?;
            core(f)?;
            leave(f, dst)
        }
        _ => core(f),
    }
}

fn projection_step(single: &SingleOperation, ellipsoid: Option<&Ellipsoid>) -> Result<ProjStep, FormattingError> {
    if let Some((zone, north)) = conversion::utm_zone(single) {
        let mut step = ProjStep::new("utm").param("zone", zone.to_string());
        if !north {
            step = step.flag("south");
        }
        return Ok(with_ellipsoid(step, ellipsoid));
    }
    let mapping = lookup_method(single.method_epsg_code(), single.method.name()).ok_or_else(|| {
        FormattingError::Unsupported(format!("Unsupported conversion method: {}", single.method.name()))
    })?;
    let mut step = ProjStep::new(mapping.proj_name);
    for aux in mapping.proj_aux {
        step = step.flag(aux);
    }
    for param in mapping.params {
        let Some(key) = param.proj_name else {
            continue;
        };
        let measure = single
            .parameter_value(param.epsg_code, param.wkt2_name)
            .and_then(ParameterValue::as_measure)
            .ok_or_else(|| FormattingError::InvalidParameter(format!("Missing parameter {}", param.wkt2_name)))?;
        let value = match param.unit_type {
            UnitType::Angular => measure.convert_to(&units::DEGREE),
            _ => measure.si_value(),
        };
        step = step.num(key, value);
    }
    Ok(with_ellipsoid(step, ellipsoid))
}

fn vertical_unit_change(op: &CoordinateOperation, single: &SingleOperation) -> ProjStep {
    let units = op
        .source_crs()
        .and_then(|s| s.vertical_unit())
        .zip(op.target_crs().and_then(|t| t.vertical_unit()));
    if let Some((from, to)) = units {
        if let (Some(from), Some(to)) = (from.proj_name(), to.proj_name()) {
            return ProjStep::new("unitconvert").param("z_in", from).param("z_out", to);
        }
    }
    let factor = single
        .parameter_si(EPSG_CODE_PARAMETER_UNIT_CONVERSION_SCALAR)
        .unwrap_or(1.0);
    ProjStep::new("affine").num("s33", factor)
}

fn export_conversion(
    op: &CoordinateOperation,
    single: &SingleOperation,
    f: &mut ProjStringFormatter,
) -> Result<(), FormattingError> {
    match single.method_epsg_code() {
        Some(EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_2D | EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_3D) => {
            if op.has_crs_pair() {
                framed(op, f, |_| Ok(()))
            } else {
                f.add_step(ProjStep::new("axisswap").param("order", "2,1"));
                Ok(())
            }
        }
        Some(EPSG_CODE_METHOD_GEOGRAPHIC_GEOCENTRIC) => {
            let (src, dst) = crs_pair(op)?;
            if src.is_geocentric() {
                f.add_step(with_ellipsoid(ProjStep::new("cart"), dst.ellipsoid()).inverse());
                leave(f, dst)
            } else {
                enter(f, src)?;
                f.add_step(with_ellipsoid(ProjStep::new("cart"), src.ellipsoid()));
                Ok(())
            }
        }
        Some(EPSG_CODE_METHOD_GEOGRAPHIC3D_TO_2D) => framed(op, f, |_| Ok(())),
        Some(EPSG_CODE_METHOD_CHANGE_VERTICAL_UNIT) => {
            f.add_step(vertical_unit_change(op, single));
            Ok(())
        }
        Some(EPSG_CODE_METHOD_HEIGHT_DEPTH_REVERSAL) => {
            f.add_step(ProjStep::new("axisswap").param("order", "1,2,-3"));
            Ok(())
        }
        _ => {
            let step = projection_step(single, op.source_crs().and_then(|s| s.ellipsoid()))?;
            framed(op, f, |f| {
                f.add_step(step);
                Ok(())
            })
        }
    }
}

fn param_in(single: &SingleOperation, code: u32, unit: &UnitOfMeasure) -> Result<f64, FormattingError> {
    single
        .parameter_in(code, unit)
        .ok_or_else(|| FormattingError::InvalidParameter(format!("Missing parameter with code {code}")))
}

fn helmert_step(single: &SingleOperation, code: u32) -> Result<ProjStep, FormattingError> {
    let mut step = ProjStep::new("helmert")
        .num("x", param_in(single, EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION, &units::METRE)?)
        .num("y", param_in(single, EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION, &units::METRE)?)
        .num("z", param_in(single, EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION, &units::METRE)?);
    if is_geocentric_translation(code) {
        return Ok(step);
    }
    step = step
        .num("rx", param_in(single, EPSG_CODE_PARAMETER_X_AXIS_ROTATION, &units::ARC_SECOND)?)
        .num("ry", param_in(single, EPSG_CODE_PARAMETER_Y_AXIS_ROTATION, &units::ARC_SECOND)?)
        .num("rz", param_in(single, EPSG_CODE_PARAMETER_Z_AXIS_ROTATION, &units::ARC_SECOND)?)
        .num("s", param_in(single, EPSG_CODE_PARAMETER_SCALE_DIFFERENCE, &units::PARTS_PER_MILLION)?);
    if HELMERT_15_PARAMS_METHODS.contains(&code) {
        step = step
            .num("dx", param_in(single, EPSG_CODE_PARAMETER_RATE_X_AXIS_TRANSLATION, &units::METRE_PER_YEAR)?)
            .num("dy", param_in(single, EPSG_CODE_PARAMETER_RATE_Y_AXIS_TRANSLATION, &units::METRE_PER_YEAR)?)
            .num("dz", param_in(single, EPSG_CODE_PARAMETER_RATE_Z_AXIS_TRANSLATION, &units::METRE_PER_YEAR)?)
            .num("drx", param_in(single, EPSG_CODE_PARAMETER_RATE_X_AXIS_ROTATION, &units::ARC_SECOND_PER_YEAR)?)
            .num("dry", param_in(single, EPSG_CODE_PARAMETER_RATE_Y_AXIS_ROTATION, &units::ARC_SECOND_PER_YEAR)?)
            .num("drz", param_in(single, EPSG_CODE_PARAMETER_RATE_Z_AXIS_ROTATION, &units::ARC_SECOND_PER_YEAR)?)
            .num("ds", param_in(single, EPSG_CODE_PARAMETER_RATE_SCALE_DIFFERENCE, &units::PPM_PER_YEAR)?)
            .num("t_epoch", param_in(single, EPSG_CODE_PARAMETER_REFERENCE_EPOCH, &units::YEAR)?);
    }
    let convention = if is_position_vector(code) {
        "position_vector"
    } else {
        "coordinate_frame"
    };
    Ok(step.param("convention", convention))
}

fn geogoffset_step(single: &SingleOperation) -> Option<ProjStep> {
    let lat = single.parameter_in(EPSG_CODE_PARAMETER_LATITUDE_OFFSET, &units::ARC_SECOND);
    let lon = single.parameter_in(EPSG_CODE_PARAMETER_LONGITUDE_OFFSET, &units::ARC_SECOND);
    let height = single
        .parameter_si(EPSG_CODE_PARAMETER_VERTICAL_OFFSET)
        .or_else(|| single.parameter_si(EPSG_CODE_PARAMETER_GEOID_UNDULATION));
    if [lat, lon, height].iter().all(|v| v.map_or(true, |v| v == 0.0)) {
        return None;
    }
    let mut step = ProjStep::new("geogoffset");
    if let Some(lat) = lat {
        step = step.num("dlat", lat);
    }
    if let Some(lon) = lon {
        step = step.num("dlon", lon);
    }
    if let Some(h) = height {
        step = step.num("dh", h);
    }
    Some(step)
}

fn grid_file<'a>(single: &'a SingleOperation, code: u32) -> Result<&'a str, FormattingError> {
    single
        .parameter_filename(code)
        .ok_or_else(|| FormattingError::InvalidParameter("Missing grid filename".to_string()))
}

fn export_transformation(
    op: &CoordinateOperation,
    single: &SingleOperation,
    f: &mut ProjStringFormatter,
) -> Result<(), FormattingError> {
    let unsupported = || {
        FormattingError::Unsupported(format!("Unsupported transformation method: {}", single.method.name()))
    };
    let code = single.method_epsg_code().ok_or_else(unsupported)?;
    match code {
        c if is_geocentric_translation(c) || is_helmert(c) => {
            let (src, dst) = crs_pair(op)?;
            let helmert = helmert_step(single, c)?;
            if src.is_geocentric() {
                f.add_step(helmert);
                return Ok(());
            }
            let both_2d = src.dimension() == 2 && dst.dimension() == 2;
            enter(f, src)?;
            if both_2d {
                f.push_v3();
            }
            f.add_step(with_ellipsoid(ProjStep::new("cart"), src.ellipsoid()));
            f.add_step(helmert);
            f.add_step(with_ellipsoid(ProjStep::new("cart"), dst.ellipsoid()).inverse());
            if both_2d {
                f.pop_v3();
            }
            leave(f, dst)
        }
        EPSG_CODE_METHOD_MOLODENSKY | EPSG_CODE_METHOD_ABRIDGED_MOLODENSKY => {
            let (src, dst) = crs_pair(op)?;
            let mut step = with_ellipsoid(ProjStep::new("molodensky"), src.ellipsoid())
                .num("dx", param_in(single, EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION, &units::METRE)?)
                .num("dy", param_in(single, EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION, &units::METRE)?)
                .num("dz", param_in(single, EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION, &units::METRE)?)
                .num("da", param_in(single, EPSG_CODE_PARAMETER_SEMI_MAJOR_AXIS_DIFFERENCE, &units::METRE)?)
                .num("df", param_in(single, EPSG_CODE_PARAMETER_FLATTENING_DIFFERENCE, &units::SCALE_UNITY)?);
            if code == EPSG_CODE_METHOD_ABRIDGED_MOLODENSKY {
                step = step.flag("abridged");
            }
            enter(f, src)?;
            f.add_step(step);
            leave(f, dst)
        }
        EPSG_CODE_METHOD_LONGITUDE_ROTATION
        | EPSG_CODE_METHOD_GEOGRAPHIC2D_OFFSETS
        | EPSG_CODE_METHOD_GEOGRAPHIC3D_OFFSETS
        | EPSG_CODE_METHOD_GEOGRAPHIC2D_WITH_HEIGHT_OFFSETS
        | EPSG_CODE_METHOD_VERTICAL_OFFSET => framed(op, f, |f| {
            if let Some(step) = geogoffset_step(single) {
                f.add_step(step);
            }
            Ok(())
        }),
        EPSG_CODE_METHOD_CHANGE_VERTICAL_UNIT => {
            f.add_step(vertical_unit_change(op, single));
            Ok(())
        }
        EPSG_CODE_METHOD_NTV2 => {
            let grid = grid_file(single, EPSG_CODE_PARAMETER_LATITUDE_LONGITUDE_DIFFERENCE_FILE)?;
            framed(op, f, |f| {
                f.add_step(ProjStep::new("hgridshift").param("grids", grid));
                Ok(())
            })
        }
        EPSG_CODE_METHOD_GEOGRAPHIC3D_TO_GRAVITYRELATEDHEIGHT_GTX => {
            let (src, _) = crs_pair(op)?;
            let grid = grid_file(single, EPSG_CODE_PARAMETER_GEOID_CORRECTION_FILENAME)?;
            enter(f, src)?;
            f.add_step(
                ProjStep::new("vgridshift")
                    .param("grids", grid)
                    .param("multiplier", "1"),
            );
            leave(f, src)
        }
        _ => Err(unsupported()),
    }
}
