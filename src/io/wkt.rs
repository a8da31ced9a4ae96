//! WKT export of CRS and coordinate operations.
//!
//! Objects are first built as a tree of [`Node`]s, then rendered with one
//! child node per line. Operations other than conversions exist in WKT2 only;
//! conversions export to WKT1 as the `PROJECTION` and `PARAMETER` nodes of a
//! `PROJCS`.

use std::fmt;

use crate::common::units::{self, UnitOfMeasure, UnitType};
use crate::common::{Identifier, ObjectProps};
use crate::crs::{BoundCrs, CoordinateSystem, Crs, CrsKind, CsKind, DerivedCrs, GeodeticCrs, VerticalCrs};
use crate::crs::{AxisDirection, Ellipsoid, GeodeticDatum, PrimeMeridian};
use crate::error::FormattingError;
use crate::operation::constants::*;
use crate::operation::mappings::lookup_method;
use crate::operation::method::{OperationMethod, ParameterValue};
use crate::operation::transformation::{approximate_inverse, towgs84_parameters};
use crate::operation::{CoordinateOperation, OperationKind, PositionalAccuracy, SingleOperation};

use super::format_number;
use super::proj_string::to_proj_string;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WktVersion {
    /// WKT1 as written by GDAL.
    Wkt1Gdal,
    #[default]
    Wkt2_2019,
}

impl WktVersion {
    fn is_wkt2(self) -> bool {
        self == WktVersion::Wkt2_2019
    }
}

#[derive(Clone, Debug)]
enum Item {
    Quoted(String),
    Number(f64),
    Raw(String),
    Node(Node),
}

#[derive(Clone, Debug)]
struct Node {
    keyword: &'static str,
    items: Vec<Item>,
}

impl Node {
    fn new(keyword: &'static str) -> Self {
        Self {
            keyword,
            items: Vec::new(),
        }
    }

    fn quoted(mut self, s: impl Into<String>) -> Self {
        self.items.push(Item::Quoted(s.into()));
        self
    }

    fn number(mut self, v: f64) -> Self {
        self.items.push(Item::Number(v));
        self
    }

    fn raw(mut self, s: impl Into<String>) -> Self {
        self.items.push(Item::Raw(s.into()));
        self
    }

    fn child(mut self, node: Node) -> Self {
        self.push(node);
        self
    }

    fn push(&mut self, node: Node) {
        self.items.push(Item::Node(node));
    }

    fn write(&self, out: &mut String, depth: usize) {
        out.push_str(self.keyword);
        out.push('[');
        for (i, item) in self.items.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            match item {
                Item::Quoted(s) => {
                    out.push('"');
                    out.push_str(&s.replace('"', "\"\""));
                    out.push('"');
                }
                Item::Number(v) => out.push_str(&format_number(*v)),
                Item::Raw(s) => out.push_str(s),
                Item::Node(n) => {
                    out.push('\n');
                    out.push_str(&"    ".repeat(depth + 1));
                    n.write(out, depth + 1);
                }
            }
        }
        out.push(']');
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write(&mut out, 0);
        f.write_str(&out)
    }
}

/// WKT of `op`.
pub fn to_wkt(op: &CoordinateOperation, version: WktVersion) -> Result<String, FormattingError> {
    if version.is_wkt2() {
        return Ok(operation_node(op)?.to_string());
    }
    match op.kind() {
        OperationKind::Conversion(single) => {
            let (nodes, extension) = wkt1_projection(single, &units::METRE)?;
            Ok(nodes
                .iter()
                .chain(extension.as_ref())
                .map(Node::to_string)
                .collect::<Vec<_>>()
                .join(","))
        }
        OperationKind::Transformation(_) => Err(FormattingError::Wkt1Unsupported("Transformation")),
        OperationKind::Concatenated(_) => Err(FormattingError::Wkt1Unsupported("ConcatenatedOperation")),
        OperationKind::InverseOf(_) => Err(FormattingError::Wkt1Unsupported("Inverse operation")),
        OperationKind::ProjBased(_) => Err(FormattingError::Wkt1Unsupported("PROJ-based operation")),
    }
}

/// WKT of `crs`.
pub fn crs_to_wkt(crs: &Crs, version: WktVersion) -> Result<String, FormattingError> {
    Ok(crs_node(crs, version, None)?.to_string())
}

fn id_node(id: &Identifier, version: WktVersion) -> Node {
    if !version.is_wkt2() {
        return Node::new("AUTHORITY").quoted(&id.code_space).quoted(&id.code);
    }
    let node = Node::new("ID").quoted(&id.code_space);
    match id.code.parse::<u64>() {
        Ok(code) => node.raw(code.to_string()),
        Err(_) => node.quoted(&id.code),
    }
}

fn epsg_id(code: Option<u32>, version: WktVersion) -> Option<Node> {
    code.map(|c| id_node(&Identifier::epsg(c), version))
}

/// Trailing usage, identifier and remark nodes of a top-level object.
fn finish_object(node: &mut Node, props: &ObjectProps, version: WktVersion) {
    if !version.is_wkt2() {
        if let Some(id) = props.identifiers.first() {
            node.push(id_node(id, version));
        }
        return;
    }
    for domain in &props.domains {
        if domain.scope.is_none() && domain.extent.is_none() {
            continue;
        }
        let mut usage = Node::new("USAGE").child(
            Node::new("SCOPE").quoted(domain.scope.as_deref().unwrap_or("unknown")),
        );
        if let Some(extent) = &domain.extent {
            if let Some(description) = &extent.description {
                usage.push(Node::new("AREA").quoted(description));
            }
            if let Some(b) = &extent.bbox {
                usage.push(
                    Node::new("BBOX")
                        .number(b.south)
                        .number(b.west)
                        .number(b.north)
                        .number(b.east),
                );
            }
        }
        node.push(usage);
    }
    for id in &props.identifiers {
        node.push(id_node(id, version));
    }
    if let Some(remarks) = &props.remarks {
        node.push(Node::new("REMARK").quoted(remarks));
    }
}

fn unit_node(unit: &UnitOfMeasure, version: WktVersion) -> Node {
    if version.is_wkt2() {
        return Node::new(unit.wkt2_keyword())
            .quoted(unit.name())
            .number(unit.conversion_to_si());
    }
    let mut node = Node::new("UNIT").quoted(unit.name()).number(unit.conversion_to_si());
    if let Some(id) = epsg_id(unit.epsg_code(), version) {
        node.push(id);
    }
    node
}

fn ellipsoid_node(e: &Ellipsoid, version: WktVersion) -> Node {
    if version.is_wkt2() {
        return Node::new("ELLIPSOID")
            .quoted(e.name())
            .number(e.a)
            .number(e.inverse_flattening())
            .child(unit_node(&units::METRE, version));
    }
    let mut node = Node::new("SPHEROID")
        .quoted(e.name())
        .number(e.a)
        .number(e.inverse_flattening());
    if let Some(id) = epsg_id(e.epsg_code(), version) {
        node.push(id);
    }
    node
}

fn prime_meridian_node(pm: &PrimeMeridian, version: WktVersion) -> Node {
    let node = Node::new("PRIMEM").quoted(pm.name()).number(pm.longitude);
    if version.is_wkt2() {
        return node.child(unit_node(&units::DEGREE, version));
    }
    match epsg_id(pm.epsg_code(), version) {
        Some(id) => node.child(id),
        None => node,
    }
}

fn datum_node(datum: &GeodeticDatum, version: WktVersion, towgs84: Option<&[f64; 7]>) -> Node {
    if version.is_wkt2() {
        return Node::new("DATUM")
            .quoted(datum.name())
            .child(ellipsoid_node(&datum.ellipsoid, version));
    }
    let mut node = Node::new("DATUM")
        .quoted(datum.name().replace(' ', "_"))
        .child(ellipsoid_node(&datum.ellipsoid, version));
    if let Some(params) = towgs84 {
        let mut values = Node::new("TOWGS84");
        for v in params {
            values = values.number(*v);
        }
        node.push(values);
    }
    if let Some(id) = datum.props.identifiers.first() {
        node.push(id_node(id, version));
    }
    node
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn wkt1_axis(name: &str, direction: AxisDirection) -> Node {
    let name = match name {
        "Geodetic latitude" => "Latitude",
        "Geodetic longitude" => "Longitude",
        other => other,
    };
    let direction = match direction {
        AxisDirection::North | AxisDirection::GeocentricZ => "NORTH",
        AxisDirection::South => "SOUTH",
        AxisDirection::East => "EAST",
        AxisDirection::West => "WEST",
        AxisDirection::Up => "UP",
        AxisDirection::Down => "DOWN",
        AxisDirection::GeocentricX | AxisDirection::GeocentricY => "OTHER",
    };
    Node::new("AXIS").quoted(name).raw(direction)
}

fn push_cs(node: &mut Node, cs: &CoordinateSystem, version: WktVersion) {
    if !version.is_wkt2() {
        node.push(unit_node(&cs.primary_unit(), version));
        for axis in &cs.axes {
            node.push(wkt1_axis(&axis.name, axis.direction));
        }
        return;
    }
    let kind = match cs.kind {
        CsKind::Ellipsoidal => "ellipsoidal",
        CsKind::Cartesian => "Cartesian",
        CsKind::Vertical => "vertical",
    };
    node.push(Node::new("CS").raw(kind).raw(cs.dimension().to_string()));
    for (i, axis) in cs.axes.iter().enumerate() {
        node.push(
            Node::new("AXIS")
                .quoted(format!("{} ({})", lower_first(&axis.name), axis.abbreviation))
                .raw(axis.direction.wkt_name())
                .child(Node::new("ORDER").raw((i + 1).to_string()))
                .child(unit_node(&axis.unit, version)),
        );
    }
}

fn crs_node(crs: &Crs, version: WktVersion, towgs84: Option<&[f64; 7]>) -> Result<Node, FormattingError> {
    match &crs.kind {
        CrsKind::Geodetic(g) => Ok(geodetic_node(crs, g, version, towgs84)),
        CrsKind::Vertical(v) => Ok(vertical_node(crs, v, version)),
        CrsKind::Derived(d) => derived_node(crs, d, version, towgs84),
        CrsKind::Compound(components) => {
            let keyword = if version.is_wkt2() { "COMPOUNDCRS" } else { "COMPD_CS" };
            let mut node = Node::new(keyword).quoted(crs.name());
            for (i, component) in components.iter().enumerate() {
                node.push(crs_node(component, version, towgs84.filter(|_| i == 0))?);
            }
            finish_object(&mut node, &crs.props, version);
            Ok(node)
        }
        CrsKind::Bound(b) if version.is_wkt2() => bound_node(b),
        CrsKind::Bound(b) => {
            let params = wkt1_towgs84(b)?;
            crs_node(&b.base, version, Some(&params))
        }
    }
}

fn geodetic_node(crs: &Crs, g: &GeodeticCrs, version: WktVersion, towgs84: Option<&[f64; 7]>) -> Node {
    let keyword = match (version.is_wkt2(), g.cs.kind == CsKind::Ellipsoidal) {
        (true, true) => "GEOGCRS",
        (true, false) => "GEODCRS",
        (false, true) => "GEOGCS",
        (false, false) => "GEOCCS",
    };
    let mut node = Node::new(keyword)
        .quoted(crs.name())
        .child(datum_node(&g.datum, version, towgs84))
        .child(prime_meridian_node(&g.datum.prime_meridian, version));
    push_cs(&mut node, &g.cs, version);
    finish_object(&mut node, &crs.props, version);
    node
}

fn vertical_node(crs: &Crs, v: &VerticalCrs, version: WktVersion) -> Node {
    let mut node = if version.is_wkt2() {
        Node::new("VERTCRS")
            .quoted(crs.name())
            .child(Node::new("VDATUM").quoted(v.datum.name()))
    } else {
        let mut datum = Node::new("VERT_DATUM").quoted(v.datum.name()).raw("2005");
        if let Some(id) = v.datum.props.identifiers.first() {
            datum.push(id_node(id, version));
        }
        Node::new("VERT_CS").quoted(crs.name()).child(datum)
    };
    push_cs(&mut node, &v.cs, version);
    if let Some(model) = v.geoid_model.as_ref().filter(|_| version.is_wkt2()) {
        node.push(Node::new("GEOIDMODEL").quoted(model));
    }
    finish_object(&mut node, &crs.props, version);
    node
}

fn base_geographic_node(base: &Crs, g: &GeodeticCrs) -> Node {
    let mut node = Node::new("BASEGEOGCRS")
        .quoted(base.name())
        .child(datum_node(&g.datum, WktVersion::Wkt2_2019, None))
        .child(prime_meridian_node(&g.datum.prime_meridian, WktVersion::Wkt2_2019));
    if let Some(id) = base.identifiers().first() {
        node.push(id_node(id, WktVersion::Wkt2_2019));
    }
    node
}

fn derived_node(
    crs: &Crs,
    d: &DerivedCrs,
    version: WktVersion,
    towgs84: Option<&[f64; 7]>,
) -> Result<Node, FormattingError> {
    let base = d.base.as_geodetic().ok_or_else(|| {
        FormattingError::Unsupported(format!("Base of {} is not a geodetic CRS", crs.name()))
    })?;
    let single = d.conversion.single().ok_or_else(|| {
        FormattingError::Unsupported(format!("Deriving conversion of {} has no method", crs.name()))
    })?;
    let projected = d.cs.kind == CsKind::Cartesian;
    if version.is_wkt2() {
        let (keyword, conversion_keyword) = if projected {
            ("PROJCRS", "CONVERSION")
        } else {
            ("GEOGCRS", "DERIVINGCONVERSION")
        };
        let mut node = Node::new(keyword)
            .quoted(crs.name())
            .child(base_geographic_node(&d.base, base))
            .child(conversion_node(conversion_keyword, &d.conversion.props(), single));
        push_cs(&mut node, &d.cs, version);
        finish_object(&mut node, &crs.props, version);
        return Ok(node);
    }
    if !projected {
        return Err(FormattingError::Wkt1Unsupported("DerivedGeographicCRS"));
    }
    let mut node = Node::new("PROJCS")
        .quoted(crs.name())
        .child(geodetic_node(&d.base, base, version, towgs84));
    let (nodes, extension) = wkt1_projection(single, &d.cs.primary_unit())?;
    for n in nodes {
        node.push(n);
    }
    push_cs(&mut node, &d.cs, version);
    if let Some(extension) = extension {
        node.push(extension);
    }
    finish_object(&mut node, &crs.props, version);
    Ok(node)
}

fn bound_node(b: &BoundCrs) -> Result<Node, FormattingError> {
    let version = WktVersion::Wkt2_2019;
    let single = b.transformation.single().ok_or_else(|| {
        FormattingError::Unsupported("Bound CRS transformation has no method".to_string())
    })?;
    let mut abridged = Node::new("ABRIDGEDTRANSFORMATION")
        .quoted(b.transformation.name().into_owned())
        .child(method_node(&single.method));
    for p in parameter_nodes(single) {
        abridged.push(p);
    }
    for id in b.transformation.identifiers().iter() {
        abridged.push(id_node(id, version));
    }
    Ok(Node::new("BOUNDCRS")
        .child(Node::new("SOURCECRS").child(crs_node(&b.base, version, None)?))
        .child(Node::new("TARGETCRS").child(crs_node(&b.hub, version, None)?))
        .child(abridged))
}

fn wkt1_towgs84(b: &BoundCrs) -> Result<[f64; 7], FormattingError> {
    let hub_is_wgs84 = b.hub.props.epsg_code() == Some(4326)
        || b.hub.geodetic_datum().and_then(|d| d.props.epsg_code()) == Some(6326);
    if !hub_is_wgs84 {
        return Err(FormattingError::Unsupported(format!(
            "Cannot export a bound CRS with hub {} as WKT1",
            b.hub.name()
        )));
    }
    let single = b.transformation.single().ok_or_else(|| {
        FormattingError::Unsupported("Bound CRS transformation has no method".to_string())
    })?;
    towgs84_parameters(single)
}

/// `PROJECTION` and `PARAMETER` nodes of a WKT1 `PROJCS`, plus the PROJ4
/// `EXTENSION` some methods need. Linear values are written in `linear_unit`.
fn wkt1_projection(
    single: &SingleOperation,
    linear_unit: &UnitOfMeasure,
) -> Result<(Vec<Node>, Option<Node>), FormattingError> {
    let linear = |code: u32| single.parameter_in(code, linear_unit).unwrap_or(0.0);
    if single.method_epsg_code() == Some(EPSG_CODE_METHOD_POPULAR_VISUALISATION_PSEUDO_MERCATOR) {
        let lat0 = single
            .parameter_degrees(EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN)
            .unwrap_or(0.0);
        if lat0 != 0.0 {
            return Err(FormattingError::Unsupported(
                "Popular Visualisation Pseudo Mercator with a non-zero latitude of natural origin \
                 cannot be exported to WKT1"
                    .to_string(),
            ));
        }
        let lon0 = single
            .parameter_degrees(EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN)
            .unwrap_or(0.0);
        let fe = linear(EPSG_CODE_PARAMETER_FALSE_EASTING);
        let fn_ = linear(EPSG_CODE_PARAMETER_FALSE_NORTHING);
        let nodes = vec![
            Node::new("PROJECTION").quoted("Mercator_1SP"),
            Node::new("PARAMETER").quoted("central_meridian").number(lon0),
            Node::new("PARAMETER").quoted("scale_factor").number(1.0),
            Node::new("PARAMETER").quoted("false_easting").number(fe),
            Node::new("PARAMETER").quoted("false_northing").number(fn_),
        ];
        let proj4 = format!(
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0={} +x_0={} +y_0={} +k=1 +units=m \
             +nadgrids=@null +wktext +no_defs",
            format_number(lon0),
            format_number(fe),
            format_number(fn_)
        );
        let extension = Node::new("EXTENSION").quoted("PROJ4").quoted(proj4);
        return Ok((nodes, Some(extension)));
    }
    let mapping = lookup_method(single.method_epsg_code(), single.method.name());
    let (mapping, wkt1_name) = match mapping.and_then(|m| m.wkt1_name.map(|n| (m, n))) {
        Some(found) => found,
        None => {
            return Err(FormattingError::Unsupported(format!(
                "Method {} has no WKT1 equivalent",
                single.method.name()
            )))
        }
    };
    let mut nodes = vec![Node::new("PROJECTION").quoted(wkt1_name)];
    for param in mapping.params {
        let Some(measure) = single
            .parameter_value(param.epsg_code, param.wkt2_name)
            .and_then(ParameterValue::as_measure)
        else {
            continue;
        };
        let value = match param.unit_type {
            UnitType::Angular => measure.convert_to(&units::DEGREE),
            UnitType::Linear => measure.convert_to(linear_unit),
            _ => measure.si_value(),
        };
        nodes.push(Node::new("PARAMETER").quoted(param.wkt1_name).number(value));
    }
    Ok((nodes, None))
}

fn method_node(method: &OperationMethod) -> Node {
    let mut node = Node::new("METHOD").quoted(method.name());
    for id in &method.props.identifiers {
        node.push(id_node(id, WktVersion::Wkt2_2019));
    }
    node
}

fn parameter_nodes(single: &SingleOperation) -> Vec<Node> {
    let version = WktVersion::Wkt2_2019;
    single
        .values
        .iter()
        .map(|v| {
            let name = v.parameter.name();
            let mut node = match &v.value {
                ParameterValue::Measure(m) => {
                    let node = Node::new("PARAMETER").quoted(name).number(m.value());
                    if m.unit().unit_type() == UnitType::None {
                        node
                    } else {
                        node.child(unit_node(m.unit(), version))
                    }
                }
                ParameterValue::Filename(f) => Node::new("PARAMETERFILE").quoted(name).quoted(f),
                ParameterValue::String(s) => Node::new("PARAMETER").quoted(name).quoted(s),
                ParameterValue::Integer(i) => Node::new("PARAMETER").quoted(name).raw(i.to_string()),
                ParameterValue::Boolean(b) => {
                    Node::new("PARAMETER").quoted(name).raw(if *b { "TRUE" } else { "FALSE" })
                }
            };
            for id in &v.parameter.props.identifiers {
                node.push(id_node(id, version));
            }
            node
        })
        .collect()
}

fn conversion_node(keyword: &'static str, props: &ObjectProps, single: &SingleOperation) -> Node {
    let mut node = Node::new(keyword).quoted(&props.name).child(method_node(&single.method));
    for p in parameter_nodes(single) {
        node.push(p);
    }
    finish_object(&mut node, props, WktVersion::Wkt2_2019);
    node
}

fn crs_wrapper(keyword: &'static str, crs: Option<&Crs>) -> Result<Node, FormattingError> {
    let crs = crs.ok_or_else(|| FormattingError::Unsupported(format!("Missing {keyword}")))?;
    Ok(Node::new(keyword).child(crs_node(crs, WktVersion::Wkt2_2019, None)?))
}

fn push_accuracy(node: &mut Node, op: &CoordinateOperation) {
    if let Some(PositionalAccuracy::Known(v)) = op.accuracies().first() {
        node.push(Node::new("OPERATIONACCURACY").number(*v));
    }
}

fn transformation_node(op: &CoordinateOperation, single: &SingleOperation) -> Result<Node, FormattingError> {
    let mut node = Node::new("COORDINATEOPERATION").quoted(op.name().into_owned());
    if let Some(version) = op.version() {
        node.push(Node::new("VERSION").quoted(version));
    }
    node.push(crs_wrapper("SOURCECRS", op.source_crs().map(|c| &**c))?);
    node.push(crs_wrapper("TARGETCRS", op.target_crs().map(|c| &**c))?);
    node.push(method_node(&single.method));
    for p in parameter_nodes(single) {
        node.push(p);
    }
    if let Some(interpolation) = op.interpolation_crs() {
        node.push(crs_wrapper("INTERPOLATIONCRS", Some(&**interpolation))?);
    }
    push_accuracy(&mut node, op);
    finish_object(&mut node, &op.props(), WktVersion::Wkt2_2019);
    Ok(node)
}

/// Method of the inverse of an operation using `method`.
fn inverse_method(method: &OperationMethod) -> OperationMethod {
    let mut props = ObjectProps::named(format!("Inverse of {}", method.name()));
    if let Some(code) = method.epsg_code() {
        props = props.with_id(Identifier::new("INVERSE(EPSG)", code));
    }
    OperationMethod::new(props, method.parameters.clone())
}

fn operation_node(op: &CoordinateOperation) -> Result<Node, FormattingError> {
    match op.kind() {
        OperationKind::Conversion(single) => Ok(conversion_node("CONVERSION", &op.props(), single)),
        OperationKind::Transformation(single) => transformation_node(op, single),
        OperationKind::Concatenated(c) => {
            let mut node = Node::new("CONCATENATEDOPERATION").quoted(op.name().into_owned());
            node.push(crs_wrapper("SOURCECRS", op.source_crs().map(|c| &**c))?);
            node.push(crs_wrapper("TARGETCRS", op.target_crs().map(|c| &**c))?);
            for step in &c.steps {
                node.push(Node::new("STEP").child(operation_node(step)?));
            }
            push_accuracy(&mut node, op);
            finish_object(&mut node, &op.props(), WktVersion::Wkt2_2019);
            Ok(node)
        }
        OperationKind::InverseOf(forward) => {
            if let Some(approx) = approximate_inverse(forward) {
                return operation_node(&approx);
            }
            let single = forward.single().ok_or_else(|| {
                FormattingError::Unsupported(format!("Cannot export inverse of {}", forward.name()))
            })?;
            let inverse = SingleOperation {
                method: inverse_method(&single.method),
                values: single.values.clone(),
            };
            if forward.is_conversion() {
                Ok(conversion_node("CONVERSION", &op.props(), &inverse))
            } else {
                transformation_node(op, &inverse)
            }
        }
        OperationKind::ProjBased(_) => {
            let pipeline = to_proj_string(op)?;
            let mut node = Node::new("COORDINATEOPERATION").quoted(op.name().into_owned());
            if let (Some(source), Some(target)) = (op.source_crs(), op.target_crs()) {
                node.push(crs_wrapper("SOURCECRS", Some(&**source))?);
                node.push(crs_wrapper("TARGETCRS", Some(&**target))?);
            }
            node.push(Node::new("METHOD").quoted(PROJ_BASED_METHOD_NAME));
            node.push(Node::new("PARAMETER").quoted("PROJ string").quoted(pipeline));
            push_accuracy(&mut node, op);
            finish_object(&mut node, &op.props(), WktVersion::Wkt2_2019);
            Ok(node)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Measure;
    use crate::crs::presets;
    use crate::operation::transformation::{self, HelmertConvention, HelmertParams};
    use crate::operation::{concatenated, conversion};

    fn ed50_to_wgs84() -> crate::operation::OperationRef {
        transformation::geocentric_translations(
            ObjectProps::named("ED50 to WGS 84 (1)").with_epsg(1133),
            presets::ed50(),
            presets::wgs84(),
            -87.0,
            -98.0,
            -121.0,
            vec![PositionalAccuracy::Known(5.0)],
        )
    }

    #[test]
    fn test_geographic_crs_wkt2() {
        let wkt = crs_to_wkt(&presets::wgs84(), WktVersion::Wkt2_2019).unwrap();
        assert!(wkt.starts_with("GEOGCRS[\"WGS 84\",\n    DATUM[\"World Geodetic System 1984\","));
        assert!(wkt.contains("ELLIPSOID[\"WGS 84\",6378137,298.257223563,"));
        assert!(wkt.contains("CS[ellipsoidal,2]"));
        assert!(wkt.contains("AXIS[\"geodetic latitude (Lat)\",north,"));
        assert!(wkt.ends_with("ID[\"EPSG\",4326]]"));
    }

    #[test]
    fn test_geographic_crs_wkt1() {
        let wkt = crs_to_wkt(&presets::wgs84(), WktVersion::Wkt1Gdal).unwrap();
        assert!(wkt.starts_with("GEOGCS[\"WGS 84\","));
        assert!(wkt.contains("DATUM[\"World_Geodetic_System_1984\","));
        assert!(wkt.contains("SPHEROID[\"WGS 84\",6378137,298.257223563,"));
        assert!(wkt.contains("AXIS[\"Latitude\",NORTH]"));
        assert!(wkt.ends_with("AUTHORITY[\"EPSG\",\"4326\"]]"));
    }

    #[test]
    fn test_projected_crs_both_versions() {
        let utm = presets::utm_wgs84(31, true);
        let wkt2 = crs_to_wkt(&utm, WktVersion::Wkt2_2019).unwrap();
        assert!(wkt2.starts_with("PROJCRS["));
        assert!(wkt2.contains("BASEGEOGCRS[\"WGS 84\""));
        assert!(wkt2.contains("METHOD[\"Transverse Mercator\""));
        assert!(wkt2.contains("PARAMETER[\"Scale factor at natural origin\",0.9996"));

        let wkt1 = crs_to_wkt(&utm, WktVersion::Wkt1Gdal).unwrap();
        assert!(wkt1.starts_with("PROJCS["));
        assert!(wkt1.contains("PROJECTION[\"Transverse_Mercator\"]"));
        assert!(wkt1.contains("PARAMETER[\"central_meridian\",3]"));
        assert!(wkt1.contains("PARAMETER[\"false_easting\",500000]"));
    }

    #[test]
    fn test_transformation_wkt2() {
        let wkt = to_wkt(&ed50_to_wgs84(), WktVersion::Wkt2_2019).unwrap();
        assert!(wkt.starts_with("COORDINATEOPERATION[\"ED50 to WGS 84 (1)\","));
        assert!(wkt.contains("SOURCECRS[\n        GEOGCRS[\"ED50\""));
        assert!(wkt.contains("PARAMETER[\"X-axis translation\",-87,"));
        assert!(wkt.contains("OPERATIONACCURACY[5]"));
        assert!(wkt.ends_with("ID[\"EPSG\",1133]]"));
    }

    #[test]
    fn test_transformation_wkt1_fails() {
        assert_eq!(
            to_wkt(&ed50_to_wgs84(), WktVersion::Wkt1Gdal),
            Err(FormattingError::Wkt1Unsupported("Transformation"))
        );
    }

    #[test]
    fn test_concatenated_wkt() {
        let etrs = transformation::geocentric_translations(
            ObjectProps::named("WGS 84 to ETRS89"),
            presets::wgs84(),
            presets::etrs89(),
            0.0,
            0.0,
            0.0,
            vec![PositionalAccuracy::Known(1.0)],
        );
        let chain = concatenated::create(ObjectProps::named("chain"), vec![ed50_to_wgs84(), etrs], vec![]).unwrap();
        let wkt = to_wkt(&chain, WktVersion::Wkt2_2019).unwrap();
        assert!(wkt.starts_with("CONCATENATEDOPERATION[\"chain\","));
        assert_eq!(wkt.matches("STEP[").count(), 2);
        assert!(to_wkt(&chain, WktVersion::Wkt1Gdal).is_err());
    }

    #[test]
    fn test_lazy_inverse_uses_inverse_method() {
        let fwd = transformation::ntv2(
            ObjectProps::named("NAD27 to NAD83 (7)"),
            presets::nad27(),
            presets::nad83(),
            "ntv2_0.gsb",
            vec![],
        );
        let inv = CoordinateOperation::lazy_inverse(fwd);
        let wkt = to_wkt(&inv, WktVersion::Wkt2_2019).unwrap();
        assert!(wkt.starts_with("COORDINATEOPERATION[\"Inverse of NAD27 to NAD83 (7)\","));
        assert!(wkt.contains("SOURCECRS[\n        GEOGCRS[\"NAD83\""));
        assert!(wkt.contains("METHOD[\"Inverse of NTv2\""));
        assert!(wkt.contains("ID[\"INVERSE(EPSG)\",9615]"));
        assert!(wkt.contains("PARAMETERFILE[\"Latitude and longitude difference file\",\"ntv2_0.gsb\""));
    }

    #[test]
    fn test_helmert_inverse_is_approximate() {
        let fwd = transformation::helmert(
            ObjectProps::named("to WGS 84"),
            presets::ed50(),
            presets::wgs84(),
            HelmertConvention::PositionVector,
            HelmertParams::new(-87.0, -98.0, -121.0, 0.1, 0.2, 0.3, 1.5),
            vec![],
        );
        let wkt = to_wkt(&CoordinateOperation::lazy_inverse(fwd), WktVersion::Wkt2_2019).unwrap();
        assert!(wkt.contains("Inverse of to WGS 84 (approx. inversion)"));
        assert!(wkt.contains("PARAMETER[\"X-axis translation\",87,"));
    }

    #[test]
    fn test_pseudo_mercator_wkt1() {
        let conv = conversion::popular_visualisation_pseudo_mercator(
            ObjectProps::named("Popular Visualisation Pseudo-Mercator"),
            Measure::degrees(0.0),
            Measure::degrees(0.0),
            Measure::metres(0.0),
            Measure::metres(0.0),
        );
        let wkt = to_wkt(&conv, WktVersion::Wkt1Gdal).unwrap();
        assert!(wkt.starts_with("PROJECTION[\"Mercator_1SP\"]"));
        assert!(wkt.contains("PARAMETER[\"scale_factor\",1]"));
        assert!(wkt.contains("+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0"));

        let shifted = conversion::popular_visualisation_pseudo_mercator(
            ObjectProps::named("shifted"),
            Measure::degrees(10.0),
            Measure::degrees(0.0),
            Measure::metres(0.0),
            Measure::metres(0.0),
        );
        assert!(matches!(
            to_wkt(&shifted, WktVersion::Wkt1Gdal),
            Err(FormattingError::Unsupported(_))
        ));
    }

    #[test]
    fn test_bound_crs_wkt1_has_towgs84() {
        let bound = Crs::bound(presets::ed50(), presets::wgs84(), ed50_to_wgs84());
        let wkt1 = crs_to_wkt(&bound, WktVersion::Wkt1Gdal).unwrap();
        assert!(wkt1.contains("TOWGS84[-87,-98,-121,0,0,0,0]"));
        let wkt2 = crs_to_wkt(&bound, WktVersion::Wkt2_2019).unwrap();
        assert!(wkt2.starts_with("BOUNDCRS["));
        assert!(wkt2.contains("ABRIDGEDTRANSFORMATION[\"ED50 to WGS 84 (1)\""));
    }

    #[test]
    fn test_quotes_are_doubled() {
        let node = Node::new("REMARK").quoted("a \"b\"");
        assert_eq!(node.to_string(), "REMARK[\"a \"\"b\"\"\"]");
    }
}
