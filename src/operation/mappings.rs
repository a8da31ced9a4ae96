//! Read-only cross-reference tables between EPSG, WKT1 and PROJ names of
//! projection methods and their parameters, and name lookups over them.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::common::{canonicalize_name, UnitType};

use super::constants::*;
use super::method::SingleOperation;

#[derive(Debug)]
pub struct ParamMapping {
    pub wkt2_name: &'static str,
    pub epsg_code: u32,
    pub wkt1_name: &'static str,
    pub unit_type: UnitType,
    pub proj_name: Option<&'static str>,
}

#[derive(Debug)]
pub struct MethodMapping {
    pub wkt2_name: &'static str,
    pub epsg_code: u32,
    /// `None` when the method has no WKT1 counterpart.
    pub wkt1_name: Option<&'static str>,
    pub proj_name: &'static str,
    /// Extra PROJ parameters always emitted with the method.
    pub proj_aux: &'static [&'static str],
    pub params: &'static [&'static ParamMapping],
}

const fn param(
    wkt2_name: &'static str,
    epsg_code: u32,
    wkt1_name: &'static str,
    unit_type: UnitType,
    proj_name: &'static str,
) -> ParamMapping {
    ParamMapping {
        wkt2_name,
        epsg_code,
        wkt1_name,
        unit_type,
        proj_name: Some(proj_name),
    }
}

static LAT_NATURAL_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN,
    EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN,
    "latitude_of_origin",
    UnitType::Angular,
    "lat_0",
);
static LON_NATURAL_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
    EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
    "central_meridian",
    UnitType::Angular,
    "lon_0",
);
static SCALE_FACTOR: ParamMapping = param(
    EPSG_NAME_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN,
    EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN,
    "scale_factor",
    UnitType::Scale,
    "k",
);
static SCALE_FACTOR_K0: ParamMapping = param(
    EPSG_NAME_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN,
    EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN,
    "scale_factor",
    UnitType::Scale,
    "k_0",
);
static FALSE_EASTING: ParamMapping = param(
    EPSG_NAME_PARAMETER_FALSE_EASTING,
    EPSG_CODE_PARAMETER_FALSE_EASTING,
    "false_easting",
    UnitType::Linear,
    "x_0",
);
static FALSE_NORTHING: ParamMapping = param(
    EPSG_NAME_PARAMETER_FALSE_NORTHING,
    EPSG_CODE_PARAMETER_FALSE_NORTHING,
    "false_northing",
    UnitType::Linear,
    "y_0",
);
static LAT_FALSE_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_LATITUDE_FALSE_ORIGIN,
    EPSG_CODE_PARAMETER_LATITUDE_FALSE_ORIGIN,
    "latitude_of_origin",
    UnitType::Angular,
    "lat_0",
);
static LON_FALSE_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_LONGITUDE_FALSE_ORIGIN,
    EPSG_CODE_PARAMETER_LONGITUDE_FALSE_ORIGIN,
    "central_meridian",
    UnitType::Angular,
    "lon_0",
);
static LAT_1ST_PARALLEL: ParamMapping = param(
    EPSG_NAME_PARAMETER_LATITUDE_1ST_STD_PARALLEL,
    EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL,
    "standard_parallel_1",
    UnitType::Angular,
    "lat_1",
);
static LAT_2ND_PARALLEL: ParamMapping = param(
    EPSG_NAME_PARAMETER_LATITUDE_2ND_STD_PARALLEL,
    EPSG_CODE_PARAMETER_LATITUDE_2ND_STD_PARALLEL,
    "standard_parallel_2",
    UnitType::Angular,
    "lat_2",
);
static LAT_1ST_PARALLEL_TS: ParamMapping = param(
    EPSG_NAME_PARAMETER_LATITUDE_1ST_STD_PARALLEL,
    EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL,
    "standard_parallel_1",
    UnitType::Angular,
    "lat_ts",
);
static EASTING_FALSE_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_EASTING_FALSE_ORIGIN,
    EPSG_CODE_PARAMETER_EASTING_FALSE_ORIGIN,
    "false_easting",
    UnitType::Linear,
    "x_0",
);
static NORTHING_FALSE_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_NORTHING_FALSE_ORIGIN,
    EPSG_CODE_PARAMETER_NORTHING_FALSE_ORIGIN,
    "false_northing",
    UnitType::Linear,
    "y_0",
);
static ALBERS_LAT_FALSE_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_LATITUDE_FALSE_ORIGIN,
    EPSG_CODE_PARAMETER_LATITUDE_FALSE_ORIGIN,
    "latitude_of_center",
    UnitType::Angular,
    "lat_0",
);
static ALBERS_LON_FALSE_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_LONGITUDE_FALSE_ORIGIN,
    EPSG_CODE_PARAMETER_LONGITUDE_FALSE_ORIGIN,
    "longitude_of_center",
    UnitType::Angular,
    "lon_0",
);
static LAEA_LAT_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN,
    EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN,
    "latitude_of_center",
    UnitType::Angular,
    "lat_0",
);
static LAEA_LON_ORIGIN: ParamMapping = param(
    EPSG_NAME_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
    EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN,
    "longitude_of_center",
    UnitType::Angular,
    "lon_0",
);

static NATURAL_ORIGIN_PARAMS: &[&ParamMapping] = &[
    &LAT_NATURAL_ORIGIN,
    &LON_NATURAL_ORIGIN,
    &SCALE_FACTOR,
    &FALSE_EASTING,
    &FALSE_NORTHING,
];

static LCC_1SP_PARAMS: &[&ParamMapping] = &[
    &LAT_NATURAL_ORIGIN,
    &LON_NATURAL_ORIGIN,
    &SCALE_FACTOR_K0,
    &FALSE_EASTING,
    &FALSE_NORTHING,
];

static LCC_2SP_PARAMS: &[&ParamMapping] = &[
    &LAT_FALSE_ORIGIN,
    &LON_FALSE_ORIGIN,
    &LAT_1ST_PARALLEL,
    &LAT_2ND_PARALLEL,
    &EASTING_FALSE_ORIGIN,
    &NORTHING_FALSE_ORIGIN,
];

static ALBERS_PARAMS: &[&ParamMapping] = &[
    &ALBERS_LAT_FALSE_ORIGIN,
    &ALBERS_LON_FALSE_ORIGIN,
    &LAT_1ST_PARALLEL,
    &LAT_2ND_PARALLEL,
    &EASTING_FALSE_ORIGIN,
    &NORTHING_FALSE_ORIGIN,
];

static STD_PARALLEL_PARAMS: &[&ParamMapping] = &[
    &LAT_1ST_PARALLEL_TS,
    &LON_NATURAL_ORIGIN,
    &FALSE_EASTING,
    &FALSE_NORTHING,
];

static EQC_PARAMS: &[&ParamMapping] = &[
    &LAT_1ST_PARALLEL_TS,
    &LAT_NATURAL_ORIGIN,
    &LON_NATURAL_ORIGIN,
    &FALSE_EASTING,
    &FALSE_NORTHING,
];

static PSEUDO_MERCATOR_PARAMS: &[&ParamMapping] = &[
    &LAT_NATURAL_ORIGIN,
    &LON_NATURAL_ORIGIN,
    &FALSE_EASTING,
    &FALSE_NORTHING,
];

static LAEA_PARAMS: &[&ParamMapping] = &[
    &LAEA_LAT_ORIGIN,
    &LAEA_LON_ORIGIN,
    &FALSE_EASTING,
    &FALSE_NORTHING,
];

pub static METHOD_MAPPINGS: &[MethodMapping] = &[
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_TRANSVERSE_MERCATOR,
        epsg_code: EPSG_CODE_METHOD_TRANSVERSE_MERCATOR,
        wkt1_name: Some("Transverse_Mercator"),
        proj_name: "tmerc",
        proj_aux: &[],
        params: NATURAL_ORIGIN_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_LAMBERT_CONIC_CONFORMAL_1SP,
        epsg_code: EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP,
        wkt1_name: Some("Lambert_Conformal_Conic_1SP"),
        proj_name: "lcc",
        proj_aux: &[],
        params: LCC_1SP_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_LAMBERT_CONIC_CONFORMAL_2SP,
        epsg_code: EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP,
        wkt1_name: Some("Lambert_Conformal_Conic_2SP"),
        proj_name: "lcc",
        proj_aux: &[],
        params: LCC_2SP_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_MERCATOR_VARIANT_A,
        epsg_code: EPSG_CODE_METHOD_MERCATOR_VARIANT_A,
        wkt1_name: Some("Mercator_1SP"),
        proj_name: "merc",
        proj_aux: &[],
        params: NATURAL_ORIGIN_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_MERCATOR_VARIANT_B,
        epsg_code: EPSG_CODE_METHOD_MERCATOR_VARIANT_B,
        wkt1_name: Some("Mercator_2SP"),
        proj_name: "merc",
        proj_aux: &[],
        params: STD_PARALLEL_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_POPULAR_VISUALISATION_PSEUDO_MERCATOR,
        epsg_code: EPSG_CODE_METHOD_POPULAR_VISUALISATION_PSEUDO_MERCATOR,
        wkt1_name: None,
        proj_name: "webmerc",
        proj_aux: &[],
        params: PSEUDO_MERCATOR_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA,
        epsg_code: EPSG_CODE_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA,
        wkt1_name: Some("Lambert_Azimuthal_Equal_Area"),
        proj_name: "laea",
        proj_aux: &[],
        params: LAEA_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA_SPHERICAL,
        epsg_code: EPSG_CODE_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA_SPHERICAL,
        wkt1_name: Some("Lambert_Azimuthal_Equal_Area"),
        proj_name: "laea",
        proj_aux: &["R_A"],
        params: LAEA_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_EQUIDISTANT_CYLINDRICAL,
        epsg_code: EPSG_CODE_METHOD_EQUIDISTANT_CYLINDRICAL,
        wkt1_name: Some("Equirectangular"),
        proj_name: "eqc",
        proj_aux: &[],
        params: EQC_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_EQUIDISTANT_CYLINDRICAL_SPHERICAL,
        epsg_code: EPSG_CODE_METHOD_EQUIDISTANT_CYLINDRICAL_SPHERICAL,
        wkt1_name: Some("Equirectangular"),
        proj_name: "eqc",
        proj_aux: &["R_A"],
        params: EQC_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA,
        epsg_code: EPSG_CODE_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA,
        wkt1_name: Some("Cylindrical_Equal_Area"),
        proj_name: "cea",
        proj_aux: &[],
        params: STD_PARALLEL_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA_SPHERICAL,
        epsg_code: EPSG_CODE_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA_SPHERICAL,
        wkt1_name: Some("Cylindrical_Equal_Area"),
        proj_name: "cea",
        proj_aux: &["R_A"],
        params: STD_PARALLEL_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_ALBERS_EQUAL_AREA,
        epsg_code: EPSG_CODE_METHOD_ALBERS_EQUAL_AREA,
        wkt1_name: Some("Albers_Conic_Equal_Area"),
        proj_name: "aea",
        proj_aux: &[],
        params: ALBERS_PARAMS,
    },
    MethodMapping {
        wkt2_name: EPSG_NAME_METHOD_POLAR_STEREOGRAPHIC_VARIANT_A,
        epsg_code: EPSG_CODE_METHOD_POLAR_STEREOGRAPHIC_VARIANT_A,
        wkt1_name: Some("Polar_Stereographic"),
        proj_name: "stere",
        proj_aux: &[],
        params: NATURAL_ORIGIN_PARAMS,
    },
];

/// Groups of parameter names that designate the same quantity across
/// methods and encodings. Names are compared in canonical form.
static PARAM_ALIAS_GROUPS: &[&[&str]] = &[
    &[
        "false_easting",
        "easting_at_false_origin",
        "easting_of_false_origin",
        "easting_at_projection_centre",
        "easting_of_projection_centre",
    ],
    &[
        "false_northing",
        "northing_at_false_origin",
        "northing_of_false_origin",
        "northing_at_projection_centre",
        "northing_of_projection_centre",
    ],
    &[
        "latitude_of_natural_origin",
        "latitude_of_false_origin",
        "latitude_of_projection_centre",
        "latitude_of_origin",
        "latitude_of_center",
    ],
    &[
        "longitude_of_natural_origin",
        "longitude_of_false_origin",
        "longitude_of_projection_centre",
        "longitude_of_origin",
        "longitude_of_center",
        "central_meridian",
    ],
    &[
        "scale_factor_at_natural_origin",
        "scale_factor_on_initial_line",
        "scale_factor_at_projection_centre",
        "scale_factor",
    ],
    &["latitude_of_1st_standard_parallel", "standard_parallel_1"],
    &["latitude_of_2nd_standard_parallel", "standard_parallel_2"],
];

/// Alias groups of each canonical parameter name, built on first use.
fn alias_index() -> &'static HashMap<String, Vec<usize>> {
    static INDEX: OnceLock<HashMap<String, Vec<usize>>> = OnceLock::new();
    INDEX.get_or_init(|| {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, group) in PARAM_ALIAS_GROUPS.iter().enumerate() {
            for name in group.iter() {
                let groups = index.entry(canonicalize_name(name)).or_default();
                if !groups.contains(&i) {
                    groups.push(i);
                }
            }
        }
        index
    })
}

/// Whether two parameter names designate the same quantity, looking through
/// the alias groups.
pub fn are_equivalent_parameters(a: &str, b: &str) -> bool {
    let ca = canonicalize_name(a);
    let cb = canonicalize_name(b);
    if ca == cb {
        return true;
    }
    let index = alias_index();
    match (index.get(&ca), index.get(&cb)) {
        (Some(ga), Some(gb)) => ga.iter().any(|g| gb.contains(g)),
        _ => false,
    }
}

pub fn method_by_code(code: u32) -> Option<&'static MethodMapping> {
    METHOD_MAPPINGS.iter().find(|m| m.epsg_code == code)
}

/// Method lookup: EPSG code first, then canonical WKT2 or WKT1 name.
pub fn lookup_method(code: Option<u32>, name: &str) -> Option<&'static MethodMapping> {
    if let Some(m) = code.and_then(method_by_code) {
        return Some(m);
    }
    let canonical = canonicalize_name(name);
    METHOD_MAPPINGS.iter().find(|m| {
        canonicalize_name(m.wkt2_name) == canonical
            || m.wkt1_name.map(canonicalize_name).as_deref() == Some(canonical.as_str())
    })
}

impl MethodMapping {
    /// Parameter lookup within this method: EPSG code, canonical name, then alias.
    pub fn lookup_param(&self, code: Option<u32>, name: &str) -> Option<&'static ParamMapping> {
        if let Some(code) = code {
            if let Some(p) = self.params.iter().find(|p| p.epsg_code == code) {
                return Some(*p);
            }
        }
        let canonical = canonicalize_name(name);
        self.params
            .iter()
            .find(|p| {
                canonicalize_name(p.wkt2_name) == canonical
                    || canonicalize_name(p.wkt1_name) == canonical
            })
            .or_else(|| {
                self.params.iter().find(|p| {
                    are_equivalent_parameters(p.wkt2_name, name)
                        || are_equivalent_parameters(p.wkt1_name, name)
                })
            })
            .copied()
    }
}

/// Messages describing parameters missing from, or unexpected in, an operation
/// whose method has a known mapping. Unknown methods yield no message.
pub fn validate_parameters(op: &SingleOperation) -> Vec<String> {
    let Some(mapping) = lookup_method(op.method.epsg_code(), op.method.name()) else {
        return Vec::new();
    };
    let mut messages = Vec::new();
    if op.method.epsg_code().is_none()
        && canonicalize_name(op.method.name()) != canonicalize_name(mapping.wkt2_name)
    {
        messages.push(format!(
            "Method name {} is equivalent to official {} but not strictly equal",
            op.method.name(),
            mapping.wkt2_name
        ));
    }
    for expected in mapping.params {
        let present = op.values.iter().any(|v| {
            v.parameter.epsg_code() == Some(expected.epsg_code)
                || are_equivalent_parameters(v.parameter.name(), expected.wkt2_name)
        });
        if !present {
            messages.push(format!("Cannot find expected parameter {}", expected.wkt2_name));
        }
    }
    for v in &op.values {
        if mapping
            .lookup_param(v.parameter.epsg_code(), v.parameter.name())
            .is_none()
        {
            messages.push(format!("Parameter {} found but not expected", v.parameter.name()));
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_groups() {
        assert!(are_equivalent_parameters("False easting", "Easting at false origin"));
        assert!(are_equivalent_parameters("central_meridian", "Longitude of natural origin"));
        assert!(are_equivalent_parameters("Latitude of 1st standard parallel", "standard_parallel_1"));
        assert!(!are_equivalent_parameters("False easting", "False northing"));
        assert!(!are_equivalent_parameters("Azimuth", "False northing"));
        assert!(are_equivalent_parameters("FALSE-EASTING", "false easting"));
    }

    #[test]
    fn test_lookup_method_order() {
        assert_eq!(
            lookup_method(Some(9807), "whatever").map(|m| m.proj_name),
            Some("tmerc")
        );
        assert_eq!(
            lookup_method(None, "Lambert_Conformal_Conic_2SP").map(|m| m.epsg_code),
            Some(EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP)
        );
        assert!(lookup_method(None, "No such method").is_none());
    }

    #[test]
    fn test_lookup_param_through_alias() {
        let lcc = method_by_code(EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP).unwrap();
        let p = lcc.lookup_param(None, "false_easting").unwrap();
        assert_eq!(p.epsg_code, EPSG_CODE_PARAMETER_EASTING_FALSE_ORIGIN);
    }

    #[test]
    fn test_validate_parameters() {
        use crate::common::Measure;
        use crate::operation::{conversion, OperationParameterValue};

        let utm = conversion::utm(31, true);
        let mut single = utm.single().unwrap().clone();
        assert!(validate_parameters(&single).is_empty());

        single.values.retain(|v| v.parameter.epsg_code() != Some(EPSG_CODE_PARAMETER_FALSE_NORTHING));
        single.values.push(OperationParameterValue::measure(
            "Azimuth",
            8813,
            Measure::degrees(10.0),
        ));
        let messages = validate_parameters(&single);
        assert_eq!(
            messages,
            vec![
                "Cannot find expected parameter False northing".to_string(),
                "Parameter Azimuth found but not expected".to_string(),
            ]
        );
    }
}
