//! EPSG codes and names of the methods and parameters this crate builds or recognises.

// Conversion methods.
pub const EPSG_CODE_METHOD_TRANSVERSE_MERCATOR: u32 = 9807;
pub const EPSG_NAME_METHOD_TRANSVERSE_MERCATOR: &str = "Transverse Mercator";
pub const EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_1SP: u32 = 9801;
pub const EPSG_NAME_METHOD_LAMBERT_CONIC_CONFORMAL_1SP: &str = "Lambert Conic Conformal (1SP)";
pub const EPSG_CODE_METHOD_LAMBERT_CONIC_CONFORMAL_2SP: u32 = 9802;
pub const EPSG_NAME_METHOD_LAMBERT_CONIC_CONFORMAL_2SP: &str = "Lambert Conic Conformal (2SP)";
pub const EPSG_CODE_METHOD_MERCATOR_VARIANT_A: u32 = 9804;
pub const EPSG_NAME_METHOD_MERCATOR_VARIANT_A: &str = "Mercator (variant A)";
pub const EPSG_CODE_METHOD_MERCATOR_VARIANT_B: u32 = 9805;
pub const EPSG_NAME_METHOD_MERCATOR_VARIANT_B: &str = "Mercator (variant B)";
pub const EPSG_CODE_METHOD_POPULAR_VISUALISATION_PSEUDO_MERCATOR: u32 = 1024;
pub const EPSG_NAME_METHOD_POPULAR_VISUALISATION_PSEUDO_MERCATOR: &str =
    "Popular Visualisation Pseudo Mercator";
pub const EPSG_CODE_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA: u32 = 9820;
pub const EPSG_NAME_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA: &str = "Lambert Azimuthal Equal Area";
pub const EPSG_CODE_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA_SPHERICAL: u32 = 1027;
pub const EPSG_NAME_METHOD_LAMBERT_AZIMUTHAL_EQUAL_AREA_SPHERICAL: &str =
    "Lambert Azimuthal Equal Area (Spherical)";
pub const EPSG_CODE_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA: u32 = 9835;
pub const EPSG_NAME_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA: &str = "Lambert Cylindrical Equal Area";
pub const EPSG_CODE_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA_SPHERICAL: u32 = 9834;
pub const EPSG_NAME_METHOD_LAMBERT_CYLINDRICAL_EQUAL_AREA_SPHERICAL: &str =
    "Lambert Cylindrical Equal Area (Spherical)";
pub const EPSG_CODE_METHOD_EQUIDISTANT_CYLINDRICAL: u32 = 1028;
pub const EPSG_NAME_METHOD_EQUIDISTANT_CYLINDRICAL: &str = "Equidistant Cylindrical";
pub const EPSG_CODE_METHOD_EQUIDISTANT_CYLINDRICAL_SPHERICAL: u32 = 1029;
pub const EPSG_NAME_METHOD_EQUIDISTANT_CYLINDRICAL_SPHERICAL: &str =
    "Equidistant Cylindrical (Spherical)";
pub const EPSG_CODE_METHOD_ALBERS_EQUAL_AREA: u32 = 9822;
pub const EPSG_NAME_METHOD_ALBERS_EQUAL_AREA: &str = "Albers Equal Area";
pub const EPSG_CODE_METHOD_POLAR_STEREOGRAPHIC_VARIANT_A: u32 = 9810;
pub const EPSG_NAME_METHOD_POLAR_STEREOGRAPHIC_VARIANT_A: &str = "Polar Stereographic (variant A)";

pub const EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_2D: u32 = 9843;
pub const EPSG_NAME_METHOD_AXIS_ORDER_REVERSAL_2D: &str = "Axis Order Reversal (2D)";
pub const EPSG_CODE_METHOD_AXIS_ORDER_REVERSAL_3D: u32 = 9844;
pub const EPSG_NAME_METHOD_AXIS_ORDER_REVERSAL_3D: &str =
    "Axis Order Reversal (Geographic3D horizontal)";
pub const EPSG_CODE_METHOD_GEOGRAPHIC_GEOCENTRIC: u32 = 9602;
pub const EPSG_NAME_METHOD_GEOGRAPHIC_GEOCENTRIC: &str = "Geographic/geocentric conversions";
pub const EPSG_CODE_METHOD_CHANGE_VERTICAL_UNIT: u32 = 1069;
pub const EPSG_NAME_METHOD_CHANGE_VERTICAL_UNIT: &str = "Change of Vertical Unit";
pub const EPSG_CODE_METHOD_HEIGHT_DEPTH_REVERSAL: u32 = 1068;
pub const EPSG_NAME_METHOD_HEIGHT_DEPTH_REVERSAL: &str = "Height Depth Reversal";
pub const EPSG_CODE_METHOD_GEOGRAPHIC3D_TO_2D: u32 = 9659;
pub const EPSG_NAME_METHOD_GEOGRAPHIC3D_TO_2D: &str = "Geographic3D to 2D conversion";

// Transformation methods.
pub const EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOCENTRIC: u32 = 1031;
pub const EPSG_NAME_METHOD_GEOCENTRIC_TRANSLATION_GEOCENTRIC: &str =
    "Geocentric translations (geocentric domain)";
pub const EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_2D: u32 = 9603;
pub const EPSG_NAME_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_2D: &str =
    "Geocentric translations (geog2D domain)";
pub const EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_3D: u32 = 1035;
pub const EPSG_NAME_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_3D: &str =
    "Geocentric translations (geog3D domain)";

pub const EPSG_CODE_METHOD_POSITION_VECTOR_GEOCENTRIC: u32 = 1033;
pub const EPSG_NAME_METHOD_POSITION_VECTOR_GEOCENTRIC: &str =
    "Position Vector transformation (geocentric domain)";
pub const EPSG_CODE_METHOD_POSITION_VECTOR_GEOGRAPHIC_2D: u32 = 9606;
pub const EPSG_NAME_METHOD_POSITION_VECTOR_GEOGRAPHIC_2D: &str =
    "Position Vector transformation (geog2D domain)";
pub const EPSG_CODE_METHOD_POSITION_VECTOR_GEOGRAPHIC_3D: u32 = 1037;
pub const EPSG_NAME_METHOD_POSITION_VECTOR_GEOGRAPHIC_3D: &str =
    "Position Vector transformation (geog3D domain)";
pub const EPSG_CODE_METHOD_COORDINATE_FRAME_GEOCENTRIC: u32 = 1032;
pub const EPSG_NAME_METHOD_COORDINATE_FRAME_GEOCENTRIC: &str =
    "Coordinate Frame rotation (geocentric domain)";
pub const EPSG_CODE_METHOD_COORDINATE_FRAME_GEOGRAPHIC_2D: u32 = 9607;
pub const EPSG_NAME_METHOD_COORDINATE_FRAME_GEOGRAPHIC_2D: &str =
    "Coordinate Frame rotation (geog2D domain)";
pub const EPSG_CODE_METHOD_COORDINATE_FRAME_GEOGRAPHIC_3D: u32 = 1038;
pub const EPSG_NAME_METHOD_COORDINATE_FRAME_GEOGRAPHIC_3D: &str =
    "Coordinate Frame rotation (geog3D domain)";

pub const EPSG_CODE_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC: u32 = 1053;
pub const EPSG_NAME_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC: &str =
    "Time-dependent Position Vector tfm (geocentric)";
pub const EPSG_CODE_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOGRAPHIC_3D: u32 = 1054;
pub const EPSG_NAME_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOGRAPHIC_3D: &str =
    "Time-dependent Position Vector tfm (geog3D)";
pub const EPSG_CODE_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC: u32 = 1056;
pub const EPSG_NAME_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC: &str =
    "Time-dependent Coordinate Frame rotation (geocen)";
pub const EPSG_CODE_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOGRAPHIC_3D: u32 = 1057;
pub const EPSG_NAME_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOGRAPHIC_3D: &str =
    "Time-dependent Coordinate Frame rotation (geog3D)";

pub const EPSG_CODE_METHOD_MOLODENSKY: u32 = 9604;
pub const EPSG_NAME_METHOD_MOLODENSKY: &str = "Molodensky";
pub const EPSG_CODE_METHOD_ABRIDGED_MOLODENSKY: u32 = 9605;
pub const EPSG_NAME_METHOD_ABRIDGED_MOLODENSKY: &str = "Abridged Molodensky";
pub const EPSG_CODE_METHOD_LONGITUDE_ROTATION: u32 = 9601;
pub const EPSG_NAME_METHOD_LONGITUDE_ROTATION: &str = "Longitude rotation";
pub const EPSG_CODE_METHOD_GEOGRAPHIC2D_OFFSETS: u32 = 9619;
pub const EPSG_NAME_METHOD_GEOGRAPHIC2D_OFFSETS: &str = "Geographic2D offsets";
pub const EPSG_CODE_METHOD_GEOGRAPHIC3D_OFFSETS: u32 = 9660;
pub const EPSG_NAME_METHOD_GEOGRAPHIC3D_OFFSETS: &str = "Geographic3D offsets";
pub const EPSG_CODE_METHOD_GEOGRAPHIC2D_WITH_HEIGHT_OFFSETS: u32 = 9618;
pub const EPSG_NAME_METHOD_GEOGRAPHIC2D_WITH_HEIGHT_OFFSETS: &str =
    "Geographic2D with Height Offsets";
pub const EPSG_CODE_METHOD_VERTICAL_OFFSET: u32 = 9616;
pub const EPSG_NAME_METHOD_VERTICAL_OFFSET: &str = "Vertical Offset";
pub const EPSG_CODE_METHOD_NTV2: u32 = 9615;
pub const EPSG_NAME_METHOD_NTV2: &str = "NTv2";
pub const EPSG_CODE_METHOD_GEOGRAPHIC3D_TO_GRAVITYRELATEDHEIGHT_GTX: u32 = 9665;
pub const EPSG_NAME_METHOD_GEOGRAPHIC3D_TO_GRAVITYRELATEDHEIGHT_GTX: &str =
    "Geographic3D to GravityRelatedHeight (gtx)";

/// Name given to the method of a synthesised operation defined by a PROJ pipeline.
pub const PROJ_BASED_METHOD_NAME: &str = "PROJ-based operation method";

// Parameters.
pub const EPSG_CODE_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN: u32 = 8801;
pub const EPSG_NAME_PARAMETER_LATITUDE_OF_NATURAL_ORIGIN: &str = "Latitude of natural origin";
pub const EPSG_CODE_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN: u32 = 8802;
pub const EPSG_NAME_PARAMETER_LONGITUDE_OF_NATURAL_ORIGIN: &str = "Longitude of natural origin";
pub const EPSG_CODE_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN: u32 = 8805;
pub const EPSG_NAME_PARAMETER_SCALE_FACTOR_AT_NATURAL_ORIGIN: &str =
    "Scale factor at natural origin";
pub const EPSG_CODE_PARAMETER_FALSE_EASTING: u32 = 8806;
pub const EPSG_NAME_PARAMETER_FALSE_EASTING: &str = "False easting";
pub const EPSG_CODE_PARAMETER_FALSE_NORTHING: u32 = 8807;
pub const EPSG_NAME_PARAMETER_FALSE_NORTHING: &str = "False northing";
pub const EPSG_CODE_PARAMETER_LATITUDE_FALSE_ORIGIN: u32 = 8821;
pub const EPSG_NAME_PARAMETER_LATITUDE_FALSE_ORIGIN: &str = "Latitude of false origin";
pub const EPSG_CODE_PARAMETER_LONGITUDE_FALSE_ORIGIN: u32 = 8822;
pub const EPSG_NAME_PARAMETER_LONGITUDE_FALSE_ORIGIN: &str = "Longitude of false origin";
pub const EPSG_CODE_PARAMETER_LATITUDE_1ST_STD_PARALLEL: u32 = 8823;
pub const EPSG_NAME_PARAMETER_LATITUDE_1ST_STD_PARALLEL: &str =
    "Latitude of 1st standard parallel";
pub const EPSG_CODE_PARAMETER_LATITUDE_2ND_STD_PARALLEL: u32 = 8824;
pub const EPSG_NAME_PARAMETER_LATITUDE_2ND_STD_PARALLEL: &str =
    "Latitude of 2nd standard parallel";
pub const EPSG_CODE_PARAMETER_EASTING_FALSE_ORIGIN: u32 = 8826;
pub const EPSG_NAME_PARAMETER_EASTING_FALSE_ORIGIN: &str = "Easting at false origin";
pub const EPSG_CODE_PARAMETER_NORTHING_FALSE_ORIGIN: u32 = 8827;
pub const EPSG_NAME_PARAMETER_NORTHING_FALSE_ORIGIN: &str = "Northing at false origin";
pub const EPSG_CODE_PARAMETER_LATITUDE_STD_PARALLEL: u32 = 8832;
pub const EPSG_NAME_PARAMETER_LATITUDE_STD_PARALLEL: &str = "Latitude of standard parallel";
pub const EPSG_CODE_PARAMETER_AZIMUTH_INITIAL_LINE: u32 = 8813;
pub const EPSG_CODE_PARAMETER_ANGLE_RECTIFIED_TO_SKEW_GRID: u32 = 8814;

pub const EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION: u32 = 8605;
pub const EPSG_NAME_PARAMETER_X_AXIS_TRANSLATION: &str = "X-axis translation";
pub const EPSG_CODE_PARAMETER_Y_AXIS_TRANSLATION: u32 = 8606;
pub const EPSG_NAME_PARAMETER_Y_AXIS_TRANSLATION: &str = "Y-axis translation";
pub const EPSG_CODE_PARAMETER_Z_AXIS_TRANSLATION: u32 = 8607;
pub const EPSG_NAME_PARAMETER_Z_AXIS_TRANSLATION: &str = "Z-axis translation";
pub const EPSG_CODE_PARAMETER_X_AXIS_ROTATION: u32 = 8608;
pub const EPSG_NAME_PARAMETER_X_AXIS_ROTATION: &str = "X-axis rotation";
pub const EPSG_CODE_PARAMETER_Y_AXIS_ROTATION: u32 = 8609;
pub const EPSG_NAME_PARAMETER_Y_AXIS_ROTATION: &str = "Y-axis rotation";
pub const EPSG_CODE_PARAMETER_Z_AXIS_ROTATION: u32 = 8610;
pub const EPSG_NAME_PARAMETER_Z_AXIS_ROTATION: &str = "Z-axis rotation";
pub const EPSG_CODE_PARAMETER_SCALE_DIFFERENCE: u32 = 8611;
pub const EPSG_NAME_PARAMETER_SCALE_DIFFERENCE: &str = "Scale difference";

pub const EPSG_CODE_PARAMETER_RATE_X_AXIS_TRANSLATION: u32 = 1040;
pub const EPSG_NAME_PARAMETER_RATE_X_AXIS_TRANSLATION: &str =
    "Rate of change of X-axis translation";
pub const EPSG_CODE_PARAMETER_RATE_Y_AXIS_TRANSLATION: u32 = 1041;
pub const EPSG_NAME_PARAMETER_RATE_Y_AXIS_TRANSLATION: &str =
    "Rate of change of Y-axis translation";
pub const EPSG_CODE_PARAMETER_RATE_Z_AXIS_TRANSLATION: u32 = 1042;
pub const EPSG_NAME_PARAMETER_RATE_Z_AXIS_TRANSLATION: &str =
    "Rate of change of Z-axis translation";
pub const EPSG_CODE_PARAMETER_RATE_X_AXIS_ROTATION: u32 = 1043;
pub const EPSG_NAME_PARAMETER_RATE_X_AXIS_ROTATION: &str = "Rate of change of X-axis rotation";
pub const EPSG_CODE_PARAMETER_RATE_Y_AXIS_ROTATION: u32 = 1044;
pub const EPSG_NAME_PARAMETER_RATE_Y_AXIS_ROTATION: &str = "Rate of change of Y-axis rotation";
pub const EPSG_CODE_PARAMETER_RATE_Z_AXIS_ROTATION: u32 = 1045;
pub const EPSG_NAME_PARAMETER_RATE_Z_AXIS_ROTATION: &str = "Rate of change of Z-axis rotation";
pub const EPSG_CODE_PARAMETER_RATE_SCALE_DIFFERENCE: u32 = 1046;
pub const EPSG_NAME_PARAMETER_RATE_SCALE_DIFFERENCE: &str = "Rate of change of Scale difference";
pub const EPSG_CODE_PARAMETER_REFERENCE_EPOCH: u32 = 1047;
pub const EPSG_NAME_PARAMETER_REFERENCE_EPOCH: &str = "Parameter reference epoch";

pub const EPSG_CODE_PARAMETER_SEMI_MAJOR_AXIS_DIFFERENCE: u32 = 8654;
pub const EPSG_NAME_PARAMETER_SEMI_MAJOR_AXIS_DIFFERENCE: &str = "Semi-major axis length difference";
pub const EPSG_CODE_PARAMETER_FLATTENING_DIFFERENCE: u32 = 8655;
pub const EPSG_NAME_PARAMETER_FLATTENING_DIFFERENCE: &str = "Flattening difference";

pub const EPSG_CODE_PARAMETER_LATITUDE_OFFSET: u32 = 8601;
pub const EPSG_NAME_PARAMETER_LATITUDE_OFFSET: &str = "Latitude offset";
pub const EPSG_CODE_PARAMETER_LONGITUDE_OFFSET: u32 = 8602;
pub const EPSG_NAME_PARAMETER_LONGITUDE_OFFSET: &str = "Longitude offset";
pub const EPSG_CODE_PARAMETER_VERTICAL_OFFSET: u32 = 8603;
pub const EPSG_NAME_PARAMETER_VERTICAL_OFFSET: &str = "Vertical Offset";
pub const EPSG_CODE_PARAMETER_GEOID_UNDULATION: u32 = 8604;
pub const EPSG_NAME_PARAMETER_GEOID_UNDULATION: &str = "Geoid undulation";
pub const EPSG_CODE_PARAMETER_UNIT_CONVERSION_SCALAR: u32 = 1051;
pub const EPSG_NAME_PARAMETER_UNIT_CONVERSION_SCALAR: &str = "Unit conversion scalar";

pub const EPSG_CODE_PARAMETER_LATITUDE_LONGITUDE_DIFFERENCE_FILE: u32 = 8656;
pub const EPSG_NAME_PARAMETER_LATITUDE_LONGITUDE_DIFFERENCE_FILE: &str =
    "Latitude and longitude difference file";
pub const EPSG_CODE_PARAMETER_GEOID_CORRECTION_FILENAME: u32 = 8666;
pub const EPSG_NAME_PARAMETER_GEOID_CORRECTION_FILENAME: &str =
    "Geoid (height correction) model file";

/// Helmert-family methods whose parameter negation is only an approximate inverse.
pub const HELMERT_7_PARAMS_METHODS: &[u32] = &[
    EPSG_CODE_METHOD_POSITION_VECTOR_GEOCENTRIC,
    EPSG_CODE_METHOD_POSITION_VECTOR_GEOGRAPHIC_2D,
    EPSG_CODE_METHOD_POSITION_VECTOR_GEOGRAPHIC_3D,
    EPSG_CODE_METHOD_COORDINATE_FRAME_GEOCENTRIC,
    EPSG_CODE_METHOD_COORDINATE_FRAME_GEOGRAPHIC_2D,
    EPSG_CODE_METHOD_COORDINATE_FRAME_GEOGRAPHIC_3D,
];

pub const HELMERT_15_PARAMS_METHODS: &[u32] = &[
    EPSG_CODE_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC,
    EPSG_CODE_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOGRAPHIC_3D,
    EPSG_CODE_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOCENTRIC,
    EPSG_CODE_METHOD_TIME_DEPENDENT_COORDINATE_FRAME_GEOGRAPHIC_3D,
];

pub const GEOCENTRIC_TRANSLATION_METHODS: &[u32] = &[
    EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOCENTRIC,
    EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_2D,
    EPSG_CODE_METHOD_GEOCENTRIC_TRANSLATION_GEOGRAPHIC_3D,
];

pub fn is_position_vector(code: u32) -> bool {
    matches!(
        code,
        EPSG_CODE_METHOD_POSITION_VECTOR_GEOCENTRIC
            | EPSG_CODE_METHOD_POSITION_VECTOR_GEOGRAPHIC_2D
            | EPSG_CODE_METHOD_POSITION_VECTOR_GEOGRAPHIC_3D
            | EPSG_CODE_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOCENTRIC
            | EPSG_CODE_METHOD_TIME_DEPENDENT_POSITION_VECTOR_GEOGRAPHIC_3D
    )
}

pub fn is_helmert(code: u32) -> bool {
    HELMERT_7_PARAMS_METHODS.contains(&code) || HELMERT_15_PARAMS_METHODS.contains(&code)
}

pub fn is_geocentric_translation(code: u32) -> bool {
    GEOCENTRIC_TRANSLATION_METHODS.contains(&code)
}
