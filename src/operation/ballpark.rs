//! Zero-valued fallback operations used when nothing better is known.

use crate::common::units;
use crate::common::{Extent, Measure, ObjectProps};
use crate::crs::{Crs, CrsRef};

use super::conversion::unit_ratio;
use super::{transformation, OperationRef, PositionalAccuracy};

pub const BALLPARK_GEOGRAPHIC_OFFSET: &str = "Ballpark geographic offset";
pub const NULL_GEOGRAPHIC_OFFSET: &str = "Null geographic offset";
pub const BALLPARK_GEOCENTRIC_TRANSLATION: &str = "Ballpark geocentric translation";
pub const NULL_GEOCENTRIC_TRANSLATION: &str = "Null geocentric translation";
pub const BALLPARK_VERTICAL_TRANSFORMATION: &str = "ballpark vertical transformation";
pub const BALLPARK_VERTICAL_TRANSFORMATION_NO_ELLIPSOID_HEIGHT: &str =
    "ballpark vertical transformation, without ellipsoid height to vertical height correction";

/// The extents of both CRS when they are the same, the world otherwise.
fn shared_extent(source: &Crs, target: &Crs) -> Extent {
    match (source.extent(), target.extent()) {
        (Some(a), Some(b)) if a.is_equivalent_to(b) => a.clone(),
        _ => Extent::world(),
    }
}

fn ballpark_props(prefix: &str, source: &Crs, target: &Crs) -> ObjectProps {
    ObjectProps::named(format!("{prefix} from {} to {}", source.name(), target.name()))
        .with_extent(shared_extent(source, target))
}

/// Geographic offsets of zero between two geographic CRS. Exact when both use
/// the same datum, a ballpark of unknown accuracy otherwise.
pub fn create_ballpark_geographic_offset(source: &CrsRef, target: &CrsRef) -> OperationRef {
    let same_datum = source.shares_datum_with(target);
    let prefix = if same_datum {
        NULL_GEOGRAPHIC_OFFSET
    } else {
        BALLPARK_GEOGRAPHIC_OFFSET
    };
    let props = ballpark_props(prefix, source, target);
    let accuracies = if same_datum {
        vec![PositionalAccuracy::Known(0.0)]
    } else {
        Vec::new()
    };
    let zero = Measure::degrees(0.0);
    let op = if source.dimension() == 3 || target.dimension() == 3 {
        transformation::geographic3d_offsets(
            props,
            CrsRef::clone(source),
            CrsRef::clone(target),
            zero.clone(),
            zero,
            Measure::metres(0.0),
            accuracies,
        )
    } else {
        transformation::geographic2d_offsets(
            props,
            CrsRef::clone(source),
            CrsRef::clone(target),
            zero.clone(),
            zero,
            accuracies,
        )
    };
    op.with_ballpark(!same_datum)
}

/// Geocentric translation of zero between two geocentric CRS.
pub fn create_ballpark_geocentric_translation(source: &CrsRef, target: &CrsRef) -> OperationRef {
    let prefix = if source.shares_datum_with(target) {
        NULL_GEOCENTRIC_TRANSLATION
    } else {
        BALLPARK_GEOCENTRIC_TRANSLATION
    };
    let props = ObjectProps::named(format!("{prefix} from {} to {}", source.name(), target.name()))
        .with_extent(Extent::world());
    transformation::geocentric_translations(
        props,
        CrsRef::clone(source),
        CrsRef::clone(target),
        0.0,
        0.0,
        0.0,
        Vec::new(),
    )
    .with_ballpark(true)
}

/// Change of vertical unit between two unrelated height CRS, or between a
/// geographic 3D CRS and a height CRS when no geoid model is known.
pub fn create_ballpark_vertical(source: &CrsRef, target: &CrsRef, through_ellipsoid: bool) -> OperationRef {
    let from = source.vertical_unit().unwrap_or(units::METRE);
    let to = target.vertical_unit().unwrap_or(units::METRE);
    let suffix = if through_ellipsoid {
        BALLPARK_VERTICAL_TRANSFORMATION_NO_ELLIPSOID_HEIGHT
    } else {
        BALLPARK_VERTICAL_TRANSFORMATION
    };
    let props = ObjectProps::named(format!(
        "Transformation from {} to {} ({suffix})",
        source.name(),
        target.name()
    ))
    .with_extent(shared_extent(source, target));
    transformation::change_vertical_unit(
        props,
        CrsRef::clone(source),
        CrsRef::clone(target),
        unit_ratio(&from, &to),
        Vec::new(),
    )
    .with_ballpark(true)
}

/// Whether `name` is that of a zero-valued operation between CRS sharing a datum.
pub fn is_null_transformation_name(name: &str) -> bool {
    !name.contains(" + ")
        && (name.starts_with(BALLPARK_GEOCENTRIC_TRANSLATION)
            || name.starts_with(NULL_GEOGRAPHIC_OFFSET)
            || name.starts_with(NULL_GEOCENTRIC_TRANSLATION))
}

/// Whether `name` contains a ballpark vertical step.
pub fn is_ballpark_vertical_name(name: &str) -> bool {
    name.contains(BALLPARK_VERTICAL_TRANSFORMATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::presets;
    use crate::operation::constants::*;
    use crate::operation::metadata::accuracy_of;

    #[test]
    fn test_geographic_offset_different_datum() {
        let op = create_ballpark_geographic_offset(&presets::ed50(), &presets::wgs84());
        assert!(op.has_ballpark_transformation());
        assert_eq!(op.method_epsg_code(), Some(EPSG_CODE_METHOD_GEOGRAPHIC2D_OFFSETS));
        assert_eq!(op.name(), "Ballpark geographic offset from ED50 to WGS 84");
        assert_eq!(accuracy_of(&op), -1.0);
        assert!(op.extent().unwrap().is_equivalent_to(&Extent::world()));
    }

    #[test]
    fn test_geographic_offset_same_datum_3d() {
        let op = create_ballpark_geographic_offset(&presets::wgs84(), &presets::wgs84_3d());
        assert_eq!(op.method_epsg_code(), Some(EPSG_CODE_METHOD_GEOGRAPHIC3D_OFFSETS));
        assert_eq!(accuracy_of(&op), 0.0);
        assert!(op.name().starts_with(NULL_GEOGRAPHIC_OFFSET));
        assert!(!op.has_ballpark_transformation());
    }

    #[test]
    fn test_geocentric_translation_is_zero() {
        let op = create_ballpark_geocentric_translation(&presets::wgs84_geocentric(), &presets::wgs84_geocentric());
        let single = op.single().unwrap();
        assert_eq!(single.parameter_si(EPSG_CODE_PARAMETER_X_AXIS_TRANSLATION), Some(0.0));
        assert!(op.accuracies().is_empty());
        assert!(op.has_ballpark_transformation());
    }

    #[test]
    fn test_ballpark_vertical_unit_factor() {
        let op = create_ballpark_vertical(&presets::egm96_height_ft(), &presets::navd88_height(), false);
        let factor = op.single().unwrap().parameter_si(EPSG_CODE_PARAMETER_UNIT_CONVERSION_SCALAR).unwrap();
        approx::assert_relative_eq!(factor, 0.3048);
        assert!(is_ballpark_vertical_name(&op.name()));
    }

    #[test]
    fn test_null_transformation_name() {
        assert!(is_null_transformation_name("Null geographic offset from A to B"));
        assert!(!is_null_transformation_name("Null geographic offset from A to B + UTM zone 31N"));
        assert!(!is_null_transformation_name("Ballpark geographic offset from A to B"));
    }
}
