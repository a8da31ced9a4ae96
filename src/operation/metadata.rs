//! Accuracy, extent and grid metadata derived from operations.

use crate::common::{pseudo_area, Extent};
use crate::error::OperationError;
use crate::registry::AuthorityFactory;

use super::{CoordinateOperation, OperationKind, PositionalAccuracy};

/// Accuracy in metres, or `-1.0` when unknown. Conversions are exact; a
/// concatenation sums its steps when all are known.
pub fn accuracy_of(op: &CoordinateOperation) -> f64 {
    if op.is_conversion() {
        return 0.0;
    }
    if let Some(PositionalAccuracy::Known(v)) = op.accuracies().first() {
        return *v;
    }
    if let Some(concat) = op.as_concatenated() {
        let mut total = 0.0;
        for step in &concat.steps {
            let acc = accuracy_of(step);
            if acc < 0.0 {
                return -1.0;
            }
            total += acc;
        }
        return total;
    }
    -1.0
}

pub(crate) fn empty_intersection_error() -> OperationError {
    OperationError::EmptyIntersection(
        "empty intersection of area of validity of concatenated operations".to_string(),
    )
}

/// Domain of validity of `op`. A concatenation without its own domain uses
/// the intersection of its steps, failing with
/// [`OperationError::EmptyIntersection`] when that intersection is empty.
pub fn extent_of(
    op: &CoordinateOperation,
    conversion_is_world: bool,
) -> Result<Option<Extent>, OperationError> {
    if conversion_is_world && op.is_conversion() {
        return Ok(Some(Extent::world()));
    }
    if let Some(extent) = op.extent() {
        return Ok(Some(extent.clone()));
    }
    let Some(concat) = op.as_concatenated() else {
        return Ok(None);
    };
    let mut res: Option<Extent> = None;
    for step in &concat.steps {
        let Some(sub) = extent_of(step, conversion_is_world)? else {
            continue;
        };
        res = match res {
            None => Some(sub),
            Some(cur) => Some(cur.intersection(&sub).ok_or_else(empty_intersection_error)?),
        };
    }
    Ok(res)
}

/// Area of the intersection of `op`'s extent with `area`, or of its extent
/// alone when no area is given. 0 when unknown.
pub fn intersected_area(op: &CoordinateOperation, area: Option<&Extent>) -> f64 {
    let Ok(Some(extent)) = extent_of(op, true) else {
        return 0.0;
    };
    match area {
        Some(area) => extent.intersection(area).map_or(0.0, |e| pseudo_area(&e)),
        None => pseudo_area(&extent),
    }
}

/// A grid an operation needs at runtime, described from the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridDescription {
    pub short_name: String,
    pub full_name: String,
    pub package_name: String,
    pub url: String,
    pub direct_download: bool,
    pub open_license: bool,
    pub available: bool,
}

fn collect_grid_names(op: &CoordinateOperation, out: &mut Vec<String>) {
    match op.kind() {
        OperationKind::Concatenated(c) => {
            for step in &c.steps {
                collect_grid_names(step, out);
            }
        }
        OperationKind::InverseOf(forward) => collect_grid_names(forward, out),
        OperationKind::ProjBased(p) => out.extend(p.grid_names()),
        OperationKind::Conversion(s) | OperationKind::Transformation(s) => {
            for filename in s.filenames() {
                out.extend(
                    filename
                        .split(',')
                        .map(str::trim)
                        .filter(|n| !n.is_empty())
                        .map(str::to_string),
                );
            }
        }
    }
}

/// Grid file names referenced by `op` and its steps, in order, possibly repeated.
pub fn grid_names(op: &CoordinateOperation) -> Vec<String> {
    let mut names = Vec::new();
    collect_grid_names(op, &mut names);
    names
}

/// Grids referenced by `op` and its steps, deduplicated, enriched with what
/// the registry knows about each of them.
pub fn grids_needed(
    op: &CoordinateOperation,
    registry: Option<&dyn AuthorityFactory>,
    known_available: bool,
) -> Vec<GridDescription> {
    let mut out: Vec<GridDescription> = Vec::new();
    for name in grid_names(op) {
        if out.iter().any(|g| g.short_name == name) {
            continue;
        }
        let mut desc = GridDescription {
            short_name: name.clone(),
            ..Default::default()
        };
        if let Some(alt) = registry.and_then(|r| r.grid_alternative(&name)) {
            desc.full_name = alt.proj_filename.clone();
            desc.package_name = alt.package_name.clone();
            desc.url = alt.url.clone();
            desc.direct_download = alt.direct_download;
            desc.open_license = alt.open_license;
            desc.available = known_available || alt.available;
        } else {
            desc.available = known_available;
        }
        out.push(desc);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ObjectProps;
    use crate::crs::presets;
    use crate::operation::{concatenated, conversion, transformation, CrsPair};
    use std::sync::Arc;

    #[test]
    fn test_conversion_accuracy_is_zero() {
        assert_eq!(accuracy_of(&conversion::utm(31, true)), 0.0);
    }

    #[test]
    fn test_concatenated_accuracy_sum_and_unknown() {
        let a = transformation::geocentric_translations(
            ObjectProps::named("a"),
            presets::ed50(),
            presets::wgs84(),
            1.0,
            2.0,
            3.0,
            vec![PositionalAccuracy::Known(1.0)],
        );
        let b = transformation::geocentric_translations(
            ObjectProps::named("b"),
            presets::wgs84(),
            presets::nad83(),
            0.0,
            0.0,
            0.0,
            vec![PositionalAccuracy::Known(2.0)],
        );
        let c = transformation::geocentric_translations(
            ObjectProps::named("c"),
            presets::wgs84(),
            presets::nad83(),
            0.0,
            0.0,
            0.0,
            vec![],
        );
        let ab = concatenated::create_compute_metadata(vec![Arc::clone(&a), b], false).unwrap();
        assert_eq!(accuracy_of(&ab), 3.0);
        let ac = concatenated::create_compute_metadata(vec![a, c], false).unwrap();
        assert_eq!(accuracy_of(&ac), -1.0);
    }

    #[test]
    fn test_grids_needed_splits_filenames() {
        let op = transformation::ntv2(
            ObjectProps::named("x"),
            presets::nad27(),
            presets::nad83(),
            "a.gsb, b.gsb",
            vec![],
        );
        let grids = grids_needed(&op, None, false);
        let names: Vec<_> = grids.iter().map(|g| g.short_name.as_str()).collect();
        assert_eq!(names, ["a.gsb", "b.gsb"]);
        assert!(!grids[0].available);
    }

    #[test]
    fn test_extent_of_conversion_is_world() {
        let conv = conversion::utm(31, true).with_crs_pair(CrsPair::new(
            presets::wgs84(),
            presets::utm_wgs84(31, true),
        ));
        let extent = extent_of(&conv, true).unwrap().unwrap();
        assert!(extent.is_equivalent_to(&Extent::world()));
    }
}
