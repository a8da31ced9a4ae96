//! Operations whose only definition is a PROJ pipeline: either given as text,
//! or assembled from independent horizontal and vertical legs.

use crate::common::{Criterion, Extent, ObjectProps};
use crate::crs::CrsRef;
use crate::error::OperationError;

use super::metadata::{accuracy_of, empty_intersection_error, extent_of, grid_names};
use super::{
    equivalence, inverse_common, inverse_props, CoordinateOperation, OperationCommon, OperationKind,
    OperationRef, PositionalAccuracy,
};

/// Keys whose values list grid files in a PROJ string.
const GRID_KEYS: &[&str] = &["grids", "geoidgrids", "file"];

#[derive(Clone, Debug)]
pub enum ProjSource {
    Pipeline(String),
    /// Horizontal then vertical leg, each leaving the other dimensions untouched.
    HorizVertical {
        horizontal: OperationRef,
        vertical: OperationRef,
    },
    /// Horizontal leg into the interpolation CRS of the vertical leg, the
    /// vertical leg, then a horizontal leg out of it.
    Interpolated {
        to_interpolation: OperationRef,
        vertical: OperationRef,
        from_interpolation: OperationRef,
    },
}

#[derive(Clone, Debug)]
pub struct ProjBasedOperation {
    source: ProjSource,
    inverted: bool,
}

impl ProjBasedOperation {
    pub fn source(&self) -> &ProjSource {
        &self.source
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Operations the pipeline is assembled from, in forward order.
    pub fn legs(&self) -> Vec<&OperationRef> {
        match &self.source {
            ProjSource::Pipeline(_) => Vec::new(),
            ProjSource::HorizVertical {
                horizontal,
                vertical,
            } => vec![horizontal, vertical],
            ProjSource::Interpolated {
                to_interpolation,
                vertical,
                from_interpolation,
            } => vec![to_interpolation, vertical, from_interpolation],
        }
    }

    /// Grid files referenced by the pipeline.
    pub fn grid_names(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let ProjSource::Pipeline(text) = &self.source else {
            for leg in self.legs() {
                for name in grid_names(leg) {
                    if !out.contains(&name) {
                        out.push(name);
                    }
                }
            }
            return out;
        };
        for token in text.split_whitespace() {
            let token = token.trim_start_matches('+');
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            if !GRID_KEYS.contains(&key) {
                continue;
            }
            for grid in value.split(',') {
                let grid = grid.trim_start_matches('@');
                if !grid.is_empty() && !out.iter().any(|g| g == grid) {
                    out.push(grid.to_string());
                }
            }
        }
        out
    }

    pub fn is_equivalent_to(&self, other: &ProjBasedOperation, criterion: Criterion) -> bool {
        if self.inverted != other.inverted {
            return false;
        }
        match (&self.source, &other.source) {
            (ProjSource::Pipeline(a), ProjSource::Pipeline(b)) => a == b,
            (ProjSource::Pipeline(_), _) | (_, ProjSource::Pipeline(_)) => false,
            _ => {
                let (a, b) = (self.legs(), other.legs());
                a.len() == b.len()
                    && a.iter()
                        .zip(&b)
                        .all(|(x, y)| equivalence::is_equivalent(x, y, criterion))
            }
        }
    }

    pub(crate) fn inverse(&self, op: &OperationRef) -> OperationRef {
        let common = inverse_common(op, inverse_props(op, false));
        CoordinateOperation::new(
            common,
            OperationKind::ProjBased(ProjBasedOperation {
                source: self.source.clone(),
                inverted: !self.inverted,
            }),
        )
    }
}

/// Operation running `pipeline`. Source and target are optional, but set together.
pub fn create(
    props: ObjectProps,
    pipeline: impl Into<String>,
    crs_pair: Option<(CrsRef, CrsRef)>,
    accuracies: Vec<PositionalAccuracy>,
) -> OperationRef {
    let mut common = OperationCommon::new(props).with_accuracies(accuracies);
    if let Some((source, target)) = crs_pair {
        common = common.with_crs_pair(source, target);
    }
    CoordinateOperation::new(
        common,
        OperationKind::ProjBased(ProjBasedOperation {
            source: ProjSource::Pipeline(pipeline.into()),
            inverted: false,
        }),
    )
}

/// Combines legs into one operation from `source` to `target`. Name,
/// accuracy, extent and ballpark flag are computed from the legs; legs whose
/// extents do not intersect are rejected.
fn from_legs(source: CrsRef, target: CrsRef, legs: ProjSource) -> Result<OperationRef, OperationError> {
    let op = ProjBasedOperation {
        source: legs,
        inverted: false,
    };
    let steps = op.legs();
    let name = steps.iter().map(|s| s.name().into_owned()).collect::<Vec<_>>().join(" + ");
    let mut extent: Option<Extent> = None;
    for step in &steps {
        let Some(sub) = extent_of(step, true)? else {
            continue;
        };
        extent = Some(match extent {
            None => sub,
            Some(cur) => cur.intersection(&sub).ok_or_else(empty_intersection_error)?,
        });
    }
    let mut total = 0.0;
    let mut known = true;
    for step in &steps {
        let acc = accuracy_of(step);
        if acc < 0.0 {
            known = false;
            break;
        }
        total += acc;
    }
    let ballpark = steps.iter().any(|s| s.has_ballpark_transformation());
    let mut props = ObjectProps::named(name);
    if let Some(extent) = extent {
        props = props.with_extent(extent);
    }
    let accuracies = if known {
        vec![PositionalAccuracy::Known(total)]
    } else {
        Vec::new()
    };
    let common = OperationCommon::new(props)
        .with_crs_pair(source, target)
        .with_accuracies(accuracies)
        .with_ballpark(ballpark);
    Ok(CoordinateOperation::new(common, OperationKind::ProjBased(op)))
}

pub fn create_horiz_vertical(
    source: CrsRef,
    target: CrsRef,
    horizontal: OperationRef,
    vertical: OperationRef,
) -> Result<OperationRef, OperationError> {
    from_legs(
        source,
        target,
        ProjSource::HorizVertical {
            horizontal,
            vertical,
        },
    )
}

pub fn create_interpolated(
    source: CrsRef,
    target: CrsRef,
    to_interpolation: OperationRef,
    vertical: OperationRef,
    from_interpolation: OperationRef,
) -> Result<OperationRef, OperationError> {
    from_legs(
        source,
        target,
        ProjSource::Interpolated {
            to_interpolation,
            vertical,
            from_interpolation,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Measure;
    use crate::crs::presets;
    use crate::operation::transformation;

    #[test]
    fn test_grid_names_from_pipeline() {
        let op = create(
            ObjectProps::named("geoid"),
            "+proj=pipeline +step +proj=vgridshift +grids=@us_nga_egm96_15.tif,other.gtx +multiplier=1",
            None,
            vec![],
        );
        let p = op.as_proj_based().unwrap();
        assert_eq!(p.grid_names(), ["us_nga_egm96_15.tif", "other.gtx"]);
    }

    #[test]
    fn test_inverse_toggles_flag_and_swaps_crs() {
        let op = create(
            ObjectProps::named("custom"),
            "+proj=affine +xoff=1",
            Some((presets::wgs84(), presets::wgs84_3d())),
            vec![PositionalAccuracy::Known(0.5)],
        );
        let inv = op.inverse();
        assert!(inv.as_proj_based().unwrap().is_inverted());
        assert_eq!(inv.name(), "Inverse of custom");
        assert_eq!(inv.source_crs().unwrap().dimension(), 3);
        assert!(!inv.inverse().as_proj_based().unwrap().is_inverted());
    }

    #[test]
    fn test_horiz_vertical_metadata() {
        let horizontal = transformation::ntv2(
            ObjectProps::named("NAD27 to NAD83 (7)").with_extent(Extent::from_bbox(-141.0, 40.0, -47.0, 84.0)),
            presets::nad27(),
            presets::nad83(),
            "ntv2_0.gsb",
            vec![PositionalAccuracy::Known(1.5)],
        );
        let vertical = transformation::vertical_offset(
            ObjectProps::named("offset").with_extent(Extent::from_bbox(-100.0, 30.0, -60.0, 60.0)),
            presets::egm96_height(),
            presets::navd88_height(),
            Measure::metres(0.5),
            vec![PositionalAccuracy::Known(0.5)],
        );
        let op = create_horiz_vertical(presets::nad27(), presets::nad83(), horizontal, vertical).unwrap();
        assert_eq!(op.name(), "NAD27 to NAD83 (7) + offset");
        assert_eq!(op.accuracies(), [PositionalAccuracy::Known(2.0)]);
        let bbox = op.extent().unwrap().bbox.unwrap();
        assert_eq!((bbox.west, bbox.south, bbox.east, bbox.north), (-100.0, 40.0, -60.0, 60.0));
        assert_eq!(op.as_proj_based().unwrap().grid_names(), ["ntv2_0.gsb"]);
    }

    #[test]
    fn test_disjoint_legs_rejected() {
        let horizontal = transformation::ntv2(
            ObjectProps::named("h").with_extent(Extent::from_bbox(0.0, 0.0, 10.0, 10.0)),
            presets::nad27(),
            presets::nad83(),
            "a.gsb",
            vec![],
        );
        let vertical = transformation::vertical_offset(
            ObjectProps::named("v").with_extent(Extent::from_bbox(20.0, 20.0, 30.0, 30.0)),
            presets::egm96_height(),
            presets::navd88_height(),
            Measure::metres(0.0),
            vec![],
        );
        let err = create_horiz_vertical(presets::nad27(), presets::nad83(), horizontal, vertical).unwrap_err();
        assert!(err.is_empty_intersection());
    }
}
