//! Ordered chains of operations.

use std::sync::Arc;

use crate::common::{Criterion, Extent, ObjectProps};
use crate::crs::{are_more_or_less_equivalent, CrsRef, CrsType};
use crate::error::OperationError;

use super::metadata::{accuracy_of, empty_intersection_error, extent_of};
use super::{
    equivalence, inverse_name, CoordinateOperation, CrsPair, OperationCommon, OperationKind,
    OperationRef, PositionalAccuracy,
};

#[derive(Clone, Debug)]
pub struct ConcatenatedOperation {
    pub steps: Vec<OperationRef>,
    /// Whether the name was generated from the step names, and must be
    /// regenerated on inversion.
    pub computed_name: bool,
}

fn flatten(steps: Vec<OperationRef>) -> Vec<OperationRef> {
    let mut out = Vec::with_capacity(steps.len());
    for step in steps {
        match step.as_concatenated() {
            Some(c) => out.extend(flatten(c.steps.clone())),
            None => out.push(step),
        }
    }
    out
}

/// Interpolation CRS shared by every step, or the geographic middle CRS of a
/// vertical to geographic to vertical chain.
fn common_interpolation_crs(steps: &[OperationRef]) -> Option<CrsRef> {
    if let [first, second] = steps {
        if let (Some(s0), Some(t0), Some(s1), Some(t1)) = (
            first.source_crs(),
            first.target_crs(),
            second.source_crs(),
            second.target_crs(),
        ) {
            if s0.crs_type() == CrsType::Vertical
                && t1.crs_type() == CrsType::Vertical
                && t0.is_geographic()
                && t0.is_equivalent_to(s1, Criterion::Equivalent)
            {
                return Some(Arc::clone(t0));
            }
        }
    }
    let first = steps.first()?.interpolation_crs()?;
    steps
        .iter()
        .all(|s| {
            s.interpolation_crs()
                .is_some_and(|c| c.is_equivalent_to(first, Criterion::Equivalent))
        })
        .then(|| Arc::clone(first))
}

/// Chain `steps` into one operation. Nested chains are flattened; each
/// step's target must match the next step's source.
pub fn create(
    props: ObjectProps,
    steps: Vec<OperationRef>,
    accuracies: Vec<PositionalAccuracy>,
) -> Result<OperationRef, OperationError> {
    let steps = flatten(steps);
    if steps.len() < 2 {
        return Err(OperationError::InvalidOperation(
            "ConcatenatedOperation must have at least 2 operations".to_string(),
        ));
    }
    let mut prev_target: Option<&CrsRef> = None;
    for step in &steps {
        let (Some(source), Some(target)) = (step.source_crs(), step.target_crs()) else {
            return Err(OperationError::InvalidOperation(
                "At least one of the operation lacks a source and/or target CRS".to_string(),
            ));
        };
        if let Some(prev) = prev_target {
            if !are_more_or_less_equivalent(prev, source) {
                return Err(OperationError::InvalidOperation(
                    "Inconsistent chaining of CRS in operations".to_string(),
                ));
            }
        }
        prev_target = Some(target);
    }
    let ballpark = steps.iter().any(|s| s.has_ballpark_transformation());
    let source = steps.first().and_then(|s| s.source_crs()).cloned();
    let target = steps.last().and_then(|s| s.target_crs()).cloned();
    let mut common = OperationCommon::new(props)
        .with_accuracies(accuracies)
        .with_interpolation_crs(common_interpolation_crs(&steps))
        .with_ballpark(ballpark);
    if let (Some(source), Some(target)) = (source, target) {
        common.crs_pair = Some(CrsPair::new(source, target));
    }
    common.source_epoch = steps.first().and_then(|s| s.source_epoch());
    common.target_epoch = steps.last().and_then(|s| s.target_epoch());
    Ok(CoordinateOperation::new(
        common,
        OperationKind::Concatenated(ConcatenatedOperation {
            steps,
            computed_name: false,
        }),
    ))
}

/// Whether `b` undoes `a`.
fn cancels(a: &OperationRef, b: &OperationRef) -> bool {
    let (Some(a_source), Some(b_target)) = (a.source_crs(), b.target_crs()) else {
        return false;
    };
    equivalence::is_equivalent(a, &b.inverse(), Criterion::Equivalent)
        && are_more_or_less_equivalent(a_source, b_target)
}

fn remove_inverse_pairs(steps: &mut Vec<OperationRef>) {
    'restart: while steps.len() > 2 {
        for i in 0..steps.len() - 1 {
            if cancels(&steps[i], &steps[i + 1]) {
                steps.drain(i..i + 2);
                continue 'restart;
            }
        }
        break;
    }
}

/// Chain `ops` computing the name, extent, accuracy and ballpark flag from
/// the steps. A single operation is returned as is. Consecutive steps that
/// cancel each other are dropped while more than two steps remain.
pub fn create_compute_metadata(
    ops: Vec<OperationRef>,
    check_extent: bool,
) -> Result<OperationRef, OperationError> {
    if ops.len() == 1 {
        return Ok(Arc::clone(&ops[0]));
    }
    let mut steps = flatten(ops);
    let ballpark = steps.iter().any(|s| s.has_ballpark_transformation());
    remove_inverse_pairs(&mut steps);
    if steps.len() == 1 {
        return Ok(steps.remove(0));
    }

    let name = steps.iter().map(|s| s.name().into_owned()).collect::<Vec<_>>().join(" + ");
    let mut extent: Option<Extent> = None;
    let mut empty = false;
    for step in &steps {
        let sub = match extent_of(step, true) {
            Ok(Some(sub)) => sub,
            Ok(None) => continue,
            Err(e) if e.is_empty_intersection() => {
                empty = true;
                break;
            }
            Err(e) => return Err(e),
        };
        let next = match &extent {
            None => Some(sub),
            Some(cur) => cur.intersection(&sub),
        };
        if next.is_none() {
            empty = true;
            break;
        }
        extent = next;
    }
    if empty {
        if check_extent {
            return Err(empty_intersection_error());
        }
        extent = None;
    }

    let mut total = 0.0;
    let mut all_known = true;
    for step in &steps {
        let acc = accuracy_of(step);
        if acc < 0.0 {
            all_known = false;
            break;
        }
        total += acc;
    }
    let accuracies = if all_known {
        vec![PositionalAccuracy::Known(total)]
    } else {
        Vec::new()
    };

    let mut props = ObjectProps::named(name);
    if let Some(extent) = extent {
        props = props.with_extent(extent);
    }
    let op = create(props, steps, accuracies)?;
    Ok(mark_computed(&op, ballpark))
}

fn mark_computed(op: &CoordinateOperation, ballpark: bool) -> OperationRef {
    let mut copy = op.clone();
    if let OperationKind::Concatenated(ref mut c) = copy.kind {
        c.computed_name = true;
    }
    copy.common.has_ballpark = ballpark;
    Arc::new(copy)
}

pub(crate) fn inverse(op: &OperationRef) -> OperationRef {
    let Some(concat) = op.as_concatenated() else {
        return Arc::clone(op);
    };
    let steps: Vec<OperationRef> = concat.steps.iter().rev().map(|s| s.inverse()).collect();
    let name = if concat.computed_name {
        steps.iter().map(|s| s.name().into_owned()).collect::<Vec<_>>().join(" + ")
    } else {
        inverse_name(&op.name(), false)
    };
    let fwd = op.props();
    let mut props = ObjectProps::named(name);
    props.domains = fwd.domains.clone();
    props.remarks = fwd.remarks.clone();
    let mut common = super::inverse_common(op, props);
    if common.crs_pair.is_none() {
        common.crs_pair = match (
            steps.first().and_then(|s| s.source_crs()),
            steps.last().and_then(|s| s.target_crs()),
        ) {
            (Some(s), Some(t)) => Some(CrsPair::new(Arc::clone(s), Arc::clone(t))),
            _ => None,
        };
    }
    CoordinateOperation::new(
        common,
        OperationKind::Concatenated(ConcatenatedOperation {
            steps,
            computed_name: concat.computed_name,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::presets;
    use crate::operation::{conversion, transformation};

    fn ed50_to_wgs84(extent: Option<Extent>) -> OperationRef {
        let mut props = ObjectProps::named("ED50 to WGS 84 (1)");
        if let Some(e) = extent {
            props = props.with_extent(e);
        }
        transformation::geocentric_translations(
            props,
            presets::ed50(),
            presets::wgs84(),
            -87.0,
            -98.0,
            -121.0,
            vec![PositionalAccuracy::Known(5.0)],
        )
    }

    #[test]
    fn test_create_requires_two_steps() {
        let err = create(ObjectProps::named("x"), vec![ed50_to_wgs84(None)], vec![]).unwrap_err();
        assert!(matches!(err, OperationError::InvalidOperation(_)));
    }

    #[test]
    fn test_create_rejects_bad_chaining() {
        let a = ed50_to_wgs84(None);
        let err = create(ObjectProps::named("x"), vec![Arc::clone(&a), a], vec![]).unwrap_err();
        assert_eq!(
            err,
            OperationError::InvalidOperation("Inconsistent chaining of CRS in operations".into())
        );
    }

    #[test]
    fn test_compute_metadata_name_and_inverse() {
        let utm = presets::utm_wgs84(31, true);
        let ops = vec![ed50_to_wgs84(None), utm.derivation().unwrap()];
        let op = create_compute_metadata(ops, true).unwrap();
        assert_eq!(op.name(), "ED50 to WGS 84 (1) + UTM zone 31N");
        assert!(op.as_concatenated().unwrap().computed_name);

        let inv = op.inverse();
        assert_eq!(inv.name(), "Inverse of UTM zone 31N + Inverse of ED50 to WGS 84 (1)");
        assert_eq!(inv.source_crs().unwrap().name(), utm.name());
        assert_eq!(inv.target_crs().unwrap().name(), "ED50");
    }

    #[test]
    fn test_compute_metadata_single_op_passthrough() {
        let a = ed50_to_wgs84(None);
        let out = create_compute_metadata(vec![Arc::clone(&a)], true).unwrap();
        assert!(Arc::ptr_eq(&a, &out));
    }

    #[test]
    fn test_compute_metadata_empty_intersection() {
        let a = ed50_to_wgs84(Some(Extent::from_bbox(-10.0, 35.0, 30.0, 70.0)));
        let b = transformation::geocentric_translations(
            ObjectProps::named("WGS 84 to NAD83").with_extent(Extent::from_bbox(-170.0, 20.0, -50.0, 80.0)),
            presets::wgs84(),
            presets::nad83(),
            0.0,
            0.0,
            0.0,
            vec![],
        );
        let err = create_compute_metadata(vec![Arc::clone(&a), Arc::clone(&b)], true).unwrap_err();
        assert!(err.is_empty_intersection());
        assert!(create_compute_metadata(vec![a, b], false).is_ok());
    }

    #[test]
    fn test_compute_metadata_drops_inverse_pairs() {
        let a = ed50_to_wgs84(None);
        let swap = conversion::create_axis_order_reversal(false)
            .with_crs_pair(CrsPair::new(presets::wgs84(), presets::ogc_crs84()));
        let ops = vec![Arc::clone(&a), Arc::clone(&swap), swap.inverse()];
        let out = create_compute_metadata(ops, true).unwrap();
        assert!(Arc::ptr_eq(&out, &a));
    }

    #[test]
    fn test_ballpark_flag_propagates() {
        let a = ed50_to_wgs84(None).with_ballpark(true);
        let utm = presets::utm_wgs84(31, true);
        let op = create_compute_metadata(vec![a, utm.derivation().unwrap()], true).unwrap();
        assert!(op.has_ballpark_transformation());
    }
}
