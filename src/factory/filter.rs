//! Filtering and ranking of raw candidates.
//!
//! Candidates are first dropped by ballpark policy, accuracy ceiling, grid
//! availability and area of use. The survivors are sorted best first with a
//! lexicographic comparison on precomputed keys, then pruned of trailing
//! ballpark results, dominated operations and duplicates.

use std::cmp::Ordering;

use crate::common::{pseudo_area, Extent};
use crate::crs::CrsRef;
use crate::io::to_proj_string;
use crate::operation::constants::is_helmert;
use crate::operation::metadata::{accuracy_of, extent_of, grids_needed, intersected_area};
use crate::operation::{ballpark, is_approximate_inversion_name, OperationRef};

use super::{CoordinateOperationContext, GridAvailabilityUse, SourceTargetExtentUse, SpatialCriterion};

/// Historical operations whose numbering does not reflect their quality:
/// the first of each pair is preferred.
const PREFERRED_PAIRS: &[(&str, &str)] = &[
    ("NTF (Paris) to NTF (1)", "NTF (Paris) to NTF (2)"),
    ("NTF (Paris) to RGF93 (1)", "NTF (Paris) to RGF93 (2)"),
];

/// Area an operation must cover to be kept.
#[derive(Clone, Debug)]
enum AreaFilter {
    Unrestricted,
    One(Extent),
    Both(Extent, Extent),
}

impl AreaFilter {
    fn new(source: &CrsRef, target: &CrsRef, ctx: &CoordinateOperationContext) -> Self {
        if let Some(aoi) = ctx.area_of_interest() {
            return AreaFilter::One(aoi.clone());
        }
        let (s, t) = (source.extent().cloned(), target.extent().cloned());
        match (ctx.extent_use(), s, t) {
            (SourceTargetExtentUse::None, _, _) | (_, None, None) => AreaFilter::Unrestricted,
            (_, Some(e), None) | (_, None, Some(e)) => AreaFilter::One(e),
            (SourceTargetExtentUse::Both, Some(s), Some(t)) => AreaFilter::Both(s, t),
            (SourceTargetExtentUse::Intersection, Some(s), Some(t)) => match s.intersection(&t) {
                Some(e) => AreaFilter::One(e),
                None => AreaFilter::Unrestricted,
            },
            (SourceTargetExtentUse::Smallest, Some(s), Some(t)) => {
                if pseudo_area(&t) < pseudo_area(&s) {
                    AreaFilter::One(t)
                } else {
                    AreaFilter::One(s)
                }
            }
        }
    }

    /// Extent the intersected area of candidates is measured against.
    fn ranking_extent(&self) -> Option<Extent> {
        match self {
            AreaFilter::Unrestricted => None,
            AreaFilter::One(e) => Some(e.clone()),
            AreaFilter::Both(s, t) => s.intersection(t),
        }
    }

    fn accepts(&self, extent: &Extent, criterion: SpatialCriterion) -> bool {
        let check = |area: &Extent| match criterion {
            SpatialCriterion::StrictContainment => extent.contains(area),
            SpatialCriterion::PartialIntersection => extent.intersects(area),
        };
        match self {
            AreaFilter::Unrestricted => true,
            AreaFilter::One(e) => check(e),
            AreaFilter::Both(s, t) => check(s) && check(t),
        }
    }
}

fn filter_out(ops: Vec<OperationRef>, area: &AreaFilter, ctx: &CoordinateOperationContext) -> Vec<OperationRef> {
    let desired = ctx.desired_accuracy();
    let by_accuracy: Vec<OperationRef> = ops
        .into_iter()
        .filter(|op| ctx.allow_ballpark() || !op.has_ballpark_transformation())
        .filter(|op| {
            if desired <= 0.0 {
                return true;
            }
            let acc = accuracy_of(op);
            acc >= 0.0 && acc <= desired
        })
        .filter(|op| {
            ctx.grid_availability() != GridAvailabilityUse::DiscardIfMissing
                || grids_needed(op, ctx.registry(), false).iter().all(|g| g.available)
        })
        .collect();
    if matches!(area, AreaFilter::Unrestricted) {
        return by_accuracy;
    }

    let mut missing_extent = false;
    let res: Vec<OperationRef> = by_accuracy
        .iter()
        .filter(|op| match extent_of(op, true) {
            Ok(Some(extent)) => area.accepts(&extent, ctx.spatial_criterion()),
            Ok(None) => {
                missing_extent = true;
                false
            }
            Err(e) => {
                tracing::trace!(op = %op.name(), error = %e, "no usable extent");
                false
            }
        })
        .cloned()
        .collect();
    if res.is_empty() && missing_extent {
        tracing::debug!("no candidate with a known extent, area filter skipped");
        return by_accuracy;
    }
    res
}

/// Sort keys of one candidate, computed once.
struct Candidate {
    op: OperationRef,
    name: String,
    extent: Option<Extent>,
    proj: Option<String>,
    area: f64,
    accuracy: f64,
    has_grids: bool,
    grids_available: bool,
    grids_known: bool,
    step_count: usize,
    is_ballpark: bool,
    approx_inverse: bool,
    ballpark_vertical: bool,
    null_transform: bool,
    full_coverage: bool,
}

impl Candidate {
    fn new(op: OperationRef, ranking: Option<&Extent>, ctx: &CoordinateOperationContext) -> Self {
        let name = op.name().into_owned();
        let extent = extent_of(&op, true).ok().flatten();
        let proj = to_proj_string(&op).ok();
        let grids = grids_needed(
            &op,
            ctx.registry(),
            ctx.grid_availability() == GridAvailabilityUse::KnownAvailable,
        );
        let (grids_available, grids_known) = match ctx.grid_availability() {
            GridAvailabilityUse::Ignore => (true, true),
            _ => (
                grids.iter().all(|g| g.available),
                grids
                    .iter()
                    .all(|g| g.available || !g.full_name.is_empty() || !g.package_name.is_empty()),
            ),
        };
        let approx_inverse = is_approximate_inversion_name(&name)
            || op
                .inverse_of()
                .is_some_and(|forward| forward.method_epsg_code().is_some_and(is_helmert));
        let full_coverage = match (ranking, &extent) {
            (None, _) => true,
            (Some(area), Some(extent)) => extent.contains(area),
            (Some(_), None) => false,
        };
        Self {
            area: intersected_area(&op, ranking),
            accuracy: accuracy_of(&op),
            has_grids: !grids.is_empty(),
            grids_available,
            grids_known,
            step_count: op.steps().len(),
            is_ballpark: op.has_ballpark_transformation(),
            approx_inverse,
            ballpark_vertical: ballpark::is_ballpark_vertical_name(&name),
            null_transform: ballpark::is_null_transformation_name(&name),
            full_coverage,
            name,
            extent,
            proj,
            op,
        }
    }
}

fn compare_accuracy_and_area(a: &Candidate, b: &Candidate) -> Ordering {
    let (known_a, known_b) = (a.accuracy >= 0.0, b.accuracy >= 0.0);
    known_b
        .cmp(&known_a)
        .then_with(|| {
            if known_a || known_b {
                Ordering::Equal
            } else {
                b.has_grids.cmp(&a.has_grids)
            }
        })
        .then_with(|| b.area.total_cmp(&a.area))
        .then_with(|| {
            if !known_a || !known_b {
                return Ordering::Equal;
            }
            a.accuracy
                .total_cmp(&b.accuracy)
                .then_with(|| a.has_grids.cmp(&b.has_grids))
        })
}

fn compare_historical(a: &Candidate, b: &Candidate) -> Ordering {
    for (preferred, other) in PREFERRED_PAIRS {
        match (a.name.as_str(), b.name.as_str()) {
            (x, y) if x == *preferred && y == *other => return Ordering::Less,
            (x, y) if x == *other && y == *preferred => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

/// Best first. A total preorder on the keys of [`Candidate`].
fn compare(a: &Candidate, b: &Candidate) -> Ordering {
    b.proj
        .is_some()
        .cmp(&a.proj.is_some())
        .then(a.approx_inverse.cmp(&b.approx_inverse))
        .then(a.ballpark_vertical.cmp(&b.ballpark_vertical))
        .then(a.null_transform.cmp(&b.null_transform))
        .then(b.grids_available.cmp(&a.grids_available))
        .then(b.grids_known.cmp(&a.grids_known))
        .then_with(|| compare_accuracy_and_area(a, b))
        .then(a.step_count.cmp(&b.step_count))
        .then(a.name.len().cmp(&b.name.len()))
        .then_with(|| compare_historical(a, b))
        .then_with(|| b.name.cmp(&a.name))
}

/// Drops a synthesised ballpark result at the end when an earlier candidate
/// covers the whole area without grids.
fn drop_trailing_ballpark(candidates: &mut Vec<Candidate>) {
    let Some(last) = candidates.last() else {
        return;
    };
    if candidates.len() < 2 || !(last.is_ballpark || last.null_transform) {
        return;
    }
    let covered = candidates[..candidates.len() - 1]
        .iter()
        .any(|c| !c.has_grids && !c.is_ballpark && c.full_coverage);
    if covered {
        candidates.pop();
    }
}

/// Whether `c` is no better than `kept` while covering less with more steps.
fn is_dominated(c: &Candidate, kept: &Candidate) -> bool {
    if kept.accuracy < 0.0 || c.accuracy < kept.accuracy || c.step_count <= kept.step_count {
        return false;
    }
    match (&c.extent, &kept.extent) {
        (Some(mine), Some(theirs)) => theirs.contains(mine),
        _ => false,
    }
}

fn is_duplicate(c: &Candidate, kept: &Candidate) -> bool {
    let same_extent = match (&c.extent, &kept.extent) {
        (Some(a), Some(b)) => a.is_equivalent_to(b),
        (None, None) => true,
        _ => false,
    };
    c.proj.is_some() && c.proj == kept.proj && same_extent
}

fn prune(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    drop_trailing_ballpark(&mut candidates);
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if let Some(last) = kept.last() {
            if is_dominated(&c, last) {
                tracing::trace!(op = %c.name, "dominated");
                continue;
            }
        }
        if kept.iter().any(|k| is_duplicate(&c, k)) {
            tracing::trace!(op = %c.name, "duplicate");
            continue;
        }
        kept.push(c);
    }
    drop_trailing_ballpark(&mut kept);
    kept
}

/// Filtered candidates from `source` to `target`, best first.
pub(super) fn filter_and_sort(
    ops: Vec<OperationRef>,
    source: &CrsRef,
    target: &CrsRef,
    ctx: &CoordinateOperationContext,
) -> Vec<OperationRef> {
    let raw_count = ops.len();
    let area = AreaFilter::new(source, target, ctx);
    let filtered = filter_out(ops, &area, ctx);
    let ranking = area.ranking_extent();
    let mut candidates: Vec<Candidate> = filtered
        .into_iter()
        .map(|op| Candidate::new(op, ranking.as_ref(), ctx))
        .collect();
    candidates.sort_by(compare);
    let kept = prune(candidates);
    tracing::debug!(raw = raw_count, kept = kept.len(), "filtered candidates");
    kept.into_iter().map(|c| c.op).collect()
}
