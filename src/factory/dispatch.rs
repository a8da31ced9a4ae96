//! CRS-pair dispatch. The structural kinds of the source and target CRS
//! decide how candidates are built: registry lookups first, then operations
//! synthesised from what the two CRS define, recursing into base, hub and
//! component CRS.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use crate::common::units::{self, UnitOfMeasure};
use crate::common::{Criterion, Measure, ObjectProps};
use crate::crs::{BoundCrs, CoordinateSystem, Crs, CrsKind, CrsRef, CrsType};
use crate::error::OperationError;
use crate::operation::conversion::unit_ratio;
use crate::operation::{
    ballpark, concatenated, conversion, equivalence, proj_based, transformation, CrsPair,
    OperationRef,
};
use crate::registry::AuthorityFactory;

use super::CoordinateOperationContext;

/// Flags handed down by value to every recursive call. A flag set by a
/// caller holds for its whole subtree.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Guard {
    in_datum_pivot: bool,
}

impl Guard {
    pub(super) fn in_datum_pivot(self) -> bool {
        self.in_datum_pivot
    }

    pub(super) fn entering_datum_pivot(self) -> Self {
        Self {
            in_datum_pivot: true,
        }
    }
}

/// State of one top-level resolution. Never shared between threads.
pub(crate) struct Search<'a> {
    pub(super) context: &'a CoordinateOperationContext,
    /// Registry CRS found by name, per name and type.
    pub(super) name_cache: RefCell<HashMap<(String, CrsType), Vec<CrsRef>>>,
}

/// A vertical operation from a vertical CRS to a geographic 3D CRS, with
/// the CRS its horizontal coordinates must be expressed in.
pub(super) struct VerticalToGeographic {
    pub op: OperationRef,
    pub interpolation: CrsRef,
}

impl<'a> Search<'a> {
    pub(super) fn new(context: &'a CoordinateOperationContext) -> Self {
        Self {
            context,
            name_cache: RefCell::new(HashMap::new()),
        }
    }

    pub(super) fn registry(&self) -> Option<&'a dyn AuthorityFactory> {
        self.context.registry()
    }

    /// Unfiltered candidates from `source` to `target`.
    pub(super) fn create(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        if !guard.in_datum_pivot() && !is_derived_from(source, target) && !is_derived_from(target, source) {
            let found = self.find_in_registry(source, target, guard)?;
            if !found.is_empty() {
                tracing::debug!(
                    source = source.name(),
                    target = target.name(),
                    count = found.len(),
                    "registry operations"
                );
                return Ok(found);
            }
        }

        use CrsKind::{Bound, Compound, Derived, Geodetic, Vertical};
        match (&source.kind, &target.kind) {
            (Derived(s), Derived(t)) if s.base.is_equivalent_to(&t.base, Criterion::Equivalent) => {
                derived_to_derived(source, target)
            }
            (Derived(_), _) => self.derived_to_other(source, target, guard),
            (_, Derived(_)) => Ok(inverted(self.derived_to_other(target, source, guard)?)),
            (Bound(_), Bound(_)) => self.bound_to_bound(source, target, guard),
            (Bound(_), _) => self.bound_to_other(source, target, guard),
            (_, Bound(_)) => Ok(inverted(self.bound_to_other(target, source, guard)?)),
            (Compound(_), Compound(_)) => self.compound_to_compound(source, target, guard),
            (Compound(_), Geodetic(_)) => self.compound_to_geodetic(source, target, guard),
            (Geodetic(_), Compound(_)) => Ok(inverted(self.compound_to_geodetic(target, source, guard)?)),
            (Geodetic(_), Geodetic(_)) => geodetic_to_geodetic(source, target),
            (Vertical(_), Vertical(_)) => self.vertical_to_vertical(source, target),
            (Geodetic(_), Vertical(_)) => self.geographic_to_vertical(source, target, guard),
            (Vertical(_), Geodetic(_)) => Ok(inverted(self.geographic_to_vertical(target, source, guard)?)),
            _ => {
                tracing::debug!(source = source.name(), target = target.name(), "unsupported CRS pair");
                Ok(Vec::new())
            }
        }
    }

    /// Operations from `from` to `to`, or `None` when both are the same CRS.
    pub(super) fn leg(
        &self,
        from: &CrsRef,
        to: &CrsRef,
        guard: Guard,
    ) -> Result<Option<Vec<OperationRef>>, OperationError> {
        if from.is_equivalent_to(to, Criterion::Equivalent) {
            return Ok(None);
        }
        self.create(from, to, guard).map(Some)
    }

    fn derived_to_other(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        let (Some(derived), Some(derivation)) = (source.as_derived(), source.derivation()) else {
            return Ok(Vec::new());
        };
        let mut legs = vec![vec![derivation.inverse()]];
        if let Some(ops) = self.leg(&derived.base, target, guard)? {
            legs.push(ops);
        }
        chain(legs)
    }

    /// A bound CRS goes through its hub when the target is, or shares a
    /// datum with, that hub. Otherwise the binding is ignored.
    fn bound_to_other(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        let Some(bound) = source.as_bound() else {
            return Ok(Vec::new());
        };
        // Heights of a bound compound CRS need a vertical step when the
        // target has a height too.
        let with_height = target.as_compound().is_some()
            || (target.as_geodetic().is_some() && target.dimension() == 3);
        if let Some(split) = split_bound_compound(bound).filter(|_| with_height) {
            let res = if target.as_compound().is_some() {
                self.compound_to_compound(&split, target, guard)?
            } else {
                self.compound_to_geodetic(&split, target, guard)?
            };
            if !res.is_empty() {
                let pair = CrsPair::new(Arc::clone(source), Arc::clone(target));
                return Ok(res.iter().map(|op| op.with_crs_pair(pair.clone())).collect());
            }
        }
        let through_hub = bound
            .hub
            .is_equivalent_to(target, Criterion::EquivalentExceptAxisOrderGeogCrs)
            || bound.hub.shares_datum_with(target);
        if through_hub {
            let res = self.through_hub(bound, target, guard)?;
            if !res.is_empty() {
                return Ok(res);
            }
        }
        tracing::debug!(source = source.name(), target = target.name(), "bound transformation ignored");
        self.create(&bound.base, target, guard)
    }

    fn through_hub(
        &self,
        bound: &BoundCrs,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        let to_hub = bound_transformation(bound);
        let (Some(start), Some(end)) = (to_hub.source_crs().cloned(), to_hub.target_crs().cloned()) else {
            return Ok(Vec::new());
        };
        let mut legs = Vec::new();
        if let Some(ops) = self.leg(&bound.base, &start, guard)? {
            legs.push(ops);
        }
        legs.push(vec![to_hub]);
        if let Some(ops) = self.leg(&end, target, guard)? {
            legs.push(ops);
        }
        chain(legs)
    }

    /// Identical bindings cancel out; a shared hub is chained through;
    /// anything else resolves between the base CRS.
    fn bound_to_bound(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        let (Some(src), Some(dst)) = (source.as_bound(), target.as_bound()) else {
            return Ok(Vec::new());
        };
        if src.base.shares_datum_with(&dst.base)
            && equivalence::is_equivalent(&src.transformation, &dst.transformation, Criterion::Equivalent)
        {
            return self.create(&src.base, &dst.base, guard);
        }
        if src.hub.is_equivalent_to(&dst.hub, Criterion::Equivalent) {
            let first = self.through_hub(src, &src.hub, guard)?;
            let last = inverted(self.through_hub(dst, &dst.hub, guard)?);
            let res = chain(vec![first, last])?;
            if !res.is_empty() {
                return Ok(res);
            }
        }
        self.create(&src.base, &dst.base, guard)
    }

    fn compound_to_geodetic(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        let (Some(horizontal), Some(vertical)) = (source.horizontal_component(), source.vertical_component())
        else {
            return Ok(Vec::new());
        };
        if target.is_geocentric() {
            let Some(datum) = target.geodetic_datum() else {
                return Ok(Vec::new());
            };
            let geographic = Crs::geodetic(
                ObjectProps::named(target.name()),
                datum.clone(),
                CoordinateSystem::lat_lon_h_deg(),
            );
            let to_geographic = self.compound_to_geodetic(source, &geographic, guard)?;
            let to_geocentric = conversion::create_geographic_geocentric()
                .with_crs_pair(CrsPair::new(geographic, Arc::clone(target)));
            return chain(vec![to_geographic, vec![to_geocentric]]);
        }
        let pair = CrsPair::new(Arc::clone(source), Arc::clone(target));
        if target.dimension() < 3 {
            let horizontals = match self.leg(horizontal, target, guard)? {
                Some(ops) => ops,
                None => vec![identity(horizontal)],
            };
            return Ok(horizontals.iter().map(|op| op.with_crs_pair(pair.clone())).collect());
        }

        let mut out = Vec::new();
        for candidate in self.vertical_to_geographic(vertical) {
            let Some(geographic) = candidate.op.target_crs().cloned() else {
                continue;
            };
            let interpolation = candidate.interpolation.demote_to_2d();
            self.through_interpolation(
                &mut out,
                &pair,
                &candidate.op,
                (horizontal, &interpolation),
                (&geographic, target),
                guard,
            )?;
        }
        if out.is_empty() {
            let vertical_op = ballpark::create_ballpark_vertical(vertical, target, true);
            self.independent_legs(&mut out, &pair, horizontal, &target.demote_to_2d(), &vertical_op, guard)?;
        }
        Ok(out)
    }

    fn compound_to_compound(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        let (Some(h1), Some(v1), Some(h2), Some(v2)) = (
            source.horizontal_component(),
            source.vertical_component(),
            target.horizontal_component(),
            target.vertical_component(),
        ) else {
            return Ok(Vec::new());
        };
        let pair = CrsPair::new(Arc::clone(source), Arc::clone(target));
        let Some(verticals) = self.leg(v1, v2, guard)? else {
            let horizontals = self.create(h1, h2, guard)?;
            return Ok(horizontals.iter().map(|op| op.with_crs_pair(pair.clone())).collect());
        };

        let mut out = Vec::new();
        for vertical in &verticals {
            match vertical.interpolation_crs() {
                Some(interpolation) => {
                    let interpolation = interpolation.demote_to_2d();
                    self.through_interpolation(
                        &mut out,
                        &pair,
                        vertical,
                        (h1, &interpolation),
                        (&interpolation, h2),
                        guard,
                    )?;
                }
                None => self.independent_legs(&mut out, &pair, h1, h2, vertical, guard)?,
            }
        }
        Ok(out)
    }

    /// Horizontal leg into the interpolation CRS of `vertical`, `vertical`
    /// itself, then a horizontal leg out of it.
    fn through_interpolation(
        &self,
        out: &mut Vec<OperationRef>,
        pair: &CrsPair,
        vertical: &OperationRef,
        to_interpolation: (&CrsRef, &CrsRef),
        from_interpolation: (&CrsRef, &CrsRef),
        guard: Guard,
    ) -> Result<(), OperationError> {
        let to = self.leg(to_interpolation.0, to_interpolation.1, guard)?;
        let from = self.leg(from_interpolation.0, from_interpolation.1, guard)?;
        match (to, from) {
            (None, None) => out.push(vertical.with_crs_pair(pair.clone())),
            (Some(to), None) => {
                for horizontal in to {
                    push_candidate(
                        out,
                        proj_based::create_horiz_vertical(
                            Arc::clone(&pair.source),
                            Arc::clone(&pair.target),
                            horizontal,
                            Arc::clone(vertical),
                        ),
                    )?;
                }
            }
            (to, Some(from)) => {
                let to = to.unwrap_or_else(|| vec![identity(to_interpolation.0)]);
                for first in &to {
                    for last in &from {
                        push_candidate(
                            out,
                            proj_based::create_interpolated(
                                Arc::clone(&pair.source),
                                Arc::clone(&pair.target),
                                Arc::clone(first),
                                Arc::clone(vertical),
                                Arc::clone(last),
                            ),
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Horizontal then vertical leg, for a vertical operation that does not
    /// depend on the horizontal position.
    fn independent_legs(
        &self,
        out: &mut Vec<OperationRef>,
        pair: &CrsPair,
        from: &CrsRef,
        to: &CrsRef,
        vertical: &OperationRef,
        guard: Guard,
    ) -> Result<(), OperationError> {
        match self.leg(from, to, guard)? {
            None => out.push(vertical.with_crs_pair(pair.clone())),
            Some(horizontals) => {
                for horizontal in horizontals {
                    push_candidate(
                        out,
                        proj_based::create_horiz_vertical(
                            Arc::clone(&pair.source),
                            Arc::clone(&pair.target),
                            horizontal,
                            Arc::clone(vertical),
                        ),
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Registered operations from `vertical` to a geographic 3D CRS: those
    /// realising its geoid model, else those ending at it.
    pub(super) fn vertical_to_geographic(&self, vertical: &CrsRef) -> Vec<VerticalToGeographic> {
        let Some(registry) = self.registry() else {
            return Vec::new();
        };
        let mut forwards = Vec::new();
        if let Some(model) = vertical.as_vertical().and_then(|v| v.geoid_model.as_deref()) {
            forwards = registry.transformations_for_geoid_model(model);
        }
        if forwards.is_empty() {
            forwards = self.registry_to(vertical);
        }
        let mut out = Vec::new();
        for op in forwards {
            let Some(geographic) = op.source_crs().cloned() else {
                continue;
            };
            if !geographic.is_geographic() {
                continue;
            }
            let interpolation = op
                .interpolation_crs()
                .cloned()
                .unwrap_or_else(|| Arc::clone(&geographic));
            let forward = op.with_crs_pair(CrsPair::new(geographic, Arc::clone(vertical)));
            out.push(VerticalToGeographic {
                op: forward.inverse(),
                interpolation,
            });
        }
        out
    }

    fn geographic_to_vertical(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        if !source.is_geographic() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for candidate in self.vertical_to_geographic(target) {
            let forward = candidate.op.inverse();
            let Some(geographic) = forward.source_crs().cloned() else {
                continue;
            };
            let mut legs = Vec::new();
            if let Some(ops) = self.leg(source, &geographic, guard)? {
                legs.push(ops);
            }
            legs.push(vec![forward]);
            out.extend(chain(legs)?);
        }
        if out.is_empty() {
            out.push(ballpark::create_ballpark_vertical(source, target, true));
        }
        Ok(out)
    }

    /// Same vertical datum: exact unit change or height/depth reversal.
    /// Otherwise through a geographic CRS shared by two geoid models, or a
    /// ballpark unit change.
    fn vertical_to_vertical(&self, source: &CrsRef, target: &CrsRef) -> Result<Vec<OperationRef>, OperationError> {
        let (Some(src), Some(dst)) = (source.as_vertical(), target.as_vertical()) else {
            return Ok(Vec::new());
        };
        if src.datum.is_equivalent_to(&dst.datum, Criterion::Equivalent) {
            return Ok(vec![same_vertical_datum(source, target)?]);
        }
        let mut out = Vec::new();
        let firsts = self.vertical_to_geographic(source);
        if !firsts.is_empty() {
            for last in self.vertical_to_geographic(target) {
                for first in &firsts {
                    let (Some(a), Some(b)) = (first.op.target_crs(), last.op.target_crs()) else {
                        continue;
                    };
                    if !a.is_equivalent_to(b, Criterion::Equivalent) {
                        continue;
                    }
                    push_candidate(
                        &mut out,
                        concatenated::create_compute_metadata(
                            vec![Arc::clone(&first.op), last.op.inverse()],
                            true,
                        ),
                    )?;
                }
            }
        }
        if out.is_empty() {
            out.push(ballpark::create_ballpark_vertical(source, target, false));
        }
        Ok(out)
    }
}

/// Whether `a` is derived from a base equivalent to `b`.
fn is_derived_from(a: &Crs, b: &Crs) -> bool {
    a.as_derived()
        .is_some_and(|d| d.base.is_equivalent_to(b, Criterion::Equivalent))
}

pub(super) fn inverted(ops: Vec<OperationRef>) -> Vec<OperationRef> {
    ops.iter().map(|op| op.inverse()).collect()
}

/// Keeps `result`, drops it when its steps have no common area, and fails
/// on any other error.
pub(super) fn push_candidate(
    out: &mut Vec<OperationRef>,
    result: Result<OperationRef, OperationError>,
) -> Result<(), OperationError> {
    match result {
        Ok(op) => out.push(op),
        Err(e) if e.is_empty_intersection() => tracing::trace!(error = %e, "candidate dropped"),
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Concatenations taking one operation from each leg, for every combination.
pub(super) fn chain(legs: Vec<Vec<OperationRef>>) -> Result<Vec<OperationRef>, OperationError> {
    let mut partial: Vec<Vec<OperationRef>> = vec![Vec::new()];
    for leg in &legs {
        let mut next = Vec::with_capacity(partial.len() * leg.len());
        for prefix in &partial {
            for op in leg {
                let mut steps = prefix.clone();
                steps.push(Arc::clone(op));
                next.push(steps);
            }
        }
        partial = next;
    }
    let mut out = Vec::new();
    for steps in partial {
        if steps.is_empty() {
            continue;
        }
        push_candidate(&mut out, concatenated::create_compute_metadata(steps, true))?;
    }
    Ok(out)
}

/// Exact zero offset from `crs` to itself.
fn identity(crs: &CrsRef) -> OperationRef {
    ballpark::create_ballpark_geographic_offset(crs, crs)
}

/// A bound compound CRS as a compound of its bound horizontal part and its
/// vertical part, so that heights get a vertical step of their own.
fn split_bound_compound(bound: &BoundCrs) -> Option<CrsRef> {
    let (horizontal, vertical) = (bound.base.horizontal_component()?, bound.base.vertical_component()?);
    let horizontal = Crs::bound(
        Arc::clone(horizontal),
        Arc::clone(&bound.hub),
        bound_transformation(bound),
    );
    Some(Crs::compound(
        ObjectProps::named(bound.base.name()),
        vec![horizontal, Arc::clone(vertical)],
    ))
}

/// The transformation of a bound CRS, attached to (geodetic base, hub).
fn bound_transformation(bound: &BoundCrs) -> OperationRef {
    if bound.transformation.has_crs_pair() {
        return Arc::clone(&bound.transformation);
    }
    let source = bound
        .base
        .extract_geodetic()
        .unwrap_or_else(|| Arc::clone(&bound.base));
    bound
        .transformation
        .with_crs_pair(CrsPair::new(source, Arc::clone(&bound.hub)))
}

fn derived_to_derived(source: &CrsRef, target: &CrsRef) -> Result<Vec<OperationRef>, OperationError> {
    let (Some(from), Some(to)) = (source.derivation(), target.derivation()) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    push_candidate(
        &mut out,
        concatenated::create_compute_metadata(vec![from.inverse(), to], true),
    )?;
    Ok(out)
}

fn geodetic_to_geodetic(source: &CrsRef, target: &CrsRef) -> Result<Vec<OperationRef>, OperationError> {
    match (source.is_geographic(), target.is_geographic()) {
        (true, true) => geographic_to_geographic(source, target),
        (true, false) => geographic_to_geocentric(source, target),
        (false, true) => Ok(inverted(geographic_to_geocentric(target, source)?)),
        (false, false) => Ok(vec![ballpark::create_ballpark_geocentric_translation(source, target)]),
    }
}

fn geographic_to_geocentric(source: &CrsRef, target: &CrsRef) -> Result<Vec<OperationRef>, OperationError> {
    let (Some(src), Some(dst)) = (source.geodetic_datum(), target.geodetic_datum()) else {
        return Ok(Vec::new());
    };
    let to_geocentric = conversion::create_geographic_geocentric();
    if src.is_equivalent_to(dst, Criterion::Equivalent) {
        return Ok(vec![
            to_geocentric.with_crs_pair(CrsPair::new(Arc::clone(source), Arc::clone(target)))
        ]);
    }
    let geocentric = Crs::geocentric(ObjectProps::named(source.name()), src.clone());
    let first = to_geocentric.with_crs_pair(CrsPair::new(Arc::clone(source), Arc::clone(&geocentric)));
    let second = ballpark::create_ballpark_geocentric_translation(&geocentric, target);
    chain(vec![vec![first], vec![second]])
}

/// Longitude rotation when the prime meridians differ, exact conversions
/// when only the axes differ, else a zero geographic offset.
fn geographic_to_geographic(source: &CrsRef, target: &CrsRef) -> Result<Vec<OperationRef>, OperationError> {
    let (Some(src), Some(dst)) = (source.geodetic_datum(), target.geodetic_datum()) else {
        return Ok(Vec::new());
    };
    if !src.prime_meridian.is_equivalent_to(&dst.prime_meridian, Criterion::Equivalent) {
        let offset = Measure::degrees(src.prime_meridian.longitude - dst.prime_meridian.longitude);
        let same_cs = match (source.coordinate_system(), target.coordinate_system()) {
            (Some(a), Some(b)) => a.is_equivalent_to(b, Criterion::Equivalent),
            _ => false,
        };
        if same_cs && source.shares_datum_with(target) {
            return Ok(vec![longitude_rotation(source, target, offset)]);
        }
        let rotated = source.with_prime_meridian(dst.prime_meridian.clone());
        let rotation = longitude_rotation(source, &rotated, offset);
        let rest = geographic_to_geographic(&rotated, target)?;
        return chain(vec![vec![rotation], rest]);
    }
    if source.shares_datum_with(target) {
        if let Some(op) = same_datum_geographic(source, target)? {
            return Ok(vec![op]);
        }
    }
    Ok(vec![ballpark::create_ballpark_geographic_offset(source, target)])
}

fn longitude_rotation(source: &CrsRef, target: &CrsRef, offset: Measure) -> OperationRef {
    let mut props = ObjectProps::named(format!("{} to {}", source.name(), target.name()));
    if let Some(extent) = source.extent() {
        props = props.with_extent(extent.clone());
    }
    transformation::longitude_rotation(props, Arc::clone(source), Arc::clone(target), offset)
}

/// Exact conversion between two geographic CRS of the same datum that differ
/// by axis order, vertical unit or the presence of an ellipsoidal height.
/// `None` when the coordinate systems are the same or differ otherwise.
fn same_datum_geographic(source: &CrsRef, target: &CrsRef) -> Result<Option<OperationRef>, OperationError> {
    let (Some(src), Some(dst)) = (source.coordinate_system(), target.coordinate_system()) else {
        return Ok(None);
    };
    let pair = CrsPair::new(Arc::clone(source), Arc::clone(target));
    if src.is_equivalent_to(dst, Criterion::Equivalent) {
        return Ok(None);
    }
    if src.is_axis_order_reversal_of(dst) {
        return Ok(Some(
            conversion::create_axis_order_reversal(src.dimension() == 3).with_crs_pair(pair),
        ));
    }
    match (src.dimension(), dst.dimension()) {
        (3, 3) => {
            if !src.demote_to_2d().is_equivalent_to(&dst.demote_to_2d(), Criterion::Equivalent) {
                return Ok(None);
            }
            let (Some(from), Some(to)) = (src.vertical_unit(), dst.vertical_unit()) else {
                return Ok(None);
            };
            Ok(Some(change_vertical_unit(&from, &to).with_crs_pair(pair)))
        }
        (3, 2) => {
            let flat = source.demote_to_2d();
            let Some(flat_cs) = flat.coordinate_system() else {
                return Ok(None);
            };
            let drop_height = conversion::create_geographic_3d_to_2d();
            if flat_cs.is_equivalent_to(dst, Criterion::Equivalent) {
                return Ok(Some(drop_height.with_crs_pair(pair)));
            }
            if !flat_cs.is_axis_order_reversal_of(dst) {
                return Ok(None);
            }
            let steps = vec![
                drop_height.with_crs_pair(CrsPair::new(Arc::clone(source), Arc::clone(&flat))),
                conversion::create_axis_order_reversal(false).with_crs_pair(CrsPair::new(flat, Arc::clone(target))),
            ];
            concatenated::create_compute_metadata(steps, true).map(Some)
        }
        (2, 3) => Ok(same_datum_geographic(target, source)?.map(|op| op.inverse())),
        _ => Ok(None),
    }
}

fn change_vertical_unit(from: &UnitOfMeasure, to: &UnitOfMeasure) -> OperationRef {
    conversion::create_change_vertical_unit(
        ObjectProps::named(format!("Change of vertical unit from {} to {}", from.name(), to.name())),
        unit_ratio(from, to),
    )
}

fn is_depth(crs: &Crs) -> bool {
    crs.coordinate_system().is_some_and(CoordinateSystem::is_depth)
}

fn same_vertical_datum(source: &CrsRef, target: &CrsRef) -> Result<OperationRef, OperationError> {
    let pair = CrsPair::new(Arc::clone(source), Arc::clone(target));
    let from = source.vertical_unit().unwrap_or(units::METRE);
    let to = target.vertical_unit().unwrap_or(units::METRE);
    if is_depth(source) == is_depth(target) {
        return Ok(change_vertical_unit(&from, &to).with_crs_pair(pair));
    }
    if from.is_equivalent_to(&to, Criterion::Equivalent) {
        return Ok(conversion::create_height_depth_reversal().with_crs_pair(pair));
    }
    let Some(datum) = source.vertical_datum() else {
        return Ok(change_vertical_unit(&from, &to).with_crs_pair(pair));
    };
    let cs = if is_depth(source) {
        CoordinateSystem::depth(to.clone())
    } else {
        CoordinateSystem::gravity_related_height(to.clone())
    };
    let middle = Crs::vertical(
        ObjectProps::named(format!("{} ({})", source.name(), to.name())),
        datum.clone(),
        cs,
    );
    let steps = vec![
        change_vertical_unit(&from, &to).with_crs_pair(CrsPair::new(Arc::clone(source), Arc::clone(&middle))),
        conversion::create_height_depth_reversal().with_crs_pair(CrsPair::new(middle, Arc::clone(target))),
    ];
    concatenated::create_compute_metadata(steps, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Extent;
    use crate::crs::datum::GREENWICH;
    use crate::crs::presets;
    use crate::operation::constants::*;
    use crate::operation::metadata::accuracy_of;
    use crate::operation::transformation::{HelmertConvention, HelmertParams};
    use crate::operation::PositionalAccuracy;
    use approx::assert_relative_eq;

    fn resolve(source: &CrsRef, target: &CrsRef) -> Vec<OperationRef> {
        let ctx = CoordinateOperationContext::default();
        Search::new(&ctx).create(source, target, Guard::default()).unwrap()
    }

    #[test]
    fn test_geographic_2d_to_3d_is_exact() {
        let ops = resolve(&presets::wgs84(), &presets::wgs84_3d());
        assert_eq!(ops.len(), 1);
        assert!(!ops[0].has_ballpark_transformation());
        assert_eq!(accuracy_of(&ops[0]), 0.0);
        assert_eq!(ops[0].target_crs().unwrap().dimension(), 3);
    }

    #[test]
    fn test_different_datums_give_ballpark() {
        let ops = resolve(&presets::nad27(), &presets::nad83());
        assert_eq!(ops.len(), 1);
        assert!(ops[0].has_ballpark_transformation());
        assert_eq!(accuracy_of(&ops[0]), -1.0);
    }

    #[test]
    fn test_prime_meridian_rotation_chain() {
        let ops = resolve(&presets::ntf_paris(), &presets::ntf());
        assert_eq!(ops.len(), 1);
        let steps = ops[0].steps();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].method_epsg_code(), Some(EPSG_CODE_METHOD_LONGITUDE_ROTATION));
        let offset = steps[0]
            .single()
            .unwrap()
            .parameter_degrees(EPSG_CODE_PARAMETER_LONGITUDE_OFFSET)
            .unwrap();
        assert_relative_eq!(offset, 2.337_229_166_666_667, epsilon = 1e-12);
        assert_eq!(
            steps[0].target_crs().unwrap().name(),
            "NTF (Paris) (with Greenwich prime meridian)"
        );
    }

    #[test]
    fn test_single_rotation_when_only_meridian_differs() {
        let greenwich = presets::ntf_paris().with_prime_meridian(GREENWICH);
        let ops = resolve(&presets::ntf_paris(), &greenwich);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].method_epsg_code(), Some(EPSG_CODE_METHOD_LONGITUDE_ROTATION));
        assert_eq!(accuracy_of(&ops[0]), 0.0);
    }

    #[test]
    fn test_geographic_to_geocentric_same_datum() {
        let ops = resolve(&presets::wgs84_3d(), &presets::wgs84_geocentric());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].method_epsg_code(), Some(EPSG_CODE_METHOD_GEOGRAPHIC_GEOCENTRIC));
        let back = resolve(&presets::wgs84_geocentric(), &presets::wgs84_3d());
        assert_eq!(back[0].target_crs().unwrap().crs_type(), CrsType::Geographic3D);
    }

    #[test]
    fn test_projected_to_base_is_inverse_conversion() {
        let ops = resolve(&presets::utm_wgs84(31, true), &presets::wgs84());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "Inverse of UTM zone 31N");
        assert!(ops[0].is_conversion());
    }

    #[test]
    fn test_projected_to_projected_same_base() {
        let ops = resolve(&presets::utm_wgs84(31, true), &presets::utm_wgs84(32, true));
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "Inverse of UTM zone 31N + UTM zone 32N");
        assert_eq!(accuracy_of(&ops[0]), 0.0);
    }

    #[test]
    fn test_vertical_unit_change() {
        let ops = resolve(&presets::egm96_height(), &presets::egm96_height_ft());
        assert_eq!(ops.len(), 1);
        assert!(ops[0].is_conversion());
        let factor = ops[0]
            .single()
            .unwrap()
            .parameter_si(EPSG_CODE_PARAMETER_UNIT_CONVERSION_SCALAR)
            .unwrap();
        assert_relative_eq!(factor, 1.0 / 0.3048, max_relative = 1e-12);
    }

    #[test]
    fn test_vertical_different_datums_ballpark() {
        let ops = resolve(&presets::egm96_height(), &presets::navd88_height());
        assert_eq!(ops.len(), 1);
        assert!(ops[0].has_ballpark_transformation());
        assert!(ballpark::is_ballpark_vertical_name(&ops[0].name()));
    }

    #[test]
    fn test_height_depth_reversal() {
        let depth = Crs::vertical(
            ObjectProps::named("EGM96 depth"),
            presets::egm96_height().vertical_datum().unwrap().clone(),
            CoordinateSystem::depth(units::METRE),
        );
        let ops = resolve(&presets::egm96_height(), &depth);
        assert_eq!(ops[0].method_epsg_code(), Some(EPSG_CODE_METHOD_HEIGHT_DEPTH_REVERSAL));
    }

    #[test]
    fn test_compound_to_geographic_3d_without_registry() {
        let ops = resolve(&presets::wgs84_egm96(), &presets::wgs84_3d());
        assert_eq!(ops.len(), 1);
        assert!(ops[0].has_ballpark_transformation());
        assert!(ballpark::is_ballpark_vertical_name(&ops[0].name()));
        assert_eq!(ops[0].source_crs().unwrap().name(), "WGS 84 + EGM96 height");
    }

    #[test]
    fn test_compound_to_geographic_2d_drops_height() {
        let ops = resolve(&presets::wgs84_egm96(), &presets::ogc_crs84());
        assert_eq!(ops.len(), 1);
        assert!(conversion::is_axis_order_reversal(ops[0].method_epsg_code()));
    }

    #[test]
    fn test_bound_to_hub_uses_transformation() {
        let towgs84 = transformation::helmert(
            ObjectProps::named("ED50 to WGS 84"),
            presets::ed50(),
            presets::wgs84(),
            HelmertConvention::PositionVector,
            HelmertParams::new(-87.0, -98.0, -121.0, 0.0, 0.0, 0.0, 0.0),
            vec![PositionalAccuracy::Known(5.0)],
        );
        let bound = Crs::bound(presets::ed50(), presets::wgs84(), towgs84);
        let ops = resolve(&bound, &presets::wgs84());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "ED50 to WGS 84");
        let ops = resolve(&presets::ogc_crs84(), &bound);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].steps().len(), 2);
        assert_eq!(accuracy_of(&ops[0]), 5.0);
    }

    fn ed50_egm96_bound() -> CrsRef {
        let towgs84 = transformation::geocentric_translations(
            ObjectProps::named("ED50 to WGS 84"),
            presets::ed50(),
            presets::wgs84(),
            -87.0,
            -98.0,
            -121.0,
            vec![PositionalAccuracy::Known(5.0)],
        );
        let compound = Crs::compound(
            ObjectProps::named("ED50 + EGM96 height"),
            vec![presets::ed50(), presets::egm96_height()],
        );
        Crs::bound(compound, presets::wgs84(), towgs84)
    }

    #[test]
    fn test_bound_compound_to_geographic_3d_keeps_vertical() {
        let ops = resolve(&ed50_egm96_bound(), &presets::wgs84_3d());
        assert_eq!(ops.len(), 1);
        let name = ops[0].name();
        assert!(name.contains("ED50 to WGS 84"), "{name}");
        assert!(ballpark::is_ballpark_vertical_name(&name), "{name}");
        assert!(ops[0].has_ballpark_transformation());
        assert_eq!(ops[0].source_crs().unwrap().name(), "ED50 + EGM96 height");
        assert_eq!(ops[0].target_crs().unwrap().dimension(), 3);
    }

    #[test]
    fn test_bound_compound_to_geographic_2d_uses_binding() {
        let ops = resolve(&ed50_egm96_bound(), &presets::wgs84());
        assert_eq!(ops.len(), 1);
        assert!(ops[0].name().contains("ED50 to WGS 84"));
        assert!(!ops[0].has_ballpark_transformation());
        assert_eq!(accuracy_of(&ops[0]), 5.0);
    }

    #[test]
    fn test_same_horizontal_drops_height_exactly() {
        let ops = resolve(&presets::wgs84_egm96(), &presets::wgs84());
        assert_eq!(ops.len(), 1);
        assert!(!ops[0].has_ballpark_transformation());
        assert_eq!(accuracy_of(&ops[0]), 0.0);
        assert_eq!(ops[0].source_crs().unwrap().name(), "WGS 84 + EGM96 height");
    }

    #[test]
    fn test_bound_to_unrelated_ignores_binding() {
        let towgs84 = transformation::geocentric_translations(
            ObjectProps::named("ED50 to WGS 84"),
            presets::ed50(),
            presets::wgs84(),
            -87.0,
            -98.0,
            -121.0,
            vec![],
        );
        let bound = Crs::bound(presets::ed50(), presets::wgs84(), towgs84);
        let ops = resolve(&bound, &presets::nad27());
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "Ballpark geographic offset from ED50 to NAD27");
    }

    #[test]
    fn test_chain_drops_disjoint_steps() {
        let a = transformation::geocentric_translations(
            ObjectProps::named("a").with_extent(Extent::from_bbox(0.0, 0.0, 1.0, 1.0)),
            presets::ed50(),
            presets::wgs84(),
            0.0,
            0.0,
            0.0,
            vec![],
        );
        let b = transformation::geocentric_translations(
            ObjectProps::named("b").with_extent(Extent::from_bbox(10.0, 10.0, 11.0, 11.0)),
            presets::wgs84(),
            presets::nad83(),
            0.0,
            0.0,
            0.0,
            vec![],
        );
        assert!(chain(vec![vec![a], vec![b]]).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_pair_is_empty() {
        assert!(resolve(&presets::wgs84_egm96(), &presets::egm96_height()).is_empty());
    }
}
