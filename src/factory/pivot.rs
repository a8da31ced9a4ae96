//! Pivot through registered geographic CRS built on the datums of both
//! ends, for geodetic CRS the registry knows nothing about directly.

use std::sync::Arc;

use crate::common::Identifier;
use crate::crs::{CrsRef, CrsType};
use crate::error::OperationError;
use crate::operation::constants::{is_geocentric_translation, is_helmert};
use crate::operation::{conversion, CrsPair, OperationRef};

use super::dispatch::{chain, Guard, Search};

impl Search<'_> {
    /// Registered geographic CRS sharing the datum of `crs`, those named
    /// like `crs` first.
    fn datum_candidates(&self, crs: &CrsRef) -> Vec<CrsRef> {
        let Some(registry) = self.registry() else {
            return Vec::new();
        };
        let Some(datum) = crs.geodetic_datum() else {
            return Vec::new();
        };
        let mut datum_ids: Vec<Identifier> = datum.props.identifiers.clone();
        if datum_ids.is_empty() {
            // Unidentified datum: borrow it from the registry CRS of the same name.
            let found = registry.find_crs_by_name(crs.name(), crs.crs_type(), false);
            let mut sharing = found.iter().filter(|c| c.shares_datum_with(crs));
            if let (Some(only), None) = (sharing.next(), sharing.next()) {
                if let Some(d) = only.geodetic_datum() {
                    datum_ids = d.props.identifiers.clone();
                }
            }
        }

        let mut out: Vec<CrsRef> = Vec::new();
        for id in &datum_ids {
            for crs_type in [CrsType::Geographic2D, CrsType::Geographic3D] {
                for candidate in registry.crs_from_datum(id, crs_type) {
                    if !out.iter().any(|c| Arc::ptr_eq(c, &candidate)) {
                        out.push(candidate);
                    }
                }
            }
        }
        out.sort_by_key(|c| c.name() != crs.name());
        out
    }

    /// Operations registered between geographic CRS of the source and target
    /// datums, wrapped with synthesised legs from and to the actual ends.
    /// Authorities are tried in preference order until one gives a result
    /// that is not a PROJ-based composite.
    pub(super) fn datum_pivot(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        let Some(registry) = self.registry() else {
            return Ok(Vec::new());
        };
        let sources = self.datum_candidates(source);
        let targets = self.datum_candidates(target);
        if sources.is_empty() || targets.is_empty() {
            return Ok(Vec::new());
        }
        tracing::debug!(
            source = source.name(),
            target = target.name(),
            source_candidates = sources.len(),
            target_candidates = targets.len(),
            "datum pivot"
        );

        let both_3d = source.dimension() == 3 && target.dimension() == 3;
        let inner = guard.entering_datum_pivot();
        let mut res: Vec<OperationRef> = Vec::new();
        for auth in registry.authorities() {
            let in_auth = |c: &&CrsRef| c.identifiers().iter().any(|id| id.code_space == auth);
            for cs in sources.iter().filter(in_auth) {
                for cd in targets.iter().filter(in_auth) {
                    for middle in self.registry_direct(cs, cd) {
                        if middle.has_ballpark_transformation()
                            || middle.is_conversion()
                            || conversion::is_axis_order_reversal(middle.method_epsg_code())
                            || !is_registered(&middle)
                        {
                            continue;
                        }
                        let middle = if both_3d { promote_to_3d(&middle) } else { middle };
                        let (Some(from), Some(to)) =
                            (middle.source_crs().cloned(), middle.target_crs().cloned())
                        else {
                            continue;
                        };
                        let mut legs = Vec::new();
                        if let Some(ops) = self.leg(source, &from, inner)? {
                            legs.push(ops);
                        }
                        legs.push(vec![middle]);
                        if let Some(ops) = self.leg(&to, target, inner)? {
                            legs.push(ops);
                        }
                        res.extend(chain(legs)?);
                    }
                }
            }
            if res.iter().any(|op| op.as_proj_based().is_none()) {
                break;
            }
        }
        Ok(res)
    }
}

/// Whether `op` carries authority identifiers, on every transformation
/// step when it is a concatenation.
fn is_registered(op: &OperationRef) -> bool {
    if let Some(forward) = op.inverse_of() {
        return is_registered(forward);
    }
    if op.as_concatenated().is_some() {
        return op
            .steps()
            .iter()
            .filter(|step| !step.is_conversion())
            .all(|step| !step.identifiers().is_empty());
    }
    !op.identifiers().is_empty()
}

/// Helmert-style operations work on geocentric coordinates, so the same
/// parameters apply between the 3D versions of their ends.
fn promote_to_3d(op: &OperationRef) -> OperationRef {
    let code = op.method_epsg_code().unwrap_or(0);
    if !is_helmert(code) && !is_geocentric_translation(code) {
        return Arc::clone(op);
    }
    match (op.source_crs(), op.target_crs()) {
        (Some(source), Some(target)) => {
            op.with_crs_pair(CrsPair::new(source.promote_to_3d(), target.promote_to_3d()))
        }
        _ => Arc::clone(op),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Criterion, ObjectProps};
    use crate::crs::{presets, CoordinateSystem, Crs};
    use crate::factory::CoordinateOperationContext;
    use crate::operation::metadata::accuracy_of;
    use crate::operation::{transformation, PositionalAccuracy};
    use crate::registry::MemoryRegistry;

    fn context() -> CoordinateOperationContext {
        let mut registry = MemoryRegistry::new();
        registry.add_operation(transformation::geocentric_translations(
            ObjectProps::named("ED50 to WGS 84 (1)").with_epsg(1133),
            presets::ed50(),
            presets::wgs84(),
            -87.0,
            -98.0,
            -121.0,
            vec![PositionalAccuracy::Known(10.0)],
        ));
        CoordinateOperationContext::new(Some(Arc::new(registry)))
    }

    fn ed50_lon_lat_h() -> CrsRef {
        Crs::geodetic(
            ObjectProps::named("ED50 (lon-lat-h)"),
            presets::ed50().geodetic_datum().unwrap().clone(),
            CoordinateSystem::lat_lon_h_deg().with_swapped_axes(),
        )
    }

    #[test]
    fn test_pivot_wraps_registered_operation() {
        let ctx = context();
        let search = Search::new(&ctx);
        let ops = search
            .find_in_registry(&ed50_lon_lat_h(), &presets::wgs84_3d(), Guard::default())
            .unwrap();
        assert_eq!(ops.len(), 1);
        let steps = ops[0].steps();
        assert_eq!(steps.len(), 2);
        assert!(conversion::is_axis_order_reversal(steps[0].method_epsg_code()));
        assert_eq!(steps[1].name(), "ED50 to WGS 84 (1)");
        assert_eq!(steps[1].source_crs().unwrap().dimension(), 3);
        assert_eq!(accuracy_of(&ops[0]), 10.0);
    }

    #[test]
    fn test_pivot_reverse_keeps_inverted_identifier() {
        let ctx = context();
        let search = Search::new(&ctx);
        let ops = search
            .find_in_registry(&presets::wgs84_3d(), &ed50_lon_lat_h(), Guard::default())
            .unwrap();
        assert_eq!(ops.len(), 1);
        let steps = ops[0].steps();
        assert_eq!(steps[0].name(), "Inverse of ED50 to WGS 84 (1)");
        assert_eq!(steps[0].identifiers()[0], Identifier::new("INVERSE(EPSG)", 1133));
        assert!(conversion::is_axis_order_reversal(steps[steps.len() - 1].method_epsg_code()));
    }

    #[test]
    fn test_unidentified_operation_not_used_as_pivot() {
        let mut registry = MemoryRegistry::new();
        registry.add_operation(transformation::geocentric_translations(
            ObjectProps::named("ED50 to WGS 84 (local)"),
            presets::ed50(),
            presets::wgs84(),
            -87.0,
            -98.0,
            -121.0,
            vec![PositionalAccuracy::Known(10.0)],
        ));
        let ctx = CoordinateOperationContext::new(Some(Arc::new(registry)));
        let search = Search::new(&ctx);
        let ops = search
            .find_in_registry(&ed50_lon_lat_h(), &presets::wgs84_3d(), Guard::default())
            .unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn test_registered_concatenation_needs_identified_steps() {
        let identified = transformation::geocentric_translations(
            ObjectProps::named("ED50 to WGS 84 (1)").with_epsg(1133),
            presets::ed50(),
            presets::wgs84(),
            -87.0,
            -98.0,
            -121.0,
            vec![],
        );
        let local = transformation::geocentric_translations(
            ObjectProps::named("WGS 84 to ETRS89 (local)"),
            presets::wgs84(),
            presets::etrs89(),
            0.0,
            0.0,
            0.0,
            vec![],
        );
        assert!(is_registered(&identified));
        assert!(is_registered(&identified.inverse()));
        assert!(!is_registered(&local));
        let chain = crate::operation::concatenated::create(
            ObjectProps::named("ED50 to ETRS89").with_epsg(8000),
            vec![identified, local],
            vec![],
        )
        .unwrap();
        assert!(!is_registered(&chain));
    }

    #[test]
    fn test_candidates_prefer_same_name() {
        let ctx = context();
        let search = Search::new(&ctx);
        let candidates = search.datum_candidates(&presets::wgs84_3d());
        assert!(!candidates.is_empty());
        assert!(candidates[0].is_equivalent_to(&presets::wgs84(), Criterion::Equivalent));
    }

    #[test]
    fn test_pivot_skipped_inside_pivot() {
        let ctx = context();
        let search = Search::new(&ctx);
        let ops = search
            .create(
                &ed50_lon_lat_h(),
                &presets::wgs84_3d(),
                Guard::default().entering_datum_pivot(),
            )
            .unwrap();
        assert_eq!(ops.len(), 1);
        assert!(ops[0].has_ballpark_transformation());
    }
}
