//! Registry stage of the search: identify both CRS in the registry and
//! collect the operations stored between them, directly or through an
//! intermediate CRS.

use std::sync::Arc;

use crate::common::{Criterion, Identifier};
use crate::crs::CrsRef;
use crate::error::OperationError;
use crate::operation::metadata::{accuracy_of, grid_names};
use crate::operation::{OperationRef, PositionalAccuracy};
use crate::registry::OperationQuery;

use super::dispatch::{Guard, Search};
use super::IntermediateCrsUse;

impl Search<'_> {
    pub(super) fn query(&self) -> OperationQuery {
        OperationQuery {
            grid_availability: self.context.grid_availability(),
            discard_superseded: self.context.discard_superseded(),
            use_alternative_grid_names: self.context.use_alternative_grid_names(),
            allowed_intermediates: self.context.intermediate_crs().to_vec(),
            use_datum_based: false,
        }
    }

    /// Registry codes of `crs`. Attached identifiers are kept when the
    /// registry object they name is equivalent to `crs`; without any, a
    /// unique equivalent registry CRS of the same name is used.
    pub(super) fn identifiers_for(&self, crs: &CrsRef) -> Vec<Identifier> {
        let Some(registry) = self.registry() else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        for id in crs.identifiers() {
            match registry.create_crs(&id.code_space, &id.code) {
                Ok(found) if found.is_equivalent_to(crs, Criterion::Equivalent) => ids.push(id.clone()),
                Ok(_) => tracing::debug!(crs = crs.name(), id = %id, "registry object differs"),
                Err(e) => tracing::trace!(crs = crs.name(), error = %e, "not in registry"),
            }
        }
        if !ids.is_empty() || !crs.identifiers().is_empty() {
            return ids;
        }

        let key = (crs.name().to_string(), crs.crs_type());
        let candidates = {
            let mut cache = self.name_cache.borrow_mut();
            cache
                .entry(key)
                .or_insert_with(|| registry.find_crs_by_name(crs.name(), crs.crs_type(), false))
                .clone()
        };
        let mut matching = candidates
            .iter()
            .filter(|c| c.is_equivalent_to(crs, Criterion::Equivalent));
        match (matching.next(), matching.next()) {
            (Some(found), None) => found.identifiers().to_vec(),
            _ => Vec::new(),
        }
    }

    /// Operations stored from `source` to `target`, from the first authority
    /// that has any.
    pub(super) fn registry_direct(&self, source: &CrsRef, target: &CrsRef) -> Vec<OperationRef> {
        let Some(registry) = self.registry() else {
            return Vec::new();
        };
        let sources = self.identifiers_for(source);
        if sources.is_empty() {
            return Vec::new();
        }
        let targets = self.identifiers_for(target);
        let query = self.query();
        for auth in registry.authorities() {
            let mut out = Vec::new();
            for s in sources.iter().filter(|id| id.code_space == auth) {
                for t in &targets {
                    match registry.operations_between(s, t, &query) {
                        Ok(ops) => out.extend(ops),
                        Err(e) => tracing::debug!(source = %s, target = %t, error = %e, "registry lookup failed"),
                    }
                }
            }
            if !out.is_empty() {
                return self.with_borrowed_accuracies(out);
            }
        }
        Vec::new()
    }

    /// Operations stored towards `target`, from any source.
    pub(super) fn registry_to(&self, target: &CrsRef) -> Vec<OperationRef> {
        let Some(registry) = self.registry() else {
            return Vec::new();
        };
        let query = self.query();
        let mut out = Vec::new();
        for id in self.identifiers_for(target) {
            match registry.operations_to(&id, &query) {
                Ok(ops) => out.extend(ops),
                Err(e) => tracing::debug!(target = %id, error = %e, "registry lookup failed"),
            }
        }
        self.with_borrowed_accuracies(out)
    }

    fn registry_with_intermediate(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        use_datum_based: bool,
    ) -> Vec<OperationRef> {
        let Some(registry) = self.registry() else {
            return Vec::new();
        };
        let sources = self.identifiers_for(source);
        let targets = self.identifiers_for(target);
        let query = OperationQuery {
            use_datum_based,
            ..self.query()
        };
        let mut out = Vec::new();
        for s in &sources {
            for t in &targets {
                match registry.operations_with_intermediate(s, t, &query) {
                    Ok(ops) => out.extend(ops),
                    Err(e) => tracing::debug!(source = %s, target = %t, error = %e, "registry lookup failed"),
                }
            }
        }
        self.with_borrowed_accuracies(out)
    }

    /// A transformation of unknown accuracy takes the accuracy of another
    /// transformation using the same grid.
    fn with_borrowed_accuracies(&self, ops: Vec<OperationRef>) -> Vec<OperationRef> {
        let Some(registry) = self.registry() else {
            return ops;
        };
        ops.into_iter()
            .map(|op| {
                if accuracy_of(&op) >= 0.0 || !op.is_transformation() {
                    return op;
                }
                for grid in grid_names(&op) {
                    let sibling = registry
                        .transformations_referencing_grid(&grid)
                        .iter()
                        .map(|s| accuracy_of(s))
                        .find(|acc| *acc >= 0.0);
                    if let Some(acc) = sibling {
                        return op.with_accuracies(vec![PositionalAccuracy::Known(acc)]);
                    }
                }
                op
            })
            .collect()
    }

    /// Registry candidates: direct operations, then operations through an
    /// intermediate CRS as the context allows, then a pivot through CRS
    /// sharing the datums of both ends.
    pub(super) fn find_in_registry(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        guard: Guard,
    ) -> Result<Vec<OperationRef>, OperationError> {
        if self.registry().is_none() {
            return Ok(Vec::new());
        }
        let mut res = self.registry_direct(source, target);
        let through_intermediate = match self.context.intermediate_crs_use() {
            IntermediateCrsUse::Always => true,
            IntermediateCrsUse::IfNoDirect => res.is_empty(),
            IntermediateCrsUse::Never => false,
        };
        if through_intermediate {
            let mut extra = self.registry_with_intermediate(source, target, false);
            if extra.is_empty() && res.is_empty() {
                extra = self.registry_with_intermediate(source, target, true);
            }
            for op in extra {
                if !res.iter().any(|r| Arc::ptr_eq(r, &op)) {
                    res.push(op);
                }
            }
        }
        if res.is_empty() && source.as_geodetic().is_some() && target.as_geodetic().is_some() {
            res = self.datum_pivot(source, target, guard)?;
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ObjectProps;
    use crate::crs::{presets, Crs, CoordinateSystem};
    use crate::factory::CoordinateOperationContext;
    use crate::operation::transformation;
    use crate::registry::MemoryRegistry;

    fn registry() -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        registry
            .add_crs(presets::wgs84())
            .add_crs(presets::etrs89())
            .add_crs(presets::nad27())
            .add_operation(transformation::geocentric_translations(
                ObjectProps::named("NAD27 to WGS 84 (1)").with_epsg(1173),
                presets::nad27(),
                presets::wgs84(),
                -8.0,
                160.0,
                176.0,
                vec![PositionalAccuracy::Known(10.0)],
            ))
            .add_operation(transformation::ntv2(
                ObjectProps::named("NAD27 to WGS 84 (79)").with_epsg(8555),
                presets::nad27(),
                presets::wgs84(),
                "NTv2_0.gsb",
                vec![],
            ))
            .add_operation(transformation::ntv2(
                ObjectProps::named("NAD27 to WGS 84 (33)").with_epsg(1693),
                presets::nad27(),
                presets::wgs84(),
                "NTv2_0.gsb",
                vec![PositionalAccuracy::Known(1.5)],
            ));
        registry
    }

    fn context() -> CoordinateOperationContext {
        CoordinateOperationContext::new(Some(Arc::new(registry())))
    }

    #[test]
    fn test_identifiers_by_code_and_name() {
        let ctx = context();
        let search = Search::new(&ctx);
        assert_eq!(search.identifiers_for(&presets::wgs84()), vec![Identifier::epsg(4326)]);

        let unnamed = Crs::geodetic(
            ObjectProps::named("WGS 84"),
            presets::wgs84().geodetic_datum().unwrap().clone(),
            CoordinateSystem::lat_lon_deg(),
        );
        assert_eq!(search.identifiers_for(&unnamed), vec![Identifier::epsg(4326)]);

        let swapped = Crs::geodetic(
            ObjectProps::named("WGS 84"),
            presets::wgs84().geodetic_datum().unwrap().clone(),
            CoordinateSystem::lon_lat_deg(),
        );
        assert!(search.identifiers_for(&swapped).is_empty());
    }

    #[test]
    fn test_direct_lookup_borrows_grid_accuracy() {
        let ctx = context();
        let search = Search::new(&ctx);
        let ops = search.registry_direct(&presets::nad27(), &presets::wgs84());
        assert_eq!(ops.len(), 3);
        let borrowed = ops.iter().find(|op| op.name() == "NAD27 to WGS 84 (79)").unwrap();
        assert_eq!(accuracy_of(borrowed), 1.5);
    }

    #[test]
    fn test_reverse_direction_is_inverted() {
        let ctx = context();
        let search = Search::new(&ctx);
        let ops = search.registry_direct(&presets::wgs84(), &presets::nad27());
        assert!(!ops.is_empty());
        assert!(ops.iter().all(|op| op.source_crs().unwrap().name() == "WGS 84"));
    }

    #[test]
    fn test_no_registry_means_nothing() {
        let ctx = CoordinateOperationContext::default();
        let search = Search::new(&ctx);
        let found = search
            .find_in_registry(&presets::nad27(), &presets::wgs84(), Guard::default())
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_unregistered_pair_is_empty() {
        let ctx = context();
        let search = Search::new(&ctx);
        let found = search
            .find_in_registry(&presets::etrs89(), &presets::nad27(), Guard::default())
            .unwrap();
        assert!(found.is_empty());
    }
}
