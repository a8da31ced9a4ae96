use std::collections::HashMap;
use std::sync::Arc;

use crate::common::{is_equivalent_name, Identifier};
use crate::crs::{CrsRef, CrsType};
use crate::error::RegistryError;
use crate::factory::GridAvailabilityUse;
use crate::operation::metadata::grid_names;
use crate::operation::{concatenated, conversion, transformation, CrsPair, OperationRef};

use super::{AuthorityFactory, GridAlternative, OperationQuery};

#[derive(Clone, Debug)]
struct Entry {
    op: OperationRef,
    superseded: bool,
}

/// Registry over in-process tables. Operations are stored in one direction
/// and served in both.
#[derive(Clone, Debug, Default)]
pub struct MemoryRegistry {
    crs: Vec<CrsRef>,
    operations: Vec<Entry>,
    grids: HashMap<String, GridAlternative>,
    geoid_models: HashMap<String, Vec<OperationRef>>,
}

fn has_id(crs: Option<&CrsRef>, id: &Identifier) -> bool {
    crs.is_some_and(|c| c.identifiers().contains(id))
}

fn first_id(crs: Option<&CrsRef>) -> Option<&Identifier> {
    crs.and_then(|c| c.identifiers().first())
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_crs(&mut self, crs: CrsRef) -> &mut Self {
        self.crs.push(crs);
        self
    }

    /// Registers `op`. Its source and target CRS are registered too when they
    /// carry an identifier not yet known.
    pub fn add_operation(&mut self, op: OperationRef) -> &mut Self {
        self.add_entry(op, false)
    }

    /// Registers an operation replaced by a newer one.
    pub fn add_superseded_operation(&mut self, op: OperationRef) -> &mut Self {
        self.add_entry(op, true)
    }

    fn add_entry(&mut self, op: OperationRef, superseded: bool) -> &mut Self {
        for crs in [op.source_crs(), op.target_crs()].into_iter().flatten() {
            let known = crs
                .identifiers()
                .iter()
                .any(|id| self.crs.iter().any(|c| c.identifiers().contains(id)));
            if !crs.identifiers().is_empty() && !known {
                self.crs.push(Arc::clone(crs));
            }
        }
        self.operations.push(Entry { op, superseded });
        self
    }

    pub fn add_grid_alternative(&mut self, grid: GridAlternative) -> &mut Self {
        self.grids.insert(grid.original_name.clone(), grid);
        self
    }

    /// Associates a geoid model name with a transformation realising it.
    pub fn add_geoid_model(&mut self, name: impl Into<String>, op: OperationRef) -> &mut Self {
        self.geoid_models.entry(name.into()).or_default().push(op);
        self
    }

    fn grid_state(&self, op: &OperationRef) -> (bool, bool) {
        let mut known = true;
        let mut available = true;
        for name in grid_names(op) {
            match self.grids.get(&name) {
                Some(g) => available &= g.available,
                None => {
                    known = false;
                    available = false;
                }
            }
        }
        (known, available)
    }

    /// Applies the query flags to `ops`: superseded and grid filtering,
    /// alternative grid names, then operations with available grids first.
    fn finish(&self, candidates: Vec<(OperationRef, bool)>, query: &OperationQuery) -> Vec<OperationRef> {
        let has_current = candidates.iter().any(|(_, superseded)| !superseded);
        let mut out: Vec<(OperationRef, bool)> = Vec::new();
        for (op, superseded) in candidates {
            if superseded && query.discard_superseded && has_current {
                continue;
            }
            let (known, available) = self.grid_state(&op);
            match query.grid_availability {
                GridAvailabilityUse::DiscardIfMissing if !available => continue,
                _ => {}
            }
            let op = if query.use_alternative_grid_names {
                match transformation::substitute_alt_grid_names(&op, self) {
                    Ok(op) => op,
                    Err(e) => {
                        tracing::trace!(op = %op.name(), error = %e, "grid substitution failed");
                        continue;
                    }
                }
            } else {
                op
            };
            let rank = match query.grid_availability {
                GridAvailabilityUse::Ignore | GridAvailabilityUse::KnownAvailable => true,
                _ => known && available,
            };
            out.push((op, rank));
        }
        out.sort_by_key(|(_, rank)| !*rank);
        out.into_iter().map(|(op, _)| op).collect()
    }

    /// Stored operations from `source` to `target`, reversed when stored the other way.
    fn raw_between(&self, source: &Identifier, target: &Identifier) -> Vec<(OperationRef, bool)> {
        let mut out = Vec::new();
        for entry in &self.operations {
            let op = &entry.op;
            if has_id(op.source_crs(), source) && has_id(op.target_crs(), target) {
                out.push((Arc::clone(op), entry.superseded));
            } else if has_id(op.source_crs(), target) && has_id(op.target_crs(), source) {
                out.push((op.inverse(), entry.superseded));
            }
        }
        out
    }

    /// Stored operations touching `id`, oriented to start from it.
    fn raw_from(&self, id: &Identifier) -> Vec<(OperationRef, bool)> {
        let mut out = Vec::new();
        for entry in &self.operations {
            let op = &entry.op;
            if has_id(op.source_crs(), id) {
                out.push((Arc::clone(op), entry.superseded));
            } else if has_id(op.target_crs(), id) {
                out.push((op.inverse(), entry.superseded));
            }
        }
        out
    }

    fn crs_by_id(&self, id: &Identifier) -> Option<&CrsRef> {
        self.crs.iter().find(|c| c.identifiers().contains(id))
    }

    /// Conversion bridging two CRS of the same datum that differ only by
    /// axis order or by the presence of an ellipsoidal height.
    fn datum_bridge(from: &CrsRef, to: &CrsRef) -> Option<OperationRef> {
        if !from.is_geographic() || !to.is_geographic() || !from.shares_datum_with(to) {
            return None;
        }
        let pair = CrsPair::new(Arc::clone(from), Arc::clone(to));
        let (from_cs, to_cs) = (from.coordinate_system()?, to.coordinate_system()?);
        if from_cs.is_axis_order_reversal_of(to_cs) {
            return Some(conversion::create_axis_order_reversal(from.dimension() == 3).with_crs_pair(pair));
        }
        match (from.dimension(), to.dimension()) {
            (3, 2) => Some(conversion::create_geographic_3d_to_2d().with_crs_pair(pair)),
            (2, 3) => Some(
                conversion::create_geographic_3d_to_2d()
                    .with_crs_pair(pair.swapped())
                    .inverse(),
            ),
            _ => None,
        }
    }
}

impl AuthorityFactory for MemoryRegistry {
    fn authorities(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for crs in &self.crs {
            for id in crs.identifiers() {
                if !out.contains(&id.code_space) {
                    out.push(id.code_space.clone());
                }
            }
        }
        // EPSG is preferred
        out.sort_by_key(|a| a != "EPSG");
        out
    }

    fn create_crs(&self, auth: &str, code: &str) -> Result<CrsRef, RegistryError> {
        self.crs_by_id(&Identifier::new(auth, code))
            .cloned()
            .ok_or_else(|| RegistryError::NoSuchCode {
                auth: auth.to_string(),
                code: code.to_string(),
            })
    }

    fn find_crs_by_name(&self, name: &str, crs_type: CrsType, approximate: bool) -> Vec<CrsRef> {
        let wanted = name.to_lowercase();
        self.crs
            .iter()
            .filter(|c| crs_type.accepts(c.crs_type()))
            .filter(|c| {
                is_equivalent_name(c.name(), name) || (approximate && c.name().to_lowercase().contains(&wanted))
            })
            .cloned()
            .collect()
    }

    fn operations_between(
        &self,
        source: &Identifier,
        target: &Identifier,
        query: &OperationQuery,
    ) -> Result<Vec<OperationRef>, RegistryError> {
        Ok(self.finish(self.raw_between(source, target), query))
    }

    fn operations_to(&self, target: &Identifier, query: &OperationQuery) -> Result<Vec<OperationRef>, RegistryError> {
        let reversed = self
            .raw_from(target)
            .into_iter()
            .map(|(op, superseded)| (op.inverse(), superseded))
            .collect();
        Ok(self.finish(reversed, query))
    }

    fn operations_with_intermediate(
        &self,
        source: &Identifier,
        target: &Identifier,
        query: &OperationQuery,
    ) -> Result<Vec<OperationRef>, RegistryError> {
        let mut candidates = Vec::new();
        let firsts = self.raw_from(source);
        let lasts: Vec<(OperationRef, bool)> = self
            .raw_from(target)
            .into_iter()
            .map(|(op, superseded)| (op.inverse(), superseded))
            .collect();
        for (first, first_superseded) in &firsts {
            let Some(middle1) = first.target_crs() else {
                continue;
            };
            let Some(middle1_id) = first_id(Some(middle1)) else {
                continue;
            };
            if middle1.identifiers().contains(target) {
                continue;
            }
            if !query.allowed_intermediates.is_empty() && !query.allowed_intermediates.contains(middle1_id) {
                continue;
            }
            for (last, last_superseded) in &lasts {
                let Some(middle2) = last.source_crs() else {
                    continue;
                };
                if middle2.identifiers().contains(source) {
                    continue;
                }
                let steps = if middle2.identifiers().contains(middle1_id) {
                    vec![Arc::clone(first), Arc::clone(last)]
                } else if query.use_datum_based {
                    match Self::datum_bridge(middle1, middle2) {
                        Some(bridge) => vec![Arc::clone(first), bridge, Arc::clone(last)],
                        None => continue,
                    }
                } else {
                    continue;
                };
                match concatenated::create_compute_metadata(steps, true) {
                    Ok(op) => candidates.push((op, *first_superseded || *last_superseded)),
                    Err(e) => tracing::trace!(error = %e, "intermediate chain dropped"),
                }
            }
        }
        Ok(self.finish(candidates, query))
    }

    fn crs_from_datum(&self, datum: &Identifier, crs_type: CrsType) -> Vec<CrsRef> {
        self.crs
            .iter()
            .filter(|c| crs_type.accepts(c.crs_type()))
            .filter(|c| {
                let geodetic = c.geodetic_datum().map(|d| &d.props.identifiers);
                let vertical = c.vertical_datum().map(|d| &d.props.identifiers);
                geodetic.or(vertical).is_some_and(|ids| ids.contains(datum))
            })
            .cloned()
            .collect()
    }

    fn grid_alternative(&self, name: &str) -> Option<GridAlternative> {
        self.grids.get(name).cloned()
    }

    fn transformations_for_geoid_model(&self, name: &str) -> Vec<OperationRef> {
        self.geoid_models
            .iter()
            .filter(|(model, _)| is_equivalent_name(model, name))
            .flat_map(|(_, ops)| ops.iter().cloned())
            .collect()
    }

    fn transformations_referencing_grid(&self, name: &str) -> Vec<OperationRef> {
        self.operations
            .iter()
            .filter(|e| e.op.is_transformation())
            .filter(|e| grid_names(&e.op).iter().any(|g| g == name))
            .map(|e| Arc::clone(&e.op))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ObjectProps;
    use crate::crs::presets;
    use crate::operation::PositionalAccuracy;

    fn registry() -> MemoryRegistry {
        let mut r = MemoryRegistry::new();
        r.add_operation(transformation::ntv2(
            ObjectProps::named("NAD27 to NAD83 (7)").with_epsg(1313),
            presets::nad27(),
            presets::nad83(),
            "ntv2_0.gsb",
            vec![PositionalAccuracy::Known(1.0)],
        ));
        r.add_operation(transformation::geocentric_translations(
            ObjectProps::named("NAD83 to WGS 84 (1)").with_epsg(1188),
            presets::nad83(),
            presets::wgs84(),
            0.0,
            0.0,
            0.0,
            vec![PositionalAccuracy::Known(4.0)],
        ));
        r
    }

    #[test]
    fn test_operations_served_both_ways() {
        let r = registry();
        let q = OperationQuery::default();
        let fwd = r.operations_between(&Identifier::epsg(4267), &Identifier::epsg(4269), &q).unwrap();
        assert_eq!(fwd.len(), 1);
        assert_eq!(fwd[0].name(), "NAD27 to NAD83 (7)");
        let inv = r.operations_between(&Identifier::epsg(4269), &Identifier::epsg(4267), &q).unwrap();
        assert_eq!(inv[0].name(), "Inverse of NAD27 to NAD83 (7)");
        assert_eq!(inv[0].source_crs().unwrap().name(), "NAD83");
    }

    #[test]
    fn test_crs_registered_with_operations() {
        let r = registry();
        assert_eq!(r.create_crs("EPSG", "4267").unwrap().name(), "NAD27");
        assert!(matches!(
            r.create_crs("EPSG", "1").unwrap_err(),
            RegistryError::NoSuchCode { .. }
        ));
        assert_eq!(r.find_crs_by_name("nad83", CrsType::Geographic2D, false).len(), 1);
        assert_eq!(r.authorities(), ["EPSG"]);
    }

    #[test]
    fn test_intermediate_chain() {
        let r = registry();
        let q = OperationQuery::default();
        let ops = r
            .operations_with_intermediate(&Identifier::epsg(4267), &Identifier::epsg(4326), &q)
            .unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].name(), "NAD27 to NAD83 (7) + NAD83 to WGS 84 (1)");
        let q = OperationQuery {
            allowed_intermediates: vec![Identifier::epsg(4258)],
            ..Default::default()
        };
        assert!(r
            .operations_with_intermediate(&Identifier::epsg(4267), &Identifier::epsg(4326), &q)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_discard_if_missing_grid() {
        let mut r = registry();
        let q = OperationQuery {
            grid_availability: GridAvailabilityUse::DiscardIfMissing,
            ..Default::default()
        };
        assert!(r
            .operations_between(&Identifier::epsg(4267), &Identifier::epsg(4269), &q)
            .unwrap()
            .is_empty());
        r.add_grid_alternative(GridAlternative {
            original_name: "ntv2_0.gsb".into(),
            proj_filename: "ca_nrc_ntv2_0.tif".into(),
            format: "GTiff".into(),
            available: true,
            ..Default::default()
        });
        assert_eq!(
            r.operations_between(&Identifier::epsg(4267), &Identifier::epsg(4269), &q)
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_superseded_discarded_when_current_exists() {
        let mut r = registry();
        r.add_superseded_operation(transformation::geocentric_translations(
            ObjectProps::named("NAD27 to NAD83 (1)").with_epsg(1173),
            presets::nad27(),
            presets::nad83(),
            -8.0,
            160.0,
            176.0,
            vec![PositionalAccuracy::Known(10.0)],
        ));
        let q = OperationQuery {
            discard_superseded: true,
            ..Default::default()
        };
        let ops = r.operations_between(&Identifier::epsg(4267), &Identifier::epsg(4269), &q).unwrap();
        assert_eq!(ops.len(), 1);
        let q = OperationQuery::default();
        let ops = r.operations_between(&Identifier::epsg(4267), &Identifier::epsg(4269), &q).unwrap();
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn test_grid_referencing_lookup() {
        let r = registry();
        assert_eq!(r.transformations_referencing_grid("ntv2_0.gsb").len(), 1);
        assert!(r.transformations_referencing_grid("other.gsb").is_empty());
    }
}
