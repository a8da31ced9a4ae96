//! Settings steering operation resolution.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::common::{Extent, Identifier};
use crate::registry::AuthorityFactory;

/// How grid availability affects the result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GridAvailabilityUse {
    /// Grids are not looked at.
    Ignore,
    /// Operations with available grids rank first.
    #[default]
    UseForSorting,
    /// Operations needing a missing grid are dropped.
    DiscardIfMissing,
    /// Every grid is assumed available.
    KnownAvailable,
}

/// Which extent operations are checked against when no area of interest is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTargetExtentUse {
    None,
    Both,
    Intersection,
    #[default]
    Smallest,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpatialCriterion {
    #[default]
    StrictContainment,
    PartialIntersection,
}

/// Whether operations through an intermediate CRS are searched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntermediateCrsUse {
    Always,
    #[default]
    IfNoDirect,
    Never,
}

/// Resolution settings. Cheap to clone; the registry is shared.
#[derive(Clone)]
pub struct CoordinateOperationContext {
    registry: Option<Arc<dyn AuthorityFactory>>,
    area_of_interest: Option<Extent>,
    desired_accuracy: f64,
    allow_ballpark: bool,
    extent_use: SourceTargetExtentUse,
    spatial_criterion: SpatialCriterion,
    grid_availability: GridAvailabilityUse,
    intermediate_crs_use: IntermediateCrsUse,
    intermediate_crs: Vec<Identifier>,
    discard_superseded: bool,
    use_alternative_grid_names: bool,
}

impl Default for CoordinateOperationContext {
    fn default() -> Self {
        Self::new(None)
    }
}

impl fmt::Debug for CoordinateOperationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinateOperationContext")
            .field("has_registry", &self.registry.is_some())
            .field("area_of_interest", &self.area_of_interest)
            .field("desired_accuracy", &self.desired_accuracy)
            .field("allow_ballpark", &self.allow_ballpark)
            .field("extent_use", &self.extent_use)
            .field("spatial_criterion", &self.spatial_criterion)
            .field("grid_availability", &self.grid_availability)
            .field("intermediate_crs_use", &self.intermediate_crs_use)
            .field("intermediate_crs", &self.intermediate_crs)
            .field("discard_superseded", &self.discard_superseded)
            .field("use_alternative_grid_names", &self.use_alternative_grid_names)
            .finish()
    }
}

impl CoordinateOperationContext {
    pub fn new(registry: Option<Arc<dyn AuthorityFactory>>) -> Self {
        Self {
            registry,
            area_of_interest: None,
            desired_accuracy: 0.0,
            allow_ballpark: true,
            extent_use: SourceTargetExtentUse::default(),
            spatial_criterion: SpatialCriterion::default(),
            grid_availability: GridAvailabilityUse::default(),
            intermediate_crs_use: IntermediateCrsUse::default(),
            intermediate_crs: Vec::new(),
            discard_superseded: true,
            use_alternative_grid_names: true,
        }
    }

    pub fn registry(&self) -> Option<&dyn AuthorityFactory> {
        self.registry.as_deref()
    }

    pub fn area_of_interest(&self) -> Option<&Extent> {
        self.area_of_interest.as_ref()
    }

    /// Maximum accuracy in metres; 0 when unset.
    pub fn desired_accuracy(&self) -> f64 {
        self.desired_accuracy
    }

    pub fn allow_ballpark(&self) -> bool {
        self.allow_ballpark
    }

    pub fn extent_use(&self) -> SourceTargetExtentUse {
        self.extent_use
    }

    pub fn spatial_criterion(&self) -> SpatialCriterion {
        self.spatial_criterion
    }

    pub fn grid_availability(&self) -> GridAvailabilityUse {
        self.grid_availability
    }

    pub fn intermediate_crs_use(&self) -> IntermediateCrsUse {
        self.intermediate_crs_use
    }

    pub fn intermediate_crs(&self) -> &[Identifier] {
        &self.intermediate_crs
    }

    pub fn discard_superseded(&self) -> bool {
        self.discard_superseded
    }

    pub fn use_alternative_grid_names(&self) -> bool {
        self.use_alternative_grid_names
    }

    pub fn with_registry(mut self, registry: Arc<dyn AuthorityFactory>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_area_of_interest(mut self, extent: Extent) -> Self {
        self.area_of_interest = Some(extent);
        self
    }

    pub fn with_desired_accuracy(mut self, metres: f64) -> Self {
        self.desired_accuracy = metres;
        self
    }

    pub fn with_allow_ballpark(mut self, allow: bool) -> Self {
        self.allow_ballpark = allow;
        self
    }

    pub fn with_extent_use(mut self, extent_use: SourceTargetExtentUse) -> Self {
        self.extent_use = extent_use;
        self
    }

    pub fn with_spatial_criterion(mut self, criterion: SpatialCriterion) -> Self {
        self.spatial_criterion = criterion;
        self
    }

    pub fn with_grid_availability(mut self, grid_availability: GridAvailabilityUse) -> Self {
        self.grid_availability = grid_availability;
        self
    }

    pub fn with_intermediate_crs_use(mut self, use_: IntermediateCrsUse) -> Self {
        self.intermediate_crs_use = use_;
        self
    }

    /// Restricts pivot CRS to `crs`. Empty means any.
    pub fn with_intermediate_crs(mut self, crs: Vec<Identifier>) -> Self {
        self.intermediate_crs = crs;
        self
    }

    pub fn with_discard_superseded(mut self, discard: bool) -> Self {
        self.discard_superseded = discard;
        self
    }

    pub fn with_alternative_grid_names(mut self, use_alt: bool) -> Self {
        self.use_alternative_grid_names = use_alt;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let ctx = CoordinateOperationContext::default();
        assert!(ctx.registry().is_none());
        assert!(ctx.allow_ballpark());
        assert_eq!(ctx.desired_accuracy(), 0.0);
        assert_eq!(ctx.extent_use(), SourceTargetExtentUse::Smallest);
        assert_eq!(ctx.spatial_criterion(), SpatialCriterion::StrictContainment);
        assert_eq!(ctx.grid_availability(), GridAvailabilityUse::UseForSorting);
        assert_eq!(ctx.intermediate_crs_use(), IntermediateCrsUse::IfNoDirect);
    }

    #[test]
    fn test_enum_names_are_kebab_case() {
        let parsed: GridAvailabilityUse = toml::Value::String("discard-if-missing".into()).try_into().unwrap();
        assert_eq!(parsed, GridAvailabilityUse::DiscardIfMissing);
        let parsed: SpatialCriterion = toml::Value::String("partial-intersection".into()).try_into().unwrap();
        assert_eq!(parsed, SpatialCriterion::PartialIntersection);
    }
}
