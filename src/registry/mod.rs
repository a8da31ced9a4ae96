//! The read-only authority registry the resolver queries, and an in-memory
//! implementation of it.

mod memory;

pub use memory::MemoryRegistry;

use crate::common::Identifier;
use crate::crs::{CrsRef, CrsType};
use crate::error::RegistryError;
use crate::factory::GridAvailabilityUse;
use crate::operation::OperationRef;

/// A grid known to the registry under another name or in another format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridAlternative {
    pub original_name: String,
    pub proj_filename: String,
    /// `"NTv2"`, `"GTX"`, ...
    pub format: String,
    /// Whether the alternative grid is stored for the opposite direction.
    pub inverse_direction: bool,
    pub package_name: String,
    pub url: String,
    pub direct_download: bool,
    pub open_license: bool,
    pub available: bool,
}

/// Flags accompanying an operation lookup.
#[derive(Clone, Debug, Default)]
pub struct OperationQuery {
    pub grid_availability: GridAvailabilityUse,
    pub discard_superseded: bool,
    pub use_alternative_grid_names: bool,
    /// Allowed pivot CRS. Empty means any.
    pub allowed_intermediates: Vec<Identifier>,
    /// Also pivot through CRS sharing a datum with a registered intermediate.
    pub use_datum_based: bool,
}

/// Lookup service over a geodetic parameter database. Shared read-only
/// between threads.
pub trait AuthorityFactory: Send + Sync {
    /// Authority names, preferred first.
    fn authorities(&self) -> Vec<String>;

    fn create_crs(&self, auth: &str, code: &str) -> Result<CrsRef, RegistryError>;

    /// CRS of type `crs_type` named `name`; with `approximate`, names
    /// containing `name` match too.
    fn find_crs_by_name(&self, name: &str, crs_type: CrsType, approximate: bool) -> Vec<CrsRef>;

    /// Registered operations from `source` to `target`, in either stored direction.
    fn operations_between(
        &self,
        source: &Identifier,
        target: &Identifier,
        query: &OperationQuery,
    ) -> Result<Vec<OperationRef>, RegistryError>;

    /// Registered operations ending at `target`, from any source.
    fn operations_to(&self, target: &Identifier, query: &OperationQuery) -> Result<Vec<OperationRef>, RegistryError>;

    /// Chains of two registered operations through one intermediate CRS.
    fn operations_with_intermediate(
        &self,
        source: &Identifier,
        target: &Identifier,
        query: &OperationQuery,
    ) -> Result<Vec<OperationRef>, RegistryError>;

    /// CRS of type `crs_type` built on the datum `datum`.
    fn crs_from_datum(&self, datum: &Identifier, crs_type: CrsType) -> Vec<CrsRef>;

    fn grid_alternative(&self, name: &str) -> Option<GridAlternative>;

    /// Transformations realising the geoid model `name`.
    fn transformations_for_geoid_model(&self, name: &str) -> Vec<OperationRef>;

    /// Transformations whose parameters reference the grid file `name`.
    fn transformations_referencing_grid(&self, name: &str) -> Vec<OperationRef>;
}
