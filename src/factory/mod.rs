//! Resolution of the coordinate operations between two CRS.
//!
//! [`CoordinateOperationFactory::create_operations`] explores the structural
//! kinds of both CRS, queries the registry of the context when there is one,
//! synthesises fallback operations when nothing is registered, and returns
//! the candidates filtered and ranked best first.

mod context;
mod dispatch;
mod filter;
mod pivot;
mod registry_search;

use rayon::prelude::*;

use crate::crs::CrsRef;
use crate::error::OperationError;
use crate::operation::OperationRef;

pub use context::{
    CoordinateOperationContext, GridAvailabilityUse, IntermediateCrsUse, SourceTargetExtentUse,
    SpatialCriterion,
};

use dispatch::{Guard, Search};

/// Entry point of operation resolution. Stateless: every call builds its own
/// search state, so one factory can serve several threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoordinateOperationFactory;

impl CoordinateOperationFactory {
    pub fn new() -> Self {
        Self
    }

    /// Candidate operations from `source` to `target`, best first.
    ///
    /// An empty list means no operation could be found or synthesised under
    /// the constraints of `context`. Errors are only returned for malformed
    /// input objects.
    pub fn create_operations(
        &self,
        source: &CrsRef,
        target: &CrsRef,
        context: &CoordinateOperationContext,
    ) -> Result<Vec<OperationRef>, OperationError> {
        let search = Search::new(context);
        let raw = search.create(source, target, Guard::default())?;
        tracing::debug!(
            source = source.name(),
            target = target.name(),
            candidates = raw.len(),
            "raw candidates"
        );
        Ok(filter::filter_and_sort(raw, source, target, context))
    }

    /// Best operation from `source` to `target` using only what the two CRS
    /// define, without registry and without area restriction.
    pub fn create_operation(
        &self,
        source: &CrsRef,
        target: &CrsRef,
    ) -> Result<Option<OperationRef>, OperationError> {
        let context =
            CoordinateOperationContext::default().with_extent_use(SourceTargetExtentUse::None);
        Ok(self
            .create_operations(source, target, &context)?
            .into_iter()
            .next())
    }

    /// Resolves independent pairs in parallel. Each pair gets its own search
    /// state; only the registry is shared.
    pub fn create_operations_batch(
        &self,
        pairs: &[(CrsRef, CrsRef)],
        context: &CoordinateOperationContext,
    ) -> Vec<Result<Vec<OperationRef>, OperationError>> {
        pairs
            .par_iter()
            .map(|(source, target)| self.create_operations(source, target, context))
            .collect()
    }
}
