//! Discovery, synthesis and ranking of coordinate operations between
//! coordinate reference systems.
//!
//! [`CoordinateOperationFactory`] resolves the candidate operations from a
//! source to a target CRS under the settings of a
//! [`CoordinateOperationContext`], optionally backed by an
//! [`AuthorityFactory`](registry::AuthorityFactory) registry.

pub mod common;
pub mod config;
pub mod crs;
pub mod error;
pub mod factory;
pub mod io;
pub mod operation;
pub mod registry;

#[cfg(feature = "python")]
mod py;

pub use config::ContextConfig;
pub use crs::{Crs, CrsRef};
pub use error::{ConfigError, FormattingError, OperationError, RegistryError};
pub use factory::{CoordinateOperationContext, CoordinateOperationFactory};
pub use operation::{CoordinateOperation, OperationRef};
pub use registry::{AuthorityFactory, MemoryRegistry};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pymodule]
fn _rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    py::register(m)?;
    Ok(())
}
