//! Coordinate operation object model.
//!
//! A [`CoordinateOperation`] is an immutable record shared through
//! [`OperationRef`]. Its [`OperationKind`] is a closed set of variants:
//! conversions and transformations (a method plus parameter values),
//! PROJ-pipeline based operations, concatenations, and the lazy inverse of
//! another operation. The lazy inverse stores nothing but its forward
//! operation; every accessor derives the inverse view from it on demand.

pub mod ballpark;
pub mod concatenated;
pub mod constants;
pub mod conversion;
pub mod equivalence;
pub mod mappings;
pub mod metadata;
pub mod method;
pub mod proj_based;
pub mod reparam;
pub mod transformation;

use std::borrow::Cow;
use std::sync::Arc;

use crate::common::{Extent, Identifier, ObjectProps};
use crate::crs::{Crs, CrsRef};

pub use concatenated::ConcatenatedOperation;
pub use method::{
    OperationMethod, OperationParameter, OperationParameterValue, ParameterValue, SingleOperation,
};
pub use proj_based::{ProjBasedOperation, ProjSource};

pub type OperationRef = Arc<CoordinateOperation>;

const INVERSE_OF: &str = "Inverse of ";
const INVERSE_ID_PREFIX: &str = "INVERSE(";
const APPROX_INVERSION_SUFFIX: &str = " (approx. inversion)";

/// Source and target CRS. Always set together.
#[derive(Clone, Debug)]
pub struct CrsPair {
    pub source: CrsRef,
    pub target: CrsRef,
}

impl CrsPair {
    pub fn new(source: CrsRef, target: CrsRef) -> Self {
        Self { source, target }
    }

    pub fn swapped(&self) -> Self {
        Self::new(Arc::clone(&self.target), Arc::clone(&self.source))
    }
}

/// Estimated positional error in metres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PositionalAccuracy {
    Known(f64),
    Unknown,
}

impl PositionalAccuracy {
    pub fn value(self) -> Option<f64> {
        match self {
            PositionalAccuracy::Known(v) => Some(v),
            PositionalAccuracy::Unknown => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationType {
    Conversion,
    Transformation,
    Concatenated,
    ProjBased,
}

/// Metadata shared by every direct (non lazy-inverse) operation.
#[derive(Clone, Debug, Default)]
pub struct OperationCommon {
    pub props: ObjectProps,
    pub version: Option<String>,
    pub accuracies: Vec<PositionalAccuracy>,
    pub crs_pair: Option<CrsPair>,
    pub interpolation_crs: Option<CrsRef>,
    pub source_epoch: Option<f64>,
    pub target_epoch: Option<f64>,
    pub has_ballpark: bool,
}

impl OperationCommon {
    pub fn new(props: ObjectProps) -> Self {
        Self {
            props,
            ..Default::default()
        }
    }

    pub fn with_crs_pair(mut self, source: CrsRef, target: CrsRef) -> Self {
        self.crs_pair = Some(CrsPair::new(source, target));
        self
    }

    pub fn with_interpolation_crs(mut self, crs: Option<CrsRef>) -> Self {
        self.interpolation_crs = crs;
        self
    }

    pub fn with_accuracies(mut self, accuracies: Vec<PositionalAccuracy>) -> Self {
        self.accuracies = accuracies;
        self
    }

    pub fn with_accuracy(self, metres: f64) -> Self {
        self.with_accuracies(vec![PositionalAccuracy::Known(metres)])
    }

    pub fn with_ballpark(mut self, ballpark: bool) -> Self {
        self.has_ballpark = ballpark;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[derive(Clone, Debug)]
pub enum OperationKind {
    Conversion(SingleOperation),
    Transformation(SingleOperation),
    ProjBased(ProjBasedOperation),
    Concatenated(ConcatenatedOperation),
    /// Inverse of the wrapped conversion or transformation, derived on demand.
    InverseOf(OperationRef),
}

#[derive(Clone, Debug)]
pub struct CoordinateOperation {
    common: OperationCommon,
    kind: OperationKind,
}

impl CoordinateOperation {
    pub fn new(common: OperationCommon, kind: OperationKind) -> OperationRef {
        Arc::new(Self { common, kind })
    }

    /// Lazy inverse of `forward`.
    pub fn lazy_inverse(forward: OperationRef) -> OperationRef {
        Arc::new(Self {
            common: OperationCommon::default(),
            kind: OperationKind::InverseOf(forward),
        })
    }

    pub fn kind(&self) -> &OperationKind {
        &self.kind
    }

    pub fn op_type(&self) -> OperationType {
        match &self.kind {
            OperationKind::Conversion(_) => OperationType::Conversion,
            OperationKind::Transformation(_) => OperationType::Transformation,
            OperationKind::ProjBased(_) => OperationType::ProjBased,
            OperationKind::Concatenated(_) => OperationType::Concatenated,
            OperationKind::InverseOf(f) => f.op_type(),
        }
    }

    pub fn is_conversion(&self) -> bool {
        self.op_type() == OperationType::Conversion
    }

    pub fn is_transformation(&self) -> bool {
        self.op_type() == OperationType::Transformation
    }

    /// Forward operation when this is a lazy inverse.
    pub fn inverse_of(&self) -> Option<&OperationRef> {
        match &self.kind {
            OperationKind::InverseOf(f) => Some(f),
            _ => None,
        }
    }

    pub fn props(&self) -> Cow<'_, ObjectProps> {
        match &self.kind {
            OperationKind::InverseOf(f) => {
                let fwd = f.props();
                let mut props = ObjectProps::named(inverse_name(&fwd.name, false));
                props.identifiers = inverse_identifiers(&fwd.identifiers);
                props.domains = fwd.domains.clone();
                props.remarks = fwd.remarks.clone();
                Cow::Owned(props)
            }
            _ => Cow::Borrowed(&self.common.props),
        }
    }

    pub fn name(&self) -> Cow<'_, str> {
        match &self.kind {
            OperationKind::InverseOf(f) => Cow::Owned(inverse_name(&f.name(), false)),
            _ => Cow::Borrowed(&self.common.props.name),
        }
    }

    pub fn identifiers(&self) -> Cow<'_, [Identifier]> {
        match &self.kind {
            OperationKind::InverseOf(f) => Cow::Owned(inverse_identifiers(&f.identifiers())),
            _ => Cow::Borrowed(&self.common.props.identifiers),
        }
    }

    pub fn remarks(&self) -> Option<&str> {
        match &self.kind {
            OperationKind::InverseOf(f) => f.remarks(),
            _ => self.common.props.remarks.as_deref(),
        }
    }

    pub fn extent(&self) -> Option<&Extent> {
        match &self.kind {
            OperationKind::InverseOf(f) => f.extent(),
            _ => self.common.props.extent(),
        }
    }

    pub fn version(&self) -> Option<&str> {
        match &self.kind {
            OperationKind::InverseOf(f) => f.version(),
            _ => self.common.version.as_deref(),
        }
    }

    pub fn accuracies(&self) -> &[PositionalAccuracy] {
        match &self.kind {
            OperationKind::InverseOf(f) => f.accuracies(),
            _ => &self.common.accuracies,
        }
    }

    pub fn has_crs_pair(&self) -> bool {
        match &self.kind {
            OperationKind::InverseOf(f) => f.has_crs_pair(),
            _ => self.common.crs_pair.is_some(),
        }
    }

    pub fn source_crs(&self) -> Option<&CrsRef> {
        match &self.kind {
            OperationKind::InverseOf(f) => f.target_crs(),
            _ => self.common.crs_pair.as_ref().map(|p| &p.source),
        }
    }

    pub fn target_crs(&self) -> Option<&CrsRef> {
        match &self.kind {
            OperationKind::InverseOf(f) => f.source_crs(),
            _ => self.common.crs_pair.as_ref().map(|p| &p.target),
        }
    }

    pub fn crs_pair(&self) -> Option<CrsPair> {
        match (self.source_crs(), self.target_crs()) {
            (Some(s), Some(t)) => Some(CrsPair::new(Arc::clone(s), Arc::clone(t))),
            _ => None,
        }
    }

    pub fn interpolation_crs(&self) -> Option<&CrsRef> {
        match &self.kind {
            OperationKind::InverseOf(f) => f.interpolation_crs(),
            _ => self.common.interpolation_crs.as_ref(),
        }
    }

    pub fn source_epoch(&self) -> Option<f64> {
        match &self.kind {
            OperationKind::InverseOf(f) => f.target_epoch(),
            _ => self.common.source_epoch,
        }
    }

    pub fn target_epoch(&self) -> Option<f64> {
        match &self.kind {
            OperationKind::InverseOf(f) => f.source_epoch(),
            _ => self.common.target_epoch,
        }
    }

    /// Whether the operation is, or contains, a synthesised zero-valued fallback.
    pub fn has_ballpark_transformation(&self) -> bool {
        match &self.kind {
            OperationKind::InverseOf(f) => f.has_ballpark_transformation(),
            _ => self.common.has_ballpark,
        }
    }

    /// Method and parameter values of a conversion or transformation (or
    /// their lazy inverse, which shares the forward values).
    pub fn single(&self) -> Option<&SingleOperation> {
        match &self.kind {
            OperationKind::Conversion(s) | OperationKind::Transformation(s) => Some(s),
            OperationKind::InverseOf(f) => f.single(),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&OperationMethod> {
        self.single().map(|s| &s.method)
    }

    pub fn method_epsg_code(&self) -> Option<u32> {
        self.method().and_then(OperationMethod::epsg_code)
    }

    /// Steps of a concatenation; a single-element view of any other operation.
    pub fn steps(self: &Arc<Self>) -> Vec<OperationRef> {
        match &self.kind {
            OperationKind::Concatenated(c) => c.steps.clone(),
            _ => vec![Arc::clone(self)],
        }
    }

    pub fn as_concatenated(&self) -> Option<&ConcatenatedOperation> {
        match &self.kind {
            OperationKind::Concatenated(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_proj_based(&self) -> Option<&ProjBasedOperation> {
        match &self.kind {
            OperationKind::ProjBased(p) => Some(p),
            _ => None,
        }
    }

    pub fn common(&self) -> &OperationCommon {
        &self.common
    }

    /// Inverse operation: source and target are swapped.
    pub fn inverse(self: &Arc<Self>) -> OperationRef {
        match &self.kind {
            OperationKind::Conversion(_) => conversion::inverse(self),
            OperationKind::Transformation(_) => transformation::inverse(self),
            OperationKind::ProjBased(p) => p.inverse(self),
            OperationKind::Concatenated(_) => concatenated::inverse(self),
            OperationKind::InverseOf(f) => Arc::clone(f),
        }
    }

    /// Shallow copy attached to another CRS pair.
    pub fn with_crs_pair(&self, pair: CrsPair) -> OperationRef {
        match &self.kind {
            OperationKind::InverseOf(f) => Self::lazy_inverse(f.with_crs_pair(pair.swapped())),
            _ => {
                let mut op = self.clone();
                op.common.crs_pair = Some(pair);
                Arc::new(op)
            }
        }
    }

    /// Shallow copy detached from any CRS.
    pub fn without_crs_pair(&self) -> OperationRef {
        match &self.kind {
            OperationKind::InverseOf(f) => Self::lazy_inverse(f.without_crs_pair()),
            _ => {
                let mut op = self.clone();
                op.common.crs_pair = None;
                Arc::new(op)
            }
        }
    }

    /// Shallow copy with a different ballpark flag.
    pub fn with_ballpark(&self, ballpark: bool) -> OperationRef {
        match &self.kind {
            OperationKind::InverseOf(f) => Self::lazy_inverse(f.with_ballpark(ballpark)),
            _ => {
                let mut op = self.clone();
                op.common.has_ballpark = ballpark;
                Arc::new(op)
            }
        }
    }

    /// Shallow copy with other name, identifiers and domains.
    pub fn with_props(&self, props: ObjectProps) -> OperationRef {
        match &self.kind {
            OperationKind::InverseOf(f) => {
                Self::lazy_inverse(f.with_props(ObjectProps {
                    name: inverse_name(&props.name, false),
                    ..props
                }))
            }
            _ => {
                let mut op = self.clone();
                op.common.props = props;
                Arc::new(op)
            }
        }
    }

    /// Shallow copy with other accuracies.
    pub fn with_accuracies(&self, accuracies: Vec<PositionalAccuracy>) -> OperationRef {
        match &self.kind {
            OperationKind::InverseOf(f) => Self::lazy_inverse(f.with_accuracies(accuracies)),
            _ => {
                let mut op = self.clone();
                op.common.accuracies = accuracies;
                Arc::new(op)
            }
        }
    }

    /// Wraps this operation with axis swaps so that geographic endpoints are
    /// longitude first.
    pub fn normalize_for_visualization(
        self: &Arc<Self>,
    ) -> Result<OperationRef, crate::error::OperationError> {
        let (Some(src), Some(dst)) = (self.source_crs(), self.target_crs()) else {
            return Err(crate::error::OperationError::Unsupported(
                "Cannot retrieve source or target CRS".to_string(),
            ));
        };
        let swap_src = must_swap_for_visualization(src);
        let swap_dst = must_swap_for_visualization(dst);
        if !swap_src && !swap_dst {
            return Ok(Arc::clone(self));
        }
        let mut steps = Vec::new();
        if swap_src {
            let normalized = normalized_for_visualization(src);
            steps.push(
                conversion::create_axis_order_reversal(false)
                    .with_crs_pair(CrsPair::new(normalized, Arc::clone(src))),
            );
        }
        steps.push(Arc::clone(self));
        if swap_dst {
            let normalized = normalized_for_visualization(dst);
            steps.push(
                conversion::create_axis_order_reversal(false)
                    .with_crs_pair(CrsPair::new(Arc::clone(dst), normalized)),
            );
        }
        concatenated::create_compute_metadata(steps, true)
    }
}

fn must_swap_for_visualization(crs: &Crs) -> bool {
    match crs.coordinate_system() {
        Some(cs) if crs.is_geographic() || crs.is_projected() => cs.is_north_first(),
        _ => false,
    }
}

fn normalized_for_visualization(crs: &CrsRef) -> CrsRef {
    match &crs.kind {
        crate::crs::CrsKind::Geodetic(g) => {
            let mut props = ObjectProps::named(crs.name());
            props.domains = crs.props.domains.clone();
            Crs::geodetic(props, g.datum.clone(), g.cs.with_swapped_axes())
        }
        crate::crs::CrsKind::Derived(d) => {
            let mut props = ObjectProps::named(crs.name());
            props.domains = crs.props.domains.clone();
            Crs::derived(
                props,
                Arc::clone(&d.base),
                Arc::clone(&d.conversion),
                d.cs.with_swapped_axes(),
            )
        }
        _ => Arc::clone(crs),
    }
}

/// Name of the inverse of an operation named `name`.
pub fn inverse_name(name: &str, approximate: bool) -> String {
    let base = name.strip_suffix(APPROX_INVERSION_SUFFIX).unwrap_or(name);
    let mut out = match base.strip_prefix(INVERSE_OF) {
        Some(forward) => forward.to_string(),
        None if base.is_empty() => format!("{INVERSE_OF}unnamed"),
        None => format!("{INVERSE_OF}{base}"),
    };
    if approximate {
        out.push_str(APPROX_INVERSION_SUFFIX);
    }
    out
}

/// Identifiers of the inverse of an operation identified by `ids`, in the
/// `INVERSE(<authority>)` code space. Inverting twice restores the originals.
pub fn inverse_identifiers(ids: &[Identifier]) -> Vec<Identifier> {
    ids.iter()
        .map(|id| {
            let code_space = match id
                .code_space
                .strip_prefix(INVERSE_ID_PREFIX)
                .and_then(|rest| rest.strip_suffix(')'))
            {
                Some(forward) => forward.to_string(),
                None => format!("{INVERSE_ID_PREFIX}{})", id.code_space),
            };
            Identifier::new(code_space, &id.code)
        })
        .collect()
}

/// Properties for the inverse of `op`: inverted name and identifiers, same
/// domains and remarks.
pub(crate) fn inverse_props(op: &CoordinateOperation, approximate: bool) -> ObjectProps {
    let fwd = op.props();
    let mut props = ObjectProps::named(inverse_name(&fwd.name, approximate));
    props.identifiers = inverse_identifiers(&fwd.identifiers);
    props.domains = fwd.domains.clone();
    props.remarks = fwd.remarks.clone();
    props
}

/// Metadata of an analytic inverse of `op`: swapped CRS pair and epochs,
/// same accuracies, interpolation CRS and ballpark flag.
pub(crate) fn inverse_common(op: &CoordinateOperation, props: ObjectProps) -> OperationCommon {
    OperationCommon {
        props,
        version: op.version().map(str::to_string),
        accuracies: op.accuracies().to_vec(),
        crs_pair: op.crs_pair().map(|p| p.swapped()),
        interpolation_crs: op.interpolation_crs().cloned(),
        source_epoch: op.target_epoch(),
        target_epoch: op.source_epoch(),
        has_ballpark: op.has_ballpark_transformation(),
    }
}

/// Whether an operation name marks an approximate inversion.
pub fn is_approximate_inversion_name(name: &str) -> bool {
    name.contains(APPROX_INVERSION_SUFFIX.trim_start())
}
