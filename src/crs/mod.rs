//! Coordinate reference systems, reduced to what operation resolution consumes.
//!
//! Every CRS is a closed [`CrsKind`] variant shared through [`CrsRef`]. Derived
//! and bound CRS own their defining operations; those operations carry no
//! reference back to the owning CRS until [`Crs::derivation`] reattaches one.

pub mod cs;
pub mod datum;
pub mod presets;

use std::sync::Arc;

use crate::common::units::UnitOfMeasure;
use crate::common::{Criterion, Extent, Identifier, ObjectProps};
use crate::operation::{equivalence, CrsPair, OperationRef};

pub use cs::{Axis, AxisDirection, CoordinateSystem, CsKind};
pub use datum::{Ellipsoid, GeodeticDatum, PrimeMeridian, VerticalDatum};

pub type CrsRef = Arc<Crs>;

/// Object type filter used by registry name lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrsType {
    Geographic2D,
    Geographic3D,
    Geocentric,
    Projected,
    DerivedGeographic,
    Vertical,
    Compound,
    Bound,
}

impl CrsType {
    /// Whether an object of type `actual` satisfies a lookup for `self`.
    pub fn accepts(self, actual: CrsType) -> bool {
        self == actual
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeodeticCrs {
    pub datum: GeodeticDatum,
    pub cs: CoordinateSystem,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VerticalCrs {
    pub datum: VerticalDatum,
    pub cs: CoordinateSystem,
    /// Name of the geoid model the heights are realised through, if any.
    pub geoid_model: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DerivedCrs {
    pub base: CrsRef,
    /// Defining conversion, stored without a CRS pair.
    pub conversion: OperationRef,
    pub cs: CoordinateSystem,
}

#[derive(Clone, Debug)]
pub struct BoundCrs {
    pub base: CrsRef,
    pub hub: CrsRef,
    /// Transformation from `base` to `hub`.
    pub transformation: OperationRef,
}

#[derive(Clone, Debug)]
pub enum CrsKind {
    Geodetic(GeodeticCrs),
    Vertical(VerticalCrs),
    Derived(DerivedCrs),
    Compound(Vec<CrsRef>),
    Bound(BoundCrs),
}

#[derive(Clone, Debug)]
pub struct Crs {
    pub props: ObjectProps,
    pub kind: CrsKind,
}

impl Crs {
    pub fn new(props: ObjectProps, kind: CrsKind) -> CrsRef {
        Arc::new(Self { props, kind })
    }

    pub fn geodetic(props: ObjectProps, datum: GeodeticDatum, cs: CoordinateSystem) -> CrsRef {
        Self::new(props, CrsKind::Geodetic(GeodeticCrs { datum, cs }))
    }

    pub fn geocentric(props: ObjectProps, datum: GeodeticDatum) -> CrsRef {
        Self::geodetic(props, datum, CoordinateSystem::geocentric())
    }

    pub fn vertical(props: ObjectProps, datum: VerticalDatum, cs: CoordinateSystem) -> CrsRef {
        Self::new(
            props,
            CrsKind::Vertical(VerticalCrs {
                datum,
                cs,
                geoid_model: None,
            }),
        )
    }

    pub fn vertical_with_geoid(
        props: ObjectProps,
        datum: VerticalDatum,
        cs: CoordinateSystem,
        geoid_model: impl Into<String>,
    ) -> CrsRef {
        Self::new(
            props,
            CrsKind::Vertical(VerticalCrs {
                datum,
                cs,
                geoid_model: Some(geoid_model.into()),
            }),
        )
    }

    /// Projected (Cartesian cs) or derived geographic (ellipsoidal cs) CRS.
    pub fn derived(
        props: ObjectProps,
        base: CrsRef,
        conversion: OperationRef,
        cs: CoordinateSystem,
    ) -> CrsRef {
        let conversion = if conversion.has_crs_pair() {
            conversion.without_crs_pair()
        } else {
            conversion
        };
        Self::new(props, CrsKind::Derived(DerivedCrs { base, conversion, cs }))
    }

    pub fn compound(props: ObjectProps, components: Vec<CrsRef>) -> CrsRef {
        Self::new(props, CrsKind::Compound(components))
    }

    /// Wraps `base` with a transformation to `hub`. The name is the base name.
    pub fn bound(base: CrsRef, hub: CrsRef, transformation: OperationRef) -> CrsRef {
        let props = ObjectProps::named(base.name());
        Self::new(
            props,
            CrsKind::Bound(BoundCrs {
                base,
                hub,
                transformation,
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.props.identifiers
    }

    pub fn extent(&self) -> Option<&Extent> {
        match &self.kind {
            CrsKind::Bound(b) if self.props.extent().is_none() => b.base.extent(),
            _ => self.props.extent(),
        }
    }

    pub fn crs_type(&self) -> CrsType {
        match &self.kind {
            CrsKind::Geodetic(g) => {
                if g.cs.kind == CsKind::Cartesian {
                    CrsType::Geocentric
                } else if g.cs.dimension() == 3 {
                    CrsType::Geographic3D
                } else {
                    CrsType::Geographic2D
                }
            }
            CrsKind::Vertical(_) => CrsType::Vertical,
            CrsKind::Derived(d) => {
                if d.cs.kind == CsKind::Ellipsoidal {
                    CrsType::DerivedGeographic
                } else {
                    CrsType::Projected
                }
            }
            CrsKind::Compound(_) => CrsType::Compound,
            CrsKind::Bound(_) => CrsType::Bound,
        }
    }

    pub fn as_geodetic(&self) -> Option<&GeodeticCrs> {
        match &self.kind {
            CrsKind::Geodetic(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_vertical(&self) -> Option<&VerticalCrs> {
        match &self.kind {
            CrsKind::Vertical(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_derived(&self) -> Option<&DerivedCrs> {
        match &self.kind {
            CrsKind::Derived(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_bound(&self) -> Option<&BoundCrs> {
        match &self.kind {
            CrsKind::Bound(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&[CrsRef]> {
        match &self.kind {
            CrsKind::Compound(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(&self.kind, CrsKind::Geodetic(g) if g.cs.kind == CsKind::Ellipsoidal)
    }

    pub fn is_geocentric(&self) -> bool {
        matches!(&self.kind, CrsKind::Geodetic(g) if g.cs.is_geocentric())
    }

    pub fn is_projected(&self) -> bool {
        self.crs_type() == CrsType::Projected
    }

    pub fn coordinate_system(&self) -> Option<&CoordinateSystem> {
        match &self.kind {
            CrsKind::Geodetic(g) => Some(&g.cs),
            CrsKind::Vertical(v) => Some(&v.cs),
            CrsKind::Derived(d) => Some(&d.cs),
            CrsKind::Bound(b) => b.base.coordinate_system(),
            CrsKind::Compound(_) => None,
        }
    }

    pub fn dimension(&self) -> usize {
        match &self.kind {
            CrsKind::Compound(c) => c.iter().map(|c| c.dimension()).sum(),
            _ => self.coordinate_system().map_or(0, CoordinateSystem::dimension),
        }
    }

    /// Geodetic datum of this CRS, looking through derivation, binding and compounding.
    pub fn geodetic_datum(&self) -> Option<&GeodeticDatum> {
        match &self.kind {
            CrsKind::Geodetic(g) => Some(&g.datum),
            CrsKind::Vertical(_) => None,
            CrsKind::Derived(d) => d.base.geodetic_datum(),
            CrsKind::Compound(c) => c.first().and_then(|c| c.geodetic_datum()),
            CrsKind::Bound(b) => b.base.geodetic_datum(),
        }
    }

    pub fn vertical_datum(&self) -> Option<&VerticalDatum> {
        match &self.kind {
            CrsKind::Vertical(v) => Some(&v.datum),
            CrsKind::Compound(c) => c.iter().find_map(|c| c.vertical_datum()),
            CrsKind::Bound(b) => b.base.vertical_datum(),
            _ => None,
        }
    }

    pub fn ellipsoid(&self) -> Option<&Ellipsoid> {
        self.geodetic_datum().map(|d| &d.ellipsoid)
    }

    pub fn vertical_unit(&self) -> Option<UnitOfMeasure> {
        match &self.kind {
            CrsKind::Compound(c) => c.get(1).and_then(|v| v.vertical_unit()),
            _ => self.coordinate_system().and_then(CoordinateSystem::vertical_unit),
        }
    }

    /// Geographic CRS underlying this CRS, if any.
    pub fn extract_geographic(self: &Arc<Self>) -> Option<CrsRef> {
        match &self.kind {
            CrsKind::Geodetic(g) if g.cs.kind == CsKind::Ellipsoidal => Some(Arc::clone(self)),
            CrsKind::Geodetic(_) | CrsKind::Vertical(_) => None,
            CrsKind::Derived(d) => d.base.extract_geographic(),
            CrsKind::Compound(c) => c.first().and_then(|c| c.extract_geographic()),
            CrsKind::Bound(b) => b.base.extract_geographic(),
        }
    }

    /// Geodetic (geographic or geocentric) CRS underlying this CRS, if any.
    pub fn extract_geodetic(self: &Arc<Self>) -> Option<CrsRef> {
        match &self.kind {
            CrsKind::Geodetic(_) => Some(Arc::clone(self)),
            CrsKind::Vertical(_) => None,
            CrsKind::Derived(d) => d.base.extract_geodetic(),
            CrsKind::Compound(c) => c.first().and_then(|c| c.extract_geodetic()),
            CrsKind::Bound(b) => b.base.extract_geodetic(),
        }
    }

    pub fn horizontal_component(&self) -> Option<&CrsRef> {
        self.as_compound().and_then(<[CrsRef]>::first)
    }

    pub fn vertical_component(&self) -> Option<&CrsRef> {
        self.as_compound().and_then(|c| c.get(1))
    }

    /// The defining conversion of a derived CRS, attached to (base, self).
    pub fn derivation(self: &Arc<Self>) -> Option<OperationRef> {
        let d = self.as_derived()?;
        Some(d.conversion.with_crs_pair(CrsPair::new(
            Arc::clone(&d.base),
            Arc::clone(self),
        )))
    }

    /// 2D version of a 3D geographic or projected CRS; other CRS are returned unchanged.
    pub fn demote_to_2d(self: &Arc<Self>) -> CrsRef {
        match &self.kind {
            CrsKind::Geodetic(g) if g.cs.kind == CsKind::Ellipsoidal && g.cs.dimension() == 3 => {
                Crs::geodetic(self.props.clone(), g.datum.clone(), g.cs.demote_to_2d())
            }
            CrsKind::Derived(d) if d.cs.dimension() == 3 => {
                let mut cs = d.cs.clone();
                cs.axes.truncate(2);
                Crs::derived(
                    self.props.clone(),
                    d.base.demote_to_2d(),
                    Arc::clone(&d.conversion),
                    cs,
                )
            }
            CrsKind::Bound(b) => Crs::bound(
                b.base.demote_to_2d(),
                b.hub.demote_to_2d(),
                Arc::clone(&b.transformation),
            ),
            _ => Arc::clone(self),
        }
    }

    /// 3D version (ellipsoidal height in metres) of a 2D geographic or projected CRS.
    pub fn promote_to_3d(self: &Arc<Self>) -> CrsRef {
        match &self.kind {
            CrsKind::Geodetic(g) if g.cs.kind == CsKind::Ellipsoidal && g.cs.dimension() == 2 => {
                let mut props = self.props.clone();
                props.identifiers.clear();
                Crs::geodetic(props, g.datum.clone(), g.cs.promote_to_3d())
            }
            CrsKind::Derived(d) if d.cs.dimension() == 2 => {
                let mut cs = d.cs.clone();
                cs.axes.push(Axis::ellipsoidal_height(crate::common::units::METRE));
                let mut props = self.props.clone();
                props.identifiers.clear();
                Crs::derived(props, d.base.promote_to_3d(), Arc::clone(&d.conversion), cs)
            }
            _ => Arc::clone(self),
        }
    }

    /// Copy of this geodetic CRS with another prime meridian.
    pub fn with_prime_meridian(self: &Arc<Self>, pm: PrimeMeridian) -> CrsRef {
        match &self.kind {
            CrsKind::Geodetic(g) => {
                let mut props =
                    ObjectProps::named(format!("{} (with {} prime meridian)", self.name(), pm.name()));
                let mut datum = g.datum.clone();
                datum.prime_meridian = pm;
                datum.props.identifiers.clear();
                props.domains = self.props.domains.clone();
                Crs::geodetic(props, datum, g.cs.clone())
            }
            _ => Arc::clone(self),
        }
    }

    /// Whether `self` and `other` use the same geodetic datum (ignoring the prime meridian).
    pub fn shares_datum_with(&self, other: &Crs) -> bool {
        match (self.geodetic_datum(), other.geodetic_datum()) {
            (Some(a), Some(b)) => {
                let mut a = a.clone();
                a.prime_meridian = b.prime_meridian.clone();
                a.is_equivalent_to(b, Criterion::Equivalent)
            }
            _ => match (self.vertical_datum(), other.vertical_datum()) {
                (Some(a), Some(b)) => a.is_equivalent_to(b, Criterion::Equivalent),
                _ => false,
            },
        }
    }

    pub fn is_equivalent_to(&self, other: &Crs, criterion: Criterion) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        if criterion.is_strict() && self.props != other.props {
            return false;
        }
        match (&self.kind, &other.kind) {
            (CrsKind::Geodetic(a), CrsKind::Geodetic(b)) => {
                if !a.datum.is_equivalent_to(&b.datum, criterion) {
                    return false;
                }
                a.cs.is_equivalent_to(&b.cs, criterion)
                    || (criterion == Criterion::EquivalentExceptAxisOrderGeogCrs
                        && a.cs.kind == CsKind::Ellipsoidal
                        && a.cs.is_axis_order_reversal_of(&b.cs))
            }
            (CrsKind::Vertical(a), CrsKind::Vertical(b)) => {
                a.datum.is_equivalent_to(&b.datum, criterion) && a.cs.is_equivalent_to(&b.cs, criterion)
            }
            (CrsKind::Derived(a), CrsKind::Derived(b)) => {
                a.base.is_equivalent_to(&b.base, criterion)
                    && a.cs.is_equivalent_to(&b.cs, criterion)
                    && equivalence::is_equivalent_with_ellipsoid(
                        &a.conversion,
                        &b.conversion,
                        criterion,
                        a.base.ellipsoid(),
                    )
            }
            (CrsKind::Compound(a), CrsKind::Compound(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_equivalent_to(y, criterion))
            }
            (CrsKind::Bound(a), CrsKind::Bound(b)) => {
                a.base.is_equivalent_to(&b.base, criterion)
                    && a.hub.is_equivalent_to(&b.hub, criterion)
                    && equivalence::is_equivalent(&a.transformation, &b.transformation, criterion)
            }
            _ => false,
        }
    }
}

/// Loose equivalence used to check chaining between concatenated steps:
/// a shared identifier, structural equivalence, or equivalence of the
/// vertical components when either side is compound.
pub fn are_more_or_less_equivalent(a: &CrsRef, b: &CrsRef) -> bool {
    if Arc::ptr_eq(a, b) {
        return true;
    }
    if a.identifiers().len() == 1
        && b.identifiers().len() == 1
        && a.identifiers()[0] == b.identifiers()[0]
    {
        return true;
    }
    if a.is_equivalent_to(b, Criterion::Equivalent) {
        return true;
    }
    match (a.vertical_component(), b.vertical_component()) {
        (Some(va), None) => va.is_equivalent_to(b, Criterion::Equivalent),
        (None, Some(vb)) => a.is_equivalent_to(vb, Criterion::Equivalent),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::presets;
    use super::*;

    #[test]
    fn test_crs_types() {
        assert_eq!(presets::wgs84().crs_type(), CrsType::Geographic2D);
        assert_eq!(presets::wgs84_3d().crs_type(), CrsType::Geographic3D);
        assert_eq!(presets::wgs84_geocentric().crs_type(), CrsType::Geocentric);
        assert_eq!(presets::egm96_height().crs_type(), CrsType::Vertical);
        assert_eq!(presets::utm_wgs84(31, true).crs_type(), CrsType::Projected);
    }

    #[test]
    fn test_promote_demote_roundtrip() {
        let wgs84 = presets::wgs84();
        let promoted = wgs84.promote_to_3d();
        assert_eq!(promoted.dimension(), 3);
        let demoted = promoted.demote_to_2d();
        assert!(demoted.is_equivalent_to(&wgs84, Criterion::Equivalent));
    }

    #[test]
    fn test_equivalent_ignores_crs_name() {
        let a = presets::wgs84();
        let b = Crs::geodetic(
            ObjectProps::named("GCS_WGS_1984"),
            a.geodetic_datum().unwrap().clone(),
            CoordinateSystem::lat_lon_deg(),
        );
        assert!(a.is_equivalent_to(&b, Criterion::Equivalent));
        assert!(!a.is_equivalent_to(&b, Criterion::Strict));
    }

    #[test]
    fn test_axis_order_criterion() {
        let a = presets::wgs84();
        let b = presets::ogc_crs84();
        assert!(!a.is_equivalent_to(&b, Criterion::Equivalent));
        assert!(a.is_equivalent_to(&b, Criterion::EquivalentExceptAxisOrderGeogCrs));
    }

    #[test]
    fn test_extract_geographic_from_projected() {
        let utm = presets::utm_wgs84(32, true);
        let geog = utm.extract_geographic().unwrap();
        assert_eq!(geog.name(), "WGS 84");
    }

    #[test]
    fn test_derivation_attaches_pair() {
        let utm = presets::utm_wgs84(32, true);
        let conv = utm.derivation().unwrap();
        assert_eq!(conv.source_crs().unwrap().name(), "WGS 84");
        assert_eq!(conv.target_crs().unwrap().name(), utm.name());
    }

    #[test]
    fn test_more_or_less_equivalent_through_compound() {
        let compound = presets::wgs84_egm96();
        let vertical = presets::egm96_height();
        assert!(are_more_or_less_equivalent(&compound, &vertical));
        assert!(!are_more_or_less_equivalent(&presets::wgs84(), &vertical));
        assert!(are_more_or_less_equivalent(&presets::wgs84(), &presets::wgs84()));
    }
}
