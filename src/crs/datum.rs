//! Ellipsoids, prime meridians and datums.

use std::borrow::Cow;

use crate::common::{is_equivalent_name, Criterion, ObjectProps};

/// Reference ellipsoid parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Ellipsoid {
    name: Cow<'static, str>,
    epsg_code: Option<u32>,
    /// Semi-major axis (metres)
    pub a: f64,
    /// Flattening (dimensionless)
    pub f: f64,
    /// Semi-minor axis: a * (1 - f)
    pub b: f64,
    /// First eccentricity squared
    pub e2: f64,
    /// Second eccentricity squared: e^2 / (1 - e^2)
    pub ep2: f64,
    /// Third flattening: f / (2 - f)
    pub n: f64,
}

impl Ellipsoid {
    pub const fn new(name: &'static str, epsg_code: Option<u32>, a: f64, f: f64) -> Self {
        let b = a * (1.0 - f);
        let e2 = 2.0 * f - f * f;
        let ep2 = e2 / (1.0 - e2);
        let n = f / (2.0 - f);
        Self {
            name: Cow::Borrowed(name),
            epsg_code,
            a,
            f,
            b,
            e2,
            ep2,
            n,
        }
    }

    /// Build from semi-major axis and inverse flattening (0 means sphere).
    pub fn from_inverse_flattening(name: impl Into<String>, a: f64, rf: f64) -> Self {
        let f = if rf == 0.0 { 0.0 } else { 1.0 / rf };
        let mut ellps = Self::new("", None, a, f);
        ellps.name = Cow::Owned(name.into());
        ellps
    }

    pub fn sphere(name: impl Into<String>, radius: f64) -> Self {
        Self::from_inverse_flattening(name, radius, 0.0)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn epsg_code(&self) -> Option<u32> {
        self.epsg_code
    }

    /// Get the first eccentricity (computed at runtime).
    pub fn eccentricity(&self) -> f64 {
        self.e2.sqrt()
    }

    pub fn inverse_flattening(&self) -> f64 {
        if self.f == 0.0 {
            0.0
        } else {
            1.0 / self.f
        }
    }

    pub fn is_sphere(&self) -> bool {
        self.f == 0.0
    }

    /// PROJ `+ellps=` name for well-known ellipsoids.
    pub fn proj_ellps_name(&self) -> Option<&'static str> {
        const KNOWN: &[(f64, f64, &str)] = &[
            (6_378_137.0, 298.257_223_563, "WGS84"),
            (6_378_137.0, 298.257_222_101, "GRS80"),
            (6_378_206.4, 294.978_698_213_898, "clrk66"),
            (6_378_388.0, 297.0, "intl"),
            (6_377_397.155, 299.152_812_8, "bessel"),
            (6_377_563.396, 299.324_964_6, "airy"),
            (6_378_249.2, 293.466_021_293_627, "clrk80ign"),
        ];
        let rf = self.inverse_flattening();
        KNOWN
            .iter()
            .find(|(a, known_rf, _)| {
                (a - self.a).abs() < 1e-4 && (known_rf - rf).abs() < 1e-10 * known_rf
            })
            .map(|(_, _, n)| *n)
    }

    pub fn is_equivalent_to(&self, other: &Ellipsoid, criterion: Criterion) -> bool {
        if criterion.is_strict() && self.name != other.name {
            return false;
        }
        (self.a - other.a).abs() <= 1e-10 * self.a.abs()
            && (self.b - other.b).abs() <= 1e-10 * self.b.abs()
    }
}

pub const WGS84: Ellipsoid = Ellipsoid::new("WGS 84", Some(7030), 6_378_137.0, 1.0 / 298.257_223_563);
pub const GRS80: Ellipsoid = Ellipsoid::new("GRS 1980", Some(7019), 6_378_137.0, 1.0 / 298.257_222_101);
pub const CLARKE_1866: Ellipsoid =
    Ellipsoid::new("Clarke 1866", Some(7008), 6_378_206.4, 1.0 / 294.978_698_213_898);
pub const CLARKE_1880_IGN: Ellipsoid =
    Ellipsoid::new("Clarke 1880 (IGN)", Some(7011), 6_378_249.2, 1.0 / 293.466_021_293_627);
pub const INTERNATIONAL_1924: Ellipsoid =
    Ellipsoid::new("International 1924", Some(7022), 6_378_388.0, 1.0 / 297.0);
pub const BESSEL_1841: Ellipsoid =
    Ellipsoid::new("Bessel 1841", Some(7004), 6_377_397.155, 1.0 / 299.152_812_8);
pub const AIRY_1830: Ellipsoid =
    Ellipsoid::new("Airy 1830", Some(7001), 6_377_563.396, 1.0 / 299.324_964_6);

#[derive(Clone, Debug, PartialEq)]
pub struct PrimeMeridian {
    name: Cow<'static, str>,
    epsg_code: Option<u32>,
    /// Longitude from Greenwich, in degrees.
    pub longitude: f64,
}

impl PrimeMeridian {
    pub const fn new(name: &'static str, epsg_code: Option<u32>, longitude: f64) -> Self {
        Self {
            name: Cow::Borrowed(name),
            epsg_code,
            longitude,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn epsg_code(&self) -> Option<u32> {
        self.epsg_code
    }

    pub fn is_equivalent_to(&self, other: &PrimeMeridian, criterion: Criterion) -> bool {
        if criterion.is_strict() && self.name != other.name {
            return false;
        }
        (self.longitude - other.longitude).abs() <= 1e-10 * self.longitude.abs().max(1.0)
    }
}

pub const GREENWICH: PrimeMeridian = PrimeMeridian::new("Greenwich", Some(8901), 0.0);
pub const PARIS: PrimeMeridian = PrimeMeridian::new("Paris", Some(8903), 2.337_229_166_666_667);

#[derive(Clone, Debug, PartialEq)]
pub struct GeodeticDatum {
    pub props: ObjectProps,
    pub ellipsoid: Ellipsoid,
    pub prime_meridian: PrimeMeridian,
}

impl GeodeticDatum {
    pub fn new(props: ObjectProps, ellipsoid: Ellipsoid, prime_meridian: PrimeMeridian) -> Self {
        Self {
            props,
            ellipsoid,
            prime_meridian,
        }
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn is_equivalent_to(&self, other: &GeodeticDatum, criterion: Criterion) -> bool {
        if criterion.is_strict() {
            return self == other;
        }
        datum_names_match(&self.props, &other.props)
            && self.ellipsoid.is_equivalent_to(&other.ellipsoid, criterion)
            && self.prime_meridian.is_equivalent_to(&other.prime_meridian, criterion)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VerticalDatum {
    pub props: ObjectProps,
}

impl VerticalDatum {
    pub fn new(props: ObjectProps) -> Self {
        Self { props }
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn is_equivalent_to(&self, other: &VerticalDatum, criterion: Criterion) -> bool {
        if criterion.is_strict() {
            return self == other;
        }
        datum_names_match(&self.props, &other.props)
    }
}

/// Datums match when they share an identifier, or have equivalent names.
/// The placeholder name "unknown" matches nothing but itself.
fn datum_names_match(a: &ObjectProps, b: &ObjectProps) -> bool {
    if a.identifiers.iter().any(|id| b.identifiers.contains(id)) {
        return true;
    }
    if !a.identifiers.is_empty()
        && !b.identifiers.is_empty()
        && a.identifiers.iter().all(|ida| {
            b.identifiers
                .iter()
                .any(|idb| ida.code_space == idb.code_space && ida.code != idb.code)
        })
    {
        return false;
    }
    is_equivalent_name(&a.name, &b.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wgs84_constants() {
        assert_relative_eq!(WGS84.a, 6_378_137.0);
        assert_relative_eq!(WGS84.b, 6_356_752.314_245_179, epsilon = 0.001);
        assert_relative_eq!(WGS84.eccentricity(), 0.081_819_190_842_622, epsilon = 1e-12);
        assert_relative_eq!(WGS84.n, 0.001_679_220_386_383_705, epsilon = 1e-12);
    }

    #[test]
    fn test_grs80_close_to_wgs84() {
        assert_relative_eq!(WGS84.a, GRS80.a);
        assert!((WGS84.f - GRS80.f).abs() < 1e-8);
        assert!(!WGS84.is_equivalent_to(&GRS80, Criterion::Equivalent));
    }

    #[test]
    fn test_proj_ellps_name() {
        assert_eq!(WGS84.proj_ellps_name(), Some("WGS84"));
        assert_eq!(CLARKE_1866.proj_ellps_name(), Some("clrk66"));
        assert_eq!(Ellipsoid::sphere("Sphere", 6_371_000.0).proj_ellps_name(), None);
    }

    #[test]
    fn test_datum_equivalence_by_id() {
        let a = GeodeticDatum::new(
            ObjectProps::named("World Geodetic System 1984").with_epsg(6326),
            WGS84,
            GREENWICH,
        );
        let b = GeodeticDatum::new(ObjectProps::named("WGS_1984").with_epsg(6326), WGS84, GREENWICH);
        assert!(a.is_equivalent_to(&b, Criterion::Equivalent));
        assert!(!a.is_equivalent_to(&b, Criterion::Strict));
    }
}
