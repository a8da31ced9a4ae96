//! Coordinate systems and axes.

use crate::common::units::{self, UnitOfMeasure, UnitType};
use crate::common::Criterion;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    North,
    South,
    East,
    West,
    Up,
    Down,
    GeocentricX,
    GeocentricY,
    GeocentricZ,
}

impl AxisDirection {
    pub fn wkt_name(self) -> &'static str {
        match self {
            AxisDirection::North => "north",
            AxisDirection::South => "south",
            AxisDirection::East => "east",
            AxisDirection::West => "west",
            AxisDirection::Up => "up",
            AxisDirection::Down => "down",
            AxisDirection::GeocentricX => "geocentricX",
            AxisDirection::GeocentricY => "geocentricY",
            AxisDirection::GeocentricZ => "geocentricZ",
        }
    }

    /// PROJ `axis=` letter.
    pub fn proj_letter(self) -> Option<char> {
        match self {
            AxisDirection::North => Some('n'),
            AxisDirection::South => Some('s'),
            AxisDirection::East => Some('e'),
            AxisDirection::West => Some('w'),
            AxisDirection::Up => Some('u'),
            AxisDirection::Down => Some('d'),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub name: String,
    pub abbreviation: String,
    pub direction: AxisDirection,
    pub unit: UnitOfMeasure,
}

impl Axis {
    pub fn new(
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        direction: AxisDirection,
        unit: UnitOfMeasure,
    ) -> Self {
        Self {
            name: name.into(),
            abbreviation: abbreviation.into(),
            direction,
            unit,
        }
    }

    pub fn latitude(unit: UnitOfMeasure) -> Self {
        Self::new("Geodetic latitude", "Lat", AxisDirection::North, unit)
    }

    pub fn longitude(unit: UnitOfMeasure) -> Self {
        Self::new("Geodetic longitude", "Lon", AxisDirection::East, unit)
    }

    pub fn ellipsoidal_height(unit: UnitOfMeasure) -> Self {
        Self::new("Ellipsoidal height", "h", AxisDirection::Up, unit)
    }

    pub fn easting(unit: UnitOfMeasure) -> Self {
        Self::new("Easting", "E", AxisDirection::East, unit)
    }

    pub fn northing(unit: UnitOfMeasure) -> Self {
        Self::new("Northing", "N", AxisDirection::North, unit)
    }

    pub fn gravity_related_height(unit: UnitOfMeasure) -> Self {
        Self::new("Gravity-related height", "H", AxisDirection::Up, unit)
    }

    pub fn depth(unit: UnitOfMeasure) -> Self {
        Self::new("Depth", "D", AxisDirection::Down, unit)
    }

    pub fn is_equivalent_to(&self, other: &Axis, criterion: Criterion) -> bool {
        if criterion.is_strict() && (self.name != other.name || self.abbreviation != other.abbreviation)
        {
            return false;
        }
        self.direction == other.direction && self.unit.is_equivalent_to(&other.unit, criterion)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CsKind {
    Ellipsoidal,
    Cartesian,
    Vertical,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateSystem {
    pub kind: CsKind,
    pub axes: Vec<Axis>,
}

impl CoordinateSystem {
    pub fn new(kind: CsKind, axes: Vec<Axis>) -> Self {
        Self { kind, axes }
    }

    /// Latitude, longitude in degrees (EPSG:6422).
    pub fn lat_lon_deg() -> Self {
        Self::new(
            CsKind::Ellipsoidal,
            vec![Axis::latitude(units::DEGREE), Axis::longitude(units::DEGREE)],
        )
    }

    pub fn lon_lat_deg() -> Self {
        Self::new(
            CsKind::Ellipsoidal,
            vec![Axis::longitude(units::DEGREE), Axis::latitude(units::DEGREE)],
        )
    }

    /// Latitude, longitude in degrees, ellipsoidal height in metres (EPSG:6423).
    pub fn lat_lon_h_deg() -> Self {
        Self::new(
            CsKind::Ellipsoidal,
            vec![
                Axis::latitude(units::DEGREE),
                Axis::longitude(units::DEGREE),
                Axis::ellipsoidal_height(units::METRE),
            ],
        )
    }

    pub fn geocentric() -> Self {
        Self::new(
            CsKind::Cartesian,
            vec![
                Axis::new("Geocentric X", "X", AxisDirection::GeocentricX, units::METRE),
                Axis::new("Geocentric Y", "Y", AxisDirection::GeocentricY, units::METRE),
                Axis::new("Geocentric Z", "Z", AxisDirection::GeocentricZ, units::METRE),
            ],
        )
    }

    pub fn easting_northing(unit: UnitOfMeasure) -> Self {
        Self::new(
            CsKind::Cartesian,
            vec![Axis::easting(unit.clone()), Axis::northing(unit)],
        )
    }

    pub fn gravity_related_height(unit: UnitOfMeasure) -> Self {
        Self::new(CsKind::Vertical, vec![Axis::gravity_related_height(unit)])
    }

    pub fn depth(unit: UnitOfMeasure) -> Self {
        Self::new(CsKind::Vertical, vec![Axis::depth(unit)])
    }

    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    pub fn is_geocentric(&self) -> bool {
        self.kind == CsKind::Cartesian
            && self.axes.len() == 3
            && self.axes[0].direction == AxisDirection::GeocentricX
    }

    /// Unit of the first axis.
    pub fn primary_unit(&self) -> UnitOfMeasure {
        self.axes
            .first()
            .map(|a| a.unit.clone())
            .unwrap_or(units::NONE)
    }

    pub fn angular_unit(&self) -> Option<UnitOfMeasure> {
        self.axes
            .iter()
            .find(|a| a.unit.unit_type() == UnitType::Angular)
            .map(|a| a.unit.clone())
    }

    /// Unit of the height axis of a 3D ellipsoidal or a vertical system.
    pub fn vertical_unit(&self) -> Option<UnitOfMeasure> {
        match self.kind {
            CsKind::Vertical => self.axes.first().map(|a| a.unit.clone()),
            CsKind::Ellipsoidal => self.axes.get(2).map(|a| a.unit.clone()),
            CsKind::Cartesian => None,
        }
    }

    pub fn is_depth(&self) -> bool {
        self.kind == CsKind::Vertical
            && self.axes.first().map(|a| a.direction) == Some(AxisDirection::Down)
    }

    /// Whether the first axis points north (latitude first / northing first).
    pub fn is_north_first(&self) -> bool {
        matches!(
            self.axes.first().map(|a| a.direction),
            Some(AxisDirection::North) | Some(AxisDirection::South)
        )
    }

    /// Same system with the first two axes swapped.
    pub fn with_swapped_axes(&self) -> Self {
        let mut axes = self.axes.clone();
        if axes.len() >= 2 {
            axes.swap(0, 1);
        }
        Self::new(self.kind, axes)
    }

    pub fn demote_to_2d(&self) -> Self {
        if self.kind == CsKind::Ellipsoidal && self.axes.len() == 3 {
            Self::new(self.kind, self.axes[..2].to_vec())
        } else {
            self.clone()
        }
    }

    pub fn promote_to_3d(&self) -> Self {
        if self.kind == CsKind::Ellipsoidal && self.axes.len() == 2 {
            let mut axes = self.axes.clone();
            axes.push(Axis::ellipsoidal_height(units::METRE));
            Self::new(self.kind, axes)
        } else {
            self.clone()
        }
    }

    /// Two systems differing only by the order of their first two axes.
    pub fn is_axis_order_reversal_of(&self, other: &CoordinateSystem) -> bool {
        self.kind == other.kind
            && self.axes.len() == other.axes.len()
            && self.axes.len() >= 2
            && !self.is_equivalent_to(other, Criterion::Equivalent)
            && self
                .with_swapped_axes()
                .is_equivalent_to(other, Criterion::Equivalent)
    }

    pub fn is_equivalent_to(&self, other: &CoordinateSystem, criterion: Criterion) -> bool {
        self.kind == other.kind
            && self.axes.len() == other.axes.len()
            && self
                .axes
                .iter()
                .zip(&other.axes)
                .all(|(a, b)| a.is_equivalent_to(b, criterion))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_order_reversal() {
        let a = CoordinateSystem::lat_lon_deg();
        let b = CoordinateSystem::lon_lat_deg();
        assert!(a.is_axis_order_reversal_of(&b));
        assert!(!a.is_axis_order_reversal_of(&a));
    }

    #[test]
    fn test_promote_demote() {
        let cs = CoordinateSystem::lat_lon_deg().promote_to_3d();
        assert_eq!(cs.dimension(), 3);
        assert_eq!(cs.vertical_unit(), Some(units::METRE));
        assert!(cs.demote_to_2d().is_equivalent_to(&CoordinateSystem::lat_lon_deg(), Criterion::Strict));
    }

    #[test]
    fn test_depth() {
        assert!(CoordinateSystem::depth(units::METRE).is_depth());
        assert!(!CoordinateSystem::gravity_related_height(units::METRE).is_depth());
    }
}
