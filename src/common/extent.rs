//! Geographic extents (domains of validity) and the ranking pseudo-area.

/// Longitude/latitude bounding box in degrees. `west > east` crosses the antimeridian.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeographicBoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeographicBoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Longitude intervals without antimeridian crossing.
    fn lon_intervals(&self) -> Vec<(f64, f64)> {
        if self.crosses_antimeridian() {
            vec![(self.west, 180.0), (-180.0, self.east)]
        } else {
            vec![(self.west, self.east)]
        }
    }

    fn is_full_longitude(&self) -> bool {
        !self.crosses_antimeridian() && self.west <= -180.0 && self.east >= 180.0
    }

    pub fn contains(&self, other: &GeographicBoundingBox) -> bool {
        if other.south < self.south || other.north > self.north {
            return false;
        }
        if self.is_full_longitude() {
            return true;
        }
        let mine = self.lon_intervals();
        other
            .lon_intervals()
            .iter()
            .all(|&(w, e)| mine.iter().any(|&(mw, me)| mw <= w && me >= e))
    }

    pub fn intersects(&self, other: &GeographicBoundingBox) -> bool {
        if other.south > self.north || other.north < self.south {
            return false;
        }
        let mine = self.lon_intervals();
        other
            .lon_intervals()
            .iter()
            .any(|&(w, e)| mine.iter().any(|&(mw, me)| w <= me && e >= mw))
    }

    pub fn intersection(&self, other: &GeographicBoundingBox) -> Option<GeographicBoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        let south = self.south.max(other.south);
        let north = self.north.min(other.north);
        if self.is_full_longitude() {
            return Some(Self::new(other.west, south, other.east, north));
        }
        if other.is_full_longitude() {
            return Some(Self::new(self.west, south, self.east, north));
        }

        let mut pieces: Vec<(f64, f64)> = Vec::new();
        for &(w, e) in &self.lon_intervals() {
            for &(ow, oe) in &other.lon_intervals() {
                let iw = w.max(ow);
                let ie = e.min(oe);
                if iw <= ie {
                    pieces.push((iw, ie));
                }
            }
        }
        match pieces.as_slice() {
            [] => None,
            [(w, e)] => Some(Self::new(*w, south, *e, north)),
            _ => {
                // Two pieces touching the antimeridian form a crossing box.
                let west = pieces
                    .iter()
                    .filter(|(_, e)| *e >= 180.0)
                    .map(|(w, _)| *w)
                    .fold(f64::NAN, f64::min);
                let east = pieces
                    .iter()
                    .filter(|(w, _)| *w <= -180.0)
                    .map(|(_, e)| *e)
                    .fold(f64::NAN, f64::max);
                if west.is_nan() || east.is_nan() {
                    // Disjoint pieces: keep the widest one.
                    pieces
                        .iter()
                        .max_by(|a, b| (a.1 - a.0).total_cmp(&(b.1 - b.0)))
                        .map(|(w, e)| Self::new(*w, south, *e, north))
                } else {
                    Some(Self::new(west, south, east, north))
                }
            }
        }
    }
}

/// Domain of validity of an object.
#[derive(Clone, Debug, PartialEq)]
pub struct Extent {
    pub description: Option<String>,
    pub bbox: Option<GeographicBoundingBox>,
}

impl Extent {
    pub fn from_bbox(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            description: None,
            bbox: Some(GeographicBoundingBox::new(west, south, east, north)),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn world() -> Self {
        Self {
            description: Some("World".to_string()),
            bbox: Some(GeographicBoundingBox::world()),
        }
    }

    /// An extent without a bounding box contains nothing and is contained by nothing.
    pub fn contains(&self, other: &Extent) -> bool {
        match (&self.bbox, &other.bbox) {
            (Some(a), Some(b)) => a.contains(b),
            _ => false,
        }
    }

    pub fn intersects(&self, other: &Extent) -> bool {
        match (&self.bbox, &other.bbox) {
            (Some(a), Some(b)) => a.intersects(b),
            _ => false,
        }
    }

    pub fn intersection(&self, other: &Extent) -> Option<Extent> {
        match (&self.bbox, &other.bbox) {
            (Some(a), Some(b)) => {
                if a == b {
                    return Some(self.clone());
                }
                a.intersection(b).map(|bbox| Extent {
                    description: None,
                    bbox: Some(bbox),
                })
            }
            _ => None,
        }
    }

    pub fn is_equivalent_to(&self, other: &Extent) -> bool {
        match (&self.bbox, &other.bbox) {
            (Some(a), Some(b)) => {
                (a.west - b.west).abs() < 1e-10
                    && (a.south - b.south).abs() < 1e-10
                    && (a.east - b.east).abs() < 1e-10
                    && (a.north - b.north).abs() < 1e-10
            }
            (None, None) => self.description == other.description,
            _ => false,
        }
    }
}

/// Ranking-only area proxy. Monotonic in the box size; not a geodesic area.
pub fn pseudo_area(extent: &Extent) -> f64 {
    let Some(bbox) = &extent.bbox else {
        return 0.0;
    };
    let w = bbox.west;
    let s = bbox.south;
    let mut e = bbox.east;
    let n = bbox.north;
    if w > e {
        e += 360.0;
    }
    (e - w) * (n.to_radians().sin() - s.to_radians().sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contains_simple() {
        let big = Extent::from_bbox(-10.0, 40.0, 10.0, 55.0);
        let small = Extent::from_bbox(-5.0, 42.0, 5.0, 50.0);
        assert!(big.contains(&small));
        assert!(!small.contains(&big));
    }

    #[test]
    fn test_world_contains_antimeridian_box() {
        let fiji = Extent::from_bbox(175.0, -20.0, -178.0, -15.0);
        assert!(Extent::world().contains(&fiji));
        assert!(fiji.intersects(&Extent::from_bbox(179.0, -18.0, 179.5, -17.0)));
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = Extent::from_bbox(0.0, 0.0, 10.0, 10.0);
        let b = Extent::from_bbox(20.0, 0.0, 30.0, 10.0);
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_intersection_across_antimeridian() {
        let a = Extent::from_bbox(170.0, -30.0, -170.0, 0.0);
        let b = Extent::from_bbox(175.0, -20.0, -175.0, 10.0);
        let i = a.intersection(&b).unwrap().bbox.unwrap();
        assert_relative_eq!(i.west, 175.0);
        assert_relative_eq!(i.east, -175.0);
        assert_relative_eq!(i.south, -20.0);
        assert_relative_eq!(i.north, 0.0);
    }

    #[test]
    fn test_pseudo_area_world() {
        assert_relative_eq!(pseudo_area(&Extent::world()), 720.0, epsilon = 1e-9);
    }

    #[test]
    fn test_pseudo_area_wraps() {
        let a = Extent::from_bbox(170.0, 0.0, -170.0, 30.0);
        let expected = 20.0 * (30.0_f64.to_radians().sin());
        assert_relative_eq!(pseudo_area(&a), expected, epsilon = 1e-12);
    }
}
