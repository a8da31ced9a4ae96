//! A small built-in set of well-known CRS, for tests, benches and the
//! Python bindings.

use crate::common::units::{self, UnitOfMeasure};
use crate::common::{Extent, ObjectProps};
use crate::operation::conversion;

use super::datum::{self, Ellipsoid, GeodeticDatum, PrimeMeridian, VerticalDatum};
use super::{CoordinateSystem, Crs, CrsRef};

fn geodetic_datum(name: &str, code: u32, ellipsoid: Ellipsoid, pm: PrimeMeridian) -> GeodeticDatum {
    GeodeticDatum::new(ObjectProps::named(name).with_epsg(code), ellipsoid, pm)
}

fn wgs84_datum() -> GeodeticDatum {
    geodetic_datum("World Geodetic System 1984", 6326, datum::WGS84, datum::GREENWICH)
}

fn geographic(name: &str, code: u32, datum: GeodeticDatum, extent: Extent) -> CrsRef {
    Crs::geodetic(
        ObjectProps::named(name).with_epsg(code).with_extent(extent),
        datum,
        CoordinateSystem::lat_lon_deg(),
    )
}

fn vertical(name: &str, code: u32, datum_name: &str, datum_code: u32, unit: UnitOfMeasure, extent: Extent) -> CrsRef {
    Crs::vertical(
        ObjectProps::named(name).with_epsg(code).with_extent(extent),
        VerticalDatum::new(ObjectProps::named(datum_name).with_epsg(datum_code)),
        CoordinateSystem::gravity_related_height(unit),
    )
}

pub fn wgs84() -> CrsRef {
    geographic("WGS 84", 4326, wgs84_datum(), Extent::world())
}

pub fn wgs84_3d() -> CrsRef {
    Crs::geodetic(
        ObjectProps::named("WGS 84").with_epsg(4979).with_extent(Extent::world()),
        wgs84_datum(),
        CoordinateSystem::lat_lon_h_deg(),
    )
}

pub fn wgs84_geocentric() -> CrsRef {
    Crs::geocentric(
        ObjectProps::named("WGS 84").with_epsg(4978).with_extent(Extent::world()),
        wgs84_datum(),
    )
}

/// OGC:CRS84, WGS 84 with longitude first.
pub fn ogc_crs84() -> CrsRef {
    Crs::geodetic(
        ObjectProps::named("WGS 84 (CRS84)")
            .with_id(crate::common::Identifier::new("OGC", "CRS84"))
            .with_extent(Extent::world()),
        wgs84_datum(),
        CoordinateSystem::lon_lat_deg(),
    )
}

pub fn utm_wgs84(zone: u32, north: bool) -> CrsRef {
    let hemisphere = if north { 'N' } else { 'S' };
    let code = if north { 32600 + zone } else { 32700 + zone };
    let west = -180.0 + 6.0 * (f64::from(zone) - 1.0);
    let (south, north_lat) = if north { (0.0, 84.0) } else { (-80.0, 0.0) };
    Crs::derived(
        ObjectProps::named(format!("WGS 84 / UTM zone {zone}{hemisphere}"))
            .with_epsg(code)
            .with_extent(Extent::from_bbox(west, south, west + 6.0, north_lat)),
        wgs84(),
        conversion::utm(zone, north),
        CoordinateSystem::easting_northing(units::METRE),
    )
}

pub fn egm96_height() -> CrsRef {
    vertical("EGM96 height", 5773, "EGM96 geoid", 5171, units::METRE, Extent::world())
}

pub fn egm96_height_ft() -> CrsRef {
    vertical("EGM96 height (ft)", 8228, "EGM96 geoid", 5171, units::FOOT, Extent::world())
}

pub fn navd88_height() -> CrsRef {
    vertical(
        "NAVD88 height",
        5703,
        "North American Vertical Datum 1988",
        5103,
        units::METRE,
        Extent::from_bbox(-168.26, 15.56, -51.94, 74.71),
    )
}

/// WGS 84 + EGM96 height.
pub fn wgs84_egm96() -> CrsRef {
    Crs::compound(
        ObjectProps::named("WGS 84 + EGM96 height")
            .with_epsg(9705)
            .with_extent(Extent::world()),
        vec![wgs84(), egm96_height()],
    )
}

pub fn nad27() -> CrsRef {
    geographic(
        "NAD27",
        4267,
        geodetic_datum("North American Datum 1927", 6267, datum::CLARKE_1866, datum::GREENWICH),
        Extent::from_bbox(-172.54, 7.15, -47.74, 83.17),
    )
}

pub fn nad83() -> CrsRef {
    geographic(
        "NAD83",
        4269,
        geodetic_datum("North American Datum 1983", 6269, datum::GRS80, datum::GREENWICH),
        Extent::from_bbox(167.65, 14.92, -40.73, 86.45),
    )
}

pub fn ed50() -> CrsRef {
    geographic(
        "ED50",
        4230,
        geodetic_datum("European Datum 1950", 6230, datum::INTERNATIONAL_1924, datum::GREENWICH),
        Extent::from_bbox(-16.1, 25.71, 48.61, 84.73),
    )
}

pub fn etrs89() -> CrsRef {
    geographic(
        "ETRS89",
        4258,
        geodetic_datum(
            "European Terrestrial Reference System 1989 ensemble",
            6258,
            datum::GRS80,
            datum::GREENWICH,
        ),
        Extent::from_bbox(-16.1, 32.88, 40.18, 84.73),
    )
}

pub fn ntf() -> CrsRef {
    geographic(
        "NTF",
        4275,
        geodetic_datum("Nouvelle Triangulation Francaise", 6275, datum::CLARKE_1880_IGN, datum::GREENWICH),
        Extent::from_bbox(-4.87, 41.31, 9.63, 51.14),
    )
}

/// NTF with the Paris prime meridian. Latitude first, in degrees.
pub fn ntf_paris() -> CrsRef {
    geographic(
        "NTF (Paris)",
        4807,
        geodetic_datum(
            "Nouvelle Triangulation Francaise (Paris)",
            6807,
            datum::CLARKE_1880_IGN,
            datum::PARIS,
        ),
        Extent::from_bbox(-4.87, 41.31, 9.63, 51.14),
    )
}

/// Looks a preset up by `AUTH:CODE` (case-insensitive) or exact name.
pub fn lookup(key: &str) -> Option<CrsRef> {
    let wanted = key.trim();
    all().into_iter().find(|crs| {
        crs.name() == wanted
            || crs
                .identifiers()
                .iter()
                .any(|id| id.to_string().eq_ignore_ascii_case(wanted))
    })
}

/// Every preset, UTM zones excluded except 31N.
pub fn all() -> Vec<CrsRef> {
    vec![
        wgs84(),
        wgs84_3d(),
        wgs84_geocentric(),
        ogc_crs84(),
        utm_wgs84(31, true),
        egm96_height(),
        egm96_height_ft(),
        navd88_height(),
        wgs84_egm96(),
        nad27(),
        nad83(),
        ed50(),
        etrs89(),
        ntf(),
        ntf_paris(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_code_and_name() {
        assert_eq!(lookup("EPSG:4267").unwrap().name(), "NAD27");
        assert_eq!(lookup("epsg:4326").unwrap().name(), "WGS 84");
        assert_eq!(lookup("OGC:CRS84").unwrap().name(), "WGS 84 (CRS84)");
        assert_eq!(lookup("NTF (Paris)").unwrap().identifiers()[0].code, "4807");
        assert!(lookup("EPSG:1").is_none());
    }

    #[test]
    fn test_utm_extent_follows_zone() {
        let crs = utm_wgs84(31, true);
        let bbox = crs.extent().unwrap().bbox.unwrap();
        assert_eq!(bbox.west, 0.0);
        assert_eq!(bbox.east, 6.0);
        assert_eq!(crs.identifiers()[0].code, "32631");
    }
}
