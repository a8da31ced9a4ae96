//! Textual exporters: WKT and PROJ strings.

pub mod proj_string;
pub mod wkt;

pub use proj_string::{to_proj_string, ProjStep, ProjStringFormatter};
pub use wkt::{crs_to_wkt, to_wkt, WktVersion};

/// Shortest decimal form of `v` at 15 significant digits. `-0` is written `0`.
pub(crate) fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if !v.is_finite() {
        return v.to_string();
    }
    let rounded: f64 = format!("{v:.14e}").parse().unwrap_or(v);
    format!("{rounded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(500_000.0), "500000");
        assert_eq!(format_number(0.9996), "0.9996");
        assert_eq!(format_number(std::f64::consts::PI / 180.0), "0.0174532925199433");
        assert_eq!(format_number(298.257_223_563), "298.257223563");
    }
}
