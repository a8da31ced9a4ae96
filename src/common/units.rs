//! Units of measure and measured values.

use std::borrow::Cow;
use std::fmt;

use super::Criterion;

/// Physical nature of a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitType {
    Angular,
    Linear,
    Scale,
    Time,
    Parametric,
    None,
}

#[derive(Clone, Debug)]
pub struct UnitOfMeasure {
    name: Cow<'static, str>,
    to_si: f64,
    unit_type: UnitType,
    epsg_code: Option<u32>,
}

impl UnitOfMeasure {
    pub const fn new_const(
        name: &'static str,
        to_si: f64,
        unit_type: UnitType,
        epsg_code: Option<u32>,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            to_si,
            unit_type,
            epsg_code,
        }
    }

    pub fn new(name: impl Into<String>, to_si: f64, unit_type: UnitType) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            to_si,
            unit_type,
            epsg_code: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conversion_to_si(&self) -> f64 {
        self.to_si
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    pub fn epsg_code(&self) -> Option<u32> {
        self.epsg_code
    }

    /// Short unit name understood by PROJ `unitconvert`, if any.
    pub fn proj_name(&self) -> Option<&'static str> {
        let known: &[(&UnitOfMeasure, &'static str)] = &[
            (&METRE, "m"),
            (&FOOT, "ft"),
            (&US_SURVEY_FOOT, "us-ft"),
            (&DEGREE, "deg"),
            (&RADIAN, "rad"),
            (&GRAD, "grad"),
        ];
        known
            .iter()
            .find(|(u, _)| u.unit_type == self.unit_type && same_factor(u.to_si, self.to_si))
            .map(|(_, n)| *n)
    }

    /// WKT2 keyword for this unit type.
    pub fn wkt2_keyword(&self) -> &'static str {
        match self.unit_type {
            UnitType::Angular => "ANGLEUNIT",
            UnitType::Linear => "LENGTHUNIT",
            UnitType::Scale => "SCALEUNIT",
            UnitType::Time => "TIMEUNIT",
            UnitType::Parametric => "PARAMETRICUNIT",
            UnitType::None => "UNIT",
        }
    }

    pub fn is_equivalent_to(&self, other: &UnitOfMeasure, criterion: Criterion) -> bool {
        if criterion == Criterion::Strict {
            return self == other;
        }
        self.unit_type == other.unit_type && same_factor(self.to_si, other.to_si)
    }
}

impl PartialEq for UnitOfMeasure {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.to_si == other.to_si && self.unit_type == other.unit_type
    }
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn same_factor(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-10 * a.abs()
}

pub const NONE: UnitOfMeasure = UnitOfMeasure::new_const("", 1.0, UnitType::None, None);
pub const METRE: UnitOfMeasure =
    UnitOfMeasure::new_const("metre", 1.0, UnitType::Linear, Some(9001));
pub const FOOT: UnitOfMeasure =
    UnitOfMeasure::new_const("foot", 0.3048, UnitType::Linear, Some(9002));
pub const US_SURVEY_FOOT: UnitOfMeasure = UnitOfMeasure::new_const(
    "US survey foot",
    0.304_800_609_601_219_2,
    UnitType::Linear,
    Some(9003),
);
pub const DEGREE: UnitOfMeasure = UnitOfMeasure::new_const(
    "degree",
    0.017_453_292_519_943_295,
    UnitType::Angular,
    Some(9122),
);
pub const RADIAN: UnitOfMeasure =
    UnitOfMeasure::new_const("radian", 1.0, UnitType::Angular, Some(9101));
pub const GRAD: UnitOfMeasure = UnitOfMeasure::new_const(
    "grad",
    0.015_707_963_267_948_967,
    UnitType::Angular,
    Some(9105),
);
pub const ARC_SECOND: UnitOfMeasure = UnitOfMeasure::new_const(
    "arc-second",
    4.848_136_811_095_36e-6,
    UnitType::Angular,
    Some(9104),
);
pub const SCALE_UNITY: UnitOfMeasure =
    UnitOfMeasure::new_const("unity", 1.0, UnitType::Scale, Some(9201));
pub const PARTS_PER_MILLION: UnitOfMeasure =
    UnitOfMeasure::new_const("parts per million", 1e-6, UnitType::Scale, Some(9202));
pub const YEAR: UnitOfMeasure =
    UnitOfMeasure::new_const("year", 31_556_925.445, UnitType::Time, Some(1029));
pub const METRE_PER_YEAR: UnitOfMeasure = UnitOfMeasure::new_const(
    "metres per year",
    1.0 / 31_556_925.445,
    UnitType::Linear,
    Some(1042),
);
pub const ARC_SECOND_PER_YEAR: UnitOfMeasure = UnitOfMeasure::new_const(
    "arc-seconds per year",
    4.848_136_811_095_36e-6 / 31_556_925.445,
    UnitType::Angular,
    Some(1043),
);
pub const PPM_PER_YEAR: UnitOfMeasure = UnitOfMeasure::new_const(
    "parts per million per year",
    1e-6 / 31_556_925.445,
    UnitType::Scale,
    Some(1036),
);

/// A numeric value with its unit.
#[derive(Clone, Debug, PartialEq)]
pub struct Measure {
    value: f64,
    unit: UnitOfMeasure,
}

impl Measure {
    pub fn new(value: f64, unit: UnitOfMeasure) -> Self {
        Self { value, unit }
    }

    pub fn degrees(value: f64) -> Self {
        Self::new(value, DEGREE)
    }

    pub fn metres(value: f64) -> Self {
        Self::new(value, METRE)
    }

    pub fn unity(value: f64) -> Self {
        Self::new(value, SCALE_UNITY)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &UnitOfMeasure {
        &self.unit
    }

    pub fn si_value(&self) -> f64 {
        self.value * self.unit.to_si
    }

    pub fn convert_to(&self, unit: &UnitOfMeasure) -> f64 {
        if self.unit == *unit {
            return self.value;
        }
        self.si_value() / unit.to_si
    }

    pub fn negated(&self) -> Self {
        Self::new(negate(self.value), self.unit.clone())
    }

    /// Compare with `max_relative_error` applied to SI values under
    /// [`Criterion::Equivalent`]; exact comparison under [`Criterion::Strict`].
    pub fn is_equivalent_to(
        &self,
        other: &Measure,
        criterion: Criterion,
        max_relative_error: f64,
    ) -> bool {
        if criterion == Criterion::Strict {
            return self == other;
        }
        let a = self.si_value();
        let b = other.si_value();
        (a - b).abs() <= max_relative_error * a.abs()
    }
}

/// Negation that never produces a negative zero.
pub fn negate(v: f64) -> f64 {
    if v != 0.0 {
        -v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_convert_degree_to_radian() {
        let m = Measure::degrees(180.0);
        assert_relative_eq!(m.convert_to(&RADIAN), std::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn test_equivalent_tolerance() {
        let a = Measure::metres(1000.0);
        let b = Measure::new(1000.0 / 0.3048, FOOT);
        assert!(a.is_equivalent_to(&b, Criterion::Equivalent, 1e-10));
        assert!(!a.is_equivalent_to(&b, Criterion::Strict, 1e-10));
    }

    #[test]
    fn test_negate_zero_is_positive() {
        assert!(negate(0.0).is_sign_positive());
        assert_eq!(negate(2.5), -2.5);
    }

    #[test]
    fn test_proj_unit_names() {
        assert_eq!(METRE.proj_name(), Some("m"));
        assert_eq!(US_SURVEY_FOOT.proj_name(), Some("us-ft"));
        assert_eq!(ARC_SECOND.proj_name(), None);
    }
}
