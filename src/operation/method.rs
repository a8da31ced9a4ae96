//! Operation methods, parameters and parameter values.

use std::fmt;

use crate::common::units::{self, UnitOfMeasure, UnitType};
use crate::common::{Criterion, Measure, ObjectProps};

#[derive(Clone, Debug, PartialEq)]
pub struct OperationParameter {
    pub props: ObjectProps,
}

impl OperationParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            props: ObjectProps::named(name),
        }
    }

    pub fn epsg(name: impl Into<String>, code: u32) -> Self {
        Self {
            props: ObjectProps::named(name).with_epsg(code),
        }
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn epsg_code(&self) -> Option<u32> {
        self.props.epsg_code()
    }
}

/// Tagged value of a parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    Measure(Measure),
    String(String),
    Filename(String),
    Integer(i64),
    Boolean(bool),
}

impl ParameterValue {
    pub fn as_measure(&self) -> Option<&Measure> {
        match self {
            ParameterValue::Measure(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_filename(&self) -> Option<&str> {
        match self {
            ParameterValue::Filename(f) => Some(f),
            _ => None,
        }
    }

    /// Value comparison. Measures use `2e-10` relative tolerance under
    /// [`Criterion::Equivalent`].
    pub fn is_equivalent_to(&self, other: &ParameterValue, criterion: Criterion) -> bool {
        match (self, other) {
            (ParameterValue::Measure(a), ParameterValue::Measure(b)) => {
                a.is_equivalent_to(b, criterion, 2e-10)
            }
            _ => self == other,
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Measure(m) => write!(f, "{} {}", m.value(), m.unit()),
            ParameterValue::String(s) | ParameterValue::Filename(s) => write!(f, "{s}"),
            ParameterValue::Integer(i) => write!(f, "{i}"),
            ParameterValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperationParameterValue {
    pub parameter: OperationParameter,
    pub value: ParameterValue,
}

impl OperationParameterValue {
    pub fn new(parameter: OperationParameter, value: ParameterValue) -> Self {
        Self { parameter, value }
    }

    pub fn measure(name: &str, code: u32, measure: Measure) -> Self {
        Self::new(OperationParameter::epsg(name, code), ParameterValue::Measure(measure))
    }

    pub fn filename(name: &str, code: u32, filename: impl Into<String>) -> Self {
        Self::new(
            OperationParameter::epsg(name, code),
            ParameterValue::Filename(filename.into()),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OperationMethod {
    pub props: ObjectProps,
    pub parameters: Vec<OperationParameter>,
}

impl OperationMethod {
    pub fn new(props: ObjectProps, parameters: Vec<OperationParameter>) -> Self {
        Self { props, parameters }
    }

    pub fn epsg(name: &str, code: u32, parameters: Vec<OperationParameter>) -> Self {
        Self::new(ObjectProps::named(name).with_epsg(code), parameters)
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn epsg_code(&self) -> Option<u32> {
        self.props.epsg_code()
    }
}

/// Method and ordered parameter values of a conversion or transformation.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleOperation {
    pub method: OperationMethod,
    pub values: Vec<OperationParameterValue>,
}

impl SingleOperation {
    /// Fails when the method's parameter definitions and the values differ in count.
    pub fn new(
        method: OperationMethod,
        values: Vec<OperationParameterValue>,
    ) -> Result<Self, crate::error::OperationError> {
        if method.parameters.len() != values.len() {
            return Err(crate::error::OperationError::InvalidOperation(format!(
                "Inconsistent number of parameters and parameter values for method {}: {} vs {}",
                method.name(),
                method.parameters.len(),
                values.len()
            )));
        }
        Ok(Self { method, values })
    }

    /// Build method and values from `(parameter, value)` pairs.
    pub fn from_pairs(method_props: ObjectProps, values: Vec<OperationParameterValue>) -> Self {
        let parameters = values.iter().map(|v| v.parameter.clone()).collect();
        Self {
            method: OperationMethod::new(method_props, parameters),
            values,
        }
    }

    pub fn method_epsg_code(&self) -> Option<u32> {
        self.method.epsg_code()
    }

    /// Value of the parameter with this EPSG code, falling back to an
    /// equivalent name.
    pub fn parameter_value(&self, code: u32, name: &str) -> Option<&ParameterValue> {
        self.values
            .iter()
            .find(|v| v.parameter.epsg_code() == Some(code))
            .or_else(|| {
                self.values.iter().find(|v| {
                    v.parameter.epsg_code().is_none()
                        && crate::common::is_equivalent_name(v.parameter.name(), name)
                })
            })
            .map(|v| &v.value)
    }

    pub fn parameter_measure(&self, code: u32) -> Option<&Measure> {
        self.values
            .iter()
            .find(|v| v.parameter.epsg_code() == Some(code))
            .and_then(|v| v.value.as_measure())
    }

    /// Parameter value converted to `unit`.
    pub fn parameter_in(&self, code: u32, unit: &UnitOfMeasure) -> Option<f64> {
        self.parameter_measure(code).map(|m| m.convert_to(unit))
    }

    /// Numeric parameter converted to SI (metres, radians, unity).
    pub fn parameter_si(&self, code: u32) -> Option<f64> {
        self.parameter_measure(code).map(Measure::si_value)
    }

    pub fn parameter_degrees(&self, code: u32) -> Option<f64> {
        self.parameter_in(code, &units::DEGREE)
    }

    pub fn parameter_filename(&self, code: u32) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.parameter.epsg_code() == Some(code))
            .and_then(|v| v.value.as_filename())
    }

    /// All filenames referenced by parameters.
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.values.iter().filter_map(|v| v.value.as_filename())
    }

    /// Copy with every numeric value of the listed parameters negated.
    pub fn negated(&self, codes: &[u32]) -> Self {
        let mut out = self.clone();
        for v in &mut out.values {
            let negated = match (v.parameter.epsg_code(), &v.value) {
                (Some(code), ParameterValue::Measure(m)) if codes.contains(&code) => m.negated(),
                _ => continue,
            };
            v.value = ParameterValue::Measure(negated);
        }
        out
    }
}

/// Neutral value of a missing parameter: 1 for scales, 0 otherwise.
pub fn is_neutral_value(value: &ParameterValue) -> bool {
    match value {
        ParameterValue::Measure(m) => {
            if m.unit().unit_type() == UnitType::Scale {
                m.value() == 1.0
            } else {
                m.value() == 0.0
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::constants::*;

    #[test]
    fn test_count_mismatch_is_error() {
        let method = OperationMethod::epsg(
            EPSG_NAME_METHOD_VERTICAL_OFFSET,
            EPSG_CODE_METHOD_VERTICAL_OFFSET,
            vec![OperationParameter::epsg(
                EPSG_NAME_PARAMETER_VERTICAL_OFFSET,
                EPSG_CODE_PARAMETER_VERTICAL_OFFSET,
            )],
        );
        assert!(SingleOperation::new(method, vec![]).is_err());
    }

    #[test]
    fn test_parameter_lookup_by_code_then_name() {
        let op = SingleOperation::from_pairs(
            ObjectProps::named("dummy"),
            vec![
                OperationParameterValue::measure(
                    EPSG_NAME_PARAMETER_FALSE_EASTING,
                    EPSG_CODE_PARAMETER_FALSE_EASTING,
                    Measure::metres(500_000.0),
                ),
                OperationParameterValue::new(
                    OperationParameter::new("false_northing"),
                    ParameterValue::Measure(Measure::new(1000.0, units::FOOT)),
                ),
            ],
        );
        assert_eq!(op.parameter_si(EPSG_CODE_PARAMETER_FALSE_EASTING), Some(500_000.0));
        let fn_value = op
            .parameter_value(EPSG_CODE_PARAMETER_FALSE_NORTHING, EPSG_NAME_PARAMETER_FALSE_NORTHING)
            .and_then(ParameterValue::as_measure)
            .map(Measure::si_value)
            .unwrap();
        approx::assert_relative_eq!(fn_value, 304.8, epsilon = 1e-9);
    }

    #[test]
    fn test_neutral_values() {
        assert!(is_neutral_value(&ParameterValue::Measure(Measure::unity(1.0))));
        assert!(is_neutral_value(&ParameterValue::Measure(Measure::metres(0.0))));
        assert!(!is_neutral_value(&ParameterValue::Measure(Measure::degrees(1.0))));
    }
}
