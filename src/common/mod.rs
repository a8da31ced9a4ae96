//! Shared metadata primitives: identifiers, names, units, extents.

pub mod extent;
pub mod units;

pub use extent::{pseudo_area, Extent, GeographicBoundingBox};
pub use units::{Measure, UnitOfMeasure, UnitType};

/// Comparison strictness used by every `is_equivalent_to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Same names, identifiers, parameter order and exact values.
    Strict,
    /// Same meaning: tolerant numeric comparison, name aliases, order-independent parameters.
    Equivalent,
    /// As `Equivalent`, but geographic CRS differing only by axis order also match.
    EquivalentExceptAxisOrderGeogCrs,
}

impl Criterion {
    pub fn is_strict(self) -> bool {
        self == Criterion::Strict
    }
}

/// Authority code attached to an object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub code_space: String,
    pub code: String,
}

impl Identifier {
    pub fn new(code_space: impl Into<String>, code: impl ToString) -> Self {
        Self {
            code_space: code_space.into(),
            code: code.to_string(),
        }
    }

    pub fn epsg(code: u32) -> Self {
        Self::new("EPSG", code)
    }

    pub fn epsg_code(&self) -> Option<u32> {
        if self.code_space.eq_ignore_ascii_case("EPSG") {
            self.code.parse().ok()
        } else {
            None
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.code_space, self.code)
    }
}

/// Scope and extent of use.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectDomain {
    pub scope: Option<String>,
    pub extent: Option<Extent>,
}

/// Name, identifiers and usages common to every identified object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectProps {
    pub name: String,
    pub identifiers: Vec<Identifier>,
    pub domains: Vec<ObjectDomain>,
    pub remarks: Option<String>,
    pub deprecated: bool,
}

impl ObjectProps {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: Identifier) -> Self {
        self.identifiers.push(id);
        self
    }

    pub fn with_epsg(self, code: u32) -> Self {
        self.with_id(Identifier::epsg(code))
    }

    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.domains.push(ObjectDomain {
            scope: None,
            extent: Some(extent),
        });
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        match self.domains.first_mut() {
            Some(d) => d.scope = Some(scope.into()),
            None => self.domains.push(ObjectDomain {
                scope: Some(scope.into()),
                extent: None,
            }),
        }
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }

    /// Extent of the first domain carrying one.
    pub fn extent(&self) -> Option<&Extent> {
        self.domains.iter().find_map(|d| d.extent.as_ref())
    }

    pub fn epsg_code(&self) -> Option<u32> {
        self.identifiers.iter().find_map(Identifier::epsg_code)
    }

    /// Equivalence of two objects' names and (for STRICT) identifiers.
    pub fn is_equivalent_to(&self, other: &ObjectProps, criterion: Criterion) -> bool {
        if criterion.is_strict() {
            return self.name == other.name && self.identifiers == other.identifiers;
        }
        is_equivalent_name(&self.name, &other.name)
    }
}

/// Canonical form of a name: lower-case alphanumerics only.
pub fn canonicalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Case and punctuation insensitive name comparison.
pub fn is_equivalent_name(a: &str, b: &str) -> bool {
    a == b || canonicalize_name(a) == canonicalize_name(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalent_name_ignores_punctuation() {
        assert!(is_equivalent_name("Lambert_Conformal_Conic_1SP", "Lambert Conformal Conic (1SP)"));
        assert!(!is_equivalent_name("WGS 84", "WGS 72"));
    }

    #[test]
    fn test_identifier_epsg_code() {
        assert_eq!(Identifier::epsg(4326).epsg_code(), Some(4326));
        assert_eq!(Identifier::new("IGNF", "LAMB93").epsg_code(), None);
    }
}
