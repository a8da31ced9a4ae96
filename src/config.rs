//! Resolution settings loaded from TOML.
//!
//! Settings live in a standalone `coordop.toml`, either at the top level or
//! under an `[operations]` table:
//!
//! ```toml
//! [operations]
//! area-of-interest = { west = -10.0, south = 40.0, east = 10.0, north = 55.0 }
//! desired-accuracy = 1.0
//! allow-ballpark = true
//! source-and-target-extent-use = "smallest"
//! spatial-criterion = "strict-containment"
//! grid-availability = "use-for-sorting"
//! intermediate-crs-use = "if-no-direct"
//! intermediate-crs = [["EPSG", "4326"]]
//! discard-superseded = true
//! use-proj-alternative-grid-names = true
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::common::{Extent, Identifier};
use crate::error::ConfigError;
use crate::factory::{
    CoordinateOperationContext, GridAvailabilityUse, IntermediateCrsUse, SourceTargetExtentUse,
    SpatialCriterion,
};
use crate::registry::AuthorityFactory;

pub const CONFIG_FILE_NAME: &str = "coordop.toml";

const KNOWN_KEYS: &[&str] = &[
    "area-of-interest",
    "desired-accuracy",
    "allow-ballpark",
    "source-and-target-extent-use",
    "spatial-criterion",
    "grid-availability",
    "intermediate-crs-use",
    "intermediate-crs",
    "discard-superseded",
    "use-proj-alternative-grid-names",
];

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Resolution settings, with the defaults of [`CoordinateOperationContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    /// File the settings were read from.
    pub source: Option<PathBuf>,
    pub area_of_interest: Option<AreaOfInterest>,
    /// Metres; 0 means no ceiling.
    pub desired_accuracy: f64,
    pub allow_ballpark: bool,
    pub extent_use: SourceTargetExtentUse,
    pub spatial_criterion: SpatialCriterion,
    pub grid_availability: GridAvailabilityUse,
    pub intermediate_crs_use: IntermediateCrsUse,
    pub intermediate_crs: Vec<Identifier>,
    pub discard_superseded: bool,
    pub use_alternative_grid_names: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            source: None,
            area_of_interest: None,
            desired_accuracy: 0.0,
            allow_ballpark: true,
            extent_use: SourceTargetExtentUse::default(),
            spatial_criterion: SpatialCriterion::default(),
            grid_availability: GridAvailabilityUse::default(),
            intermediate_crs_use: IntermediateCrsUse::default(),
            intermediate_crs: Vec::new(),
            discard_superseded: true,
            use_alternative_grid_names: true,
        }
    }
}

/// Settings as deserialized; absent keys keep their default.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    area_of_interest: Option<AreaOfInterest>,
    desired_accuracy: Option<f64>,
    allow_ballpark: Option<bool>,
    source_and_target_extent_use: Option<SourceTargetExtentUse>,
    spatial_criterion: Option<SpatialCriterion>,
    grid_availability: Option<GridAvailabilityUse>,
    intermediate_crs_use: Option<IntermediateCrsUse>,
    intermediate_crs: Option<Vec<Vec<String>>>,
    discard_superseded: Option<bool>,
    use_proj_alternative_grid_names: Option<bool>,
}

impl ContextConfig {
    /// Reads `coordop.toml` from `directory`, or returns the defaults when
    /// there is none.
    pub fn load(directory: &Path) -> Result<Self, ConfigError> {
        let path = directory.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.source = Some(path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut table: toml::Table = toml::from_str(content)?;
        let settings = match table.remove("operations") {
            Some(toml::Value::Table(t)) => t,
            Some(_) => {
                return Err(ConfigError::InvalidValue(
                    "[operations] must be a table".to_string(),
                ))
            }
            None => table,
        };
        for key in settings.keys() {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                tracing::warn!(key = key.as_str(), "unknown configuration key ignored");
            }
        }
        let raw: RawConfig = toml::Value::Table(settings).try_into()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        if let Some(area) = &raw.area_of_interest {
            if area.south > area.north || !(-90.0..=90.0).contains(&area.south) || !(-90.0..=90.0).contains(&area.north)
            {
                return Err(ConfigError::InvalidValue(format!(
                    "area-of-interest latitudes out of order or range: south={} north={}",
                    area.south, area.north
                )));
            }
        }
        let desired_accuracy = match raw.desired_accuracy {
            Some(v) if v < 0.0 || !v.is_finite() => {
                tracing::warn!(value = v, "negative desired-accuracy ignored");
                defaults.desired_accuracy
            }
            Some(v) => v,
            None => defaults.desired_accuracy,
        };
        let mut intermediate_crs = Vec::new();
        for entry in raw.intermediate_crs.unwrap_or_default() {
            match entry.as_slice() {
                [auth, code] => intermediate_crs.push(Identifier::new(auth.as_str(), code)),
                _ => tracing::warn!(?entry, "intermediate-crs entry is not [authority, code], ignored"),
            }
        }
        Ok(Self {
            source: None,
            area_of_interest: raw.area_of_interest,
            desired_accuracy,
            allow_ballpark: raw.allow_ballpark.unwrap_or(defaults.allow_ballpark),
            extent_use: raw.source_and_target_extent_use.unwrap_or(defaults.extent_use),
            spatial_criterion: raw.spatial_criterion.unwrap_or(defaults.spatial_criterion),
            grid_availability: raw.grid_availability.unwrap_or(defaults.grid_availability),
            intermediate_crs_use: raw.intermediate_crs_use.unwrap_or(defaults.intermediate_crs_use),
            intermediate_crs,
            discard_superseded: raw.discard_superseded.unwrap_or(defaults.discard_superseded),
            use_alternative_grid_names: raw
                .use_proj_alternative_grid_names
                .unwrap_or(defaults.use_alternative_grid_names),
        })
    }

    pub fn into_context(self, registry: Option<Arc<dyn AuthorityFactory>>) -> CoordinateOperationContext {
        let mut ctx = CoordinateOperationContext::new(registry)
            .with_desired_accuracy(self.desired_accuracy)
            .with_allow_ballpark(self.allow_ballpark)
            .with_extent_use(self.extent_use)
            .with_spatial_criterion(self.spatial_criterion)
            .with_grid_availability(self.grid_availability)
            .with_intermediate_crs_use(self.intermediate_crs_use)
            .with_intermediate_crs(self.intermediate_crs)
            .with_discard_superseded(self.discard_superseded)
            .with_alternative_grid_names(self.use_alternative_grid_names);
        if let Some(a) = self.area_of_interest {
            ctx = ctx.with_area_of_interest(Extent::from_bbox(a.west, a.south, a.east, a.north));
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ContextConfig::load(dir.path()).unwrap();
        assert_eq!(config, ContextConfig::default());
        assert!(config.source.is_none());
    }

    #[test]
    fn test_operations_table() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            r#"
[operations]
area-of-interest = { west = -10.0, south = 40.0, east = 10.0, north = 55.0 }
desired-accuracy = 1.0
allow-ballpark = false
source-and-target-extent-use = "intersection"
spatial-criterion = "partial-intersection"
grid-availability = "discard-if-missing"
intermediate-crs-use = "never"
intermediate-crs = [["EPSG", "4326"]]
discard-superseded = false
use-proj-alternative-grid-names = false
"#,
        )
        .unwrap();
        let config = ContextConfig::load(dir.path()).unwrap();
        assert_eq!(config.source, Some(dir.path().join(CONFIG_FILE_NAME)));
        assert_relative_eq!(config.desired_accuracy, 1.0);
        assert!(!config.allow_ballpark);
        assert_eq!(config.extent_use, SourceTargetExtentUse::Intersection);
        assert_eq!(config.spatial_criterion, SpatialCriterion::PartialIntersection);
        assert_eq!(config.grid_availability, GridAvailabilityUse::DiscardIfMissing);
        assert_eq!(config.intermediate_crs_use, IntermediateCrsUse::Never);
        assert_eq!(config.intermediate_crs, vec![Identifier::epsg(4326)]);

        let ctx = config.into_context(None);
        assert!(!ctx.allow_ballpark());
        assert!(!ctx.discard_superseded());
        assert!(!ctx.use_alternative_grid_names());
        let bbox = ctx.area_of_interest().and_then(|e| e.bbox.clone()).unwrap();
        assert_relative_eq!(bbox.west, -10.0);
        assert_relative_eq!(bbox.north, 55.0);
    }

    #[test]
    fn test_top_level_keys_and_ignored_values() {
        let config = ContextConfig::from_toml_str(
            r#"
desired-accuracy = -3.0
intermediate-crs = [["EPSG"], ["EPSG", "4258"]]
unknown-key = 1
"#,
        )
        .unwrap();
        assert_eq!(config.desired_accuracy, 0.0);
        assert_eq!(config.intermediate_crs, vec![Identifier::epsg(4258)]);
        assert!(config.allow_ballpark);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ContextConfig::from_toml_str("spatial-criterion = \"sideways\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            ContextConfig::from_toml_str(
                "area-of-interest = { west = 0.0, south = 50.0, east = 1.0, north = 40.0 }"
            ),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            ContextConfig::from_toml_str("operations = 3"),
            Err(ConfigError::InvalidValue(_))
        ));
    }
}
