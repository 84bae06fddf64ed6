use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::drivers::summary::{HorizonProperty, SummaryMethod};
use crate::error::ValuError;
use crate::soil::RestrictionKind;

/// Depth range in centimeters, `[top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthBand {
    pub top: f64,
    pub bottom: f64,
}

impl DepthBand {
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// Output field name such as `aws0_20`.
    pub fn field_name(&self, prefix: &str) -> String {
        format!("{prefix}{}_{}", self.top, self.bottom)
    }
}

/// How restriction names are recorded when pH and EC both fire in one horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChemistryNames {
    #[default]
    AppendAll,
    LastWins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RootZoneConfig {
    /// Floor of the root zone, cm.
    pub max_depth: f64,
    /// Root-zone AWS (mm) below which a map unit is droughty.
    pub droughty_threshold_mm: f64,
    pub ph_max: f64,
    pub ec_min: f64,
    pub restriction_kinds: Vec<RestrictionKind>,
    pub chemistry_names: ChemistryNames,
}

impl Default for RootZoneConfig {
    fn default() -> Self {
        Self {
            max_depth: 150.0,
            droughty_threshold_mm: 152.0,
            ph_max: 3.5,
            ec_min: 16.0,
            restriction_kinds: RestrictionKind::ROOT_ZONE.to_vec(),
            chemistry_names: ChemistryNames::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SocConfig {
    pub max_depth: f64,
    pub restriction_kinds: Vec<RestrictionKind>,
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            max_depth: 999.0,
            restriction_kinds: RestrictionKind::BEDROCK.to_vec(),
        }
    }
}

/// One horizon-property summary column, e.g. `om0_100`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryField {
    pub field: String,
    pub property: HorizonProperty,
    pub top: f64,
    pub bottom: f64,
    #[serde(default)]
    pub method: SummaryMethod,
}

impl SummaryField {
    fn new(field: &str, property: HorizonProperty, top: f64, bottom: f64) -> Self {
        Self {
            field: field.to_string(),
            property,
            top,
            bottom,
            method: SummaryMethod::WeightedAverage,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuConfig {
    pub depth_bands: Vec<DepthBand>,
    pub root_zone: RootZoneConfig,
    pub soc: SocConfig,
    pub summaries: Vec<SummaryField>,
}

impl Default for ValuConfig {
    fn default() -> Self {
        Self {
            depth_bands: vec![
                DepthBand::new(0.0, 20.0),
                DepthBand::new(20.0, 50.0),
                DepthBand::new(50.0, 100.0),
            ],
            root_zone: RootZoneConfig::default(),
            soc: SocConfig::default(),
            summaries: vec![
                SummaryField::new("om0_100", HorizonProperty::OrganicMatter, 0.0, 100.0),
                SummaryField::new("db0_100", HorizonProperty::BulkDensity, 0.0, 100.0),
                SummaryField::new("fragvol0_100", HorizonProperty::FragmentVolume, 0.0, 100.0),
                SummaryField::new("ksat50_150", HorizonProperty::Ksat, 50.0, 150.0),
            ],
        }
    }
}

impl ValuConfig {
    /// Read a JSON config. Missing keys fall back to the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ValuError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: ValuConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValuError> {
        if self.depth_bands.is_empty() {
            return Err(ValuError::Config("depth_bands must not be empty".into()));
        }
        for band in &self.depth_bands {
            check_range("depth band", band.top, band.bottom)?;
        }
        for summary in &self.summaries {
            check_range(&summary.field, summary.top, summary.bottom)?;
        }
        if self.root_zone.max_depth <= 0.0 {
            return Err(ValuError::Config(format!(
                "root_zone.max_depth must be positive, got {}",
                self.root_zone.max_depth
            )));
        }
        if self.soc.max_depth <= 0.0 {
            return Err(ValuError::Config(format!(
                "soc.max_depth must be positive, got {}",
                self.soc.max_depth
            )));
        }
        Ok(())
    }
}

fn check_range(what: &str, top: f64, bottom: f64) -> Result<(), ValuError> {
    if top < 0.0 || top >= bottom {
        return Err(ValuError::Config(format!(
            "{what}: invalid range {top}-{bottom} cm"
        )));
    }
    Ok(())
}
