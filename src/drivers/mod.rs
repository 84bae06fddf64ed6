//! Calculation drivers. Each one is a single pass over the map units:
//! filter components and horizons, accumulate, roll up, and return its own
//! result map for the engine to merge.

use std::collections::HashMap;
use std::fmt;

use crate::aggregation::PercentSumIndex;
use crate::config::ValuConfig;
use crate::soil::MapUnit;

pub mod aws;
pub mod nccpi;
pub mod rootzone;
pub mod soc;
pub mod summary;
pub mod wetland;

/// Read-only inputs shared by every driver in a run.
pub struct DriverContext<'a> {
    pub mapunits: &'a [MapUnit],
    pub percent_sums: &'a PercentSumIndex,
    pub config: &'a ValuConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Calculation {
    RootZone,
    AvailableWater,
    OrganicCarbon,
    Nccpi,
    Wetland,
    HorizonSummary,
}

impl Calculation {
    pub const ALL: [Calculation; 6] = [
        Calculation::RootZone,
        Calculation::AvailableWater,
        Calculation::OrganicCarbon,
        Calculation::Nccpi,
        Calculation::Wetland,
        Calculation::HorizonSummary,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Calculation::RootZone => "root zone AWS",
            Calculation::AvailableWater => "available water storage",
            Calculation::OrganicCarbon => "soil organic carbon",
            Calculation::Nccpi => "NCCPI",
            Calculation::Wetland => "potential wetland soils",
            Calculation::HorizonSummary => "horizon summaries",
        }
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values per depth band, aligned with `ValuConfig::depth_bands`.
#[derive(Debug, Clone, Default)]
pub struct BandedResult {
    pub mapunits: HashMap<String, Vec<Option<f64>>>,
    pub components: HashMap<String, Vec<Option<f64>>>,
}

impl BandedResult {
    pub(crate) fn with_bands(mapunits: &[MapUnit], bands: usize) -> Self {
        let mut result = Self::default();
        for mu in mapunits {
            result.mapunits.insert(mu.key.clone(), vec![None; bands]);
            for co in &mu.components {
                result.components.insert(co.key.clone(), vec![None; bands]);
            }
        }
        result
    }

    pub(crate) fn set_mapunit(&mut self, mukey: &str, band: usize, value: Option<f64>) {
        if let Some(values) = self.mapunits.get_mut(mukey) {
            values[band] = value;
        }
    }

    pub(crate) fn set_component(&mut self, cokey: &str, band: usize, value: Option<f64>) {
        if let Some(values) = self.components.get_mut(cokey) {
            values[band] = value;
        }
    }
}
