//! Runs every calculation driver over one processing unit.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::aggregation::PercentSumIndex;
use crate::config::ValuConfig;
use crate::drivers::{self, Calculation, DriverContext};
use crate::error::ValuError;
use crate::feed::{build_mapunits, FeedTables};
use crate::output::{self, ComponentOutput, DriverResults, MapUnitOutput};
use crate::soil::MapUnit;

/// Install a `tracing` fmt subscriber. `filter` uses `EnvFilter` syntax;
/// without one `RUST_LOG` is read, falling back to `info`.
pub fn init_logging(filter: Option<&str>) -> Result<(), ValuError> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| ValuError::Config(format!("invalid log filter {directives:?}: {e}")))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| ValuError::Logging(format!("subscriber already installed: {e}")))
}

/// A calculation that failed without stopping the others.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverFailure {
    pub calculation: Calculation,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValuReport {
    pub mapunits: Vec<MapUnitOutput>,
    pub components: Vec<ComponentOutput>,
    pub failures: Vec<DriverFailure>,
}

impl ValuReport {
    pub fn mapunit(&self, mukey: &str) -> Option<&MapUnitOutput> {
        self.mapunits.iter().find(|m| m.mukey == mukey)
    }

    pub fn component(&self, cokey: &str) -> Option<&ComponentOutput> {
        self.components.iter().find(|c| c.cokey == cokey)
    }

    pub fn failed(&self, calculation: Calculation) -> bool {
        self.failures.iter().any(|f| f.calculation == calculation)
    }
}

pub struct ValuEngine {
    config: ValuConfig,
}

impl ValuEngine {
    pub fn new(config: ValuConfig) -> Result<Self, ValuError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ValuConfig {
        &self.config
    }

    /// Build the hierarchy from frames, then run.
    pub fn run_tables(&self, tables: &FeedTables) -> Result<ValuReport, ValuError> {
        let mapunits = build_mapunits(tables)?;
        self.run(&mapunits)
    }

    /// Run all drivers in sequence. Percent sums are computed once and
    /// shared; a driver error is recorded and the remaining drivers still run.
    pub fn run(&self, mapunits: &[MapUnit]) -> Result<ValuReport, ValuError> {
        if mapunits.is_empty() {
            return Err(ValuError::EmptyFeed);
        }
        let percent_sums = PercentSumIndex::build(mapunits);
        let ctx = DriverContext {
            mapunits,
            percent_sums: &percent_sums,
            config: &self.config,
        };

        let mut failures = Vec::new();
        let mut results = DriverResults::default();
        for calculation in Calculation::ALL {
            info!(%calculation, "running");
            let outcome = match calculation {
                Calculation::RootZone => {
                    drivers::rootzone::run(&ctx).map(|r| results.root_zone = Some(r))
                }
                Calculation::AvailableWater => {
                    drivers::aws::run(&ctx).map(|r| results.aws = Some(r))
                }
                Calculation::OrganicCarbon => {
                    drivers::soc::run(&ctx).map(|r| results.soc = Some(r))
                }
                Calculation::Nccpi => drivers::nccpi::run(&ctx).map(|r| results.nccpi = Some(r)),
                Calculation::Wetland => {
                    drivers::wetland::run(&ctx).map(|r| results.wetland = Some(r))
                }
                Calculation::HorizonSummary => {
                    drivers::summary::run(&ctx).map(|r| results.summaries = Some(r))
                }
            };
            if let Err(e) = outcome {
                error!(%calculation, error = %e, "calculation failed, continuing");
                failures.push(DriverFailure {
                    calculation,
                    message: e.to_string(),
                });
            }
        }

        let (mu_records, co_records) =
            output::merge(mapunits, &percent_sums, &self.config, &results);
        info!(
            mapunits = mu_records.len(),
            components = co_records.len(),
            failures = failures.len(),
            "run complete"
        );
        Ok(ValuReport {
            mapunits: mu_records,
            components: co_records,
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{component, horizon, mapunit};

    #[test]
    fn empty_input_is_fatal() {
        let engine = ValuEngine::new(ValuConfig::default()).unwrap();
        assert!(matches!(engine.run(&[]), Err(ValuError::EmptyFeed)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ValuConfig::default();
        config.depth_bands.clear();
        assert!(matches!(ValuEngine::new(config), Err(ValuError::Config(_))));
    }

    #[test]
    fn nccpi_failure_does_not_stop_other_drivers() {
        let mut co = component("co1", 100.0, true, "Series");
        co.horizons = vec![horizon(0.0, 100.0, 0.2)];
        let engine = ValuEngine::new(ValuConfig::default()).unwrap();
        let report = engine.run(&[mapunit("mu1", vec![co])]).unwrap();

        assert!(report.failed(Calculation::Nccpi));
        assert_eq!(report.failures.len(), 1);
        let mu = report.mapunit("mu1").unwrap();
        assert_eq!(mu.nccpi2cs, None);
        assert_eq!(mu.aws, vec![Some(40.0), Some(60.0), Some(100.0)]);
        assert_eq!(mu.rootznaws, Some(200.0));
        assert_eq!(mu.droughty, Some(0));
    }

    #[test]
    fn invalid_log_filter_is_an_error() {
        assert!(matches!(
            init_logging(Some("acpf=notalevel")),
            Err(ValuError::Config(_))
        ));
    }

    #[test]
    fn second_subscriber_install_is_a_logging_error() {
        let _ = init_logging(Some("warn"));
        assert!(matches!(
            init_logging(Some("warn")),
            Err(ValuError::Logging(_))
        ));
    }
}
