use std::path::PathBuf;

use polars::prelude::*;
use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::config::ValuConfig;
use crate::engine::{self, DriverFailure, ValuEngine};
use crate::error::ValuError;
use crate::feed::{self, FeedTables};
use crate::output;

#[pyclass]
pub struct ValuModel {
    base_path: PathBuf,
    config: ValuConfig,
    horizons: Option<DataFrame>,
    restrictions: Option<DataFrame>,
    interpretations: Option<DataFrame>,
    fragments: Option<DataFrame>,
    mapunit_output: Option<DataFrame>,
    component_output: Option<DataFrame>,
    failures: Vec<DriverFailure>,
}

#[pymethods]
impl ValuModel {
    #[new]
    #[pyo3(signature = (base_path, config_path=None))]
    fn new(base_path: String, config_path: Option<String>) -> PyResult<Self> {
        let config = match config_path {
            Some(path) => ValuConfig::from_json_file(path)?,
            None => ValuConfig::default(),
        };
        Ok(Self {
            base_path: PathBuf::from(base_path),
            config,
            horizons: None,
            restrictions: None,
            interpretations: None,
            fragments: None,
            mapunit_output: None,
            component_output: None,
            failures: Vec::new(),
        })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the horizon feed CSV. Numeric columns are parsed to Float64,
    /// everything else stays String.
    ///
    /// Required columns: see `schema.horizon`. The rows must be ordered by
    /// mukey, comppct_r descending, cokey and hzdept_r; call
    /// `sort_horizons()` when the source cannot guarantee it.
    #[pyo3(signature = (filename=None))]
    fn load_horizons(&mut self, filename: Option<&str>) -> PyResult<PyDataFrame> {
        let path = self.base_path.join(filename.unwrap_or("horizons.csv"));
        let df = feed::load_horizon_csv(path)?;
        self.set_horizon_frame(df.clone());
        Ok(PyDataFrame(df))
    }

    /// Load component restrictions (cokey, reskind, resdept_r).
    #[pyo3(signature = (filename=None))]
    fn load_restrictions(&mut self, filename: Option<&str>) -> PyResult<PyDataFrame> {
        let path = self.base_path.join(filename.unwrap_or("corestrictions.csv"));
        let df = feed::load_restriction_csv(path)?;
        self.restrictions = Some(df.clone());
        self.clear_outputs();
        Ok(PyDataFrame(df))
    }

    /// Load component interpretations holding the NCCPI submodel ratings.
    #[pyo3(signature = (filename=None))]
    fn load_interpretations(&mut self, filename: Option<&str>) -> PyResult<PyDataFrame> {
        let path = self.base_path.join(filename.unwrap_or("cointerp.csv"));
        let df = feed::load_interpretation_csv(path)?;
        self.interpretations = Some(df.clone());
        self.clear_outputs();
        Ok(PyDataFrame(df))
    }

    /// Load horizon rock fragments (chkey, fragvol_r).
    #[pyo3(signature = (filename=None))]
    fn load_fragments(&mut self, filename: Option<&str>) -> PyResult<PyDataFrame> {
        let path = self.base_path.join(filename.unwrap_or("chfrags.csv"));
        let df = feed::load_fragment_csv(path)?;
        self.fragments = Some(df.clone());
        self.clear_outputs();
        Ok(PyDataFrame(df))
    }

    fn set_horizons(&mut self, df: PyDataFrame) -> PyResult<()> {
        feed::require_columns(&df.0, &crate::schema::horizon::REQUIRED)?;
        self.set_horizon_frame(df.0);
        Ok(())
    }

    fn set_restrictions(&mut self, df: PyDataFrame) {
        self.restrictions = Some(df.0);
        self.clear_outputs();
    }

    fn set_interpretations(&mut self, df: PyDataFrame) {
        self.interpretations = Some(df.0);
        self.clear_outputs();
    }

    fn set_fragments(&mut self, df: PyDataFrame) {
        self.fragments = Some(df.0);
        self.clear_outputs();
    }

    /// Sort the loaded horizon feed into processing order.
    fn sort_horizons(&mut self) -> PyResult<PyDataFrame> {
        let df = self
            .horizons
            .take()
            .ok_or_else(|| ValuError::NotLoaded("horizons".into()))?;
        let sorted = feed::sort_horizon_feed(df)?;
        self.set_horizon_frame(sorted.clone());
        Ok(PyDataFrame(sorted))
    }

    // ── Calculation ─────────────────────────────────────────────────────────

    /// Run every calculation. Returns `(mapunit_df, component_df)`.
    ///
    /// A calculation that fails leaves its columns null; see `failures`.
    fn run(&mut self) -> PyResult<(PyDataFrame, PyDataFrame)> {
        let horizons = self
            .horizons
            .clone()
            .ok_or_else(|| ValuError::NotLoaded("horizons".into()))?;
        let tables = FeedTables {
            horizons,
            restrictions: self.restrictions.clone(),
            interpretations: self.interpretations.clone(),
            fragments: self.fragments.clone(),
        };

        let engine = ValuEngine::new(self.config.clone())?;
        let report = engine.run_tables(&tables)?;
        let mu_df = output::mapunit_frame(&report.mapunits, &self.config)?;
        let co_df = output::component_frame(&report.components, &self.config)?;

        self.failures = report.failures;
        self.mapunit_output = Some(mu_df.clone());
        self.component_output = Some(co_df.clone());
        Ok((PyDataFrame(mu_df), PyDataFrame(co_df)))
    }

    /// Write the last run's outputs. CSV or Parquet by file extension.
    fn write_outputs(&mut self, mapunit_path: &str, component_path: &str) -> PyResult<()> {
        let mu_df = self
            .mapunit_output
            .as_mut()
            .ok_or_else(|| ValuError::NotLoaded("run outputs".into()))?;
        output::write_frame(mu_df, self.base_path.join(mapunit_path))?;
        let co_df = self
            .component_output
            .as_mut()
            .ok_or_else(|| ValuError::NotLoaded("run outputs".into()))?;
        output::write_frame(co_df, self.base_path.join(component_path))?;
        Ok(())
    }

    // ── Properties ──────────────────────────────────────────────────────────

    /// `(calculation, message)` for each calculation that failed in the last run.
    #[getter]
    fn failures(&self) -> Vec<(String, String)> {
        self.failures
            .iter()
            .map(|f| (f.calculation.to_string(), f.message.clone()))
            .collect()
    }

    #[getter]
    fn horizons_df(&self) -> Option<PyDataFrame> {
        self.horizons.clone().map(PyDataFrame)
    }

    #[getter]
    fn config_json(&self) -> PyResult<String> {
        serde_json::to_string_pretty(&self.config)
            .map_err(|e| ValuError::from(e).into())
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

impl ValuModel {
    fn set_horizon_frame(&mut self, df: DataFrame) {
        self.horizons = Some(df);
        self.clear_outputs();
    }

    fn clear_outputs(&mut self) {
        self.mapunit_output = None;
        self.component_output = None;
        self.failures.clear();
    }
}

/// Install the log subscriber. `filter` uses `RUST_LOG` syntax, e.g. `"debug"`.
#[pyfunction]
#[pyo3(signature = (filter=None))]
pub fn init_logging(filter: Option<&str>) -> PyResult<()> {
    engine::init_logging(filter)?;
    Ok(())
}
