//! Output records, driver-result merge and DataFrame assembly.

use std::fs::File;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::aggregation::{Denominator, PercentSumIndex};
use crate::config::ValuConfig;
use crate::drivers::nccpi::NccpiResult;
use crate::drivers::rootzone::RootZoneResult;
use crate::drivers::summary::SummaryResult;
use crate::drivers::wetland::WetlandResult;
use crate::drivers::BandedResult;
use crate::error::ValuError;
use crate::schema::{component, mapunit};
use crate::soil::MapUnit;

/// Results of every driver that succeeded. A failed driver leaves its
/// slot empty and its output fields null.
#[derive(Debug, Default)]
pub struct DriverResults {
    pub root_zone: Option<RootZoneResult>,
    pub aws: Option<BandedResult>,
    pub soc: Option<BandedResult>,
    pub nccpi: Option<NccpiResult>,
    pub wetland: Option<WetlandResult>,
    pub summaries: Option<SummaryResult>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapUnitOutput {
    pub mukey: String,
    pub pctearthmc: f64,
    /// Aligned with `ValuConfig::depth_bands`.
    pub aws: Vec<Option<f64>>,
    pub soc: Vec<Option<f64>>,
    pub rootznemc: Option<f64>,
    pub rootznaws: Option<f64>,
    pub droughty: Option<u8>,
    pub nccpi2cs: Option<f64>,
    pub nccpi2sg: Option<f64>,
    pub pwsl1pomu: Option<f64>,
    /// Aligned with `ValuConfig::summaries`.
    pub summaries: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentOutput {
    pub mukey: String,
    pub cokey: String,
    pub compname: Option<String>,
    pub localphase: Option<String>,
    pub comppct: Option<f64>,
    pub aws: Vec<Option<f64>>,
    pub soc: Vec<Option<f64>>,
    pub rootznemc: Option<f64>,
    pub rootznaws: Option<f64>,
    pub restriction: Option<String>,
    pub pwsl1pomu: Option<f64>,
}

fn banded(
    result: Option<&BandedResult>,
    key: &str,
    bands: usize,
    by_component: bool,
) -> Vec<Option<f64>> {
    result
        .and_then(|r| {
            if by_component {
                r.components.get(key)
            } else {
                r.mapunits.get(key)
            }
        })
        .cloned()
        .unwrap_or_else(|| vec![None; bands])
}

/// Merge per-driver result maps into one record per map unit and per
/// component, in feed order.
pub fn merge(
    mapunits: &[MapUnit],
    percent_sums: &PercentSumIndex,
    config: &ValuConfig,
    results: &DriverResults,
) -> (Vec<MapUnitOutput>, Vec<ComponentOutput>) {
    let bands = config.depth_bands.len();
    let mut mu_records = Vec::with_capacity(mapunits.len());
    let mut co_records = Vec::new();

    for mu in mapunits {
        let root_zone = results
            .root_zone
            .as_ref()
            .and_then(|r| r.mapunits.get(&mu.key));
        let nccpi = results.nccpi.as_ref().and_then(|r| r.mapunits.get(&mu.key));

        mu_records.push(MapUnitOutput {
            mukey: mu.key.clone(),
            pctearthmc: percent_sums.denominator(&mu.key, Denominator::MajorEarthy),
            aws: banded(results.aws.as_ref(), &mu.key, bands, false),
            soc: banded(results.soc.as_ref(), &mu.key, bands, false),
            rootznemc: root_zone.and_then(|r| r.depth),
            rootznaws: root_zone.and_then(|r| r.aws),
            droughty: root_zone.and_then(|r| r.droughty),
            nccpi2cs: nccpi.and_then(|r| r.corn_soybeans),
            nccpi2sg: nccpi.and_then(|r| r.small_grains),
            pwsl1pomu: results
                .wetland
                .as_ref()
                .and_then(|r| r.mapunits.get(&mu.key).copied().flatten()),
            summaries: results
                .summaries
                .as_ref()
                .and_then(|r| r.mapunits.get(&mu.key).cloned())
                .unwrap_or_else(|| vec![None; config.summaries.len()]),
        });

        for co in &mu.components {
            let root_zone = results
                .root_zone
                .as_ref()
                .and_then(|r| r.components.get(&co.key))
                .filter(|r| r.depth.is_some());
            co_records.push(ComponentOutput {
                mukey: mu.key.clone(),
                cokey: co.key.clone(),
                compname: co.name.clone(),
                localphase: co.local_phase.clone(),
                comppct: co.percent,
                aws: banded(results.aws.as_ref(), &co.key, bands, true),
                soc: banded(results.soc.as_ref(), &co.key, bands, true),
                rootznemc: root_zone.and_then(|r| r.depth),
                rootznaws: root_zone.and_then(|r| r.aws),
                restriction: root_zone.map(|r| r.restriction.clone()),
                pwsl1pomu: results
                    .wetland
                    .as_ref()
                    .and_then(|r| r.components.get(&co.key).copied().flatten()),
            });
        }
    }
    (mu_records, co_records)
}

fn band_columns<T>(
    records: &[T],
    config: &ValuConfig,
    prefix: &str,
    values: impl Fn(&T) -> &Vec<Option<f64>>,
) -> Vec<Column> {
    config
        .depth_bands
        .iter()
        .enumerate()
        .map(|(i, band)| {
            let column: Vec<Option<f64>> = records
                .iter()
                .map(|r| values(r).get(i).copied().flatten())
                .collect();
            Column::new(band.field_name(prefix).into(), &column)
        })
        .collect()
}

pub fn mapunit_frame(
    records: &[MapUnitOutput],
    config: &ValuConfig,
) -> Result<DataFrame, ValuError> {
    let f64_column = |name: &str, get: fn(&MapUnitOutput) -> Option<f64>| {
        let values: Vec<Option<f64>> = records.iter().map(get).collect();
        Column::new(name.into(), &values)
    };

    let mukeys: Vec<&str> = records.iter().map(|r| r.mukey.as_str()).collect();
    let pctearthmc: Vec<f64> = records.iter().map(|r| r.pctearthmc).collect();
    let droughty: Vec<Option<i32>> = records
        .iter()
        .map(|r| r.droughty.map(i32::from))
        .collect();

    let mut columns = vec![
        Column::new(mapunit::MUKEY.into(), &mukeys),
        Column::new(mapunit::PCTEARTHMC.into(), &pctearthmc),
    ];
    columns.extend(band_columns(records, config, mapunit::AWS_PREFIX, |r| &r.aws));
    columns.extend(band_columns(records, config, mapunit::SOC_PREFIX, |r| &r.soc));
    columns.push(f64_column(mapunit::ROOTZNEMC, |r| r.rootznemc));
    columns.push(f64_column(mapunit::ROOTZNAWS, |r| r.rootznaws));
    columns.push(Column::new(mapunit::DROUGHTY.into(), &droughty));
    columns.push(f64_column(mapunit::NCCPI2CS, |r| r.nccpi2cs));
    columns.push(f64_column(mapunit::NCCPI2SG, |r| r.nccpi2sg));
    columns.push(f64_column(mapunit::PWSL1POMU, |r| r.pwsl1pomu));
    for (i, summary) in config.summaries.iter().enumerate() {
        let values: Vec<Option<f64>> = records
            .iter()
            .map(|r| r.summaries.get(i).copied().flatten())
            .collect();
        columns.push(Column::new(summary.field.as_str().into(), &values));
    }

    Ok(DataFrame::new(columns)?)
}

pub fn component_frame(
    records: &[ComponentOutput],
    config: &ValuConfig,
) -> Result<DataFrame, ValuError> {
    let text = |get: fn(&ComponentOutput) -> Option<&str>| -> Vec<Option<&str>> {
        records.iter().map(get).collect()
    };
    let number = |get: fn(&ComponentOutput) -> Option<f64>| -> Vec<Option<f64>> {
        records.iter().map(get).collect()
    };

    let mut columns = vec![
        Column::new(component::MUKEY.into(), &text(|r| Some(r.mukey.as_str()))),
        Column::new(component::COKEY.into(), &text(|r| Some(r.cokey.as_str()))),
        Column::new(component::COMPNAME.into(), &text(|r| r.compname.as_deref())),
        Column::new(component::LOCALPHASE.into(), &text(|r| r.localphase.as_deref())),
        Column::new(component::COMPPCT.into(), &number(|r| r.comppct)),
    ];
    columns.extend(band_columns(records, config, mapunit::AWS_PREFIX, |r| &r.aws));
    columns.extend(band_columns(records, config, mapunit::SOC_PREFIX, |r| &r.soc));
    columns.push(Column::new(component::ROOTZNEMC.into(), &number(|r| r.rootznemc)));
    columns.push(Column::new(component::ROOTZNAWS.into(), &number(|r| r.rootznaws)));
    columns.push(Column::new(
        component::RESTRICTION.into(),
        &text(|r| r.restriction.as_deref()),
    ));
    columns.push(Column::new(component::PWSL1POMU.into(), &number(|r| r.pwsl1pomu)));

    Ok(DataFrame::new(columns)?)
}

/// Write a frame as CSV or Parquet depending on the file extension.
pub fn write_frame(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<(), ValuError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("csv") => {
            let mut file = File::create(path)?;
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
        }
        Some("parquet") => {
            let file = File::create(path)?;
            ParquetWriter::new(file).finish(df)?;
        }
        _ => {
            return Err(ValuError::Config(format!(
                "unsupported output format: {}",
                path.display()
            )))
        }
    }
    info!(path = %path.display(), rows = df.height(), "output written");
    Ok(())
}
