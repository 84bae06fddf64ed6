//! Horizon feed loading: polars frames in, typed map unit hierarchy out.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::error::ValuError;
use crate::schema::{fragment, horizon, interp, restriction, KEY_WIDTH};
use crate::soil::{
    Component, HydricRating, Horizon, MapUnit, NccpiRatings, Restriction, RestrictionKind,
};

/// Input frames for one processing unit. Only the horizon feed is required.
#[derive(Debug, Clone, Default)]
pub struct FeedTables {
    pub horizons: DataFrame,
    pub restrictions: Option<DataFrame>,
    pub interpretations: Option<DataFrame>,
    pub fragments: Option<DataFrame>,
}

/// Read a CSV file with all columns as String dtype, trimming column names.
pub fn read_csv_as_strings(path: impl AsRef<Path>) -> Result<DataFrame, ValuError> {
    let path = path.as_ref().to_path_buf();
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0)) // all columns as String
        .try_into_reader_with_file_path(Some(path))?
        .finish()?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())?;
    Ok(df)
}

/// Strip whitespace from the listed String columns and cast them to Float64.
/// Columns that are absent or already numeric are left alone.
pub fn parse_numeric_columns(df: DataFrame, columns: &[&str]) -> Result<DataFrame, ValuError> {
    let schema = df.schema();
    let exprs: Vec<Expr> = columns
        .iter()
        .filter(|name| matches!(schema.get(name), Some(DataType::String)))
        .map(|name| {
            col(*name)
                .str()
                .strip_chars(lit(" \t\r\n"))
                .cast(DataType::Float64)
        })
        .collect();
    if exprs.is_empty() {
        return Ok(df);
    }
    Ok(df.lazy().with_columns(exprs).collect()?)
}

pub fn load_horizon_csv(path: impl AsRef<Path>) -> Result<DataFrame, ValuError> {
    let raw = read_csv_as_strings(path)?;
    require_columns(&raw, &horizon::REQUIRED)?;
    parse_numeric_columns(raw, &horizon::NUMERIC)
}

pub fn load_restriction_csv(path: impl AsRef<Path>) -> Result<DataFrame, ValuError> {
    let raw = read_csv_as_strings(path)?;
    require_columns(&raw, &[restriction::COKEY, restriction::RESKIND, restriction::RESDEPT])?;
    parse_numeric_columns(raw, &[restriction::RESDEPT])
}

pub fn load_interpretation_csv(path: impl AsRef<Path>) -> Result<DataFrame, ValuError> {
    let raw = read_csv_as_strings(path)?;
    require_columns(
        &raw,
        &[interp::COKEY, interp::RULEDEPTH, interp::RULENAME, interp::INTERPHR],
    )?;
    parse_numeric_columns(raw, &[interp::COMPPCT, interp::RULEDEPTH, interp::INTERPHR])
}

pub fn load_fragment_csv(path: impl AsRef<Path>) -> Result<DataFrame, ValuError> {
    let raw = read_csv_as_strings(path)?;
    require_columns(&raw, &[fragment::CHKEY, fragment::FRAGVOL])?;
    parse_numeric_columns(raw, &[fragment::FRAGVOL])
}

/// Sort a horizon feed into processing order: map unit key, component
/// percent descending, component key, horizon top.
pub fn sort_horizon_feed(df: DataFrame) -> Result<DataFrame, ValuError> {
    require_columns(&df, &[horizon::MUKEY, horizon::COMPPCT, horizon::COKEY, horizon::HZDEPT])?;
    let sorted = df
        .lazy()
        .sort_by_exprs(
            [
                col(horizon::MUKEY),
                col(horizon::COMPPCT),
                col(horizon::COKEY),
                col(horizon::HZDEPT),
            ],
            SortMultipleOptions::default()
                .with_order_descending_multi([false, true, false, false])
                .with_nulls_last(true)
                .with_maintain_order(true),
        )
        .collect()?;
    Ok(sorted)
}

pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), ValuError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(ValuError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

// ── Column extraction ───────────────────────────────────────────────────────

/// Trimmed string values; blank cells become `None`. A missing optional
/// column reads as all nulls.
fn str_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, ValuError> {
    if df.column(name).is_err() {
        return Ok(vec![None; df.height()]);
    }
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column
        .str()?
        .into_iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(String::from))
        .collect();
    Ok(values)
}

fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ValuError> {
    if df.column(name).is_err() {
        return Ok(vec![None; df.height()]);
    }
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

fn check_key_width(table: &str, key: &str) {
    if key.chars().count() > KEY_WIDTH {
        warn!(table, key, width = KEY_WIDTH, "key longer than the output key field");
    }
}

// ── Side tables ─────────────────────────────────────────────────────────────

/// Total rock fragment volume per horizon. Negative entries count as zero
/// and the total is capped at 100 percent.
pub fn fragment_volumes(df: &DataFrame) -> Result<HashMap<String, f64>, ValuError> {
    require_columns(df, &[fragment::CHKEY, fragment::FRAGVOL])?;
    let keys = str_values(df, fragment::CHKEY)?;
    let volumes = f64_values(df, fragment::FRAGVOL)?;

    let mut totals: HashMap<String, f64> = HashMap::new();
    for (key, volume) in keys.into_iter().zip(volumes) {
        let Some(key) = key else {
            continue;
        };
        *totals.entry(key).or_default() += volume.unwrap_or(0.0).max(0.0);
    }
    for total in totals.values_mut() {
        *total = total.min(100.0);
    }
    Ok(totals)
}

/// Restriction-table entries per component. Kinds the calculations do not
/// use, and rows without a depth, are dropped.
pub fn restrictions_by_component(
    df: &DataFrame,
) -> Result<HashMap<String, Vec<Restriction>>, ValuError> {
    require_columns(df, &[restriction::COKEY, restriction::RESKIND, restriction::RESDEPT])?;
    let cokeys = str_values(df, restriction::COKEY)?;
    let kinds = str_values(df, restriction::RESKIND)?;
    let depths = f64_values(df, restriction::RESDEPT)?;

    let mut result: HashMap<String, Vec<Restriction>> = HashMap::new();
    let mut ignored = 0usize;
    for ((cokey, kind), depth) in cokeys.into_iter().zip(kinds).zip(depths) {
        let (Some(cokey), Some(kind), Some(depth)) =
            (cokey, kind.as_deref().and_then(RestrictionKind::parse), depth)
        else {
            ignored += 1;
            continue;
        };
        result.entry(cokey).or_default().push(Restriction { kind, depth });
    }
    debug!(components = result.len(), ignored, "restrictions indexed");
    Ok(result)
}

/// NCCPI submodel ratings per component. Every component present in the
/// table gets an entry, rated or not.
pub fn nccpi_by_component(df: &DataFrame) -> Result<HashMap<String, NccpiRatings>, ValuError> {
    require_columns(
        df,
        &[interp::COKEY, interp::RULEDEPTH, interp::RULENAME, interp::INTERPHR],
    )?;
    let cokeys = str_values(df, interp::COKEY)?;
    let depths = f64_values(df, interp::RULEDEPTH)?;
    let names = str_values(df, interp::RULENAME)?;
    let ratings = f64_values(df, interp::INTERPHR)?;

    let mut result: HashMap<String, NccpiRatings> = HashMap::new();
    for (i, cokey) in cokeys.into_iter().enumerate() {
        let Some(cokey) = cokey else {
            continue;
        };
        let entry = result.entry(cokey).or_default();
        // Submodel rules sit below the overall rule (depth 0).
        if depths[i].map_or(true, |d| d == 0.0) {
            continue;
        }
        match names[i].as_deref() {
            Some(interp::CORN_SOYBEANS_RULE) => entry.corn_soybeans = ratings[i],
            Some(interp::SMALL_GRAINS_RULE) => entry.small_grains = ratings[i],
            _ => {}
        }
    }
    Ok(result)
}

// ── Hierarchy ───────────────────────────────────────────────────────────────

/// Horizon feed columns, one vector per field.
struct HorizonColumns {
    mukey: Vec<Option<String>>,
    muname: Vec<Option<String>>,
    cokey: Vec<Option<String>>,
    compname: Vec<Option<String>>,
    comppct: Vec<Option<f64>>,
    localphase: Vec<Option<String>>,
    otherph: Vec<Option<String>>,
    majcompflag: Vec<Option<String>>,
    compkind: Vec<Option<String>>,
    taxorder: Vec<Option<String>>,
    taxsubgrp: Vec<Option<String>>,
    drainagecl: Vec<Option<String>>,
    hydricrating: Vec<Option<String>>,
    chkey: Vec<Option<String>>,
    desgnmaster: Vec<Option<String>>,
    top: Vec<Option<f64>>,
    bottom: Vec<Option<f64>>,
    om: Vec<Option<f64>>,
    awc: Vec<Option<f64>>,
    texture: Vec<Option<String>>,
    lieutex: Vec<Option<String>>,
    sand: Vec<Option<f64>>,
    silt: Vec<Option<f64>>,
    clay: Vec<Option<f64>>,
    dbthirdbar: Vec<Option<f64>>,
    ph: Vec<Option<f64>>,
    ec: Vec<Option<f64>>,
    fragvol: Vec<Option<f64>>,
    ksat: Vec<Option<f64>>,
}

impl HorizonColumns {
    fn from_frame(df: &DataFrame) -> Result<Self, ValuError> {
        Ok(Self {
            mukey: str_values(df, horizon::MUKEY)?,
            muname: str_values(df, horizon::MUNAME)?,
            cokey: str_values(df, horizon::COKEY)?,
            compname: str_values(df, horizon::COMPNAME)?,
            comppct: f64_values(df, horizon::COMPPCT)?,
            localphase: str_values(df, horizon::LOCALPHASE)?,
            otherph: str_values(df, horizon::OTHERPH)?,
            majcompflag: str_values(df, horizon::MAJCOMPFLAG)?,
            compkind: str_values(df, horizon::COMPKIND)?,
            taxorder: str_values(df, horizon::TAXORDER)?,
            taxsubgrp: str_values(df, horizon::TAXSUBGRP)?,
            drainagecl: str_values(df, horizon::DRAINAGECL)?,
            hydricrating: str_values(df, horizon::HYDRICRATING)?,
            chkey: str_values(df, horizon::CHKEY)?,
            desgnmaster: str_values(df, horizon::DESGNMASTER)?,
            top: f64_values(df, horizon::HZDEPT)?,
            bottom: f64_values(df, horizon::HZDEPB)?,
            om: f64_values(df, horizon::OM)?,
            awc: f64_values(df, horizon::AWC)?,
            texture: str_values(df, horizon::TEXTURE)?,
            lieutex: str_values(df, horizon::LIEUTEX)?,
            sand: f64_values(df, horizon::SAND)?,
            silt: f64_values(df, horizon::SILT)?,
            clay: f64_values(df, horizon::CLAY)?,
            dbthirdbar: f64_values(df, horizon::DBTHIRDBAR)?,
            ph: f64_values(df, horizon::PH)?,
            ec: f64_values(df, horizon::EC)?,
            fragvol: f64_values(df, horizon::FRAGVOL)?,
            ksat: f64_values(df, horizon::KSAT)?,
        })
    }

    fn component(&self, i: usize, key: String, mapunit_key: String) -> Component {
        Component {
            key,
            mapunit_key,
            name: self.compname[i].clone(),
            percent: self.comppct[i],
            major: self.majcompflag[i]
                .as_deref()
                .is_some_and(|f| f.eq_ignore_ascii_case("yes")),
            kind: self.compkind[i].clone(),
            tax_order: self.taxorder[i].clone(),
            tax_subgroup: self.taxsubgrp[i].clone(),
            local_phase: self.localphase[i].clone(),
            other_phase: self.otherph[i].clone(),
            drainage_class: self.drainagecl[i].clone(),
            hydric: self.hydricrating[i].as_deref().and_then(HydricRating::parse),
            ..Default::default()
        }
    }

    fn horizon(&self, i: usize, fragments: &HashMap<String, f64>) -> Horizon {
        let fragment_volume = self.fragvol[i].or_else(|| {
            self.chkey[i]
                .as_ref()
                .and_then(|k| fragments.get(k).copied())
        });
        Horizon {
            key: self.chkey[i].clone(),
            top: self.top[i],
            bottom: self.bottom[i],
            desgn_master: self.desgnmaster[i].clone(),
            organic_matter: self.om[i],
            bulk_density: self.dbthirdbar[i],
            ph: self.ph[i],
            ec: self.ec[i],
            sand: self.sand[i],
            silt: self.silt[i],
            clay: self.clay[i],
            awc: self.awc[i],
            texture: self.texture[i].clone(),
            lieutex: self.lieutex[i].clone(),
            fragment_volume,
            ksat: self.ksat[i],
        }
    }
}

fn row_key(values: &[Option<String>], column: &str, row: usize) -> Result<String, ValuError> {
    values[row]
        .clone()
        .ok_or_else(|| ValuError::InvalidData(format!("null {column} at row {row}")))
}

/// Build the map unit hierarchy from the input tables.
///
/// The horizon feed must already be in processing order (see
/// [`sort_horizon_feed`]); grouping and ordering violations are fatal.
pub fn build_mapunits(tables: &FeedTables) -> Result<Vec<MapUnit>, ValuError> {
    let df = &tables.horizons;
    require_columns(df, &horizon::REQUIRED)?;
    if df.height() == 0 {
        return Err(ValuError::EmptyFeed);
    }

    let fragments = match &tables.fragments {
        Some(f) => fragment_volumes(f)?,
        None => HashMap::new(),
    };
    let mut restrictions = match &tables.restrictions {
        Some(r) => restrictions_by_component(r)?,
        None => HashMap::new(),
    };
    let ratings = match &tables.interpretations {
        Some(i) => nccpi_by_component(i)?,
        None => HashMap::new(),
    };

    let cols = HorizonColumns::from_frame(df)?;
    let mut mapunits: Vec<MapUnit> = Vec::new();
    let mut seen_mapunits: HashSet<String> = HashSet::new();
    let mut seen_components: HashSet<String> = HashSet::new();
    let mut horizon_count = 0usize;

    for i in 0..df.height() {
        let mukey = row_key(&cols.mukey, horizon::MUKEY, i)?;
        let cokey = row_key(&cols.cokey, horizon::COKEY, i)?;

        if mapunits.last().map_or(true, |mu| mu.key != mukey) {
            if !seen_mapunits.insert(mukey.clone()) {
                return Err(ValuError::Validation(format!(
                    "map unit {mukey} is not contiguous in the horizon feed (row {i})"
                )));
            }
            check_key_width(horizon::MUKEY, &mukey);
            mapunits.push(MapUnit {
                key: mukey.clone(),
                name: cols.muname[i].clone(),
                components: Vec::new(),
            });
        }
        let mapunit = mapunits.last_mut().ok_or(ValuError::EmptyFeed)?;

        if mapunit.components.last().map_or(true, |co| co.key != cokey) {
            if !seen_components.insert(cokey.clone()) {
                return Err(ValuError::Validation(format!(
                    "component {cokey} is not contiguous in the horizon feed (row {i})"
                )));
            }
            let previous_pct = mapunit.components.last().and_then(|co| co.percent);
            if let (Some(previous), Some(pct)) = (previous_pct, cols.comppct[i]) {
                if pct > previous {
                    return Err(ValuError::Validation(format!(
                        "component percentages must descend within map unit {mukey}: \
                         {cokey} has {pct} after {previous} (row {i})"
                    )));
                }
            }
            check_key_width(horizon::COKEY, &cokey);
            let mut component = cols.component(i, cokey.clone(), mukey.clone());
            component.restrictions = restrictions.remove(&cokey).unwrap_or_default();
            component.nccpi = ratings.get(&cokey).copied();
            mapunit.components.push(component);
        }
        let component = mapunit
            .components
            .last_mut()
            .ok_or_else(|| ValuError::InvalidData(format!("component {cokey} missing")))?;

        // Outer-joined rows for components without horizon data.
        if cols.top[i].is_none() && cols.bottom[i].is_none() {
            continue;
        }
        let previous_top = component.horizons.last().and_then(|h| h.top);
        if let (Some(previous), Some(top)) = (previous_top, cols.top[i]) {
            if top < previous {
                return Err(ValuError::Validation(format!(
                    "horizons of component {cokey} are not ordered by top depth (row {i})"
                )));
            }
        }
        component.horizons.push(cols.horizon(i, &fragments));
        horizon_count += 1;
    }

    info!(
        mapunits = mapunits.len(),
        components = seen_components.len(),
        horizons = horizon_count,
        "horizon feed loaded"
    );
    Ok(mapunits)
}
