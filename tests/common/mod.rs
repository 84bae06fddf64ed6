#![allow(dead_code)]

use std::fs::File;
use std::path::{Path, PathBuf};

use _core::schema::{horizon, interp, restriction};
use polars::prelude::*;
use tempfile::TempDir;

/// One row of the horizon feed. Defaults describe a mineral, non-dense
/// loam horizon of a major series component.
#[derive(Debug, Clone)]
pub struct HorizonRow {
    pub mukey: &'static str,
    pub muname: Option<&'static str>,
    pub cokey: &'static str,
    pub compname: &'static str,
    pub comppct: f64,
    pub major: bool,
    pub compkind: Option<&'static str>,
    pub taxorder: &'static str,
    pub taxsubgrp: &'static str,
    pub hydric: Option<&'static str>,
    pub localphase: Option<&'static str>,
    pub desgnmaster: &'static str,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub om: Option<f64>,
    pub awc: Option<f64>,
    pub texture: &'static str,
    pub sand: f64,
    pub silt: f64,
    pub clay: f64,
    pub db: Option<f64>,
    pub ph: f64,
    pub ec: f64,
    pub fragvol: Option<f64>,
}

impl Default for HorizonRow {
    fn default() -> Self {
        Self {
            mukey: "mu1",
            muname: Some("Clarion loam, 2 to 5 percent slopes"),
            cokey: "co1",
            compname: "Clarion",
            comppct: 100.0,
            major: true,
            compkind: Some("Series"),
            taxorder: "Mollisols",
            taxsubgrp: "Typic Hapludolls",
            hydric: Some("No"),
            localphase: None,
            desgnmaster: "A",
            top: Some(0.0),
            bottom: Some(100.0),
            om: Some(2.0),
            awc: Some(0.2),
            texture: "L",
            sand: 40.0,
            silt: 40.0,
            clay: 20.0,
            db: Some(1.3),
            ph: 6.5,
            ec: 0.0,
            fragvol: Some(0.0),
        }
    }
}

impl HorizonRow {
    pub fn depths(self, top: f64, bottom: f64) -> Self {
        Self {
            top: Some(top),
            bottom: Some(bottom),
            ..self
        }
    }
}

/// Build a horizon feed frame from rows, in the order given.
pub fn horizon_feed(rows: &[HorizonRow]) -> DataFrame {
    fn strs<'a>(
        rows: &'a [HorizonRow],
        f: impl Fn(&'a HorizonRow) -> Option<&'a str>,
    ) -> Vec<Option<&'a str>> {
        rows.iter().map(f).collect()
    }
    fn nums(rows: &[HorizonRow], f: impl Fn(&HorizonRow) -> Option<f64>) -> Vec<Option<f64>> {
        rows.iter().map(f).collect()
    }

    DataFrame::new(vec![
        Column::new(horizon::MUKEY.into(), strs(rows, |r| Some(r.mukey))),
        Column::new(horizon::MUNAME.into(), strs(rows, |r| r.muname)),
        Column::new(horizon::COKEY.into(), strs(rows, |r| Some(r.cokey))),
        Column::new(horizon::COMPNAME.into(), strs(rows, |r| Some(r.compname))),
        Column::new(horizon::COMPPCT.into(), nums(rows, |r| Some(r.comppct))),
        Column::new(horizon::LOCALPHASE.into(), strs(rows, |r| r.localphase)),
        Column::new(
            horizon::MAJCOMPFLAG.into(),
            strs(rows, |r| Some(if r.major { "Yes" } else { "No" })),
        ),
        Column::new(horizon::COMPKIND.into(), strs(rows, |r| r.compkind)),
        Column::new(horizon::TAXORDER.into(), strs(rows, |r| Some(r.taxorder))),
        Column::new(horizon::TAXSUBGRP.into(), strs(rows, |r| Some(r.taxsubgrp))),
        Column::new(horizon::HYDRICRATING.into(), strs(rows, |r| r.hydric)),
        Column::new(horizon::DESGNMASTER.into(), strs(rows, |r| Some(r.desgnmaster))),
        Column::new(horizon::HZDEPT.into(), nums(rows, |r| r.top)),
        Column::new(horizon::HZDEPB.into(), nums(rows, |r| r.bottom)),
        Column::new(horizon::OM.into(), nums(rows, |r| r.om)),
        Column::new(horizon::AWC.into(), nums(rows, |r| r.awc)),
        Column::new(horizon::TEXTURE.into(), strs(rows, |r| Some(r.texture))),
        Column::new(horizon::LIEUTEX.into(), strs(rows, |_| None)),
        Column::new(horizon::SAND.into(), nums(rows, |r| Some(r.sand))),
        Column::new(horizon::SILT.into(), nums(rows, |r| Some(r.silt))),
        Column::new(horizon::CLAY.into(), nums(rows, |r| Some(r.clay))),
        Column::new(horizon::DBTHIRDBAR.into(), nums(rows, |r| r.db)),
        Column::new(horizon::PH.into(), nums(rows, |r| Some(r.ph))),
        Column::new(horizon::EC.into(), nums(rows, |r| Some(r.ec))),
        Column::new(horizon::FRAGVOL.into(), nums(rows, |r| r.fragvol)),
    ])
    .unwrap()
}

pub fn restriction_table(rows: &[(&str, &str, f64)]) -> DataFrame {
    df![
        restriction::COKEY => rows.iter().map(|r| r.0).collect::<Vec<_>>(),
        restriction::RESKIND => rows.iter().map(|r| r.1).collect::<Vec<_>>(),
        restriction::RESDEPT => rows.iter().map(|r| r.2).collect::<Vec<_>>(),
    ]
    .unwrap()
}

/// NCCPI submodel ratings as (mukey, cokey, corn/soybeans, small grains).
pub fn nccpi_table(rows: &[(&str, &str, f64, f64)]) -> DataFrame {
    let mut mukeys = Vec::new();
    let mut cokeys = Vec::new();
    let mut names = Vec::new();
    let mut ratings = Vec::new();
    for &(mukey, cokey, cs, sg) in rows {
        for (name, rating) in [
            (interp::CORN_SOYBEANS_RULE, cs),
            (interp::SMALL_GRAINS_RULE, sg),
        ] {
            mukeys.push(mukey);
            cokeys.push(cokey);
            names.push(name);
            ratings.push(rating);
        }
    }
    let depths = vec![1.0f64; ratings.len()];
    df![
        interp::MUKEY => mukeys,
        interp::COKEY => cokeys,
        interp::RULEDEPTH => depths,
        interp::RULENAME => names,
        interp::INTERPHR => ratings,
    ]
    .unwrap()
}

/// Temporary working directory for CSV round trips.
pub struct TestDir {
    _tmp: TempDir,
    pub path: PathBuf,
}

impl TestDir {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().to_path_buf();
        Self { _tmp: tmp, path }
    }

    pub fn write_csv(&self, name: &str, df: &mut DataFrame) -> PathBuf {
        let path = self.path.join(name);
        let mut file = File::create(&path).expect("create csv");
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .expect("write csv");
        path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

pub fn read_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .unwrap()
        .finish()
        .unwrap()
}
