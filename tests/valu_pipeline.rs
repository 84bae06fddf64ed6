mod common;

use std::io::Write;

use _core::drivers::Calculation;
use _core::feed::{self, FeedTables};
use _core::output;
use _core::{ValuConfig, ValuEngine, ValuError};
use approx::assert_abs_diff_eq;
use common::{horizon_feed, nccpi_table, restriction_table, HorizonRow, TestDir};

fn run(tables: &FeedTables) -> _core::ValuReport {
    ValuEngine::new(ValuConfig::default())
        .unwrap()
        .run_tables(tables)
        .unwrap()
}

fn tables(rows: &[HorizonRow]) -> FeedTables {
    FeedTables {
        horizons: horizon_feed(rows),
        ..Default::default()
    }
}

#[test]
fn single_component_carbon_and_water() {
    let report = run(&tables(&[HorizonRow::default()]));
    let mu = report.mapunit("mu1").unwrap();

    // 20 cm * (2.0 / 1.724) * 1.3 / 100 * 10000 = 3016.24 g/m2
    assert_eq!(mu.soc, vec![Some(3016.0), Some(4524.0), Some(7541.0)]);
    assert_eq!(mu.aws, vec![Some(40.0), Some(60.0), Some(100.0)]);
    assert_eq!(mu.rootznemc, Some(100.0));
    assert_eq!(mu.rootznaws, Some(200.0));
    assert_eq!(mu.droughty, Some(0));
    assert_eq!(mu.pctearthmc, 100.0);

    let co = report.component("co1").unwrap();
    assert_abs_diff_eq!(co.soc[0].unwrap(), 3016.24, epsilon = 0.01);
    assert_eq!(co.restriction.as_deref(), Some(""));
}

#[test]
fn miscellaneous_area_map_unit_is_null_not_zero() {
    let rows = [
        HorizonRow::default(),
        HorizonRow {
            mukey: "mu2",
            muname: Some("Rock outcrop"),
            cokey: "co2",
            compname: "Rock outcrop",
            compkind: Some("Miscellaneous area"),
            ..Default::default()
        },
    ];
    let mut feed = tables(&rows);
    feed.interpretations = Some(nccpi_table(&[
        ("mu1", "co1", 0.62, 0.48),
        ("mu2", "co2", 0.05, 0.05),
    ]));
    let report = run(&feed);

    let rock = report.mapunit("mu2").unwrap();
    assert_eq!(rock.pctearthmc, 0.0);
    assert_eq!(rock.rootznaws, None);
    assert_eq!(rock.rootznemc, None);
    assert_eq!(rock.droughty, None);
    assert_eq!(rock.nccpi2cs, None);
    assert_eq!(rock.nccpi2sg, None);
    // standard AWS still weights every component
    assert_eq!(rock.aws[0], Some(40.0));

    let clarion = report.mapunit("mu1").unwrap();
    assert_eq!(clarion.nccpi2cs, Some(0.62));
    assert_eq!(clarion.nccpi2sg, Some(0.48));
    assert!(report.failures.is_empty());
}

#[test]
fn shallow_bedrock_makes_map_unit_droughty() {
    let mut feed = tables(&[HorizonRow::default()]);
    feed.restrictions = Some(restriction_table(&[("co1", "Lithic bedrock", 50.0)]));
    let report = run(&feed);

    let mu = report.mapunit("mu1").unwrap();
    assert_eq!(mu.rootznemc, Some(50.0));
    assert_eq!(mu.rootznaws, Some(100.0));
    assert_eq!(mu.droughty, Some(1));
    // bedrock also floors carbon
    assert_eq!(mu.soc[2], Some(0.0));

    let co = report.component("co1").unwrap();
    assert_eq!(co.restriction.as_deref(), Some("Lithic bedrock"));
    assert_eq!(co.rootznemc, Some(50.0));
}

#[test]
fn acid_horizon_above_bedrock_sets_root_zone() {
    let base = HorizonRow::default();
    let rows = [
        base.clone().depths(0.0, 20.0),
        HorizonRow {
            ph: 3.2,
            ..base.clone().depths(20.0, 40.0)
        },
        base.depths(40.0, 60.0),
    ];
    let mut feed = tables(&rows);
    feed.restrictions = Some(restriction_table(&[("co1", "Paralithic bedrock", 45.0)]));
    let report = run(&feed);

    let co = report.component("co1").unwrap();
    assert_eq!(co.rootznemc, Some(20.0));
    assert_eq!(co.restriction.as_deref(), Some("pH"));
    assert_abs_diff_eq!(co.rootznaws.unwrap(), 40.0, epsilon = 1e-9);
}

#[test]
fn open_water_and_hydric_map_units() {
    let rows = [
        HorizonRow {
            mukey: "mu1",
            muname: Some("Water"),
            cokey: "co1",
            compname: "Water",
            compkind: Some("Miscellaneous area"),
            hydric: None,
            top: None,
            bottom: None,
            ..Default::default()
        },
        HorizonRow {
            mukey: "mu2",
            muname: Some("Webster clay loam"),
            cokey: "co2",
            compname: "Webster",
            comppct: 70.0,
            hydric: Some("Yes"),
            ..Default::default()
        },
        HorizonRow {
            mukey: "mu2",
            cokey: "co3",
            compname: "Nicollet",
            comppct: 30.0,
            ..Default::default()
        },
    ];
    let report = run(&tables(&rows));

    assert_eq!(report.mapunit("mu1").unwrap().pwsl1pomu, Some(999.0));
    assert_eq!(report.component("co1").unwrap().pwsl1pomu, Some(999.0));
    assert_eq!(report.mapunit("mu2").unwrap().pwsl1pomu, Some(70.0));
    assert_eq!(report.component("co3").unwrap().pwsl1pomu, Some(0.0));
}

#[test]
fn missing_interpretations_only_fail_nccpi() {
    let report = run(&tables(&[HorizonRow::default()]));

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].calculation, Calculation::Nccpi);
    let mu = report.mapunit("mu1").unwrap();
    assert_eq!(mu.nccpi2cs, None);
    assert_eq!(mu.aws[0], Some(40.0));
    assert_eq!(mu.pwsl1pomu, Some(0.0));
    assert_eq!(mu.summaries[0], Some(2.0));
}

#[test]
fn empty_feed_aborts_the_run() {
    let err = ValuEngine::new(ValuConfig::default())
        .unwrap()
        .run_tables(&tables(&[]))
        .unwrap_err();
    assert!(matches!(err, ValuError::EmptyFeed));
}

#[test]
fn csv_round_trip_with_unsorted_feed() {
    let dir = TestDir::new();
    let rows = [
        HorizonRow {
            mukey: "mu2",
            cokey: "co3",
            ..Default::default()
        },
        HorizonRow {
            cokey: "co2",
            comppct: 25.0,
            major: false,
            ..Default::default()
        }
        .depths(0.0, 30.0),
        HorizonRow {
            comppct: 75.0,
            ..Default::default()
        }
        .depths(30.0, 90.0),
        HorizonRow {
            comppct: 75.0,
            ..Default::default()
        }
        .depths(0.0, 30.0),
    ];
    dir.write_csv("horizons.csv", &mut horizon_feed(&rows));
    dir.write_csv(
        "corestrictions.csv",
        &mut restriction_table(&[("co1", "Fragipan", 60.0), ("co1", "Ortstein", 10.0)]),
    );

    let raw = feed::load_horizon_csv(dir.join("horizons.csv")).unwrap();
    assert!(matches!(
        feed::build_mapunits(&FeedTables {
            horizons: raw.clone(),
            ..Default::default()
        }),
        Err(ValuError::Validation(_))
    ));

    let feed_tables = FeedTables {
        horizons: feed::sort_horizon_feed(raw).unwrap(),
        restrictions: Some(feed::load_restriction_csv(dir.join("corestrictions.csv")).unwrap()),
        ..Default::default()
    };
    let config = ValuConfig::default();
    let report = ValuEngine::new(config.clone())
        .unwrap()
        .run_tables(&feed_tables)
        .unwrap();
    assert_eq!(report.component("co1").unwrap().rootznemc, Some(60.0));
    // minor components are outside the root-zone calculation
    assert_eq!(report.component("co2").unwrap().rootznemc, None);

    let mut mu_df = output::mapunit_frame(&report.mapunits, &config).unwrap();
    let mut co_df = output::component_frame(&report.components, &config).unwrap();
    output::write_frame(&mut mu_df, dir.join("valu1.csv")).unwrap();
    output::write_frame(&mut co_df, dir.join("valu1_component.parquet")).unwrap();

    let back = common::read_csv(&dir.join("valu1.csv"));
    assert_eq!(back.height(), 2);
    let keys = back.column("mukey").unwrap().cast(&polars::prelude::DataType::String).unwrap();
    let keys: Vec<Option<&str>> = keys.str().unwrap().into_iter().collect();
    assert_eq!(keys, vec![Some("mu1"), Some("mu2")]);
    assert!(back.column("rootznaws").is_ok());
}

#[test]
fn json_config_changes_bands_and_columns() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"depth_bands": [{{"top": 0, "bottom": 30}}], "summaries": []}}"#
    )
    .unwrap();
    let config = ValuConfig::from_json_file(file.path()).unwrap();
    let report = ValuEngine::new(config.clone())
        .unwrap()
        .run_tables(&tables(&[HorizonRow::default()]))
        .unwrap();

    let df = output::mapunit_frame(&report.mapunits, &config).unwrap();
    let value = df.column("aws0_30").unwrap().f64().unwrap().get(0);
    assert_eq!(value, Some(60.0));
    assert!(df.column("aws0_20").is_err());
    assert!(df.column("om0_100").is_err());
}
