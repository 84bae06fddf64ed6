//! Potential wetland soil landscapes: percent of the map unit made up of
//! hydric or water components.

use std::collections::HashMap;

use tracing::{debug, info};

use super::DriverContext;
use crate::classify::is_water_name;
use crate::error::ValuError;
use crate::soil::{Component, HydricRating, MapUnit};

/// Reported when a map unit is at least 80 percent open water.
pub const WATER_SENTINEL: f64 = 999.0;

const WATER_MIN_PCT: f64 = 80.0;

const WET_PHASE_TERMS: [&str; 6] = [
    "drained",
    "undrained",
    "channeled",
    "protected",
    "ponded",
    "flooded",
];

const WET_DRAINAGE_CLASSES: [&str; 2] = ["Poorly drained", "Very poorly drained"];

#[derive(Debug, Default)]
pub struct WetlandResult {
    pub mapunits: HashMap<String, Option<f64>>,
    pub components: HashMap<String, Option<f64>>,
}

/// How one component counts toward the map-unit total.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Contribution {
    OpenWater,
    Wetland(f64),
    None,
}

impl Contribution {
    fn value(self) -> f64 {
        match self {
            Contribution::OpenWater => WATER_SENTINEL,
            Contribution::Wetland(pct) => pct,
            Contribution::None => 0.0,
        }
    }
}

fn mentions_wet_phase(text: Option<&str>) -> bool {
    text.map(str::to_lowercase)
        .is_some_and(|t| WET_PHASE_TERMS.iter().any(|term| t.contains(term)))
}

fn unranked_counts(mapunit: &MapUnit, component: &Component) -> bool {
    mentions_wet_phase(component.local_phase.as_deref())
        || mentions_wet_phase(component.other_phase.as_deref())
        || mentions_wet_phase(mapunit.name.as_deref())
        || component
            .drainage_class
            .as_deref()
            .is_some_and(|d| WET_DRAINAGE_CLASSES.contains(&d.trim()))
}

fn classify(mapunit: &MapUnit, component: &Component) -> Contribution {
    let pct = component.pct();
    if pct <= 0.0 {
        return Contribution::None;
    }
    if is_water_name(mapunit.name.as_deref(), component.name.as_deref()) {
        return if pct >= WATER_MIN_PCT {
            Contribution::OpenWater
        } else {
            Contribution::Wetland(pct)
        };
    }
    match component.hydric {
        Some(HydricRating::Yes) => Contribution::Wetland(pct),
        Some(HydricRating::Unranked) if unranked_counts(mapunit, component) => {
            Contribution::Wetland(pct)
        }
        _ => Contribution::None,
    }
}

pub fn run(ctx: &DriverContext<'_>) -> Result<WetlandResult, ValuError> {
    let mut result = WetlandResult::default();
    let mut water_units = 0usize;

    for mapunit in ctx.mapunits {
        let mut total: Option<f64> = None;
        let mut open_water = false;

        for component in &mapunit.components {
            let contribution = classify(mapunit, component);
            result
                .components
                .insert(component.key.clone(), Some(contribution.value()));

            if component.pct() <= 0.0 {
                continue;
            }
            let sum = total.get_or_insert(0.0);
            match contribution {
                Contribution::OpenWater => open_water = true,
                Contribution::Wetland(pct) => *sum += pct,
                Contribution::None => {}
            }
        }

        if open_water {
            debug!(mukey = %mapunit.key, "open water map unit");
            water_units += 1;
            total = Some(WATER_SENTINEL);
        }
        result.mapunits.insert(mapunit.key.clone(), total);
    }

    info!(
        mapunits = result.mapunits.len(),
        water_units, "potential wetland classified"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::PercentSumIndex;
    use crate::config::ValuConfig;
    use crate::testutil::{component, mapunit};

    fn run_on(mapunits: &[MapUnit]) -> WetlandResult {
        let config = ValuConfig::default();
        let sums = PercentSumIndex::build(mapunits);
        let ctx = DriverContext {
            mapunits,
            percent_sums: &sums,
            config: &config,
        };
        run(&ctx).unwrap()
    }

    fn hydric(key: &str, pct: f64, rating: HydricRating) -> Component {
        let mut co = component(key, pct, true, "Series");
        co.hydric = Some(rating);
        co
    }

    #[test]
    fn hydric_percentages_are_summed() {
        let mut unranked = hydric("co3", 10.0, HydricRating::Unranked);
        unranked.local_phase = Some("Frequently Flooded".into());
        let mut dry_unranked = hydric("co4", 5.0, HydricRating::Unranked);
        dry_unranked.drainage_class = Some("Well drained".into());
        let mut poorly = hydric("co5", 5.0, HydricRating::Unranked);
        poorly.drainage_class = Some("Very poorly drained".into());
        let mu = mapunit(
            "mu1",
            vec![
                hydric("co1", 50.0, HydricRating::No),
                hydric("co2", 30.0, HydricRating::Yes),
                unranked,
                dry_unranked,
                poorly,
            ],
        );
        let result = run_on(&[mu]);
        assert_eq!(result.mapunits["mu1"], Some(45.0));
        assert_eq!(result.components["co1"], Some(0.0));
        assert_eq!(result.components["co3"], Some(10.0));
        assert_eq!(result.components["co4"], Some(0.0));
    }

    #[test]
    fn open_water_sentinel_is_sticky() {
        let mut water = component("co1", 85.0, true, "Miscellaneous area");
        water.name = Some("Water".into());
        let mu = mapunit(
            "mu1",
            vec![water, hydric("co2", 15.0, HydricRating::Yes)],
        );
        let result = run_on(&[mu]);
        assert_eq!(result.mapunits["mu1"], Some(WATER_SENTINEL));
        assert_eq!(result.components["co1"], Some(WATER_SENTINEL));
        assert_eq!(result.components["co2"], Some(15.0));
    }

    #[test]
    fn minor_water_counts_as_wetland() {
        let mut pond = component("co2", 20.0, false, "Miscellaneous area");
        pond.name = Some("Pits, water".into());
        let mu = mapunit(
            "mu1",
            vec![hydric("co1", 80.0, HydricRating::No), pond],
        );
        let result = run_on(&[mu]);
        assert_eq!(result.mapunits["mu1"], Some(20.0));
    }

    #[test]
    fn map_unit_without_percentages_is_null() {
        let mut co = hydric("co1", 0.0, HydricRating::Yes);
        co.percent = None;
        let result = run_on(&[mapunit("mu1", vec![co])]);
        assert_eq!(result.mapunits["mu1"], None);
        assert_eq!(result.components["co1"], Some(0.0));
    }

    #[test]
    fn upland_map_unit_reports_zero() {
        let result = run_on(&[mapunit("mu1", vec![hydric("co1", 100.0, HydricRating::No)])]);
        assert_eq!(result.mapunits["mu1"], Some(0.0));
    }
}
