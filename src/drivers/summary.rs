//! Depth-range summaries of single horizon properties (`om0_100`,
//! `ksat50_150`, ...).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::DriverContext;
use crate::aggregation::{overlap, rollup, ComponentTotals, MissingValue};
use crate::classify::round_to;
use crate::config::SummaryField;
use crate::error::ValuError;
use crate::soil::{Component, Horizon, MapUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizonProperty {
    OrganicMatter,
    BulkDensity,
    FragmentVolume,
    Ksat,
    Awc,
    Sand,
    Silt,
    Clay,
    Ph,
    Ec,
}

impl HorizonProperty {
    pub fn value(&self, horizon: &Horizon) -> Option<f64> {
        match self {
            HorizonProperty::OrganicMatter => horizon.organic_matter,
            HorizonProperty::BulkDensity => horizon.bulk_density,
            HorizonProperty::FragmentVolume => horizon.fragment_volume,
            HorizonProperty::Ksat => horizon.ksat,
            HorizonProperty::Awc => horizon.awc,
            HorizonProperty::Sand => horizon.sand,
            HorizonProperty::Silt => horizon.silt,
            HorizonProperty::Clay => horizon.clay,
            HorizonProperty::Ph => horizon.ph,
            HorizonProperty::Ec => horizon.ec,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryMethod {
    /// Component-percent weighted mean over components with data.
    #[default]
    WeightedAverage,
    /// Value of the first component, in feed order, with data in the range.
    DominantComponent,
}

/// Values per summary, aligned with `ValuConfig::summaries`.
#[derive(Debug, Default)]
pub struct SummaryResult {
    pub mapunits: HashMap<String, Vec<Option<f64>>>,
}

/// Thickness-weighted mean of `property` over `[top, bottom]`.
pub fn component_mean(
    component: &Component,
    property: HorizonProperty,
    top: f64,
    bottom: f64,
) -> Option<f64> {
    let mut totals = ComponentTotals::default();
    for horizon in &component.horizons {
        let Some((hz_top, hz_bottom)) = horizon.interval() else {
            continue;
        };
        let Some(value) = MissingValue::Skip.resolve(property.value(horizon)) else {
            continue;
        };
        let thickness = overlap(hz_top, hz_bottom, top, bottom);
        if thickness > 0.0 {
            totals.thickness += thickness;
            totals.value += thickness * value;
        }
    }
    totals.mean()
}

fn summarize(mapunit: &MapUnit, summary: &SummaryField) -> Option<f64> {
    let means = mapunit.components.iter().filter_map(|co| {
        component_mean(co, summary.property, summary.top, summary.bottom).map(|m| (co.pct(), m))
    });
    let value = match summary.method {
        SummaryMethod::DominantComponent => means.map(|(_, m)| m).next(),
        SummaryMethod::WeightedAverage => {
            let means: Vec<(f64, f64)> = means.collect();
            let denominator: f64 = means.iter().map(|(pct, _)| pct).sum();
            let entries = means.into_iter().map(|(pct, m)| {
                (
                    pct,
                    ComponentTotals {
                        thickness: 0.0,
                        value: m,
                    },
                )
            });
            rollup(entries, denominator).map(|t| t.value)
        }
    };
    value.map(|v| round_to(v, 2))
}

pub fn run(ctx: &DriverContext<'_>) -> Result<SummaryResult, ValuError> {
    let summaries = &ctx.config.summaries;
    let mut result = SummaryResult::default();
    for mapunit in ctx.mapunits {
        let values = summaries.iter().map(|s| summarize(mapunit, s)).collect();
        result.mapunits.insert(mapunit.key.clone(), values);
    }
    info!(
        fields = summaries.len(),
        mapunits = result.mapunits.len(),
        "horizon summaries computed"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{component, mapunit};

    fn om_horizon(top: f64, bottom: f64, om: Option<f64>) -> Horizon {
        Horizon {
            top: Some(top),
            bottom: Some(bottom),
            organic_matter: om,
            ..Default::default()
        }
    }

    fn om_summary(method: SummaryMethod) -> SummaryField {
        SummaryField {
            field: "om0_100".into(),
            property: HorizonProperty::OrganicMatter,
            top: 0.0,
            bottom: 100.0,
            method,
        }
    }

    #[test]
    fn component_mean_is_thickness_weighted() {
        let mut co = component("co1", 100.0, true, "Series");
        co.horizons = vec![
            om_horizon(0.0, 20.0, Some(4.0)),
            om_horizon(20.0, 60.0, Some(1.0)),
            om_horizon(60.0, 200.0, None),
        ];
        assert_eq!(
            component_mean(&co, HorizonProperty::OrganicMatter, 0.0, 100.0),
            Some(2.0)
        );
        assert_eq!(component_mean(&co, HorizonProperty::Ksat, 0.0, 100.0), None);
    }

    #[test]
    fn weighted_and_dominant_methods() {
        let mut a = component("co1", 60.0, true, "Series");
        a.horizons = vec![om_horizon(0.0, 100.0, Some(3.0))];
        let mut b = component("co2", 30.0, true, "Series");
        b.horizons = vec![om_horizon(0.0, 100.0, Some(1.5))];
        let c = component("co3", 10.0, false, "Series");
        let mu = mapunit("mu1", vec![a, b, c]);

        // co3 has no data and is left out of the denominator
        assert_eq!(summarize(&mu, &om_summary(SummaryMethod::WeightedAverage)), Some(2.5));
        assert_eq!(summarize(&mu, &om_summary(SummaryMethod::DominantComponent)), Some(3.0));
    }

    #[test]
    fn no_data_is_null() {
        let mu = mapunit("mu1", vec![component("co1", 100.0, true, "Series")]);
        assert_eq!(summarize(&mu, &om_summary(SummaryMethod::WeightedAverage)), None);
        assert_eq!(summarize(&mu, &om_summary(SummaryMethod::DominantComponent)), None);
    }

    #[test]
    fn method_names_deserialize() {
        let method: SummaryMethod = serde_json::from_str("\"dominant_component\"").unwrap();
        assert_eq!(method, SummaryMethod::DominantComponent);
        let property: HorizonProperty = serde_json::from_str("\"ksat\"").unwrap();
        assert_eq!(property, HorizonProperty::Ksat);
    }
}
