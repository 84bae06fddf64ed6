//! National Commodity Crop Productivity Index, corn/soybeans and small
//! grains submodels.

use std::collections::HashMap;

use tracing::info;

use super::DriverContext;
use crate::aggregation::{rollup_mapunit, ComponentAccumulator, Denominator};
use crate::classify::round_to;
use crate::error::ValuError;
use crate::soil::NccpiRatings;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NccpiMapUnit {
    pub corn_soybeans: Option<f64>,
    pub small_grains: Option<f64>,
}

#[derive(Debug, Default)]
pub struct NccpiResult {
    pub mapunits: HashMap<String, NccpiMapUnit>,
}

pub fn run(ctx: &DriverContext<'_>) -> Result<NccpiResult, ValuError> {
    let components = || ctx.mapunits.iter().flat_map(|mu| &mu.components);
    if components().all(|co| co.nccpi.is_none()) {
        return Err(ValuError::NotLoaded(
            "interpretation table with NCCPI ratings".into(),
        ));
    }

    let submodel = |pick: fn(&NccpiRatings) -> Option<f64>| {
        let mut accumulator = ComponentAccumulator::new();
        for component in components().filter(|co| co.major) {
            if let Some(rating) = component.nccpi.as_ref().and_then(pick) {
                accumulator.add(&component.key, 0.0, rating);
            }
        }
        accumulator
    };
    let corn_soybeans = submodel(|r| r.corn_soybeans);
    let small_grains = submodel(|r| r.small_grains);
    info!(
        corn_soybeans = corn_soybeans.len(),
        small_grains = small_grains.len(),
        "nccpi ratings collected"
    );

    let mut result = NccpiResult::default();
    for mapunit in ctx.mapunits {
        let rate = |accumulator: &ComponentAccumulator, calculation: &str| {
            rollup_mapunit(
                mapunit,
                accumulator,
                ctx.percent_sums,
                Denominator::MajorEarthy,
                calculation,
            )
            .map(|t| round_to(t.value, 3))
        };
        result.mapunits.insert(
            mapunit.key.clone(),
            NccpiMapUnit {
                corn_soybeans: rate(&corn_soybeans, "nccpi2cs"),
                small_grains: rate(&small_grains, "nccpi2sg"),
            },
        );
    }
    Ok(result)
}
