//! Available water storage per fixed depth band.

use tracing::info;

use super::{BandedResult, DriverContext};
use crate::aggregation::{overlap, rollup_mapunit, ComponentAccumulator, Denominator, MissingValue};
use crate::classify::round_to;
use crate::config::DepthBand;
use crate::error::ValuError;
use crate::soil::Component;

pub fn run(ctx: &DriverContext<'_>) -> Result<BandedResult, ValuError> {
    let bands = &ctx.config.depth_bands;
    let mut result = BandedResult::with_bands(ctx.mapunits, bands.len());

    for (index, band) in bands.iter().enumerate() {
        let accumulator = accumulate_band(ctx, band);
        info!(
            band = %band.field_name("aws"),
            components = accumulator.len(),
            "available water accumulated"
        );

        for mapunit in ctx.mapunits {
            for component in &mapunit.components {
                let value = accumulator.get(&component.key).map(|t| round_to(t.value, 2));
                result.set_component(&component.key, index, value);
            }
            let totals = rollup_mapunit(
                mapunit,
                &accumulator,
                ctx.percent_sums,
                Denominator::AllComponents,
                "aws",
            );
            result.set_mapunit(&mapunit.key, index, totals.map(|t| round_to(t.value, 0)));
        }
    }

    Ok(result)
}

fn has_horizon_data(component: &Component) -> bool {
    component.horizons.iter().any(|h| h.top.is_some())
}

fn accumulate_band(ctx: &DriverContext<'_>, band: &DepthBand) -> ComponentAccumulator {
    let mut accumulator = ComponentAccumulator::new();
    for component in ctx.mapunits.iter().flat_map(|mu| &mu.components) {
        if !has_horizon_data(component) {
            continue;
        }
        accumulator.ensure(&component.key);
        for horizon in &component.horizons {
            let Some((top, bottom)) = horizon.interval() else {
                continue;
            };
            let Some(awc) = MissingValue::Skip.resolve(horizon.awc) else {
                continue;
            };
            let thickness = overlap(top, bottom, band.top, band.bottom);
            if thickness > 0.0 {
                // cm/cm over cm of soil, reported in mm
                accumulator.add(&component.key, thickness, thickness * awc * 10.0);
            }
        }
    }
    accumulator
}
