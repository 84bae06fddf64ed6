//! Soil organic carbon per depth band, clipped at bedrock.

use tracing::{debug, info};

use super::{BandedResult, DriverContext};
use crate::aggregation::{overlap, rollup_mapunit, ComponentAccumulator, Denominator, MissingValue};
use crate::classify::round_to;
use crate::config::DepthBand;
use crate::error::ValuError;
use crate::restriction::resolve_explicit;

/// Van Bemmelen factor, organic matter to organic carbon.
pub const OM_TO_CARBON: f64 = 1.724;

/// Organic carbon of one horizon slice in g/m².
///
/// `organic_matter` and `fragment_volume` are percents, `bulk_density`
/// is g/cm³ at 1/3 bar and `thickness` is cm.
pub fn horizon_carbon_density(
    thickness: f64,
    organic_matter: f64,
    bulk_density: f64,
    fragment_volume: f64,
) -> f64 {
    thickness * (organic_matter / OM_TO_CARBON) * bulk_density / 100.0
        * (1.0 - fragment_volume / 100.0)
        * 10_000.0
}

/// Carbon density of a horizon slice scaled by the component's share of
/// the map unit: `thickness * (om / 1.724) * bd / 100 * (1 - frag / 100) * pct * 100`.
pub fn weighted_horizon_soc(
    thickness: f64,
    organic_matter: f64,
    bulk_density: f64,
    fragment_volume: f64,
    component_pct: f64,
) -> f64 {
    horizon_carbon_density(thickness, organic_matter, bulk_density, fragment_volume)
        * component_pct
        / 100.0
}

pub fn run(ctx: &DriverContext<'_>) -> Result<BandedResult, ValuError> {
    let bands = &ctx.config.depth_bands;
    let mut result = BandedResult::with_bands(ctx.mapunits, bands.len());

    for (index, band) in bands.iter().enumerate() {
        let carbon = accumulate_band(ctx, band);
        info!(
            band = %band.field_name("soc"),
            components = carbon.density.len(),
            "organic carbon accumulated"
        );

        for mapunit in ctx.mapunits {
            for component in &mapunit.components {
                let value = carbon
                    .weighted
                    .get(&component.key)
                    .map(|t| round_to(t.value, 2));
                result.set_component(&component.key, index, value);
            }
            let totals = rollup_mapunit(
                mapunit,
                &carbon.density,
                ctx.percent_sums,
                Denominator::AllComponents,
                "soc",
            );
            result.set_mapunit(&mapunit.key, index, totals.map(|t| round_to(t.value, 0)));
        }
    }

    Ok(result)
}

/// Per-band carbon totals: unscaled density for the map-unit rollup,
/// percent-scaled SOC for the component output.
struct BandCarbon {
    density: ComponentAccumulator,
    weighted: ComponentAccumulator,
}

fn accumulate_band(ctx: &DriverContext<'_>, band: &DepthBand) -> BandCarbon {
    let soc = &ctx.config.soc;
    let mut carbon = BandCarbon {
        density: ComponentAccumulator::new(),
        weighted: ComponentAccumulator::new(),
    };

    for component in ctx.mapunits.iter().flat_map(|mu| &mu.components) {
        if !component.horizons.iter().any(|h| h.top.is_some()) {
            continue;
        }
        carbon.density.ensure(&component.key);
        carbon.weighted.ensure(&component.key);

        let floor = resolve_explicit(component, &soc.restriction_kinds, soc.max_depth).depth;
        let range_bottom = band.bottom.min(floor);
        if range_bottom <= band.top {
            debug!(cokey = %component.key, floor, "band below bedrock");
            continue;
        }

        for horizon in &component.horizons {
            let Some((top, bottom)) = horizon.interval() else {
                continue;
            };
            let (Some(om), Some(bd)) = (
                MissingValue::Skip.resolve(horizon.organic_matter),
                MissingValue::Skip.resolve(horizon.bulk_density),
            ) else {
                continue;
            };
            let om = round_to(om, 3);
            let frag = MissingValue::Zero
                .resolve(horizon.fragment_volume)
                .unwrap_or(0.0);
            let thickness = overlap(top, bottom, band.top, range_bottom);
            if thickness > 0.0 {
                let density = horizon_carbon_density(thickness, om, bd, frag);
                let weighted = weighted_horizon_soc(thickness, om, bd, frag, component.pct());
                carbon.density.add(&component.key, thickness, density);
                carbon.weighted.add(&component.key, thickness, weighted);
            }
        }
    }
    carbon
}
