//! Root-zone available water storage, effective rooting depth and the
//! droughty flag. Major-earthy components only.

use std::collections::HashMap;

use tracing::{debug, info};

use super::DriverContext;
use crate::aggregation::{rollup_mapunit, ComponentAccumulator, Denominator, MissingValue};
use crate::classify::round_to;
use crate::error::ValuError;
use crate::restriction::{ResolvedRestriction, RestrictionResolver};
use crate::soil::Component;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootZoneComponent {
    /// Usable root-zone thickness, cm.
    pub depth: Option<f64>,
    /// Root-zone AWS, mm.
    pub aws: Option<f64>,
    pub restriction: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RootZoneMapUnit {
    /// Sum of major-earthy component percentages.
    pub pctearthmc: f64,
    pub depth: Option<f64>,
    pub aws: Option<f64>,
    pub droughty: Option<u8>,
}

#[derive(Debug, Default)]
pub struct RootZoneResult {
    pub mapunits: HashMap<String, RootZoneMapUnit>,
    pub components: HashMap<String, RootZoneComponent>,
}

/// 1 when AWS is below the threshold, 0 otherwise; no AWS, no flag.
pub fn droughty_flag(aws: Option<f64>, threshold_mm: f64) -> Option<u8> {
    aws.map(|v| u8::from(v < threshold_mm))
}

pub fn run(ctx: &DriverContext<'_>) -> Result<RootZoneResult, ValuError> {
    let config = &ctx.config.root_zone;
    let max_depth = config.max_depth;
    let resolver = RestrictionResolver::new(config);

    let mut accumulator = ComponentAccumulator::new();
    let mut restrictions: HashMap<&str, ResolvedRestriction> = HashMap::new();

    for mapunit in ctx.mapunits {
        for component in &mapunit.components {
            if !component.is_major_earthy() {
                continue;
            }
            let resolved = resolver.resolve(component, max_depth);
            accumulator.ensure(&component.key);
            accumulate_component(component, &resolved, max_depth, &mut accumulator);
            restrictions.insert(component.key.as_str(), resolved);
        }
    }

    info!(
        components = accumulator.len(),
        max_depth, "root zone accumulated"
    );

    let mut result = RootZoneResult::default();
    for mapunit in ctx.mapunits {
        let pctearthmc = ctx
            .percent_sums
            .denominator(&mapunit.key, Denominator::MajorEarthy);

        for component in &mapunit.components {
            let record = match (
                accumulator.get(&component.key),
                restrictions.get(component.key.as_str()),
            ) {
                (Some(totals), Some(resolved)) => RootZoneComponent {
                    depth: Some(round_to(totals.thickness, 1)),
                    aws: Some(round_to(totals.value, 2)),
                    restriction: resolved.names(),
                },
                _ => RootZoneComponent::default(),
            };
            result.components.insert(component.key.clone(), record);
        }

        let totals = rollup_mapunit(
            mapunit,
            &accumulator,
            ctx.percent_sums,
            Denominator::MajorEarthy,
            "rootzone",
        );
        let record = match totals {
            Some(t) => RootZoneMapUnit {
                pctearthmc,
                // Overlapping horizons can push the weighted depth past the floor.
                depth: Some(round_to(t.thickness.min(max_depth), 0)),
                aws: Some(round_to(t.value, 0)),
                droughty: droughty_flag(Some(t.value), config.droughty_threshold_mm),
            },
            None => RootZoneMapUnit {
                pctearthmc,
                ..Default::default()
            },
        };
        result.mapunits.insert(mapunit.key.clone(), record);
    }

    Ok(result)
}

/// Surface organic horizons are skipped until the first mineral horizon;
/// buried organic layers count. Missing AWC counts as zero.
fn accumulate_component(
    component: &Component,
    resolved: &ResolvedRestriction,
    max_depth: f64,
    accumulator: &mut ComponentAccumulator,
) {
    let tax_order = component.tax_order.as_deref();
    let tax_subgroup = component.tax_subgroup.as_deref();
    let mut at_surface = true;

    for horizon in &component.horizons {
        let Some((top, bottom)) = horizon.interval() else {
            continue;
        };
        if at_surface && horizon.is_organic(tax_order, tax_subgroup) {
            debug!(cokey = %component.key, top, "skipping surface organic horizon");
            continue;
        }
        at_surface = false;

        let floor = resolved.depth.min(bottom).min(max_depth);
        if top >= floor {
            continue;
        }
        let thickness = floor - top;
        let awc = MissingValue::Zero
            .resolve(horizon.awc.map(|v| round_to(v, 2)))
            .unwrap_or(0.0);
        accumulator.add(&component.key, thickness, thickness * awc * 10.0);
    }
}
