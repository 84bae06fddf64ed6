//! Depth clipping, per-component accumulation and map-unit rollup.

use std::collections::HashMap;

use tracing::warn;

use crate::soil::{Component, MapUnit};

/// Usable thickness of `[horizon_top, horizon_bottom]` inside
/// `[range_top, range_bottom]`. Never negative.
pub fn overlap(horizon_top: f64, horizon_bottom: f64, range_top: f64, range_bottom: f64) -> f64 {
    (horizon_bottom.min(range_bottom) - horizon_top.max(range_top)).max(0.0)
}

/// What to do with a horizon whose property value is null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingValue {
    /// Leave the horizon out of this calculation.
    Skip,
    /// Count its thickness with a value of zero.
    Zero,
}

impl MissingValue {
    pub fn resolve(self, value: Option<f64>) -> Option<f64> {
        match (value, self) {
            (Some(v), _) => Some(v),
            (None, MissingValue::Zero) => Some(0.0),
            (None, MissingValue::Skip) => None,
        }
    }
}

/// Running totals for one component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComponentTotals {
    pub thickness: f64,
    pub value: f64,
}

impl ComponentTotals {
    /// Thickness-weighted mean, `None` when nothing was accumulated.
    pub fn mean(&self) -> Option<f64> {
        (self.thickness > 0.0).then(|| self.value / self.thickness)
    }
}

/// Per-calculation accumulator keyed by component key. Keeps insertion
/// order so output follows the feed.
#[derive(Debug, Default)]
pub struct ComponentAccumulator {
    totals: HashMap<String, ComponentTotals>,
    order: Vec<String>,
}

impl ComponentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, cokey: &str) -> &mut ComponentTotals {
        if !self.totals.contains_key(cokey) {
            self.order.push(cokey.to_string());
        }
        self.totals.entry(cokey.to_string()).or_default()
    }

    /// Register a component with zero totals so the rollup still sees it.
    pub fn ensure(&mut self, cokey: &str) {
        self.entry(cokey);
    }

    pub fn add(&mut self, cokey: &str, thickness: f64, value: f64) {
        let totals = self.entry(cokey);
        totals.thickness += thickness;
        totals.value += value;
    }

    pub fn get(&self, cokey: &str) -> Option<ComponentTotals> {
        self.totals.get(cokey).copied()
    }

    pub fn contains(&self, cokey: &str) -> bool {
        self.totals.contains_key(cokey)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ComponentTotals)> + '_ {
        self.order
            .iter()
            .map(|k| (k.as_str(), self.totals.get(k).copied().unwrap_or_default()))
    }
}

/// Which component percentages form the map-unit denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denominator {
    AllComponents,
    MajorEarthy,
    Major,
    Earthy,
}

/// Sums of component percentages for one map unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PercentSums {
    pub all: f64,
    pub major_earthy: f64,
    pub major: f64,
    pub earthy: f64,
}

impl PercentSums {
    pub fn for_mapunit(mapunit: &MapUnit) -> Self {
        let mut sums = Self::default();
        for component in &mapunit.components {
            sums.add(component);
        }
        sums
    }

    fn add(&mut self, component: &Component) {
        let Some(pct) = component.percent else {
            return;
        };
        self.all += pct;
        if component.major {
            self.major += pct;
        }
        if component.is_earthy() {
            self.earthy += pct;
        }
        if component.is_major_earthy() {
            self.major_earthy += pct;
        }
    }

    pub fn get(&self, denominator: Denominator) -> f64 {
        match denominator {
            Denominator::AllComponents => self.all,
            Denominator::MajorEarthy => self.major_earthy,
            Denominator::Major => self.major,
            Denominator::Earthy => self.earthy,
        }
    }
}

/// Percent sums for every map unit, computed once per run and shared
/// read-only by the drivers.
#[derive(Debug, Default)]
pub struct PercentSumIndex {
    sums: HashMap<String, PercentSums>,
}

impl PercentSumIndex {
    pub fn build(mapunits: &[MapUnit]) -> Self {
        let sums = mapunits
            .iter()
            .map(|mu| (mu.key.clone(), PercentSums::for_mapunit(mu)))
            .collect();
        Self { sums }
    }

    pub fn get(&self, mukey: &str) -> Option<PercentSums> {
        self.sums.get(mukey).copied()
    }

    /// Denominator for one map unit; zero when the map unit is unknown.
    pub fn denominator(&self, mukey: &str, denominator: Denominator) -> f64 {
        self.get(mukey).map(|s| s.get(denominator)).unwrap_or(0.0)
    }
}

/// Weight component totals by `percent / denominator` and sum them.
///
/// Returns `None` when the denominator is not positive or no component
/// contributed, so callers can tell "no data" from a real zero.
pub fn rollup<I>(entries: I, denominator: f64) -> Option<ComponentTotals>
where
    I: IntoIterator<Item = (f64, ComponentTotals)>,
{
    if denominator <= 0.0 {
        return None;
    }
    let mut result: Option<ComponentTotals> = None;
    for (percent, totals) in entries {
        let share = percent / denominator;
        let acc = result.get_or_insert_with(ComponentTotals::default);
        acc.thickness += totals.thickness * share;
        acc.value += totals.value * share;
    }
    result
}

/// Roll up the accumulated components of one map unit.
pub fn rollup_mapunit(
    mapunit: &MapUnit,
    accumulator: &ComponentAccumulator,
    percent_sums: &PercentSumIndex,
    denominator: Denominator,
    calculation: &str,
) -> Option<ComponentTotals> {
    let denom = percent_sums.denominator(&mapunit.key, denominator);
    let entries = mapunit
        .components
        .iter()
        .filter_map(|co| accumulator.get(&co.key).map(|t| (co.pct(), t)));
    let result = rollup(entries, denom);
    if result.is_none() && denom <= 0.0 {
        warn!(
            mukey = %mapunit.key,
            calculation,
            ?denominator,
            "zero component percent denominator, map unit value left null"
        );
    }
    result
}
