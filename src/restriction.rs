//! Restriction Resolver: the shallowest depth where root growth stops.

use tracing::debug;

use crate::config::{ChemistryNames, RootZoneConfig};
use crate::soil::{Component, RestrictionKind};

/// Effective floor for one component.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRestriction {
    pub depth: f64,
    /// Every restriction name recorded in the horizon that fixed the depth.
    /// Empty when nothing restricts above the floor.
    pub kinds: Vec<RestrictionKind>,
}

impl ResolvedRestriction {
    pub fn unrestricted(max_depth: f64) -> Self {
        Self {
            depth: max_depth,
            kinds: Vec::new(),
        }
    }

    /// Comma-joined names, `""` when unrestricted.
    pub fn names(&self) -> String {
        self.kinds
            .iter()
            .map(RestrictionKind::label)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Combines explicit restriction-table entries with horizon-derived
/// restrictions (dense layer, low pH, high EC).
pub struct RestrictionResolver<'a> {
    config: &'a RootZoneConfig,
}

impl<'a> RestrictionResolver<'a> {
    pub fn new(config: &'a RootZoneConfig) -> Self {
        Self { config }
    }

    /// Scan horizons top-down; the first horizon where anything fires fixes
    /// the depth. Horizons must be ordered by top depth. Horizons without a
    /// valid `[top, bottom)` interval never restrict.
    pub fn resolve(&self, component: &Component, max_depth: f64) -> ResolvedRestriction {
        let explicit =
            component.shallowest_restriction(&self.config.restriction_kinds, max_depth);
        let histic = component.is_histic();
        let tax_order = component.tax_order.as_deref();
        let tax_subgroup = component.tax_subgroup.as_deref();

        for horizon in &component.horizons {
            let Some((top, bottom)) = horizon.interval() else {
                continue;
            };
            if top >= max_depth {
                break;
            }

            let mut kinds: Vec<RestrictionKind> = Vec::new();
            let mut depth = None;

            if !horizon.is_organic(tax_order, tax_subgroup) {
                if horizon.is_dense() {
                    kinds.push(RestrictionKind::Dense);
                    depth = Some(top);
                }

                if !histic {
                    let low_ph = horizon.ph.is_some_and(|ph| ph <= self.config.ph_max);
                    let high_ec = horizon.ec.is_some_and(|ec| ec >= self.config.ec_min);
                    if low_ph {
                        kinds.push(RestrictionKind::Ph);
                        depth = Some(top);
                    }
                    if high_ec {
                        if low_ph && self.config.chemistry_names == ChemistryNames::LastWins {
                            kinds.retain(|k| *k != RestrictionKind::Ph);
                        }
                        kinds.push(RestrictionKind::Ec);
                        depth = Some(top);
                    }
                }
            }

            if let Some(r) = explicit {
                if top <= r.depth && r.depth < bottom {
                    if depth.is_none() {
                        depth = Some(r.depth);
                    }
                    kinds.push(r.kind);
                }
            }

            if let Some(depth) = depth {
                debug!(
                    cokey = %component.key,
                    depth,
                    kinds = ?kinds,
                    "restriction found"
                );
                return ResolvedRestriction {
                    depth: depth.clamp(0.0, max_depth),
                    kinds,
                };
            }
        }

        ResolvedRestriction::unrestricted(max_depth)
    }
}

/// Floor from explicit table entries only, used where horizon properties
/// do not restrict (SOC).
pub fn resolve_explicit(
    component: &Component,
    kinds: &[RestrictionKind],
    max_depth: f64,
) -> ResolvedRestriction {
    match component.shallowest_restriction(kinds, max_depth) {
        Some(r) => ResolvedRestriction {
            depth: r.depth.clamp(0.0, max_depth),
            kinds: vec![r.kind],
        },
        None => ResolvedRestriction::unrestricted(max_depth),
    }
}
