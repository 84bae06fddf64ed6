//! Typed records for the map unit → component → horizon hierarchy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify;

/// Component kind sentinel for non-soil areas (water, pavement, rock outcrop).
pub const MISCELLANEOUS_AREA: &str = "Miscellaneous area";

/// A delineated soil map unit. Owns its components in feed order
/// (component percent descending).
#[derive(Debug, Clone, Default)]
pub struct MapUnit {
    pub key: String,
    pub name: Option<String>,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Default)]
pub struct Component {
    pub key: String,
    pub mapunit_key: String,
    pub name: Option<String>,
    pub percent: Option<f64>,
    pub major: bool,
    pub kind: Option<String>,
    pub tax_order: Option<String>,
    pub tax_subgroup: Option<String>,
    pub local_phase: Option<String>,
    pub other_phase: Option<String>,
    pub drainage_class: Option<String>,
    pub hydric: Option<HydricRating>,
    /// Horizons ordered by top depth.
    pub horizons: Vec<Horizon>,
    pub restrictions: Vec<Restriction>,
    pub nccpi: Option<NccpiRatings>,
}

impl Component {
    /// Percentage of the map unit, treating a missing value as zero.
    pub fn pct(&self) -> f64 {
        self.percent.unwrap_or(0.0)
    }

    /// Not a "Miscellaneous area" and has a component kind at all.
    pub fn is_earthy(&self) -> bool {
        match self.kind.as_deref().map(str::trim) {
            Some(kind) => !kind.is_empty() && kind != MISCELLANEOUS_AREA,
            None => false,
        }
    }

    pub fn is_major_earthy(&self) -> bool {
        self.major && self.is_earthy()
    }

    pub fn is_histic(&self) -> bool {
        classify::is_histic(self.tax_order.as_deref(), self.tax_subgroup.as_deref())
    }

    /// Shallowest explicit restriction of one of `kinds` above `max_depth`.
    pub fn shallowest_restriction(
        &self,
        kinds: &[RestrictionKind],
        max_depth: f64,
    ) -> Option<Restriction> {
        self.restrictions
            .iter()
            .filter(|r| kinds.contains(&r.kind) && r.depth < max_depth)
            .min_by(|a, b| a.depth.total_cmp(&b.depth))
            .copied()
    }
}

/// One soil layer. Depths are centimeters.
#[derive(Debug, Clone, Default)]
pub struct Horizon {
    pub key: Option<String>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub desgn_master: Option<String>,
    pub organic_matter: Option<f64>,
    pub bulk_density: Option<f64>,
    pub ph: Option<f64>,
    pub ec: Option<f64>,
    pub sand: Option<f64>,
    pub silt: Option<f64>,
    pub clay: Option<f64>,
    /// Available water capacity, cm/cm.
    pub awc: Option<f64>,
    pub texture: Option<String>,
    pub lieutex: Option<String>,
    /// Rock fragments, percent by volume (0-100).
    pub fragment_volume: Option<f64>,
    pub ksat: Option<f64>,
}

impl Horizon {
    /// The `[top, bottom]` interval, or `None` when either depth is missing
    /// or the interval is empty.
    pub fn interval(&self) -> Option<(f64, f64)> {
        match (self.top, self.bottom) {
            (Some(top), Some(bottom)) if top < bottom => Some((top, bottom)),
            _ => None,
        }
    }

    pub fn is_organic(&self, tax_order: Option<&str>, tax_subgroup: Option<&str>) -> bool {
        classify::is_organic_horizon(
            self.desgn_master.as_deref(),
            self.texture.as_deref(),
            self.lieutex.as_deref(),
            tax_order,
            tax_subgroup,
        )
    }

    pub fn is_dense(&self) -> bool {
        classify::is_dense_layer(self.sand, self.silt, self.clay, self.bulk_density)
    }
}

/// Tri-state hydric soil rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HydricRating {
    Yes,
    No,
    Unranked,
}

impl HydricRating {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            "unranked" => Some(Self::Unranked),
            _ => None,
        }
    }
}

/// Root-limiting layer kinds. The first seven come from the component
/// restriction table, the rest are derived from horizon properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RestrictionKind {
    #[serde(rename = "Lithic bedrock")]
    LithicBedrock,
    #[serde(rename = "Paralithic bedrock")]
    ParalithicBedrock,
    #[serde(rename = "Densic bedrock")]
    DensicBedrock,
    #[serde(rename = "Densic material")]
    DensicMaterial,
    Fragipan,
    Duripan,
    Sulfuric,
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "EC")]
    Ec,
    Dense,
}

impl RestrictionKind {
    pub const ROOT_ZONE: [RestrictionKind; 7] = [
        RestrictionKind::LithicBedrock,
        RestrictionKind::ParalithicBedrock,
        RestrictionKind::DensicBedrock,
        RestrictionKind::DensicMaterial,
        RestrictionKind::Fragipan,
        RestrictionKind::Duripan,
        RestrictionKind::Sulfuric,
    ];

    pub const BEDROCK: [RestrictionKind; 3] = [
        RestrictionKind::LithicBedrock,
        RestrictionKind::ParalithicBedrock,
        RestrictionKind::DensicBedrock,
    ];

    /// Parse a `reskind` value from the restriction table. Kinds this
    /// system does not use (Ortstein, Placic, ...) yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Lithic bedrock" => Some(Self::LithicBedrock),
            "Paralithic bedrock" => Some(Self::ParalithicBedrock),
            "Densic bedrock" => Some(Self::DensicBedrock),
            "Densic material" => Some(Self::DensicMaterial),
            "Fragipan" => Some(Self::Fragipan),
            "Duripan" => Some(Self::Duripan),
            "Sulfuric" => Some(Self::Sulfuric),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::LithicBedrock => "Lithic bedrock",
            Self::ParalithicBedrock => "Paralithic bedrock",
            Self::DensicBedrock => "Densic bedrock",
            Self::DensicMaterial => "Densic material",
            Self::Fragipan => "Fragipan",
            Self::Duripan => "Duripan",
            Self::Sulfuric => "Sulfuric",
            Self::Ph => "pH",
            Self::Ec => "EC",
            Self::Dense => "Dense",
        }
    }
}

impl fmt::Display for RestrictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An explicit restriction-table entry: the depth (cm) where it starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Restriction {
    pub kind: RestrictionKind,
    pub depth: f64,
}

/// NCCPI fuzzy ratings (0-1) for one component.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NccpiRatings {
    pub corn_soybeans: Option<f64>,
    pub small_grains: Option<f64>,
}
