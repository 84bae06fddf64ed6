//! Pure horizon and component classification rules.

/// Texture codes that mark organic material.
pub const ORGANIC_TEXTURES: [&str; 10] = [
    "CE", "COP-MAT", "HPM", "MPM", "MPT", "MUCK", "PDOM", "PEAT", "SPM", "UDOM",
];

/// In-lieu-of-texture descriptors that mark organic material.
pub const ORGANIC_LIEUTEX: [&str; 8] = [
    "Slightly decomposed plant material",
    "Moderately decomposed plant material",
    "Highly decomposed plant material",
    "Undecomposed plant material",
    "Muck",
    "Mucky peat",
    "Peat",
    "Coprogenous earth",
];

/// Histosols, or a taxonomic subgroup containing "histic".
pub fn is_histic(tax_order: Option<&str>, tax_subgroup: Option<&str>) -> bool {
    tax_order.map(str::trim) == Some("Histosols")
        || tax_subgroup
            .map(|s| s.to_lowercase().contains("histic"))
            .unwrap_or(false)
}

/// Decide whether a horizon is organic material.
///
/// The checks are an override chain and must stay in this order:
/// histic components are always mineral, then designation master O/L,
/// then the texture code, then the lieutex descriptor.
pub fn is_organic_horizon(
    desgn_master: Option<&str>,
    texture: Option<&str>,
    lieutex: Option<&str>,
    tax_order: Option<&str>,
    tax_subgroup: Option<&str>,
) -> bool {
    if is_histic(tax_order, tax_subgroup) {
        false
    } else if matches!(desgn_master.map(str::trim), Some("O") | Some("L")) {
        true
    } else if texture.is_some_and(|t| ORGANIC_TEXTURES.contains(&t.trim())) {
        true
    } else {
        lieutex.is_some_and(|l| ORGANIC_LIEUTEX.contains(&l.trim()))
    }
}

/// Bulk density above the texture-derived packing density.
///
/// A single missing particle-size fraction is derived from the other two.
/// Anything that cannot be evaluated returns `false`.
pub fn is_dense_layer(
    sand: Option<f64>,
    silt: Option<f64>,
    clay: Option<f64>,
    bulk_density: Option<f64>,
) -> bool {
    let Some(bd) = bulk_density else {
        return false;
    };

    let (sand, silt, clay) = match (sand, silt, clay) {
        (Some(sa), Some(si), Some(cl)) => (sa, si, cl),
        (None, Some(si), Some(cl)) => (100.0 - si - cl, si, cl),
        (Some(sa), None, Some(cl)) => (sa, 100.0 - sa - cl, cl),
        (Some(sa), Some(si), None) => (sa, si, 100.0 - sa - si),
        _ => return false,
    };

    if round_to(sand + silt + clay, 1) != 100.0 {
        return false;
    }

    let a = bd - (sand * 1.65 + silt * 1.30 + clay * 1.25) / 100.0;
    let b = sand * 0.002081 + silt * 0.003912 + clay * 0.0024351;
    a > b
}

/// Component or map-unit names that denote open water.
pub fn is_water_name(mapunit_name: Option<&str>, component_name: Option<&str>) -> bool {
    if mapunit_name.map(str::trim) == Some("Water") {
        return true;
    }
    let Some(name) = component_name.map(str::trim) else {
        return false;
    };
    let lower = name.to_lowercase();
    name == "Water"
        || name == "Swamp"
        || lower.contains(" water")
        || lower.contains(" ocean")
        || name.contains(" swamp")
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
