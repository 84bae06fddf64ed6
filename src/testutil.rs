//! Builders shared by the unit tests.

use crate::soil::{Component, Horizon, MapUnit};

pub(crate) fn mapunit(key: &str, mut components: Vec<Component>) -> MapUnit {
    for co in &mut components {
        co.mapunit_key = key.to_string();
    }
    MapUnit {
        key: key.to_string(),
        name: None,
        components,
    }
}

pub(crate) fn component(key: &str, pct: f64, major: bool, kind: &str) -> Component {
    Component {
        key: key.to_string(),
        name: Some(format!("Soil {key}")),
        percent: Some(pct),
        major,
        kind: Some(kind.to_string()),
        tax_order: Some("Mollisols".into()),
        ..Default::default()
    }
}

/// Mineral horizon with only depths and AWC set.
pub(crate) fn horizon(top: f64, bottom: f64, awc: f64) -> Horizon {
    Horizon {
        top: Some(top),
        bottom: Some(bottom),
        desgn_master: Some("B".into()),
        awc: Some(awc),
        ..Default::default()
    }
}
