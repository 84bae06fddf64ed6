pub mod aggregation;
pub mod classify;
pub mod config;
pub mod drivers;
pub mod engine;
pub mod error;
pub mod feed;
pub mod output;
pub mod restriction;
pub mod schema;
pub mod soil;

#[cfg(feature = "python")]
mod python;
#[cfg(test)]
mod testutil;

pub use config::ValuConfig;
pub use engine::{init_logging, DriverFailure, ValuEngine, ValuReport};
pub use error::ValuError;
pub use feed::FeedTables;

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyModule;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Horizon feed
    let horizon = PyModule::new(m.py(), "horizon")?;
    horizon.add("MUKEY", schema::horizon::MUKEY)?;
    horizon.add("MUNAME", schema::horizon::MUNAME)?;
    horizon.add("COKEY", schema::horizon::COKEY)?;
    horizon.add("COMPNAME", schema::horizon::COMPNAME)?;
    horizon.add("COMPPCT", schema::horizon::COMPPCT)?;
    horizon.add("LOCALPHASE", schema::horizon::LOCALPHASE)?;
    horizon.add("OTHERPH", schema::horizon::OTHERPH)?;
    horizon.add("MAJCOMPFLAG", schema::horizon::MAJCOMPFLAG)?;
    horizon.add("COMPKIND", schema::horizon::COMPKIND)?;
    horizon.add("TAXORDER", schema::horizon::TAXORDER)?;
    horizon.add("TAXSUBGRP", schema::horizon::TAXSUBGRP)?;
    horizon.add("DRAINAGECL", schema::horizon::DRAINAGECL)?;
    horizon.add("HYDRICRATING", schema::horizon::HYDRICRATING)?;
    horizon.add("CHKEY", schema::horizon::CHKEY)?;
    horizon.add("DESGNMASTER", schema::horizon::DESGNMASTER)?;
    horizon.add("HZDEPT", schema::horizon::HZDEPT)?;
    horizon.add("HZDEPB", schema::horizon::HZDEPB)?;
    horizon.add("OM", schema::horizon::OM)?;
    horizon.add("AWC", schema::horizon::AWC)?;
    horizon.add("TEXTURE", schema::horizon::TEXTURE)?;
    horizon.add("LIEUTEX", schema::horizon::LIEUTEX)?;
    horizon.add("SAND", schema::horizon::SAND)?;
    horizon.add("SILT", schema::horizon::SILT)?;
    horizon.add("CLAY", schema::horizon::CLAY)?;
    horizon.add("DBTHIRDBAR", schema::horizon::DBTHIRDBAR)?;
    horizon.add("PH", schema::horizon::PH)?;
    horizon.add("EC", schema::horizon::EC)?;
    horizon.add("FRAGVOL", schema::horizon::FRAGVOL)?;
    horizon.add("KSAT", schema::horizon::KSAT)?;
    horizon.add("REQUIRED", schema::horizon::REQUIRED.to_vec())?;
    m.add_submodule(&horizon)?;

    // Restrictions
    let restriction = PyModule::new(m.py(), "restriction")?;
    restriction.add("COKEY", schema::restriction::COKEY)?;
    restriction.add("RESKIND", schema::restriction::RESKIND)?;
    restriction.add("RESDEPT", schema::restriction::RESDEPT)?;
    m.add_submodule(&restriction)?;

    // Interpretations
    let interp = PyModule::new(m.py(), "interp")?;
    interp.add("MUKEY", schema::interp::MUKEY)?;
    interp.add("COKEY", schema::interp::COKEY)?;
    interp.add("COMPPCT", schema::interp::COMPPCT)?;
    interp.add("RULEDEPTH", schema::interp::RULEDEPTH)?;
    interp.add("RULENAME", schema::interp::RULENAME)?;
    interp.add("INTERPHR", schema::interp::INTERPHR)?;
    interp.add("CORN_SOYBEANS_RULE", schema::interp::CORN_SOYBEANS_RULE)?;
    interp.add("SMALL_GRAINS_RULE", schema::interp::SMALL_GRAINS_RULE)?;
    m.add_submodule(&interp)?;

    // Fragments
    let fragment = PyModule::new(m.py(), "fragment")?;
    fragment.add("CHKEY", schema::fragment::CHKEY)?;
    fragment.add("FRAGVOL", schema::fragment::FRAGVOL)?;
    m.add_submodule(&fragment)?;

    // Map unit output
    let mapunit = PyModule::new(m.py(), "mapunit")?;
    mapunit.add("MUKEY", schema::mapunit::MUKEY)?;
    mapunit.add("PCTEARTHMC", schema::mapunit::PCTEARTHMC)?;
    mapunit.add("ROOTZNEMC", schema::mapunit::ROOTZNEMC)?;
    mapunit.add("ROOTZNAWS", schema::mapunit::ROOTZNAWS)?;
    mapunit.add("DROUGHTY", schema::mapunit::DROUGHTY)?;
    mapunit.add("NCCPI2CS", schema::mapunit::NCCPI2CS)?;
    mapunit.add("NCCPI2SG", schema::mapunit::NCCPI2SG)?;
    mapunit.add("PWSL1POMU", schema::mapunit::PWSL1POMU)?;
    mapunit.add("AWS_PREFIX", schema::mapunit::AWS_PREFIX)?;
    mapunit.add("SOC_PREFIX", schema::mapunit::SOC_PREFIX)?;
    m.add_submodule(&mapunit)?;

    // Component output
    let component = PyModule::new(m.py(), "component")?;
    component.add("MUKEY", schema::component::MUKEY)?;
    component.add("COKEY", schema::component::COKEY)?;
    component.add("COMPNAME", schema::component::COMPNAME)?;
    component.add("LOCALPHASE", schema::component::LOCALPHASE)?;
    component.add("COMPPCT", schema::component::COMPPCT)?;
    component.add("ROOTZNEMC", schema::component::ROOTZNEMC)?;
    component.add("ROOTZNAWS", schema::component::ROOTZNAWS)?;
    component.add("RESTRICTION", schema::component::RESTRICTION)?;
    component.add("PWSL1POMU", schema::component::PWSL1POMU)?;
    m.add_submodule(&component)?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::ValuModel>()?;
    m.add_function(wrap_pyfunction!(python::init_logging, m)?)?;
    add_schema_exports(m)?;
    Ok(())
}
