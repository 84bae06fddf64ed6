/// Column-name constants for the soil aggregation tables.
/// Single source of truth - exported to Python via PyO3.

/// Width of the fixed text key fields in the downstream table store.
pub const KEY_WIDTH: usize = 30;

// ── Horizon feed columns ────────────────────────────────────────────────────
pub mod horizon {
    pub const MUKEY: &str = "mukey";
    pub const MUNAME: &str = "muname";
    pub const COKEY: &str = "cokey";
    pub const COMPNAME: &str = "compname";
    pub const COMPPCT: &str = "comppct_r";
    pub const LOCALPHASE: &str = "localphase";
    pub const OTHERPH: &str = "otherph";
    pub const MAJCOMPFLAG: &str = "majcompflag";
    pub const COMPKIND: &str = "compkind";
    pub const TAXORDER: &str = "taxorder";
    pub const TAXSUBGRP: &str = "taxsubgrp";
    pub const DRAINAGECL: &str = "drainagecl";
    pub const HYDRICRATING: &str = "hydricrating";
    pub const CHKEY: &str = "chkey";
    pub const DESGNMASTER: &str = "desgnmaster";
    pub const HZDEPT: &str = "hzdept_r";
    pub const HZDEPB: &str = "hzdepb_r";
    pub const OM: &str = "om_r";
    pub const AWC: &str = "awc_r";
    pub const TEXTURE: &str = "texture";
    pub const LIEUTEX: &str = "lieutex";
    pub const SAND: &str = "sandtotal_r";
    pub const SILT: &str = "silttotal_r";
    pub const CLAY: &str = "claytotal_r";
    pub const DBTHIRDBAR: &str = "dbthirdbar_r";
    pub const PH: &str = "ph1to1h2o_r";
    pub const EC: &str = "ec_r";
    pub const FRAGVOL: &str = "fragvol";
    pub const KSAT: &str = "ksat_r";

    /// Columns every horizon feed must carry.
    pub const REQUIRED: [&str; 23] = [
        MUKEY, COKEY, COMPPCT, COMPNAME, LOCALPHASE, MAJCOMPFLAG, COMPKIND, TAXORDER, TAXSUBGRP,
        DESGNMASTER, OM, AWC, HZDEPT, HZDEPB, TEXTURE, LIEUTEX, SAND, SILT, CLAY, DBTHIRDBAR, PH,
        EC, FRAGVOL,
    ];

    /// Columns parsed to Float64 when the feed is loaded from text.
    pub const NUMERIC: [&str; 13] = [
        COMPPCT, HZDEPT, HZDEPB, OM, AWC, SAND, SILT, CLAY, DBTHIRDBAR, PH, EC, FRAGVOL, KSAT,
    ];
}

// ── Component restriction columns ───────────────────────────────────────────
pub mod restriction {
    pub const COKEY: &str = "cokey";
    pub const RESKIND: &str = "reskind";
    pub const RESDEPT: &str = "resdept_r";
}

// ── Interpretation (NCCPI) columns ──────────────────────────────────────────
pub mod interp {
    pub const MUKEY: &str = "mukey";
    pub const COKEY: &str = "cokey";
    pub const COMPPCT: &str = "comppct_r";
    pub const RULEDEPTH: &str = "ruledepth";
    pub const RULENAME: &str = "rulename";
    pub const INTERPHR: &str = "interphr";

    pub const CORN_SOYBEANS_RULE: &str = "NCCPI - NCCPI Corn and Soybeans Submodel (II)";
    pub const SMALL_GRAINS_RULE: &str = "NCCPI - NCCPI Small Grains Submodel (II)";
}

// ── Horizon fragment columns ────────────────────────────────────────────────
pub mod fragment {
    pub const CHKEY: &str = "chkey";
    pub const FRAGVOL: &str = "fragvol_r";
}

// ── Map unit output columns ─────────────────────────────────────────────────
pub mod mapunit {
    pub const MUKEY: &str = "mukey";
    pub const PCTEARTHMC: &str = "pctearthmc";
    pub const ROOTZNEMC: &str = "rootznemc";
    pub const ROOTZNAWS: &str = "rootznaws";
    pub const DROUGHTY: &str = "droughty";
    pub const NCCPI2CS: &str = "nccpi2cs";
    pub const NCCPI2SG: &str = "nccpi2sg";
    pub const PWSL1POMU: &str = "pwsl1pomu";

    /// Prefixes for per-depth-band fields, e.g. `aws0_20`.
    pub const AWS_PREFIX: &str = "aws";
    pub const SOC_PREFIX: &str = "soc";
}

// ── Component output columns ────────────────────────────────────────────────
pub mod component {
    pub const MUKEY: &str = "mukey";
    pub const COKEY: &str = "cokey";
    pub const COMPNAME: &str = "compname";
    pub const LOCALPHASE: &str = "localphase";
    pub const COMPPCT: &str = "comppct_r";
    pub const ROOTZNEMC: &str = "rootznemc";
    pub const ROOTZNAWS: &str = "rootznaws";
    pub const RESTRICTION: &str = "restriction";
    pub const PWSL1POMU: &str = "pwsl1pomu";
}
