//! # Cable Rates and Cost Estimation
//!
//! Prices a conductor configuration from a rate table of per-meter supply and
//! install rates plus a per-end termination cost.
//!
//! A configuration whose size/material has no rate is *unpriced*: it carries
//! an all-zero breakdown so the optimizer keeps running, but callers can tell
//! it apart from a genuinely free configuration via [`Pricing::is_priced`].
//!
//! ## Example
//!
//! ```rust
//! use cable_core::rates::{price, CableRate, RateTable};
//!
//! let rates = RateTable::new(vec![CableRate::new("95mm²", "Cu/PVC", 535.0, 95.0, 120.0)]);
//!
//! // "Copper" normalizes to the same material as "Cu/PVC"
//! let pricing = price("95mm²", "Copper", 40.0, 2, &rates);
//! let cost = pricing.breakdown();
//! assert_eq!(cost.supply, 535.0 * 40.0 * 2.0);
//! assert_eq!(cost.termination, 120.0 * 2.0 * 2.0);
//! ```

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::conductors::{conductor_table, normalize_material_label, parse_size_mm2, ConductorMaterial};

/// Each conductor run is terminated at both ends
const TERMINATIONS_PER_RUN: f64 = 2.0;

/// One rate entry for a cable size and type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableRate {
    /// Size label as it appears in the rate schedule (e.g., "95mm²")
    pub cable_size: String,
    /// Material / cable type label (e.g., "Cu/PVC", "Aluminium")
    pub material: String,
    /// Supply rate per meter of a single conductor run
    pub supply_rate_per_m: f64,
    /// Installation rate per meter of a single conductor run
    pub install_rate_per_m: f64,
    /// Cost of one termination (gland, lug, labour)
    #[serde(default)]
    pub termination_cost_per_end: f64,
}

impl CableRate {
    pub fn new(
        cable_size: impl Into<String>,
        material: impl Into<String>,
        supply_rate_per_m: f64,
        install_rate_per_m: f64,
        termination_cost_per_end: f64,
    ) -> Self {
        CableRate {
            cable_size: cable_size.into(),
            material: material.into(),
            supply_rate_per_m,
            install_rate_per_m,
            termination_cost_per_end,
        }
    }
}

/// Collection of cable rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    pub rates: Vec<CableRate>,
}

static REFERENCE_RATES: Lazy<RateTable> = Lazy::new(|| {
    let rates = ConductorMaterial::ALL
        .iter()
        .flat_map(|&material| {
            conductor_table(material).iter().map(move |c| {
                CableRate::new(c.size, material.symbol(), c.supply_cost_per_m, c.install_cost_per_m, 0.0)
            })
        })
        .collect();
    RateTable { rates }
});

impl RateTable {
    pub fn new(rates: Vec<CableRate>) -> Self {
        RateTable { rates }
    }

    /// Rates derived from the conductor reference tables (no termination cost).
    pub fn reference() -> &'static RateTable {
        &REFERENCE_RATES
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Find the rate for a size and material label.
    ///
    /// Exact (size, material) label match wins; otherwise sizes are compared
    /// by cross-section and materials by their normalized conductor.
    pub fn lookup(&self, size: &str, material: &str) -> Option<&CableRate> {
        if let Some(rate) = self
            .rates
            .iter()
            .find(|r| r.cable_size == size && r.material == material)
        {
            return Some(rate);
        }

        let wanted_mm2 = parse_size_mm2(size)?;
        let wanted_material = normalize_material_label(material)?;
        self.rates.iter().find(|r| {
            parse_size_mm2(&r.cable_size).is_some_and(|mm2| (mm2 - wanted_mm2).abs() < 1e-9)
                && normalize_material_label(&r.material) == Some(wanted_material)
        })
    }
}

/// Supply / install / termination cost of one configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub supply: f64,
    pub install: f64,
    pub termination: f64,
    pub total: f64,
}

impl CostBreakdown {
    pub fn new(supply: f64, install: f64, termination: f64) -> Self {
        CostBreakdown {
            supply,
            install,
            termination,
            total: supply + install + termination,
        }
    }
}

/// Outcome of pricing a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "cost", rename_all = "snake_case")]
pub enum Pricing {
    /// A rate was found
    Priced(CostBreakdown),
    /// No rate for this size/material
    Unpriced,
}

impl Pricing {
    /// Cost breakdown, all zero when unpriced
    pub fn breakdown(&self) -> CostBreakdown {
        match self {
            Pricing::Priced(cost) => *cost,
            Pricing::Unpriced => CostBreakdown::default(),
        }
    }

    pub fn is_priced(&self) -> bool {
        matches!(self, Pricing::Priced(_))
    }
}

/// Price a conductor configuration.
///
/// `supply = supply_rate × length × n`, `install = install_rate × length × n`,
/// `termination = per_end × 2 × n`.
pub fn price(size: &str, material: &str, length_m: f64, parallel_count: u32, rates: &RateTable) -> Pricing {
    let Some(rate) = rates.lookup(size, material) else {
        return Pricing::Unpriced;
    };
    let runs = f64::from(parallel_count);
    Pricing::Priced(CostBreakdown::new(
        rate.supply_rate_per_m * length_m * runs,
        rate.install_rate_per_m * length_m * runs,
        rate.termination_cost_per_end * TERMINATIONS_PER_RUN * runs,
    ))
}
