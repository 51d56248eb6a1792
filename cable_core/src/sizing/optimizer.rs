//! # Parallel-Configuration Optimizer
//!
//! Searches a bounded window of parallel conductor counts for compliant,
//! cost-minimal configurations.
//!
//! ## Search Window
//!
//! ```text
//! n_min = max(1, ⌈Ib / I_max⌉)
//! n_max = min(⌈Ib / I_pref⌉ + 2, 8)
//! ```
//!
//! For each `n` the per-conductor current is sized against the grouping
//! factor for `n`, upsized for voltage drop, checked for compliance and priced.
//! Survivors are ranked by total cost; the cheapest is recommended.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conductors::{conductor_table, find_conductor, ConductorSpec};
use crate::errors::{CalcError, CalcResult};
use crate::rates::{price, CostBreakdown, RateTable};

use super::compliance::{check_compliance, ComplianceReport};
use super::selection::{ensure_acceptable_drop, select_cable, Selection};
use super::voltage_drop::voltage_drop;
use super::SizingRequest;

/// Upper bound on conductors per phase
pub const MAX_PARALLEL_CONDUCTORS: u32 = 8;

/// Alternatives costing up to this fraction more than the incumbent are kept
pub const RETENTION_TOLERANCE: f64 = 0.05;

/// A conductor configuration with its cost and compliance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub size: String,
    pub size_mm2: f64,
    pub cables_in_parallel: u32,
    /// Current carried by each conductor (A)
    pub load_per_cable: f64,
    pub grouping_factor: f64,
    /// Derated capacity of one conductor (A)
    pub derated_capacity: f64,
    pub cost: CostBreakdown,
    /// False when no rate was found; `cost` is then all zero
    pub priced: bool,
    /// Voltage drop, rounded to 2 dp
    pub volt_drop_percent: f64,
    pub compliance: ComplianceReport,
    pub compliance_report: String,
    pub is_recommended: bool,
    pub is_incumbent: bool,
}

/// The installed configuration an optimization is compared against.
#[derive(Debug, Clone, Copy)]
pub struct Incumbent {
    pub conductor: &'static ConductorSpec,
    pub cables_in_parallel: u32,
}

impl Incumbent {
    /// Resolve an installed size label against the request's material table.
    pub fn resolve(request: &SizingRequest, size: &str, cables_in_parallel: u32) -> CalcResult<Self> {
        if cables_in_parallel == 0 {
            return Err(CalcError::invalid_input(
                "cables_in_parallel",
                "0",
                "At least one conductor is required",
            ));
        }
        Ok(Incumbent {
            conductor: find_conductor(request.material, size)?,
            cables_in_parallel,
        })
    }

    fn matches(&self, alt: &Alternative) -> bool {
        alt.size == self.conductor.size && alt.cables_in_parallel == self.cables_in_parallel
    }
}

/// Ranked output of the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternatives {
    /// Priced first, then ascending by total cost; exactly one is recommended
    pub alternatives: Vec<Alternative>,
    /// Most expensive priced alternative minus the recommended one
    pub cost_savings: f64,
    pub min_parallel: u32,
    pub max_parallel: u32,
}

impl RankedAlternatives {
    pub fn recommended(&self) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.is_recommended)
    }

    pub fn incumbent(&self) -> Option<&Alternative> {
        self.alternatives.iter().find(|a| a.is_incumbent)
    }
}

/// Per-conductor current limits `(max, preferred)` for a request.
///
/// Without an explicit maximum the largest table rating for the installation
/// method is used. The preferred value never exceeds the maximum.
pub fn per_conductor_limits(request: &SizingRequest) -> (f64, f64) {
    let max = request.max_amps_per_cable.unwrap_or_else(|| {
        conductor_table(request.material)
            .last()
            .map(|c| c.ampacity_for(request.installation_method))
            .unwrap_or(f64::INFINITY)
    });
    let preferred = request.preferred_amps_per_cable.unwrap_or(max).min(max);
    (max, preferred)
}

/// Inclusive window of parallel counts to evaluate.
pub fn parallel_window(request: &SizingRequest) -> (u32, u32) {
    let (max, preferred) = per_conductor_limits(request);
    let lower = (request.load_amps / max).ceil().max(1.0);
    let upper = ((request.load_amps / preferred).ceil() + 2.0).min(f64::from(MAX_PARALLEL_CONDUCTORS));
    (lower.min(f64::from(u32::MAX)) as u32, upper.max(0.0) as u32)
}

/// Compliance-check and price a fixed configuration.
pub fn evaluate_configuration(
    conductor: &'static ConductorSpec,
    parallel_count: u32,
    request: &SizingRequest,
    rates: &RateTable,
) -> Alternative {
    let runs = f64::from(parallel_count);
    let load_per_cable = request.load_amps / runs;
    let grouping_factor = request.grouping.factor(parallel_count);
    let compliance = check_compliance(conductor, parallel_count, request);
    let pricing = price(
        conductor.size,
        request.rate_material_label(),
        request.length_m,
        parallel_count,
        rates,
    );
    if !pricing.is_priced() {
        warn!(
            size = conductor.size,
            material = request.rate_material_label(),
            "no rate found; configuration left unpriced"
        );
    }
    let drop = voltage_drop(load_per_cable, request.voltage, request.length_m, conductor);

    Alternative {
        size: conductor.size.to_string(),
        size_mm2: conductor.size_mm2,
        cables_in_parallel: parallel_count,
        load_per_cable,
        grouping_factor,
        derated_capacity: conductor.ampacity_for(request.installation_method)
            * grouping_factor
            * request.derating_factor,
        cost: pricing.breakdown(),
        priced: pricing.is_priced(),
        volt_drop_percent: drop.percent_display(),
        compliance_report: compliance.summary(),
        compliance,
        is_recommended: false,
        is_incumbent: false,
    }
}

/// Search the parallel window for compliant configurations.
///
/// With an incumbent, only alternatives that are the incumbent itself or cost
/// at most [`RETENTION_TOLERANCE`] more than it are retained. A non-compliant
/// or unpriced incumbent imposes no cost ceiling.
///
/// Returns [`CalcError::NoViableConfiguration`] when nothing in the window is
/// compliant.
pub fn optimize(
    request: &SizingRequest,
    rates: &RateTable,
    incumbent: Option<&Incumbent>,
) -> CalcResult<RankedAlternatives> {
    request.validate()?;

    let (max_per_cable, _) = per_conductor_limits(request);
    let (min_parallel, max_parallel) = parallel_window(request);
    let limit = request.drop_limit();

    let mut candidates: Vec<Alternative> = Vec::new();
    for n in min_parallel..=max_parallel {
        let load_per_cable = request.load_amps / f64::from(n);
        if load_per_cable > max_per_cable {
            debug!(n, load_per_cable, max_per_cable, "skipped: above per-conductor maximum");
            continue;
        }

        let required = load_per_cable * request.safety_margin / (request.derating_factor * request.grouping.factor(n));
        let selected = match select_cable(required, request.installation_method, request.material)? {
            Selection::Adequate(conductor) => conductor,
            Selection::Insufficient(_) => {
                debug!(n, required, "skipped: no conductor rated for required current");
                continue;
            }
        };
        let conductor = ensure_acceptable_drop(
            selected,
            request.material,
            load_per_cable,
            request.voltage,
            request.length_m,
            limit,
        );

        let alternative = evaluate_configuration(conductor, n, request, rates);
        if !alternative.compliance.is_compliant() {
            debug!(n, size = conductor.size, report = %alternative.compliance_report, "skipped: non-compliant");
            continue;
        }
        debug!(n, size = conductor.size, total = alternative.cost.total, "candidate");
        candidates.push(alternative);
    }

    let ceiling = match incumbent {
        Some(current) => {
            let mut installed = evaluate_configuration(current.conductor, current.cables_in_parallel, request, rates);
            installed.is_incumbent = true;
            if installed.compliance.is_compliant() {
                let ceiling = installed.priced.then(|| installed.cost.total * (1.0 + RETENTION_TOLERANCE));
                match candidates.iter_mut().find(|c| current.matches(c)) {
                    Some(existing) => existing.is_incumbent = true,
                    None => candidates.push(installed),
                }
                ceiling
            } else {
                None
            }
        }
        None => None,
    };

    if candidates.is_empty() {
        warn!(
            load_amps = request.load_amps,
            min_parallel, max_parallel, "no viable parallel configuration"
        );
        return Err(CalcError::NoViableConfiguration {
            load_amps: request.load_amps,
            min_parallel,
            max_parallel,
        });
    }

    if let Some(ceiling) = ceiling {
        candidates.retain(|c| c.is_incumbent || c.cost.total <= ceiling);
    }

    // Unpriced configurations rank after every priced one
    candidates.sort_by(|a, b| {
        b.priced
            .cmp(&a.priced)
            .then(a.cost.total.total_cmp(&b.cost.total))
            .then(a.cables_in_parallel.cmp(&b.cables_in_parallel))
            .then(a.size_mm2.total_cmp(&b.size_mm2))
    });
    if let Some(best) = candidates.first_mut() {
        best.is_recommended = true;
    }

    let cost_savings = match (candidates.first(), candidates.iter().rev().find(|c| c.priced)) {
        (Some(best), Some(worst)) if best.priced => worst.cost.total - best.cost.total,
        _ => 0.0,
    };

    Ok(RankedAlternatives {
        alternatives: candidates,
        cost_savings,
        min_parallel,
        max_parallel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::CableRate;

    fn overloaded_request() -> SizingRequest {
        SizingRequest::new(500.0, 400.0, 50.0).with_max_amps_per_cable(400.0)
    }

    #[test]
    fn test_window_bounds() {
        let request = overloaded_request();
        assert_eq!(parallel_window(&request), (2, 4));

        let request = SizingRequest::new(3000.0, 400.0, 10.0)
            .with_max_amps_per_cable(400.0)
            .with_preferred_amps_per_cable(300.0);
        assert_eq!(parallel_window(&request), (8, 8));
    }

    #[test]
    fn test_preferred_clamped_to_max() {
        let request = SizingRequest::new(500.0, 400.0, 10.0)
            .with_max_amps_per_cable(200.0)
            .with_preferred_amps_per_cable(350.0);
        assert_eq!(per_conductor_limits(&request), (200.0, 200.0));
    }

    #[test]
    fn test_ranked_by_cost_with_single_recommendation() {
        let ranked = optimize(&overloaded_request(), RateTable::reference(), None).unwrap();
        assert!(!ranked.alternatives.is_empty());
        assert_eq!(ranked.alternatives.iter().filter(|a| a.is_recommended).count(), 1);
        for pair in ranked.alternatives.windows(2) {
            assert!(pair[0].cost.total <= pair[1].cost.total);
        }
        let best = ranked.recommended().unwrap();
        // 3 × 95mm²: (535 + 95) × 50 m × 3 = 94,500
        assert_eq!(best.size, "95mm²");
        assert_eq!(best.cables_in_parallel, 3);
        assert!((best.cost.total - 94_500.0).abs() < 1e-6);
        // 2 × 185mm²: (1050 + 145) × 50 m × 2 = 119,500
        assert!((ranked.cost_savings - (119_500.0 - 94_500.0)).abs() < 1e-6);
    }

    #[test]
    fn test_every_alternative_compliant() {
        let request = overloaded_request().with_protection_device(500.0);
        let ranked = optimize(&request, RateTable::reference(), None).unwrap();
        for alt in &ranked.alternatives {
            assert!(alt.compliance.is_compliant(), "{}", alt.compliance_report);
            assert!(alt.load_per_cable <= 400.0);
        }
    }

    #[test]
    fn test_no_viable_configuration() {
        // 5000 A needs more than 8 conductors at 400 A each
        let request = SizingRequest::new(5000.0, 400.0, 10.0).with_max_amps_per_cable(400.0);
        let err = optimize(&request, RateTable::reference(), None).unwrap_err();
        assert!(matches!(err, CalcError::NoViableConfiguration { min_parallel: 13, max_parallel: 8, .. }));
        assert!(err.is_design_finding());
    }

    #[test]
    fn test_incumbent_sets_cost_ceiling() {
        let request = overloaded_request();
        let incumbent = Incumbent::resolve(&request, "70mm²", 4).unwrap();
        let ranked = optimize(&request, RateTable::reference(), Some(&incumbent)).unwrap();
        let installed = ranked.incumbent().unwrap();
        assert_eq!(installed.size, "70mm²");
        // 2 × 185mm² at 119,500 exceeds 95,000 × 1.05
        assert!(ranked.alternatives.iter().all(|a| a.cables_in_parallel != 2));
        assert_eq!(ranked.recommended().unwrap().size, "95mm²");
    }

    #[test]
    fn test_unpriced_candidates_still_ranked() {
        let rates = RateTable::new(vec![CableRate::new("95mm²", "Cu", 535.0, 95.0, 0.0)]);
        let ranked = optimize(&overloaded_request(), &rates, None).unwrap();
        let unpriced: Vec<_> = ranked.alternatives.iter().filter(|a| !a.priced).collect();
        assert!(!unpriced.is_empty());
        assert!(unpriced.iter().all(|a| a.cost.total == 0.0));
        // The only priced configuration is recommended ahead of zero-cost unpriced ones
        let best = ranked.recommended().unwrap();
        assert!(best.priced);
        assert_eq!(best.size, "95mm²");
        assert_eq!(ranked.cost_savings, 0.0);
    }
}
