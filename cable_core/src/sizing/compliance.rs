//! # Compliance Checks
//!
//! Every candidate configuration is run through four checks. All checks are
//! evaluated and recorded; any failure rejects the configuration.
//!
//! | Check | Condition |
//! |-------|-----------|
//! | Capacity margin | `Iz × Cg × Ca ≥ (Ib / n) × margin` |
//! | Protection coordination | `In ≤ n·Iz'` and `k·In ≤ 1.45·n·Iz'` (local protection only) |
//! | Voltage drop | `Vd% ≤ limit` |
//! | Minimum size | `S ≥ S_min(In / n)` (local protection only) |
//!
//! where `Iz'` is the derated per-conductor capacity and `k` the tripping
//! multiplier of the device.
//!
//! Protection is considered *local* when `In ≤ ratio × Ib` (ratio 3.0 by
//! default). A much larger device is assumed to protect an upstream board and
//! is not coordinated against this circuit.

use serde::{Deserialize, Serialize};

use crate::conductors::ConductorSpec;

use super::voltage_drop::voltage_drop;
use super::SizingRequest;

/// Default ratio of breaker rating to load above which protection is upstream
pub const DEFAULT_LOCAL_PROTECTION_RATIO: f64 = 3.0;

/// Default conventional tripping multiplier (I2 = 1.45 In)
pub const DEFAULT_TRIPPING_MULTIPLIER: f64 = 1.45;

/// Overload limit on the conductor side (I2 ≤ 1.45 Iz)
const CONDUCTOR_OVERLOAD_LIMIT: f64 = 1.45;

/// Wiring regulation references cited in compliance reports.
pub mod wiring_ref {
    /// Ib ≤ In ≤ Iz
    pub const CURRENT_CARRYING: &str = "BS 7671 433.1.1";
    /// I2 ≤ 1.45 Iz
    pub const OVERLOAD_TRIPPING: &str = "BS 7671 433.1.1(iii)";
    /// Conductors in parallel share the protective device
    pub const PARALLEL_CONDUCTORS: &str = "BS 7671 433.4";
    /// Grouping correction factors
    pub const GROUPING: &str = "BS 7671 Appendix 4 Table 4C1";
    /// Voltage drop in consumers' installations
    pub const VOLTAGE_DROP: &str = "BS 7671 525 / Appendix 4 §6.4";
    /// Minimum conductor size for a protective device rating
    pub const MINIMUM_SIZE: &str = "BS 7671 524.1";
}

/// Grouping correction factors by number of circuits run together.
///
/// ## JSON Example
///
/// ```json
/// { "two": 0.80, "three": 0.70, "four_plus": 0.65 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupingFactors {
    pub two: f64,
    pub three: f64,
    pub four_plus: f64,
}

impl Default for GroupingFactors {
    fn default() -> Self {
        GroupingFactors {
            two: 0.80,
            three: 0.70,
            four_plus: 0.65,
        }
    }
}

impl GroupingFactors {
    /// Multiplier for `n` conductors in parallel.
    pub fn factor(&self, n: u32) -> f64 {
        match n {
            0 | 1 => 1.0,
            2 => self.two,
            3 => self.three,
            _ => self.four_plus,
        }
    }
}

/// Minimum conductor cross-section (mm²) per protective device rating (A).
///
/// Ratings above the last row use the last row.
const MIN_SIZE_FOR_BREAKER: [(f64, f64); 15] = [
    (16.0, 1.5),
    (20.0, 2.5),
    (32.0, 4.0),
    (40.0, 6.0),
    (63.0, 10.0),
    (80.0, 16.0),
    (100.0, 25.0),
    (125.0, 35.0),
    (160.0, 50.0),
    (200.0, 70.0),
    (250.0, 95.0),
    (315.0, 120.0),
    (400.0, 185.0),
    (500.0, 240.0),
    (630.0, 300.0),
];

/// Minimum cross-section in mm² for a protective device rating.
pub fn minimum_size_for_breaker(rating_amps: f64) -> f64 {
    MIN_SIZE_FOR_BREAKER
        .iter()
        .find(|(rating, _)| rating_amps <= *rating)
        .map(|(_, size)| *size)
        .unwrap_or(MIN_SIZE_FOR_BREAKER[MIN_SIZE_FOR_BREAKER.len() - 1].1)
}

/// Individual compliance check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceRule {
    CapacityMargin,
    ProtectionCoordination,
    VoltageDrop,
    MinimumSize,
}

impl ComplianceRule {
    pub fn display_name(&self) -> &'static str {
        match self {
            ComplianceRule::CapacityMargin => "Capacity margin",
            ComplianceRule::ProtectionCoordination => "Protection coordination",
            ComplianceRule::VoltageDrop => "Voltage drop",
            ComplianceRule::MinimumSize => "Minimum size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceOutcome {
    Pass,
    Fail,
    NotApplicable,
}

impl ComplianceOutcome {
    fn from_bool(pass: bool) -> Self {
        if pass {
            ComplianceOutcome::Pass
        } else {
            ComplianceOutcome::Fail
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ComplianceOutcome::Pass => "PASS",
            ComplianceOutcome::Fail => "FAIL",
            ComplianceOutcome::NotApplicable => "N/A",
        }
    }
}

/// Result of one check with the values that decided it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub rule: ComplianceRule,
    pub outcome: ComplianceOutcome,
    pub detail: String,
    pub reference: String,
}

impl ComplianceCheck {
    fn new(rule: ComplianceRule, outcome: ComplianceOutcome, detail: String, reference: &str) -> Self {
        ComplianceCheck {
            rule,
            outcome,
            detail,
            reference: reference.to_string(),
        }
    }

    pub fn failed(&self) -> bool {
        self.outcome == ComplianceOutcome::Fail
    }
}

impl std::fmt::Display for ComplianceCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} - {} [{}]",
            self.rule.display_name(),
            self.outcome.label(),
            self.detail,
            self.reference
        )
    }
}

/// All checks for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub ok: bool,
    pub checks: Vec<ComplianceCheck>,
}

impl ComplianceReport {
    pub fn new(checks: Vec<ComplianceCheck>) -> Self {
        let ok = !checks.iter().any(ComplianceCheck::failed);
        ComplianceReport { ok, checks }
    }

    pub fn is_compliant(&self) -> bool {
        self.ok
    }

    pub fn failures(&self) -> impl Iterator<Item = &ComplianceCheck> {
        self.checks.iter().filter(|c| c.failed())
    }

    pub fn check(&self, rule: ComplianceRule) -> Option<&ComplianceCheck> {
        self.checks.iter().find(|c| c.rule == rule)
    }

    /// One-line summary, all checks separated by "; "
    pub fn summary(&self) -> String {
        self.checks.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("; ")
    }
}

/// Run every compliance check for `parallel_count` conductors of `conductor`.
///
/// # Example
///
/// ```rust
/// use cable_core::conductors::{find_conductor, ConductorMaterial};
/// use cable_core::sizing::SizingRequest;
/// use cable_core::sizing::compliance::check_compliance;
///
/// let request = SizingRequest::new(250.0, 400.0, 30.0);
/// let c185 = find_conductor(ConductorMaterial::Copper, "185mm²").unwrap();
///
/// // 2 × 185mm² in air: 392 A × 0.80 = 313.6 A per conductor ≥ 125 A
/// let report = check_compliance(c185, 2, &request);
/// assert!(report.is_compliant());
/// ```
pub fn check_compliance(conductor: &ConductorSpec, parallel_count: u32, request: &SizingRequest) -> ComplianceReport {
    let n = parallel_count.max(1);
    let runs = f64::from(n);
    let load_per_conductor = request.load_amps / runs;
    let grouping = request.grouping.factor(n);
    let derated = conductor.ampacity_for(request.installation_method) * grouping * request.derating_factor;
    let total_derated = derated * runs;

    let mut checks = Vec::with_capacity(4);

    let required = load_per_conductor * request.safety_margin;
    checks.push(ComplianceCheck::new(
        ComplianceRule::CapacityMargin,
        ComplianceOutcome::from_bool(derated >= required),
        format!(
            "{:.1} A derated (Cg {:.2}, Ca {:.2}) vs {:.1} A required",
            derated, grouping, request.derating_factor, required
        ),
        wiring_ref::GROUPING,
    ));

    let local_breaker = request
        .protection_device_rating
        .filter(|&rating| rating <= request.local_protection_ratio * request.load_amps);

    let protection = match (request.protection_device_rating, local_breaker) {
        (None, _) => ComplianceCheck::new(
            ComplianceRule::ProtectionCoordination,
            ComplianceOutcome::NotApplicable,
            "no protective device specified".to_string(),
            wiring_ref::CURRENT_CARRYING,
        ),
        (Some(rating), None) => ComplianceCheck::new(
            ComplianceRule::ProtectionCoordination,
            ComplianceOutcome::NotApplicable,
            format!(
                "{:.0} A device exceeds {:.1} × load; treated as upstream protection",
                rating, request.local_protection_ratio
            ),
            wiring_ref::CURRENT_CARRYING,
        ),
        (Some(_), Some(rating)) => {
            let nominal_ok = rating <= total_derated;
            let tripping_ok = rating * request.tripping_multiplier <= CONDUCTOR_OVERLOAD_LIMIT * total_derated;
            let reference = if n > 1 {
                wiring_ref::PARALLEL_CONDUCTORS
            } else if nominal_ok {
                wiring_ref::OVERLOAD_TRIPPING
            } else {
                wiring_ref::CURRENT_CARRYING
            };
            ComplianceCheck::new(
                ComplianceRule::ProtectionCoordination,
                ComplianceOutcome::from_bool(nominal_ok && tripping_ok),
                format!(
                    "In {:.0} A vs Iz {:.1} A; I2 {:.1} A vs 1.45 Iz {:.1} A",
                    rating,
                    total_derated,
                    rating * request.tripping_multiplier,
                    CONDUCTOR_OVERLOAD_LIMIT * total_derated
                ),
                reference,
            )
        }
    };
    checks.push(protection);

    let limit = request.drop_limit();
    let drop = voltage_drop(load_per_conductor, request.voltage, request.length_m, conductor);
    checks.push(ComplianceCheck::new(
        ComplianceRule::VoltageDrop,
        ComplianceOutcome::from_bool(drop.within(limit)),
        format!("{:.2}% ({:.2} V) vs {:.1}% limit", drop.percent_display(), drop.volts, limit),
        wiring_ref::VOLTAGE_DROP,
    ));

    // The breaker-size floor applies only to a local device, the same gate
    // as protection coordination.
    let minimum = match (request.protection_device_rating, local_breaker) {
        (_, Some(rating)) => {
            let min_mm2 = minimum_size_for_breaker(rating / runs);
            ComplianceCheck::new(
                ComplianceRule::MinimumSize,
                ComplianceOutcome::from_bool(conductor.size_mm2 >= min_mm2),
                format!(
                    "{} vs {}mm² minimum for {:.0} A per conductor (local device)",
                    conductor.size,
                    min_mm2,
                    rating / runs
                ),
                wiring_ref::MINIMUM_SIZE,
            )
        }
        (Some(rating), None) => ComplianceCheck::new(
            ComplianceRule::MinimumSize,
            ComplianceOutcome::NotApplicable,
            format!(
                "breaker-size floor not applied: {:.0} A device above {:.1} × load is upstream protection",
                rating, request.local_protection_ratio
            ),
            wiring_ref::MINIMUM_SIZE,
        ),
        (None, None) => ComplianceCheck::new(
            ComplianceRule::MinimumSize,
            ComplianceOutcome::NotApplicable,
            "breaker-size floor not applied: no protective device specified".to_string(),
            wiring_ref::MINIMUM_SIZE,
        ),
    };
    checks.push(minimum);

    ComplianceReport::new(checks)
}
