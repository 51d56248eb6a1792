//! # Optimization Analysis
//!
//! Compares installed circuits against the optimizer's alternatives and
//! reports, per circuit, the current cost and compliance, the compliant
//! cheaper options and an overall status.
//!
//! Batch analysis never aborts: a circuit that cannot be analyzed is reported
//! as [`OptimizationStatus::Skipped`] with a note.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::analysis::{analyze_optimizations, CableEntry, OptimizationStatus};
//! use cable_core::rates::RateTable;
//! use cable_core::settings::OptimizationSettings;
//!
//! let entry = CableEntry::new("DB-1 feeder", "185mm²", 50.0, 2)
//!     .with_load(500.0)
//!     .with_cable_type("Cu/PVC");
//!
//! let results = analyze_optimizations(&[entry], RateTable::reference(), &OptimizationSettings::default());
//! assert_eq!(results[0].status, OptimizationStatus::Optimized);
//! assert!(results[0].potential_savings > 0.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conductors::{normalize_material_label, InstallationMethod};
use crate::errors::{CalcError, CalcResult};
use crate::rates::{CostBreakdown, RateTable};
use crate::settings::OptimizationSettings;
use crate::sizing::optimizer::{evaluate_configuration, optimize, Alternative, Incumbent};
use crate::sizing::SizingRequest;

/// Savings below this are treated as a tie
const COST_EPSILON: f64 = 0.005;

fn default_parallel() -> u32 {
    1
}

fn default_voltage() -> f64 {
    400.0
}

/// An installed circuit in a cable schedule.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "MSB to DB-2",
///   "cable_size": "95mm²",
///   "cable_type": "Cu/PVC",
///   "length_m": 50.0,
///   "cables_in_parallel": 3,
///   "load_amps": 500.0,
///   "voltage": 400.0,
///   "protection_device_rating": 630.0,
///   "installation_method": "buried"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableEntry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub label: String,
    pub cable_size: String,
    /// Cable type label (e.g., "Cu/PVC"); the conductor material is read
    /// from its first token
    #[serde(default)]
    pub cable_type: Option<String>,
    pub length_m: f64,
    #[serde(default = "default_parallel")]
    pub cables_in_parallel: u32,
    /// Design current; circuits without one are skipped
    #[serde(default)]
    pub load_amps: Option<f64>,
    #[serde(default = "default_voltage")]
    pub voltage: f64,
    #[serde(default)]
    pub protection_device_rating: Option<f64>,
    /// Overrides the settings' default installation method
    #[serde(default)]
    pub installation_method: Option<InstallationMethod>,
}

impl CableEntry {
    pub fn new(
        label: impl Into<String>,
        cable_size: impl Into<String>,
        length_m: f64,
        cables_in_parallel: u32,
    ) -> Self {
        CableEntry {
            id: Uuid::new_v4(),
            label: label.into(),
            cable_size: cable_size.into(),
            cable_type: None,
            length_m,
            cables_in_parallel,
            load_amps: None,
            voltage: default_voltage(),
            protection_device_rating: None,
            installation_method: None,
        }
    }

    pub fn with_load(mut self, load_amps: f64) -> Self {
        self.load_amps = Some(load_amps);
        self
    }

    pub fn with_voltage(mut self, voltage: f64) -> Self {
        self.voltage = voltage;
        self
    }

    pub fn with_cable_type(mut self, cable_type: impl Into<String>) -> Self {
        self.cable_type = Some(cable_type.into());
        self
    }

    pub fn with_protection_device(mut self, rating_amps: f64) -> Self {
        self.protection_device_rating = Some(rating_amps);
        self
    }

    pub fn with_installation_method(mut self, method: InstallationMethod) -> Self {
        self.installation_method = Some(method);
        self
    }

    /// Build the sizing request for this circuit.
    pub fn sizing_request(&self, settings: &OptimizationSettings) -> CalcResult<SizingRequest> {
        let load_amps = self.load_amps.ok_or_else(|| CalcError::missing_field("load_amps"))?;
        let mut request = SizingRequest::from_settings(load_amps, self.voltage, self.length_m, settings);
        if let Some(cable_type) = &self.cable_type {
            request.material = normalize_material_label(cable_type)
                .ok_or_else(|| CalcError::material_not_found(cable_type.as_str()))?;
            request.cable_type = Some(cable_type.clone());
        }
        if let Some(method) = self.installation_method {
            request.installation_method = method;
        }
        request.protection_device_rating = self.protection_device_rating;
        request.validate()?;
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStatus {
    /// A cheaper compliant configuration exists, or the installed one is non-compliant
    Optimized,
    /// The installed configuration is the cheapest compliant one
    AlreadyOptimal,
    /// The installed configuration is compliant but has no rate; priced
    /// alternatives are listed without a savings figure
    Unpriced,
    /// Nothing in the search window is compliant
    NoViableConfiguration,
    /// The circuit could not be analyzed
    Skipped,
}

impl OptimizationStatus {
    pub const ALL: [OptimizationStatus; 5] = [
        OptimizationStatus::Optimized,
        OptimizationStatus::AlreadyOptimal,
        OptimizationStatus::Unpriced,
        OptimizationStatus::NoViableConfiguration,
        OptimizationStatus::Skipped,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            OptimizationStatus::Optimized => "Optimized",
            OptimizationStatus::AlreadyOptimal => "Already optimal",
            OptimizationStatus::Unpriced => "Installed cost unknown",
            OptimizationStatus::NoViableConfiguration => "No viable configuration",
            OptimizationStatus::Skipped => "Skipped",
        }
    }
}

impl std::fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Cost and compliance of the installed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConfiguration {
    pub cable_size: String,
    pub cables_in_parallel: u32,
    pub cost: CostBreakdown,
    pub priced: bool,
    pub compliant: bool,
    pub compliance_report: String,
}

impl From<&Alternative> for CurrentConfiguration {
    fn from(alt: &Alternative) -> Self {
        CurrentConfiguration {
            cable_size: alt.size.clone(),
            cables_in_parallel: alt.cables_in_parallel,
            cost: alt.cost,
            priced: alt.priced,
            compliant: alt.compliance.is_compliant(),
            compliance_report: alt.compliance_report.clone(),
        }
    }
}

/// Analysis of one circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub entry_id: Uuid,
    pub label: String,
    pub status: OptimizationStatus,
    pub current: Option<CurrentConfiguration>,
    /// Compliant alternatives, cheapest first; each is cheaper than a
    /// compliant priced installed configuration. Only priced alternatives
    /// are listed when the installed configuration has no rate
    pub alternatives: Vec<Alternative>,
    pub recommended: Option<Alternative>,
    /// Installed cost minus recommended cost, zero unless the installed
    /// configuration is compliant and priced
    pub potential_savings: f64,
    pub notes: Vec<String>,
}

impl OptimizationResult {
    fn new(entry: &CableEntry, status: OptimizationStatus) -> Self {
        OptimizationResult {
            entry_id: entry.id,
            label: entry.label.clone(),
            status,
            current: None,
            alternatives: Vec::new(),
            recommended: None,
            potential_savings: 0.0,
            notes: Vec::new(),
        }
    }

    fn skipped(entry: &CableEntry, note: impl Into<String>) -> Self {
        let mut result = OptimizationResult::new(entry, OptimizationStatus::Skipped);
        result.notes.push(note.into());
        result
    }
}

/// Analyze every entry against `rates` and `settings`.
///
/// One result per entry, in input order.
pub fn analyze_optimizations(
    entries: &[CableEntry],
    rates: &RateTable,
    settings: &OptimizationSettings,
) -> Vec<OptimizationResult> {
    let results: Vec<OptimizationResult> = entries.iter().map(|e| analyze_entry(e, rates, settings)).collect();

    let count = |status: OptimizationStatus| results.iter().filter(|r| r.status == status).count();
    info!(
        circuits = results.len(),
        optimized = count(OptimizationStatus::Optimized),
        already_optimal = count(OptimizationStatus::AlreadyOptimal),
        unpriced = count(OptimizationStatus::Unpriced),
        no_viable = count(OptimizationStatus::NoViableConfiguration),
        skipped = count(OptimizationStatus::Skipped),
        potential_savings = results.iter().map(|r| r.potential_savings).sum::<f64>(),
        "cable optimization analysis complete"
    );
    results
}

fn analyze_entry(entry: &CableEntry, rates: &RateTable, settings: &OptimizationSettings) -> OptimizationResult {
    let request = match entry.sizing_request(settings) {
        Ok(request) => request,
        Err(err @ CalcError::MissingField { .. }) => {
            debug!(label = %entry.label, "{}", err);
            return OptimizationResult::skipped(entry, err.to_string());
        }
        Err(err) => {
            warn!(label = %entry.label, "{}", err);
            return OptimizationResult::skipped(entry, err.to_string());
        }
    };

    let mut notes = Vec::new();
    let incumbent = match Incumbent::resolve(&request, &entry.cable_size, entry.cables_in_parallel) {
        Ok(incumbent) => Some(incumbent),
        Err(err) => {
            notes.push(format!("Installed configuration not evaluated: {}", err));
            None
        }
    };
    let current = incumbent.map(|inc| {
        CurrentConfiguration::from(&evaluate_configuration(inc.conductor, inc.cables_in_parallel, &request, rates))
    });

    let ranked = match optimize(&request, rates, incumbent.as_ref()) {
        Ok(ranked) => ranked,
        Err(err) => {
            let status = if err.is_design_finding() {
                OptimizationStatus::NoViableConfiguration
            } else {
                warn!(label = %entry.label, "{}", err);
                OptimizationStatus::Skipped
            };
            let mut result = OptimizationResult::new(entry, status);
            result.current = current;
            result.notes = notes;
            result.notes.push(err.to_string());
            return result;
        }
    };

    let mut result = OptimizationResult::new(entry, OptimizationStatus::AlreadyOptimal);
    let candidates = ranked.alternatives.iter().filter(|a| !a.is_incumbent);

    match &current {
        Some(installed) if installed.compliant && installed.priced => {
            result.alternatives = candidates
                .filter(|a| a.priced && a.cost.total < installed.cost.total - COST_EPSILON)
                .cloned()
                .collect();
            if let Some(best) = result.alternatives.first() {
                result.status = OptimizationStatus::Optimized;
                result.potential_savings = installed.cost.total - best.cost.total;
                result.recommended = Some(best.clone());
            }
        }
        Some(installed) if installed.compliant => {
            result.alternatives = candidates.filter(|a| a.priced).cloned().collect();
            result.recommended = result.alternatives.first().cloned();
            result.status = OptimizationStatus::Unpriced;
            notes.push(format!(
                "No rate for installed {} {}; cost comparison not possible",
                installed.cable_size,
                request.rate_material_label()
            ));
        }
        _ => {
            result.alternatives = candidates.cloned().collect();
            result.recommended = ranked.recommended().filter(|a| !a.is_incumbent).cloned();
            result.status = OptimizationStatus::Optimized;
            if current.is_some() {
                notes.push("Installed configuration is non-compliant".to_string());
            }
        }
    }

    debug!(
        label = %entry.label,
        status = %result.status,
        alternatives = result.alternatives.len(),
        "circuit analyzed"
    );
    result.current = current;
    result.notes = notes;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::CableRate;

    fn feeder(size: &str, n: u32) -> CableEntry {
        CableEntry::new("MSB-DB1", size, 50.0, n)
            .with_load(500.0)
            .with_cable_type("Cu/PVC")
    }

    #[test]
    fn test_cheaper_alternative_found() {
        let results = analyze_optimizations(
            &[feeder("185mm²", 2)],
            RateTable::reference(),
            &OptimizationSettings::default(),
        );
        let r = &results[0];
        assert_eq!(r.status, OptimizationStatus::Optimized);
        let current = r.current.as_ref().unwrap();
        assert!(current.compliant);
        // 119,500 installed vs 94,500 for 3 × 95mm²
        assert!((r.potential_savings - 25_000.0).abs() < 1e-6);
        assert_eq!(r.recommended.as_ref().unwrap().size, "95mm²");
        for alt in &r.alternatives {
            assert!(alt.cost.total < current.cost.total);
            assert!(alt.compliance.is_compliant());
        }
    }

    #[test]
    fn test_already_optimal() {
        let results = analyze_optimizations(
            &[feeder("95mm²", 3)],
            RateTable::reference(),
            &OptimizationSettings::default(),
        );
        assert_eq!(results[0].status, OptimizationStatus::AlreadyOptimal);
        assert!(results[0].alternatives.is_empty());
        assert_eq!(results[0].potential_savings, 0.0);
    }

    #[test]
    fn test_non_compliant_installation_excluded() {
        // 2 × 150mm² buried: 316 × 0.80 × 2 = 505.6 A against a 630 A device
        let entry = CableEntry::new("Chiller", "150mm²", 40.0, 2)
            .with_load(600.0)
            .with_cable_type("Cu/PVC")
            .with_protection_device(630.0)
            .with_installation_method(InstallationMethod::Buried);
        let results = analyze_optimizations(&[entry], RateTable::reference(), &OptimizationSettings::default());
        let r = &results[0];
        assert_eq!(r.status, OptimizationStatus::Optimized);
        assert!(!r.current.as_ref().unwrap().compliant);
        assert!(!r.alternatives.is_empty());
        assert!(r
            .alternatives
            .iter()
            .all(|a| !(a.size == "150mm²" && a.cables_in_parallel == 2)));
        assert!(r.alternatives.iter().all(|a| a.derated_capacity * f64::from(a.cables_in_parallel) >= 630.0));
    }

    #[test]
    fn test_no_viable_and_skipped_do_not_abort_batch() {
        let entries = vec![
            CableEntry::new("Huge", "400mm²", 10.0, 1).with_load(5000.0),
            CableEntry::new("No load", "16mm²", 10.0, 1),
            CableEntry::new("Brass", "16mm²", 10.0, 1).with_load(40.0).with_cable_type("Brass/PVC"),
            feeder("95mm²", 3),
        ];
        let results = analyze_optimizations(&entries, RateTable::reference(), &OptimizationSettings::default());
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].status, OptimizationStatus::NoViableConfiguration);
        assert_eq!(results[1].status, OptimizationStatus::Skipped);
        assert!(results[1].notes[0].contains("load_amps"));
        assert_eq!(results[2].status, OptimizationStatus::Skipped);
        assert_eq!(results[3].status, OptimizationStatus::AlreadyOptimal);
    }

    #[test]
    fn test_unpriced_installation_lists_priced_alternatives() {
        let rates = RateTable::new(vec![CableRate::new("95mm²", "Cu/PVC", 580.0, 95.0, 0.0)]);
        let results = analyze_optimizations(&[feeder("185mm²", 2)], &rates, &OptimizationSettings::default());
        let r = &results[0];
        let current = r.current.as_ref().unwrap();
        assert!(current.compliant);
        assert!(!current.priced);
        assert_eq!(r.status, OptimizationStatus::Unpriced);
        assert_eq!(r.potential_savings, 0.0);
        assert!(r.notes.iter().any(|n| n.contains("No rate")));

        assert!(!r.alternatives.is_empty());
        assert!(r.alternatives.iter().all(|a| a.priced && a.compliance.is_compliant()));
        let best = r.recommended.as_ref().unwrap();
        assert_eq!((best.size.as_str(), best.cables_in_parallel), ("95mm²", 3));
    }

    #[test]
    fn test_unpriced_installation_without_priced_alternatives() {
        let rates = RateTable::new(vec![CableRate::new("400mm²", "Al/XLPE", 570.0, 230.0, 150.0)]);
        let results = analyze_optimizations(&[feeder("95mm²", 3)], &rates, &OptimizationSettings::default());
        let r = &results[0];
        assert_eq!(r.status, OptimizationStatus::Unpriced);
        assert!(r.alternatives.is_empty());
        assert!(r.recommended.is_none());
    }

    #[test]
    fn test_entry_json_defaults() {
        let json = r#"{"label": "L1", "cable_size": "16mm²", "length_m": 12.0}"#;
        let entry: CableEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.cables_in_parallel, 1);
        assert_eq!(entry.voltage, 400.0);
        assert!(entry.load_amps.is_none());
        assert_eq!(
            serde_json::to_string(&OptimizationStatus::NoViableConfiguration).unwrap(),
            "\"no_viable_configuration\""
        );
    }
}
