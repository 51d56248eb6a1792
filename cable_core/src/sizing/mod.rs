//! # Cable Sizing
//!
//! Sizes a circuit's conductors for a load: ampacity selection, voltage-drop
//! upsizing, compliance checks and, when one conductor cannot carry the load,
//! a cost-ranked search over parallel configurations.
//!
//! ## Flow
//!
//! ```text
//! SizingRequest
//!   ├─ select_cable(Ib × margin / Ca)        single conductor
//!   │     └─ ensure_acceptable_drop          upsize for Vd
//!   └─ optimize(...)                         when Ib > I_max or no single size fits
//!         └─ per n: select → upsize → check_compliance → price
//! ```
//!
//! ## Example
//!
//! ```rust
//! use cable_core::conductors::InstallationMethod;
//! use cable_core::sizing::{size_cable, SizingRequest};
//!
//! let request = SizingRequest::new(60.0, 230.0, 0.0)
//!     .with_installation_method(InstallationMethod::Duct);
//!
//! let result = size_cable(&request).unwrap();
//! assert_eq!(result.cable_size, "16mm²");
//! assert_eq!(result.cables_in_parallel, 1);
//! assert!(result.capacity_sufficient);
//! ```

pub mod compliance;
pub mod optimizer;
pub mod selection;
pub mod voltage_drop;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::conductors::{find_conductor, ConductorMaterial, ConductorSpec, InstallationMethod};
use crate::errors::{CalcError, CalcResult};
use crate::rates::RateTable;
use crate::settings::OptimizationSettings;

use compliance::{
    ComplianceReport, ComplianceRule, GroupingFactors, DEFAULT_LOCAL_PROTECTION_RATIO, DEFAULT_TRIPPING_MULTIPLIER,
};
use optimizer::{evaluate_configuration, optimize, per_conductor_limits, Alternative, RankedAlternatives};
use selection::{ensure_acceptable_drop, select_cable, Selection};
use voltage_drop::{voltage_drop, VoltageDropLimits};

fn default_one() -> f64 {
    1.0
}

fn default_local_protection_ratio() -> f64 {
    DEFAULT_LOCAL_PROTECTION_RATIO
}

fn default_tripping_multiplier() -> f64 {
    DEFAULT_TRIPPING_MULTIPLIER
}

/// Input for sizing one circuit.
///
/// ## JSON Example
///
/// ```json
/// {
///   "load_amps": 500.0,
///   "voltage": 400.0,
///   "length_m": 50.0,
///   "material": "copper",
///   "installation_method": "air",
///   "protection_device_rating": 500.0,
///   "max_amps_per_cable": 400.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingRequest {
    /// Design current Ib (A)
    pub load_amps: f64,

    /// Nominal voltage (V); 400 V-class is treated as three-phase
    pub voltage: f64,

    /// Route length (m)
    #[serde(default)]
    pub length_m: f64,

    #[serde(default)]
    pub material: ConductorMaterial,

    #[serde(default)]
    pub installation_method: InstallationMethod,

    /// Ambient correction Ca, in (0, 1]
    #[serde(default = "default_one")]
    pub derating_factor: f64,

    /// Multiplier on the design current, ≥ 1
    #[serde(default = "default_one")]
    pub safety_margin: f64,

    /// Protective device rating In (A)
    #[serde(default)]
    pub protection_device_rating: Option<f64>,

    /// Explicit voltage-drop limit (%), overrides `drop_limits`
    #[serde(default)]
    pub voltage_drop_limit: Option<f64>,

    #[serde(default)]
    pub max_amps_per_cable: Option<f64>,

    #[serde(default)]
    pub preferred_amps_per_cable: Option<f64>,

    #[serde(default)]
    pub grouping: GroupingFactors,

    #[serde(default)]
    pub drop_limits: VoltageDropLimits,

    #[serde(default = "default_local_protection_ratio")]
    pub local_protection_ratio: f64,

    #[serde(default = "default_tripping_multiplier")]
    pub tripping_multiplier: f64,

    /// Cable type label used for rate lookup (e.g., "Cu/PVC");
    /// defaults to the material symbol
    #[serde(default)]
    pub cable_type: Option<String>,
}

impl SizingRequest {
    /// Request with default options: copper, in air, no protective device.
    pub fn new(load_amps: f64, voltage: f64, length_m: f64) -> Self {
        SizingRequest {
            load_amps,
            voltage,
            length_m,
            material: ConductorMaterial::default(),
            installation_method: InstallationMethod::default(),
            derating_factor: 1.0,
            safety_margin: 1.0,
            protection_device_rating: None,
            voltage_drop_limit: None,
            max_amps_per_cable: None,
            preferred_amps_per_cable: None,
            grouping: GroupingFactors::default(),
            drop_limits: VoltageDropLimits::default(),
            local_protection_ratio: DEFAULT_LOCAL_PROTECTION_RATIO,
            tripping_multiplier: DEFAULT_TRIPPING_MULTIPLIER,
            cable_type: None,
        }
    }

    /// Request carrying the optimization settings' limits, factors and defaults.
    pub fn from_settings(load_amps: f64, voltage: f64, length_m: f64, settings: &OptimizationSettings) -> Self {
        SizingRequest {
            material: settings.default_cable_material,
            installation_method: settings.default_installation_method,
            safety_margin: settings.cable_safety_margin,
            max_amps_per_cable: Some(settings.max_amps_per_cable),
            preferred_amps_per_cable: Some(settings.preferred_amps_per_cable),
            grouping: settings.grouping_factors(),
            drop_limits: settings.drop_limits(),
            local_protection_ratio: settings.local_protection_ratio,
            tripping_multiplier: settings.tripping_multiplier,
            ..SizingRequest::new(load_amps, voltage, length_m)
        }
    }

    pub fn with_material(mut self, material: ConductorMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_installation_method(mut self, method: InstallationMethod) -> Self {
        self.installation_method = method;
        self
    }

    pub fn with_derating_factor(mut self, factor: f64) -> Self {
        self.derating_factor = factor;
        self
    }

    pub fn with_safety_margin(mut self, margin: f64) -> Self {
        self.safety_margin = margin;
        self
    }

    pub fn with_protection_device(mut self, rating_amps: f64) -> Self {
        self.protection_device_rating = Some(rating_amps);
        self
    }

    pub fn with_voltage_drop_limit(mut self, percent: f64) -> Self {
        self.voltage_drop_limit = Some(percent);
        self
    }

    pub fn with_max_amps_per_cable(mut self, amps: f64) -> Self {
        self.max_amps_per_cable = Some(amps);
        self
    }

    pub fn with_preferred_amps_per_cable(mut self, amps: f64) -> Self {
        self.preferred_amps_per_cable = Some(amps);
        self
    }

    pub fn with_cable_type(mut self, cable_type: impl Into<String>) -> Self {
        self.cable_type = Some(cable_type.into());
        self
    }

    /// Applicable voltage-drop limit (%)
    pub fn drop_limit(&self) -> f64 {
        self.drop_limits.limit_for(self.voltage, self.voltage_drop_limit)
    }

    /// Label used to look up rates
    pub fn rate_material_label(&self) -> &str {
        self.cable_type.as_deref().unwrap_or(self.material.symbol())
    }

    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        positive("load_amps", self.load_amps, "Load current must be a positive finite number")?;
        positive("voltage", self.voltage, "Voltage must be a positive finite number")?;
        if !(self.length_m.is_finite() && self.length_m >= 0.0) {
            return Err(CalcError::invalid_input(
                "length_m",
                self.length_m.to_string(),
                "Length cannot be negative",
            ));
        }
        positive("derating_factor", self.derating_factor, "Derating factor must be a positive finite number")?;
        positive("safety_margin", self.safety_margin, "Safety margin must be a positive finite number")?;
        if let Some(rating) = self.protection_device_rating {
            positive("protection_device_rating", rating, "Device rating must be positive")?;
        }
        if let Some(limit) = self.voltage_drop_limit {
            positive("voltage_drop_limit", limit, "Voltage drop limit must be positive")?;
        }
        if let Some(amps) = self.max_amps_per_cable {
            positive("max_amps_per_cable", amps, "Maximum amps per cable must be positive")?;
        }
        if let Some(amps) = self.preferred_amps_per_cable {
            positive("preferred_amps_per_cable", amps, "Preferred amps per cable must be positive")?;
        }
        for (field, factor) in [
            ("grouping.two", self.grouping.two),
            ("grouping.three", self.grouping.three),
            ("grouping.four_plus", self.grouping.four_plus),
        ] {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(CalcError::invalid_input(
                    field,
                    factor.to_string(),
                    "Grouping factor must be in (0, 1]",
                ));
            }
        }
        positive("local_protection_ratio", self.local_protection_ratio, "Ratio must be positive")?;
        if !(self.tripping_multiplier.is_finite() && self.tripping_multiplier >= 1.0) {
            return Err(CalcError::invalid_input(
                "tripping_multiplier",
                self.tripping_multiplier.to_string(),
                "Tripping multiplier must be at least 1.0",
            ));
        }
        Ok(())
    }

    /// Findings for factors outside their usual range. These are accepted
    /// and sized as given.
    pub fn range_warnings(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if self.derating_factor > 1.0 {
            warnings.push(ValidationWarning::warning(
                "derating_factor",
                format!(
                    "Derating factor {:.2} is above 1.0; confirm the ambient correction ({})",
                    self.derating_factor,
                    compliance::wiring_ref::CURRENT_CARRYING
                ),
            ));
        }
        if self.safety_margin < 1.0 {
            warnings.push(ValidationWarning::warning(
                "safety_margin",
                format!(
                    "Safety margin {:.2} is below 1.0; conductors are sized for less than the design current",
                    self.safety_margin
                ),
            ));
        }
        warnings
    }
}

fn positive(field: &str, value: f64, reason: &str) -> CalcResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CalcError::invalid_input(field, value.to_string(), reason))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}

/// A finding attached to a sizing result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl ValidationWarning {
    fn new(field: &str, message: String, severity: WarningSeverity) -> Self {
        ValidationWarning {
            field: field.to_string(),
            message,
            severity,
        }
    }

    pub fn info(field: &str, message: impl Into<String>) -> Self {
        Self::new(field, message.into(), WarningSeverity::Info)
    }

    pub fn warning(field: &str, message: impl Into<String>) -> Self {
        Self::new(field, message.into(), WarningSeverity::Warning)
    }

    pub fn error(field: &str, message: impl Into<String>) -> Self {
        Self::new(field, message.into(), WarningSeverity::Error)
    }
}

/// Sizing outcome for one circuit.
///
/// Voltage drop is reported for the current carried by each conductor;
/// `derated_capacity` is the total across all parallel conductors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub cable_size: String,
    pub size_mm2: f64,
    pub material: ConductorMaterial,
    pub installation_method: InstallationMethod,
    /// Ω/km of one conductor
    pub impedance_per_km: f64,
    pub voltage_drop_volts: f64,
    /// Rounded to 2 dp
    pub voltage_drop_percent: f64,
    pub voltage_drop_limit_percent: f64,
    pub supply_cost: f64,
    pub install_cost: f64,
    pub termination_cost: f64,
    pub total_cost: f64,
    pub priced: bool,
    pub cables_in_parallel: u32,
    pub load_per_cable: f64,
    pub derated_capacity: f64,
    pub capacity_sufficient: bool,
    pub compliance: ComplianceReport,
    pub warnings: Vec<ValidationWarning>,
    pub requires_engineer_verification: bool,
    /// Ranked alternatives, when parallel configurations were evaluated
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<Alternative>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_savings: Option<f64>,
}

impl SizingResult {
    pub fn has_errors(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == WarningSeverity::Error)
    }

    /// Check if the sized configuration passes every compliance check
    pub fn passes(&self) -> bool {
        self.capacity_sufficient && self.compliance.is_compliant()
    }
}

/// Size a circuit against the reference rate table.
pub fn size_cable(request: &SizingRequest) -> CalcResult<SizingResult> {
    size_cable_with_rates(request, RateTable::reference())
}

/// Size a circuit, pricing configurations from `rates`.
///
/// Only malformed input is an error. A load no configuration can carry yields
/// the largest single conductor with `capacity_sufficient = false` and an
/// error-severity warning.
pub fn size_cable_with_rates(request: &SizingRequest, rates: &RateTable) -> CalcResult<SizingResult> {
    request.validate()?;

    let (max_per_cable, _) = per_conductor_limits(request);
    let required = request.load_amps * request.safety_margin / request.derating_factor;
    let single = select_cable(required, request.installation_method, request.material)?;
    let mut warnings = request.range_warnings();

    if request.load_amps > max_per_cable || !single.is_adequate() {
        debug!(
            load_amps = request.load_amps,
            max_per_cable,
            adequate = single.is_adequate(),
            "evaluating parallel configurations"
        );
        match optimize(request, rates, None) {
            Ok(ranked) => return parallel_result(request, ranked, warnings),
            Err(err) if err.is_design_finding() => {
                warn!(load_amps = request.load_amps, "{}", err);
                warnings.push(ValidationWarning::error("cables_in_parallel", err.to_string()));
            }
            Err(err) => return Err(err),
        }
    }

    Ok(single_result(request, single, rates, warnings))
}

fn single_result(
    request: &SizingRequest,
    single: Selection,
    rates: &RateTable,
    mut warnings: Vec<ValidationWarning>,
) -> SizingResult {
    let start = single.conductor();
    let conductor = ensure_acceptable_drop(
        start,
        request.material,
        request.load_amps,
        request.voltage,
        request.length_m,
        request.drop_limit(),
    );

    if !single.is_adequate() {
        warnings.push(ValidationWarning::error(
            "load_amps",
            format!(
                "Load of {:.1} A exceeds the largest {} conductor ({}, {:.0} A {})",
                request.load_amps,
                request.material.display_name().to_lowercase(),
                start.size,
                start.ampacity_for(request.installation_method),
                request.installation_method.display_name().to_lowercase()
            ),
        ));
    }
    if conductor.size != start.size {
        warnings.push(ValidationWarning::info(
            "cable_size",
            format!("Upsized from {} to {} to limit voltage drop", start.size, conductor.size),
        ));
    }

    let alternative = evaluate_configuration(conductor, 1, request, rates);
    let capacity_sufficient = single.is_adequate()
        && alternative
            .compliance
            .check(ComplianceRule::CapacityMargin)
            .is_some_and(|c| !c.failed());

    build_result(request, conductor, alternative, None, capacity_sufficient, warnings)
}

fn parallel_result(
    request: &SizingRequest,
    ranked: RankedAlternatives,
    mut warnings: Vec<ValidationWarning>,
) -> CalcResult<SizingResult> {
    let best = ranked
        .recommended()
        .cloned()
        .ok_or_else(|| CalcError::calculation_failed("parallel sizing", "no recommended alternative"))?;
    let conductor = find_conductor(request.material, &best.size)?;

    if best.cables_in_parallel > 1 {
        warnings.push(ValidationWarning::info(
            "cables_in_parallel",
            format!(
                "{} × {} in parallel; conductors must share length, cross-section and terminations ({})",
                best.cables_in_parallel,
                best.size,
                compliance::wiring_ref::PARALLEL_CONDUCTORS
            ),
        ));
    }

    let mut result = build_result(request, conductor, best, Some(ranked.cost_savings), true, warnings);
    result.alternatives = ranked.alternatives;
    Ok(result)
}

fn build_result(
    request: &SizingRequest,
    conductor: &'static ConductorSpec,
    chosen: Alternative,
    cost_savings: Option<f64>,
    capacity_sufficient: bool,
    mut warnings: Vec<ValidationWarning>,
) -> SizingResult {
    let n = chosen.cables_in_parallel;
    let load_per_cable = request.load_amps / f64::from(n);
    let drop = voltage_drop(load_per_cable, request.voltage, request.length_m, conductor);

    for failure in chosen.compliance.failures() {
        if failure.rule == ComplianceRule::CapacityMargin && !capacity_sufficient {
            continue;
        }
        warnings.push(ValidationWarning::error(field_for(failure.rule), failure.to_string()));
    }
    if !chosen.priced {
        warnings.push(ValidationWarning::warning(
            "cost",
            format!(
                "No rate for {} {}; costs shown as zero",
                chosen.size,
                request.rate_material_label()
            ),
        ));
    }

    let requires_engineer_verification =
        n > 1 || warnings.iter().any(|w| w.severity == WarningSeverity::Error);

    SizingResult {
        cable_size: chosen.size,
        size_mm2: chosen.size_mm2,
        material: request.material,
        installation_method: request.installation_method,
        impedance_per_km: conductor.impedance_per_km,
        voltage_drop_volts: drop.volts,
        voltage_drop_percent: drop.percent_display(),
        voltage_drop_limit_percent: request.drop_limit(),
        supply_cost: chosen.cost.supply,
        install_cost: chosen.cost.install,
        termination_cost: chosen.cost.termination,
        total_cost: chosen.cost.total,
        priced: chosen.priced,
        cables_in_parallel: n,
        load_per_cable,
        derated_capacity: chosen.derated_capacity * f64::from(n),
        capacity_sufficient,
        compliance: chosen.compliance,
        warnings,
        requires_engineer_verification,
        alternatives: Vec::new(),
        cost_savings,
    }
}

fn field_for(rule: ComplianceRule) -> &'static str {
    match rule {
        ComplianceRule::CapacityMargin => "load_amps",
        ComplianceRule::ProtectionCoordination | ComplianceRule::MinimumSize => "protection_device_rating",
        ComplianceRule::VoltageDrop => "voltage_drop",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_json_defaults() {
        let json = r#"{"load_amps": 32.0, "voltage": 230.0}"#;
        let request: SizingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request, SizingRequest::new(32.0, 230.0, 0.0));
        assert_eq!(request.drop_limit(), 3.0);
        assert_eq!(request.rate_material_label(), "Cu");
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let cases = [
            SizingRequest::new(0.0, 230.0, 10.0),
            SizingRequest::new(f64::NAN, 230.0, 10.0),
            SizingRequest::new(10.0, -230.0, 10.0),
            SizingRequest::new(10.0, 230.0, -1.0),
            SizingRequest::new(10.0, 230.0, 10.0).with_derating_factor(0.0),
            SizingRequest::new(10.0, 230.0, 10.0).with_safety_margin(-1.0),
            SizingRequest::new(10.0, 230.0, 10.0).with_protection_device(0.0),
        ];
        for request in cases {
            let err = size_cable(&request).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT", "{:?}", request);
        }
    }

    #[test]
    fn test_factors_outside_usual_range_are_sized_with_warnings() {
        // Ca of 1.05 below the reference ambient raises the usable rating
        let warm = size_cable(&SizingRequest::new(50.0, 230.0, 10.0)).unwrap();
        let cool = size_cable(&SizingRequest::new(50.0, 230.0, 10.0).with_derating_factor(1.05)).unwrap();
        assert!(cool.size_mm2 <= warm.size_mm2);
        assert!(cool
            .warnings
            .iter()
            .any(|w| w.field == "derating_factor" && w.severity == WarningSeverity::Warning));
        assert!(!warm.warnings.iter().any(|w| w.field == "derating_factor"));

        let result = size_cable(&SizingRequest::new(50.0, 230.0, 10.0).with_safety_margin(0.95)).unwrap();
        assert!(result.capacity_sufficient);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "safety_margin" && w.severity == WarningSeverity::Warning));
    }

    #[test]
    fn test_small_circuit_single_cable() {
        let result = size_cable(&SizingRequest::new(20.0, 230.0, 10.0)).unwrap();
        assert_eq!(result.cables_in_parallel, 1);
        assert_eq!(result.cable_size, "1.5mm²");
        assert!(result.passes());
        assert!(!result.requires_engineer_verification);
        assert!(result.alternatives.is_empty());
        assert_eq!(result.cost_savings, None);
    }

    #[test]
    fn test_voltage_drop_upsizing_reported() {
        // 30 A over 60 m single-phase needs 16mm² rather than 4mm²
        let result = size_cable(&SizingRequest::new(30.0, 230.0, 60.0)).unwrap();
        assert_eq!(result.cable_size, "16mm²");
        assert!(result
            .warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Info && w.message.contains("Upsized from 4mm²")));
        assert!(result.voltage_drop_percent <= 3.0);
    }

    #[test]
    fn test_unreachable_drop_flagged() {
        let result = size_cable(&SizingRequest::new(100.0, 230.0, 2000.0)).unwrap();
        assert_eq!(result.cable_size, "400mm²");
        assert!(!result.passes());
        assert!(result.requires_engineer_verification);
        assert!(result.warnings.iter().any(|w| w.field == "voltage_drop"));
    }

    #[test]
    fn test_parallel_path_when_over_max() {
        let request = SizingRequest::new(500.0, 400.0, 50.0).with_max_amps_per_cable(400.0);
        let result = size_cable(&request).unwrap();
        assert!(result.cables_in_parallel >= 2);
        assert!(result.requires_engineer_verification);
        assert!(!result.alternatives.is_empty());
        assert!(result.cost_savings.unwrap() >= 0.0);
        assert!((result.load_per_cable * f64::from(result.cables_in_parallel) - 500.0).abs() < 0.01);
    }

    #[test]
    fn test_no_viable_configuration_falls_back() {
        let request = SizingRequest::new(5000.0, 400.0, 10.0).with_max_amps_per_cable(400.0);
        let result = size_cable(&request).unwrap();
        assert_eq!(result.cables_in_parallel, 1);
        assert_eq!(result.cable_size, "400mm²");
        assert!(!result.capacity_sufficient);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.severity == WarningSeverity::Error && w.field == "cables_in_parallel"));
    }

    #[test]
    fn test_result_serialization() {
        let result = size_cable(&SizingRequest::new(45.0, 400.0, 25.0)).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"capacity_sufficient\":true"));
        assert!(!json.contains("alternatives"));
        let roundtrip: SizingResult = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.cable_size, result.cable_size);
        assert_eq!(roundtrip.warnings, result.warnings);
    }
}
