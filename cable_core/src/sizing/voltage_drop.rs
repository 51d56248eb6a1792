//! # Voltage Drop
//!
//! Voltage drop from tabulated mV/A/m coefficients:
//!
//! ```text
//! Vd  = (mV/A/m) × I × L / 1000        [V]
//! Vd% = Vd / U0 × 100
//! ```
//!
//! 400 V-class supplies are treated as three-phase and use the 3-phase
//! coefficient; everything else uses the single-phase coefficient.

use serde::{Deserialize, Serialize};

use crate::conductors::ConductorSpec;

/// Nominal voltages at or above this are treated as three-phase (400 V class)
pub const THREE_PHASE_THRESHOLD_V: f64 = 380.0;

/// Supply configuration implied by the nominal voltage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyPhase {
    SinglePhase,
    ThreePhase,
}

impl SupplyPhase {
    pub fn from_voltage(voltage: f64) -> Self {
        if voltage >= THREE_PHASE_THRESHOLD_V {
            SupplyPhase::ThreePhase
        } else {
            SupplyPhase::SinglePhase
        }
    }

    /// Tabulated mV/A/m coefficient for this supply
    pub fn coefficient(&self, conductor: &ConductorSpec) -> f64 {
        match self {
            SupplyPhase::SinglePhase => conductor.volt_drop_1ph,
            SupplyPhase::ThreePhase => conductor.volt_drop_3ph,
        }
    }
}

/// Permitted voltage drop as a percentage of nominal voltage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageDropLimits {
    /// Limit for 400 V-class circuits (%)
    pub three_phase_percent: f64,
    /// Limit for all other circuits (%)
    pub single_phase_percent: f64,
}

impl Default for VoltageDropLimits {
    fn default() -> Self {
        VoltageDropLimits {
            three_phase_percent: 5.0,
            single_phase_percent: 3.0,
        }
    }
}

impl VoltageDropLimits {
    /// Applicable limit, honouring an explicit override
    pub fn limit_for(&self, voltage: f64, explicit: Option<f64>) -> f64 {
        explicit.unwrap_or(match SupplyPhase::from_voltage(voltage) {
            SupplyPhase::ThreePhase => self.three_phase_percent,
            SupplyPhase::SinglePhase => self.single_phase_percent,
        })
    }
}

/// Voltage drop in volts and percent (full precision).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageDrop {
    pub volts: f64,
    pub percent: f64,
}

impl VoltageDrop {
    /// Percent rounded to 2 decimal places, for display only
    pub fn percent_display(&self) -> f64 {
        round2(self.percent)
    }

    /// Compare against a limit at full precision
    pub fn within(&self, limit_percent: f64) -> bool {
        self.percent <= limit_percent
    }
}

/// Voltage drop in volts for `current` A over `length_m` meters.
pub fn compute_volt_drop(current: f64, voltage: f64, length_m: f64, conductor: &ConductorSpec) -> f64 {
    if length_m == 0.0 {
        return 0.0;
    }
    let coeff = SupplyPhase::from_voltage(voltage).coefficient(conductor);
    coeff * current * length_m / 1000.0
}

/// Voltage drop in volts and as a percentage of `voltage`.
pub fn voltage_drop(current: f64, voltage: f64, length_m: f64, conductor: &ConductorSpec) -> VoltageDrop {
    let volts = compute_volt_drop(current, voltage, length_m, conductor);
    VoltageDrop {
        volts,
        percent: volts / voltage * 100.0,
    }
}

/// Resistive estimate from Ω/km, ignoring reactance.
///
/// Two conductors carry the current in a single-phase loop; a balanced
/// three-phase circuit uses √3. Kept for cross-checking tabulated values.
pub fn approximate_volt_drop(current: f64, voltage: f64, length_m: f64, conductor: &ConductorSpec) -> f64 {
    let loop_factor = match SupplyPhase::from_voltage(voltage) {
        SupplyPhase::SinglePhase => 2.0,
        SupplyPhase::ThreePhase => 3f64.sqrt(),
    };
    loop_factor * current * conductor.impedance_per_km * length_m / 1000.0
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductors::COPPER_TABLE;

    #[test]
    fn test_single_phase_drop() {
        let c16 = &COPPER_TABLE[5];
        // 2.8 mV/A/m × 40 A × 25 m = 2.8 V
        let vd = voltage_drop(40.0, 230.0, 25.0, c16);
        assert!((vd.volts - 2.8).abs() < 1e-9);
        assert!((vd.percent - 2.8 / 230.0 * 100.0).abs() < 1e-9);
        assert_eq!(vd.percent_display(), 1.22);
    }

    #[test]
    fn test_three_phase_uses_3ph_coefficient() {
        let c16 = &COPPER_TABLE[5];
        let vd = compute_volt_drop(40.0, 400.0, 25.0, c16);
        assert!((vd - 2.4).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_has_no_drop() {
        for c in COPPER_TABLE.iter() {
            let vd = voltage_drop(350.0, 230.0, 0.0, c);
            assert_eq!(vd.volts, 0.0);
            assert_eq!(vd.percent, 0.0);
        }
    }

    #[test]
    fn test_drop_linear_in_length() {
        let c = &COPPER_TABLE[8];
        let single = compute_volt_drop(120.0, 400.0, 37.5, c);
        let double = compute_volt_drop(120.0, 400.0, 75.0, c);
        assert!((double - 2.0 * single).abs() < 1e-9);
    }

    #[test]
    fn test_limit_policy() {
        let limits = VoltageDropLimits::default();
        assert_eq!(limits.limit_for(400.0, None), 5.0);
        assert_eq!(limits.limit_for(230.0, None), 3.0);
        assert_eq!(limits.limit_for(230.0, Some(2.5)), 2.5);
    }

    #[test]
    fn test_full_precision_comparison() {
        // 3.004% displays as 3.0 but must still fail a 3% limit
        let vd = VoltageDrop { volts: 6.9092, percent: 3.004 };
        assert_eq!(vd.percent_display(), 3.0);
        assert!(!vd.within(3.0));
    }

    #[test]
    fn test_approximate_close_to_tabulated() {
        let c50 = &COPPER_TABLE[8];
        let tabulated = compute_volt_drop(100.0, 230.0, 50.0, c50);
        let approx = approximate_volt_drop(100.0, 230.0, 50.0, c50);
        // Resistive-only estimate within 20% of the tabulated value
        assert!((approx - tabulated).abs() / tabulated < 0.2);
    }
}
