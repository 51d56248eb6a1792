//! # Optimization Settings
//!
//! Company-wide parameters for cable sizing and optimization. Every key is
//! optional in JSON; missing keys take the defaults below.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "grouping_factor_2_circuits": 0.80,
//!   "grouping_factor_3_circuits": 0.70,
//!   "grouping_factor_4plus_circuits": 0.65,
//!   "max_amps_per_cable": 400.0,
//!   "preferred_amps_per_cable": 300.0,
//!   "cable_safety_margin": 1.0,
//!   "voltage_drop_limit_400v": 5.0,
//!   "voltage_drop_limit_230v": 3.0,
//!   "default_installation_method": "air",
//!   "default_cable_material": "copper"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::conductors::{ConductorMaterial, InstallationMethod};
use crate::errors::{CalcError, CalcResult};
use crate::sizing::compliance::{GroupingFactors, DEFAULT_LOCAL_PROTECTION_RATIO, DEFAULT_TRIPPING_MULTIPLIER};
use crate::sizing::voltage_drop::VoltageDropLimits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationSettings {
    pub grouping_factor_2_circuits: f64,
    pub grouping_factor_3_circuits: f64,
    pub grouping_factor_4plus_circuits: f64,
    /// Hard limit on current per parallel conductor (A)
    pub max_amps_per_cable: f64,
    /// Per-conductor current the search window is centred on (A)
    pub preferred_amps_per_cable: f64,
    pub cable_safety_margin: f64,
    pub voltage_drop_limit_400v: f64,
    pub voltage_drop_limit_230v: f64,
    pub default_installation_method: InstallationMethod,
    pub default_cable_material: ConductorMaterial,
    /// Breakers above this multiple of the load are treated as upstream protection
    pub local_protection_ratio: f64,
    pub tripping_multiplier: f64,
}

impl Default for OptimizationSettings {
    fn default() -> Self {
        OptimizationSettings {
            grouping_factor_2_circuits: 0.80,
            grouping_factor_3_circuits: 0.70,
            grouping_factor_4plus_circuits: 0.65,
            max_amps_per_cable: 400.0,
            preferred_amps_per_cable: 300.0,
            cable_safety_margin: 1.0,
            voltage_drop_limit_400v: 5.0,
            voltage_drop_limit_230v: 3.0,
            default_installation_method: InstallationMethod::Air,
            default_cable_material: ConductorMaterial::Copper,
            local_protection_ratio: DEFAULT_LOCAL_PROTECTION_RATIO,
            tripping_multiplier: DEFAULT_TRIPPING_MULTIPLIER,
        }
    }
}

impl OptimizationSettings {
    /// Parse settings from JSON and validate them.
    pub fn from_json_str(json: &str) -> CalcResult<Self> {
        let settings: OptimizationSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn grouping_factors(&self) -> GroupingFactors {
        GroupingFactors {
            two: self.grouping_factor_2_circuits,
            three: self.grouping_factor_3_circuits,
            four_plus: self.grouping_factor_4plus_circuits,
        }
    }

    pub fn drop_limits(&self) -> VoltageDropLimits {
        VoltageDropLimits {
            three_phase_percent: self.voltage_drop_limit_400v,
            single_phase_percent: self.voltage_drop_limit_230v,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        for (field, value) in [
            ("grouping_factor_2_circuits", self.grouping_factor_2_circuits),
            ("grouping_factor_3_circuits", self.grouping_factor_3_circuits),
            ("grouping_factor_4plus_circuits", self.grouping_factor_4plus_circuits),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(CalcError::invalid_input(
                    field,
                    value.to_string(),
                    "Grouping factor must be in (0, 1]",
                ));
            }
        }
        for (field, value) in [
            ("max_amps_per_cable", self.max_amps_per_cable),
            ("preferred_amps_per_cable", self.preferred_amps_per_cable),
            ("voltage_drop_limit_400v", self.voltage_drop_limit_400v),
            ("voltage_drop_limit_230v", self.voltage_drop_limit_230v),
            ("local_protection_ratio", self.local_protection_ratio),
            ("cable_safety_margin", self.cable_safety_margin),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }
        if self.preferred_amps_per_cable > self.max_amps_per_cable {
            return Err(CalcError::invalid_input(
                "preferred_amps_per_cable",
                self.preferred_amps_per_cable.to_string(),
                "Preferred amps per cable cannot exceed max_amps_per_cable",
            ));
        }
        if !(self.tripping_multiplier.is_finite() && self.tripping_multiplier >= 1.0) {
            return Err(CalcError::invalid_input(
                "tripping_multiplier",
                self.tripping_multiplier.to_string(),
                "Tripping multiplier must be at least 1.0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        let settings = OptimizationSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.grouping_factors(), GroupingFactors::default());
        assert_eq!(settings.drop_limits(), VoltageDropLimits::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = OptimizationSettings::from_json_str(
            r#"{
                "max_amps_per_cable": 250.0,
                "preferred_amps_per_cable": 200.0,
                "default_cable_material": "aluminium"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.max_amps_per_cable, 250.0);
        assert_eq!(settings.default_cable_material, ConductorMaterial::Aluminium);
        assert_eq!(settings.grouping_factor_3_circuits, 0.70);
        assert_eq!(settings.voltage_drop_limit_230v, 3.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = OptimizationSettings::from_json_str(r#"{"grouping_factor_2_circuits": 1.4}"#).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let err = OptimizationSettings::from_json_str(r#"{"preferred_amps_per_cable": 500.0}"#).unwrap_err();
        assert!(err.to_string().contains("preferred_amps_per_cable"));

        let err = OptimizationSettings::from_json_str(r#"{"cable_safety_margin": 0.0}"#).unwrap_err();
        assert!(err.to_string().contains("cable_safety_margin"));
        assert!(OptimizationSettings::from_json_str(r#"{"cable_safety_margin": 0.95}"#).is_ok());

        let err = OptimizationSettings::from_json_str("not json").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_settings_json_keys() {
        let json = serde_json::to_value(OptimizationSettings::default()).unwrap();
        for key in [
            "grouping_factor_2_circuits",
            "grouping_factor_3_circuits",
            "grouping_factor_4plus_circuits",
            "max_amps_per_cable",
            "preferred_amps_per_cable",
            "cable_safety_margin",
            "voltage_drop_limit_400v",
            "voltage_drop_limit_230v",
            "default_installation_method",
            "default_cable_material",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["default_installation_method"], "air");
    }
}
