//! # Conductor Reference Tables
//!
//! Standard cross-section data for low-voltage PVC-insulated cables, one
//! immutable table per conductor material.
//!
//! ## Table Invariants
//!
//! - Entries are sorted ascending by cross-section
//! - Ampacity is non-decreasing with size for every installation method
//! - Size labels are unique within a material's table
//!
//! ## Example
//!
//! ```rust
//! use cable_core::conductors::{conductor_table, ConductorMaterial, InstallationMethod};
//!
//! let table = conductor_table(ConductorMaterial::Copper);
//! let first_duct_rated = table
//!     .iter()
//!     .find(|c| c.ampacity_for(InstallationMethod::Duct) >= 58.0)
//!     .unwrap();
//! assert_eq!(first_duct_rated.size, "10mm²");
//! ```

pub mod aluminium;
pub mod copper;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

pub use aluminium::ALUMINIUM_TABLE;
pub use copper::COPPER_TABLE;

/// Conductor material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConductorMaterial {
    /// Copper conductors
    #[default]
    Copper,
    /// Aluminium conductors
    Aluminium,
}

impl ConductorMaterial {
    /// All materials for UI selection
    pub const ALL: [ConductorMaterial; 2] = [ConductorMaterial::Copper, ConductorMaterial::Aluminium];

    /// Parse from common string representations.
    ///
    /// Accepts full names, chemical symbols and cable type labels whose first
    /// token is the conductor ("Cu/PVC", "Al XLPE/SWA").
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        normalize_material_label(s).ok_or_else(|| CalcError::material_not_found(s))
    }

    /// Short symbol used in cable type labels
    pub fn symbol(&self) -> &'static str {
        match self {
            ConductorMaterial::Copper => "Cu",
            ConductorMaterial::Aluminium => "Al",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ConductorMaterial::Copper => "Copper",
            ConductorMaterial::Aluminium => "Aluminium",
        }
    }
}

impl std::fmt::Display for ConductorMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Normalize a free-text material label to a conductor material.
///
/// "Cu/PVC", "Copper", "CU" all map to copper; returns `None` when the first
/// token of the label names no known conductor.
pub fn normalize_material_label(label: &str) -> Option<ConductorMaterial> {
    let token = label
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|t| !t.is_empty())?
        .to_ascii_lowercase();
    match token.as_str() {
        "cu" | "copper" => Some(ConductorMaterial::Copper),
        "al" | "alu" | "aluminium" | "aluminum" => Some(ConductorMaterial::Aluminium),
        _ => None,
    }
}

/// Cable installation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InstallationMethod {
    /// Clipped direct or on cable tray in free air
    #[default]
    Air,
    /// Enclosed in conduit or trunking
    Duct,
    /// Direct in ground
    Buried,
}

impl InstallationMethod {
    /// All installation methods for UI selection
    pub const ALL: [InstallationMethod; 3] = [
        InstallationMethod::Air,
        InstallationMethod::Duct,
        InstallationMethod::Buried,
    ];

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> CalcResult<Self> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "air" | "free air" | "tray" | "cable tray" | "clipped" => Ok(InstallationMethod::Air),
            "duct" | "conduit" | "trunking" | "sleeve" => Ok(InstallationMethod::Duct),
            "buried" | "ground" | "direct buried" | "underground" => Ok(InstallationMethod::Buried),
            _ => Err(CalcError::invalid_input(
                "installation_method",
                s,
                "Expected one of: air, duct, buried",
            )),
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            InstallationMethod::Air => "In air",
            InstallationMethod::Duct => "In duct",
            InstallationMethod::Buried => "Direct buried",
        }
    }
}

impl std::fmt::Display for InstallationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Continuous current rating per installation method (A)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ampacity {
    pub air: f64,
    pub duct: f64,
    pub buried: f64,
}

impl Ampacity {
    /// Rating for the given installation method
    pub fn for_method(&self, method: InstallationMethod) -> f64 {
        match method {
            InstallationMethod::Air => self.air,
            InstallationMethod::Duct => self.duct,
            InstallationMethod::Buried => self.buried,
        }
    }
}

/// One row of a conductor reference table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConductorSpec {
    /// Nominal size label (e.g., "16mm²")
    pub size: &'static str,
    /// Cross-sectional area in mm²
    pub size_mm2: f64,
    /// Continuous current ratings by installation method
    pub ampacity: Ampacity,
    /// Conductor resistance at 70°C (Ω/km)
    pub impedance_per_km: f64,
    /// Single-phase voltage drop (mV/A/m)
    pub volt_drop_1ph: f64,
    /// Three-phase voltage drop (mV/A/m)
    pub volt_drop_3ph: f64,
    /// Supply cost per meter of cable
    pub supply_cost_per_m: f64,
    /// Installation labour cost per meter of cable
    pub install_cost_per_m: f64,
}

impl ConductorSpec {
    /// Ampacity for an installation method (A)
    pub fn ampacity_for(&self, method: InstallationMethod) -> f64 {
        self.ampacity.for_method(method)
    }
}

/// Build a table row; keeps the data files one line per size.
#[allow(clippy::too_many_arguments)]
pub(crate) const fn row(
    size: &'static str,
    size_mm2: f64,
    (air, duct, buried): (f64, f64, f64),
    impedance_per_km: f64,
    volt_drop_1ph: f64,
    volt_drop_3ph: f64,
    supply_cost_per_m: f64,
    install_cost_per_m: f64,
) -> ConductorSpec {
    ConductorSpec {
        size,
        size_mm2,
        ampacity: Ampacity { air, duct, buried },
        impedance_per_km,
        volt_drop_1ph,
        volt_drop_3ph,
        supply_cost_per_m,
        install_cost_per_m,
    }
}

/// Get the reference table for a conductor material.
pub fn conductor_table(material: ConductorMaterial) -> &'static [ConductorSpec] {
    match material {
        ConductorMaterial::Copper => &COPPER_TABLE,
        ConductorMaterial::Aluminium => &ALUMINIUM_TABLE,
    }
}

/// Position of a conductor within its material's table.
pub fn table_index(material: ConductorMaterial, size: &str) -> Option<usize> {
    conductor_table(material).iter().position(|c| c.size == size)
}

/// Parse the cross-section out of a size label.
///
/// Accepts "95mm²", "95mm2", "95 mm", "95".
pub fn parse_size_mm2(label: &str) -> Option<f64> {
    let trimmed = label
        .trim()
        .trim_end_matches('²')
        .trim_end_matches("mm2")
        .trim_end_matches("sq")
        .trim_end_matches("mm")
        .trim();
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite() && *v > 0.0)
}

/// Look up a conductor by size label.
///
/// # Example
///
/// ```rust
/// use cable_core::conductors::{find_conductor, ConductorMaterial};
///
/// let c = find_conductor(ConductorMaterial::Copper, "95mm2").unwrap();
/// assert_eq!(c.size, "95mm²");
/// ```
pub fn find_conductor(material: ConductorMaterial, label: &str) -> CalcResult<&'static ConductorSpec> {
    let size_mm2 = parse_size_mm2(label)
        .ok_or_else(|| CalcError::conductor_not_found(label, material.display_name()))?;
    conductor_table(material)
        .iter()
        .find(|c| (c.size_mm2 - size_mm2).abs() < 1e-9)
        .ok_or_else(|| CalcError::conductor_not_found(label, material.display_name()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_sorted_and_monotonic() {
        for material in ConductorMaterial::ALL {
            let table = conductor_table(material);
            assert!(!table.is_empty());
            for pair in table.windows(2) {
                assert!(pair[0].size_mm2 < pair[1].size_mm2, "{} not ascending", pair[1].size);
                for method in InstallationMethod::ALL {
                    assert!(
                        pair[0].ampacity_for(method) <= pair[1].ampacity_for(method),
                        "{} {} ampacity decreases at {}",
                        material,
                        method,
                        pair[1].size
                    );
                }
                assert!(pair[0].volt_drop_1ph >= pair[1].volt_drop_1ph);
                assert!(pair[0].volt_drop_3ph >= pair[1].volt_drop_3ph);
            }
        }
    }

    #[test]
    fn test_size_labels_unique() {
        for material in ConductorMaterial::ALL {
            let table = conductor_table(material);
            for (i, c) in table.iter().enumerate() {
                assert_eq!(table_index(material, c.size), Some(i));
                assert_eq!(parse_size_mm2(c.size), Some(c.size_mm2));
            }
        }
    }

    #[test]
    fn test_parse_size_labels() {
        assert_eq!(parse_size_mm2("16mm²"), Some(16.0));
        assert_eq!(parse_size_mm2("2.5mm2"), Some(2.5));
        assert_eq!(parse_size_mm2(" 95 mm "), Some(95.0));
        assert_eq!(parse_size_mm2("240"), Some(240.0));
        assert_eq!(parse_size_mm2("large"), None);
        assert_eq!(parse_size_mm2("-4mm²"), None);
    }

    #[test]
    fn test_find_conductor() {
        let c = find_conductor(ConductorMaterial::Aluminium, "185mm²").unwrap();
        assert_eq!(c.size_mm2, 185.0);
        // Aluminium table starts at 16mm²
        assert!(find_conductor(ConductorMaterial::Aluminium, "10mm²").is_err());
    }

    #[test]
    fn test_material_normalization() {
        assert_eq!(normalize_material_label("Cu/PVC"), Some(ConductorMaterial::Copper));
        assert_eq!(normalize_material_label("Copper"), Some(ConductorMaterial::Copper));
        assert_eq!(normalize_material_label("CU"), Some(ConductorMaterial::Copper));
        assert_eq!(normalize_material_label("Al XLPE/SWA"), Some(ConductorMaterial::Aluminium));
        assert_eq!(normalize_material_label("aluminum"), Some(ConductorMaterial::Aluminium));
        assert_eq!(normalize_material_label("4C PVC"), None);
        assert_eq!(normalize_material_label(""), None);
        assert!(ConductorMaterial::from_str_flexible("brass").is_err());
    }

    #[test]
    fn test_installation_method_parsing() {
        assert_eq!(InstallationMethod::from_str_flexible("Duct").unwrap(), InstallationMethod::Duct);
        assert_eq!(
            InstallationMethod::from_str_flexible("direct-buried").unwrap(),
            InstallationMethod::Buried
        );
        assert_eq!(InstallationMethod::from_str_flexible("cable_tray").unwrap(), InstallationMethod::Air);
        assert!(InstallationMethod::from_str_flexible("ceiling").is_err());
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&InstallationMethod::Buried).unwrap(), "\"buried\"");
        let m: ConductorMaterial = serde_json::from_str("\"aluminium\"").unwrap();
        assert_eq!(m, ConductorMaterial::Aluminium);
    }
}
