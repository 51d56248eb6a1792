//! # Conductor Selection
//!
//! Smallest-adequate selection by ampacity, followed by upsizing until the
//! voltage drop is acceptable.

use crate::conductors::{conductor_table, table_index, ConductorMaterial, ConductorSpec, InstallationMethod};
use crate::errors::{CalcError, CalcResult};

use super::voltage_drop::voltage_drop;

/// Outcome of an ampacity-based selection.
///
/// When no conductor is rated for the required current the largest conductor
/// is still returned, tagged `Insufficient`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// Smallest conductor rated for the required current
    Adequate(&'static ConductorSpec),
    /// Largest conductor in the table; still under-rated
    Insufficient(&'static ConductorSpec),
}

impl Selection {
    pub fn conductor(&self) -> &'static ConductorSpec {
        match *self {
            Selection::Adequate(c) | Selection::Insufficient(c) => c,
        }
    }

    pub fn is_adequate(&self) -> bool {
        matches!(self, Selection::Adequate(_))
    }
}

/// Select the smallest conductor whose ampacity covers `required_current`.
///
/// # Example
///
/// ```rust
/// use cable_core::conductors::{ConductorMaterial, InstallationMethod};
/// use cable_core::sizing::selection::{select_cable, Selection};
///
/// let selection = select_cable(60.0, InstallationMethod::Duct, ConductorMaterial::Copper).unwrap();
/// assert!(matches!(selection, Selection::Adequate(c) if c.size == "16mm²"));
/// ```
pub fn select_cable(
    required_current: f64,
    method: InstallationMethod,
    material: ConductorMaterial,
) -> CalcResult<Selection> {
    if !(required_current.is_finite() && required_current > 0.0) {
        return Err(CalcError::invalid_input(
            "required_current",
            required_current.to_string(),
            "Required current must be a positive finite number",
        ));
    }

    let table = conductor_table(material);
    if let Some(conductor) = table.iter().find(|c| c.ampacity_for(method) >= required_current) {
        return Ok(Selection::Adequate(conductor));
    }
    table
        .last()
        .map(Selection::Insufficient)
        .ok_or_else(|| CalcError::Internal {
            message: format!("empty conductor table for {}", material),
        })
}

/// Walk up the table from `start` until the voltage drop is within
/// `limit_percent`.
///
/// Never skips a size. Returns the largest conductor when none satisfies the
/// limit; the caller inspects the resulting drop.
pub fn ensure_acceptable_drop(
    start: &'static ConductorSpec,
    material: ConductorMaterial,
    current: f64,
    voltage: f64,
    length_m: f64,
    limit_percent: f64,
) -> &'static ConductorSpec {
    let table = conductor_table(material);
    let Some(start_index) = table_index(material, start.size) else {
        return start;
    };

    table[start_index..]
        .iter()
        .find(|c| voltage_drop(current, voltage, length_m, c).within(limit_percent))
        .unwrap_or(&table[table.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_rating_selects_that_size() {
        let s = select_cable(58.0, InstallationMethod::Duct, ConductorMaterial::Copper).unwrap();
        assert_eq!(s, Selection::Adequate(&crate::conductors::COPPER_TABLE[4]));
    }

    #[test]
    fn test_overload_returns_largest_insufficient() {
        let s = select_cable(900.0, InstallationMethod::Air, ConductorMaterial::Aluminium).unwrap();
        assert!(!s.is_adequate());
        assert_eq!(s.conductor().size, "400mm²");
    }

    #[test]
    fn test_invalid_required_current() {
        assert!(select_cable(0.0, InstallationMethod::Air, ConductorMaterial::Copper).is_err());
        assert!(select_cable(f64::NAN, InstallationMethod::Air, ConductorMaterial::Copper).is_err());
        assert!(select_cable(f64::INFINITY, InstallationMethod::Air, ConductorMaterial::Copper).is_err());
    }

    #[test]
    fn test_selection_monotonic_in_current() {
        for material in ConductorMaterial::ALL {
            for method in InstallationMethod::ALL {
                let mut previous = 0.0;
                for amps in (1..700).map(f64::from) {
                    let size = select_cable(amps, method, material).unwrap().conductor().size_mm2;
                    assert!(size >= previous, "{} {} at {} A", material, method, amps);
                    previous = size;
                }
            }
        }
    }

    #[test]
    fn test_selection_idempotent() {
        let a = select_cable(137.0, InstallationMethod::Buried, ConductorMaterial::Copper).unwrap();
        let b = select_cable(137.0, InstallationMethod::Buried, ConductorMaterial::Copper).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_upsizing_walks_to_first_acceptable() {
        let start = select_cable(30.0, InstallationMethod::Air, ConductorMaterial::Copper)
            .unwrap()
            .conductor();
        assert_eq!(start.size, "4mm²");
        // 4mm²: 11 × 30 × 60 / 1000 = 19.8 V (8.6%); 10mm²: 4.4 → 7.92 V (3.44%);
        // 16mm²: 2.8 → 5.04 V (2.19%)
        let upsized = ensure_acceptable_drop(start, ConductorMaterial::Copper, 30.0, 230.0, 60.0, 3.0);
        assert_eq!(upsized.size, "16mm²");
    }

    #[test]
    fn test_upsizing_keeps_start_when_acceptable() {
        let start = &crate::conductors::COPPER_TABLE[4];
        let kept = ensure_acceptable_drop(start, ConductorMaterial::Copper, 58.0, 230.0, 0.0, 3.0);
        assert_eq!(kept.size, start.size);
    }

    #[test]
    fn test_upsizing_falls_back_to_largest() {
        let start = &crate::conductors::COPPER_TABLE[0];
        let largest = ensure_acceptable_drop(start, ConductorMaterial::Copper, 400.0, 230.0, 2000.0, 3.0);
        assert_eq!(largest.size, "400mm²");
    }
}
