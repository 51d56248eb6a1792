//! Copper PVC-insulated conductors, 600/1000 V
//!
//! Ratings assume 30°C ambient (air/duct) and 20°C ground, 70°C conductor
//! operating temperature, single circuit. Grouping and ambient corrections are
//! applied by the caller.
//!
//! Columns: size, mm², (air, duct, buried) A, Ω/km, mV/A/m 1ph, mV/A/m 3ph,
//! supply per m, install per m.

use super::{row, ConductorSpec};

/// Copper reference table, ascending by cross-section
pub static COPPER_TABLE: [ConductorSpec; 17] = [
    row("1.5mm²", 1.5, (20.0, 16.0, 24.0), 12.1, 29.0, 25.0, 12.0, 18.0),
    row("2.5mm²", 2.5, (27.0, 22.0, 32.0), 7.41, 18.0, 15.0, 18.0, 20.0),
    row("4mm²", 4.0, (36.0, 29.0, 42.0), 4.61, 11.0, 9.5, 28.0, 22.0),
    row("6mm²", 6.0, (46.0, 37.0, 53.0), 3.08, 7.3, 6.4, 40.0, 25.0),
    row("10mm²", 10.0, (63.0, 58.0, 70.0), 1.83, 4.4, 3.8, 65.0, 30.0),
    row("16mm²", 16.0, (85.0, 75.0, 91.0), 1.15, 2.8, 2.4, 95.0, 35.0),
    row("25mm²", 25.0, (112.0, 96.0, 116.0), 0.727, 1.75, 1.5, 150.0, 45.0),
    row("35mm²", 35.0, (138.0, 119.0, 140.0), 0.524, 1.25, 1.1, 205.0, 55.0),
    row("50mm²", 50.0, (168.0, 143.0, 166.0), 0.387, 0.93, 0.8, 285.0, 65.0),
    row("70mm²", 70.0, (213.0, 179.0, 204.0), 0.268, 0.63, 0.55, 395.0, 80.0),
    row("95mm²", 95.0, (258.0, 216.0, 245.0), 0.193, 0.46, 0.41, 535.0, 95.0),
    row("120mm²", 120.0, (299.0, 249.0, 280.0), 0.153, 0.36, 0.33, 680.0, 110.0),
    row("150mm²", 150.0, (344.0, 285.0, 316.0), 0.124, 0.29, 0.27, 850.0, 125.0),
    row("185mm²", 185.0, (392.0, 324.0, 356.0), 0.0991, 0.23, 0.22, 1050.0, 145.0),
    row("240mm²", 240.0, (461.0, 380.0, 414.0), 0.0754, 0.18, 0.17, 1370.0, 170.0),
    row("300mm²", 300.0, (530.0, 435.0, 469.0), 0.0601, 0.145, 0.14, 1710.0, 195.0),
    row("400mm²", 400.0, (620.0, 500.0, 530.0), 0.047, 0.115, 0.11, 2280.0, 230.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conductors::InstallationMethod;

    #[test]
    fn test_duct_ratings_around_10mm2() {
        let c10 = &COPPER_TABLE[4];
        let c16 = &COPPER_TABLE[5];
        assert_eq!(c10.size, "10mm²");
        assert_eq!(c10.ampacity_for(InstallationMethod::Duct), 58.0);
        assert_eq!(c16.ampacity_for(InstallationMethod::Duct), 75.0);
    }

    #[test]
    fn test_three_phase_coefficient_below_single_phase() {
        for c in COPPER_TABLE.iter() {
            assert!(c.volt_drop_3ph < c.volt_drop_1ph, "{}", c.size);
        }
    }
}
