//! Aluminium PVC-insulated conductors, 600/1000 V
//!
//! Same rating basis as the copper table. Aluminium is not manufactured below
//! 16mm² for power cable, so the table starts there.

use super::{row, ConductorSpec};

/// Aluminium reference table, ascending by cross-section
pub static ALUMINIUM_TABLE: [ConductorSpec; 12] = [
    row("16mm²", 16.0, (66.0, 58.0, 71.0), 1.91, 4.7, 4.0, 45.0, 35.0),
    row("25mm²", 25.0, (87.0, 75.0, 90.0), 1.20, 2.9, 2.5, 60.0, 45.0),
    row("35mm²", 35.0, (107.0, 92.0, 108.0), 0.868, 2.1, 1.8, 75.0, 55.0),
    row("50mm²", 50.0, (130.0, 111.0, 128.0), 0.641, 1.55, 1.35, 95.0, 65.0),
    row("70mm²", 70.0, (165.0, 139.0, 158.0), 0.443, 1.05, 0.92, 125.0, 80.0),
    row("95mm²", 95.0, (201.0, 168.0, 190.0), 0.320, 0.77, 0.67, 160.0, 95.0),
    row("120mm²", 120.0, (232.0, 194.0, 217.0), 0.253, 0.61, 0.53, 195.0, 110.0),
    row("150mm²", 150.0, (267.0, 222.0, 245.0), 0.206, 0.49, 0.43, 235.0, 125.0),
    row("185mm²", 185.0, (304.0, 252.0, 276.0), 0.164, 0.39, 0.34, 285.0, 145.0),
    row("240mm²", 240.0, (358.0, 296.0, 321.0), 0.125, 0.30, 0.26, 360.0, 170.0),
    row("300mm²", 300.0, (411.0, 339.0, 364.0), 0.100, 0.24, 0.21, 445.0, 195.0),
    row("400mm²", 400.0, (481.0, 389.0, 412.0), 0.0778, 0.19, 0.17, 570.0, 230.0),
];
