//! # cable_core - Cable Sizing and Optimization Engine
//!
//! `cable_core` sizes low-voltage power cables: it selects a standard
//! conductor for a load, checks voltage drop and protection coordination, and
//! when one conductor cannot carry the load searches parallel configurations
//! for the cheapest compliant option. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions over immutable reference tables
//! - **JSON-First**: Requests, results and settings implement Serialize/Deserialize
//! - **Graceful degradation**: Under-rated selections and missing prices are
//!   tagged outcomes, not errors
//! - **Rich Errors**: Structured error types, not just strings
//!
//! ## Quick Start
//!
//! ```rust
//! use cable_core::{size_cable, SizingRequest};
//!
//! let request = SizingRequest::new(500.0, 400.0, 50.0).with_max_amps_per_cable(400.0);
//! let result = size_cable(&request).unwrap();
//!
//! assert!(result.cables_in_parallel >= 2);
//! assert!(result.load_per_cable <= 400.0);
//! println!("{}", serde_json::to_string_pretty(&result).unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`conductors`] - Copper and aluminium reference tables
//! - [`sizing`] - Selection, voltage drop, compliance and the parallel optimizer
//! - [`rates`] - Rate tables and cost estimation
//! - [`settings`] - Optimization settings
//! - [`analysis`] - Installed-circuit optimization analysis
//! - [`schedule`] - Cable schedule container and reports
//! - [`errors`] - Structured error types

pub mod analysis;
pub mod conductors;
pub mod errors;
pub mod rates;
pub mod schedule;
pub mod settings;
pub mod sizing;

pub use analysis::{analyze_optimizations, CableEntry, OptimizationResult, OptimizationStatus};
pub use conductors::{ConductorMaterial, ConductorSpec, InstallationMethod};
pub use errors::{CalcError, CalcResult};
pub use rates::{CableRate, CostBreakdown, Pricing, RateTable};
pub use schedule::{CableSchedule, OptimizationReport};
pub use settings::OptimizationSettings;
pub use sizing::{size_cable, size_cable_with_rates, SizingRequest, SizingResult};
