//! # Error Types
//!
//! Structured error types for cable_core. Only genuinely unusable input and
//! exhausted searches are reported as errors; degraded-but-usable outcomes
//! (undersized conductor, unpriced cable) are carried inside the result types.
//!
//! ## Example
//!
//! ```rust
//! use cable_core::errors::{CalcError, CalcResult};
//!
//! fn validate_load(load_amps: f64) -> CalcResult<()> {
//!     if !(load_amps > 0.0) {
//!         return Err(CalcError::invalid_input(
//!             "load_amps",
//!             load_amps.to_string(),
//!             "Load current must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for cable_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for sizing and optimization operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Material label could not be recognised
    #[error("Material not found: {material_name}")]
    MaterialNotFound { material_name: String },

    /// Conductor size label is not in the reference table
    #[error("Conductor not found: {size} ({material})")]
    ConductorNotFound { size: String, material: String },

    /// The parallel search window produced no compliant configuration
    #[error(
        "No viable configuration for {load_amps:.1} A: tried {min_parallel}..={max_parallel} conductors in parallel"
    )]
    NoViableConfiguration {
        load_amps: f64,
        min_parallel: u32,
        max_parallel: u32,
    },

    /// Calculation failed for a reason not covered above
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_name: impl Into<String>) -> Self {
        CalcError::MaterialNotFound {
            material_name: material_name.into(),
        }
    }

    /// Create a ConductorNotFound error
    pub fn conductor_not_found(size: impl Into<String>, material: impl Into<String>) -> Self {
        CalcError::ConductorNotFound {
            size: size.into(),
            material: material.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True for outcomes a caller should present as an engineering finding
    /// rather than a malformed request.
    pub fn is_design_finding(&self) -> bool {
        matches!(self, CalcError::NoViableConfiguration { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            CalcError::ConductorNotFound { .. } => "CONDUCTOR_NOT_FOUND",
            CalcError::NoViableConfiguration { .. } => "NO_VIABLE_CONFIGURATION",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}
