//! Error types for the `bladeburner-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`].

use bladeburner_types::CityName;

/// Errors that can occur during world-model operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    /// A city was not found in the city map.
    #[error("city not found: {0}")]
    CityNotFound(CityName),

    /// A city appeared twice when building a city map.
    #[error("duplicate city: {0}")]
    DuplicateCity(CityName),

    /// A mutator received a NaN or infinite argument.
    #[error("non-finite value passed to {operation}: {value}")]
    NonFinite {
        /// The mutator that rejected the value.
        operation: &'static str,
        /// The offending value.
        value: f64,
    },

    /// A countdown was configured with an empty or inverted range.
    #[error("invalid interval: min {min} > max {max} or max is zero")]
    InvalidInterval {
        /// Lower bound in seconds.
        min: u32,
        /// Upper bound in seconds.
        max: u32,
    },
}

/// Reject NaN and infinities before they reach city state.
pub(crate) fn ensure_finite(operation: &'static str, value: f64) -> Result<f64, WorldError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(WorldError::NonFinite { operation, value })
    }
}
