//! Error types for the `bladeburner-actions` crate.

use bladeburner_types::{ActionId, SkillName};

/// Errors raised by the action catalog and the formula engine.
///
/// [`ActionError::MalformedWeights`] and [`ActionError::NonFinite`] indicate
/// a data or formula bug, not a user condition. Callers abort the operation
/// and propagate them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ActionError {
    /// No action matches the given name.
    #[error("action not found: {0}")]
    NotFound(String),

    /// A weight table does not sum to 100.
    #[error("malformed weights for {action}: total {total}, expected 100")]
    MalformedWeights {
        /// The action whose table is malformed.
        action: ActionId,
        /// The actual total.
        total: f64,
    },

    /// A formula produced NaN or an infinity.
    #[error("non-finite {quantity} for {action}: {value}")]
    NonFinite {
        /// The action being evaluated.
        action: ActionId,
        /// Which quantity went bad (`"competence"`, `"difficulty"`, ...).
        quantity: &'static str,
        /// The offending value.
        value: f64,
    },
}

/// Errors raised by skill lookups and purchases.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkillError {
    /// No skill matches the given name.
    #[error("skill not found: {0}")]
    NotFound(String),

    /// Upgrades must buy at least one level.
    #[error("invalid upgrade count: {0}")]
    InvalidCount(u32),

    /// The upgrade would exceed the skill's maximum level.
    #[error("{skill} would reach level {requested}, above its maximum of {max}")]
    AboveMaxLevel {
        /// The skill being upgraded.
        skill: SkillName,
        /// The level the upgrade would reach.
        requested: u64,
        /// The skill's maximum level.
        max: u32,
    },

    /// Not enough skill points for the upgrade.
    #[error("insufficient skill points: need {needed}, have {available}")]
    InsufficientPoints {
        /// Points the upgrade costs.
        needed: f64,
        /// Points currently available.
        available: u64,
    },
}
