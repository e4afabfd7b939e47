//! Error types for the `bladeburner-core` crate.

use bladeburner_actions::{ActionError, SkillError};
use bladeburner_types::{ActionId, UnknownName};
use bladeburner_world::WorldError;

/// Errors raised by division operations.
///
/// Ordinary unavailability (depleted count, rank gate) is not an error; it
/// is reported through [`StartResult`](crate::StartResult).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DivisionError {
    /// An action lookup or formula failed.
    #[error("action error: {source}")]
    Action {
        /// The underlying action error.
        #[from]
        source: ActionError,
    },

    /// A skill lookup or purchase failed.
    #[error("skill error: {source}")]
    Skill {
        /// The underlying skill error.
        #[from]
        source: SkillError,
    },

    /// A world operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// A category, city or skill label did not match.
    #[error("{source}")]
    UnknownName {
        /// The underlying lookup failure.
        #[from]
        source: UnknownName,
    },

    /// Team size was read or set on an action that takes no team.
    #[error("{0} does not take a team")]
    NoTeam(ActionId),

    /// The running action has no positive duration.
    #[error("timer for {action} was never set (required {required}s)")]
    TimerNotSet {
        /// The running action.
        action: ActionId,
        /// The recorded duration.
        required: f64,
    },
}
