//! Outcome delta of a completed action.
//!
//! Completion logic never mutates the operative's experience, money or
//! reputation directly. It returns an [`ActionOutcome`] and the tick
//! processor hands it to [`Operative::apply_outcome`].
//!
//! [`Operative::apply_outcome`]: crate::Operative::apply_outcome

use serde::{Deserialize, Serialize};

use crate::ids::ActionId;
use crate::stats::StatBlock;

/// Experience, money and reputation produced by one completed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// The action that produced this outcome.
    pub action: ActionId,
    /// `Some(true/false)` for rolled actions, `None` for unrolled general actions.
    pub success: Option<bool>,
    /// Experience per stat.
    pub experience: StatBlock,
    /// Money earned (contracts only).
    pub money: f64,
    /// Faction reputation credited from rank changes (may be negative).
    pub reputation: f64,
    /// HP restored to the operative.
    pub hp_restored: f64,
    /// Money charged because the operative was hospitalized.
    pub hospitalization_cost: f64,
}

impl ActionOutcome {
    /// An empty outcome for `action`.
    pub const fn empty(action: ActionId) -> Self {
        Self {
            action,
            success: None,
            experience: StatBlock::ZERO,
            money: 0.0,
            reputation: 0.0,
            hp_restored: 0.0,
            hospitalization_cost: 0.0,
        }
    }

    /// Money after hospitalization charges.
    pub fn net_money(&self) -> f64 {
        self.money - self.hospitalization_cost
    }
}
