//! The action tagged union.
//!
//! Every mission is an [`Action`]: shared balance parameters plus a
//! category payload. Contracts and operations carry [`LevelProgress`];
//! operations and black operations carry a committed team; black
//! operations carry their rank gate and sequence position; general
//! actions carry nothing.
//!
//! Balance parameters are immutable once built. Only the payload changes,
//! and only through the progression rules.

use bladeburner_types::{ActionId, StatBlock};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// Immutable balance parameters shared by every category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionParams {
    /// Difficulty at level 1.
    pub base_difficulty: f64,
    /// Difficulty multiplier per level above 1.
    pub difficulty_factor: f64,
    /// Reward multiplier per level above 1.
    pub reward_factor: f64,
    /// Rank gained on success.
    pub rank_gain: f64,
    /// Rank lost on failure.
    pub rank_loss: f64,
    /// HP lost on failure, before the difficulty multiplier.
    pub hp_loss: f64,
    /// Normalized stat weights (sum to 1).
    pub weights: StatBlock,
    /// Diminishing-return exponent per stat.
    pub decays: StatBlock,
    /// Stealth missions benefit from the stealth multiplier.
    pub is_stealth: bool,
    /// Kill missions benefit from the kill multiplier.
    pub is_kill: bool,
}

impl ActionParams {
    /// Parameters for an action that never rolls (general actions).
    pub const fn unrolled(base_difficulty: f64) -> Self {
        Self {
            base_difficulty,
            difficulty_factor: 1.0,
            reward_factor: 1.0,
            rank_gain: 0.0,
            rank_loss: 0.0,
            hp_loss: 0.0,
            weights: StatBlock::ZERO,
            decays: StatBlock::ZERO,
            is_stealth: false,
            is_kill: false,
        }
    }

    /// Validate and normalize a weight table given in percent.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::MalformedWeights`] if the percentages do not
    /// sum to 100 or any entry is negative or non-finite.
    pub fn normalize_weights(id: ActionId, percent: StatBlock) -> Result<StatBlock, ActionError> {
        let total = percent.total();
        let any_bad = !percent.is_finite() || percent.map(|_, v| v.min(0.0)).total() < 0.0;
        if any_bad || (total - 100.0).abs() > 1e-6 {
            return Err(ActionError::MalformedWeights { action: id, total });
        }
        Ok(percent.scaled(0.01))
    }
}

/// Count and level state of a contract or operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// Available instances. Fractional because it regenerates continuously.
    pub count: f64,
    /// Current difficulty level (1-based).
    pub level: u32,
    /// Highest unlocked level.
    pub max_level: u32,
    /// Snap `level` to `max_level` after every completion.
    pub auto_level: bool,
    /// Lifetime successes.
    pub successes: u32,
    /// Lifetime failures.
    pub failures: u32,
    /// Lower bound of count growth per growth period.
    pub growth_min: f64,
    /// Upper bound of count growth per growth period.
    pub growth_max: f64,
}

impl LevelProgress {
    /// Fresh progress with a starting count.
    pub const fn new(count: f64, growth_min: f64, growth_max: f64) -> Self {
        Self {
            count,
            level: 1,
            max_level: 1,
            auto_level: true,
            successes: 0,
            failures: 0,
            growth_min,
            growth_max,
        }
    }

    /// Draw one growth amount from the configured range.
    pub fn roll_growth(&self, rng: &mut impl Rng) -> f64 {
        if self.growth_max <= self.growth_min {
            return self.growth_min.max(0.0);
        }
        rng.random_range(self.growth_min..=self.growth_max)
    }

    /// Consume one instance, never going below zero.
    pub fn consume(&mut self) {
        self.count = (self.count - 1.0).max(0.0);
    }

    /// Add `amount` instances (negative amounts are ignored).
    pub fn replenish(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.count += amount;
        }
    }

    /// Set the level, clamped to `1..=max_level`.
    pub fn set_level(&mut self, level: u32) {
        self.level = level.clamp(1, self.max_level.max(1));
    }

    /// Clamp every field into its valid range.
    pub fn clamp(&mut self) {
        if !self.count.is_finite() || self.count < 0.0 {
            self.count = 0.0;
        }
        self.max_level = self.max_level.max(1);
        self.level = self.level.clamp(1, self.max_level);
    }
}

/// Category-specific state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionPayload {
    /// A contract.
    Contract(LevelProgress),
    /// An operation.
    Operation {
        /// Count and level state.
        progress: LevelProgress,
        /// Team members committed to the operation.
        team_count: u32,
    },
    /// A black operation.
    BlackOp {
        /// Team members committed to the operation.
        team_count: u32,
        /// Rank needed before it can be started.
        required_rank: f64,
        /// Position in the fixed black-op sequence.
        sequence: usize,
    },
    /// A general action.
    General,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Category and name.
    pub id: ActionId,
    /// Immutable balance parameters.
    pub params: ActionParams,
    /// Mutable category state.
    pub payload: ActionPayload,
}

impl Action {
    /// Level progress for contracts and operations.
    pub const fn progress(&self) -> Option<&LevelProgress> {
        match &self.payload {
            ActionPayload::Contract(progress) | ActionPayload::Operation { progress, .. } => {
                Some(progress)
            }
            ActionPayload::BlackOp { .. } | ActionPayload::General => None,
        }
    }

    /// Mutable level progress for contracts and operations.
    pub const fn progress_mut(&mut self) -> Option<&mut LevelProgress> {
        match &mut self.payload {
            ActionPayload::Contract(progress) | ActionPayload::Operation { progress, .. } => {
                Some(progress)
            }
            ActionPayload::BlackOp { .. } | ActionPayload::General => None,
        }
    }

    /// Current level, 1 for unleveled actions.
    pub fn level(&self) -> u32 {
        self.progress().map_or(1, |p| p.level)
    }

    /// Committed team size (0 for contracts and general actions).
    pub const fn team_count(&self) -> u32 {
        match self.payload {
            ActionPayload::Operation { team_count, .. } | ActionPayload::BlackOp { team_count, .. } => {
                team_count
            }
            ActionPayload::Contract(_) | ActionPayload::General => 0,
        }
    }

    /// Set the committed team size. Returns `false` if the action takes no team.
    pub const fn set_team_count(&mut self, size: u32) -> bool {
        match &mut self.payload {
            ActionPayload::Operation { team_count, .. } | ActionPayload::BlackOp { team_count, .. } => {
                *team_count = size;
                true
            }
            ActionPayload::Contract(_) | ActionPayload::General => false,
        }
    }

    /// Required rank and sequence position of a black operation.
    pub const fn black_op_gate(&self) -> Option<(f64, usize)> {
        match self.payload {
            ActionPayload::BlackOp {
                required_rank,
                sequence,
                ..
            } => Some((required_rank, sequence)),
            _ => None,
        }
    }

    /// `rewardFactor^(level - 1)`.
    pub fn reward_multiplier(&self) -> f64 {
        self.params
            .reward_factor
            .powf(f64::from(self.level().saturating_sub(1)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bladeburner_types::ContractName;

    use super::*;

    fn id() -> ActionId {
        ActionId::Contract(ContractName::Tracking)
    }

    #[test]
    fn weights_must_sum_to_one_hundred() {
        let ok = StatBlock::from_array([0.0, 5.0, 5.0, 35.0, 35.0, 10.0, 10.0]);
        let normalized = ActionParams::normalize_weights(id(), ok).unwrap();
        assert!((normalized.total() - 1.0).abs() < 1e-9);

        let short = StatBlock::from_array([0.0, 5.0, 5.0, 35.0, 35.0, 10.0, 0.0]);
        assert!(matches!(
            ActionParams::normalize_weights(id(), short),
            Err(ActionError::MalformedWeights { .. })
        ));

        let negative = StatBlock::from_array([-10.0, 10.0, 5.0, 35.0, 35.0, 15.0, 10.0]);
        assert!(ActionParams::normalize_weights(id(), negative).is_err());
    }

    #[test]
    fn consume_never_goes_negative() {
        let mut progress = LevelProgress::new(1.5, 1.0, 2.0);
        progress.consume();
        progress.consume();
        progress.consume();
        assert!(progress.count.abs() < f64::EPSILON);
    }

    #[test]
    fn clamp_restores_level_bounds() {
        let mut progress = LevelProgress::new(-4.0, 1.0, 2.0);
        progress.max_level = 0;
        progress.level = 9;
        progress.clamp();
        assert!(progress.count.abs() < f64::EPSILON);
        assert_eq!(progress.max_level, 1);
        assert_eq!(progress.level, 1);
    }

    #[test]
    fn set_level_respects_max_level() {
        let mut progress = LevelProgress::new(10.0, 1.0, 2.0);
        progress.max_level = 4;
        progress.set_level(10);
        assert_eq!(progress.level, 4);
        progress.set_level(0);
        assert_eq!(progress.level, 1);
    }
}
