//! The operative seam.
//!
//! The division engine reads the host character's stat levels and
//! multipliers, and issues exactly two kinds of outward calls: HP damage via
//! [`Operative::take_damage`] and outcome application via
//! [`Operative::apply_outcome`]. Everything else about the character is
//! owned by the host.
//!
//! [`BasicOperative`] is a minimal in-memory implementation used by tests
//! and the headless engine binary.

use serde::{Deserialize, Serialize};

use crate::outcome::ActionOutcome;
use crate::stats::StatBlock;

/// Global multipliers the host applies to the operative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperativeMultipliers {
    /// Multiplies every division success chance.
    pub success_chance: f64,
    /// Multiplies max stamina.
    pub max_stamina: f64,
    /// Multiplies stamina regeneration.
    pub stamina_gain: f64,
    /// Multiplies field-analysis effectiveness.
    pub analysis: f64,
    /// Multiplies faction reputation credited from rank.
    pub faction_rep: f64,
    /// Per-stat experience multipliers.
    pub experience: StatBlock,
}

impl Default for OperativeMultipliers {
    fn default() -> Self {
        Self {
            success_chance: 1.0,
            max_stamina: 1.0,
            stamina_gain: 1.0,
            analysis: 1.0,
            faction_rep: 1.0,
            experience: StatBlock::uniform(1.0),
        }
    }
}

/// The host character as seen by the division engine.
pub trait Operative {
    /// Identity string used in log lines.
    fn identity(&self) -> &str;

    /// Current stat levels.
    fn stat_levels(&self) -> StatBlock;

    /// Global multipliers.
    fn multipliers(&self) -> &OperativeMultipliers;

    /// Apply `amount` HP of damage. Returns `true` if the operative is still
    /// standing, `false` if the damage put them in hospital.
    fn take_damage(&mut self, amount: f64) -> bool;

    /// Apply the experience, money, reputation and HP of a completed action.
    fn apply_outcome(&mut self, outcome: &ActionOutcome);
}

/// A self-contained operative: fixed stat levels, accumulated rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicOperative {
    /// Display name.
    pub name: String,
    /// Stat levels (not raised by experience).
    pub levels: StatBlock,
    /// Global multipliers.
    pub multipliers: OperativeMultipliers,
    /// Current HP.
    pub hp: f64,
    /// Maximum HP.
    pub max_hp: f64,
    /// Money on hand. May go negative after hospital bills.
    pub money: f64,
    /// Experience accumulated per stat.
    pub experience: StatBlock,
    /// Faction reputation accumulated.
    pub reputation: f64,
    /// Times the operative was hospitalized.
    pub hospitalizations: u32,
}

impl BasicOperative {
    /// Create an operative with uniform stat levels and full HP.
    pub fn new(name: impl Into<String>, levels: StatBlock, max_hp: f64) -> Self {
        let max_hp = max_hp.max(1.0);
        Self {
            name: name.into(),
            levels,
            multipliers: OperativeMultipliers::default(),
            hp: max_hp,
            max_hp,
            money: 0.0,
            experience: StatBlock::ZERO,
            reputation: 0.0,
            hospitalizations: 0,
        }
    }
}

impl Operative for BasicOperative {
    fn identity(&self) -> &str {
        &self.name
    }

    fn stat_levels(&self) -> StatBlock {
        self.levels
    }

    fn multipliers(&self) -> &OperativeMultipliers {
        &self.multipliers
    }

    fn take_damage(&mut self, amount: f64) -> bool {
        self.hp -= amount.max(0.0);
        if self.hp <= 0.0 {
            self.hospitalizations = self.hospitalizations.saturating_add(1);
            self.hp = self.max_hp;
            return false;
        }
        true
    }

    fn apply_outcome(&mut self, outcome: &ActionOutcome) {
        self.experience = self.experience.plus(&outcome.experience);
        self.money += outcome.net_money();
        self.reputation += outcome.reputation;
        self.hp = (self.hp + outcome.hp_restored).min(self.max_hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ActionId, ContractName};

    #[test]
    fn lethal_damage_hospitalizes_and_restores() {
        let mut op = BasicOperative::new("Agent", StatBlock::uniform(10.0), 10.0);
        assert!(op.take_damage(4.0));
        assert!((op.hp - 6.0).abs() < f64::EPSILON);
        assert!(!op.take_damage(100.0));
        assert_eq!(op.hospitalizations, 1);
        assert!((op.hp - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn outcome_charges_hospital_bill_and_caps_hp() {
        let mut op = BasicOperative::new("Agent", StatBlock::uniform(10.0), 10.0);
        op.hp = 9.0;
        let mut outcome = ActionOutcome::empty(ActionId::Contract(ContractName::Tracking));
        outcome.money = 1000.0;
        outcome.hospitalization_cost = 250.0;
        outcome.hp_restored = 5.0;
        outcome.experience.agility = 3.0;
        op.apply_outcome(&outcome);
        assert!((op.money - 750.0).abs() < f64::EPSILON);
        assert!((op.hp - 10.0).abs() < f64::EPSILON);
        assert!((op.experience.agility - 3.0).abs() < f64::EPSILON);
    }
}
