//! Skill catalog, upgrade costs and the derived multiplier table.
//!
//! Skills are bought with skill points. Each level of a skill raises one or
//! more named multipliers by a fixed percentage. The multiplier table is
//! always rebuilt from the full set of skill levels, never adjusted in
//! place, so repeated recomputation cannot drift.

use std::collections::BTreeMap;

use bladeburner_types::{SkillMultiplier, SkillName};
use serde::{Deserialize, Serialize};

use crate::error::SkillError;

/// Above this many levels the cost uses the closed form.
const BULK_COST_THRESHOLD: u32 = 100;

/// Static definition of one skill.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillDef {
    /// Skill name.
    pub name: SkillName,
    /// Cost of the first level.
    pub base_cost: f64,
    /// Cost added per level already owned.
    pub cost_increment: f64,
    /// Highest level the skill can reach.
    pub max_level: u32,
    /// Percent change per level for each affected multiplier.
    pub effects: Vec<(SkillMultiplier, f64)>,
}

impl SkillDef {
    /// Cost of buying `count` levels on top of `current_level`.
    ///
    /// Each level costs `floor((base + level * increment) * cost_multiplier)`.
    /// Above 100 levels the arithmetic-series closed form replaces the
    /// per-level sum, with `count / 2` subtracted to approximate the floors.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::InvalidCount`] if `count` is zero.
    #[allow(clippy::suboptimal_flops)]
    pub fn cost(&self, current_level: u32, count: u32, cost_multiplier: f64) -> Result<f64, SkillError> {
        if count == 0 {
            return Err(SkillError::InvalidCount(count));
        }
        if count <= BULK_COST_THRESHOLD {
            let mut total = 0.0;
            for i in 0..count {
                let level = f64::from(current_level) + f64::from(i);
                total += ((self.base_cost + level * self.cost_increment) * cost_multiplier).floor();
            }
            return Ok(total);
        }
        let n = f64::from(count);
        let level = f64::from(current_level);
        let raw = n * (2.0 * self.base_cost + self.cost_increment * (2.0 * level + n - 1.0)) / 2.0;
        Ok((raw * cost_multiplier - n / 2.0).floor())
    }

    /// Validate an upgrade of `count` levels and return its cost.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::InvalidCount`] for a zero count,
    /// [`SkillError::AboveMaxLevel`] if the upgrade overshoots the cap and
    /// [`SkillError::InsufficientPoints`] if `points` cannot cover it.
    pub fn check_upgrade(
        &self,
        current_level: u32,
        count: u32,
        points: u64,
        cost_multiplier: f64,
    ) -> Result<f64, SkillError> {
        let cost = self.cost(current_level, count, cost_multiplier)?;
        let requested = u64::from(current_level).saturating_add(u64::from(count));
        if requested > u64::from(self.max_level) {
            return Err(SkillError::AboveMaxLevel {
                skill: self.name,
                requested,
                max: self.max_level,
            });
        }
        #[allow(clippy::cast_precision_loss)]
        let available = points as f64;
        if cost > available {
            return Err(SkillError::InsufficientPoints {
                needed: cost,
                available: points,
            });
        }
        Ok(cost)
    }
}

/// Every skill keyed by name.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCatalog {
    skills: BTreeMap<SkillName, SkillDef>,
}

fn def(
    name: SkillName,
    base_cost: f64,
    cost_increment: f64,
    max_level: u32,
    effects: &[(SkillMultiplier, f64)],
) -> SkillDef {
    SkillDef {
        name,
        base_cost,
        cost_increment,
        max_level,
        effects: effects.to_vec(),
    }
}

impl SkillCatalog {
    /// The standard twelve skills.
    pub fn standard() -> Self {
        use SkillMultiplier as M;
        use SkillName as S;

        let unlimited = u32::MAX;
        let defs = [
            def(S::BladesIntuition, 3.0, 2.1, unlimited, &[(M::SuccessChanceAll, 3.0)]),
            def(S::Cloak, 2.0, 1.1, unlimited, &[(M::SuccessChanceStealth, 5.5)]),
            def(S::ShortCircuit, 2.0, 2.1, unlimited, &[(M::SuccessChanceKill, 5.5)]),
            def(S::DigitalObserver, 2.0, 2.1, unlimited, &[(M::SuccessChanceOperation, 4.0)]),
            def(S::Tracer, 2.0, 2.1, unlimited, &[(M::SuccessChanceContract, 4.0)]),
            def(S::Overclock, 3.0, 1.4, 90, &[(M::ActionTime, 1.0)]),
            def(
                S::Reaper,
                2.0,
                2.1,
                unlimited,
                &[
                    (M::EffStrength, 2.0),
                    (M::EffDefense, 2.0),
                    (M::EffDexterity, 2.0),
                    (M::EffAgility, 2.0),
                ],
            ),
            def(
                S::EvasiveSystem,
                2.0,
                2.1,
                unlimited,
                &[(M::EffDexterity, 4.0), (M::EffAgility, 4.0)],
            ),
            def(S::Datamancer, 3.0, 1.0, unlimited, &[(M::SuccessChanceEstimate, 5.0)]),
            def(S::CybersEdge, 1.0, 3.0, unlimited, &[(M::Stamina, 2.0)]),
            def(S::HandsOfMidas, 2.0, 2.5, unlimited, &[(M::Money, 10.0)]),
            def(S::Hyperdrive, 1.0, 2.5, unlimited, &[(M::ExpGain, 10.0)]),
        ];
        Self {
            skills: defs.into_iter().map(|d| (d.name, d)).collect(),
        }
    }

    /// Look up a skill.
    pub fn get(&self, name: SkillName) -> Result<&SkillDef, SkillError> {
        self.skills
            .get(&name)
            .ok_or_else(|| SkillError::NotFound(name.as_str().to_owned()))
    }

    /// Look up a skill by display name.
    pub fn find(&self, name: &str) -> Result<&SkillDef, SkillError> {
        SkillName::from_label(name)
            .ok_or_else(|| SkillError::NotFound(name.to_owned()))
            .and_then(|skill| self.get(skill))
    }

    /// Iterate skills in name order.
    pub fn iter(&self) -> impl Iterator<Item = &SkillDef> {
        self.skills.values()
    }
}

/// The named multiplier table derived from skill levels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkillMultipliers {
    values: BTreeMap<SkillMultiplier, f64>,
}

impl SkillMultipliers {
    /// Rebuild the table from scratch.
    ///
    /// Every multiplier starts at 1. Each owned level multiplies in
    /// `1 + percent * level / 100`, except action time which uses
    /// `1 - percent * level / 100` because lower is better.
    pub fn recompute(catalog: &SkillCatalog, levels: &BTreeMap<SkillName, u32>) -> Self {
        let mut values: BTreeMap<SkillMultiplier, f64> =
            SkillMultiplier::ALL.iter().map(|m| (*m, 1.0)).collect();
        for (name, level) in levels {
            if *level == 0 {
                continue;
            }
            let Ok(skill) = catalog.get(*name) else {
                continue;
            };
            for (multiplier, percent) in &skill.effects {
                let step = percent * f64::from(*level) / 100.0;
                let factor = if *multiplier == SkillMultiplier::ActionTime {
                    (1.0 - step).max(0.0)
                } else {
                    1.0 + step
                };
                if let Some(value) = values.get_mut(multiplier) {
                    *value *= factor;
                }
            }
        }
        Self { values }
    }

    /// Value of one multiplier (1 when absent).
    pub fn get(&self, multiplier: SkillMultiplier) -> f64 {
        self.values.get(&multiplier).copied().unwrap_or(1.0)
    }

    /// Iterate `(multiplier, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (SkillMultiplier, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn single_level_cost_matches_formula() {
        let catalog = SkillCatalog::standard();
        let cloak = catalog.get(SkillName::Cloak).unwrap();
        // floor(2 + 0 * 1.1) = 2, floor(2 + 1.1) = 3.
        assert!((cloak.cost(0, 1, 1.0).unwrap() - 2.0).abs() < f64::EPSILON);
        assert!((cloak.cost(0, 2, 1.0).unwrap() - 5.0).abs() < f64::EPSILON);
        assert!((cloak.cost(0, 1, 2.0).unwrap() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bulk_cost_is_close_to_the_per_level_sum() {
        let catalog = SkillCatalog::standard();
        let tracer = catalog.get(SkillName::Tracer).unwrap();
        let looped: f64 = (0..101).map(|l| tracer.cost(l, 1, 1.0).unwrap()).sum();
        let bulk = tracer.cost(0, 101, 1.0).unwrap();
        assert!((bulk - looped).abs() / looped < 0.01);
    }

    #[test]
    fn zero_count_is_rejected() {
        let catalog = SkillCatalog::standard();
        let skill = catalog.get(SkillName::Hyperdrive).unwrap();
        assert_eq!(skill.cost(0, 0, 1.0), Err(SkillError::InvalidCount(0)));
    }

    #[test]
    fn upgrade_checks_cap_and_points() {
        let catalog = SkillCatalog::standard();
        let overclock = catalog.get(SkillName::Overclock).unwrap();
        assert!(matches!(
            overclock.check_upgrade(90, 1, u64::MAX, 1.0),
            Err(SkillError::AboveMaxLevel { max: 90, .. })
        ));
        assert!(matches!(
            overclock.check_upgrade(0, 1, 2, 1.0),
            Err(SkillError::InsufficientPoints { .. })
        ));
        assert!((overclock.check_upgrade(0, 1, 3, 1.0).unwrap() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recompute_is_idempotent() {
        let catalog = SkillCatalog::standard();
        let mut levels = BTreeMap::new();
        levels.insert(SkillName::Reaper, 7);
        levels.insert(SkillName::EvasiveSystem, 3);
        levels.insert(SkillName::Overclock, 10);
        let first = SkillMultipliers::recompute(&catalog, &levels);
        let second = SkillMultipliers::recompute(&catalog, &levels);
        assert_eq!(first, second);
        // Reaper and Evasive System both feed agility.
        let expected = (1.0 + 0.14) * (1.0 + 0.12);
        assert!((first.get(SkillMultiplier::EffAgility) - expected).abs() < 1e-12);
        assert!((first.get(SkillMultiplier::ActionTime) - 0.9).abs() < 1e-12);
        assert!((first.get(SkillMultiplier::Money) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lookup_by_label() {
        let catalog = SkillCatalog::standard();
        assert_eq!(
            catalog.find("Blade's Intuition").unwrap().name,
            SkillName::BladesIntuition
        );
        assert_eq!(
            catalog.find("Napping").unwrap_err(),
            SkillError::NotFound("Napping".to_owned())
        );
    }
}
