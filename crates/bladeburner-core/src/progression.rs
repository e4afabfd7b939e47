//! Starting, stopping and completing actions.
//!
//! Completion dispatches on the action category:
//!
//! - **Contracts and operations** cost stamina, roll for success, consume
//!   one instance, move rank, unlock levels and apply their world effects.
//!   Contracts pay money; failures cost HP. Operations can lose team members.
//! - **Black operations** follow the same stamina/roll/rank/HP flow, always
//!   stop afterwards and always lose at least one committed team member.
//! - **General actions** never roll (recruitment has its own chance) and
//!   each has a bespoke effect.
//!
//! Every branch returns an [`ActionOutcome`] instead of mutating the
//! operative. The only outward call made here is HP damage.

use bladeburner_actions::formulas;
use bladeburner_actions::{Action, ActionError};
use bladeburner_types::{
    ActionId, ActionOutcome, ContractName, GeneralAction, OperationName, Operative,
    SkillMultiplier, Stat, StatBlock,
};
use bladeburner_world::{MigrationReport, PopulationChange, trigger_potential_migration};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::division::{ActionTimer, Division};
use crate::error::DivisionError;

/// Result of [`Division::start_action`].
///
/// An unavailable action is reported here with a reason, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResult {
    /// Whether the action is now running.
    pub started: bool,
    /// Human-readable outcome.
    pub message: String,
}

impl StartResult {
    fn started(message: String) -> Self {
        Self {
            started: true,
            message,
        }
    }

    fn rejected(message: String) -> Self {
        Self {
            started: false,
            message,
        }
    }
}

/// Whether an action can be started right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// The action can start.
    Available,
    /// The action cannot start, with the reason.
    Unavailable(&'static str),
}

impl Availability {
    /// `true` for [`Availability::Available`].
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    /// The reason an action is unavailable.
    pub const fn reason(self) -> Option<&'static str> {
        match self {
            Self::Available => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }
}

/// Uniform draw from `value +/- percent %`.
#[allow(clippy::suboptimal_flops)]
pub(crate) fn jitter(value: f64, percent: f64, rng: &mut impl Rng) -> f64 {
    let offset = value * percent / 100.0;
    value + rng.random::<f64>() * 2.0 * offset - offset
}

/// Successes needed before `max_level` rises by one.
#[allow(clippy::suboptimal_flops)]
fn successes_for_next_level(max_level: u32, per_level: f64) -> f64 {
    let max = f64::from(max_level);
    (0.5 * max * (2.0 * per_level + max - 1.0)).ceil()
}

impl Division {
    /// Check whether `id` can be started in the current state.
    pub fn availability(&self, id: ActionId) -> Result<Availability, DivisionError> {
        let action = self.catalog.get(id)?;
        if let Some(progress) = action.progress()
            && progress.count < 1.0
        {
            return Ok(Availability::Unavailable("Insufficient action count"));
        }
        if id == ActionId::Operation(OperationName::Raid) && self.current_city()?.communities() == 0 {
            return Ok(Availability::Unavailable(
                "No known Synthoid communities in the current city",
            ));
        }
        if let Some((required_rank, sequence)) = action.black_op_gate() {
            if sequence < self.black_ops_completed {
                return Ok(Availability::Unavailable("Already completed"));
            }
            if sequence > self.black_ops_completed {
                return Ok(Availability::Unavailable(
                    "Have not completed the previous Black Operation",
                ));
            }
            if self.rank < required_rank {
                return Ok(Availability::Unavailable("Insufficient rank"));
            }
        }
        Ok(Availability::Available)
    }

    /// Start `id`, replacing whatever was running.
    ///
    /// An unavailable action leaves the division untouched and returns a
    /// result with `started == false`.
    pub fn start_action(
        &mut self,
        id: ActionId,
        operative: &impl Operative,
    ) -> Result<StartResult, DivisionError> {
        if let Availability::Unavailable(reason) = self.availability(id)? {
            debug!(action = %id, reason, "Action unavailable");
            return Ok(StartResult::rejected(format!("Cannot start {id}: {reason}")));
        }
        self.begin(id, operative, 0.0)?;
        info!(action = %id, seconds = self.timer.required, "Action started");
        let message = format!("Started {id}");
        self.log.push(message.clone());
        Ok(StartResult::started(message))
    }

    /// Stop the current action with no partial credit.
    pub fn reset_action(&mut self) {
        self.current_action = None;
        self.timer = ActionTimer::default();
    }

    pub(crate) fn begin(
        &mut self,
        id: ActionId,
        operative: &impl Operative,
        overflow: f64,
    ) -> Result<(), DivisionError> {
        let action = self.catalog.get(id)?;
        let required = formulas::action_time(action, &self.view()?, operative)?;
        self.current_action = Some(id);
        self.timer = ActionTimer {
            elapsed: 0.0,
            required: f64::from(required),
            overflow: overflow.max(0.0),
        };
        Ok(())
    }

    /// Resolve one completion of `id` and return what the operative earned.
    pub fn complete_action(
        &mut self,
        operative: &mut impl Operative,
        id: ActionId,
        rng: &mut impl Rng,
    ) -> Result<ActionOutcome, DivisionError> {
        let action = self.catalog.get(id)?.clone();
        let outcome = match id {
            ActionId::Contract(_) | ActionId::Operation(_) => {
                self.complete_leveled(operative, &action, rng)?
            }
            ActionId::BlackOp(_) => self.complete_black_op(operative, &action, rng)?,
            ActionId::General(general) => self.complete_general(operative, general, rng)?,
        };
        self.stats.actions_completed = self.stats.actions_completed.saturating_add(1);
        Ok(outcome)
    }

    fn complete_leveled(
        &mut self,
        operative: &mut impl Operative,
        action: &Action,
        rng: &mut impl Rng,
    ) -> Result<ActionOutcome, DivisionError> {
        let id = action.id;
        let is_operation = matches!(id, ActionId::Operation(_));
        let difficulty_mult = self.balance.difficulty_multiplier(formulas::difficulty(action));
        let reward_mult = action.reward_multiplier();
        let seconds = formulas::action_time(action, &self.view()?, &*operative)?;

        self.change_stamina(-self.balance.base_stamina_loss * difficulty_mult);
        let success = formulas::attempt(action, &self.view()?, &*operative, rng)?;
        let mut outcome = self.experience_outcome(action, seconds, difficulty_mult, success, &*operative);
        let jitter_percent = self.balance.reward_jitter_percent;

        if success {
            if !is_operation {
                outcome.money = self.balance.contract_base_money_gain
                    * reward_mult
                    * self.skill_multipliers.get(SkillMultiplier::Money);
            }
            if action.params.rank_gain > 0.0 {
                let gain = jitter(action.params.rank_gain * reward_mult, jitter_percent, rng);
                outcome.reputation += self.change_rank(gain, &*operative);
            }
        } else {
            if action.params.rank_loss > 0.0 {
                let loss = jitter(action.params.rank_loss * reward_mult, jitter_percent, rng);
                outcome.reputation += self.change_rank(-loss, &*operative);
            }
            if action.params.hp_loss > 0.0 {
                self.apply_damage(operative, action.params.hp_loss * difficulty_mult, &mut outcome, rng);
            }
        }

        let per_level = if is_operation {
            self.balance.operation_successes_per_level
        } else {
            self.balance.contract_successes_per_level
        };
        self.record_attempt(id, success, per_level)?;

        match id {
            ActionId::Contract(name) => {
                if success {
                    self.apply_contract_effects(name, rng)?;
                }
            }
            ActionId::Operation(name) => {
                let team = action.team_count().min(self.team_size);
                let max_losses = if success { team.div_ceil(2) } else { team };
                self.lose_team(team, 0, max_losses, rng);
                self.apply_operation_effects(name, success, rng)?;
            }
            ActionId::BlackOp(_) | ActionId::General(_) => {}
        }

        self.log_completion(id, success, &outcome);
        Ok(outcome)
    }

    fn complete_black_op(
        &mut self,
        operative: &mut impl Operative,
        action: &Action,
        rng: &mut impl Rng,
    ) -> Result<ActionOutcome, DivisionError> {
        let difficulty_mult = self.balance.difficulty_multiplier(formulas::difficulty(action));
        let seconds = formulas::action_time(action, &self.view()?, &*operative)?;

        self.change_stamina(-self.balance.base_stamina_loss * difficulty_mult);
        let success = formulas::attempt(action, &self.view()?, &*operative, rng)?;
        let mut outcome = self.experience_outcome(action, seconds, difficulty_mult, success, &*operative);
        let jitter_percent = self.balance.reward_jitter_percent;
        let team = action.team_count().min(self.team_size);

        if success {
            if let Some((_, sequence)) = action.black_op_gate() {
                self.black_ops_completed = self.black_ops_completed.max(sequence.saturating_add(1));
            }
            if action.params.rank_gain > 0.0 {
                let gain = jitter(action.params.rank_gain, jitter_percent, rng);
                outcome.reputation += self.change_rank(gain, &*operative);
            }
            self.lose_team(team, 1, team.div_ceil(2), rng);
        } else {
            if action.params.rank_loss > 0.0 {
                let loss = jitter(action.params.rank_loss, jitter_percent, rng);
                outcome.reputation += self.change_rank(-loss, &*operative);
            }
            if action.params.hp_loss > 0.0 {
                self.apply_damage(operative, action.params.hp_loss * difficulty_mult, &mut outcome, rng);
            }
            self.lose_team(team, 1, team, rng);
        }

        self.reset_action();
        self.log_completion(action.id, success, &outcome);
        Ok(outcome)
    }

    fn complete_general(
        &mut self,
        operative: &mut impl Operative,
        general: GeneralAction,
        rng: &mut impl Rng,
    ) -> Result<ActionOutcome, DivisionError> {
        let id = ActionId::General(general);
        let mut outcome = ActionOutcome::empty(id);
        let eff = formulas::effective_stats(&self.skill_multipliers, &*operative);
        let exp_mults = operative.multipliers().experience;

        match general {
            GeneralAction::Training => {
                self.change_stamina(-0.5 * self.balance.base_stamina_loss);
                let exp = self.balance.training_exp;
                outcome.experience = StatBlock {
                    strength: exp,
                    defense: exp,
                    dexterity: exp,
                    agility: exp,
                    ..StatBlock::ZERO
                }
                .product(&exp_mults);
                self.stamina_bonus += self.balance.training_stamina_bonus
                    * self.skill_multipliers.get(SkillMultiplier::Stamina);
                self.update_max_stamina(&*operative);
                self.log.push(format!(
                    "Training completed. Stamina bonus is now {:.2}",
                    self.stamina_bonus
                ));
            }
            GeneralAction::FieldAnalysis => {
                let effectiveness =
                    formulas::field_analysis_effectiveness(&eff, operative.multipliers().analysis);
                if !effectiveness.is_finite() || effectiveness < 0.0 {
                    return Err(ActionError::NonFinite {
                        action: id,
                        quantity: "field analysis effectiveness",
                        value: effectiveness,
                    }
                    .into());
                }
                let estimate_mult = self.skill_multipliers.get(SkillMultiplier::SuccessChanceEstimate);
                let current = self.current_city;
                self.cities
                    .city_mut(current)?
                    .improve_population_estimate_by_percentage(effectiveness * estimate_mult)?;
                let exp = self.balance.field_analysis_exp;
                outcome.experience = StatBlock {
                    hacking: exp,
                    charisma: exp,
                    ..StatBlock::ZERO
                }
                .product(&exp_mults);
                outcome.reputation = self.change_rank(self.balance.field_analysis_rank_gain, &*operative);
                self.log.push(format!(
                    "Field analysis completed in {current}. Gained {:.2} rank",
                    self.balance.field_analysis_rank_gain
                ));
            }
            GeneralAction::Recruitment => {
                let seconds = formulas::recruitment_time(&self.balance, eff.charisma);
                let chance = formulas::recruitment_chance(eff.charisma, self.team_size);
                let success = rng.random::<f64>() < chance;
                let scale = if success { 2.0 } else { 1.0 };
                outcome.success = Some(success);
                outcome.experience = StatBlock {
                    charisma: scale * self.balance.base_stat_gain * seconds,
                    ..StatBlock::ZERO
                }
                .product(&exp_mults);
                if success {
                    self.team_size = self.team_size.saturating_add(1);
                    self.log.push(format!(
                        "Successfully recruited a team member. Team size is now {}",
                        self.team_size
                    ));
                } else {
                    self.log.push("Failed to recruit a team member".to_owned());
                }
            }
            GeneralAction::Diplomacy => {
                let effectiveness = formulas::diplomacy_effectiveness(eff.charisma);
                let current = self.current_city;
                let city = self.cities.city_mut(current)?;
                city.scale_chaos(effectiveness)?;
                let chaos = city.chaos();
                self.log.push(format!(
                    "Diplomacy completed. Chaos in {current} is now {chaos:.2}"
                ));
            }
            GeneralAction::RegenChamber => {
                outcome.hp_restored = self.balance.regen_hp_gain;
                self.change_stamina(self.max_stamina * self.balance.regen_stamina_percent / 100.0);
                self.log.push(format!(
                    "Rested in Hyperbolic Regeneration Chamber. Restored {} HP",
                    self.balance.regen_hp_gain
                ));
            }
            GeneralAction::InciteViolence => {
                let period = self.balance.action_count_growth_period.max(1.0);
                for action in self.catalog.iter_mut() {
                    if let Some(progress) = action.progress_mut() {
                        let growth = progress.roll_growth(rng);
                        progress.replenish(60.0 * 3.0 * growth / period);
                    }
                }
                for city in self.cities.iter_mut() {
                    city.change_chaos_by_count(self.balance.incite_chaos)?;
                    let chaos = city.chaos();
                    let magnitude = chaos.log10();
                    if magnitude.is_finite() && magnitude > 0.0 {
                        city.change_chaos_by_count(chaos / magnitude)?;
                    }
                }
                self.log.push("Incited violence in the synthoid communities".to_owned());
            }
        }

        debug!(action = %id, "General action completed");
        Ok(outcome)
    }

    /// Experience from a rolled action: weighted by stat, halved on failure.
    fn experience_outcome(
        &self,
        action: &Action,
        seconds: u32,
        difficulty_mult: f64,
        success: bool,
        operative: &impl Operative,
    ) -> ActionOutcome {
        let success_mult = if success { 1.0 } else { 0.5 };
        let base = f64::from(seconds)
            * success_mult
            * difficulty_mult
            * self.skill_multipliers.get(SkillMultiplier::ExpGain);
        let balance = &self.balance;
        let experience = action
            .params
            .weights
            .map(|stat, weight| {
                let gain = if matches!(stat, Stat::Intelligence) {
                    balance.base_int_gain
                } else {
                    balance.base_stat_gain
                };
                weight * gain * base
            })
            .product(&operative.multipliers().experience);
        ActionOutcome {
            success: Some(success),
            experience,
            ..ActionOutcome::empty(action.id)
        }
    }

    fn record_attempt(&mut self, id: ActionId, success: bool, per_level: f64) -> Result<(), DivisionError> {
        let Some(progress) = self.catalog.get_mut(id)?.progress_mut() else {
            return Ok(());
        };
        if success {
            progress.successes = progress.successes.saturating_add(1);
        } else {
            progress.failures = progress.failures.saturating_add(1);
        }
        progress.consume();
        if success && f64::from(progress.successes) >= successes_for_next_level(progress.max_level, per_level) {
            progress.max_level = progress.max_level.saturating_add(1);
            debug!(action = %id, max_level = progress.max_level, "Level unlocked");
        }
        if progress.auto_level {
            progress.level = progress.max_level;
        }
        progress.clamp();
        Ok(())
    }

    fn apply_damage(
        &mut self,
        operative: &mut impl Operative,
        base_damage: f64,
        outcome: &mut ActionOutcome,
        rng: &mut impl Rng,
    ) {
        let damage = jitter(base_damage, self.balance.reward_jitter_percent, rng)
            .ceil()
            .max(0.0);
        self.stats.hp_lost += damage;
        if !operative.take_damage(damage) {
            let cost = damage * self.balance.hospital_cost_per_hp;
            self.stats.hospitalizations = self.stats.hospitalizations.saturating_add(1);
            self.stats.money_lost += cost;
            outcome.hospitalization_cost += cost;
            info!(operative = operative.identity(), damage, cost, "Operative hospitalized");
            self.log.push(format!(
                "{} was hospitalized. Hospital bill: ${cost:.0}",
                operative.identity()
            ));
        }
    }

    /// Lose between `min` and `max` of a committed `team`.
    fn lose_team(&mut self, team: u32, min: u32, max: u32, rng: &mut impl Rng) -> u32 {
        if team == 0 || max == 0 {
            return 0;
        }
        let losses = rng.random_range(min.min(max)..=max).min(self.team_size);
        self.team_size = self.team_size.saturating_sub(losses);
        self.stats.team_lost = self.stats.team_lost.saturating_add(losses);

        let roster = self.team_size;
        for action in self.catalog.iter_mut() {
            if action.team_count() > roster {
                action.set_team_count(roster);
            }
        }
        if losses > 0 {
            self.log.push(format!("Lost {losses} team members"));
        }
        losses
    }

    fn apply_contract_effects(&mut self, name: ContractName, rng: &mut impl Rng) -> Result<(), DivisionError> {
        let estimate_mult = self.skill_multipliers.get(SkillMultiplier::SuccessChanceEstimate);
        let city = self.cities.city_mut(self.current_city)?;
        match name {
            ContractName::Tracking => {
                let found = f64::from(rng.random_range(100_u32..=1000));
                city.improve_population_estimate_by_count(found * estimate_mult)?;
            }
            ContractName::BountyHunter => {
                city.change_population_by_count(-1, -1.0)?;
                city.change_chaos_by_count(0.02)?;
            }
            ContractName::Retirement => {
                city.change_population_by_count(-1, -1.0)?;
                city.change_chaos_by_count(0.04)?;
            }
        }
        Ok(())
    }

    fn apply_operation_effects(
        &mut self,
        name: OperationName,
        success: bool,
        rng: &mut impl Rng,
    ) -> Result<(), DivisionError> {
        let estimate_mult = self.skill_multipliers.get(SkillMultiplier::SuccessChanceEstimate);
        let current = self.current_city;
        let both = PopulationChange {
            non_zero: true,
            move_estimate_equally: true,
        };

        match name {
            OperationName::Investigation | OperationName::Undercover => {
                let (estimate_gain, migration_chance) = if name == OperationName::Investigation {
                    (0.4, 0.1)
                } else {
                    (0.8, 0.15)
                };
                if success {
                    self.cities
                        .city_mut(current)?
                        .improve_population_estimate_by_percentage(estimate_gain * estimate_mult)?;
                } else if let Some(report) =
                    trigger_potential_migration(&mut self.cities, current, migration_chance, rng)?
                {
                    self.record_migration(&report);
                }
            }
            OperationName::Sting => {
                let city = self.cities.city_mut(current)?;
                if success {
                    city.change_population_by_percentage(-0.1, both)?;
                }
                city.change_chaos_by_count(0.1)?;
            }
            OperationName::Raid => {
                let city = self.cities.city_mut(current)?;
                if success {
                    city.change_population_by_percentage(-1.0, both)?;
                    city.remove_community();
                } else {
                    let percent = f64::from(rng.random_range(-10_i32..=-5)) / 10.0;
                    city.change_population_by_percentage(
                        percent,
                        PopulationChange {
                            non_zero: true,
                            move_estimate_equally: false,
                        },
                    )?;
                }
                city.change_chaos_by_percentage(f64::from(rng.random_range(1_i32..=5)))?;
            }
            OperationName::StealthRetirement => {
                let city = self.cities.city_mut(current)?;
                if success {
                    city.change_population_by_percentage(-0.5, both)?;
                }
                city.change_chaos_by_percentage(f64::from(rng.random_range(-3_i32..=-1)))?;
            }
            OperationName::Assassination => {
                let city = self.cities.city_mut(current)?;
                if success {
                    city.change_population_by_count(-1, -1.0)?;
                }
                city.change_chaos_by_percentage(f64::from(rng.random_range(-5_i32..=5)))?;
            }
        }
        Ok(())
    }

    pub(crate) fn record_migration(&mut self, report: &MigrationReport) {
        info!(
            from = %report.from,
            to = %report.to,
            moved = report.population_moved,
            community = report.community_moved,
            "Synthoid migration"
        );
        self.log.push(format!(
            "{} synthoids migrated from {} to {}",
            report.population_moved, report.from, report.to
        ));
    }

    fn log_completion(&mut self, id: ActionId, success: bool, outcome: &ActionOutcome) {
        info!(
            action = %id,
            success,
            rank = self.rank,
            money = outcome.money,
            "Action completed"
        );
        let line = if success {
            format!("{id} successfully completed. Rank is now {:.3}", self.rank)
        } else {
            format!("{id} failed. Rank is now {:.3}", self.rank)
        };
        self.log.push(line);
    }
}
