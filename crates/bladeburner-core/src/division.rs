//! The division aggregate.
//!
//! A [`Division`] owns everything that changes while the division runs:
//! rank, skills, stamina, the roster, the action catalog's mutable payloads,
//! the current action and its timer, the six cities, and the event
//! countdowns. The operative is never owned; it is passed into each call
//! that needs its stats.

use std::collections::BTreeMap;

use bladeburner_actions::formulas::{self, EngineView};
use bladeburner_actions::{Action, ActionCatalog, BalanceConfig, SkillCatalog, SkillMultipliers};
use bladeburner_types::{ActionId, CityName, Operative, SkillMultiplier, SkillName};
use bladeburner_world::{City, CityMap, Countdown, EventConfig};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::activity::ActivityLog;
use crate::automation::Automation;
use crate::config::SimulationConfig;
use crate::error::DivisionError;

/// Progress of the current action in simulated seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionTimer {
    /// Seconds spent so far.
    pub elapsed: f64,
    /// Seconds needed to complete.
    pub required: f64,
    /// Seconds carried over from the previous completion.
    pub overflow: f64,
}

impl ActionTimer {
    /// Seconds left before completion.
    pub fn remaining(&self) -> f64 {
        (self.required - self.elapsed).max(0.0)
    }
}

/// Lifetime statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DivisionStats {
    /// HP of damage taken on failed missions.
    pub hp_lost: f64,
    /// Times the operative was hospitalized.
    pub hospitalizations: u32,
    /// Money spent on hospital bills.
    pub money_lost: f64,
    /// Team members lost on operations and black operations.
    pub team_lost: u32,
    /// Actions completed.
    pub actions_completed: u64,
}

/// The division aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct Division {
    pub(crate) balance: BalanceConfig,
    pub(crate) events: EventConfig,
    pub(crate) skill_cost_multiplier: f64,
    pub(crate) catalog: ActionCatalog,
    pub(crate) skill_catalog: SkillCatalog,
    pub(crate) skill_levels: BTreeMap<SkillName, u32>,
    pub(crate) skill_multipliers: SkillMultipliers,
    pub(crate) cities: CityMap,
    pub(crate) current_city: CityName,
    pub(crate) rank: f64,
    pub(crate) max_rank: f64,
    pub(crate) skill_points: u64,
    pub(crate) total_skill_points: u64,
    pub(crate) stamina: f64,
    pub(crate) max_stamina: f64,
    pub(crate) stamina_bonus: f64,
    pub(crate) current_action: Option<ActionId>,
    pub(crate) timer: ActionTimer,
    pub(crate) stored_cycles: f64,
    pub(crate) team_size: u32,
    pub(crate) black_ops_completed: usize,
    pub(crate) automation: Automation,
    pub(crate) event_countdown: Countdown,
    pub(crate) migration_countdown: Countdown,
    pub(crate) stats: DivisionStats,
    pub(crate) log: ActivityLog,
}

impl Division {
    /// Create a division with freshly seeded cities and catalog.
    ///
    /// Stamina starts full.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration names an unknown automation
    /// action, has an invalid event interval, or a built-in weight table is
    /// malformed.
    pub fn new(
        config: &SimulationConfig,
        operative: &impl Operative,
        rng: &mut impl Rng,
    ) -> Result<Self, DivisionError> {
        let catalog = ActionCatalog::standard(rng)?;
        let cities = CityMap::seeded(config.balance.population_threshold, rng);
        let event_countdown = Countdown::new(
            config.events.interval_min_seconds,
            config.events.interval_max_seconds,
            rng,
        )?;
        let migration_countdown = Countdown::new(
            config.events.migration_check_seconds,
            config.events.migration_check_seconds,
            rng,
        )?;
        let skill_catalog = SkillCatalog::standard();
        let skill_levels = BTreeMap::new();
        let skill_multipliers = SkillMultipliers::recompute(&skill_catalog, &skill_levels);

        let mut division = Self {
            balance: config.balance.clone(),
            events: config.events.clone(),
            skill_cost_multiplier: config.division.skill_cost_multiplier.max(0.0),
            catalog,
            skill_catalog,
            skill_levels,
            skill_multipliers,
            cities,
            current_city: config.division.starting_city,
            rank: 0.0,
            max_rank: 0.0,
            skill_points: 0,
            total_skill_points: 0,
            stamina: 0.0,
            max_stamina: 0.0,
            stamina_bonus: 0.0,
            current_action: None,
            timer: ActionTimer::default(),
            stored_cycles: 0.0,
            team_size: 0,
            black_ops_completed: 0,
            automation: Automation::from_config(&config.division.automation)?,
            event_countdown,
            migration_countdown,
            stats: DivisionStats::default(),
            log: ActivityLog::new(config.logging.activity_log_lines),
        };
        division.change_rank(config.division.starting_rank.max(0.0), operative);
        division.update_max_stamina(operative);
        division.stamina = division.max_stamina;

        info!(
            operative = operative.identity(),
            city = %division.current_city,
            max_stamina = division.max_stamina,
            "Division created"
        );
        Ok(division)
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    /// Current rank.
    pub const fn rank(&self) -> f64 {
        self.rank
    }

    /// Highest rank ever reached.
    pub const fn max_rank(&self) -> f64 {
        self.max_rank
    }

    /// Unspent skill points.
    pub const fn skill_points(&self) -> u64 {
        self.skill_points
    }

    /// Skill points ever granted.
    pub const fn total_skill_points(&self) -> u64 {
        self.total_skill_points
    }

    /// Current stamina.
    pub const fn stamina(&self) -> f64 {
        self.stamina
    }

    /// Current max stamina.
    pub const fn max_stamina(&self) -> f64 {
        self.max_stamina
    }

    /// Persistent stamina bonus from training.
    pub const fn stamina_bonus(&self) -> f64 {
        self.stamina_bonus
    }

    /// Roster size.
    pub const fn team_size(&self) -> u32 {
        self.team_size
    }

    /// Black operations completed, also the index of the next one.
    pub const fn black_ops_completed(&self) -> usize {
        self.black_ops_completed
    }

    /// The running action, if any.
    pub const fn current_action(&self) -> Option<ActionId> {
        self.current_action
    }

    /// Progress of the running action.
    pub const fn timer(&self) -> &ActionTimer {
        &self.timer
    }

    /// Cycles received but not yet processed.
    pub const fn stored_cycles(&self) -> f64 {
        self.stored_cycles
    }

    /// Lifetime statistics.
    pub const fn stats(&self) -> &DivisionStats {
        &self.stats
    }

    /// Automation settings.
    pub const fn automation(&self) -> &Automation {
        &self.automation
    }

    /// Replace the automation settings.
    pub const fn set_automation(&mut self, automation: Automation) {
        self.automation = automation;
    }

    /// Balance constants in use.
    pub const fn balance(&self) -> &BalanceConfig {
        &self.balance
    }

    /// Seconds until the next random world event.
    pub const fn event_countdown(&self) -> &Countdown {
        &self.event_countdown
    }

    /// The action catalog.
    pub const fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// One catalog entry.
    pub fn action(&self, id: ActionId) -> Result<&Action, DivisionError> {
        Ok(self.catalog.get(id)?)
    }

    /// Set the level of a contract or operation, clamped to `1..=max_level`.
    pub fn set_action_level(&mut self, id: ActionId, level: u32) -> Result<u32, DivisionError> {
        let action = self.catalog.get_mut(id)?;
        let Some(progress) = action.progress_mut() else {
            return Ok(1);
        };
        progress.set_level(level);
        Ok(progress.level)
    }

    /// Toggle auto-levelling of a contract or operation.
    pub fn set_auto_level(&mut self, id: ActionId, enabled: bool) -> Result<(), DivisionError> {
        if let Some(progress) = self.catalog.get_mut(id)?.progress_mut() {
            progress.auto_level = enabled;
        }
        Ok(())
    }

    /// The skill catalog.
    pub const fn skill_catalog(&self) -> &SkillCatalog {
        &self.skill_catalog
    }

    /// Level of one skill.
    pub fn skill_level(&self, skill: SkillName) -> u32 {
        self.skill_levels.get(&skill).copied().unwrap_or(0)
    }

    /// The derived skill multiplier table.
    pub const fn skill_multipliers(&self) -> &SkillMultipliers {
        &self.skill_multipliers
    }

    /// The division's current city name.
    pub const fn current_city_name(&self) -> CityName {
        self.current_city
    }

    /// The division's current city.
    pub fn current_city(&self) -> Result<&City, DivisionError> {
        Ok(self.cities.city(self.current_city)?)
    }

    /// All six cities.
    pub const fn cities(&self) -> &CityMap {
        &self.cities
    }

    /// Mutable access to the cities, for hosts that script world changes.
    pub const fn cities_mut(&mut self) -> &mut CityMap {
        &mut self.cities
    }

    /// Move the division to another city.
    pub fn switch_city(&mut self, city: CityName) {
        if city != self.current_city {
            info!(from = %self.current_city, to = %city, "Division moved");
            self.log.push(format!("Moved to {city}"));
            self.current_city = city;
        }
    }

    /// Activity log lines, oldest first.
    pub fn log_lines(&self) -> impl Iterator<Item = &str> {
        self.log.lines()
    }

    /// Formula inputs for the current state.
    pub fn view(&self) -> Result<EngineView<'_>, DivisionError> {
        Ok(EngineView {
            balance: &self.balance,
            skills: &self.skill_multipliers,
            stamina: self.stamina,
            max_stamina: self.max_stamina,
            team_size: self.team_size,
            city: self.cities.city(self.current_city)?,
        })
    }

    /// Chance of success for `id` in the current state.
    pub fn success_chance(
        &self,
        id: ActionId,
        operative: &impl Operative,
    ) -> Result<f64, DivisionError> {
        let action = self.catalog.get(id)?;
        Ok(formulas::success_chance(action, &self.view()?, operative, false)?)
    }

    /// The `[low, high]` success band for `id`.
    pub fn estimated_range(
        &self,
        id: ActionId,
        operative: &impl Operative,
    ) -> Result<(f64, f64), DivisionError> {
        let action = self.catalog.get(id)?;
        Ok(formulas::estimated_range(action, &self.view()?, operative)?)
    }

    /// Seconds `id` takes in the current state.
    pub fn action_time(&self, id: ActionId, operative: &impl Operative) -> Result<u32, DivisionError> {
        let action = self.catalog.get(id)?;
        Ok(formulas::action_time(action, &self.view()?, operative)?)
    }

    // ---------------------------------------------------------------
    // Team
    // ---------------------------------------------------------------

    /// Team committed to `id`.
    pub fn team_count(&self, id: ActionId) -> Result<u32, DivisionError> {
        if !id.takes_team() {
            return Err(DivisionError::NoTeam(id));
        }
        Ok(self.catalog.get(id)?.team_count())
    }

    /// Commit up to `size` members to `id`. Returns the size actually set,
    /// clamped to the roster.
    pub fn set_team_count(&mut self, id: ActionId, size: u32) -> Result<u32, DivisionError> {
        if !id.takes_team() {
            return Err(DivisionError::NoTeam(id));
        }
        let size = size.min(self.team_size);
        self.catalog.get_mut(id)?.set_team_count(size);
        Ok(size)
    }

    // ---------------------------------------------------------------
    // Rank and skills
    // ---------------------------------------------------------------

    /// Change rank by `amount` and return the reputation credited.
    ///
    /// Rank floors at zero. Max rank only rises. Each `ranks_per_skill_point`
    /// of max rank beyond those already paid out grants one skill point.
    pub fn change_rank(&mut self, amount: f64, operative: &impl Operative) -> f64 {
        if !amount.is_finite() {
            return 0.0;
        }
        self.rank = (self.rank + amount).max(0.0);
        self.max_rank = self.max_rank.max(self.rank);

        let per_point = self.balance.ranks_per_skill_point.max(f64::MIN_POSITIVE);
        #[allow(clippy::cast_precision_loss)]
        let paid = self.total_skill_points as f64;
        let needed = (paid + 1.0) * per_point;
        if self.max_rank >= needed {
            let owed = ((self.max_rank - needed) / per_point + 1.0).floor();
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let gained = owed as u64;
            self.skill_points = self.skill_points.saturating_add(gained);
            self.total_skill_points = self.total_skill_points.saturating_add(gained);
            info!(gained, total = self.total_skill_points, rank = self.rank, "Skill points granted");
        }

        self.balance.rank_to_faction_rep_factor * amount * operative.multipliers().faction_rep
    }

    /// Cost of buying `count` levels of `skill`.
    pub fn skill_upgrade_cost(&self, skill: SkillName, count: u32) -> Result<f64, DivisionError> {
        let def = self.skill_catalog.get(skill)?;
        Ok(def.cost(self.skill_level(skill), count, self.skill_cost_multiplier)?)
    }

    /// Buy `count` levels of `skill` and rebuild the multiplier table.
    ///
    /// Returns the points spent.
    pub fn upgrade_skill(&mut self, skill: SkillName, count: u32) -> Result<u64, DivisionError> {
        let level = self.skill_level(skill);
        let cost = self.skill_catalog.get(skill)?.check_upgrade(
            level,
            count,
            self.skill_points,
            self.skill_cost_multiplier,
        )?;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let spent = cost.max(0.0) as u64;
        self.skill_points = self.skill_points.saturating_sub(spent);
        let new_level = level.saturating_add(count);
        self.skill_levels.insert(skill, new_level);
        self.refresh_skill_multipliers();
        info!(skill = %skill, level = new_level, spent, "Skill upgraded");
        self.log.push(format!("Upgraded {skill} to level {new_level}"));
        Ok(spent)
    }

    pub(crate) fn refresh_skill_multipliers(&mut self) {
        self.skill_multipliers = SkillMultipliers::recompute(&self.skill_catalog, &self.skill_levels);
    }

    // ---------------------------------------------------------------
    // Stamina
    // ---------------------------------------------------------------

    fn effective_agility(&self, operative: &impl Operative) -> f64 {
        operative.stat_levels().agility.max(0.0)
            * self.skill_multipliers.get(SkillMultiplier::EffAgility)
    }

    /// Recompute max stamina and rescale current stamina proportionally.
    pub fn update_max_stamina(&mut self, operative: &impl Operative) {
        let agility = self.effective_agility(operative);
        let max = (agility.powf(self.balance.max_stamina_agility_exponent) + self.stamina_bonus)
            * self.skill_multipliers.get(SkillMultiplier::Stamina)
            * operative.multipliers().max_stamina;
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        if (max - self.max_stamina).abs() > f64::EPSILON {
            let old = self.max_stamina;
            self.max_stamina = max;
            self.stamina = if old > 0.0 { max * self.stamina / old } else { max };
        }
        self.clamp_stamina();
    }

    /// Stamina regained per second.
    pub fn stamina_gain_per_second(&self, operative: &impl Operative) -> f64 {
        let agility = self.effective_agility(operative);
        (self.balance.stamina_gain_per_second
            + self.max_stamina / self.balance.max_stamina_to_gain_factor)
            * agility.powf(self.balance.stamina_gain_agility_exponent)
            * self.skill_multipliers.get(SkillMultiplier::Stamina)
            * operative.multipliers().stamina_gain
    }

    pub(crate) fn change_stamina(&mut self, amount: f64) {
        if amount.is_finite() {
            self.stamina += amount;
        }
        self.clamp_stamina();
    }

    fn clamp_stamina(&mut self) {
        if !self.stamina.is_finite() {
            self.stamina = 0.0;
        }
        self.stamina = self.stamina.clamp(0.0, self.max_stamina.max(0.0));
    }
}
