//! String-keyed surface for scripts and consoles.
//!
//! Every call takes display labels (`"Contracts"`, `"Tracking"`,
//! `"New Tokyo"`, `"Blade's Intuition"`) and resolves them before touching
//! the division. An unknown category or city yields
//! [`DivisionError::UnknownName`]; an unknown action or skill yields the
//! matching not-found error. Nothing here panics on bad input.

use bladeburner_actions::{ActionCatalog, ActionError};
use bladeburner_types::{ActionId, ActionKind, CityName, Operative};
use serde::Serialize;

use crate::division::Division;
use crate::error::DivisionError;
use crate::progression::StartResult;

/// Read-only figures for one city.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityStats {
    /// City name.
    pub city: CityName,
    /// True synthoid population.
    pub population: u64,
    /// Intel estimate of the population.
    pub population_estimate: f64,
    /// Known synthoid communities.
    pub communities: u32,
    /// Chaos level.
    pub chaos: f64,
}

/// Resolve a category label and an action name.
pub fn resolve_action(category: &str, name: &str) -> Result<ActionId, DivisionError> {
    let kind: ActionKind = category.parse()?;
    ActionId::parse(kind, name).ok_or_else(|| ActionError::NotFound(name.to_owned()).into())
}

/// Display names of every action in a category.
pub fn action_names(category: &str) -> Result<Vec<&'static str>, DivisionError> {
    let kind: ActionKind = category.parse()?;
    Ok(ActionCatalog::names(kind))
}

impl Division {
    /// Category label and name of the running action.
    pub fn current_action_labels(&self) -> Option<(&'static str, &'static str)> {
        self.current_action.map(|id| (id.kind().as_str(), id.name()))
    }

    /// Seconds left on the running action (0 when idle).
    pub fn time_remaining(&self) -> f64 {
        if self.current_action.is_none() {
            return 0.0;
        }
        self.timer.remaining()
    }

    /// Start an action by name.
    pub fn start_action_named(
        &mut self,
        category: &str,
        name: &str,
        operative: &impl Operative,
    ) -> Result<StartResult, DivisionError> {
        let id = resolve_action(category, name)?;
        self.start_action(id, operative)
    }

    /// Seconds an action takes, by name.
    pub fn action_time_named(
        &self,
        category: &str,
        name: &str,
        operative: &impl Operative,
    ) -> Result<u32, DivisionError> {
        self.action_time(resolve_action(category, name)?, operative)
    }

    /// The `[low, high]` success band of an action, by name.
    pub fn estimated_range_named(
        &self,
        category: &str,
        name: &str,
        operative: &impl Operative,
    ) -> Result<(f64, f64), DivisionError> {
        self.estimated_range(resolve_action(category, name)?, operative)
    }

    /// Remaining count of a contract or operation (`None` for other categories).
    pub fn action_count_named(&self, category: &str, name: &str) -> Result<Option<f64>, DivisionError> {
        let id = resolve_action(category, name)?;
        Ok(self.catalog.get(id)?.progress().map(|p| p.count))
    }

    /// Team committed to an operation or black operation, by name.
    pub fn team_size_named(&self, category: &str, name: &str) -> Result<u32, DivisionError> {
        self.team_count(resolve_action(category, name)?)
    }

    /// Commit a team to an operation or black operation, by name.
    pub fn set_team_size_named(
        &mut self,
        category: &str,
        name: &str,
        size: u32,
    ) -> Result<u32, DivisionError> {
        let id = resolve_action(category, name)?;
        self.set_team_count(id, size)
    }

    /// Level of a skill, by name.
    pub fn skill_level_named(&self, skill: &str) -> Result<u32, DivisionError> {
        let def = self.skill_catalog.find(skill)?;
        Ok(self.skill_level(def.name))
    }

    /// Cost of the next `count` levels of a skill, by name.
    pub fn skill_upgrade_cost_named(&self, skill: &str, count: u32) -> Result<f64, DivisionError> {
        let name = self.skill_catalog.find(skill)?.name;
        self.skill_upgrade_cost(name, count)
    }

    /// Buy `count` levels of a skill, by name.
    pub fn upgrade_skill_named(&mut self, skill: &str, count: u32) -> Result<u64, DivisionError> {
        let name = self.skill_catalog.find(skill)?.name;
        self.upgrade_skill(name, count)
    }

    /// Population, estimate, communities and chaos of a city, by name.
    pub fn city_stats(&self, city: &str) -> Result<CityStats, DivisionError> {
        let name: CityName = city.parse()?;
        let city = self.cities.city(name)?;
        Ok(CityStats {
            city: name,
            population: city.population(),
            population_estimate: city.population_estimate(),
            communities: city.communities(),
            chaos: city.chaos(),
        })
    }

    /// Move the division, by city name.
    pub fn switch_city_named(&mut self, city: &str) -> Result<(), DivisionError> {
        let name: CityName = city.parse()?;
        self.switch_city(name);
        Ok(())
    }
}
