//! Persistence snapshots.
//!
//! A [`DivisionSnapshot`] holds only mutable state. Static balance
//! parameters are never written; on restore they come from a freshly built
//! catalog and each persisted entry is re-attached by its category tag and
//! name. Every numeric field is validated and clamped on the way in, so a
//! hand-edited save cannot break the division's invariants.

use std::collections::BTreeMap;

use bladeburner_actions::{ActionCatalog, ActionPayload};
use bladeburner_types::{ActionId, ActionKind, CityName, Operative, SkillName, UnknownName};
use bladeburner_world::{City, CityMap, Countdown, WorldError};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::automation::Automation;
use crate::config::SimulationConfig;
use crate::division::{ActionTimer, Division, DivisionStats};
use crate::error::DivisionError;

/// Errors that can occur when saving or restoring a division.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The JSON could not be written or parsed.
    #[error("snapshot JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A persisted action does not exist in the catalog.
    #[error("unknown action in snapshot: {kind} / {name}")]
    UnknownAction {
        /// Persisted category tag.
        kind: String,
        /// Persisted action name.
        name: String,
    },

    /// A persisted city or skill label did not match.
    #[error("{source}")]
    UnknownName {
        /// The underlying lookup failure.
        #[from]
        source: UnknownName,
    },

    /// A persisted value is unusable even after clamping.
    #[error("invalid snapshot: {reason}")]
    Invalid {
        /// What was wrong.
        reason: String,
    },

    /// Rebuilding the world failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Rebuilding the division failed.
    #[error("division error: {source}")]
    Division {
        /// The underlying division error.
        #[from]
        source: DivisionError,
    },
}

/// Persisted identity of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRef {
    /// Category label (`"Contracts"`, `"Operations"`, ...).
    pub kind: String,
    /// Action name.
    pub name: String,
}

impl ActionRef {
    fn of(id: ActionId) -> Self {
        Self {
            kind: id.kind().as_str().to_owned(),
            name: id.name().to_owned(),
        }
    }

    fn resolve(&self) -> Result<ActionId, SnapshotError> {
        self.kind
            .parse::<ActionKind>()
            .ok()
            .and_then(|kind| ActionId::parse(kind, &self.name))
            .ok_or_else(|| SnapshotError::UnknownAction {
                kind: self.kind.clone(),
                name: self.name.clone(),
            })
    }
}

/// Mutable fields of one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Which action.
    #[serde(flatten)]
    pub action: ActionRef,
    /// Remaining count (contracts and operations).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
    /// Current level.
    #[serde(default = "one")]
    pub level: u32,
    /// Highest unlocked level.
    #[serde(default = "one")]
    pub max_level: u32,
    /// Auto-level flag.
    #[serde(default = "yes")]
    pub auto_level: bool,
    /// Lifetime successes.
    #[serde(default)]
    pub successes: u32,
    /// Lifetime failures.
    #[serde(default)]
    pub failures: u32,
    /// Committed team (operations and black operations).
    #[serde(default)]
    pub team_count: u32,
}

const fn one() -> u32 {
    1
}

const fn yes() -> bool {
    true
}

/// Persisted city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    /// City label.
    pub name: String,
    /// True population.
    pub population: u64,
    /// Population estimate.
    pub population_estimate: f64,
    /// Known communities.
    pub communities: u32,
    /// Chaos level.
    pub chaos: f64,
}

/// Persisted automation settings, with actions by reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomationRecord {
    /// Whether automation runs.
    pub enabled: bool,
    /// Low-stamina action.
    pub low_action: Option<ActionRef>,
    /// Low threshold.
    pub low_threshold: f64,
    /// High-stamina action.
    pub high_action: Option<ActionRef>,
    /// High threshold.
    pub high_threshold: f64,
}

/// Everything needed to rebuild a division, minus static balance data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionSnapshot {
    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,
    /// Current rank.
    pub rank: f64,
    /// Highest rank reached.
    pub max_rank: f64,
    /// Unspent skill points.
    pub skill_points: u64,
    /// Skill points ever granted.
    pub total_skill_points: u64,
    /// Skill levels by skill label.
    pub skill_levels: BTreeMap<String, u32>,
    /// Current stamina. Max stamina is derived, not stored.
    pub stamina: f64,
    /// Persistent stamina bonus.
    pub stamina_bonus: f64,
    /// Current city label.
    pub current_city: String,
    /// Running action.
    pub current_action: Option<ActionRef>,
    /// Running action's timer.
    pub timer: ActionTimer,
    /// Unprocessed cycles.
    pub stored_cycles: f64,
    /// Roster size.
    pub team_size: u32,
    /// Black operations completed.
    pub black_ops_completed: usize,
    /// Automation settings.
    pub automation: AutomationRecord,
    /// Lifetime statistics.
    pub stats: DivisionStats,
    /// Seconds until the next random event.
    pub event_countdown: i64,
    /// Seconds until the next migration check.
    pub migration_countdown: i64,
    /// Per-city state.
    pub cities: Vec<CityRecord>,
    /// Per-action mutable state.
    pub actions: Vec<ActionRecord>,
    /// Activity log, oldest first.
    #[serde(default)]
    pub log: Vec<String>,
}

impl DivisionSnapshot {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn finite(field: &str, value: f64) -> Result<f64, SnapshotError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SnapshotError::Invalid {
            reason: format!("{field} is not finite: {value}"),
        })
    }
}

fn resolve_optional(action: Option<&ActionRef>) -> Result<Option<ActionId>, SnapshotError> {
    action.map(ActionRef::resolve).transpose()
}

fn restore_cities(records: &[CityRecord]) -> Result<CityMap, SnapshotError> {
    let cities = records
        .iter()
        .map(|record| -> Result<City, SnapshotError> {
            let name: CityName = record.name.parse()?;
            Ok(City::from_parts(
                name,
                record.population,
                record.population_estimate,
                record.communities,
                record.chaos,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CityMap::from_cities(cities)?)
}

fn restore_automation(record: &AutomationRecord) -> Result<Automation, SnapshotError> {
    Ok(Automation {
        enabled: record.enabled,
        low_action: resolve_optional(record.low_action.as_ref())?,
        low_threshold: finite("automation.low_threshold", record.low_threshold)?,
        high_action: resolve_optional(record.high_action.as_ref())?,
        high_threshold: finite("automation.high_threshold", record.high_threshold)?,
    })
}

impl Division {
    /// Capture the mutable state.
    pub fn snapshot(&self) -> DivisionSnapshot {
        let actions = self
            .catalog
            .iter()
            .filter_map(|action| {
                let progress = action.progress();
                let team_count = action.team_count();
                if progress.is_none() && !action.id.takes_team() {
                    return None;
                }
                Some(ActionRecord {
                    action: ActionRef::of(action.id),
                    count: progress.map(|p| p.count),
                    level: progress.map_or(1, |p| p.level),
                    max_level: progress.map_or(1, |p| p.max_level),
                    auto_level: progress.is_none_or(|p| p.auto_level),
                    successes: progress.map_or(0, |p| p.successes),
                    failures: progress.map_or(0, |p| p.failures),
                    team_count,
                })
            })
            .collect();

        DivisionSnapshot {
            saved_at: Utc::now(),
            rank: self.rank,
            max_rank: self.max_rank,
            skill_points: self.skill_points,
            total_skill_points: self.total_skill_points,
            skill_levels: self
                .skill_levels
                .iter()
                .map(|(name, level)| (name.as_str().to_owned(), *level))
                .collect(),
            stamina: self.stamina,
            stamina_bonus: self.stamina_bonus,
            current_city: self.current_city.as_str().to_owned(),
            current_action: self.current_action.map(ActionRef::of),
            timer: self.timer,
            stored_cycles: self.stored_cycles,
            team_size: self.team_size,
            black_ops_completed: self.black_ops_completed,
            automation: AutomationRecord {
                enabled: self.automation.enabled,
                low_action: self.automation.low_action.map(ActionRef::of),
                low_threshold: self.automation.low_threshold,
                high_action: self.automation.high_action.map(ActionRef::of),
                high_threshold: self.automation.high_threshold,
            },
            stats: self.stats,
            event_countdown: self.event_countdown.remaining(),
            migration_countdown: self.migration_countdown.remaining(),
            cities: self
                .cities
                .iter()
                .map(|city| CityRecord {
                    name: city.name().as_str().to_owned(),
                    population: city.population(),
                    population_estimate: city.population_estimate(),
                    communities: city.communities(),
                    chaos: city.chaos(),
                })
                .collect(),
            actions,
            log: self.log.lines().map(str::to_owned).collect(),
        }
    }

    /// Rebuild a division from a snapshot.
    ///
    /// The catalog is rebuilt from `config` and each persisted entry is
    /// re-attached by name. Unknown categories, actions, skills and cities
    /// are rejected; every numeric field is clamped into range.
    pub fn restore(
        snapshot: &DivisionSnapshot,
        config: &SimulationConfig,
        operative: &impl Operative,
        rng: &mut impl Rng,
    ) -> Result<Self, SnapshotError> {
        let mut division = Self::new(config, operative, rng)?;

        division.rank = finite("rank", snapshot.rank)?.max(0.0);
        division.max_rank = finite("max_rank", snapshot.max_rank)?.max(division.rank);
        division.skill_points = snapshot.skill_points;
        division.total_skill_points = snapshot.total_skill_points;

        division.skill_levels.clear();
        for (label, level) in &snapshot.skill_levels {
            let name: SkillName = label.parse()?;
            let max = division.skill_catalog.get(name).map_or(0, |def| def.max_level);
            let level = (*level).min(max);
            if level > 0 {
                division.skill_levels.insert(name, level);
            }
        }
        division.refresh_skill_multipliers();

        division.current_city = snapshot.current_city.parse::<CityName>()?;
        division.cities = restore_cities(&snapshot.cities)?;

        division.team_size = snapshot.team_size;
        division.black_ops_completed = snapshot
            .black_ops_completed
            .min(ActionCatalog::black_op_count());
        for record in &snapshot.actions {
            division.restore_action(record)?;
        }

        division.stamina_bonus = finite("stamina_bonus", snapshot.stamina_bonus)?.max(0.0);
        division.max_stamina = 0.0;
        division.update_max_stamina(operative);
        division.stamina = finite("stamina", snapshot.stamina)?;
        division.change_stamina(0.0);

        division.stored_cycles = finite("stored_cycles", snapshot.stored_cycles)?.max(0.0);
        division.event_countdown = Countdown::from_parts(
            snapshot.event_countdown,
            config.events.interval_min_seconds,
            config.events.interval_max_seconds,
        )?;
        division.migration_countdown = Countdown::from_parts(
            snapshot.migration_countdown,
            config.events.migration_check_seconds,
            config.events.migration_check_seconds,
        )?;

        division.automation = restore_automation(&snapshot.automation)?;
        division.stats = snapshot.stats;

        division.current_action = resolve_optional(snapshot.current_action.as_ref())?;
        division.timer = if let Some(id) = division.current_action {
            let required = finite("timer.required", snapshot.timer.required)?;
            if required <= 0.0 {
                return Err(SnapshotError::Invalid {
                    reason: format!("timer for running action {id} has no duration"),
                });
            }
            ActionTimer {
                elapsed: finite("timer.elapsed", snapshot.timer.elapsed)?.max(0.0),
                required,
                overflow: finite("timer.overflow", snapshot.timer.overflow)?.max(0.0),
            }
        } else {
            ActionTimer::default()
        };

        division.log.clear();
        for line in &snapshot.log {
            division.log.push(line.as_str());
        }

        info!(
            rank = division.rank,
            saved_at = %snapshot.saved_at,
            actions = snapshot.actions.len(),
            "Division restored"
        );
        Ok(division)
    }

    fn restore_action(&mut self, record: &ActionRecord) -> Result<(), SnapshotError> {
        let id = record.action.resolve()?;
        let roster = self.team_size;
        let action = self.catalog.get_mut(id).map_err(DivisionError::from)?;
        match &mut action.payload {
            ActionPayload::Contract(progress) | ActionPayload::Operation { progress, .. } => {
                if let Some(count) = record.count {
                    progress.count = finite("count", count)?;
                }
                progress.max_level = record.max_level;
                progress.level = record.level;
                progress.auto_level = record.auto_level;
                progress.successes = record.successes;
                progress.failures = record.failures;
                progress.clamp();
            }
            ActionPayload::BlackOp { .. } | ActionPayload::General => {}
        }
        action.set_team_count(record.team_count.min(roster));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bladeburner_types::{BasicOperative, ContractName, StatBlock};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    const TRACKING: ActionId = ActionId::Contract(ContractName::Tracking);

    fn setup() -> (Division, BasicOperative, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(21);
        let mut operative = BasicOperative::new("Agent", StatBlock::uniform(200.0), 100.0);
        let mut division = Division::new(&SimulationConfig::default(), &operative, &mut rng).unwrap();
        division.start_action(TRACKING, &operative).unwrap();
        for _ in 0..40 {
            division.process(&mut operative, 25.0, &mut rng).unwrap();
        }
        (division, operative, rng)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn json_round_trip_restores_state() {
        let (division, operative, mut rng) = setup();
        let json = division.snapshot().to_json().unwrap();
        let snapshot = DivisionSnapshot::from_json(&json).unwrap();
        let restored =
            Division::restore(&snapshot, &SimulationConfig::default(), &operative, &mut rng).unwrap();

        assert!(close(restored.rank(), division.rank()));
        assert!(close(restored.stamina(), division.stamina()));
        assert!(close(restored.timer().elapsed, division.timer().elapsed));
        assert_eq!(restored.current_action(), division.current_action());
        assert_eq!(restored.current_city_name(), division.current_city_name());
        for (after, before) in restored.cities().iter().zip(division.cities().iter()) {
            assert_eq!(after.name(), before.name());
            assert_eq!(after.population(), before.population());
            assert_eq!(after.communities(), before.communities());
            assert!(close(after.chaos(), before.chaos()));
        }
        let before = division.action(TRACKING).unwrap().progress().unwrap();
        let after = restored.action(TRACKING).unwrap().progress().unwrap();
        assert_eq!(after.successes, before.successes);
        assert_eq!(after.failures, before.failures);
        assert_eq!(after.level, before.level);
        assert!(close(after.count, before.count));
        assert_eq!(
            restored.log_lines().collect::<Vec<_>>(),
            division.log_lines().collect::<Vec<_>>()
        );
    }

    #[test]
    fn restore_clamps_out_of_range_fields() {
        let (division, operative, mut rng) = setup();
        let mut snapshot = division.snapshot();
        snapshot.rank = -5.0;
        snapshot.black_ops_completed = 500;
        snapshot.stamina = 1e12;
        for record in &mut snapshot.actions {
            record.count = record.count.map(|_| -3.0);
            record.level = 9;
            record.max_level = 0;
            record.team_count = 10;
        }
        for city in &mut snapshot.cities {
            city.chaos = -1.0;
            city.population_estimate = -10.0;
        }
        let restored =
            Division::restore(&snapshot, &SimulationConfig::default(), &operative, &mut rng).unwrap();
        assert!(restored.rank().abs() < f64::EPSILON);
        assert_eq!(restored.black_ops_completed(), ActionCatalog::black_op_count());
        assert!(restored.stamina() <= restored.max_stamina());
        for action in restored.catalog().iter() {
            if let Some(progress) = action.progress() {
                assert!(progress.count.abs() < f64::EPSILON);
                assert_eq!(progress.level, 1);
                assert_eq!(progress.max_level, 1);
            }
            assert!(action.team_count() <= restored.team_size());
        }
        for city in restored.cities().iter() {
            assert!(city.chaos().abs() < f64::EPSILON);
            assert!(city.population_estimate().abs() < f64::EPSILON);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        let (division, operative, mut rng) = setup();
        let config = SimulationConfig::default();

        let mut snapshot = division.snapshot();
        snapshot.actions.push(ActionRecord {
            action: ActionRef {
                kind: "Contracts".to_owned(),
                name: "Smuggling".to_owned(),
            },
            count: Some(1.0),
            level: 1,
            max_level: 1,
            auto_level: true,
            successes: 0,
            failures: 0,
            team_count: 0,
        });
        assert!(matches!(
            Division::restore(&snapshot, &config, &operative, &mut rng),
            Err(SnapshotError::UnknownAction { .. })
        ));

        let mut snapshot = division.snapshot();
        snapshot.current_city = "Atlantis".to_owned();
        assert!(matches!(
            Division::restore(&snapshot, &config, &operative, &mut rng),
            Err(SnapshotError::UnknownName { .. })
        ));

        let mut snapshot = division.snapshot();
        snapshot.skill_levels.insert("Luck".to_owned(), 3);
        assert!(matches!(
            Division::restore(&snapshot, &config, &operative, &mut rng),
            Err(SnapshotError::UnknownName { .. })
        ));
    }

    #[test]
    fn non_finite_rank_is_invalid() {
        let (division, operative, mut rng) = setup();
        let mut snapshot = division.snapshot();
        snapshot.rank = f64::NAN;
        assert!(matches!(
            Division::restore(&snapshot, &SimulationConfig::default(), &operative, &mut rng),
            Err(SnapshotError::Invalid { .. })
        ));
    }

    #[test]
    fn running_action_without_duration_is_invalid() {
        let (division, operative, mut rng) = setup();
        let mut snapshot = division.snapshot();
        snapshot.current_action = Some(ActionRef::of(TRACKING));
        snapshot.timer.required = 0.0;
        assert!(matches!(
            Division::restore(&snapshot, &SimulationConfig::default(), &operative, &mut rng),
            Err(SnapshotError::Invalid { .. })
        ));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            DivisionSnapshot::from_json("{\"rank\": "),
            Err(SnapshotError::Json { .. })
        ));
    }
}
