//! Random world events and synthoid migration.
//!
//! # Random events
//!
//! When the event countdown fires, one outcome is drawn from a weighted
//! table. Each outcome picks a source city and a distinct destination city
//! up front; only the migration outcomes use the destination.
//!
//! | Event               | Weight | Effect                                         |
//! |---------------------|--------|------------------------------------------------|
//! | New community       |   5%   | +1 community, population +10..20%             |
//! | Community migration |   5%   | 1 community and 10..20% population move      |
//! | Population surge    |  20%   | population +8..24%                            |
//! | Migration           |  20%   | see [`trigger_migration`]                     |
//! | Riot                |  20%   | chaos +1, then chaos x (1.05..1.20)           |
//! | Population decline  |  20%   | population -8..20%                            |
//! | Quiet               |  10%   | nothing happens                               |
//!
//! Population changes from events never touch the estimate; the division
//! has to rediscover them through intel.

use bladeburner_types::CityName;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::city_map::CityMap;
use crate::error::WorldError;

/// Timing parameters for world events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Shortest gap between random events in seconds (default: 48).
    #[serde(default = "default_interval_min_seconds")]
    pub interval_min_seconds: u32,

    /// Longest gap between random events in seconds (default: 120).
    #[serde(default = "default_interval_max_seconds")]
    pub interval_max_seconds: u32,

    /// Chaos removed from every city per second (default: 0.0001).
    #[serde(default = "default_chaos_decay_per_second")]
    pub chaos_decay_per_second: f64,

    /// Seconds between slow background migration checks (default: 600).
    #[serde(default = "default_migration_check_seconds")]
    pub migration_check_seconds: u32,

    /// Chance a background migration check moves population (default: 0.1).
    #[serde(default = "default_migration_chance")]
    pub migration_chance: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            interval_min_seconds: default_interval_min_seconds(),
            interval_max_seconds: default_interval_max_seconds(),
            chaos_decay_per_second: default_chaos_decay_per_second(),
            migration_check_seconds: default_migration_check_seconds(),
            migration_chance: default_migration_chance(),
        }
    }
}

const fn default_interval_min_seconds() -> u32 {
    48
}

const fn default_interval_max_seconds() -> u32 {
    120
}

const fn default_chaos_decay_per_second() -> f64 {
    0.0001
}

const fn default_migration_check_seconds() -> u32 {
    600
}

const fn default_migration_chance() -> f64 {
    0.1
}

/// What a migration moved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// City the synthoids left.
    pub from: CityName,
    /// City the synthoids arrived in.
    pub to: CityName,
    /// Synthoids moved.
    pub population_moved: u64,
    /// Whether a whole community moved with them.
    pub community_moved: bool,
}

/// The outcome of one random-event roll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RandomEvent {
    /// A new community formed and the population grew.
    CommunityFormed {
        /// Affected city.
        city: CityName,
        /// Synthoids added.
        population_added: u64,
    },
    /// An existing community relocated.
    CommunityMigrated(MigrationReport),
    /// The population grew.
    PopulationSurge {
        /// Affected city.
        city: CityName,
        /// Synthoids added.
        population_added: u64,
    },
    /// Synthoids migrated between cities.
    Migration(MigrationReport),
    /// A riot raised chaos.
    Riot {
        /// Affected city.
        city: CityName,
        /// Chaos after the riot.
        chaos_after: f64,
    },
    /// The population shrank.
    PopulationDecline {
        /// Affected city.
        city: CityName,
        /// Synthoids removed.
        population_removed: u64,
    },
    /// Nothing happened.
    Quiet,
}

impl RandomEvent {
    /// Short label for log lines.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::CommunityFormed { .. } => "community formed",
            Self::CommunityMigrated(_) => "community migrated",
            Self::PopulationSurge { .. } => "population surge",
            Self::Migration(_) => "migration",
            Self::Riot { .. } => "riot",
            Self::PopulationDecline { .. } => "population decline",
            Self::Quiet => "quiet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    CommunityFormed,
    CommunityMigrated,
    PopulationSurge,
    Migration,
    Riot,
    PopulationDecline,
    Quiet,
}

/// Event weights out of 1000.
const EVENT_WEIGHTS: [(EventKind, u32); 7] = [
    (EventKind::CommunityFormed, 50),
    (EventKind::CommunityMigrated, 50),
    (EventKind::PopulationSurge, 200),
    (EventKind::Migration, 200),
    (EventKind::Riot, 200),
    (EventKind::PopulationDecline, 200),
    (EventKind::Quiet, 100),
];

fn total_weight() -> u32 {
    EVENT_WEIGHTS
        .iter()
        .fold(0_u32, |acc, (_, w)| acc.saturating_add(*w))
}

fn select(random_value: u32) -> EventKind {
    let mut cumulative: u32 = 0;
    for &(kind, weight) in &EVENT_WEIGHTS {
        cumulative = cumulative.saturating_add(weight);
        if random_value < cumulative {
            return kind;
        }
    }
    EventKind::Quiet
}

/// Fraction of `population` for a percentage drawn from `[low, high]`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn percentage_of(population: u64, low: u32, high: u32, rng: &mut impl Rng) -> u64 {
    let percent = f64::from(rng.random_range(low..=high)) / 100.0;
    (population as f64 * percent).round() as u64
}

/// Roll one random event and apply it to `map`.
pub fn roll_random_event(map: &mut CityMap, rng: &mut impl Rng) -> Result<RandomEvent, WorldError> {
    let (source, destination) = CityMap::pick_pair(rng);
    let kind = select(rng.random_range(0..total_weight()));

    let event = match kind {
        EventKind::CommunityFormed => {
            let city = map.city_mut(source)?;
            city.add_community();
            let added = percentage_of(city.population(), 10, 20, rng);
            city.grow_population(added);
            RandomEvent::CommunityFormed {
                city: source,
                population_added: added,
            }
        }
        EventKind::CommunityMigrated => {
            if map.city(source)?.communities() == 0 {
                // Nothing to move, so a community forms instead.
                let city = map.city_mut(source)?;
                city.add_community();
                let added = percentage_of(city.population(), 10, 20, rng);
                city.grow_population(added);
                RandomEvent::CommunityFormed {
                    city: source,
                    population_added: added,
                }
            } else {
                map.city_mut(source)?.remove_community();
                map.city_mut(destination)?.add_community();
                let count = percentage_of(map.city(source)?.population(), 10, 20, rng);
                let moved = map.transfer_population(source, destination, count)?;
                RandomEvent::CommunityMigrated(MigrationReport {
                    from: source,
                    to: destination,
                    population_moved: moved,
                    community_moved: true,
                })
            }
        }
        EventKind::PopulationSurge => {
            let city = map.city_mut(source)?;
            let added = percentage_of(city.population(), 8, 24, rng);
            city.grow_population(added);
            RandomEvent::PopulationSurge {
                city: source,
                population_added: added,
            }
        }
        EventKind::Migration => {
            RandomEvent::Migration(move_population(map, source, destination, rng)?)
        }
        EventKind::Riot => {
            let city = map.city_mut(source)?;
            city.change_chaos_by_count(1.0)?;
            let factor = 1.0 + f64::from(rng.random_range(5_u32..=20)) / 100.0;
            city.scale_chaos(factor)?;
            RandomEvent::Riot {
                city: source,
                chaos_after: city.chaos(),
            }
        }
        EventKind::PopulationDecline => {
            let city = map.city_mut(source)?;
            let count = percentage_of(city.population(), 8, 20, rng);
            let removed = city.shrink_population(count);
            RandomEvent::PopulationDecline {
                city: source,
                population_removed: removed,
            }
        }
        EventKind::Quiet => RandomEvent::Quiet,
    };

    debug!(event = event.label(), source = %source, "Random world event");
    Ok(event)
}

/// Move synthoids out of `source` into a random other city.
///
/// Between 3% and 15% of the population moves. With a 5% chance a whole
/// community moves too, which multiplies the share by 2 to 4.
pub fn trigger_migration(
    map: &mut CityMap,
    source: CityName,
    rng: &mut impl Rng,
) -> Result<MigrationReport, WorldError> {
    let destination = CityMap::pick_other(source, rng);
    move_population(map, source, destination, rng)
}

/// Run [`trigger_migration`] with probability `chance`.
pub fn trigger_potential_migration(
    map: &mut CityMap,
    source: CityName,
    chance: f64,
    rng: &mut impl Rng,
) -> Result<Option<MigrationReport>, WorldError> {
    let chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 1.0) };
    if rng.random::<f64>() < chance {
        return trigger_migration(map, source, rng).map(Some);
    }
    Ok(None)
}

fn move_population(
    map: &mut CityMap,
    source: CityName,
    destination: CityName,
    rng: &mut impl Rng,
) -> Result<MigrationReport, WorldError> {
    let mut percent = f64::from(rng.random_range(3_u32..=15)) / 100.0;
    let mut community_moved = false;
    if rng.random::<f64>() < 0.05 && map.city(source)?.communities() > 0 {
        percent *= f64::from(rng.random_range(2_u32..=4));
        map.city_mut(source)?.remove_community();
        map.city_mut(destination)?.add_community();
        community_moved = true;
    }
    let scaled = (map.city(source)?.population_f64() * percent).round();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = scaled as u64;
    let moved = map.transfer_population(source, destination, count)?;
    Ok(MigrationReport {
        from: source,
        to: destination,
        population_moved: moved,
        community_moved,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn weights_cover_a_thousand() {
        assert_eq!(total_weight(), 1000);
        assert_eq!(select(0), EventKind::CommunityFormed);
        assert_eq!(select(99), EventKind::CommunityMigrated);
        assert_eq!(select(999), EventKind::Quiet);
    }

    #[test]
    fn events_never_move_estimates_or_break_invariants() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut map = CityMap::seeded(1e9, &mut rng);
        let estimates: Vec<f64> = map.iter().map(|c| c.population_estimate()).collect();
        for _ in 0..500 {
            roll_random_event(&mut map, &mut rng).unwrap();
        }
        let after: Vec<f64> = map.iter().map(|c| c.population_estimate()).collect();
        assert_eq!(estimates, after);
        assert!(map.iter().all(|c| c.chaos() >= 0.0));
    }

    #[test]
    fn migration_conserves_total_population() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut map = CityMap::seeded(1e9, &mut rng);
        let before = map.total_population();
        for _ in 0..200 {
            let report = trigger_migration(&mut map, CityName::Chongqing, &mut rng).unwrap();
            assert_eq!(report.from, CityName::Chongqing);
            assert_ne!(report.to, CityName::Chongqing);
        }
        assert_eq!(map.total_population(), before);
    }

    #[test]
    fn potential_migration_respects_chance_bounds() {
        let mut rng = SmallRng::seed_from_u64(5);
        let mut map = CityMap::seeded(1e9, &mut rng);
        for _ in 0..50 {
            assert!(
                trigger_potential_migration(&mut map, CityName::Aevum, 0.0, &mut rng)
                    .unwrap()
                    .is_none()
            );
            assert!(
                trigger_potential_migration(&mut map, CityName::Aevum, 1.0, &mut rng)
                    .unwrap()
                    .is_some()
            );
        }
    }

    #[test]
    fn event_config_defaults_fill_missing_fields() {
        let config: EventConfig =
            serde_json::from_str(r#"{"interval_min_seconds": 10}"#).unwrap();
        assert_eq!(config.interval_min_seconds, 10);
        assert_eq!(config.interval_max_seconds, 120);
        assert_eq!(config.migration_check_seconds, 600);
    }
}
