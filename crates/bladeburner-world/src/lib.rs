//! Per-city world model for the Bladeburner division engine.
//!
//! Six cities each carry a true synthoid population, an intel estimate of
//! it, a count of synthoid communities and a chaos level. Missions read and
//! mutate these values; a periodic random-event generator and migrations
//! perturb them in between.
//!
//! # Modules
//!
//! - [`city`] -- [`City`] state and its clamped primitive mutators.
//! - [`city_map`] -- [`CityMap`], the owned set of all six cities.
//! - [`countdown`] -- [`Countdown`], a re-rolling seconds timer.
//! - [`error`] -- Error types for world operations.
//! - [`events`] -- Weighted random events and migration.

pub mod city;
pub mod city_map;
pub mod countdown;
pub mod error;
pub mod events;

pub use city::{City, PopulationChange};
pub use city_map::CityMap;
pub use countdown::Countdown;
pub use error::WorldError;
pub use events::{
    EventConfig, MigrationReport, RandomEvent, roll_random_event, trigger_migration,
    trigger_potential_migration,
};
