//! Division aggregate, progression rules and tick processor for the
//! Bladeburner division engine.
//!
//! A [`Division`] owns the action catalog, the skill table, the six cities
//! and the rank/stamina/team state of one operative's division. Cycles are
//! fed in with [`Division::store_cycles`] and consumed in whole seconds by
//! [`Division::process`], which advances the world, the running action and
//! stamina-threshold automation in a fixed order.
//!
//! # Modules
//!
//! - [`activity`] -- Bounded activity log.
//! - [`automation`] -- Stamina-threshold action switching.
//! - [`config`] -- Configuration loading from `bladeburner-config.yaml`.
//! - [`division`] -- The [`Division`] aggregate, rank, skills and stamina.
//! - [`error`] -- [`DivisionError`].
//! - [`progression`] -- Availability, start and completion of actions.
//! - [`script`] -- String-keyed surface for scripts and consoles.
//! - [`snapshot`] -- JSON persistence of the mutable state.
//! - [`tick`] -- The per-update processing loop.

pub mod activity;
pub mod automation;
pub mod config;
pub mod division;
pub mod error;
pub mod progression;
pub mod script;
pub mod snapshot;
pub mod tick;

pub use activity::ActivityLog;
pub use automation::Automation;
pub use config::{
    AutomationConfig, ConfigError, DivisionConfig, LogFormat, LoggingConfig, OperativeConfig,
    RunConfig, SimulationConfig,
};
pub use division::{ActionTimer, Division, DivisionStats};
pub use error::DivisionError;
pub use progression::{Availability, StartResult};
pub use script::{CityStats, action_names, resolve_action};
pub use snapshot::{DivisionSnapshot, SnapshotError};
pub use tick::TickSummary;
