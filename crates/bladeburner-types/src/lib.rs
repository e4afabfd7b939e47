//! Shared type definitions for the Bladeburner division engine.
//!
//! Everything the other crates agree on lives here: the typed action
//! identifiers, city and skill names, the seven-stat block used for weights,
//! decays, operative levels and experience, the outcome delta returned by a
//! completed action, and the [`Operative`] trait that stands in for the host
//! character.
//!
//! # Modules
//!
//! - [`enums`] -- Closed name sets (cities, stats, skills, multipliers, categories)
//! - [`ids`] -- [`ActionId`], the category-tagged action identifier
//! - [`stats`] -- [`StatBlock`], a value per operative stat
//! - [`outcome`] -- [`ActionOutcome`], the experience/money/reputation delta
//! - [`operative`] -- The [`Operative`] seam and [`BasicOperative`]

pub mod enums;
pub mod ids;
pub mod operative;
pub mod outcome;
pub mod stats;

pub use enums::{ActionKind, CityName, SkillMultiplier, SkillName, Stat, UnknownName};
pub use ids::{ActionId, BlackOpName, ContractName, GeneralAction, OperationName};
pub use operative::{BasicOperative, Operative, OperativeMultipliers};
pub use outcome::ActionOutcome;
pub use stats::StatBlock;
