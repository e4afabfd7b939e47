//! Missions, formulas and skills for the Bladeburner division engine.
//!
//! # Modules
//!
//! - [`action`] -- The [`Action`] tagged union and its per-category payloads.
//! - [`catalog`] -- [`ActionCatalog`], the owned registry of every action.
//! - [`config`] -- [`BalanceConfig`], every tuned balance constant.
//! - [`error`] -- Error types for action and skill operations.
//! - [`formulas`] -- Difficulty, action time, success chance and estimate range.
//! - [`skills`] -- Skill catalog, costs and the derived multiplier table.

pub mod action;
pub mod catalog;
pub mod config;
pub mod error;
pub mod formulas;
pub mod skills;

pub use action::{Action, ActionParams, ActionPayload, LevelProgress};
pub use catalog::ActionCatalog;
pub use config::BalanceConfig;
pub use error::{ActionError, SkillError};
pub use formulas::EngineView;
pub use skills::{SkillCatalog, SkillDef, SkillMultipliers};
