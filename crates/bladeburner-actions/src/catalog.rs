//! The action catalog.
//!
//! [`ActionCatalog::standard`] builds every contract, operation, black
//! operation and general action with its tuned balance values. The catalog
//! is an owned value held by one division; nothing here is global.
//!
//! Weight tables below are written in percent (hack, str, def, dex, agi,
//! cha, int) and normalized on construction.

use std::collections::BTreeMap;

use bladeburner_types::{
    ActionId, ActionKind, BlackOpName, ContractName, GeneralAction, OperationName, StatBlock,
};
use rand::Rng;

use crate::action::{Action, ActionParams, ActionPayload, LevelProgress};
use crate::error::ActionError;

/// Balance values of one contract or operation.
struct LeveledTemplate {
    base_difficulty: f64,
    difficulty_factor: f64,
    reward_factor: f64,
    rank_gain: f64,
    rank_loss: f64,
    hp_loss: f64,
    weights: [f64; 7],
    decays: [f64; 7],
    is_stealth: bool,
    is_kill: bool,
    /// Count growth per period, drawn from this range.
    growth: (f64, f64),
    /// Starting count, drawn from this range.
    initial_count: (u32, u32),
}

/// Balance values of one black operation.
struct BlackOpTemplate {
    base_difficulty: f64,
    required_rank: f64,
    rank_gain: f64,
    rank_loss: f64,
    hp_loss: f64,
    weights: [f64; 7],
    decays: [f64; 7],
    is_stealth: bool,
    is_kill: bool,
}

const CONTRACT_DECAYS: [f64; 7] = [0.0, 0.91, 0.91, 0.91, 0.91, 0.8, 0.9];

const fn contract_template(name: ContractName) -> LeveledTemplate {
    match name {
        ContractName::Tracking => LeveledTemplate {
            base_difficulty: 125.0,
            difficulty_factor: 1.02,
            reward_factor: 1.041,
            rank_gain: 0.3,
            rank_loss: 0.0,
            hp_loss: 0.5,
            weights: [0.0, 5.0, 5.0, 35.0, 35.0, 10.0, 10.0],
            decays: [0.0, 0.91, 0.91, 0.91, 0.91, 0.9, 1.0],
            is_stealth: true,
            is_kill: false,
            growth: (0.5, 7.5),
            initial_count: (25, 150),
        },
        ContractName::BountyHunter => LeveledTemplate {
            base_difficulty: 250.0,
            difficulty_factor: 1.04,
            reward_factor: 1.085,
            rank_gain: 0.9,
            rank_loss: 0.0,
            hp_loss: 1.0,
            weights: [0.0, 15.0, 15.0, 25.0, 25.0, 10.0, 10.0],
            decays: CONTRACT_DECAYS,
            is_stealth: false,
            is_kill: true,
            growth: (0.5, 7.5),
            initial_count: (5, 150),
        },
        ContractName::Retirement => LeveledTemplate {
            base_difficulty: 200.0,
            difficulty_factor: 1.03,
            reward_factor: 1.065,
            rank_gain: 0.6,
            rank_loss: 0.0,
            hp_loss: 1.0,
            weights: [0.0, 20.0, 20.0, 20.0, 20.0, 10.0, 10.0],
            decays: CONTRACT_DECAYS,
            is_stealth: false,
            is_kill: true,
            growth: (0.5, 7.5),
            initial_count: (5, 150),
        },
    }
}

const fn operation_template(name: OperationName) -> LeveledTemplate {
    match name {
        OperationName::Investigation => LeveledTemplate {
            base_difficulty: 400.0,
            difficulty_factor: 1.03,
            reward_factor: 1.07,
            rank_gain: 2.2,
            rank_loss: 0.2,
            hp_loss: 0.0,
            weights: [25.0, 5.0, 5.0, 20.0, 10.0, 25.0, 10.0],
            decays: [0.85, 0.9, 0.9, 0.9, 0.9, 0.7, 0.9],
            is_stealth: true,
            is_kill: false,
            growth: (1.0, 4.0),
            initial_count: (1, 100),
        },
        OperationName::Undercover => LeveledTemplate {
            base_difficulty: 500.0,
            difficulty_factor: 1.04,
            reward_factor: 1.09,
            rank_gain: 4.4,
            rank_loss: 0.4,
            hp_loss: 2.0,
            weights: [20.0, 5.0, 5.0, 20.0, 20.0, 20.0, 10.0],
            decays: [0.8, 0.9, 0.9, 0.9, 0.9, 0.7, 0.9],
            is_stealth: true,
            is_kill: false,
            growth: (1.0, 4.0),
            initial_count: (1, 100),
        },
        OperationName::Sting => LeveledTemplate {
            base_difficulty: 650.0,
            difficulty_factor: 1.04,
            reward_factor: 1.095,
            rank_gain: 5.5,
            rank_loss: 0.5,
            hp_loss: 2.5,
            weights: [25.0, 5.0, 5.0, 25.0, 10.0, 20.0, 10.0],
            decays: [0.8, 0.85, 0.85, 0.85, 0.85, 0.7, 0.9],
            is_stealth: true,
            is_kill: false,
            growth: (0.3, 4.0),
            initial_count: (1, 150),
        },
        OperationName::Raid => LeveledTemplate {
            base_difficulty: 800.0,
            difficulty_factor: 1.045,
            reward_factor: 1.1,
            rank_gain: 55.0,
            rank_loss: 2.5,
            hp_loss: 50.0,
            weights: [10.0, 20.0, 20.0, 20.0, 20.0, 0.0, 10.0],
            decays: [0.7, 0.8, 0.8, 0.8, 0.8, 0.0, 0.9],
            is_stealth: false,
            is_kill: true,
            growth: (0.2, 4.0),
            initial_count: (1, 150),
        },
        OperationName::StealthRetirement => LeveledTemplate {
            base_difficulty: 1000.0,
            difficulty_factor: 1.05,
            reward_factor: 1.11,
            rank_gain: 22.0,
            rank_loss: 2.0,
            hp_loss: 10.0,
            weights: [10.0, 10.0, 10.0, 30.0, 30.0, 0.0, 10.0],
            decays: [0.7, 0.8, 0.8, 0.8, 0.8, 0.0, 0.9],
            is_stealth: true,
            is_kill: true,
            growth: (0.1, 2.0),
            initial_count: (1, 150),
        },
        OperationName::Assassination => LeveledTemplate {
            base_difficulty: 1500.0,
            difficulty_factor: 1.06,
            reward_factor: 1.14,
            rank_gain: 44.0,
            rank_loss: 4.0,
            hp_loss: 5.0,
            weights: [10.0, 10.0, 10.0, 30.0, 30.0, 0.0, 10.0],
            decays: [0.6, 0.8, 0.8, 0.8, 0.8, 0.0, 0.8],
            is_stealth: true,
            is_kill: true,
            growth: (0.1, 2.0),
            initial_count: (1, 150),
        },
    }
}

const COMBAT_WEIGHTS: [f64; 7] = [10.0, 20.0, 20.0, 20.0, 20.0, 0.0, 10.0];
const STEALTH_WEIGHTS: [f64; 7] = [10.0, 15.0, 15.0, 25.0, 25.0, 0.0, 10.0];
const INFILTRATION_WEIGHTS: [f64; 7] = [20.0, 10.0, 10.0, 20.0, 20.0, 10.0, 10.0];
const BLACK_OP_DECAYS: [f64; 7] = [0.6, 0.8, 0.8, 0.8, 0.8, 0.75, 0.9];

/// Shorthand for a black-op row.
#[allow(clippy::too_many_arguments)]
const fn black_op(
    base_difficulty: f64,
    required_rank: f64,
    rank_gain: f64,
    rank_loss: f64,
    hp_loss: f64,
    weights: [f64; 7],
    is_stealth: bool,
    is_kill: bool,
) -> BlackOpTemplate {
    BlackOpTemplate {
        base_difficulty,
        required_rank,
        rank_gain,
        rank_loss,
        hp_loss,
        weights,
        decays: BLACK_OP_DECAYS,
        is_stealth,
        is_kill,
    }
}

#[rustfmt::skip]
const fn black_op_template(name: BlackOpName) -> BlackOpTemplate {
    match name {
        BlackOpName::Typhoon => black_op(2000.0, 2.5e3, 50.0, 10.0, 100.0, COMBAT_WEIGHTS, false, true),
        BlackOpName::Zero => black_op(2500.0, 5e3, 60.0, 15.0, 50.0, STEALTH_WEIGHTS, true, true),
        BlackOpName::X => black_op(3000.0, 7.5e3, 75.0, 15.0, 1000.0, COMBAT_WEIGHTS, false, true),
        BlackOpName::Titan => black_op(4000.0, 10e3, 100.0, 20.0, 100.0, INFILTRATION_WEIGHTS, true, false),
        BlackOpName::Ares => black_op(5000.0, 12.5e3, 125.0, 20.0, 200.0, COMBAT_WEIGHTS, false, true),
        BlackOpName::Archangel => black_op(7500.0, 15e3, 200.0, 20.0, 25.0, STEALTH_WEIGHTS, false, true),
        BlackOpName::Juggernaut => black_op(10e3, 20e3, 300.0, 40.0, 300.0, COMBAT_WEIGHTS, false, true),
        BlackOpName::RedDragon => black_op(12.5e3, 25e3, 500.0, 50.0, 500.0, COMBAT_WEIGHTS, false, true),
        BlackOpName::K => black_op(15e3, 30e3, 750.0, 60.0, 1000.0, INFILTRATION_WEIGHTS, false, true),
        BlackOpName::Deckard => black_op(20e3, 40e3, 1e3, 75.0, 200.0, STEALTH_WEIGHTS, false, true),
        BlackOpName::Tyrell => black_op(25e3, 50e3, 1.5e3, 100.0, 500.0, COMBAT_WEIGHTS, false, true),
        BlackOpName::Wallace => black_op(30e3, 75e3, 2e3, 150.0, 1500.0, COMBAT_WEIGHTS, false, true),
        BlackOpName::ShoulderOfOrion => {
            black_op(35e3, 100e3, 2.5e3, 500.0, 1500.0, STEALTH_WEIGHTS, true, false)
        }
        BlackOpName::Hyron => black_op(40e3, 125e3, 3e3, 1e3, 500.0, INFILTRATION_WEIGHTS, false, false),
        BlackOpName::Morpheus => black_op(45e3, 150e3, 4e3, 1e3, 100.0, INFILTRATION_WEIGHTS, true, false),
        BlackOpName::IonStorm => black_op(50e3, 175e3, 5e3, 1e3, 5000.0, COMBAT_WEIGHTS, false, true),
        BlackOpName::Annihilus => black_op(55e3, 200e3, 7.5e3, 1e3, 10e3, COMBAT_WEIGHTS, false, true),
        BlackOpName::Ultron => black_op(60e3, 250e3, 10e3, 2e3, 10e3, COMBAT_WEIGHTS, false, true),
        BlackOpName::Centurion => black_op(70e3, 300e3, 15e3, 5e3, 10e3, STEALTH_WEIGHTS, false, false),
        BlackOpName::Vindictus => black_op(75e3, 350e3, 20e3, 20e3, 20e3, STEALTH_WEIGHTS, false, false),
        BlackOpName::Daedalus => black_op(80e3, 400e3, 40e3, 10e3, 100e3, INFILTRATION_WEIGHTS, false, false),
    }
}

fn build_leveled(
    id: ActionId,
    template: &LeveledTemplate,
    rng: &mut impl Rng,
) -> Result<Action, ActionError> {
    let weights = ActionParams::normalize_weights(id, StatBlock::from_array(template.weights))?;
    let params = ActionParams {
        base_difficulty: template.base_difficulty,
        difficulty_factor: template.difficulty_factor,
        reward_factor: template.reward_factor,
        rank_gain: template.rank_gain,
        rank_loss: template.rank_loss,
        hp_loss: template.hp_loss,
        weights,
        decays: StatBlock::from_array(template.decays),
        is_stealth: template.is_stealth,
        is_kill: template.is_kill,
    };
    let (low, high) = template.initial_count;
    let count = f64::from(rng.random_range(low..=high));
    let progress = LevelProgress::new(count, template.growth.0, template.growth.1);
    let payload = match id {
        ActionId::Operation(_) => ActionPayload::Operation {
            progress,
            team_count: 0,
        },
        _ => ActionPayload::Contract(progress),
    };
    Ok(Action {
        id,
        params,
        payload,
    })
}

fn build_black_op(name: BlackOpName) -> Result<Action, ActionError> {
    let id = ActionId::BlackOp(name);
    let template = black_op_template(name);
    let weights = ActionParams::normalize_weights(id, StatBlock::from_array(template.weights))?;
    Ok(Action {
        id,
        params: ActionParams {
            base_difficulty: template.base_difficulty,
            difficulty_factor: 1.0,
            reward_factor: 1.0,
            rank_gain: template.rank_gain,
            rank_loss: template.rank_loss,
            hp_loss: template.hp_loss,
            weights,
            decays: StatBlock::from_array(template.decays),
            is_stealth: template.is_stealth,
            is_kill: template.is_kill,
        },
        payload: ActionPayload::BlackOp {
            team_count: 0,
            required_rank: template.required_rank,
            sequence: name.index(),
        },
    })
}

/// Every action a division can perform, keyed by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionCatalog {
    actions: BTreeMap<ActionId, Action>,
}

impl ActionCatalog {
    /// Build the standard catalog with random starting counts.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::MalformedWeights`] if a built-in weight table
    /// is broken.
    pub fn standard(rng: &mut impl Rng) -> Result<Self, ActionError> {
        let mut actions = BTreeMap::new();
        for name in ContractName::ALL {
            let id = ActionId::Contract(*name);
            actions.insert(id, build_leveled(id, &contract_template(*name), rng)?);
        }
        for name in OperationName::ALL {
            let id = ActionId::Operation(*name);
            actions.insert(id, build_leveled(id, &operation_template(*name), rng)?);
        }
        for name in BlackOpName::ALL {
            actions.insert(ActionId::BlackOp(*name), build_black_op(*name)?);
        }
        for name in GeneralAction::ALL {
            let id = ActionId::General(*name);
            actions.insert(
                id,
                Action {
                    id,
                    params: ActionParams::unrolled(1.0),
                    payload: ActionPayload::General,
                },
            );
        }
        Ok(Self { actions })
    }

    /// Look up an action.
    pub fn get(&self, id: ActionId) -> Result<&Action, ActionError> {
        self.actions
            .get(&id)
            .ok_or_else(|| ActionError::NotFound(id.name().to_owned()))
    }

    /// Look up an action mutably.
    pub fn get_mut(&mut self, id: ActionId) -> Result<&mut Action, ActionError> {
        self.actions
            .get_mut(&id)
            .ok_or_else(|| ActionError::NotFound(id.name().to_owned()))
    }

    /// Look up an action by display name across all categories.
    pub fn find(&self, name: &str) -> Result<&Action, ActionError> {
        ActionId::find(name)
            .ok_or_else(|| ActionError::NotFound(name.to_owned()))
            .and_then(|id| self.get(id))
    }

    /// Iterate every action in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    /// Iterate every action mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Action> {
        self.actions.values_mut()
    }

    /// Display names of one category in declaration order.
    pub fn names(kind: ActionKind) -> Vec<&'static str> {
        ActionId::all_of(kind).into_iter().map(ActionId::name).collect()
    }

    /// Number of black operations in the fixed sequence.
    pub const fn black_op_count() -> usize {
        BlackOpName::ALL.len()
    }
}
