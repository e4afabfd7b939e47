//! Tuned balance constants for the division engine.
//!
//! These are game-balance values and should be overridden only to
//! reproduce a different tuning, not "improved". The [`BalanceConfig`]
//! struct bundles every tunable so callers (tick processor, tests) can
//! override defaults. It is read from the `balance` section of
//! `bladeburner-config.yaml`.

use serde::{Deserialize, Serialize};

/// Every tuned constant used by the action engine and the progression rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Host cycles that make up one simulated second (default: 5).
    pub cycles_per_second: u32,

    /// Most simulated seconds processed by a single update (default: 5).
    ///
    /// Remaining cycles are kept for the next update, which bounds the
    /// cost of catching up after idle time.
    pub max_seconds_per_update: u32,

    /// Population at which the population factor equals 1 (default: 1e9).
    pub population_threshold: f64,

    /// Exponent of the population factor (default: 0.7).
    pub population_exponent: f64,

    /// Chaos above which difficulty rises (default: 50).
    pub chaos_threshold: f64,

    /// Divides difficulty to get base seconds (default: 10).
    pub difficulty_to_time_factor: f64,

    /// Exponent of the difficulty multiplier (default: 0.28).
    pub diff_mult_exponential_factor: f64,

    /// Linear divisor of the difficulty multiplier (default: 650).
    pub diff_mult_linear_factor: f64,

    /// Agility exponent in the time stat factor (default: 0.04).
    pub eff_agi_exponential_factor: f64,

    /// Dexterity exponent in the time stat factor (default: 0.035).
    pub eff_dex_exponential_factor: f64,

    /// Agility divisor in the time stat factor (default: 10000).
    pub eff_agi_linear_factor: f64,

    /// Dexterity divisor in the time stat factor (default: 10000).
    pub eff_dex_linear_factor: f64,

    /// Extra time multiplier for black operations (default: 1.5).
    pub black_op_time_penalty: f64,

    /// Weight of the intelligence bonus (default: 0.75).
    pub intelligence_bonus_weight: f64,

    /// Exponent of the intelligence bonus (default: 0.8).
    pub intelligence_bonus_exponent: f64,

    /// Exponent of the team-size bonus (default: 0.05).
    pub team_bonus_exponent: f64,

    /// Stamina lost per completion, times the difficulty multiplier (default: 0.285).
    pub base_stamina_loss: f64,

    /// Base stamina regained per second (default: 0.0085).
    pub stamina_gain_per_second: f64,

    /// Max stamina divisor in the regeneration bonus term (default: 70000).
    pub max_stamina_to_gain_factor: f64,

    /// Agility exponent of max stamina (default: 0.8).
    pub max_stamina_agility_exponent: f64,

    /// Agility exponent of stamina regeneration (default: 0.17).
    pub stamina_gain_agility_exponent: f64,

    /// Experience per second for non-intelligence stats (default: 1).
    pub base_stat_gain: f64,

    /// Experience per second for intelligence (default: 0.003).
    pub base_int_gain: f64,

    /// Seconds over which one unit of count growth accrues (default: 480).
    pub action_count_growth_period: f64,

    /// Reputation credited per rank gained (default: 2).
    pub rank_to_faction_rep_factor: f64,

    /// Contract successes per unlocked level (default: 3).
    pub contract_successes_per_level: f64,

    /// Operation successes per unlocked level (default: 2.5).
    pub operation_successes_per_level: f64,

    /// Ranks of max rank per skill point (default: 3).
    pub ranks_per_skill_point: f64,

    /// Money for a level-1 contract success (default: 250000).
    pub contract_base_money_gain: f64,

    /// Money charged per HP of damage on hospitalization (default: 100000).
    pub hospital_cost_per_hp: f64,

    /// Percent jitter applied to rank and HP changes (default: 10).
    pub reward_jitter_percent: f64,

    /// Base seconds for recruitment before the charisma discount (default: 300).
    pub base_recruitment_time: f64,

    /// Shortest recruitment in seconds (default: 10).
    pub min_recruitment_time: f64,

    /// Seconds for training and field analysis (default: 30).
    pub short_general_time: u32,

    /// Seconds for diplomacy, regeneration and inciting violence (default: 60).
    pub long_general_time: u32,

    /// Experience per training completion for each combat stat (default: 30).
    pub training_exp: f64,

    /// Persistent stamina bonus per training completion (default: 0.04).
    pub training_stamina_bonus: f64,

    /// Hacking and charisma experience per field analysis (default: 20).
    pub field_analysis_exp: f64,

    /// Rank gained per field analysis (default: 0.1).
    pub field_analysis_rank_gain: f64,

    /// HP restored per regeneration completion (default: 2).
    pub regen_hp_gain: f64,

    /// Percent of max stamina restored per regeneration completion (default: 1).
    pub regen_stamina_percent: f64,

    /// Chaos added to every city by inciting violence (default: 10).
    pub incite_chaos: f64,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            cycles_per_second: 5,
            max_seconds_per_update: 5,
            population_threshold: 1e9,
            population_exponent: 0.7,
            chaos_threshold: 50.0,
            difficulty_to_time_factor: 10.0,
            diff_mult_exponential_factor: 0.28,
            diff_mult_linear_factor: 650.0,
            eff_agi_exponential_factor: 0.04,
            eff_dex_exponential_factor: 0.035,
            eff_agi_linear_factor: 10e3,
            eff_dex_linear_factor: 10e3,
            black_op_time_penalty: 1.5,
            intelligence_bonus_weight: 0.75,
            intelligence_bonus_exponent: 0.8,
            team_bonus_exponent: 0.05,
            base_stamina_loss: 0.285,
            stamina_gain_per_second: 0.0085,
            max_stamina_to_gain_factor: 70000.0,
            max_stamina_agility_exponent: 0.8,
            stamina_gain_agility_exponent: 0.17,
            base_stat_gain: 1.0,
            base_int_gain: 0.003,
            action_count_growth_period: 480.0,
            rank_to_faction_rep_factor: 2.0,
            contract_successes_per_level: 3.0,
            operation_successes_per_level: 2.5,
            ranks_per_skill_point: 3.0,
            contract_base_money_gain: 250e3,
            hospital_cost_per_hp: 100e3,
            reward_jitter_percent: 10.0,
            base_recruitment_time: 300.0,
            min_recruitment_time: 10.0,
            short_general_time: 30,
            long_general_time: 60,
            training_exp: 30.0,
            training_stamina_bonus: 0.04,
            field_analysis_exp: 20.0,
            field_analysis_rank_gain: 0.1,
            regen_hp_gain: 2.0,
            regen_stamina_percent: 1.0,
            incite_chaos: 10.0,
        }
    }
}

impl BalanceConfig {
    /// `difficulty^0.28 + difficulty/650` with the configured factors.
    ///
    /// Scales stamina loss, HP damage and experience.
    pub fn difficulty_multiplier(&self, difficulty: f64) -> f64 {
        difficulty.max(0.0).powf(self.diff_mult_exponential_factor)
            + difficulty.max(0.0) / self.diff_mult_linear_factor
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config: BalanceConfig =
            serde_json::from_str(r#"{"chaos_threshold": 80.0}"#).unwrap();
        assert!((config.chaos_threshold - 80.0).abs() < f64::EPSILON);
        assert_eq!(config.cycles_per_second, 5);
        assert!((config.population_threshold - 1e9).abs() < 1.0);
    }

    #[test]
    fn difficulty_multiplier_grows_with_difficulty() {
        let config = BalanceConfig::default();
        let low = config.difficulty_multiplier(125.0);
        let high = config.difficulty_multiplier(1500.0);
        assert!(low > 1.0);
        assert!(high > low);
    }
}
