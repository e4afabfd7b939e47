//! Difficulty, time and success-chance formulas.
//!
//! Everything here is a pure function of an [`Action`], an [`EngineView`]
//! of the division state and the operative. Nothing is mutated; the only
//! randomness is the coin flip in [`attempt`].
//!
//! # Success chance
//!
//! ```text
//! competence = sum(weight[s] * (eff[s])^decay[s])
//!            * intelligence bonus * stamina penalty
//!            * team bonus * category skill multiplier
//!            * population factor (not black ops)
//!            * all/stealth/kill skill multipliers * operative multiplier
//! difficulty = base * factor^(level - 1) * chaos bonus (not black ops)
//! chance     = min(1, competence / difficulty)
//! ```

use bladeburner_types::{
    ActionId, GeneralAction, Operative, OperationName, SkillMultiplier, Stat, StatBlock,
};
use bladeburner_world::City;
use rand::Rng;
use tracing::warn;

use crate::action::Action;
use crate::config::BalanceConfig;
use crate::error::ActionError;
use crate::skills::SkillMultipliers;

/// Read-only view of the division state the formulas need.
#[derive(Debug, Clone, Copy)]
pub struct EngineView<'a> {
    /// Balance constants.
    pub balance: &'a BalanceConfig,
    /// Current skill multipliers.
    pub skills: &'a SkillMultipliers,
    /// Current stamina.
    pub stamina: f64,
    /// Current max stamina.
    pub max_stamina: f64,
    /// Roster size available for teams.
    pub team_size: u32,
    /// The division's current city.
    pub city: &'a City,
}

/// Operative stat levels scaled by the skill `eff*` multipliers.
pub fn effective_stats(skills: &SkillMultipliers, operative: &impl Operative) -> StatBlock {
    operative
        .stat_levels()
        .map(|stat, level| {
            // NaN passes through so the competence check can reject it.
            let level = if level < 0.0 { 0.0 } else { level };
            level * skills.get(SkillMultiplier::for_stat(stat))
        })
}

/// Difficulty of an action at its current level.
pub fn difficulty(action: &Action) -> f64 {
    match action.id {
        ActionId::Contract(_) | ActionId::Operation(_) => {
            let exponent = f64::from(action.level().saturating_sub(1));
            action.params.base_difficulty * action.params.difficulty_factor.powf(exponent)
        }
        ActionId::BlackOp(_) | ActionId::General(_) => action.params.base_difficulty,
    }
}

/// `1 + weight * int^exponent / 600`.
pub fn intelligence_bonus(balance: &BalanceConfig, intelligence: f64) -> f64 {
    1.0 + balance.intelligence_bonus_weight
        * intelligence.max(0.0).powf(balance.intelligence_bonus_exponent)
        / 600.0
}

/// 1 at full stamina, falling linearly once stamina drops below half.
pub fn stamina_penalty(view: &EngineView<'_>) -> f64 {
    if view.max_stamina <= 0.0 || view.stamina >= view.max_stamina {
        return 1.0;
    }
    (view.stamina.max(0.0) / (0.5 * view.max_stamina)).min(1.0)
}

/// `team^0.05` for the committed team clamped to the roster, else 1.
///
/// Shared by operations and black operations.
pub fn team_success_bonus(action: &Action, view: &EngineView<'_>) -> f64 {
    let team = action.team_count().min(view.team_size);
    if team == 0 {
        return 1.0;
    }
    f64::from(team).powf(view.balance.team_bonus_exponent)
}

/// The skill multiplier that applies to team missions.
///
/// Shared by operations and black operations.
pub fn operation_skill_bonus(action: &Action, view: &EngineView<'_>) -> f64 {
    if action.id.takes_team() {
        view.skills.get(SkillMultiplier::SuccessChanceOperation)
    } else {
        1.0
    }
}

/// `(population / threshold)^exponent`, using the estimate when `estimating`.
pub fn population_factor(view: &EngineView<'_>, estimating: bool) -> f64 {
    let population = if estimating {
        view.city.population_estimate()
    } else {
        view.city.population_f64()
    };
    (population.max(0.0) / view.balance.population_threshold).powf(view.balance.population_exponent)
}

/// `sqrt(1 + chaos - threshold)` above the chaos threshold, else 1.
pub fn chaos_difficulty_bonus(view: &EngineView<'_>) -> f64 {
    let chaos = view.city.chaos();
    if chaos > view.balance.chaos_threshold {
        (1.0 + chaos - view.balance.chaos_threshold).sqrt()
    } else {
        1.0
    }
}

/// Chance of success in `[0, 1]`.
///
/// General actions always succeed. A raid in a city with no communities
/// has zero chance.
///
/// # Errors
///
/// Returns [`ActionError::NonFinite`] if competence or difficulty is NaN
/// or infinite.
pub fn success_chance(
    action: &Action,
    view: &EngineView<'_>,
    operative: &impl Operative,
    estimating: bool,
) -> Result<f64, ActionError> {
    if matches!(action.id, ActionId::General(_)) {
        return Ok(1.0);
    }
    if action.id == ActionId::Operation(OperationName::Raid) && view.city.communities() == 0 {
        return Ok(0.0);
    }

    let eff = effective_stats(view.skills, operative);
    let params = &action.params;
    let mut competence: f64 = Stat::ALL
        .iter()
        .map(|s| params.weights.get(*s) * eff.get(*s).powf(params.decays.get(*s)))
        .sum();

    competence *= intelligence_bonus(view.balance, eff.intelligence);
    competence *= stamina_penalty(view);
    competence *= team_success_bonus(action, view);
    competence *= operation_skill_bonus(action, view);

    let mut scaled_difficulty = difficulty(action);
    if matches!(action.id, ActionId::Contract(_)) {
        competence *= view.skills.get(SkillMultiplier::SuccessChanceContract);
    }
    if !matches!(action.id, ActionId::BlackOp(_)) {
        competence *= population_factor(view, estimating);
        scaled_difficulty *= chaos_difficulty_bonus(view);
    }

    competence *= view.skills.get(SkillMultiplier::SuccessChanceAll);
    if params.is_stealth {
        competence *= view.skills.get(SkillMultiplier::SuccessChanceStealth);
    }
    if params.is_kill {
        competence *= view.skills.get(SkillMultiplier::SuccessChanceKill);
    }
    competence *= operative.multipliers().success_chance;

    if !competence.is_finite() {
        return Err(non_finite(action.id, "competence", competence));
    }
    if !scaled_difficulty.is_finite() || scaled_difficulty <= 0.0 {
        return Err(non_finite(action.id, "difficulty", scaled_difficulty));
    }
    Ok((competence / scaled_difficulty).clamp(0.0, 1.0))
}

fn non_finite(action: ActionId, quantity: &'static str, value: f64) -> ActionError {
    warn!(action = %action, quantity, value, "Non-finite formula result");
    ActionError::NonFinite {
        action,
        quantity,
        value,
    }
}

/// The `[low, high]` success band shown to the player.
///
/// The band is centred on the true chance and as wide as the gap between
/// the true and the estimated chance. It is then stretched by how far the
/// estimate is from the true population.
///
/// # Errors
///
/// Propagates [`success_chance`] errors.
pub fn estimated_range(
    action: &Action,
    view: &EngineView<'_>,
    operative: &impl Operative,
) -> Result<(f64, f64), ActionError> {
    let estimated = success_chance(action, view, operative, true)?;
    let real = success_chance(action, view, operative, false)?;
    let diff = (real - estimated).abs();
    let mut low = real - diff;
    let mut high = real + diff;

    let ratio = view.city.population_f64() / view.city.population_estimate();
    let ratio = if ratio.is_nan() { 0.0 } else { ratio };
    if ratio < 1.0 {
        low *= ratio;
    } else if high > 0.0 {
        high *= ratio;
    }
    Ok((low.clamp(0.0, 1.0), high.clamp(0.0, 1.0)))
}

/// Seconds an action takes, rounded up.
///
/// # Errors
///
/// Returns [`ActionError::NonFinite`] if the computed time is not finite.
pub fn action_time(
    action: &Action,
    view: &EngineView<'_>,
    operative: &impl Operative,
) -> Result<u32, ActionError> {
    let balance = view.balance;
    let eff = effective_stats(view.skills, operative);

    let seconds = match action.id {
        ActionId::General(general) => general_time(general, balance, eff.charisma),
        ActionId::Contract(_) | ActionId::Operation(_) | ActionId::BlackOp(_) => {
            let base = difficulty(action) / balance.difficulty_to_time_factor
                * view.skills.get(SkillMultiplier::ActionTime);
            let stat_factor = 0.5
                * (eff.agility.powf(balance.eff_agi_exponential_factor)
                    + eff.dexterity.powf(balance.eff_dex_exponential_factor)
                    + eff.agility / balance.eff_agi_linear_factor
                    + eff.dexterity / balance.eff_dex_linear_factor);
            let penalty = if matches!(action.id, ActionId::BlackOp(_)) {
                balance.black_op_time_penalty
            } else {
                1.0
            };
            (base / stat_factor).max(1.0) * penalty
        }
    };

    if !seconds.is_finite() {
        return Err(non_finite(action.id, "action time", seconds));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let whole = seconds.ceil().clamp(1.0, f64::from(u32::MAX)) as u32;
    Ok(whole)
}

fn general_time(action: GeneralAction, balance: &BalanceConfig, charisma: f64) -> f64 {
    match action {
        GeneralAction::Training | GeneralAction::FieldAnalysis => f64::from(balance.short_general_time),
        GeneralAction::Recruitment => recruitment_time(balance, charisma),
        GeneralAction::Diplomacy | GeneralAction::RegenChamber | GeneralAction::InciteViolence => {
            f64::from(balance.long_general_time)
        }
    }
}

/// `max(10, round(300 - (cha^0.81 + cha/90)))`.
pub fn recruitment_time(balance: &BalanceConfig, charisma: f64) -> f64 {
    let charisma = charisma.max(0.0);
    let discount = charisma.powf(0.81) + charisma / 90.0;
    (balance.base_recruitment_time - discount)
        .round()
        .max(balance.min_recruitment_time)
}

/// `cha^0.45 / (team_size + 1)`, clamped to `[0, 1]`.
pub fn recruitment_chance(charisma: f64, team_size: u32) -> f64 {
    (charisma.max(0.0).powf(0.45) / (f64::from(team_size) + 1.0)).clamp(0.0, 1.0)
}

/// Chaos multiplier applied by diplomacy: `(100 - (cha^0.045 + cha/1000)) / 100`.
pub fn diplomacy_effectiveness(charisma: f64) -> f64 {
    let charisma = charisma.max(0.0);
    ((100.0 - (charisma.powf(0.045) + charisma / 1000.0)) / 100.0).clamp(0.0, 1.0)
}

/// Percent estimate improvement from one field analysis.
#[allow(clippy::suboptimal_flops)]
pub fn field_analysis_effectiveness(eff: &StatBlock, analysis_multiplier: f64) -> f64 {
    (0.04 * eff.hacking.powf(0.3)
        + 0.04 * eff.intelligence.powf(0.9)
        + 0.02 * eff.charisma.powf(0.3))
        * analysis_multiplier
}

/// One weighted coin flip against [`success_chance`].
///
/// # Errors
///
/// Propagates [`success_chance`] errors.
pub fn attempt(
    action: &Action,
    view: &EngineView<'_>,
    operative: &impl Operative,
    rng: &mut impl Rng,
) -> Result<bool, ActionError> {
    let chance = success_chance(action, view, operative, false)?;
    Ok(rng.random::<f64>() < chance)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use bladeburner_types::{BasicOperative, BlackOpName, CityName, ContractName};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::catalog::ActionCatalog;
    use crate::skills::SkillCatalog;

    struct Fixture {
        balance: BalanceConfig,
        skills: SkillMultipliers,
        city: City,
        catalog: ActionCatalog,
    }

    impl Fixture {
        fn new() -> Self {
            let mut rng = SmallRng::seed_from_u64(23);
            Self {
                balance: BalanceConfig::default(),
                skills: SkillMultipliers::recompute(&SkillCatalog::standard(), &BTreeMap::new()),
                city: City::from_parts(CityName::Sector12, 1_000_000, 1_000_000.0, 10, 0.0),
                catalog: ActionCatalog::standard(&mut rng).unwrap(),
            }
        }

        fn view(&self) -> EngineView<'_> {
            EngineView {
                balance: &self.balance,
                skills: &self.skills,
                stamina: 100.0,
                max_stamina: 100.0,
                team_size: 0,
                city: &self.city,
            }
        }
    }

    fn agile_operative() -> BasicOperative {
        let mut levels = StatBlock::uniform(1.0);
        levels.agility = 100.0;
        BasicOperative::new("Agent", levels, 10.0)
    }

    #[test]
    fn tracking_chance_is_strictly_between_zero_and_one() {
        let fx = Fixture::new();
        let tracking = fx.catalog.get(ActionId::Contract(ContractName::Tracking)).unwrap();
        let chance = success_chance(tracking, &fx.view(), &agile_operative(), false).unwrap();
        assert!(chance > 0.0);
        assert!(chance < 1.0);
    }

    #[test]
    fn every_action_chance_is_bounded() {
        let fx = Fixture::new();
        let strong = BasicOperative::new("Strong", StatBlock::uniform(1e7), 10.0);
        for action in fx.catalog.iter() {
            for operative in [&agile_operative(), &strong] {
                let chance = success_chance(action, &fx.view(), operative, false).unwrap();
                assert!((0.0..=1.0).contains(&chance), "{} gave {chance}", action.id);
            }
        }
    }

    #[test]
    fn raid_without_communities_is_impossible() {
        let mut fx = Fixture::new();
        fx.city = City::from_parts(CityName::Sector12, 1_000_000_000, 1e9, 0, 0.0);
        let raid = fx.catalog.get(ActionId::Operation(OperationName::Raid)).unwrap();
        let strong = BasicOperative::new("Strong", StatBlock::uniform(1e7), 10.0);
        assert!(success_chance(raid, &fx.view(), &strong, false).unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn chaos_only_hurts_non_black_ops() {
        let mut fx = Fixture::new();
        let op = agile_operative();
        let tracking_id = ActionId::Contract(ContractName::Tracking);
        let typhoon_id = ActionId::BlackOp(BlackOpName::Typhoon);
        let calm_tracking = success_chance(fx.catalog.get(tracking_id).unwrap(), &fx.view(), &op, false).unwrap();
        let calm_typhoon = success_chance(fx.catalog.get(typhoon_id).unwrap(), &fx.view(), &op, false).unwrap();

        fx.city = City::from_parts(CityName::Sector12, 1_000_000, 1_000_000.0, 10, 150.0);
        let chaotic_tracking = success_chance(fx.catalog.get(tracking_id).unwrap(), &fx.view(), &op, false).unwrap();
        let chaotic_typhoon = success_chance(fx.catalog.get(typhoon_id).unwrap(), &fx.view(), &op, false).unwrap();

        assert!(chaotic_tracking < calm_tracking);
        assert!((chaotic_typhoon - calm_typhoon).abs() < f64::EPSILON);
    }

    #[test]
    fn nan_stats_are_a_hard_error() {
        let fx = Fixture::new();
        let op = BasicOperative::new("Broken", StatBlock::uniform(f64::NAN), 10.0);
        let tracking = fx.catalog.get(ActionId::Contract(ContractName::Tracking)).unwrap();
        assert!(matches!(
            success_chance(tracking, &fx.view(), &op, false),
            Err(ActionError::NonFinite { quantity: "competence", .. })
        ));
    }

    #[test]
    fn estimated_range_brackets_true_chance() {
        let mut fx = Fixture::new();
        fx.city = City::from_parts(CityName::Sector12, 1_000_000_000, 800_000_000.0, 10, 0.0);
        let op = agile_operative();
        let tracking = fx.catalog.get(ActionId::Contract(ContractName::Tracking)).unwrap();
        let (low, high) = estimated_range(tracking, &fx.view(), &op).unwrap();
        let real = success_chance(tracking, &fx.view(), &op, false).unwrap();
        assert!(low <= real);
        assert!(real <= high);
        assert!(high > low);
    }

    #[test]
    fn zero_estimate_opens_the_band_to_certainty() {
        let mut fx = Fixture::new();
        fx.city = City::from_parts(CityName::Sector12, 1_000_000_000, 0.0, 10, 0.0);
        let op = agile_operative();
        let tracking = fx.catalog.get(ActionId::Contract(ContractName::Tracking)).unwrap();
        let real = success_chance(tracking, &fx.view(), &op, false).unwrap();
        assert!(real > 0.0);
        let (low, high) = estimated_range(tracking, &fx.view(), &op).unwrap();
        assert!(low.abs() < f64::EPSILON);
        assert!((high - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_city_with_no_estimate_stays_finite() {
        let mut fx = Fixture::new();
        fx.city = City::from_parts(CityName::Sector12, 0, 0.0, 10, 0.0);
        let op = agile_operative();
        let tracking = fx.catalog.get(ActionId::Contract(ContractName::Tracking)).unwrap();
        let (low, high) = estimated_range(tracking, &fx.view(), &op).unwrap();
        assert!(low.abs() < f64::EPSILON);
        assert!(high.abs() < f64::EPSILON);
    }

    #[test]
    fn team_bonus_is_clamped_to_roster() {
        let fx = Fixture::new();
        let mut raid = fx.catalog.get(ActionId::Operation(OperationName::Raid)).unwrap().clone();
        raid.set_team_count(50);
        let mut view = fx.view();
        assert!((team_success_bonus(&raid, &view) - 1.0).abs() < f64::EPSILON);
        view.team_size = 32;
        let expected = 32_f64.powf(0.05);
        assert!((team_success_bonus(&raid, &view) - expected).abs() < 1e-12);
    }

    #[test]
    fn action_time_rounds_up_and_penalizes_black_ops() {
        let fx = Fixture::new();
        let op = agile_operative();
        let tracking = fx.catalog.get(ActionId::Contract(ContractName::Tracking)).unwrap();
        let seconds = action_time(tracking, &fx.view(), &op).unwrap();
        assert!(seconds >= 1);

        let training = fx.catalog.get(ActionId::General(GeneralAction::Training)).unwrap();
        assert_eq!(action_time(training, &fx.view(), &op).unwrap(), 30);

        let typhoon = fx.catalog.get(ActionId::BlackOp(BlackOpName::Typhoon)).unwrap();
        let typhoon_seconds = action_time(typhoon, &fx.view(), &op).unwrap();
        assert!(typhoon_seconds > seconds);
    }

    #[test]
    fn recruitment_time_has_a_floor() {
        let balance = BalanceConfig::default();
        assert!((recruitment_time(&balance, 0.0) - 300.0).abs() < f64::EPSILON);
        assert!((recruitment_time(&balance, 1e9) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recruitment_chance_drops_with_roster_size() {
        assert!(recruitment_chance(100.0, 0) > recruitment_chance(100.0, 10));
        assert!(recruitment_chance(1e9, 0) <= 1.0);
    }

    #[test]
    fn diplomacy_reduces_chaos_factor_with_charisma() {
        let weak = diplomacy_effectiveness(1.0);
        let strong = diplomacy_effectiveness(10_000.0);
        assert!(weak < 1.0);
        assert!(strong < weak);
        assert!(strong >= 0.0);
    }
}
