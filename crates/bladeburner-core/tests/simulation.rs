//! Long-running properties of the division engine.
//!
//! These drive a [`Division`] through its public surface only, the way the
//! engine binary or a script console would, and check the invariants that
//! must hold after any sequence of updates.

#![allow(clippy::unwrap_used)]

use bladeburner_core::{Division, DivisionSnapshot, SimulationConfig};
use bladeburner_types::{
    ActionId, ActionKind, BasicOperative, BlackOpName, CityName, ContractName, GeneralAction,
    OperationName, SkillName, StatBlock,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;

const TRACKING: ActionId = ActionId::Contract(ContractName::Tracking);
const RAID: ActionId = ActionId::Operation(OperationName::Raid);
const TYPHOON: ActionId = ActionId::BlackOp(BlackOpName::Typhoon);

fn operative(stat: f64) -> BasicOperative {
    BasicOperative::new("Agent", StatBlock::uniform(stat), 100.0)
}

fn division(seed: u64, operative: &BasicOperative) -> (Division, SmallRng) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let division = Division::new(&SimulationConfig::default(), operative, &mut rng).unwrap();
    (division, rng)
}

fn every_action() -> Vec<ActionId> {
    [
        ActionKind::Contract,
        ActionKind::Operation,
        ActionKind::BlackOp,
        ActionKind::General,
    ]
    .into_iter()
    .flat_map(ActionId::all_of)
    .collect()
}

fn assert_invariants(division: &Division) {
    assert!(division.rank() >= 0.0);
    assert!(division.max_rank() >= division.rank());
    assert!(division.stamina() >= 0.0);
    assert!(division.stamina() <= division.max_stamina());
    assert!(division.black_ops_completed() <= 21);
    for city in division.cities().iter() {
        assert!(city.chaos() >= 0.0, "{} chaos", city.name());
        assert!(city.population_estimate() >= 0.0, "{} estimate", city.name());
    }
    for action in division.catalog().iter() {
        if let Some(progress) = action.progress() {
            assert!(progress.count >= 0.0, "{} count", action.id);
            assert!(progress.level >= 1);
            assert!(progress.level <= progress.max_level);
        }
        assert!(action.team_count() <= division.team_size());
    }
}

#[test]
fn success_chance_stays_in_unit_interval() {
    let weak = operative(1.0);
    let strong = operative(1e6);
    for agent in [&weak, &strong] {
        let (division, _) = division(1, agent);
        for id in every_action() {
            let chance = division.success_chance(id, agent).unwrap();
            assert!((0.0..=1.0).contains(&chance), "{id}: {chance}");
            let (low, high) = division.estimated_range(id, agent).unwrap();
            assert!(low <= high, "{id}: {low} > {high}");
        }
    }
}

#[test]
fn raid_without_communities_never_succeeds() {
    let agent = operative(1e6);
    let (mut division, _) = division(2, &agent);
    let city = division.current_city_name();
    let target = division.cities_mut().city_mut(city).unwrap();
    while target.remove_community() {}
    let chance = division.success_chance(RAID, &agent).unwrap();
    assert!(chance.abs() < f64::EPSILON);
    let result = division.start_action(RAID, &agent).unwrap();
    assert!(!result.started);
    assert!(division.current_action().is_none());
}

#[test]
fn long_run_keeps_every_value_in_range() {
    let mut agent = operative(150.0);
    let (mut division, mut rng) = division(3, &agent);
    for next in every_action().into_iter().cycle().take(24) {
        division.start_action(next, &agent).unwrap();
        for _ in 0..25 {
            division.process(&mut agent, 25.0, &mut rng).unwrap();
            assert_invariants(&division);
        }
    }
}

#[test]
fn max_rank_never_decreases() {
    let mut agent = operative(20.0);
    let (mut division, mut rng) = division(4, &agent);
    division.change_rank(50.0, &agent);
    division
        .start_action(ActionId::Operation(OperationName::Assassination), &agent)
        .unwrap();
    let mut peak = division.max_rank();
    for _ in 0..400 {
        division.process(&mut agent, 25.0, &mut rng).unwrap();
        assert!(division.max_rank() >= peak);
        peak = division.max_rank();
        if division.current_action().is_none() {
            division.start_action(TRACKING, &agent).unwrap();
        }
    }
}

#[test]
fn skill_multipliers_are_a_pure_function_of_levels() {
    let agent = operative(100.0);
    let (mut division, _) = division(5, &agent);
    division.change_rank(500.0, &agent);
    division.upgrade_skill(SkillName::BladesIntuition, 3).unwrap();
    division.upgrade_skill(SkillName::Overclock, 2).unwrap();
    let first = division.skill_multipliers().clone();

    let json = division.snapshot().to_json().unwrap();
    let snapshot = DivisionSnapshot::from_json(&json).unwrap();
    let mut rng = SmallRng::seed_from_u64(99);
    let restored =
        Division::restore(&snapshot, &SimulationConfig::default(), &agent, &mut rng).unwrap();
    assert_eq!(restored.skill_multipliers(), &first);
}

#[test]
fn same_seed_same_history() {
    let run = |seed: u64| {
        let mut agent = operative(120.0);
        let (mut division, mut rng) = division(seed, &agent);
        division.start_action(TRACKING, &agent).unwrap();
        let summaries = (0..300)
            .map(|_| division.process(&mut agent, 25.0, &mut rng).unwrap())
            .collect::<Vec<_>>();
        (division, agent, summaries)
    };
    let (a, agent_a, summaries_a) = run(11);
    let (b, agent_b, summaries_b) = run(11);
    assert_eq!(summaries_a, summaries_b);
    assert_eq!(a, b);
    assert_eq!(agent_a, agent_b);
}

#[test]
fn black_op_gate_leaves_division_untouched() {
    let agent = operative(100.0);
    let (mut division, _) = division(6, &agent);
    division.start_action(TRACKING, &agent).unwrap();
    let before = division.clone();
    let result = division.start_action(TYPHOON, &agent).unwrap();
    assert!(!result.started);
    assert_eq!(division, before);
    assert_eq!(division.current_action(), Some(TRACKING));

    let zero = ActionId::BlackOp(BlackOpName::Zero);
    division.change_rank(1e6, &agent);
    let result = division.start_action(zero, &agent).unwrap();
    assert!(!result.started);
    assert!(division.start_action(TYPHOON, &agent).unwrap().started);
}

#[test]
fn random_events_keep_arriving() {
    let mut agent = operative(100.0);
    let (mut division, mut rng) = division(7, &agent);
    division
        .start_action(ActionId::General(GeneralAction::Training), &agent)
        .unwrap();
    let fired = (0..2_000)
        .map(|_| division.process(&mut agent, 25.0, &mut rng).unwrap())
        .filter(|summary| !summary.events.is_empty())
        .count();
    assert!(fired >= 80, "only {fired} events in 10000 seconds");
    let remaining = division.event_countdown().remaining();
    assert!((1..=120).contains(&remaining));
}

#[test]
fn snapshot_survives_a_round_trip_mid_action() {
    let mut agent = operative(150.0);
    let (mut division, mut rng) = division(8, &agent);
    division.switch_city(CityName::Chongqing);
    division.start_action(TRACKING, &agent).unwrap();
    for _ in 0..37 {
        division.process(&mut agent, 13.0, &mut rng).unwrap();
    }
    let json = division.snapshot().to_json().unwrap();
    let restored = Division::restore(
        &DivisionSnapshot::from_json(&json).unwrap(),
        &SimulationConfig::default(),
        &agent,
        &mut rng,
    )
    .unwrap();

    assert_eq!(restored.current_city_name(), CityName::Chongqing);
    assert_eq!(restored.current_action(), Some(TRACKING));
    assert_eq!(restored.black_ops_completed(), division.black_ops_completed());
    assert_eq!(restored.team_size(), division.team_size());
    assert!((restored.timer().elapsed - division.timer().elapsed).abs() < 1e-9);
    assert!((restored.stored_cycles() - division.stored_cycles()).abs() < 1e-9);
    assert_invariants(&restored);
}
