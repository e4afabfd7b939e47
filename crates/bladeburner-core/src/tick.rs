//! Tick processor: turns host cycles into whole simulated seconds.
//!
//! Each call to [`Division::process`] stores the incoming cycles and, once
//! at least one second's worth has accumulated, runs these phases for up to
//! `max_seconds_per_update` seconds:
//!
//! 1. **Stamina** -- recompute max stamina and regenerate.
//! 2. **Counts** -- every contract and operation regrows a little.
//! 3. **World** -- passive chaos decay, the random-event countdown and the
//!    slow migration check.
//! 4. **Action** -- advance the current action's timer (plus any carried
//!    overflow), complete it, hand the outcome to the operative and restart
//!    it unless it was a black operation.
//! 5. **Automation** -- switch actions on stamina thresholds.
//!
//! Leftover cycles stay stored for the next call, which bounds the cost of
//! catching up after idle time. A run is deterministic given the same RNG.

use bladeburner_types::{ActionId, ActionOutcome, Operative};
use bladeburner_world::{
    CityMap, MigrationReport, RandomEvent, roll_random_event, trigger_potential_migration,
};
use rand::Rng;
use tracing::{debug, error, info};

use crate::division::Division;
use crate::error::DivisionError;
use crate::progression::Availability;

/// What one call to [`Division::process`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// Whole seconds simulated.
    pub seconds: u32,
    /// Outcome of the action completed during this update, if any.
    pub outcome: Option<ActionOutcome>,
    /// Random events that fired.
    pub events: Vec<RandomEvent>,
    /// Background migrations that moved population.
    pub migrations: Vec<MigrationReport>,
    /// Action started by automation.
    pub automation_switch: Option<ActionId>,
    /// Action stopped because stamina ran out or it could not repeat.
    pub cancelled: Option<ActionId>,
}

impl Division {
    /// Add host cycles without processing them.
    ///
    /// Negative and non-finite amounts are ignored.
    pub fn store_cycles(&mut self, cycles: f64) {
        if cycles.is_finite() && cycles > 0.0 {
            self.stored_cycles += cycles;
        }
    }

    /// Store `cycles` and simulate as many whole seconds as allowed.
    ///
    /// # Errors
    ///
    /// Propagates invariant failures from the formulas or the world model.
    /// The update is abandoned at the failing phase.
    pub fn process(
        &mut self,
        operative: &mut impl Operative,
        cycles: f64,
        rng: &mut impl Rng,
    ) -> Result<TickSummary, DivisionError> {
        self.store_cycles(cycles);
        let mut summary = TickSummary::default();

        if self.stamina <= 0.0
            && let Some(id) = self.current_action
        {
            info!(action = %id, "Action cancelled: stamina exhausted");
            self.log
                .push(format!("Your {id} action was cancelled because your stamina hit 0"));
            self.reset_action();
            summary.cancelled = Some(id);
        }

        let cycles_per_second = f64::from(self.balance.cycles_per_second.max(1));
        if self.stored_cycles < cycles_per_second {
            return Ok(summary);
        }
        let whole = (self.stored_cycles / cycles_per_second).floor();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let seconds = whole.min(f64::from(self.balance.max_seconds_per_update)) as u32;
        if seconds == 0 {
            return Ok(summary);
        }
        self.stored_cycles = f64::from(seconds)
            .mul_add(-cycles_per_second, self.stored_cycles)
            .max(0.0);
        summary.seconds = seconds;

        self.regenerate(&*operative, seconds);
        self.grow_counts(seconds, rng);
        self.advance_world(seconds, &mut summary, rng)?;
        self.advance_action(operative, seconds, &mut summary, rng)?;
        self.run_automation(&*operative, &mut summary)?;

        Ok(summary)
    }

    fn regenerate(&mut self, operative: &impl Operative, seconds: u32) {
        self.update_max_stamina(operative);
        let gain = self.stamina_gain_per_second(operative) * f64::from(seconds);
        self.change_stamina(gain);
    }

    fn grow_counts(&mut self, seconds: u32, rng: &mut impl Rng) {
        let period = self.balance.action_count_growth_period.max(1.0);
        for action in self.catalog.iter_mut() {
            if let Some(progress) = action.progress_mut() {
                let growth = progress.roll_growth(rng);
                progress.replenish(f64::from(seconds) * growth / period);
            }
        }
    }

    fn advance_world(
        &mut self,
        seconds: u32,
        summary: &mut TickSummary,
        rng: &mut impl Rng,
    ) -> Result<(), DivisionError> {
        self.cities
            .decay_chaos(self.events.chaos_decay_per_second * f64::from(seconds))?;

        if self.event_countdown.advance(seconds, rng) {
            let event = roll_random_event(&mut self.cities, rng)?;
            debug!(event = event.label(), "Random event fired");
            if !matches!(event, RandomEvent::Quiet) {
                self.log.push(format!("World event: {}", event.label()));
            }
            summary.events.push(event);
        }

        if self.migration_countdown.advance(seconds, rng) {
            let (source, _) = CityMap::pick_pair(rng);
            if let Some(report) =
                trigger_potential_migration(&mut self.cities, source, self.events.migration_chance, rng)?
            {
                self.record_migration(&report);
                summary.migrations.push(report);
            }
        }
        Ok(())
    }

    fn advance_action(
        &mut self,
        operative: &mut impl Operative,
        seconds: u32,
        summary: &mut TickSummary,
        rng: &mut impl Rng,
    ) -> Result<(), DivisionError> {
        let Some(id) = self.current_action else {
            return Ok(());
        };
        if self.timer.required <= 0.0 {
            error!(action = %id, required = self.timer.required, "Action timer was never set");
            return Err(DivisionError::TimerNotSet {
                action: id,
                required: self.timer.required,
            });
        }

        self.timer.elapsed += f64::from(seconds) + self.timer.overflow;
        self.timer.overflow = 0.0;
        if self.timer.elapsed < self.timer.required {
            return Ok(());
        }

        let overflow = self.timer.elapsed - self.timer.required;
        let outcome = self.complete_action(operative, id, rng)?;
        operative.apply_outcome(&outcome);
        summary.outcome = Some(outcome);

        if matches!(id, ActionId::BlackOp(_)) {
            return Ok(());
        }
        match self.availability(id)? {
            Availability::Available => self.begin(id, &*operative, overflow)?,
            Availability::Unavailable(reason) => {
                info!(action = %id, reason, "Action stopped");
                self.log.push(format!("{id} stopped: {reason}"));
                self.reset_action();
                summary.cancelled = Some(id);
            }
        }
        Ok(())
    }

    fn run_automation(
        &mut self,
        operative: &impl Operative,
        summary: &mut TickSummary,
    ) -> Result<(), DivisionError> {
        let Some(target) = self.automation.decide(self.stamina, self.current_action) else {
            return Ok(());
        };
        let result = self.start_action(target, operative)?;
        if result.started {
            info!(action = %target, stamina = self.stamina, "Automation switched action");
            self.log.push(format!("Automation switched to {target}"));
            summary.automation_switch = Some(target);
        } else {
            debug!(action = %target, message = %result.message, "Automation could not switch");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bladeburner_types::{BasicOperative, BlackOpName, ContractName, GeneralAction, StatBlock};
    use bladeburner_world::Countdown;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::automation::Automation;
    use crate::config::SimulationConfig;

    const TRACKING: ActionId = ActionId::Contract(ContractName::Tracking);
    const TRAINING: ActionId = ActionId::General(GeneralAction::Training);
    const REGEN: ActionId = ActionId::General(GeneralAction::RegenChamber);

    fn setup(stats: f64) -> (Division, BasicOperative, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(11);
        let operative = BasicOperative::new("Agent", StatBlock::uniform(stats), 1_000.0);
        let division = Division::new(&SimulationConfig::default(), &operative, &mut rng).unwrap();
        (division, operative, rng)
    }

    #[test]
    fn partial_second_is_stored() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        let summary = division.process(&mut operative, 4.0, &mut rng).unwrap();
        assert_eq!(summary.seconds, 0);
        assert!((division.stored_cycles() - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn catch_up_is_capped_per_update() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        let summary = division.process(&mut operative, 100.0, &mut rng).unwrap();
        assert_eq!(summary.seconds, 5);
        assert!((division.stored_cycles() - 75.0).abs() < f64::EPSILON);
        let summary = division.process(&mut operative, 0.0, &mut rng).unwrap();
        assert_eq!(summary.seconds, 5);
    }

    #[test]
    fn unset_timer_is_a_hard_error() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        division.start_action(TRAINING, &operative).unwrap();
        division.timer.required = 0.0;
        let result = division.process(&mut operative, 25.0, &mut rng);
        assert!(matches!(
            result,
            Err(DivisionError::TimerNotSet { action: TRAINING, .. })
        ));
    }

    #[test]
    fn negative_cycles_are_ignored() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        division.process(&mut operative, -50.0, &mut rng).unwrap();
        division.process(&mut operative, f64::NAN, &mut rng).unwrap();
        assert!(division.stored_cycles().abs() < f64::EPSILON);
    }

    #[test]
    fn general_action_completes_and_repeats() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        assert!(division.start_action(TRAINING, &operative).unwrap().started);
        let completed = (0..6)
            .filter(|_| division.process(&mut operative, 25.0, &mut rng).unwrap().outcome.is_some())
            .count();
        assert_eq!(completed, 1);
        assert_eq!(division.current_action(), Some(TRAINING));
        assert!(operative.experience.strength > 0.0);
        assert!(division.timer().elapsed.abs() < f64::EPSILON);
    }

    #[test]
    fn black_op_does_not_repeat() {
        let (mut division, mut operative, mut rng) = setup(1e7);
        division.change_rank(5_000.0, &operative);
        let typhoon = ActionId::BlackOp(BlackOpName::Typhoon);
        assert!(division.start_action(typhoon, &operative).unwrap().started);
        let mut finished = false;
        for _ in 0..1_000 {
            let summary = division.process(&mut operative, 25.0, &mut rng).unwrap();
            if summary.outcome.is_some() {
                finished = true;
                break;
            }
        }
        assert!(finished);
        assert!(division.current_action().is_none());
        assert_eq!(division.black_ops_completed(), 1);
    }

    #[test]
    fn exhausted_stamina_cancels_the_action() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        assert!(division.start_action(TRACKING, &operative).unwrap().started);
        division.stamina = 0.0;
        let summary = division.process(&mut operative, 0.0, &mut rng).unwrap();
        assert_eq!(summary.cancelled, Some(TRACKING));
        assert!(division.current_action().is_none());
        assert!(division.log_lines().any(|line| line.contains("stamina hit 0")));
    }

    #[test]
    fn automation_switches_on_low_stamina() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        assert!(division.start_action(TRACKING, &operative).unwrap().started);
        let threshold = division.max_stamina() * 2.0;
        division.set_automation(Automation {
            enabled: true,
            low_action: Some(REGEN),
            low_threshold: threshold,
            high_action: Some(TRACKING),
            high_threshold: threshold * 10.0,
        });
        let summary = division.process(&mut operative, 5.0, &mut rng).unwrap();
        assert_eq!(summary.automation_switch, Some(REGEN));
        assert_eq!(division.current_action(), Some(REGEN));
    }

    #[test]
    fn event_countdown_fires_once_and_resets_into_range() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        division.event_countdown = Countdown::from_parts(1, 48, 120).unwrap();
        let summary = division.process(&mut operative, 25.0, &mut rng).unwrap();
        assert_eq!(summary.events.len(), 1);
        assert!((48..=120).contains(&division.event_countdown().remaining()));
    }

    #[test]
    fn counts_regrow_while_idle() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        let before = division.action(TRACKING).unwrap().progress().unwrap().count;
        for _ in 0..20 {
            division.process(&mut operative, 25.0, &mut rng).unwrap();
        }
        let after = division.action(TRACKING).unwrap().progress().unwrap().count;
        assert!(after > before);
    }

    #[test]
    fn state_stays_clamped_over_a_long_run() {
        let (mut division, mut operative, mut rng) = setup(100.0);
        division.start_action(TRACKING, &operative).unwrap();
        for _ in 0..2_000 {
            division.process(&mut operative, 25.0, &mut rng).unwrap();
            assert!(division.stamina() >= 0.0);
            assert!(division.stamina() <= division.max_stamina());
            for city in division.cities().iter() {
                assert!(city.chaos() >= 0.0);
                assert!(city.population_estimate() >= 0.0);
            }
        }
    }
}
