//! The headless run loop.
//!
//! Feeds a fixed number of host cycles to the division per update until the
//! configured span of simulated time has passed, restarting the starting
//! action whenever the division goes idle and logging periodic summaries.

use bladeburner_core::{Division, RunConfig, TickSummary};
use bladeburner_types::{ActionId, BasicOperative};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Simulated seconds actually processed.
    pub seconds: u64,
    /// Updates fed to the division.
    pub updates: u64,
    /// Actions completed.
    pub completions: u64,
    /// Random events that fired.
    pub events: u64,
    /// Actions cancelled by stamina exhaustion or depletion.
    pub cancellations: u64,
    /// Updates that ended with the division idle.
    pub idle_updates: u64,
    /// Times the starting action became unavailable.
    pub stalls: u64,
}

/// Resolve and validate the run parameters.
pub fn starting_action(run: &RunConfig) -> Result<ActionId, EngineError> {
    if !run.cycles_per_update.is_finite() || run.cycles_per_update <= 0.0 {
        return Err(EngineError::InvalidRun {
            reason: format!("cycles_per_update must be positive, got {}", run.cycles_per_update),
        });
    }
    ActionId::find(&run.starting_action).ok_or_else(|| EngineError::UnknownAction {
        name: run.starting_action.clone(),
    })
}

/// Build the simulated operative.
pub fn operative(run: &RunConfig) -> BasicOperative {
    BasicOperative::new(
        run.operative.name.clone(),
        run.operative.stats,
        run.operative.max_hp,
    )
}

/// Run `division` for `run.simulated_seconds`.
pub fn run_division(
    division: &mut Division,
    operative: &mut BasicOperative,
    run: &RunConfig,
    rng: &mut impl Rng,
) -> Result<RunReport, EngineError> {
    let mut restarter = Restarter::new(starting_action(run)?);
    restarter.ensure_running(division, operative)?;

    let interval = run.summary_interval_seconds.max(1);
    let mut next_summary = interval;
    let mut report = RunReport::default();

    while report.seconds < run.simulated_seconds {
        let summary = division.process(operative, run.cycles_per_update, rng)?;
        record(&mut report, &summary);

        if division.current_action().is_none() && !restarter.ensure_running(division, operative)? {
            report.idle_updates = report.idle_updates.saturating_add(1);
        }
        report.stalls = restarter.stalls;

        if report.seconds >= next_summary {
            log_summary(division, operative, &report);
            next_summary = next_summary.saturating_add(interval);
        }
    }

    Ok(report)
}

fn record(report: &mut RunReport, summary: &TickSummary) {
    report.updates = report.updates.saturating_add(1);
    report.seconds = report.seconds.saturating_add(u64::from(summary.seconds));
    let events = u64::try_from(summary.events.len()).unwrap_or(u64::MAX);
    report.events = report.events.saturating_add(events);
    if let Some(outcome) = &summary.outcome {
        report.completions = report.completions.saturating_add(1);
        debug!(
            action = %outcome.action,
            success = ?outcome.success,
            reputation = outcome.reputation,
            money = outcome.net_money(),
            "Completion"
        );
    }
    if summary.cancelled.is_some() {
        report.cancellations = report.cancellations.saturating_add(1);
    }
    if let Some(switched) = summary.automation_switch {
        debug!(action = %switched, "Automation switched action");
    }
}

/// Keeps the starting action running. Each stretch of unavailability is
/// warned about once.
struct Restarter {
    action: ActionId,
    waiting: bool,
    stalls: u64,
}

impl Restarter {
    const fn new(action: ActionId) -> Self {
        Self {
            action,
            waiting: false,
            stalls: 0,
        }
    }

    /// Try to start the action. Returns whether it is now running.
    fn ensure_running(
        &mut self,
        division: &mut Division,
        operative: &BasicOperative,
    ) -> Result<bool, EngineError> {
        let action = self.action;
        let result = division.start_action(action, operative)?;
        if result.started {
            if self.waiting {
                info!(action = %action, "Starting action available again");
            } else {
                debug!(action = %action, "Starting action (re)started");
            }
            self.waiting = false;
        } else if self.waiting {
            debug!(action = %action, reason = %result.message, "Starting action still unavailable");
        } else {
            warn!(action = %action, reason = %result.message, "Starting action unavailable");
            self.waiting = true;
            self.stalls = self.stalls.saturating_add(1);
        }
        Ok(result.started)
    }
}

fn log_summary(division: &Division, operative: &BasicOperative, report: &RunReport) {
    let action = division
        .current_action_labels()
        .map_or("idle", |(_, name)| name);
    info!(
        seconds = report.seconds,
        action,
        rank = division.rank(),
        skill_points = division.skill_points(),
        stamina = division.stamina(),
        max_stamina = division.max_stamina(),
        team_size = division.team_size(),
        hp = operative.hp,
        money = operative.money,
        reputation = operative.reputation,
        completions = report.completions,
        "Division summary"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use bladeburner_core::{DivisionSnapshot, SimulationConfig};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn setup(run: &RunConfig) -> (Division, BasicOperative, SmallRng) {
        let mut rng = SmallRng::seed_from_u64(run.seed);
        let operative = operative(run);
        let division = Division::new(&SimulationConfig::default(), &operative, &mut rng).unwrap();
        (division, operative, rng)
    }

    #[test]
    fn runs_for_the_configured_span() {
        let run = RunConfig {
            simulated_seconds: 600,
            ..RunConfig::default()
        };
        let (mut division, mut operative, mut rng) = setup(&run);
        let report = run_division(&mut division, &mut operative, &run, &mut rng).unwrap();
        assert!(report.seconds >= 600);
        assert_eq!(report.updates, 600);
        assert!(report.completions > 0);
    }

    #[test]
    fn depleted_starting_action_stalls_once() {
        let run = RunConfig {
            simulated_seconds: 60,
            starting_action: "Tracking".to_owned(),
            ..RunConfig::default()
        };
        let (division, mut operative, mut rng) = setup(&run);
        let mut snapshot: DivisionSnapshot = division.snapshot();
        for record in &mut snapshot.actions {
            if record.action.name == "Tracking" {
                record.count = Some(0.0);
            }
        }
        let mut division =
            Division::restore(&snapshot, &SimulationConfig::default(), &operative, &mut rng).unwrap();

        let report = run_division(&mut division, &mut operative, &run, &mut rng).unwrap();
        assert_eq!(report.stalls, 1);
        assert_eq!(report.idle_updates, report.updates);
        assert_eq!(report.completions, 0);
    }

    #[test]
    fn unknown_starting_action_is_rejected() {
        let run = RunConfig {
            starting_action: "Smuggling".to_owned(),
            ..RunConfig::default()
        };
        assert!(matches!(
            starting_action(&run),
            Err(EngineError::UnknownAction { .. })
        ));
    }

    #[test]
    fn non_positive_cycles_are_rejected() {
        let run = RunConfig {
            cycles_per_update: 0.0,
            ..RunConfig::default()
        };
        assert!(matches!(
            starting_action(&run),
            Err(EngineError::InvalidRun { .. })
        ));
    }
}
