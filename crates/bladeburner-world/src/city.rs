//! City state with clamped primitive mutators.
//!
//! The true population is the source of truth. The estimate is what the
//! division believes; it only converges toward the true value through intel
//! gains, and snaps exactly onto it when a nudge would overshoot.
//!
//! Percentages are passed as percentages (`5.0` means 5 %), never as
//! multipliers.

use bladeburner_types::CityName;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{WorldError, ensure_finite};

/// Options for [`City::change_population_by_percentage`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationChange {
    /// Round a zero change up to one synthoid in the direction of the percentage.
    pub non_zero: bool,
    /// Apply the same absolute change to the estimate.
    pub move_estimate_equally: bool,
}

/// Mutable state of one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    name: CityName,
    population: u64,
    population_estimate: f64,
    communities: u32,
    chaos: f64,
}

impl City {
    /// Seed a city at division start.
    ///
    /// Population is drawn from `[threshold, 1.5 * threshold]`, the estimate
    /// is off by a factor in `[0.5, 1.5)`, and communities are drawn from
    /// `[5, 150]`. Chaos starts at zero.
    pub fn seeded(name: CityName, population_threshold: f64, rng: &mut impl Rng) -> Self {
        let threshold = population_threshold.clamp(0.0, 1e15);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (low, high) = (threshold as u64, (threshold * 1.5) as u64);
        let population = rng.random_range(low..=high.max(low));
        let error = rng.random::<f64>() + 0.5;
        let mut city = Self {
            name,
            population,
            population_estimate: 0.0,
            communities: rng.random_range(5..=150),
            chaos: 0.0,
        };
        city.population_estimate = city.population_f64() * error;
        city
    }

    /// Restore a city from persisted values, clamping each into range.
    pub fn from_parts(
        name: CityName,
        population: u64,
        population_estimate: f64,
        communities: u32,
        chaos: f64,
    ) -> Self {
        Self {
            name,
            population,
            population_estimate: clamp_non_negative(population_estimate),
            communities,
            chaos: clamp_non_negative(chaos),
        }
    }

    /// City name.
    pub const fn name(&self) -> CityName {
        self.name
    }

    /// True synthoid population.
    pub const fn population(&self) -> u64 {
        self.population
    }

    /// True population as a float, for formulas.
    #[allow(clippy::cast_precision_loss)]
    pub const fn population_f64(&self) -> f64 {
        self.population as f64
    }

    /// Intel estimate of the population.
    pub const fn population_estimate(&self) -> f64 {
        self.population_estimate
    }

    /// Known synthoid communities.
    pub const fn communities(&self) -> u32 {
        self.communities
    }

    /// Chaos level (never negative).
    pub const fn chaos(&self) -> f64 {
        self.chaos
    }

    /// Change the population by `delta` and the estimate by `estimate_delta`.
    pub fn change_population_by_count(
        &mut self,
        delta: i64,
        estimate_delta: f64,
    ) -> Result<(), WorldError> {
        let estimate_delta = ensure_finite("change_population_by_count", estimate_delta)?;
        self.population = self.population.saturating_add_signed(delta);
        self.population_estimate = clamp_non_negative(self.population_estimate + estimate_delta);
        Ok(())
    }

    /// Change the population by `percent` % and return the applied change.
    pub fn change_population_by_percentage(
        &mut self,
        percent: f64,
        options: PopulationChange,
    ) -> Result<i64, WorldError> {
        let percent = ensure_finite("change_population_by_percentage", percent)?;
        if percent.abs() < f64::EPSILON {
            return Ok(0);
        }
        let scaled = (self.population_f64() * (percent / 100.0)).round();
        #[allow(clippy::cast_possible_truncation)]
        let mut change = scaled as i64;
        if options.non_zero && change == 0 {
            change = if percent > 0.0 { 1 } else { -1 };
        }
        let before = self.population;
        self.population = self.population.saturating_add_signed(change);
        let applied = if change < 0 {
            0_i64.saturating_sub_unsigned(before.saturating_sub(self.population))
        } else {
            change
        };
        if options.move_estimate_equally {
            #[allow(clippy::cast_precision_loss)]
            let moved = applied as f64;
            self.population_estimate = clamp_non_negative(self.population_estimate + moved);
        }
        Ok(applied)
    }

    /// Move the estimate `amount` synthoids toward the true population.
    pub fn improve_population_estimate_by_count(&mut self, amount: f64) -> Result<(), WorldError> {
        let amount = ensure_finite("improve_population_estimate_by_count", amount)?.max(0.0);
        let truth = self.population_f64();
        if self.population_estimate < truth {
            self.population_estimate = (self.population_estimate + amount).min(truth);
        } else if self.population_estimate > truth {
            self.population_estimate = (self.population_estimate - amount).max(truth);
        }
        Ok(())
    }

    /// Move the estimate `percent` % of itself toward the true population.
    pub fn improve_population_estimate_by_percentage(
        &mut self,
        percent: f64,
    ) -> Result<(), WorldError> {
        let percent = ensure_finite("improve_population_estimate_by_percentage", percent)?.max(0.0);
        let truth = self.population_f64();
        if self.population_estimate < truth {
            // +1 lets an estimate of zero recover.
            let grown = (self.population_estimate + 1.0) * (1.0 + percent / 100.0);
            self.population_estimate = grown.min(truth);
        } else if self.population_estimate > truth {
            let shrunk = self.population_estimate * (1.0 - percent / 100.0);
            self.population_estimate = shrunk.max(truth);
        }
        Ok(())
    }

    /// Add `amount` chaos. Floors at zero.
    pub fn change_chaos_by_count(&mut self, amount: f64) -> Result<(), WorldError> {
        let amount = ensure_finite("change_chaos_by_count", amount)?;
        self.chaos = clamp_non_negative(self.chaos + amount);
        Ok(())
    }

    /// Change chaos by `percent` % of its current value. Floors at zero.
    pub fn change_chaos_by_percentage(&mut self, percent: f64) -> Result<(), WorldError> {
        let percent = ensure_finite("change_chaos_by_percentage", percent)?;
        self.chaos = clamp_non_negative(self.chaos.mul_add(percent / 100.0, self.chaos));
        Ok(())
    }

    /// Multiply chaos by `factor`. Floors at zero.
    pub fn scale_chaos(&mut self, factor: f64) -> Result<(), WorldError> {
        let factor = ensure_finite("scale_chaos", factor)?;
        self.chaos = clamp_non_negative(self.chaos * factor);
        Ok(())
    }

    /// Add one community.
    pub const fn add_community(&mut self) {
        self.communities = self.communities.saturating_add(1);
    }

    /// Remove one community. Returns `false` if there was none to remove.
    pub const fn remove_community(&mut self) -> bool {
        if self.communities == 0 {
            return false;
        }
        self.communities = self.communities.saturating_sub(1);
        true
    }

    /// Add synthoids without touching the estimate.
    pub(crate) const fn grow_population(&mut self, count: u64) {
        self.population = self.population.saturating_add(count);
    }

    /// Remove up to `count` synthoids without touching the estimate.
    /// Returns how many were actually removed.
    pub(crate) const fn shrink_population(&mut self, count: u64) -> u64 {
        let removed = if count > self.population {
            self.population
        } else {
            count
        };
        self.population = self.population.saturating_sub(removed);
        removed
    }
}

/// Clamp NaN and negatives to zero.
fn clamp_non_negative(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn city(population: u64, estimate: f64) -> City {
        City::from_parts(CityName::Sector12, population, estimate, 10, 0.0)
    }

    #[test]
    fn seeded_city_is_within_documented_ranges() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let c = City::seeded(CityName::Aevum, 1e9, &mut rng);
            assert!(c.population() >= 1_000_000_000);
            assert!(c.population() <= 1_500_000_000);
            assert!((5..=150).contains(&c.communities()));
            let ratio = c.population_estimate() / c.population_f64();
            assert!((0.5..1.5).contains(&ratio));
            assert!(c.chaos().abs() < f64::EPSILON);
        }
    }

    #[test]
    fn estimate_snaps_to_truth_instead_of_overshooting() {
        let mut c = city(1000, 990.0);
        c.improve_population_estimate_by_count(50.0).unwrap();
        assert!((c.population_estimate() - 1000.0).abs() < f64::EPSILON);

        let mut c = city(1000, 1500.0);
        c.improve_population_estimate_by_count(100.0).unwrap();
        assert!((c.population_estimate() - 1400.0).abs() < f64::EPSILON);
        c.improve_population_estimate_by_percentage(90.0).unwrap();
        assert!((c.population_estimate() - 1000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn estimate_recovers_from_zero() {
        let mut c = city(1000, 0.0);
        c.improve_population_estimate_by_percentage(10.0).unwrap();
        assert!(c.population_estimate() > 0.0);
    }

    #[test]
    fn percentage_change_respects_non_zero_floor() {
        let mut c = city(10, 10.0);
        let change = c
            .change_population_by_percentage(
                -0.1,
                PopulationChange {
                    non_zero: true,
                    move_estimate_equally: true,
                },
            )
            .unwrap();
        assert_eq!(change, -1);
        assert_eq!(c.population(), 9);
        assert!((c.population_estimate() - 9.0).abs() < f64::EPSILON);

        let change = c
            .change_population_by_percentage(-0.1, PopulationChange::default())
            .unwrap();
        assert_eq!(change, 0);
        assert_eq!(c.population(), 9);
    }

    #[test]
    fn population_never_underflows() {
        let mut c = city(3, 3.0);
        let change = c
            .change_population_by_percentage(
                -500.0,
                PopulationChange {
                    non_zero: true,
                    move_estimate_equally: true,
                },
            )
            .unwrap();
        assert_eq!(c.population(), 0);
        assert_eq!(change, -3);
        assert!(c.population_estimate().abs() < f64::EPSILON);
    }

    #[test]
    fn chaos_floors_at_zero() {
        let mut c = city(100, 100.0);
        c.change_chaos_by_count(5.0).unwrap();
        c.change_chaos_by_count(-10.0).unwrap();
        assert!(c.chaos().abs() < f64::EPSILON);
        c.change_chaos_by_count(10.0).unwrap();
        c.change_chaos_by_percentage(-200.0).unwrap();
        assert!(c.chaos().abs() < f64::EPSILON);
    }

    #[test]
    fn nan_is_rejected() {
        let mut c = city(100, 100.0);
        assert!(matches!(
            c.change_chaos_by_count(f64::NAN),
            Err(WorldError::NonFinite { .. })
        ));
        assert!(c.improve_population_estimate_by_percentage(f64::INFINITY).is_err());
    }

    #[test]
    fn communities_never_go_negative() {
        let mut c = City::from_parts(CityName::Ishima, 100, 100.0, 1, 0.0);
        assert!(c.remove_community());
        assert!(!c.remove_community());
        assert_eq!(c.communities(), 0);
    }
}
