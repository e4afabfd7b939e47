//! The owned set of all six cities.
//!
//! A [`CityMap`] always contains every [`CityName`]. Constructors enforce
//! this so lookups by name can only fail on a corrupted map.

use std::collections::BTreeMap;

use bladeburner_types::CityName;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::city::City;
use crate::error::WorldError;

/// All six cities keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityMap {
    cities: BTreeMap<CityName, City>,
}

impl CityMap {
    /// Seed every city with a fresh random population, estimate and community count.
    pub fn seeded(population_threshold: f64, rng: &mut impl Rng) -> Self {
        let cities = CityName::ALL
            .iter()
            .map(|name| (*name, City::seeded(*name, population_threshold, rng)))
            .collect();
        Self { cities }
    }

    /// Build a map from restored cities.
    ///
    /// Cities missing from `cities` are filled with an empty placeholder
    /// (zero population and communities) so the map stays complete.
    pub fn from_cities(cities: impl IntoIterator<Item = City>) -> Result<Self, WorldError> {
        let mut map = BTreeMap::new();
        for city in cities {
            let name = city.name();
            if map.insert(name, city).is_some() {
                return Err(WorldError::DuplicateCity(name));
            }
        }
        for name in CityName::ALL {
            map.entry(*name)
                .or_insert_with(|| City::from_parts(*name, 0, 0.0, 0, 0.0));
        }
        Ok(Self { cities: map })
    }

    /// Look up a city.
    pub fn city(&self, name: CityName) -> Result<&City, WorldError> {
        self.cities.get(&name).ok_or(WorldError::CityNotFound(name))
    }

    /// Look up a city mutably.
    pub fn city_mut(&mut self, name: CityName) -> Result<&mut City, WorldError> {
        self.cities
            .get_mut(&name)
            .ok_or(WorldError::CityNotFound(name))
    }

    /// Iterate cities in name order.
    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.values()
    }

    /// Iterate cities mutably in name order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut City> {
        self.cities.values_mut()
    }

    /// Reduce every city's chaos by `amount`, flooring at zero.
    pub fn decay_chaos(&mut self, amount: f64) -> Result<(), WorldError> {
        for city in self.cities.values_mut() {
            city.change_chaos_by_count(-amount.abs())?;
        }
        Ok(())
    }

    /// Pick a random city and a different random city.
    pub fn pick_pair(rng: &mut impl Rng) -> (CityName, CityName) {
        let source = CityName::ALL
            .choose(rng)
            .copied()
            .unwrap_or(CityName::Sector12);
        (source, Self::pick_other(source, rng))
    }

    /// A random city other than `source`.
    pub fn pick_other(source: CityName, rng: &mut impl Rng) -> CityName {
        let others: Vec<CityName> = CityName::ALL
            .iter()
            .copied()
            .filter(|c| *c != source)
            .collect();
        others.choose(rng).copied().unwrap_or(source)
    }

    /// Move up to `count` synthoids from `source` to `destination`.
    ///
    /// Estimates are left alone. Returns the number actually moved.
    pub fn transfer_population(
        &mut self,
        source: CityName,
        destination: CityName,
        count: u64,
    ) -> Result<u64, WorldError> {
        let moved = self.city_mut(source)?.shrink_population(count);
        self.city_mut(destination)?.grow_population(moved);
        Ok(moved)
    }

    /// Sum of true populations across all cities.
    pub fn total_population(&self) -> u64 {
        self.cities
            .values()
            .fold(0_u64, |acc, c| acc.saturating_add(c.population()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn seeded_map_has_every_city() {
        let mut rng = SmallRng::seed_from_u64(1);
        let map = CityMap::seeded(1e9, &mut rng);
        assert_eq!(map.iter().count(), 6);
        for name in CityName::ALL {
            assert_eq!(map.city(*name).unwrap().name(), *name);
        }
    }

    #[test]
    fn from_cities_fills_gaps_and_rejects_duplicates() {
        let one = City::from_parts(CityName::Volhaven, 5, 5.0, 1, 2.0);
        let map = CityMap::from_cities([one.clone()]).unwrap();
        assert_eq!(map.iter().count(), 6);
        assert_eq!(map.city(CityName::Volhaven).unwrap(), &one);
        assert_eq!(map.city(CityName::Aevum).unwrap().population(), 0);

        let err = CityMap::from_cities([one.clone(), one]).unwrap_err();
        assert_eq!(err, WorldError::DuplicateCity(CityName::Volhaven));
    }

    #[test]
    fn pairs_are_always_distinct() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..500 {
            let (a, b) = CityMap::pick_pair(&mut rng);
            assert_ne!(a, b);
            assert_ne!(CityMap::pick_other(a, &mut rng), a);
        }
    }

    #[test]
    fn transfer_conserves_population() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut map = CityMap::seeded(1e9, &mut rng);
        let before = map.total_population();
        let moved = map
            .transfer_population(CityName::Aevum, CityName::Ishima, 12_345)
            .unwrap();
        assert_eq!(moved, 12_345);
        assert_eq!(map.total_population(), before);
    }

    #[test]
    fn decay_never_goes_negative() {
        let mut rng = SmallRng::seed_from_u64(9);
        let mut map = CityMap::seeded(1e9, &mut rng);
        map.decay_chaos(5.0).unwrap();
        assert!(map.iter().all(|c| c.chaos().abs() < f64::EPSILON));
    }
}
