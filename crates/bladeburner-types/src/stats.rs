//! A value per operative stat.
//!
//! [`StatBlock`] is reused for operative levels, action weights, decay
//! exponents and experience deltas. It is a plain struct of seven `f64`s so
//! it stays `Copy` and serializes with readable field names.

use serde::{Deserialize, Serialize};

use crate::enums::Stat;

/// One `f64` per [`Stat`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatBlock {
    /// Hacking.
    pub hacking: f64,
    /// Strength.
    pub strength: f64,
    /// Defense.
    pub defense: f64,
    /// Dexterity.
    pub dexterity: f64,
    /// Agility.
    pub agility: f64,
    /// Charisma.
    pub charisma: f64,
    /// Intelligence.
    pub intelligence: f64,
}

impl StatBlock {
    /// All zeros.
    pub const ZERO: Self = Self::uniform(0.0);

    /// Every stat set to `value`.
    pub const fn uniform(value: f64) -> Self {
        Self {
            hacking: value,
            strength: value,
            defense: value,
            dexterity: value,
            agility: value,
            charisma: value,
            intelligence: value,
        }
    }

    /// Build from values in [`Stat::ALL`] order.
    pub const fn from_array(v: [f64; 7]) -> Self {
        Self {
            hacking: v[0],
            strength: v[1],
            defense: v[2],
            dexterity: v[3],
            agility: v[4],
            charisma: v[5],
            intelligence: v[6],
        }
    }

    /// Value for one stat.
    pub const fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Hacking => self.hacking,
            Stat::Strength => self.strength,
            Stat::Defense => self.defense,
            Stat::Dexterity => self.dexterity,
            Stat::Agility => self.agility,
            Stat::Charisma => self.charisma,
            Stat::Intelligence => self.intelligence,
        }
    }

    /// Overwrite one stat.
    pub const fn set(&mut self, stat: Stat, value: f64) {
        match stat {
            Stat::Hacking => self.hacking = value,
            Stat::Strength => self.strength = value,
            Stat::Defense => self.defense = value,
            Stat::Dexterity => self.dexterity = value,
            Stat::Agility => self.agility = value,
            Stat::Charisma => self.charisma = value,
            Stat::Intelligence => self.intelligence = value,
        }
    }

    /// Apply `f` to every stat.
    #[must_use]
    pub fn map(self, mut f: impl FnMut(Stat, f64) -> f64) -> Self {
        let mut out = self;
        for stat in Stat::ALL {
            out.set(*stat, f(*stat, self.get(*stat)));
        }
        out
    }

    /// Multiply every stat by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        self.map(|_, v| v * factor)
    }

    /// Element-wise product.
    #[must_use]
    pub fn product(self, other: &Self) -> Self {
        self.map(|stat, v| v * other.get(stat))
    }

    /// Element-wise sum.
    #[must_use]
    pub fn plus(self, other: &Self) -> Self {
        self.map(|stat, v| v + other.get(stat))
    }

    /// Sum of all seven values.
    pub fn total(&self) -> f64 {
        Stat::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// Whether every value is finite.
    pub fn is_finite(&self) -> bool {
        Stat::ALL.iter().all(|s| self.get(*s).is_finite())
    }
}
