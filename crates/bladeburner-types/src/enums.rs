//! Closed name sets shared across the division engine.
//!
//! Every set is a plain `Copy` enum with a display label. Labels are what the
//! scripting surface accepts and what snapshots store, so they must stay
//! stable.

/// A name that did not match any member of a closed name set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {name}")]
pub struct UnknownName {
    /// Which name set was searched (e.g. `"CityName"`).
    pub kind: &'static str,
    /// The label that failed to match.
    pub name: String,
}

/// Generates a labelled enum with `ALL`, `as_str`, `from_label`, `Display`
/// and `FromStr`.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $label:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            ::serde::Serialize, ::serde::Deserialize,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stable display label.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Look up a variant by its exact label.
            pub fn from_label(label: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.as_str() == label)
            }

            /// Zero-based position in [`Self::ALL`].
            pub fn index(self) -> usize {
                Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl core::str::FromStr for $name {
            type Err = $crate::enums::UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_label(s).ok_or_else(|| $crate::enums::UnknownName {
                    kind: stringify!($name),
                    name: s.to_owned(),
                })
            }
        }
    };
}

pub(crate) use labelled_enum;

labelled_enum! {
    /// Category tag of an action.
    ActionKind {
        /// Repeatable, money-paying missions with a depletable count.
        Contract => "Contracts",
        /// Repeatable, rank-focused missions with a depletable count and a team.
        Operation => "Operations",
        /// One-shot, strictly ordered missions gated by rank.
        BlackOp => "Black Operations",
        /// Always-available actions with bespoke effects.
        General => "General",
    }
}

labelled_enum! {
    /// The six cities the division can operate in.
    CityName {
        /// Aevum.
        Aevum => "Aevum",
        /// Chongqing.
        Chongqing => "Chongqing",
        /// Sector-12, the default starting city.
        Sector12 => "Sector-12",
        /// New Tokyo.
        NewTokyo => "New Tokyo",
        /// Ishima.
        Ishima => "Ishima",
        /// Volhaven.
        Volhaven => "Volhaven",
    }
}

labelled_enum! {
    /// Operative stats read by success-chance and time formulas.
    Stat {
        /// Hacking level.
        Hacking => "hacking",
        /// Strength level.
        Strength => "strength",
        /// Defense level.
        Defense => "defense",
        /// Dexterity level.
        Dexterity => "dexterity",
        /// Agility level.
        Agility => "agility",
        /// Charisma level.
        Charisma => "charisma",
        /// Intelligence level.
        Intelligence => "intelligence",
    }
}

labelled_enum! {
    /// Purchasable division skills.
    SkillName {
        /// Raises every success chance.
        BladesIntuition => "Blade's Intuition",
        /// Raises stealth-action success chance.
        Cloak => "Cloak",
        /// Raises kill-action success chance.
        ShortCircuit => "Short-Circuit",
        /// Raises operation and black-op success chance.
        DigitalObserver => "Digital Observer",
        /// Raises contract success chance.
        Tracer => "Tracer",
        /// Shortens every action.
        Overclock => "Overclock",
        /// Raises effective combat stats.
        Reaper => "Reaper",
        /// Raises effective dexterity and agility.
        EvasiveSystem => "Evasive System",
        /// Sharpens population-estimate gains.
        Datamancer => "Datamancer",
        /// Raises max stamina and stamina gain.
        CybersEdge => "Cyber's Edge",
        /// Raises contract money.
        HandsOfMidas => "Hands of Midas",
        /// Raises experience from actions.
        Hyperdrive => "Hyperdrive",
    }
}

labelled_enum! {
    /// Named entries of the derived skill-multiplier table.
    SkillMultiplier {
        /// Applied to every success chance.
        SuccessChanceAll => "successChanceAll",
        /// Applied to stealth actions.
        SuccessChanceStealth => "successChanceStealth",
        /// Applied to kill actions.
        SuccessChanceKill => "successChanceKill",
        /// Applied to contracts.
        SuccessChanceContract => "successChanceContract",
        /// Applied to operations and black operations.
        SuccessChanceOperation => "successChanceOperation",
        /// Applied to population-estimate improvements.
        SuccessChanceEstimate => "successChanceEstimate",
        /// Applied to action time (lower is better).
        ActionTime => "actionTime",
        /// Effective hacking.
        EffHacking => "effHack",
        /// Effective strength.
        EffStrength => "effStr",
        /// Effective defense.
        EffDefense => "effDef",
        /// Effective dexterity.
        EffDexterity => "effDex",
        /// Effective agility.
        EffAgility => "effAgi",
        /// Effective charisma.
        EffCharisma => "effCha",
        /// Effective intelligence.
        EffIntelligence => "effInt",
        /// Max stamina and stamina gain.
        Stamina => "stamina",
        /// Contract money.
        Money => "money",
        /// Experience gain.
        ExpGain => "expGain",
    }
}

impl SkillMultiplier {
    /// The effective-stat multiplier that scales `stat`.
    pub const fn for_stat(stat: Stat) -> Self {
        match stat {
            Stat::Hacking => Self::EffHacking,
            Stat::Strength => Self::EffStrength,
            Stat::Defense => Self::EffDefense,
            Stat::Dexterity => Self::EffDexterity,
            Stat::Agility => Self::EffAgility,
            Stat::Charisma => Self::EffCharisma,
            Stat::Intelligence => Self::EffIntelligence,
        }
    }
}
