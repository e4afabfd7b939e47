//! Category-tagged action identifiers.
//!
//! Each category has its own closed name set, and [`ActionId`] pairs the
//! category tag with a name from the matching set. An identifier can only
//! name an action that exists, so catalog lookups by `ActionId` never fail
//! for the standard catalog.

use serde::{Deserialize, Serialize};

use crate::enums::{ActionKind, labelled_enum};

labelled_enum! {
    /// Contract names.
    ContractName {
        /// Locate synthoids and improve the population estimate.
        Tracking => "Tracking",
        /// Capture or kill a specific synthoid.
        BountyHunter => "Bounty Hunter",
        /// Retire a synthoid on sight.
        Retirement => "Retirement",
    }
}

labelled_enum! {
    /// Operation names.
    OperationName {
        /// Gather intelligence on synthoid movements.
        Investigation => "Investigation",
        /// Infiltrate synthoid groups.
        Undercover => "Undercover Operation",
        /// Bait and arrest synthoid dealers.
        Sting => "Sting Operation",
        /// Storm a synthoid community. Requires a known community.
        Raid => "Raid",
        /// Silently retire synthoids.
        StealthRetirement => "Stealth Retirement Operation",
        /// Eliminate a synthoid leader.
        Assassination => "Assassination",
    }
}

labelled_enum! {
    /// Black operation names, in the order they must be completed.
    BlackOpName {
        /// Sequence 0.
        Typhoon => "Operation Typhoon",
        /// Sequence 1.
        Zero => "Operation Zero",
        /// Sequence 2.
        X => "Operation X",
        /// Sequence 3.
        Titan => "Operation Titan",
        /// Sequence 4.
        Ares => "Operation Ares",
        /// Sequence 5.
        Archangel => "Operation Archangel",
        /// Sequence 6.
        Juggernaut => "Operation Juggernaut",
        /// Sequence 7.
        RedDragon => "Operation Red Dragon",
        /// Sequence 8.
        K => "Operation K",
        /// Sequence 9.
        Deckard => "Operation Deckard",
        /// Sequence 10.
        Tyrell => "Operation Tyrell",
        /// Sequence 11.
        Wallace => "Operation Wallace",
        /// Sequence 12.
        ShoulderOfOrion => "Operation Shoulder of Orion",
        /// Sequence 13.
        Hyron => "Operation Hyron",
        /// Sequence 14.
        Morpheus => "Operation Morpheus",
        /// Sequence 15.
        IonStorm => "Operation Ion Storm",
        /// Sequence 16.
        Annihilus => "Operation Annihilus",
        /// Sequence 17.
        Ultron => "Operation Ultron",
        /// Sequence 18.
        Centurion => "Operation Centurion",
        /// Sequence 19.
        Vindictus => "Operation Vindictus",
        /// Sequence 20, the final black operation.
        Daedalus => "Operation Daedalus",
    }
}

labelled_enum! {
    /// General action names.
    GeneralAction {
        /// Combat training; raises the persistent stamina bonus.
        Training => "Training",
        /// Improves the current city's population estimate.
        FieldAnalysis => "Field Analysis",
        /// Attempts to grow the team roster.
        Recruitment => "Recruitment",
        /// Calms chaos in the current city.
        Diplomacy => "Diplomacy",
        /// Restores HP and a little stamina.
        RegenChamber => "Hyperbolic Regeneration Chamber",
        /// Speeds up mission regeneration and raises chaos everywhere.
        InciteViolence => "Incite Violence",
    }
}

/// Identifier of a single catalog entry: category tag plus name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name")]
pub enum ActionId {
    /// A contract.
    Contract(ContractName),
    /// An operation.
    Operation(OperationName),
    /// A black operation.
    BlackOp(BlackOpName),
    /// A general action.
    General(GeneralAction),
}

impl ActionId {
    /// Category tag of this action.
    pub const fn kind(self) -> ActionKind {
        match self {
            Self::Contract(_) => ActionKind::Contract,
            Self::Operation(_) => ActionKind::Operation,
            Self::BlackOp(_) => ActionKind::BlackOp,
            Self::General(_) => ActionKind::General,
        }
    }

    /// Display name of this action.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Contract(n) => n.as_str(),
            Self::Operation(n) => n.as_str(),
            Self::BlackOp(n) => n.as_str(),
            Self::General(n) => n.as_str(),
        }
    }

    /// Whether the action carries count/level progress (contracts and operations).
    pub const fn is_leveled(self) -> bool {
        matches!(self, Self::Contract(_) | Self::Operation(_))
    }

    /// Whether the action takes a team from the roster.
    pub const fn takes_team(self) -> bool {
        matches!(self, Self::Operation(_) | Self::BlackOp(_))
    }

    /// Resolve a name within a known category.
    pub fn parse(kind: ActionKind, name: &str) -> Option<Self> {
        match kind {
            ActionKind::Contract => ContractName::from_label(name).map(Self::Contract),
            ActionKind::Operation => OperationName::from_label(name).map(Self::Operation),
            ActionKind::BlackOp => BlackOpName::from_label(name).map(Self::BlackOp),
            ActionKind::General => GeneralAction::from_label(name).map(Self::General),
        }
    }

    /// Resolve a name across every category. Names are unique across categories.
    pub fn find(name: &str) -> Option<Self> {
        ActionKind::ALL
            .iter()
            .find_map(|kind| Self::parse(*kind, name))
    }

    /// Every identifier of one category, in declaration order.
    pub fn all_of(kind: ActionKind) -> Vec<Self> {
        match kind {
            ActionKind::Contract => ContractName::ALL.iter().copied().map(Self::Contract).collect(),
            ActionKind::Operation => OperationName::ALL
                .iter()
                .copied()
                .map(Self::Operation)
                .collect(),
            ActionKind::BlackOp => BlackOpName::ALL.iter().copied().map(Self::BlackOp).collect(),
            ActionKind::General => GeneralAction::ALL.iter().copied().map(Self::General).collect(),
        }
    }
}

impl core::fmt::Display for ActionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
