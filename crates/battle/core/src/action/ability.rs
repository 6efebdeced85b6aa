//! Ability identities and their data-driven profiles.

use std::collections::BTreeMap;

use crate::action::{Formula, TargetingRule};
use crate::env::AbilityOracle;
use crate::state::StatusKind;

/// Every ability a combatant can cast.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum AbilityId {
    Firebolt,
    ChaosBolt,
    Blizzard,
    Frenzy,
    Mend,
    ArcaneWard,
    Renewal,
    Plague,
    Thornskin,
    MirrorImage,
    Hex,
    Sanctuary,
}

impl AbilityId {
    /// Name used as the replication event type.
    pub fn event_type(self) -> &'static str {
        self.into()
    }

    /// Parses an event type back into an ability.
    pub fn from_event_type(event_type: &str) -> Option<Self> {
        event_type.parse().ok()
    }
}

/// What an ability does to each resolved target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectSpec {
    /// Deals the magnitude as damage; shields absorb first.
    Damage,
    /// Restores up to the magnitude in HP.
    Heal,
    /// Adds the magnitude to the target's shield.
    Shield,
    /// Applies the magnitude as stacks of a status.
    ApplyStatus(StatusKind),
    /// Grants the magnitude as resistance charges.
    GrantResistance,
}

impl EffectSpec {
    /// Effects that count as an attack on an enemy target.
    pub fn is_harmful(self) -> bool {
        match self {
            Self::Damage => true,
            Self::ApplyStatus(kind) => kind.has_flag(crate::state::StatusFlags::DEBUFF),
            Self::Heal | Self::Shield | Self::GrantResistance => false,
        }
    }
}

/// Status stacks added alongside the main effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusRider {
    pub kind: StatusKind,
    pub stacks: u32,
}

/// Complete specification for an ability.
///
/// Profiles are loaded from RON data files.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityProfile {
    pub id: AbilityId,

    /// How the ability selects targets.
    pub targeting: TargetingRule,

    pub effect: EffectSpec,

    pub magnitude: Formula,

    /// Whether hostile resistance charges can negate this ability.
    #[cfg_attr(feature = "serde", serde(default))]
    pub resistible: bool,

    /// Extra status applied to every target that was not negated.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rider: Option<StatusRider>,

    /// Status gained by the caster after landing at least one hit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub self_stack: Option<StatusRider>,
}

impl AbilityProfile {
    pub fn new(id: AbilityId, targeting: TargetingRule, effect: EffectSpec, magnitude: Formula) -> Self {
        Self {
            id,
            targeting,
            effect,
            magnitude,
            resistible: false,
            rider: None,
            self_stack: None,
        }
    }

    pub fn resistible(mut self) -> Self {
        self.resistible = true;
        self
    }

    pub fn with_rider(mut self, kind: StatusKind, stacks: u32) -> Self {
        self.rider = Some(StatusRider { kind, stacks });
        self
    }

    pub fn with_self_stack(mut self, kind: StatusKind, stacks: u32) -> Self {
        self.self_stack = Some(StatusRider { kind, stacks });
        self
    }
}

/// In-memory ability catalogue.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityTable {
    profiles: BTreeMap<AbilityId, AbilityProfile>,
}

impl AbilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_profiles(profiles: impl IntoIterator<Item = AbilityProfile>) -> Self {
        let mut table = Self::new();
        for profile in profiles {
            table.insert(profile);
        }
        table
    }

    /// Inserts or replaces the profile for its ability.
    pub fn insert(&mut self, profile: AbilityProfile) -> Option<AbilityProfile> {
        self.profiles.insert(profile.id, profile)
    }

    /// Abilities that have no profile yet.
    pub fn missing(&self) -> Vec<AbilityId> {
        <AbilityId as strum::IntoEnumIterator>::iter()
            .filter(|id| !self.profiles.contains_key(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityProfile> {
        self.profiles.values()
    }
}

impl AbilityOracle for AbilityTable {
    fn profile(&self, id: AbilityId) -> Option<&AbilityProfile> {
        self.profiles.get(&id)
    }
}
