use std::fmt;

/// Unique identifier for a combatant, shared by both peers for one battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Battle turn counter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Turn(pub u32);

impl Turn {
    pub const FIRST: Self = Self(1);

    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn {}", self.0)
    }
}

/// Side of a combatant as seen from the local peer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocalSide {
    /// Combatants controlled by this peer.
    Player,
    /// Combatants controlled by the remote peer.
    Opponent,
}

impl LocalSide {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

/// Side of a combatant in the global framing both peers agree on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbsoluteSide {
    Host,
    Guest,
}

impl AbsoluteSide {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Host => Self::Guest,
            Self::Guest => Self::Host,
        }
    }

    /// Local framing of this side for a peer that owns `me`.
    pub fn to_local(self, me: AbsoluteSide) -> LocalSide {
        if self == me {
            LocalSide::Player
        } else {
            LocalSide::Opponent
        }
    }

    /// Global framing of a local side for a peer that owns `me`.
    pub fn from_local(side: LocalSide, me: AbsoluteSide) -> Self {
        match side {
            LocalSide::Player => me,
            LocalSide::Opponent => me.opposite(),
        }
    }
}

/// Hero slot on a side of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Slot {
    Left,
    Center,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Left, Slot::Center, Slot::Right];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatantKind {
    Hero,
    Creature,
}

/// Wire-safe reference to any combatant.
///
/// `side` is relative to whoever built the descriptor; `absolute_side` lets the
/// receiving peer recompute its own local framing with [`Self::localize`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetDescriptor {
    pub kind: CombatantKind,
    pub side: LocalSide,
    pub position: Slot,
    /// Index into the owning hero's creature list. `Some` iff `kind` is `Creature`.
    pub creature_index: Option<u8>,
    pub absolute_side: AbsoluteSide,
}

impl TargetDescriptor {
    pub fn hero(side: LocalSide, absolute_side: AbsoluteSide, position: Slot) -> Self {
        Self {
            kind: CombatantKind::Hero,
            side,
            position,
            creature_index: None,
            absolute_side,
        }
    }

    pub fn creature(
        side: LocalSide,
        absolute_side: AbsoluteSide,
        position: Slot,
        index: u8,
    ) -> Self {
        Self {
            kind: CombatantKind::Creature,
            side,
            position,
            creature_index: Some(index),
            absolute_side,
        }
    }

    /// Returns true when `kind` and `creature_index` agree with each other.
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            CombatantKind::Hero => self.creature_index.is_none(),
            CombatantKind::Creature => self.creature_index.is_some(),
        }
    }

    /// Rewrites the local side for a peer that owns `me`.
    pub fn localize(self, me: AbsoluteSide) -> Self {
        Self {
            side: self.absolute_side.to_local(me),
            ..self
        }
    }

    /// The framing-independent part of the descriptor.
    pub fn address(&self) -> AbsoluteAddress {
        AbsoluteAddress {
            absolute_side: self.absolute_side,
            position: self.position,
            kind: self.kind,
            creature_index: self.creature_index,
        }
    }

    /// Descriptor of the hero that owns this combatant (itself for heroes).
    pub fn owning_hero(&self) -> Self {
        Self::hero(self.side, self.absolute_side, self.position)
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.creature_index {
            Some(index) => write!(
                f,
                "{:?}/{:?}/creature[{}]",
                self.absolute_side, self.position, index
            ),
            None => write!(f, "{:?}/{:?}/hero", self.absolute_side, self.position),
        }
    }
}

/// Combatant address in global framing; identical on both peers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsoluteAddress {
    pub absolute_side: AbsoluteSide,
    pub position: Slot,
    pub kind: CombatantKind,
    pub creature_index: Option<u8>,
}
