mod combatant;
mod common;
mod roster;
mod status;

pub use combatant::{Combatant, DamageReport, ResistanceCharges};
pub use common::{
    AbsoluteAddress, AbsoluteSide, CombatantId, CombatantKind, LocalSide, Slot, TargetDescriptor,
    Turn,
};
pub use roster::{Hero, SideRoster};
pub use status::{
    StackOp, StackPolicy, StatusEffectRecord, StatusEffectStore, StatusError, StatusFlags,
    StatusKind, StatusRule, Trigger,
};
