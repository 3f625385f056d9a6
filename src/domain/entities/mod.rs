//! Domain entities - Core business objects with identity

mod combatant;
mod party_member;

pub use combatant::{Combatant, CombatantKind, HpChange, HpChangeKind, NewCombatant};
pub use party_member::PartyMember;
