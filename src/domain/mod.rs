//! Domain layer - Core encounter rules with no I/O
//!
//! This layer contains:
//! - Entities: Combatant, PartyMember
//! - Value Objects: ids, conditions, dice expressions
//! - Aggregates: EncounterState (turn order tracker)
//! - Domain Events: outbound encounter notifications
//! - Domain Services: encounter difficulty classifier and XP tables

pub mod aggregates;
pub mod entities;
pub mod events;
pub mod services;
pub mod value_objects;
