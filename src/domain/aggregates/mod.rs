//! Aggregates - Cluster of domain objects treated as a single unit

mod encounter_state;

pub use encounter_state::{EncounterState, RollTarget, TurnAdvance};
