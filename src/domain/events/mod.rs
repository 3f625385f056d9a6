//! Domain events - Notifications of state changes within the domain

mod encounter_events;

pub use encounter_events::{EncounterEvent, EventMetadata};
