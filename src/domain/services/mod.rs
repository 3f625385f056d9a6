//! Domain services - Pure business logic operations

mod encounter_difficulty;
mod xp_tables;

pub use encounter_difficulty::{calculate_difficulty, EncounterDifficulty, EncounterResult};
pub use xp_tables::{xp_for_challenge_rating, xp_thresholds_for_level};
