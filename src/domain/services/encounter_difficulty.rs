//! Encounter difficulty classifier
//!
//! Pure XP-budget model: living monster XP is scaled by a group-size
//! multiplier and compared against the summed thresholds of the active party.
//! The classifier never mutates its inputs and must be re-run after any
//! roster or hit point change.

use serde::{Deserialize, Serialize};

use super::xp_tables::xp_thresholds_for_level;
use crate::domain::entities::{Combatant, PartyMember};

/// Difficulty verdict for an encounter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterDifficulty {
    Trivial,
    Easy,
    Medium,
    Hard,
    Deadly,
}

impl EncounterDifficulty {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Trivial => "Trivial",
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Deadly => "Deadly",
        }
    }
}

/// Output of [`calculate_difficulty`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncounterResult {
    pub difficulty: EncounterDifficulty,
    /// Raw XP of all living monsters
    pub total_xp: u64,
    /// `total_xp` scaled by the group multiplier
    pub adjusted_xp: f64,
    /// Share of a rough three-hard-encounter daily budget, in percent
    pub daily_budget_percent: u32,
    /// Group multiplier applied; 0 when no living monsters remain
    pub multiplier: f64,
    /// Party thresholds `[easy, medium, hard, deadly]`
    pub party_thresholds: [u64; 4],
}

impl EncounterResult {
    fn trivial() -> Self {
        Self {
            difficulty: EncounterDifficulty::Trivial,
            total_xp: 0,
            adjusted_xp: 0.0,
            daily_budget_percent: 0,
            multiplier: 0.0,
            party_thresholds: [0; 4],
        }
    }
}

/// Classify an encounter for the given party.
///
/// `combatants` may be the whole roster; only monsters with `hp > 0` count.
pub fn calculate_difficulty(party: &[PartyMember], combatants: &[Combatant]) -> EncounterResult {
    let active: Vec<&PartyMember> = party.iter().filter(|m| m.active).collect();
    if active.is_empty() {
        return EncounterResult::trivial();
    }

    let party_thresholds = active.iter().fold([0u64; 4], |mut acc, member| {
        for (sum, threshold) in acc.iter_mut().zip(xp_thresholds_for_level(member.level)) {
            *sum += u64::from(threshold);
        }
        acc
    });

    let living: Vec<&Combatant> = combatants.iter().filter(|c| c.is_living_monster()).collect();
    let total_xp: u64 = living.iter().map(|c| u64::from(c.xp_value)).sum();

    // No opponents, nothing to scale
    let multiplier = if living.is_empty() {
        0.0
    } else {
        encounter_multiplier(living.len(), active.len())
    };
    let adjusted_xp = total_xp as f64 * multiplier;

    let difficulty = if adjusted_xp >= party_thresholds[3] as f64 {
        EncounterDifficulty::Deadly
    } else if adjusted_xp >= party_thresholds[2] as f64 {
        EncounterDifficulty::Hard
    } else if adjusted_xp >= party_thresholds[1] as f64 {
        EncounterDifficulty::Medium
    } else if adjusted_xp >= party_thresholds[0] as f64 {
        EncounterDifficulty::Easy
    } else {
        EncounterDifficulty::Trivial
    };

    let daily_budget = (party_thresholds[2] * 3) as f64;
    let daily_budget_percent = (adjusted_xp / daily_budget * 100.0).round() as u32;

    EncounterResult {
        difficulty,
        total_xp,
        adjusted_xp,
        daily_budget_percent,
        multiplier,
        party_thresholds,
    }
}

/// Group multiplier for `monsters` opponents against a party of `party_size`.
///
/// Parties under three treat groups as more dangerous (+0.5), parties over
/// five as less (-0.5). Never below 0.5.
pub fn encounter_multiplier(monsters: usize, party_size: usize) -> f64 {
    // Work in half steps so the table stays exact
    let base_halves: i32 = match monsters {
        0 | 1 => 2,
        2 => 3,
        3..=6 => 4,
        7..=10 => 5,
        11..=14 => 6,
        _ => 8,
    };
    let adjustment = if party_size < 3 {
        1
    } else if party_size > 5 {
        -1
    } else {
        0
    };
    f64::from((base_halves + adjustment).max(1)) / 2.0
}
