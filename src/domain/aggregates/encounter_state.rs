//! Encounter aggregate - roster, round counter and turn pointer
//!
//! `EncounterState` is the turn-order tracker. It is a plain serializable value:
//! persistence and notifications are handled by the application layer.
//!
//! Invariants:
//! - every combatant's `hp` stays in `[0, max_hp]`
//! - `turn_index < roster.len()` whenever the roster is non-empty
//! - when `active_id` is set it equals `roster[turn_index].id`
//!
//! `active_id` is `None` before combat starts (no initiative committed yet) and
//! after [`EncounterState::end_encounter`].

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::entities::{Combatant, CombatantKind, HpChange, HpChangeKind, NewCombatant};
use crate::domain::value_objects::{CombatantId, Condition};

/// Which combatants an initiative roll applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "ids", rename_all = "snake_case")]
pub enum RollTarget {
    #[default]
    All,
    Monsters,
    Only(Vec<CombatantId>),
}

impl RollTarget {
    fn includes(&self, combatant: &Combatant) -> bool {
        match self {
            Self::All => true,
            Self::Monsters => combatant.kind == CombatantKind::Monster,
            Self::Only(ids) => ids.contains(&combatant.id),
        }
    }
}

/// Position reached after [`EncounterState::advance_turn`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnAdvance {
    pub round: u32,
    pub turn_index: usize,
    pub active_id: CombatantId,
    /// The pointer wrapped and a new round began
    pub new_round: bool,
}

/// The live encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EncounterRecord")]
pub struct EncounterState {
    roster: Vec<Combatant>,
    round: u32,
    turn_index: usize,
    active_id: Option<CombatantId>,
}

impl Default for EncounterState {
    fn default() -> Self {
        Self::new()
    }
}

impl EncounterState {
    pub fn new() -> Self {
        Self {
            roster: Vec::new(),
            round: 1,
            turn_index: 0,
            active_id: None,
        }
    }

    pub fn roster(&self) -> &[Combatant] {
        &self.roster
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn active_id(&self) -> Option<CombatantId> {
        self.active_id
    }

    pub fn active_combatant(&self) -> Option<&Combatant> {
        self.active_id.and_then(|id| self.combatant(id))
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.roster.iter().find(|c| c.id == id)
    }

    fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.roster.iter_mut().find(|c| c.id == id)
    }

    /// Append a new combatant at the end of the roster.
    ///
    /// Turn order is not touched until initiative is committed or sorted.
    pub fn add_combatant(&mut self, data: NewCombatant) -> &Combatant {
        self.roster.push(data.into_combatant());
        &self.roster[self.roster.len() - 1]
    }

    /// Remove a combatant; unknown ids are a no-op.
    ///
    /// Removing someone before the active combatant keeps the same combatant
    /// active. Removing the active combatant hands the turn to the next
    /// survivor, starting a new round if that wraps past the end.
    pub fn remove_combatant(&mut self, id: CombatantId) -> Option<Combatant> {
        let pos = self.roster.iter().position(|c| c.id == id)?;
        let removed = self.roster.remove(pos);

        if self.roster.is_empty() {
            self.turn_index = 0;
            self.active_id = None;
            return Some(removed);
        }

        match self.active_id {
            Some(active) if active == removed.id => {
                if pos >= self.roster.len() {
                    self.turn_index = 0;
                    self.round += 1;
                } else {
                    self.turn_index = pos;
                }
                self.active_id = Some(self.roster[self.turn_index].id);
            }
            _ => {
                if pos < self.turn_index {
                    self.turn_index -= 1;
                }
                self.turn_index = self.turn_index.min(self.roster.len() - 1);
            }
        }

        Some(removed)
    }

    /// Roll `1d{dice_sides}` plus each targeted combatant's modifier.
    ///
    /// `dice_sides` is clamped to `1..=i32::MAX` so every die lands in range.
    ///
    /// The roster is left untouched; pass the result (possibly edited) to
    /// [`EncounterState::commit_initiative`].
    pub fn roll_initiative<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        target: &RollTarget,
        dice_sides: u32,
    ) -> HashMap<CombatantId, i32> {
        let sides = i32::try_from(dice_sides).unwrap_or(i32::MAX).max(1);
        self.roster
            .iter()
            .filter(|c| target.includes(c))
            .map(|c| {
                let roll = rng.gen_range(1..=sides);
                (c.id, roll.saturating_add(c.initiative_modifier))
            })
            .collect()
    }

    /// Apply initiative values, then start combat from the top of the order
    pub fn commit_initiative(&mut self, values: &HashMap<CombatantId, i32>) {
        for combatant in &mut self.roster {
            if let Some(initiative) = values.get(&combatant.id) {
                combatant.initiative = *initiative;
            }
        }
        self.sort_by_initiative();
    }

    /// Stable sort, highest initiative first; ties keep their current order
    pub fn sort_by_initiative(&mut self) {
        self.roster.sort_by(|a, b| b.initiative.cmp(&a.initiative));
        self.turn_index = 0;
        self.active_id = self.roster.first().map(|c| c.id);
    }

    /// Move to the next combatant, wrapping into a new round
    pub fn advance_turn(&mut self) -> Option<TurnAdvance> {
        if self.roster.is_empty() {
            return None;
        }

        let mut next = self.turn_index + 1;
        let new_round = next >= self.roster.len();
        if new_round {
            next = 0;
            self.round += 1;
        }
        self.turn_index = next;
        let active_id = self.roster[next].id;
        self.active_id = Some(active_id);

        Some(TurnAdvance {
            round: self.round,
            turn_index: next,
            active_id,
            new_round,
        })
    }

    pub fn apply_hp(
        &mut self,
        id: CombatantId,
        amount: i32,
        kind: HpChangeKind,
    ) -> Option<HpChange> {
        self.combatant_mut(id).map(|c| c.apply_hp(amount, kind))
    }

    /// Returns whether the condition is present afterwards
    pub fn toggle_condition(&mut self, id: CombatantId, condition: Condition) -> Option<bool> {
        self.combatant_mut(id).map(|c| c.toggle_condition(condition))
    }

    /// Drop everyone whose kind is not kept and reset to round 1.
    /// Returns the removed combatants.
    pub fn end_encounter(&mut self, keep_kinds: &[CombatantKind]) -> Vec<Combatant> {
        let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.roster)
            .into_iter()
            .partition(|c| keep_kinds.contains(&c.kind));
        self.roster = kept;
        self.round = 1;
        self.turn_index = 0;
        self.active_id = None;
        removed
    }
}

/// Persisted shape; repaired into a consistent state when restored
#[derive(Deserialize)]
struct EncounterRecord {
    #[serde(default)]
    roster: Vec<Combatant>,
    #[serde(default)]
    round: u32,
    #[serde(default)]
    turn_index: usize,
    #[serde(default)]
    active_id: Option<CombatantId>,
}

impl From<EncounterRecord> for EncounterState {
    fn from(record: EncounterRecord) -> Self {
        let mut state = Self {
            roster: record.roster,
            round: record.round.max(1),
            turn_index: record.turn_index,
            active_id: record.active_id,
        };

        if state.roster.is_empty() {
            state.turn_index = 0;
            state.active_id = None;
            return state;
        }

        state.turn_index = state.turn_index.min(state.roster.len() - 1);
        if let Some(active) = state.active_id {
            if state.roster[state.turn_index].id != active {
                match state.roster.iter().position(|c| c.id == active) {
                    Some(pos) => state.turn_index = pos,
                    None => state.active_id = Some(state.roster[state.turn_index].id),
                }
            }
        }
        state
    }
}
