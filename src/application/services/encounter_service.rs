//! Encounter Service - Application service for running combat encounters
//!
//! Wraps the [`EncounterState`] turn tracker with persistence and event
//! publication. Every mutation is applied to a copy, saved, and only then
//! becomes the cached state, so a failed save never leaves the cache ahead of
//! storage. Events go out after the save.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::application::ports::outbound::{
    EncounterRepositoryPort, EventBusPort, PartyRepositoryPort,
};
use crate::domain::aggregates::{EncounterState, RollTarget, TurnAdvance};
use crate::domain::entities::{Combatant, CombatantKind, HpChange, HpChangeKind, NewCombatant};
use crate::domain::events::{EncounterEvent, EventMetadata};
use crate::domain::services::{calculate_difficulty, EncounterResult};
use crate::domain::value_objects::{CombatantId, Condition};

/// Request to roll initiative without applying it
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RollInitiativeRequest {
    #[serde(default)]
    pub target: RollTarget,
    /// Defaults to the configured initiative die
    #[serde(default)]
    pub dice_sides: Option<u32>,
}

/// Encounter service trait defining the combat use cases
#[async_trait]
pub trait EncounterService: Send + Sync {
    /// Current encounter, restored from storage on first use
    async fn get_state(&self) -> Result<EncounterState>;

    async fn add_combatant(&self, data: NewCombatant) -> Result<Combatant>;

    /// Remove a combatant; `None` if the id is unknown
    async fn remove_combatant(&self, id: CombatantId) -> Result<Option<Combatant>>;

    /// Roll initiative for the targeted combatants without touching turn order
    async fn roll_initiative(&self, request: RollInitiativeRequest)
        -> Result<HashMap<CombatantId, i32>>;

    /// Apply initiative values and start combat from the top of the order
    async fn commit_initiative(&self, values: HashMap<CombatantId, i32>) -> Result<EncounterState>;

    async fn sort_by_initiative(&self) -> Result<EncounterState>;

    async fn advance_turn(&self) -> Result<(Option<TurnAdvance>, EncounterState)>;

    async fn apply_hp(
        &self,
        id: CombatantId,
        amount: i32,
        kind: HpChangeKind,
    ) -> Result<Option<HpChange>>;

    async fn toggle_condition(&self, id: CombatantId, condition: Condition) -> Result<Option<bool>>;

    /// Keep only the given kinds and reset the round counter
    async fn end_encounter(&self, keep_kinds: Vec<CombatantKind>) -> Result<EncounterState>;

    /// Classify the current roster against the stored party
    async fn calculate_difficulty(&self) -> Result<EncounterResult>;
}

/// Default implementation of EncounterService
pub struct EncounterServiceImpl {
    repository: Arc<dyn EncounterRepositoryPort>,
    party_repository: Arc<dyn PartyRepositoryPort>,
    event_bus: Arc<dyn EventBusPort<EncounterEvent>>,
    initiative_dice_sides: u32,
    state: Mutex<Option<EncounterState>>,
}

impl EncounterServiceImpl {
    pub fn new(
        repository: Arc<dyn EncounterRepositoryPort>,
        party_repository: Arc<dyn PartyRepositoryPort>,
        event_bus: Arc<dyn EventBusPort<EncounterEvent>>,
        initiative_dice_sides: u32,
    ) -> Self {
        Self {
            repository,
            party_repository,
            event_bus,
            initiative_dice_sides,
            state: Mutex::new(None),
        }
    }

    async fn loaded<'a>(&self, slot: &'a mut Option<EncounterState>) -> Result<&'a mut EncounterState> {
        if slot.is_none() {
            let restored = self
                .repository
                .load()
                .await
                .context("Failed to load encounter")?;
            if restored.is_none() {
                debug!("No saved encounter, starting fresh");
            }
            *slot = restored;
        }
        Ok(slot.get_or_insert_with(EncounterState::new))
    }

    /// Run `f` against a copy of the state. If it reports any events the copy
    /// is saved and becomes current; otherwise nothing is written. A copy that
    /// is back to a fresh encounter clears storage instead of being saved.
    async fn mutate<T, F>(&self, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut EncounterState) -> (T, Vec<EncounterEvent>) + Send,
    {
        let mut guard = self.state.lock().await;
        let current = self.loaded(&mut guard).await?;

        let mut working = current.clone();
        let (value, events) = f(&mut working);
        if !events.is_empty() {
            if working == EncounterState::new() {
                self.repository
                    .clear()
                    .await
                    .context("Failed to clear encounter")?;
                debug!("Encounter is empty, cleared saved state");
            } else {
                self.repository
                    .save(&working)
                    .await
                    .context("Failed to save encounter")?;
            }
            *current = working;
        }
        drop(guard);

        for event in events {
            self.publish(event).await;
        }
        Ok(value)
    }

    async fn publish(&self, event: EncounterEvent) {
        let name = event.name();
        match self.event_bus.publish(event).await {
            Ok(()) => debug!(event = name, "Published encounter event"),
            Err(e) => error!(event = name, "Failed to publish encounter event: {}", e),
        }
    }
}

fn initiative_event(state: &EncounterState) -> EncounterEvent {
    EncounterEvent::InitiativeCommitted {
        metadata: EventMetadata::default(),
        order: state.roster().iter().map(|c| c.id).collect(),
        active_id: state.active_id(),
    }
}

#[async_trait]
impl EncounterService for EncounterServiceImpl {
    #[instrument(skip(self))]
    async fn get_state(&self) -> Result<EncounterState> {
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard).await?;
        debug!(round = state.round(), combatants = state.roster().len(), "Fetching encounter");
        Ok(state.clone())
    }

    #[instrument(skip(self, data))]
    async fn add_combatant(&self, data: NewCombatant) -> Result<Combatant> {
        let combatant = self
            .mutate(|state| {
                let combatant = state.add_combatant(data).clone();
                let event = EncounterEvent::CombatantAdded {
                    metadata: EventMetadata::default(),
                    combatant_id: combatant.id,
                    name: combatant.name.clone(),
                    kind: combatant.kind,
                };
                (combatant, vec![event])
            })
            .await?;

        info!(combatant_id = %combatant.id, kind = ?combatant.kind, "Added combatant: {}", combatant.name);
        Ok(combatant)
    }

    #[instrument(skip(self), fields(combatant_id = %id))]
    async fn remove_combatant(&self, id: CombatantId) -> Result<Option<Combatant>> {
        let removed = self
            .mutate(|state| {
                let previous_active = state.active_id();
                let previous_round = state.round();
                let Some(removed) = state.remove_combatant(id) else {
                    return (None, Vec::new());
                };

                let mut events = vec![EncounterEvent::CombatantRemoved {
                    metadata: EventMetadata::default(),
                    combatant_id: removed.id,
                    name: removed.name.clone(),
                }];
                if previous_active == Some(removed.id) {
                    if let Some(active_id) = state.active_id() {
                        events.push(EncounterEvent::TurnAdvanced {
                            metadata: EventMetadata::default(),
                            round: state.round(),
                            turn_index: state.turn_index(),
                            active_id,
                            new_round: state.round() != previous_round,
                        });
                    }
                }
                (Some(removed), events)
            })
            .await?;

        match &removed {
            Some(combatant) => info!("Removed combatant: {}", combatant.name),
            None => debug!("Combatant not in encounter, nothing removed"),
        }
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn roll_initiative(
        &self,
        request: RollInitiativeRequest,
    ) -> Result<HashMap<CombatantId, i32>> {
        let sides = request.dice_sides.unwrap_or(self.initiative_dice_sides);
        let mut guard = self.state.lock().await;
        let state = self.loaded(&mut guard).await?;

        let rolls = {
            let mut rng = rand::thread_rng();
            state.roll_initiative(&mut rng, &request.target, sides)
        };
        debug!(rolled = rolls.len(), sides, "Rolled initiative");
        Ok(rolls)
    }

    #[instrument(skip(self, values))]
    async fn commit_initiative(&self, values: HashMap<CombatantId, i32>) -> Result<EncounterState> {
        let state = self
            .mutate(|state| {
                state.commit_initiative(&values);
                (state.clone(), vec![initiative_event(state)])
            })
            .await?;

        info!(applied = values.len(), "Committed initiative");
        Ok(state)
    }

    #[instrument(skip(self))]
    async fn sort_by_initiative(&self) -> Result<EncounterState> {
        let state = self
            .mutate(|state| {
                state.sort_by_initiative();
                (state.clone(), vec![initiative_event(state)])
            })
            .await?;

        info!("Sorted encounter by initiative");
        Ok(state)
    }

    #[instrument(skip(self))]
    async fn advance_turn(&self) -> Result<(Option<TurnAdvance>, EncounterState)> {
        let (advance, state) = self
            .mutate(|state| match state.advance_turn() {
                Some(advance) => {
                    let event = EncounterEvent::TurnAdvanced {
                        metadata: EventMetadata::default(),
                        round: advance.round,
                        turn_index: advance.turn_index,
                        active_id: advance.active_id,
                        new_round: advance.new_round,
                    };
                    ((Some(advance), state.clone()), vec![event])
                }
                None => ((None, state.clone()), Vec::new()),
            })
            .await?;

        if let (Some(advance), Some(active)) = (&advance, state.active_combatant()) {
            info!(
                round = advance.round,
                active_id = %advance.active_id,
                new_round = advance.new_round,
                "Advanced turn to {}",
                active.name
            );
        }
        Ok((advance, state))
    }

    #[instrument(skip(self), fields(combatant_id = %id))]
    async fn apply_hp(
        &self,
        id: CombatantId,
        amount: i32,
        kind: HpChangeKind,
    ) -> Result<Option<HpChange>> {
        let change = self
            .mutate(|state| {
                let Some(change) = state.apply_hp(id, amount, kind) else {
                    return (None, Vec::new());
                };

                let mut events = vec![EncounterEvent::HpChanged {
                    metadata: EventMetadata::default(),
                    change,
                }];
                if change.knocked_out {
                    if let Some(combatant) = state.combatant(id) {
                        events.push(EncounterEvent::CombatantKnockedOut {
                            metadata: EventMetadata::default(),
                            combatant_id: id,
                            name: combatant.name.clone(),
                            kind: combatant.kind,
                        });
                    }
                }
                (Some(change), events)
            })
            .await?;

        if let Some(change) = &change {
            info!(previous_hp = change.previous_hp, hp = change.hp, ?kind, "Applied hp change");
            if change.knocked_out {
                info!("Combatant knocked out");
            }
        }
        Ok(change)
    }

    #[instrument(skip(self), fields(combatant_id = %id, condition = %condition.id))]
    async fn toggle_condition(&self, id: CombatantId, condition: Condition) -> Result<Option<bool>> {
        let present = self
            .mutate(|state| match state.toggle_condition(id, condition.clone()) {
                Some(active) => {
                    let event = EncounterEvent::ConditionToggled {
                        metadata: EventMetadata::default(),
                        combatant_id: id,
                        condition,
                        active,
                    };
                    (Some(active), vec![event])
                }
                None => (None, Vec::new()),
            })
            .await?;

        if let Some(active) = present {
            info!(active, "Toggled condition");
        }
        Ok(present)
    }

    #[instrument(skip(self))]
    async fn end_encounter(&self, keep_kinds: Vec<CombatantKind>) -> Result<EncounterState> {
        let state = self
            .mutate(|state| {
                let removed = state.end_encounter(&keep_kinds);
                let event = EncounterEvent::EncounterEnded {
                    metadata: EventMetadata::default(),
                    removed: removed.iter().map(|c| c.id).collect(),
                };
                (state.clone(), vec![event])
            })
            .await?;

        info!(remaining = state.roster().len(), "Ended encounter");
        Ok(state)
    }

    #[instrument(skip(self))]
    async fn calculate_difficulty(&self) -> Result<EncounterResult> {
        let party = self
            .party_repository
            .load()
            .await
            .context("Failed to load party")?;
        let state = self.get_state().await?;

        let result = calculate_difficulty(&party, state.roster());
        debug!(
            difficulty = result.difficulty.display_name(),
            total_xp = result.total_xp,
            adjusted_xp = result.adjusted_xp,
            "Calculated encounter difficulty"
        );
        Ok(result)
    }
}
