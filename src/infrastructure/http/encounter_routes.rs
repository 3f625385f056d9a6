//! Encounter API routes

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::application::services::RollInitiativeRequest;
use crate::domain::aggregates::EncounterState;
use crate::domain::entities::{Combatant, CombatantKind, HpChange, HpChangeKind, NewCombatant};
use crate::domain::services::EncounterResult;
use crate::domain::value_objects::{CombatantId, Condition};
use crate::infrastructure::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ApplyHpRequest {
    pub amount: i32,
    pub kind: HpChangeKind,
}

/// Toggle a condition by id; unknown ids become custom conditions
#[derive(Debug, Deserialize)]
pub struct ToggleConditionRequest {
    pub condition_id: String,
    /// Display name for custom conditions
    #[serde(default)]
    pub name: Option<String>,
}

impl ToggleConditionRequest {
    fn into_condition(self) -> Option<Condition> {
        let id = self.condition_id.trim().to_lowercase();
        if id.is_empty() {
            return None;
        }
        Some(Condition::standard(&id).unwrap_or_else(|| {
            let name = self.name.unwrap_or_else(|| self.condition_id.trim().to_string());
            Condition::new(id, name)
        }))
    }
}

#[derive(Debug, Deserialize)]
pub struct CommitInitiativeRequest {
    pub values: HashMap<CombatantId, i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndEncounterRequest {
    /// Kinds that stay in the roster; players only when omitted
    #[serde(default)]
    pub keep_kinds: Option<Vec<CombatantKind>>,
}

#[derive(Debug, Serialize)]
pub struct ToggleConditionResponse {
    pub condition: Condition,
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct CombatantResponse {
    pub id: String,
    pub name: String,
    pub kind: CombatantKind,
    pub initiative: i32,
    pub initiative_modifier: i32,
    pub hp: i32,
    pub max_hp: i32,
    pub armor_class: i32,
    pub conditions: Vec<Condition>,
    pub xp_value: u32,
    pub defeated: bool,
    pub is_active_turn: bool,
}

impl CombatantResponse {
    fn new(combatant: &Combatant, active_id: Option<CombatantId>) -> Self {
        Self {
            id: combatant.id.to_string(),
            name: combatant.name.clone(),
            kind: combatant.kind,
            initiative: combatant.initiative,
            initiative_modifier: combatant.initiative_modifier,
            hp: combatant.hp(),
            max_hp: combatant.max_hp(),
            armor_class: combatant.armor_class,
            conditions: combatant.conditions().to_vec(),
            xp_value: combatant.xp_value,
            defeated: combatant.is_defeated(),
            is_active_turn: active_id == Some(combatant.id),
        }
    }
}

impl From<Combatant> for CombatantResponse {
    fn from(combatant: Combatant) -> Self {
        Self::new(&combatant, None)
    }
}

#[derive(Debug, Serialize)]
pub struct EncounterResponse {
    pub round: u32,
    pub turn_index: usize,
    pub active_id: Option<String>,
    pub combatants: Vec<CombatantResponse>,
}

impl From<EncounterState> for EncounterResponse {
    fn from(state: EncounterState) -> Self {
        let active_id = state.active_id();
        Self {
            round: state.round(),
            turn_index: state.turn_index(),
            active_id: active_id.map(|id| id.to_string()),
            combatants: state
                .roster()
                .iter()
                .map(|c| CombatantResponse::new(c, active_id))
                .collect(),
        }
    }
}

fn parse_combatant_id(id: &str) -> Result<CombatantId, (StatusCode, String)> {
    CombatantId::parse(id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid combatant ID".to_string()))
}

fn internal_error(e: anyhow::Error) -> (StatusCode, String) {
    tracing::error!("Encounter request failed: {:#}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn combatant_not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "Combatant not found".to_string())
}

/// Get the current encounter
pub async fn get_encounter(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EncounterResponse>, (StatusCode, String)> {
    let encounter = state
        .encounter_service
        .get_state()
        .await
        .map_err(internal_error)?;

    Ok(Json(EncounterResponse::from(encounter)))
}

/// Add a combatant to the encounter
pub async fn add_combatant(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewCombatant>,
) -> Result<(StatusCode, Json<CombatantResponse>), (StatusCode, String)> {
    let combatant = state
        .encounter_service
        .add_combatant(req)
        .await
        .map_err(internal_error)?;

    Ok((StatusCode::CREATED, Json(CombatantResponse::from(combatant))))
}

/// Remove a combatant from the encounter
pub async fn remove_combatant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_combatant_id(&id)?;

    state
        .encounter_service
        .remove_combatant(id)
        .await
        .map_err(internal_error)?
        .ok_or_else(combatant_not_found)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Apply damage or healing to a combatant
pub async fn apply_hp(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ApplyHpRequest>,
) -> Result<Json<HpChange>, (StatusCode, String)> {
    let id = parse_combatant_id(&id)?;

    let change = state
        .encounter_service
        .apply_hp(id, req.amount, req.kind)
        .await
        .map_err(internal_error)?
        .ok_or_else(combatant_not_found)?;

    Ok(Json(change))
}

/// Toggle a status condition on a combatant
pub async fn toggle_condition(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ToggleConditionRequest>,
) -> Result<Json<ToggleConditionResponse>, (StatusCode, String)> {
    let id = parse_combatant_id(&id)?;
    let condition = req
        .into_condition()
        .ok_or_else(|| (StatusCode::BAD_REQUEST, "Condition ID is required".to_string()))?;

    let active = state
        .encounter_service
        .toggle_condition(id, condition.clone())
        .await
        .map_err(internal_error)?
        .ok_or_else(combatant_not_found)?;

    Ok(Json(ToggleConditionResponse { condition, active }))
}

/// Roll initiative without applying it
pub async fn roll_initiative(
    State(state): State<Arc<AppState>>,
    req: Option<Json<RollInitiativeRequest>>,
) -> Result<Json<HashMap<CombatantId, i32>>, (StatusCode, String)> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let rolls = state
        .encounter_service
        .roll_initiative(req)
        .await
        .map_err(internal_error)?;

    Ok(Json(rolls))
}

/// Apply initiative values and start the turn order
pub async fn commit_initiative(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CommitInitiativeRequest>,
) -> Result<Json<EncounterResponse>, (StatusCode, String)> {
    let encounter = state
        .encounter_service
        .commit_initiative(req.values)
        .await
        .map_err(internal_error)?;

    Ok(Json(EncounterResponse::from(encounter)))
}

/// Re-sort by the current initiative values
pub async fn sort_initiative(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EncounterResponse>, (StatusCode, String)> {
    let encounter = state
        .encounter_service
        .sort_by_initiative()
        .await
        .map_err(internal_error)?;

    Ok(Json(EncounterResponse::from(encounter)))
}

/// Advance to the next turn
pub async fn next_turn(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EncounterResponse>, (StatusCode, String)> {
    let (_, encounter) = state
        .encounter_service
        .advance_turn()
        .await
        .map_err(internal_error)?;

    Ok(Json(EncounterResponse::from(encounter)))
}

/// End the encounter; without a body only players stay
pub async fn end_encounter(
    State(state): State<Arc<AppState>>,
    req: Option<Json<EndEncounterRequest>>,
) -> Result<Json<EncounterResponse>, (StatusCode, String)> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let keep_kinds = req.keep_kinds.unwrap_or_else(|| vec![CombatantKind::Player]);

    let encounter = state
        .encounter_service
        .end_encounter(keep_kinds)
        .await
        .map_err(internal_error)?;

    Ok(Json(EncounterResponse::from(encounter)))
}

/// Classify the encounter against the stored party
pub async fn get_difficulty(
    State(state): State<Arc<AppState>>,
) -> Result<Json<EncounterResult>, (StatusCode, String)> {
    let result = state
        .encounter_service
        .calculate_difficulty()
        .await
        .map_err(internal_error)?;

    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_request_resolves_standard_and_custom_conditions() {
        let standard = ToggleConditionRequest {
            condition_id: "Poisoned".to_string(),
            name: None,
        };
        assert_eq!(standard.into_condition().unwrap().name, "Poisoned");

        let custom = ToggleConditionRequest {
            condition_id: "hexed".to_string(),
            name: Some("Hexed".to_string()),
        };
        let condition = custom.into_condition().unwrap();
        assert_eq!(condition.id, "hexed");
        assert_eq!(condition.name, "Hexed");

        let empty = ToggleConditionRequest {
            condition_id: " ".to_string(),
            name: None,
        };
        assert!(empty.into_condition().is_none());
    }
}
