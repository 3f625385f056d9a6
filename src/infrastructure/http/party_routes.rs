//! Party API routes

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::application::services::{
    CreatePartyMemberRequest, UpdatePartyMemberRequest, ValidationError,
};
use crate::domain::entities::PartyMember;
use crate::domain::value_objects::PartyMemberId;
use crate::infrastructure::state::AppState;

#[derive(Debug, Serialize)]
pub struct PartyMemberResponse {
    pub id: String,
    pub name: String,
    pub level: u8,
    pub active: bool,
}

impl From<PartyMember> for PartyMemberResponse {
    fn from(member: PartyMember) -> Self {
        Self {
            id: member.id.to_string(),
            name: member.name,
            level: member.level,
            active: member.active,
        }
    }
}

fn parse_member_id(id: &str) -> Result<PartyMemberId, (StatusCode, String)> {
    PartyMemberId::parse(id)
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid party member ID".to_string()))
}

fn service_error(e: anyhow::Error) -> (StatusCode, String) {
    match e.downcast_ref::<ValidationError>() {
        Some(validation) => (StatusCode::BAD_REQUEST, validation.to_string()),
        None => {
            tracing::error!("Party request failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// List party members
pub async fn list_party(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PartyMemberResponse>>, (StatusCode, String)> {
    let members = state
        .party_service
        .list_members()
        .await
        .map_err(service_error)?;

    Ok(Json(members.into_iter().map(PartyMemberResponse::from).collect()))
}

/// Add a party member
pub async fn create_party_member(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePartyMemberRequest>,
) -> Result<(StatusCode, Json<PartyMemberResponse>), (StatusCode, String)> {
    let member = state
        .party_service
        .add_member(req)
        .await
        .map_err(service_error)?;

    Ok((StatusCode::CREATED, Json(PartyMemberResponse::from(member))))
}

/// Update a party member
pub async fn update_party_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePartyMemberRequest>,
) -> Result<Json<PartyMemberResponse>, (StatusCode, String)> {
    let id = parse_member_id(&id)?;

    let member = state
        .party_service
        .update_member(id, req)
        .await
        .map_err(service_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Party member not found".to_string()))?;

    Ok(Json(PartyMemberResponse::from(member)))
}

/// Remove a party member
pub async fn delete_party_member(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_member_id(&id)?;

    let removed = state
        .party_service
        .remove_member(id)
        .await
        .map_err(service_error)?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err((StatusCode::NOT_FOUND, "Party member not found".to_string()))
    }
}
