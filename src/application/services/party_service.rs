//! Party Service - Application service for the adventuring party
//!
//! The party roster is the read-only input of the difficulty classifier. It is
//! stored as one document, so edits load the whole roster, change it and save
//! it back under a lock.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::PartyRepositoryPort;
use crate::domain::entities::PartyMember;
use crate::domain::value_objects::PartyMemberId;

const MAX_NAME_LENGTH: usize = 255;

/// Rejected party input; the HTTP layer maps this to 400
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// Request to add a party member
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartyMemberRequest {
    pub name: String,
    pub level: u8,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Request to update a party member
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePartyMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Party service trait defining the party use cases
#[async_trait]
pub trait PartyService: Send + Sync {
    async fn list_members(&self) -> Result<Vec<PartyMember>>;

    async fn add_member(&self, request: CreatePartyMemberRequest) -> Result<PartyMember>;

    /// Update a member; `None` if the id is unknown
    async fn update_member(
        &self,
        id: PartyMemberId,
        request: UpdatePartyMemberRequest,
    ) -> Result<Option<PartyMember>>;

    /// Returns whether a member was removed
    async fn remove_member(&self, id: PartyMemberId) -> Result<bool>;
}

/// Default implementation of PartyService
pub struct PartyServiceImpl {
    repository: Arc<dyn PartyRepositoryPort>,
    write_lock: Mutex<()>,
}

impl PartyServiceImpl {
    pub fn new(repository: Arc<dyn PartyRepositoryPort>) -> Self {
        Self {
            repository,
            write_lock: Mutex::new(()),
        }
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ValidationError("Party member name cannot be empty".to_string()).into());
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(ValidationError(format!(
                "Party member name cannot exceed {} characters",
                MAX_NAME_LENGTH
            ))
            .into());
        }
        Ok(())
    }

    fn validate_level(level: u8) -> Result<()> {
        if !(PartyMember::MIN_LEVEL..=PartyMember::MAX_LEVEL).contains(&level) {
            return Err(ValidationError(format!(
                "Party member level must be between {} and {}",
                PartyMember::MIN_LEVEL,
                PartyMember::MAX_LEVEL
            ))
            .into());
        }
        Ok(())
    }

    fn validate_update_request(request: &UpdatePartyMemberRequest) -> Result<()> {
        if let Some(ref name) = request.name {
            Self::validate_name(name)?;
        }
        if let Some(level) = request.level {
            Self::validate_level(level)?;
        }
        Ok(())
    }

    async fn load(&self) -> Result<Vec<PartyMember>> {
        self.repository.load().await.context("Failed to load party")
    }

    async fn save(&self, party: &[PartyMember]) -> Result<()> {
        self.repository.save(party).await.context("Failed to save party")
    }
}

#[async_trait]
impl PartyService for PartyServiceImpl {
    #[instrument(skip(self))]
    async fn list_members(&self) -> Result<Vec<PartyMember>> {
        debug!("Listing party members");
        self.load().await
    }

    #[instrument(skip(self), fields(name = %request.name))]
    async fn add_member(&self, request: CreatePartyMemberRequest) -> Result<PartyMember> {
        Self::validate_name(&request.name)?;
        Self::validate_level(request.level)?;

        let mut member = PartyMember::new(request.name.trim(), request.level);
        member.active = request.active;

        let _guard = self.write_lock.lock().await;
        let mut party = self.load().await?;
        party.push(member.clone());
        self.save(&party).await?;

        info!(member_id = %member.id, level = member.level, "Added party member: {}", member.name);
        Ok(member)
    }

    #[instrument(skip(self), fields(member_id = %id))]
    async fn update_member(
        &self,
        id: PartyMemberId,
        request: UpdatePartyMemberRequest,
    ) -> Result<Option<PartyMember>> {
        Self::validate_update_request(&request)?;

        let _guard = self.write_lock.lock().await;
        let mut party = self.load().await?;
        let Some(member) = party.iter_mut().find(|m| m.id == id) else {
            debug!("Party member not found");
            return Ok(None);
        };

        if let Some(name) = request.name {
            member.name = name.trim().to_string();
        }
        if let Some(level) = request.level {
            member.set_level(level);
        }
        if let Some(active) = request.active {
            member.active = active;
        }
        let updated = member.clone();
        self.save(&party).await?;

        info!(level = updated.level, active = updated.active, "Updated party member: {}", updated.name);
        Ok(Some(updated))
    }

    #[instrument(skip(self), fields(member_id = %id))]
    async fn remove_member(&self, id: PartyMemberId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut party = self.load().await?;
        let before = party.len();
        party.retain(|m| m.id != id);
        if party.len() == before {
            return Ok(false);
        }
        self.save(&party).await?;

        info!("Removed party member");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::InMemoryPartyRepository;

    fn service() -> PartyServiceImpl {
        PartyServiceImpl::new(Arc::new(InMemoryPartyRepository::new()))
    }

    fn request(name: &str, level: u8) -> CreatePartyMemberRequest {
        CreatePartyMemberRequest {
            name: name.to_string(),
            level,
            active: true,
        }
    }

    #[test]
    fn test_update_request_validation() {
        let request = UpdatePartyMemberRequest {
            name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(PartyServiceImpl::validate_update_request(&request).is_err());

        let request = UpdatePartyMemberRequest {
            level: Some(21),
            ..Default::default()
        };
        assert!(PartyServiceImpl::validate_update_request(&request).is_err());

        assert!(PartyServiceImpl::validate_update_request(&UpdatePartyMemberRequest::default()).is_ok());
    }

    #[tokio::test]
    async fn test_add_update_remove_member() {
        let service = service();
        let aria = service.add_member(request("Aria", 3)).await.unwrap();
        service.add_member(request("Borin", 4)).await.unwrap();

        let updated = service
            .update_member(
                aria.id,
                UpdatePartyMemberRequest {
                    level: Some(5),
                    active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.level, 5);
        assert!(!updated.active);

        assert!(service.remove_member(aria.id).await.unwrap());
        assert!(!service.remove_member(aria.id).await.unwrap());

        let members = service.list_members().await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "Borin");
    }

    #[tokio::test]
    async fn test_add_member_rejects_bad_input() {
        let service = service();
        let error = service.add_member(request("", 3)).await.unwrap_err();
        assert!(error.downcast_ref::<ValidationError>().is_some());
        assert!(service.add_member(request("Aria", 0)).await.is_err());
        assert!(service.list_members().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_member() {
        let service = service();
        let result = service
            .update_member(PartyMemberId::new(), UpdatePartyMemberRequest::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
