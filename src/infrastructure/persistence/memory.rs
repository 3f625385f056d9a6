//! In-memory repositories
//!
//! Values are kept as serialized JSON, so they go through the same flat
//! representation as the SQLite store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::outbound::{
    EncounterRepositoryPort, PartyRepositoryPort, RepositoryError,
};
use crate::domain::aggregates::EncounterState;
use crate::domain::entities::PartyMember;

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(json).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

#[derive(Default)]
pub struct InMemoryEncounterRepository {
    document: RwLock<Option<String>>,
}

impl InMemoryEncounterRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EncounterRepositoryPort for InMemoryEncounterRepository {
    async fn load(&self) -> Result<Option<EncounterState>, RepositoryError> {
        self.document.read().await.as_deref().map(from_json).transpose()
    }

    async fn save(&self, state: &EncounterState) -> Result<(), RepositoryError> {
        let json = to_json(state)?;
        *self.document.write().await = Some(json);
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        *self.document.write().await = None;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPartyRepository {
    document: RwLock<Option<String>>,
}

impl InMemoryPartyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PartyRepositoryPort for InMemoryPartyRepository {
    async fn load(&self) -> Result<Vec<PartyMember>, RepositoryError> {
        match self.document.read().await.as_deref() {
            Some(json) => from_json(json),
            None => Ok(Vec::new()),
        }
    }

    async fn save(&self, party: &[PartyMember]) -> Result<(), RepositoryError> {
        let json = to_json(party)?;
        *self.document.write().await = Some(json);
        Ok(())
    }
}
