//! Repository ports - Interfaces for encounter and party persistence
//!
//! The encounter and the party are each stored as a single flat document, so
//! both ports load and save whole values rather than individual rows.

use async_trait::async_trait;

use crate::domain::aggregates::EncounterState;
use crate::domain::entities::PartyMember;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Repository port for the live encounter
#[async_trait]
pub trait EncounterRepositoryPort: Send + Sync {
    /// Load the saved encounter, `None` if nothing has been saved yet
    async fn load(&self) -> Result<Option<EncounterState>, RepositoryError>;

    /// Replace the saved encounter
    async fn save(&self, state: &EncounterState) -> Result<(), RepositoryError>;

    /// Forget the saved encounter
    async fn clear(&self) -> Result<(), RepositoryError>;
}

/// Repository port for the party roster consumed by the difficulty classifier
#[async_trait]
pub trait PartyRepositoryPort: Send + Sync {
    async fn load(&self) -> Result<Vec<PartyMember>, RepositoryError>;

    async fn save(&self, party: &[PartyMember]) -> Result<(), RepositoryError>;
}
