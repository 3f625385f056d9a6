//! SQLite-backed encounter repository

use async_trait::async_trait;

use super::SqliteKeyValueStore;
use crate::application::ports::outbound::{EncounterRepositoryPort, RepositoryError};
use crate::domain::aggregates::EncounterState;

const ENCOUNTER_KEY: &str = "encounter_state";

pub struct SqliteEncounterRepository {
    store: SqliteKeyValueStore,
}

impl SqliteEncounterRepository {
    pub fn new(store: SqliteKeyValueStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EncounterRepositoryPort for SqliteEncounterRepository {
    async fn load(&self) -> Result<Option<EncounterState>, RepositoryError> {
        self.store.get_json(ENCOUNTER_KEY).await
    }

    async fn save(&self, state: &EncounterState) -> Result<(), RepositoryError> {
        self.store.put_json(ENCOUNTER_KEY, state).await
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        self.store.delete(ENCOUNTER_KEY).await
    }
}
