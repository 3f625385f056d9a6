//! SQLite-backed party repository

use async_trait::async_trait;

use super::SqliteKeyValueStore;
use crate::application::ports::outbound::{PartyRepositoryPort, RepositoryError};
use crate::domain::entities::PartyMember;

const PARTY_KEY: &str = "party";

pub struct SqlitePartyRepository {
    store: SqliteKeyValueStore,
}

impl SqlitePartyRepository {
    pub fn new(store: SqliteKeyValueStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PartyRepositoryPort for SqlitePartyRepository {
    async fn load(&self) -> Result<Vec<PartyMember>, RepositoryError> {
        Ok(self.store.get_json(PARTY_KEY).await?.unwrap_or_default())
    }

    async fn save(&self, party: &[PartyMember]) -> Result<(), RepositoryError> {
        self.store.put_json(PARTY_KEY, &party).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::persistence::connect;

    #[tokio::test]
    async fn test_party_round_trip() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let repository = SqlitePartyRepository::new(SqliteKeyValueStore::new(pool).await.unwrap());
        assert!(repository.load().await.unwrap().is_empty());

        let party = vec![PartyMember::new("Aria", 4), PartyMember::new("Borin", 5).inactive()];
        repository.save(&party).await.unwrap();

        assert_eq!(repository.load().await.unwrap(), party);
    }
}
