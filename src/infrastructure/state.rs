//! Shared application state

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::application::ports::outbound::{EncounterRepositoryPort, PartyRepositoryPort};
use crate::application::services::{
    EncounterService, EncounterServiceImpl, PartyService, PartyServiceImpl,
};
use crate::domain::events::EncounterEvent;
use crate::infrastructure::config::{AppConfig, StorageBackend};
use crate::infrastructure::event_bus::BroadcastEventBus;
use crate::infrastructure::persistence::{
    connect, InMemoryEncounterRepository, InMemoryPartyRepository, SqliteEncounterRepository,
    SqliteKeyValueStore, SqlitePartyRepository,
};

/// Shared application state
pub struct AppState {
    pub config: AppConfig,
    /// Live encounter events, fanned out to WebSocket subscribers
    pub event_bus: Arc<BroadcastEventBus<EncounterEvent>>,
    // Application services
    pub encounter_service: Arc<dyn EncounterService>,
    pub party_service: Arc<dyn PartyService>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let (encounter_repository, party_repository): (
            Arc<dyn EncounterRepositoryPort>,
            Arc<dyn PartyRepositoryPort>,
        ) = match config.storage_backend {
            StorageBackend::Sqlite => {
                let pool = connect(&config.database_url)
                    .await
                    .with_context(|| format!("Failed to open database {}", config.database_url))?;
                let store = SqliteKeyValueStore::new(pool)
                    .await
                    .context("Failed to initialize key-value store")?;
                tracing::info!("Using SQLite storage at {}", config.database_url);
                let encounters: Arc<dyn EncounterRepositoryPort> =
                    Arc::new(SqliteEncounterRepository::new(store.clone()));
                let party: Arc<dyn PartyRepositoryPort> =
                    Arc::new(SqlitePartyRepository::new(store));
                (encounters, party)
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; encounters will not survive a restart");
                let encounters: Arc<dyn EncounterRepositoryPort> =
                    Arc::new(InMemoryEncounterRepository::new());
                let party: Arc<dyn PartyRepositoryPort> = Arc::new(InMemoryPartyRepository::new());
                (encounters, party)
            }
        };

        Ok(Self::with_repositories(
            config,
            encounter_repository,
            party_repository,
        ))
    }

    pub fn with_repositories(
        config: AppConfig,
        encounter_repository: Arc<dyn EncounterRepositoryPort>,
        party_repository: Arc<dyn PartyRepositoryPort>,
    ) -> Self {
        let event_bus = Arc::new(BroadcastEventBus::new(config.event_channel_capacity));

        let encounter_service = Arc::new(EncounterServiceImpl::new(
            encounter_repository,
            party_repository.clone(),
            event_bus.clone(),
            config.initiative_dice_sides,
        ));
        let party_service = Arc::new(PartyServiceImpl::new(party_repository));

        Self {
            config,
            event_bus,
            encounter_service,
            party_service,
        }
    }
}
