//! Application configuration

use std::env;

use anyhow::{Context, Result};

/// Where encounter and party documents are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    /// Nothing survives a restart; useful for demos and tests
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("Unknown storage backend '{}', expected sqlite or memory", other),
        }
    }
}

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection URL
    pub database_url: String,
    pub storage_backend: StorageBackend,

    /// HTTP server port
    pub server_port: u16,

    /// Buffered events per WebSocket subscriber before it starts lagging
    pub event_channel_capacity: usize,

    /// Die used when an initiative roll does not name one
    pub initiative_dice_sides: u32,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://dm_companion.db?mode=rwc".to_string()),
            storage_backend: lookup("STORAGE_BACKEND")
                .unwrap_or_else(|| "sqlite".to_string())
                .parse()?,

            server_port: lookup("SERVER_PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .context("SERVER_PORT must be a valid port number")?,

            event_channel_capacity: lookup("EVENT_CHANNEL_CAPACITY")
                .unwrap_or_else(|| "256".to_string())
                .parse()
                .context("EVENT_CHANNEL_CAPACITY must be a positive integer")?,

            initiative_dice_sides: lookup("INITIATIVE_DICE_SIDES")
                .unwrap_or_else(|| "20".to_string())
                .parse()
                .context("INITIATIVE_DICE_SIDES must be a positive integer")?,
        })
    }
}
