//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Persistence: SQLite and in-memory adapters for encounter and party storage
//! - HTTP: REST API routes
//! - WebSocket: Live encounter event feed
//! - Config: Application configuration
//! - State: Shared application state

pub mod config;
pub mod event_bus;
pub mod http;
pub mod persistence;
pub mod state;
pub mod websocket;
