//! DM Companion Engine - encounter tracker backend
//!
//! The engine is the backend server that:
//! - Tracks combatants, initiative order, turns, HP and conditions
//! - Classifies encounter difficulty against the stored party
//! - Persists the live encounter in SQLite so it survives a reload
//! - Streams encounter events to the UI over WebSocket

mod application;
mod domain;
mod infrastructure;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http;
use crate::infrastructure::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dm_companion_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DM Companion Engine");

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!("Configuration loaded");
    tracing::info!("  Storage: {:?}", config.storage_backend);
    tracing::info!("  Initiative die: d{}", config.initiative_dice_sides);

    let port = config.server_port;

    // Initialize application state
    let state = Arc::new(AppState::new(config).await?);
    tracing::info!("Application state initialized");

    let app = build_router(state.clone());

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let event_bus = state.event_bus.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received, closing event feed...");
            // Ends every WebSocket subscriber so the server can drain
            event_bus.close();
        })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ws/encounter", get(infrastructure::websocket::ws_handler))
        // Merge REST API routes
        .merge(http::create_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::infrastructure::config::StorageBackend;
    use crate::infrastructure::persistence::{InMemoryEncounterRepository, InMemoryPartyRepository};

    fn test_app() -> Router {
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            storage_backend: StorageBackend::Memory,
            server_port: 0,
            event_channel_capacity: 16,
            initiative_dice_sides: 20,
        };
        let state = AppState::with_repositories(
            config,
            Arc::new(InMemoryEncounterRepository::new()),
            Arc::new(InMemoryPartyRepository::new()),
        );
        build_router(Arc::new(state))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_encounter_flow_over_http() {
        let app = test_app();

        let (status, aria) = send(
            &app,
            "POST",
            "/api/encounter/combatants",
            Some(json!({ "name": "Aria", "kind": "player", "max_hp": 30 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, goblin) = send(
            &app,
            "POST",
            "/api/encounter/combatants",
            Some(json!({ "name": "Goblin", "kind": "monster", "max_hp": 7, "xp_value": 50 })),
        )
        .await;

        let aria_id = aria["id"].as_str().unwrap().to_string();
        let goblin_id = goblin["id"].as_str().unwrap().to_string();

        let mut values = serde_json::Map::new();
        values.insert(aria_id.clone(), json!(12));
        values.insert(goblin_id.clone(), json!(18));
        let (status, state) = send(
            &app,
            "POST",
            "/api/encounter/initiative/commit",
            Some(json!({ "values": values })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["combatants"][0]["name"], "Goblin");
        assert_eq!(state["active_id"], goblin_id.as_str());
        assert_eq!(state["round"], 1);

        let (_, state) = send(&app, "POST", "/api/encounter/turn/next", None).await;
        assert_eq!(state["active_id"], aria_id.as_str());
        assert_eq!(state["turn_index"], 1);

        let (_, state) = send(&app, "POST", "/api/encounter/turn/next", None).await;
        assert_eq!(state["round"], 2);
        assert_eq!(state["turn_index"], 0);

        let (status, change) = send(
            &app,
            "POST",
            &format!("/api/encounter/combatants/{}/hp", goblin_id),
            Some(json!({ "amount": 10, "kind": "damage" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(change["hp"], 0);
        assert_eq!(change["knocked_out"], true);

        let (status, toggled) = send(
            &app,
            "POST",
            &format!("/api/encounter/combatants/{}/conditions", aria_id),
            Some(json!({ "condition_id": "poisoned" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(toggled["active"], true);

        let (status, state) = send(&app, "POST", "/api/encounter/end", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["round"], 1);
        assert_eq!(state["combatants"].as_array().unwrap().len(), 1);
        assert_eq!(state["combatants"][0]["name"], "Aria");
        assert!(state["active_id"].is_null());
    }

    #[tokio::test]
    async fn test_bodyless_requests_use_defaults() {
        let app = test_app();
        let (_, goblin) = send(
            &app,
            "POST",
            "/api/encounter/combatants",
            Some(json!({ "name": "Goblin", "kind": "monster", "max_hp": 7 })),
        )
        .await;
        let goblin_id = goblin["id"].as_str().unwrap().to_string();

        let (status, rolls) = send(&app, "POST", "/api/encounter/initiative/roll", None).await;
        assert_eq!(status, StatusCode::OK);
        let roll = rolls[goblin_id.as_str()].as_i64().unwrap();
        assert!((1..=20).contains(&roll));

        let (status, state) = send(
            &app,
            "POST",
            "/api/encounter/end",
            Some(json!({ "keep_kinds": ["monster"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["combatants"][0]["id"], goblin_id.as_str());

        let (status, state) = send(&app, "POST", "/api/encounter/end", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(state["combatants"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_combatant_id_errors() {
        let app = test_app();

        let (status, _) = send(&app, "DELETE", "/api/encounter/combatants/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let unknown = uuid::Uuid::new_v4();
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/encounter/combatants/{}/hp", unknown),
            Some(json!({ "amount": 5, "kind": "heal" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_party_and_difficulty() {
        let app = test_app();

        for name in ["Aria", "Borin", "Cato", "Dree"] {
            let (status, _) = send(
                &app,
                "POST",
                "/api/party",
                Some(json!({ "name": name, "level": 1 })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, _) = send(&app, "POST", "/api/party", Some(json!({ "name": "Eve", "level": 0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        send(
            &app,
            "POST",
            "/api/encounter/combatants",
            Some(json!({ "name": "Bugbear", "kind": "monster", "max_hp": 27, "xp_value": 200 })),
        )
        .await;

        let (status, result) = send(&app, "GET", "/api/encounter/difficulty", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result["total_xp"], 200);
        assert_eq!(result["difficulty"], "medium");
    }

    #[tokio::test]
    async fn test_dice_routes() {
        let app = test_app();

        let (status, roll) = send(&app, "POST", "/api/dice/roll", Some(json!({ "expression": "2d6+3" }))).await;
        assert_eq!(status, StatusCode::OK);
        let total = roll["total"].as_i64().unwrap();
        assert!((5..=15).contains(&total));

        let (status, _) = send(&app, "POST", "/api/dice/roll", Some(json!({ "expression": "banana" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, action) = send(
            &app,
            "POST",
            "/api/dice/parse-action",
            Some(json!({ "text": "Scimitar. Hit: 5 (1d6 + 2) slashing damage." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(action["dice"], json!(["1d6+2"]));

        let (_, conditions) = send(&app, "GET", "/api/conditions", None).await;
        assert_eq!(conditions.as_array().unwrap().len(), 15);
    }
}
