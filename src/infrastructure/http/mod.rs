//! HTTP REST API routes

mod encounter_routes;
mod party_routes;
mod reference_routes;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;

use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Encounter routes
        .route("/api/encounter", get(encounter_routes::get_encounter))
        .route(
            "/api/encounter/combatants",
            post(encounter_routes::add_combatant),
        )
        .route(
            "/api/encounter/combatants/{id}",
            delete(encounter_routes::remove_combatant),
        )
        .route(
            "/api/encounter/combatants/{id}/hp",
            post(encounter_routes::apply_hp),
        )
        .route(
            "/api/encounter/combatants/{id}/conditions",
            post(encounter_routes::toggle_condition),
        )
        .route(
            "/api/encounter/initiative/roll",
            post(encounter_routes::roll_initiative),
        )
        .route(
            "/api/encounter/initiative/commit",
            post(encounter_routes::commit_initiative),
        )
        .route(
            "/api/encounter/initiative/sort",
            post(encounter_routes::sort_initiative),
        )
        .route("/api/encounter/turn/next", post(encounter_routes::next_turn))
        .route("/api/encounter/end", post(encounter_routes::end_encounter))
        .route(
            "/api/encounter/difficulty",
            get(encounter_routes::get_difficulty),
        )
        // Party routes
        .route("/api/party", get(party_routes::list_party))
        .route("/api/party", post(party_routes::create_party_member))
        .route("/api/party/{id}", put(party_routes::update_party_member))
        .route("/api/party/{id}", delete(party_routes::delete_party_member))
        // Reference routes
        .route("/api/conditions", get(reference_routes::list_conditions))
        .route("/api/dice/roll", post(reference_routes::roll_dice))
        .route(
            "/api/dice/parse-action",
            post(reference_routes::parse_action),
        )
}
