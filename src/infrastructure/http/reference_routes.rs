//! Reference data and dice utility routes

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ActionText, Condition, DiceExpression, DiceRoll};

#[derive(Debug, Deserialize)]
pub struct RollDiceRequest {
    pub expression: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseActionRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct RollDiceResponse {
    /// Normalized notation, e.g. `2d6+3`
    pub notation: String,
    #[serde(flatten)]
    pub roll: DiceRoll,
}

/// List the standard status conditions
pub async fn list_conditions() -> Json<Vec<Condition>> {
    Json(Condition::catalog())
}

/// Roll a dice expression such as `2d6+3`
pub async fn roll_dice(
    Json(req): Json<RollDiceRequest>,
) -> Result<Json<RollDiceResponse>, (StatusCode, String)> {
    let expression: DiceExpression = req
        .expression
        .parse::<DiceExpression>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let roll = expression.roll(&mut rand::thread_rng());
    tracing::debug!(notation = %expression, total = roll.total, "Rolled dice");

    Ok(Json(RollDiceResponse {
        notation: expression.to_string(),
        roll,
    }))
}

#[derive(Debug, Serialize)]
pub struct ParseActionResponse {
    #[serde(flatten)]
    pub action: ActionText,
    /// Normalized notation of every dice segment, in order
    pub dice: Vec<String>,
}

/// Split statblock action text into plain text and dice segments
pub async fn parse_action(Json(req): Json<ParseActionRequest>) -> Json<ParseActionResponse> {
    let action = ActionText::parse(&req.text);
    let dice = action.dice().map(DiceExpression::to_string).collect();
    Json(ParseActionResponse { action, dice })
}
