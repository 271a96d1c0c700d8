//! Warrior roster and minting endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::error::Result;
use crate::models::{ApiResponse, TxOutcome, WarriorView};
use crate::services::warriors;
use crate::utils::format_war;

#[derive(Serialize)]
pub struct MintWarriorResponse {
    pub outcome: TxOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    pub price_paid: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<WarriorView>>>> {
    let b = super::require_connected(&state).await?;
    let roster = warriors::list_warriors(&b).await?;
    Ok(Json(ApiResponse::success(roster)))
}

pub async fn mint(State(state): State<AppState>) -> Result<Json<ApiResponse<MintWarriorResponse>>> {
    let b = super::require_connected(&state).await?;
    let price = warriors::mint_price(&b).await;
    let (outcome, token_id) = warriors::mint_warrior(&b).await?;
    Ok(Json(ApiResponse::success(MintWarriorResponse {
        outcome,
        token_id: token_id.map(|id| id.to_string()),
        price_paid: format_war(price),
    })))
}
