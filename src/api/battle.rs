//! Battle endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::Result;
use crate::models::{
    ApiResponse, BattleOutcome, BattlePreviewView, BattleRecordView, BattleStatsView, EnemyView,
    TxOutcome,
};
use crate::services::battle;

#[derive(Deserialize)]
pub struct BattleRequest {
    pub warrior_id: String,
    pub weapon_id: String,
    pub enemy_id: String,
}

#[derive(Serialize)]
pub struct BattleResponse {
    pub outcome: TxOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battle: Option<BattleOutcome>,
}

pub async fn enemies(
    State(state): State<AppState>,
    Path(warrior_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<EnemyView>>>> {
    let b = super::require_connected(&state).await?;
    let warrior_id = super::parse_token_id(&warrior_id)?;
    let enemies = battle::recommended_enemies(&b, warrior_id).await?;
    Ok(Json(ApiResponse::success(enemies)))
}

pub async fn preview(
    State(state): State<AppState>,
    Json(req): Json<BattleRequest>,
) -> Result<Json<ApiResponse<BattlePreviewView>>> {
    let b = super::require_connected(&state).await?;
    let preview = battle::preview(
        &b,
        super::parse_token_id(&req.warrior_id)?,
        super::parse_token_id(&req.weapon_id)?,
        super::parse_token_id(&req.enemy_id)?,
    )
    .await?;
    Ok(Json(ApiResponse::success(preview)))
}

pub async fn execute(
    State(state): State<AppState>,
    Json(req): Json<BattleRequest>,
) -> Result<Json<ApiResponse<BattleResponse>>> {
    let b = super::require_connected(&state).await?;
    let (outcome, battle) = battle::execute_battle(
        &b,
        super::parse_token_id(&req.warrior_id)?,
        super::parse_token_id(&req.weapon_id)?,
        super::parse_token_id(&req.enemy_id)?,
    )
    .await?;
    Ok(Json(ApiResponse::success(BattleResponse {
        outcome,
        battle,
    })))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<ApiResponse<BattleStatsView>>> {
    let b = super::require_connected(&state).await?;
    Ok(Json(ApiResponse::success(battle::stats(&b).await?)))
}

pub async fn history(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<BattleRecordView>>>> {
    let b = super::require_connected(&state).await?;
    Ok(Json(ApiResponse::success(battle::history(&b).await?)))
}
