//! Admin console endpoints. Every handler re-checks the on-chain admin role
//! for the session account before doing anything.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::{ApiResponse, TxOutcome};
use crate::services::admin::{self, AdminOverview, FeatureStatus, GameParamsView};
use crate::session::ContractBindings;

#[derive(Deserialize)]
pub struct FeatureTogglesRequest {
    pub minting_enabled: Option<bool>,
    pub battle_enabled: Option<bool>,
    pub marketplace_enabled: Option<bool>,
}

#[derive(Deserialize)]
pub struct MintPricesRequest {
    pub warrior_mint_price: Option<String>,
    pub weapon_mint_price: Option<String>,
}

#[derive(Deserialize)]
pub struct StaminaParamsRequest {
    pub max_stamina: u64,
    pub recovery_secs: u64,
}

#[derive(Deserialize)]
pub struct BattleParamsRequest {
    pub base_reward: Option<String>,
    pub cooldown_secs: Option<u64>,
    pub stamina_cost: Option<u64>,
    pub base_experience: Option<String>,
}

#[derive(Deserialize)]
pub struct FeeRequest {
    pub percent: u64,
}

#[derive(Deserialize)]
pub struct PauseRequest {
    pub paused: bool,
}

#[derive(Deserialize)]
pub struct AmountRequest {
    pub amount: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrantableRole {
    GameAdmin,
    RewardDistributor,
}

#[derive(Deserialize)]
pub struct GrantRoleRequest {
    pub role: GrantableRole,
    pub account: String,
}

#[derive(Serialize)]
pub struct AdminStatusResponse {
    pub account: String,
    pub is_admin: bool,
}

async fn require_admin_bindings(state: &AppState) -> Result<Arc<ContractBindings>> {
    let b = super::require_connected(state).await?;
    admin::require_admin(&b).await?;
    Ok(b)
}

/// Admin gate check without side effects, for the console to decide whether
/// to render at all.
pub async fn status(State(state): State<AppState>) -> Result<Json<ApiResponse<AdminStatusResponse>>> {
    let b = super::require_connected(&state).await?;
    let is_admin = match admin::require_admin(&b).await {
        Ok(()) => true,
        Err(AppError::AuthError(_)) => false,
        Err(e) => return Err(e),
    };
    Ok(Json(ApiResponse::success(AdminStatusResponse {
        account: format!("{:?}", b.account),
        is_admin,
    })))
}

pub async fn overview(State(state): State<AppState>) -> Result<Json<ApiResponse<AdminOverview>>> {
    let b = require_admin_bindings(&state).await?;
    Ok(Json(ApiResponse::success(admin::overview(&b).await?)))
}

pub async fn params(State(state): State<AppState>) -> Result<Json<ApiResponse<GameParamsView>>> {
    let b = require_admin_bindings(&state).await?;
    Ok(Json(ApiResponse::success(admin::game_params(&b).await?)))
}

pub async fn features(State(state): State<AppState>) -> Result<Json<ApiResponse<FeatureStatus>>> {
    let b = require_admin_bindings(&state).await?;
    Ok(Json(ApiResponse::success(admin::feature_status(&b).await?)))
}

pub async fn set_features(
    State(state): State<AppState>,
    Json(req): Json<FeatureTogglesRequest>,
) -> Result<Json<ApiResponse<Vec<TxOutcome>>>> {
    let b = require_admin_bindings(&state).await?;
    let mut outcomes = Vec::new();
    if let Some(enabled) = req.minting_enabled {
        outcomes.push(admin::set_minting_enabled(&b, enabled).await?);
    }
    if let Some(enabled) = req.battle_enabled {
        outcomes.push(admin::set_battle_enabled(&b, enabled).await?);
    }
    if let Some(enabled) = req.marketplace_enabled {
        outcomes.push(admin::set_marketplace_enabled(&b, enabled).await?);
    }
    if outcomes.is_empty() {
        return Err(AppError::BadRequest("No feature toggle supplied".to_string()));
    }
    Ok(Json(ApiResponse::success(outcomes)))
}

pub async fn set_prices(
    State(state): State<AppState>,
    Json(req): Json<MintPricesRequest>,
) -> Result<Json<ApiResponse<Vec<TxOutcome>>>> {
    let b = require_admin_bindings(&state).await?;
    let mut outcomes = Vec::new();
    if let Some(price) = req.warrior_mint_price.as_deref() {
        outcomes.push(admin::set_warrior_mint_price(&b, price).await?);
    }
    if let Some(price) = req.weapon_mint_price.as_deref() {
        outcomes.push(admin::set_weapon_mint_price(&b, price).await?);
    }
    if outcomes.is_empty() {
        return Err(AppError::BadRequest("No mint price supplied".to_string()));
    }
    Ok(Json(ApiResponse::success(outcomes)))
}

pub async fn set_stamina(
    State(state): State<AppState>,
    Json(req): Json<StaminaParamsRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = require_admin_bindings(&state).await?;
    let outcome = admin::set_stamina_params(&b, req.max_stamina, req.recovery_secs).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn set_battle_params(
    State(state): State<AppState>,
    Json(req): Json<BattleParamsRequest>,
) -> Result<Json<ApiResponse<Vec<TxOutcome>>>> {
    let b = require_admin_bindings(&state).await?;
    let outcomes = admin::set_battle_params(
        &b,
        req.base_reward.as_deref(),
        req.cooldown_secs,
        req.stamina_cost,
        req.base_experience.as_deref(),
    )
    .await?;
    Ok(Json(ApiResponse::success(outcomes)))
}

pub async fn set_fee(
    State(state): State<AppState>,
    Json(req): Json<FeeRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = require_admin_bindings(&state).await?;
    let outcome = admin::set_marketplace_fee_percent(&b, req.percent).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn set_pause(
    State(state): State<AppState>,
    Json(req): Json<PauseRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = require_admin_bindings(&state).await?;
    let outcome = admin::set_paused(&b, req.paused).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn treasury_deposit(
    State(state): State<AppState>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = require_admin_bindings(&state).await?;
    let outcome = admin::treasury_deposit(&b, &req.amount).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn treasury_withdraw(
    State(state): State<AppState>,
    Json(req): Json<AmountRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = require_admin_bindings(&state).await?;
    let outcome = admin::treasury_withdraw(&b, &req.amount).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn treasury_emergency_withdraw(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = require_admin_bindings(&state).await?;
    let outcome = admin::treasury_emergency_withdraw(&b).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn grant_role(
    State(state): State<AppState>,
    Json(req): Json<GrantRoleRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = require_admin_bindings(&state).await?;
    let outcome = match req.role {
        GrantableRole::GameAdmin => admin::grant_game_admin(&b, &req.account).await?,
        GrantableRole::RewardDistributor => {
            admin::grant_reward_distributor(&b, &req.account).await?
        }
    };
    Ok(Json(ApiResponse::success(outcome)))
}
