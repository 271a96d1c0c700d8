//! Armory endpoints: enumeration, minting, and the forge operations.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::Result;
use crate::models::{ApiResponse, DustBalance, TxOutcome, WeaponCollectionView};
use crate::services::weapons::{self, WeaponFilter};

#[derive(Deserialize)]
pub struct MintWeaponsRequest {
    pub count: u64,
}

#[derive(Deserialize)]
pub struct EquipRequest {
    pub weapon_id: String,
    pub warrior_id: String,
}

#[derive(Deserialize)]
pub struct WeaponIdRequest {
    pub weapon_id: String,
}

#[derive(Deserialize)]
pub struct ReforgeRequest {
    pub burn_id: String,
    pub target_id: String,
}

#[derive(Deserialize)]
pub struct DustReforgeRequest {
    pub weapon_id: String,
    #[serde(default)]
    pub low: u32,
    #[serde(default)]
    pub four: u32,
    #[serde(default)]
    pub five: u32,
}

#[derive(Serialize)]
pub struct MintWeaponsResponse {
    pub outcome: TxOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minted: Option<u64>,
}

#[derive(Serialize)]
pub struct RepairResponse {
    pub outcome: TxOutcome,
    pub cost_paid: String,
}

#[derive(Serialize)]
pub struct BurnResponse {
    pub outcome: TxOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dust_gained: Option<String>,
}

#[derive(Serialize)]
pub struct DustReforgeResponse {
    pub outcome: TxOutcome,
    pub power_gained: u64,
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<WeaponFilter>,
) -> Result<Json<ApiResponse<WeaponCollectionView>>> {
    let b = super::require_connected(&state).await?;
    let collection = weapons::weapon_collection(&state.session, &b, filter).await?;
    Ok(Json(ApiResponse::success(collection)))
}

pub async fn dust(State(state): State<AppState>) -> Result<Json<ApiResponse<DustBalance>>> {
    let b = super::require_connected(&state).await?;
    Ok(Json(ApiResponse::success(weapons::dust_balance(&b).await)))
}

pub async fn mint(
    State(state): State<AppState>,
    Json(req): Json<MintWeaponsRequest>,
) -> Result<Json<ApiResponse<MintWeaponsResponse>>> {
    let b = super::require_connected(&state).await?;
    let (outcome, minted) = weapons::mint_weapons(&b, req.count).await?;
    Ok(Json(ApiResponse::success(MintWeaponsResponse {
        outcome,
        minted,
    })))
}

pub async fn equip(
    State(state): State<AppState>,
    Json(req): Json<EquipRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = super::require_connected(&state).await?;
    let weapon_id = super::parse_token_id(&req.weapon_id)?;
    let warrior_id = super::parse_token_id(&req.warrior_id)?;
    let outcome = weapons::equip(&b, weapon_id, warrior_id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn unequip(
    State(state): State<AppState>,
    Json(req): Json<WeaponIdRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = super::require_connected(&state).await?;
    let weapon_id = super::parse_token_id(&req.weapon_id)?;
    let outcome = weapons::unequip(&b, weapon_id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn repair(
    State(state): State<AppState>,
    Json(req): Json<WeaponIdRequest>,
) -> Result<Json<ApiResponse<RepairResponse>>> {
    let b = super::require_connected(&state).await?;
    let weapon_id = super::parse_token_id(&req.weapon_id)?;
    let (outcome, cost_paid) = weapons::repair(&b, weapon_id).await?;
    Ok(Json(ApiResponse::success(RepairResponse {
        outcome,
        cost_paid,
    })))
}

pub async fn burn(
    State(state): State<AppState>,
    Json(req): Json<WeaponIdRequest>,
) -> Result<Json<ApiResponse<BurnResponse>>> {
    let b = super::require_connected(&state).await?;
    let weapon_id = super::parse_token_id(&req.weapon_id)?;
    let (outcome, dust_gained) = weapons::burn(&b, weapon_id).await?;
    Ok(Json(ApiResponse::success(BurnResponse {
        outcome,
        dust_gained: dust_gained.map(|d| d.to_string()),
    })))
}

pub async fn reforge(
    State(state): State<AppState>,
    Json(req): Json<ReforgeRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = super::require_connected(&state).await?;
    let burn_id = super::parse_token_id(&req.burn_id)?;
    let target_id = super::parse_token_id(&req.target_id)?;
    let outcome = weapons::reforge(&b, burn_id, target_id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn reforge_dust(
    State(state): State<AppState>,
    Json(req): Json<DustReforgeRequest>,
) -> Result<Json<ApiResponse<DustReforgeResponse>>> {
    let b = super::require_connected(&state).await?;
    let weapon_id = super::parse_token_id(&req.weapon_id)?;
    let (outcome, power_gained) =
        weapons::reforge_with_dust(&b, weapon_id, req.low, req.four, req.five).await?;
    Ok(Json(ApiResponse::success(DustReforgeResponse {
        outcome,
        power_gained,
    })))
}
