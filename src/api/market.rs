//! Marketplace endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::Result;
use crate::models::{ApiResponse, ListingCategory, MarketListingView, MarketStatsView, TxOutcome};
use crate::services::market::{self, BrowseQuery};

#[derive(Serialize)]
pub struct ListingsResponse {
    pub listings: Vec<MarketListingView>,
    pub total: u64,
    pub page: u64,
    pub page_size: u8,
}

#[derive(Deserialize)]
pub struct ListRequest {
    pub category: ListingCategory,
    pub token_id: String,
    pub price: String,
}

#[derive(Deserialize)]
pub struct ListingRefRequest {
    pub category: ListingCategory,
    pub token_id: String,
}

#[derive(Deserialize)]
pub struct ChangePriceRequest {
    pub category: ListingCategory,
    pub token_id: String,
    pub new_price: String,
}

#[derive(Serialize)]
pub struct BuyResponse {
    pub outcome: TxOutcome,
    pub price_paid: String,
}

pub async fn listings(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<ApiResponse<ListingsResponse>>> {
    let b = super::require_connected(&state).await?;
    let page = market::browse(&b, query).await?;
    Ok(Json(ApiResponse::success(ListingsResponse {
        listings: page.listings,
        total: page.total,
        page: page.page,
        page_size: page.page_size,
    })))
}

pub async fn my_listings(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<MarketListingView>>>> {
    let b = super::require_connected(&state).await?;
    Ok(Json(ApiResponse::success(market::my_listings(&b).await?)))
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<ApiResponse<MarketStatsView>>> {
    let b = super::require_connected(&state).await?;
    Ok(Json(ApiResponse::success(market::stats(&b).await?)))
}

pub async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = super::require_connected(&state).await?;
    let token_id = super::parse_token_id(&req.token_id)?;
    let outcome = market::list(&b, req.category, token_id, &req.price).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn buy(
    State(state): State<AppState>,
    Json(req): Json<ListingRefRequest>,
) -> Result<Json<ApiResponse<BuyResponse>>> {
    let b = super::require_connected(&state).await?;
    let token_id = super::parse_token_id(&req.token_id)?;
    let (outcome, price_paid) = market::buy(&b, req.category, token_id).await?;
    Ok(Json(ApiResponse::success(BuyResponse {
        outcome,
        price_paid,
    })))
}

pub async fn cancel(
    State(state): State<AppState>,
    Json(req): Json<ListingRefRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = super::require_connected(&state).await?;
    let token_id = super::parse_token_id(&req.token_id)?;
    let outcome = market::cancel(&b, req.category, token_id).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

pub async fn change_price(
    State(state): State<AppState>,
    Json(req): Json<ChangePriceRequest>,
) -> Result<Json<ApiResponse<TxOutcome>>> {
    let b = super::require_connected(&state).await?;
    let token_id = super::parse_token_id(&req.token_id)?;
    let outcome = market::change_price(&b, req.category, token_id, &req.new_price).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
