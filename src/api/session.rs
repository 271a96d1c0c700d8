//! Session lifecycle and balances.

use axum::{extract::State, Json};
use ethers::providers::Middleware;
use serde::Serialize;

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::{ApiResponse, SessionStatus};
use crate::utils::format_war;

#[derive(Serialize)]
pub struct BalanceResponse {
    pub account: String,
    pub war: String,
    pub native: String,
}

pub async fn connect(State(state): State<AppState>) -> Result<Json<ApiResponse<SessionStatus>>> {
    let status = state.session.connect().await?;
    Ok(Json(ApiResponse::success(status)))
}

pub async fn disconnect(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SessionStatus>>> {
    state.session.disconnect().await;
    let status = state.session.status().await;
    Ok(Json(ApiResponse::success(status)))
}

pub async fn status(State(state): State<AppState>) -> Json<ApiResponse<SessionStatus>> {
    Json(ApiResponse::success(state.session.status().await))
}

/// WAR and native balances for the session account.
pub async fn balance(State(state): State<AppState>) -> Result<Json<ApiResponse<BalanceResponse>>> {
    let b = super::require_connected(&state).await?;

    let war = b
        .war_token
        .balance_of(b.account)
        .call()
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("WAR balanceOf failed: {}", e)))?;
    let native = b
        .client
        .get_balance(b.account, None)
        .await
        .map_err(|e| AppError::BlockchainRPC(format!("Native balance read failed: {}", e)))?;

    Ok(Json(ApiResponse::success(BalanceResponse {
        account: format!("{:?}", b.account),
        war: format_war(war),
        native: ethers::utils::format_ether(native),
    })))
}
