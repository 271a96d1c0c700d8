use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No wallet signer configured")]
    WalletUnavailable,

    #[error("Wrong network: expected chain {expected}, connected to chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Wallet session not connected")]
    NotConnected,

    #[error("Blockchain RPC error: {0}")]
    BlockchainRPC(String),

    #[error("Transaction reverted: {0}")]
    ContractRevert(String),

    #[error("Authorization failed: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::WalletUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "WALLET_UNAVAILABLE",
                self.to_string(),
            ),
            AppError::WrongNetwork { .. } => (
                StatusCode::BAD_GATEWAY,
                "WRONG_NETWORK",
                self.to_string(),
            ),
            AppError::NotConnected => (
                StatusCode::CONFLICT,
                "NOT_CONNECTED",
                self.to_string(),
            ),
            AppError::BlockchainRPC(ref e) => (
                StatusCode::BAD_GATEWAY,
                "BLOCKCHAIN_RPC_ERROR",
                e.clone(),
            ),
            AppError::ContractRevert(ref msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONTRACT_REVERT",
                msg.clone(),
            ),
            AppError::AuthError(ref msg) => (
                StatusCode::UNAUTHORIZED,
                "AUTH_ERROR",
                msg.clone(),
            ),
            AppError::NotFound(ref msg) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::BadRequest(ref msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                self.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details: None,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_network_names_both_chain_ids() {
        let err = AppError::WrongNetwork {
            expected: 97,
            actual: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("97"));
        assert!(msg.contains("chain 1"));
    }

    #[test]
    fn connect_failures_are_distinct() {
        let unavailable = AppError::WalletUnavailable.to_string();
        let wrong = AppError::WrongNetwork {
            expected: 97,
            actual: 56,
        }
        .to_string();
        let disconnected = AppError::NotConnected.to_string();
        assert_ne!(unavailable, wrong);
        assert_ne!(wrong, disconnected);
        assert_ne!(unavailable, disconnected);
    }
}
