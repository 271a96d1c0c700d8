// src/api/mod.rs

pub mod admin;
pub mod battle;
pub mod health;
pub mod market;
pub mod session;
pub mod warriors;
pub mod weapons;

use std::sync::Arc;

use ethers::types::U256;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::session::{ContractBindings, WalletSession};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<WalletSession>,
    pub config: Config,
}

/// Contract handles for the active session, or NOT_CONNECTED.
pub async fn require_connected(state: &AppState) -> Result<Arc<ContractBindings>> {
    state.session.bindings().await
}

/// Token ids arrive as decimal strings in paths and bodies.
pub fn parse_token_id(value: &str) -> Result<U256> {
    U256::from_dec_str(value.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid token id: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_parsing() {
        assert_eq!(parse_token_id("42").unwrap(), U256::from(42));
        assert_eq!(parse_token_id(" 7 ").unwrap(), U256::from(7));
        assert!(parse_token_id("0x2a").is_err());
        assert!(parse_token_id("-1").is_err());
        assert!(parse_token_id("").is_err());
    }
}
