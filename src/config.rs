use serde::Deserialize;
use std::env;

use crate::constants::REQUIRED_CHAIN_ID;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Blockchain
    pub rpc_url: String,
    pub required_chain_id: u64,
    pub wallet_private_key: Option<String>,

    // Contract Addresses
    pub war_token_address: String,
    pub warrior_nft_address: String,
    pub weapon_nft_address: String,
    pub battle_system_address: String,
    pub enemy_library_address: String,
    pub game_manager_address: String,
    pub treasury_address: String,
    pub marketplace_address: String,
    pub weapon_batch_minter_address: Option<String>,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            rpc_url: env::var("RPC_URL")?,
            required_chain_id: env::var("REQUIRED_CHAIN_ID")
                .unwrap_or_else(|_| REQUIRED_CHAIN_ID.to_string())
                .parse()?,
            wallet_private_key: env::var("WALLET_PRIVATE_KEY").ok().filter(|k| !k.trim().is_empty()),

            war_token_address: env::var("WAR_TOKEN_ADDRESS")?,
            warrior_nft_address: env::var("WARRIOR_NFT_ADDRESS")?,
            weapon_nft_address: env::var("WEAPON_NFT_ADDRESS")?,
            battle_system_address: env::var("BATTLE_SYSTEM_ADDRESS")?,
            enemy_library_address: env::var("ENEMY_LIBRARY_ADDRESS")?,
            game_manager_address: env::var("GAME_MANAGER_ADDRESS")?,
            treasury_address: env::var("TREASURY_ADDRESS")?,
            marketplace_address: env::var("MARKETPLACE_ADDRESS")?,
            weapon_batch_minter_address: env::var("WEAPON_BATCH_MINTER_ADDRESS")
                .ok()
                .filter(|a| !a.trim().is_empty()),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.rpc_url.trim().is_empty() {
            anyhow::bail!("RPC_URL is empty");
        }

        let required = [
            ("WAR_TOKEN_ADDRESS", &self.war_token_address),
            ("WARRIOR_NFT_ADDRESS", &self.warrior_nft_address),
            ("WEAPON_NFT_ADDRESS", &self.weapon_nft_address),
            ("BATTLE_SYSTEM_ADDRESS", &self.battle_system_address),
            ("ENEMY_LIBRARY_ADDRESS", &self.enemy_library_address),
            ("GAME_MANAGER_ADDRESS", &self.game_manager_address),
            ("TREASURY_ADDRESS", &self.treasury_address),
            ("MARKETPLACE_ADDRESS", &self.marketplace_address),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                anyhow::bail!("{} is empty", name);
            }
            if value.starts_with("0x0000") {
                tracing::warn!("Using placeholder {}", name);
            }
        }

        if self.wallet_private_key.is_none() {
            tracing::warn!("WALLET_PRIVATE_KEY not set; session connect will be unavailable");
        }
        if self.weapon_batch_minter_address.is_none() {
            tracing::warn!("WEAPON_BATCH_MINTER_ADDRESS not set; weapon minting disabled");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        if self.environment == "development" || self.environment == "testnet" {
            return true;
        }
        // BSC Testnet (97) is the default deployment target.
        self.required_chain_id == REQUIRED_CHAIN_ID
    }
}
